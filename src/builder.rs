use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::engine::{run, ResolveOptions};
use crate::entry::Entry;
use crate::error::IndexError;
use crate::results::{Listing, Resolution, ResolveReport, SortOrder, VersionSort};
use crate::traits::EntryFilter;

// ---------------------------------------------------------------------------
// ResolverBuilder
// ---------------------------------------------------------------------------

/// Configures a [`Resolver`].
///
/// Created via [`repoview::resolver()`](crate::resolver). Configure with
/// chained builder methods, then call [`build()`](ResolverBuilder::build).
///
/// # Example
///
/// ```rust,no_run
/// use repoview::{SortOrder, VersionSort};
///
/// let resolver = repoview::resolver()
///     .sort_versions_by(VersionSort::Name)
///     .version_order(SortOrder::Descending)
///     .ignore_suffixes([".php", ".md"])
///     .collect_errors(true)
///     .build();
///
/// let opened = resolver.open("/srv/maven/com/example/demo")?;
/// for row in resolver.listing(&opened.root).entries {
///     println!("{} {:?}", row.name, row.entry_type);
/// }
/// # Ok::<(), repoview::IndexError>(())
/// ```
pub struct ResolverBuilder {
    follow_links:           bool,
    max_depth:              usize,
    preview_subdirectories: bool,
    collect_errors:         bool,
    show_hidden:            bool,
    ignored_suffixes:       Vec<String>,
    version_sort:           VersionSort,
    version_order:          SortOrder,
    filter:                 Option<Box<dyn EntryFilter>>,
}

impl Default for ResolverBuilder {
    fn default() -> Self {
        Self {
            follow_links:           true,
            max_depth:              DEFAULT_MAX_DEPTH,
            preview_subdirectories: true,
            collect_errors:         false,
            show_hidden:            false,
            ignored_suffixes:       Vec::new(),
            version_sort:           VersionSort::default(),
            version_order:          SortOrder::default(),
            filter:                 None,
        }
    }
}

/// Latest-version hops followed from one directory by default.
pub const DEFAULT_MAX_DEPTH: usize = 4;

impl ResolverBuilder {
    // ── Traversal ─────────────────────────────────────────────────────────

    /// Stat children through symbolic links. Enabled by default.
    pub fn follow_links(mut self, yes: bool) -> Self {
        self.follow_links = yes;
        self
    }

    /// How many artifact → latest-version hops a resolve may take.
    /// `0` disables the shortcut.
    pub fn max_depth(mut self, d: usize) -> Self {
        self.max_depth = d;
        self
    }

    /// Also resolve every immediate sub-directory in [`Resolver::open`], so
    /// rows can show their type and metadata. Enabled by default.
    pub fn preview_subdirectories(mut self, yes: bool) -> Self {
        self.preview_subdirectories = yes;
        self
    }

    /// Collect recoverable errors into [`ResolveReport::errors`].
    ///
    /// Disabled by default; they are logged either way.
    pub fn collect_errors(mut self, yes: bool) -> Self {
        self.collect_errors = yes;
        self
    }

    // ── Listing ───────────────────────────────────────────────────────────

    /// List names starting with `.`. Hidden by default.
    pub fn show_hidden(mut self, yes: bool) -> Self {
        self.show_hidden = yes;
        self
    }

    /// Leave names ending with `suffix` out of listings.
    pub fn ignore_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.ignored_suffixes.push(suffix.into());
        self
    }

    /// Leave names ending with any of `suffixes` out of listings.
    pub fn ignore_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_suffixes.extend(suffixes.into_iter().map(Into::into));
        self
    }

    /// Order version directories by modification time (default) or name.
    pub fn sort_versions_by(mut self, sort: VersionSort) -> Self {
        self.version_sort = sort;
        self
    }

    /// Newest first by default.
    pub fn version_order(mut self, order: SortOrder) -> Self {
        self.version_order = order;
        self
    }

    /// Replace the hidden/suffix filter with a custom one.
    pub fn with_filter(mut self, f: impl EntryFilter + 'static) -> Self {
        self.filter = Some(Box::new(f));
        self
    }

    // ── Build ─────────────────────────────────────────────────────────────

    pub fn build(self) -> Resolver {
        let filter: Arc<dyn EntryFilter> = match self.filter {
            Some(f) => Arc::from(f),
            None => Arc::new(DefaultFilter {
                show_hidden:      self.show_hidden,
                ignored_suffixes: self.ignored_suffixes,
            }),
        };

        Resolver {
            options: ResolveOptions {
                follow_links:   self.follow_links,
                max_depth:      self.max_depth,
                collect_errors: self.collect_errors,
            },
            preview_subdirectories: self.preview_subdirectories,
            filter,
            version_sort:  self.version_sort,
            version_order: self.version_order,
        }
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Resolves directory entries and lays them out for display.
///
/// Immutable once built; cheap to clone and safe to share between threads.
#[derive(Clone)]
pub struct Resolver {
    options:                ResolveOptions,
    preview_subdirectories: bool,
    filter:                 Arc<dyn EntryFilter>,
    version_sort:           VersionSort,
    version_order:          SortOrder,
}

impl Default for Resolver {
    fn default() -> Self {
        ResolverBuilder::default().build()
    }
}

impl Resolver {
    /// Probe and resolve the directory at `path`.
    ///
    /// With sub-directory previews enabled, each immediate sub-directory is
    /// resolved as well.
    ///
    /// # Errors
    ///
    /// [`IndexError::NotFound`] if nothing exists at `path`,
    /// [`IndexError::NotADirectory`] if it is a file. Everything else is
    /// recoverable and ends up in the report.
    pub fn open(&self, path: impl AsRef<Path>) -> Result<Resolution, IndexError> {
        let mut root = Entry::probe(path)?;
        let mut report = self.resolve(&mut root)?;

        if self.preview_subdirectories {
            if let Some(children) = root.sub_entries.as_mut() {
                for child in children.values_mut() {
                    // The latest-version child of an artifact directory is
                    // already resolved.
                    if child.is_dir() && !child.is_resolved() {
                        report.absorb(run(child, &self.options));
                    }
                }
            }
        }

        debug!(
            "Opened {:?}: {} directories, {} descriptors in {:?}",
            root.path(),
            report.directories,
            report.descriptors,
            report.duration
        );
        Ok(Resolution { root, report })
    }

    /// Resolve a directory entry in place: list its children, promote it to
    /// an artifact or version directory, reclassify and fold its files.
    ///
    /// Use this for on-demand resolution of any sub-directory of an
    /// earlier result.
    ///
    /// # Errors
    ///
    /// [`IndexError::NotADirectory`] if `entry` is not a directory.
    pub fn resolve(&self, entry: &mut Entry) -> Result<ResolveReport, IndexError> {
        if !entry.is_dir() {
            return Err(IndexError::NotADirectory(entry.path()));
        }
        Ok(run(entry, &self.options))
    }

    /// Filtered, display-ordered rows of a resolved directory.
    ///
    /// Empty for an entry that has not been resolved.
    pub fn listing<'e>(&self, directory: &'e Entry) -> Listing<'e> {
        Listing::build(
            directory,
            self.filter.as_ref(),
            self.version_sort,
            self.version_order,
        )
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("options", &self.options)
            .field("preview_subdirectories", &self.preview_subdirectories)
            .field("version_sort", &self.version_sort)
            .field("version_order", &self.version_order)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Built-in filter
// ---------------------------------------------------------------------------

/// Hides dot-files (unless asked not to) and ignored suffixes.
struct DefaultFilter {
    show_hidden:      bool,
    ignored_suffixes: Vec<String>,
}

impl EntryFilter for DefaultFilter {
    fn is_included(&self, entry: &Entry) -> bool {
        if !self.show_hidden && entry.name.starts_with('.') {
            return false;
        }
        !self
            .ignored_suffixes
            .iter()
            .any(|suffix| entry.name.ends_with(suffix.as_str()))
    }
}
