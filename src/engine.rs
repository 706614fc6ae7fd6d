use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use ignore::{DirEntry, WalkBuilder};
use tracing::{debug, trace, warn};

use crate::classify::reclassify_in_version_dir;
use crate::descriptor::{load_artifact_descriptor, load_version_descriptor};
use crate::entry::{Entry, EntryType};
use crate::error::IndexError;
use crate::results::ResolveReport;

// ---------------------------------------------------------------------------
// ResolveOptions
// ---------------------------------------------------------------------------

/// Resolution parameters passed from the builder to the engine.
///
/// `pub(crate)` — not part of the public API. Callers configure these
/// via the builder methods (`.follow_links()`, `.max_depth()`, …).
#[derive(Debug, Clone)]
pub(crate) struct ResolveOptions {
    pub follow_links:   bool,
    pub max_depth:      usize,
    pub collect_errors: bool,
}

// ---------------------------------------------------------------------------
// run()
// ---------------------------------------------------------------------------

/// Resolve `entry` in place and report what happened.
///
/// `entry` must be a directory; callers check this.
pub(crate) fn run(entry: &mut Entry, opts: &ResolveOptions) -> ResolveReport {
    let start = Instant::now();
    let mut pass = Pass {
        opts,
        chain: Vec::new(),
        directories: 0,
        descriptors: 0,
        errors: Vec::new(),
    };

    pass.resolve(entry, 0);

    ResolveReport {
        directories: pass.directories,
        descriptors: pass.descriptors,
        errors:      pass.errors,
        duration:    start.elapsed(),
    }
}

/// State of one resolution call, including its latest-version hops.
struct Pass<'a> {
    opts:        &'a ResolveOptions,
    /// Canonical paths along the current latest-version chain.
    chain:       Vec<PathBuf>,
    directories: usize,
    descriptors: usize,
    errors:      Vec<IndexError>,
}

impl Pass<'_> {
    fn resolve(&mut self, entry: &mut Entry, depth: usize) {
        let dir = entry.path();

        let canonical = fs::canonicalize(&dir).unwrap_or_else(|_| dir.clone());
        if self.chain.contains(&canonical) {
            self.recover(IndexError::SymlinkLoop(dir));
            return;
        }
        self.chain.push(canonical);

        self.directories += 1;
        let mut children = self.list(&dir);

        // Listing is in name order, so "first" is the smallest name.
        let metadata_file = first_of(&children, EntryType::MavenMetadataFile);
        let pom_file = first_of(&children, EntryType::MavenPomFile);
        let has_module = first_of(&children, EntryType::GradleModuleFile).is_some();

        // Directory-role promotion: first match wins.
        let mut promoted = false;
        if let Some(path) = metadata_file.filter(|_| entry.artifact_metadata.is_none()) {
            self.descriptors += 1;
            match load_artifact_descriptor(&path) {
                Ok(meta) => {
                    debug!("{:?} is an artifact directory", dir);
                    entry.entry_type = EntryType::ArtifactDir;
                    self.follow_latest(entry, meta.latest_version.as_deref(), &mut children, depth);
                    entry.artifact_metadata = Some(Arc::new(meta));
                    promoted = true;
                }
                Err(e) => self.recover(e),
            }
        }
        if !promoted {
            let has_pom = pom_file.is_some();
            if let Some(path) = pom_file.filter(|_| entry.version_metadata.is_none()) {
                debug!("{:?} is a version directory", dir);
                entry.entry_type = EntryType::VersionDir;
                self.descriptors += 1;
                match load_version_descriptor(&path) {
                    Ok(meta) => entry.version_metadata = Some(Arc::new(meta)),
                    Err(e) => self.recover(e),
                }
            } else if has_module && !has_pom {
                // Gradle-only publication: a version, but nothing to read.
                debug!("{:?} is a version directory (module only)", dir);
                entry.entry_type = EntryType::VersionDir;
            }
        }

        if entry.entry_type == EntryType::VersionDir {
            for child in children.values_mut() {
                if child.entry_type == EntryType::OtherFile {
                    child.entry_type = reclassify_in_version_dir(&child.name);
                }
            }
        }

        entry.sub_entries = Some(fold_hashes(children));
        self.chain.pop();
    }

    /// Resolve the latest-version child and share its version metadata.
    fn follow_latest(
        &mut self,
        entry: &mut Entry,
        latest: Option<&str>,
        children: &mut BTreeMap<String, Entry>,
        depth: usize,
    ) {
        let Some(child) = latest.and_then(|name| children.get_mut(name)) else {
            return;
        };
        if !child.is_dir() {
            return;
        }
        if depth >= self.opts.max_depth {
            debug!("Not following latest version {:?}: depth limit reached", child.path());
            return;
        }

        self.resolve(child, depth + 1);
        if let Some(version) = &child.version_metadata {
            entry.version_metadata = Some(Arc::clone(version));
        }
    }

    /// Shallow entries for the immediate children of `dir`.
    ///
    /// An unreadable directory lists as empty.
    fn list(&mut self, dir: &Path) -> BTreeMap<String, Entry> {
        let walker = WalkBuilder::new(dir)
            .standard_filters(false)
            .ignore(false)
            .parents(false)
            .hidden(false)
            .follow_links(self.opts.follow_links)
            .same_file_system(false)
            .max_depth(Some(1))
            .build();

        let mut children = BTreeMap::new();
        for res in walker {
            let child = match res {
                Ok(c) => c,
                Err(e) => {
                    // A child that cannot be stat'ed keeps its name-based row.
                    if let Some(name) = failed_child(&e, dir) {
                        let entry = Entry::shallow(dir, name, false, None);
                        children.insert(entry.name.clone(), entry);
                    }
                    self.recover(map_ignore_error(e));
                    continue;
                }
            };

            // Skip the directory itself
            if child.depth() == 0 {
                continue;
            }

            let entry = self.shallow(dir, &child);
            children.insert(entry.name.clone(), entry);
        }
        children
    }

    fn shallow(&mut self, dir: &Path, child: &DirEntry) -> Entry {
        let name = child.file_name().to_string_lossy().into_owned();
        let is_dir = child.file_type().is_some_and(|ft| ft.is_dir());

        let metadata = match child.metadata() {
            Ok(m) => Some(m),
            Err(e) => {
                // Vanished between listing and stat, or a dangling link.
                let err = match e.into_io_error() {
                    Some(source) => IndexError::Io {
                        path: child.path().to_path_buf(),
                        source,
                    },
                    None => IndexError::Walk(format!("cannot stat {:?}", child.path())),
                };
                self.recover(err);
                None
            }
        };

        let entry = Entry::shallow(dir, name, is_dir, metadata.as_ref());
        trace!(
            "{:?}: {:?}, {:?} bytes",
            child.path(),
            entry.entry_type,
            entry.size
        );
        entry
    }

    fn recover(&mut self, err: IndexError) {
        warn!("{}", err);
        if self.opts.collect_errors {
            self.errors.push(err);
        }
    }
}

fn first_of(children: &BTreeMap<String, Entry>, ty: EntryType) -> Option<PathBuf> {
    children
        .values()
        .find(|c| c.entry_type == ty)
        .map(Entry::path)
}

// ---------------------------------------------------------------------------
// Hash folding
// ---------------------------------------------------------------------------

/// Move every hash file with a matching sibling into that sibling's
/// `hash_entries`. Hash files without a subject stay where they are.
///
/// Builds a new map instead of removing from the one being scanned.
/// Chained hashes (`a.jar.sha1.md5`) land on the hash they describe.
pub(crate) fn fold_hashes(children: BTreeMap<String, Entry>) -> BTreeMap<String, Entry> {
    let subjects: BTreeMap<String, String> = children
        .values()
        .filter(|c| c.entry_type == EntryType::HashFile)
        .map(|c| (c.name.clone(), c.name_without_extension().to_string()))
        .filter(|(_, subject)| children.contains_key(subject))
        .collect();

    let mut kept = BTreeMap::new();
    let mut folded = Vec::new();
    for (name, entry) in children {
        match subjects.get(&name) {
            Some(subject) => folded.push((subject.clone(), entry)),
            None => {
                kept.insert(name, entry);
            }
        }
    }

    // Longest names first: a chained hash must be attached before the
    // hash it describes is itself moved.
    folded.sort_by_key(|(_, e)| e.name.len());
    while let Some((subject, hash)) = folded.pop() {
        let target = match kept.get_mut(&subject) {
            Some(t) => t,
            None => match folded.iter_mut().find(|(_, e)| e.name == subject) {
                Some((_, t)) => t,
                None => continue,
            },
        };
        target.hash_entries.insert(hash.extension.clone(), hash);
    }

    kept
}

// ---------------------------------------------------------------------------
// Map ignore::Error to IndexError
// ---------------------------------------------------------------------------

fn map_ignore_error(e: ignore::Error) -> IndexError {
    match e {
        ignore::Error::WithPath { path, err } => match untagged(*err) {
            ignore::Error::Io(io_err) => {
                if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                    IndexError::PermissionDenied(path)
                } else {
                    IndexError::Io { path, source: io_err }
                }
            }
            other => IndexError::Walk(format!("{}: {}", path.display(), other)),
        },
        ignore::Error::WithDepth { err, .. } => map_ignore_error(*err),
        ignore::Error::Loop { child, .. } => IndexError::SymlinkLoop(child),
        ignore::Error::Io(io_err) => IndexError::Io {
            path: PathBuf::new(),
            source: io_err,
        },
        other => IndexError::Walk(other.to_string()),
    }
}

/// Strip depth tags; walkdir errors arrive as `WithPath(WithDepth(Io))`.
fn untagged(e: ignore::Error) -> ignore::Error {
    match e {
        ignore::Error::WithDepth { err, .. } => untagged(*err),
        other => other,
    }
}

/// Name of the immediate child of `dir` an error is about, if any.
fn failed_child(e: &ignore::Error, dir: &Path) -> Option<String> {
    match e {
        ignore::Error::WithPath { path, .. } if path.parent() == Some(dir) => {
            path.file_name().map(|n| n.to_string_lossy().into_owned())
        }
        ignore::Error::WithDepth { err, .. } => failed_child(err, dir),
        _ => None,
    }
}
