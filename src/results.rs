use std::cmp::Ordering;
use std::time::Duration;

use crate::entry::{Entry, EntryType};
use crate::error::IndexError;
use crate::traits::EntryFilter;
use crate::version;

/// How version directories are ordered in a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionSort {
    #[default]
    LastModified,
    /// Semver-like name order, see [`version::compare`].
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// What a single resolve call did.
///
/// `errors` is only populated if `.collect_errors(true)` was set on the
/// builder. Everything in it is recoverable; the tree is still usable.
#[derive(Debug, Default)]
pub struct ResolveReport {
    /// Directories listed, including latest-version hops.
    pub directories: usize,

    /// Descriptor files read.
    pub descriptors: usize,

    pub errors: Vec<IndexError>,

    pub duration: Duration,
}

impl ResolveReport {
    pub(crate) fn absorb(&mut self, other: ResolveReport) {
        self.directories += other.directories;
        self.descriptors += other.descriptors;
        self.errors.extend(other.errors);
        self.duration += other.duration;
    }
}

/// An opened directory: the resolved entry and the combined report.
#[derive(Debug)]
pub struct Resolution {
    pub root:   Entry,
    pub report: ResolveReport,
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// The rows an index page shows for one resolved directory, filtered and
/// sorted.
#[derive(Debug)]
pub struct Listing<'e> {
    pub directory: &'e Entry,
    pub entries:   Vec<&'e Entry>,
    pub stats:     ListingStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListingStats {
    pub files:       usize,
    pub directories: usize,
    /// Hash files folded into the listed entries.
    pub hashes:      usize,
    /// Children dropped by the filter.
    pub filtered:    usize,
}

impl<'e> Listing<'e> {
    pub(crate) fn build(
        directory: &'e Entry,
        filter: &dyn EntryFilter,
        version_sort: VersionSort,
        version_order: SortOrder,
    ) -> Self {
        let mut stats = ListingStats::default();
        let mut entries: Vec<&Entry> = Vec::new();

        for child in directory.children() {
            if !filter.is_included(child) {
                stats.filtered += 1;
                continue;
            }
            if child.is_dir() {
                stats.directories += 1;
            } else {
                stats.files += 1;
            }
            stats.hashes += child.hash_entries.len();
            entries.push(child);
        }

        entries.sort_by(|a, b| compare_rows(a, b, version_sort, version_order));

        Self { directory, entries, stats }
    }

    /// The directory's `README.md`, whether or not the filter shows it.
    pub fn readme(&self) -> Option<&'e Entry> {
        self.directory
            .child("README.md")
            .filter(|e| e.entry_type.is_file())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Display group of a type; lower groups are listed first.
fn group(ty: EntryType) -> u8 {
    match ty {
        EntryType::OtherDir => 0,
        EntryType::ArtifactDir => 1,
        EntryType::VersionDir => 2,
        EntryType::ArtifactFile => 3,
        EntryType::SourcesArtifactFile => 4,
        ty if ty.is_descriptor() => 5,
        EntryType::HashFile => 6,
        _ => 7,
    }
}

fn compare_rows(a: &Entry, b: &Entry, sort: VersionSort, order: SortOrder) -> Ordering {
    let by_group = group(a.entry_type).cmp(&group(b.entry_type));
    if by_group != Ordering::Equal || a.entry_type != EntryType::VersionDir {
        return by_group.then_with(|| a.name.cmp(&b.name));
    }

    let ord = match sort {
        VersionSort::Name => version::compare(&a.name, &b.name),
        VersionSort::LastModified => a.last_modified.cmp(&b.last_modified),
    };
    match order {
        SortOrder::Ascending => ord,
        SortOrder::Descending => ord.reverse(),
    }
}

/// Human-readable size in binary units, e.g. `1.5 KiB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value > 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{:.2}", rounded);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", text, UNITS[unit])
}
