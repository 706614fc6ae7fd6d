use crate::entry::Entry;

/// Decides whether a child shows up in a [`Listing`](crate::Listing).
///
/// The default filter hides dot-files and configured name suffixes.
/// Implement this to hide more (or less), e.g. by type or by pattern.
///
/// # Thread Safety
///
/// `Send + Sync` are required so a built [`Resolver`](crate::Resolver) can be
/// shared between request handlers.
///
/// # Example
///
/// ```rust
/// use repoview::{Entry, EntryFilter, EntryType};
///
/// struct NoHashes;
///
/// impl EntryFilter for NoHashes {
///     fn is_included(&self, entry: &Entry) -> bool {
///         entry.entry_type != EntryType::HashFile
///     }
/// }
/// ```
pub trait EntryFilter: Send + Sync {
    /// Returns `true` if this entry should be listed.
    fn is_included(&self, entry: &Entry) -> bool;
}
