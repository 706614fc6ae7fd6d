//! # repoview
//!
//! Metadata resolution engine for browsable Maven-style repository indexes.
//!
//! repoview reads a local repository tree (group / artifact / version / file)
//! and works out what each node is: artifact directories (they carry a
//! `maven-metadata.xml`), version directories (they carry a POM), artifact
//! and sources files, descriptors and hash files. Descriptors are parsed for
//! coordinates, descriptions and relocations, hash files are folded into the
//! file they hash, and version directories can be ordered with a tolerant
//! semver-like comparator. Rendering the result is left to the caller.
//!
//! # Quick Start
//!
//! ```rust
//! use std::fs;
//! use repoview::EntryType;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = tempfile::tempdir()?;
//! let version = repo.path().join("1.0");
//! fs::create_dir(&version)?;
//! fs::write(
//!     version.join("demo-1.0.pom"),
//!     "<project><groupId>com.example</groupId><artifactId>demo</artifactId>\
//!      <version>1.0</version></project>",
//! )?;
//! fs::write(version.join("demo-1.0.jar"), b"jar")?;
//! fs::write(version.join("demo-1.0.jar.sha1"), "da39a3ee")?;
//!
//! let opened = repoview::resolver().build().open(&version)?;
//! assert_eq!(opened.root.entry_type, EntryType::VersionDir);
//!
//! let jar = opened.root.child("demo-1.0.jar").unwrap();
//! assert_eq!(jar.entry_type, EntryType::ArtifactFile);
//! assert!(jar.hash_entries.contains_key("sha1"));
//! # Ok(())
//! # }
//! ```
//!
//! # Lazy resolution
//!
//! Entries start shallow. [`Resolver::resolve`] fills in one directory's
//! children on demand, touching only that directory plus, for artifact
//! directories, the latest-version child its descriptor names.

#![forbid(unsafe_code)]

pub mod classify;
pub mod descriptor;
pub mod version;

mod builder;
mod engine;
mod entry;
mod error;
mod results;
mod traits;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::{Resolver, ResolverBuilder, DEFAULT_MAX_DEPTH};
pub use descriptor::{ArtifactCoordinates, ArtifactMetadata, ArtifactVersionMetadata};
pub use entry::{Entry, EntryType, MAX_HASH_FILE_SIZE};
pub use error::IndexError;
pub use results::{format_size, Listing, ListingStats, Resolution, ResolveReport, SortOrder, VersionSort};
pub use traits::EntryFilter;

// ── Entry points ──────────────────────────────────────────────────────────────

/// Create a new [`ResolverBuilder`].
pub fn resolver() -> ResolverBuilder {
    ResolverBuilder::default()
}

/// Resolve a directory entry in place with default settings.
///
/// Recoverable problems are logged and otherwise ignored; see
/// [`ResolverBuilder::collect_errors`] to keep them.
///
/// # Errors
///
/// [`IndexError::NotADirectory`] if `entry` is not a directory.
pub fn resolve(entry: &mut Entry) -> Result<(), IndexError> {
    Resolver::default().resolve(entry).map(|_| ())
}
