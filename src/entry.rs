use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::classify::classify;
use crate::descriptor::{ArtifactMetadata, ArtifactVersionMetadata};
use crate::error::IndexError;

/// Hash files larger than this are not read back for display.
pub const MAX_HASH_FILE_SIZE: u64 = 1024;

/// One node of a repository tree.
///
/// Created shallow (name, type, stat facts). Directories gain `sub_entries`
/// and metadata only once a [`Resolver`](crate::Resolver) has resolved them.
///
/// Metadata records are shared: an artifact directory's `version_metadata`
/// is the very record of its latest-version child, so
/// `Arc::ptr_eq` tells the two apart from a look-alike copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Parent directory.
    pub location: PathBuf,

    /// File name within `location`.
    pub name: String,

    /// Everything after the last `.` of `name`, or empty.
    pub extension: String,

    pub entry_type: EntryType,

    /// Size in bytes. `None` for directories and when stat failed.
    pub size: Option<u64>,

    pub last_modified: Option<SystemTime>,

    /// Hash files folded into this entry, keyed by algorithm (`"sha1"`, `"md5"`, …).
    pub hash_entries: BTreeMap<String, Entry>,

    /// Children by name. `None` until the directory has been resolved.
    pub sub_entries: Option<BTreeMap<String, Entry>>,

    /// Present on artifact directories.
    pub artifact_metadata: Option<Arc<ArtifactMetadata>>,

    /// Present on version directories, and on artifact directories whose
    /// latest version could be resolved.
    pub version_metadata: Option<Arc<ArtifactVersionMetadata>>,
}

/// The taxonomy every entry is sorted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    ArtifactDir,
    VersionDir,
    OtherDir,
    ArtifactFile,
    SourcesArtifactFile,
    GradleModuleFile,
    MavenPomFile,
    MavenMetadataFile,
    HashFile,
    OtherFile,
}

impl EntryType {
    pub fn is_directory(self) -> bool {
        matches!(self, Self::ArtifactDir | Self::VersionDir | Self::OtherDir)
    }

    pub fn is_file(self) -> bool {
        !self.is_directory()
    }

    /// Module, POM and metadata descriptor files.
    pub fn is_descriptor(self) -> bool {
        matches!(
            self,
            Self::GradleModuleFile | Self::MavenPomFile | Self::MavenMetadataFile
        )
    }
}

impl Entry {
    /// Build a shallow entry for a child of `location`.
    ///
    /// `metadata` is `None` when the child could not be stat'ed; the entry
    /// then keeps its name-based type and no size or timestamp.
    pub fn shallow(
        location: impl Into<PathBuf>,
        name: impl Into<String>,
        is_dir: bool,
        metadata: Option<&fs::Metadata>,
    ) -> Self {
        let name = name.into();
        let extension = extension_of(&name).to_string();
        let entry_type = classify(&name, &extension, is_dir);

        Self {
            location: location.into(),
            size: metadata.filter(|_| !is_dir).map(fs::Metadata::len),
            last_modified: metadata.and_then(|m| m.modified().ok()),
            name,
            extension,
            entry_type,
            hash_entries: BTreeMap::new(),
            sub_entries: None,
            artifact_metadata: None,
            version_metadata: None,
        }
    }

    /// Probe an arbitrary path.
    ///
    /// # Errors
    ///
    /// [`IndexError::NotFound`] when nothing exists at `path`; other IO
    /// failures map to the matching [`IndexError`] variant.
    pub fn probe(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let path = path.as_ref();
        let canonical =
            fs::canonicalize(path).map_err(|e| IndexError::from_io(path.to_path_buf(), e))?;
        let metadata =
            fs::metadata(&canonical).map_err(|e| IndexError::from_io(canonical.clone(), e))?;

        let location = canonical.parent().map(Path::to_path_buf).unwrap_or_default();
        let name = canonical
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| canonical.to_string_lossy().into_owned());

        Ok(Self::shallow(location, name, metadata.is_dir(), Some(&metadata)))
    }

    /// Full path of this entry.
    pub fn path(&self) -> PathBuf {
        self.location.join(&self.name)
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type.is_directory()
    }

    /// Whether this directory's children have been listed.
    pub fn is_resolved(&self) -> bool {
        self.sub_entries.is_some()
    }

    /// `name` with its last extension removed.
    pub fn name_without_extension(&self) -> &str {
        if self.extension.is_empty() && !self.name.ends_with('.') {
            return &self.name;
        }
        &self.name[..self.name.len() - self.extension.len() - 1]
    }

    /// A child by name, if resolved and present.
    pub fn child(&self, name: &str) -> Option<&Entry> {
        self.sub_entries.as_ref()?.get(name)
    }

    /// Resolved children in name order. Empty for shallow entries.
    pub fn children(&self) -> impl Iterator<Item = &Entry> {
        self.sub_entries.iter().flat_map(|m| m.values())
    }

    /// The checksum stored in this hash file.
    ///
    /// `None` for files of [`MAX_HASH_FILE_SIZE`] bytes or more, and for
    /// files that cannot be read.
    pub fn read_hash(&self) -> Option<String> {
        if !matches!(self.size, Some(s) if s < MAX_HASH_FILE_SIZE) {
            return None;
        }
        let content = fs::read_to_string(self.path()).ok()?;
        Some(content.trim().to_string())
    }
}

fn extension_of(name: &str) -> &str {
    name.rfind('.').map(|i| &name[i + 1..]).unwrap_or("")
}
