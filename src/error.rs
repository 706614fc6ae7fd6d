use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    // Probe
    #[error("path not found: {0:?}")]
    NotFound(PathBuf),

    #[error("not a directory: {0:?}")]
    NotADirectory(PathBuf),

    // Traversal
    #[error("permission denied: {0:?}")]
    PermissionDenied(PathBuf),

    #[error("symlink loop at {0:?}")]
    SymlinkLoop(PathBuf),

    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("walk error: {0}")]
    Walk(String),

    // Descriptors
    #[error("unusable descriptor {path:?}: {message}")]
    Descriptor { path: PathBuf, message: String },
}

impl IndexError {
    /// The path this error occurred at, if applicable.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::NotFound(p)
            | Self::NotADirectory(p)
            | Self::PermissionDenied(p)
            | Self::SymlinkLoop(p)
            | Self::Io { path: p, .. }
            | Self::Descriptor { path: p, .. } => Some(p),
            Self::Walk(_) => None,
        }
    }

    /// Whether resolution carries on after this error.
    ///
    /// Unreadable directories, vanished children, symlink loops and broken
    /// descriptors only degrade the node they affect. A requested path that
    /// does not exist (or is not a directory) fails the whole request.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::NotFound(_) | Self::NotADirectory(_))
    }

    /// Map an IO error at `path` onto the matching variant.
    pub(crate) fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source },
        }
    }
}
