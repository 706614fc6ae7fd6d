use std::fmt;
use std::fs;
use std::path::Path;

use quick_xml::de::from_str;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::IndexError;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// `groupId:artifactId:version` of a published artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactCoordinates {
    pub group_id:    String,
    pub artifact_id: String,
    pub version:     String,
}

impl ArtifactCoordinates {
    /// Repository-relative directory of this version:
    /// `<group path>/<artifactId>/<version>`.
    pub fn path_from_root(&self) -> String {
        format!(
            "{}/{}/{}",
            self.group_id.replace('.', "/"),
            self.artifact_id,
            self.version
        )
    }
}

impl fmt::Display for ArtifactCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// What an artifact directory's `maven-metadata.xml` says about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactMetadata {
    pub group_id:       Option<String>,
    pub artifact_id:    Option<String>,
    /// Name of the child directory holding the newest version.
    pub latest_version: Option<String>,
}

/// What a version directory's POM says about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactVersionMetadata {
    pub coordinates:     ArtifactCoordinates,
    pub description:     Option<String>,
    pub website:         Option<String>,
    pub sources_website: Option<String>,
    /// Set when this version has moved to other coordinates.
    pub relocated_to:    Option<ArtifactCoordinates>,
}

// ---------------------------------------------------------------------------
// Wire documents
// ---------------------------------------------------------------------------

/// `maven-metadata.xml`, only the fields the index shows.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct MetadataDocument {
    #[serde(default)]
    group_id: Option<String>,
    #[serde(default)]
    artifact_id: Option<String>,
    #[serde(default)]
    versioning: Option<Versioning>,
}

#[derive(Debug, Deserialize, Default)]
struct Versioning {
    #[serde(default)]
    latest: Option<String>,
    #[serde(default)]
    release: Option<String>,
}

/// Minimal POM model.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PomDocument {
    #[serde(default)]
    group_id: Option<String>,
    #[serde(default)]
    artifact_id: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    parent: Option<PomParent>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    scm: Option<PomScm>,
    #[serde(default)]
    distribution_management: Option<PomDistributionManagement>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PomParent {
    #[serde(default)]
    group_id: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct PomScm {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct PomDistributionManagement {
    #[serde(default)]
    relocation: Option<PomRelocation>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PomRelocation {
    #[serde(default)]
    group_id: Option<String>,
    #[serde(default)]
    artifact_id: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

/// Blank text counts as absent.
fn text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

impl ArtifactMetadata {
    /// Parse an artifact descriptor.
    ///
    /// `Ok(None)` when the document is well-formed but has no `<versioning>`
    /// section, i.e. does not describe an artifact.
    pub fn from_xml(xml: &str) -> Result<Option<Self>, String> {
        let doc: MetadataDocument = from_str(xml).map_err(|e| e.to_string())?;
        let Some(versioning) = doc.versioning else {
            return Ok(None);
        };

        Ok(Some(Self {
            group_id:       text(doc.group_id),
            artifact_id:    text(doc.artifact_id),
            latest_version: text(versioning.latest).or_else(|| text(versioning.release)),
        }))
    }
}

impl ArtifactVersionMetadata {
    /// Parse a version descriptor (POM).
    ///
    /// `groupId` and `version` fall back to the `<parent>` block. Relocation
    /// fields left out default to this POM's own coordinates.
    pub fn from_xml(xml: &str) -> Result<Self, String> {
        let doc: PomDocument = from_str(xml).map_err(|e| e.to_string())?;
        let parent = doc.parent.unwrap_or_default();

        let coordinates = ArtifactCoordinates {
            group_id: text(doc.group_id)
                .or_else(|| text(parent.group_id))
                .ok_or("missing <groupId>")?,
            artifact_id: text(doc.artifact_id).ok_or("missing <artifactId>")?,
            version: text(doc.version)
                .or_else(|| text(parent.version))
                .ok_or("missing <version>")?,
        };

        let relocated_to = doc
            .distribution_management
            .and_then(|dm| dm.relocation)
            .map(|r| ArtifactCoordinates {
                group_id:    text(r.group_id).unwrap_or_else(|| coordinates.group_id.clone()),
                artifact_id: text(r.artifact_id).unwrap_or_else(|| coordinates.artifact_id.clone()),
                version:     text(r.version).unwrap_or_else(|| coordinates.version.clone()),
            });

        Ok(Self {
            description: text(doc.description),
            website: text(doc.url),
            sources_website: doc.scm.and_then(|scm| text(scm.url)),
            relocated_to,
            coordinates,
        })
    }
}

/// Read and parse an artifact descriptor file.
///
/// # Errors
///
/// IO failures, malformed markup and a missing `<versioning>` section all
/// surface as [`IndexError`]s; callers degrade them to "no metadata".
pub fn load_artifact_descriptor(path: &Path) -> Result<ArtifactMetadata, IndexError> {
    let xml = read(path)?;
    ArtifactMetadata::from_xml(&xml)
        .map_err(|message| descriptor_error(path, message))?
        .ok_or_else(|| descriptor_error(path, "no <versioning> section".to_string()))
}

/// Read and parse a version descriptor file.
///
/// # Errors
///
/// IO failures, malformed markup and missing coordinates.
pub fn load_version_descriptor(path: &Path) -> Result<ArtifactVersionMetadata, IndexError> {
    let xml = read(path)?;
    ArtifactVersionMetadata::from_xml(&xml).map_err(|message| descriptor_error(path, message))
}

/// Like [`load_artifact_descriptor`], with failures logged and dropped.
pub fn parse_artifact_descriptor(path: &Path) -> Option<ArtifactMetadata> {
    load_artifact_descriptor(path)
        .inspect_err(|e| warn!("Ignoring artifact descriptor: {}", e))
        .ok()
}

/// Like [`load_version_descriptor`], with failures logged and dropped.
pub fn parse_version_descriptor(path: &Path) -> Option<ArtifactVersionMetadata> {
    load_version_descriptor(path)
        .inspect_err(|e| warn!("Ignoring version descriptor: {}", e))
        .ok()
}

fn read(path: &Path) -> Result<String, IndexError> {
    debug!("Reading descriptor {:?}", path);
    fs::read_to_string(path).map_err(|source| IndexError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn descriptor_error(path: &Path, message: String) -> IndexError {
    IndexError::Descriptor {
        path: path.to_path_buf(),
        message,
    }
}
