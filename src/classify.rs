//! Name/extension heuristics that tag a single filesystem entry.
//!
//! Rules are evaluated top to bottom and the first match wins. Directories
//! always start as [`EntryType::OtherDir`]; only the resolver promotes them
//! once their contents are known.

use std::sync::LazyLock;

use regex::Regex;

use crate::entry::EntryType;

/// The facts a classification rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct Probe<'a> {
    pub name:      &'a str,
    pub extension: &'a str,
    pub is_dir:    bool,
}

type Rule = (fn(&Probe<'_>) -> bool, EntryType);

const RULES: &[Rule] = &[
    (is_directory,       EntryType::OtherDir),
    (is_gradle_module,   EntryType::GradleModuleFile),
    (is_maven_pom,       EntryType::MavenPomFile),
    (is_maven_metadata,  EntryType::MavenMetadataFile),
    (is_hash,            EntryType::HashFile),
];

/// Assign the provisional type of an entry.
///
/// Anything no rule claims is [`EntryType::OtherFile`], which the resolver
/// may later turn into an artifact or sources file.
pub fn classify(name: &str, extension: &str, is_dir: bool) -> EntryType {
    let probe = Probe { name, extension, is_dir };
    RULES
        .iter()
        .find(|(rule, _)| rule(&probe))
        .map(|(_, ty)| *ty)
        .unwrap_or(EntryType::OtherFile)
}

/// Whether `name` is one of the artifact descriptor file names.
pub fn is_maven_metadata_name(name: &str) -> bool {
    name == "maven-metadata.xml" || name == "maven-metadata-local.xml"
}

/// `…sources.<ext>` with `sources` starting at a word boundary, any case.
pub fn is_sources_name(name: &str) -> bool {
    static SOURCES: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)\bsources\.[^.]+$").expect("static regex is valid")
    });
    SOURCES.is_match(name)
}

/// Tag for an [`EntryType::OtherFile`] found in a version directory.
pub(crate) fn reclassify_in_version_dir(name: &str) -> EntryType {
    if is_sources_name(name) {
        EntryType::SourcesArtifactFile
    } else {
        EntryType::ArtifactFile
    }
}

fn is_directory(p: &Probe<'_>) -> bool {
    p.is_dir
}

fn is_gradle_module(p: &Probe<'_>) -> bool {
    p.extension == "module"
}

fn is_maven_pom(p: &Probe<'_>) -> bool {
    p.extension == "pom"
}

fn is_maven_metadata(p: &Probe<'_>) -> bool {
    is_maven_metadata_name(p.name)
}

fn is_hash(p: &Probe<'_>) -> bool {
    p.extension == "md5" || p.extension.starts_with("sha")
}
