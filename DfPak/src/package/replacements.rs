//! Mapping from logical package names to replacement payloads

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;
use indexmap::map::Entry;
use walkdir::WalkDir;

use crate::error::Result;

/// Where a replacement payload comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplacementSource {
    /// Payload already in memory
    Bytes(Vec<u8>),
    /// Payload read from disk when the package is rebuilt
    File(PathBuf),
}

impl ReplacementSource {
    /// Read the payload.
    pub fn load(&self) -> Result<Cow<'_, [u8]>> {
        match self {
            ReplacementSource::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
            ReplacementSource::File(path) => Ok(Cow::Owned(std::fs::read(path)?)),
        }
    }
}

/// Replacement payloads keyed by logical name, in insertion order.
///
/// Names are compared exactly (case-sensitive, `/`-separated, no suffix).
/// The first source registered for a name wins.
#[derive(Debug, Clone, Default)]
pub struct Replacements {
    sources: IndexMap<String, ReplacementSource>,
}

impl Replacements {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `source` for `name`. Returns `false` if the name was already taken.
    pub fn insert(&mut self, name: impl Into<String>, source: ReplacementSource) -> bool {
        match self.sources.entry(name.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(source);
                true
            }
        }
    }

    /// Register an in-memory payload for `name`.
    pub fn insert_bytes(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> bool {
        self.insert(name, ReplacementSource::Bytes(bytes.into()))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ReplacementSource> {
        self.sources.get(name)
    }

    /// Registered names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Collect every file below `root`, keyed by its logical name.
    ///
    /// Files are visited in file-name order so that collisions such as
    /// `a/b.bin` and `a/b.dds` resolve the same way on every platform.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WalkDirError`](crate::Error::WalkDirError) if the
    /// directory cannot be traversed.
    pub fn from_directory<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        let mut replacements = Self::new();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Some(name) = logical_name(root, entry.path()) else {
                tracing::warn!("Skipping replacement with unusable name: {}", entry.path().display());
                continue;
            };

            if !replacements.insert(name.clone(), ReplacementSource::File(entry.into_path())) {
                tracing::debug!("Ignoring duplicate replacement for {name}");
            }
        }

        tracing::info!(
            "Found {} replacement files in {}",
            replacements.len(),
            root.display()
        );
        Ok(replacements)
    }
}

impl FromIterator<(String, Vec<u8>)> for Replacements {
    fn from_iter<I: IntoIterator<Item = (String, Vec<u8>)>>(iter: I) -> Self {
        let mut replacements = Self::new();
        for (name, bytes) in iter {
            replacements.insert_bytes(name, bytes);
        }
        replacements
    }
}

/// Logical package name of `path` below `root`: the relative path with its
/// last extension removed and `/` as separator.
///
/// Returns `None` if `path` is not below `root` or is not valid UTF-8.
#[must_use]
pub fn logical_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?.with_extension("");

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
