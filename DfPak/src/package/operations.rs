//! File-level package operations

use std::path::Path;

use tempfile::NamedTempFile;

use super::builder::{InsertSummary, rebuild_package};
use super::extractor::{ExtractSummary, extract_package};
use super::lister::{PackageEntryInfo, list_entries};
use super::{PackageOptions, ProgressCallback, Replacements};
use crate::error::{Error, Result};

/// High-level operations on a header (`.~h`) and data (`.~p`) file pair.
pub struct PackageOperations;

impl PackageOperations {
    /// Extract every entry of a package into `output_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if either package file cannot be read or an output
    /// file cannot be written, and [`Error::InvalidMagic`] (before anything is
    /// written) if the header is not a package.
    pub fn extract<P: AsRef<Path>>(
        header_path: P,
        data_path: P,
        output_dir: P,
        options: &PackageOptions,
    ) -> Result<ExtractSummary> {
        Self::extract_with_progress(header_path, data_path, output_dir, options, &|_| {})
    }

    /// Extract every entry of a package into `output_dir` with a progress callback.
    ///
    /// The callback receives one update per entry with its table index and name.
    ///
    /// # Errors
    ///
    /// See [`PackageOperations::extract`].
    pub fn extract_with_progress<P: AsRef<Path>>(
        header_path: P,
        data_path: P,
        output_dir: P,
        options: &PackageOptions,
        progress: ProgressCallback,
    ) -> Result<ExtractSummary> {
        let header = std::fs::read(header_path.as_ref())?;
        let data = std::fs::read(data_path.as_ref())?;

        tracing::info!(
            "Extracting {} ({} profile)",
            header_path.as_ref().display(),
            options.profile.as_str()
        );
        extract_package(&header, &data, output_dir.as_ref(), options, progress)
    }

    /// Replace payloads with the files found below `replacements_dir`.
    ///
    /// A file matches an entry when its path relative to `replacements_dir`,
    /// minus its last extension, equals the entry's name.
    ///
    /// # Errors
    ///
    /// See [`PackageOperations::insert_replacements_with_progress`].
    pub fn insert<P: AsRef<Path>>(
        header_path: P,
        data_path: P,
        replacements_dir: P,
        options: &PackageOptions,
    ) -> Result<InsertSummary> {
        Self::insert_with_progress(header_path, data_path, replacements_dir, options, &|_| {})
    }

    /// Replace payloads with the files found below `replacements_dir`, with a
    /// progress callback.
    ///
    /// # Errors
    ///
    /// See [`PackageOperations::insert_replacements_with_progress`].
    pub fn insert_with_progress<P: AsRef<Path>>(
        header_path: P,
        data_path: P,
        replacements_dir: P,
        options: &PackageOptions,
        progress: ProgressCallback,
    ) -> Result<InsertSummary> {
        let replacements = Replacements::from_directory(replacements_dir.as_ref())?;
        Self::insert_replacements_with_progress(header_path, data_path, &replacements, options, progress)
    }

    /// Rebuild a package with an explicit set of replacements.
    ///
    /// Both files are rebuilt in memory and written to temporary files next
    /// to the originals, which are then renamed over them. On any error the
    /// package is left untouched; if the header cannot be replaced after the
    /// data file was, the previous data file is written back.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if a package file cannot be read or replaced,
    /// [`Error::InvalidMagic`] if the header is not a package, and any
    /// compression or layout error from the rebuild.
    pub fn insert_replacements_with_progress<P: AsRef<Path>>(
        header_path: P,
        data_path: P,
        replacements: &Replacements,
        options: &PackageOptions,
        progress: ProgressCallback,
    ) -> Result<InsertSummary> {
        let header_path = header_path.as_ref();
        let data_path = data_path.as_ref();

        let header = std::fs::read(header_path)?;
        let data = std::fs::read(data_path)?;

        tracing::info!(
            "Inserting {} replacements into {} ({} profile)",
            replacements.len(),
            header_path.display(),
            options.profile.as_str()
        );
        let rebuilt = rebuild_package(&header, &data, replacements, options, progress)?;

        commit(header_path, &rebuilt.header, data_path, &rebuilt.data, &data)?;

        Ok(rebuilt.summary)
    }

    /// List the entries of a package header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the header cannot be read and
    /// [`Error::InvalidMagic`] if it is not a package.
    pub fn list<P: AsRef<Path>>(header_path: P, options: &PackageOptions) -> Result<Vec<PackageEntryInfo>> {
        let header = std::fs::read(header_path)?;
        list_entries(&header, options.profile)
    }
}

/// Replace both package files with their staged contents.
///
/// The data file is swapped in first. If the header then cannot be replaced,
/// `old_data` is written back so the pair stays consistent.
fn commit(header_path: &Path, header: &[u8], data_path: &Path, data: &[u8], old_data: &[u8]) -> Result<()> {
    let staged_data = stage(data_path, data)?;
    let staged_header = stage(header_path, header)?;
    staged_data.persist(data_path).map_err(|e| Error::Io(e.error))?;

    if let Err(e) = staged_header.persist(header_path) {
        tracing::error!(
            "Failed to replace {}, restoring {}",
            header_path.display(),
            data_path.display()
        );
        stage(data_path, old_data)?
            .persist(data_path)
            .map_err(|e| Error::Io(e.error))?;
        return Err(Error::Io(e.error));
    }
    Ok(())
}

/// Write `contents` to a temporary file in the directory of `target`
fn stage(target: &Path, contents: &[u8]) -> Result<NamedTempFile> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(dir)?;
    std::io::Write::write_all(&mut staged, contents)?;
    staged.as_file().sync_all()?;
    Ok(staged)
}
