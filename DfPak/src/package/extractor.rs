//! Read path: decompress every entry of a package into a directory tree

use std::path::{Component, Path, PathBuf};

use super::{PackageOptions, ProgressCallback};
use crate::compression::CompressionBackend;
use crate::dfpf::{DirectoryEntry, PackageDirectory, PackagePhase, PackageProgress};
use crate::error::{Error, Result};

/// Result of an extraction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    /// Number of entries written
    pub extracted: usize,
    /// Total decompressed bytes written
    pub bytes_written: u64,
}

/// Extract every entry of `header`/`data` below `output_root`.
///
/// Entries are processed in table order; a later entry with the same name
/// overwrites an earlier one. Nothing is written if the header is rejected.
///
/// # Errors
///
/// Returns [`Error::InvalidMagic`] before touching the file system if the
/// header is not a package, [`Error::InvalidPath`] for names that would escape
/// `output_root`, and any payload or decompression error.
pub fn extract_package(
    header: &[u8],
    data: &[u8],
    output_root: &Path,
    options: &PackageOptions,
    progress: ProgressCallback,
) -> Result<ExtractSummary> {
    progress(&PackageProgress::new(PackagePhase::ReadingDirectory, 0, 1));
    let directory = PackageDirectory::parse(header, options.profile)?;
    let strings = directory.strings_table(header);

    std::fs::create_dir_all(output_root)?;

    let total = directory.len();
    let mut summary = ExtractSummary::default();

    for (index, entry) in directory.entries().iter().enumerate() {
        let name = strings.resolve(entry.name_offset)?;
        progress(&PackageProgress::with_file(
            PackagePhase::ExtractingFiles,
            index,
            total,
            name.as_str(),
        ));

        let payload = payload(data, index, entry)?;
        let backend = CompressionBackend::for_kind(entry.compression, &options.external_tool);
        let contents = backend.decompress(payload, entry.decompressed_length as usize)?;

        let output_path = output_path(output_root, &name, &options.output_suffix)?;
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&output_path, &contents)?;

        tracing::debug!(
            "Extracted {name} ({} -> {} bytes, {})",
            entry.compressed_length,
            contents.len(),
            entry.compression.as_str()
        );

        summary.extracted += 1;
        summary.bytes_written += contents.len() as u64;
    }

    progress(&PackageProgress::new(PackagePhase::Complete, total, total));
    tracing::info!(
        "Extracted {} entries ({} bytes) to {}",
        summary.extracted,
        summary.bytes_written,
        output_root.display()
    );

    Ok(summary)
}

/// Stored payload bytes of `entry` in the data file
pub(crate) fn payload<'a>(data: &'a [u8], index: usize, entry: &DirectoryEntry) -> Result<&'a [u8]> {
    let start = entry.data_offset as usize;
    let end = start.checked_add(entry.compressed_length as usize);

    end.and_then(|end| data.get(start..end))
        .ok_or(Error::PayloadOutOfRange {
            index,
            offset: entry.data_offset,
            length: entry.compressed_length,
            data_len: data.len(),
        })
}

/// Output location of a logical name: `root/name` plus `suffix`.
///
/// Names are `/`-separated; empty, `.` and `..` components, absolute names
/// and drive prefixes are rejected.
pub(crate) fn output_path(root: &Path, name: &str, suffix: &str) -> Result<PathBuf> {
    let invalid = || Error::InvalidPath(name.to_string());

    let mut path = root.to_path_buf();
    let mut parts = name.split('/').peekable();
    while let Some(part) = parts.next() {
        if part.is_empty() || part.contains(['\\', ':']) {
            return Err(invalid());
        }
        if !matches!(Path::new(part).components().next(), Some(Component::Normal(_))) {
            return Err(invalid());
        }

        if parts.peek().is_some() {
            path.push(part);
        } else {
            path.push(format!("{part}{suffix}"));
        }
    }

    Ok(path)
}
