//! SPDX-FileCopyrightText: 2025 CyberDeco
//!
//! SPDX-License-Identifier: MIT
//!
//! Write path: rebuild the data file with replaced payloads
//!
//! Replacement payloads are compressed first (optionally on the rayon pool),
//! then every entry is laid out in table order at the next block boundary and
//! its record is patched in a copy of the header. Nothing touches the disk
//! here; [`PackageOperations`](super::PackageOperations) persists the result.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use super::extractor::payload;
use super::{PackageOptions, ProgressCallback, ReplacementSource, Replacements};
use crate::compression::CompressionBackend;
use crate::dfpf::{
    BLOCK_SIZE, EntryResidual, PackageDirectory, PackagePhase, PackageProgress, align_to_block,
};
use crate::error::{Error, Result};

/// Result of an insert
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertSummary {
    /// Number of entries whose payload was replaced
    pub replaced: usize,
    /// Replacement names that matched no entry, in registration order
    pub unmatched: Vec<String>,
    /// Length of the rebuilt data file
    pub data_len: u64,
}

/// Rebuilt header and data file contents
#[derive(Debug, Clone)]
pub struct RebuiltPackage {
    /// Header with every record patched
    pub header: Vec<u8>,
    /// New data file, a multiple of the block size long
    pub data: Vec<u8>,
    pub summary: InsertSummary,
}

/// A replacement payload after compression
struct PreparedPayload {
    index: usize,
    decompressed_length: u32,
    compressed: Vec<u8>,
}

/// Rebuild `header`/`data` with the payloads in `replacements`.
///
/// Replaced entries keep their compression kind and data format; untouched
/// entries are copied verbatim and only move.
///
/// # Errors
///
/// Returns [`Error::InvalidMagic`] if the header is not a package,
/// [`Error::DataFileTooLarge`] if the new layout exceeds 32-bit offsets, and
/// any compression or record encoding error.
pub fn rebuild_package(
    header: &[u8],
    data: &[u8],
    replacements: &Replacements,
    options: &PackageOptions,
    progress: ProgressCallback,
) -> Result<RebuiltPackage> {
    progress(&PackageProgress::new(PackagePhase::ReadingDirectory, 0, 1));
    let mut directory = PackageDirectory::parse(header, options.profile)?;
    let strings = directory.strings_table(header);

    // Match entries against replacements by logical name
    let mut matched_names = HashSet::new();
    let mut pending = Vec::new();
    for (index, entry) in directory.entries().iter().enumerate() {
        let name = strings.resolve(entry.name_offset)?;
        if let Some(source) = replacements.get(&name) {
            pending.push((index, name.clone(), source));
            matched_names.insert(name);
        }
    }

    let unmatched: Vec<String> = replacements
        .names()
        .filter(|name| !matched_names.contains(*name))
        .map(str::to_string)
        .collect();
    for name in &unmatched {
        tracing::warn!("Replacement {name} matches no package entry");
    }

    // Compress replacements
    let total = pending.len();
    let processed = AtomicUsize::new(0);
    let entries = directory.entries();
    let prepare = |(index, name, source): &(usize, String, &ReplacementSource)| -> Result<PreparedPayload> {
        let current = processed.fetch_add(1, Ordering::SeqCst);
        progress(&PackageProgress::with_file(
            PackagePhase::InsertingFiles,
            current,
            total,
            name.as_str(),
        ));

        let raw = source.load()?;
        let entry = &entries[*index];
        let backend = CompressionBackend::for_kind(entry.compression, &options.external_tool);
        let compressed = backend.compress(&raw)?;

        let decompressed_length = u32::try_from(raw.len()).map_err(|_| Error::FieldOverflow {
            field: "decompressed length",
            value: raw.len() as u64,
            bits: 32,
        })?;

        tracing::debug!(
            "Compressed {name}: {} -> {} bytes ({})",
            raw.len(),
            compressed.len(),
            entry.compression.as_str()
        );

        Ok(PreparedPayload {
            index: *index,
            decompressed_length,
            compressed,
        })
    };

    let prepared: Vec<PreparedPayload> = if options.parallel_compression {
        pending.par_iter().map(prepare).collect::<Result<_>>()?
    } else {
        pending.iter().map(prepare).collect::<Result<_>>()?
    };

    // Lay out every entry in table order
    progress(&PackageProgress::new(
        PackagePhase::WritingPackage,
        0,
        directory.len(),
    ));

    let mut replaced_by_index: Vec<Option<&PreparedPayload>> = vec![None; directory.len()];
    for payload in &prepared {
        replaced_by_index[payload.index] = Some(payload);
    }

    let mut new_header = header.to_vec();
    let mut new_data = Vec::with_capacity(data.len());
    for (index, replacement) in replaced_by_index.iter().enumerate() {
        let entry = directory.entries()[index];
        let offset = u32::try_from(new_data.len()).map_err(|_| Error::DataFileTooLarge)?;

        let updated = match replacement {
            Some(replacement) => {
                let compressed_length = u32::try_from(replacement.compressed.len())
                    .map_err(|_| Error::DataFileTooLarge)?;
                if compressed_length > replacement.decompressed_length
                    && matches!(entry.residual, EntryResidual::Obfuscated { .. })
                {
                    tracing::warn!(
                        "Entry {index}: compressed payload ({compressed_length} bytes) is larger than its contents ({} bytes)",
                        replacement.decompressed_length
                    );
                }

                new_data.extend_from_slice(&replacement.compressed);
                entry.replaced(replacement.decompressed_length, compressed_length, offset)
            }
            None => {
                new_data.extend_from_slice(payload(data, index, &entry)?);
                entry.relocated(offset)
            }
        };

        new_data.resize(align_to_block(new_data.len() as u64) as usize, 0);
        directory.patch_entry(&mut new_header, index, updated)?;
    }

    if new_data.len() as u64 > u64::from(u32::MAX) + 1 {
        return Err(Error::DataFileTooLarge);
    }
    debug_assert_eq!(new_data.len() as u64 % BLOCK_SIZE, 0);

    let summary = InsertSummary {
        replaced: prepared.len(),
        unmatched,
        data_len: new_data.len() as u64,
    };

    progress(&PackageProgress::new(
        PackagePhase::Complete,
        directory.len(),
        directory.len(),
    ));
    tracing::info!(
        "Rebuilt package: {} of {} entries replaced, data file {} bytes",
        summary.replaced,
        directory.len(),
        summary.data_len
    );

    Ok(RebuiltPackage {
        header: new_header,
        data: new_data,
        summary,
    })
}
