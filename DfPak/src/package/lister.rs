//! Directory listing without touching the data file

use crate::dfpf::{CompressionKind, PackageDirectory, SchemaProfile};
use crate::error::Result;

/// One row of a package listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntryInfo {
    /// Position in the entry table
    pub index: usize,
    /// Logical name
    pub name: String,
    pub decompressed_length: u32,
    pub compressed_length: u32,
    pub data_offset: u32,
    /// Opaque format tag (obfuscated profile only)
    pub data_format: Option<u8>,
    pub compression: CompressionKind,
}

/// List every entry of `header` in table order.
pub fn list_entries(header: &[u8], profile: SchemaProfile) -> Result<Vec<PackageEntryInfo>> {
    let directory = PackageDirectory::parse(header, profile)?;
    let strings = directory.strings_table(header);

    directory
        .entries()
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            Ok(PackageEntryInfo {
                index,
                name: strings.resolve(entry.name_offset)?,
                decompressed_length: entry.decompressed_length,
                compressed_length: entry.compressed_length,
                data_offset: entry.data_offset,
                data_format: entry.data_format,
                compression: entry.compression,
            })
        })
        .collect()
}
