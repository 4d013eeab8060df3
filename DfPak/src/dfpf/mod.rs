//! SPDX-FileCopyrightText: 2025 CyberDeco
//!
//! SPDX-License-Identifier: MIT
//!
//! DFPF package format: header parsing, directory records and the strings table.
//!
//! A package is split across two files. The header (`.~h`) holds the directory
//! and the name blob; the data file (`.~p`) holds the payloads, each starting on
//! a [`BLOCK_SIZE`] boundary.

mod codec;
mod directory;
mod strings;
mod types;

pub use codec::SchemaProfile;
pub use directory::{DirectoryHeader, PackageDirectory};
pub use strings::StringsTable;
pub use types::*;

/// DFPF magic bytes
pub const MAGIC: [u8; 4] = *b"dfpf";

/// Offset of the strings table fields (offset, flags, length) and the entry count
pub const STRINGS_TABLE_FIELDS_OFFSET: usize = 0x14;

/// Offset of the entry table offset field (0x18 bytes past the entry count)
pub const ENTRY_TABLE_OFFSET_FIELD: usize = 0x3C;

/// Size of one packed directory record
pub const ENTRY_SIZE: usize = 16;

/// Payload alignment in the data file (the console's sector size)
pub const BLOCK_SIZE: u64 = 0x800;

/// Round `offset` up to the next [`BLOCK_SIZE`] boundary.
#[must_use]
pub fn align_to_block(offset: u64) -> u64 {
    (offset + BLOCK_SIZE - 1) & !(BLOCK_SIZE - 1)
}
