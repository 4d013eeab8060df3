//! Types for DFPF package handling
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use crate::error::{Error, Result};

/// Compression applied to an entry's payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionKind {
    /// Stored as-is
    None,
    /// Zlib-framed deflate stream
    Deflate,
    /// Xbox 360 LZX, handled by an external tool
    External,
}

impl CompressionKind {
    /// Parse the two-bit compression code of an obfuscated record
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            1 => Ok(CompressionKind::None),
            2 => Ok(CompressionKind::Deflate),
            3 => Ok(CompressionKind::External),
            _ => Err(Error::UnknownCompressionKind { code }),
        }
    }

    /// Two-bit code used by obfuscated records
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            CompressionKind::None => 1,
            CompressionKind::Deflate => 2,
            CompressionKind::External => 3,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionKind::None => "none",
            CompressionKind::Deflate => "zlib",
            CompressionKind::External => "lzx",
        }
    }
}

/// Bits of a record that carry no logical field but must survive a rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryResidual {
    /// Obfuscated (profile A) records
    Obfuscated {
        /// Amount subtracted from the decompressed length before packing
        length_difference: u32,
        /// Low bit of the compressed length field
        length_pad: u8,
        /// Low 3 bits of the name field
        name_pad: u8,
        /// Flags byte with the compression bits cleared
        flags: u8,
    },
    /// Plain (profile B) records
    Plain {
        /// Low 3 bits of the name field
        name_pad: u8,
        /// 16-bit field following the name
        reserved: u16,
        /// Byte following the offset
        offset_pad: u8,
        /// Low 4 bits of the compressed length field
        length_pad: u8,
        /// Flags byte with the deflate bit cleared
        flags: u8,
    },
}

/// One decoded directory record.
///
/// The name is not stored; resolve `name_offset` through the package's
/// [`StringsTable`](super::StringsTable).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Offset of the name relative to the start of the strings table
    pub name_offset: u32,
    /// Size of the payload once decompressed
    pub decompressed_length: u32,
    /// Size of the payload in the data file
    pub compressed_length: u32,
    /// Offset of the payload in the data file
    pub data_offset: u32,
    /// Opaque 3-bit format tag (profile A only)
    pub data_format: Option<u8>,
    /// Payload compression
    pub compression: CompressionKind,
    /// Profile-specific leftover bits
    pub residual: EntryResidual,
}

impl DirectoryEntry {
    /// Copy of this entry whose payload moved to `data_offset`.
    #[must_use]
    pub fn relocated(&self, data_offset: u32) -> Self {
        Self {
            data_offset,
            ..*self
        }
    }

    /// Copy of this entry describing a freshly compressed replacement payload.
    ///
    /// The obfuscation remainder is carried over when it still fits under the
    /// new decompressed length and reset otherwise.
    #[must_use]
    pub fn replaced(&self, decompressed_length: u32, compressed_length: u32, data_offset: u32) -> Self {
        let residual = match self.residual {
            EntryResidual::Obfuscated {
                length_difference,
                name_pad,
                flags,
                ..
            } => EntryResidual::Obfuscated {
                length_difference: if length_difference <= decompressed_length {
                    length_difference
                } else {
                    0
                },
                length_pad: 0,
                name_pad,
                flags,
            },
            plain @ EntryResidual::Plain { .. } => plain,
        };

        Self {
            decompressed_length,
            compressed_length,
            data_offset,
            residual,
            ..*self
        }
    }
}

/// Progress information during package operations
#[derive(Debug, Clone)]
pub struct PackageProgress {
    /// Current operation phase
    pub phase: PackagePhase,
    /// Number of items processed before this one
    pub current: usize,
    /// Total number of items
    pub total: usize,
    /// Logical name of the entry being processed (if applicable)
    pub current_file: Option<String>,
}

impl PackageProgress {
    /// Create a new progress update
    #[must_use]
    pub fn new(phase: PackagePhase, current: usize, total: usize) -> Self {
        Self {
            phase,
            current,
            total,
            current_file: None,
        }
    }

    /// Create a progress update with an entry name
    #[must_use]
    pub fn with_file(
        phase: PackagePhase,
        current: usize,
        total: usize,
        file: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            current,
            total,
            current_file: Some(file.into()),
        }
    }

    /// Human-readable status line, e.g. `Extracting data/foo...`
    #[must_use]
    pub fn message(&self) -> String {
        match &self.current_file {
            Some(name) => format!("{} {name}...", self.phase.verb()),
            None => self.phase.as_str().to_string(),
        }
    }

    /// Get the progress percentage (0.0 - 1.0)
    #[must_use]
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.current as f32 / self.total as f32
        }
    }
}

/// Phase of a package operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackagePhase {
    /// Parsing the header and directory
    ReadingDirectory,
    /// Writing extracted payloads
    ExtractingFiles,
    /// Compressing replacement payloads
    InsertingFiles,
    /// Writing the rebuilt header and data file
    WritingPackage,
    /// Operation complete
    Complete,
}

impl PackagePhase {
    /// Get a human-readable description of this phase
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReadingDirectory => "Reading directory",
            Self::ExtractingFiles => "Extracting files",
            Self::InsertingFiles => "Inserting files",
            Self::WritingPackage => "Writing package",
            Self::Complete => "Complete",
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Self::ReadingDirectory => "Reading",
            Self::ExtractingFiles => "Extracting",
            Self::InsertingFiles => "Inserting",
            Self::WritingPackage => "Writing",
            Self::Complete => "Finished",
        }
    }
}
