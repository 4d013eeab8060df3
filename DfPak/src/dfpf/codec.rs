//! SPDX-FileCopyrightText: 2025 CyberDeco
//!
//! SPDX-License-Identifier: MIT
//!
//! Packing and unpacking of the 16-byte directory records.
//!
//! Two incompatible layouts exist and nothing in the file says which one is in
//! use, so the caller always picks the [`SchemaProfile`].

use std::io::Cursor;
use std::str::FromStr;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Deserialize;

use super::{CompressionKind, DirectoryEntry, ENTRY_SIZE, EntryResidual};
use crate::error::{Error, Result};

/// Deflate bit in the flags byte of a plain record
const PLAIN_DEFLATE_FLAG: u8 = 0x08;

/// Compression bits in the flags byte of an obfuscated record
const OBFUSCATED_KIND_MASK: u8 = 0x06;

/// Bit layout of a directory record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaProfile {
    /// Profile A: split, obfuscated length fields, three compression kinds
    #[default]
    #[serde(alias = "a")]
    Obfuscated,
    /// Profile B: straight length fields, no external compression
    #[serde(alias = "b")]
    Plain,
}

impl SchemaProfile {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaProfile::Obfuscated => "obfuscated",
            SchemaProfile::Plain => "plain",
        }
    }

    /// Decode the record of entry `index`.
    pub fn decode(self, index: usize, record: &[u8; ENTRY_SIZE]) -> Result<DirectoryEntry> {
        let mut reader = Cursor::new(&record[..]);
        match self {
            SchemaProfile::Obfuscated => decode_obfuscated(&mut reader),
            SchemaProfile::Plain => decode_plain(index, &mut reader),
        }
    }

    /// Encode `entry` back into its 16-byte record.
    ///
    /// Fails when a field does not fit its packed width, or when the entry
    /// carries residual bits of the other profile.
    pub fn encode(self, index: usize, entry: &DirectoryEntry) -> Result<[u8; ENTRY_SIZE]> {
        let mut record = [0u8; ENTRY_SIZE];
        let mut writer = Cursor::new(&mut record[..]);
        match (self, entry.residual) {
            (
                SchemaProfile::Obfuscated,
                EntryResidual::Obfuscated {
                    length_difference,
                    length_pad,
                    name_pad,
                    flags,
                },
            ) => {
                let base = entry
                    .decompressed_length
                    .checked_sub(length_difference)
                    .ok_or(Error::FieldOverflow {
                        field: "decompressed length",
                        value: u64::from(entry.decompressed_length),
                        bits: 23,
                    })?;
                check_width("decompressed length", base, 23)?;
                check_width("length difference", length_difference, 18)?;
                check_width("compressed length", entry.compressed_length, 22)?;
                check_width("data offset", entry.data_offset, 29)?;
                check_width("name offset", entry.name_offset, 21)?;
                let data_format = entry.data_format.unwrap_or(0);
                check_width("data format", u32::from(data_format), 3)?;

                writer.write_u24::<BigEndian>((base << 1) | (length_difference >> 17))?;
                writer.write_u16::<BigEndian>(((length_difference >> 1) & 0xffff) as u16)?;
                writer.write_u24::<BigEndian>(
                    ((length_difference & 1) << 23)
                        | (entry.compressed_length << 1)
                        | u32::from(length_pad & 1),
                )?;
                writer.write_u24::<BigEndian>(entry.data_offset >> 5)?;
                writer.write_u8((((entry.data_offset & 0x1f) as u8) << 3) | data_format)?;
                writer.write_u24::<BigEndian>((entry.name_offset << 3) | u32::from(name_pad & 7))?;
                writer.write_u8((flags & !OBFUSCATED_KIND_MASK) | (entry.compression.code() << 1))?;
            }
            (
                SchemaProfile::Plain,
                EntryResidual::Plain {
                    name_pad,
                    reserved,
                    offset_pad,
                    length_pad,
                    flags,
                },
            ) => {
                if entry.compressed_length > entry.decompressed_length {
                    return Err(Error::LengthInconsistency {
                        index,
                        compressed: entry.compressed_length,
                        decompressed: entry.decompressed_length,
                    });
                }
                check_width("decompressed length", entry.decompressed_length, 24)?;
                check_width("compressed length", entry.compressed_length, 20)?;
                check_width("data offset", entry.data_offset, 29)?;
                check_width("name offset", entry.name_offset, 21)?;
                if entry.data_offset & 0x1f != 0 {
                    return Err(Error::FieldOverflow {
                        field: "data offset alignment",
                        value: u64::from(entry.data_offset),
                        bits: 5,
                    });
                }
                let deflate = match entry.compression {
                    CompressionKind::None => 0,
                    CompressionKind::Deflate => PLAIN_DEFLATE_FLAG,
                    CompressionKind::External => {
                        return Err(Error::UnknownCompressionKind {
                            code: CompressionKind::External.code(),
                        });
                    }
                };

                writer.write_u24::<BigEndian>(entry.decompressed_length)?;
                writer.write_u24::<BigEndian>((entry.name_offset << 3) | u32::from(name_pad & 7))?;
                writer.write_u16::<BigEndian>(reserved)?;
                writer.write_u24::<BigEndian>(entry.data_offset >> 5)?;
                writer.write_u8(offset_pad)?;
                writer.write_u24::<BigEndian>(
                    (entry.compressed_length << 4) | u32::from(length_pad & 0xf),
                )?;
                writer.write_u8((flags & !PLAIN_DEFLATE_FLAG) | deflate)?;
            }
            (profile, _) => {
                return Err(Error::ProfileMismatch {
                    index,
                    profile: profile.as_str(),
                });
            }
        }

        Ok(record)
    }
}

impl FromStr for SchemaProfile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "a" | "obfuscated" => Ok(SchemaProfile::Obfuscated),
            "b" | "plain" => Ok(SchemaProfile::Plain),
            _ => Err(Error::UnknownProfile(s.to_string())),
        }
    }
}

fn check_width(field: &'static str, value: u32, bits: u32) -> Result<()> {
    if value >> bits == 0 {
        Ok(())
    } else {
        Err(Error::FieldOverflow {
            field,
            value: u64::from(value),
            bits,
        })
    }
}

fn decode_obfuscated(reader: &mut Cursor<&[u8]>) -> Result<DirectoryEntry> {
    // Lengths
    let raw_len1 = reader.read_u24::<BigEndian>()?;
    let raw_diff = reader.read_u16::<BigEndian>()?;
    let raw_len2 = reader.read_u24::<BigEndian>()?;

    let length_difference =
        (u32::from(raw_diff) << 1) | ((raw_len1 & 1) << 17) | (raw_len2 >> 23);
    let decompressed_length = (raw_len1 >> 1) + length_difference;
    let compressed_length = (raw_len2 & 0x7f_ffff) >> 1;

    // Offset, with its low bits folded into the format byte
    let raw_offset = reader.read_u24::<BigEndian>()?;
    let format_byte = reader.read_u8()?;
    let data_offset = (raw_offset << 5) | (u32::from(format_byte & 0xf8) >> 3);

    let raw_name = reader.read_u24::<BigEndian>()?;
    let flags = reader.read_u8()?;

    Ok(DirectoryEntry {
        name_offset: raw_name >> 3,
        decompressed_length,
        compressed_length,
        data_offset,
        data_format: Some(format_byte & 7),
        compression: CompressionKind::from_code((flags & OBFUSCATED_KIND_MASK) >> 1)?,
        residual: EntryResidual::Obfuscated {
            length_difference,
            length_pad: (raw_len2 & 1) as u8,
            name_pad: (raw_name & 7) as u8,
            flags: flags & !OBFUSCATED_KIND_MASK,
        },
    })
}

fn decode_plain(index: usize, reader: &mut Cursor<&[u8]>) -> Result<DirectoryEntry> {
    let decompressed_length = reader.read_u24::<BigEndian>()?;
    let raw_name = reader.read_u24::<BigEndian>()?;
    let reserved = reader.read_u16::<BigEndian>()?;
    let raw_offset = reader.read_u24::<BigEndian>()?;
    let offset_pad = reader.read_u8()?;
    let raw_len = reader.read_u24::<BigEndian>()?;
    let flags = reader.read_u8()?;

    let compressed_length = raw_len >> 4;
    if compressed_length > decompressed_length {
        return Err(Error::LengthInconsistency {
            index,
            compressed: compressed_length,
            decompressed: decompressed_length,
        });
    }

    let compression = if flags & PLAIN_DEFLATE_FLAG != 0 {
        CompressionKind::Deflate
    } else {
        CompressionKind::None
    };

    Ok(DirectoryEntry {
        name_offset: raw_name >> 3,
        decompressed_length,
        compressed_length,
        data_offset: raw_offset << 5,
        data_format: None,
        compression,
        residual: EntryResidual::Plain {
            name_pad: (raw_name & 7) as u8,
            reserved,
            offset_pad,
            length_pad: (raw_len & 0xf) as u8,
            flags: flags & !PLAIN_DEFLATE_FLAG,
        },
    })
}
