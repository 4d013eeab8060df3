//! SPDX-FileCopyrightText: 2025 CyberDeco
//!
//! SPDX-License-Identifier: MIT
//!
//! Top-level header and entry table of a DFPF package

use byteorder::{BigEndian, ByteOrder};

use super::{
    DirectoryEntry, ENTRY_SIZE, ENTRY_TABLE_OFFSET_FIELD, MAGIC, STRINGS_TABLE_FIELDS_OFFSET,
    SchemaProfile, StringsTable,
};
use crate::error::{Error, Result};

/// Fixed header fields of a package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryHeader {
    /// Magic bytes (always "dfpf" once parsed)
    pub magic: [u8; 4],
    /// Absolute offset of the name blob
    pub strings_table_offset: u32,
    /// Opaque, preserved but never interpreted
    pub strings_table_flags: u32,
    /// Length of the name blob
    pub strings_table_length: u32,
    /// Number of directory records
    pub entry_count: u32,
    /// Absolute offset of the first directory record
    pub entry_table_offset: u32,
}

impl DirectoryHeader {
    /// Read the fixed header fields, checking the magic first.
    pub fn read(header: &[u8]) -> Result<Self> {
        let mut magic = [0u8; 4];
        let available = header.len().min(4);
        magic[..available].copy_from_slice(&header[..available]);
        if magic != MAGIC {
            return Err(Error::InvalidMagic { found: magic });
        }

        let fields = STRINGS_TABLE_FIELDS_OFFSET;
        Ok(Self {
            magic,
            strings_table_offset: read_u32_at(header, fields)?,
            strings_table_flags: read_u32_at(header, fields + 4)?,
            strings_table_length: read_u32_at(header, fields + 8)?,
            entry_count: read_u32_at(header, fields + 12)?,
            entry_table_offset: read_u32_at(header, ENTRY_TABLE_OFFSET_FIELD)?,
        })
    }

    /// Write the fixed header fields back into `header`.
    ///
    /// Bytes between the fields are left untouched.
    pub fn write(&self, header: &mut [u8]) -> Result<()> {
        slice_at_mut(header, 0, 4)?.copy_from_slice(&self.magic);

        let fields = STRINGS_TABLE_FIELDS_OFFSET;
        let values = [
            self.strings_table_offset,
            self.strings_table_flags,
            self.strings_table_length,
            self.entry_count,
        ];
        for (i, value) in values.into_iter().enumerate() {
            BigEndian::write_u32(slice_at_mut(header, fields + i * 4, 4)?, value);
        }
        BigEndian::write_u32(
            slice_at_mut(header, ENTRY_TABLE_OFFSET_FIELD, 4)?,
            self.entry_table_offset,
        );

        Ok(())
    }
}

/// Parsed package directory: header fields plus every entry in table order.
#[derive(Debug, Clone)]
pub struct PackageDirectory {
    header: DirectoryHeader,
    profile: SchemaProfile,
    entries: Vec<DirectoryEntry>,
}

impl PackageDirectory {
    /// Parse the header and all directory records of `header`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMagic`] if the buffer does not start with `dfpf`,
    /// [`Error::UnexpectedEof`] if the entry table runs past the buffer, and any
    /// record decoding error of `profile`.
    pub fn parse(header: &[u8], profile: SchemaProfile) -> Result<Self> {
        let fields = DirectoryHeader::read(header)?;

        let count = fields.entry_count as usize;
        let mut entries = Vec::with_capacity(count.min(header.len() / ENTRY_SIZE));
        for index in 0..count {
            let start = fields.entry_table_offset as usize + index * ENTRY_SIZE;
            let record: &[u8; ENTRY_SIZE] = slice_at(header, start, ENTRY_SIZE)?
                .try_into()
                .map_err(|_| Error::UnexpectedEof { offset: start, needed: ENTRY_SIZE })?;
            entries.push(profile.decode(index, record)?);
        }

        tracing::debug!(
            "Parsed {} directory entries ({} profile), strings table at {:#x}",
            entries.len(),
            profile.as_str(),
            fields.strings_table_offset
        );

        Ok(Self {
            header: fields,
            profile,
            entries,
        })
    }

    #[must_use]
    pub fn header(&self) -> &DirectoryHeader {
        &self.header
    }

    #[must_use]
    pub fn profile(&self) -> SchemaProfile {
        self.profile
    }

    #[must_use]
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names view over the same header buffer this directory was parsed from
    #[must_use]
    pub fn strings_table<'a>(&self, header: &'a [u8]) -> StringsTable<'a> {
        StringsTable::new(header, self.header.strings_table_offset)
    }

    /// Absolute header offset of record `index`
    #[must_use]
    pub fn record_offset(&self, index: usize) -> usize {
        self.header.entry_table_offset as usize + index * ENTRY_SIZE
    }

    /// Re-encode `entry` into the record slot `index` of `header` and keep
    /// the in-memory copy in sync.
    pub fn patch_entry(
        &mut self,
        header: &mut [u8],
        index: usize,
        entry: DirectoryEntry,
    ) -> Result<()> {
        let record = self.profile.encode(index, &entry)?;
        let start = self.record_offset(index);
        slice_at_mut(header, start, ENTRY_SIZE)?.copy_from_slice(&record);

        if let Some(slot) = self.entries.get_mut(index) {
            *slot = entry;
        }
        Ok(())
    }
}

fn slice_at(bytes: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    bytes
        .get(offset..offset + len)
        .ok_or(Error::UnexpectedEof { offset, needed: len })
}

fn slice_at_mut(bytes: &mut [u8], offset: usize, len: usize) -> Result<&mut [u8]> {
    bytes
        .get_mut(offset..offset + len)
        .ok_or(Error::UnexpectedEof { offset, needed: len })
}

fn read_u32_at(bytes: &[u8], offset: usize) -> Result<u32> {
    slice_at(bytes, offset, 4).map(BigEndian::read_u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dfpf::{CompressionKind, EntryResidual};

    fn build_header(profile: SchemaProfile, entries: &[DirectoryEntry], names: &[u8]) -> Vec<u8> {
        let entry_table_offset = 0x40u32;
        let strings_table_offset = entry_table_offset + (entries.len() * ENTRY_SIZE) as u32;
        let mut header = vec![0u8; strings_table_offset as usize];
        header.extend_from_slice(names);

        DirectoryHeader {
            magic: MAGIC,
            strings_table_offset,
            strings_table_flags: 0x1234_5678,
            strings_table_length: names.len() as u32,
            entry_count: entries.len() as u32,
            entry_table_offset,
        }
        .write(&mut header)
        .unwrap();

        for (i, entry) in entries.iter().enumerate() {
            let record = profile.encode(i, entry).unwrap();
            let start = entry_table_offset as usize + i * ENTRY_SIZE;
            header[start..start + ENTRY_SIZE].copy_from_slice(&record);
        }
        header
    }

    fn plain_entry(name_offset: u32, length: u32, data_offset: u32) -> DirectoryEntry {
        DirectoryEntry {
            name_offset,
            decompressed_length: length,
            compressed_length: length,
            data_offset,
            data_format: None,
            compression: CompressionKind::None,
            residual: EntryResidual::Plain {
                name_pad: 0,
                reserved: 0,
                offset_pad: 0,
                length_pad: 0,
                flags: 0,
            },
        }
    }

    #[test]
    fn test_parse_directory() {
        let entries = [plain_entry(0, 10, 0), plain_entry(4, 3, 0x800)];
        let header = build_header(SchemaProfile::Plain, &entries, b"a/b\0c\0");

        let directory = PackageDirectory::parse(&header, SchemaProfile::Plain).unwrap();
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.entries(), &entries);
        assert_eq!(directory.header().strings_table_flags, 0x1234_5678);
        assert_eq!(directory.header().entry_table_offset, 0x40);

        let strings = directory.strings_table(&header);
        assert_eq!(strings.resolve(directory.entries()[0].name_offset).unwrap(), "a/b");
        assert_eq!(strings.resolve(directory.entries()[1].name_offset).unwrap(), "c");
    }

    #[test]
    fn test_parse_rejects_magic() {
        let mut header = build_header(SchemaProfile::Plain, &[], b"");
        header[0] = b'D';
        assert!(matches!(
            PackageDirectory::parse(&header, SchemaProfile::Plain),
            Err(Error::InvalidMagic { found }) if &found == b"Dfpf"
        ));
        assert!(PackageDirectory::parse(b"df", SchemaProfile::Plain)
            .unwrap_err()
            .is_invalid_magic());
    }

    #[test]
    fn test_parse_truncated_table() {
        let entries = [plain_entry(0, 10, 0)];
        let mut header = build_header(SchemaProfile::Plain, &entries, b"x\0");
        BigEndian::write_u32(&mut header[STRINGS_TABLE_FIELDS_OFFSET + 12..], 50);

        assert!(matches!(
            PackageDirectory::parse(&header, SchemaProfile::Plain),
            Err(Error::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_patch_entry_in_place() {
        let entries = [plain_entry(0, 10, 0), plain_entry(2, 20, 0x800)];
        let mut header = build_header(SchemaProfile::Plain, &entries, b"x\0y\0");
        let original = header.clone();

        let mut directory = PackageDirectory::parse(&header, SchemaProfile::Plain).unwrap();
        let moved = directory.entries()[1].relocated(0x1000);
        directory.patch_entry(&mut header, 1, moved).unwrap();

        let first_record = directory.record_offset(0);
        assert_eq!(
            header[first_record..first_record + ENTRY_SIZE],
            original[first_record..first_record + ENTRY_SIZE]
        );
        assert_eq!(directory.entries()[1].data_offset, 0x1000);

        let reparsed = PackageDirectory::parse(&header, SchemaProfile::Plain).unwrap();
        assert_eq!(reparsed.entries()[1], moved);
    }
}
