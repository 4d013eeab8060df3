use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dfpak::compression::zlib;
use dfpak::dfpf::{
    BLOCK_SIZE, DirectoryHeader, ENTRY_SIZE, EntryResidual, MAGIC, align_to_block,
};
use dfpak::prelude::*;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// One file to put into a synthetic package
struct Fixture {
    name: &'static str,
    contents: Vec<u8>,
    compression: CompressionKind,
}

impl Fixture {
    fn new(name: &'static str, contents: impl Into<Vec<u8>>, compression: CompressionKind) -> Self {
        Self {
            name,
            contents: contents.into(),
            compression,
        }
    }
}

fn residual(profile: SchemaProfile, decompressed_length: u32) -> EntryResidual {
    match profile {
        SchemaProfile::Obfuscated => EntryResidual::Obfuscated {
            length_difference: decompressed_length.min(0x11),
            length_pad: 1,
            name_pad: 3,
            flags: 0x80,
        },
        SchemaProfile::Plain => EntryResidual::Plain {
            name_pad: 1,
            reserved: 0xBEEF,
            offset_pad: 0x7F,
            length_pad: 3,
            flags: 0x10,
        },
    }
}

/// Build header and data bytes the way the game lays them out
fn build_package(profile: SchemaProfile, fixtures: &[Fixture]) -> (Vec<u8>, Vec<u8>) {
    let entry_table_offset = 0x40u32;
    let strings_table_offset = entry_table_offset + (fixtures.len() * ENTRY_SIZE) as u32;

    let mut names = Vec::new();
    let mut data = Vec::new();
    let mut records = Vec::new();
    for (i, fixture) in fixtures.iter().enumerate() {
        let stored = match fixture.compression {
            CompressionKind::Deflate => zlib::compress(&fixture.contents).unwrap(),
            _ => fixture.contents.clone(),
        };
        let decompressed_length = fixture.contents.len() as u32;

        records.push(DirectoryEntry {
            name_offset: names.len() as u32,
            decompressed_length,
            compressed_length: stored.len() as u32,
            data_offset: data.len() as u32,
            data_format: match profile {
                SchemaProfile::Obfuscated => Some((i % 8) as u8),
                SchemaProfile::Plain => None,
            },
            compression: fixture.compression,
            residual: residual(profile, decompressed_length),
        });

        names.extend_from_slice(fixture.name.as_bytes());
        names.push(0);
        data.extend_from_slice(&stored);
        data.resize(align_to_block(data.len() as u64) as usize, 0);
    }

    let mut header = vec![0u8; strings_table_offset as usize];
    header.extend_from_slice(&names);
    DirectoryHeader {
        magic: MAGIC,
        strings_table_offset,
        strings_table_flags: 0xCAFE_F00D,
        strings_table_length: names.len() as u32,
        entry_count: fixtures.len() as u32,
        entry_table_offset,
    }
    .write(&mut header)
    .unwrap();

    for (i, entry) in records.iter().enumerate() {
        let start = entry_table_offset as usize + i * ENTRY_SIZE;
        header[start..start + ENTRY_SIZE].copy_from_slice(&profile.encode(i, entry).unwrap());
    }

    (header, data)
}

/// Write a package pair into `dir` and return their paths
fn write_package(dir: &Path, header: &[u8], data: &[u8]) -> (PathBuf, PathBuf) {
    let header_path = dir.join("Man_Trivial.~h");
    let data_path = dir.join("Man_Trivial.~p");
    std::fs::write(&header_path, header).unwrap();
    std::fs::write(&data_path, data).unwrap();
    (header_path, data_path)
}

fn text(seed: &str, repeat: usize) -> Vec<u8> {
    seed.repeat(repeat).into_bytes()
}

fn obfuscated_fixtures() -> Vec<Fixture> {
    vec![
        Fixture::new("data/ui/logo", text("heavy metal ", 400), CompressionKind::Deflate),
        Fixture::new("data/raw", vec![0u8, 1, 2, 3, 0, 0, 255], CompressionKind::None),
        Fixture::new("script", text("local x = 1\n", 90), CompressionKind::Deflate),
    ]
}

#[test]
fn test_plain_single_entry_scenario() {
    let dir = TempDir::new().unwrap();
    let contents = b"0123456789".to_vec();
    let (header, data) = build_package(
        SchemaProfile::Plain,
        &[Fixture::new("x", contents.clone(), CompressionKind::None)],
    );
    let (header_path, data_path) = write_package(dir.path(), &header, &data);
    let options = PackageOptions::new().with_profile(SchemaProfile::Plain);

    // Extract
    let out = dir.path().join("out");
    let summary = PackageOperations::extract(&header_path, &data_path, &out, &options).unwrap();
    assert_eq!(summary.extracted, 1);
    assert_eq!(std::fs::read(out.join("x.bin")).unwrap(), contents);

    // Insert a 6-byte replacement
    let replacements = dir.path().join("replace");
    std::fs::create_dir_all(&replacements).unwrap();
    std::fs::write(replacements.join("x.bin"), b"abcdef").unwrap();

    let summary = PackageOperations::insert(&header_path, &data_path, &replacements, &options).unwrap();
    assert_eq!(summary.replaced, 1);
    assert!(summary.unmatched.is_empty());

    let new_data = std::fs::read(&data_path).unwrap();
    assert_eq!(new_data.len(), 2048);
    assert_eq!(&new_data[..6], b"abcdef");
    assert!(new_data[6..].iter().all(|&b| b == 0));

    let entries = PackageOperations::list(&header_path, &options).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "x");
    assert_eq!(entries[0].decompressed_length, 6);
    assert_eq!(entries[0].compressed_length, 6);
    assert_eq!(entries[0].data_offset, 0);

    // Header size and untouched fields survive the rewrite
    let new_header = std::fs::read(&header_path).unwrap();
    assert_eq!(new_header.len(), header.len());
    assert_eq!(new_header[..0x40], header[..0x40]);
}

#[test]
fn test_obfuscated_extract_and_insert() {
    let dir = TempDir::new().unwrap();
    let fixtures = obfuscated_fixtures();
    let (header, data) = build_package(SchemaProfile::Obfuscated, &fixtures);
    let (header_path, data_path) = write_package(dir.path(), &header, &data);
    let options = PackageOptions::default();

    let out = dir.path().join("out");
    PackageOperations::extract(&header_path, &data_path, &out, &options).unwrap();
    for fixture in &fixtures {
        let path = out.join(format!("{}.bin", fixture.name));
        assert_eq!(std::fs::read(&path).unwrap(), fixture.contents, "{}", fixture.name);
    }

    let before = PackageOperations::list(&header_path, &options).unwrap();

    // Replace the first entry with something larger, plus a stray file
    let replacements = dir.path().join("replace");
    std::fs::create_dir_all(replacements.join("data/ui")).unwrap();
    let new_logo = text("brutal legend ", 700);
    std::fs::write(replacements.join("data/ui/logo.txt"), &new_logo).unwrap();
    std::fs::write(replacements.join("unknown.bin"), b"?").unwrap();

    let summary = PackageOperations::insert(&header_path, &data_path, &replacements, &options).unwrap();
    assert_eq!(summary.replaced, 1);
    assert_eq!(summary.unmatched, vec!["unknown".to_string()]);

    let new_data = std::fs::read(&data_path).unwrap();
    assert_eq!(new_data.len() as u64, summary.data_len);
    assert_eq!(new_data.len() as u64 % BLOCK_SIZE, 0);

    let after = PackageOperations::list(&header_path, &options).unwrap();
    assert_eq!(after.len(), before.len());
    for (old, new) in before.iter().zip(&after) {
        assert_eq!(new.data_offset as u64 % BLOCK_SIZE, 0);
        assert_eq!(new.name, old.name);
        assert_eq!(new.data_format, old.data_format);
        assert_eq!(new.compression, old.compression);
    }
    assert_eq!(after[0].decompressed_length, new_logo.len() as u32);
    assert_eq!(after[1].compressed_length, before[1].compressed_length);

    let out = dir.path().join("out2");
    PackageOperations::extract(&header_path, &data_path, &out, &options).unwrap();
    assert_eq!(std::fs::read(out.join("data/ui/logo.bin")).unwrap(), new_logo);
    assert_eq!(std::fs::read(out.join("data/raw.bin")).unwrap(), fixtures[1].contents);
    assert_eq!(std::fs::read(out.join("script.bin")).unwrap(), fixtures[2].contents);
}

#[test]
fn test_extraction_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let (header, data) = build_package(SchemaProfile::Obfuscated, &obfuscated_fixtures());
    let (header_path, data_path) = write_package(dir.path(), &header, &data);
    let options = PackageOptions::default();

    let first = dir.path().join("first");
    let second = dir.path().join("second");
    PackageOperations::extract(&header_path, &data_path, &first, &options).unwrap();
    PackageOperations::extract(&header_path, &data_path, &second, &options).unwrap();

    for name in ["data/ui/logo.bin", "data/raw.bin", "script.bin"] {
        assert_eq!(
            std::fs::read(first.join(name)).unwrap(),
            std::fs::read(second.join(name)).unwrap()
        );
    }
}

#[test]
fn test_invalid_magic_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let (mut header, data) = build_package(SchemaProfile::Plain, &[Fixture::new("x", b"abc".to_vec(), CompressionKind::None)]);
    header[..4].copy_from_slice(b"DFPF");
    let (header_path, data_path) = write_package(dir.path(), &header, &data);
    let options = PackageOptions::new().with_profile(SchemaProfile::Plain);

    let out = dir.path().join("out");
    let err = PackageOperations::extract(&header_path, &data_path, &out, &options).unwrap_err();
    assert!(err.is_invalid_magic());
    assert!(!out.exists());

    let replacements = dir.path().join("replace");
    std::fs::create_dir_all(&replacements).unwrap();
    std::fs::write(replacements.join("x.bin"), b"new").unwrap();

    let err = PackageOperations::insert(&header_path, &data_path, &replacements, &options).unwrap_err();
    assert!(err.is_invalid_magic());
    assert_eq!(std::fs::read(&header_path).unwrap(), header);
    assert_eq!(std::fs::read(&data_path).unwrap(), data);

    // No staged files left behind
    let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(leftovers, 3);
}

#[test]
fn test_extract_progress_reports_every_entry() {
    let dir = TempDir::new().unwrap();
    let (header, data) = build_package(SchemaProfile::Obfuscated, &obfuscated_fixtures());
    let (header_path, data_path) = write_package(dir.path(), &header, &data);

    let seen = Mutex::new(Vec::new());
    PackageOperations::extract_with_progress(
        &header_path,
        &data_path,
        &dir.path().join("out"),
        &PackageOptions::default(),
        &|progress| {
            if progress.phase == PackagePhase::ExtractingFiles {
                seen.lock().unwrap().push((progress.current, progress.total, progress.message()));
            }
        },
    )
    .unwrap();

    assert_eq!(
        seen.into_inner().unwrap(),
        vec![
            (0, 3, "Extracting data/ui/logo...".to_string()),
            (1, 3, "Extracting data/raw...".to_string()),
            (2, 3, "Extracting script...".to_string()),
        ]
    );
}

#[test]
fn test_list_and_custom_suffix() {
    let dir = TempDir::new().unwrap();
    let (header, data) = build_package(SchemaProfile::Obfuscated, &obfuscated_fixtures());
    let (header_path, data_path) = write_package(dir.path(), &header, &data);

    let entries = PackageOperations::list(&header_path, &PackageOptions::default()).unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["data/ui/logo", "data/raw", "script"]);
    assert_eq!(entries[0].compression, CompressionKind::Deflate);
    assert_eq!(entries[1].data_offset, 0x800);
    assert_eq!(entries[2].data_format, Some(2));

    let out = dir.path().join("out");
    let options = PackageOptions::default().with_output_suffix("");
    PackageOperations::extract(&header_path, &data_path, &out, &options).unwrap();
    assert!(out.join("data/raw").is_file());
}

#[test]
fn test_wrong_profile_is_reported() {
    let dir = TempDir::new().unwrap();
    // A deflate entry stored in the plain layout decodes under the obfuscated
    // layout with an unknown compression code.
    let (header, data) = build_package(
        SchemaProfile::Plain,
        &[Fixture::new("x", text("abc", 50), CompressionKind::Deflate)],
    );
    let (header_path, _) = write_package(dir.path(), &header, &data);

    assert!(PackageOperations::list(&header_path, &PackageOptions::new().with_profile(SchemaProfile::Plain)).is_ok());
    assert!(matches!(
        PackageOperations::list(&header_path, &PackageOptions::default()),
        Err(Error::UnknownCompressionKind { .. })
    ));
}
