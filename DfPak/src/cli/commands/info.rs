//! CLI command for package statistics

use std::collections::BTreeMap;
use std::path::Path;

use super::{describe, format_size};
use crate::package::{PackageOperations, PackageOptions};

/// Show aggregate info about a package
pub fn execute(header: &Path, options: &PackageOptions) -> anyhow::Result<()> {
    let entries = PackageOperations::list(header, options).map_err(describe)?;

    let total_compressed: u64 = entries.iter().map(|e| u64::from(e.compressed_length)).sum();
    let total_decompressed: u64 = entries.iter().map(|e| u64::from(e.decompressed_length)).sum();

    let mut by_kind: BTreeMap<&str, (usize, u64)> = BTreeMap::new();
    for entry in &entries {
        let (count, size) = by_kind.entry(entry.compression.as_str()).or_insert((0, 0));
        *count += 1;
        *size += u64::from(entry.decompressed_length);
    }

    let mut largest: Vec<_> = entries.iter().collect();
    largest.sort_by_key(|e| std::cmp::Reverse(e.decompressed_length));

    println!("Package Information: {}", header.display());
    println!("Profile: {}", options.profile.as_str());
    println!();
    println!("Total files: {}", entries.len());
    println!(
        "Total size (stored): {} ({} bytes)",
        format_size(total_compressed),
        total_compressed
    );
    println!(
        "Total size (decompressed): {} ({} bytes)",
        format_size(total_decompressed),
        total_decompressed
    );
    if total_compressed > 0 {
        let ratio = (total_decompressed as f64) / (total_compressed as f64);
        println!("Compression ratio: {ratio:.2}x");
    }
    println!();

    println!("Files by compression:");
    for (kind, (count, size)) in &by_kind {
        println!("  {kind:6} {count:>6} files  {:>10}", format_size(*size));
    }
    println!();

    println!("Largest files:");
    for entry in largest.iter().take(10) {
        println!(
            "  {:>10}  {}",
            format_size(u64::from(entry.decompressed_length)),
            entry.name
        );
    }

    Ok(())
}
