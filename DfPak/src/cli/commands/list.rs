//! CLI command for listing package contents

use std::path::Path;

use super::{describe, format_size};
use crate::package::{PackageOperations, PackageOptions};

pub fn execute(
    header: &Path,
    options: &PackageOptions,
    detailed: bool,
    filter: Option<&str>,
    count: bool,
) -> anyhow::Result<()> {
    let entries = PackageOperations::list(header, options).map_err(describe)?;
    let matching: Vec<_> = entries
        .iter()
        .filter(|entry| filter.is_none_or(|text| entry.name.contains(text)))
        .collect();

    if count {
        println!("{}", matching.len());
        return Ok(());
    }

    if detailed {
        println!(
            "{:>5}  {:>10}  {:>10}  {:>10}  {:>3}  {:<4}  Name",
            "Index", "Size", "Stored", "Offset", "Fmt", "Kind"
        );
        for entry in &matching {
            let format = entry
                .data_format
                .map_or_else(|| "-".to_string(), |f| f.to_string());
            println!(
                "{:>5}  {:>10}  {:>10}  {:>#10x}  {:>3}  {:<4}  {}",
                entry.index,
                format_size(u64::from(entry.decompressed_length)),
                format_size(u64::from(entry.compressed_length)),
                entry.data_offset,
                format,
                entry.compression.as_str(),
                entry.name
            );
        }
    } else {
        for entry in &matching {
            println!("{}", entry.name);
        }
    }

    Ok(())
}
