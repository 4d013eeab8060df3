mod definitions;
mod execute;
pub mod extract;
pub mod info;
pub mod insert;
pub mod list;

pub use definitions::Commands;

use std::path::Path;
use std::str::FromStr;

use crate::Error;
use crate::dfpf::SchemaProfile;
use crate::package::PackageOptions;

/// Build options from an optional config file, then apply the `--profile` override
fn load_options(config: Option<&Path>, profile: Option<&str>) -> anyhow::Result<PackageOptions> {
    let mut options = match config {
        Some(path) => PackageOptions::from_toml_file(path)?,
        None => PackageOptions::default(),
    };
    if let Some(profile) = profile {
        options = options.with_profile(SchemaProfile::from_str(profile)?);
    }
    Ok(options)
}

/// Map a library error to the message shown to the user
fn describe(err: Error) -> anyhow::Error {
    if err.is_invalid_magic() {
        anyhow::anyhow!("Invalid or corrupted header file")
    } else {
        err.into()
    }
}

/// Format byte size for human-readable output
fn format_size(bytes: u64) -> String {
    if bytes >= 1_048_576 {
        format!("{:.1}M", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1}K", bytes as f64 / 1024.0)
    } else {
        format!("{bytes}")
    }
}
