//! CLI command for package extraction

use std::path::Path;
use std::time::Instant;

use super::describe;
use crate::cli::progress::{LOOKING_GLASS, PACKAGE, apply_progress, package_bar, print_done, print_step};
use crate::dfpf::PackagePhase;
use crate::package::{PackageOperations, PackageOptions};

pub fn execute(
    header: &Path,
    data: &Path,
    destination: &Path,
    options: &PackageOptions,
    quiet: bool,
) -> anyhow::Result<()> {
    let started = Instant::now();

    if quiet {
        PackageOperations::extract(header, data, destination, options).map_err(describe)?;
        return Ok(());
    }

    print_step(1, 2, LOOKING_GLASS, "Reading package directory...");
    let total = PackageOperations::list(header, options).map_err(describe)?.len();

    print_step(
        2,
        2,
        PACKAGE,
        &format!("Extracting {total} files to {}...", destination.display()),
    );
    let pb = package_bar(total as u64);
    let summary = PackageOperations::extract_with_progress(header, data, destination, options, &|progress| {
        if progress.phase == PackagePhase::ExtractingFiles {
            apply_progress(&pb, progress);
        }
    })
    .map_err(describe)?;
    pb.finish_and_clear();

    println!(
        "Extracted {} files ({} bytes)",
        summary.extracted, summary.bytes_written
    );
    print_done(started.elapsed());
    Ok(())
}
