//! CLI command for replacing package entries

use std::path::Path;
use std::time::Instant;

use super::describe;
use crate::cli::progress::{DISK, LOOKING_GLASS, apply_progress, package_bar, print_done, print_step};
use crate::dfpf::PackagePhase;
use crate::package::{InsertSummary, PackageOperations, PackageOptions, Replacements};

pub fn execute(
    header: &Path,
    data: &Path,
    source: &Path,
    options: &PackageOptions,
    quiet: bool,
) -> anyhow::Result<()> {
    let started = Instant::now();

    if quiet {
        let summary = PackageOperations::insert(header, data, source, options).map_err(describe)?;
        report_unmatched(&summary);
        return Ok(());
    }

    print_step(
        1,
        2,
        LOOKING_GLASS,
        &format!("Scanning {} for replacements...", source.display()),
    );
    let replacements = Replacements::from_directory(source)?;
    if replacements.is_empty() {
        println!("No replacement files found in: {}", source.display());
        return Ok(());
    }

    print_step(
        2,
        2,
        DISK,
        &format!("Rebuilding package with {} files...", replacements.len()),
    );
    let pb = package_bar(replacements.len() as u64);
    let summary = PackageOperations::insert_replacements_with_progress(
        header,
        data,
        &replacements,
        options,
        &|progress| match progress.phase {
            PackagePhase::InsertingFiles | PackagePhase::WritingPackage => {
                apply_progress(&pb, progress);
            }
            _ => {}
        },
    )
    .map_err(describe)?;
    pb.finish_and_clear();

    println!(
        "Replaced {} entries, data file is now {} bytes",
        summary.replaced, summary.data_len
    );
    report_unmatched(&summary);
    print_done(started.elapsed());
    Ok(())
}

fn report_unmatched(summary: &InsertSummary) {
    if summary.unmatched.is_empty() {
        return;
    }

    println!("{} files matched no package entry:", summary.unmatched.len());
    for name in &summary.unmatched {
        println!("  {name}");
    }
}
