//! Package operations: extract, insert and list
//!
//! Most callers only need [`PackageOperations`]; the byte-level entry points
//! ([`extract_package`], [`rebuild_package`], [`list_entries`]) work on
//! buffers that are already in memory.

mod builder;
mod extractor;
mod lister;
mod operations;
mod options;
mod replacements;

// Primary public API
pub use operations::PackageOperations;
pub use options::{DEFAULT_OUTPUT_SUFFIX, PackageOptions};
pub use replacements::{ReplacementSource, Replacements, logical_name};

pub use builder::{InsertSummary, RebuiltPackage, rebuild_package};
pub use extractor::{ExtractSummary, extract_package};
pub use lister::{PackageEntryInfo, list_entries};

use crate::dfpf::PackageProgress;

/// Progress callback for package operations.
///
/// Receives a [`PackageProgress`] with the phase, the current/total counts and
/// the entry name. Must be `Sync + Send` because replacement payloads may be
/// compressed in parallel.
///
/// Extraction counts every entry of the package. While inserting, the
/// `InsertingFiles` phase counts only the replacements that matched an entry,
/// so files with no counterpart in the package never show up in `total`.
///
/// # Example
/// ```no_run
/// use dfpak::package::{PackageOperations, PackageOptions};
///
/// PackageOperations::extract_with_progress(
///     "Man_Trivial.~h",
///     "Man_Trivial.~p",
///     "out",
///     &PackageOptions::default(),
///     &|progress| println!("[{:>3.0}%] {}", progress.percentage() * 100.0, progress.message()),
/// )?;
/// # Ok::<(), dfpak::Error>(())
/// ```
pub type ProgressCallback<'a> = &'a (dyn Fn(&PackageProgress) + Sync + Send);
