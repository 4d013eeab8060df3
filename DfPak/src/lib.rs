//! # DfPak
//!
//! A pure-Rust library for reading and rebuilding Double Fine DFPF packages,
//! the two-file archives (`.~h` header, `.~p` data) shipped with Brütal Legend.
//!
//! ## Quick Start
//!
//! ```no_run
//! use dfpak::dfpf::SchemaProfile;
//! use dfpak::package::{PackageOperations, PackageOptions};
//!
//! let options = PackageOptions::new().with_profile(SchemaProfile::Obfuscated);
//!
//! // List the directory
//! for entry in PackageOperations::list("Man_Trivial.~h", &options)? {
//!     println!("{} ({} bytes)", entry.name, entry.decompressed_length);
//! }
//!
//! // Extract everything as `name.bin`
//! PackageOperations::extract("Man_Trivial.~h", "Man_Trivial.~p", "out/", &options)?;
//!
//! // Rebuild the package with edited files
//! let summary = PackageOperations::insert("Man_Trivial.~h", "Man_Trivial.~p", "out/", &options)?;
//! println!("Replaced {} entries", summary.replaced);
//! # Ok::<(), dfpak::Error>(())
//! ```
//!
//! ## Schema Profiles
//!
//! Directory records come in two incompatible layouts and nothing in the file
//! says which one is used. The caller picks one with
//! [`SchemaProfile`](dfpf::SchemaProfile).
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `dfpak` command-line binary

pub mod compression;
pub mod dfpf;
pub mod error;
pub mod package;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::compression::{CompressionBackend, ExternalTool};
    pub use crate::dfpf::{
        CompressionKind, DirectoryEntry, PackageDirectory, PackagePhase, PackageProgress,
        SchemaProfile, StringsTable,
    };
    pub use crate::error::{Error, Result};
    pub use crate::package::{
        ExtractSummary, InsertSummary, PackageEntryInfo, PackageOperations, PackageOptions,
        ProgressCallback, Replacements,
    };
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
