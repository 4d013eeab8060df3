//! Configuration for package operations
//!
//! Options can be built in code with the `with_*` methods or loaded from a
//! TOML file:
//!
//! ```toml
//! profile = "plain"
//! output_suffix = ".bin"
//! parallel_compression = true
//!
//! [external_tool]
//! compress_program = "/opt/xdk/bin/xbcompress"
//! decompress_program = "/opt/xdk/bin/xbdecompress"
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::compression::ExternalTool;
use crate::dfpf::SchemaProfile;
use crate::error::Result;

/// Default suffix appended to extracted file names
pub const DEFAULT_OUTPUT_SUFFIX: &str = ".bin";

/// Options shared by extract, insert and list.
///
/// # Example
///
/// ```
/// use dfpak::dfpf::SchemaProfile;
/// use dfpak::package::PackageOptions;
///
/// let options = PackageOptions::new()
///     .with_profile(SchemaProfile::Plain)
///     .with_parallel_compression(false);
/// assert_eq!(options.output_suffix, ".bin");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PackageOptions {
    /// Record layout of the header being processed
    pub profile: SchemaProfile,

    /// Appended to every logical name when extracting
    pub output_suffix: String,

    /// Programs used for LZX entries
    pub external_tool: ExternalTool,

    /// Compress replacement payloads on the rayon pool
    pub parallel_compression: bool,
}

impl Default for PackageOptions {
    fn default() -> Self {
        Self {
            profile: SchemaProfile::default(),
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            external_tool: ExternalTool::default(),
            parallel_compression: true,
        }
    }
}

impl PackageOptions {
    /// Create options with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load options from a TOML file.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Set the record layout.
    #[must_use]
    pub fn with_profile(mut self, profile: SchemaProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Set the suffix for extracted files.
    #[must_use]
    pub fn with_output_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.output_suffix = suffix.into();
        self
    }

    /// Set the external LZX tools.
    #[must_use]
    pub fn with_external_tool(mut self, tool: ExternalTool) -> Self {
        self.external_tool = tool;
        self
    }

    /// Set whether replacements are compressed in parallel.
    #[must_use]
    pub fn with_parallel_compression(mut self, parallel: bool) -> Self {
        self.parallel_compression = parallel;
        self
    }
}
