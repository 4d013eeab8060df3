//! Error types for `DfPak`

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// The error type for `DfPak` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Package Directory Errors ====================
    /// The header file does not start with the `dfpf` tag.
    #[error("invalid package magic: expected dfpf, found {found:?}")]
    InvalidMagic {
        /// The first four bytes of the header (zero-filled if shorter).
        found: [u8; 4],
    },

    /// A read ran past the end of the header buffer.
    #[error("unexpected end of header: {needed} bytes needed at offset {offset:#x}")]
    UnexpectedEof {
        /// Offset the read started at.
        offset: usize,
        /// Number of bytes the read required.
        needed: usize,
    },

    /// A name in the strings table has no terminating zero byte.
    #[error("unterminated name at header offset {offset:#x}")]
    UnterminatedName {
        /// Absolute header offset the name starts at.
        offset: usize,
    },

    /// An entry claims more compressed bytes than decompressed bytes.
    #[error(
        "entry {index}: compressed length {compressed} exceeds decompressed length {decompressed}"
    )]
    LengthInconsistency {
        /// Table index of the entry.
        index: usize,
        /// Compressed payload length.
        compressed: u32,
        /// Decompressed payload length.
        decompressed: u32,
    },

    /// The compression bits of an entry hold an unknown value.
    #[error("unknown compression kind: {code}")]
    UnknownCompressionKind {
        /// The raw compression code.
        code: u8,
    },

    /// A value does not fit into its packed bit field.
    #[error("{field} value {value:#x} does not fit in {bits} bits")]
    FieldOverflow {
        /// Name of the logical field.
        field: &'static str,
        /// The value that failed to encode.
        value: u64,
        /// Width of the on-disk field.
        bits: u32,
    },

    /// An entry was handed to the codec of the other schema profile.
    #[error("entry {index} does not carry {profile} record bits")]
    ProfileMismatch {
        /// Table index of the entry.
        index: usize,
        /// Profile the encoder was asked to use.
        profile: &'static str,
    },

    /// An entry's payload region is not contained in the data file.
    #[error(
        "entry {index}: payload {offset:#x}+{length} is outside the data file ({data_len} bytes)"
    )]
    PayloadOutOfRange {
        /// Table index of the entry.
        index: usize,
        /// Payload offset in the data file.
        offset: u32,
        /// Payload length.
        length: u32,
        /// Actual data file length.
        data_len: usize,
    },

    /// The rebuilt data file would exceed 32-bit addressing.
    #[error("rebuilt data file exceeds 4 GiB")]
    DataFileTooLarge,

    // ==================== Compression Errors ====================
    /// Deflate stream could not be inflated.
    #[error("Zlib decompression failed: {message}")]
    ZlibDecompressionFailed {
        /// The error message.
        message: String,
    },

    /// The external compression tool could not be started.
    #[error("failed to start external tool {}: {source}", program.display())]
    ExternalToolUnavailable {
        /// The program that was invoked.
        program: PathBuf,
        /// The spawn error.
        #[source]
        source: std::io::Error,
    },

    /// The external compression tool exited abnormally.
    #[error("external tool {} exited with {status}", program.display())]
    ExternalToolFailed {
        /// The program that was invoked.
        program: PathBuf,
        /// The exit status reported by the process.
        status: ExitStatus,
    },

    /// The external compressor wrote less than its fixed-size header.
    #[error("external tool output too short: {len} bytes")]
    ExternalToolOutputTooShort {
        /// Length of the output file.
        len: usize,
    },

    // ==================== Configuration Errors ====================
    /// The configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Unknown schema profile name.
    #[error("unknown schema profile: {0} (expected a/obfuscated or b/plain)")]
    UnknownProfile(String),

    // ==================== File System Errors ====================
    /// Invalid file path.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Directory traversal error.
    #[error("directory walk error: {0}")]
    WalkDirError(String),
}

impl Error {
    /// Returns true when the header was rejected for its magic tag.
    ///
    /// Callers that only need the pass/fail contract of extract and insert
    /// can branch on this instead of matching the whole enum.
    #[must_use]
    pub fn is_invalid_magic(&self) -> bool {
        matches!(self, Error::InvalidMagic { .. })
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkDirError(err.to_string())
    }
}

/// A specialized Result type for `DfPak` operations.
pub type Result<T> = std::result::Result<T, Error>;
