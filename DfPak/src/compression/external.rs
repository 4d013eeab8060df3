//! Xbox 360 LZX through the SDK's `xbcompress` / `xbdecompress` tools
//!
//! There is no in-process LZX codec, so each call writes the payload to a
//! scratch directory, runs the tool synchronously and reads its output back.
//! The scratch directory is a [`TempDir`] and is removed on every exit path.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use byteorder::{BigEndian, WriteBytesExt};
use serde::Deserialize;
use tempfile::TempDir;

use crate::error::{Error, Result};

/// Size of the container header `xbcompress` puts in front of the LZX stream
pub const COMPRESSED_HEADER_LEN: usize = 0x34;

/// Magic of the container `xbdecompress` expects
const CONTAINER_MAGIC: u32 = 0x0FF5_12EE;

const COMPRESS_FLAGS: [&str; 3] = ["/Q", "/Y", "/N"];
const DECOMPRESS_FLAGS: [&str; 2] = ["/Q", "/Y"];

/// Locations of the external LZX tools
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExternalTool {
    /// Program used to compress payloads
    pub compress_program: PathBuf,
    /// Program used to decompress payloads
    pub decompress_program: PathBuf,
    /// Parent of the per-call scratch directories, the system temp dir if unset
    pub scratch_dir: Option<PathBuf>,
}

impl Default for ExternalTool {
    fn default() -> Self {
        Self {
            compress_program: locate_tool("xbcompress"),
            decompress_program: locate_tool("xbdecompress"),
            scratch_dir: None,
        }
    }
}

impl ExternalTool {
    /// Use explicit program paths
    #[must_use]
    pub fn new(compress_program: impl Into<PathBuf>, decompress_program: impl Into<PathBuf>) -> Self {
        Self {
            compress_program: compress_program.into(),
            decompress_program: decompress_program.into(),
            scratch_dir: None,
        }
    }

    /// Create scratch directories under `dir` instead of the system temp dir
    #[must_use]
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// Compress `data`, dropping the tool's container header.
    ///
    /// # Errors
    /// Returns [`Error::ExternalToolUnavailable`] or [`Error::ExternalToolFailed`]
    /// if the tool cannot run, and [`Error::ExternalToolOutputTooShort`] if its
    /// output has no room for the container header.
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let handoff = Handoff::new(self.scratch_dir.as_deref(), data)?;
        run(&self.compress_program, &COMPRESS_FLAGS, &handoff)?;

        let output = std::fs::read(handoff.output())?;
        output
            .get(COMPRESSED_HEADER_LEN..)
            .map(<[u8]>::to_vec)
            .ok_or(Error::ExternalToolOutputTooShort { len: output.len() })
    }

    /// Decompress `data` into (nominally) `expected_len` bytes.
    ///
    /// # Errors
    /// Returns [`Error::ExternalToolUnavailable`] or [`Error::ExternalToolFailed`]
    /// if the tool cannot run, or [`Error::FieldOverflow`] if a length does not
    /// fit the container header.
    pub fn decompress(&self, data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
        let mut container = container_header(data.len(), expected_len)?;
        container.extend_from_slice(data);

        let handoff = Handoff::new(self.scratch_dir.as_deref(), &container)?;
        run(&self.decompress_program, &DECOMPRESS_FLAGS, &handoff)?;

        Ok(std::fs::read(handoff.output())?)
    }
}

/// Build the container header wrapped around a raw LZX stream for
/// `xbdecompress`: thirteen big-endian words carrying the window setup and
/// both lengths.
pub fn container_header(compressed_len: usize, expected_len: usize) -> Result<Vec<u8>> {
    let compressed = to_u32("compressed length", compressed_len)?;
    let decompressed = to_u32("decompressed length", expected_len)?;
    let block_len = compressed.checked_add(4).ok_or(Error::FieldOverflow {
        field: "compressed length",
        value: u64::from(compressed),
        bits: 32,
    })?;

    let words = [
        CONTAINER_MAGIC,
        0x0103_0000,
        0,
        0,
        0x0002_0000, // window size
        0x0008_0000, // chunk size
        0,
        decompressed,
        0,
        block_len,
        decompressed,
        compressed,
        compressed,
    ];

    let mut header = Vec::with_capacity(words.len() * 4 + compressed_len);
    for word in words {
        header.write_u32::<BigEndian>(word)?;
    }
    Ok(header)
}

fn to_u32(field: &'static str, value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::FieldOverflow {
        field,
        value: value as u64,
        bits: 32,
    })
}

/// Scratch directory holding the tool's input and output files
struct Handoff {
    dir: TempDir,
}

impl Handoff {
    fn new(parent: Option<&Path>, input: &[u8]) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("dfpak-lzx-");
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        std::fs::write(dir.path().join("input.bin"), input)?;
        Ok(Self { dir })
    }

    fn input(&self) -> PathBuf {
        self.dir.path().join("input.bin")
    }

    fn output(&self) -> PathBuf {
        self.dir.path().join("output.bin")
    }
}

fn run(program: &Path, flags: &[&str], handoff: &Handoff) -> Result<()> {
    tracing::debug!("Running {} {}", program.display(), flags.join(" "));

    let status = Command::new(program)
        .args(flags)
        .arg(handoff.input())
        .arg(handoff.output())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|source| Error::ExternalToolUnavailable {
            program: program.to_path_buf(),
            source,
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(Error::ExternalToolFailed {
            program: program.to_path_buf(),
            status,
        })
    }
}

/// Prefer a copy of the tool shipped next to our own executable, else rely on `PATH`
fn locate_tool(name: &str) -> PathBuf {
    let file_name = format!("{name}{}", std::env::consts::EXE_SUFFIX);
    let bundled = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&file_name)));

    match bundled {
        Some(path) if path.is_file() => path,
        _ => PathBuf::from(file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_header_layout() {
        let header = container_header(100, 4096).unwrap();
        assert_eq!(header.len(), 52);

        let word = |i: usize| u32::from_be_bytes(header[i * 4..i * 4 + 4].try_into().unwrap());
        assert_eq!(word(0), 0x0FF5_12EE);
        assert_eq!(word(1), 0x0103_0000);
        assert_eq!(word(7), 4096);
        assert_eq!(word(9), 104);
        assert_eq!(word(10), 4096);
        assert_eq!(word(11), 100);
        assert_eq!(word(12), 100);
    }

    fn assert_scratch_empty(scratch: &TempDir) {
        let left: Vec<_> = std::fs::read_dir(scratch.path()).unwrap().collect();
        assert!(left.is_empty(), "scratch files left behind: {left:?}");
    }

    #[test]
    fn test_missing_tool_is_reported() {
        let scratch = TempDir::new().unwrap();
        let tool = ExternalTool::new("/nonexistent/xbcompress", "/nonexistent/xbdecompress")
            .with_scratch_dir(scratch.path());
        assert!(matches!(
            tool.compress(b"data"),
            Err(Error::ExternalToolUnavailable { .. })
        ));
        assert!(matches!(
            tool.decompress(b"data", 4),
            Err(Error::ExternalToolUnavailable { .. })
        ));
        assert_scratch_empty(&scratch);
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_tool_is_reported() {
        let scratch = TempDir::new().unwrap();
        let tool = ExternalTool::new("false", "false").with_scratch_dir(scratch.path());
        assert!(matches!(tool.compress(b"data"), Err(Error::ExternalToolFailed { .. })));
        assert!(matches!(
            tool.decompress(b"data", 4),
            Err(Error::ExternalToolFailed { .. })
        ));
        assert_scratch_empty(&scratch);
    }

    /// Fake tool that copies its second-to-last argument to its last one
    #[cfg(unix)]
    fn copy_tool(dir: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-lzx");
        std::fs::write(&path, "#!/bin/sh\nwhile [ $# -gt 2 ]; do shift; done\ncat \"$1\" > \"$2\"\n")
            .unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn test_handoff_through_tool() {
        let bin = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let program = copy_tool(bin.path());
        let tool = ExternalTool::new(&program, &program).with_scratch_dir(scratch.path());

        let mut framed = vec![0xEEu8; COMPRESSED_HEADER_LEN];
        framed.extend_from_slice(b"lzx stream");
        assert_eq!(tool.compress(&framed).unwrap(), b"lzx stream");

        let echoed = tool.decompress(b"lzx stream", 64).unwrap();
        assert_eq!(&echoed[..52], &container_header(10, 64).unwrap()[..]);
        assert_eq!(&echoed[52..], b"lzx stream");

        assert!(matches!(
            tool.compress(b"tiny"),
            Err(Error::ExternalToolOutputTooShort { len: 4 })
        ));
        assert_scratch_empty(&scratch);
    }
}
