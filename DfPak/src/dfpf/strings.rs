//! Name lookup in the header's strings table

use crate::error::{Error, Result};

/// View over the name blob of a header buffer.
///
/// Names are not collected up front; each lookup scans from the requested
/// offset to the next zero byte.
#[derive(Debug, Clone, Copy)]
pub struct StringsTable<'a> {
    header: &'a [u8],
    offset: u32,
}

impl<'a> StringsTable<'a> {
    /// Create a view over `header` with the table starting at `offset`
    #[must_use]
    pub fn new(header: &'a [u8], offset: u32) -> Self {
        Self { header, offset }
    }

    /// Resolve the name stored `name_offset` bytes into the table.
    ///
    /// The declared table length is not used as a bound; like the game, the
    /// scan only stops at a zero byte or the end of the header.
    pub fn resolve(&self, name_offset: u32) -> Result<String> {
        let start = self.offset as usize + name_offset as usize;
        let tail = self.header.get(start..).ok_or(Error::UnexpectedEof {
            offset: start,
            needed: 1,
        })?;
        let end = tail
            .iter()
            .position(|&b| b == 0)
            .ok_or(Error::UnterminatedName { offset: start })?;

        Ok(String::from_utf8_lossy(&tail[..end]).into_owned())
    }
}
