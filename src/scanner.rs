/*
MIT License

Copyright (c) 2026 The tar-lookup developers

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/
//! The traversal primitive shared by all queries: read one header block at
//! the current stream position, skip the data blocks that belong to it.
//!
//! The stream cursor is the only traversal state. After [`Scanner::step`]
//! the cursor sits immediately behind the header block; after
//! [`Scanner::skip_data`] it sits at the start of the next header block,
//! never mid-block.

use crate::{PosixHeader, BLOCKSIZE};
use std::io::{self, ErrorKind, Read, Seek, SeekFrom};

/// Sequential block scanner over a borrowed stream.
pub(crate) struct Scanner<'a, R: Read + Seek> {
    stream: &'a mut R,
}

impl<'a, R: Read + Seek> Scanner<'a, R> {
    pub(crate) fn new(stream: &'a mut R) -> Self {
        Self { stream }
    }

    /// Seeks back to the start of the archive.
    pub(crate) fn rewind(&mut self) -> io::Result<()> {
        self.stream.seek(SeekFrom::Start(0))?;
        Ok(())
    }

    /// Seeks back over the header block read last, leaving the cursor at
    /// that header's first byte.
    pub(crate) fn back_one_block(&mut self) -> io::Result<()> {
        self.stream.seek(SeekFrom::Current(-(BLOCKSIZE as i64)))?;
        Ok(())
    }

    /// Reads the 512-byte block at the current position.
    ///
    /// Returns `None` at the end of the archive: either the block starts
    /// with a NUL byte (the zero-header sentinel) or the stream ends cleanly
    /// at a block boundary. Archives lacking the two-zero-block trailer are
    /// tolerated with a warning. A block truncated mid-header surfaces as an
    /// [`ErrorKind::UnexpectedEof`] error.
    pub(crate) fn step(&mut self) -> io::Result<Option<PosixHeader>> {
        let mut block = [0_u8; BLOCKSIZE];
        let mut filled = 0;
        while filled < BLOCKSIZE {
            match self.stream.read(&mut block[filled..]) {
                Ok(0) if filled == 0 => {
                    log::warn!("archive ended without a terminating zero block");
                    return Ok(None);
                }
                Ok(0) => {
                    return Err(io::Error::new(
                        ErrorKind::UnexpectedEof,
                        "archive ends in the middle of a header block",
                    ))
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        if block[0] == 0 {
            log::debug!("end of archive (zero header block)");
            return Ok(None);
        }

        // PosixHeader is a packed view of exactly one block; every field has
        // alignment 1.
        let header = unsafe { block.as_ptr().cast::<PosixHeader>().read_unaligned() };
        Ok(Some(header))
    }

    /// Advances the cursor past the data blocks of an entry with `size`
    /// bytes of data, i.e. by `ceil(size / 512)` whole blocks. A size of
    /// zero (directory, symlink, empty file) skips nothing.
    pub(crate) fn skip_data(&mut self, size: u64) -> io::Result<()> {
        let padded = size.div_ceil(BLOCKSIZE as u64) * BLOCKSIZE as u64;
        if padded > 0 {
            let delta = i64::try_from(padded)
                .map_err(|e| io::Error::new(ErrorKind::InvalidData, e))?;
            self.stream.seek(SeekFrom::Current(delta))?;
        }
        Ok(())
    }
}
