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
//! Module for [`TarArchive`], the public query surface: integrity check,
//! existence/type tests, directory listing and ranged file reads, all as
//! sequential scans sharing the [`Scanner`] primitive.

use crate::header::{EntryKind, PosixHeader, ValidationError};
use crate::scanner::Scanner;
use crate::BLOCKSIZE;
use core::fmt::{Debug, Display, Formatter};
use std::io::{self, ErrorKind, Read, Seek, SeekFrom};

/// Upper bound on symlink hops per lookup. A chain longer than this is
/// reported as [`TarError::SymlinkLoop`] instead of scanning forever on a
/// cyclic archive. 40 matches the traditional kernel ELOOP limit.
pub const MAX_LINK_DEPTH: usize = 40;

/// Failure of an archive query.
#[derive(Debug)]
pub enum TarError {
    /// A header violated a structural invariant (magic, version, checksum).
    Validation(ValidationError),
    /// No entry matches the path, neither directly nor via symlinks.
    NotFound,
    /// The path resolved to an entry that is not a directory.
    NotADirectory,
    /// The requested read offset lies beyond the entry size.
    OffsetOutOfRange,
    /// Symlink resolution exceeded [`MAX_LINK_DEPTH`] hops.
    SymlinkLoop,
    /// The underlying stream failed, or a header field could not be decoded.
    Io(io::Error),
}

impl Display for TarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Validation(e) => Display::fmt(e, f),
            Self::NotFound => f.write_str("no matching entry in the archive"),
            Self::NotADirectory => f.write_str("entry is not a directory"),
            Self::OffsetOutOfRange => f.write_str("read offset lies beyond the entry size"),
            Self::SymlinkLoop => {
                write!(f, "symlink chain exceeds {MAX_LINK_DEPTH} hops")
            }
            Self::Io(e) => write!(f, "archive stream error: {e}"),
        }
    }
}

impl std::error::Error for TarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TarError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ValidationError> for TarError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

/// The immediate children of one directory, in archive order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirListing {
    /// Child names relative to the listed directory, without any `/`.
    pub entries: Vec<String>,
    /// True if more children exist than the requested capacity; the scan
    /// stopped early in that case.
    pub truncated: bool,
}

/// Outcome of one [`TarArchive::read_file`] call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FileRead {
    /// Number of bytes copied into the destination buffer.
    pub bytes_written: usize,
    /// Bytes of the entry left behind `offset + bytes_written`. Zero means
    /// the file has been read to its end; a positive value means the
    /// destination buffer was too small and the caller should continue with
    /// an advanced offset. Not an error either way.
    pub remaining: u64,
}

impl FileRead {
    /// True once the entry has been read up to its last byte.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.remaining == 0
    }
}

/// Read-only view of a `ustar` archive behind a seekable stream.
///
/// The archive is scanned on every query; no index is built or cached. Each
/// operation seeks to the start of the archive itself and parks the cursor
/// back there on exit, so calls compose in any order.
pub struct TarArchive<R> {
    stream: R,
}

impl<R> Debug for TarArchive<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TarArchive")
            .field("stream", &"<read + seek>")
            .finish()
    }
}

impl<R: Read + Seek> TarArchive<R> {
    /// Interprets the stream as a tar archive starting at stream position 0.
    pub const fn new(stream: R) -> Self {
        Self { stream }
    }

    /// Gives the underlying stream back to the caller.
    pub fn into_inner(self) -> R {
        self.stream
    }

    /// Validates every header of the archive (magic, version, checksum) and
    /// returns the number of entries.
    ///
    /// # Errors
    /// The first [`ValidationError`] encountered, or an I/O error from the
    /// stream.
    pub fn check_archive(&mut self) -> Result<usize, TarError> {
        let result = self.check_archive_inner();
        self.park(result)
    }

    fn check_archive_inner(&mut self) -> Result<usize, TarError> {
        let mut scanner = Scanner::new(&mut self.stream);
        scanner.rewind()?;
        let mut count = 0;
        while let Some(header) = scanner.step()? {
            header.validate()?;
            count += 1;
            scanner.skip_data(data_size(&header)?)?;
        }
        Ok(count)
    }

    /// True if some entry's name equals `path` byte for byte. No path
    /// normalization takes place: `"dir"` and `"dir/"` are different names,
    /// and symlinks are not followed.
    pub fn exists(&mut self, path: &str) -> Result<bool, TarError> {
        let result = self
            .scan_for(|h| name_matches(h, path))
            .map(|found| found.is_some());
        self.park(result)
    }

    /// True if an entry named exactly `path` exists and is a directory.
    pub fn is_directory(&mut self, path: &str) -> Result<bool, TarError> {
        self.kind_query(path, EntryKind::Directory)
    }

    /// True if an entry named exactly `path` exists and is a regular file.
    /// A symlink pointing at a regular file does not count; type queries
    /// never resolve links.
    pub fn is_regular_file(&mut self, path: &str) -> Result<bool, TarError> {
        self.kind_query(path, EntryKind::Regular)
    }

    /// True if an entry named exactly `path` exists and is a symlink.
    pub fn is_symlink(&mut self, path: &str) -> Result<bool, TarError> {
        self.kind_query(path, EntryKind::Symlink)
    }

    /// Enumerates the immediate children of the directory at `path`,
    /// following symlinks to directories. The empty path `""` is the
    /// archive root, whose children are all top-level entries.
    ///
    /// At most `capacity` names are collected; if more children exist, the
    /// scan stops early and the listing is flagged as truncated. A
    /// childless directory yields an empty, untruncated listing.
    ///
    /// # Errors
    /// [`TarError::NotFound`] if nothing matches `path`,
    /// [`TarError::NotADirectory`] if the path resolves to a non-directory.
    pub fn list(&mut self, path: &str, capacity: usize) -> Result<DirListing, TarError> {
        let result = self.list_inner(path, capacity);
        self.park(result)
    }

    fn list_inner(&mut self, path: &str, capacity: usize) -> Result<DirListing, TarError> {
        // The archive root is a directory without a header of its own.
        let parent: Vec<String> = if path.is_empty() {
            Vec::new()
        } else {
            let header = self.locate(path)?;
            if header.typeflag.kind() != EntryKind::Directory {
                return Err(TarError::NotADirectory);
            }
            let name = header.name.as_str().map_err(bad_name)?;
            segments_of(name).map(str::to_owned).collect()
        };

        let mut entries = Vec::new();
        let mut truncated = false;
        let mut scanner = Scanner::new(&mut self.stream);
        scanner.rewind()?;
        'scan: while let Some(header) = scanner.step()? {
            let size = data_size(&header)?;
            match header.name.as_str() {
                Err(_) => log::warn!("entry with non-UTF-8 name skipped in listing"),
                Ok("") => log::warn!("entry with empty name skipped in listing"),
                Ok(name) => {
                    let segments: Vec<&str> = segments_of(name).collect();
                    let is_child = segments.len() == parent.len() + 1
                        && segments.iter().zip(&parent).all(|(a, b)| a == b);
                    if is_child {
                        if entries.len() == capacity {
                            truncated = true;
                            break 'scan;
                        }
                        entries.push(segments[segments.len() - 1].to_owned());
                    }
                }
            }
            scanner.skip_data(size)?;
        }
        Ok(DirListing { entries, truncated })
    }

    /// Copies up to `dest.len()` bytes of the file at `path` into `dest`,
    /// starting `offset` bytes into the file. Symlinks are resolved; block
    /// boundaries and padding are invisible to the caller, and embedded NUL
    /// bytes are ordinary data.
    ///
    /// A destination buffer smaller than the remaining data is not an
    /// error: the returned [`FileRead::remaining`] tells the caller how much
    /// is left behind the bytes just read.
    ///
    /// # Errors
    /// [`TarError::NotFound`] if `path` does not resolve to a regular file
    /// (directories have no data to read),
    /// [`TarError::OffsetOutOfRange`] if `offset` exceeds the file size.
    /// `offset == size` is a valid empty read.
    pub fn read_file(
        &mut self,
        path: &str,
        offset: u64,
        dest: &mut [u8],
    ) -> Result<FileRead, TarError> {
        let result = self.read_file_inner(path, offset, dest);
        self.park(result)
    }

    fn read_file_inner(
        &mut self,
        path: &str,
        offset: u64,
        dest: &mut [u8],
    ) -> Result<FileRead, TarError> {
        let header = self.locate(path)?;
        // directories and special entries carry no readable data
        if header.typeflag.kind() != EntryKind::Regular {
            return Err(TarError::NotFound);
        }
        let size = data_size(&header)?;
        if offset > size {
            return Err(TarError::OffsetOutOfRange);
        }

        // cursor sits at the header start; data begins one block further
        let delta = i64::try_from(BLOCKSIZE as u64 + offset)
            .map_err(|e| io::Error::new(ErrorKind::InvalidData, e))?;
        self.stream.seek(SeekFrom::Current(delta))?;

        let want = (size - offset).min(dest.len() as u64) as usize;
        self.stream.read_exact(&mut dest[..want])?;
        Ok(FileRead {
            bytes_written: want,
            remaining: size - offset - want as u64,
        })
    }

    /// Scans from the archive start for the first entry `matches` accepts,
    /// leaving the cursor at the start of that entry's header block.
    fn scan_for(
        &mut self,
        mut matches: impl FnMut(&PosixHeader) -> bool,
    ) -> Result<Option<PosixHeader>, TarError> {
        let mut scanner = Scanner::new(&mut self.stream);
        scanner.rewind()?;
        while let Some(header) = scanner.step()? {
            if matches(&header) {
                scanner.back_one_block()?;
                return Ok(Some(header));
            }
            scanner.skip_data(data_size(&header)?)?;
        }
        Ok(None)
    }

    fn kind_query(&mut self, path: &str, kind: EntryKind) -> Result<bool, TarError> {
        let result = self
            .scan_for(|h| h.typeflag.kind() == kind && name_matches(h, path))
            .map(|found| found.is_some());
        self.park(result)
    }

    /// Resolves `path` to a concrete (non-symlink) entry, chasing symlink
    /// indirection from the archive start for every hop. On success the
    /// cursor sits at the start of the resolved entry's header block.
    fn locate(&mut self, path: &str) -> Result<PosixHeader, TarError> {
        let mut target = path.to_owned();
        for _ in 0..MAX_LINK_DEPTH {
            let found = self.scan_for(|h| resolves_to(h, &target))?;
            let header = found.ok_or(TarError::NotFound)?;
            if header.typeflag.kind() != EntryKind::Symlink {
                return Ok(header);
            }
            target = link_target(&header)?;
            log::trace!("following symlink to '{target}'");
        }
        Err(TarError::SymlinkLoop)
    }

    /// Returns the cursor to the start of the archive so that the next
    /// operation scans the whole archive again, whatever happened before.
    fn park<T>(&mut self, result: Result<T, TarError>) -> Result<T, TarError> {
        match self.stream.seek(SeekFrom::Start(0)) {
            Ok(_) => result,
            Err(e) => result.and(Err(TarError::Io(e))),
        }
    }
}

/// Exact byte equality between an entry name and a query path.
fn name_matches(header: &PosixHeader, path: &str) -> bool {
    header.name.as_bytes() == path.as_bytes()
}

/// Lookup matching for [`TarArchive::locate`]: exact for files and
/// symlinks; directories additionally answer to their name without the
/// conventional trailing slash (and vice versa), since symlink targets
/// usually omit it.
fn resolves_to(header: &PosixHeader, path: &str) -> bool {
    if name_matches(header, path) {
        return true;
    }
    header.typeflag.kind() == EntryKind::Directory
        && strip_trailing_slash(header.name.as_bytes()) == strip_trailing_slash(path.as_bytes())
}

fn strip_trailing_slash(bytes: &[u8]) -> &[u8] {
    match bytes {
        [rest @ .., b'/'] => rest,
        _ => bytes,
    }
}

/// The path a symlink entry points at: its `linkname`, interpreted relative
/// to the symlink's own parent directory by plain concatenation. No `.` or
/// `..` collapsing takes place anywhere in this crate.
fn link_target(header: &PosixHeader) -> Result<String, TarError> {
    let name = header.name.as_str().map_err(bad_name)?;
    let target = header.linkname.as_str().map_err(bad_name)?;
    let parent_len = name.rfind('/').map_or(0, |i| i + 1);
    let mut joined = String::with_capacity(parent_len + target.len());
    joined.push_str(&name[..parent_len]);
    joined.push_str(target);
    Ok(joined)
}

fn bad_name(e: core::str::Utf8Error) -> TarError {
    TarError::Io(io::Error::new(ErrorKind::InvalidData, e))
}

/// Decoded entry size, with a malformed size field surfaced as an
/// `InvalidData` I/O error instead of numeric garbage.
fn data_size(header: &PosixHeader) -> Result<u64, TarError> {
    header
        .data_size()
        .map_err(|e| TarError::Io(io::Error::new(ErrorKind::InvalidData, e)))
}

/// Path segments for child comparison: split on `/`, empty segments (from
/// the conventional trailing slash of directory names, or doubled slashes)
/// dropped.
fn segments_of(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}
