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
//! `ustar` header definition taken from
//! <https://www.gnu.org/software/tar/manual/html_node/Standard.html>, plus
//! the structural validation (magic, version, checksum) that decides whether
//! a 512-byte block may be trusted as a header at all.

#![allow(non_upper_case_globals)]

use crate::{TarFormatDecimal, TarFormatOctal, TarFormatString, BLOCKSIZE, NAME_LEN, PREFIX_LEN};
use core::fmt::{Debug, Display, Formatter};
use core::num::ParseIntError;
use core::ops::Range;

/// Required content of the `magic` field. The field is six bytes wide; the
/// terminating NUL is implied by the cut at the first NUL byte that
/// [`TarFormatString::as_bytes`] performs.
const POSIX_MAGIC: &[u8] = b"ustar";

/// Required content of the two-byte `version` field, not NUL-terminated.
const POSIX_VERSION: &[u8] = b"00";

/// Byte range of the checksum field within a header block. While summing,
/// these eight bytes count as ASCII spaces.
const CHECKSUM_FIELD: Range<usize> = 148..156;

/// A structural defect of a single header block, found by
/// [`PosixHeader::validate`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The magic field does not equal `"ustar"` followed by a NUL byte.
    InvalidMagic,
    /// The version field does not equal `"00"`.
    InvalidVersion,
    /// The stored checksum does not match the sum over the header bytes, or
    /// cannot be decoded as an octal number at all.
    InvalidChecksum,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidMagic => f.write_str("header magic is not 'ustar'"),
            Self::InvalidVersion => f.write_str("header version is not '00'"),
            Self::InvalidChecksum => f.write_str("header checksum mismatch"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors that may happen when parsing the [`ModeFlags`].
#[derive(Debug)]
pub enum ModeError {
    ParseInt(ParseIntError),
    IllegalMode,
}

/// Wrapper around the UNIX file permissions given in octal ASCII. The crate
/// never acts on permissions; this is a decoded view only.
#[derive(Copy, Clone, PartialEq, Eq)]
#[repr(transparent)]
pub struct Mode(TarFormatOctal<8>);

impl Mode {
    /// Parses the [`ModeFlags`] from the mode string.
    pub fn to_flags(self) -> Result<ModeFlags, ModeError> {
        let bits = self.0.as_number::<u64>().map_err(ModeError::ParseInt)?;
        ModeFlags::from_bits(bits).ok_or(ModeError::IllegalMode)
    }
}

impl Debug for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        Debug::fmt(&self.to_flags(), f)
    }
}

/// Header of the TAR format as specified by POSIX (POSIX 1003.1-1990).
///
/// Each entry starts with such a header, which describes among other things
/// the entry name and size. The entry data follows in chunks of 512 bytes;
/// the number of data blocks derives from the size field. An entry with size
/// zero (directory, symlink, empty file) has no data blocks at all.
///
/// This view covers the whole 512-byte block so that the checksum can be
/// recomputed from it in place.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(C, packed)]
pub struct PosixHeader {
    pub name: TarFormatString<NAME_LEN>,
    pub mode: Mode,
    pub uid: TarFormatOctal<8>,
    pub gid: TarFormatOctal<8>,
    // confusing; size is stored as ASCII string
    pub size: TarFormatOctal<12>,
    pub mtime: TarFormatDecimal<12>,
    pub cksum: TarFormatOctal<8>,
    pub typeflag: TypeFlagRaw,
    /// Symlink target. There is always a null byte, therefore
    /// the max len is 99.
    pub linkname: TarFormatString<NAME_LEN>,
    pub magic: TarFormatString<6>,
    pub version: TarFormatString<2>,
    /// Username. There is always a null byte, therefore
    /// the max len is N-1.
    pub uname: TarFormatString<32>,
    /// Groupname. There is always a null byte, therefore
    /// the max len is N-1.
    pub gname: TarFormatString<32>,
    pub dev_major: TarFormatOctal<8>,
    pub dev_minor: TarFormatOctal<8>,
    pub prefix: TarFormatString<PREFIX_LEN>,
    // padding => to BLOCKSIZE bytes
    pub _pad: [u8; 12],
}

impl PosixHeader {
    /// Decoded size of the entry data in bytes. A symlink stores its target
    /// in `linkname` and conventionally carries size zero.
    pub fn data_size(&self) -> Result<u64, ParseIntError> {
        self.size.as_number::<u64>()
    }

    /// The unsigned sum over all 512 header bytes, with the checksum field
    /// itself counted as eight ASCII spaces.
    pub fn compute_checksum(&self) -> u32 {
        let bytes =
            unsafe { core::slice::from_raw_parts((self as *const Self).cast::<u8>(), BLOCKSIZE) };
        bytes
            .iter()
            .enumerate()
            .map(|(i, &byte)| {
                if CHECKSUM_FIELD.contains(&i) {
                    u32::from(b' ')
                } else {
                    u32::from(byte)
                }
            })
            .sum()
    }

    /// Checks the structural invariants of this header: the literal magic
    /// and version fields must match exactly and the stored checksum must
    /// equal the recomputed one. On success the entry classification from
    /// the typeflag byte is returned.
    ///
    /// # Errors
    /// The first violated invariant, checked in the order magic, version,
    /// checksum.
    pub fn validate(&self) -> Result<EntryKind, ValidationError> {
        if self.magic.as_bytes() != POSIX_MAGIC {
            return Err(ValidationError::InvalidMagic);
        }
        if self.version.as_bytes() != POSIX_VERSION {
            return Err(ValidationError::InvalidVersion);
        }
        let stored = self
            .cksum
            .as_number::<u32>()
            .map_err(|_| ValidationError::InvalidChecksum)?;
        if stored != self.compute_checksum() {
            return Err(ValidationError::InvalidChecksum);
        }
        Ok(self.typeflag.kind())
    }
}

#[derive(Copy, Clone, Debug, PartialOrd, PartialEq, Eq)]
pub struct InvalidTypeFlagError(u8);

impl Display for InvalidTypeFlagError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{:x} is not a valid TypeFlag", self.0))
    }
}

impl std::error::Error for InvalidTypeFlagError {}

/// The raw typeflag byte of a header.
#[derive(Copy, Clone, PartialOrd, PartialEq, Eq)]
#[repr(transparent)]
pub struct TypeFlagRaw(u8);

impl TypeFlagRaw {
    /// Tries to parse the underlying value as [`TypeFlag`]. This fails if the
    /// Tar file is corrupt and the type is invalid.
    pub fn try_to_type_flag(self) -> Result<TypeFlag, InvalidTypeFlagError> {
        TypeFlag::try_from(self)
    }

    /// Coarse classification of the entry. Unknown typeflag bytes count as
    /// [`EntryKind::Other`] rather than an error; they only need to be
    /// skipped over, never interpreted.
    pub fn kind(self) -> EntryKind {
        self.try_to_type_flag()
            .map_or(EntryKind::Other, TypeFlag::kind)
    }
}

impl Debug for TypeFlagRaw {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        Debug::fmt(&self.try_to_type_flag(), f)
    }
}

/// Describes the kind of payload that follows after a [`PosixHeader`]. The
/// properties of this payload are described inside the header.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
#[allow(unused)]
pub enum TypeFlag {
    /// Represents a regular file. In order to be compatible with older
    /// versions of tar, a typeflag value of AREGTYPE should be silently
    /// recognized as a regular file.
    REGTYPE = b'0',
    /// Represents a regular file (old archives). See [`Self::REGTYPE`].
    AREGTYPE = b'\0',
    /// This flag represents a file linked to another file, of any type,
    /// previously archived. The linked-to name is specified in the linkname
    /// field with a trailing null.
    LINK = b'1',
    /// This represents a symbolic link to another file. The linked-to name
    /// is specified in the linkname field with a trailing null.
    SYMTYPE = b'2',
    /// Character special file; devmajor/devminor carry the device numbers.
    CHRTYPE = b'3',
    /// Block special file; devmajor/devminor carry the device numbers.
    BLKTYPE = b'4',
    /// This flag specifies a directory or sub-directory. The directory name
    /// in the name field should end with a slash, but nothing in this crate
    /// depends on that suffix.
    DIRTYPE = b'5',
    /// This specifies a FIFO special file; its data is never archived.
    FIFOTYPE = b'6',
    /// Contiguous file, to be treated as a normal file where unsupported.
    CONTTYPE = b'7',
    /// Extended header referring to the next file in the archive.
    XHDTYPE = b'x',
    /// Global extended header.
    XGLTYPE = b'g',
}

impl TypeFlag {
    /// Maps the fine-grained typeflag onto the classification the query
    /// layer works with. `REGTYPE` and `AREGTYPE` deliberately collapse into
    /// [`EntryKind::Regular`]; the two encodings are equivalent by spec.
    #[must_use]
    pub const fn kind(self) -> EntryKind {
        match self {
            Self::REGTYPE | Self::AREGTYPE => EntryKind::Regular,
            Self::DIRTYPE => EntryKind::Directory,
            Self::SYMTYPE => EntryKind::Symlink,
            _ => EntryKind::Other,
        }
    }
}

impl TryFrom<TypeFlagRaw> for TypeFlag {
    type Error = InvalidTypeFlagError;

    fn try_from(value: TypeFlagRaw) -> Result<Self, Self::Error> {
        match value.0 {
            b'0' => Ok(Self::REGTYPE),
            b'\0' => Ok(Self::AREGTYPE),
            b'1' => Ok(Self::LINK),
            b'2' => Ok(Self::SYMTYPE),
            b'3' => Ok(Self::CHRTYPE),
            b'4' => Ok(Self::BLKTYPE),
            b'5' => Ok(Self::DIRTYPE),
            b'6' => Ok(Self::FIFOTYPE),
            b'7' => Ok(Self::CONTTYPE),
            b'x' => Ok(Self::XHDTYPE),
            b'g' => Ok(Self::XGLTYPE),
            e => Err(InvalidTypeFlagError(e)),
        }
    }
}

/// Coarse entry classification used by the query operations.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file with data blocks (typeflag `'0'` or NUL).
    Regular,
    /// A directory entry (typeflag `'5'`); has no data blocks.
    Directory,
    /// A symbolic link (typeflag `'2'`); the target lives in `linkname`.
    Symlink,
    /// Everything else. Skipped over structurally, never interpreted.
    Other,
}

bitflags::bitflags! {
    /// UNIX file permissions in octal format.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ModeFlags: u64 {
        /// Set UID on execution.
        const SetUID = 0o4000;
        /// Set GID on execution.
        const SetGID = 0o2000;
        /// Reserved.
        const TSVTX = 0o1000;
        /// Owner read.
        const OwnerRead = 0o400;
        /// Owner write.
        const OwnerWrite = 0o200;
        /// Owner execute.
        const OwnerExec = 0o100;
        /// Group read.
        const GroupRead = 0o040;
        /// Group write.
        const GroupWrite = 0o020;
        /// Group execute.
        const GroupExec = 0o010;
        /// Others read.
        const OthersRead = 0o004;
        /// Others write.
        const OthersWrite = 0o002;
        /// Others execute.
        const OthersExec = 0o001;
    }
}
