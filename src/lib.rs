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
//! Read-only navigation of POSIX `ustar` tar archives behind any seekable
//! byte stream (`Read + Seek`), such as a [`std::fs::File`] or an in-memory
//! [`std::io::Cursor`].
//!
//! The archive is never loaded or indexed as a whole. Every query is a
//! sequential scan over the 512-byte header/data blocks of the stream:
//!
//! * [`TarArchive::check_archive`] validates magic, version and checksum of
//!   every header and counts the entries,
//! * [`TarArchive::exists`], [`TarArchive::is_directory`],
//!   [`TarArchive::is_regular_file`] and [`TarArchive::is_symlink`] test a
//!   path for existence and kind,
//! * [`TarArchive::list`] enumerates the immediate children of a directory,
//! * [`TarArchive::read_file`] copies file content from an arbitrary byte
//!   offset into a caller-provided buffer.
//!
//! Symbolic-link entries are resolved transparently (chains included) by
//! [`TarArchive::list`] and [`TarArchive::read_file`]. All operations leave
//! the stream cursor back at the start of the archive, so consecutive calls
//! compose without any external rewinding.
//!
//! The crate reads the plain `ustar` subset only. PAX/extended headers,
//! sparse files, multi-volume archives and GNU longname extensions are not
//! interpreted; their entries are classified as "other" and skipped over
//! structurally. Writing archives is not supported at all.

#![deny(rustdoc::all)]
#![allow(rustdoc::missing_doc_code_examples)]
#![deny(clippy::all)]
#![deny(missing_debug_implementations)]

/// Each archive component (header or data) occupies blocks of 512 bytes.
const BLOCKSIZE: usize = 512;

/// Width of the `name` and `linkname` header fields.
const NAME_LEN: usize = 100;

/// Width of the ustar `prefix` header field.
const PREFIX_LEN: usize = 155;

mod archive;
mod header;
mod scanner;
mod tar_format_types;

pub use archive::*;
pub use header::*;
pub use tar_format_types::*;
