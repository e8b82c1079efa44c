//! In-memory builder for small `ustar` archives, so the tests can exercise
//! the query surface without binary fixture files.

use std::io::Cursor;
use tar_lookup::TarArchive;

pub const BLOCK: usize = 512;

/// One archive entry to be serialized by [`build`].
pub struct EntrySpec {
    name: String,
    typeflag: u8,
    data: Vec<u8>,
    linkname: String,
}

/// A regular file with content.
pub fn file(name: &str, data: &[u8]) -> EntrySpec {
    EntrySpec {
        name: name.to_owned(),
        typeflag: b'0',
        data: data.to_vec(),
        linkname: String::new(),
    }
}

/// A directory entry (no data blocks).
pub fn dir(name: &str) -> EntrySpec {
    EntrySpec {
        name: name.to_owned(),
        typeflag: b'5',
        data: Vec::new(),
        linkname: String::new(),
    }
}

/// A symlink entry pointing at `target` (no data blocks).
pub fn symlink(name: &str, target: &str) -> EntrySpec {
    EntrySpec {
        name: name.to_owned(),
        typeflag: b'2',
        data: Vec::new(),
        linkname: target.to_owned(),
    }
}

/// A FIFO entry, i.e. something the query layer classifies as "other".
pub fn fifo(name: &str) -> EntrySpec {
    EntrySpec {
        name: name.to_owned(),
        typeflag: b'6',
        data: Vec::new(),
        linkname: String::new(),
    }
}

/// Serializes `entries` the way GNU tar does in ustar mode: one header
/// block per entry, data padded to whole blocks, two zero blocks at the
/// end.
pub fn build(entries: &[EntrySpec]) -> Vec<u8> {
    let mut out = Vec::new();
    for entry in entries {
        out.extend_from_slice(&header_block(entry));
        out.extend_from_slice(&entry.data);
        let tail = entry.data.len() % BLOCK;
        if tail != 0 {
            out.extend_from_slice(&vec![0_u8; BLOCK - tail]);
        }
    }
    out.extend_from_slice(&[0_u8; BLOCK]);
    out.extend_from_slice(&[0_u8; BLOCK]);
    out
}

/// Builds the archive and wraps it into a [`TarArchive`] over a cursor.
pub fn open(entries: &[EntrySpec]) -> TarArchive<Cursor<Vec<u8>>> {
    TarArchive::new(Cursor::new(build(entries)))
}

fn header_block(entry: &EntrySpec) -> [u8; BLOCK] {
    assert!(entry.name.len() <= 100, "name too long for the name field");
    assert!(entry.linkname.len() <= 100, "link target too long");

    let mut block = [0_u8; BLOCK];
    block[..entry.name.len()].copy_from_slice(entry.name.as_bytes());
    let mode: &[u8; 8] = if entry.typeflag == b'5' {
        b"0000755\0"
    } else {
        b"0000644\0"
    };
    block[100..108].copy_from_slice(mode);
    block[108..116].copy_from_slice(b"0001750\0");
    block[116..124].copy_from_slice(b"0001750\0");
    block[124..136].copy_from_slice(format!("{:011o}\0", entry.data.len()).as_bytes());
    block[136..148].copy_from_slice(b"14710231575\0");
    block[156] = entry.typeflag;
    block[157..157 + entry.linkname.len()].copy_from_slice(entry.linkname.as_bytes());
    block[257..263].copy_from_slice(b"ustar\0");
    block[263..265].copy_from_slice(b"00");
    block[265..269].copy_from_slice(b"user");
    block[297..302].copy_from_slice(b"group");

    // checksum: sum over the block with the checksum field read as spaces
    block[148..156].copy_from_slice(b"        ");
    let sum: u32 = block.iter().map(|&b| u32::from(b)).sum();
    block[148..155].copy_from_slice(format!("{sum:06o}\0").as_bytes());
    block[155] = b' ';
    block
}
