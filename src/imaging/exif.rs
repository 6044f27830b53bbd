//! Minimal EXIF (TIFF) block reader and writer.
//!
//! Three directories are carried, see [`Ifd`]:
//!
//! | Directory | Reached through | Kept |
//! |---|---|---|
//! | IFD0 | header offset | tags in [`DESCRIPTIVE_TAGS`] |
//! | Exif | IFD0 tag `0x8769` | every leaf entry (capture date, exposure, lens) |
//! | GPS | IFD0 tag `0x8825` | every leaf entry |
//!
//! Sub-IFD pointers are followed on read and rebuilt on write: their offsets
//! only make sense inside the block they came from. Structural entries
//! (strip offsets, the IFD1 thumbnail, the interoperability pointer) are
//! dropped. A broken sub-IFD is dropped on its own without failing the block.
//!
//! Locating the block inside a JPEG, PNG or WebP file is the decoder's job;
//! this module only sees TIFF-structured bytes.
//!
//! Blocks are always written little-endian (`II`). Big-endian input is
//! converted component by component on read.

use std::collections::BTreeMap;
use thiserror::Error;

pub const IMAGE_DESCRIPTION: u16 = 0x010E;
pub const ARTIST: u16 = 0x013B;
pub const COPYRIGHT: u16 = 0x8298;
pub const DATE_TIME_ORIGINAL: u16 = 0x9003;

pub const EXIF_IFD_POINTER: u16 = 0x8769;
pub const GPS_IFD_POINTER: u16 = 0x8825;
const INTEROP_IFD_POINTER: u16 = 0xA005;

/// Offset-valued tags, never carried as plain entries.
const POINTER_TAGS: &[u16] = &[EXIF_IFD_POINTER, GPS_IFD_POINTER, INTEROP_IFD_POINTER];

/// IFD0 tags carried from a source image into the output.
pub const DESCRIPTIVE_TAGS: &[u16] = &[
    IMAGE_DESCRIPTION,
    0x010F, // Make
    0x0110, // Model
    0x0112, // Orientation
    0x011A, // XResolution
    0x011B, // YResolution
    0x0128, // ResolutionUnit
    0x0131, // Software
    0x0132, // DateTime
    ARTIST,
    0x013C, // HostComputer
    COPYRIGHT,
];

/// Prefix of the EXIF payload in a JPEG APP1 segment.
pub const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Largest TIFF block that fits in one JPEG APP1 segment
/// (65535 − 2 length bytes − 6 `Exif\0\0` bytes).
pub const MAX_BLOCK_LEN: usize = 65535 - 2 - EXIF_HEADER.len();

const TYPE_ASCII: u16 = 2;
const TYPE_LONG: u16 = 4;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExifError {
    #[error("EXIF block truncated")]
    Truncated,
    #[error("not a TIFF header")]
    BadHeader,
    #[error("EXIF block too large: {0} bytes")]
    TooLarge(usize),
}

/// One directory entry. `data` is always stored little-endian.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub field_type: u16,
    pub count: u32,
    pub data: Vec<u8>,
}

impl Entry {
    fn pointer(offset: u32) -> Self {
        Self {
            field_type: TYPE_LONG,
            count: 1,
            data: offset.to_le_bytes().to_vec(),
        }
    }

    /// The offset held by a sub-IFD pointer (LONG or IFD type, one value).
    fn as_offset(&self) -> Option<usize> {
        if !matches!(self.field_type, TYPE_LONG | 13) || self.count != 1 {
            return None;
        }
        let b: [u8; 4] = self.data.get(..4)?.try_into().ok()?;
        Some(u32::from_le_bytes(b) as usize)
    }
}

/// Directory an entry lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ifd {
    Primary,
    Exif,
    Gps,
}

/// The carried entries of an EXIF block, keyed by directory and tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExifBlock {
    primary: BTreeMap<u16, Entry>,
    exif: BTreeMap<u16, Entry>,
    gps: BTreeMap<u16, Entry>,
}

impl ExifBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TIFF-structured block: [`DESCRIPTIVE_TAGS`] from IFD0, plus
    /// the Exif and GPS directories it points to.
    ///
    /// Entries with an unknown field type or out-of-range data are skipped;
    /// only a broken header or IFD0 is an error.
    pub fn parse(tiff: &[u8]) -> Result<Self, ExifError> {
        let order = match tiff.get(..2) {
            Some(b"II") => ByteOrder::Little,
            Some(b"MM") => ByteOrder::Big,
            Some(_) => return Err(ExifError::BadHeader),
            None => return Err(ExifError::Truncated),
        };
        if order.u16(tiff, 2)? != 42 {
            return Err(ExifError::BadHeader);
        }
        let mut primary = read_ifd(tiff, order, order.u32(tiff, 4)? as usize)?;
        let exif = read_sub_ifd(tiff, order, primary.get(&EXIF_IFD_POINTER));
        let gps = read_sub_ifd(tiff, order, primary.get(&GPS_IFD_POINTER));
        primary.retain(|tag, _| DESCRIPTIVE_TAGS.contains(tag));
        Ok(Self { primary, exif, gps })
    }

    fn dir(&self, ifd: Ifd) -> &BTreeMap<u16, Entry> {
        match ifd {
            Ifd::Primary => &self.primary,
            Ifd::Exif => &self.exif,
            Ifd::Gps => &self.gps,
        }
    }

    fn dir_mut(&mut self, ifd: Ifd) -> &mut BTreeMap<u16, Entry> {
        match ifd {
            Ifd::Primary => &mut self.primary,
            Ifd::Exif => &mut self.exif,
            Ifd::Gps => &mut self.gps,
        }
    }

    /// Set an IFD0 ASCII tag (NUL-terminated UTF-8), replacing any previous
    /// value.
    pub fn set_ascii(&mut self, tag: u16, value: &str) -> Result<(), ExifError> {
        self.set_ascii_in(Ifd::Primary, tag, value)
    }

    pub fn set_ascii_in(&mut self, ifd: Ifd, tag: u16, value: &str) -> Result<(), ExifError> {
        let mut data = Vec::with_capacity(value.len() + 1);
        data.extend_from_slice(value.as_bytes());
        data.push(0);
        if data.len() > MAX_BLOCK_LEN {
            return Err(ExifError::TooLarge(data.len()));
        }
        self.dir_mut(ifd).insert(
            tag,
            Entry {
                field_type: TYPE_ASCII,
                count: data.len() as u32,
                data,
            },
        );
        Ok(())
    }

    /// Read an IFD0 ASCII tag back as a string.
    pub fn ascii(&self, tag: u16) -> Option<String> {
        self.ascii_in(Ifd::Primary, tag)
    }

    pub fn ascii_in(&self, ifd: Ifd, tag: u16) -> Option<String> {
        let entry = self.get_in(ifd, tag)?;
        if entry.field_type != TYPE_ASCII {
            return None;
        }
        let text = entry.data.split(|b| *b == 0).next().unwrap_or(&[]);
        Some(String::from_utf8_lossy(text).into_owned())
    }

    pub fn get(&self, tag: u16) -> Option<&Entry> {
        self.get_in(Ifd::Primary, tag)
    }

    pub fn get_in(&self, ifd: Ifd, tag: u16) -> Option<&Entry> {
        self.dir(ifd).get(&tag)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries across all directories.
    pub fn len(&self) -> usize {
        self.primary.len() + self.exif.len() + self.gps.len()
    }

    /// Serialize as a little-endian TIFF block: IFD0, then the Exif and GPS
    /// directories when they have entries, each followed by its value heap.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ExifError> {
        let mut primary = self.primary.clone();
        if !self.exif.is_empty() {
            primary.insert(EXIF_IFD_POINTER, Entry::pointer(0));
        }
        if !self.gps.is_empty() {
            primary.insert(GPS_IFD_POINTER, Entry::pointer(0));
        }

        let exif_at = 8 + ifd_len(&primary);
        let gps_at = exif_at + ifd_len(&self.exif);
        let total = gps_at + ifd_len(&self.gps);
        if total > MAX_BLOCK_LEN {
            return Err(ExifError::TooLarge(total));
        }
        if let Some(p) = primary.get_mut(&EXIF_IFD_POINTER) {
            *p = Entry::pointer(exif_at as u32);
        }
        if let Some(p) = primary.get_mut(&GPS_IFD_POINTER) {
            *p = Entry::pointer(gps_at as u32);
        }

        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(b"II");
        out.extend_from_slice(&42u16.to_le_bytes());
        out.extend_from_slice(&8u32.to_le_bytes());
        write_ifd(&mut out, &primary);
        write_ifd(&mut out, &self.exif);
        write_ifd(&mut out, &self.gps);
        Ok(out)
    }
}

/// Bytes a directory occupies when written: count, entries, next-IFD
/// offset, then out-of-line values padded to even length. Zero if empty.
fn ifd_len(entries: &BTreeMap<u16, Entry>) -> usize {
    if entries.is_empty() {
        return 0;
    }
    let heap: usize = entries
        .values()
        .filter(|e| e.data.len() > 4)
        .map(|e| e.data.len().next_multiple_of(2))
        .sum();
    2 + entries.len() * 12 + 4 + heap
}

/// Append one directory at the end of `out`. Empty directories are skipped.
/// The caller has already bounded the total size.
fn write_ifd(out: &mut Vec<u8>, entries: &BTreeMap<u16, Entry>) {
    if entries.is_empty() {
        return;
    }
    let heap_start = out.len() + 2 + entries.len() * 12 + 4;
    let mut heap: Vec<u8> = Vec::new();
    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for (tag, entry) in entries {
        out.extend_from_slice(&tag.to_le_bytes());
        out.extend_from_slice(&entry.field_type.to_le_bytes());
        out.extend_from_slice(&entry.count.to_le_bytes());
        if entry.data.len() <= 4 {
            let mut inline = [0u8; 4];
            inline[..entry.data.len()].copy_from_slice(&entry.data);
            out.extend_from_slice(&inline);
        } else {
            out.extend_from_slice(&((heap_start + heap.len()) as u32).to_le_bytes());
            heap.extend_from_slice(&entry.data);
            if heap.len() % 2 == 1 {
                heap.push(0);
            }
        }
    }
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&heap);
}

/// Every entry of the directory at `ifd` with a known type and in-range data.
fn read_ifd(
    tiff: &[u8],
    order: ByteOrder,
    ifd: usize,
) -> Result<BTreeMap<u16, Entry>, ExifError> {
    let count = order.u16(tiff, ifd)? as usize;
    let mut entries = BTreeMap::new();
    for i in 0..count {
        let at = ifd + 2 + i * 12;
        let tag = order.u16(tiff, at)?;
        let field_type = order.u16(tiff, at + 2)?;
        let n = order.u32(tiff, at + 4)?;
        let Some((unit, width)) = type_layout(field_type) else {
            continue;
        };
        let Some(size) = (n as usize).checked_mul(unit) else {
            continue;
        };
        let start = if size <= 4 {
            at + 8
        } else {
            order.u32(tiff, at + 8)? as usize
        };
        let Some(raw) = start.checked_add(size).and_then(|end| tiff.get(start..end)) else {
            continue;
        };
        entries.insert(
            tag,
            Entry {
                field_type,
                count: n,
                data: order.to_little(raw, width),
            },
        );
    }
    Ok(entries)
}

/// Follow a sub-IFD pointer. Missing, dangling or broken directories come
/// back empty; nested pointers inside them are dropped.
fn read_sub_ifd(
    tiff: &[u8],
    order: ByteOrder,
    pointer: Option<&Entry>,
) -> BTreeMap<u16, Entry> {
    let Some(offset) = pointer.and_then(Entry::as_offset) else {
        return BTreeMap::new();
    };
    let mut entries = read_ifd(tiff, order, offset).unwrap_or_default();
    entries.retain(|tag, _| !POINTER_TAGS.contains(tag));
    entries
}

/// Bytes per component and the width of each endian-sensitive unit.
fn type_layout(field_type: u16) -> Option<(usize, usize)> {
    match field_type {
        1 | 2 | 6 | 7 => Some((1, 1)),   // BYTE, ASCII, SBYTE, UNDEFINED
        3 | 8 => Some((2, 2)),           // SHORT, SSHORT
        4 | 9 | 11 | 13 => Some((4, 4)), // LONG, SLONG, FLOAT, IFD
        5 | 10 => Some((8, 4)),          // RATIONAL, SRATIONAL: two LONGs
        12 => Some((8, 8)),              // DOUBLE
        _ => None,
    }
}

#[derive(Debug, Clone, Copy)]
enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    fn u16(self, data: &[u8], at: usize) -> Result<u16, ExifError> {
        let b: [u8; 2] = at
            .checked_add(2)
            .and_then(|end| data.get(at..end))
            .and_then(|s| s.try_into().ok())
            .ok_or(ExifError::Truncated)?;
        Ok(match self {
            Self::Little => u16::from_le_bytes(b),
            Self::Big => u16::from_be_bytes(b),
        })
    }

    fn u32(self, data: &[u8], at: usize) -> Result<u32, ExifError> {
        let b: [u8; 4] = at
            .checked_add(4)
            .and_then(|end| data.get(at..end))
            .and_then(|s| s.try_into().ok())
            .ok_or(ExifError::Truncated)?;
        Ok(match self {
            Self::Little => u32::from_le_bytes(b),
            Self::Big => u32::from_be_bytes(b),
        })
    }

    fn to_little(self, raw: &[u8], width: usize) -> Vec<u8> {
        match self {
            Self::Little => raw.to_vec(),
            Self::Big => raw
                .chunks(width)
                .flat_map(|unit| unit.iter().rev().copied())
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// APP1 payload framing
// ---------------------------------------------------------------------------

/// Drop a leading `Exif\0\0`, which some containers keep in front of the
/// TIFF header.
pub fn strip_header(data: &[u8]) -> &[u8] {
    data.strip_prefix(EXIF_HEADER).unwrap_or(data)
}

/// `Exif\0\0` followed by the block: the body of a JPEG APP1 segment.
pub fn app1_payload(tiff: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(EXIF_HEADER.len() + tiff.len());
    payload.extend_from_slice(EXIF_HEADER);
    payload.extend_from_slice(tiff);
    payload
}
