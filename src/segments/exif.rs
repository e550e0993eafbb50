//! APP1 EXIF segment parsing. Indexes the TIFF header and the root IFD's
//! pointers to the Exif and GPS sub-IFDs; never interprets individual tag
//! values (EXIF editing is out of scope).

use crate::error::JpegError;

const EXIF_SIGNATURE: [u8; 6] = [0x45, 0x78, 0x69, 0x66, 0x00, 0x00];
const EXIF_IFD_POINTER_TAG: u16 = 0x8769;
const GPS_IFD_POINTER_TAG: u16 = 0x8825;
const LONG_TYPE: u16 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exif {
    pub byte_order: ByteOrder,
    pub root_ifd_offset: u32,
    pub root_entry_count: u16,
    pub exif_ifd_offset: Option<u32>,
    pub gps_ifd_offset: Option<u32>,
}

pub fn looks_like_exif(payload: &[u8]) -> bool {
    payload.len() >= 6 && payload[0..6] == EXIF_SIGNATURE
}

fn read_u16(blob: &[u8], offset: usize, order: ByteOrder) -> Result<u16, JpegError> {
    let bytes = blob
        .get(offset..offset + 2)
        .ok_or(JpegError::ExifIfdOffsetOutOfRange(offset as u32))?;
    Ok(match order {
        ByteOrder::Little => u16::from_le_bytes([bytes[0], bytes[1]]),
        ByteOrder::Big => u16::from_be_bytes([bytes[0], bytes[1]]),
    })
}

fn read_u32(blob: &[u8], offset: usize, order: ByteOrder) -> Result<u32, JpegError> {
    let bytes = blob
        .get(offset..offset + 4)
        .ok_or(JpegError::ExifIfdOffsetOutOfRange(offset as u32))?;
    Ok(match order {
        ByteOrder::Little => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        ByteOrder::Big => u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
    })
}

struct IfdEntry {
    tag: u16,
    field_type: u16,
    count: u32,
    value_offset: usize,
}

fn read_ifd(blob: &[u8], offset: usize, order: ByteOrder) -> Result<Vec<IfdEntry>, JpegError> {
    let count = read_u16(blob, offset, order)?;
    let mut entries = Vec::with_capacity(count as usize);
    for i in 0..count {
        let entry_off = offset + 2 + (i as usize) * 12;
        let tag = read_u16(blob, entry_off, order)?;
        let field_type = read_u16(blob, entry_off + 2, order)?;
        let field_count = read_u32(blob, entry_off + 4, order)?;
        entries.push(IfdEntry { tag, field_type, count: field_count, value_offset: entry_off + 8 });
    }
    Ok(entries)
}

pub fn parse(payload: &[u8]) -> Result<Exif, JpegError> {
    if !looks_like_exif(payload) {
        return Err(JpegError::InvalidExifSignature);
    }
    let blob = &payload[6..];
    if blob.len() < 8 {
        return Err(JpegError::InvalidExifSignature);
    }
    let byte_order = match &blob[0..4] {
        [0x49, 0x49, 0x2A, 0x00] => ByteOrder::Little,
        [0x4D, 0x4D, 0x00, 0x2A] => ByteOrder::Big,
        _ => return Err(JpegError::InvalidExifByteOrder),
    };
    let root_ifd_offset = read_u32(blob, 4, byte_order)?;
    let root_entries = read_ifd(blob, root_ifd_offset as usize, byte_order)?;

    let mut exif_ifd_offset = None;
    let mut gps_ifd_offset = None;
    for entry in &root_entries {
        if entry.field_type != LONG_TYPE || entry.count != 1 {
            continue;
        }
        let value = read_u32(blob, entry.value_offset, byte_order)?;
        if entry.tag == EXIF_IFD_POINTER_TAG {
            exif_ifd_offset = Some(value);
        } else if entry.tag == GPS_IFD_POINTER_TAG {
            gps_ifd_offset = Some(value);
        }
    }
    // Confirm the sub-IFDs are actually addressable, without parsing their
    // tags; this is still only indexing, not editing.
    if let Some(off) = exif_ifd_offset {
        read_ifd(blob, off as usize, byte_order)?;
    }
    if let Some(off) = gps_ifd_offset {
        read_ifd(blob, off as usize, byte_order)?;
    }

    Ok(Exif {
        byte_order,
        root_ifd_offset,
        root_entry_count: root_entries.len() as u16,
        exif_ifd_offset,
        gps_ifd_offset,
    })
}
