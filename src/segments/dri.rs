//! DRI segment parsing: a single big-endian u16 restart interval, in MCUs.
//! Zero means restart markers are not in use.

use crate::error::JpegError;

pub fn parse(payload: &[u8]) -> Result<u16, JpegError> {
    if payload.len() != 2 {
        return Err(JpegError::SegmentLengthMismatch);
    }
    Ok(u16::from_be_bytes([payload[0], payload[1]]))
}
