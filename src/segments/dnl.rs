//! DNL segment parsing: a single big-endian u16 redefining the frame's
//! line count after the first scan, for streams that deferred the height
//! (height 0 in the frame header) until it was known.

use crate::error::JpegError;

pub fn parse(payload: &[u8]) -> Result<u16, JpegError> {
    if payload.len() != 2 {
        return Err(JpegError::SegmentLengthMismatch);
    }
    Ok(u16::from_be_bytes([payload[0], payload[1]]))
}
