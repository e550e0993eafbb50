//! DQT segment parsing. A single DQT segment may concatenate several
//! quantization tables.

use crate::error::JpegError;
use crate::quant::{QuantPrecision, QuantTable};

pub fn parse(payload: &[u8]) -> Result<Vec<(u8, QuantTable)>, JpegError> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < payload.len() {
        let flag = payload[i];
        i += 1;
        let precision_bits = flag >> 4;
        let slot = flag & 0x0F;
        if slot > 3 || precision_bits > 1 {
            return Err(JpegError::InvalidDqtPrecisionSlot(flag));
        }
        let precision = if precision_bits == 0 { QuantPrecision::Eight } else { QuantPrecision::Sixteen };
        let entry_bytes = if precision_bits == 0 { 64 } else { 128 };
        if i + entry_bytes > payload.len() {
            return Err(JpegError::TruncatedSegmentBody { expected: entry_bytes as u16 });
        }
        let mut values = [0u16; 64];
        for (k, v) in values.iter_mut().enumerate() {
            *v = if precision_bits == 0 {
                payload[i + k] as u16
            } else {
                u16::from_be_bytes([payload[i + 2 * k], payload[i + 2 * k + 1]])
            };
        }
        i += entry_bytes;
        out.push((slot, QuantTable { precision, values }));
    }
    Ok(out)
}
