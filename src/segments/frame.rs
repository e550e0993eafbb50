//! SOFn segment parsing (frame header).

use crate::error::JpegError;
use crate::marker::FrameEncoding;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameComponent {
    pub id: u8,
    pub h: u8,
    pub v: u8,
    pub quant_selector: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub encoding: FrameEncoding,
    pub precision: u8,
    pub width: u16,
    /// 0 when deferred to a later DNL segment.
    pub height: u16,
    pub components: Vec<FrameComponent>,
}

impl FrameHeader {
    pub fn index_of(&self, id: u8) -> Option<usize> {
        self.components.iter().position(|c| c.id == id)
    }
}

pub fn parse(encoding: FrameEncoding, payload: &[u8]) -> Result<FrameHeader, JpegError> {
    if payload.len() < 6 {
        return Err(JpegError::TruncatedSegmentBody { expected: 6 });
    }
    let precision = payload[0];
    let height = u16::from_be_bytes([payload[1], payload[2]]);
    let width = u16::from_be_bytes([payload[3], payload[4]]);
    let component_count = payload[5];

    let precision_ok = match encoding {
        FrameEncoding::Baseline => precision == 8,
        FrameEncoding::ExtendedSequential | FrameEncoding::Progressive => precision == 8 || precision == 12,
    };
    if !precision_ok {
        return Err(JpegError::InvalidFramePrecision(precision));
    }
    if width == 0 {
        return Err(JpegError::InvalidFrameWidth);
    }
    if component_count == 0 || (encoding == FrameEncoding::Progressive && component_count > 4) {
        return Err(JpegError::InvalidFrameComponentCount(component_count));
    }

    let expected_len = 6 + 3 * component_count as usize;
    if payload.len() != expected_len {
        return Err(JpegError::SegmentLengthMismatch);
    }

    let mut components = Vec::with_capacity(component_count as usize);
    for idx in 0..component_count as usize {
        let off = 6 + 3 * idx;
        let id = payload[off];
        let hv = payload[off + 1];
        let h = hv >> 4;
        let v = hv & 0x0F;
        let quant_selector = payload[off + 2];
        if h == 0 || h > 4 || v == 0 || v > 4 {
            return Err(JpegError::InvalidSamplingFactors { h, v });
        }
        if quant_selector > 3 {
            return Err(JpegError::InvalidQuantSelector(quant_selector));
        }
        if components.iter().any(|c: &FrameComponent| c.id == id) {
            return Err(JpegError::DuplicateComponentId(id));
        }
        components.push(FrameComponent { id, h, v, quant_selector });
    }

    Ok(FrameHeader { encoding, precision, width, height, components })
}
