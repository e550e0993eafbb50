//! APP0 JFIF segment parsing.

use crate::error::JpegError;

const JFIF_SIGNATURE: [u8; 5] = [0x4A, 0x46, 0x49, 0x46, 0x00];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DensityUnit {
    AspectRatio,
    DotsPerInch,
    DotsPerCentimeter,
}

impl DensityUnit {
    fn from_byte(b: u8) -> Result<Self, JpegError> {
        match b {
            0 => Ok(DensityUnit::AspectRatio),
            1 => Ok(DensityUnit::DotsPerInch),
            2 => Ok(DensityUnit::DotsPerCentimeter),
            other => Err(JpegError::InvalidJfifDensityUnit(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jfif {
    pub version: (u8, u8),
    pub density_unit: DensityUnit,
    pub x_density: u16,
    pub y_density: u16,
}

/// Returns `true` if `payload` looks enough like a JFIF APP0 segment to be
/// worth parsing as one; callers fall back to a generic `App` passthrough
/// otherwise, since a non-JFIF APP0 is not an error.
pub fn looks_like_jfif(payload: &[u8]) -> bool {
    payload.len() >= 14 && payload[0..5] == JFIF_SIGNATURE
}

pub fn parse(payload: &[u8]) -> Result<Jfif, JpegError> {
    if !looks_like_jfif(payload) {
        return Err(JpegError::InvalidJfifSignature);
    }
    let major = payload[5];
    let minor = payload[6];
    if major != 1 || minor > 2 {
        return Err(JpegError::InvalidJfifVersion { major, minor });
    }
    let density_unit = DensityUnit::from_byte(payload[7])?;
    let x_density = u16::from_be_bytes([payload[8], payload[9]]);
    let y_density = u16::from_be_bytes([payload[10], payload[11]]);
    Ok(Jfif { version: (major, minor), density_unit, x_density, y_density })
}
