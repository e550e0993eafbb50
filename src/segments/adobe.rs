//! APP14 Adobe segment parsing. Narrow supplementary parser: only the
//! color-transform tag is extracted, never acted upon (color conversion is
//! out of scope for this crate).

use crate::error::JpegError;

const ADOBE_SIGNATURE: [u8; 6] = *b"Adobe\0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdobeColorTransform {
    /// RGB or CMYK, transform byte 0.
    Unknown,
    YCbCr,
    YCCK,
}

pub fn looks_like_adobe(payload: &[u8]) -> bool {
    payload.len() >= 12 && payload[0..6] == ADOBE_SIGNATURE
}

pub fn parse(payload: &[u8]) -> Result<AdobeColorTransform, JpegError> {
    if !looks_like_adobe(payload) {
        return Err(JpegError::InvalidAdobeSignature);
    }
    match payload[11] {
        0 => Ok(AdobeColorTransform::Unknown),
        1 => Ok(AdobeColorTransform::YCbCr),
        2 => Ok(AdobeColorTransform::YCCK),
        other => Err(JpegError::InvalidAdobeColorTransform(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(transform: u8) -> Vec<u8> {
        let mut v = ADOBE_SIGNATURE.to_vec();
        v.extend_from_slice(&[0, 0, 0, 0, 0, transform]);
        v
    }

    #[test]
    fn parses_ycbcr_transform() {
        assert_eq!(parse(&sample(1)).unwrap(), AdobeColorTransform::YCbCr);
    }

    #[test]
    fn rejects_bad_signature() {
        let mut data = sample(1);
        data[0] = 0;
        assert_eq!(parse(&data), Err(JpegError::InvalidAdobeSignature));
    }

    #[test]
    fn rejects_unknown_transform_code() {
        assert_eq!(parse(&sample(9)), Err(JpegError::InvalidAdobeColorTransform(9)));
    }
}
