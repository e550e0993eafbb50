use crate::error::JpegError;

pub const MARKER_START_BYTE: u8 = 0xFF;
pub const RESTART_MARKER_BASE: u8 = 0xD0;
pub const RESTART_MARKER_RANGE: u8 = 8;
pub const APP_MARKER_BASE: u8 = 0xE0;
pub const APP_MARKER_RANGE: u8 = 16;

/// The three frame coding processes this crate actually decodes headers for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEncoding {
    Baseline,
    ExtendedSequential,
    Progressive,
}

/// A classified marker code. `Reserved` is fatal the moment the lexer sees
/// it; `Unsupported` is a recognized ITU-T T.81 marker for a coding process
/// this crate does not implement (arithmetic, lossless, hierarchical) and is
/// fatal once the driver reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    StartOfImage,
    EndOfImage,
    StartOfScan,
    DefineHuffmanTable,
    DefineQuantizationTable,
    DefineRestartInterval,
    DefineNumberOfLines,
    Comment,
    App(u8),
    Restart(u8),
    Sof(FrameEncoding, u8),
    Unsupported(u8),
    Reserved(u8),
}

impl Marker {
    /// Classify a raw marker code byte (the byte that followed the 0xFF
    /// marker prefix). Never fails; reserved and unsupported codes are
    /// returned as such so callers can decide when to reject them.
    pub fn classify(byte: u8) -> Marker {
        match byte {
            0xD8 => Marker::StartOfImage,
            0xD9 => Marker::EndOfImage,
            0xDA => Marker::StartOfScan,
            0xC4 => Marker::DefineHuffmanTable,
            0xDB => Marker::DefineQuantizationTable,
            0xDD => Marker::DefineRestartInterval,
            0xDC => Marker::DefineNumberOfLines,
            0xFE => Marker::Comment,
            0xC0 => Marker::Sof(FrameEncoding::Baseline, byte),
            0xC1 => Marker::Sof(FrameEncoding::ExtendedSequential, byte),
            0xC2 => Marker::Sof(FrameEncoding::Progressive, byte),
            RESTART_MARKER_BASE..=0xD7 => Marker::Restart(byte - RESTART_MARKER_BASE),
            APP_MARKER_BASE..=0xEF => Marker::App(byte - APP_MARKER_BASE),
            0xC8 => Marker::Reserved(byte),
            0xF0..=0xFD => Marker::Reserved(byte),
            // SOF3 (lossless), SOF5-7 (differential), SOF9-11 (arithmetic),
            // SOF13-15 (differential arithmetic), DAC, DHP, EXP.
            0xC3 | 0xC5..=0xC7 | 0xC9..=0xCF | 0xDE | 0xDF => Marker::Unsupported(byte),
            _ => Marker::Unsupported(byte),
        }
    }

    pub fn is_standalone(self) -> bool {
        matches!(self, Marker::StartOfImage | Marker::EndOfImage | Marker::Restart(_))
    }

    pub fn is_reserved(self) -> bool {
        matches!(self, Marker::Reserved(_))
    }
}

pub(crate) fn reject_reserved(marker: Marker) -> Result<Marker, JpegError> {
    if let Marker::Reserved(code) = marker {
        Err(JpegError::ReservedMarkerCode(code))
    } else {
        Ok(marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_standalone_markers() {
        assert_eq!(Marker::classify(0xD8), Marker::StartOfImage);
        assert_eq!(Marker::classify(0xD9), Marker::EndOfImage);
        assert!(Marker::classify(0xD8).is_standalone());
        assert!(Marker::classify(0xD3).is_standalone());
        assert!(!Marker::classify(0xDA).is_standalone());
    }

    #[test]
    fn classifies_restart_phase() {
        assert_eq!(Marker::classify(0xD0), Marker::Restart(0));
        assert_eq!(Marker::classify(0xD7), Marker::Restart(7));
    }

    #[test]
    fn classifies_app_index() {
        assert_eq!(Marker::classify(0xE0), Marker::App(0));
        assert_eq!(Marker::classify(0xEE), Marker::App(14));
    }

    #[test]
    fn classifies_reserved_codes() {
        assert!(Marker::classify(0xC8).is_reserved());
        assert!(Marker::classify(0xF3).is_reserved());
        assert!(!Marker::classify(0xC0).is_reserved());
    }

    #[test]
    fn classifies_unsupported_frame_processes() {
        assert_eq!(Marker::classify(0xC3), Marker::Unsupported(0xC3));
        assert_eq!(Marker::classify(0xC9), Marker::Unsupported(0xC9));
    }

    #[test]
    fn reject_reserved_fails_only_on_reserved() {
        assert!(reject_reserved(Marker::classify(0xC8)).is_err());
        assert!(reject_reserved(Marker::classify(0xD8)).is_ok());
    }
}
