use thiserror::Error;

/// Flat error taxonomy for the lexer, segment parsers, Huffman builder and
/// driver state machine. Every fallible operation in this crate returns
/// `Result<T, JpegError>`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegError {
    // --- Lexing (C2) ---
    #[error("truncated marker type")]
    TruncatedMarkerType = 1,
    #[error("byte stream does not start with a marker")]
    InvalidMarkerPrefix = 2,
    #[error("reserved marker code 0x{0:02X}")]
    ReservedMarkerCode(u8) = 3,
    #[error("truncated segment header")]
    TruncatedSegmentHeader = 4,
    #[error("segment length {0} is too small to hold the length field itself")]
    InvalidSegmentLength(u16) = 5,
    #[error("truncated segment body, expected {expected} bytes")]
    TruncatedSegmentBody { expected: u16 } = 6,
    #[error("truncated entropy-coded segment")]
    TruncatedEcs = 7,

    // --- Segment parsing (C3) ---
    #[error("invalid JFIF signature")]
    InvalidJfifSignature = 10,
    #[error("invalid JFIF version {major}.{minor:02}")]
    InvalidJfifVersion { major: u8, minor: u8 } = 11,
    #[error("invalid JFIF density unit {0}")]
    InvalidJfifDensityUnit(u8) = 12,
    #[error("invalid EXIF signature")]
    InvalidExifSignature = 13,
    #[error("invalid EXIF byte-order marker")]
    InvalidExifByteOrder = 14,
    #[error("EXIF IFD offset {0} lies outside the segment")]
    ExifIfdOffsetOutOfRange(u32) = 15,
    #[error("segment length does not match its declared payload")]
    SegmentLengthMismatch = 16,
    #[error("invalid Adobe APP14 signature")]
    InvalidAdobeSignature = 70,
    #[error("invalid Adobe color transform code {0}")]
    InvalidAdobeColorTransform(u8) = 71,
    #[error("invalid frame sample precision {0}")]
    InvalidFramePrecision(u8) = 17,
    #[error("invalid frame width 0")]
    InvalidFrameWidth = 18,
    #[error("invalid frame component count {0}")]
    InvalidFrameComponentCount(u8) = 19,
    #[error("invalid sampling factors h={h} v={v}")]
    InvalidSamplingFactors { h: u8, v: u8 } = 20,
    #[error("duplicate frame component identifier {0}")]
    DuplicateComponentId(u8) = 21,
    #[error("invalid quantization table selector {0}")]
    InvalidQuantSelector(u8) = 22,
    #[error("invalid quantization table precision/slot byte 0x{0:02X}")]
    InvalidDqtPrecisionSlot(u8) = 23,
    #[error("invalid Huffman table class/slot byte 0x{0:02X}")]
    InvalidHuffmanClassSlot(u8) = 24,
    #[error("invalid scan component count {0}")]
    InvalidScanComponentCount(u8) = 25,
    #[error("invalid scan DC/AC table selector {0}")]
    InvalidScanSelector(u8) = 26,
    #[error("invalid spectral selection Ss={ss} Se={se}")]
    InvalidSpectralSelection { ss: u8, se: u8 } = 27,
    #[error("invalid successive approximation Ah={ah} Al={al}")]
    InvalidSuccessiveApproximation { ah: u8, al: u8 } = 28,

    // --- Huffman table construction (C4) ---
    #[error("Huffman code length counts are not a valid Kraft-complete code")]
    MalformedHuffmanTable = 30,
    #[error("Huffman table leaf value count does not match its code length counts")]
    HuffmanValueCountMismatch = 31,

    // --- Driver state machine (C7) ---
    #[error("stream does not begin with a start-of-image marker")]
    MissingSoi = 40,
    #[error("duplicate start-of-image marker")]
    DuplicateSoi = 41,
    #[error("duplicate start-of-frame marker")]
    DuplicateSof = 42,
    #[error("unsupported frame coding process, marker 0x{0:02X}")]
    UnsupportedFrameCodingProcess(u8) = 43,
    #[error("start-of-scan marker before any frame header")]
    PrematureSos = 44,
    #[error("end-of-image marker before any frame header")]
    PrematureEoi = 45,
    #[error("define-number-of-lines marker before any scan has completed")]
    PrematureDnl = 46,
    #[error("unexpected define-number-of-lines marker")]
    UnexpectedDnl = 47,
    #[error("unexpected restart marker outside an entropy-coded segment")]
    UnexpectedRestart = 48,
    #[error("restart marker encountered but no restart interval was defined")]
    MissingRestartInterval = 49,
    #[error("restart marker phase mismatch, expected {expected}")]
    InvalidRestartPhase { expected: u8 } = 50,
    #[error("scan refers to undefined component identifier {0}")]
    UndefinedScanComponent(u8) = 51,
    #[error("scan component order does not follow frame component order")]
    ScanComponentOrderViolation = 52,
    #[error("scan refers to undefined DC Huffman table slot {0}")]
    UndefinedDcHuffmanSlot(u8) = 53,
    #[error("scan refers to undefined AC Huffman table slot {0}")]
    UndefinedAcHuffmanSlot(u8) = 54,
    #[error("interleaved scan sampling volume {0} exceeds the standard's limit of 10")]
    InvalidSamplingVolume(u32) = 55,
    #[error("non-monotonic progressive refinement for Ah={ah} Al={al}")]
    NonMonotonicRefinement { ah: u8, al: u8 } = 56,

    // --- Bitstream reader (C8) ---
    #[error("unexpected end of entropy-coded data")]
    UnexpectedEndOfEcs = 60,
}
