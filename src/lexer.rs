//! C2: the marker-stream lexer. Turns a raw byte source into a sequence of
//! markers, segment payloads and entropy-coded runs. Knows nothing about
//! what any particular marker *means* — that is the segment parsers'
//! (C3) and the driver's (C7) job.

use crate::byte_source::ByteSource;
use crate::error::JpegError;
use crate::marker::{self, Marker};

pub struct Lexer<S: ByteSource> {
    source: S,
}

impl<S: ByteSource> Lexer<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Reads one marker code. Skips any run of 0xFF fill bytes that
    /// precedes it. Fails fatally if the code is one of the reserved
    /// ranges (0xF0..=0xFD, 0xC8).
    pub fn read_marker(&mut self) -> Result<Marker, JpegError> {
        let mut saw_prefix = false;
        loop {
            let b = self.source.next_byte().ok_or(JpegError::TruncatedMarkerType)?;
            if b == marker::MARKER_START_BYTE {
                saw_prefix = true;
                continue;
            }
            if !saw_prefix {
                return Err(JpegError::InvalidMarkerPrefix);
            }
            return marker::reject_reserved(Marker::classify(b));
        }
    }

    /// Reads a segment's 2-byte big-endian length field and the payload
    /// that follows it (length includes the two length bytes themselves).
    pub fn read_segment_payload(&mut self) -> Result<Vec<u8>, JpegError> {
        let hi = self.source.next_byte().ok_or(JpegError::TruncatedSegmentHeader)?;
        let lo = self.source.next_byte().ok_or(JpegError::TruncatedSegmentHeader)?;
        let length = u16::from_be_bytes([hi, lo]);
        if length < 2 {
            return Err(JpegError::InvalidSegmentLength(length));
        }
        let body_len = (length - 2) as usize;
        self.source
            .read_exact(body_len)
            .ok_or(JpegError::TruncatedSegmentBody { expected: length - 2 })
    }

    /// Reads one entropy-coded run: bytes up to (but not including) the
    /// next real marker, with `0xFF 0x00` byte-stuffing collapsed back to a
    /// literal `0xFF`. Returns the collapsed bytes plus the marker that
    /// terminated the run (already consumed from the source).
    pub fn read_ecs(&mut self) -> Result<(Vec<u8>, Marker), JpegError> {
        let mut bytes = Vec::new();
        loop {
            let b = self.source.next_byte().ok_or(JpegError::TruncatedEcs)?;
            if b != marker::MARKER_START_BYTE {
                bytes.push(b);
                continue;
            }
            let mut next = self.source.next_byte().ok_or(JpegError::TruncatedEcs)?;
            if next == 0x00 {
                bytes.push(marker::MARKER_START_BYTE);
                continue;
            }
            // Fill bytes (0xFF) may precede the real marker code, same as
            // at the top level.
            while next == marker::MARKER_START_BYTE {
                next = self.source.next_byte().ok_or(JpegError::TruncatedEcs)?;
            }
            let terminator = marker::reject_reserved(Marker::classify(next))?;
            return Ok((bytes, terminator));
        }
    }
}
