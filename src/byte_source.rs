//! C1: the minimal upstream interface the lexer consumes. Any type that can
//! hand back one byte at a time (or signal end-of-stream) can back the
//! decoder, whether it is a memory buffer, a socket, or a file.

use std::io::Read;

pub trait ByteSource {
    /// Returns the next byte, or `None` at end of stream.
    fn next_byte(&mut self) -> Option<u8>;

    /// Reads exactly `n` bytes, or returns `None` if the source runs dry
    /// first. The default implementation calls `next_byte` in a loop;
    /// sources with a contiguous buffer underneath can override this for
    /// an allocation-free fast path.
    fn read_exact(&mut self, n: usize) -> Option<Vec<u8>> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(self.next_byte()?);
        }
        Some(out)
    }
}

/// A byte source over an in-memory buffer, the common case for decoding a
/// fully-loaded JPEG file.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

impl<'a> ByteSource for SliceSource<'a> {
    fn next_byte(&mut self) -> Option<u8> {
        let b = *self.data.get(self.position)?;
        self.position += 1;
        Some(b)
    }

    fn read_exact(&mut self, n: usize) -> Option<Vec<u8>> {
        let end = self.position.checked_add(n)?;
        let slice = self.data.get(self.position..end)?;
        self.position = end;
        Some(slice.to_vec())
    }
}

/// A byte source over any `std::io::Read`, for streaming decode from a file
/// or socket without buffering the whole image up front.
pub struct ReadSource<R: Read> {
    inner: R,
}

impl<R: Read> ReadSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read> ByteSource for ReadSource<R> {
    fn next_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match self.inner.read_exact(&mut byte) {
            Ok(()) => Some(byte[0]),
            Err(_) => None,
        }
    }
}
