//! C5: quantization table storage. DQT segments install tables into one of
//! four slots; this module only stores values in zigzag wire order, it
//! never dequantizes a coefficient (that belongs to the IDCT stage, out of
//! scope here).

use crate::error::JpegError;

pub const MAX_QUANT_SLOTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantPrecision {
    Eight,
    Sixteen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantTable {
    pub precision: QuantPrecision,
    /// Indexed by zigzag position, exactly as it appears on the wire.
    pub values: [u16; 64],
}

#[derive(Debug, Clone, Default)]
pub struct QuantTableStore {
    slots: [Option<QuantTable>; MAX_QUANT_SLOTS],
}

impl QuantTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&mut self, slot: u8, table: QuantTable) -> Result<(), JpegError> {
        let slot = slot as usize;
        if slot >= MAX_QUANT_SLOTS {
            return Err(JpegError::InvalidQuantSelector(slot as u8));
        }
        self.slots[slot] = Some(table);
        Ok(())
    }

    pub fn get(&self, slot: u8) -> Option<&QuantTable> {
        self.slots.get(slot as usize)?.as_ref()
    }
}
