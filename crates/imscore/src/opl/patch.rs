//! Instrument patches and the interning table.
//!
//! A patch is the 28-byte parameter vector shared by the IMS player and
//! the BNK bank format: both operators of a channel plus the channel-wide
//! feedback and connection settings. Two patches are equal iff their 28
//! bytes are identical; the table interns them so every distinct sound in
//! a register trace gets exactly one bank entry.
use std::collections::HashMap;

use crate::transcode::TranscodeError;

/// Size of the BNK parameter vector for one instrument.
pub const PATCH_BYTES: usize = 28;

/// An interned instrument: id, generated name, and its parameter vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    /// Interning order; doubles as the index into the BNK data section.
    pub id: u16,
    /// Generated name, at most 8 characters.
    pub name: String,
    /// BNK parameter vector.
    pub params: [u8; PATCH_BYTES],
}

/// Deduplicating table of instrument patches.
///
/// Patches are keyed directly on their parameter bytes; a repeated patch
/// returns the id assigned at its first appearance.
#[derive(Debug, Clone, Default)]
pub struct InstrumentTable {
    instruments: Vec<Instrument>,
    ids: HashMap<[u8; PATCH_BYTES], u16>,
}

impl InstrumentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `params`, interning a new instrument on first
    /// sight.
    ///
    /// New instruments are named `inst_NN` after their id. Returns
    /// `TranscodeError::InstrumentOverflow` once the table holds 65,535
    /// patches, the most a BNK directory can index.
    pub fn intern(&mut self, params: [u8; PATCH_BYTES]) -> Result<u16, TranscodeError> {
        if let Some(&id) = self.ids.get(&params) {
            return Ok(id);
        }

        let next = self.instruments.len();
        if next >= u16::MAX as usize {
            return Err(TranscodeError::InstrumentOverflow);
        }

        let id = next as u16;
        self.instruments.push(Instrument {
            id,
            name: format!("inst_{:02}", id),
            params,
        });
        self.ids.insert(params, id);
        Ok(id)
    }

    /// All interned instruments in id order.
    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning_deduplicates() {
        let mut table = InstrumentTable::new();
        let a = [1u8; PATCH_BYTES];
        let mut b = [1u8; PATCH_BYTES];
        b[27] = 2;

        assert_eq!(table.intern(a).unwrap(), 0);
        assert_eq!(table.intern(b).unwrap(), 1);
        assert_eq!(table.intern(a).unwrap(), 0);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_generated_names() {
        let mut table = InstrumentTable::new();
        let mut params = [0u8; PATCH_BYTES];
        for id in 0..12u8 {
            params[0] = id;
            table.intern(params).unwrap();
        }
        assert_eq!(table.instruments()[0].name, "inst_00");
        assert_eq!(table.instruments()[9].name, "inst_09");
        assert_eq!(table.instruments()[11].name, "inst_11");
    }
}
