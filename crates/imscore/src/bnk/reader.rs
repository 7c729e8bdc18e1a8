//! Read-side BNK loader.
//!
//! Implements the lookup path an AdLib player uses: parse the header,
//! binary-search the sorted directory by lowercased name, and load the
//! 28 parameter bytes of the matching data record.
use crate::binutil::{ParseError, read_slice, read_u16_le_at, read_u32_le_at};
use crate::bnk::encoder::{BNK_SIGNATURE, DATA_ENTRY_BYTES, DIR_ENTRY_BYTES};
use crate::opl::patch::PATCH_BYTES;

/// A parsed BNK bank with its directory and raw data section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BnkBank {
    pub version: u16,
    pub ins_num: u16,
    directory: Vec<(String, u16)>,
    data: Vec<u8>,
}

impl BnkBank {
    /// Parse a BNK file.
    ///
    /// Validates the `"ADLIB-"` signature and materializes the directory
    /// and the data section. The directory is expected to be sorted by
    /// lowercased name, as written by the encoder.
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        let version = read_u16_le_at(bytes, 0)?;
        let signature = read_slice(bytes, 2, 6)?;
        if signature != BNK_SIGNATURE {
            return Err(ParseError::InvalidMagic {
                expected: BNK_SIGNATURE,
                found: signature.to_vec(),
            });
        }

        let ins_num = read_u16_le_at(bytes, 8)?;
        let list_off = read_u32_le_at(bytes, 12)? as usize;
        let data_off = read_u32_le_at(bytes, 16)? as usize;

        let mut directory = Vec::with_capacity(ins_num as usize);
        for i in 0..ins_num as usize {
            let off = list_off + i * DIR_ENTRY_BYTES;
            let index = read_u16_le_at(bytes, off)?;
            let field = read_slice(bytes, off + 3, 9)?;
            let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
            let name = String::from_utf8_lossy(&field[..end]).into_owned();
            directory.push((name, index));
        }

        let data = read_slice(bytes, data_off, DATA_ENTRY_BYTES * ins_num as usize)?.to_vec();

        Ok(BnkBank {
            version,
            ins_num,
            directory,
            data,
        })
    }

    /// Look an instrument up by name and return its 28 parameter bytes.
    ///
    /// The search is a case-insensitive binary search over the sorted
    /// directory; the matched entry's `insIndex` selects the data record
    /// and the record's two prefix bytes (percussion flag and voice
    /// number) are skipped.
    pub fn lookup(&self, name: &str) -> Option<[u8; PATCH_BYTES]> {
        let key = name.to_ascii_lowercase();
        let entry = self
            .directory
            .binary_search_by(|(candidate, _)| candidate.to_ascii_lowercase().cmp(&key))
            .ok()?;
        let index = self.directory[entry].1 as usize;

        let start = index * DATA_ENTRY_BYTES + 2;
        let slice = self.data.get(start..start + PATCH_BYTES)?;
        let mut params = [0u8; PATCH_BYTES];
        params.copy_from_slice(slice);
        Some(params)
    }

    /// Directory entries in file order.
    pub fn directory(&self) -> &[(String, u16)] {
        &self.directory
    }
}
