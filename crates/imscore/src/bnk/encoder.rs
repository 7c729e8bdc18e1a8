//! BNK file encoder.
//!
//! Fixed layout:
//!
//! | Region | Offset | Size | Content |
//! |--------|--------|------|---------|
//! | header | 0      | 2    | version = 1 (u16 LE) |
//! |        | 2      | 6    | signature `"ADLIB-"` |
//! |        | 8      | 2    | `insMaxNum` (u16 LE) |
//! |        | 10     | 2    | padding |
//! |        | 12     | 4    | `insListOff` = 20 (u32 LE) |
//! |        | 16     | 4    | `insDataOff` = 20 + 12·N (u32 LE) |
//! | list   | 20     | 12·N | directory, sorted by lowercased name |
//! | data   | 20+12·N | 30·N | patch records in instrument-id order |
use crate::binutil::{write_slice, write_str_padded, write_u8, write_u16, write_u32};
use crate::opl::patch::Instrument;
use crate::transcode::TranscodeError;

pub(crate) const BNK_VERSION: u16 = 1;
pub(crate) const BNK_SIGNATURE: &[u8; 6] = b"ADLIB-";
pub(crate) const BNK_HEADER_BYTES: usize = 20;
pub(crate) const DIR_ENTRY_BYTES: usize = 12;
pub(crate) const DATA_ENTRY_BYTES: usize = 30;

/// Maximum directory-name length; the field is 9 bytes NUL-padded.
const NAME_CHARS: usize = 8;

/// Encode a BNK instrument bank.
///
/// The directory is sorted case-insensitively so a reader's binary
/// search terminates; should two instruments carry the same name, the
/// later one gets a numeric suffix. `insIndex` in each directory entry
/// is the instrument id, which is also its slot in the data section.
pub fn encode_bnk(instruments: &[Instrument]) -> Result<Vec<u8>, TranscodeError> {
    let count = instruments.len();
    let data_off = BNK_HEADER_BYTES + DIR_ENTRY_BYTES * count;
    let total = data_off + DATA_ENTRY_BYTES * count;

    let mut directory: Vec<(String, u16)> = Vec::with_capacity(count);
    for instrument in instruments {
        let name = unique_name(&instrument.name, &directory)?;
        directory.push((name, instrument.id));
    }
    directory.sort_by(|a, b| a.0.to_ascii_lowercase().cmp(&b.0.to_ascii_lowercase()));

    let mut out = vec![0u8; total];
    write_u16(&mut out, 0, BNK_VERSION);
    write_slice(&mut out, 2, BNK_SIGNATURE);
    write_u16(&mut out, 8, count as u16);
    write_u32(&mut out, 12, BNK_HEADER_BYTES as u32);
    write_u32(&mut out, 16, data_off as u32);

    for (i, (name, id)) in directory.iter().enumerate() {
        let off = BNK_HEADER_BYTES + DIR_ENTRY_BYTES * i;
        write_u16(&mut out, off, *id);
        write_u8(&mut out, off + 2, 0x01);
        write_str_padded(&mut out, off + 3, name, NAME_CHARS);
    }

    for instrument in instruments {
        let off = data_off + DATA_ENTRY_BYTES * instrument.id as usize;
        write_u8(&mut out, off, 0);
        write_u8(&mut out, off + 1, instrument.id as u8);
        write_slice(&mut out, off + 2, &instrument.params);
    }

    Ok(out)
}

/// Resolve `name` against the names already in the directory.
///
/// Comparison is case-insensitive, matching the reader's lookup. A taken
/// name gets suffixes `2..=99` appended, shortening the base as needed
/// to stay within the field; running out of suffixes is a
/// `NameCollision` error.
fn unique_name(name: &str, directory: &[(String, u16)]) -> Result<String, TranscodeError> {
    let taken = |candidate: &str| {
        directory
            .iter()
            .any(|(existing, _)| existing.eq_ignore_ascii_case(candidate))
    };

    let base: String = name.chars().take(NAME_CHARS).collect();
    if !taken(&base) {
        return Ok(base);
    }

    for suffix in 2..=99u32 {
        let digits = suffix.to_string();
        let keep = NAME_CHARS - digits.len();
        let candidate: String = base.chars().take(keep).chain(digits.chars()).collect();
        if !taken(&candidate) {
            return Ok(candidate);
        }
    }

    Err(TranscodeError::NameCollision(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binutil::{read_u16_le_at, read_u32_le_at};
    use crate::opl::patch::PATCH_BYTES;

    fn instrument(id: u16, name: &str, fill: u8) -> Instrument {
        Instrument {
            id,
            name: name.to_string(),
            params: [fill; PATCH_BYTES],
        }
    }

    #[test]
    fn test_empty_bank() {
        let bytes = encode_bnk(&[]).unwrap();
        assert_eq!(bytes.len(), 20);
        assert_eq!(read_u16_le_at(&bytes, 0).unwrap(), 1);
        assert_eq!(&bytes[2..8], b"ADLIB-");
        assert_eq!(read_u16_le_at(&bytes, 8).unwrap(), 0);
        assert_eq!(read_u32_le_at(&bytes, 12).unwrap(), 20);
        assert_eq!(read_u32_le_at(&bytes, 16).unwrap(), 20);
    }

    #[test]
    fn test_layout_and_data_records() {
        let instruments = [instrument(0, "inst_00", 0x11), instrument(1, "inst_01", 0x22)];
        let bytes = encode_bnk(&instruments).unwrap();

        assert_eq!(bytes.len(), 20 + 2 * 12 + 2 * 30);
        assert_eq!(read_u16_le_at(&bytes, 8).unwrap(), 2);
        let data_off = read_u32_le_at(&bytes, 16).unwrap() as usize;
        assert_eq!(data_off, 20 + 2 * 12);

        // First directory entry: index, flag, padded name.
        assert_eq!(read_u16_le_at(&bytes, 20).unwrap(), 0);
        assert_eq!(bytes[22], 0x01);
        assert_eq!(&bytes[23..32], b"inst_00\0\0");

        // Data records sit at id-indexed slots.
        assert_eq!(bytes[data_off], 0);
        assert_eq!(bytes[data_off + 1], 0);
        assert_eq!(&bytes[data_off + 2..data_off + 30], &[0x11; 28]);
        assert_eq!(bytes[data_off + 30], 0);
        assert_eq!(bytes[data_off + 31], 1);
        assert_eq!(&bytes[data_off + 32..data_off + 60], &[0x22; 28]);
    }

    #[test]
    fn test_directory_sorted_case_insensitively() {
        let instruments = [
            instrument(0, "Zed", 0),
            instrument(1, "alpha", 1),
            instrument(2, "Beta", 2),
        ];
        let bytes = encode_bnk(&instruments).unwrap();

        let mut names = Vec::new();
        for i in 0..3 {
            let off = 20 + 12 * i + 3;
            let field = &bytes[off..off + 9];
            let end = field.iter().position(|&b| b == 0).unwrap_or(9);
            names.push(String::from_utf8_lossy(&field[..end]).to_string());
        }
        assert_eq!(names, vec!["alpha", "Beta", "Zed"]);
        for pair in names.windows(2) {
            assert!(pair[0].to_ascii_lowercase() < pair[1].to_ascii_lowercase());
        }

        // insIndex still points at the original instrument ids.
        assert_eq!(read_u16_le_at(&bytes, 20).unwrap(), 1);
        assert_eq!(read_u16_le_at(&bytes, 32).unwrap(), 2);
        assert_eq!(read_u16_le_at(&bytes, 44).unwrap(), 0);
    }

    #[test]
    fn test_colliding_names_get_suffixes() {
        let instruments = [
            instrument(0, "organ", 0),
            instrument(1, "Organ", 1),
            instrument(2, "organ", 2),
        ];
        let bytes = encode_bnk(&instruments).unwrap();

        let mut names = Vec::new();
        for i in 0..3 {
            let off = 20 + 12 * i + 3;
            let field = &bytes[off..off + 9];
            let end = field.iter().position(|&b| b == 0).unwrap_or(9);
            names.push(String::from_utf8_lossy(&field[..end]).to_string());
        }
        names.sort();
        assert_eq!(names, vec!["Organ2", "organ", "organ3"]);
    }
}
