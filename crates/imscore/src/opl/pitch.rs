//! Pitch reconstruction from OPL2 frequency registers.
//!
//! The chip encodes pitch as a 10-bit F-Number plus a 3-bit block
//! (octave). An IMS player works the other way around: it looks a MIDI
//! note up in a fixed 12-entry F-Number table and programs the chip from
//! that. Lifting a register trace back to notes therefore snaps each
//! observed F-Number onto the table: the first entry at or above the
//! observed value wins, and values past the top of the table clamp to
//! the last entry.

/// F-Numbers the IMS player uses for the 12 semitones of one octave.
pub const FREQ_NUMS: [u16; 12] = [343, 363, 385, 408, 432, 458, 485, 514, 544, 577, 611, 647];

/// Offset between the player's middle C and the chip's middle octave.
///
/// The player subtracts this from the note number at playback time, so
/// the lift has to add it back.
const CHIP_NOTE_OFFSET: u8 = 12;

/// Semitone index in `FREQ_NUMS` for an observed F-Number.
///
/// Returns the index of the first table entry greater than or equal to
/// `fnum`; F-Numbers above the last entry clamp to index 11. Exact table
/// members map to their own index.
pub fn nearest_note(fnum: u16) -> usize {
    FREQ_NUMS
        .iter()
        .position(|&reference| fnum <= reference)
        .unwrap_or(FREQ_NUMS.len() - 1)
}

/// MIDI note for a `(block, fnum)` pair.
///
/// `block` is masked to its 3 chip bits, so the result is always within
/// 0..=127.
pub fn midi_note(block: u8, fnum: u16) -> u8 {
    (block & 0x07) * 12 + nearest_note(fnum) as u8 + CHIP_NOTE_OFFSET
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_table_entries() {
        for (index, &fnum) in FREQ_NUMS.iter().enumerate() {
            assert_eq!(nearest_note(fnum), index);
            for block in 0..8u8 {
                assert_eq!(midi_note(block, fnum), block * 12 + index as u8 + 12);
            }
        }
    }

    #[test]
    fn test_snapping_between_entries() {
        // 626 sits between 611 and 647 and snaps up to 647.
        assert_eq!(nearest_note(626), 11);
        assert_eq!(nearest_note(344), 1);
        // Below and above the table clamp to the ends.
        assert_eq!(nearest_note(0), 0);
        assert_eq!(nearest_note(100), 0);
        assert_eq!(nearest_note(1023), 11);
    }

    #[test]
    fn test_midi_note_range() {
        assert_eq!(midi_note(0, 0), 12);
        assert_eq!(midi_note(7, 1023), 7 * 12 + 11 + 12);
        assert!(midi_note(7, 1023) <= 127);
    }

    #[test]
    fn test_single_note_scenario_pitch() {
        // fnum 0x272 = 626 at block 3: 3*12 + 11 + 12.
        assert_eq!(midi_note(3, 0x272), 59);
    }
}
