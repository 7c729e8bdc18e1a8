//! Read-side IMS parser.
//!
//! Implements the loader's view of an IMS file, used to pin down the
//! writer's layout: fixed header fields, the music data consumed in
//! 32 KiB pages, and the instrument-name footer.
use crate::binutil::{ParseError, read_slice, read_u8_at, read_u16_le_at, read_u32_le_at};
use crate::ims::encoder::IMS_HEADER_BYTES;

/// Page granularity at which players load the music data.
pub const PAGE_BYTES: usize = 32 * 1024;

/// An IMS file as seen by a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImsSong {
    pub song_name: String,
    pub byte_size: u32,
    pub d_mode: u8,
    pub basic_tempo: u16,
    /// Music-data stream with the page boundaries already joined back
    /// together; ends with the `0xFC` loop marker.
    pub music_data: Vec<u8>,
    pub instrument_names: Vec<String>,
}

impl ImsSong {
    /// Parse an IMS file.
    ///
    /// Mirrors the player's read order: the name field at 6, `byteSize`
    /// at 42, `dMode` at 58 and `basicTempo` at 60, then `byteSize`
    /// bytes of music data in 32 KiB pages, one separator byte, and the
    /// instrument-name list.
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        let name_field = read_slice(bytes, 6, 30)?;
        let song_name = string_from_padded(name_field);
        let byte_size = read_u32_le_at(bytes, 42)?;
        let d_mode = read_u8_at(bytes, 58)?;
        let basic_tempo = read_u16_le_at(bytes, 60)?;

        let mut music_data = Vec::with_capacity(byte_size as usize);
        let mut off = IMS_HEADER_BYTES;
        let mut remaining = byte_size as usize;
        while remaining > 0 {
            let page = remaining.min(PAGE_BYTES);
            music_data.extend_from_slice(read_slice(bytes, off, page)?);
            off += page;
            remaining -= page;
        }

        // Separator byte between music data and the instrument list.
        read_u8_at(bytes, off)?;
        off += 1;

        let ins_num = read_u16_le_at(bytes, off)?;
        off += 2;
        let mut instrument_names = Vec::with_capacity(ins_num as usize);
        for _ in 0..ins_num {
            let record = read_slice(bytes, off, 9)?;
            instrument_names.push(string_from_padded(record));
            off += 9;
        }

        Ok(ImsSong {
            song_name,
            byte_size,
            d_mode,
            basic_tempo,
            music_data,
            instrument_names,
        })
    }
}

/// Decode a NUL-padded ASCII field into a `String`.
fn string_from_padded(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ims::encoder::{LOOP_MARKER, encode_ims};
    use crate::ims::event::{ImsEvent, ImsEventKind};

    #[test]
    fn test_round_trip_header_fields() {
        let events = [ImsEvent {
            kind: ImsEventKind::Note {
                pitch: 59,
                velocity: 127,
            },
            channel: 0,
            abs_tick: 0,
            order: 0,
        }];
        let names = vec![String::from("inst_00")];
        let bytes = encode_ims("roundtrip", 150, 1, &events, &names);

        let song = ImsSong::parse(&bytes).unwrap();
        assert_eq!(song.song_name, "roundtrip");
        assert_eq!(song.basic_tempo, 150);
        assert_eq!(song.d_mode, 1);
        assert_eq!(song.byte_size as usize, song.music_data.len());
        assert_eq!(*song.music_data.last().unwrap(), LOOP_MARKER);
        assert_eq!(song.instrument_names, names);
    }

    #[test]
    fn test_multi_page_music_data() {
        // Enough events to push the music data past one 32 KiB page.
        let mut events = Vec::new();
        for i in 0..9000u32 {
            events.push(ImsEvent {
                kind: ImsEventKind::Note {
                    pitch: 60,
                    velocity: if i % 2 == 0 { 127 } else { 0 },
                },
                channel: (i % 9) as u8,
                abs_tick: i,
                order: i,
            });
        }
        let bytes = encode_ims("big", 120, 0, &events, &[]);
        let song = ImsSong::parse(&bytes).unwrap();
        assert!(song.music_data.len() > PAGE_BYTES);
        assert_eq!(song.byte_size as usize, song.music_data.len());
        assert_eq!(*song.music_data.last().unwrap(), LOOP_MARKER);
    }

    #[test]
    fn test_truncated_music_data() {
        let bytes = encode_ims("", 120, 0, &[], &[]);
        let cut = &bytes[..IMS_HEADER_BYTES];
        assert!(matches!(
            ImsSong::parse(cut),
            Err(ParseError::Truncated { .. })
        ));
    }
}
