//! IMS file encoder.
//!
//! Serializes a tick-sorted event list into the fixed IMS layout:
//!
//! | Offset | Size | Content |
//! |--------|------|---------|
//! | 0      | 6    | zero |
//! | 6      | 30   | song name, NUL-padded ASCII |
//! | 36     | 6    | zero |
//! | 42     | 4    | `byteSize` (u32 LE) |
//! | 46     | 12   | zero |
//! | 58     | 1    | `dMode` |
//! | 59     | 1    | zero |
//! | 60     | 2    | `basicTempo` (u16 LE) |
//! | 62     | 9    | zero |
//! | 71     | `byteSize` | music data, terminated by one `0xFC` |
//! | ...    | 1    | zero separator |
//! | ...    | 2    | `insNum` (u16 LE) |
//! | ...    | 9·insNum | instrument names |
//!
//! The music data is written as one flat stream; readers page it at
//! 32 KiB (`reader::PAGE_BYTES`) when loading.
use crate::binutil::{write_str_padded, write_u16, write_u32, write_u8};
use crate::ims::event::ImsEvent;

/// Fixed size of the IMS header preceding the music data.
pub(crate) const IMS_HEADER_BYTES: usize = 71;

/// Loop marker terminating the music-data section.
pub(crate) const LOOP_MARKER: u8 = 0xFC;

/// Delta byte standing for one whole 240-tick chunk.
const DELTA_CHUNK: u8 = 0xF8;

/// Ticks represented by one `DELTA_CHUNK` byte.
const DELTA_CHUNK_TICKS: u32 = 240;

/// Escape byte keeping reserved values out of the literal position.
const DELTA_ESCAPE: u8 = 0xF7;

/// Encode a complete IMS file.
///
/// Events are stable-sorted by `(abs_tick, order)` before serialization,
/// which guarantees that an instrument change inserted before a note-on
/// at the same tick also precedes it in the byte stream. Instrument
/// names are truncated to 8 characters in the footer.
pub fn encode_ims(
    song_name: &str,
    basic_tempo: u16,
    d_mode: u8,
    events: &[ImsEvent],
    instrument_names: &[String],
) -> Vec<u8> {
    let mut sorted: Vec<ImsEvent> = events.to_vec();
    sorted.sort_by_key(|event| (event.abs_tick, event.order));

    let mut music: Vec<u8> = Vec::new();
    let mut running_status: Option<u8> = None;
    for (index, event) in sorted.iter().enumerate() {
        let status = event.status();
        if running_status != Some(status) {
            music.push(status);
            running_status = Some(status);
        }
        event.kind.push_payload(&mut music);

        let delta = match sorted.get(index + 1) {
            Some(next) => next.abs_tick - event.abs_tick,
            None => 0,
        };
        push_delta(&mut music, delta);
    }
    music.push(LOOP_MARKER);

    let mut out = vec![0u8; IMS_HEADER_BYTES];
    write_str_padded(&mut out, 6, song_name, 30);
    write_u32(&mut out, 42, music.len() as u32);
    write_u8(&mut out, 58, d_mode);
    write_u16(&mut out, 60, basic_tempo);
    out.extend_from_slice(&music);

    // Footer: separator, instrument count, 9-byte name records.
    out.push(0);
    out.extend_from_slice(&(instrument_names.len() as u16).to_le_bytes());
    for name in instrument_names {
        let mut record = [0u8; 9];
        write_str_padded(&mut record, 0, name, 8);
        out.extend_from_slice(&record);
    }

    out
}

/// Append the delta-time encoding of `ticks`.
///
/// One `0xF8` per whole 240-tick chunk, then the remainder as a single
/// byte. A remainder landing on the reserved values `0xF8..0xFB` is
/// escaped with `0xF7` and reduced by 247 so those bytes never appear in
/// the literal position; `0xFC..0xFF` cannot be produced at all.
pub(crate) fn push_delta(out: &mut Vec<u8>, ticks: u32) {
    for _ in 0..ticks / DELTA_CHUNK_TICKS {
        out.push(DELTA_CHUNK);
    }
    let mut rest = ticks % DELTA_CHUNK_TICKS;
    if (0xF8..=0xFB).contains(&rest) {
        out.push(DELTA_ESCAPE);
        rest -= 0xF7;
    }
    out.push(rest as u8);
}

/// Decode one delta time starting at the front of `bytes`.
///
/// Returns the tick count and the number of bytes consumed, or `None`
/// when the buffer ends inside the delta. Inverse of `push_delta` for
/// everything the encoder emits.
pub(crate) fn decode_delta(bytes: &[u8]) -> Option<(u32, usize)> {
    let mut ticks = 0u32;
    let mut used = 0usize;
    loop {
        let byte = *bytes.get(used)?;
        used += 1;
        match byte {
            DELTA_CHUNK => ticks += DELTA_CHUNK_TICKS,
            DELTA_ESCAPE => ticks += 0xF7,
            literal => {
                ticks += literal as u32;
                return Some((ticks, used));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binutil::{read_u16_le_at, read_u32_le_at, read_u8_at};
    use crate::ims::event::{ImsEvent, ImsEventKind};

    fn note(channel: u8, pitch: u8, velocity: u8, abs_tick: u32, order: u32) -> ImsEvent {
        ImsEvent {
            kind: ImsEventKind::Note { pitch, velocity },
            channel,
            abs_tick,
            order,
        }
    }

    #[test]
    fn test_empty_stream() {
        let bytes = encode_ims("", 120, 0, &[], &[]);
        assert_eq!(bytes.len(), IMS_HEADER_BYTES + 1 + 1 + 2);
        assert_eq!(read_u32_le_at(&bytes, 42).unwrap(), 1);
        assert_eq!(read_u8_at(&bytes, 58).unwrap(), 0);
        assert_eq!(read_u16_le_at(&bytes, 60).unwrap(), 120);
        assert_eq!(bytes[IMS_HEADER_BYTES], LOOP_MARKER);
        assert_eq!(read_u16_le_at(&bytes, IMS_HEADER_BYTES + 2).unwrap(), 0);
    }

    #[test]
    fn test_song_name_truncated_and_padded() {
        let long = "x".repeat(40);
        let bytes = encode_ims(&long, 120, 0, &[], &[]);
        assert_eq!(&bytes[0..6], &[0u8; 6]);
        assert_eq!(&bytes[6..36], "x".repeat(30).as_bytes());
        assert_eq!(&bytes[36..42], &[0u8; 6]);

        let bytes = encode_ims("tune", 120, 0, &[], &[]);
        assert_eq!(&bytes[6..10], b"tune");
        assert_eq!(&bytes[10..36], &[0u8; 26]);
    }

    #[test]
    fn test_running_status_compression() {
        let events = [
            note(0, 60, 127, 0, 0),
            note(0, 62, 127, 10, 1),
            note(1, 64, 127, 10, 2),
        ];
        let bytes = encode_ims("", 120, 0, &events, &[]);
        let music = &bytes[IMS_HEADER_BYTES..];
        // First event: status, then the second omits its equal status.
        assert_eq!(
            music,
            &[
                0x90, 60, 127, 10, // first event + delta 10
                62, 127, 0, // running status, delta 0
                0x91, 64, 127, 0,    // new channel forces a status byte
                0xFC, // loop marker
                0, 0, 0, // footer
            ]
        );
    }

    #[test]
    fn test_byte_size_matches_music_region() {
        let events = [note(0, 60, 127, 0, 0), note(0, 60, 0, 700, 1)];
        let bytes = encode_ims("song", 120, 0, &events, &[String::from("inst_00")]);
        let byte_size = read_u32_le_at(&bytes, 42).unwrap() as usize;
        let music = &bytes[IMS_HEADER_BYTES..IMS_HEADER_BYTES + byte_size];
        assert_eq!(*music.last().unwrap(), LOOP_MARKER);
        // Separator, count, one 9-byte name record.
        assert_eq!(bytes.len(), IMS_HEADER_BYTES + byte_size + 1 + 2 + 9);
        assert_eq!(
            read_u16_le_at(&bytes, IMS_HEADER_BYTES + byte_size + 1).unwrap(),
            1
        );
        let name = &bytes[IMS_HEADER_BYTES + byte_size + 3..];
        assert_eq!(name, b"inst_00\0\0");
    }

    #[test]
    fn test_tie_break_keeps_insertion_order() {
        let events = [
            note(0, 60, 127, 5, 1),
            ImsEvent {
                kind: ImsEventKind::Instrument { index: 2 },
                channel: 0,
                abs_tick: 5,
                order: 0,
            },
        ];
        let bytes = encode_ims("", 120, 0, &events, &[]);
        let music = &bytes[IMS_HEADER_BYTES..];
        assert_eq!(music[0], 0xC0);
        assert_eq!(music[1], 2);
        assert_eq!(music[3], 0x90);
    }

    #[test]
    fn test_delta_chunking() {
        let mut out = Vec::new();
        push_delta(&mut out, 490);
        assert_eq!(out, vec![0xF8, 0xF8, 0x0A]);

        let mut out = Vec::new();
        push_delta(&mut out, 0);
        assert_eq!(out, vec![0x00]);

        let mut out = Vec::new();
        push_delta(&mut out, 480);
        assert_eq!(out, vec![0xF8, 0xF8, 0x00]);

        let mut out = Vec::new();
        push_delta(&mut out, 239);
        assert_eq!(out, vec![0xEF]);
    }

    #[test]
    fn test_delta_reserved_bytes_never_literal() {
        for ticks in 0..3000u32 {
            let mut out = Vec::new();
            push_delta(&mut out, ticks);
            let literal = *out.last().unwrap();
            assert!(literal <= 0xF7, "delta {} emitted literal {}", ticks, literal);
            for &byte in &out[..out.len() - 1] {
                assert!(byte == 0xF8 || byte == 0xF7);
            }
        }
    }

    #[test]
    fn test_delta_round_trip() {
        let samples = (0..2048u32)
            .chain((0..64).map(|i| 240 * i))
            .chain([0x7FFF_FFF0, 1 << 30, 123_456_789]);
        for ticks in samples {
            let mut out = Vec::new();
            push_delta(&mut out, ticks);
            let (decoded, used) = decode_delta(&out).unwrap();
            assert_eq!(decoded, ticks);
            assert_eq!(used, out.len());
            assert_eq!(out.len() as u64, (ticks / 240) as u64 + 1);
        }
    }

    #[test]
    fn test_delta_escape_decode() {
        // The escape form is accepted on read-back even though the
        // encoder's remainder never reaches the reserved range.
        assert_eq!(decode_delta(&[0xF7, 0x02]), Some((249, 2)));
        assert_eq!(decode_delta(&[0xF8, 0xF7, 0x02]), Some((489, 3)));
        assert_eq!(decode_delta(&[0xF8]), None);
    }
}
