//! VGM parser.
//!
//! Entry point is `parse_vgm(bytes)`, which validates the header and then
//! decodes the command stream into the flat `VgmCommand` records used by
//! the transcoder. Only YM3812 writes are lifted; commands addressing
//! other chips are skipped with their documented payload widths so that
//! mixed-chip files still convert on a best-effort basis.
//!
//! The parser is strict about structure (magic, data-block markers,
//! payloads running past the end of the buffer) and lenient about
//! content: opcodes it does not know are treated as single-byte commands
//! and ignored.
use crate::binutil::{ParseError, read_slice, read_u8_at, read_u16_le_at, read_u32_le_at};
use crate::vgm::command::VgmCommand;
use crate::vgm::document::VgmDocument;
use crate::vgm::header::VgmHeader;

/// Minimum buffer length needed to read the fields up to `data_offset`.
const VGM_MIN_HEADER: usize = 0x38;

/// Buffer length at which the YM3812 clock field (0x50) is present.
const VGM_YM3812_CLOCK_END: usize = 0x54;

/// Parse a complete VGM file from a byte slice into a `VgmDocument`.
///
/// Parsing steps:
/// 1. Parse the header with `parse_vgm_header`, which also yields any
///    non-fatal warnings (for example a header too short to carry the
///    YM3812 clock field).
/// 2. Decode commands from the header's data start until the `0x66`
///    end-of-data marker or buffer exhaustion, maintaining the absolute
///    sample clock.
///
/// Returns `Ok(VgmDocument)` on success or a `ParseError` if the header
/// is invalid or a command payload runs past the end of the buffer.
pub fn parse_vgm(bytes: &[u8]) -> Result<VgmDocument, ParseError> {
    let (header, warnings) = parse_vgm_header(bytes)?;

    // Emit a wait record, advancing the clock first so that the stored
    // position is the clock after the wait has elapsed.
    fn push_wait(commands: &mut Vec<VgmCommand>, clock: &mut u64, samples: u32) {
        *clock += samples as u64;
        commands.push(VgmCommand::Wait {
            samples,
            abs_sample: *clock,
        });
    }

    let mut commands: Vec<VgmCommand> = Vec::new();
    let mut clock: u64 = 0;
    let mut off = header.data_start();

    while off < bytes.len() {
        let opcode = bytes[off];
        off += 1;

        match opcode {
            // YM3812 register write.
            0x5A => {
                let payload = read_slice(bytes, off, 2)?;
                commands.push(VgmCommand::Write {
                    register: payload[0],
                    value: payload[1],
                    abs_sample: clock,
                });
                off += 2;
            }
            // Wait n samples (16-bit operand).
            0x61 => {
                let samples = read_u16_le_at(bytes, off)? as u32;
                off += 2;
                push_wait(&mut commands, &mut clock, samples);
            }
            // Wait 1/60 s and 1/50 s shorthands.
            0x62 => {
                push_wait(&mut commands, &mut clock, 735);
            }
            0x63 => {
                push_wait(&mut commands, &mut clock, 882);
            }
            // End of sound data.
            0x66 => {
                commands.push(VgmCommand::End { abs_sample: clock });
                break;
            }
            // Short waits of 1..16 samples packed into the opcode.
            0x70..=0x7F => {
                push_wait(&mut commands, &mut clock, (opcode & 0x0F) as u32 + 1);
            }
            // YM2612 DAC write + wait; only the wait is meaningful here.
            0x80..=0x8F => {
                push_wait(&mut commands, &mut clock, (opcode & 0x0F) as u32);
            }
            // Single-operand writes for other chips.
            0x4F | 0x50 => {
                read_u8_at(bytes, off)?;
                off += 1;
            }
            // Two-operand writes for other chips (0x5A handled above).
            0x51..=0x59 | 0x5B..=0x5F => {
                read_slice(bytes, off, 2)?;
                off += 2;
            }
            // Data block: 0x67 0x66 tt ss:u32 data[ss]. Skipped whole.
            0x67 => {
                let marker = read_u8_at(bytes, off)?;
                if marker != 0x66 {
                    return Err(ParseError::UnknownDataBlock {
                        marker,
                        offset: off,
                    });
                }
                let size = read_u32_le_at(bytes, off + 2)? as usize;
                read_slice(bytes, off + 6, size)?;
                off += 6 + size;
            }
            // Seek in PCM data bank.
            0xE0 => {
                read_slice(bytes, off, 4)?;
                off += 4;
            }
            // Anything else is treated as an opcode-only command.
            _ => {}
        }
    }

    Ok(VgmDocument {
        header,
        commands,
        warnings,
    })
}

/// Parse a VGM header located at the start of `bytes`.
///
/// Validates the `"Vgm "` ident and reads the fixed fields up to the
/// data offset. The YM3812 clock at 0x50 is only defined when the buffer
/// reaches 0x54; shorter files are accepted with the clock read as 0 and
/// a warning recorded, so that bare v1.00 headers still parse.
///
/// On success returns the header and the collected warnings.
pub fn parse_vgm_header(bytes: &[u8]) -> Result<(VgmHeader, Vec<String>), ParseError> {
    let ident_slice = read_slice(bytes, 0x00, 4).map_err(|_| ParseError::Truncated {
        offset: 0,
        needed: VGM_MIN_HEADER,
        available: bytes.len(),
        context: Some("header"),
    })?;
    if ident_slice != b"Vgm " {
        return Err(ParseError::InvalidMagic {
            expected: b"Vgm ",
            found: ident_slice.to_vec(),
        });
    }

    if bytes.len() < VGM_MIN_HEADER {
        return Err(ParseError::Truncated {
            offset: 0,
            needed: VGM_MIN_HEADER,
            available: bytes.len(),
            context: Some("header"),
        });
    }

    let mut header = VgmHeader::default();
    header.ident.copy_from_slice(ident_slice);
    header.eof_offset = read_u32_le_at(bytes, 0x04)?;
    header.version = read_u32_le_at(bytes, 0x08)?;
    header.gd3_offset = read_u32_le_at(bytes, 0x14)?;
    header.total_samples = read_u32_le_at(bytes, 0x18)?;
    header.loop_offset = read_u32_le_at(bytes, 0x1C)?;
    header.loop_samples = read_u32_le_at(bytes, 0x20)?;
    header.data_offset = read_u32_le_at(bytes, 0x34)?;

    let mut warnings = Vec::new();
    header.ym3812_clock = if bytes.len() >= VGM_YM3812_CLOCK_END {
        read_u32_le_at(bytes, 0x50)?
    } else {
        warnings.push(format!(
            "header is {} bytes, too short for a YM3812 clock field; assuming 0",
            bytes.len()
        ));
        0
    };

    Ok((header, warnings))
}
