//! Transcoder facade: VGM bytes in, IMS + BNK bytes out.
//!
//! Wires the VGM parser, the OPL2 state tracker and the two encoders
//! into a single conversion call. The conversion owns all intermediate
//! state, performs no I/O, and is deterministic: identical input bytes
//! and options produce identical output bytes.
use std::fmt;

use crate::binutil::ParseError;
use crate::bnk::encoder::encode_bnk;
use crate::ims::encoder::encode_ims;
use crate::ims::{ImsEvent, ImsEventKind};
use crate::opl::Opl2State;
use crate::opl::event::OplEvent;
use crate::vgm::command::VgmCommand;
use crate::vgm::parser::parse_vgm;

/// VGM sample rate in Hz; all VGM wait times count these samples.
const VGM_SAMPLE_RATE: u64 = 44100;

/// IMS ticks per second per BPM (240 ticks per beat).
const TICKS_PER_SECOND_PER_BPM: u64 = 4;

/// Error produced by a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscodeError {
    /// The VGM input failed to parse.
    Parse(ParseError),

    /// The requested tempo is outside `1..=255` BPM.
    TempoOutOfRange(u16),

    /// More than 65,535 distinct instrument patches were interned.
    InstrumentOverflow,

    /// A bank name stayed ambiguous after exhausting numeric suffixes.
    NameCollision(String),
}

impl fmt::Display for TranscodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscodeError::Parse(e) => write!(f, "VGM parse error: {}", e),
            TranscodeError::TempoOutOfRange(tempo) => {
                write!(f, "tempo {} out of range (expected 1..=255)", tempo)
            }
            TranscodeError::InstrumentOverflow => {
                write!(f, "instrument table overflow (more than 65535 patches)")
            }
            TranscodeError::NameCollision(name) => {
                write!(f, "could not find a unique bank name for \"{}\"", name)
            }
        }
    }
}

impl std::error::Error for TranscodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TranscodeError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseError> for TranscodeError {
    fn from(e: ParseError) -> Self {
        TranscodeError::Parse(e)
    }
}

/// Conversion options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeOptions {
    /// Song name stored in the IMS header (truncated to 30 bytes).
    pub song_name: String,
    /// Playback tempo in BPM; must be within `1..=255`.
    pub tempo: u16,
}

impl Default for TranscodeOptions {
    fn default() -> Self {
        TranscodeOptions {
            song_name: String::new(),
            tempo: 120,
        }
    }
}

/// Result of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeOutput {
    /// Serialized IMS file.
    pub ims: Vec<u8>,
    /// Serialized BNK file.
    pub bnk: Vec<u8>,
    /// Number of distinct instrument patches in the bank.
    pub instrument_count: usize,
    /// Number of IMS events in the stream.
    pub event_count: usize,
    /// Non-fatal warnings from the VGM parser.
    pub warnings: Vec<String>,
}

/// Sample position to IMS tick, rounding half up.
fn tick_at(sample: u64, tempo: u16) -> u32 {
    let numerator = sample * TICKS_PER_SECOND_PER_BPM * tempo as u64 + VGM_SAMPLE_RATE / 2;
    (numerator / VGM_SAMPLE_RATE) as u32
}

/// Convert a VGM byte buffer into IMS and BNK byte buffers.
///
/// Walks the command stream once: waits move the sample clock, YM3812
/// writes advance the shadow chip, and every lifted note lands in the
/// event list at its tick position. A note-on whose interned patch
/// differs from the channel's current instrument is preceded by an
/// instrument-change event at the same tick.
pub fn transcode(
    bytes: &[u8],
    options: &TranscodeOptions,
) -> Result<TranscodeOutput, TranscodeError> {
    if options.tempo == 0 || options.tempo > 255 {
        return Err(TranscodeError::TempoOutOfRange(options.tempo));
    }

    let document = parse_vgm(bytes)?;

    let mut state = Opl2State::new();
    let mut events: Vec<ImsEvent> = Vec::new();
    let mut channel_instruments: [Option<u16>; 9] = [None; 9];
    let mut current_sample: u64 = 0;
    let mut order: u32 = 0;

    for command in &document.commands {
        match *command {
            VgmCommand::Wait { abs_sample, .. } => {
                current_sample = abs_sample;
            }
            VgmCommand::Write {
                register, value, ..
            } => {
                let Some(opl_event) = state.register_write(register, value)? else {
                    continue;
                };
                let abs_tick = tick_at(current_sample, options.tempo);
                match opl_event {
                    OplEvent::NoteOn {
                        channel,
                        note,
                        instrument,
                    } => {
                        if channel_instruments[channel as usize] != Some(instrument) {
                            channel_instruments[channel as usize] = Some(instrument);
                            events.push(ImsEvent {
                                kind: ImsEventKind::Instrument {
                                    index: instrument as u8,
                                },
                                channel,
                                abs_tick,
                                order,
                            });
                            order += 1;
                        }
                        events.push(ImsEvent {
                            kind: ImsEventKind::Note {
                                pitch: note,
                                velocity: 127,
                            },
                            channel,
                            abs_tick,
                            order,
                        });
                        order += 1;
                    }
                    OplEvent::NoteOff { channel, note } => {
                        events.push(ImsEvent {
                            kind: ImsEventKind::Note {
                                pitch: note,
                                velocity: 0,
                            },
                            channel,
                            abs_tick,
                            order,
                        });
                        order += 1;
                    }
                }
            }
            VgmCommand::End { .. } => break,
        }
    }

    let instrument_names: Vec<String> = state
        .instruments()
        .iter()
        .map(|instrument| instrument.name.clone())
        .collect();
    let d_mode = if state.percussion_seen() { 1 } else { 0 };

    let ims = encode_ims(
        &options.song_name,
        options.tempo,
        d_mode,
        &events,
        &instrument_names,
    );
    let bnk = encode_bnk(state.instruments())?;

    Ok(TranscodeOutput {
        ims,
        bnk,
        instrument_count: instrument_names.len(),
        event_count: events.len(),
        warnings: document.warnings,
    })
}
