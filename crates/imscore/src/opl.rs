//! OPL2 (YM3812) shadow-state tracking and note lifting.
//!
//! This module reconstructs musical semantics from raw register writes:
//! note-on/off events with pitch, interned instrument patches, and the
//! rhythm-mode flag.
pub mod event;
pub mod patch;
pub mod pitch;
mod state;

pub use event::OplEvent;
pub use patch::{Instrument, InstrumentTable, PATCH_BYTES};
pub use state::Opl2State;
