//! Events lifted from OPL2 register writes.

/// A musical event reconstructed from a key-on/key-off transition.
///
/// Events are produced only by writes to the `0xB0..0xB8` key-on
/// registers; every other register write just updates the shadow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OplEvent {
    /// A channel transitioned from key-off to key-on.
    ///
    /// `instrument` is the interned patch id for the channel's operator
    /// settings at the moment of key-on; the caller decides whether an
    /// instrument-change event needs to precede the note.
    NoteOn {
        /// Channel number (0..8).
        channel: u8,
        /// MIDI note number derived from block and F-Number.
        note: u8,
        /// Interned instrument id.
        instrument: u16,
    },

    /// A channel transitioned from key-on to key-off.
    NoteOff {
        /// Channel number (0..8).
        channel: u8,
        /// MIDI note number at the moment of release.
        note: u8,
    },
}
