//! VGM main header fields used by the transcoder.
//!
//! Only the fields relevant to a YM3812 log are captured; the remaining
//! chip-clock slots of the full VGM header are ignored by this crate.

/// Parsed VGM header.
///
/// Offsets follow the VGM v1.00+ layout: ident at 0x00, EOF offset at
/// 0x04, version at 0x08, GD3 offset at 0x14, total samples at 0x18,
/// loop offset at 0x1C, loop samples at 0x20, data offset at 0x34
/// (relative to 0x34) and the YM3812 clock at 0x50.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VgmHeader {
    pub ident: [u8; 4],
    pub eof_offset: u32,
    pub version: u32,
    pub gd3_offset: u32,
    pub total_samples: u32,
    pub loop_offset: u32,
    pub loop_samples: u32,
    /// Stored relative data offset; `0` means the legacy 0x40 data start.
    pub data_offset: u32,
    /// YM3812 master clock in Hz; 0 when the header is too short to say.
    pub ym3812_clock: u32,
}

impl VgmHeader {
    /// Absolute offset at which the command stream begins.
    ///
    /// A stored `data_offset` of zero falls back to the fixed v1.00
    /// header size of 0x40; otherwise the stream starts at
    /// `0x34 + data_offset`.
    pub fn data_start(&self) -> usize {
        if self.data_offset == 0 {
            0x40
        } else {
            0x34 + self.data_offset as usize
        }
    }
}

impl Default for VgmHeader {
    fn default() -> Self {
        VgmHeader {
            ident: *b"Vgm ",
            eof_offset: 0,
            version: 0x0000_0100,
            gd3_offset: 0,
            total_samples: 0,
            loop_offset: 0,
            loop_samples: 0,
            data_offset: 0,
            ym3812_clock: 0,
        }
    }
}
