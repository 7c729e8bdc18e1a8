//! Parsed VGM document.
use crate::binutil::ParseError;
use crate::vgm::command::VgmCommand;
use crate::vgm::header::VgmHeader;
use crate::vgm::parser;

/// A parsed VGM file: header, flat command stream, and any non-fatal
/// warnings collected while parsing (for example a header too short to
/// carry the YM3812 clock field).
///
/// The document borrows nothing from the input buffer; command records
/// are owned values carrying absolute sample positions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VgmDocument {
    pub header: VgmHeader,
    pub commands: Vec<VgmCommand>,
    pub warnings: Vec<String>,
}

impl TryFrom<&[u8]> for VgmDocument {
    type Error = ParseError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        parser::parse_vgm(bytes)
    }
}

impl VgmDocument {
    /// Return an iterator over the command records.
    pub fn iter(&self) -> std::slice::Iter<'_, VgmCommand> {
        self.commands.iter()
    }
}

/// Iterate over commands by reference: `for c in &document { ... }`.
impl<'a> IntoIterator for &'a VgmDocument {
    type Item = &'a VgmCommand;
    type IntoIter = std::slice::Iter<'a, VgmCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}
