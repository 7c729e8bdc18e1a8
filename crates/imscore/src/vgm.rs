//! VGM parsing for YM3812 register logs.
//!
//! This module exposes the VGM document and header types and re-exports
//! the command record and parser submodules.
pub mod command;
mod document;
mod header;
pub mod parser;

pub use command::VgmCommand;
pub use document::VgmDocument;
pub use header::VgmHeader;
