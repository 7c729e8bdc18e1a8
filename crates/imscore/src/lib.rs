#![doc = include_str!("../README.md")]
mod binutil;
pub mod bnk;
pub mod ims;
pub mod opl;
pub mod transcode;
pub mod vgm;

pub use binutil::ParseError;
pub use transcode::{TranscodeError, TranscodeOptions, TranscodeOutput, transcode};
pub use vgm::{VgmCommand, VgmDocument, VgmHeader};
