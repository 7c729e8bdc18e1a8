//! BNK AdLib instrument-bank encoding and read-back.
//!
//! A BNK file is a 20-byte header, a name directory sorted for binary
//! search, and fixed-size 30-byte patch records.
pub mod encoder;
pub mod reader;

pub use encoder::encode_bnk;
pub use reader::BnkBank;
