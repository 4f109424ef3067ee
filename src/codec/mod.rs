//! Binary primitives, and the encoder/decoder the codec specializer (C4)
//! compiles a schema into.

pub mod primitives;

mod config;
mod decoder;
mod encoder;
mod error;

pub use config::{DecoderConfig, EncoderConfig};
pub use decoder::{compile_decoder, Decoder};
pub use encoder::{compile_encoder, Encoder};
pub use error::{DecodeError, EncodeError};
