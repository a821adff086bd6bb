#![warn(clippy::pedantic)]

pub mod decoder;
pub mod error;
pub mod streaming;

pub use cobs_wire::CobsConfig;
pub use decoder::{Decoder, FrameStatus, decode, decode_frames, decode_into};
pub use error::DecodeError;
pub use streaming::FrameReader;
