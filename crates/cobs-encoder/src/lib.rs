#![warn(clippy::pedantic)]

pub mod encoder;
pub mod error;

pub use cobs_wire::CobsConfig;
pub use encoder::{Encoder, encode, encode_into};
pub use error::EncodeError;
