#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod group;
pub mod layout;

pub use config::{CobsConfig, DEFAULT_SENTINEL, max_code, max_encoded_len};
pub use error::WireError;
pub use layout::{FrameLayout, GroupInfo, scan_frame};
