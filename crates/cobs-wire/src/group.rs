//! Length-byte counting rules.
//!
//! A group's length byte counts its data bytes, but the count steps over
//! the sentinel value so the length byte can never be mistaken for a frame
//! delimiter:
//!
//! ```text
//! sentinel = 0x00:  data 0 → 0x01, data 1 → 0x02, …, data 254 → 0xFF
//! sentinel = 0x03:  data 0 → 0x00, 1 → 0x01, 2 → 0x02, 3 → 0x04, …, 254 → 0xFF
//! sentinel = 0xFF:  data 0 → 0x00, 1 → 0x01, …, 254 → 0xFE
//! ```
//!
//! With a zero sentinel this is the classic COBS "group length including
//! the length byte itself".

/// Length byte of a group holding no data.
#[must_use]
pub const fn empty_code(sentinel: u8) -> u8 {
    if sentinel == 0 { 1 } else { 0 }
}

/// Length byte after one more data byte joins a group whose length byte
/// is currently `code`.
///
/// Callers must flush the group once `code` reaches
/// [`max_code`](crate::max_code); advancing past it overflows.
#[must_use]
pub const fn advance_code(code: u8, sentinel: u8) -> u8 {
    let next = code + 1;
    if next == sentinel { next + 1 } else { next }
}

/// Number of data bytes that follow a length byte `code`.
#[must_use]
pub const fn run_len(code: u8, sentinel: u8) -> u8 {
    if code > sentinel { code - 1 } else { code }
}
