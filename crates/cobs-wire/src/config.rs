/// Default frame delimiter.
pub const DEFAULT_SENTINEL: u8 = 0x00;

/// Largest number of data bytes a single group can carry.
pub const MAX_RUN: usize = 254;

/// Largest encoded group: one length byte plus [`MAX_RUN`] data bytes.
pub const MAX_GROUP_LEN: usize = MAX_RUN + 1;

/// Framing configuration shared by encoders and decoders.
///
/// Both ends of a link must agree on `sentinel` and `reduced`; the wire
/// carries no negotiation. `append_sentinel_on_close` only affects encoders.
///
/// ```text
/// ┌──────────────────────────┬─────────┬──────────────────────────────────────┐
/// │ Field                    │ Default │ Effect                               │
/// ├──────────────────────────┼─────────┼──────────────────────────────────────┤
/// │ sentinel                 │ 0x00    │ Byte value that never appears inside │
/// │                          │         │ an encoded frame                     │
/// │ reduced                  │ false   │ COBS/R: fold the last data byte into │
/// │                          │         │ the final length byte when possible  │
/// │ append_sentinel_on_close │ false   │ Encoder writes a literal sentinel    │
/// │                          │         │ after each closed frame              │
/// └──────────────────────────┴─────────┴──────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CobsConfig {
    /// The reserved delimiter value.
    pub sentinel: u8,

    /// Use the COBS/R (reduced) variant.
    pub reduced: bool,

    /// Append a literal sentinel after every `close()` on the encoder.
    pub append_sentinel_on_close: bool,
}

impl Default for CobsConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CobsConfig {
    /// Plain COBS with a zero sentinel and no trailing delimiter.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sentinel: DEFAULT_SENTINEL,
            reduced: false,
            append_sentinel_on_close: false,
        }
    }

    #[must_use]
    pub const fn with_sentinel(mut self, sentinel: u8) -> Self {
        self.sentinel = sentinel;
        self
    }

    #[must_use]
    pub const fn with_reduced(mut self, reduced: bool) -> Self {
        self.reduced = reduced;
        self
    }

    #[must_use]
    pub const fn with_sentinel_on_close(mut self, append: bool) -> Self {
        self.append_sentinel_on_close = append;
        self
    }

    /// Largest legal length byte for this configuration's sentinel.
    #[must_use]
    pub const fn max_code(&self) -> u8 {
        max_code(self.sentinel)
    }
}

/// Largest legal length byte for `sentinel`.
///
/// Length bytes skip the sentinel's own value, so a full group of
/// [`MAX_RUN`] data bytes lands on `0xFF`, except when the sentinel *is*
/// `0xFF` and nothing had to be skipped.
#[must_use]
pub const fn max_code(sentinel: u8) -> u8 {
    if sentinel == 0xFF { 0xFE } else { 0xFF }
}

/// Exact worst-case encoded size of an `n`-byte payload, excluding any
/// appended sentinel.
///
/// Every group but the last is either full or ended by a dropped sentinel
/// byte, so the overhead is one byte per started run of [`MAX_RUN`] bytes,
/// and never less than the single length byte of an empty frame.
#[must_use]
pub const fn max_encoded_len(n: usize) -> usize {
    let groups = n.div_ceil(MAX_RUN);
    n + if groups == 0 { 1 } else { groups }
}
