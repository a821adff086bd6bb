/// Structural problems found while scanning an encoded frame.
///
/// Offsets are relative to the start of the frame slice handed to
/// [`scan_frame`](crate::scan_frame).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WireError {
    /// A literal sentinel byte appeared inside the frame.
    #[error("sentinel byte {sentinel:#04X} inside frame at offset {offset}")]
    UnexpectedSentinel { offset: usize, sentinel: u8 },

    /// A group declared more data bytes than the frame still holds.
    #[error(
        "group at offset {offset} declares {declared} data bytes, only {available} available"
    )]
    TruncatedGroup {
        offset: usize,
        declared: usize,
        available: usize,
    },
}
