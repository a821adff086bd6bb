use std::io;

/// Errors that can occur while decoding a COBS stream.
///
/// End-of-frame is *not* an error: a well-formed frame closed by its
/// sentinel is reported through
/// [`FrameStatus::EndOfFrame`](crate::FrameStatus::EndOfFrame).
///
/// ```text
///   DecodeError
///   ├── UnexpectedEndOfFrame  ← sentinel arrived while a group was mid-flight
///   ├── IncompleteFrame       ← close() while a group was mid-flight
///   ├── FrameTooLarge         ← FrameReader frame exceeded its size limit
///   ├── Sink { offset, .. }   ← sink failed inside `write`
///   └── Io(std::io::Error)    ← sink or reader failed elsewhere
/// ```
///
/// Offsets count input bytes fully consumed before the failure, relative
/// to the slice passed to the failing call.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// A sentinel byte arrived before the current group delivered all of
    /// its data bytes. The stream is malformed or out of sync.
    #[error("unexpected end of frame at offset {offset}: group still owed {missing} bytes")]
    UnexpectedEndOfFrame { offset: usize, missing: u8 },

    /// The decoder was closed while a group was still owed bytes; the frame
    /// was truncated.
    #[error("incomplete frame: group still owed {missing} bytes")]
    IncompleteFrame { missing: u8 },

    /// A decoded frame grew past the reader's configured limit.
    #[error("decoded frame of {size} bytes exceeds limit {limit}")]
    FrameTooLarge { size: usize, limit: usize },

    #[error("sink write failed at offset {offset}: {source}")]
    Sink {
        offset: usize,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl DecodeError {
    /// Input bytes consumed before the failure, or 0 when the error is not
    /// tied to a position.
    #[must_use]
    pub fn offset(&self) -> usize {
        match self {
            Self::UnexpectedEndOfFrame { offset, .. } | Self::Sink { offset, .. } => *offset,
            _ => 0,
        }
    }

    /// Re-anchor a per-byte error at `offset` within a larger input.
    pub(crate) fn at(self, offset: usize) -> Self {
        match self {
            Self::UnexpectedEndOfFrame { missing, .. } => {
                Self::UnexpectedEndOfFrame { offset, missing }
            }
            Self::Sink { source, .. } | Self::Io(source) => Self::Sink { offset, source },
            other => other,
        }
    }
}

impl From<DecodeError> for io::Error {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Sink { source, .. } | DecodeError::Io(source) => source,
            incomplete @ DecodeError::IncompleteFrame { .. } => {
                io::Error::new(io::ErrorKind::UnexpectedEof, incomplete)
            }
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
