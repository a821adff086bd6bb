/// Errors that can occur while encoding.
///
/// Encoding itself cannot fail; every variant wraps a failure of the
/// downstream sink, passed through untouched.
///
/// ```text
///   EncodeError
///   ├── Sink { offset, source }  ← sink failed inside `write` or
///   │                              `write_byte`, after `offset` input
///   │                              bytes were consumed
///   └── Io(std::io::Error)       ← sink failed in `close`
/// ```
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("sink write failed after {offset} input bytes: {source}")]
    Sink {
        offset: usize,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EncodeError {
    /// Input bytes fully consumed before the failure.
    #[must_use]
    pub fn offset(&self) -> usize {
        match self {
            Self::Sink { offset, .. } => *offset,
            Self::Io(_) => 0,
        }
    }

    /// The underlying sink error.
    #[must_use]
    pub fn into_io(self) -> std::io::Error {
        match self {
            Self::Sink { source, .. } | Self::Io(source) => source,
        }
    }
}
