use std::io::{self, Write};

use cobs_wire::CobsConfig;
use cobs_wire::group::run_len;

use crate::error::DecodeError;

/// Outcome of feeding bytes to a [`Decoder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStatus {
    /// Every byte was consumed; the frame is still open.
    Continue,

    /// A sentinel closed a well-formed frame. `consumed` counts the bytes
    /// taken from the input, the sentinel included; anything after it
    /// belongs to the next frame.
    EndOfFrame { consumed: usize },
}

/// Streaming COBS decoder.
///
/// Encoded bytes go in one at a time (or as slices) and payload bytes are
/// written to the sink as soon as they are known. The decoder keeps two
/// bytes of state:
///
/// ```text
///   code        length byte of the group being read; the max length
///               byte doubles as "no sentinel owed before the next group"
///   code_index  data bytes still owed by that group
/// ```
///
/// Per input byte:
///
/// ```text
///   sentinel ──► code_index == 0 ? EndOfFrame : UnexpectedEndOfFrame
///   data     ──► (code_index > 0) emit, code_index -= 1
///   length   ──► (code_index == 0) emit implied sentinel if owed,
///                code = byte, code_index = data bytes declared
/// ```
///
/// In reduced (COBS/R) mode a group that is still owed bytes when the frame
/// ends is a folded tail: its length byte is emitted as the last payload
/// byte instead of reporting an error.
///
/// # Usage
///
/// ```rust
/// use cobs_decoder::{Decoder, FrameStatus};
///
/// let mut payload = Vec::new();
/// let mut decoder = Decoder::new(&mut payload);
/// let status = decoder.write(b"\x0612345\x056789\x00").unwrap();
/// assert_eq!(status, FrameStatus::EndOfFrame { consumed: 12 });
/// drop(decoder);
/// assert_eq!(payload, b"12345\x006789");
/// ```
pub struct Decoder<W> {
    sink: W,
    code: u8,
    code_index: u8,
    config: CobsConfig,
}

impl<W: Write> Decoder<W> {
    /// Create a decoder with the default configuration (zero sentinel,
    /// plain COBS).
    #[must_use]
    pub fn new(sink: W) -> Self {
        Self::with_config(sink, CobsConfig::default())
    }

    #[must_use]
    pub fn with_config(sink: W, config: CobsConfig) -> Self {
        Self {
            sink,
            code: config.max_code(),
            code_index: 0,
            config,
        }
    }

    pub fn config(&self) -> &CobsConfig {
        &self.config
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    /// `true` while a group is mid-flight and the frame is not known to be
    /// complete.
    #[must_use]
    pub fn needs_more_data(&self) -> bool {
        self.code_index != 0
    }

    /// Drop any partial frame state and wait for the start of a new frame.
    ///
    /// Use after an error to resynchronise on the next sentinel.
    pub fn reset(&mut self) {
        self.code = self.config.max_code();
        self.code_index = 0;
    }

    /// Decode a single encoded byte.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::UnexpectedEndOfFrame`] (offset 0) if `byte` is the
    ///   sentinel and the current group is incomplete.
    /// - [`DecodeError::Io`] if the sink fails.
    pub fn write_byte(&mut self, byte: u8) -> Result<FrameStatus, DecodeError> {
        self.step(byte)
    }

    /// Decode a slice of encoded bytes.
    ///
    /// Stops right after a sentinel that ends the frame, returning
    /// [`FrameStatus::EndOfFrame`] with the number of bytes consumed.
    ///
    /// # Errors
    ///
    /// Stops at the first failure. Error offsets are positions within
    /// `data`; sink failures are reported as [`DecodeError::Sink`].
    pub fn write(&mut self, data: &[u8]) -> Result<FrameStatus, DecodeError> {
        for (offset, &byte) in data.iter().enumerate() {
            let status = self.step(byte).map_err(|e| e.at(offset))?;
            if let FrameStatus::EndOfFrame { .. } = status {
                return Ok(FrameStatus::EndOfFrame {
                    consumed: offset + 1,
                });
            }
        }
        Ok(FrameStatus::Continue)
    }

    /// Finish a frame that was not closed by a sentinel.
    ///
    /// Emits a pending COBS/R tail byte, then checks that no group is
    /// still owed bytes. Required whenever the stream ends without a
    /// trailing sentinel, and always in reduced mode.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::IncompleteFrame`] if the frame was truncated. The
    ///   state is kept; call [`reset`](Self::reset) to start over.
    /// - [`DecodeError::Io`] if the sink fails.
    pub fn close(&mut self) -> Result<(), DecodeError> {
        self.flush_reduced_tail()?;

        if self.needs_more_data() {
            tracing::debug!(missing = self.code_index, "frame closed mid-group");
            return Err(DecodeError::IncompleteFrame {
                missing: self.code_index,
            });
        }

        self.code = self.config.max_code();
        Ok(())
    }

    fn step(&mut self, byte: u8) -> Result<FrameStatus, DecodeError> {
        let sentinel = self.config.sentinel;

        if byte == sentinel {
            self.flush_reduced_tail()?;

            if self.code_index != 0 {
                tracing::debug!(missing = self.code_index, "sentinel inside group");
                return Err(DecodeError::UnexpectedEndOfFrame {
                    offset: 0,
                    missing: self.code_index,
                });
            }

            self.code = self.config.max_code();
            return Ok(FrameStatus::EndOfFrame { consumed: 1 });
        }

        if self.code_index > 0 {
            self.sink.write_all(&[byte])?;
            self.code_index -= 1;
            return Ok(FrameStatus::Continue);
        }

        // New length byte. A previous group that was not full ended on a
        // sentinel in the payload.
        if self.code != self.config.max_code() {
            self.sink.write_all(&[sentinel])?;
        }
        self.code = byte;
        self.code_index = run_len(byte, sentinel);
        Ok(FrameStatus::Continue)
    }

    /// COBS/R: a group still owed bytes at the end of the frame had its
    /// last data byte folded into the length byte.
    fn flush_reduced_tail(&mut self) -> io::Result<()> {
        if self.config.reduced && self.code_index > 0 {
            self.sink.write_all(&[self.code])?;
            self.code_index = 0;
        }
        Ok(())
    }
}

/// Lets a decoder sit anywhere a writer is expected, e.g. as the sink of an
/// encoder for loopback.
///
/// A sentinel ends the write early with a short count; writing the rest
/// continues with the next frame into the same sink. Framing errors map to
/// [`io::ErrorKind::InvalidData`].
impl<W: Write> Write for Decoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match Self::write(self, buf) {
            Ok(FrameStatus::Continue) => Ok(buf.len()),
            Ok(FrameStatus::EndOfFrame { consumed }) => Ok(consumed),
            Err(e) if e.offset() > 0 => Ok(e.offset()),
            Err(e) => Err(e.into()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

/// Decode one whole frame in one call.
///
/// `encoded` may end with the sentinel or simply stop after the last
/// group. A closing sentinel counts as success and ends the frame; any
/// bytes after it are left undecoded. Use [`decode_frames`] for buffers
/// holding several frames.
///
/// ```rust
/// use cobs_decoder::decode;
/// use cobs_wire::CobsConfig;
///
/// let payload = decode(b"\x0612345\x056789", &CobsConfig::default()).unwrap();
/// assert_eq!(payload, b"12345\x006789");
/// ```
///
/// # Errors
///
/// [`DecodeError::UnexpectedEndOfFrame`] / [`DecodeError::IncompleteFrame`]
/// for malformed or truncated input.
pub fn decode(encoded: &[u8], config: &CobsConfig) -> Result<Vec<u8>, DecodeError> {
    let mut out = Vec::with_capacity(encoded.len());
    decode_into(encoded, &mut out, config)?;
    Ok(out)
}

/// Decode one whole frame, appending the payload to `out`.
///
/// On failure `out` keeps whatever was decoded before the error.
///
/// # Errors
///
/// See [`decode`].
pub fn decode_into(
    encoded: &[u8],
    out: &mut Vec<u8>,
    config: &CobsConfig,
) -> Result<(), DecodeError> {
    let mut decoder = Decoder::with_config(out, *config);
    match decoder.write(encoded)? {
        FrameStatus::EndOfFrame { consumed } => {
            if consumed < encoded.len() {
                tracing::trace!(ignored = encoded.len() - consumed, "bytes after end of frame");
            }
            Ok(())
        }
        FrameStatus::Continue => decoder.close(),
    }
}

/// Split a buffer holding several sentinel-delimited frames and decode
/// each of them.
///
/// The last frame may omit its sentinel. Empty wire frames (two sentinels
/// back to back) carry no payload and are skipped. Error offsets are
/// positions within `encoded`.
///
/// # Errors
///
/// Fails on the first malformed or truncated frame.
pub fn decode_frames(encoded: &[u8], config: &CobsConfig) -> Result<Vec<Vec<u8>>, DecodeError> {
    let mut frames = Vec::new();
    let mut decoder = Decoder::with_config(Vec::new(), *config);
    let mut base = 0;

    while base < encoded.len() {
        let rest = &encoded[base..];
        let status = decoder.write(rest).map_err(|e| {
            let offset = base + e.offset();
            e.at(offset)
        })?;

        match status {
            FrameStatus::EndOfFrame { consumed } => {
                let payload = std::mem::take(decoder.get_mut());
                if consumed > 1 {
                    frames.push(payload);
                }
                base += consumed;
            }
            FrameStatus::Continue => {
                decoder.close()?;
                frames.push(std::mem::take(decoder.get_mut()));
                break;
            }
        }
    }

    tracing::trace!(frames = frames.len(), "decoded frame buffer");
    Ok(frames)
}
