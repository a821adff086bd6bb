use std::io::{self, Write};

use cobs_wire::CobsConfig;
use cobs_wire::config::{MAX_GROUP_LEN, MAX_RUN};
use cobs_wire::group::{advance_code, empty_code};

use crate::error::EncodeError;

/// Streaming COBS encoder.
///
/// Payload bytes go in through [`write_byte`](Self::write_byte) or
/// [`write`](Self::write); each group is forwarded to the sink as soon as
/// it is complete. At most one group (255 bytes) is ever held back.
///
/// A group is flushed when:
///
/// ```text
/// ┌─────────────────────────┬───────────────────────────────────────────┐
/// │ Trigger                 │ Group emitted                             │
/// ├─────────────────────────┼───────────────────────────────────────────┤
/// │ length byte = max       │ full group, no sentinel implied after it  │
/// │ payload byte = sentinel │ short group, the sentinel byte is dropped │
/// │ close()                 │ final group (COBS/R folding applies here) │
/// └─────────────────────────┴───────────────────────────────────────────┘
/// ```
///
/// [`close`](Self::close) must be called once per frame; without it the
/// trailing group is never written. After `close` the encoder starts a
/// fresh frame, so one instance can frame a whole stream.
///
/// A completed group is queued before it is written. If the sink fails
/// part way through, the unwritten rest stays queued and goes out first on
/// the next [`write`](Self::write), [`close`](Self::close) or
/// [`flush`](Write::flush), so retrying after a short write never
/// duplicates bytes on the wire.
///
/// # Usage
///
/// ```rust
/// use cobs_encoder::Encoder;
///
/// let mut wire = Vec::new();
/// let mut encoder = Encoder::new(&mut wire);
/// encoder.write(b"12345\x006789").unwrap();
/// encoder.close().unwrap();
/// assert_eq!(wire, b"\x0612345\x056789");
/// ```
pub struct Encoder<W> {
    sink: W,
    /// `group[0]` is the length byte; data bytes follow.
    group: Vec<u8>,
    /// Completed groups not yet accepted by the sink.
    queued: Vec<u8>,
    /// `queued` ends with a frame that `close` finished.
    close_queued: bool,
    config: CobsConfig,
}

impl<W: Write> Encoder<W> {
    /// Create an encoder with the default configuration (zero sentinel,
    /// plain COBS).
    #[must_use]
    pub fn new(sink: W) -> Self {
        Self::with_config(sink, CobsConfig::default())
    }

    #[must_use]
    pub fn with_config(sink: W, config: CobsConfig) -> Self {
        let mut group = Vec::with_capacity(MAX_GROUP_LEN);
        group.push(empty_code(config.sentinel));
        Self {
            sink,
            group,
            queued: Vec::with_capacity(MAX_GROUP_LEN + 2),
            close_queued: false,
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

    /// Unwrap the sink. Any partial group that was not closed, and any
    /// queued output the sink has not accepted, is lost.
    pub fn into_inner(self) -> W {
        self.sink
    }

    /// Encode a single payload byte.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::Sink`]. An `offset` of 1 means the byte was
    /// taken and the group it completed is queued for the next call.
    pub fn write_byte(&mut self, byte: u8) -> Result<(), EncodeError> {
        self.write(&[byte]).map(drop)
    }

    /// Encode a slice of payload bytes.
    ///
    /// Returns `data.len()` on success.
    ///
    /// # Errors
    ///
    /// Stops at the first sink failure and returns
    /// [`EncodeError::Sink`], whose `offset` is the number of input bytes
    /// consumed before it. Output those bytes produced that the sink did
    /// not take stays queued; retry with `data[offset..]`.
    pub fn write(&mut self, data: &[u8]) -> Result<usize, EncodeError> {
        self.drain()
            .map_err(|source| EncodeError::Sink { offset: 0, source })?;

        for (i, &byte) in data.iter().enumerate() {
            if self.push(byte) {
                self.drain()
                    .map_err(|source| EncodeError::Sink { offset: i + 1, source })?;
            }
        }
        Ok(data.len())
    }

    /// Finish the current frame by writing its final group.
    ///
    /// In reduced mode the last data byte replaces the length byte when it
    /// is strictly larger; a decoder recognises the result because a real
    /// length byte can never exceed the bytes left in the frame. When
    /// `append_sentinel_on_close` is set a literal sentinel follows.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::Io`] if the sink rejects the final group or
    /// the delimiter. The frame stays queued; calling `close` again only
    /// retries writing it.
    pub fn close(&mut self) -> Result<(), EncodeError> {
        let retry = self.close_queued;
        self.drain()?;
        if retry {
            return Ok(());
        }

        if self.config.reduced {
            self.fold_last_byte();
        }
        self.queue_group();
        if self.config.append_sentinel_on_close {
            self.queued.push(self.config.sentinel);
        }
        self.close_queued = true;
        self.drain()?;

        tracing::trace!(
            sentinel = self.config.sentinel,
            reduced = self.config.reduced,
            "frame closed"
        );
        Ok(())
    }

    /// Advance the group state by one payload byte. Returns `true` when a
    /// completed group was queued.
    fn push(&mut self, byte: u8) -> bool {
        let mut queued = false;
        if self.group[0] == self.config.max_code() {
            self.queue_group();
            queued = true;
        }

        if byte == self.config.sentinel {
            self.queue_group();
            return true;
        }

        self.group.push(byte);
        self.group[0] = advance_code(self.group[0], self.config.sentinel);
        queued
    }

    /// COBS/R: drop the last data byte into the length slot when it is
    /// larger than the length byte.
    fn fold_last_byte(&mut self) {
        let Some(&last) = self.group.last() else {
            return;
        };
        if self.group.len() > 1 && self.group[0] < last {
            self.group[0] = last;
            self.group.pop();
        }
    }

    fn queue_group(&mut self) {
        self.queued.extend_from_slice(&self.group);
        self.group.truncate(1);
        self.group[0] = empty_code(self.config.sentinel);
    }

    /// Hand queued output to the sink, keeping whatever it did not accept.
    fn drain(&mut self) -> io::Result<()> {
        let mut written = 0;
        let result = loop {
            if written == self.queued.len() {
                break Ok(());
            }
            match self.sink.write(&self.queued[written..]) {
                Ok(0) => break Err(io::Error::from(io::ErrorKind::WriteZero)),
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => break Err(e),
            }
        };
        self.queued.drain(..written);
        if result.is_ok() {
            self.close_queued = false;
        }
        result
    }
}

/// Lets an encoder sit anywhere a writer is expected (`io::copy`, another
/// encoder's or decoder's sink).
///
/// A sink failure after some input was consumed is a short write; the
/// error comes back on the next call, after the queued output. `flush`
/// writes queued groups and flushes the sink; the partial group stays
/// buffered until [`Encoder::close`].
impl<W: Write> Write for Encoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match Self::write(self, buf) {
            Ok(n) => Ok(n),
            Err(e) if e.offset() > 0 => Ok(e.offset()),
            Err(e) => Err(e.into_io()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.drain()?;
        self.sink.flush()
    }
}

/// Encode a whole payload in one call.
///
/// The output buffer is sized up front for the worst case, so it never
/// reallocates.
///
/// ```rust
/// use cobs_encoder::encode;
/// use cobs_wire::CobsConfig;
///
/// let wire = encode(b"", &CobsConfig::default()).unwrap();
/// assert_eq!(wire, [0x01]);
/// ```
///
/// # Errors
///
/// Writing into a `Vec` cannot fail, so errors only surface if that ever
/// changes; the signature mirrors the streaming API.
pub fn encode(payload: &[u8], config: &CobsConfig) -> Result<Vec<u8>, EncodeError> {
    let capacity = payload.len()
        + payload.len().div_ceil(MAX_RUN)
        + 1
        + usize::from(config.append_sentinel_on_close);
    let mut out = Vec::with_capacity(capacity);
    encode_into(payload, &mut out, config)?;
    Ok(out)
}

/// Encode a whole payload, appending the frame to `out`.
///
/// # Errors
///
/// See [`encode`].
pub fn encode_into(
    payload: &[u8],
    out: &mut Vec<u8>,
    config: &CobsConfig,
) -> Result<(), EncodeError> {
    let mut encoder = Encoder::with_config(out, *config);
    encoder.write(payload)?;
    encoder.close()
}
