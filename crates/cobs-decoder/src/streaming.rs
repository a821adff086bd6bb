use bytes::buf::Writer;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use cobs_wire::CobsConfig;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::decoder::{Decoder, FrameStatus};
use crate::error::DecodeError;

/// Bytes requested from the reader per refill.
const READ_CHUNK: usize = 4096;

/// Asynchronous frame reader: pulls sentinel-delimited COBS frames off any
/// `AsyncRead` and yields each decoded payload as [`Bytes`].
///
/// The reader only touches the underlying source when the caller awaits
/// the next frame, so backpressure comes for free. A malformed frame is
/// reported once and reading resumes after its sentinel; empty wire frames
/// (two sentinels back to back) are skipped.
///
/// ```text
///   source ──read──► buf ──Decoder──► BytesMut ──split──► Bytes
///                     │                  │
///                     └─ Discard: drop   └─ FrameTooLarge when over
///                        until sentinel     max_frame_len
/// ```
///
/// # Example
///
/// ```rust,no_run
/// use cobs_decoder::FrameReader;
/// use tokio::io::AsyncRead;
///
/// async fn drain(reader: impl AsyncRead + Unpin) {
///     let mut frames = FrameReader::new(reader);
///     while let Some(frame) = frames.next_frame().await {
///         match frame {
///             Ok(payload) => println!("{} bytes", payload.len()),
///             Err(e) => eprintln!("bad frame: {e}"),
///         }
///     }
/// }
/// ```
pub struct FrameReader<R> {
    reader: R,
    decoder: Decoder<Writer<BytesMut>>,
    /// Input read from `reader` but not yet fed to the decoder.
    buf: BytesMut,
    /// Bytes of the current frame have been fed since the last boundary.
    pending: bool,
    max_frame_len: Option<usize>,
    state: ReadState,
}

/// ```text
///   Frames ──oversized──► Discard ──sentinel──► Frames
///      │
///      └──EOF / read error──► Done
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ReadState {
    Frames,
    Discard,
    Done,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, CobsConfig::default())
    }

    #[must_use]
    pub fn with_config(reader: R, config: CobsConfig) -> Self {
        Self {
            reader,
            decoder: Decoder::with_config(BytesMut::new().writer(), config),
            buf: BytesMut::with_capacity(READ_CHUNK),
            pending: false,
            max_frame_len: None,
            state: ReadState::Frames,
        }
    }

    /// Cap the decoded size of a single frame.
    ///
    /// An oversized frame yields [`DecodeError::FrameTooLarge`] and the rest
    /// of it, up to and including its sentinel, is dropped unread.
    #[must_use]
    pub fn with_max_frame_len(mut self, limit: usize) -> Self {
        self.max_frame_len = Some(limit);
        self
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Read the next frame.
    ///
    /// Returns `None` once the source is exhausted. A last frame without a
    /// closing sentinel is still yielded when it is complete.
    pub async fn next_frame(&mut self) -> Option<Result<Bytes, DecodeError>> {
        loop {
            if self.state == ReadState::Done {
                return None;
            }

            if let Some(result) = self.drain_buffered() {
                return Some(result);
            }

            self.buf.reserve(READ_CHUNK);
            match self.reader.read_buf(&mut self.buf).await {
                Ok(0) => return self.finish(),
                Ok(_) => {}
                Err(e) => {
                    self.state = ReadState::Done;
                    return Some(Err(DecodeError::Io(e)));
                }
            }
        }
    }

    /// Feed buffered input to the decoder until a frame or an error comes
    /// out, or the buffer runs dry.
    fn drain_buffered(&mut self) -> Option<Result<Bytes, DecodeError>> {
        while !self.buf.is_empty() {
            if self.state == ReadState::Discard {
                let sentinel = self.decoder.config().sentinel;
                match self.buf.iter().position(|&b| b == sentinel) {
                    Some(pos) => {
                        self.buf.advance(pos + 1);
                        self.state = ReadState::Frames;
                    }
                    None => self.buf.clear(),
                }
                continue;
            }

            match self.decoder.write(&self.buf) {
                Ok(FrameStatus::Continue) => {
                    self.buf.clear();
                    self.pending = true;
                    if let Err(e) = self.check_limit() {
                        tracing::debug!(error = %e, "discarding oversized frame");
                        self.restart_frame();
                        self.state = ReadState::Discard;
                        return Some(Err(e));
                    }
                }
                Ok(FrameStatus::EndOfFrame { consumed }) => {
                    self.buf.advance(consumed);
                    let empty_wire_frame = consumed == 1 && !self.pending;
                    self.pending = false;
                    if empty_wire_frame {
                        continue;
                    }
                    return Some(self.check_limit().map(|()| self.take_output()));
                }
                Err(e) => {
                    // The offending sentinel ends the bad frame.
                    self.buf.advance(e.offset() + 1);
                    tracing::debug!(error = %e, "skipping malformed frame");
                    self.restart_frame();
                    return Some(Err(e));
                }
            }
        }
        None
    }

    fn finish(&mut self) -> Option<Result<Bytes, DecodeError>> {
        let state = std::mem::replace(&mut self.state, ReadState::Done);
        if state != ReadState::Frames || !self.pending {
            return None;
        }

        self.pending = false;
        let result = self.decoder.close().and_then(|()| self.check_limit());
        Some(result.map(|()| self.take_output()))
    }

    fn check_limit(&mut self) -> Result<(), DecodeError> {
        let size = self.decoder.get_ref().get_ref().len();
        match self.max_frame_len {
            Some(limit) if size > limit => {
                self.decoder.get_mut().get_mut().clear();
                Err(DecodeError::FrameTooLarge { size, limit })
            }
            _ => Ok(()),
        }
    }

    fn take_output(&mut self) -> Bytes {
        self.decoder.get_mut().get_mut().split().freeze()
    }

    fn restart_frame(&mut self) {
        self.decoder.reset();
        self.decoder.get_mut().get_mut().clear();
        self.pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use cobs_encoder::encode;
    use tokio::io::{AsyncWriteExt, ReadBuf};

    /// A source whose every read fails.
    struct BrokenSource;

    impl AsyncRead for BrokenSource {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::ConnectionReset, "peer reset")))
        }
    }

    fn wire(frames: &[&[u8]], config: &CobsConfig) -> Vec<u8> {
        let mut out = Vec::new();
        for frame in frames {
            out.extend(encode(frame, config).unwrap());
            out.push(config.sentinel);
        }
        out
    }

    async fn collect<R: AsyncRead + Unpin>(
        reader: &mut FrameReader<R>,
    ) -> Vec<Result<Bytes, DecodeError>> {
        let mut out = Vec::new();
        while let Some(frame) = reader.next_frame().await {
            out.push(frame);
        }
        out
    }

    #[tokio::test]
    async fn reads_consecutive_frames() {
        let config = CobsConfig::default();
        let input = wire(&[b"first", b"\x00second\x00"], &config);
        let mut reader = FrameReader::new(input.as_slice());

        assert_eq!(reader.next_frame().await.unwrap().unwrap(), &b"first"[..]);
        assert_eq!(
            reader.next_frame().await.unwrap().unwrap(),
            &b"\x00second\x00"[..]
        );
        assert!(reader.next_frame().await.is_none());
        assert!(reader.next_frame().await.is_none());
    }

    #[tokio::test]
    async fn yields_unterminated_last_frame() {
        let mut input = wire(&[b"one"], &CobsConfig::default());
        input.extend(b"\x04two");
        let mut reader = FrameReader::new(input.as_slice());

        let frames: Vec<_> = collect(&mut reader)
            .await
            .into_iter()
            .map(Result::unwrap)
            .collect();
        assert_eq!(frames, vec![Bytes::from_static(b"one"), Bytes::from_static(b"two")]);
    }

    #[tokio::test]
    async fn truncated_tail_is_incomplete() {
        let mut reader = FrameReader::new(&b"\x03a"[..]);
        let err = reader.next_frame().await.unwrap().unwrap_err();
        assert!(matches!(err, DecodeError::IncompleteFrame { missing: 1 }));
        assert!(reader.next_frame().await.is_none());
    }

    #[tokio::test]
    async fn recovers_after_malformed_frame() {
        let mut reader = FrameReader::new(&b"\x02a\x00\x03b\x00\x02c\x00"[..]);

        assert_eq!(reader.next_frame().await.unwrap().unwrap(), &b"a"[..]);
        let err = reader.next_frame().await.unwrap().unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedEndOfFrame { missing: 1, .. }));
        assert_eq!(reader.next_frame().await.unwrap().unwrap(), &b"c"[..]);
        assert!(reader.next_frame().await.is_none());
    }

    #[tokio::test]
    async fn skips_empty_wire_frames() {
        let mut reader = FrameReader::new(&b"\x00\x00\x02a\x00\x00\x01\x00"[..]);
        let frames: Vec<_> = collect(&mut reader)
            .await
            .into_iter()
            .map(Result::unwrap)
            .collect();
        // `\x01` is an encoded empty payload, not an empty wire frame.
        assert_eq!(frames, vec![Bytes::from_static(b"a"), Bytes::new()]);
    }

    #[tokio::test]
    async fn custom_sentinel_and_reduced_mode() {
        let config = CobsConfig::new().with_sentinel(b'\n').with_reduced(true);
        let input = wire(&[b"hello\nworld", b"12345"], &config);
        let mut reader = FrameReader::with_config(input.as_slice(), config);

        assert_eq!(
            reader.next_frame().await.unwrap().unwrap(),
            &b"hello\nworld"[..]
        );
        assert_eq!(reader.next_frame().await.unwrap().unwrap(), &b"12345"[..]);
        assert!(reader.next_frame().await.is_none());
    }

    #[tokio::test]
    async fn oversized_frame_in_one_read() {
        let mut reader =
            FrameReader::new(&b"\x06hello\x00\x02a\x00"[..]).with_max_frame_len(3);

        let err = reader.next_frame().await.unwrap().unwrap_err();
        assert!(matches!(err, DecodeError::FrameTooLarge { size: 5, limit: 3 }));
        assert_eq!(reader.next_frame().await.unwrap().unwrap(), &b"a"[..]);
        assert!(reader.next_frame().await.is_none());
    }

    #[tokio::test]
    async fn oversized_frame_across_reads_is_discarded() {
        let (mut tx, rx) = tokio::io::duplex(2);
        tokio::spawn(async move {
            tx.write_all(b"\x06hello\x00\x02a\x00").await.unwrap();
        });

        let mut reader = FrameReader::new(rx).with_max_frame_len(3);
        let err = reader.next_frame().await.unwrap().unwrap_err();
        assert!(matches!(err, DecodeError::FrameTooLarge { limit: 3, .. }));
        assert_eq!(reader.next_frame().await.unwrap().unwrap(), &b"a"[..]);
        assert!(reader.next_frame().await.is_none());
    }

    #[tokio::test]
    async fn byte_at_a_time_source() {
        let config = CobsConfig::default();
        let payload: Vec<u8> = (0..600u32).map(|i| (i % 7) as u8).collect();
        let input = wire(&[payload.as_slice(), b"tail"], &config);

        let (mut tx, rx) = tokio::io::duplex(1);
        tokio::spawn(async move {
            tx.write_all(&input).await.unwrap();
        });

        let mut reader = FrameReader::new(rx);
        assert_eq!(reader.next_frame().await.unwrap().unwrap(), payload);
        assert_eq!(reader.next_frame().await.unwrap().unwrap(), &b"tail"[..]);
        assert!(reader.next_frame().await.is_none());
    }

    #[tokio::test]
    async fn read_error_is_reported_once_then_ends() {
        let config = CobsConfig::default();
        let input = wire(&[b"ok"], &config);
        let source = AsyncReadExt::chain(input.as_slice(), BrokenSource);

        let mut reader = FrameReader::new(source);
        assert_eq!(reader.next_frame().await.unwrap().unwrap(), &b"ok"[..]);
        let err = reader.next_frame().await.unwrap().unwrap_err();
        assert!(matches!(&err, DecodeError::Io(e) if e.kind() == io::ErrorKind::ConnectionReset));
        assert!(reader.next_frame().await.is_none());
    }

    #[tokio::test]
    async fn read_error_mid_frame_drops_partial_payload() {
        let source = AsyncReadExt::chain(&b"\x05abc"[..], BrokenSource);

        let mut reader = FrameReader::new(source);
        assert!(matches!(
            reader.next_frame().await,
            Some(Err(DecodeError::Io(_)))
        ));
        assert!(reader.next_frame().await.is_none());
    }
}
