/// Implementation of `cobs decode`.
///
/// Decodes the first frame of the input. Decoding stops at the first
/// sentinel; anything after it is ignored with a warning. Input that ends
/// without a sentinel is accepted as long as the last group is complete.
use std::io::{ErrorKind, Read, Write};

use anyhow::{Context, Result};
use cobs_decoder::{Decoder, FrameStatus};

use crate::{DecodeArgs, open_input, open_output};

const CHUNK: usize = 8192;

/// Run the `cobs decode` command.
///
/// # Errors
///
/// Returns an error on I/O failure or when the frame is malformed or
/// truncated.
pub fn run(args: &DecodeArgs) -> Result<()> {
    let config = args.framing.config();
    let mut input = open_input(args.framing.input.as_ref())?;
    let mut output = open_output(args.framing.output.as_ref())?;

    let mut decoder = Decoder::with_config(&mut output, config);
    let mut buf = vec![0u8; CHUNK];
    let mut total = 0usize;

    loop {
        let n = match input.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e).context("failed to read input"),
        };

        let status = decoder
            .write(&buf[..n])
            .with_context(|| format!("malformed frame near input offset {total}"))?;
        total += n;

        if let FrameStatus::EndOfFrame { consumed } = status {
            if consumed < n {
                tracing::warn!(
                    ignored = n - consumed,
                    "input continues after end of frame; ignoring the rest"
                );
            }
            break;
        }
    }

    decoder.close().context("truncated frame")?;
    drop(decoder);

    output.flush().context("failed to flush output")?;
    tracing::debug!(bytes = total, sentinel = config.sentinel, "decoded frame");
    Ok(())
}
