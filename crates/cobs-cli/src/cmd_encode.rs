/// Implementation of `cobs encode`.
///
/// Streams the whole input through a single [`Encoder`], so the output is
/// exactly one frame. `--del` appends the sentinel so the frame can be
/// concatenated with others.
///
/// ```text
/// $ printf 'hello\nworld' | cobs encode -s 0x0A -d | xxd
/// 00000000: 0568 656c 6c6f 0577 6f72 6c64 0a        .hello.world.
/// ```
use std::io::{self, Write};

use anyhow::{Context, Result};
use cobs_encoder::Encoder;

use crate::{EncodeArgs, open_input, open_output};

/// Run the `cobs encode` command.
///
/// # Errors
///
/// Returns an error if the input cannot be read or the output cannot be
/// written.
pub fn run(args: &EncodeArgs) -> Result<()> {
    let config = args.framing.config().with_sentinel_on_close(args.del);
    let mut input = open_input(args.framing.input.as_ref())?;
    let mut output = open_output(args.framing.output.as_ref())?;

    let mut encoder = Encoder::with_config(&mut output, config);
    let read = io::copy(&mut input, &mut encoder).context("failed to encode input")?;
    encoder.close().context("failed to finish frame")?;
    drop(encoder);

    output.flush().context("failed to flush output")?;
    tracing::debug!(bytes = read, sentinel = config.sentinel, "encoded frame");
    Ok(())
}
