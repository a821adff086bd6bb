/// Implementation of `cobs inspect`.
///
/// Splits the input on the sentinel and prints the group layout of every
/// non-empty frame without decoding it. Malformed frames are reported in
/// place; the command then exits with an error.
///
/// # Output format
///
/// ```text
/// Frame 0 @0: 11 bytes on wire, decodes to 10 bytes
///   group @0    code=0x06  data=5  +sentinel
///   group @6    code=0x05  data=4
/// Frame 1 @12: 3 bytes on wire
///   error: group at offset 0 declares 4 data bytes, only 2 available
/// ---
/// 2 frames, 1 malformed
/// ```
use std::io::{Read, Write};

use anyhow::{Context, Result, bail};
use cobs_wire::{CobsConfig, FrameLayout, scan_frame};
use serde::Serialize;

use crate::{InspectArgs, open_input, open_output};

// ── Report types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Report {
    sentinel: u8,
    reduced: bool,
    frames: Vec<FrameReport>,
}

#[derive(Serialize)]
struct FrameReport {
    index: usize,
    offset: usize,
    wire_len: usize,
    decoded_len: Option<usize>,
    groups: Vec<GroupReport>,
    error: Option<String>,
}

#[derive(Serialize)]
struct GroupReport {
    offset: usize,
    code: u8,
    data_len: usize,
    sentinel_follows: bool,
    reduced_tail: bool,
}

/// Run the `cobs inspect` command.
///
/// # Errors
///
/// Returns an error on I/O failure or if any frame is malformed.
pub fn run(args: &InspectArgs) -> Result<()> {
    let config = args.framing.config();
    let mut input = open_input(args.framing.input.as_ref())?;
    let mut bytes = Vec::new();
    input
        .read_to_end(&mut bytes)
        .context("failed to read input")?;

    let report = build_report(&bytes, &config);
    let malformed = report.frames.iter().filter(|f| f.error.is_some()).count();

    let mut output = open_output(args.framing.output.as_ref())?;
    if args.json {
        serde_json::to_writer_pretty(&mut output, &report).context("failed to write report")?;
        writeln!(output)?;
    } else {
        print_report(&mut output, &report)?;
    }
    output.flush().context("failed to flush output")?;

    if malformed > 0 {
        bail!("{malformed} of {} frames malformed", report.frames.len());
    }
    Ok(())
}

fn build_report(bytes: &[u8], config: &CobsConfig) -> Report {
    let mut frames = Vec::new();
    let mut offset = 0;

    for frame in bytes.split(|&b| b == config.sentinel) {
        if !frame.is_empty() {
            let (layout, error) = match scan_frame(frame, config) {
                Ok(layout) => (Some(layout), None),
                Err(e) => (None, Some(e.to_string())),
            };
            frames.push(frame_report(frames.len(), offset, frame.len(), layout, error));
        }
        offset += frame.len() + 1;
    }

    Report {
        sentinel: config.sentinel,
        reduced: config.reduced,
        frames,
    }
}

fn frame_report(
    index: usize,
    offset: usize,
    wire_len: usize,
    layout: Option<FrameLayout>,
    error: Option<String>,
) -> FrameReport {
    let decoded_len = layout.as_ref().map(|l| l.decoded_len);
    let groups = layout
        .map(|l| l.groups)
        .unwrap_or_default()
        .into_iter()
        .map(|g| GroupReport {
            offset: g.offset,
            code: g.code,
            data_len: g.data_len,
            sentinel_follows: g.sentinel_follows,
            reduced_tail: g.reduced_tail,
        })
        .collect();

    FrameReport {
        index,
        offset,
        wire_len,
        decoded_len,
        groups,
        error,
    }
}

fn print_report(out: &mut impl Write, report: &Report) -> Result<()> {
    for frame in &report.frames {
        write!(
            out,
            "Frame {} @{}: {} bytes on wire",
            frame.index, frame.offset, frame.wire_len
        )?;
        match frame.decoded_len {
            Some(len) => writeln!(out, ", decodes to {len} bytes")?,
            None => writeln!(out)?,
        }

        for group in &frame.groups {
            let mut flags = String::new();
            if group.sentinel_follows {
                flags.push_str("  +sentinel");
            }
            if group.reduced_tail {
                flags.push_str("  reduced-tail");
            }
            writeln!(
                out,
                "  group @{:<4} code=0x{:02X}  data={}{flags}",
                group.offset, group.code, group.data_len
            )?;
        }

        if let Some(ref error) = frame.error {
            writeln!(out, "  error: {error}")?;
        }
    }

    let malformed = report.frames.iter().filter(|f| f.error.is_some()).count();
    writeln!(out, "---")?;
    writeln!(
        out,
        "{} frame{}, {malformed} malformed",
        report.frames.len(),
        if report.frames.len() == 1 { "" } else { "s" }
    )?;
    Ok(())
}
