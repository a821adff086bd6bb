//! Golden fixture generator for the COBS conformance suite.
//!
//! Writes `tests/golden/<suite>/<case>/{payload.bin,encoded.bin}` for every
//! case in every suite. Run it after a deliberate wire-format change and
//! commit the result; `tests/conformance.rs` then pins both directions of
//! the transform to these bytes.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin generate_golden -p cobs-tests
//! ```
//!
//! # Suites
//!
//! | Directory     | Configuration                                   |
//! |---------------|-------------------------------------------------|
//! | default       | sentinel 0x00, plain COBS                       |
//! | reduced       | sentinel 0x00, COBS/R                           |
//! | sentinel_ff   | sentinel 0xFF (max length byte 0xFE)            |
//! | sentinel_0a   | sentinel 0x0A (length bytes skip 0x0A)          |
//!
//! Every suite shares the same case list. Zero bytes in a case payload are
//! replaced by the suite's sentinel, so "embedded_zero" always embeds the
//! byte that has to be stuffed.

#![allow(clippy::pedantic)]

use std::path::Path;

use cobs_encoder::encode;
use cobs_wire::CobsConfig;

const ALNUM: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTabcdefghijklmnopqrst";

fn main() {
    let manifest_dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let golden_dir = manifest_dir.join("tests/golden");

    let suites = [
        ("default", CobsConfig::new()),
        ("reduced", CobsConfig::new().with_reduced(true)),
        ("sentinel_ff", CobsConfig::new().with_sentinel(0xFF)),
        ("sentinel_0a", CobsConfig::new().with_sentinel(0x0A)),
    ];

    for (suite, config) in suites {
        for (case, template) in cases() {
            let payload: Vec<u8> = template
                .iter()
                .map(|&b| if b == 0 { config.sentinel } else { b })
                .collect();
            let encoded = encode(&payload, &config).expect("encode into Vec");

            let dir = golden_dir.join(suite).join(case);
            write_file(&dir.join("payload.bin"), &payload);
            write_file(&dir.join("encoded.bin"), &encoded);
        }
    }

    println!("All golden fixtures written to {}", golden_dir.display());
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn write_file(path: &Path, data: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create_dir_all");
    }
    std::fs::write(path, data).expect("write_file");
    println!("  wrote {}", path.display());
}

/// `len` alphanumeric bytes: 250 bytes of the repeating pattern, then a
/// "12345..." tail.
fn run(len: usize) -> Vec<u8> {
    let mut out = ALNUM.repeat(5);
    out.extend(b"123456789".iter().take(len - out.len()));
    out
}

fn with(mut head: Vec<u8>, tail: &[u8]) -> Vec<u8> {
    head.extend_from_slice(tail);
    head
}

// ── Case list ────────────────────────────────────────────────────────────────

fn cases() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("empty", Vec::new()),
        ("one_char", b"1".to_vec()),
        ("one_zero", vec![0x00]),
        ("two_zeroes", vec![0x00; 2]),
        ("three_zeroes", vec![0x00; 3]),
        ("five_chars", b"12345".to_vec()),
        ("embedded_zero", b"12345\x006789".to_vec()),
        ("leading_and_embedded_zero", b"\x0012345\x006789".to_vec()),
        ("embedded_and_trailing_zero", b"12345\x006789\x00".to_vec()),
        ("run_253", run(253)),
        ("run_254", run(254)),
        ("run_255", run(255)),
        ("zero_then_run_255", with(vec![0x00], &run(255))),
        ("run_253_then_zero", with(run(253), &[0x00])),
        ("run_254_then_zero", with(run(254), &[0x00])),
        ("run_255_then_zero", with(run(255), &[0x00])),
    ]
}
