#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use cobs_decoder::decode;
use cobs_wire::{scan_frame, CobsConfig};
use libfuzzer_sys::fuzz_target;

// Fuzz target: layout scanner vs. decoder.
//
// For a single unterminated frame (input cut at its first sentinel) the
// scanner and the one-shot decoder must accept exactly the same inputs, and
// agree on the decoded length.
fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(sentinel) = u8::arbitrary(&mut u) else {
        return;
    };
    let Ok(reduced) = bool::arbitrary(&mut u) else {
        return;
    };
    let config = CobsConfig::new().with_sentinel(sentinel).with_reduced(reduced);
    let rest = u.take_rest();
    let end = rest.iter().position(|&b| b == sentinel).unwrap_or(rest.len());
    let frame = &rest[..end];

    match (scan_frame(frame, &config), decode(frame, &config)) {
        (Ok(layout), Ok(payload)) => assert_eq!(layout.decoded_len, payload.len()),
        (Err(_), Err(_)) => {}
        (scan, decoded) => panic!("disagreement: scan={scan:?} decode={:?}", decoded.map(|p| p.len())),
    }
});
