#![no_main]

use arbitrary::Arbitrary;
use cobs_decoder::decode;
use cobs_encoder::encode;
use cobs_wire::{max_encoded_len, CobsConfig};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    sentinel: u8,
    reduced: bool,
    payload: Vec<u8>,
}

// Fuzz target: encode -> decode roundtrip.
//
// The encoding must be sentinel-free, within the worst-case bound, and
// decode back to the original payload.
fuzz_target!(|input: FuzzInput| {
    let config = CobsConfig::new()
        .with_sentinel(input.sentinel)
        .with_reduced(input.reduced);

    let wire = encode(&input.payload, &config).unwrap();
    assert!(!wire.contains(&input.sentinel));
    assert!(wire.len() <= max_encoded_len(input.payload.len()));

    let decoded = decode(&wire, &config).unwrap();
    assert_eq!(decoded, input.payload);
});
