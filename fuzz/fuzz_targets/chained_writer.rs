#![no_main]

use std::io::Write;

use arbitrary::Arbitrary;
use cobs_decoder::Decoder;
use cobs_encoder::{encode, Encoder};
use cobs_wire::CobsConfig;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    sentinel: u8,
    reduced: bool,
    /// Payload split into arbitrarily sized writes.
    chunks: Vec<Vec<u8>>,
}

// Fuzz target: encoder writing straight into a decoder through `io::Write`.
//
// Chunk boundaries must not change the wire bytes or the decoded payload.
fuzz_target!(|input: FuzzInput| {
    let config = CobsConfig::new()
        .with_sentinel(input.sentinel)
        .with_reduced(input.reduced);
    let payload: Vec<u8> = input.chunks.concat();

    let mut decoded = Vec::new();
    let mut decoder = Decoder::with_config(&mut decoded, config);
    let mut encoder = Encoder::with_config(&mut decoder, config);
    for chunk in &input.chunks {
        encoder.write_all(chunk).unwrap();
    }
    encoder.close().unwrap();
    drop(encoder);
    decoder.close().unwrap();
    drop(decoder);
    assert_eq!(decoded, payload);

    let mut wire = Vec::new();
    let mut encoder = Encoder::with_config(&mut wire, config);
    for chunk in &input.chunks {
        encoder.write_all(chunk).unwrap();
    }
    encoder.close().unwrap();
    drop(encoder);
    assert_eq!(wire, encode(&payload, &config).unwrap());
});
