#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use cobs_decoder::{decode, decode_frames, Decoder, FrameStatus};
use cobs_wire::CobsConfig;
use libfuzzer_sys::fuzz_target;

// Fuzz target: decoders on arbitrary input.
//
// Neither the one-shot nor the streaming decoder may panic, and a frame the
// streaming decoder accepts must never decode to more bytes than it had on
// the wire (COBS/R tails included).
fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(sentinel) = u8::arbitrary(&mut u) else {
        return;
    };
    let Ok(reduced) = bool::arbitrary(&mut u) else {
        return;
    };
    let config = CobsConfig::new().with_sentinel(sentinel).with_reduced(reduced);
    let wire = u.take_rest();

    let _ = decode(wire, &config);
    let _ = decode_frames(wire, &config);

    let mut decoder = Decoder::with_config(Vec::new(), config);
    let mut rest = wire;
    while !rest.is_empty() {
        match decoder.write(rest) {
            Ok(FrameStatus::EndOfFrame { consumed }) => {
                assert!(decoder.get_ref().len() < consumed);
                decoder.get_mut().clear();
                rest = &rest[consumed..];
            }
            Ok(FrameStatus::Continue) => break,
            Err(e) => {
                decoder.reset();
                decoder.get_mut().clear();
                rest = &rest[e.offset() + 1..];
            }
        }
    }
});
