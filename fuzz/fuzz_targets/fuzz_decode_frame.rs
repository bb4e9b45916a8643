#![no_main]

use jkess_rs::jk::modbus::classify;
use jkess_rs::{decode, DecodeOptions, Frame};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must never panic the decoder or the classifier.
    let _ = decode(&Frame::new(data.to_vec()), 1, &DecodeOptions::default());
    let _ = classify(data);

    // Fix up the checksum so the payload decoders are reached too.
    if data.len() >= 300 {
        let mut fixed = data.to_vec();
        fixed[4] = 1 + fixed[4] % 3;
        fixed[299] = fixed[..299].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
        let _ = decode(&Frame::new(fixed), 1, &DecodeOptions::default());
    }
});
