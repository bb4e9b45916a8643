#![no_main]

use jkess_rs::Pipeline;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // The first byte of every segment gives the length of the read that follows.
    let mut pipeline = Pipeline::default();
    let mut rest = data;
    while let Some((&len, tail)) = rest.split_first() {
        let len = usize::from(len).min(tail.len());
        let (chunk, next) = tail.split_at(len);
        pipeline.feed(chunk);
        rest = next;
    }
});
