#![no_main]
use libfuzzer_sys::fuzz_target;
use seqdelta::engine::{self, EncodeOptions};
use seqdelta::hash::config::IndexConfig;

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    // A cap of 0..=15 entries, or 16 for unbounded buckets.
    let cap = data[0] % 17;
    let bucket_cap = (cap < 16).then_some(cap as usize);
    let split = 2 + (data[1] as usize % (data.len() - 2));
    let old = &data[2..split];
    let new = &data[split..];

    let diff = engine::encode_with_options(
        old,
        new,
        &EncodeOptions {
            index: IndexConfig { bucket_cap },
        },
    );

    let decoded = engine::decode(old, &diff).unwrap();
    assert_eq!(decoded, new);
});
