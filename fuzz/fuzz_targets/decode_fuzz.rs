#![no_main]
use libfuzzer_sys::fuzz_target;
use seqdelta::diff::{DecodeOptions, DiffDecoder, decode_memory};

fuzz_target!(|data: &[u8]| {
    // Fuzz the decoder with arbitrary bytes.
    // The decoder must never panic; it only returns errors.
    let _ = decode_memory(data, &[]);

    // Also fuzz with a non-empty old buffer, in both copy-bounds modes.
    if data.len() >= 2 {
        let split = data.len() / 2;
        let (old, diff) = data.split_at(split);
        let _ = decode_memory(diff, old);

        let mut strict = DiffDecoder::with_options(
            old,
            DecodeOptions {
                strict_copy_bounds: true,
            },
        );
        let mut out = Vec::new();
        let _ = strict.decode_into(diff, &mut out);
    }
});
