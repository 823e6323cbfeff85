#![no_main]
use libfuzzer_sys::fuzz_target;
use seqdelta::engine;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    // Use first byte as control flags.
    let flags = data[0];
    let payload = &data[1..];
    let use_old = flags & 1 != 0;

    // Split payload into "old" and "new".
    let split = payload.len() / 2;
    let (old, new) = if use_old && split > 0 {
        (&payload[..split], &payload[split..])
    } else {
        (&[] as &[u8], payload)
    };

    let diff = engine::encode(old, new);
    let decoded = engine::decode(old, &diff).unwrap();
    assert_eq!(decoded, new);
});
