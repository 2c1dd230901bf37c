#![no_main]
use bitpack::{decode_words, Packed};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|words: Vec<u32>| {
    // Arbitrary words must be rejected or decoded, never panic.
    let Ok(packed) = Packed::from_words(&words) else {
        return;
    };

    let decoded = packed.decode();
    assert_eq!(decoded.len(), packed.len());
    for (i, &v) in decoded.iter().enumerate() {
        assert_eq!(packed.get(i).unwrap(), v);
    }
    assert_eq!(packed.to_words(), words);
    assert_eq!(decode_words(&words).unwrap(), decoded);
});
