#![no_main]

use libfuzzer_sys::fuzz_target;

// The ebox parser is the attacker-facing surface for any stored or
// transmitted sealed container (spec section 4.1/6.1): it must never
// panic on malformed input, only return an error.
fuzz_target!(|data: &[u8]| {
    let _ = ebox::Ebox::from_bytes(data);
});
