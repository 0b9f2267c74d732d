#![no_main]

use libfuzzer_sys::fuzz_target;

// The template parser is the attacker-facing surface for any stored or
// transmitted policy description (spec section 4.1/6.1): it must never
// panic on malformed input, only return an error.
fuzz_target!(|data: &[u8]| {
    let _ = ebox::Template::from_bytes(data);
});
