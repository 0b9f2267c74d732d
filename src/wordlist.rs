//! Fixed 256-word table used to turn challenge nonces into human-readable
//! voice-verification words (spec section 4.6, SPEC_FULL.md section 2).
//!
//! Each byte of the 16-byte nonce's first four bytes selects one word, so
//! the mapping is a pure, deterministic function of the nonce — no RNG,
//! no locale dependence. The list is a short, phonetically distinct set in
//! the spirit of proquint encoding, not the proquint algorithm itself.

pub const WORDS: [&str; 256] = [
    "abacus", "acid", "acorn", "actor", "adder", "agate", "agent", "alarm", "album", "alloy",
    "almond", "alpha", "amber", "amigo", "anchor", "angle", "anvil", "apple", "apron", "arbor",
    "arena", "armor", "arrow", "ashen", "aspen", "atlas", "atom", "audit", "auger", "aunt",
    "autumn", "avid", "awl", "axiom", "axis", "azure", "badge", "bagel", "baker", "banjo",
    "barge", "basil", "baton", "beach", "beacon", "beagle", "beam", "bean", "bear", "beaver",
    "beetle", "bell", "belt", "bench", "berry", "bike", "birch", "bison", "blade", "blanket",
    "blaze", "blimp", "blue", "boat", "bolt", "bonbon", "bonsai", "boost", "booth", "boots",
    "bottle", "boulder", "bound", "bowl", "brace", "branch", "brass", "brave", "bread", "brick",
    "bridge", "brisk", "broom", "brown", "brush", "buckle", "budget", "buffer", "bugle", "bulb",
    "bull", "bunny", "cabin", "cable", "cactus", "camel", "camera", "canal", "candle", "candy",
    "canoe", "canvas", "canyon", "cargo", "carpet", "carrot", "castle", "cedar", "cello", "chain",
    "chair", "chalk", "charm", "chart", "cherry", "chess", "chest", "chili", "chip", "choir",
    "circle", "clamp", "claw", "clay", "cliff", "clock", "cloud", "clover", "coast", "cobalt",
    "coil", "comet", "compass", "cone", "copper", "coral", "cork", "corn", "cotton", "cougar",
    "cradle", "crane", "crater", "cream", "crest", "crisp", "crown", "crumb", "crystal", "cube",
    "cuff", "curl", "curry", "dagger", "daisy", "dance", "dart", "dawn", "deer", "delta",
    "denim", "depot", "desert", "diamond", "digit", "diner", "dingo", "disco", "dock", "dome",
    "domino", "donor", "dough", "dove", "dozen", "drift", "drill", "drum", "duck", "dune",
    "dust", "eagle", "earth", "echo", "eel", "elbow", "elder", "elk", "elm", "ember",
    "emery", "ergo", "ether", "ewok", "fable", "falcon", "fawn", "fence", "fern", "ferry",
    "fiddle", "field", "finch", "finger", "fjord", "flame", "flask", "fleet", "flint", "flora",
    "flour", "flute", "foam", "foil", "forest", "forge", "fossil", "fox", "frame", "frost",
    "fudge", "fuel", "fungi", "galaxy", "gallon", "garden", "garlic", "gate", "gauge", "gazebo",
    "gecko", "gem", "ghost", "giant", "ginger", "glacier", "glass", "glide", "globe", "glove",
    "goat", "gold", "gopher", "gorge", "grain", "grape", "graph", "grass", "gravel", "hazel",
    "heron", "hinge", "honey", "hoof", "husky", "ivory",
];

/// Map the first four bytes of a challenge nonce to four words, for
/// out-of-band voice verification (spec section 4.6, SPEC_FULL.md section 2).
pub fn words_for_nonce(nonce: &[u8; 16]) -> [&'static str; 4] {
    [
        WORDS[nonce[0] as usize],
        WORDS[nonce[1] as usize],
        WORDS[nonce[2] as usize],
        WORDS[nonce[3] as usize],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_256_distinct_words() {
        assert_eq!(WORDS.len(), 256);
        let mut sorted = WORDS.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 256, "wordlist must contain no duplicates");
    }

    #[test]
    fn derivation_is_deterministic() {
        let nonce = [7u8; 16];
        assert_eq!(words_for_nonce(&nonce), words_for_nonce(&nonce));
    }

    #[test]
    fn different_nonces_usually_derive_different_words() {
        let a = words_for_nonce(&[1, 2, 3, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        let b = words_for_nonce(&[5, 6, 7, 8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_ne!(a, b);
    }
}
