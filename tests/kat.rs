//! Known-answer / wire-format structural tests for the ebox binary formats
//! (spec section 6.1, 8 "Serialization is a bijection").

use ebox::{
    ConfigBuilder, Ebox, EboxError, SealedBox, StaticSecretOracle, Template, TemplateBuilder,
    TemplatePart, MAX_CIPHERTEXT_BYTES,
};
use x25519_dalek::StaticSecret;

fn holder() -> (TemplatePart, StaticSecretOracle) {
    let secret = StaticSecret::random_from_rng(rand_core::OsRng);
    let oracle = StaticSecretOracle::new(secret);
    (TemplatePart::new(oracle.pubkey().clone()), oracle)
}

#[test]
fn template_wire_constants() {
    // spec section 6.1: magic=0xEB 0xDA, version:u8 (=1).
    assert_eq!(ebox::TEMPLATE_MAGIC, [0xEB, 0xDA]);
    assert_eq!(ebox::TEMPLATE_VERSION, 1);
}

#[test]
fn ebox_wire_constants() {
    // spec section 6.1: magic=0xEB 0x0C, version:u8 (=2).
    assert_eq!(ebox::EBOX_MAGIC, [0xEB, 0x0C]);
    assert_eq!(ebox::EBOX_VERSION, 2);
}

#[test]
fn sealed_box_ciphertext_bound_matches_spec() {
    // spec section 4.2: "ciphertext length is bounded by <= 2^24 bytes".
    assert_eq!(MAX_CIPHERTEXT_BYTES, 1 << 24);
}

#[test]
fn wire_magic_bytes_match_known_hex() {
    assert_eq!(hex::encode(ebox::TEMPLATE_MAGIC), "ebda");
    assert_eq!(hex::encode(ebox::EBOX_MAGIC), "eb0c");
}

#[test]
fn fixed_seed_primary_round_trip_hex_vector() {
    // spec section 8 scenario 1's literal seed: a fixed token secret and
    // K = 0x00..0x1F (32 bytes).
    let seed_hex = "2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a";
    let seed_bytes = hex::decode(seed_hex).unwrap();
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&seed_bytes);
    let oracle = StaticSecretOracle::new(StaticSecret::from(seed));
    let part = TemplatePart::new(oracle.pubkey().clone());
    let tpl = TemplateBuilder::new()
        .add_config(ConfigBuilder::primary().add_part(part).unwrap().finish().unwrap())
        .build();

    let key: Vec<u8> = (0u8..=0x1F).collect();
    assert_eq!(
        hex::encode(&key),
        "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f"
    );

    let mut sealed = Ebox::create(&tpl, &key, None).unwrap();
    sealed.unseal_primary_part(0, &oracle).unwrap();
    sealed.unlock(0).unwrap();
    assert_eq!(sealed.key().unwrap(), key.as_slice());
}

#[test]
fn template_wire_structure_starts_with_magic_and_version() {
    let (part, _oracle) = holder();
    let tpl = TemplateBuilder::new()
        .add_config(ConfigBuilder::primary().add_part(part).unwrap().finish().unwrap())
        .build();

    let bytes = tpl.to_bytes();
    assert_eq!(&bytes[0..2], &[0xEB, 0xDA]);
    assert_eq!(bytes[2], 1); // version
    assert_eq!(bytes[3], 1); // nconfigs
}

#[test]
fn ebox_wire_structure_starts_with_magic_and_version() {
    let (part, _oracle) = holder();
    let tpl = TemplateBuilder::new()
        .add_config(ConfigBuilder::primary().add_part(part).unwrap().finish().unwrap())
        .build();
    let sealed = Ebox::create(&tpl, b"0123456789abcdef0123456789abcdef", None).unwrap();

    let bytes = sealed.to_bytes();
    assert_eq!(&bytes[0..2], &[0xEB, 0x0C]);
    assert_eq!(bytes[2], 2); // version
}

#[test]
fn template_rejects_unsupported_version() {
    let (part, _oracle) = holder();
    let tpl = TemplateBuilder::new()
        .add_config(ConfigBuilder::primary().add_part(part).unwrap().finish().unwrap())
        .build();
    let mut bytes = tpl.to_bytes();
    bytes[2] = 0x7F; // corrupt the version byte
    let err = Template::from_bytes(&bytes).unwrap_err();
    assert!(matches!(err, EboxError::UnsupportedVersion { found: 0x7F, .. }));
}

#[test]
fn ebox_rejects_bad_magic() {
    let mut bytes = alloc_like_vec();
    bytes[0] = 0x00;
    let err = Ebox::from_bytes(&bytes).unwrap_err();
    assert!(matches!(err, EboxError::InvalidFormat(_)));
}

fn alloc_like_vec() -> Vec<u8> {
    let (part, _oracle) = holder();
    let tpl = TemplateBuilder::new()
        .add_config(ConfigBuilder::primary().add_part(part).unwrap().finish().unwrap())
        .build();
    Ebox::create(&tpl, b"0123456789abcdef0123456789abcdef", None)
        .unwrap()
        .to_bytes()
}

#[test]
fn truncated_ebox_is_invalid_format_not_panic() {
    let bytes = alloc_like_vec();
    for cut in 1..bytes.len() {
        // Every truncation must either parse fine-grained trailing garbage
        // as invalid, or fail cleanly — never panic.
        let _ = Ebox::from_bytes(&bytes[..cut]);
    }
    let err = Ebox::from_bytes(&bytes[..bytes.len() - 1]).unwrap_err();
    assert!(matches!(err, EboxError::InvalidFormat(_)));
}

#[test]
fn sealed_box_tampered_byte_never_decrypts_silently() {
    let (part, oracle) = holder();
    let sb = SealedBox::seal(part.recipient_pubkey(), b"recovery share bytes").unwrap();
    let mut bytes = sb.to_bytes();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;
    let tampered = SealedBox::from_bytes(&bytes).unwrap();
    assert_eq!(tampered.unseal(&oracle), Err(EboxError::AuthFailed));
}
