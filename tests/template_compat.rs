//! Forward compatibility: an ebox carrying an unrecognized TLV tag inside
//! a part must still parse, ignore the tag, and unlock to the original key.

use ebox::codec::Writer;
use ebox::{ConfigBuilder, Ebox, StaticSecretOracle, Template, TemplateBuilder, TemplatePart};
use rand_core::OsRng;
use x25519_dalek::StaticSecret;

const UNKNOWN_TAG: u8 = 0xFE;

fn primary_template() -> (Template, StaticSecretOracle) {
    let secret = StaticSecret::random_from_rng(OsRng);
    let oracle = StaticSecretOracle::new(secret);
    let part = TemplatePart::new(oracle.pubkey().clone());
    let tpl = TemplateBuilder::new()
        .add_config(ConfigBuilder::primary().add_part(part).unwrap().finish().unwrap())
        .build();
    (tpl, oracle)
}

/// Splice an unknown TLV field into the sole part of a single-config,
/// single-part PRIMARY ebox, just ahead of the part's terminating tag.
/// A PRIMARY part with no name/guid/slot/card-auth field is the last
/// thing written to the wire, so its END sentinel is the buffer's final
/// byte — inserting before it keeps every other offset untouched.
fn inject_unknown_tag(ebox_bytes: &[u8]) -> Vec<u8> {
    assert_eq!(*ebox_bytes.last().unwrap(), 0, "expected part END sentinel as final byte");
    let mut bytes = ebox_bytes[..ebox_bytes.len() - 1].to_vec();
    let mut w = Writer::new();
    w.put_field(UNKNOWN_TAG, b"future-field-a-reader-from-today-cannot-know-about");
    bytes.extend_from_slice(&w.into_bytes());
    bytes.push(0); // restore the part's END sentinel
    bytes
}

#[test]
fn unknown_part_tag_is_skipped_and_key_survives() {
    let (tpl, oracle) = primary_template();
    let key = b"the escrowed master key";

    let sealed = Ebox::create(&tpl, key, None).unwrap();
    let with_extra_tag = inject_unknown_tag(&sealed.to_bytes());

    let mut parsed = Ebox::from_bytes(&with_extra_tag).expect("unknown tag must not fail parsing");
    parsed.unseal_primary_part(0, &oracle).unwrap();
    parsed.unlock(0).unwrap();
    assert_eq!(parsed.key().unwrap(), key);

    // Re-serializing and parsing again still yields the same key: the
    // reader need not preserve a tag it didn't understand.
    let mut roundtrip = Ebox::from_bytes(&parsed.to_bytes()).unwrap();
    roundtrip.unseal_primary_part(0, &oracle).unwrap();
    roundtrip.unlock(0).unwrap();
    assert_eq!(roundtrip.key().unwrap(), key);
}

#[test]
fn unknown_part_tag_alone_does_not_change_recipient_pubkey() {
    let (tpl, oracle) = primary_template();
    let sealed = Ebox::create(&tpl, b"another escrowed key", None).unwrap();
    let with_extra_tag = inject_unknown_tag(&sealed.to_bytes());

    let parsed = Ebox::from_bytes(&with_extra_tag).unwrap();
    let original_part = match &tpl.configs()[0] {
        ebox::TemplateConfig::Primary { part } => part,
        _ => unreachable!(),
    };
    assert!(
        parsed.configs()[0].parts()[0].template_part().recipient_pubkey()
            == original_part.recipient_pubkey()
    );
}
