//! Timing benchmarks for the ebox primary and k-of-n recovery paths.
//!
//! Run with: `cargo bench --bench timing`

use criterion::{criterion_group, criterion_main, Criterion};

use ebox::{ChallengeType, ConfigBuilder, Ebox, RecoverySession, StaticSecretOracle, TemplateBuilder, TemplatePart};
use rand_core::OsRng;
use x25519_dalek::StaticSecret;

fn holder() -> (TemplatePart, StaticSecretOracle) {
    let secret = StaticSecret::random_from_rng(OsRng);
    let oracle = StaticSecretOracle::new(secret);
    (TemplatePart::new(oracle.pubkey().clone()), oracle)
}

fn bench_primary(c: &mut Criterion) {
    let key = [0x42u8; 32];
    let (primary_part, primary_oracle) = holder();
    let primary_tpl = TemplateBuilder::new()
        .add_config(ConfigBuilder::primary().add_part(primary_part).unwrap().finish().unwrap())
        .build();

    let mut group = c.benchmark_group("primary");

    group.bench_function("create", |b| {
        b.iter(|| Ebox::create(&primary_tpl, &key, None).unwrap());
    });

    group.bench_function("unlock", |b| {
        b.iter(|| {
            let mut sealed = Ebox::create(&primary_tpl, &key, None).unwrap();
            sealed.unseal_primary_part(0, &primary_oracle).unwrap();
            sealed.unlock(0).unwrap();
            sealed
        });
    });

    let sealed = Ebox::create(&primary_tpl, &key, None).unwrap();
    let bytes = sealed.to_bytes();
    group.bench_function("parse", |b| {
        b.iter(|| Ebox::from_bytes(&bytes).unwrap());
    });

    group.finish();
}

fn bench_recovery_2_of_3(c: &mut Criterion) {
    let key = [0x42u8; 32];
    let (p1, o1) = holder();
    let (p2, o2) = holder();
    let (p3, _o3) = holder();
    let recovery_tpl = TemplateBuilder::new()
        .add_config(
            ConfigBuilder::recovery()
                .add_part(p1)
                .unwrap()
                .add_part(p2)
                .unwrap()
                .add_part(p3)
                .unwrap()
                .set_threshold(2)
                .unwrap()
                .finish()
                .unwrap(),
        )
        .build();

    let mut group = c.benchmark_group("recovery_2of3");

    group.bench_function("create", |b| {
        b.iter(|| Ebox::create(&recovery_tpl, &key, None).unwrap());
    });

    group.bench_function("challenge_response_and_recover", |b| {
        b.iter(|| {
            let mut sealed = Ebox::create(&recovery_tpl, &key, None).unwrap();
            let mut session = RecoverySession::new(0);

            let outer1 = session
                .gen_challenge(&sealed, 0, ChallengeType::Recovery, "bench", "host", 1_700_000_000)
                .unwrap();
            let challenge1 = ebox::Challenge::from_bytes(&outer1.unseal(&o1).unwrap()).unwrap();
            let ephemeral1 = challenge1.ephemeral_pubkey(&o1).unwrap();
            let share1 = sealed.configs()[0].parts()[0].sealed_box().unseal(&o1).unwrap();
            let resp1 = ebox::SealedBox::seal(&ephemeral1, &share1).unwrap();
            session.challenge_response(&mut sealed, &resp1).unwrap();

            let outer2 = session
                .gen_challenge(&sealed, 1, ChallengeType::Recovery, "bench", "host", 1_700_000_000)
                .unwrap();
            let challenge2 = ebox::Challenge::from_bytes(&outer2.unseal(&o2).unwrap()).unwrap();
            let ephemeral2 = challenge2.ephemeral_pubkey(&o2).unwrap();
            let share2 = sealed.configs()[0].parts()[1].sealed_box().unseal(&o2).unwrap();
            let resp2 = ebox::SealedBox::seal(&ephemeral2, &share2).unwrap();
            session.challenge_response(&mut sealed, &resp2).unwrap();

            sealed.recover(0).unwrap();
            sealed
        });
    });

    group.finish();
}

criterion_group!(benches, bench_primary, bench_recovery_2_of_3);
criterion_main!(benches);
