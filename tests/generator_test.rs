use aes::cipher::KeyInit;
use aes::{Aes128, Aes192, Aes256};
use keymat::{KeyError, KeyMaterialGenerator, KeyRole, KeySpec, SizePolicy, parse_hex};
use proptest::prelude::*;

#[test]
fn aes_key_lengths() {
    let mut generator = KeyMaterialGenerator::new();
    for size in [16, 24, 32] {
        let material = generator.generate(KeySpec::aes(size)).unwrap();
        assert_eq!(material.len(), size);
        assert_eq!(material.render_binary().len(), size);
    }
}

#[test]
fn aes_keys_fit_their_cipher() {
    let mut generator = KeyMaterialGenerator::new();
    let k128 = generator.generate(KeySpec::aes(16)).unwrap();
    let k192 = generator.generate(KeySpec::aes(24)).unwrap();
    let k256 = generator.generate(KeySpec::aes(32)).unwrap();
    assert!(Aes128::new_from_slice(k128.render_binary()).is_ok());
    assert!(Aes192::new_from_slice(k192.render_binary()).is_ok());
    assert!(Aes256::new_from_slice(k256.render_binary()).is_ok());
}

#[test]
fn aes_size_20_is_rejected() {
    let mut generator = KeyMaterialGenerator::new();
    match generator.generate(KeySpec::aes(20)) {
        Err(KeyError::InvalidSize { role, size, .. }) => {
            assert_eq!(role, KeyRole::AesKey);
            assert_eq!(size, 20);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn iv_is_sixteen_bytes() {
    let mut generator = KeyMaterialGenerator::new();
    assert_eq!(generator.generate(KeySpec::iv()).unwrap().len(), 16);
    assert_eq!(
        generator.generate(KeySpec::new(KeyRole::Iv, 16)).unwrap().len(),
        16
    );
    for size in [0, 1, 12, 15, 17, 24, 32] {
        assert!(matches!(
            generator.generate(KeySpec::new(KeyRole::Iv, size)),
            Err(KeyError::InvalidSize { .. })
        ));
    }
}

#[test]
fn hmac_range() {
    let mut generator = KeyMaterialGenerator::new();
    for size in 15..=50 {
        assert_eq!(generator.generate(KeySpec::hmac(size)).unwrap().len(), size);
    }
    for size in [0, 10, 14, 51, 128] {
        assert!(matches!(
            generator.generate(KeySpec::hmac(size)),
            Err(KeyError::InvalidSize { .. })
        ));
    }
}

#[test]
fn configurable_hmac_range() {
    let policy = SizePolicy::new(64, 128).unwrap();
    let mut generator = KeyMaterialGenerator::with_policy(policy);
    assert_eq!(generator.generate(KeySpec::hmac(64)).unwrap().len(), 64);
    assert!(generator.generate(KeySpec::hmac(32)).is_err());
}

#[test]
fn consecutive_calls_differ() {
    let mut generator = KeyMaterialGenerator::new();
    let a = generator.generate(KeySpec::aes(32)).unwrap();
    let b = generator.generate(KeySpec::aes(32)).unwrap();
    assert_ne!(a.render_binary(), b.render_binary());

    let a = generator.generate(KeySpec::iv()).unwrap();
    let b = generator.generate(KeySpec::iv()).unwrap();
    assert_ne!(a.render_binary(), b.render_binary());
}

#[test]
fn bytes_cover_the_full_range() {
    // 4096 字节中每个取值都缺失的概率可以忽略
    let mut generator = KeyMaterialGenerator::new();
    let mut seen = [false; 256];
    for _ in 0..128 {
        let material = generator.generate(KeySpec::aes(32)).unwrap();
        for &byte in material.render_binary() {
            seen[byte as usize] = true;
        }
    }
    assert!(seen.iter().filter(|s| **s).count() > 240);
}

proptest! {
    #[test]
    fn hex_listing_decodes_back(size in 15usize..=50) {
        let mut generator = KeyMaterialGenerator::new();
        let material = generator.generate(KeySpec::hmac(size)).unwrap();
        let tokens = material.render_hex();

        prop_assert_eq!(tokens.len(), material.len());
        for token in &tokens {
            prop_assert_eq!(token.len(), 4);
            prop_assert!(token.starts_with("0x"));
            prop_assert!(token[2..].bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
        }
        prop_assert_eq!(parse_hex(&tokens).unwrap(), material.render_binary().to_vec());
    }

    #[test]
    fn invalid_aes_sizes_fail(size in 0usize..256) {
        prop_assume!(![16, 24, 32].contains(&size));
        let mut generator = KeyMaterialGenerator::new();
        let is_invalid_size = matches!(
            generator.generate(KeySpec::aes(size)),
            Err(KeyError::InvalidSize { .. })
        );
        prop_assert!(is_invalid_size);
    }
}
