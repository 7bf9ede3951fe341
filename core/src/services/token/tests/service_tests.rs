//! Unit tests for token service

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};

use crate::domain::entities::TOKEN_HEADER;
use crate::errors::TokenError;
use crate::services::token::{token_fragment, token_from_fragment, TokenService, KEY_SIZE};

const TEST_KEY: &[u8; 32] = b"12345678901234567890123456789012";

fn service() -> TokenService {
    TokenService::new(TEST_KEY).unwrap()
}

#[test]
fn test_rejects_wrong_key_size() {
    for len in [0, 16, 31, 33, 64] {
        let key = vec![7u8; len];
        let err = TokenService::new(&key).unwrap_err();
        assert_eq!(
            err,
            TokenError::KeyConfiguration {
                expected: KEY_SIZE,
                actual: len
            }
        );
    }
}

#[test]
fn test_create_then_verify_round_trip() {
    let service = service();
    let (token, payload) = service.create(Duration::minutes(15), 42).unwrap();

    assert!(token.starts_with(TOKEN_HEADER));
    assert_eq!(payload.expires_at - payload.issued_at, Duration::minutes(15));

    let verified = service.verify(&token).unwrap();
    assert_eq!(verified, payload);
    assert_eq!(verified.user_id, 42);
}

#[test]
fn test_create_rejects_duration_out_of_range() {
    let service = service();
    assert_eq!(
        service.create(Duration::hours(3_000_000_000), 1).unwrap_err(),
        TokenError::DurationOutOfRange
    );
}

#[test]
fn test_tokens_for_same_user_differ() {
    let service = service();
    let (a, pa) = service.create(Duration::minutes(1), 1).unwrap();
    let (b, pb) = service.create(Duration::minutes(1), 1).unwrap();
    assert_ne!(a, b);
    assert_ne!(pa.id, pb.id);
}

#[test]
fn test_non_positive_duration_is_expired() {
    let service = service();
    for duration in [Duration::zero(), Duration::seconds(-1), Duration::hours(-24)] {
        let now = Utc::now();
        let (token, _) = service.create_at(duration, 1, now).unwrap();
        assert_eq!(
            service.verify_at(&token, now + Duration::milliseconds(1)),
            Err(TokenError::Expired)
        );
    }
}

#[test]
fn test_expiry_boundary() {
    let service = service();
    let now = Utc::now();
    let (token, payload) = service.create_at(Duration::minutes(5), 1, now).unwrap();

    assert!(service.verify_at(&token, payload.expires_at).is_ok());
    assert_eq!(
        service.verify_at(&token, payload.expires_at + Duration::milliseconds(1)),
        Err(TokenError::Expired)
    );
}

#[test]
fn test_single_bit_flip_is_invalid() {
    let service = service();
    let (token, _) = service.create(Duration::minutes(5), 9).unwrap();
    let blob = URL_SAFE_NO_PAD.decode(token_fragment(&token)).unwrap();

    for byte in 0..blob.len() {
        for bit in 0..8 {
            let mut tampered = blob.clone();
            tampered[byte] ^= 1 << bit;
            let forged = token_from_fragment(&URL_SAFE_NO_PAD.encode(&tampered));
            assert_eq!(service.verify(&forged), Err(TokenError::Invalid));
        }
    }
}

#[test]
fn test_garbage_is_invalid() {
    let service = service();
    for token in ["", "v1.local.", "v1.local.!!!", "v2.local.AAAA", "Bearer abc", "v1.local.AAAAAAAA"] {
        assert_eq!(service.verify(token), Err(TokenError::Invalid), "{token:?}");
    }
}

#[test]
fn test_other_key_cannot_verify() {
    let (token, _) = service().create(Duration::minutes(5), 1).unwrap();
    let other = TokenService::new(b"abcdefghijklmnopqrstuvwxyz012345").unwrap();
    assert_eq!(other.verify(&token), Err(TokenError::Invalid));
}

#[test]
fn test_fragment_round_trip() {
    let service = service();
    let (token, payload) = service.create(Duration::minutes(25), 5).unwrap();

    let fragment = token_fragment(&token);
    assert!(!fragment.starts_with(TOKEN_HEADER));
    assert_eq!(token_from_fragment(fragment), token);
    assert_eq!(service.verify(&token_from_fragment(fragment)).unwrap(), payload);
}

#[test]
fn test_concurrent_verification() {
    let service = std::sync::Arc::new(service());
    let (token, payload) = service.create(Duration::minutes(5), 77).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = service.clone();
            let token = token.clone();
            std::thread::spawn(move || service.verify(&token))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), payload);
    }
}
