use chrono::{Duration, Utc};

use crate::domain::entities::TokenPayload;
use crate::errors::TokenError;

#[test]
fn test_payload_window() {
    let now = Utc::now();
    let payload = TokenPayload::new(3, Duration::minutes(15), now).unwrap();

    assert_eq!(payload.expires_at - payload.issued_at, Duration::minutes(15));
    assert!(payload.is_valid_at(now));
    assert!(payload.is_valid_at(payload.expires_at));
    assert!(!payload.is_valid_at(payload.expires_at + Duration::milliseconds(1)));
}

#[test]
fn test_remaining_lifetime() {
    let now = Utc::now();
    let payload = TokenPayload::new(3, Duration::minutes(10), now).unwrap();

    assert_eq!(
        payload.remaining_at(now + Duration::minutes(4)),
        std::time::Duration::from_secs(6 * 60)
    );
    assert_eq!(
        payload.remaining_at(now + Duration::minutes(11)),
        std::time::Duration::ZERO
    );
}

#[test]
fn test_payload_ids_are_unique() {
    let now = Utc::now();
    let a = TokenPayload::new(1, Duration::minutes(1), now).unwrap();
    let b = TokenPayload::new(1, Duration::minutes(1), now).unwrap();
    assert_ne!(a.id, b.id);
}

#[test]
fn test_unrepresentable_expiry_is_rejected() {
    let now = Utc::now();
    assert_eq!(
        TokenPayload::new(1, Duration::days(365 * 300_000), now),
        Err(TokenError::DurationOutOfRange)
    );
}
