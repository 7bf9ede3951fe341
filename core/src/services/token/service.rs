//! Main token service implementation

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};

use crate::domain::entities::{TokenPayload, TOKEN_HEADER};
use crate::errors::TokenError;

/// Required length of the symmetric key in bytes
pub const KEY_SIZE: usize = 32;

const NONCE_SIZE: usize = 12;
const TAG_SIZE: usize = 16;

/// Issues and verifies encrypted, authenticated session tokens
///
/// The service holds only the immutable cipher and is shared behind an `Arc`
/// by every request handler and worker without locking.
#[derive(Clone)]
pub struct TokenService {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").finish_non_exhaustive()
    }
}

impl TokenService {
    /// Creates a new token service
    ///
    /// # Arguments
    ///
    /// * `symmetric_key` - Process secret; must be exactly [`KEY_SIZE`] bytes
    ///
    /// # Returns
    ///
    /// `TokenError::KeyConfiguration` when the key has the wrong size
    pub fn new(symmetric_key: &[u8]) -> Result<Self, TokenError> {
        if symmetric_key.len() != KEY_SIZE {
            return Err(TokenError::KeyConfiguration {
                expected: KEY_SIZE,
                actual: symmetric_key.len(),
            });
        }

        let cipher = Aes256Gcm::new_from_slice(symmetric_key).map_err(|_| TokenError::KeyConfiguration {
            expected: KEY_SIZE,
            actual: symmetric_key.len(),
        })?;
        Ok(Self { cipher })
    }

    /// Issues a token for `user_id` valid for `duration` from now
    ///
    /// A zero or negative duration yields a token that is already expired.
    pub fn create(&self, duration: Duration, user_id: i64) -> Result<(String, TokenPayload), TokenError> {
        self.create_at(duration, user_id, Utc::now())
    }

    /// Same as [`TokenService::create`] with an explicit issue time
    pub fn create_at(
        &self,
        duration: Duration,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<(String, TokenPayload), TokenError> {
        let payload = TokenPayload::new(user_id, duration, now)?;
        let plaintext = serde_json::to_vec(&payload).map_err(|_| TokenError::Invalid)?;

        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: &plaintext,
                    aad: TOKEN_HEADER.as_bytes(),
                },
            )
            .map_err(|_| TokenError::Invalid)?;

        let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);

        Ok((format!("{}{}", TOKEN_HEADER, URL_SAFE_NO_PAD.encode(blob)), payload))
    }

    /// Decrypts and authenticates a token, then checks its expiry
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPayload)` - Authentic and not yet expired
    /// * `Err(TokenError::Invalid)` - Wrong header, bad encoding or failed authentication
    /// * `Err(TokenError::Expired)` - Authentic but `now > expires_at`
    pub fn verify(&self, token: &str) -> Result<TokenPayload, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Same as [`TokenService::verify`] against an explicit clock
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenPayload, TokenError> {
        let body = token.strip_prefix(TOKEN_HEADER).ok_or(TokenError::Invalid)?;
        let blob = URL_SAFE_NO_PAD.decode(body).map_err(|_| TokenError::Invalid)?;
        if blob.len() < NONCE_SIZE + TAG_SIZE {
            return Err(TokenError::Invalid);
        }

        let (nonce, ciphertext) = blob.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: TOKEN_HEADER.as_bytes(),
                },
            )
            .map_err(|_| TokenError::Invalid)?;

        let payload: TokenPayload = serde_json::from_slice(&plaintext).map_err(|_| TokenError::Invalid)?;
        if !payload.is_valid_at(now) {
            return Err(TokenError::Expired);
        }
        Ok(payload)
    }
}
