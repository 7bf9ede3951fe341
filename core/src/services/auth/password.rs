//! Password hashing with bcrypt

use kk_shared::validation::MAX_PASSWORD_BYTES;

use crate::errors::DomainError;

#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    fn check_length(password: &str) -> Result<(), DomainError> {
        if password.is_empty() {
            return Err(DomainError::validation("password must be provided"));
        }
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(DomainError::validation(format!(
                "password must not be more than {} bytes long",
                MAX_PASSWORD_BYTES
            )));
        }
        Ok(())
    }

    pub fn hash(&self, password: &str) -> Result<String, DomainError> {
        Self::check_length(password)?;
        bcrypt::hash(password, self.cost)
            .map_err(|e| DomainError::internal(format!("failed to hash password: {}", e)))
    }

    /// `Ok(false)` on mismatch; an error only for a malformed stored hash
    pub fn verify(&self, password: &str, hashed: &str) -> Result<bool, DomainError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Ok(false);
        }
        bcrypt::verify(password, hashed)
            .map_err(|e| DomainError::internal(format!("failed to verify password: {}", e)))
    }

    /// [`PasswordHasher::hash`] on the blocking pool
    pub async fn hash_blocking(&self, password: &str) -> Result<String, DomainError> {
        let hasher = *self;
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| DomainError::internal(format!("password hashing task failed: {}", e)))?
    }

    /// [`PasswordHasher::verify`] on the blocking pool
    pub async fn verify_blocking(&self, password: &str, hashed: &str) -> Result<bool, DomainError> {
        let hasher = *self;
        let password = password.to_string();
        let hashed = hashed.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hashed))
            .await
            .map_err(|e| DomainError::internal(format!("password verification task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(bcrypt::DEFAULT_COST.min(4))
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hasher().hash("correct horse battery").unwrap();
        assert_ne!(hash, "correct horse battery");
        assert!(hasher().verify("correct horse battery", &hash).unwrap());
        assert!(!hasher().verify("wrong horse battery", &hash).unwrap());
    }

    #[test]
    fn test_rejects_overlong_password() {
        let long = "a".repeat(MAX_PASSWORD_BYTES + 1);
        assert!(matches!(hasher().hash(&long), Err(DomainError::Validation { .. })));
        assert!(hasher().hash(&"a".repeat(MAX_PASSWORD_BYTES)).is_ok());
    }

    #[test]
    fn test_malformed_hash_is_error() {
        assert!(hasher().verify("password", "not-a-hash").is_err());
    }

    #[tokio::test]
    async fn test_blocking_variants() {
        let hash = hasher().hash_blocking("password123").await.unwrap();
        assert!(hasher().verify_blocking("password123", &hash).await.unwrap());
    }
}
