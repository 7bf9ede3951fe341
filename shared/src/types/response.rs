//! JSON response envelopes
//!
//! Every response body is one of three shapes:
//! `{"data": ...}`, `{"result": "..."}` or `{"error": ...}`.

use serde::{Deserialize, Serialize};

/// Successful response carrying a payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

impl<T> DataEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Successful response carrying only a human readable outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub result: String,
}

impl ResultEnvelope {
    pub fn new(result: impl Into<String>) -> Self {
        Self {
            result: result.into(),
        }
    }
}

/// Error response. The message is always client safe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Body of the health check endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub environment: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_shapes() {
        let data = DataEnvelope::new(json!({"user": {"user_id": 1}}));
        assert_eq!(serde_json::to_value(&data).unwrap(), json!({"data": {"user": {"user_id": 1}}}));

        let result = ResultEnvelope::new("Logged out user successfully");
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"result": "Logged out user successfully"})
        );

        let error = ErrorEnvelope::new("invalid token");
        assert_eq!(serde_json::to_value(&error).unwrap(), json!({"error": "invalid token"}));
    }
}
