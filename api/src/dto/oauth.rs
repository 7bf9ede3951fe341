use serde::{Deserialize, Serialize};

/// Query Google appends to the redirect URL
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoogleCallbackQuery {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub code: String,
}
