use serde::Deserialize;

/// what the hash api answers with, `Code == "1"` is the only success
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthResponse {
    #[serde(rename = "Hash", alias = "hash")]
    pub hash: String,
    /// minutes the hash stays valid for
    #[serde(rename = "Valid", alias = "valid")]
    pub valid_minutes: i64,
    #[serde(rename = "Code", alias = "code")]
    pub status_code: String,
    #[serde(rename = "Error", alias = "error")]
    pub error: String,
}

impl AuthResponse {
    pub const SUCCESS_CODE: &'static str = "1";

    pub fn is_success(&self) -> bool {
        self.status_code == Self::SUCCESS_CODE
    }
}
