use chrono::Utc;
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker carried by every identifier minted on the client.
pub const LOCAL_ID_PREFIX: &str = "local-";

const LOCAL_SUFFIX_LEN: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(value: String) -> Result<Self, String> {
        Self::validate(&value)?;
        Ok(Self(value))
    }

    /// `local-<unix millis>-<random suffix>`; never collides with server ids.
    pub fn generate_local() -> Self {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(LOCAL_SUFFIX_LEN)
            .map(|c| char::from(c).to_ascii_lowercase())
            .collect();
        Self(format!(
            "{LOCAL_ID_PREFIX}{}-{suffix}",
            Utc::now().timestamp_millis()
        ))
    }

    pub fn is_local_origin(&self) -> bool {
        is_local_origin(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            return Err("Record ID cannot be empty".to_string());
        }
        Ok(())
    }
}

pub fn is_local_origin(value: &str) -> bool {
    value.starts_with(LOCAL_ID_PREFIX)
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RecordId> for String {
    fn from(value: RecordId) -> Self {
        value.0
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
