//! Environment configuration.

use std::env;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "CW_API_KEY";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub api_key: Option<String>,
}

impl Settings {
    /// Read settings from the process environment, after loading `.env` if present.
    pub fn from_env() -> Self {
        load_dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read settings through `lookup`; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            api_key: lookup(API_KEY_ENV).filter(|key| !key.trim().is_empty()),
        }
    }
}

/// Load `.env` from the current directory (or parents). Missing file is fine.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}
