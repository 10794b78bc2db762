//! Runtime configuration from environment variables.

use crate::logic::NewAdmin;

/// Minimum length of `SESSION_KEY` (cookie signing and encryption key).
pub const SESSION_KEY_MIN_LEN: usize = 64;

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// None: the binary generates a random key (sessions do not survive a restart).
    pub session_key: Option<Vec<u8>>,
    /// Send the session cookie over HTTPS only.
    pub secure_cookies: bool,
    /// Master admin created at startup when both username and password are set.
    pub master_admin: Option<NewAdmin>,
}

impl Config {
    /// Read HOST, PORT, SESSION_KEY, COOKIE_SECURE, ADMIN_USERNAME, ADMIN_PASSWORD, ADMIN_NAME, ADMIN_EMAIL.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment in production, a map in tests).
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(get: F) -> Self {
        let host = get("HOST").unwrap_or_else(default_host);
        let port = get("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or_else(default_port);

        let session_key = get("SESSION_KEY").and_then(|k| {
            if k.len() >= SESSION_KEY_MIN_LEN {
                Some(k.into_bytes())
            } else {
                log::warn!("SESSION_KEY shorter than {SESSION_KEY_MIN_LEN} bytes, ignoring it");
                None
            }
        });

        let secure_cookies = get("COOKIE_SECURE")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let master_admin = match (get("ADMIN_USERNAME"), get("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) if !username.trim().is_empty() && !password.is_empty() => {
                Some(NewAdmin {
                    full_name: get("ADMIN_NAME").unwrap_or_else(|| username.clone()),
                    email: get("ADMIN_EMAIL").unwrap_or_default(),
                    username,
                    password,
                })
            }
            _ => None,
        };

        Self {
            host,
            port,
            session_key,
            secure_cookies,
            master_admin,
        }
    }
}
