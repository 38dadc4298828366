//! Service settings loaded from `MOVIES_*` environment variables

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Settings for the HTTP service
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Socket address the server binds to
    pub bind_address: String,
    /// RSA public key used to verify bearer tokens, as PEM text or a path
    pub jwt_public_key: String,
    /// Expected `iss` claim, if any
    pub jwt_issuer: Option<String>,
    /// Expected `aud` claim, if any
    pub jwt_audience: Option<String>,
}

impl Settings {
    /// Load settings from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("bind_address", "0.0.0.0:3001")?
            .add_source(Environment::with_prefix("MOVIES"))
            .build()?
            .try_deserialize()
    }

    /// PEM text of the verification key, reading it from disk when the
    /// setting holds a path
    pub fn jwt_public_key_pem(&self) -> std::io::Result<String> {
        if self.jwt_public_key.starts_with("-----BEGIN") {
            return Ok(self.jwt_public_key.clone());
        }

        let pem = std::fs::read_to_string(&self.jwt_public_key).or_else(|_| {
            // Relative paths may be given from the crate root
            let mut path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
            path.push(&self.jwt_public_key);
            std::fs::read_to_string(path)
        })?;

        Ok(pem.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    const VARS: [&str; 4] = [
        "MOVIES_BIND_ADDRESS",
        "MOVIES_JWT_PUBLIC_KEY",
        "MOVIES_JWT_ISSUER",
        "MOVIES_JWT_AUDIENCE",
    ];

    fn clear_env() {
        for var in VARS {
            unsafe {
                env::remove_var(var);
            }
        }
    }

    #[test]
    #[serial]
    fn test_settings_defaults() {
        clear_env();
        unsafe {
            env::set_var("MOVIES_JWT_PUBLIC_KEY", "-----BEGIN PUBLIC KEY-----");
        }

        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.bind_address, "0.0.0.0:3001");
        assert_eq!(settings.jwt_issuer, None);
        assert_eq!(settings.jwt_audience, None);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_settings_from_env() {
        clear_env();
        unsafe {
            env::set_var("MOVIES_BIND_ADDRESS", "127.0.0.1:8080");
            env::set_var("MOVIES_JWT_PUBLIC_KEY", "-----BEGIN PUBLIC KEY-----");
            env::set_var("MOVIES_JWT_ISSUER", "https://id.example.com");
            env::set_var("MOVIES_JWT_AUDIENCE", "movies");
        }

        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.bind_address, "127.0.0.1:8080");
        assert_eq!(settings.jwt_issuer.as_deref(), Some("https://id.example.com"));
        assert_eq!(settings.jwt_audience.as_deref(), Some("movies"));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_missing_public_key_is_an_error() {
        clear_env();
        assert!(Settings::from_env().is_err());
    }

    #[test]
    fn test_inline_pem_is_returned_as_is() {
        let settings = Settings {
            bind_address: "0.0.0.0:3001".to_string(),
            jwt_public_key: "-----BEGIN PUBLIC KEY-----\nabc\n-----END PUBLIC KEY-----".to_string(),
            jwt_issuer: None,
            jwt_audience: None,
        };
        assert_eq!(settings.jwt_public_key_pem().unwrap(), settings.jwt_public_key);
    }

    #[test]
    fn test_missing_key_file_is_an_error() {
        let settings = Settings {
            bind_address: "0.0.0.0:3001".to_string(),
            jwt_public_key: "keys/does-not-exist.pem".to_string(),
            jwt_issuer: None,
            jwt_audience: None,
        };
        assert!(settings.jwt_public_key_pem().is_err());
    }
}
