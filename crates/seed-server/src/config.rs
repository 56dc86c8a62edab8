use std::net::SocketAddr;
use std::path::Path;

use seed_ledger::HandlerConfig;
use seed_sync::SubmissionConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Environment variable overriding [`ServerConfig::validator_url`].
pub const VALIDATOR_URL_ENV: &str = "VALIDATOR_URL";

/// Certification facade settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Reported in responses and used as the backend name.
    pub backend_type: String,
    pub validator_url: String,
    /// Hex private key signing transactions and batches. A throwaway key
    /// is generated when unset.
    pub signer_key: Option<String>,
    pub submission: SubmissionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 9000)),
            backend_type: "sawtooth".into(),
            validator_url: "http://localhost:8008".into(),
            signer_key: None,
            submission: SubmissionConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(source: &str) -> ServerResult<Self> {
        toml::from_str(source).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Apply overrides from the process environment.
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(VALIDATOR_URL_ENV).filter(|u| !u.is_empty()) {
            self.validator_url = url;
        }
        self
    }
}

/// Development validator settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub bind_addr: SocketAddr,
    pub handler: HandlerConfig,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8008)),
            handler: HandlerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seed_ledger::UnsignedPolicy;
    use std::io::Write;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "0.0.0.0:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(c.backend_type, "sawtooth");
        assert_eq!(c.validator_url, "http://localhost:8008");
        assert!(c.signer_key.is_none());
        assert_eq!(c.submission.poll_interval_ms, 2_000);
    }

    #[test]
    fn env_override_wins() {
        let c = ServerConfig::default().with_overrides(|key| {
            (key == VALIDATOR_URL_ENV).then(|| "http://validator:8008".to_string())
        });
        assert_eq!(c.validator_url, "http://validator:8008");

        let c = ServerConfig::default().with_overrides(|_| Some(String::new()));
        assert_eq!(c.validator_url, "http://localhost:8008");
    }

    #[test]
    fn loads_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            bind_addr = "127.0.0.1:9100"
            backend_type = "sawtooth-test"

            [submission]
            commit_timeout_ms = 5000
            "#
        )
        .unwrap();
        let c = ServerConfig::load(file.path()).unwrap();
        assert_eq!(c.bind_addr.port(), 9100);
        assert_eq!(c.backend_type, "sawtooth-test");
        assert_eq!(c.submission.commit_timeout_ms, 5_000);
        assert_eq!(c.submission.poll_interval_ms, 2_000);
    }

    #[test]
    fn bad_toml_is_config_error() {
        let err = ServerConfig::from_toml_str("bind_addr = 12").unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn validator_policy_from_toml() {
        let c: ValidatorConfig = toml::from_str(
            r#"
            [handler]
            unsigned_policy = "reject"
            "#,
        )
        .unwrap();
        assert_eq!(c.handler.unsigned_policy, UnsignedPolicy::Reject);
        assert_eq!(c.bind_addr.port(), 8008);
    }
}
