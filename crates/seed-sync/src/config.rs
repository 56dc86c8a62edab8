use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing of batch submission and commit polling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    pub poll_interval_ms: u64,
    pub commit_timeout_ms: u64,
    pub status_request_timeout_ms: u64,
    pub submit_timeout_ms: u64,
}

impl SubmissionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn commit_timeout(&self) -> Duration {
        Duration::from_millis(self.commit_timeout_ms)
    }

    pub fn status_request_timeout(&self) -> Duration {
        Duration::from_millis(self.status_request_timeout_ms)
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_millis(self.submit_timeout_ms)
    }
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2_000,
            commit_timeout_ms: 60_000,
            status_request_timeout_ms: 5_000,
            submit_timeout_ms: 30_000,
        }
    }
}

/// A named certification facade.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendEndpoint {
    pub name: String,
    pub url: String,
}

/// Ordered backends for [`MultiBackendCertifier`](crate::MultiBackendCertifier).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertifierConfig {
    pub backends: Vec<BackendEndpoint>,
    pub primary: String,
    /// Per-request timeout; must exceed the facade's commit timeout.
    pub request_timeout_ms: u64,
}

impl CertifierConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for CertifierConfig {
    fn default() -> Self {
        Self {
            backends: vec![
                BackendEndpoint {
                    name: "sawtooth".into(),
                    url: "http://localhost:9000".into(),
                },
                BackendEndpoint {
                    name: "fabric".into(),
                    url: "http://localhost:9001".into(),
                },
            ],
            primary: "sawtooth".into(),
            request_timeout_ms: 70_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_submission_timing() {
        let c = SubmissionConfig::default();
        assert_eq!(c.poll_interval(), Duration::from_secs(2));
        assert_eq!(c.commit_timeout(), Duration::from_secs(60));
        assert_eq!(c.status_request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c: SubmissionConfig = toml::from_str("poll_interval_ms = 250").unwrap();
        assert_eq!(c.poll_interval_ms, 250);
        assert_eq!(c.commit_timeout_ms, 60_000);
    }

    #[test]
    fn certifier_config_from_toml() {
        let c: CertifierConfig = toml::from_str(
            r#"
            primary = "a"

            [[backends]]
            name = "a"
            url = "http://a"
            "#,
        )
        .unwrap();
        assert_eq!(c.backends.len(), 1);
        assert_eq!(c.request_timeout(), Duration::from_secs(70));
    }
}
