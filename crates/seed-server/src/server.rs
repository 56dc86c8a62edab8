use std::sync::Arc;

use seed_crypto::Signer;
use seed_ledger::{InMemoryLedger, SeedTransactionHandler};
use seed_sync::{CertificationBackend, LedgerBackend, RestLedgerApi, SubmissionClient};
use tokio::net::TcpListener;

use crate::config::{ServerConfig, ValidatorConfig};
use crate::error::{ServerError, ServerResult};
use crate::handler::AppState;
use crate::router::{build_router, build_validator_router};

/// Certification facade in front of one ledger.
pub struct SeedServer {
    config: ServerConfig,
}

impl SeedServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    fn signer(&self) -> ServerResult<Signer> {
        match &self.config.signer_key {
            Some(key) => Ok(Signer::from_private_key_hex(key)?),
            None => {
                let signer = Signer::generate();
                tracing::warn!(
                    public_key = signer.public_key_hex(),
                    "no signer_key configured, using an ephemeral key"
                );
                Ok(signer)
            }
        }
    }

    /// Backend submitting to the configured validator.
    pub fn backend(&self) -> ServerResult<Arc<dyn CertificationBackend>> {
        let api = RestLedgerApi::new(&self.config.validator_url, &self.config.submission)?;
        let client = SubmissionClient::new(api, self.config.submission.clone());
        Ok(Arc::new(LedgerBackend::new(
            &self.config.backend_type,
            self.signer()?,
            client,
        )))
    }

    pub fn router(&self) -> ServerResult<axum::Router> {
        Ok(build_router(AppState::new(self.backend()?)))
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router()?;
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            validator = %self.config.validator_url,
            backend = %self.config.backend_type,
            "certification facade listening on {}",
            self.config.bind_addr
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

/// Development validator serving an in-memory ledger.
pub struct DevValidator {
    config: ValidatorConfig,
    ledger: Arc<InMemoryLedger>,
}

impl DevValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        let handler = SeedTransactionHandler::new(config.handler.clone());
        Self {
            ledger: Arc::new(InMemoryLedger::with_handler(handler)),
            config,
        }
    }

    pub fn ledger(&self) -> &Arc<InMemoryLedger> {
        &self.ledger
    }

    pub async fn serve(self) -> ServerResult<()> {
        let app = build_validator_router(self.ledger);
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            unsigned_policy = ?self.config.handler.unsigned_policy,
            "development validator listening on {}",
            self.config.bind_addr
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
