use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("seed not found: {0}")]
    SeedNotFound(u64),

    #[error("seed {seed_id} has no {field}")]
    IncompleteSeed { seed_id: u64, field: &'static str },

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("repository error: {0}")]
    Repository(String),

    #[error("signer error: {0}")]
    Signer(#[from] seed_crypto::SignerError),

    #[error("certification failed: {0}")]
    Sync(#[from] seed_sync::SyncError),
}

pub type SdkResult<T> = Result<T, SdkError>;
