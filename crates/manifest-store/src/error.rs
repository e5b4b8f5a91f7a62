use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("manifest store access error: {0}")]
    Access(String),
    #[error("manifest store internal error: {0}")]
    Internal(String),
}
