use thiserror::Error;

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("invalid archive location: {0}")]
    InvalidLocation(String),
    #[error("archive access error: {0}")]
    Access(String),
}
