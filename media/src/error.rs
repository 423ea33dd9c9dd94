use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MediaError {
    #[error("invalid embedded image payload")]
    InvalidPayload,

    #[error("invalid content key: {0}")]
    InvalidKey(String),

    #[error("image not found: {0}")]
    NotFound(String),

    #[error("image {0} has no usable embedded payload")]
    Unrecoverable(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Lookup(crate::utils::result::Error),
}

impl MediaError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, MediaError::NotFound(_) | MediaError::Unrecoverable(_))
    }
}
