pub type ConformResult<T> = Result<T, ConformError>;

#[derive(thiserror::Error, Debug)]
pub enum ConformError {
    /// Every edit in the list failed to match a source file.
    #[error("no linkable events found")]
    NoLinkableEvents,

    /// The source catalog is empty before matching even starts.
    #[error("no usable source files found")]
    NoUsableSources,

    #[error("edit list error: {0}")]
    EdlParse(String),

    #[error("metadata error: {0}")]
    Metadata(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ConformError {
    pub fn edl_parse(msg: impl Into<String>) -> Self {
        Self::EdlParse(msg.into())
    }

    pub fn metadata(msg: impl Into<String>) -> Self {
        Self::Metadata(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
