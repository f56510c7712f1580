pub type FramestackResult<T> = Result<T, FramestackError>;

#[derive(thiserror::Error, Debug)]
pub enum FramestackError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("malformed size expression: {0}")]
    Size(String),

    #[error(transparent)]
    Execution(#[from] anyhow::Error),
}

impl FramestackError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn size(msg: impl Into<String>) -> Self {
        Self::Size(msg.into())
    }
}
