use actor_router::HandlerError;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("empty message from `{0}`")]
    Empty(String),
    #[error("message too long ({len} > {max} characters)")]
    TooLong { len: usize, max: usize },
}

impl From<ChatError> for HandlerError {
    fn from(error: ChatError) -> Self {
        HandlerError::other(error)
    }
}
