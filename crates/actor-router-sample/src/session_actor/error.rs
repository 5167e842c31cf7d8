use actor_router::HandlerError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("user `{0}` is already logged in")]
    AlreadyLoggedIn(String),
    #[error("user `{0}` is not logged in")]
    NotLoggedIn(String),
}

impl From<SessionError> for HandlerError {
    fn from(error: SessionError) -> Self {
        HandlerError::other(error)
    }
}
