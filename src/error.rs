use thiserror::Error;

/// Failures reported by hand-off collaborators.
///
/// These never reach the chat user; [`crate::HandOff`] logs them and falls
/// back to another channel.
#[derive(Debug, Error)]
pub enum HandoffError {
    /// The lead record store rejected or could not take the record.
    #[error("lead store failed: {0}")]
    Store(String),

    /// The notification service did not accept the message.
    #[error("notification failed: {0}")]
    Notify(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
