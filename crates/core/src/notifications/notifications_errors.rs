use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Mail relay request failed: {0}")]
    RelayFailed(String),
    #[error("Mail relay returned status {0}")]
    RelayRejected(u16),
}

impl From<reqwest::Error> for NotificationError {
    fn from(err: reqwest::Error) -> Self {
        NotificationError::RelayFailed(err.to_string())
    }
}
