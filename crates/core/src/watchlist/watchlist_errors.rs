use thiserror::Error;

/// Errors raised while talking to the provider or the scheduler task.
#[derive(Error, Debug)]
pub enum WatchlistError {
    #[error("Provider request failed: {0}")]
    Request(String),

    #[error("Provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode provider response: {0}")]
    Decode(String),

    #[error("Provider is not configured: {0}")]
    NotConfigured(String),

    #[error("Watch-list scheduler is not running")]
    SchedulerStopped,
}
