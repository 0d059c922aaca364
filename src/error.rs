use thiserror::Error;

/// All possible errors in the voyage risk system
#[derive(Debug, Error)]
pub enum VoyageRiskError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned status {status}")]
    UpstreamStatus { status: u16 },

    #[error("Upstream payload missing field: {0}")]
    MissingField(&'static str),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Session timed out after {0} ms")]
    SessionTimeout(u64),

    #[error("Feed closed the session before the observation window ended")]
    SessionClosed,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] ::config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VoyageRiskError>;

impl VoyageRiskError {
    pub fn upstream_status(status: reqwest::StatusCode) -> Self {
        Self::UpstreamStatus {
            status: status.as_u16(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Errors that only ever drop a single external sample
    pub fn is_sample_failure(&self) -> bool {
        matches!(
            self,
            Self::Http(_)
                | Self::UpstreamStatus { .. }
                | Self::MissingField(_)
                | Self::WebSocket(_)
                | Self::SessionTimeout(_)
                | Self::SessionClosed
                | Self::Serialization(_)
        )
    }
}
