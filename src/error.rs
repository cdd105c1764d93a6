use thiserror::Error;

/// Errors raised while building a Twitter feed block.
#[derive(Error, Debug)]
pub enum FeedError {
    /// Exchanging the API key and secret for a bearer token failed.
    #[error("Twitter authentication failed{}: {message}", status_suffix(.status))]
    Auth {
        status: Option<u16>,
        message: String,
    },

    /// Retrieving the user timeline failed.
    #[error("Twitter timeline fetch failed{}: {message}", status_suffix(.status))]
    Fetch {
        status: Option<u16>,
        message: String,
    },

    /// Missing or invalid credentials, username, or config file.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FeedError {
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            status: None,
            message: message.into(),
        }
    }

    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            status: None,
            message: message.into(),
        }
    }

    /// HTTP status returned by the API, if the failure came from a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. } | Self::Fetch { status, .. } => *status,
            Self::Config(_) => None,
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

pub type FeedResult<T> = Result<T, FeedError>;
