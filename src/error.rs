use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConteoError {
    #[error("Unauthorized: session token missing or expired")]
    Unauthorized,

    #[error("Server responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Worker, group and warehouse must all be selected")]
    IncompleteSelection,

    #[error("Locations are still loading for the current selection")]
    NotResolved,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConteoError {
    /// True for failures that came back from the server rather than the client.
    pub fn is_server_error(&self) -> bool {
        matches!(self, ConteoError::Status { status, .. } if *status >= 500)
    }
}

pub type Result<T> = std::result::Result<T, ConteoError>;
