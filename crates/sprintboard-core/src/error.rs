use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoardError {
    /// A local precondition failed; nothing was sent to the remote API.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The remote API answered with a non-2xx status.
    #[error("Remote rejected request ({status}): {message}")]
    RemoteRejection { status: u16, message: String },

    #[error("Unsupported field: {0}")]
    UnsupportedField(String),

    /// Some concurrent sub-operations of a bulk action failed.
    #[error("{failed} of {attempted} operations failed")]
    PartialBulkFailure { failed: usize, attempted: usize },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BoardError {
    /// Failures worth retrying: the request may succeed if sent again.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Connection(_) => true,
            Self::RemoteRejection { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Short stable name of the error kind, used for the user-facing error signal.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::RemoteRejection { .. } => "remote_rejection",
            Self::UnsupportedField(_) => "unsupported_field",
            Self::PartialBulkFailure { .. } => "partial_bulk_failure",
            Self::Connection(_) => "connection",
            Self::Cancelled => "cancelled",
            Self::NotFound(_) => "not_found",
            Self::Serialization(_) => "serialization",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<serde_json::Error> for BoardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
