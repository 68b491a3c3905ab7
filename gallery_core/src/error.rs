use std::error::Error as StdError;

/// Failures surfaced by fetchers, the paginator and the event page.
///
/// `Fetch` keeps the transport error (HTTP status, decode failure) as its
/// source; `FetchMessage` is for failures that only have a message.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("fetch failed: {operation}")]
    Fetch {
        operation: String,
        #[source]
        source: Box<dyn StdError + Send + Sync + 'static>,
    },

    #[error("fetch failed: {0}")]
    FetchMessage(String),
}

impl Error {
    /// Wraps a transport failure of `operation` (e.g. "fetch events of acme").
    pub fn fetch(
        operation: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Fetch {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// One line for error sinks: the operation followed by its cause.
    pub fn summary(&self) -> String {
        match self {
            Self::Fetch { operation, source } => format!("{operation}: {source}"),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
