use crate::Result;
use crate::pagination::cursor::Page;
use async_trait::async_trait;

/// A record with a stable unique identifier.
pub trait Identified {
    fn id(&self) -> &str;
}

/// A parent entity whose own paginated child collection is aggregated.
pub trait Source: Identified {
    /// Key used to address the child collection upstream (e.g. the organization name).
    fn key(&self) -> &str;
}

/// Fetches pages of parent sources.
#[async_trait]
pub trait ParentFetcher<S>: Send + Sync {
    /// Fetch the parent page after `cursor` (`None` for the first page).
    async fn fetch_parents_page(&self, cursor: Option<&str>) -> Result<Page<S>>;
}

/// Fetches pages of one source's child collection.
#[async_trait]
pub trait ChildFetcher<S, T>: Send + Sync {
    async fn fetch_children_page(&self, source: &S, cursor: Option<&str>) -> Result<Page<T>>;
}

/// Which fetch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorScope {
    /// One source's child fetch failed; siblings were unaffected.
    Source,
    /// The parent fetch failed; the whole batch was abandoned.
    Parent,
}

impl FetchErrorScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Parent => "parent",
        }
    }
}

/// Receives fetch failures as they happen.
pub trait ErrorSink: Send + Sync {
    fn report_error(&self, scope: FetchErrorScope, detail: &str);
}

/// Default sink: forwards failures to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn report_error(&self, scope: FetchErrorScope, detail: &str) {
        match scope {
            FetchErrorScope::Source => {
                tracing::warn!(scope = scope.as_str(), detail, "source fetch failed")
            }
            FetchErrorScope::Parent => {
                tracing::error!(scope = scope.as_str(), detail, "parent fetch failed")
            }
        }
    }
}
