use crate::pagination::cursor::CursorState;
use crate::pagination::registry::SourceRegistry;
use crate::pagination::traits::Source;
use serde::{Deserialize, Serialize};

/// Lifecycle of a fan-out paginator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    Idle,
    LoadingInitial,
    LoadingMore,
    Ready,
    Exhausted,
    Failed,
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::LoadingInitial | Self::LoadingMore)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::LoadingInitial => "loading_initial",
            Self::LoadingMore => "loading_more",
            Self::Ready => "ready",
            Self::Exhausted => "exhausted",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// More data exists when the parent cursor or any child cursor is not exhausted.
pub fn aggregate_has_more<S: Source + Clone>(
    parent: &CursorState,
    registry: &SourceRegistry<S>,
) -> bool {
    !parent.is_exhausted() || registry.any_live()
}
