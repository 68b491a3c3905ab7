use serde::{Deserialize, Serialize};

/// Continuation state of one paginated collection.
///
/// `Unfetched` and `Exhausted` are distinct: the former has never been
/// requested, the latter must never be requested again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CursorState {
    #[default]
    Unfetched,
    Active(String),
    Exhausted,
}

impl CursorState {
    /// Maps an upstream continuation token onto a cursor state.
    ///
    /// Missing and blank tokens both mean the collection is exhausted.
    pub fn from_next(next: Option<String>) -> Self {
        match next {
            Some(token) if !token.trim().is_empty() => Self::Active(token),
            _ => Self::Exhausted,
        }
    }

    /// Applies the result of a fetch. An exhausted cursor stays exhausted.
    pub fn advance(&self, next: Option<String>) -> Self {
        match self {
            Self::Exhausted => Self::Exhausted,
            _ => Self::from_next(next),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// Token to pass to the next fetch; `None` for an unfetched collection.
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Active(token) => Some(token.as_str()),
            _ => None,
        }
    }
}

/// One page returned by an upstream paginated endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Continuation token; `None` when there are no further pages.
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_cursor: Option<String>) -> Self {
        Self { items, next_cursor }
    }

    /// A final page with no continuation.
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_cursor: None,
        }
    }

    pub fn empty() -> Self {
        Self::last(Vec::new())
    }
}
