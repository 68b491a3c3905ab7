use crate::pagination::cursor::CursorState;
use crate::pagination::traits::Source;
use std::collections::HashMap;

static UNFETCHED: CursorState = CursorState::Unfetched;

/// Known parent sources, in discovery order, each with its own child cursor.
#[derive(Debug, Clone)]
pub struct SourceRegistry<S> {
    sources: Vec<S>,
    cursors: HashMap<String, CursorState>,
}

impl<S> Default for SourceRegistry<S> {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            cursors: HashMap::new(),
        }
    }
}

impl<S: Source + Clone> SourceRegistry<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Sources in insertion order.
    pub fn list_sources(&self) -> &[S] {
        &self.sources
    }

    pub fn contains(&self, source_id: &str) -> bool {
        self.cursors.contains_key(source_id)
    }

    /// Appends sources whose identifier is not yet known and returns them.
    ///
    /// Duplicates inside `new_ones` are collapsed to their first occurrence.
    pub fn add_sources(&mut self, new_ones: impl IntoIterator<Item = S>) -> Vec<S> {
        let mut added = Vec::new();
        for source in new_ones {
            if self.cursors.contains_key(source.id()) {
                continue;
            }
            self.cursors
                .insert(source.id().to_string(), CursorState::Unfetched);
            added.push(source.clone());
            self.sources.push(source);
        }
        added
    }

    /// Cursor of a source's child collection; `Unfetched` for unknown ids.
    pub fn cursor_for(&self, source_id: &str) -> &CursorState {
        self.cursors.get(source_id).unwrap_or(&UNFETCHED)
    }

    /// Updates a known source's cursor.
    ///
    /// Unknown ids are ignored and an exhausted cursor is never reopened.
    pub fn set_cursor(&mut self, source_id: &str, state: CursorState) {
        let Some(current) = self.cursors.get_mut(source_id) else {
            tracing::debug!(source_id, "ignoring cursor update for unknown source");
            return;
        };
        if current.is_exhausted() && !state.is_exhausted() {
            tracing::warn!(source_id, "refusing to reopen exhausted cursor");
            return;
        }
        *current = state;
    }

    /// Sources whose child collection is not exhausted, with the token to
    /// resume from (`None` when the collection was never fetched).
    pub fn pending_sources(&self) -> Vec<(S, Option<String>)> {
        self.sources
            .iter()
            .filter_map(|s| match self.cursor_for(s.id()) {
                CursorState::Exhausted => None,
                cursor => Some((s.clone(), cursor.token().map(str::to_string))),
            })
            .collect()
    }

    /// True when at least one known source may still have child pages.
    pub fn any_live(&self) -> bool {
        self.cursors.values().any(|c| !c.is_exhausted())
    }
}
