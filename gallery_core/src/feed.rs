//! Single-level organization feed with a local display window.
//!
//! The feed reveals already fetched rows `display_step` at a time and only
//! requests the next page once every filtered row is visible. Searching
//! narrows the local rows and suspends network pagination.

use crate::config::FeedConfig;
use crate::pagination::{CursorState, Identified, MergedList, ParentFetcher};
use crate::search::{Searchable, search_filter};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

pub const FEED_FAILURE_MESSAGE: &str = "Failed to load organizations. Please try again later.";

/// Result of one `load_more` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStep {
    /// More already fetched rows became visible.
    Revealed,
    /// A new page was fetched; carries how many new rows it added.
    Fetched(usize),
    /// Nothing left to reveal or fetch under the current search term.
    Idle,
}

pub struct OrgFeed<S> {
    fetcher: Arc<dyn ParentFetcher<S>>,
    config: FeedConfig,
    items: MergedList<S>,
    cursor: CursorState,
    display_count: usize,
    search_term: String,
    error: Option<String>,
    last_loaded_at: Option<DateTime<Utc>>,
}

impl<S> OrgFeed<S>
where
    S: Identified + Searchable + Clone + Send + Sync,
{
    pub fn new(fetcher: Arc<dyn ParentFetcher<S>>, config: FeedConfig) -> Self {
        let display_count = config.display_step;
        Self {
            fetcher,
            config,
            items: MergedList::new(),
            cursor: CursorState::Unfetched,
            display_count,
            search_term: String::new(),
            error: None,
            last_loaded_at: None,
        }
    }

    /// Replaces the feed with the first page.
    #[tracing::instrument(level = "info", skip(self))]
    pub async fn load_initial(&mut self) -> Result<()> {
        let page = self.fetch(None).await?;
        self.items = MergedList::from_items(page.items);
        self.cursor = CursorState::from_next(page.next_cursor);
        self.display_count = self.config.display_step;
        Ok(())
    }

    /// Re-fetches from the beginning; hosts call this every `refresh_interval`
    /// so that expiring media URLs are renewed.
    #[tracing::instrument(level = "info", skip(self))]
    pub async fn refresh(&mut self) -> Result<()> {
        tracing::debug!(rows = self.items.len(), "refreshing organization feed");
        self.load_initial().await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn load_more(&mut self) -> Result<FeedStep> {
        let filtered_len = self.filtered().len();
        if self.display_count < filtered_len {
            self.display_count += self.config.display_step;
            return Ok(FeedStep::Revealed);
        }
        if self.all_loaded() || self.is_searching() {
            return Ok(FeedStep::Idle);
        }

        let token = self.cursor.token().map(str::to_string);
        let page = self.fetch(token).await?;
        self.cursor = self.cursor.advance(page.next_cursor);
        let added = self.items.extend_batch(page.items);
        if added > 0 {
            self.display_count += self.config.display_step;
        }
        Ok(FeedStep::Fetched(added))
    }

    /// Changes the search term and collapses the display window.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.display_count = self.config.display_step;
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn is_searching(&self) -> bool {
        !self.search_term.trim().is_empty()
    }

    pub fn all_loaded(&self) -> bool {
        self.cursor.is_exhausted()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn filtered(&self) -> Vec<S> {
        search_filter(&self.search_term, self.items.items())
    }

    /// The rows currently on screen.
    pub fn visible(&self) -> Vec<S> {
        let mut rows = self.filtered();
        rows.truncate(self.display_count);
        rows
    }

    pub fn can_load_more(&self) -> bool {
        self.display_count < self.filtered().len() || (!self.all_loaded() && !self.is_searching())
    }

    pub fn display_count(&self) -> usize {
        self.display_count
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_loaded_at(&self) -> Option<DateTime<Utc>> {
        self.last_loaded_at
    }

    pub fn refresh_interval(&self) -> Duration {
        self.config.refresh_interval
    }

    async fn fetch(&mut self, cursor: Option<String>) -> Result<crate::pagination::Page<S>> {
        match self.fetcher.fetch_parents_page(cursor.as_deref()).await {
            Ok(page) => {
                self.error = None;
                self.last_loaded_at = Some(Utc::now());
                Ok(page)
            }
            Err(err) => {
                tracing::error!(error = %err, "error fetching organizations");
                self.error = Some(FEED_FAILURE_MESSAGE.to_string());
                Err(Error::FetchMessage(format!(
                    "organization feed fetch failed: {}",
                    err.summary()
                )))
            }
        }
    }
}
