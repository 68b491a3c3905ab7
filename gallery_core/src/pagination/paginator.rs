use crate::config::PaginatorConfig;
use crate::pagination::cursor::{CursorState, Page};
use crate::pagination::merge::MergedList;
use crate::pagination::progress::{LoadState, aggregate_has_more};
use crate::pagination::registry::SourceRegistry;
use crate::pagination::traits::{
    ChildFetcher, ErrorSink, FetchErrorScope, Identified, ParentFetcher, Source, TracingErrorSink,
};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Summary of one completed batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Child fetches issued in the batch.
    pub requested_sources: usize,
    /// Child fetches that failed and were isolated.
    pub failed_sources: usize,
    /// Parents seen for the first time in the batch.
    pub discovered_sources: usize,
    /// Items appended to the merged list.
    pub new_items: usize,
    pub has_more: bool,
    pub finished_at: DateTime<Utc>,
}

impl Default for BatchReport {
    fn default() -> Self {
        Self {
            requested_sources: 0,
            failed_sources: 0,
            discovered_sources: 0,
            new_items: 0,
            has_more: false,
            finished_at: Utc::now(),
        }
    }
}

/// What a `load_initial` / `load_more` call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(BatchReport),
    /// Another batch was in flight; nothing was fetched.
    Rejected,
    /// Every cursor is exhausted; nothing was fetched.
    NoMore,
    /// The paginator is not in a state that accepts this request.
    Skipped(LoadState),
    /// The parent fetch failed; carries the user-facing message.
    Failed(String),
}

struct Inner<S, T> {
    state: LoadState,
    registry: SourceRegistry<S>,
    parent_cursor: CursorState,
    items: MergedList<T>,
    last_error: Option<String>,
}

impl<S, T> Default for Inner<S, T> {
    fn default() -> Self {
        Self {
            state: LoadState::Idle,
            registry: SourceRegistry::default(),
            parent_cursor: CursorState::Unfetched,
            items: MergedList::default(),
            last_error: None,
        }
    }
}

/// Aggregates the child collections of a paginated parent collection into one
/// deduplicated list.
///
/// Each step fans out one child fetch per source, waits for all of them, then
/// applies a single merge. Requests arriving while a step is in flight are
/// rejected, so cursors are only ever written by one batch at a time.
pub struct FanOutPaginator<S, T> {
    parents: Arc<dyn ParentFetcher<S>>,
    children: Arc<dyn ChildFetcher<S, T>>,
    errors: Arc<dyn ErrorSink>,
    config: PaginatorConfig,
    inner: RwLock<Inner<S, T>>,
}

impl<S, T> FanOutPaginator<S, T>
where
    S: Source + Clone + Send + Sync + 'static,
    T: Identified + Clone + Send + Sync + 'static,
{
    pub fn new(
        parents: Arc<dyn ParentFetcher<S>>,
        children: Arc<dyn ChildFetcher<S, T>>,
    ) -> Self {
        Self {
            parents,
            children,
            errors: Arc::new(TracingErrorSink),
            config: PaginatorConfig::default(),
            inner: RwLock::new(Inner::default()),
        }
    }

    pub fn with_error_sink(mut self, errors: Arc<dyn ErrorSink>) -> Self {
        self.errors = errors;
        self
    }

    pub fn with_config(mut self, config: PaginatorConfig) -> Self {
        self.config = config;
        self
    }

    pub async fn state(&self) -> LoadState {
        self.inner.read().await.state
    }

    /// Snapshot of the merged items in first-seen order.
    pub async fn items(&self) -> Vec<T> {
        self.inner.read().await.items.items().to_vec()
    }

    pub async fn sources(&self) -> Vec<S> {
        self.inner.read().await.registry.list_sources().to_vec()
    }

    pub async fn has_more(&self) -> bool {
        let inner = self.inner.read().await;
        aggregate_has_more(&inner.parent_cursor, &inner.registry)
    }

    pub async fn parent_cursor(&self) -> CursorState {
        self.inner.read().await.parent_cursor.clone()
    }

    pub async fn child_cursor(&self, source_id: &str) -> CursorState {
        self.inner.read().await.registry.cursor_for(source_id).clone()
    }

    /// User-facing message of the last total failure.
    pub async fn last_error(&self) -> Option<String> {
        self.inner.read().await.last_error.clone()
    }

    /// Discards everything and loads the first parent page plus each parent's
    /// first child page.
    #[tracing::instrument(level = "info", skip(self))]
    pub async fn load_initial(&self) -> LoadOutcome {
        {
            let mut inner = self.inner.write().await;
            if inner.state.is_loading() {
                tracing::debug!(state = %inner.state, "load_initial rejected: batch in flight");
                return LoadOutcome::Rejected;
            }
            *inner = Inner::default();
            inner.state = LoadState::LoadingInitial;
        }

        let page = match self.parents.fetch_parents_page(None).await {
            Ok(page) => page,
            Err(err) => return self.fail(err).await,
        };

        let mut report = BatchReport::default();
        let discovered = self.accept_parents(page, &mut report).await;
        self.load_first_children(discovered, &mut report).await;
        self.finish(report, true).await
    }

    /// Continues pagination.
    ///
    /// Sources that still have child pages are drained first; the next parent
    /// page is only requested once none of them remains active.
    #[tracing::instrument(level = "info", skip(self))]
    pub async fn load_more(&self) -> LoadOutcome {
        let (pending, parent_token) = {
            let mut inner = self.inner.write().await;
            match inner.state {
                LoadState::Ready => {}
                LoadState::LoadingInitial | LoadState::LoadingMore => {
                    tracing::debug!(state = %inner.state, "load_more rejected: batch in flight");
                    return LoadOutcome::Rejected;
                }
                LoadState::Exhausted => return LoadOutcome::NoMore,
                state => return LoadOutcome::Skipped(state),
            }
            if !aggregate_has_more(&inner.parent_cursor, &inner.registry) {
                inner.state = LoadState::Exhausted;
                return LoadOutcome::NoMore;
            }
            inner.state = LoadState::LoadingMore;
            (
                inner.registry.pending_sources(),
                inner.parent_cursor.token().map(str::to_string),
            )
        };

        let mut report = BatchReport::default();
        let mut continued = false;
        if !pending.is_empty() {
            let results = self.fetch_children(pending).await;
            continued = self.apply_children(results, &mut report).await;
        }

        if !continued {
            if let Some(token) = parent_token {
                let page = match self.parents.fetch_parents_page(Some(&token)).await {
                    Ok(page) => page,
                    Err(err) => return self.fail(err).await,
                };
                let discovered = self.accept_parents(page, &mut report).await;
                self.load_first_children(discovered, &mut report).await;
            }
        }

        self.finish(report, false).await
    }

    async fn accept_parents(&self, page: Page<S>, report: &mut BatchReport) -> Vec<S> {
        let mut inner = self.inner.write().await;
        inner.parent_cursor = inner.parent_cursor.advance(page.next_cursor);
        let discovered = inner.registry.add_sources(page.items);
        report.discovered_sources += discovered.len();
        tracing::debug!(
            discovered = discovered.len(),
            parent_exhausted = inner.parent_cursor.is_exhausted(),
            "accepted parent page"
        );
        discovered
    }

    async fn load_first_children(&self, sources: Vec<S>, report: &mut BatchReport) {
        if sources.is_empty() {
            return;
        }
        let jobs = sources.into_iter().map(|s| (s, None)).collect();
        let results = self.fetch_children(jobs).await;
        self.apply_children(results, report).await;
    }

    /// Issues the child fetches concurrently and waits for all of them.
    ///
    /// Results come back in job order regardless of completion order.
    async fn fetch_children(&self, jobs: Vec<(S, Option<String>)>) -> Vec<(S, Result<Page<T>>)> {
        let limit = self.config.max_concurrent_fetches.max(1);
        stream::iter(jobs.into_iter().map(|(source, cursor)| {
            let children = Arc::clone(&self.children);
            async move {
                let outcome = children
                    .fetch_children_page(&source, cursor.as_deref())
                    .await;
                (source, outcome)
            }
        }))
        .buffered(limit)
        .collect()
        .await
    }

    /// Merges one batch and updates cursors; returns whether any fetched source
    /// still has an active cursor.
    async fn apply_children(
        &self,
        results: Vec<(S, Result<Page<T>>)>,
        report: &mut BatchReport,
    ) -> bool {
        let mut batches = Vec::with_capacity(results.len());
        let mut cursors = Vec::with_capacity(results.len());
        for (source, outcome) in results {
            report.requested_sources += 1;
            match outcome {
                Ok(page) => {
                    cursors.push((
                        source.id().to_string(),
                        CursorState::from_next(page.next_cursor),
                    ));
                    batches.push(page.items);
                }
                Err(err) => {
                    report.failed_sources += 1;
                    tracing::warn!(
                        source_id = source.id(),
                        source_key = source.key(),
                        error = %err,
                        "child fetch failed; marking source exhausted"
                    );
                    self.errors.report_error(
                        FetchErrorScope::Source,
                        &format!("{}: {}", source.key(), err.summary()),
                    );
                    cursors.push((source.id().to_string(), CursorState::Exhausted));
                }
            }
        }

        let mut inner = self.inner.write().await;
        report.new_items += inner.items.extend_batches(batches);
        let mut continued = false;
        for (source_id, cursor) in cursors {
            inner.registry.set_cursor(&source_id, cursor);
            continued |= inner.registry.cursor_for(&source_id).is_active();
        }
        continued
    }

    async fn finish(&self, mut report: BatchReport, initial: bool) -> LoadOutcome {
        let mut inner = self.inner.write().await;
        let has_more = aggregate_has_more(&inner.parent_cursor, &inner.registry);
        inner.state = if has_more || (initial && !inner.items.is_empty()) {
            LoadState::Ready
        } else {
            LoadState::Exhausted
        };
        report.has_more = has_more;
        report.finished_at = Utc::now();
        tracing::info!(
            state = %inner.state,
            items = inner.items.len(),
            sources = inner.registry.len(),
            new_items = report.new_items,
            failed_sources = report.failed_sources,
            has_more,
            "batch applied"
        );
        LoadOutcome::Loaded(report)
    }

    async fn fail(&self, err: Error) -> LoadOutcome {
        tracing::error!(error = %err, "parent fetch failed; paginator halted");
        self.errors
            .report_error(FetchErrorScope::Parent, &err.summary());
        let message = self.config.failure_message.clone();
        let mut inner = self.inner.write().await;
        inner.state = LoadState::Failed;
        inner.last_error = Some(message.clone());
        LoadOutcome::Failed(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Event, Organization};
    use crate::pagination::test_support::{RecordingSink, ScriptedFetcher, ev, org};

    fn paginator(fetcher: &Arc<ScriptedFetcher>) -> FanOutPaginator<Organization, Event> {
        FanOutPaginator::new(fetcher.clone(), fetcher.clone())
    }

    fn item_ids(items: &[Event]) -> Vec<String> {
        items.iter().map(|e| e.id.clone()).collect()
    }

    #[tokio::test]
    async fn initial_load_then_next_parent_page_until_exhausted() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.parents(None, Page::new(vec![org("org1")], Some("p2".into())));
        fetcher.children("org1", None, Page::last(vec![ev("e1"), ev("e2")]));
        fetcher.parents(Some("p2"), Page::empty());
        let p = paginator(&fetcher);

        assert!(matches!(p.load_initial().await, LoadOutcome::Loaded(_)));
        assert_eq!(item_ids(&p.items().await), vec!["e1", "e2"]);
        assert_eq!(p.state().await, LoadState::Ready);
        assert!(p.has_more().await);

        assert!(matches!(p.load_more().await, LoadOutcome::Loaded(_)));
        assert_eq!(p.state().await, LoadState::Exhausted);
        assert!(!p.has_more().await);
        assert_eq!(
            fetcher.calls(),
            vec!["parents:-", "children:org1:-", "parents:p2"]
        );

        assert_eq!(p.load_more().await, LoadOutcome::NoMore);
        assert_eq!(fetcher.calls().len(), 3);
    }

    #[tokio::test]
    async fn drains_child_cursors_before_discovering_parents() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.parents(None, Page::new(vec![org("org1")], Some("p2".into())));
        fetcher.children("org1", None, Page::new(vec![ev("e1")], Some("c2".into())));
        fetcher.children("org1", Some("c2"), Page::new(vec![ev("e2")], Some("c3".into())));
        fetcher.children("org1", Some("c3"), Page::last(vec![ev("e3")]));
        fetcher.parents(Some("p2"), Page::last(vec![org("org2")]));
        fetcher.children("org2", None, Page::last(vec![ev("e4")]));
        let p = paginator(&fetcher);

        p.load_initial().await;
        p.load_more().await;
        assert_eq!(
            fetcher.calls(),
            vec!["parents:-", "children:org1:-", "children:org1:c2"]
        );

        let LoadOutcome::Loaded(report) = p.load_more().await else {
            panic!("expected a loaded batch");
        };
        assert_eq!(report.discovered_sources, 1);
        assert_eq!(report.new_items, 2);
        assert!(!report.has_more);
        assert_eq!(
            &fetcher.calls()[3..],
            &["children:org1:c3", "parents:p2", "children:org2:-"]
        );
        assert_eq!(item_ids(&p.items().await), vec!["e1", "e2", "e3", "e4"]);
        assert_eq!(p.state().await, LoadState::Exhausted);
    }

    #[tokio::test]
    async fn child_failure_is_isolated_and_exhausts_that_source() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.parents(None, Page::last(vec![org("bad"), org("good")]));
        fetcher.children_fail("bad", None, "boom");
        fetcher.children("good", None, Page::new(vec![ev("e1")], Some("g2".into())));
        fetcher.children("good", Some("g2"), Page::last(vec![ev("e2")]));
        let sink = Arc::new(RecordingSink::default());
        let p = paginator(&fetcher).with_error_sink(sink.clone());

        let LoadOutcome::Loaded(report) = p.load_initial().await else {
            panic!("expected a loaded batch");
        };
        assert_eq!(report.failed_sources, 1);
        assert_eq!(report.requested_sources, 2);
        assert_eq!(item_ids(&p.items().await), vec!["e1"]);
        assert_eq!(p.child_cursor("bad").await, CursorState::Exhausted);
        assert_eq!(p.state().await, LoadState::Ready);
        assert!(p.last_error().await.is_none());

        let reports = sink.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].0, FetchErrorScope::Source);
        assert!(reports[0].1.contains("bad-name"));

        p.load_more().await;
        assert!(
            !fetcher.calls()[3..].iter().any(|c| c.starts_with("children:bad")),
            "an exhausted source must never be fetched again"
        );
        assert_eq!(p.state().await, LoadState::Exhausted);
    }

    #[tokio::test]
    async fn parent_failure_freezes_until_reloaded() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.parents(None, Page::new(vec![org("org1")], Some("p2".into())));
        fetcher.children("org1", None, Page::last(vec![ev("e1")]));
        fetcher.parents_fail(Some("p2"), "503");
        let sink = Arc::new(RecordingSink::default());
        let p = paginator(&fetcher).with_error_sink(sink.clone());

        p.load_initial().await;
        let outcome = p.load_more().await;
        assert_eq!(
            outcome,
            LoadOutcome::Failed("Failed to fetch organizations".to_string())
        );
        assert_eq!(p.state().await, LoadState::Failed);
        assert_eq!(
            p.last_error().await.as_deref(),
            Some("Failed to fetch organizations")
        );
        assert_eq!(item_ids(&p.items().await), vec!["e1"]);
        assert_eq!(sink.reports()[0].0, FetchErrorScope::Parent);

        let calls_before = fetcher.calls().len();
        assert_eq!(
            p.load_more().await,
            LoadOutcome::Skipped(LoadState::Failed)
        );
        assert_eq!(fetcher.calls().len(), calls_before);

        assert!(matches!(p.load_initial().await, LoadOutcome::Loaded(_)));
        assert_eq!(p.state().await, LoadState::Ready);
        assert!(p.last_error().await.is_none());
    }

    #[tokio::test]
    async fn initial_parent_failure_moves_to_failed() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.parents_fail(None, "connection refused");
        let p = paginator(&fetcher);

        assert!(matches!(p.load_initial().await, LoadOutcome::Failed(_)));
        assert_eq!(p.state().await, LoadState::Failed);
        assert!(p.items().await.is_empty());
    }

    #[tokio::test]
    async fn dedups_items_shared_between_sources() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.parents(None, Page::last(vec![org("a"), org("b"), org("a")]));
        fetcher.children("a", None, Page::last(vec![ev("e1"), ev("e2")]));
        fetcher.children("b", None, Page::last(vec![ev("e2"), ev("e3")]));
        let p = paginator(&fetcher);

        p.load_initial().await;
        assert_eq!(item_ids(&p.items().await), vec!["e1", "e2", "e3"]);
        assert_eq!(p.sources().await.len(), 2);
        assert_eq!(p.state().await, LoadState::Ready);
        assert!(!p.has_more().await);
        assert_eq!(p.load_more().await, LoadOutcome::NoMore);
        assert_eq!(p.state().await, LoadState::Exhausted);
    }

    #[tokio::test]
    async fn empty_first_page_is_exhausted() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.parents(None, Page::empty());
        let p = paginator(&fetcher);

        p.load_initial().await;
        assert_eq!(p.state().await, LoadState::Exhausted);
        assert!(!p.has_more().await);
    }

    #[tokio::test]
    async fn load_more_before_initial_is_skipped() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let p = paginator(&fetcher);
        assert_eq!(p.load_more().await, LoadOutcome::Skipped(LoadState::Idle));
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn concurrent_load_more_is_rejected() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.parents(None, Page::last(vec![org("org1")]));
        fetcher.children("org1", None, Page::new(vec![ev("e1")], Some("c2".into())));
        fetcher.children("org1", Some("c2"), Page::last(vec![ev("e2")]));
        let (entered, release) = fetcher.gate("org1", Some("c2"));
        let p = paginator(&fetcher);
        p.load_initial().await;

        let (first, second) = tokio::join!(p.load_more(), async {
            entered.notified().await;
            assert_eq!(p.state().await, LoadState::LoadingMore);
            let outcome = p.load_more().await;
            release.notify_one();
            outcome
        });

        assert!(matches!(first, LoadOutcome::Loaded(_)));
        assert_eq!(second, LoadOutcome::Rejected);
        assert_eq!(
            fetcher
                .calls()
                .iter()
                .filter(|c| c.as_str() == "children:org1:c2")
                .count(),
            1
        );
        assert_eq!(item_ids(&p.items().await), vec!["e1", "e2"]);
        assert_eq!(p.state().await, LoadState::Exhausted);
    }

    #[tokio::test]
    async fn bounded_fan_out_keeps_batch_order() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let orgs: Vec<Organization> = (0..5).map(|i| org(&format!("o{i}"))).collect();
        fetcher.parents(None, Page::last(orgs));
        for i in 0..5 {
            fetcher.children(
                &format!("o{i}"),
                None,
                Page::last(vec![ev(&format!("e{i}"))]),
            );
        }
        let p = paginator(&fetcher).with_config(PaginatorConfig {
            max_concurrent_fetches: 2,
            ..Default::default()
        });

        p.load_initial().await;
        assert_eq!(
            item_ids(&p.items().await),
            vec!["e0", "e1", "e2", "e3", "e4"]
        );
    }
}
