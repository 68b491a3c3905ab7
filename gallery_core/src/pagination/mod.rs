//! Cursor pagination across many upstream collections.
//!
//! This module aggregates paginated child collections (events) of a paginated
//! parent collection (organizations) into one deduplicated, scrollable list:
//! - `registry` tracks known parent sources and a cursor per source
//! - `merge` appends fetched batches while suppressing duplicate identities
//! - `progress` derives the aggregate "has more" signal and the load states
//! - `paginator` drives the fan-out fetches and the state machine
//!
//! Transport is injected through the `ParentFetcher` / `ChildFetcher` traits.

pub mod cursor;
pub mod merge;
pub mod paginator;
pub mod progress;
pub mod registry;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;

pub use cursor::{CursorState, Page};
pub use merge::{MergedList, merge_batch};
pub use paginator::{BatchReport, FanOutPaginator, LoadOutcome};
pub use progress::{LoadState, aggregate_has_more};
pub use registry::SourceRegistry;
pub use traits::{
    ChildFetcher, ErrorSink, FetchErrorScope, Identified, ParentFetcher, Source, TracingErrorSink,
};
