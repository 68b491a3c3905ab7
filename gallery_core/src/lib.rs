//! Gallery core library: multi-source pagination, feeds and event pages,
//! independent of the transport that backs them.

pub mod config;
pub mod error;
pub mod feed;
pub mod gallery;
pub mod models;
pub mod o11y;
pub mod pagination;
pub mod search;

pub use config::{FeedConfig, PaginatorConfig};
pub use error::{Error, Result};
pub use feed::{FeedStep, OrgFeed};
pub use gallery::{Affordances, EventGallery, EventGalleryBackend};
pub use models::{
    Event, EventUser, MemberRole, Membership, Organization, Photo, PhotoMetadata, Viewer,
};
pub use o11y::{LogFormat, O11yConfig};
pub use pagination::{
    BatchReport, ChildFetcher, CursorState, ErrorSink, FanOutPaginator, FetchErrorScope,
    Identified, LoadOutcome, LoadState, MergedList, Page, ParentFetcher, Source, SourceRegistry,
    TracingErrorSink,
};
pub use search::{Searchable, search_filter};
