#![forbid(unsafe_code)]

mod apis;
mod client;
pub mod config;
mod error;
mod fetchers;
mod types;

pub use apis::*;
pub use client::{ClientOptions, GalleryClient};
pub use config::{ApiMode, ClientConfig};
pub use error::{GalleryError, GalleryErrorKind};
pub use fetchers::{EventPages, HttpEventGallery, OrganizationPages};
pub use types::*;
