//! Content module - raw API documents, view models and the pure transforms over them

pub mod adjacency;
mod document;
mod error;
pub mod loader;
mod post;
pub mod reading_time;
pub mod richtext;

pub use adjacency::Adjacency;
pub use document::{ApiPage, RawDocument};
pub use error::ContentError;
pub use loader::{ContentLoader, PostView};
pub use post::{AdjacentPostRef, ContentSection, PostDetail, PostSummary};
pub use reading_time::estimate_reading_time;
pub use richtext::{RichTextNode, Span};
