//! Content API client
//!
//! The generator, pagination and adjacency code only talk to the
//! [`ContentClient`] trait; [`PrismicClient`] is the HTTP implementation.

mod prismic;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

use crate::content::{ApiPage, RawDocument};

pub use prismic::PrismicClient;

/// Custom type of blog posts
pub const POST_TYPE: &str = "post";

/// Errors raised while talking to the content API
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("content API endpoint is not configured (set api.endpoint or PRISMIC_API_ENDPOINT)")]
    NotConfigured,

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no {doc_type} document with uid {uid:?}")]
    NotFound { doc_type: String, uid: String },

    #[error("API at {0} did not advertise a master ref")]
    NoMasterRef(String),
}

/// A query predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `path` equals `value`
    At { path: String, value: String },
    /// Date at `path` strictly before `date`
    DateBefore { path: String, date: DateTime<Utc> },
    /// Date at `path` strictly after `date`
    DateAfter { path: String, date: DateTime<Utc> },
}

impl Predicate {
    pub fn at(path: &str, value: &str) -> Self {
        Predicate::At {
            path: path.to_string(),
            value: value.to_string(),
        }
    }

    pub fn date_before(path: &str, date: DateTime<Utc>) -> Self {
        Predicate::DateBefore {
            path: path.to_string(),
            date,
        }
    }

    pub fn date_after(path: &str, date: DateTime<Utc>) -> Self {
        Predicate::DateAfter {
            path: path.to_string(),
            date,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::At { path, value } => {
                write!(f, "[at({}, {})]", path, quote(value))
            }
            Predicate::DateBefore { path, date } => {
                write!(f, "[date.before({}, {})]", path, date.timestamp_millis())
            }
            Predicate::DateAfter { path, date } => {
                write!(f, "[date.after({}, {})]", path, date.timestamp_millis())
            }
        }
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Options of a `query` call
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOptions {
    /// Restrict returned `data` to these fields (`type.field`)
    pub fetch: Vec<String>,
    pub page_size: usize,
    /// e.g. `[document.first_publication_date desc]`
    pub orderings: Option<String>,
    /// Content revision; the master ref is used when `None`
    pub ref_token: Option<String>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            fetch: Vec::new(),
            page_size: 20,
            orderings: None,
            ref_token: None,
        }
    }
}

impl QueryOptions {
    pub fn fetch<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fetch = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn orderings(mut self, orderings: &str) -> Self {
        self.orderings = Some(orderings.to_string());
        self
    }

    pub fn ref_token(mut self, ref_token: Option<&str>) -> Self {
        self.ref_token = ref_token.map(str::to_string);
        self
    }
}

/// A queryable document API
#[async_trait]
pub trait ContentClient: Send + Sync {
    /// Run a predicate query and return the first page of results
    async fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<ApiPage, ClientError>;

    /// Fetch one document of `doc_type` by its uid
    async fn get_by_uid(
        &self,
        doc_type: &str,
        uid: &str,
        ref_token: Option<&str>,
    ) -> Result<RawDocument, ClientError>;

    /// GET an opaque `next_page` cursor
    async fn fetch_page(&self, url: &str) -> Result<ApiPage, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_predicate_display() {
        assert_eq!(
            Predicate::at("document.type", POST_TYPE).to_string(),
            r#"[at(document.type, "post")]"#
        );
        let date = Utc.with_ymd_and_hms(2021, 3, 15, 19, 25, 28).unwrap();
        assert_eq!(
            Predicate::date_before("document.first_publication_date", date).to_string(),
            "[date.before(document.first_publication_date, 1615836328000)]"
        );
        assert_eq!(
            Predicate::date_after("document.first_publication_date", date).to_string(),
            "[date.after(document.first_publication_date, 1615836328000)]"
        );
    }

    #[test]
    fn test_at_escapes_quotes() {
        assert_eq!(
            Predicate::at("my.post.uid", r#"a"b"#).to_string(),
            r#"[at(my.post.uid, "a\"b")]"#
        );
    }

    #[test]
    fn test_query_options_builder() {
        let options = QueryOptions::default()
            .fetch(["post.title"])
            .page_size(1)
            .orderings("[document.first_publication_date]")
            .ref_token(Some("preview-ref"));
        assert_eq!(options.fetch, vec!["post.title".to_string()]);
        assert_eq!(options.page_size, 1);
        assert_eq!(
            options.orderings.as_deref(),
            Some("[document.first_publication_date]")
        );
        assert_eq!(options.ref_token.as_deref(), Some("preview-ref"));
    }
}
