//! Previous/next post resolution by first publication date

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{AdjacentPostRef, ApiPage};
use crate::client::{ContentClient, Predicate, QueryOptions, POST_TYPE};
use crate::error::Result;

const PUBLICATION_DATE: &str = "document.first_publication_date";

/// Chronological neighbours of a post
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Adjacency {
    /// Latest post published strictly before
    pub previous: Option<AdjacentPostRef>,
    /// Earliest post published strictly after
    pub next: Option<AdjacentPostRef>,
}

/// Look up the posts published just before and just after `published`
///
/// A post without a publication date has no neighbours and issues no query.
pub async fn resolve_adjacent<C>(
    client: &C,
    published: Option<DateTime<Utc>>,
    ref_token: Option<&str>,
) -> Result<Adjacency>
where
    C: ContentClient + ?Sized,
{
    let Some(date) = published else {
        return Ok(Adjacency::default());
    };

    let previous_query = [
        Predicate::at("document.type", POST_TYPE),
        Predicate::date_before(PUBLICATION_DATE, date),
    ];
    let next_query = [
        Predicate::at("document.type", POST_TYPE),
        Predicate::date_after(PUBLICATION_DATE, date),
    ];

    let previous_options =
        neighbour_options(ref_token).orderings(&format!("[{} desc]", PUBLICATION_DATE));
    let next_options =
        neighbour_options(ref_token).orderings(&format!("[{}]", PUBLICATION_DATE));

    let (previous, next) = tokio::join!(
        client.query(&previous_query, &previous_options),
        client.query(&next_query, &next_options)
    );

    Ok(Adjacency {
        previous: first_ref(previous?)?,
        next: first_ref(next?)?,
    })
}

fn neighbour_options(ref_token: Option<&str>) -> QueryOptions {
    QueryOptions::default()
        .fetch([format!("{}.title", POST_TYPE)])
        .page_size(1)
        .ref_token(ref_token)
}

fn first_ref(page: ApiPage) -> Result<Option<AdjacentPostRef>> {
    match page.results.first() {
        Some(doc) => Ok(Some(AdjacentPostRef::from_document(doc)?)),
        None => Ok(None),
    }
}
