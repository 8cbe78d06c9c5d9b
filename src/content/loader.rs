//! Content loader - pulls listings and posts from the content API

use serde::Serialize;

use super::adjacency::{resolve_adjacent, Adjacency};
use super::{estimate_reading_time, PostDetail};
use crate::client::{ContentClient, Predicate, QueryOptions, POST_TYPE};
use crate::error::Result;
use crate::pagination::{LoadOutcome, PaginationState};
use crate::preview::PreviewContext;

/// Everything a post page shows
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub post: PostDetail,
    /// Minutes
    pub reading_time: usize,
    pub adjacency: Adjacency,
    pub preview: PreviewContext,
}

/// Loads listings and posts through a [`ContentClient`]
pub struct ContentLoader<'a> {
    client: &'a dyn ContentClient,
    page_size: usize,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(client: &'a dyn ContentClient, page_size: usize) -> Self {
        Self {
            client,
            page_size: page_size.max(1),
        }
    }

    /// Query the first listing page
    pub async fn first_page(&self) -> Result<PaginationState> {
        let predicates = [Predicate::at("document.type", POST_TYPE)];
        let options = QueryOptions::default()
            .fetch(["title", "subtitle", "author"].map(|f| format!("{}.{}", POST_TYPE, f)))
            .page_size(self.page_size);

        let page = self.client.query(&predicates, &options).await?;
        tracing::debug!(
            "First listing page: {} posts, next page: {:?}",
            page.results.len(),
            page.next_page
        );
        Ok(PaginationState::from_first_page(page)?)
    }

    /// Follow cursors until the listing is exhausted
    pub async fn load_all(&self) -> Result<PaginationState> {
        let mut state = self.first_page().await?;
        while let LoadOutcome::Appended(_) = state.load_more(self.client).await? {}
        Ok(state)
    }

    /// Load one post with its reading time and neighbours
    pub async fn load_post(&self, uid: &str, preview: &PreviewContext) -> Result<PostView> {
        let doc = self
            .client
            .get_by_uid(POST_TYPE, uid, preview.ref_token())
            .await?;
        let post = PostDetail::from_document(&doc)?;

        let reading_time = estimate_reading_time(&post.content);
        let adjacency =
            resolve_adjacent(self.client, post.first_publication_date, preview.ref_token())
                .await?;

        Ok(PostView {
            post,
            reading_time,
            adjacency,
            preview: preview.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use crate::content::{ApiPage, RawDocument};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Serves one published and one draft revision of a single post
    #[derive(Default)]
    struct RevisionedClient {
        refs_seen: Mutex<Vec<Option<String>>>,
        queries: Mutex<Vec<QueryOptions>>,
    }

    fn revision(title: &str) -> RawDocument {
        serde_json::from_value(json!({
            "uid": "hooks",
            "first_publication_date": "2021-03-15T19:25:28+0000",
            "last_publication_date": "2021-03-15T19:25:28+0000",
            "data": {
                "title": title,
                "subtitle": "sub",
                "author": "Joseph",
                "banner": {"url": "https://img/banner.png"},
                "content": [{"heading": "h", "body": [{"type": "paragraph", "text": "one two three four", "spans": []}]}]
            }
        }))
        .unwrap()
    }

    #[async_trait]
    impl ContentClient for RevisionedClient {
        async fn query(
            &self,
            _predicates: &[Predicate],
            options: &QueryOptions,
        ) -> std::result::Result<ApiPage, ClientError> {
            self.queries.lock().unwrap().push(options.clone());
            let results = if options.fetch.len() == 3 {
                vec![revision("Published")]
            } else {
                Vec::new()
            };
            Ok(ApiPage::new(results, None))
        }

        async fn get_by_uid(
            &self,
            doc_type: &str,
            uid: &str,
            ref_token: Option<&str>,
        ) -> std::result::Result<RawDocument, ClientError> {
            assert_eq!(doc_type, "post");
            assert_eq!(uid, "hooks");
            self.refs_seen
                .lock()
                .unwrap()
                .push(ref_token.map(str::to_string));
            Ok(match ref_token {
                Some("draft-ref") => revision("Draft"),
                _ => revision("Published"),
            })
        }

        async fn fetch_page(&self, url: &str) -> std::result::Result<ApiPage, ClientError> {
            Err(ClientError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    #[tokio::test]
    async fn test_load_post_published() {
        let client = RevisionedClient::default();
        let loader = ContentLoader::new(&client, 1);

        let view = loader
            .load_post("hooks", &PreviewContext::published())
            .await
            .unwrap();
        assert_eq!(view.post.title, "Published");
        assert_eq!(view.reading_time, 1);
        assert!(!view.preview.active);
        assert_eq!(*client.refs_seen.lock().unwrap(), vec![None]);
    }

    #[tokio::test]
    async fn test_preview_ref_is_forwarded() {
        let client = RevisionedClient::default();
        let loader = ContentLoader::new(&client, 1);
        let preview = PreviewContext::from_ref(Some("draft-ref".to_string()));

        let view = loader.load_post("hooks", &preview).await.unwrap();
        assert_eq!(view.post.title, "Draft");
        assert!(view.preview.active);
        assert_eq!(
            *client.refs_seen.lock().unwrap(),
            vec![Some("draft-ref".to_string())]
        );

        let queries = client.queries.lock().unwrap();
        assert_eq!(queries.len(), 2);
        assert!(queries
            .iter()
            .all(|q| q.ref_token.as_deref() == Some("draft-ref")));
    }

    #[tokio::test]
    async fn test_first_page_query() {
        let client = RevisionedClient::default();
        let loader = ContentLoader::new(&client, 0);

        let state = loader.first_page().await.unwrap();
        assert_eq!(state.len(), 1);
        assert!(!state.has_more());

        let queries = client.queries.lock().unwrap();
        assert_eq!(queries[0].page_size, 1);
        assert_eq!(
            queries[0].fetch,
            vec!["post.title", "post.subtitle", "post.author"]
        );
        assert_eq!(queries[0].ref_token, None);
    }

    #[tokio::test]
    async fn test_load_all_stops_at_terminal_cursor() {
        let client = RevisionedClient::default();
        let loader = ContentLoader::new(&client, 1);
        let state = loader.load_all().await.unwrap();
        assert_eq!(state.len(), 1);
    }
}
