//! HTTP client for a Prismic-style document API

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use super::{ClientError, ContentClient, Predicate, QueryOptions};
use crate::config::ApiConfig;
use crate::content::{ApiPage, RawDocument};

/// `GET {endpoint}` response; only the refs are of interest
#[derive(Debug, Deserialize)]
struct ApiInfo {
    #[serde(default)]
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    token: String,
    #[serde(default, rename = "isMasterRef")]
    is_master: bool,
}

/// Content client over HTTP
#[derive(Clone)]
pub struct PrismicClient {
    http: reqwest::Client,
    endpoint: String,
    access_token: Option<String>,
}

impl PrismicClient {
    /// Build a client from the `api` section of the site config
    pub fn new(api: &ApiConfig) -> Result<Self, ClientError> {
        let endpoint = api.endpoint.trim().trim_end_matches('/').to_string();
        if endpoint.is_empty() {
            return Err(ClientError::NotConfigured);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(api.request_timeout_secs))
            .user_agent(concat!("spacetraveling-rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ClientError::Http {
                url: endpoint.clone(),
                source,
            })?;

        Ok(Self {
            http,
            endpoint,
            access_token: api.access_token.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Resolve the ref of the latest published revision
    async fn master_ref(&self) -> Result<String, ClientError> {
        let mut params = Vec::new();
        if let Some(token) = &self.access_token {
            params.push(("access_token".to_string(), token.clone()));
        }
        let info: ApiInfo = self.get_json(&self.endpoint, &params).await?;
        info.refs
            .into_iter()
            .find(|r| r.is_master)
            .map(|r| r.token)
            .ok_or_else(|| ClientError::NoMasterRef(self.endpoint.clone()))
    }

    fn search_url(&self) -> String {
        format!("{}/documents/search", self.endpoint)
    }

    /// Query-string parameters of a search request
    fn search_params(
        &self,
        ref_token: &str,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Vec<(String, String)> {
        let mut params = vec![("ref".to_string(), ref_token.to_string())];

        if !predicates.is_empty() {
            let q: String = predicates.iter().map(|p| p.to_string()).collect();
            params.push(("q".to_string(), format!("[{}]", q)));
        }

        params.push(("pageSize".to_string(), options.page_size.to_string()));

        if let Some(orderings) = &options.orderings {
            params.push(("orderings".to_string(), orderings.clone()));
        }

        if !options.fetch.is_empty() {
            params.push(("fetch".to_string(), options.fetch.join(",")));
        }

        if let Some(token) = &self.access_token {
            params.push(("access_token".to_string(), token.clone()));
        }

        params
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> Result<T, ClientError> {
        tracing::debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|source| ClientError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| ClientError::Http {
            url: url.to_string(),
            source,
        })?;

        serde_json::from_str(&body).map_err(|source| ClientError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl ContentClient for PrismicClient {
    async fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<ApiPage, ClientError> {
        let ref_token = match &options.ref_token {
            Some(token) => token.clone(),
            None => self.master_ref().await?,
        };
        let params = self.search_params(&ref_token, predicates, options);
        self.get_json(&self.search_url(), &params).await
    }

    async fn get_by_uid(
        &self,
        doc_type: &str,
        uid: &str,
        ref_token: Option<&str>,
    ) -> Result<RawDocument, ClientError> {
        let predicates = [Predicate::at(&format!("my.{}.uid", doc_type), uid)];
        let options = QueryOptions::default().page_size(1).ref_token(ref_token);

        let page = self.query(&predicates, &options).await?;
        page.results
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::NotFound {
                doc_type: doc_type.to_string(),
                uid: uid.to_string(),
            })
    }

    async fn fetch_page(&self, url: &str) -> Result<ApiPage, ClientError> {
        self.get_json(url, &[]).await
    }
}
