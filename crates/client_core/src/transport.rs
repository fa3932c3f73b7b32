//! Outbound leg of a search: one GET against the image service.

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    error::SearchError,
    protocol::{SearchRequest, SearchResponse},
};
use tracing::debug;
use url::Url;

#[async_trait]
pub trait SearchTransport: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError>;
}

pub struct HttpSearchTransport {
    http: Client,
    base_url: Url,
}

impl HttpSearchTransport {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }
}

#[async_trait]
impl SearchTransport for HttpSearchTransport {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        debug!(
            q = %request.q,
            page = request.page,
            per_page = request.per_page,
            "image search request"
        );
        let res = self
            .http
            .get(self.base_url.clone())
            .query(request)
            .send()
            .await
            .map_err(|err| SearchError::Transport(err.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
            });
        }

        let body = res
            .bytes()
            .await
            .map_err(|err| SearchError::Transport(err.to_string()))?;
        serde_json::from_slice(&body).map_err(|err| SearchError::Decode(err.to_string()))
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
