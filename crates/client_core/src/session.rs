//! Browser session: user action → controller → explicit fetch.

use std::sync::Arc;

use shared::domain::SearchState;
use tokio::sync::{broadcast, Mutex};
use tracing::debug;

use crate::{
    fetcher::{FetchResult, ResultFetcher, RetainedPage},
    query::{QueryError, QueryStateController},
};

pub struct BrowserSession {
    controller: Mutex<QueryStateController>,
    fetcher: Arc<ResultFetcher>,
}

impl BrowserSession {
    pub fn new(fetcher: Arc<ResultFetcher>, initial: SearchState) -> Self {
        Self {
            controller: Mutex::new(QueryStateController::new(initial)),
            fetcher,
        }
    }

    /// Blank input leaves everything as is and returns the current result.
    pub async fn submit_search(&self, text: &str) -> FetchResult {
        let next = {
            let mut controller = self.controller.lock().await;
            controller
                .submit_search(text)
                .then(|| controller.state().clone())
        };
        self.fetch_if_changed(next).await
    }

    pub async fn select_category(&self, value: &str) -> FetchResult {
        let next = {
            let mut controller = self.controller.lock().await;
            controller
                .select_category(value)
                .then(|| controller.state().clone())
        };
        self.fetch_if_changed(next).await
    }

    pub async fn set_page(&self, page: u32) -> Result<FetchResult, QueryError> {
        let next = {
            let mut controller = self.controller.lock().await;
            controller
                .set_page(page)?
                .then(|| controller.state().clone())
        };
        Ok(self.fetch_if_changed(next).await)
    }

    pub async fn next_page(&self) -> Result<FetchResult, QueryError> {
        let page = self.controller.lock().await.state().page;
        self.set_page(page.saturating_add(1)).await
    }

    pub async fn previous_page(&self) -> Result<FetchResult, QueryError> {
        let page = self.controller.lock().await.state().page;
        self.set_page(page.saturating_sub(1).max(1)).await
    }

    pub async fn set_page_size(&self, size: u32) -> Result<FetchResult, QueryError> {
        let next = {
            let mut controller = self.controller.lock().await;
            controller
                .set_page_size(size)?
                .then(|| controller.state().clone())
        };
        Ok(self.fetch_if_changed(next).await)
    }

    /// Re-issues the current state, e.g. after a failure.
    pub async fn refresh(&self) -> FetchResult {
        let state = self.state().await;
        self.run_fetch(state).await
    }

    pub async fn state(&self) -> SearchState {
        self.controller.lock().await.state().clone()
    }

    pub async fn total_pages(&self) -> Option<u32> {
        self.controller.lock().await.total_pages()
    }

    pub async fn snapshot(&self) -> FetchResult {
        self.fetcher.snapshot().await
    }

    /// The last successful page while a newer request is pending.
    pub async fn retained(&self) -> Option<RetainedPage> {
        self.fetcher.retained().await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FetchResult> {
        self.fetcher.subscribe()
    }

    async fn fetch_if_changed(&self, next: Option<SearchState>) -> FetchResult {
        match next {
            Some(state) => self.run_fetch(state).await,
            None => {
                debug!("search state unchanged; no fetch issued");
                self.fetcher.snapshot().await
            }
        }
    }

    async fn run_fetch(&self, state: SearchState) -> FetchResult {
        let outcome = self.fetcher.fetch_outcome(state.clone()).await;
        if let (true, FetchResult::Success { total_matches, .. }) =
            (outcome.applied, &outcome.result)
        {
            let mut controller = self.controller.lock().await;
            if *controller.state() == state {
                controller.record_total_hits(*total_matches);
            }
        }
        outcome.result
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
