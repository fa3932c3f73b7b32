//! Query state controller: turns user actions into a consistent [`SearchState`].

use shared::{
    domain::{total_pages, PageSize, SearchState, MAX_PAGES},
    error::InvalidPageSize,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("page numbers start at 1, got {0}")]
    InvalidPage(u32),
    #[error(transparent)]
    UnsupportedPageSize(#[from] InvalidPageSize),
}

/// Sole owner and writer of the search state.
///
/// Every mutating call returns whether the state actually changed; an
/// unchanged state must not trigger a fetch.
#[derive(Debug, Clone, Default)]
pub struct QueryStateController {
    state: SearchState,
    total_hits: Option<u64>,
}

impl QueryStateController {
    pub fn new(state: SearchState) -> Self {
        Self {
            state,
            total_hits: None,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn effective_query(&self) -> &str {
        self.state.effective_query()
    }

    pub fn submit_search(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }

        let previous = self.state.clone();
        self.state.free_text_query = text.to_string();
        self.state.selected_category.clear();
        self.state.page = 1;
        self.scope_changed(&previous)
    }

    /// An empty `value` clears the filter; the free text stays available.
    pub fn select_category(&mut self, value: &str) -> bool {
        let previous = self.state.clone();
        self.state.selected_category = value.to_string();
        self.state.page = 1;
        self.scope_changed(&previous)
    }

    pub fn set_page(&mut self, page: u32) -> Result<bool, QueryError> {
        if page == 0 {
            return Err(QueryError::InvalidPage(page));
        }

        let page = page.min(self.page_bound());
        let changed = self.state.page != page;
        self.state.page = page;
        Ok(changed)
    }

    /// Resets to page 1: the old position means nothing at a different size.
    pub fn set_page_size(&mut self, size: u32) -> Result<bool, QueryError> {
        let size = PageSize::try_from(size)?;
        if self.state.page_size == size {
            return Ok(false);
        }

        self.state.page_size = size;
        self.state.page = 1;
        Ok(true)
    }

    pub fn record_total_hits(&mut self, total_hits: u64) {
        self.total_hits = Some(total_hits);
    }

    /// `None` until a fetch for the current scope has succeeded.
    pub fn total_pages(&self) -> Option<u32> {
        self.total_hits
            .map(|hits| total_pages(hits, self.state.page_size))
    }

    fn page_bound(&self) -> u32 {
        self.total_pages().unwrap_or(MAX_PAGES).max(1)
    }

    fn scope_changed(&mut self, previous: &SearchState) -> bool {
        if previous.free_text_query != self.state.free_text_query
            || previous.selected_category != self.state.selected_category
        {
            self.total_hits = None;
        }
        *previous != self.state
    }
}

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod tests;
