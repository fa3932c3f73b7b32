//! Search client core: query state, result fetching and the session that ties
//! them to the image service.

use std::sync::Arc;

pub mod config;
pub mod fetcher;
pub mod query;
pub mod session;
pub mod transport;

pub use config::{load_settings, ClientConfig, Settings};
pub use fetcher::{FetchOutcome, FetchResult, ResultFetcher, RetainedPage};
pub use query::{QueryError, QueryStateController};
pub use session::BrowserSession;
pub use transport::{HttpSearchTransport, SearchTransport};

/// Builds a session talking to the configured image service over HTTP.
pub fn connect(config: ClientConfig) -> BrowserSession {
    let transport = Arc::new(HttpSearchTransport::new(config.base_url));
    let fetcher = ResultFetcher::new(transport, config.api_key);
    BrowserSession::new(fetcher, config.initial_state)
}
