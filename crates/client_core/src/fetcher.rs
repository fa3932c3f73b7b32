//! Result fetcher: one outbound search per distinct state, with in-flight
//! deduplication and stale-response rejection.

use std::{collections::HashMap, sync::Arc};

use futures::{
    future::{BoxFuture, Shared},
    FutureExt,
};
use serde::Serialize;
use shared::{
    domain::{ImageRecord, SearchState},
    error::{FetchFailure, SearchError},
    protocol::{SearchRequest, SearchResponse},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::transport::SearchTransport;

const EVENT_CAPACITY: usize = 64;

type SearchOutcome = Result<SearchResponse, SearchError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum FetchResult {
    Idle,
    Pending {
        requested: SearchState,
    },
    Success {
        items: Vec<ImageRecord>,
        total_matches: u64,
    },
    Failure(FetchFailure),
}

impl FetchResult {
    pub fn is_pending(&self) -> bool {
        matches!(self, FetchResult::Pending { .. })
    }
}

/// The last successful payload, kept only while a newer fetch is pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetainedPage {
    pub items: Vec<ImageRecord>,
    pub total_matches: u64,
}

/// Settles once the spawned request has been resolved. `None` means the
/// response was superseded and dropped.
type Flight = Shared<BoxFuture<'static, Option<FetchResult>>>;

struct FetcherState {
    visible: FetchResult,
    retained: Option<RetainedPage>,
    inflight: HashMap<SearchState, Flight>,
}

/// What a single `fetch` call observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub result: FetchResult,
    /// The response for the requested state became the visible result.
    pub applied: bool,
}

pub struct ResultFetcher {
    transport: Arc<dyn SearchTransport>,
    api_key: String,
    inner: Mutex<FetcherState>,
    events: broadcast::Sender<FetchResult>,
}

impl ResultFetcher {
    pub fn new(transport: Arc<dyn SearchTransport>, api_key: impl Into<String>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Arc::new(Self {
            transport,
            api_key: api_key.into(),
            inner: Mutex::new(FetcherState {
                visible: FetchResult::Idle,
                retained: None,
                inflight: HashMap::new(),
            }),
            events,
        })
    }

    /// Requests `state` and waits for its outcome.
    ///
    /// Returns the visible result once the request settles. When a newer
    /// request was made in the meantime, this response is dropped and the
    /// returned value is whatever the newer request currently shows.
    pub async fn fetch(self: &Arc<Self>, state: SearchState) -> FetchResult {
        self.fetch_outcome(state).await.result
    }

    /// Like [`ResultFetcher::fetch`], but also reports whether the response
    /// for `state` was the one applied.
    ///
    /// The request runs on its own task, so dropping the returned future
    /// does not leave the fetcher pending.
    pub async fn fetch_outcome(self: &Arc<Self>, state: SearchState) -> FetchOutcome {
        let flight = {
            let mut guard = self.inner.lock().await;
            let awaiting = matches!(
                &guard.visible,
                FetchResult::Pending { requested } if *requested == state
            );

            let flight = match guard.inflight.get(&state).cloned() {
                Some(flight) => {
                    debug!(
                        query = %state.effective_query(),
                        page = state.page,
                        "joining in-flight image search"
                    );
                    flight
                }
                None => {
                    let flight = self.start_flight(state.clone());
                    guard.inflight.insert(state.clone(), flight.clone());
                    flight
                }
            };

            if !awaiting {
                let previous = std::mem::replace(
                    &mut guard.visible,
                    FetchResult::Pending {
                        requested: state.clone(),
                    },
                );
                if let FetchResult::Success {
                    items,
                    total_matches,
                } = previous
                {
                    guard.retained = Some(RetainedPage {
                        items,
                        total_matches,
                    });
                }
                let _ = self.events.send(guard.visible.clone());
            }

            flight
        };

        match flight.await {
            Some(result) => FetchOutcome {
                result,
                applied: true,
            },
            None => FetchOutcome {
                result: self.snapshot().await,
                applied: false,
            },
        }
    }

    pub async fn snapshot(&self) -> FetchResult {
        self.inner.lock().await.visible.clone()
    }

    pub async fn retained(&self) -> Option<RetainedPage> {
        self.inner.lock().await.retained.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FetchResult> {
        self.events.subscribe()
    }

    fn start_flight(self: &Arc<Self>, state: SearchState) -> Flight {
        let fetcher = Arc::clone(self);
        let request = SearchRequest::for_state(self.api_key.clone(), &state);
        let task = tokio::spawn(async move {
            let outcome = fetcher.transport.search(&request).await;
            fetcher.settle(&state, outcome).await
        });
        async move {
            task.await.unwrap_or_else(|err| {
                warn!(%err, "image search task ended abnormally");
                None
            })
        }
        .boxed()
        .shared()
    }

    /// Applies `outcome` if the visible result is still waiting on `state`.
    async fn settle(&self, state: &SearchState, outcome: SearchOutcome) -> Option<FetchResult> {
        let mut guard = self.inner.lock().await;
        guard.inflight.remove(state);

        let awaiting_this = matches!(
            &guard.visible,
            FetchResult::Pending { requested } if requested == state
        );
        if !awaiting_this {
            debug!(
                query = %state.effective_query(),
                page = state.page,
                "dropping superseded image search response"
            );
            return None;
        }

        guard.retained = None;
        guard.visible = match outcome {
            Ok(response) => {
                info!(
                    query = %state.effective_query(),
                    page = state.page,
                    hits = response.hits.len(),
                    total_hits = response.total_hits,
                    "image search succeeded"
                );
                FetchResult::Success {
                    items: response.hits,
                    total_matches: response.total_hits,
                }
            }
            Err(err) => {
                warn!(
                    query = %state.effective_query(),
                    page = state.page,
                    %err,
                    "image search failed"
                );
                FetchResult::Failure(err.into())
            }
        };
        let _ = self.events.send(guard.visible.clone());
        Some(guard.visible.clone())
    }
}

#[cfg(test)]
#[path = "tests/fetcher_tests.rs"]
mod tests;
