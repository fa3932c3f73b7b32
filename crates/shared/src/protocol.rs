use serde::{Deserialize, Serialize};

use crate::domain::{ImageRecord, SearchState};

pub const MIN_IMAGE_WIDTH: u32 = 640;
pub const MIN_IMAGE_HEIGHT: u32 = 480;

/// Query string of one search call. Serialized with `reqwest::RequestBuilder::query`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    pub key: String,
    pub q: String,
    pub image_type: &'static str,
    pub orientation: &'static str,
    pub category: &'static str,
    pub min_width: u32,
    pub min_height: u32,
    pub per_page: u32,
    pub page: u32,
    pub safesearch: bool,
}

impl SearchRequest {
    pub fn for_state(key: impl Into<String>, state: &SearchState) -> Self {
        Self {
            key: key.into(),
            q: state.effective_query().to_string(),
            image_type: "photo",
            orientation: "all",
            category: "all",
            min_width: MIN_IMAGE_WIDTH,
            min_height: MIN_IMAGE_HEIGHT,
            per_page: state.page_size.get(),
            page: state.page,
            safesearch: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub hits: Vec<ImageRecord>,
    pub total: u64,
    #[serde(rename = "totalHits")]
    pub total_hits: u64,
}
