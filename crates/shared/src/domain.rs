use serde::{Deserialize, Serialize};

use crate::error::InvalidPageSize;

/// The upstream service never serves pages past this one, whatever `totalHits` says.
pub const MAX_PAGES: u32 = 50;

pub const DEFAULT_QUERY: &str = "nature";

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub u64);
    };
}

id_newtype!(ImageId);

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PageSize {
    Twelve,
    #[default]
    Twenty,
    Forty,
}

impl PageSize {
    pub const ALL: [PageSize; 3] = [PageSize::Twelve, PageSize::Twenty, PageSize::Forty];

    pub fn get(self) -> u32 {
        match self {
            PageSize::Twelve => 12,
            PageSize::Twenty => 20,
            PageSize::Forty => 40,
        }
    }
}

impl TryFrom<u32> for PageSize {
    type Error = InvalidPageSize;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        PageSize::ALL
            .into_iter()
            .find(|size| size.get() == value)
            .ok_or(InvalidPageSize(value))
    }
}

impl From<PageSize> for u32 {
    fn from(value: PageSize) -> Self {
        value.get()
    }
}

/// Everything that decides which page of which query is requested.
///
/// Two states that compare equal always produce the same outbound request,
/// which is what in-flight deduplication keys on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchState {
    pub free_text_query: String,
    pub selected_category: String,
    pub page: u32,
    pub page_size: PageSize,
}

impl SearchState {
    pub fn new(free_text_query: impl Into<String>, page_size: PageSize) -> Self {
        Self {
            free_text_query: free_text_query.into(),
            selected_category: String::new(),
            page: 1,
            page_size,
        }
    }

    /// A selected category wins over the free text. May be empty.
    pub fn effective_query(&self) -> &str {
        if self.selected_category.is_empty() {
            &self.free_text_query
        } else {
            &self.selected_category
        }
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new(DEFAULT_QUERY, PageSize::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: ImageId,
    #[serde(rename = "webformatURL")]
    pub thumbnail_url: String,
    #[serde(rename = "largeImageURL")]
    pub large_image_url: String,
    #[serde(
        rename = "previewURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub preview_url: Option<String>,
    pub tags: String,
    pub user: String,
    pub views: u64,
    pub downloads: u64,
    pub likes: u64,
}

impl ImageRecord {
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .collect()
    }

    pub fn headline_tags(&self, limit: usize) -> String {
        self.tag_list()
            .into_iter()
            .take(limit)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub fn total_pages(total_hits: u64, page_size: PageSize) -> u32 {
    let per_page = u64::from(page_size.get());
    let pages = total_hits.div_ceil(per_page);
    pages.min(u64::from(MAX_PAGES)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_tags(tags: &str) -> ImageRecord {
        ImageRecord {
            id: ImageId(1),
            thumbnail_url: "https://cdn.example/thumb.jpg".into(),
            large_image_url: "https://cdn.example/large.jpg".into(),
            preview_url: None,
            tags: tags.into(),
            user: "alice".into(),
            views: 0,
            downloads: 0,
            likes: 0,
        }
    }

    #[test]
    fn tag_list_trims_and_keeps_order() {
        let record = record_with_tags("cat, pet, animal");
        assert_eq!(record.tag_list(), vec!["cat", "pet", "animal"]);
    }

    #[test]
    fn tag_list_keeps_duplicates_and_drops_blank_entries() {
        let record = record_with_tags("sky,, sky , ");
        assert_eq!(record.tag_list(), vec!["sky", "sky"]);
    }

    #[test]
    fn headline_tags_takes_first_three() {
        let record = record_with_tags("forest, tree, moss, fog");
        assert_eq!(record.headline_tags(3), "forest, tree, moss");
    }

    #[test]
    fn total_pages_is_capped_at_upstream_limit() {
        assert_eq!(total_pages(1000, PageSize::Twenty), 50);
        assert_eq!(total_pages(35, PageSize::Twenty), 2);
        assert_eq!(total_pages(40, PageSize::Forty), 1);
        assert_eq!(total_pages(0, PageSize::Twelve), 0);
    }

    #[test]
    fn page_size_accepts_only_enumerated_values() {
        assert_eq!(PageSize::try_from(12).expect("12"), PageSize::Twelve);
        assert_eq!(PageSize::try_from(40).expect("40"), PageSize::Forty);
        assert_eq!(PageSize::try_from(25).expect_err("25").0, 25);
    }

    #[test]
    fn effective_query_prefers_category() {
        let mut state = SearchState::new("mountains", PageSize::Twenty);
        assert_eq!(state.effective_query(), "mountains");

        state.selected_category = "food".into();
        assert_eq!(state.effective_query(), "food");

        state.free_text_query.clear();
        assert_eq!(state.effective_query(), "food");

        state.selected_category.clear();
        assert_eq!(state.effective_query(), "");
    }

    #[test]
    fn image_record_decodes_upstream_field_names() {
        let record: ImageRecord = serde_json::from_value(serde_json::json!({
            "id": 195893,
            "webformatURL": "https://cdn.example/web.jpg",
            "largeImageURL": "https://cdn.example/large.jpg",
            "previewURL": "https://cdn.example/preview.jpg",
            "tags": "blossom, bloom, flower",
            "user": "Josch13",
            "views": 7671,
            "downloads": 6439,
            "likes": 5,
            "imageWidth": 4000
        }))
        .expect("decode");
        assert_eq!(record.id, ImageId(195893));
        assert_eq!(record.large_image_url, "https://cdn.example/large.jpg");
        assert_eq!(record.preview_url.as_deref(), Some("https://cdn.example/preview.jpg"));
        assert_eq!(record.downloads, 6439);
    }
}
