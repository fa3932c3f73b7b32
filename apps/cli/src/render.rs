//! Plain-text rendering of fetch phases and single images.

use std::fmt::Write as _;

use client_core::{FetchResult, RetainedPage};
use shared::domain::{ImageRecord, SearchState};

const GRID_TAGS: usize = 3;

pub fn render_result(
    result: &FetchResult,
    state: &SearchState,
    total_pages: Option<u32>,
) -> String {
    match result {
        FetchResult::Idle => "Nothing searched yet.".to_string(),
        FetchResult::Pending { requested } => render_loading(requested, None),
        FetchResult::Failure(failure) => {
            format!("Error loading images. Please try again. ({})", failure.message)
        }
        FetchResult::Success { items, .. } if items.is_empty() => {
            "No images found. Try a different search term.".to_string()
        }
        FetchResult::Success {
            items,
            total_matches,
        } => {
            let mut out = format!(
                "Found {total_matches} images for \"{}\" ({} per page)\n",
                state.effective_query(),
                state.page_size.get()
            );
            for item in items {
                let _ = writeln!(out, "{}", grid_line(item));
            }
            if let Some(pages) = total_pages {
                let _ = write!(out, "page {} of {pages}", state.page);
            }
            out
        }
    }
}

/// Loading line, mentioning the page that stays visible until the new one lands.
pub fn render_loading(requested: &SearchState, retained: Option<&RetainedPage>) -> String {
    let mut out = format!(
        "Loading images for \"{}\" (page {})...",
        requested.effective_query(),
        requested.page
    );
    if let Some(page) = retained {
        let _ = write!(
            out,
            " still showing {} of {} earlier matches",
            page.items.len(),
            page.total_matches
        );
    }
    out
}

fn grid_line(item: &ImageRecord) -> String {
    format!(
        "  #{:<10} by {:<16} {:>6} likes {:>8} views  {}",
        item.id,
        item.user,
        item.likes,
        item.views,
        item.headline_tags(GRID_TAGS)
    )
}

pub fn render_preview(item: &ImageRecord) -> String {
    format!(
        "image #{id} by {user}\n  {likes} likes, {views} views, {downloads} downloads\n  tags: {tags}\n  full size: {large}\n  thumbnail: {thumb}",
        id = item.id,
        user = item.user,
        likes = item.likes,
        views = item.views,
        downloads = item.downloads,
        tags = item.tag_list().join(" | "),
        large = item.large_image_url,
        thumb = item.thumbnail_url,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{
        domain::{ImageId, PageSize},
        error::{FetchFailure, SearchError},
    };

    fn item() -> ImageRecord {
        ImageRecord {
            id: ImageId(42),
            thumbnail_url: "https://cdn.example/42_640.jpg".into(),
            large_image_url: "https://cdn.example/42_1280.jpg".into(),
            preview_url: None,
            tags: "cat, pet, animal, whiskers".into(),
            user: "mia".into(),
            views: 1200,
            downloads: 300,
            likes: 17,
        }
    }

    #[test]
    fn empty_success_is_distinct_from_failure() {
        let state = SearchState::new("qq", PageSize::Twenty);
        let empty = render_result(
            &FetchResult::Success {
                items: Vec::new(),
                total_matches: 0,
            },
            &state,
            Some(0),
        );
        let failed = render_result(
            &FetchResult::Failure(FetchFailure::from(SearchError::Status { status: 500 })),
            &state,
            None,
        );
        assert!(empty.starts_with("No images found"));
        assert!(failed.starts_with("Error loading images"));
    }

    #[test]
    fn success_lists_items_with_first_three_tags() {
        let state = SearchState::new("cats", PageSize::Twelve);
        let out = render_result(
            &FetchResult::Success {
                items: vec![item()],
                total_matches: 90,
            },
            &state,
            Some(8),
        );
        assert!(out.contains("Found 90 images"));
        assert!(out.contains("cat, pet, animal"));
        assert!(!out.contains("whiskers"));
        assert!(out.ends_with("page 1 of 8"));
    }

    #[test]
    fn loading_mentions_the_retained_page() {
        let mut requested = SearchState::new("cats", PageSize::Twenty);
        requested.page = 2;
        let retained = RetainedPage {
            items: vec![item()],
            total_matches: 90,
        };
        assert_eq!(
            render_loading(&requested, Some(&retained)),
            "Loading images for \"cats\" (page 2)... still showing 1 of 90 earlier matches"
        );
        assert_eq!(
            render_loading(&requested, None),
            "Loading images for \"cats\" (page 2)..."
        );
    }

    #[test]
    fn preview_shows_every_tag_and_counts() {
        let out = render_preview(&item());
        assert!(out.contains("cat | pet | animal | whiskers"));
        assert!(out.contains("300 downloads"));
    }
}
