//! Filter/sort/search engine over the loaded post index
//!
//! Pure functions of their inputs: the source list is never mutated,
//! every query produces a fresh ordered copy.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use crate::content::PostSummary;

/// Tag filter: everything, or posts carrying one exact tag
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TagFilter {
    #[default]
    All,
    Tag(String),
}

impl TagFilter {
    /// Parse the wire value, where "all" (or empty) means no filter
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            None | Some("") | Some("all") => TagFilter::All,
            Some(tag) => TagFilter::Tag(tag.to_string()),
        }
    }
}

/// Sort order applied after filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    DateDesc,
    DateAsc,
    TitleAsc,
    TitleDesc,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date-desc" => Ok(SortKey::DateDesc),
            "date-asc" => Ok(SortKey::DateAsc),
            "title-asc" => Ok(SortKey::TitleAsc),
            "title-desc" => Ok(SortKey::TitleDesc),
            other => Err(format!("unknown sort key: {}", other)),
        }
    }
}

/// The ephemeral query state of the listing view
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    pub selected_tag: TagFilter,
    pub search_query: String,
    pub sort_key: SortKey,
}

/// Apply tag filter, search filter, and sort to the post list
///
/// Filters are conjunctive. Sorting is stable, so posts that compare equal
/// keep their original relative order. An empty result is valid and simply
/// comes back as an empty vector.
pub fn apply(posts: &[PostSummary], state: &FilterState) -> Vec<PostSummary> {
    let query = state.search_query.trim().to_lowercase();

    let mut result: Vec<PostSummary> = posts
        .iter()
        .filter(|post| match &state.selected_tag {
            TagFilter::All => true,
            TagFilter::Tag(tag) => post.has_tag(tag),
        })
        .filter(|post| query.is_empty() || matches_query(post, &query))
        .cloned()
        .collect();

    sort_posts(&mut result, state.sort_key);
    result
}

/// Case-folded substring match over title, excerpt, and tags
///
/// `query` must already be trimmed and lower-cased. Also used by the
/// search endpoint so server-side search mirrors the listing predicate.
pub fn matches_query(post: &PostSummary, query: &str) -> bool {
    post.title.to_lowercase().contains(query)
        || post.excerpt.to_lowercase().contains(query)
        || post.tags.iter().any(|t| t.to_lowercase().contains(query))
}

/// Stable in-place sort by the given key
pub fn sort_posts(posts: &mut [PostSummary], key: SortKey) {
    match key {
        SortKey::DateDesc => posts.sort_by(|a, b| compare_dates(b, a)),
        SortKey::DateAsc => posts.sort_by(compare_dates),
        SortKey::TitleAsc => posts.sort_by(compare_titles),
        SortKey::TitleDesc => posts.sort_by(|a, b| compare_titles(b, a)),
    }
}

/// Date comparison; an unparseable date orders before every valid one
fn compare_dates(a: &PostSummary, b: &PostSummary) -> Ordering {
    a.parsed_date().cmp(&b.parsed_date())
}

/// Case-folded title comparison with the raw title as tiebreak
fn compare_titles(a: &PostSummary, b: &PostSummary) -> Ordering {
    a.title
        .to_lowercase()
        .cmp(&b.title.to_lowercase())
        .then_with(|| a.title.cmp(&b.title))
}
