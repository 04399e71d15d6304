//! Post summary model and the loaded index

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::BlogError;

/// One entry of the post index
///
/// Summaries are loaded wholesale and never mutated; filtering and sorting
/// always operate on copies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostSummary {
    /// Unique stable identifier
    pub id: String,

    /// Display title
    pub title: String,

    /// ISO-parseable publication date, kept as the raw string
    pub date: String,

    /// Short display string for listings
    #[serde(default)]
    pub excerpt: String,

    /// Tags in display order, case-sensitive, may be empty
    #[serde(default)]
    pub tags: Vec<String>,

    /// Markdown body path, relative to the posts directory
    pub file: String,
}

impl PostSummary {
    /// Parse the publication date, if it parses at all
    pub fn parsed_date(&self) -> Option<NaiveDateTime> {
        parse_date(&self.date)
    }

    /// Exact-match tag membership test
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Parse the date formats an index entry may carry
///
/// Accepted, in order: RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD`
/// (midnight). Anything else is `None`.
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// The loaded post index: all summaries plus the ordered tag set
#[derive(Debug, Clone, Serialize, Default)]
pub struct PostIndex {
    pub posts: Vec<PostSummary>,
    /// All tags in first-seen order
    pub tags: Vec<String>,
}

impl PostIndex {
    /// Build an index from summaries, validating id uniqueness
    ///
    /// When the wire format carried an explicit tag list it is kept as-is,
    /// otherwise tags are collected from the posts in first-seen order.
    pub fn new(posts: Vec<PostSummary>, tags: Option<Vec<String>>) -> Result<Self, BlogError> {
        let mut seen: IndexSet<&str> = IndexSet::with_capacity(posts.len());
        for post in &posts {
            if !seen.insert(post.id.as_str()) {
                return Err(BlogError::DuplicateId(post.id.clone()));
            }
        }

        let tags = tags.unwrap_or_else(|| collect_tags(&posts));
        Ok(Self { posts, tags })
    }

    /// Resolve a summary by id
    pub fn find(&self, id: &str) -> Result<&PostSummary, BlogError> {
        self.posts
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| BlogError::NotFound(id.to_string()))
    }

    /// Previous and next post ids relative to the given id, in index order
    ///
    /// The index is ordered newest-first, so "previous" is the newer
    /// neighbour. Used by the detail view for keyboard navigation.
    pub fn neighbors(&self, id: &str) -> (Option<&str>, Option<&str>) {
        let Some(pos) = self.posts.iter().position(|p| p.id == id) else {
            return (None, None);
        };
        let prev = pos.checked_sub(1).map(|i| self.posts[i].id.as_str());
        let next = self.posts.get(pos + 1).map(|p| p.id.as_str());
        (prev, next)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

/// Collect every tag in first-seen order
fn collect_tags(posts: &[PostSummary]) -> Vec<String> {
    let mut tags: IndexSet<&str> = IndexSet::new();
    for post in posts {
        for tag in &post.tags {
            tags.insert(tag.as_str());
        }
    }
    tags.into_iter().map(|t| t.to_string()).collect()
}

#[cfg(test)]
pub(crate) fn sample(id: &str, title: &str, date: &str, tags: &[&str]) -> PostSummary {
    PostSummary {
        id: id.to_string(),
        title: title.to_string(),
        date: date.to_string(),
        excerpt: format!("{} excerpt", title),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        file: format!("{}.md", id),
    }
}
