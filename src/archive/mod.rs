//! Archive grouping - posts bucketed by calendar year and month

use chrono::Datelike;
use indexmap::IndexMap;
use serde::Serialize;

use crate::content::PostSummary;
use crate::engine::{sort_posts, SortKey};
use crate::error::BlogError;

/// All posts of one calendar month, newest first
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveGroup {
    pub year: i32,
    /// 1-12
    pub month: u32,
    pub posts: Vec<PostSummary>,
}

impl ArchiveGroup {
    /// Display label like "March 2024"
    pub fn label(&self) -> String {
        format!("{} {}", month_name(self.month), self.year)
    }
}

/// Group posts by `(year, month)` of their date, most recent month first
///
/// Posts inside a group are sorted date-descending (stable). A post whose
/// date does not parse rejects the whole batch with `InvalidDate` naming
/// the offending post; nothing is ever dropped silently.
pub fn group(posts: &[PostSummary]) -> Result<Vec<ArchiveGroup>, BlogError> {
    let mut groups: IndexMap<(i32, u32), Vec<PostSummary>> = IndexMap::new();

    for post in posts {
        let date = post.parsed_date().ok_or_else(|| BlogError::InvalidDate {
            id: post.id.clone(),
            date: post.date.clone(),
        })?;
        groups
            .entry((date.year(), date.month()))
            .or_default()
            .push(post.clone());
    }

    let mut result: Vec<ArchiveGroup> = groups
        .into_iter()
        .map(|((year, month), mut posts)| {
            sort_posts(&mut posts, SortKey::DateDesc);
            ArchiveGroup { year, month, posts }
        })
        .collect();

    result.sort_by(|a, b| (b.year, b.month).cmp(&(a.year, a.month)));
    Ok(result)
}

/// Convert a month number to its English name
pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::post::sample;

    #[test]
    fn test_groups_ordered_most_recent_first() {
        let posts = vec![
            sample("a", "A", "2023-12-05", &[]),
            sample("b", "B", "2024-02-10", &[]),
            sample("c", "C", "2024-02-01", &[]),
            sample("d", "D", "2024-03-01", &[]),
        ];

        let groups = group(&posts).unwrap();
        let keys: Vec<(i32, u32)> = groups.iter().map(|g| (g.year, g.month)).collect();
        assert_eq!(keys, vec![(2024, 3), (2024, 2), (2023, 12)]);

        // Inside a month: newest first
        let feb = &groups[1];
        assert_eq!(feb.posts[0].id, "b");
        assert_eq!(feb.posts[1].id, "c");
    }

    #[test]
    fn test_flatten_preserves_multiset() {
        let posts = vec![
            sample("a", "A", "2024-01-15", &[]),
            sample("b", "B", "2023-06-01", &[]),
            sample("c", "C", "2024-01-02", &[]),
        ];

        let groups = group(&posts).unwrap();
        let mut flattened: Vec<String> = groups
            .iter()
            .flat_map(|g| g.posts.iter().map(|p| p.id.clone()))
            .collect();
        flattened.sort();

        let mut expected: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();
        expected.sort();
        assert_eq!(flattened, expected);
    }

    #[test]
    fn test_invalid_date_rejects_batch() {
        let posts = vec![
            sample("good", "Good", "2024-01-15", &[]),
            sample("broken", "Broken", "not-a-date", &[]),
        ];

        match group(&posts) {
            Err(BlogError::InvalidDate { id, date }) => {
                assert_eq!(id, "broken");
                assert_eq!(date, "not-a-date");
            }
            other => panic!("expected InvalidDate, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(group(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_group_label() {
        let groups = group(&[sample("a", "A", "2024-03-01", &[])]).unwrap();
        assert_eq!(groups[0].label(), "March 2024");
    }
}
