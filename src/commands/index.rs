//! Build the post index from Markdown sources

use anyhow::Result;
use chrono::Local;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::content::analyze::strip_markdown;
use crate::content::{FrontMatter, PostIndex, PostSummary};
use crate::engine::{sort_posts, SortKey};
use crate::Inkpress;

/// Maximum length of a derived excerpt, in characters
const EXCERPT_LEN: usize = 160;

/// Scan the posts directory and write the index file
///
/// Every Markdown file becomes one index entry; its id is the slugified
/// file stem. Duplicate ids reject the whole build. Unpublished posts are
/// skipped unless `render_drafts` is set.
pub fn run(app: &Inkpress) -> Result<PostIndex> {
    let index = build(app)?;

    let index_path = app.posts_dir.join(&app.config.index_file);
    let content = serde_json::to_string_pretty(&index)?;
    fs::create_dir_all(&app.posts_dir)?;
    fs::write(&index_path, content)?;

    tracing::info!("Wrote {:?} with {} posts", index_path, index.len());
    Ok(index)
}

/// Build the index in memory without writing it
pub fn build(app: &Inkpress) -> Result<PostIndex> {
    let mut posts = Vec::new();

    if app.posts_dir.exists() {
        for entry in WalkDir::new(&app.posts_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !is_markdown_file(path) {
                continue;
            }

            match load_summary(app, path) {
                Ok(Some(summary)) => posts.push(summary),
                Ok(None) => tracing::debug!("Skipping unpublished post {:?}", path),
                Err(e) => tracing::warn!("Failed to load post {:?}: {}", path, e),
            }
        }
    }

    sort_posts(&mut posts, SortKey::DateDesc);
    let index = PostIndex::new(posts, None)?;
    Ok(index)
}

/// Read one source file into an index entry; `None` for unpublished drafts
fn load_summary(app: &Inkpress, path: &Path) -> Result<Option<PostSummary>> {
    let content = fs::read_to_string(path)?;
    let (fm, body) = FrontMatter::parse(&content);

    if !fm.published && !app.config.render_drafts {
        return Ok(None);
    }

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled");

    let title = fm.title.clone().unwrap_or_else(|| stem.to_string());
    let id = slug::slugify(stem);

    // Keep the front-matter date string when it parses; otherwise fall back
    // to the file modification time
    let date = match (&fm.date, fm.parsed_date()) {
        (Some(raw), Some(_)) => raw.clone(),
        _ => file_mtime_date(path),
    };

    let excerpt = fm
        .excerpt
        .clone()
        .unwrap_or_else(|| derive_excerpt(body));

    let file = path
        .strip_prefix(&app.posts_dir)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string();

    Ok(Some(PostSummary {
        id,
        title,
        date,
        excerpt,
        tags: fm.tags,
        file,
    }))
}

/// File modification time as an index date string, now as a last resort
fn file_mtime_date(path: &Path) -> String {
    let mtime = fs::metadata(path)
        .and_then(|m| m.modified())
        .map(chrono::DateTime::<Local>::from)
        .unwrap_or_else(|_| Local::now());
    mtime.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// First prose paragraph of the body, markup stripped and truncated
fn derive_excerpt(body: &str) -> String {
    let paragraph = body
        .split("\n\n")
        .map(str::trim)
        .find(|p| !p.is_empty() && !p.starts_with('#') && !p.starts_with("```"));

    let Some(paragraph) = paragraph else {
        return String::new();
    };

    let text = strip_markdown(paragraph);
    if text.chars().count() <= EXCERPT_LEN {
        text
    } else {
        let cut: String = text.chars().take(EXCERPT_LEN).collect();
        format!("{}…", cut.trim_end())
    }
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    fn app_in(dir: &Path) -> Inkpress {
        Inkpress::with_config(dir, SiteConfig::default())
    }

    fn write_post(dir: &Path, name: &str, content: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_build_from_sources() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_in(dir.path());
        write_post(
            &app.posts_dir,
            "hello-world.md",
            "---\ntitle: Hello World\ndate: 2024-01-15\ntags: [intro]\n---\n\nFirst paragraph here.\n\nSecond.",
        );
        write_post(
            &app.posts_dir,
            "older.md",
            "---\ntitle: Older\ndate: 2023-06-01\n---\n\nOld body.",
        );

        let index = build(&app).unwrap();
        assert_eq!(index.len(), 2);
        // Newest first
        assert_eq!(index.posts[0].id, "hello-world");
        assert_eq!(index.posts[0].excerpt, "First paragraph here.");
        assert_eq!(index.tags, vec!["intro"]);
    }

    #[test]
    fn test_drafts_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_in(dir.path());
        write_post(
            &app.posts_dir,
            "draft.md",
            "---\ntitle: Draft\npublished: false\n---\n\nNot yet.",
        );

        let index = build(&app).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_written_index_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_in(dir.path());
        write_post(
            &app.posts_dir,
            "one.md",
            "---\ntitle: One\ndate: 2024-02-02\n---\n\nBody.",
        );

        run(&app).unwrap();

        let loader = crate::content::IndexLoader::new(&app.posts_dir, &app.config.index_file);
        let index = loader.load().unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.posts[0].title, "One");
    }

    #[test]
    fn test_derive_excerpt_skips_headings_and_truncates() {
        let body = "# Title\n\nThe **quick** brown fox jumps over the lazy dog.";
        assert_eq!(
            derive_excerpt(body),
            "The quick brown fox jumps over the lazy dog."
        );

        let long = format!("# T\n\n{}", "word ".repeat(100));
        assert!(derive_excerpt(&long).ends_with('…'));
    }
}
