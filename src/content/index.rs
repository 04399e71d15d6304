//! Index loader - reads the post index and post bodies from the posts directory

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::{PostIndex, PostSummary};
use crate::error::BlogError;

/// Both wire shapes the index endpoint may serve: a bare array of
/// summaries, or a `{posts, tags}` object.
#[derive(Deserialize)]
#[serde(untagged)]
enum IndexWire {
    Object {
        posts: Vec<PostSummary>,
        #[serde(default)]
        tags: Option<Vec<String>>,
    },
    Array(Vec<PostSummary>),
}

/// Loads the post index and individual post bodies
pub struct IndexLoader {
    posts_dir: PathBuf,
    index_file: String,
}

impl IndexLoader {
    /// Create a loader rooted at the posts directory
    pub fn new<P: AsRef<Path>>(posts_dir: P, index_file: &str) -> Self {
        Self {
            posts_dir: posts_dir.as_ref().to_path_buf(),
            index_file: index_file.to_string(),
        }
    }

    /// Path of the index file
    pub fn index_path(&self) -> PathBuf {
        self.posts_dir.join(&self.index_file)
    }

    /// Load and validate the whole index
    pub fn load(&self) -> Result<PostIndex, BlogError> {
        let path = self.index_path();
        let content = fs::read_to_string(&path).map_err(|source| BlogError::Fetch {
            path: path.clone(),
            source,
        })?;

        let wire: IndexWire =
            serde_json::from_str(&content).map_err(|source| BlogError::Parse { path, source })?;

        match wire {
            IndexWire::Object { posts, tags } => PostIndex::new(posts, tags),
            IndexWire::Array(posts) => PostIndex::new(posts, None),
        }
    }

    /// Read the raw Markdown body of a post
    pub fn load_body(&self, post: &PostSummary) -> Result<String, BlogError> {
        let path = self.posts_dir.join(&post.file);
        fs::read_to_string(&path).map_err(|source| BlogError::Fetch { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_index(dir: &Path, content: &str) {
        let mut file = fs::File::create(dir.join("index.json")).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_load_array_shape() {
        let dir = tempfile::tempdir().unwrap();
        write_index(
            dir.path(),
            r#"[{"id":"hello","title":"Hello","date":"2024-01-15","excerpt":"hi","tags":["intro"],"file":"hello.md"}]"#,
        );

        let loader = IndexLoader::new(dir.path(), "index.json");
        let index = loader.load().unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.tags, vec!["intro"]);
    }

    #[test]
    fn test_load_object_shape() {
        let dir = tempfile::tempdir().unwrap();
        write_index(
            dir.path(),
            r#"{"posts":[{"id":"a","title":"A","date":"2024-01-15","file":"a.md"}],"tags":["misc"]}"#,
        );

        let loader = IndexLoader::new(dir.path(), "index.json");
        let index = loader.load().unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.tags, vec!["misc"]);
    }

    #[test]
    fn test_missing_index_is_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = IndexLoader::new(dir.path(), "index.json");
        let err = loader.load().unwrap_err();
        assert!(matches!(err, BlogError::Fetch { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_garbage_index_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write_index(dir.path(), "not json at all");
        let loader = IndexLoader::new(dir.path(), "index.json");
        assert!(matches!(loader.load(), Err(BlogError::Parse { .. })));
    }

    #[test]
    fn test_duplicate_ids_rejected_at_load() {
        let dir = tempfile::tempdir().unwrap();
        write_index(
            dir.path(),
            r#"[{"id":"x","title":"One","date":"2024-01-01","file":"x.md"},
               {"id":"x","title":"Two","date":"2024-01-02","file":"y.md"}]"#,
        );
        let loader = IndexLoader::new(dir.path(), "index.json");
        assert!(matches!(loader.load(), Err(BlogError::DuplicateId(_))));
    }

    #[test]
    fn test_load_body() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hello.md"), "# Hello\n\nBody.").unwrap();
        write_index(
            dir.path(),
            r#"[{"id":"hello","title":"Hello","date":"2024-01-15","file":"hello.md"}]"#,
        );

        let loader = IndexLoader::new(dir.path(), "index.json");
        let index = loader.load().unwrap();
        let body = loader.load_body(&index.posts[0]).unwrap();
        assert!(body.contains("# Hello"));
    }
}
