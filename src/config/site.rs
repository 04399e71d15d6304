//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub posts_dir: String,
    pub site_dir: String,
    /// Index file name inside the posts directory
    pub index_file: String,

    // Writing
    pub new_post_name: String,
    pub render_drafts: bool,

    // Reading time
    /// Units (Latin words + CJK ideographs) counted per minute
    pub words_per_minute: u32,

    // Appearance
    /// Default UI theme when the reader has no stored preference
    pub default_theme: String,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Inkpress".to_string(),
            subtitle: String::new(),
            description: String::new(),
            author: "John Doe".to_string(),
            language: "en".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            posts_dir: "posts".to_string(),
            site_dir: "site".to_string(),
            index_file: "index.json".to_string(),

            new_post_name: ":title.md".to_string(),
            render_drafts: false,

            words_per_minute: 300,

            default_theme: "light".to_string(),
            highlight: HighlightConfig::default(),

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

/// Syntax highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Whether to highlight fenced code blocks at all
    pub enable: bool,
    /// Syntect theme name
    pub theme: String,
    /// Render a line-number gutter next to code blocks
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SiteConfig::default();
        assert_eq!(config.words_per_minute, 300);
        assert_eq!(config.posts_dir, "posts");
        assert_eq!(config.default_theme, "light");
    }

    #[test]
    fn test_partial_yaml() {
        let config: SiteConfig =
            serde_yaml::from_str("title: My Blog\nwords_per_minute: 250\n").unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.words_per_minute, 250);
        // Everything else falls back to defaults
        assert_eq!(config.index_file, "index.json");
    }

    #[test]
    fn test_load_missing_file_is_error() {
        assert!(SiteConfig::load(Path::new("/nonexistent/_config.yml")).is_err());
    }
}
