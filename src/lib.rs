//! inkpress: a small Markdown blog engine
//!
//! This crate builds a JSON post index from Markdown sources and serves it,
//! together with rendered post bodies and a bundled reader front-end, over a
//! local HTTP API. Filtering, sorting, search, archive grouping, and reading
//! analysis live in pure library modules so they can be tested in isolation.

pub mod archive;
pub mod commands;
pub mod config;
pub mod content;
pub mod engine;
pub mod error;
pub mod server;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// The main application handle
#[derive(Clone)]
pub struct Inkpress {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Posts directory (Markdown sources plus the index file)
    pub posts_dir: PathBuf,
    /// Site directory for user overrides of the bundled assets
    pub site_dir: PathBuf,
}

impl Inkpress {
    /// Create an application handle from a directory
    ///
    /// Reads `_config.yml` when present, defaults otherwise.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create an application handle with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let posts_dir = base_dir.join(&config.posts_dir);
        let site_dir = base_dir.join(&config.site_dir);

        Self {
            config,
            base_dir,
            posts_dir,
            site_dir,
        }
    }

    /// Build and write the post index
    pub fn build_index(&self) -> Result<content::PostIndex> {
        commands::index::run(self)
    }

    /// Create a new post scaffold
    pub fn new_post(&self, title: &str) -> Result<()> {
        commands::new::run(self, title)
    }
}
