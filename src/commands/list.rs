//! List blog content on the terminal

use anyhow::Result;
use indexmap::IndexMap;

use crate::archive;
use crate::content::IndexLoader;
use crate::Inkpress;

/// List index content by type
pub fn run(app: &Inkpress, content_type: &str) -> Result<()> {
    let loader = IndexLoader::new(&app.posts_dir, &app.config.index_file);
    let index = loader.load()?;

    match content_type {
        "post" | "posts" => {
            println!("Posts ({}):", index.len());
            for post in &index.posts {
                let tags = if post.tags.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", post.tags.join(", "))
                };
                println!("  {} - {}{}", post.date, post.title, tags);
            }
        }
        "tag" | "tags" => {
            let mut counts: IndexMap<&str, usize> = IndexMap::new();
            for post in &index.posts {
                for tag in &post.tags {
                    *counts.entry(tag.as_str()).or_insert(0) += 1;
                }
            }
            println!("Tags ({}):", counts.len());
            counts.sort_by(|_, a, _, b| b.cmp(a));
            for (tag, count) in counts {
                println!("  {} ({})", tag, count);
            }
        }
        "archive" => {
            let groups = archive::group(&index.posts)?;
            println!("Archive ({} months):", groups.len());
            for group in groups {
                println!("  {} ({})", group.label(), group.posts.len());
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, tag, archive",
                content_type
            );
        }
    }

    Ok(())
}
