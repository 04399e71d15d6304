//! Create a new post source file

use anyhow::Result;
use std::fs;

use crate::Inkpress;

/// Create a new post scaffold in the posts directory
pub fn run(app: &Inkpress, title: &str) -> Result<()> {
    let now = chrono::Local::now();

    fs::create_dir_all(&app.posts_dir)?;

    let slug = slug::slugify(title);
    let filename = app
        .config
        .new_post_name
        .replace(":title", &slug)
        .replace(":year", &now.format("%Y").to_string())
        .replace(":month", &now.format("%m").to_string())
        .replace(":day", &now.format("%d").to_string());

    let file_path = app.posts_dir.join(&filename);
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let content = format!(
        "---\ntitle: {}\ndate: {}\ntags: []\n---\n\n",
        title,
        now.format("%Y-%m-%d %H:%M:%S")
    );

    fs::write(&file_path, content)?;
    println!("Created: {:?}", file_path);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::FrontMatter;

    #[test]
    fn test_scaffold_created_with_front_matter() {
        let dir = tempfile::tempdir().unwrap();
        let app = Inkpress::with_config(dir.path(), SiteConfig::default());

        run(&app, "My First Post").unwrap();

        let path = app.posts_dir.join("my-first-post.md");
        let content = fs::read_to_string(&path).unwrap();
        let (fm, body) = FrontMatter::parse(&content);
        assert_eq!(fm.title.as_deref(), Some("My First Post"));
        assert!(fm.parsed_date().is_some());
        assert!(body.is_empty());
    }

    #[test]
    fn test_existing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let app = Inkpress::with_config(dir.path(), SiteConfig::default());

        run(&app, "Twice").unwrap();
        assert!(run(&app, "Twice").is_err());
    }
}
