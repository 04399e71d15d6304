//! Content module - post index, Markdown rendering, and reading analysis

pub mod analyze;
mod frontmatter;
pub mod index;
mod markdown;
pub(crate) mod post;

pub use frontmatter::FrontMatter;
pub use index::IndexLoader;
pub use markdown::{MarkdownRenderer, Rendered, TocEntry};
pub use post::{parse_date, PostIndex, PostSummary};
