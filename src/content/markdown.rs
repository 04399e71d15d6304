//! Markdown rendering with syntax highlighting and heading anchors

use anyhow::Result;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::Serialize;
use std::collections::HashMap;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::HighlightConfig;

/// One table-of-contents entry, in document order
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TocEntry {
    /// Plain heading text, inline markup stripped
    pub text: String,
    /// Anchor id injected into the rendered heading element
    pub anchor: String,
    /// Heading level, 2 or 3
    pub level: u8,
}

/// The result of rendering one post body
#[derive(Debug, Clone, Serialize)]
pub struct Rendered {
    pub html: String,
    pub toc: Vec<TocEntry>,
}

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    config: HighlightConfig,
}

impl MarkdownRenderer {
    /// Create a renderer with the given highlight settings
    pub fn new(config: HighlightConfig) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            config,
        }
    }

    /// Render markdown to HTML, collecting the table of contents
    ///
    /// Level 2 and 3 headings get a stable unique anchor id: the explicit id
    /// from heading attributes when present, the slugified text otherwise,
    /// with `-2`/`-3`... suffixes on collision either way. Other heading
    /// levels pass through as-is.
    pub fn render(&self, markdown: &str) -> Result<Rendered> {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM;

        let mut events: Vec<Event> = Vec::new();
        let mut toc: Vec<TocEntry> = Vec::new();
        let mut anchors: HashMap<String, usize> = HashMap::new();

        // Fenced/indented code block state
        let mut in_code_block = false;
        let mut code_lang: Option<String> = None;
        let mut code_content = String::new();

        // Buffered inline events of the h2/h3 currently open
        let mut heading: Option<(u8, Option<String>, Vec<Event>)> = None;

        for event in Parser::new_ext(markdown, options) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code_block = true;
                    code_lang = match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                        _ => None,
                    };
                    code_content.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    in_code_block = false;
                    let highlighted =
                        self.highlight_code(&code_content, code_lang.take().as_deref());
                    events.push(Event::Html(CowStr::from(highlighted)));
                }
                Event::Text(text) if in_code_block => {
                    code_content.push_str(&text);
                }
                Event::Start(Tag::Heading { level, id, .. })
                    if matches!(level, HeadingLevel::H2 | HeadingLevel::H3) =>
                {
                    heading = Some((level as u8, id.map(|s| s.to_string()), Vec::new()));
                }
                Event::End(TagEnd::Heading(_)) if heading.is_some() => {
                    let (level, explicit_id, inner) =
                        heading.take().unwrap_or((2, None, Vec::new()));
                    let text = plain_text(&inner);
                    let anchor = match explicit_id {
                        Some(id) => dedup_anchor(&mut anchors, id),
                        None => unique_anchor(&mut anchors, &text),
                    };

                    toc.push(TocEntry {
                        text,
                        anchor: anchor.clone(),
                        level,
                    });

                    events.push(Event::Html(CowStr::from(format!(
                        r#"<h{} id="{}">"#,
                        level, anchor
                    ))));
                    events.extend(inner);
                    events.push(Event::Html(CowStr::from(format!("</h{}>", level))));
                }
                other => {
                    if let Some((_, _, inner)) = heading.as_mut() {
                        inner.push(other);
                    } else {
                        events.push(other);
                    }
                }
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(Rendered {
            html: html_output,
            toc,
        })
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        if !self.config.enable {
            return plain_code_block(code, lang);
        }

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.config.theme)
            .unwrap_or_else(|| {
                self.theme_set
                    .themes
                    .values()
                    .next()
                    .expect("No themes available")
            });

        match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
            Ok(highlighted) => {
                if self.config.line_number {
                    add_line_numbers(&highlighted, lang)
                } else {
                    format!(
                        r#"<div class="highlight language-{}">{}</div>"#,
                        lang, highlighted
                    )
                }
            }
            Err(_) => plain_code_block(code, lang),
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(HighlightConfig::default())
    }
}

/// Escaped fallback when highlighting is disabled or fails
fn plain_code_block(code: &str, lang: &str) -> String {
    format!(
        r#"<pre><code class="language-{}">{}</code></pre>"#,
        lang,
        html_escape(code)
    )
}

/// Add a line-number gutter to highlighted code
fn add_line_numbers(code: &str, lang: &str) -> String {
    let lines: Vec<&str> = code.lines().collect();
    let line_count = lines.len();

    let mut gutter = String::new();
    let mut code_lines = String::new();

    for (i, line) in lines.iter().enumerate() {
        gutter.push_str(&format!(r#"<span class="line-number">{}</span>"#, i + 1));
        code_lines.push_str(line);
        if i < line_count - 1 {
            gutter.push('\n');
            code_lines.push('\n');
        }
    }

    format!(
        r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code"><pre>{}</pre></td></tr></table></figure>"#,
        lang, gutter, code_lines
    )
}

/// Concatenate the visible text of buffered inline events
fn plain_text(events: &[Event]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text.trim().to_string()
}

/// Slugify heading text into an anchor id unique within the document
fn unique_anchor(anchors: &mut HashMap<String, usize>, text: &str) -> String {
    let slug = slug::slugify(text);
    let base = if slug.is_empty() {
        "section".to_string()
    } else {
        slug
    };
    dedup_anchor(anchors, base)
}

/// Suffix a candidate anchor until it is unique within the document
fn dedup_anchor(anchors: &mut HashMap<String, usize>, base: String) -> String {
    let count = anchors.entry(base.clone()).or_insert(0);
    *count += 1;
    if *count == 1 {
        base
    } else {
        format!("{}-{}", base, count)
    }
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::default();
        let out = renderer.render("# Hello World\n\nThis is a test.").unwrap();
        assert!(out.html.contains("<h1>Hello World</h1>"));
        assert!(out.html.contains("<p>This is a test.</p>"));
        // h1 headings do not enter the TOC
        assert!(out.toc.is_empty());
    }

    #[test]
    fn test_toc_collects_h2_and_h3_only() {
        let renderer = MarkdownRenderer::default();
        let out = renderer
            .render("# Title\n\n## Setup\n\n### Details\n\n#### Fine print\n")
            .unwrap();

        let levels: Vec<u8> = out.toc.iter().map(|e| e.level).collect();
        assert_eq!(levels, vec![2, 3]);
        assert_eq!(out.toc[0].anchor, "setup");
        assert_eq!(out.toc[1].anchor, "details");
        assert!(out.html.contains(r#"<h2 id="setup">"#));
        assert!(out.html.contains(r#"<h3 id="details">"#));
    }

    #[test]
    fn test_duplicate_headings_get_unique_anchors() {
        let renderer = MarkdownRenderer::default();
        let out = renderer
            .render("## Notes\n\n## Notes\n\n## Notes\n")
            .unwrap();
        let anchors: Vec<&str> = out.toc.iter().map(|e| e.anchor.as_str()).collect();
        assert_eq!(anchors, vec!["notes", "notes-2", "notes-3"]);
    }

    #[test]
    fn test_explicit_heading_id_kept() {
        let renderer = MarkdownRenderer::default();
        let out = renderer.render("## Setup {#getting-started}\n").unwrap();
        assert_eq!(out.toc[0].anchor, "getting-started");
        assert!(out.html.contains(r#"<h2 id="getting-started">"#));
    }

    #[test]
    fn test_duplicate_explicit_ids_get_unique_anchors() {
        let renderer = MarkdownRenderer::default();
        let out = renderer
            .render("## One {#setup}\n\n## Two {#setup}\n\n## Setup\n")
            .unwrap();
        let anchors: Vec<&str> = out.toc.iter().map(|e| e.anchor.as_str()).collect();
        assert_eq!(anchors, vec!["setup", "setup-2", "setup-3"]);
        assert!(out.html.contains(r#"<h2 id="setup-2">"#));
    }

    #[test]
    fn test_heading_with_inline_code() {
        let renderer = MarkdownRenderer::default();
        let out = renderer.render("## Using `serde`\n").unwrap();
        assert_eq!(out.toc[0].text, "Using serde");
        assert!(out.html.contains("<code>serde</code>"));
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MarkdownRenderer::default();
        let out = renderer.render("```rust\nfn main() {}\n```").unwrap();
        assert!(out.html.contains("highlight"));
    }

    #[test]
    fn test_code_block_headings_not_in_toc() {
        let renderer = MarkdownRenderer::default();
        let out = renderer.render("```\n## not a heading\n```\n").unwrap();
        assert!(out.toc.is_empty());
    }
}
