//! Embedded reader assets
//!
//! The default front-end pages and scripts ship inside the binary so a bare
//! `inkpress serve` works without a site directory. Any file of the same
//! path in the site directory takes precedence (see the fallback handler).

/// Look up an embedded asset by request path
///
/// Returns `(content_type, body)`.
pub fn lookup(path: &str) -> Option<(&'static str, &'static str)> {
    let path = path.trim_start_matches('/');
    let asset = match path {
        "" | "index.html" => ("text/html; charset=utf-8", INDEX_HTML),
        "post.html" => ("text/html; charset=utf-8", POST_HTML),
        "archive.html" => ("text/html; charset=utf-8", ARCHIVE_HTML),
        "css/style.css" => ("text/css; charset=utf-8", STYLE_CSS),
        "js/app.js" => ("application/javascript; charset=utf-8", APP_JS),
        "js/post.js" => ("application/javascript; charset=utf-8", POST_JS),
        "js/archive.js" => ("application/javascript; charset=utf-8", ARCHIVE_JS),
        "js/theme.js" => ("application/javascript; charset=utf-8", THEME_JS),
        _ => return None,
    };
    Some(asset)
}

const INDEX_HTML: &str = include_str!("../../assets/index.html");
const POST_HTML: &str = include_str!("../../assets/post.html");
const ARCHIVE_HTML: &str = include_str!("../../assets/archive.html");
const STYLE_CSS: &str = include_str!("../../assets/css/style.css");
const APP_JS: &str = include_str!("../../assets/js/app.js");
const POST_JS: &str = include_str!("../../assets/js/post.js");
const ARCHIVE_JS: &str = include_str!("../../assets/js/archive.js");
const THEME_JS: &str = include_str!("../../assets/js/theme.js");
