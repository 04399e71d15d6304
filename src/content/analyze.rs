//! Reading analysis - word count and estimated reading time
//!
//! The estimate follows the usual convention for mixed Latin/CJK text:
//! a contiguous run of Latin letters is one word, every CJK ideograph is
//! one unit on its own.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

/// Default counting speed, units per minute
pub const DEFAULT_WORDS_PER_MINUTE: u32 = 300;

lazy_static! {
    /// Fenced code blocks (``` or ~~~), including the fence lines
    static ref FENCED_CODE: Regex = Regex::new(r"(?s)(```|~~~).*?(```|~~~)").unwrap();
    /// Inline code spans
    static ref INLINE_CODE: Regex = Regex::new(r"`[^`\n]*`").unwrap();
    /// Image syntax, dropped entirely
    static ref IMAGE: Regex = Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap();
    /// Link syntax, keeping the link text
    static ref LINK: Regex = Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap();
    /// Residual Markdown punctuation
    static ref MARKUP: Regex = Regex::new(r"[#>*_~\-=+|\[\]()!]").unwrap();
    /// Whitespace runs
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Derived reading metadata for one post body
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ReadingStats {
    /// Latin word runs plus CJK ideographs
    pub word_count: u32,
    /// `ceil(word_count / wpm)`, 0 only for an empty body
    pub reading_minutes: u32,
}

/// Analyze a Markdown body at the default speed
pub fn analyze(markdown: &str) -> ReadingStats {
    analyze_with_speed(markdown, DEFAULT_WORDS_PER_MINUTE)
}

/// Analyze a Markdown body at a configured speed
pub fn analyze_with_speed(markdown: &str, words_per_minute: u32) -> ReadingStats {
    let text = strip_markdown(markdown);
    let word_count = count_units(&text);

    let wpm = words_per_minute.max(1);
    let reading_minutes = if word_count == 0 {
        0
    } else {
        // ceil(word_count / wpm), at least 1
        (word_count + wpm - 1) / wpm
    };

    ReadingStats {
        word_count,
        reading_minutes,
    }
}

/// Strip Markdown down to countable prose
///
/// Order matters: code first (so its punctuation never survives into the
/// prose), then images before links (image syntax embeds link syntax).
pub(crate) fn strip_markdown(markdown: &str) -> String {
    let text = FENCED_CODE.replace_all(markdown, " ");
    let text = INLINE_CODE.replace_all(&text, " ");
    let text = IMAGE.replace_all(&text, " ");
    let text = LINK.replace_all(&text, "$1");
    let text = MARKUP.replace_all(&text, " ");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Count Latin word runs and CJK ideographs
fn count_units(text: &str) -> u32 {
    let mut count: u32 = 0;
    let mut in_word = false;

    for c in text.chars() {
        if is_cjk(c) {
            // Each ideograph stands alone; it also terminates any open run
            count += 1;
            in_word = false;
        } else if c.is_alphanumeric() {
            if !in_word {
                count += 1;
                in_word = true;
            }
        } else {
            in_word = false;
        }
    }

    count
}

/// CJK unified ideographs, extension A, and compatibility ideographs
fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{20000}'..='\u{2A6DF}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body() {
        let stats = analyze("");
        assert_eq!(stats.word_count, 0);
        assert_eq!(stats.reading_minutes, 0);
    }

    #[test]
    fn test_two_latin_words() {
        let stats = analyze("Hello world");
        assert_eq!(stats.word_count, 2);
        assert_eq!(stats.reading_minutes, 1);
    }

    #[test]
    fn test_cjk_counts_per_ideograph() {
        let stats = analyze("你好世界");
        assert_eq!(stats.word_count, 4);
        assert_eq!(stats.reading_minutes, 1);
    }

    #[test]
    fn test_mixed_latin_and_cjk() {
        // 2 words + 2 ideographs
        let stats = analyze("Rust 很棒 indeed");
        assert_eq!(stats.word_count, 4);
    }

    #[test]
    fn test_reading_time_boundaries() {
        let nine_hundred = "word ".repeat(900);
        assert_eq!(analyze(&nine_hundred).reading_minutes, 3);

        let nine_oh_one = "word ".repeat(901);
        assert_eq!(analyze(&nine_oh_one).reading_minutes, 4);
    }

    #[test]
    fn test_code_blocks_not_counted() {
        let body = "intro\n\n```rust\nfn main() { println!(\"hidden words here\"); }\n```\n\noutro";
        let stats = analyze(body);
        assert_eq!(stats.word_count, 2);
    }

    #[test]
    fn test_inline_code_not_counted() {
        assert_eq!(analyze("run `cargo build today` now").word_count, 2);
    }

    #[test]
    fn test_images_dropped_links_keep_text() {
        assert_eq!(analyze("![alt words](img.png) see [the docs](https://example.com)").word_count, 3);
    }

    #[test]
    fn test_markdown_punctuation_stripped() {
        assert_eq!(analyze("## Heading\n\n- item one\n- item two\n").word_count, 5);
    }

    #[test]
    fn test_custom_speed() {
        let body = "word ".repeat(500);
        assert_eq!(analyze_with_speed(&body, 250).reading_minutes, 2);
    }
}
