//! Markdown → HTML.
//!
//! Runs `pulldown_cmark` and rewrites three kinds of events before handing
//! them to its HTML writer:
//!
//! - raw HTML (block and inline) becomes plain text, so it is escaped
//! - links open in a new tab with `rel="noopener noreferrer"`
//! - fenced and indented code blocks carry a `language-<lang>` class
//!
//! Everything else uses the stock writer, which escapes text content.

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, html};
use pulldown_cmark_escape::{escape_href, escape_html};

pub const LINK_CLASS: &str = "text-blue-400 hover:underline";
pub const CODE_CLASS: &str = "p-2 rounded-md block bg-gray-900/50 my-2 overflow-x-auto";
pub const DEFAULT_CODE_LANGUAGE: &str = "plaintext";

/// URL schemes that can run script when clicked.
const BLOCKED_SCHEMES: [&str; 3] = ["javascript:", "vbscript:", "data:"];

/// Parse markdown `content` into an HTML fragment safe to inject as markup.
pub fn to_html(content: &str) -> String {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts.insert(Options::ENABLE_TABLES);

    let mut rewriter = Rewriter::default();
    let events = Parser::new_ext(content, opts).map(|event| rewriter.rewrite(event));
    let mut out = String::with_capacity(content.len() + content.len() / 2);
    html::push_html(&mut out, events);
    out
}

#[derive(Default)]
struct Rewriter {
    /// Open images. Their alt text is written as plain text, so nested links
    /// pass through untouched.
    image_depth: usize,
}

impl Rewriter {
    fn rewrite<'a>(&mut self, event: Event<'a>) -> Event<'a> {
        match event {
            Event::Start(Tag::Image { .. }) => {
                self.image_depth += 1;
                event
            }
            Event::End(TagEnd::Image) => {
                self.image_depth = self.image_depth.saturating_sub(1);
                event
            }
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            Event::Start(Tag::Link { .. }) | Event::End(TagEnd::Link) if self.image_depth > 0 => {
                event
            }
            Event::Start(Tag::Link {
                dest_url, title, ..
            }) => Event::Html(CowStr::from(open_link(&dest_url, &title))),
            Event::End(TagEnd::Link) => Event::Html(CowStr::Borrowed("</a>")),
            Event::Start(Tag::CodeBlock(kind)) => {
                Event::Html(CowStr::from(open_code_block(&kind)))
            }
            Event::End(TagEnd::CodeBlock) => Event::Html(CowStr::Borrowed("</code></pre>\n")),
            other => other,
        }
    }
}

fn open_link(dest_url: &str, title: &str) -> String {
    let title_attr = if title.is_empty() {
        String::new()
    } else {
        format!(r#" title="{}""#, escaped(title))
    };
    format!(
        r#"<a href="{}"{} target="_blank" rel="noopener noreferrer" class="{}">"#,
        escaped_href(safe_href(dest_url)),
        title_attr,
        LINK_CLASS
    )
}

fn open_code_block(kind: &CodeBlockKind<'_>) -> String {
    format!(
        r#"<pre><code class="language-{} {}">"#,
        code_language(kind),
        CODE_CLASS
    )
}

/// Language token from a fence's info string, limited to characters that are
/// safe inside a class attribute. Falls back to `plaintext`.
pub fn code_language(kind: &CodeBlockKind<'_>) -> String {
    let info = match kind {
        CodeBlockKind::Fenced(info) => info.as_ref(),
        CodeBlockKind::Indented => "",
    };
    let lang: String = info
        .split_whitespace()
        .next()
        .unwrap_or("")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '#' | '.'))
        .collect();
    if lang.is_empty() {
        DEFAULT_CODE_LANGUAGE.to_string()
    } else {
        lang
    }
}

/// Replaces script-capable destinations with `#`.
fn safe_href(url: &str) -> &str {
    let normalized: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    if BLOCKED_SCHEMES.iter().any(|s| normalized.starts_with(s)) {
        "#"
    } else {
        url
    }
}

/// HTML-escapes `text` for element content and double-quoted attributes.
pub fn escaped(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String never fails.
    let _ = escape_html(&mut out, text);
    out
}

/// Escapes and percent-encodes a URL for an `href` attribute.
fn escaped_href(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    let _ = escape_href(&mut out, url);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_opens_in_new_tab() {
        let html = to_html("[x](http://e.com)");
        assert!(html.contains(r#"<a href="http://e.com""#), "{html}");
        assert!(html.contains(r#"target="_blank""#));
        assert!(html.contains(r#"rel="noopener noreferrer""#));
        assert!(html.contains(LINK_CLASS));
        assert!(html.contains(">x</a>"));
    }

    #[test]
    fn link_title_is_escaped() {
        let html = to_html(r#"[x](http://e.com "say \"hi\"")"#);
        assert!(html.contains(r#"title="say &quot;hi&quot;""#), "{html}");
    }

    #[test]
    fn autolink_gets_same_treatment() {
        let html = to_html("<https://example.org>");
        assert!(html.contains(r#"href="https://example.org""#), "{html}");
        assert!(html.contains(r#"target="_blank""#));
    }

    #[test]
    fn javascript_links_are_neutralized() {
        let html = to_html("[click](javascript:alert(1))");
        assert!(html.contains(r##"href="#""##), "{html}");
        assert!(!html.contains("javascript:"));
    }

    #[test]
    fn fenced_code_carries_language_class() {
        let html = to_html("```python\nprint('hi')\n```");
        assert!(html.contains(r#"<pre><code class="language-python "#), "{html}");
        assert!(html.contains("</code></pre>"));
        assert!(html.contains("print(&#39;hi&#39;)") || html.contains("print('hi')"));
    }

    #[test]
    fn unlabeled_fence_is_plaintext() {
        let html = to_html("```\nplain\n```");
        assert!(html.contains(r#"class="language-plaintext "#), "{html}");
    }

    #[test]
    fn indented_code_is_plaintext() {
        let html = to_html("para\n\n    indented code\n");
        assert!(html.contains("language-plaintext"), "{html}");
        assert!(html.contains("indented code"));
    }

    #[test]
    fn fence_info_extra_words_and_unsafe_chars_dropped() {
        let html = to_html("```rust\" onmouseover=x extra\nfn main() {}\n```");
        assert!(html.contains(r#"class="language-rust "#), "{html}");
        assert!(!html.contains("onmouseover"));
    }

    #[test]
    fn code_block_content_is_escaped() {
        let html = to_html("```html\n<b>bold</b>\n```");
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"), "{html}");
    }

    #[test]
    fn raw_block_html_is_escaped() {
        let html = to_html("<script>alert('x')</script>");
        assert!(!html.contains("<script>"), "{html}");
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn raw_inline_html_is_escaped() {
        let html = to_html("hello <img src=x onerror=alert(1)> world");
        assert!(!html.contains("<img"), "{html}");
        assert!(html.contains("&lt;img"));
    }

    #[test]
    fn prose_is_wrapped_in_paragraphs() {
        let html = to_html("Some **bold** text");
        assert_eq!(html.trim(), "<p>Some <strong>bold</strong> text</p>");
    }

    #[test]
    fn escaped_covers_attribute_characters() {
        assert_eq!(escaped(r#"<a href="x">&"#), "&lt;a href=&quot;x&quot;&gt;&amp;");
    }

    #[test]
    fn href_is_percent_encoded() {
        let html = to_html("[x](<http://e.com/a b?q=\"1\">)");
        assert!(html.contains(r#"href="http://e.com/a%20b?q=%221%22""#), "{html}");
    }

    #[test]
    fn link_inside_image_alt_stays_plain_text() {
        let html = to_html("![[a](b)](c.png)");
        assert!(html.contains(r#"alt="a""#), "{html}");
        assert!(!html.contains("&lt;a"), "{html}");
        assert!(!html.contains("target="), "{html}");
    }

    #[test]
    fn link_after_image_is_rewritten() {
        let html = to_html("![pic](c.png) [next](http://e.com)");
        assert!(html.contains(r#"<img src="c.png" alt="pic""#), "{html}");
        assert!(html.contains(r#"<a href="http://e.com" target="_blank""#), "{html}");
    }

    #[test]
    fn code_language_defaults() {
        assert_eq!(code_language(&CodeBlockKind::Indented), "plaintext");
        assert_eq!(code_language(&CodeBlockKind::Fenced("".into())), "plaintext");
        assert_eq!(code_language(&CodeBlockKind::Fenced("c++".into())), "c++");
    }
}
