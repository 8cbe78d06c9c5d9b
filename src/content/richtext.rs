//! Structured rich text rendering
//!
//! The content API delivers post bodies as a flat list of block nodes
//! (`paragraph`, `heading2`, `list-item`, ...), each carrying its text and a
//! list of inline spans addressed by character offsets. This module renders
//! those nodes to plain text (for word counts) and to HTML (for post pages).

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

lazy_static! {
    static ref INLINE_TAG: Regex = Regex::new(r"</?[A-Za-z][^<>]*>").unwrap();
}

/// A block-level rich text node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextNode {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub spans: Vec<Span>,

    /// Image source
    #[serde(default)]
    pub url: Option<String>,

    /// Image alt text
    #[serde(default)]
    pub alt: Option<String>,

    /// Provider payload for `embed` nodes
    #[serde(default)]
    pub oembed: Option<Value>,
}

/// Inline markup over `[start, end)` UTF-16 code unit offsets of a node's text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub data: Option<Value>,
}

impl RichTextNode {
    /// Text-only node of the given kind
    pub fn text(kind: &str, text: &str) -> Self {
        Self {
            kind: kind.to_string(),
            text: Some(text.to_string()),
            spans: Vec::new(),
            url: None,
            alt: None,
            oembed: None,
        }
    }

    pub fn paragraph(text: &str) -> Self {
        Self::text("paragraph", text)
    }

    pub fn with_span(mut self, start: usize, end: usize, kind: &str, data: Option<Value>) -> Self {
        self.spans.push(Span {
            start,
            end,
            kind: kind.to_string(),
            data,
        });
        self
    }
}

/// Plain text of all nodes joined by a space, with stray inline tags removed
pub fn as_text(nodes: &[RichTextNode]) -> String {
    let joined = nodes
        .iter()
        .filter_map(|n| n.text.as_deref())
        .collect::<Vec<_>>()
        .join(" ");
    INLINE_TAG.replace_all(&joined, " ").into_owned()
}

/// Render nodes to HTML, grouping consecutive list items
pub fn as_html(nodes: &[RichTextNode]) -> String {
    let mut out = String::new();
    let mut open_list: Option<&'static str> = None;

    for node in nodes {
        let list_tag = match node.kind.as_str() {
            "list-item" => Some("ul"),
            "o-list-item" => Some("ol"),
            _ => None,
        };

        if open_list != list_tag {
            if let Some(tag) = open_list {
                out.push_str(&format!("</{}>", tag));
            }
            if let Some(tag) = list_tag {
                out.push_str(&format!("<{}>", tag));
            }
            open_list = list_tag;
        }

        render_block(node, &mut out);
    }

    if let Some(tag) = open_list {
        out.push_str(&format!("</{}>", tag));
    }

    out
}

fn render_block(node: &RichTextNode, out: &mut String) {
    let kind = node.kind.as_str();
    match kind {
        "heading1" | "heading2" | "heading3" | "heading4" | "heading5" | "heading6" => {
            let level = &kind["heading".len()..];
            out.push_str(&format!("<h{}>", level));
            render_inline(node, out);
            out.push_str(&format!("</h{}>", level));
        }
        "paragraph" => wrap("p", node, out),
        "preformatted" => wrap("pre", node, out),
        "list-item" | "o-list-item" => wrap("li", node, out),
        "image" => {
            let src = node.url.as_deref().unwrap_or_default();
            let alt = node.alt.as_deref().unwrap_or_default();
            out.push_str(&format!(
                r#"<p class="block-img"><img src="{}" alt="{}" /></p>"#,
                escape_html(src),
                escape_html(alt)
            ));
        }
        "embed" => render_embed(node, out),
        other => tracing::debug!("Skipping unsupported rich text node type {:?}", other),
    }
}

fn wrap(tag: &str, node: &RichTextNode, out: &mut String) {
    out.push_str(&format!("<{}>", tag));
    render_inline(node, out);
    out.push_str(&format!("</{}>", tag));
}

fn render_embed(node: &RichTextNode, out: &mut String) {
    let Some(oembed) = node.oembed.as_ref() else {
        return;
    };
    let field = |name: &str| oembed.get(name).and_then(Value::as_str).unwrap_or_default();
    out.push_str(&format!(
        r#"<div data-oembed="{}" data-oembed-type="{}" data-oembed-provider="{}">{}</div>"#,
        escape_html(field("embed_url")),
        escape_html(field("type")),
        escape_html(field("provider_name")),
        field("html")
    ));
}

/// Render a node's text with its spans applied
fn render_inline(node: &RichTextNode, out: &mut String) {
    let text = node.text.as_deref().unwrap_or_default();
    let chars: Vec<char> = text.chars().collect();

    // Span offsets count UTF-16 code units; slicing works on chars
    let offsets = utf16_offsets(text);
    let to_char = |unit: usize| offsets.partition_point(|&o| o < unit);
    let converted: Vec<Span> = node
        .spans
        .iter()
        .map(|s| Span {
            start: to_char(s.start),
            end: to_char(s.end),
            ..s.clone()
        })
        .collect();

    let mut spans: Vec<&Span> = converted.iter().filter(|s| s.start < s.end).collect();
    // Outer spans first so that nesting follows start order
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    render_range(&chars, 0, chars.len(), &spans, out);
}

/// UTF-16 offset at which each char of `text` starts
fn utf16_offsets(text: &str) -> Vec<usize> {
    text.chars()
        .scan(0, |unit, c| {
            let start = *unit;
            *unit += c.len_utf16();
            Some(start)
        })
        .collect()
}

fn render_range(chars: &[char], start: usize, end: usize, spans: &[&Span], out: &mut String) {
    let mut pos = start;
    let mut i = 0;

    while i < spans.len() {
        let span = spans[i];
        let span_start = span.start.clamp(start, end);
        let span_end = span.end.clamp(span_start, end);

        // Overlaps a sibling that was already rendered
        if span_start < pos {
            i += 1;
            continue;
        }

        push_text(&chars[pos..span_start], out);

        let mut j = i + 1;
        while j < spans.len() && spans[j].start < span_end {
            j += 1;
        }

        open_span(span, out);
        render_range(chars, span_start, span_end, &spans[i + 1..j], out);
        close_span(span, out);

        pos = span_end;
        i = j;
    }

    push_text(&chars[pos..end], out);
}

fn open_span(span: &Span, out: &mut String) {
    match span.kind.as_str() {
        "strong" => out.push_str("<strong>"),
        "em" => out.push_str("<em>"),
        "hyperlink" => {
            let data = span.data.as_ref();
            let url = data
                .and_then(|d| d.get("url"))
                .and_then(Value::as_str)
                .unwrap_or("#");
            let new_tab = data
                .and_then(|d| d.get("target"))
                .and_then(Value::as_str)
                .map(|t| t == "_blank")
                .unwrap_or(false)
                || url.starts_with("http://")
                || url.starts_with("https://");
            if new_tab {
                out.push_str(&format!(
                    r#"<a href="{}" target="_blank" rel="noopener noreferrer">"#,
                    escape_html(url)
                ));
            } else {
                out.push_str(&format!(r#"<a href="{}">"#, escape_html(url)));
            }
        }
        "label" => {
            let label = span
                .data
                .as_ref()
                .and_then(|d| d.get("label"))
                .and_then(Value::as_str)
                .unwrap_or_default();
            out.push_str(&format!(r#"<span class="{}">"#, escape_html(label)));
        }
        _ => out.push_str("<span>"),
    }
}

fn close_span(span: &Span, out: &mut String) {
    match span.kind.as_str() {
        "strong" => out.push_str("</strong>"),
        "em" => out.push_str("</em>"),
        "hyperlink" => out.push_str("</a>"),
        _ => out.push_str("</span>"),
    }
}

fn push_text(chars: &[char], out: &mut String) {
    for &c in chars {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\n' => out.push_str("<br />"),
            _ => out.push(c),
        }
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
