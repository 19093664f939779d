//! Markdown rendering and heading extraction.

use std::collections::HashSet;

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};
use serde::Serialize;

/// A table of contents entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// The heading text
    pub text: String,
    /// The heading id (for anchor links)
    pub id: String,
    /// The heading level (1-6)
    pub level: u8,
}

/// Result of rendering markdown, containing both HTML and table of contents.
pub struct MarkdownOutput {
    pub html: String,
    pub toc: Vec<TocEntry>,
}

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Hands out unique heading ids within one document.
#[derive(Default)]
struct HeadingIds {
    used: HashSet<String>,
}

impl HeadingIds {
    fn explicit(&mut self, id: &str) -> String {
        self.used.insert(id.to_string());
        id.to_string()
    }

    fn generate(&mut self, text: &str) -> String {
        let base_id = slugify(text);
        let mut id = base_id.clone();
        let mut suffix = 1;
        while self.used.contains(&id) {
            id = format!("{}-{}", base_id, suffix);
            suffix += 1;
        }
        self.used.insert(id.clone());
        id
    }
}

/// Collect every heading in a markdown document.
///
/// Ids match those emitted by [`render_markdown`] for the same input.
pub fn collect_headings(markdown: &str) -> Vec<TocEntry> {
    let mut ids = HeadingIds::default();
    let mut entries = Vec::new();
    let mut current: Option<(HeadingLevel, Option<String>)> = None;
    let mut text = String::new();

    for event in Parser::new_ext(markdown, options()) {
        match event {
            Event::Start(Tag::Heading { level, id, .. }) => {
                current = Some((level, id.map(|id| id.to_string())));
                text.clear();
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, explicit)) = current.take() {
                    let id = match explicit {
                        Some(explicit) => ids.explicit(&explicit),
                        None => ids.generate(&text),
                    };
                    entries.push(TocEntry {
                        text: text.clone(),
                        id,
                        level: level as u8,
                    });
                }
            }
            Event::Text(t) | Event::Code(t) if current.is_some() => text.push_str(&t),
            _ => {}
        }
    }

    entries
}

/// Render markdown to HTML, giving every heading an id attribute.
pub fn render_markdown(markdown: &str) -> MarkdownOutput {
    struct HeadingState {
        level: HeadingLevel,
        id: Option<String>,
        classes: Vec<String>,
    }

    let mut ids = HeadingIds::default();
    let mut in_heading: Option<HeadingState> = None;
    let mut heading_text = String::new();
    let mut heading_html = String::new();
    let mut toc_entries: Vec<TocEntry> = Vec::new();

    let events: Vec<Event> = Parser::new_ext(markdown, options())
        .flat_map(|event| match event {
            Event::Start(Tag::Heading {
                level,
                ref id,
                ref classes,
                ..
            }) => {
                in_heading = Some(HeadingState {
                    level,
                    id: id.as_ref().map(|id| id.to_string()),
                    classes: classes.iter().map(|c| c.to_string()).collect(),
                });
                heading_text.clear();
                heading_html.clear();
                vec![]
            }
            Event::End(TagEnd::Heading(_)) => {
                let Some(state) = in_heading.take() else {
                    return vec![event];
                };

                let id = match &state.id {
                    Some(explicit) => ids.explicit(explicit),
                    None => ids.generate(&heading_text),
                };

                toc_entries.push(TocEntry {
                    text: heading_text.clone(),
                    id: id.clone(),
                    level: state.level as u8,
                });

                let class_attr = if state.classes.is_empty() {
                    String::new()
                } else {
                    format!(" class=\"{}\"", state.classes.join(" "))
                };

                vec![Event::Html(
                    format!(
                        "<h{level} id=\"{id}\"{class_attr}>{heading_html} <a class=\"header-anchor\" href=\"#{id}\" aria-label=\"Link to this heading\">#</a></h{level}>\n",
                        level = state.level as usize,
                    )
                    .into(),
                )]
            }
            Event::Text(text) if in_heading.is_some() => {
                heading_text.push_str(&text);
                heading_html.push_str(&escape_html(&text));
                vec![]
            }
            Event::Code(code) if in_heading.is_some() => {
                heading_text.push_str(&code);
                heading_html.push_str(&format!("<code>{}</code>", escape_html(&code)));
                vec![]
            }
            _ if in_heading.is_some() => {
                // Inline markup inside headings is flattened to text.
                vec![]
            }
            _ => vec![event],
        })
        .collect();

    let mut html_output = String::new();
    html::push_html(&mut html_output, events.into_iter());

    MarkdownOutput {
        html: html_output,
        toc: toc_entries,
    }
}

/// Convert a string to a slug suitable for use as an HTML id.
pub fn slugify(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .replace(' ', "-")
        .replace(|c: char| !c.is_alphanumeric() && c != '-' && c != '_', "")
}

fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
