//! Cross-reference stage.
//!
//! Rewrites `@ref` links using the anchors collected during expansion:
//!
//! - `[Installation](@ref)` links to the heading whose id is `installation`
//! - `[see here](@ref install)` links to the heading with id `install`
//! - `[see here](@ref guide/setup.md#install)` picks the page explicitly
//!
//! Links inside code spans and code blocks are left alone.

use std::ops::Range;
use std::sync::LazyLock;

use pulldown_cmark::{Event, Parser, Tag};
use regex::{Captures, Regex};

use crate::build::anchors::AnchorIndex;
use crate::build::document::ExpandedDocument;
use crate::build::markdown::slugify;
use crate::build::paths::{output_path, relative_href};
use crate::build::pipeline::{BuildContext, PipelineError};
use crate::config::OutputFormat;

static REF_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]\(@ref(?:\s+([^)\s]+))?\s*\)").expect("valid regex")
});

/// Resolve every `@ref` link in every expanded document.
pub fn run(ctx: &mut BuildContext) -> Result<(), PipelineError> {
    let mut resolved = 0;
    for index in 0..ctx.documents.len() {
        let (content, count) = resolve_links(&ctx.documents[index], &ctx.anchors, ctx.format)?;
        ctx.documents[index].content = content;
        resolved += count;
    }
    tracing::debug!(links = resolved, "resolved cross references");
    Ok(())
}

fn resolve_links(
    doc: &ExpandedDocument,
    anchors: &AnchorIndex,
    format: OutputFormat,
) -> Result<(String, usize), PipelineError> {
    let mut output = String::with_capacity(doc.content.len());
    let mut last = 0;
    let mut count = 0;
    let code = code_ranges(&doc.content);

    for caps in REF_LINK.captures_iter(&doc.content) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if code.iter().any(|range| range.contains(&whole.start())) {
            continue;
        }
        let text = &caps[1];
        let key = reference_key(&caps, text);

        let target = anchors
            .resolve(&key, &doc.relative_path)
            .map_err(|e| PipelineError::CrossReference {
                page: doc.relative_path.clone(),
                target: key.clone(),
                reason: e.to_string(),
            })?;

        let href = if target.page == doc.relative_path {
            format!("#{}", target.id)
        } else {
            format!(
                "{}#{}",
                relative_href(
                    &output_path(&doc.relative_path, format),
                    &output_path(&target.page, format),
                ),
                target.id
            )
        };

        output.push_str(&doc.content[last..whole.start()]);
        output.push_str(&format!("[{text}]({href})"));
        last = whole.end();
        count += 1;
    }

    output.push_str(&doc.content[last..]);
    Ok((output, count))
}

/// Byte ranges of code blocks and inline code spans.
fn code_ranges(markdown: &str) -> Vec<Range<usize>> {
    Parser::new(markdown)
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Start(Tag::CodeBlock(_)) | Event::Code(_) => Some(range),
            _ => None,
        })
        .collect()
}

/// Explicit target if given, otherwise the slug of the link text.
fn reference_key(caps: &Captures<'_>, text: &str) -> String {
    match caps.get(2) {
        Some(target) => target.as_str().to_string(),
        None => slugify(text),
    }
}
