//! Template expansion stage.
//!
//! Reads every registered page, strips its front matter, expands Tera syntax
//! in the body, and records the page's headings as cross-reference anchors.

use crate::build::anchors::Anchor;
use crate::build::document::{ExpandedDocument, parse_front_matter};
use crate::build::markdown::collect_headings;
use crate::build::paths::{root_prefix, to_url_path};
use crate::build::pipeline::{BuildContext, PipelineError};
use crate::build::render::{ContentRenderContext, PageInfo, expand_content};

/// Expand every registered page, in registration order.
///
/// Content authors can use `{{ site.name }}`, `{{ page.title }}` and
/// the rest of Tera's syntax in their markdown.
pub fn run(ctx: &mut BuildContext) -> Result<(), PipelineError> {
    let pages: Vec<_> = ctx.pages.iter().cloned().collect();
    let mut documents = Vec::with_capacity(pages.len());

    for page in pages {
        let raw = std::fs::read_to_string(&page.source_path)
            .map_err(|e| PipelineError::io(&page.source_path, e))?;
        let parsed = parse_front_matter(&raw);
        let relative_path = ctx.relative_to_source(&page.source_path).to_path_buf();

        // No headings yet, so the title seen by templates comes from the
        // front matter or the file name.
        let mut document = ExpandedDocument {
            source_path: page.source_path,
            dest_path: page.dest_path,
            relative_path,
            front_matter: parsed.front_matter,
            content: String::new(),
            toc: Vec::new(),
        };

        let content_context = ContentRenderContext {
            site: ctx.site.clone(),
            page: PageInfo {
                title: document.title(),
                path: to_url_path(&document.relative_path),
                root: root_prefix(&document.relative_path),
                description: document.front_matter.description.clone(),
                extra: document.front_matter.extra.clone(),
            },
        };

        document.content = expand_content(&parsed.content, &content_context).map_err(|source| {
            PipelineError::Template {
                page: document.relative_path.clone(),
                source,
            }
        })?;
        document.toc = collect_headings(&document.content);

        for entry in &document.toc {
            ctx.anchors.register(Anchor {
                page: document.relative_path.clone(),
                id: entry.id.clone(),
                text: entry.text.clone(),
            });
        }

        documents.push(document);
    }

    tracing::debug!(
        documents = documents.len(),
        anchors = ctx.anchors.len(),
        "expanded templates"
    );
    ctx.documents = documents;
    Ok(())
}
