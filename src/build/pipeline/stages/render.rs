//! Render stage.
//!
//! Emits every registered page into the build tree. For HTML output the
//! expanded markdown is rendered and wrapped in the page template; for
//! markdown output it is written as-is.

use std::fs;

use crate::build::markdown::render_markdown;
use crate::build::paths::{output_path, root_prefix, to_url_path};
use crate::build::pipeline::{BuildContext, PipelineError};
use crate::build::render::{PageContext, PageInfo, Renderer};
use crate::config::OutputFormat;

pub fn run(ctx: &mut BuildContext) -> Result<(), PipelineError> {
    let renderer = match ctx.format {
        OutputFormat::Html => Some(Renderer::new(ctx.template.as_deref())?),
        OutputFormat::Markdown => None,
    };

    let mut written = Vec::with_capacity(ctx.pages.len());
    for page in ctx.pages.iter() {
        let doc = ctx
            .documents
            .iter()
            .find(|d| d.source_path == page.source_path)
            .ok_or_else(|| {
                PipelineError::stage(
                    "RenderDocument",
                    format!(
                        "page '{}' was never expanded (was the expand stage run?)",
                        page.source_path.display()
                    ),
                )
            })?;

        let contents = match &renderer {
            Some(renderer) => {
                let output = render_markdown(&doc.content);
                renderer.render_page(&PageContext {
                    site: ctx.site.clone(),
                    page: PageInfo {
                        title: doc.title(),
                        path: to_url_path(&doc.relative_path),
                        root: root_prefix(&doc.relative_path),
                        description: doc.front_matter.description.clone(),
                        extra: doc.front_matter.extra.clone(),
                    },
                    content: output.html,
                    toc: output.toc,
                })?
            }
            None => doc.content.clone(),
        };

        let target = output_path(&page.dest_path, ctx.format);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
        }
        fs::write(&target, contents).map_err(|e| PipelineError::io(&target, e))?;
        written.push(target);
    }

    tracing::debug!(pages = written.len(), "rendered pages");
    ctx.written = written;
    Ok(())
}
