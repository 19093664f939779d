use std::path::{Path, PathBuf};

use serde::Serialize;
use tera::{Context, Tera};

use super::markdown::TocEntry;

const PAGE_TEMPLATE: &str = "page.html";

const DEFAULT_PAGE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ page.title }} - {{ site.name }}</title>
  {%- if page.description %}
  <meta name="description" content="{{ page.description }}">
  {%- endif %}
</head>
<body>
  <header><a href="{{ page.root | safe }}index.html">{{ site.name }}</a></header>
  {%- if toc | length > 1 %}
  <nav class="toc">
    <ul>
    {%- for entry in toc %}
      <li class="toc-level-{{ entry.level }}"><a href="#{{ entry.id }}">{{ entry.text }}</a></li>
    {%- endfor %}
    </ul>
  </nav>
  {%- endif %}
  <main>
{{ content | safe }}
  </main>
</body>
</html>
"##;

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("failed to read template {path}: {source}")]
    ReadTemplate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The page renderer, wrapping Tera.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Create a renderer from a custom page template, or the built-in one.
    pub fn new(template: Option<&Path>) -> Result<Self, RenderError> {
        let source = match template {
            Some(path) => std::fs::read_to_string(path).map_err(|source| {
                RenderError::ReadTemplate {
                    path: path.to_path_buf(),
                    source,
                }
            })?,
            None => DEFAULT_PAGE_TEMPLATE.to_string(),
        };

        let mut tera = Tera::default();
        tera.add_raw_template(PAGE_TEMPLATE, &source)?;

        Ok(Self { tera })
    }

    /// Render a page with the given context.
    pub fn render_page(&self, context: &PageContext) -> Result<String, RenderError> {
        let mut tera_context = Context::new();
        tera_context.insert("site", &context.site);
        tera_context.insert("page", &context.page);
        tera_context.insert("content", &context.content);
        tera_context.insert("toc", &context.toc);

        Ok(self.tera.render(PAGE_TEMPLATE, &tera_context)?)
    }
}

/// Expand Tera syntax in raw page content.
///
/// Autoescaping is off: the output is markdown, not HTML.
pub fn expand_content(content: &str, context: &ContentRenderContext) -> Result<String, tera::Error> {
    let mut tera_context = Context::new();
    tera_context.insert("site", &context.site);
    tera_context.insert("page", &context.page);
    Tera::one_off(content, &tera_context, false)
}

/// Context available while expanding page content.
#[derive(Debug, Serialize)]
pub struct ContentRenderContext {
    pub site: SiteContext,
    pub page: PageInfo,
}

/// Context passed to the page template.
#[derive(Debug, Serialize)]
pub struct PageContext {
    pub site: SiteContext,
    pub page: PageInfo,
    pub content: String,
    /// Table of contents for the current page
    pub toc: Vec<TocEntry>,
}

/// Site-level information.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SiteContext {
    pub name: String,
    pub url: Option<String>,
}

/// Information about the current page.
#[derive(Debug, Clone, Serialize)]
pub struct PageInfo {
    pub title: String,
    /// Source path relative to the source root, with `/` separators
    pub path: String,
    /// Relative prefix from this page back to the build root (e.g. "../")
    pub root: String,
    pub description: Option<String>,
    /// Custom front matter fields
    pub extra: std::collections::HashMap<String, serde_yaml::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_info() -> PageInfo {
        PageInfo {
            title: "Intro".to_string(),
            path: "guide/intro.md".to_string(),
            root: "../".to_string(),
            description: None,
            extra: Default::default(),
        }
    }

    fn site() -> SiteContext {
        SiteContext {
            name: "Handbook".to_string(),
            url: None,
        }
    }

    #[test]
    fn test_default_template_renders_page() {
        let renderer = Renderer::new(None).unwrap();
        let html = renderer
            .render_page(&PageContext {
                site: site(),
                page: page_info(),
                content: "<p>Body</p>".to_string(),
                toc: vec![],
            })
            .unwrap();

        assert!(html.contains("<title>Intro - Handbook</title>"));
        assert!(html.contains("<p>Body</p>"));
        assert!(html.contains("href=\"../index.html\""));
    }

    #[test]
    fn test_custom_template() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "[{{ page.title }}]{{ content | safe }}").unwrap();

        let renderer = Renderer::new(Some(&path)).unwrap();
        let html = renderer
            .render_page(&PageContext {
                site: site(),
                page: page_info(),
                content: "<b>x</b>".to_string(),
                toc: vec![],
            })
            .unwrap();
        assert_eq!(html, "[Intro]<b>x</b>");
    }

    #[test]
    fn test_missing_template_file() {
        let result = Renderer::new(Some(Path::new("/definitely/not/here.html")));
        assert!(matches!(result, Err(RenderError::ReadTemplate { .. })));
    }

    #[test]
    fn test_expand_content() {
        let context = ContentRenderContext {
            site: site(),
            page: page_info(),
        };
        let expanded = expand_content("# {{ page.title }} of {{ site.name }}", &context).unwrap();
        assert_eq!(expanded, "# Intro of Handbook");
    }

    #[test]
    fn test_expand_content_reports_syntax_errors() {
        let context = ContentRenderContext {
            site: site(),
            page: page_info(),
        };
        assert!(expand_content("{{ unclosed", &context).is_err());
    }
}
