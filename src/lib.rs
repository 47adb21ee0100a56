//! A CommonMark-compatible Markdown-to-HTML renderer.
//!
//! Parsing is a single-pass, event-driven pipeline: the block scanner
//! builds structure line by line, references resolve before any inline
//! runs, and the [`Parser`] yields a flat stream of [`Event`]s consumed by
//! the HTML serializer.  Dialect extensions (tables, footnotes,
//! strikethrough, task lists, smart punctuation, heading attributes,
//! GitHub-style alerts, definition lists, superscript/subscript,
//! wikilinks, math spans) are individually toggled via [`Options`].
//!
//! ```rust
//! use inkmark::{markdown_to_html, Options};
//!
//! let mut options = Options::default();
//! options.extension.strikethrough = true;
//! assert_eq!(
//!     markdown_to_html("Hello ~~world~~ there.\n", &options).unwrap(),
//!     "<p>Hello <del>world</del> there.</p>\n",
//! );
//! ```
//!
//! Code blocks can be routed through the built-in syntect highlighter by
//! passing a theme name to [`render`], or through a caller-supplied
//! [`CodeRenderer`]; math spans go through a [`MathRenderer`].  Renderer
//! output is substituted as trusted raw HTML.  [`css`] emits a standalone
//! stylesheet for any catalogued theme, for callers who prefer class-based
//! highlighting.
//!
//! Rendering a document is pure and synchronous.  [`render`] takes a batch
//! and fans it out across a rayon thread pool; outputs preserve input
//! order, and the first failing document fails the whole call, with no
//! partial HTML returned for any document.

mod adapters;
mod character_set;
mod dispatch;
mod entity;
mod error;
mod events;
mod highlight;
pub mod html;
mod parser;
mod scanners;
mod strings;
#[cfg(test)]
mod tests;

use rayon::prelude::*;

pub use adapters::{CodeFn, CodeRenderer, MathFn, MathRenderer};
pub use error::{BoxedError, RenderError};
pub use events::{
    AlertType, Alignment, CodeBlockKind, Event, HeadingLevel, LinkType, Tag, TagEnd,
};
pub use highlight::{css, SyntectAdapter, THEMES};
pub use parser::{Extension, Options, Parser, Plugins, RenderPlugins};

use dispatch::Dispatcher;

/// Renders one Markdown document to HTML with no plugins and no
/// highlighting theme.
pub fn markdown_to_html(md: &str, options: &Options) -> Result<String, RenderError> {
    markdown_to_html_with_plugins(md, options, &Plugins::default(), None)
}

/// Renders one Markdown document to HTML.
///
/// A code renderer in `plugins` takes precedence over `theme`; a theme
/// alone engages the built-in highlighter for every code block.
pub fn markdown_to_html_with_plugins(
    md: &str,
    options: &Options,
    plugins: &Plugins,
    theme: Option<&str>,
) -> Result<String, RenderError> {
    parser::validate(options, plugins)?;
    let builtin = builtin_highlighter(plugins, theme)?;
    let code_renderer = code_renderer(plugins, &builtin);
    render_one(md, options, code_renderer, plugins.render.math_renderer)
}

/// Renders a batch of Markdown documents to HTML, one output per input,
/// in input order.
///
/// The batch is processed in parallel; documents share only read-only
/// state.  The first document that fails aborts the whole call: results
/// computed for sibling documents are discarded, and no partial HTML is
/// returned.
pub fn render<S>(
    documents: &[S],
    options: &Options,
    theme: Option<&str>,
) -> Result<Vec<String>, RenderError>
where
    S: AsRef<str> + Sync,
{
    render_with_plugins(documents, options, &Plugins::default(), theme)
}

/// [`render`], with caller-supplied code and math renderers.
pub fn render_with_plugins<S>(
    documents: &[S],
    options: &Options,
    plugins: &Plugins,
    theme: Option<&str>,
) -> Result<Vec<String>, RenderError>
where
    S: AsRef<str> + Sync,
{
    parser::validate(options, plugins)?;
    let builtin = builtin_highlighter(plugins, theme)?;
    let code_renderer = code_renderer(plugins, &builtin);
    let math_renderer = plugins.render.math_renderer;

    log::trace!("rendering a batch of {} documents", documents.len());
    documents
        .par_iter()
        .map(|doc| render_one(doc.as_ref(), options, code_renderer, math_renderer))
        .collect()
}

fn builtin_highlighter(
    plugins: &Plugins,
    theme: Option<&str>,
) -> Result<Option<SyntectAdapter>, RenderError> {
    match theme {
        Some(theme) if plugins.render.code_renderer.is_none() => {
            Ok(Some(SyntectAdapter::new(theme)?))
        }
        _ => Ok(None),
    }
}

fn code_renderer<'p>(
    plugins: &Plugins<'p>,
    builtin: &'p Option<SyntectAdapter>,
) -> Option<&'p dyn CodeRenderer> {
    plugins
        .render
        .code_renderer
        .or_else(|| builtin.as_ref().map(|adapter| adapter as &dyn CodeRenderer))
}

fn render_one(
    md: &str,
    options: &Options,
    code_renderer: Option<&dyn CodeRenderer>,
    math_renderer: Option<&dyn MathRenderer>,
) -> Result<String, RenderError> {
    let parser = Parser::new(md, options);
    let dispatcher = Dispatcher::new(parser, code_renderer, math_renderer);

    // Collecting before serialization keeps the failure contract simple:
    // an error means no partial HTML was produced for the document.
    let events = dispatcher.collect::<Result<Vec<Event>, RenderError>>()?;

    let mut output = String::with_capacity(md.len() * 3 / 2);
    html::push_html(&mut output, events.into_iter());
    Ok(output)
}
