//! Renderer traits for the two pluggable rendering hooks.
//!
//! Implementations must be `Send + Sync` so a batch render can share them
//! across worker threads.  Plain closures work through the [`CodeFn`] and
//! [`MathFn`] adapters; any error they return is wrapped in
//! [`RenderError::BadCallback`](crate::RenderError::BadCallback).

use crate::error::{BoxedError, RenderError};

/// Renders the body of a fenced or indented code block to an HTML
/// fragment, which is substituted into the output verbatim.
pub trait CodeRenderer: Send + Sync {
    /// `language` is the first word of the fence info string, or `None`
    /// for an indented block or a bare fence.
    fn render_code(&self, buffer: &str, language: Option<&str>) -> Result<String, RenderError>;
}

/// Renders the contents of a math span to an HTML fragment, which is
/// substituted into the output verbatim.
pub trait MathRenderer: Send + Sync {
    /// `display` is true for `$$...$$` spans.
    fn render_math(&self, buffer: &str, display: bool) -> Result<String, RenderError>;
}

/// Adapts a function or closure into a [`CodeRenderer`].
///
/// ```rust
/// use inkmark::{BoxedError, CodeFn};
///
/// let renderer = CodeFn(|buffer: &str, language: Option<&str>| -> Result<String, BoxedError> {
///     Ok(format!("<pre data-lang=\"{}\">{}</pre>", language.unwrap_or(""), buffer))
/// });
/// ```
pub struct CodeFn<F>(pub F);

impl<F> CodeRenderer for CodeFn<F>
where
    F: Fn(&str, Option<&str>) -> Result<String, BoxedError> + Send + Sync,
{
    fn render_code(&self, buffer: &str, language: Option<&str>) -> Result<String, RenderError> {
        (self.0)(buffer, language).map_err(RenderError::BadCallback)
    }
}

/// Adapts a function or closure into a [`MathRenderer`].
pub struct MathFn<F>(pub F);

impl<F> MathRenderer for MathFn<F>
where
    F: Fn(&str, bool) -> Result<String, BoxedError> + Send + Sync,
{
    fn render_math(&self, buffer: &str, display: bool) -> Result<String, RenderError> {
        (self.0)(buffer, display).map_err(RenderError::BadCallback)
    }
}
