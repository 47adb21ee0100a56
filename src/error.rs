//! Error types for rendering.
//!
//! Parsing itself never fails: malformed Markdown degrades to literal text
//! per the CommonMark "never fail" rule.  Errors arise only from
//! configuration, caller-supplied renderers, and the highlighting
//! machinery.  A failing document produces no partial HTML.

use thiserror::Error;

/// A boxed error source from a renderer or from syntect.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Everything that can go wrong in a render call.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A caller-supplied code or math renderer failed.
    #[error("a user callback failed")]
    BadCallback(#[source] BoxedError),

    /// A fenced code block named a language the highlighter does not know.
    #[error("unknown language: {0}")]
    UnknownLanguage(String),

    /// A theme name outside the catalogue and its aliases.
    #[error("unknown theme: {0}")]
    UnknownTheme(String),

    /// A catalogued theme that is missing from the loaded theme set.
    #[error("theme {0} has no stylesheet representation")]
    MissingTheme(String),

    /// Tokenization failed for a recognized language.
    #[error("cannot highlight code block")]
    CannotHighlight(#[source] BoxedError),

    /// A math span was found, but no math renderer is configured.
    #[error("cannot render math: no math renderer is configured")]
    CannotRenderMath,

    /// The math configuration is inconsistent.
    #[error("cannot configure math: {0}")]
    CannotConfigMath(&'static str),

    /// Stylesheet generation failed for an otherwise valid theme.
    #[error("cannot generate css for theme {0}")]
    CannotGetCss(String, #[source] BoxedError),

    /// Mutually exclusive extensions were both enabled.
    #[error("conflicting options: {0}")]
    BadOptions(&'static str),
}
