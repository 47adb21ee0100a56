//! The built-in syntect-backed syntax highlighter, its theme registry,
//! and stylesheet generation.
//!
//! The syntax and theme sets are loaded once per process on first use and
//! shared read-only across every render call.

use once_cell::sync::Lazy;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{
    append_highlighted_html_for_styled_line, css_for_theme_with_class_style, ClassStyle,
    IncludeBackground,
};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::adapters::CodeRenderer;
use crate::error::RenderError;
use crate::html;

/// The theme catalogue accepted by [`render`](crate::render),
/// [`css`](crate::css), and [`SyntectAdapter::new`].
pub const THEMES: [&str; 7] = [
    "base16-eighties.dark",
    "base16-mocha.dark",
    "base16-ocean.dark",
    "base16-ocean.light",
    "inspired-github.light",
    "solarized.dark",
    "solarized.light",
];

/// Maps every accepted theme name, including the upstream syntect names,
/// to the name used by the loaded theme set.
static THEME_ALIASES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "base16-eighties.dark" => "base16-eighties.dark",
    "base16-mocha.dark" => "base16-mocha.dark",
    "base16-ocean.dark" => "base16-ocean.dark",
    "base16-ocean.light" => "base16-ocean.light",
    "inspired-github.light" => "InspiredGitHub",
    "inspired-github" => "InspiredGitHub",
    "InspiredGitHub" => "InspiredGitHub",
    "solarized.dark" => "Solarized (dark)",
    "Solarized (dark)" => "Solarized (dark)",
    "solarized.light" => "Solarized (light)",
    "Solarized (light)" => "Solarized (light)",
};

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(|| {
    log::debug!("loading default syntax set");
    SyntaxSet::load_defaults_newlines()
});

static THEME_SET: Lazy<ThemeSet> = Lazy::new(|| {
    log::debug!("loading default theme set");
    ThemeSet::load_defaults()
});

fn resolve_theme(name: &str) -> Result<&'static Theme, RenderError> {
    let canonical = THEME_ALIASES
        .get(name)
        .ok_or_else(|| RenderError::UnknownTheme(name.to_string()))?;
    THEME_SET
        .themes
        .get(*canonical)
        .ok_or_else(|| RenderError::MissingTheme(name.to_string()))
}

/// Highlights `code` as `language` (plain text when `None`), producing
/// spans with inline `style` attributes.
pub(crate) fn highlight(
    code: &str,
    language: Option<&str>,
    theme: &str,
) -> Result<String, RenderError> {
    let theme = resolve_theme(theme)?;
    let syntax = match language {
        Some(token) => SYNTAX_SET
            .find_syntax_by_token(token)
            .ok_or_else(|| RenderError::UnknownLanguage(token.to_string()))?,
        None => SYNTAX_SET.find_syntax_plain_text(),
    };

    let mut highlighter = HighlightLines::new(syntax, theme);
    let mut out = String::with_capacity(code.len() * 4);
    for line in LinesWithEndings::from(code) {
        let regions = highlighter
            .highlight_line(line, &SYNTAX_SET)
            .map_err(|e| RenderError::CannotHighlight(Box::new(e)))?;
        append_highlighted_html_for_styled_line(&regions, IncludeBackground::No, &mut out)
            .map_err(|e| RenderError::CannotHighlight(Box::new(e)))?;
    }
    Ok(out)
}

/// Generates a stylesheet mapping token classes to the theme's colors,
/// for callers that prefer class-based highlighting over inline styles.
pub fn css(theme: &str) -> Result<String, RenderError> {
    let resolved = resolve_theme(theme)?;
    css_for_theme_with_class_style(resolved, ClassStyle::Spaced)
        .map_err(|e| RenderError::CannotGetCss(theme.to_string(), Box::new(e)))
}

/// The built-in highlighter as a [`CodeRenderer`]: wraps each block in
/// `<pre><code class="language-...">` with inline-styled token spans.
#[derive(Debug, Clone)]
pub struct SyntectAdapter {
    theme: String,
}

impl SyntectAdapter {
    /// Creates an adapter for `theme`, validating the name against the
    /// catalogue and alias table.
    pub fn new(theme: &str) -> Result<Self, RenderError> {
        resolve_theme(theme)?;
        Ok(SyntectAdapter {
            theme: theme.to_string(),
        })
    }
}

impl CodeRenderer for SyntectAdapter {
    fn render_code(&self, buffer: &str, language: Option<&str>) -> Result<String, RenderError> {
        let highlighted = highlight(buffer, language, &self.theme)?;

        let mut out = String::with_capacity(highlighted.len() + 64);
        out.push_str("<pre><code");
        if let Some(language) = language {
            out.push_str(" class=\"language-");
            html::escape_into(&mut out, language);
            out.push('"');
        }
        out.push('>');
        out.push_str(&highlighted);
        out.push_str("</code></pre>\n");
        Ok(out)
    }
}
