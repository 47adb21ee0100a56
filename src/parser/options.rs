//! Configuration for the parser and renderer.  Extensions affect both.

use bon::Builder;
use std::fmt::{self, Debug, Formatter};

use crate::adapters::{CodeRenderer, MathRenderer};
use crate::error::RenderError;

/// Umbrella options struct.
#[derive(Default, Debug, Clone)]
pub struct Options {
    /// Enable CommonMark extensions.
    pub extension: Extension,
}

/// Options to select extensions.
#[derive(Default, Debug, Clone, Builder)]
pub struct Extension {
    /// Enables the tables extension.
    ///
    /// ```rust
    /// # use inkmark::{markdown_to_html, Options};
    /// let mut options = Options::default();
    /// options.extension.table = true;
    /// assert_eq!(markdown_to_html("| a | b |\n|---|---|\n| c | d |\n", &options).unwrap(),
    ///            "<table>\n<thead>\n<tr>\n<th>a</th>\n<th>b</th>\n</tr>\n</thead>\n\
    ///             <tbody>\n<tr>\n<td>c</td>\n<td>d</td>\n</tr>\n</tbody>\n</table>\n");
    /// ```
    #[builder(default)]
    pub table: bool,

    /// Enables footnote references (`[^label]`) and definitions
    /// (`[^label]: text`).  A reference only counts when its definition
    /// exists; visible numbers are assigned in order of first reference.
    ///
    /// ```rust
    /// # use inkmark::{markdown_to_html, Options};
    /// let mut options = Options::default();
    /// options.extension.footnotes = true;
    /// assert_eq!(markdown_to_html("Hi[^x].\n\n[^x]: A greeting.\n", &options).unwrap(),
    ///            "<p>Hi<sup class=\"footnote-reference\"><a href=\"#x\">1</a></sup>.</p>\n\
    ///             <div class=\"footnote-definition\" id=\"x\">\
    ///             <sup class=\"footnote-definition-label\">1</sup>\n\
    ///             <p>A greeting.</p>\n</div>\n");
    /// ```
    #[builder(default)]
    pub footnotes: bool,

    /// Enables vanilla-Markdown-style footnotes: references parse whether
    /// or not a matching definition exists.  Mutually exclusive with
    /// `footnotes`.
    #[builder(default)]
    pub old_footnotes: bool,

    /// Enables strikethrough with `~~text~~`.
    ///
    /// ```rust
    /// # use inkmark::{markdown_to_html, Options};
    /// let mut options = Options::default();
    /// options.extension.strikethrough = true;
    /// assert_eq!(markdown_to_html("Hello ~~world~~ there.\n", &options).unwrap(),
    ///            "<p>Hello <del>world</del> there.</p>\n");
    /// ```
    #[builder(default)]
    pub strikethrough: bool,

    /// Enables task list items.
    ///
    /// ```rust
    /// # use inkmark::{markdown_to_html, Options};
    /// let mut options = Options::default();
    /// options.extension.tasklist = true;
    /// assert_eq!(markdown_to_html("- [x] Done\n- [ ] Not done\n", &options).unwrap(),
    ///            "<ul>\n<li><input type=\"checkbox\" checked=\"\" disabled=\"\" /> Done</li>\n\
    ///            <li><input type=\"checkbox\" disabled=\"\" /> Not done</li>\n</ul>\n");
    /// ```
    #[builder(default)]
    pub tasklist: bool,

    /// Replaces straight quotes with curly ones, `--` and `---` with en
    /// and em dashes, and `...` with an ellipsis, outside code and math.
    ///
    /// ```rust
    /// # use inkmark::{markdown_to_html, Options};
    /// let mut options = Options::default();
    /// options.extension.smart_punctuation = true;
    /// assert_eq!(markdown_to_html("'Hello,' \"world\" ...\n", &options).unwrap(),
    ///            "<p>‘Hello,’ “world” …</p>\n");
    /// ```
    #[builder(default)]
    pub smart_punctuation: bool,

    /// Parses a trailing `{#id .class}` group on a heading line into the
    /// heading's id and classes.
    ///
    /// ```rust
    /// # use inkmark::{markdown_to_html, Options};
    /// let mut options = Options::default();
    /// options.extension.heading_attributes = true;
    /// assert_eq!(markdown_to_html("# foo {#bar .baz}\n", &options).unwrap(),
    ///            "<h1 id=\"bar\" class=\"baz\">foo</h1>\n");
    /// ```
    #[builder(default)]
    pub heading_attributes: bool,

    /// Enables GitHub-style alert block quotes: a block quote whose first
    /// line is exactly `[!NOTE]`, `[!TIP]`, `[!IMPORTANT]`, `[!WARNING]`,
    /// or `[!CAUTION]`.
    ///
    /// ```rust
    /// # use inkmark::{markdown_to_html, Options};
    /// let mut options = Options::default();
    /// options.extension.gfm_alerts = true;
    /// assert_eq!(markdown_to_html("> [!NOTE]\n> foo\n", &options).unwrap(),
    ///            "<blockquote class=\"markdown-alert-note\">\n<p>foo</p>\n</blockquote>\n");
    /// ```
    #[builder(default)]
    pub gfm_alerts: bool,

    /// Enables definition lists: a paragraph followed by one or more
    /// `: definition` lines.
    ///
    /// ```rust
    /// # use inkmark::{markdown_to_html, Options};
    /// let mut options = Options::default();
    /// options.extension.definition_lists = true;
    /// assert_eq!(markdown_to_html("foo\n: bar\n", &options).unwrap(),
    ///            "<dl>\n<dt>foo</dt>\n<dd>bar</dd>\n</dl>\n");
    /// ```
    #[builder(default)]
    pub definition_lists: bool,

    /// Enables superscript with `^text^`.
    ///
    /// ```rust
    /// # use inkmark::{markdown_to_html, Options};
    /// let mut options = Options::default();
    /// options.extension.superscript = true;
    /// assert_eq!(markdown_to_html("e = mc^2^.\n", &options).unwrap(),
    ///            "<p>e = mc<sup>2</sup>.</p>\n");
    /// ```
    #[builder(default)]
    pub superscript: bool,

    /// Enables subscript with `~text~`.  Mutually exclusive with
    /// `strikethrough`, which claims the same delimiter.
    ///
    /// ```rust
    /// # use inkmark::{markdown_to_html, Options};
    /// let mut options = Options::default();
    /// options.extension.subscript = true;
    /// assert_eq!(markdown_to_html("H~2~O\n", &options).unwrap(),
    ///            "<p>H<sub>2</sub>O</p>\n");
    /// ```
    #[builder(default)]
    pub subscript: bool,

    /// Enables wikilinks: `[[target]]` and `[[target|display]]`.
    ///
    /// ```rust
    /// # use inkmark::{markdown_to_html, Options};
    /// let mut options = Options::default();
    /// options.extension.wikilinks = true;
    /// assert_eq!(markdown_to_html("[[foo]]\n", &options).unwrap(),
    ///            "<p><a href=\"foo\">foo</a></p>\n");
    /// ```
    #[builder(default)]
    pub wikilinks: bool,

    /// Enables math spans delimited by `$` (inline) and `$$` (display).
    /// Rendering requires a math renderer in [`Plugins`]; if a span is
    /// found with no renderer configured, the render fails with
    /// [`RenderError::CannotRenderMath`].
    #[builder(default)]
    pub math: bool,

    /// Skips a front matter block bounded by this delimiter (commonly
    /// `---` or `+++`) at the start of the document.  The block is not
    /// parsed for data and is omitted from the output.
    pub front_matter_delimiter: Option<String>,
}

impl Extension {
    pub(crate) fn footnotes_enabled(&self) -> bool {
        self.footnotes || self.old_footnotes
    }
}

/// Umbrella plugins struct.
#[derive(Default, Debug, Clone)]
pub struct Plugins<'p> {
    /// Configure render-time plugins.
    pub render: RenderPlugins<'p>,
}

/// Plugins for alternative rendering of code blocks and math spans.
#[derive(Default, Clone)]
pub struct RenderPlugins<'p> {
    /// A renderer invoked with each code block's body and language in
    /// place of the default escaped `<pre><code>` output.  Takes
    /// precedence over the built-in highlighter.
    pub code_renderer: Option<&'p dyn CodeRenderer>,

    /// A renderer invoked with each math span's body.
    pub math_renderer: Option<&'p dyn MathRenderer>,
}

impl Debug for RenderPlugins<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderPlugins")
            .field("code_renderer", &self.code_renderer.map(|_| "<dyn CodeRenderer>"))
            .field("math_renderer", &self.math_renderer.map(|_| "<dyn MathRenderer>"))
            .finish()
    }
}

/// Rejects option combinations the grammar cannot honor.  Called once per
/// render call, before any parsing.
pub(crate) fn validate(options: &Options, plugins: &Plugins) -> Result<(), RenderError> {
    if options.extension.footnotes && options.extension.old_footnotes {
        return Err(RenderError::BadOptions(
            "footnotes and old_footnotes are mutually exclusive",
        ));
    }
    if options.extension.strikethrough && options.extension.subscript {
        return Err(RenderError::BadOptions(
            "strikethrough and subscript both claim the `~` delimiter",
        ));
    }
    if plugins.render.math_renderer.is_some() && !options.extension.math {
        return Err(RenderError::CannotConfigMath(
            "a math renderer is configured but the math extension is disabled",
        ));
    }
    Ok(())
}
