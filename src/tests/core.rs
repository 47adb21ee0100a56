use super::*;

#[test]
fn basic() {
    html(
        "My **document**.\n\nIt's mine.\n\n> Yes.\n\n## Hi!\n\nOkay.\n",
        concat!(
            "<p>My <strong>document</strong>.</p>\n",
            "<p>It's mine.</p>\n",
            "<blockquote>\n",
            "<p>Yes.</p>\n",
            "</blockquote>\n",
            "<h2>Hi!</h2>\n",
            "<p>Okay.</p>\n"
        ),
    );
}

#[test]
fn paragraphs() {
    html("a\nb\n\nc\n", "<p>a\nb</p>\n<p>c</p>\n");
}

#[test]
fn emphasis() {
    html(
        "*em* **strong** ***both***\n",
        "<p><em>em</em> <strong>strong</strong> <em><strong>both</strong></em></p>\n",
    );
    html("**foo *bar* baz**\n", "<p><strong>foo <em>bar</em> baz</strong></p>\n");
    html("a * b * c\n", "<p>a * b * c</p>\n");
    html("foo_bar_baz\n", "<p>foo_bar_baz</p>\n");
    html("_emphasized_\n", "<p><em>emphasized</em></p>\n");
}

#[test]
fn unmatched_delimiters() {
    html("*not closed\n", "<p>*not closed</p>\n");
    html("[not a link\n", "<p>[not a link</p>\n");
}

#[test]
fn atx_headings() {
    html("# one\n", "<h1>one</h1>\n");
    html("###### six\n", "<h6>six</h6>\n");
    html("####### seven\n", "<p>####### seven</p>\n");
    html("# trailing ###\n", "<h1>trailing</h1>\n");
    html("#nospace\n", "<p>#nospace</p>\n");
}

#[test]
fn setext_headings() {
    html("Hi\n==\n\nOk\n-----\n", "<h1>Hi</h1>\n<h2>Ok</h2>\n");
}

#[test]
fn thematic_breaks() {
    html(
        "---\n\n- - -\n\n\n_        _   _\n",
        "<hr />\n<hr />\n<hr />\n",
    );
}

#[test]
fn code_spans() {
    html("`code`\n", "<p><code>code</code></p>\n");
    html("`` a ` b ``\n", "<p><code>a ` b</code></p>\n");
    html("`not closed\n", "<p>`not closed</p>\n");
}

#[test]
fn fenced_code() {
    html(
        "``` rust\nfn main<'a>();\n```\n",
        "<pre><code class=\"language-rust\">fn main&lt;'a&gt;();\n</code></pre>\n",
    );
    html("```\nplain\n```\n", "<pre><code>plain\n</code></pre>\n");
    html("```\nunclosed\n", "<pre><code>unclosed\n</code></pre>\n");
}

#[test]
fn indented_code() {
    html("    fn x() {}\n", "<pre><code>fn x() {}\n</code></pre>\n");
    html(
        "    a\n\n    b\n",
        "<pre><code>a\n\nb\n</code></pre>\n",
    );
}

#[test]
fn block_quotes() {
    html("> a\n> b\n", "<blockquote>\n<p>a\nb</p>\n</blockquote>\n");
    html(
        "> lazy\ncontinuation\n",
        "<blockquote>\n<p>lazy\ncontinuation</p>\n</blockquote>\n",
    );
    html(
        "> > nested\n",
        "<blockquote>\n<blockquote>\n<p>nested</p>\n</blockquote>\n</blockquote>\n",
    );
}

#[test]
fn tight_lists() {
    html(
        "- Hello.\n- Hi.\n",
        "<ul>\n<li>Hello.</li>\n<li>Hi.</li>\n</ul>\n",
    );
    html(
        "2. Hello.\n3. Hi.\n",
        "<ol start=\"2\">\n<li>Hello.</li>\n<li>Hi.</li>\n</ol>\n",
    );
    html(
        "1. one\n2. two\n",
        "<ol>\n<li>one</li>\n<li>two</li>\n</ol>\n",
    );
}

#[test]
fn loose_lists() {
    html(
        "- a\n\n- b\n",
        "<ul>\n<li>\n<p>a</p>\n</li>\n<li>\n<p>b</p>\n</li>\n</ul>\n",
    );
}

#[test]
fn nested_lists() {
    html(
        "- a\n  - b\n",
        "<ul>\n<li>a\n<ul>\n<li>b</li>\n</ul>\n</li>\n</ul>\n",
    );
}

#[test]
fn list_interrupts_paragraph() {
    html("para\n- item\n", "<p>para</p>\n<ul>\n<li>item</li>\n</ul>\n");
    html("para\n2. item\n", "<p>para\n2. item</p>\n");
}

#[test]
fn breaks() {
    html("foo  \nbar\n", "<p>foo<br />\nbar</p>\n");
    html("foo\\\nbar\n", "<p>foo<br />\nbar</p>\n");
    html("foo\nbar\n", "<p>foo\nbar</p>\n");
}

#[test]
fn inline_links() {
    html(
        "[foo](/url \"title\")\n",
        "<p><a href=\"/url\" title=\"title\">foo</a></p>\n",
    );
    html("[foo](/url)\n", "<p><a href=\"/url\">foo</a></p>\n");
    html("[foo]()\n", "<p><a href=\"\">foo</a></p>\n");
    html("[foo](<my url>)\n", "<p><a href=\"my%20url\">foo</a></p>\n");
}

#[test]
fn reference_links() {
    html(
        "[foo]\n\n[foo]: /url\n",
        "<p><a href=\"/url\">foo</a></p>\n",
    );
    html(
        "[bar][foo]\n\n[foo]: /url \"t\"\n",
        "<p><a href=\"/url\" title=\"t\">bar</a></p>\n",
    );
    html(
        "[Foo][]\n\n[foo]: /url\n",
        "<p><a href=\"/url\">Foo</a></p>\n",
    );
    html("[undefined]\n", "<p>[undefined]</p>\n");
}

#[test]
fn duplicate_reference_definitions_first_wins() {
    html(
        "[foo]\n\n[foo]: /first\n[foo]: /second\n",
        "<p><a href=\"/first\">foo</a></p>\n",
    );
}

#[test]
fn images() {
    html(
        "![alt text](/img.png \"t\")\n",
        "<p><img src=\"/img.png\" alt=\"alt text\" title=\"t\" /></p>\n",
    );
    html(
        "![*em* alt](/i)\n",
        "<p><img src=\"/i\" alt=\"em alt\" /></p>\n",
    );
}

#[test]
fn autolinks() {
    html(
        "<https://example.com/x>\n",
        "<p><a href=\"https://example.com/x\">https://example.com/x</a></p>\n",
    );
    html(
        "<me@example.com>\n",
        "<p><a href=\"mailto:me@example.com\">me@example.com</a></p>\n",
    );
    html("<not an autolink\n", "<p>&lt;not an autolink</p>\n");
}

#[test]
fn inline_html() {
    html("a <b>c</b> d\n", "<p>a <b>c</b> d</p>\n");
    html("a <!-- comment --> b\n", "<p>a <!-- comment --> b</p>\n");
}

#[test]
fn html_blocks() {
    html("<div>\n*x*\n</div>\n", "<div>\n*x*\n</div>\n");
    html(
        "<!-- c -->\nx\n",
        "<!-- c -->\n<p>x</p>\n",
    );
    html(
        "<script>\nvar a = '*x*';\n</script>\n",
        "<script>\nvar a = '*x*';\n</script>\n",
    );
}

#[test]
fn backslash_escapes() {
    html("\\*not em\\*\n", "<p>*not em*</p>\n");
    html("a\\b\n", "<p>a\\b</p>\n");
}

#[test]
fn entities() {
    html("&amp; &copy; &#65; &nosuch;\n", "<p>&amp; © A &amp;nosuch;</p>\n");
}

#[test]
fn escaping() {
    html(
        "quotes \" and <tags> & ampersands\n",
        "<p>quotes &quot; and &lt;tags&gt; &amp; ampersands</p>\n",
    );
}

#[test]
fn code_span_precedence() {
    html("`*not em*`\n", "<p><code>*not em*</code></p>\n");
}

#[test]
fn empty_document() {
    html("", "");
    html("\n\n", "");
}
