use super::*;

#[test]
fn single_pair() {
    html_opts!(
        [extension.definition_lists],
        "foo\n: bar\n",
        "<dl>\n<dt>foo</dt>\n<dd>bar</dd>\n</dl>\n",
    );
}

#[test]
fn blank_separated_groups_merge() {
    html_opts!(
        [extension.definition_lists],
        "foo\n: bar\n\nbaz\n: qux\n",
        "<dl>\n<dt>foo</dt>\n<dd>bar</dd>\n<dt>baz</dt>\n<dd>qux</dd>\n</dl>\n",
    );
}

#[test]
fn multiple_definitions_per_title() {
    html_opts!(
        [extension.definition_lists],
        "term\n: first\n: second\n",
        "<dl>\n<dt>term</dt>\n<dd>first</dd>\n<dd>second</dd>\n</dl>\n",
    );
}

#[test]
fn inline_markup_in_titles_and_definitions() {
    html_opts!(
        [extension.definition_lists],
        "*term*\n: `def`\n",
        "<dl>\n<dt><em>term</em></dt>\n<dd><code>def</code></dd>\n</dl>\n",
    );
}

#[test]
fn colon_without_title_is_plain_text() {
    html_opts!(
        [extension.definition_lists],
        ": no title\n",
        "<p>: no title</p>\n",
    );
}

#[test]
fn disabled_by_default() {
    html("foo\n: bar\n", "<p>foo\n: bar</p>\n");
}
