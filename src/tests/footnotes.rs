use super::*;

#[test]
fn footnote() {
    html_opts!(
        [extension.footnotes],
        "Hi[^x].\n\n[^x]: A greeting.\n",
        concat!(
            "<p>Hi<sup class=\"footnote-reference\"><a href=\"#x\">1</a></sup>.</p>\n",
            "<div class=\"footnote-definition\" id=\"x\">",
            "<sup class=\"footnote-definition-label\">1</sup>\n",
            "<p>A greeting.</p>\n",
            "</div>\n"
        ),
    );
}

#[test]
fn undefined_reference_stays_literal() {
    html_opts!([extension.footnotes], "foo[^x]\n", "<p>foo[^x]</p>\n");
}

#[test]
fn numbering_follows_first_reference_order() {
    html_opts!(
        [extension.footnotes],
        "foo[^1] bar[^2] qux[^4]\n\nbaz[^3]\n\n[^1]: foo\n[^2]: bar\n\n[^3]: baz\n\n  quux\n",
        concat!(
            "<p>foo<sup class=\"footnote-reference\"><a href=\"#1\">1</a></sup> ",
            "bar<sup class=\"footnote-reference\"><a href=\"#2\">2</a></sup> ",
            "qux[^4]</p>\n",
            "<p>baz<sup class=\"footnote-reference\"><a href=\"#3\">3</a></sup></p>\n",
            "<div class=\"footnote-definition\" id=\"1\">",
            "<sup class=\"footnote-definition-label\">1</sup>\n",
            "<p>foo</p>\n",
            "</div>\n",
            "<div class=\"footnote-definition\" id=\"2\">",
            "<sup class=\"footnote-definition-label\">2</sup>\n",
            "<p>bar</p>\n",
            "</div>\n",
            "<div class=\"footnote-definition\" id=\"3\">",
            "<sup class=\"footnote-definition-label\">3</sup>\n",
            "<p>baz</p>\n",
            "</div>\n",
            "<p>quux</p>\n"
        ),
    );
}

#[test]
fn old_style_numbers_undefined_references_too() {
    html_opts!(
        [extension.old_footnotes],
        "foo[^1] bar[^2] qux[^4]\n\nbaz[^3]\n\n[^1]: foo\n[^2]: bar\n\n[^3]: baz\n\n  quux\n",
        concat!(
            "<p>foo<sup class=\"footnote-reference\"><a href=\"#1\">1</a></sup> ",
            "bar<sup class=\"footnote-reference\"><a href=\"#2\">2</a></sup> ",
            "qux<sup class=\"footnote-reference\"><a href=\"#4\">3</a></sup></p>\n",
            "<p>baz<sup class=\"footnote-reference\"><a href=\"#3\">4</a></sup></p>\n",
            "<div class=\"footnote-definition\" id=\"1\">",
            "<sup class=\"footnote-definition-label\">1</sup>\n",
            "<p>foo</p>\n",
            "</div>\n",
            "<div class=\"footnote-definition\" id=\"2\">",
            "<sup class=\"footnote-definition-label\">2</sup>\n",
            "<p>bar</p>\n",
            "</div>\n",
            "<div class=\"footnote-definition\" id=\"3\">",
            "<sup class=\"footnote-definition-label\">4</sup>\n",
            "<p>baz</p>\n",
            "</div>\n",
            "<p>quux</p>\n"
        ),
    );
}

#[test]
fn labels_are_case_folded() {
    html_opts!(
        [extension.footnotes],
        "a[^Note]\n\n[^note]: b\n",
        concat!(
            "<p>a<sup class=\"footnote-reference\"><a href=\"#note\">1</a></sup></p>\n",
            "<div class=\"footnote-definition\" id=\"note\">",
            "<sup class=\"footnote-definition-label\">1</sup>\n",
            "<p>b</p>\n",
            "</div>\n"
        ),
    );
}

#[test]
fn definition_continuation_needs_indent() {
    html_opts!(
        [extension.footnotes],
        "x[^a]\n\n[^a]: first\n\n    second\n",
        concat!(
            "<p>x<sup class=\"footnote-reference\"><a href=\"#a\">1</a></sup></p>\n",
            "<div class=\"footnote-definition\" id=\"a\">",
            "<sup class=\"footnote-definition-label\">1</sup>\n",
            "<p>first</p>\n",
            "<p>second</p>\n",
            "</div>\n"
        ),
    );
}

#[test]
fn disabled_by_default() {
    // Without the extension, `[^1]: bar` is an ordinary link-reference
    // definition with label `^1`, and the reference is a shortcut link.
    html(
        "foo[^1]\n\n[^1]: bar\n",
        "<p>foo<a href=\"bar\">^1</a></p>\n",
    );
}
