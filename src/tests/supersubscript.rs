use super::*;

#[test]
fn superscript() {
    html_opts!(
        [extension.superscript],
        "e = mc^2^.\n",
        "<p>e = mc<sup>2</sup>.</p>\n",
    );
}

#[test]
fn subscript() {
    html_opts!(
        [extension.subscript],
        "H~2~O\n",
        "<p>H<sub>2</sub>O</p>\n",
    );
}

#[test]
fn bare_spans() {
    html_opts!([extension.superscript], "^foo^\n", "<p><sup>foo</sup></p>\n");
    html_opts!([extension.subscript], "~foo~\n", "<p><sub>foo</sub></p>\n");
}

#[test]
fn unmatched_delimiters_stay_literal() {
    html_opts!([extension.superscript], "a^b\n", "<p>a^b</p>\n");
    html_opts!([extension.subscript], "a~b\n", "<p>a~b</p>\n");
}

#[test]
fn disabled_by_default() {
    html("^foo^ ~bar~\n", "<p>^foo^ ~bar~</p>\n");
}
