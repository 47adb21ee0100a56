use super::*;

#[test]
fn id_and_class() {
    html_opts!(
        [extension.heading_attributes],
        "# foo {#bar .baz}\n",
        "<h1 id=\"bar\" class=\"baz\">foo</h1>\n",
    );
}

#[test]
fn multiple_classes() {
    html_opts!(
        [extension.heading_attributes],
        "## t {#i .a .b}\n",
        "<h2 id=\"i\" class=\"a b\">t</h2>\n",
    );
}

#[test]
fn classes_only() {
    html_opts!(
        [extension.heading_attributes],
        "# foo {.baz}\n",
        "<h1 class=\"baz\">foo</h1>\n",
    );
}

#[test]
fn setext_headings_take_attributes() {
    html_opts!(
        [extension.heading_attributes],
        "foo {#bar}\n===\n",
        "<h1 id=\"bar\">foo</h1>\n",
    );
}

#[test]
fn malformed_group_stays_literal() {
    html_opts!(
        [extension.heading_attributes],
        "# foo {bar}\n",
        "<h1>foo {bar}</h1>\n",
    );
}

#[test]
fn disabled_by_default() {
    html("# foo {#bar .baz}\n", "<h1>foo {#bar .baz}</h1>\n");
}
