use super::*;

#[test]
fn quotes() {
    html_opts!(
        [extension.smart_punctuation],
        "'foo' \"bar\"\n",
        "<p>\u{2018}foo\u{2019} \u{201c}bar\u{201d}</p>\n",
    );
}

#[test]
fn apostrophes() {
    html_opts!(
        [extension.smart_punctuation],
        "don't\n",
        "<p>don\u{2019}t</p>\n",
    );
}

#[test]
fn dashes() {
    html_opts!(
        [extension.smart_punctuation],
        "baz--qux\n",
        "<p>baz\u{2013}qux</p>\n",
    );
    html_opts!(
        [extension.smart_punctuation],
        "a---b\n",
        "<p>a\u{2014}b</p>\n",
    );
    html_opts!(
        [extension.smart_punctuation],
        "a-b\n",
        "<p>a-b</p>\n",
    );
}

#[test]
fn ellipsis() {
    html_opts!(
        [extension.smart_punctuation],
        "wait...\n",
        "<p>wait\u{2026}</p>\n",
    );
}

#[test]
fn never_inside_code() {
    html_opts!(
        [extension.smart_punctuation],
        "`'a' -- \"b\"`\n",
        "<p><code>'a' -- &quot;b&quot;</code></p>\n",
    );
    html_opts!(
        [extension.smart_punctuation],
        "    'a' -- \"b\"\n",
        "<pre><code>'a' -- &quot;b&quot;\n</code></pre>\n",
    );
}

#[test]
fn disabled_by_default() {
    html("'foo' --\n", "<p>'foo' --</p>\n");
}
