use super::*;

#[test]
fn note() {
    html_opts!(
        [extension.gfm_alerts],
        "> [!NOTE]\n> foo\n",
        "<blockquote class=\"markdown-alert-note\">\n<p>foo</p>\n</blockquote>\n",
    );
}

#[test]
fn all_keywords() {
    for (keyword, class) in [
        ("NOTE", "note"),
        ("TIP", "tip"),
        ("IMPORTANT", "important"),
        ("WARNING", "warning"),
        ("CAUTION", "caution"),
    ] {
        html_opts_i(
            &format!("> [!{}]\n> body\n", keyword),
            &format!(
                "<blockquote class=\"markdown-alert-{}\">\n<p>body</p>\n</blockquote>\n",
                class
            ),
            |opts| opts.extension.gfm_alerts = true,
        );
    }
}

#[test]
fn keyword_is_case_sensitive() {
    html_opts!(
        [extension.gfm_alerts],
        "> [!note]\n> foo\n",
        "<blockquote>\n<p>[!note]\nfoo</p>\n</blockquote>\n",
    );
}

#[test]
fn marker_must_be_alone_on_its_line() {
    html_opts!(
        [extension.gfm_alerts],
        "> [!NOTE] extra\n",
        "<blockquote>\n<p>[!NOTE] extra</p>\n</blockquote>\n",
    );
}

#[test]
fn disabled_by_default() {
    html(
        "> [!NOTE]\n> foo\n",
        "<blockquote>\n<p>[!NOTE]\nfoo</p>\n</blockquote>\n",
    );
}
