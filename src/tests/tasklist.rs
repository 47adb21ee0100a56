use super::*;

#[test]
fn tasklist() {
    html_opts!(
        [extension.tasklist],
        "- [ ] foo\n- [x] bar\n",
        concat!(
            "<ul>\n",
            "<li><input type=\"checkbox\" disabled=\"\" /> foo</li>\n",
            "<li><input type=\"checkbox\" checked=\"\" disabled=\"\" /> bar</li>\n",
            "</ul>\n"
        ),
    );
}

#[test]
fn uppercase_x_checks() {
    html_opts!(
        [extension.tasklist],
        "- [X] done\n",
        "<ul>\n<li><input type=\"checkbox\" checked=\"\" disabled=\"\" /> done</li>\n</ul>\n",
    );
}

#[test]
fn ordered_items_work_too() {
    html_opts!(
        [extension.tasklist],
        "1. [ ] foo\n",
        "<ol>\n<li><input type=\"checkbox\" disabled=\"\" /> foo</li>\n</ol>\n",
    );
}

#[test]
fn marker_must_lead_the_item() {
    html_opts!(
        [extension.tasklist],
        "- foo [ ] bar\n",
        "<ul>\n<li>foo [ ] bar</li>\n</ul>\n",
    );
}

#[test]
fn disabled_by_default() {
    html(
        "- [ ] foo\n",
        "<ul>\n<li>[ ] foo</li>\n</ul>\n",
    );
}
