use ntest::timeout;

use crate::{markdown_to_html, Options};

#[test]
#[timeout(4000)]
fn deeply_nested_brackets() {
    let input = "[".repeat(20_000) + "a" + &"]".repeat(20_000);
    markdown_to_html(&input, &Options::default()).unwrap();
}

#[test]
#[timeout(4000)]
fn long_unmatched_emphasis_runs() {
    let input = "*a **a ".repeat(5_000);
    markdown_to_html(&input, &Options::default()).unwrap();
}

#[test]
#[timeout(4000)]
fn deep_blockquote_nesting() {
    let input = "> ".repeat(2_000) + "a\n";
    markdown_to_html(&input, &Options::default()).unwrap();
}

#[test]
#[timeout(4000)]
fn many_link_reference_definitions() {
    let mut input = String::new();
    for i in 0..10_000 {
        input.push_str(&format!("[l{}]: /u{}\n", i, i));
    }
    markdown_to_html(&input, &Options::default()).unwrap();
}
