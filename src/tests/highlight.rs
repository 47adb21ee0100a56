use crate::{render, Options, RenderError, SyntectAdapter};

#[test]
fn highlights_with_inline_styles() {
    let out = render(
        &["```c\nint main() {}\n```\n"],
        &Options::default(),
        Some("base16-ocean.light"),
    )
    .unwrap();
    assert!(out[0].starts_with("<pre><code class=\"language-c\">"));
    assert!(out[0].ends_with("</code></pre>\n"));
    assert!(out[0].contains("<span style=\"color:#"));
}

#[test]
fn no_language_highlights_as_plain_text() {
    let out = render(
        &["```\nplain text\n```\n"],
        &Options::default(),
        Some("base16-ocean.light"),
    )
    .unwrap();
    assert!(out[0].starts_with("<pre><code>"));
    assert!(out[0].contains("plain text"));
}

#[test]
fn unknown_language_is_an_error() {
    let err = render(
        &["```nosuchlanguage9\nx\n```\n"],
        &Options::default(),
        Some("base16-ocean.light"),
    )
    .unwrap_err();
    match err {
        RenderError::UnknownLanguage(name) => assert_eq!(name, "nosuchlanguage9"),
        other => panic!("expected UnknownLanguage, got {:?}", other),
    }
}

#[test]
fn unknown_theme_is_an_error() {
    let err = render(&["x\n"], &Options::default(), Some("no-such-theme")).unwrap_err();
    match err {
        RenderError::UnknownTheme(name) => assert_eq!(name, "no-such-theme"),
        other => panic!("expected UnknownTheme, got {:?}", other),
    }
}

#[test]
fn theme_aliases_resolve() {
    assert!(SyntectAdapter::new("solarized.dark").is_ok());
    assert!(SyntectAdapter::new("Solarized (dark)").is_ok());
    assert!(SyntectAdapter::new("inspired-github.light").is_ok());
    assert!(SyntectAdapter::new("InspiredGitHub").is_ok());
}

#[test]
fn theme_only_affects_code_blocks() {
    let out = render(
        &["just a *paragraph*\n"],
        &Options::default(),
        Some("base16-ocean.light"),
    )
    .unwrap();
    assert_eq!(out[0], "<p>just a <em>paragraph</em></p>\n");
}
