use crate::{css, RenderError, THEMES};

#[test]
fn defined_for_every_catalogued_theme() {
    for theme in THEMES {
        let sheet = css(theme).unwrap();
        assert!(sheet.contains("color"), "no colors in stylesheet for {}", theme);
    }
}

#[test]
fn stable_across_calls() {
    for theme in THEMES {
        assert_eq!(css(theme).unwrap(), css(theme).unwrap());
    }
}

#[test]
fn upstream_names_are_aliases() {
    assert_eq!(
        css("solarized.light").unwrap(),
        css("Solarized (light)").unwrap()
    );
}

#[test]
fn unknown_theme_is_an_error() {
    let err = css("vaporwave").unwrap_err();
    assert!(matches!(err, RenderError::UnknownTheme(..)));
}
