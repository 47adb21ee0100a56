use std::sync::Mutex;

use crate::{markdown_to_html_with_plugins, BoxedError, CodeFn, Options, Plugins, RenderError};

#[test]
fn code_renderer_replaces_the_block() {
    let renderer = CodeFn(
        |buffer: &str, language: Option<&str>| -> Result<String, BoxedError> {
            Ok(format!(
                "<custom lang=\"{}\">{}</custom>\n",
                language.unwrap_or(""),
                buffer
            ))
        },
    );
    let mut plugins = Plugins::default();
    plugins.render.code_renderer = Some(&renderer);

    let out = markdown_to_html_with_plugins(
        "```c\nint x;\n```\n",
        &Options::default(),
        &plugins,
        None,
    )
    .unwrap();
    assert_eq!(out, "<custom lang=\"c\">int x;\n</custom>\n");
}

#[test]
fn indented_blocks_have_no_language() {
    let renderer = CodeFn(
        |buffer: &str, language: Option<&str>| -> Result<String, BoxedError> {
            assert_eq!(language, None);
            Ok(format!("<plain>{}</plain>\n", buffer))
        },
    );
    let mut plugins = Plugins::default();
    plugins.render.code_renderer = Some(&renderer);

    let out =
        markdown_to_html_with_plugins("    x = 1\n", &Options::default(), &plugins, None).unwrap();
    assert_eq!(out, "<plain>x = 1\n</plain>\n");
}

#[test]
fn invoked_once_per_block_in_document_order() {
    let seen: Mutex<Vec<String>> = Mutex::new(Vec::new());
    let renderer = CodeFn(
        |buffer: &str, _: Option<&str>| -> Result<String, BoxedError> {
            seen.lock().unwrap().push(buffer.to_string());
            Ok(String::from("<code-was-here />\n"))
        },
    );
    let mut plugins = Plugins::default();
    plugins.render.code_renderer = Some(&renderer);

    markdown_to_html_with_plugins(
        "```\nfirst\n```\n\ntext\n\n```\nsecond\n```\n",
        &Options::default(),
        &plugins,
        None,
    )
    .unwrap();
    assert_eq!(*seen.lock().unwrap(), vec!["first\n", "second\n"]);
}

#[test]
fn callback_error_fails_the_document() {
    let renderer = CodeFn(|_: &str, _: Option<&str>| -> Result<String, BoxedError> {
        Err("highlighter crashed".into())
    });
    let mut plugins = Plugins::default();
    plugins.render.code_renderer = Some(&renderer);

    let err = markdown_to_html_with_plugins(
        "before\n\n```\nx\n```\n",
        &Options::default(),
        &plugins,
        None,
    )
    .unwrap_err();
    assert!(matches!(err, RenderError::BadCallback(..)));
}

#[test]
fn renderer_output_is_trusted_raw_html() {
    let renderer = CodeFn(|_: &str, _: Option<&str>| -> Result<String, BoxedError> {
        Ok(String::from("<pre class=\"x\">&lt;kept&gt;</pre>\n"))
    });
    let mut plugins = Plugins::default();
    plugins.render.code_renderer = Some(&renderer);

    let out = markdown_to_html_with_plugins("```\na\n```\n", &Options::default(), &plugins, None)
        .unwrap();
    assert_eq!(out, "<pre class=\"x\">&lt;kept&gt;</pre>\n");
}
