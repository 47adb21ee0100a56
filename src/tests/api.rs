use crate::{html, markdown_to_html, render, Event, Options, Parser, RenderError};

#[test]
fn batch_preserves_input_order() {
    let out = render(
        &["# a\n", "*b*\n", "plain\n"],
        &Options::default(),
        None,
    )
    .unwrap();
    assert_eq!(
        out,
        vec![
            "<h1>a</h1>\n".to_string(),
            "<p><em>b</em></p>\n".to_string(),
            "<p>plain</p>\n".to_string(),
        ],
    );
}

#[test]
fn one_bad_document_fails_the_whole_batch() {
    let mut options = Options::default();
    options.extension.math = true;

    let result = render(&["fine\n", "$x$\n", "also fine\n"], &options, None);
    assert!(matches!(result, Err(RenderError::CannotRenderMath)));
}

#[test]
fn serializing_an_event_stream_is_idempotent() {
    let options = Options::default();
    let events: Vec<Event> =
        Parser::new("# h\n\n- a\n- b\n\n> q *em*\n", &options).collect();

    let mut first = String::new();
    html::push_html(&mut first, events.iter().cloned());
    let mut second = String::new();
    html::push_html(&mut second, events.into_iter());
    assert_eq!(first, second);
}

#[test]
fn extensions_do_not_perturb_plain_documents() {
    let input = "# Title\n\nSome *plain* paragraph with [a link](/x).\n\n- one\n- two\n";

    let baseline = markdown_to_html(input, &Options::default()).unwrap();

    let mut options = Options::default();
    options.extension.table = true;
    options.extension.footnotes = true;
    options.extension.strikethrough = true;
    options.extension.tasklist = true;
    options.extension.smart_punctuation = true;
    options.extension.heading_attributes = true;
    options.extension.gfm_alerts = true;
    options.extension.definition_lists = true;
    options.extension.superscript = true;
    options.extension.wikilinks = true;
    options.extension.math = true;

    assert_eq!(markdown_to_html(input, &options).unwrap(), baseline);
}

#[test]
fn conflicting_footnote_flavors_are_rejected() {
    let mut options = Options::default();
    options.extension.footnotes = true;
    options.extension.old_footnotes = true;

    let err = markdown_to_html("x\n", &options).unwrap_err();
    assert!(matches!(err, RenderError::BadOptions(..)));
}

#[test]
fn conflicting_tilde_claims_are_rejected() {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.subscript = true;

    let err = markdown_to_html("x\n", &options).unwrap_err();
    assert!(matches!(err, RenderError::BadOptions(..)));
}

#[test]
fn failed_documents_return_no_partial_html() {
    let mut options = Options::default();
    options.extension.math = true;

    let result = markdown_to_html("before\n\n$x$\n\nafter\n", &options);
    assert!(result.is_err());
}

#[test]
fn extension_builder() {
    let extension = crate::Extension::builder()
        .table(true)
        .strikethrough(true)
        .build();
    assert!(extension.table);
    assert!(extension.strikethrough);
    assert!(!extension.footnotes);
}
