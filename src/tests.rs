use crate::{markdown_to_html, Options};

mod alerts;
mod api;
mod core;
mod css;
mod definition_lists;
mod footnotes;
mod heading_attributes;
mod highlight;
mod pathological;
mod plugins;
mod smart_punct;
mod supersubscript;
mod tasklist;

#[track_caller]
pub fn html(input: &str, expected: &str) {
    html_opts_i(input, expected, |_| ());
}

#[track_caller]
pub fn html_opts_i<F>(input: &str, expected: &str, opts: F)
where
    F: Fn(&mut Options),
{
    let mut options = Options::default();
    opts(&mut options);

    let output = markdown_to_html(input, &options).unwrap();
    if output != expected {
        println!("Got:");
        println!("==============================");
        println!("{}", output);
        println!("==============================");
        println!("Expected:");
        println!("==============================");
        println!("{}", expected);
        println!("==============================");
    }
    assert_eq!(output, expected);
}

macro_rules! html_opts {
    ([$($optclass:ident.$optname:ident),*], $lhs:expr, $rhs:expr $(,)?) => {
        crate::tests::html_opts_i($lhs, $rhs, |opts| {
            $(opts.$optclass.$optname = true;)*
        })
    };
}

pub(crate) use html_opts;
