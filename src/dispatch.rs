//! The callback dispatcher: an iterator adapter that intercepts code
//! blocks and math spans on their way to the serializer.
//!
//! Code block bodies are buffered between their start and end tags and
//! handed to the configured renderer as one string; the renderer's output
//! replaces the whole block as trusted raw HTML.  Each renderer is invoked
//! at most once per construct, synchronously, in document order.

use std::mem::take;

use crate::adapters::{CodeRenderer, MathRenderer};
use crate::error::RenderError;
use crate::events::{Event, Tag, TagEnd};
use crate::parser::Parser;

#[derive(Default)]
enum State {
    #[default]
    Default,
    CodeBlock {
        buffer: String,
        language: Option<String>,
    },
}

/// Wraps a [`Parser`], yielding its events with code and math routed
/// through the configured renderers.
pub(crate) struct Dispatcher<'p, 'o> {
    parser: Parser<'o>,
    code_renderer: Option<&'p dyn CodeRenderer>,
    math_renderer: Option<&'p dyn MathRenderer>,
    state: State,
}

impl<'p, 'o> Dispatcher<'p, 'o> {
    pub fn new(
        parser: Parser<'o>,
        code_renderer: Option<&'p dyn CodeRenderer>,
        math_renderer: Option<&'p dyn MathRenderer>,
    ) -> Self {
        Dispatcher {
            parser,
            code_renderer,
            math_renderer,
            state: State::Default,
        }
    }

    fn render_code(&self, buffer: &str, language: Option<&str>) -> Result<Event, RenderError> {
        // Only reachable when a code renderer is configured; see `next`.
        let renderer = self.code_renderer.expect("code renderer configured");
        renderer.render_code(buffer, language).map(Event::Html)
    }

    fn render_math(&self, buffer: &str, display: bool) -> Result<Event, RenderError> {
        match self.math_renderer {
            Some(renderer) => renderer.render_math(buffer, display).map(Event::Html),
            None => Err(RenderError::CannotRenderMath),
        }
    }
}

impl<'p, 'o> Iterator for Dispatcher<'p, 'o> {
    type Item = Result<Event, RenderError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let event = match self.parser.next() {
                Some(event) => event,
                None => {
                    // A malformed stream could end inside a block; flush
                    // rather than drop the buffer.
                    if let State::CodeBlock { buffer, language } = take(&mut self.state) {
                        return Some(self.render_code(&buffer, language.as_deref()));
                    }
                    return None;
                }
            };

            if let State::CodeBlock { buffer, language } = &mut self.state {
                match event {
                    Event::End(TagEnd::CodeBlock) => {
                        let (buffer, language) = (take(buffer), take(language));
                        self.state = State::Default;
                        return Some(self.render_code(&buffer, language.as_deref()));
                    }
                    Event::Text(text) => {
                        buffer.push_str(&text);
                        continue;
                    }
                    _ => continue,
                }
            }

            match event {
                Event::InlineMath(math) => return Some(self.render_math(&math, false)),
                Event::DisplayMath(math) => return Some(self.render_math(&math, true)),

                Event::Start(Tag::CodeBlock(kind)) if self.code_renderer.is_some() => {
                    self.state = State::CodeBlock {
                        buffer: String::new(),
                        language: kind.language().map(String::from),
                    };
                    continue;
                }

                event => return Some(Ok(event)),
            }
        }
    }
}
