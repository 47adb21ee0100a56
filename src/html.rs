//! HTML serialization of the event stream.
//!
//! The serializer walks the stream strictly in order, mirroring open tags
//! on a stack.  Serialization never fails on a well-formed stream; a
//! mismatched end tag is an internal invariant violation and only checked
//! in debug builds.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::fmt::Write;

use crate::character_set::character_set;
use crate::events::{Alignment, Event, Tag, TagEnd};

/// Serializes `events` onto the end of `output`.
pub fn push_html<I>(output: &mut String, events: I)
where
    I: Iterator<Item = Event>,
{
    HtmlWriter::new(output, events).run();
}

const HREF_SAFE: [bool; 256] = character_set(&[
    b"abcdefghijklmnopqrstuvwxyz",
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZ",
    b"0123456789",
    b"-_.+!*'(),%#@?=;:/&$~",
]);

/// Escapes `&`, `<`, `>`, and `"` into `buf`.
pub(crate) fn escape_into(buf: &mut String, s: &str) {
    let bytes = s.as_bytes();
    let matcher = jetscii::bytes!(b'"', b'&', b'<', b'>');
    let mut ix = 0;
    while ix < bytes.len() {
        match matcher.find(&bytes[ix..]) {
            Some(offset) => {
                buf.push_str(&s[ix..ix + offset]);
                buf.push_str(match bytes[ix + offset] {
                    b'"' => "&quot;",
                    b'&' => "&amp;",
                    b'<' => "&lt;",
                    _ => "&gt;",
                });
                ix += offset + 1;
            }
            None => {
                buf.push_str(&s[ix..]);
                break;
            }
        }
    }
}

/// Escapes an href attribute value: safe bytes pass through, quotes and
/// ampersands become entities, everything else is percent-encoded.
pub(crate) fn escape_href_into(buf: &mut String, s: &str) {
    for &byte in s.as_bytes() {
        if HREF_SAFE[byte as usize] {
            match byte {
                b'&' => buf.push_str("&amp;"),
                b'\'' => buf.push_str("&#x27;"),
                _ => buf.push(byte as char),
            }
        } else if byte == b'"' {
            buf.push_str("&quot;");
        } else {
            let _ = write!(buf, "%{:02X}", byte);
        }
    }
}

#[derive(PartialEq)]
enum TableState {
    Outside,
    Head,
    Body,
}

struct HtmlWriter<'o, I> {
    events: I,
    output: &'o mut String,
    end_newline: bool,

    table_state: TableState,
    table_alignments: Vec<Alignment>,
    table_cell_index: usize,
    tbody_open: bool,

    /// Footnote labels in order of first reference; the 1-based position
    /// is the visible number.
    footnote_numbers: FxHashMap<String, usize>,

    open_tags: SmallVec<[TagEnd; 16]>,
}

impl<'o, I> HtmlWriter<'o, I>
where
    I: Iterator<Item = Event>,
{
    fn new(output: &'o mut String, events: I) -> Self {
        let end_newline = output.is_empty() || output.ends_with('\n');
        HtmlWriter {
            events,
            output,
            end_newline,
            table_state: TableState::Outside,
            table_alignments: Vec::new(),
            table_cell_index: 0,
            tbody_open: false,
            footnote_numbers: FxHashMap::default(),
            open_tags: SmallVec::new(),
        }
    }

    fn run(&mut self) {
        while let Some(event) = self.events.next() {
            self.event(event);
        }
        debug_assert!(self.open_tags.is_empty());
    }

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
        if !s.is_empty() {
            self.end_newline = s.ends_with('\n');
        }
    }

    fn cr(&mut self) {
        if !self.end_newline {
            self.write("\n");
        }
    }

    fn escape(&mut self, s: &str) {
        escape_into(self.output, s);
        if !s.is_empty() {
            self.end_newline = s.ends_with('\n');
        }
    }

    fn footnote_ix(&mut self, label: &str) -> usize {
        let next = self.footnote_numbers.len() + 1;
        *self
            .footnote_numbers
            .entry(label.to_string())
            .or_insert(next)
    }

    fn event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.escape(&text),
            Event::Code(code) => {
                self.write("<code>");
                self.escape(&code);
                self.write("</code>");
            }
            Event::Html(html) => self.write(&html),
            Event::InlineMath(math) => {
                self.write("<span data-math-style=\"inline\">");
                self.escape(&math);
                self.write("</span>");
            }
            Event::DisplayMath(math) => {
                self.write("<span data-math-style=\"display\">");
                self.escape(&math);
                self.write("</span>");
            }
            Event::FootnoteReference(label) => {
                let ix = self.footnote_ix(&label);
                self.write("<sup class=\"footnote-reference\"><a href=\"#");
                escape_href_into(self.output, &label);
                let _ = write!(self.output, "\">{}</a></sup>", ix);
                self.end_newline = false;
            }
            Event::TaskListMarker(true) => {
                self.write("<input type=\"checkbox\" checked=\"\" disabled=\"\" /> ");
            }
            Event::TaskListMarker(false) => {
                self.write("<input type=\"checkbox\" disabled=\"\" /> ");
            }
            Event::SoftBreak => self.write("\n"),
            Event::HardBreak => self.write("<br />\n"),
            Event::Rule => {
                self.cr();
                self.write("<hr />\n");
            }
        }
    }

    fn start_tag(&mut self, tag: Tag) {
        self.open_tags.push(tag.to_end());
        match tag {
            Tag::Paragraph => {
                self.cr();
                self.write("<p>");
            }
            Tag::Heading { level, id, classes } => {
                self.cr();
                let _ = write!(self.output, "<h{}", level.as_u8());
                if let Some(id) = id {
                    self.write(" id=\"");
                    self.escape(&id);
                    self.write("\"");
                }
                if !classes.is_empty() {
                    self.write(" class=\"");
                    for (i, class) in classes.iter().enumerate() {
                        if i > 0 {
                            self.write(" ");
                        }
                        self.escape(class);
                    }
                    self.write("\"");
                }
                self.write(">");
            }
            Tag::BlockQuote(None) => {
                self.cr();
                self.write("<blockquote>\n");
            }
            Tag::BlockQuote(Some(alert)) => {
                self.cr();
                self.write("<blockquote class=\"");
                self.write(alert.css_class());
                self.write("\">\n");
            }
            Tag::CodeBlock(kind) => {
                self.cr();
                self.write("<pre><code");
                if let Some(language) = kind.language() {
                    self.write(" class=\"language-");
                    self.escape(language);
                    self.write("\"");
                }
                self.write(">");
            }
            Tag::List(None) => {
                self.cr();
                self.write("<ul>\n");
            }
            Tag::List(Some(1)) => {
                self.cr();
                self.write("<ol>\n");
            }
            Tag::List(Some(start)) => {
                self.cr();
                let _ = write!(self.output, "<ol start=\"{}\">\n", start);
                self.end_newline = true;
            }
            Tag::Item => {
                self.cr();
                self.write("<li>");
            }
            Tag::FootnoteDefinition(label) => {
                self.cr();
                self.write("<div class=\"footnote-definition\" id=\"");
                escape_href_into(self.output, &label);
                self.write("\"><sup class=\"footnote-definition-label\">");
                let ix = self.footnote_ix(&label);
                let _ = write!(self.output, "{}", ix);
                self.write("</sup>");
            }
            Tag::DefinitionList => {
                self.cr();
                self.write("<dl>\n");
            }
            Tag::DefinitionListTitle => {
                self.cr();
                self.write("<dt>");
            }
            Tag::DefinitionListDefinition => {
                self.cr();
                self.write("<dd>");
            }
            Tag::Table(alignments) => {
                self.table_alignments = alignments;
                self.tbody_open = false;
                self.cr();
                self.write("<table>\n");
            }
            Tag::TableHead => {
                self.table_state = TableState::Head;
                self.table_cell_index = 0;
                self.write("<thead>\n<tr>\n");
            }
            Tag::TableRow => {
                self.table_cell_index = 0;
                if !self.tbody_open {
                    self.tbody_open = true;
                    self.write("<tbody>\n");
                }
                self.write("<tr>\n");
            }
            Tag::TableCell => {
                self.write(if self.table_state == TableState::Head {
                    "<th"
                } else {
                    "<td"
                });
                match self.table_alignments.get(self.table_cell_index) {
                    Some(Alignment::Left) => self.write(" align=\"left\""),
                    Some(Alignment::Center) => self.write(" align=\"center\""),
                    Some(Alignment::Right) => self.write(" align=\"right\""),
                    _ => {}
                }
                self.write(">");
            }
            Tag::Emphasis => self.write("<em>"),
            Tag::Strong => self.write("<strong>"),
            Tag::Strikethrough => self.write("<del>"),
            Tag::Superscript => self.write("<sup>"),
            Tag::Subscript => self.write("<sub>"),
            Tag::Link {
                dest_url, title, ..
            } => {
                self.write("<a href=\"");
                escape_href_into(self.output, &dest_url);
                if !title.is_empty() {
                    self.write("\" title=\"");
                    self.escape(&title);
                }
                self.write("\">");
            }
            Tag::Image { dest_url, title } => {
                self.write("<img src=\"");
                escape_href_into(self.output, &dest_url);
                self.write("\" alt=\"");
                self.raw_alt_text();
                if !title.is_empty() {
                    self.write("\" title=\"");
                    self.escape(&title);
                }
                self.write("\" />");
                self.open_tags.pop();
            }
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        let opened = self.open_tags.pop();
        debug_assert_eq!(opened, Some(tag));
        match tag {
            TagEnd::Paragraph => self.write("</p>\n"),
            TagEnd::Heading(level) => {
                let _ = write!(self.output, "</h{}>\n", level.as_u8());
                self.end_newline = true;
            }
            TagEnd::BlockQuote(..) => {
                self.cr();
                self.write("</blockquote>\n");
            }
            TagEnd::CodeBlock => self.write("</code></pre>\n"),
            TagEnd::List(false) => self.write("</ul>\n"),
            TagEnd::List(true) => self.write("</ol>\n"),
            TagEnd::Item => self.write("</li>\n"),
            TagEnd::FootnoteDefinition => {
                self.cr();
                self.write("</div>\n");
            }
            TagEnd::DefinitionList => {
                self.cr();
                self.write("</dl>\n");
            }
            TagEnd::DefinitionListTitle => self.write("</dt>\n"),
            TagEnd::DefinitionListDefinition => self.write("</dd>\n"),
            TagEnd::Table => {
                if self.tbody_open {
                    self.write("</tbody>\n");
                    self.tbody_open = false;
                }
                self.write("</table>\n");
                self.table_state = TableState::Outside;
            }
            TagEnd::TableHead => {
                self.write("</tr>\n</thead>\n");
                self.table_state = TableState::Body;
            }
            TagEnd::TableRow => self.write("</tr>\n"),
            TagEnd::TableCell => {
                self.write(if self.table_state == TableState::Head {
                    "</th>\n"
                } else {
                    "</td>\n"
                });
                self.table_cell_index += 1;
            }
            TagEnd::Emphasis => self.write("</em>"),
            TagEnd::Strong => self.write("</strong>"),
            TagEnd::Strikethrough => self.write("</del>"),
            TagEnd::Superscript => self.write("</sup>"),
            TagEnd::Subscript => self.write("</sub>"),
            TagEnd::Link => self.write("</a>"),
            TagEnd::Image => {}
        }
    }

    /// Consumes the image's inner events, writing their text content as
    /// the escaped alt attribute value.
    fn raw_alt_text(&mut self) {
        let mut nest = 0;
        while let Some(event) = self.events.next() {
            match event {
                Event::Start(Tag::Image { .. }) => nest += 1,
                Event::Start(..) => {}
                Event::End(TagEnd::Image) => {
                    if nest == 0 {
                        return;
                    }
                    nest -= 1;
                }
                Event::End(..) => {}
                Event::Text(text) | Event::Code(text) => self.escape(&text),
                Event::InlineMath(math) | Event::DisplayMath(math) => self.escape(&math),
                Event::SoftBreak | Event::HardBreak => self.escape(" "),
                Event::FootnoteReference(..)
                | Event::Html(..)
                | Event::TaskListMarker(..)
                | Event::Rule => {}
            }
        }
    }
}
