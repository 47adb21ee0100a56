//! Inline parsing.
//!
//! Runs over one finished block's accumulated text.  Inline constructs are
//! built into a small arena tree so emphasis and link resolution can wrap
//! earlier siblings, then the tree is flattened into events.
//!
//! Precedence falls out of the scan order: code spans, raw HTML and
//! autolinks, math, then bracket constructs, with delimiter-run matching
//! resolved afterwards by `process_emphasis`.  Anything that fails to
//! close degrades to literal text.

use unicode_categories::UnicodeCategories;

use crate::entity;
use crate::events::{Event, LinkType, Tag};
use crate::parser::{Extension, RefMap};
use crate::scanners;
use crate::strings::{self, is_space_or_tab};

const MAX_LINK_LABEL: usize = 1000;

#[derive(Debug)]
enum Value {
    Root,
    Text(String),
    Code(String),
    Html(String),
    SoftBreak,
    HardBreak,
    InlineMath(String),
    DisplayMath(String),
    FootnoteReference(String),
    Emph,
    Strong,
    Strikethrough,
    Superscript,
    Subscript,
    Link {
        link_type: LinkType,
        url: String,
        title: String,
    },
    Image {
        url: String,
        title: String,
    },
}

struct Node {
    value: Value,
    parent: Option<usize>,
    prev: Option<usize>,
    next: Option<usize>,
    first_child: Option<usize>,
    last_child: Option<usize>,
}

struct Delimiter {
    node: usize,
    delim_char: u8,
    length: usize,
    can_open: bool,
    can_close: bool,
    deleted: bool,
}

struct Bracket {
    /// The literal `[` or `![` text node.
    node: usize,
    /// Byte offset just past the opening bracket, for label extraction.
    position: usize,
    /// Delimiter-stack length when the bracket was pushed.
    delim_bottom: usize,
    image: bool,
    active: bool,
}

pub(crate) struct Subject<'s, 'r> {
    input: &'s str,
    pos: usize,
    options: &'s Extension,
    refmap: &'r RefMap,
    special_chars: [bool; 256],

    nodes: Vec<Node>,
    delimiters: Vec<Delimiter>,
    brackets: Vec<Bracket>,
}

/// Parses `content` and appends the resulting events to `out`.
pub(crate) fn parse(content: &str, options: &Extension, refmap: &RefMap, out: &mut Vec<Event>) {
    let mut subject = Subject::new(content, options, refmap);
    while !subject.eof() {
        subject.parse_inline();
    }
    subject.process_emphasis(0);
    subject.flatten(0, out);
}

impl<'s, 'r> Subject<'s, 'r> {
    fn new(input: &'s str, options: &'s Extension, refmap: &'r RefMap) -> Self {
        let mut special_chars = [false; 256];
        for &c in b"\r\n`\\&<>[]!*_" {
            special_chars[c as usize] = true;
        }
        if options.strikethrough || options.subscript {
            special_chars[b'~' as usize] = true;
        }
        if options.superscript {
            special_chars[b'^' as usize] = true;
        }
        if options.math {
            special_chars[b'$' as usize] = true;
        }
        if options.smart_punctuation {
            for &c in b"'\"-." {
                special_chars[c as usize] = true;
            }
        }

        Subject {
            input,
            pos: 0,
            options,
            refmap,
            special_chars,
            nodes: vec![Node {
                value: Value::Root,
                parent: None,
                prev: None,
                next: None,
                first_child: None,
                last_child: None,
            }],
            delimiters: Vec::new(),
            brackets: Vec::new(),
        }
    }

    //
    // Tree plumbing.
    //

    fn new_node(&mut self, value: Value) -> usize {
        self.nodes.push(Node {
            value,
            parent: None,
            prev: None,
            next: None,
            first_child: None,
            last_child: None,
        });
        self.nodes.len() - 1
    }

    fn append(&mut self, value: Value) -> usize {
        let id = self.new_node(value);
        self.append_id(0, id);
        id
    }

    fn append_id(&mut self, parent: usize, id: usize) {
        self.nodes[id].parent = Some(parent);
        self.nodes[id].prev = self.nodes[parent].last_child;
        self.nodes[id].next = None;
        if let Some(last) = self.nodes[parent].last_child {
            self.nodes[last].next = Some(id);
        } else {
            self.nodes[parent].first_child = Some(id);
        }
        self.nodes[parent].last_child = Some(id);
    }

    fn detach(&mut self, id: usize) {
        let (parent, prev, next) = (self.nodes[id].parent, self.nodes[id].prev, self.nodes[id].next);
        if let Some(prev) = prev {
            self.nodes[prev].next = next;
        } else if let Some(parent) = parent {
            self.nodes[parent].first_child = next;
        }
        if let Some(next) = next {
            self.nodes[next].prev = prev;
        } else if let Some(parent) = parent {
            self.nodes[parent].last_child = prev;
        }
        self.nodes[id].parent = None;
        self.nodes[id].prev = None;
        self.nodes[id].next = None;
    }

    fn insert_after(&mut self, anchor: usize, id: usize) {
        let parent = self.nodes[anchor].parent.expect("anchor must be attached");
        let next = self.nodes[anchor].next;
        self.nodes[id].parent = Some(parent);
        self.nodes[id].prev = Some(anchor);
        self.nodes[id].next = next;
        self.nodes[anchor].next = Some(id);
        match next {
            Some(next) => self.nodes[next].prev = Some(id),
            None => self.nodes[parent].last_child = Some(id),
        }
    }

    /// Moves every sibling after `anchor` into `target`, preserving order.
    fn reparent_following_siblings(&mut self, anchor: usize, target: usize) {
        let mut cursor = self.nodes[anchor].next;
        while let Some(id) = cursor {
            if id == target {
                cursor = self.nodes[id].next;
                continue;
            }
            let next = self.nodes[id].next;
            self.detach(id);
            self.append_id(target, id);
            cursor = next;
        }
    }

    fn text_mut(&mut self, id: usize) -> &mut String {
        match &mut self.nodes[id].value {
            Value::Text(s) => s,
            _ => unreachable!("delimiter nodes are text"),
        }
    }

    //
    // Scanning.
    //

    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn byte(&self) -> u8 {
        self.input.as_bytes()[self.pos]
    }

    fn peek_byte(&self, n: usize) -> Option<u8> {
        self.input.as_bytes().get(self.pos + n).copied()
    }

    fn char_before(&self, pos: usize) -> char {
        if pos == 0 {
            return '\n';
        }
        self.input[..pos].chars().next_back().unwrap_or('\n')
    }

    fn char_at(&self, pos: usize) -> char {
        self.input[pos..].chars().next().unwrap_or('\n')
    }

    fn take_while(&mut self, c: u8) -> usize {
        let start = self.pos;
        while !self.eof() && self.byte() == c {
            self.pos += 1;
        }
        self.pos - start
    }

    fn parse_inline(&mut self) {
        match self.byte() {
            b'\r' | b'\n' => self.handle_newline(),
            b'`' => self.handle_backticks(),
            b'\\' => self.handle_backslash(),
            b'&' => self.handle_entity(),
            b'<' => self.handle_pointy_brace(),
            b'*' | b'_' => self.handle_delim(),
            b'~' if self.options.strikethrough || self.options.subscript => self.handle_delim(),
            b'^' if self.options.superscript => self.handle_delim(),
            b'\'' | b'"' if self.options.smart_punctuation => self.handle_quote(),
            b'-' if self.options.smart_punctuation => self.handle_hyphen(),
            b'.' if self.options.smart_punctuation => self.handle_period(),
            b'$' if self.options.math => self.handle_dollars(),
            b'[' => self.handle_open_bracket(),
            b']' => self.handle_close_bracket(),
            b'!' => self.handle_bang(),
            _ => self.handle_text(),
        }
    }

    fn handle_text(&mut self) {
        let start = self.pos;
        self.pos += 1;
        while !self.eof() && !self.special_chars[self.byte() as usize] {
            self.pos += 1;
        }
        self.append(Value::Text(self.input[start..self.pos].to_string()));
    }

    fn handle_newline(&mut self) {
        if self.byte() == b'\r' {
            self.pos += 1;
        }
        if !self.eof() && self.byte() == b'\n' {
            self.pos += 1;
        }

        let mut hard = false;
        if let Some(last) = self.nodes[0].last_child {
            if let Value::Text(text) = &mut self.nodes[last].value {
                let spaces = text.len() - text.trim_end_matches(' ').len();
                if spaces > 0 {
                    hard = spaces >= 2;
                    text.truncate(text.len() - spaces);
                }
            }
        }
        self.append(if hard { Value::HardBreak } else { Value::SoftBreak });

        // Leading spaces of the next line are not content.
        while !self.eof() && self.byte() == b' ' {
            self.pos += 1;
        }
    }

    fn handle_backslash(&mut self) {
        self.pos += 1;
        if self.eof() {
            self.append(Value::Text("\\".to_string()));
            return;
        }
        let c = self.byte();
        if strings::ispunct(c) {
            self.pos += 1;
            self.append(Value::Text((c as char).to_string()));
        } else if strings::is_line_end_char(c) {
            self.handle_newline_after_backslash();
        } else {
            self.append(Value::Text("\\".to_string()));
        }
    }

    fn handle_newline_after_backslash(&mut self) {
        if self.byte() == b'\r' {
            self.pos += 1;
        }
        if !self.eof() && self.byte() == b'\n' {
            self.pos += 1;
        }
        self.append(Value::HardBreak);
        while !self.eof() && self.byte() == b' ' {
            self.pos += 1;
        }
    }

    fn handle_backticks(&mut self) {
        let openticks = self.take_while(b'`');
        let start = self.pos;

        match self.scan_to_closing_backtick(openticks) {
            Some(end) => {
                let contents = &self.input[start..end - openticks];
                self.append(Value::Code(strings::normalize_code(contents)));
            }
            None => {
                self.pos = start;
                self.append(Value::Text("`".repeat(openticks)));
            }
        }
    }

    /// Advances past the next backtick run of exactly `openticks`, returning
    /// the position after it.
    fn scan_to_closing_backtick(&mut self, openticks: usize) -> Option<usize> {
        loop {
            let rest = &self.input.as_bytes()[self.pos..];
            let offset = rest.iter().position(|&c| c == b'`')?;
            self.pos += offset;
            let run = self.take_while(b'`');
            if run == openticks {
                return Some(self.pos);
            }
        }
    }

    fn handle_entity(&mut self) {
        self.pos += 1;
        match entity::lookup(&self.input[self.pos..]) {
            Some((decoded, consumed)) => {
                self.pos += consumed;
                self.append(Value::Text(decoded));
            }
            None => {
                self.append(Value::Text("&".to_string()));
            }
        }
    }

    fn handle_pointy_brace(&mut self) {
        self.pos += 1;
        let rest = &self.input[self.pos..];

        if let Some(len) = scanners::autolink_uri(rest) {
            let body = &rest[..len - 1];
            self.pos += len;
            let link = self.append(Value::Link {
                link_type: LinkType::Autolink,
                url: entity::unescape_html(body),
                title: String::new(),
            });
            let text = self.new_node(Value::Text(body.to_string()));
            self.append_id(link, text);
            return;
        }

        if let Some(len) = scanners::autolink_email(rest) {
            let body = &rest[..len - 1];
            self.pos += len;
            let link = self.append(Value::Link {
                link_type: LinkType::Email,
                url: format!("mailto:{}", body),
                title: String::new(),
            });
            let text = self.new_node(Value::Text(body.to_string()));
            self.append_id(link, text);
            return;
        }

        if let Some(len) = scanners::html_tag(rest) {
            let tag = &rest[..len];
            self.pos += len;
            self.append(Value::Html(format!("<{}", tag)));
            return;
        }

        self.append(Value::Text("<".to_string()));
    }

    fn handle_dollars(&mut self) {
        let start = self.pos;
        let opendollars = self.take_while(b'$');

        if opendollars >= 2 {
            // Display math runs to the next `$$`.
            let rest = &self.input[self.pos..];
            if let Some(close) = rest.find("$$") {
                let contents = &rest[..close];
                self.pos += close + 2;
                self.append(Value::DisplayMath(contents.to_string()));
                return;
            }
        } else if self.scan_inline_dollar_contents(start).is_some() {
            return;
        }

        self.pos = start + opendollars;
        self.append(Value::Text("$".repeat(opendollars)));
    }

    /// `$...$` with no whitespace just inside the delimiters and no digit
    /// immediately after the closer.
    fn scan_inline_dollar_contents(&mut self, dollar_pos: usize) -> Option<()> {
        let bytes = self.input.as_bytes();
        let start = dollar_pos + 1;
        if start >= bytes.len() || bytes[start].is_ascii_whitespace() {
            return None;
        }
        let mut i = start;
        while i < bytes.len() {
            if bytes[i] == b'$' {
                if i == start || bytes[i - 1].is_ascii_whitespace() {
                    return None;
                }
                if bytes.get(i + 1).map_or(false, u8::is_ascii_digit) {
                    return None;
                }
                let contents = self.input[start..i].to_string();
                self.pos = i + 1;
                self.append(Value::InlineMath(contents));
                return Some(());
            }
            i += 1;
        }
        None
    }

    fn handle_bang(&mut self) {
        self.pos += 1;
        let footnote = self.options.footnotes_enabled() && self.peek_byte(1) == Some(b'^');
        if !self.eof() && self.byte() == b'[' && !footnote {
            self.pos += 1;
            let node = self.append(Value::Text("![".to_string()));
            self.push_bracket(node, true);
        } else {
            self.append(Value::Text("!".to_string()));
        }
    }

    fn handle_open_bracket(&mut self) {
        // Wikilinks and footnote references claim the bracket before the
        // ordinary link machinery sees it.
        if self.options.wikilinks && self.peek_byte(1) == Some(b'[') {
            if self.handle_wikilink() {
                return;
            }
        }
        if self.options.footnotes_enabled() && self.peek_byte(1) == Some(b'^') {
            if self.handle_footnote_reference() {
                return;
            }
        }

        self.pos += 1;
        let node = self.append(Value::Text("[".to_string()));
        self.push_bracket(node, false);
    }

    fn push_bracket(&mut self, node: usize, image: bool) {
        self.brackets.push(Bracket {
            node,
            position: self.pos,
            delim_bottom: self.delimiters.len(),
            image,
            active: true,
        });
    }

    fn handle_wikilink(&mut self) -> bool {
        let rest = &self.input[self.pos + 2..];
        let close = match rest.find("]]") {
            Some(ix) => ix,
            None => return false,
        };
        let inner = &rest[..close];
        if inner.is_empty() || inner.contains('[') || inner.contains(']') {
            return false;
        }

        let (target, display) = match inner.find('|') {
            Some(pipe) => (&inner[..pipe], &inner[pipe + 1..]),
            None => (inner, inner),
        };
        if target.is_empty() {
            return false;
        }

        self.pos += 2 + close + 2;
        let link = self.append(Value::Link {
            link_type: LinkType::Wikilink,
            url: target.to_string(),
            title: String::new(),
        });
        let text = self.new_node(Value::Text(display.to_string()));
        self.append_id(link, text);
        true
    }

    fn handle_footnote_reference(&mut self) -> bool {
        let bytes = self.input.as_bytes();
        let mut i = self.pos + 2;
        while i < bytes.len() && !matches!(bytes[i], b']' | b'[' | b'\r' | b'\n' | b'\t') {
            i += 1;
        }
        if i == self.pos + 2 || bytes.get(i) != Some(&b']') {
            return false;
        }

        let label = strings::normalize_label(&self.input[self.pos + 2..i]);
        if !self.options.old_footnotes && !self.refmap.footnotes.contains(&label) {
            return false;
        }

        self.pos = i + 1;
        self.append(Value::FootnoteReference(label));
        true
    }

    fn handle_close_bracket(&mut self) {
        self.pos += 1;

        let bracket = match self.brackets.last() {
            Some(bracket) => Bracket {
                node: bracket.node,
                position: bracket.position,
                delim_bottom: bracket.delim_bottom,
                image: bracket.image,
                active: bracket.active,
            },
            None => {
                self.append(Value::Text("]".to_string()));
                return;
            }
        };

        if !bracket.active {
            self.brackets.pop();
            self.append(Value::Text("]".to_string()));
            return;
        }

        let label_end = self.pos - 1;
        let mut matched: Option<(LinkType, String, String)> = None;

        if self.peek_byte(0) == Some(b'(') {
            if let Some((url, title, end)) = self.scan_inline_link() {
                self.pos = end;
                matched = Some((LinkType::Inline, url, title));
            }
        }

        if matched.is_none() {
            let mut link_type = LinkType::Shortcut;
            let mut label = &self.input[bracket.position..label_end];
            let mut consumed = 0;

            if self.peek_byte(0) == Some(b'[') {
                match self.scan_link_label() {
                    Some((inner, len)) if !inner.is_empty() => {
                        link_type = LinkType::Reference;
                        label = inner;
                        consumed = len;
                    }
                    Some((_, len)) => {
                        link_type = LinkType::Collapsed;
                        consumed = len;
                    }
                    None => {}
                }
            }

            if label.len() <= MAX_LINK_LABEL {
                if let Some(resolved) = self.refmap.links.get(&strings::normalize_label(label)) {
                    self.pos += consumed;
                    matched = Some((link_type, resolved.url.clone(), resolved.title.clone()));
                }
            }
        }

        let (link_type, url, title) = match matched {
            Some(matched) => matched,
            None => {
                self.brackets.pop();
                self.append(Value::Text("]".to_string()));
                return;
            }
        };

        let value = if bracket.image {
            Value::Image { url, title }
        } else {
            Value::Link {
                link_type,
                url,
                title,
            }
        };
        let wrapper = self.new_node(value);
        self.insert_after(bracket.node, wrapper);
        self.reparent_following_siblings(wrapper, wrapper);
        self.detach(bracket.node);

        self.process_emphasis(bracket.delim_bottom);
        self.brackets.pop();

        if !bracket.image {
            for earlier in &mut self.brackets {
                if !earlier.image {
                    earlier.active = false;
                }
            }
        }
    }

    /// `(dest "title")` immediately after a `]`.  Returns the cleaned URL
    /// and title, and the position just past the closing paren.
    fn scan_inline_link(&self) -> Option<(String, String, usize)> {
        let bytes = self.input.as_bytes();
        let mut i = self.pos + 1;
        i += scan_spaces(&bytes[i..]);

        let (url_raw, url_len) = scan_link_destination(&self.input[i..])?;
        i += url_len;

        let before_title = i;
        i += scan_spaces(&bytes[i..]);
        let mut title_raw = "";
        if i > before_title {
            if let Some(len) = scanners::link_title(&self.input[i..]) {
                title_raw = &self.input[i..i + len];
                i += len;
                i += scan_spaces(&bytes[i..]);
            }
        }

        if bytes.get(i) != Some(&b')') {
            return None;
        }
        Some((
            strings::clean_url(url_raw),
            strings::clean_title(title_raw),
            i + 1,
        ))
    }

    /// `[label]` with no unescaped inner brackets.  Returns the inner text
    /// and the consumed length including both brackets.
    fn scan_link_label(&self) -> Option<(&'s str, usize)> {
        let bytes = self.input.as_bytes();
        let start = self.pos + 1;
        let mut i = start;
        while i < bytes.len() && i - start <= MAX_LINK_LABEL {
            match bytes[i] {
                b'\\' if i + 1 < bytes.len() => i += 2,
                b'[' => return None,
                b']' => return Some((&self.input[start..i], i + 1 - self.pos)),
                _ => i += 1,
            }
        }
        None
    }

    //
    // Delimiter runs.
    //

    fn handle_delim(&mut self) {
        let c = self.byte();
        let (numdelims, can_open, can_close) = self.scan_delims(c);
        let contents = &self.input[self.pos - numdelims..self.pos];
        let node = self.append(Value::Text(contents.to_string()));

        let eligible = match c {
            b'~' if self.options.strikethrough => numdelims == 2,
            b'~' => numdelims == 1,
            b'^' => numdelims == 1,
            _ => true,
        };
        if (can_open || can_close) && eligible {
            self.delimiters.push(Delimiter {
                node,
                delim_char: c,
                length: numdelims,
                can_open,
                can_close,
                deleted: false,
            });
        }
    }

    fn scan_delims(&mut self, c: u8) -> (usize, bool, bool) {
        let before_char = self.char_before(self.pos);
        let numdelims = self.take_while(c);
        let after_char = if self.eof() {
            '\n'
        } else {
            self.char_at(self.pos)
        };

        let left_flanking = numdelims > 0
            && !after_char.is_whitespace()
            && (!is_punctuation(after_char)
                || (self.options.superscript && c == b'^')
                || (self.options.subscript && c == b'~')
                || before_char.is_whitespace()
                || is_punctuation(before_char));
        let right_flanking = numdelims > 0
            && !before_char.is_whitespace()
            && (!is_punctuation(before_char)
                || after_char.is_whitespace()
                || is_punctuation(after_char));

        if c == b'_' {
            (
                numdelims,
                left_flanking && (!right_flanking || is_punctuation(before_char)),
                right_flanking && (!left_flanking || is_punctuation(after_char)),
            )
        } else {
            (numdelims, left_flanking, right_flanking)
        }
    }

    fn handle_quote(&mut self) {
        let c = self.byte();
        let before_char = self.char_before(self.pos);
        self.pos += 1;
        let after_char = if self.eof() {
            '\n'
        } else {
            self.char_at(self.pos)
        };

        // A quote closes when it hugs the end of a word; everything else
        // opens.  Apostrophes inside words close, which is what makes
        // contractions come out right.
        let closes = !before_char.is_whitespace()
            && (!is_punctuation(before_char)
                || after_char.is_whitespace()
                || is_punctuation(after_char));
        let quote = match (c, closes) {
            (b'\'', true) => "\u{2019}",
            (b'\'', false) => "\u{2018}",
            (_, true) => "\u{201d}",
            (_, false) => "\u{201c}",
        };
        self.append(Value::Text(quote.to_string()));
    }

    fn handle_hyphen(&mut self) {
        let numhyphens = self.take_while(b'-');
        if numhyphens == 1 {
            self.append(Value::Text("-".to_string()));
            return;
        }

        // cmark's distribution rule: prefer em dashes in groups of three,
        // en dashes in groups of two.
        let (ens, ems) = if numhyphens % 3 == 0 {
            (0, numhyphens / 3)
        } else if numhyphens % 2 == 0 {
            (numhyphens / 2, 0)
        } else if numhyphens % 3 == 2 {
            (1, (numhyphens - 2) / 3)
        } else {
            (2, (numhyphens - 4) / 3)
        };
        let mut text = String::new();
        for _ in 0..ems {
            text.push('\u{2014}');
        }
        for _ in 0..ens {
            text.push('\u{2013}');
        }
        self.append(Value::Text(text));
    }

    fn handle_period(&mut self) {
        if self.peek_byte(1) == Some(b'.') && self.peek_byte(2) == Some(b'.') {
            self.pos += 3;
            self.append(Value::Text("\u{2026}".to_string()));
        } else {
            self.pos += 1;
            self.append(Value::Text(".".to_string()));
        }
    }

    //
    // Emphasis resolution.
    //

    fn process_emphasis(&mut self, stack_bottom: usize) {
        // Tracks, per delimiter class, the lowest stack index where an
        // opener search has already failed; prevents quadratic rescans of
        // the bottom of the stack on pathological inputs.
        let mut openers_bottom = [stack_bottom; 9];

        let mut c = stack_bottom;
        while c < self.delimiters.len() {
            if self.delimiters[c].deleted || !self.delimiters[c].can_close {
                c += 1;
                continue;
            }

            let closer_char = self.delimiters[c].delim_char;
            let ix = match closer_char {
                b'~' => 0,
                b'^' => 1,
                b'_' => 2,
                _ => {
                    3 + (if self.delimiters[c].can_open { 3 } else { 0 })
                        + self.delimiters[c].length % 3
                }
            };

            let mut opener = None;
            let mut o = c;
            while o > openers_bottom[ix] {
                o -= 1;
                let d = &self.delimiters[o];
                if d.deleted || !d.can_open || d.delim_char != closer_char {
                    continue;
                }
                // The "multiple of 3" rule, spec points 9 and 10: runs
                // that can both open and close must not pair when the sum
                // of their lengths is divisible by three, unless both are.
                let odd_match = (self.delimiters[c].can_open || d.can_close)
                    && (d.length + self.delimiters[c].length) % 3 == 0
                    && !(d.length % 3 == 0 && self.delimiters[c].length % 3 == 0);
                if !odd_match {
                    opener = Some(o);
                    break;
                }
            }

            match opener {
                Some(o) => {
                    c = match closer_char {
                        b'*' | b'_' => self.insert_emph(o, c),
                        _ => {
                            self.insert_simple_span(o, c);
                            c + 1
                        }
                    };
                }
                None => {
                    openers_bottom[ix] = c;
                    if !self.delimiters[c].can_open {
                        self.delimiters[c].deleted = true;
                    }
                    c += 1;
                }
            }
        }

        for d in &mut self.delimiters[stack_bottom..] {
            d.deleted = true;
        }
    }

    /// Pairs `opener` and `closer`, consuming one or two delimiter
    /// characters from each, and wraps the nodes between them.  Returns
    /// the index to continue processing from; the closer is handed back
    /// when characters remain in it.
    fn insert_emph(&mut self, opener: usize, closer: usize) -> usize {
        let use_delims =
            if self.delimiters[opener].length >= 2 && self.delimiters[closer].length >= 2 {
                2
            } else {
                1
            };

        self.delimiters[opener].length -= use_delims;
        self.delimiters[closer].length -= use_delims;
        let opener_len = self.delimiters[opener].length;
        let closer_len = self.delimiters[closer].length;
        let opener_node = self.delimiters[opener].node;
        let closer_node = self.delimiters[closer].node;
        self.text_mut(opener_node).truncate(opener_len);
        self.text_mut(closer_node).truncate(closer_len);

        let emph = self.new_node(if use_delims == 2 {
            Value::Strong
        } else {
            Value::Emph
        });
        self.insert_after(opener_node, emph);
        self.reparent_between(emph, closer_node);

        // Delimiters trapped between the pair can never match anything
        // outside it.
        for d in &mut self.delimiters[opener + 1..closer] {
            d.deleted = true;
        }

        if opener_len == 0 {
            self.detach(opener_node);
            self.delimiters[opener].deleted = true;
        }
        if closer_len == 0 {
            self.detach(closer_node);
            self.delimiters[closer].deleted = true;
            closer + 1
        } else {
            closer
        }
    }

    /// Wraps the nodes between a matched single-level pair (`~~`, `~`,
    /// `^`) and drops both delimiter nodes entirely.
    fn insert_simple_span(&mut self, opener: usize, closer: usize) {
        let value = match self.delimiters[closer].delim_char {
            b'~' if self.options.strikethrough => Value::Strikethrough,
            b'~' => Value::Subscript,
            _ => Value::Superscript,
        };
        let opener_node = self.delimiters[opener].node;
        let closer_node = self.delimiters[closer].node;

        let span = self.new_node(value);
        self.insert_after(opener_node, span);
        self.reparent_between(span, closer_node);

        for d in &mut self.delimiters[opener..=closer] {
            d.deleted = true;
        }
        self.detach(opener_node);
        self.detach(closer_node);
    }

    /// Moves the siblings between `wrapper` and `closer_node` (exclusive)
    /// into `wrapper`.
    fn reparent_between(&mut self, wrapper: usize, closer_node: usize) {
        let mut cursor = self.nodes[wrapper].next;
        while let Some(id) = cursor {
            if id == closer_node {
                break;
            }
            let next = self.nodes[id].next;
            self.detach(id);
            self.append_id(wrapper, id);
            cursor = next;
        }
    }

    //
    // Flattening.
    //

    fn flatten(&self, id: usize, out: &mut Vec<Event>) {
        let mut cursor = self.nodes[id].first_child;
        while let Some(child) = cursor {
            match &self.nodes[child].value {
                Value::Root => {}
                Value::Text(s) => {
                    if !s.is_empty() {
                        match out.last_mut() {
                            Some(Event::Text(prev)) => prev.push_str(s),
                            _ => out.push(Event::Text(s.clone())),
                        }
                    }
                }
                Value::Code(s) => out.push(Event::Code(s.clone())),
                Value::Html(s) => out.push(Event::Html(s.clone())),
                Value::SoftBreak => out.push(Event::SoftBreak),
                Value::HardBreak => out.push(Event::HardBreak),
                Value::InlineMath(s) => out.push(Event::InlineMath(s.clone())),
                Value::DisplayMath(s) => out.push(Event::DisplayMath(s.clone())),
                Value::FootnoteReference(s) => out.push(Event::FootnoteReference(s.clone())),
                Value::Emph => self.flatten_container(child, Tag::Emphasis, out),
                Value::Strong => self.flatten_container(child, Tag::Strong, out),
                Value::Strikethrough => self.flatten_container(child, Tag::Strikethrough, out),
                Value::Superscript => self.flatten_container(child, Tag::Superscript, out),
                Value::Subscript => self.flatten_container(child, Tag::Subscript, out),
                Value::Link {
                    link_type,
                    url,
                    title,
                } => {
                    let tag = Tag::Link {
                        link_type: *link_type,
                        dest_url: url.clone(),
                        title: title.clone(),
                    };
                    self.flatten_container(child, tag, out);
                }
                Value::Image { url, title } => {
                    let tag = Tag::Image {
                        dest_url: url.clone(),
                        title: title.clone(),
                    };
                    self.flatten_container(child, tag, out);
                }
            }
            cursor = self.nodes[child].next;
        }
    }

    fn flatten_container(&self, id: usize, tag: Tag, out: &mut Vec<Event>) {
        let end = tag.to_end();
        out.push(Event::Start(tag));
        self.flatten(id, out);
        out.push(Event::End(end));
    }
}

/// Unicode punctuation for the flanking rules: ASCII punctuation plus the
/// `P` general categories.
fn is_punctuation(c: char) -> bool {
    if c.is_ascii() {
        strings::ispunct(c as u8)
    } else {
        c.is_punctuation()
    }
}

fn scan_spaces(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .take_while(|&&c| is_space_or_tab(c) || strings::is_line_end_char(c))
        .count()
}

/// A link destination: `<...>` or a bare run with balanced parens.
/// Returns the raw text (without angle brackets) and the consumed length.
fn scan_link_destination(s: &str) -> Option<(&str, usize)> {
    let bytes = s.as_bytes();
    if bytes.first() == Some(&b'<') {
        let mut i = 1;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' if i + 1 < bytes.len() => i += 2,
                b'>' => return Some((&s[1..i], i + 1)),
                b'<' | b'\n' | b'\r' => return None,
                _ => i += 1,
            }
        }
        return None;
    }

    let mut depth: i32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if i + 1 < bytes.len() && strings::ispunct(bytes[i + 1]) => i += 2,
            b'(' => {
                depth += 1;
                if depth > 32 {
                    return None;
                }
                i += 1;
            }
            b')' => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
                i += 1;
            }
            c if c <= b' ' => break,
            _ => i += 1,
        }
    }
    if depth != 0 {
        return None;
    }
    Some((&s[..i], i))
}
