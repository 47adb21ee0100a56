//! Hand-rolled scanners for block starts and a few inline constructs.
//!
//! Each scanner takes the line (or remaining input) starting at the point
//! of interest and returns how many bytes matched, or what was recognized.
//! Lines may include their trailing newline.

use crate::character_set::character_set;
use crate::strings::{is_line_end_char, is_space_or_tab};

const SPACE_CHARS: [bool; 256] = character_set(&[b" \t\x0b\x0c\r\n"]);

fn is_space(ch: u8) -> bool {
    SPACE_CHARS[ch as usize]
}

/// Tag names that open a type-6 HTML block.
static BLOCK_TAG_NAMES: phf::Set<&'static str> = phf::phf_set! {
    "address", "article", "aside", "base", "basefont", "blockquote", "body",
    "caption", "center", "col", "colgroup", "dd", "details", "dialog",
    "dir", "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer",
    "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5", "h6", "head",
    "header", "hr", "html", "iframe", "legend", "li", "link", "main",
    "menu", "menuitem", "nav", "noframes", "ol", "optgroup", "option", "p",
    "param", "section", "source", "summary", "table", "tbody", "td",
    "template", "tfoot", "th", "thead", "title", "tr", "track", "ul",
};

/// Tag names whose contents suspend Markdown until an explicit close tag
/// (type-1 HTML blocks).
const VERBATIM_TAG_NAMES: [&str; 4] = ["pre", "script", "style", "textarea"];

fn rest_is_blank(bytes: &[u8], mut i: usize) -> bool {
    while i < bytes.len() {
        if !is_space(bytes[i]) {
            return false;
        }
        i += 1;
    }
    true
}

/// `#{1,6}` followed by a space, tab, or the end of the line.  Returns the
/// number of `#`s.
pub fn atx_heading_start(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let level = bytes.iter().take_while(|&&c| c == b'#').count();
    if level == 0 || level > 6 {
        return None;
    }
    match bytes.get(level) {
        None => Some(level),
        Some(&c) if is_space_or_tab(c) || is_line_end_char(c) => Some(level),
        _ => None,
    }
}

pub enum SetextChar {
    Equals,
    Hyphen,
}

/// A run of `=` or `-` with nothing but trailing whitespace after it.
pub fn setext_heading_line(line: &str) -> Option<SetextChar> {
    let bytes = line.as_bytes();
    let ch = *bytes.first()?;
    if ch != b'=' && ch != b'-' {
        return None;
    }
    let run = bytes.iter().take_while(|&&c| c == ch).count();
    if rest_is_blank(bytes, run) {
        match ch {
            b'=' => Some(SetextChar::Equals),
            _ => Some(SetextChar::Hyphen),
        }
    } else {
        None
    }
}

/// Three or more `*`, `-`, or `_` (all the same), optionally interspersed
/// with spaces and tabs, and nothing else on the line.
pub fn thematic_break(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let ch = *bytes.first()?;
    if ch != b'*' && ch != b'-' && ch != b'_' {
        return None;
    }
    let mut count = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == ch {
            count += 1;
        } else if is_line_end_char(bytes[i]) {
            break;
        } else if !is_space_or_tab(bytes[i]) {
            return None;
        }
        i += 1;
    }
    if count >= 3 {
        Some(i)
    } else {
        None
    }
}

/// A code fence opener: three or more backticks or tildes.  Returns the
/// fence length; an info string containing a backtick disqualifies a
/// backtick fence.
pub fn open_code_fence(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let ch = *bytes.first()?;
    if ch != b'`' && ch != b'~' {
        return None;
    }
    let run = bytes.iter().take_while(|&&c| c == ch).count();
    if run < 3 {
        return None;
    }
    if ch == b'`' && bytes[run..].iter().any(|&c| c == b'`') {
        return None;
    }
    Some(run)
}

/// A code fence closer: a run of the fence character with only trailing
/// whitespace.  Returns the run length for the caller to compare against
/// the opener.
pub fn close_code_fence(line: &str, fence_char: u8) -> Option<usize> {
    let bytes = line.as_bytes();
    let run = bytes.iter().take_while(|&&c| c == fence_char).count();
    if run >= 3 && rest_is_blank(bytes, run) {
        Some(run)
    } else {
        None
    }
}

/// `[^label]:` at the start of a footnote definition.  Returns the label
/// and the number of bytes consumed, including trailing spaces.
pub fn footnote_definition(line: &str) -> Option<(&str, usize)> {
    let bytes = line.as_bytes();
    if !line.starts_with("[^") {
        return None;
    }
    let mut i = 2;
    while i < bytes.len() && !matches!(bytes[i], b']' | b'\r' | b'\n' | b'\t' | 0) {
        i += 1;
    }
    if i == 2 || bytes.get(i) != Some(&b']') || bytes.get(i + 1) != Some(&b':') {
        return None;
    }
    let label = &line[2..i];
    let mut end = i + 2;
    while end < bytes.len() && is_space_or_tab(bytes[end]) {
        end += 1;
    }
    Some((label, end))
}

/// The start of an HTML block of types 1 through 6, given a line beginning
/// with `<`.
pub fn html_block_start(line: &str) -> Option<u8> {
    let bytes = line.as_bytes();
    if *bytes.first()? != b'<' {
        return None;
    }
    let rest = &line[1..];

    for name in VERBATIM_TAG_NAMES {
        if rest.len() >= name.len() && rest[..name.len()].eq_ignore_ascii_case(name) {
            match rest.as_bytes().get(name.len()) {
                None => return Some(1),
                Some(&c) if is_space_or_tab(c) || is_line_end_char(c) || c == b'>' => {
                    return Some(1)
                }
                _ => {}
            }
        }
    }

    if rest.starts_with("!--") {
        return Some(2);
    }
    if rest.starts_with('?') {
        return Some(3);
    }
    if rest.starts_with('!') && rest.as_bytes().get(1).map_or(false, u8::is_ascii_alphabetic) {
        return Some(4);
    }
    if rest.starts_with("![CDATA[") {
        return Some(5);
    }

    let rest = rest.strip_prefix('/').unwrap_or(rest);
    let name_len = rest
        .bytes()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == b'-')
        .count();
    if name_len > 0 && BLOCK_TAG_NAMES.contains(rest[..name_len].to_ascii_lowercase().as_str()) {
        match rest.as_bytes().get(name_len) {
            None => return Some(6),
            Some(&c) if is_space_or_tab(c) || is_line_end_char(c) || c == b'>' => return Some(6),
            Some(&b'/') if rest.as_bytes().get(name_len + 1) == Some(&b'>') => return Some(6),
            _ => {}
        }
    }

    None
}

/// A type-7 HTML block start: a single complete open or close tag, alone
/// on its line, whose name is not one of the verbatim tags.
pub fn html_block_start_7(line: &str) -> Option<u8> {
    let bytes = line.as_bytes();
    if *bytes.first()? != b'<' {
        return None;
    }

    let name_at = if bytes.get(1) == Some(&b'/') { 2 } else { 1 };
    let name_len = line[name_at..]
        .bytes()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == b'-')
        .count();
    if name_len == 0 {
        return None;
    }
    let name = line[name_at..name_at + name_len].to_ascii_lowercase();
    if VERBATIM_TAG_NAMES.contains(&name.as_str()) {
        return None;
    }

    let tag_len = html_tag(&line[1..])?;
    if rest_is_blank(bytes, 1 + tag_len) {
        Some(7)
    } else {
        None
    }
}

pub fn html_block_end_1(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    ["</script>", "</pre>", "</style>", "</textarea>"]
        .iter()
        .any(|close| lower.contains(close))
}

pub fn html_block_end_2(line: &str) -> bool {
    line.contains("-->")
}

pub fn html_block_end_3(line: &str) -> bool {
    line.contains("?>")
}

pub fn html_block_end_4(line: &str) -> bool {
    line.contains('>')
}

pub fn html_block_end_5(line: &str) -> bool {
    line.contains("]]>")
}

/// An absolute-URI autolink body: `scheme:chars>`.  Called just past the
/// opening `<`; the returned length includes the closing `>`.
pub fn autolink_uri(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if !bytes.first()?.is_ascii_alphabetic() {
        return None;
    }
    let scheme_len = bytes
        .iter()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, b'+' | b'.' | b'-'))
        .count();
    if !(2..=32).contains(&scheme_len) || bytes.get(scheme_len) != Some(&b':') {
        return None;
    }
    let mut i = scheme_len + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'>' => return Some(i + 1),
            b'<' | 0..=b' ' => return None,
            _ => i += 1,
        }
    }
    None
}

/// An email autolink body, per the spec's production.  Called just past
/// the opening `<`; the returned length includes the closing `>`.
pub fn autolink_email(s: &str) -> Option<usize> {
    const LOCAL_CHARS: [bool; 256] = character_set(&[
        b"abcdefghijklmnopqrstuvwxyz",
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZ",
        b"0123456789",
        b".!#$%&'*+/=?^_`{|}~-",
    ]);

    let bytes = s.as_bytes();
    let local_len = bytes
        .iter()
        .take_while(|&&c| LOCAL_CHARS[c as usize])
        .count();
    if local_len == 0 || bytes.get(local_len) != Some(&b'@') {
        return None;
    }

    let mut i = local_len + 1;
    loop {
        let start = i;
        if !bytes.get(i)?.is_ascii_alphanumeric() {
            return None;
        }
        while i < bytes.len()
            && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-')
            && i - start < 63
        {
            i += 1;
        }
        if bytes[i - 1] == b'-' {
            return None;
        }
        match bytes.get(i) {
            Some(&b'.') => i += 1,
            Some(&b'>') => return Some(i + 1),
            _ => return None,
        }
    }
}

/// A raw inline HTML tag (open, close, comment, processing instruction,
/// declaration, or CDATA).  Called just past the `<`; the returned length
/// includes the closing `>`.
pub fn html_tag(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    match bytes.first()? {
        b'/' => {
            let name_len = scan_tag_name(&s[1..])?;
            let mut i = 1 + name_len;
            i += scan_whitespace(&bytes[i..]);
            if bytes.get(i) == Some(&b'>') {
                Some(i + 1)
            } else {
                None
            }
        }
        b'!' if s.starts_with("!--") => {
            let close = s[3..].find("-->")?;
            Some(3 + close + 3)
        }
        b'!' if s.starts_with("![CDATA[") => {
            let close = s[8..].find("]]>")?;
            Some(8 + close + 3)
        }
        b'!' => {
            if !bytes.get(1)?.is_ascii_alphabetic() {
                return None;
            }
            let close = s.find('>')?;
            Some(close + 1)
        }
        b'?' => {
            let close = s[1..].find("?>")?;
            Some(1 + close + 2)
        }
        _ => {
            let name_len = scan_tag_name(s)?;
            let mut i = name_len;
            loop {
                let ws = scan_whitespace(&bytes[i..]);
                match bytes.get(i + ws) {
                    Some(&b'>') => return Some(i + ws + 1),
                    Some(&b'/') if bytes.get(i + ws + 1) == Some(&b'>') => return Some(i + ws + 2),
                    _ => {}
                }
                if ws == 0 {
                    return None;
                }
                i += ws;
                i += scan_attribute(&s[i..])?;
            }
        }
    }
}

fn scan_tag_name(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if !bytes.first()?.is_ascii_alphabetic() {
        return None;
    }
    Some(
        bytes
            .iter()
            .take_while(|c| c.is_ascii_alphanumeric() || **c == b'-')
            .count(),
    )
}

fn scan_whitespace(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|&&c| is_space(c)).count()
}

fn scan_attribute(s: &str) -> Option<usize> {
    const NAME_START: [bool; 256] = character_set(&[
        b"abcdefghijklmnopqrstuvwxyz",
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZ",
        b"_:",
    ]);
    const NAME_CONT: [bool; 256] = character_set(&[
        b"abcdefghijklmnopqrstuvwxyz",
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZ",
        b"0123456789",
        b"_:.-",
    ]);

    let bytes = s.as_bytes();
    if !NAME_START[*bytes.first()? as usize] {
        return None;
    }
    let mut i = bytes
        .iter()
        .take_while(|&&c| NAME_CONT[c as usize])
        .count();

    let ws = scan_whitespace(&bytes[i..]);
    if bytes.get(i + ws) != Some(&b'=') {
        return Some(i);
    }
    i += ws + 1;
    i += scan_whitespace(&bytes[i..]);
    i += scan_attribute_value(&s[i..])?;
    Some(i)
}

fn scan_attribute_value(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    match *bytes.first()? {
        quote @ (b'\'' | b'"') => {
            let close = bytes[1..].iter().position(|&c| c == quote)?;
            Some(close + 2)
        }
        _ => {
            let len = bytes
                .iter()
                .take_while(|&&c| !is_space(c) && !matches!(c, b'"' | b'\'' | b'=' | b'<' | b'>' | b'`' | 0))
                .count();
            if len == 0 {
                None
            } else {
                Some(len)
            }
        }
    }
}

/// A link title delimited by double quotes, single quotes, or parens,
/// with backslash escapes.  Returns the consumed length including the
/// delimiters.
pub fn link_title(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let (open, close) = match *bytes.first()? {
        b'"' => (b'"', b'"'),
        b'\'' => (b'\'', b'\''),
        b'(' => (b'(', b')'),
        _ => return None,
    };
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if i + 1 < bytes.len() => i += 2,
            c if c == close => return Some(i + 1),
            c if c == open => return None,
            _ => i += 1,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atx() {
        assert_eq!(atx_heading_start("# foo\n"), Some(1));
        assert_eq!(atx_heading_start("###\n"), Some(3));
        assert_eq!(atx_heading_start("####### foo\n"), None);
        assert_eq!(atx_heading_start("#foo\n"), None);
    }

    #[test]
    fn breaks() {
        assert!(thematic_break("***\n").is_some());
        assert!(thematic_break("- - -\n").is_some());
        assert!(thematic_break("_        _   _\n").is_some());
        assert!(thematic_break("--\n").is_none());
        assert!(thematic_break("- - x\n").is_none());
    }

    #[test]
    fn fences() {
        assert_eq!(open_code_fence("```rust\n"), Some(3));
        assert_eq!(open_code_fence("````\n"), Some(4));
        assert_eq!(open_code_fence("``` a`b\n"), None);
        assert_eq!(open_code_fence("~~~ a`b\n"), Some(3));
        assert_eq!(close_code_fence("```\n", b'`'), Some(3));
        assert_eq!(close_code_fence("``` x\n", b'`'), None);
    }

    #[test]
    fn autolinks() {
        assert_eq!(autolink_uri("https://x.ee>"), Some(13));
        assert_eq!(autolink_uri("https://x.ee"), None);
        assert_eq!(autolink_email("a@b.ee>"), Some(7));
        assert_eq!(autolink_email("a@b->"), None);
    }

    #[test]
    fn tags() {
        assert_eq!(html_tag("a href=\"x\">"), Some(11));
        assert_eq!(html_tag("/a>"), Some(3));
        assert_eq!(html_tag("!-- hi -->"), Some(10));
        assert_eq!(html_tag("a href>"), Some(7));
        assert_eq!(html_tag("a href=>"), None);
    }

    #[test]
    fn html_blocks() {
        assert_eq!(html_block_start("<script>\n"), Some(1));
        assert_eq!(html_block_start("<!-- x\n"), Some(2));
        assert_eq!(html_block_start("<div class=x>\n"), Some(6));
        assert_eq!(html_block_start("<span>\n"), None);
        assert_eq!(html_block_start_7("<span>\n"), Some(7));
        assert_eq!(html_block_start_7("<span> x\n"), None);
    }
}
