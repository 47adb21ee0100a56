//! String utilities shared by the block and inline scanners.

use crate::entity;

pub fn is_line_end_char(ch: u8) -> bool {
    matches!(ch, b'\n' | b'\r')
}

pub fn is_space_or_tab(ch: u8) -> bool {
    matches!(ch, b' ' | b'\t')
}

/// ASCII punctuation per the CommonMark definition.
pub fn ispunct(ch: u8) -> bool {
    matches!(ch,
        b'!'..=b'/' | b':'..=b'@' | b'['..=b'`' | b'{'..=b'~')
}

pub fn is_blank(s: &str) -> bool {
    s.bytes().all(|c| matches!(c, b' ' | b'\t' | b'\n' | b'\r'))
}

pub fn ltrim(s: &str) -> &str {
    s.trim_start_matches(|c: char| c.is_ascii_whitespace())
}

pub fn rtrim(s: &str) -> &str {
    s.trim_end_matches(|c: char| c.is_ascii_whitespace())
}

pub fn trim(s: &str) -> &str {
    rtrim(ltrim(s))
}

/// Drops a trailing newline (and a preceding carriage return) in place.
pub fn chop_line_end(line: &mut String) {
    if line.ends_with('\n') {
        line.pop();
    }
    if line.ends_with('\r') {
        line.pop();
    }
}

/// Removes backslash escapes before ASCII punctuation, in place.
pub fn unescape(s: &mut String) {
    if !s.contains('\\') {
        return;
    }
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 1 < bytes.len() && ispunct(bytes[i + 1]) {
            i += 1;
        }
        let start = i;
        i += 1;
        while i < bytes.len() && bytes[i] != b'\\' {
            i += 1;
        }
        out.push_str(&s[start..i]);
    }
    *s = out;
}

/// Strips one space or newline from each end of a code span when both ends
/// have one and the contents are not all whitespace, after newlines have
/// been collapsed to spaces.
pub fn normalize_code(s: &str) -> String {
    let mut r = String::with_capacity(s.len());
    let mut contains_nonspace = false;
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' => {
                if i + 1 == bytes.len() || bytes[i + 1] != b'\n' {
                    r.push(' ');
                }
            }
            b'\n' => r.push(' '),
            _ => r.push_str(&s[i..i + 1]),
        }
        if !matches!(bytes[i], b' ' | b'\r' | b'\n') {
            contains_nonspace = true;
        }
        i += 1;
    }

    if contains_nonspace && r.len() >= 2 && r.starts_with(' ') && r.ends_with(' ') {
        r.pop();
        r.remove(0);
    }

    r
}

/// Removes trailing `#` sequences from an ATX heading, per spec only when
/// preceded by a space or when they make up the whole line.
pub fn chop_trailing_hashtags(line: &mut String) {
    let trimmed = rtrim(line);
    let without = trimmed.trim_end_matches('#');
    let trimmed_len = trimmed.len();
    let without_len = without.len();
    let without_is_empty = without.is_empty();
    let without_ends_space = without
        .as_bytes()
        .last()
        .map_or(false, |&c| is_space_or_tab(c));
    let rtrim_without_len = rtrim(without).len();
    if without_len != trimmed_len {
        if without_is_empty {
            line.clear();
        } else if without_ends_space {
            line.truncate(rtrim_without_len);
            return;
        }
    }
    line.truncate(trimmed_len);
}

pub fn remove_trailing_blank_lines(s: &mut String) {
    let trimmed = rtrim(s);
    if trimmed.is_empty() {
        s.clear();
        return;
    }
    let end = match s[trimmed.len()..].find(|c| matches!(c, '\n' | '\r')) {
        Some(ix) => trimmed.len() + ix,
        None => s.len(),
    };
    s.truncate(end);
}

/// Case-folds a link or footnote label and collapses internal whitespace,
/// so `[FOO\n  bar]` and `[foo bar]` match.
pub fn normalize_label(s: &str) -> String {
    let folded = caseless::default_case_fold_str(trim(s));
    let mut out = String::with_capacity(folded.len());
    let mut last_was_whitespace = false;
    for c in folded.chars() {
        if c.is_whitespace() {
            if !last_was_whitespace {
                out.push(' ');
                last_was_whitespace = true;
            }
        } else {
            out.push(c);
            last_was_whitespace = false;
        }
    }
    out
}

/// Entity-decodes and backslash-unescapes a link destination.
pub fn clean_url(url: &str) -> String {
    let mut b = entity::unescape_html(trim(url));
    unescape(&mut b);
    b
}

/// Strips the surrounding quotes or parens from a link title, then
/// entity-decodes and unescapes it.
pub fn clean_title(title: &str) -> String {
    let bytes = title.as_bytes();
    let inner = match (bytes.first(), bytes.last()) {
        (Some(b'"'), Some(b'"')) | (Some(b'\''), Some(b'\'')) | (Some(b'('), Some(b')'))
            if title.len() >= 2 =>
        {
            &title[1..title.len() - 1]
        }
        _ => title,
    };
    let mut b = entity::unescape_html(inner);
    unescape(&mut b);
    b
}

/// Splits a front matter block off the start of the document, if the text
/// opens with the delimiter on a line of its own and the delimiter recurs
/// on a later line of its own.
pub fn split_off_front_matter<'s>(mut s: &'s str, delimiter: &str) -> Option<(&'s str, &'s str)> {
    s = s.strip_prefix('\u{feff}').unwrap_or(s);

    let rest = s.strip_prefix(delimiter)?;
    let mut ix = s.len() - rest.len();
    ix += line_end_len(&s[ix..])?;

    loop {
        let line_len = match s[ix..].find('\n') {
            Some(n) => n + 1,
            None => return None,
        };
        let line = &s[ix..ix + line_len];
        ix += line_len;
        if rtrim(line) == delimiter {
            return Some((&s[..ix], &s[ix..]));
        }
    }
}

fn line_end_len(s: &str) -> Option<usize> {
    if let Some(rest) = s.strip_prefix("\r\n") {
        Some(s.len() - rest.len())
    } else if s.starts_with('\n') {
        Some(1)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_code_strips_one_space() {
        assert_eq!(normalize_code(" `foo` "), "`foo`");
        assert_eq!(normalize_code("  "), "  ");
        assert_eq!(normalize_code("a\nb"), "a b");
    }

    #[test]
    fn normalize_label_folds_and_collapses() {
        assert_eq!(normalize_label("  FOO\n  Bar "), "foo bar");
        assert_eq!(normalize_label("ẞ"), normalize_label("ss"));
    }

    #[test]
    fn unescape_removes_backslashes() {
        let mut s = String::from("a\\*b\\c");
        unescape(&mut s);
        assert_eq!(s, "a*b\\c");
    }

    #[test]
    fn front_matter() {
        assert_eq!(
            split_off_front_matter("---\nfoo: bar\n---\nHi\n", "---"),
            Some(("---\nfoo: bar\n---\n", "Hi\n"))
        );
        assert_eq!(split_off_front_matter("---\nfoo: bar\n", "---"), None);
    }

    #[test]
    fn hashtag_chopping() {
        let mut s = String::from("foo ###");
        chop_trailing_hashtags(&mut s);
        assert_eq!(s, "foo");

        let mut s = String::from("foo#");
        chop_trailing_hashtags(&mut s);
        assert_eq!(s, "foo#");
    }
}
