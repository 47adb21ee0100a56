//! Table row scanning for the tables extension.

use crate::events::Alignment;
use crate::strings::trim;

/// Parses a delimiter row (`| --- | :-: |`), returning one alignment per
/// column.  The row must contain at least one pipe so a bare `---` stays
/// available to setext headings and thematic breaks.
pub(crate) fn delimiter_row(line: &str) -> Option<Vec<Alignment>> {
    let line = trim(line);
    if !line.contains('|') {
        return None;
    }

    let cells = split_cells(line)?;
    let mut alignments = Vec::with_capacity(cells.len());
    for cell in &cells {
        let bytes = cell.as_bytes();
        let left = bytes.first() == Some(&b':');
        let right = bytes.len() > left as usize && bytes.last() == Some(&b':');
        let dashes = &bytes[left as usize..bytes.len() - right as usize];
        if dashes.is_empty() || !dashes.iter().all(|&c| c == b'-') {
            return None;
        }
        alignments.push(match (left, right) {
            (true, true) => Alignment::Center,
            (true, false) => Alignment::Left,
            (false, true) => Alignment::Right,
            (false, false) => Alignment::None,
        });
    }
    Some(alignments)
}

/// Splits a table line into trimmed cell strings.
pub(crate) fn row(line: &str) -> Option<Vec<String>> {
    let line = trim(line);
    if line.is_empty() {
        return None;
    }
    split_cells(line)
}

fn split_cells(line: &str) -> Option<Vec<String>> {
    let inner = line.strip_prefix('|').unwrap_or(line);
    let had_trailing_pipe = line.ends_with('|') && !line.ends_with("\\|");

    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut escaped = false;
    for c in inner.chars() {
        if escaped {
            // A backslashed pipe is cell content; other escapes pass
            // through for the inline parser.
            if c != '|' {
                cell.push('\\');
            }
            cell.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '|' {
            cells.push(trim(&cell).to_string());
            cell.clear();
        } else {
            cell.push(c);
        }
    }
    if escaped {
        cell.push('\\');
    }
    if !had_trailing_pipe {
        cells.push(trim(&cell).to_string());
    }

    if cells.is_empty() {
        None
    } else {
        Some(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows() {
        assert_eq!(row("| a | b |"), Some(vec!["a".into(), "b".into()]));
        assert_eq!(row("a | b"), Some(vec!["a".into(), "b".into()]));
        assert_eq!(row("| a \\| b |"), Some(vec!["a | b".into()]));
        assert_eq!(row("   "), None);
    }

    #[test]
    fn delimiters() {
        assert_eq!(
            delimiter_row("| --- | :-: |"),
            Some(vec![Alignment::None, Alignment::Center])
        );
        assert_eq!(
            delimiter_row("|:--|--:|"),
            Some(vec![Alignment::Left, Alignment::Right])
        );
        assert_eq!(delimiter_row("---"), None);
        assert_eq!(delimiter_row("| -x- |"), None);
    }
}
