//! Block-structure parsing and the event iterator.
//!
//! Parsing runs in two phases.  The first pass is line-oriented: each line
//! is checked against the chain of open blocks (lazy continuation rules
//! included) before new block starts are considered, building a
//! Vec-indexed block tree and the reference map.  The second phase is the
//! [`Parser`] iterator, which walks the finished tree and runs inline
//! parsing per block as events are pulled.

pub mod alert;
mod inlines;
mod options;
mod table;

pub use options::{Extension, Options, Plugins, RenderPlugins};
pub(crate) use options::validate;

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

use crate::events::{Alignment, CodeBlockKind, Event, HeadingLevel, Tag};
use crate::scanners;
use crate::strings::{self, is_line_end_char, is_space_or_tab};
use alert::AlertType;

const TAB_STOP: usize = 4;
const CODE_INDENT: usize = 4;

/// A resolved link-reference definition.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedReference {
    pub url: String,
    pub title: String,
}

/// The definition table: link-reference definitions and footnote
/// definition labels, collected by the first pass before any inline
/// parsing runs.
#[derive(Debug, Default)]
pub(crate) struct RefMap {
    pub links: FxHashMap<String, ResolvedReference>,
    pub footnotes: FxHashSet<String>,
}

impl RefMap {
    /// First definition wins; later duplicates are ignored.
    fn add_link(&mut self, label: String, url: String, title: String) {
        self.links
            .entry(label)
            .or_insert(ResolvedReference { url, title });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListType {
    Bullet,
    Ordered,
}

#[derive(Debug, Clone, Copy)]
struct ListData {
    list_type: ListType,
    marker_offset: usize,
    padding: usize,
    start: u64,
    /// `.` or `)` for ordered lists, the bullet character otherwise.
    delimiter: u8,
    tight: bool,
}

#[derive(Debug)]
enum BlockKind {
    Document,
    Paragraph,
    Heading {
        level: usize,
        setext: bool,
        id: Option<String>,
        classes: Vec<String>,
    },
    BlockQuote {
        alert: Option<AlertType>,
    },
    CodeBlock {
        fenced: bool,
        fence_char: u8,
        fence_length: usize,
        fence_offset: usize,
        info: String,
    },
    HtmlBlock {
        block_type: u8,
    },
    List(ListData),
    Item(ListData),
    FootnoteDefinition {
        label: String,
    },
    Table {
        alignments: Vec<Alignment>,
    },
    TableRow {
        header: bool,
    },
    TableCell,
    DefinitionList,
    DefinitionListTitle,
    DefinitionListDefinition,
    ThematicBreak,
}

struct BlockNode {
    kind: BlockKind,
    parent: Option<usize>,
    children: Vec<usize>,
    content: String,
    open: bool,
    last_line_blank: bool,
    start_line: usize,
    /// Suppress the paragraph tags of tight list items and tight
    /// definitions.
    no_tag: bool,
    /// A task list checkbox consumed from the front of this paragraph.
    task: Option<bool>,
}

impl BlockNode {
    fn new(kind: BlockKind, parent: Option<usize>, start_line: usize) -> Self {
        BlockNode {
            kind,
            parent,
            children: Vec::new(),
            content: String::new(),
            open: true,
            last_line_blank: false,
            start_line,
            no_tag: false,
            task: None,
        }
    }

    fn accepts_lines(&self) -> bool {
        matches!(
            self.kind,
            BlockKind::Paragraph | BlockKind::Heading { .. } | BlockKind::CodeBlock { .. }
        )
    }
}

fn can_contain(parent: &BlockKind, child: &BlockKind) -> bool {
    match parent {
        BlockKind::Document
        | BlockKind::BlockQuote { .. }
        | BlockKind::Item(..)
        | BlockKind::FootnoteDefinition { .. }
        | BlockKind::DefinitionListDefinition => !matches!(
            child,
            BlockKind::Item(..)
                | BlockKind::TableRow { .. }
                | BlockKind::TableCell
                | BlockKind::DefinitionListTitle
                | BlockKind::DefinitionListDefinition
        ),
        BlockKind::List(..) => matches!(child, BlockKind::Item(..)),
        BlockKind::Table { .. } => matches!(child, BlockKind::TableRow { .. }),
        BlockKind::TableRow { .. } => matches!(child, BlockKind::TableCell),
        BlockKind::DefinitionList => matches!(
            child,
            BlockKind::DefinitionListTitle | BlockKind::DefinitionListDefinition
        ),
        _ => false,
    }
}

fn lists_match(a: &ListData, b: &ListData) -> bool {
    a.list_type == b.list_type && a.delimiter == b.delimiter
}

struct FirstPass<'o> {
    options: &'o Extension,
    nodes: Vec<BlockNode>,
    current: usize,
    refmap: RefMap,

    line_number: usize,
    offset: usize,
    column: usize,
    first_nonspace: usize,
    first_nonspace_column: usize,
    indent: usize,
    blank: bool,
    partially_consumed_tab: bool,
}

impl<'o> FirstPass<'o> {
    fn new(options: &'o Extension) -> Self {
        FirstPass {
            options,
            nodes: vec![BlockNode::new(BlockKind::Document, None, 0)],
            current: 0,
            refmap: RefMap::default(),
            line_number: 0,
            offset: 0,
            column: 0,
            first_nonspace: 0,
            first_nonspace_column: 0,
            indent: 0,
            blank: false,
            partially_consumed_tab: false,
        }
    }

    fn parse(mut self, mut s: &str) -> (Vec<BlockNode>, RefMap) {
        if let Some(delimiter) = &self.options.front_matter_delimiter {
            if let Some((front_matter, rest)) = strings::split_off_front_matter(s, delimiter) {
                self.line_number += front_matter.bytes().filter(|&b| b == b'\n').count();
                s = rest;
            }
        }
        let s = s.strip_prefix('\u{feff}').unwrap_or(s);

        let bytes = s.as_bytes();
        let matcher = jetscii::bytes!(b'\r', b'\n');
        let mut ix = 0;
        while ix < s.len() {
            let mut eol = match matcher.find(&bytes[ix..]) {
                Some(offset) => ix + offset,
                None => s.len(),
            };
            if eol < s.len() {
                if bytes[eol] == b'\r' {
                    eol += 1;
                    if eol < s.len() && bytes[eol] == b'\n' {
                        eol += 1;
                    }
                } else {
                    eol += 1;
                }
            }
            self.process_line(&s[ix..eol]);
            ix = eol;
        }

        self.finalize_document();
        (self.nodes, self.refmap)
    }

    fn process_line(&mut self, line: &str) {
        self.offset = 0;
        self.column = 0;
        self.first_nonspace = 0;
        self.first_nonspace_column = 0;
        self.indent = 0;
        self.blank = false;
        self.partially_consumed_tab = false;
        self.line_number += 1;

        if let Some((last_matched_container, _all_matched)) = self.check_open_blocks(line) {
            let mut container = last_matched_container;
            self.open_new_blocks(&mut container, line);
            self.add_text_to_container(container, last_matched_container, line);
        }
    }

    //
    // Offsets.
    //

    fn peek_at(&self, line: &str, ix: usize) -> Option<u8> {
        line.as_bytes().get(ix).copied()
    }

    fn find_first_nonspace(&mut self, line: &str) {
        let mut chars_to_tab = TAB_STOP - (self.column % TAB_STOP);
        let bytes = line.as_bytes();

        if self.first_nonspace <= self.offset {
            self.first_nonspace = self.offset;
            self.first_nonspace_column = self.column;
            loop {
                match bytes.get(self.first_nonspace) {
                    Some(b' ') => {
                        self.first_nonspace += 1;
                        self.first_nonspace_column += 1;
                        chars_to_tab -= 1;
                        if chars_to_tab == 0 {
                            chars_to_tab = TAB_STOP;
                        }
                    }
                    Some(b'\t') => {
                        self.first_nonspace += 1;
                        self.first_nonspace_column += chars_to_tab;
                        chars_to_tab = TAB_STOP;
                    }
                    _ => break,
                }
            }
        }

        self.indent = self.first_nonspace_column - self.column;
        self.blank = match bytes.get(self.first_nonspace) {
            Some(&c) => is_line_end_char(c),
            None => true,
        };
    }

    fn advance_offset(&mut self, line: &str, mut count: usize, columns: bool) {
        let bytes = line.as_bytes();
        while count > 0 {
            match bytes.get(self.offset) {
                Some(b'\t') => {
                    let chars_to_tab = TAB_STOP - (self.column % TAB_STOP);
                    if columns {
                        self.partially_consumed_tab = chars_to_tab > count;
                        let advance = chars_to_tab.min(count);
                        self.column += advance;
                        self.offset += if self.partially_consumed_tab { 0 } else { 1 };
                        count -= advance;
                    } else {
                        self.partially_consumed_tab = false;
                        self.column += chars_to_tab;
                        self.offset += 1;
                        count -= 1;
                    }
                }
                Some(_) => {
                    self.partially_consumed_tab = false;
                    self.offset += 1;
                    self.column += 1;
                    count -= 1;
                }
                None => break,
            }
        }
    }

    //
    // Open block matching.
    //

    fn check_open_blocks(&mut self, line: &str) -> Option<(usize, bool)> {
        let mut container = 0;
        let mut all_matched = false;

        loop {
            let child = match self.nodes[container].children.last() {
                Some(&child) if self.nodes[child].open => child,
                _ => {
                    all_matched = true;
                    break;
                }
            };
            container = child;
            self.find_first_nonspace(line);

            let matched = match self.nodes[container].kind {
                BlockKind::BlockQuote { .. } => self.parse_block_quote_prefix(line),
                BlockKind::Item(data) => self.parse_item_prefix(line, container, &data),
                BlockKind::CodeBlock { .. } => self.parse_code_block_prefix(line, container)?,
                BlockKind::HtmlBlock { block_type } => match block_type {
                    6 | 7 => !self.blank,
                    _ => true,
                },
                BlockKind::Paragraph => !self.blank,
                BlockKind::Table { .. } => !self.blank,
                BlockKind::FootnoteDefinition { .. } => self.parse_indented_prefix(line, container),
                BlockKind::DefinitionListDefinition => self.parse_definition_prefix(line, container),
                BlockKind::Heading { .. }
                | BlockKind::TableRow { .. }
                | BlockKind::TableCell
                | BlockKind::DefinitionListTitle
                | BlockKind::ThematicBreak => false,
                BlockKind::Document
                | BlockKind::List(..)
                | BlockKind::DefinitionList => true,
            };
            if !matched {
                container = self.nodes[container].parent.expect("matched parent");
                break;
            }
        }

        Some((container, all_matched))
    }

    fn parse_block_quote_prefix(&mut self, line: &str) -> bool {
        if self.indent <= 3 && self.peek_at(line, self.first_nonspace) == Some(b'>') {
            self.advance_offset(line, self.first_nonspace + 1 - self.offset, false);
            if self
                .peek_at(line, self.offset)
                .map_or(false, is_space_or_tab)
            {
                self.advance_offset(line, 1, true);
            }
            return true;
        }
        false
    }

    fn parse_item_prefix(&mut self, line: &str, container: usize, data: &ListData) -> bool {
        if self.indent >= data.marker_offset + data.padding {
            self.advance_offset(line, data.marker_offset + data.padding, true);
            true
        } else if self.blank && !self.nodes[container].children.is_empty() {
            let offset = self.first_nonspace - self.offset;
            self.advance_offset(line, offset, false);
            true
        } else {
            false
        }
    }

    /// Footnote definitions continue on lines indented by four columns, or
    /// on blank lines once they have content.
    fn parse_indented_prefix(&mut self, line: &str, container: usize) -> bool {
        if self.indent >= CODE_INDENT {
            self.advance_offset(line, CODE_INDENT, true);
            true
        } else if self.blank && !self.nodes[container].children.is_empty() {
            let offset = self.first_nonspace - self.offset;
            self.advance_offset(line, offset, false);
            true
        } else {
            false
        }
    }

    fn parse_definition_prefix(&mut self, line: &str, container: usize) -> bool {
        if self.indent >= 2 {
            self.advance_offset(line, 2, true);
            true
        } else if self.blank && !self.nodes[container].children.is_empty() {
            let offset = self.first_nonspace - self.offset;
            self.advance_offset(line, offset, false);
            true
        } else {
            false
        }
    }

    /// Returns `None` when the line was a closing fence and processing of
    /// the line is complete.
    fn parse_code_block_prefix(&mut self, line: &str, container: usize) -> Option<bool> {
        let (fenced, fence_char, fence_length, fence_offset) = match &self.nodes[container].kind {
            BlockKind::CodeBlock {
                fenced,
                fence_char,
                fence_length,
                fence_offset,
                ..
            } => (*fenced, *fence_char, *fence_length, *fence_offset),
            _ => unreachable!(),
        };

        if !fenced {
            if self.indent >= CODE_INDENT {
                self.advance_offset(line, CODE_INDENT, true);
                return Some(true);
            } else if self.blank {
                let offset = self.first_nonspace - self.offset;
                self.advance_offset(line, offset, false);
                return Some(true);
            }
            return Some(false);
        }

        if self.indent <= 3 && self.peek_at(line, self.first_nonspace) == Some(fence_char) {
            if let Some(matched) =
                scanners::close_code_fence(&line[self.first_nonspace..], fence_char)
            {
                if matched >= fence_length {
                    self.advance_offset(line, line.len() - self.offset, false);
                    self.finalize(container);
                    self.current = self.nodes[container].parent.unwrap_or(0);
                    return None;
                }
            }
        }

        let mut remaining = fence_offset;
        while remaining > 0
            && self
                .peek_at(line, self.offset)
                .map_or(false, is_space_or_tab)
        {
            self.advance_offset(line, 1, true);
            remaining -= 1;
        }
        Some(true)
    }

    //
    // New block starts.
    //

    fn open_new_blocks(&mut self, container: &mut usize, line: &str) {
        let maybe_lazy = matches!(self.nodes[self.current].kind, BlockKind::Paragraph);

        loop {
            match self.nodes[*container].kind {
                BlockKind::CodeBlock { .. } | BlockKind::HtmlBlock { .. } => return,
                BlockKind::Table { .. } => {
                    self.add_table_row(*container, line);
                    return;
                }
                _ => {}
            }

            self.find_first_nonspace(line);
            let indented = self.indent >= CODE_INDENT;
            let rest = &line[self.first_nonspace.min(line.len())..];
            let in_paragraph = matches!(self.nodes[*container].kind, BlockKind::Paragraph);
            let setext = if !indented && in_paragraph {
                scanners::setext_heading_line(rest)
            } else {
                None
            };

            if !indented && self.peek_at(line, self.first_nonspace) == Some(b'>') {
                let offset = self.first_nonspace + 1 - self.offset;
                self.advance_offset(line, offset, false);
                if self
                    .peek_at(line, self.offset)
                    .map_or(false, is_space_or_tab)
                {
                    self.advance_offset(line, 1, true);
                }

                let mut alert = None;
                if self.options.gfm_alerts {
                    if let Some(kind) = alert::detect_alert(strings::ltrim(&line[self.offset..])) {
                        alert = Some(kind);
                        self.advance_offset(line, line.len() - self.offset, false);
                    }
                }
                *container = self.add_child(*container, BlockKind::BlockQuote { alert });
            } else if !indented && scanners::atx_heading_start(rest).is_some() {
                let level = scanners::atx_heading_start(rest).unwrap();
                let offset = self.first_nonspace + level - self.offset;
                self.advance_offset(line, offset, false);
                *container = self.add_child(
                    *container,
                    BlockKind::Heading {
                        level,
                        setext: false,
                        id: None,
                        classes: Vec::new(),
                    },
                );
                break;
            } else if !indented && scanners::open_code_fence(rest).is_some() {
                let fence_length = scanners::open_code_fence(rest).unwrap();
                let fence_char = rest.as_bytes()[0];
                let fence_offset = self.indent;
                let info_raw = strings::trim(&rest[fence_length..]);
                let mut info = crate::entity::unescape_html(info_raw);
                strings::unescape(&mut info);

                *container = self.add_child(
                    *container,
                    BlockKind::CodeBlock {
                        fenced: true,
                        fence_char,
                        fence_length,
                        fence_offset,
                        info,
                    },
                );
                self.advance_offset(line, line.len() - self.offset, false);
                break;
            } else if !indented
                && (scanners::html_block_start(rest).is_some()
                    || (!in_paragraph && !maybe_lazy && scanners::html_block_start_7(rest).is_some()))
            {
                let block_type = scanners::html_block_start(rest)
                    .or_else(|| scanners::html_block_start_7(rest))
                    .unwrap();
                *container = self.add_child(*container, BlockKind::HtmlBlock { block_type });
                break;
            } else if setext.is_some() {
                if !self.strip_reference_definitions(*container) {
                    // The whole paragraph was reference definitions;
                    // dissolve it and rescan the underline as a fresh
                    // block.
                    let parent = self.nodes[*container].parent.expect("paragraph has parent");
                    let removed = self.nodes[parent].children.pop();
                    debug_assert_eq!(removed, Some(*container));
                    self.nodes[*container].open = false;
                    *container = parent;
                    continue;
                }
                let level = match setext.unwrap() {
                    scanners::SetextChar::Equals => 1,
                    scanners::SetextChar::Hyphen => 2,
                };
                self.nodes[*container].kind = BlockKind::Heading {
                    level,
                    setext: true,
                    id: None,
                    classes: Vec::new(),
                };
                self.advance_offset(line, line.len() - self.offset, false);
                break;
            } else if !indented
                && in_paragraph
                && self.options.table
                && table::delimiter_row(rest).is_some()
            {
                match self.try_open_table(*container, line) {
                    Some(table) => {
                        *container = table;
                        return;
                    }
                    None => break,
                }
            } else if !indented && scanners::thematic_break(rest).is_some() {
                *container = self.add_child(*container, BlockKind::ThematicBreak);
                self.advance_offset(line, line.len() - self.offset, false);
                break;
            } else if !indented
                && self.options.footnotes_enabled()
                && scanners::footnote_definition(rest).is_some()
            {
                let (label, consumed) = scanners::footnote_definition(rest).unwrap();
                let label = strings::normalize_label(label);
                let offset = self.first_nonspace + consumed - self.offset;
                self.advance_offset(line, offset, false);
                self.refmap.footnotes.insert(label.clone());
                *container = self.add_child(*container, BlockKind::FootnoteDefinition { label });
            } else if (!indented || matches!(self.nodes[*container].kind, BlockKind::List(..)))
                && self.indent < CODE_INDENT
                && self.parse_list_marker(line, in_paragraph).is_some()
            {
                let (matched, data) = self.parse_list_marker(line, in_paragraph).unwrap();
                let offset = self.first_nonspace + matched - self.offset;
                self.advance_offset(line, offset, false);
                let data = self.compute_list_padding(line, data, matched);

                let is_matching_list = match self.nodes[*container].kind {
                    BlockKind::List(ref existing) => lists_match(existing, &data),
                    _ => false,
                };
                if !is_matching_list {
                    *container = self.add_child(*container, BlockKind::List(data));
                }
                *container = self.add_child(*container, BlockKind::Item(data));
            } else if indented && !maybe_lazy && !self.blank {
                self.advance_offset(line, CODE_INDENT, true);
                *container = self.add_child(
                    *container,
                    BlockKind::CodeBlock {
                        fenced: false,
                        fence_char: 0,
                        fence_length: 0,
                        fence_offset: 0,
                        info: String::new(),
                    },
                );
                break;
            } else if !indented && self.try_open_definition(container, line) {
                continue;
            } else {
                break;
            }

            if self.nodes[*container].accepts_lines() {
                break;
            }
        }
    }

    /// A `: ` line after a paragraph or inside an open definition list.
    fn try_open_definition(&mut self, container: &mut usize, line: &str) -> bool {
        if !self.options.definition_lists {
            return false;
        }
        if self.peek_at(line, self.first_nonspace) != Some(b':')
            || !self
                .peek_at(line, self.first_nonspace + 1)
                .map_or(false, |c| is_space_or_tab(c) || is_line_end_char(c))
        {
            return false;
        }

        let dl = match self.nodes[*container].kind {
            BlockKind::Paragraph => {
                let para = *container;
                let parent = self.nodes[para].parent.expect("paragraph has parent");
                // The paragraph becomes the list's title.
                let removed = self.nodes[parent].children.pop();
                debug_assert_eq!(removed, Some(para));
                self.nodes[para].open = false;

                let dl = self.add_child(parent, BlockKind::DefinitionList);
                let title = self.add_child(dl, BlockKind::DefinitionListTitle);
                let content = strings::trim(&self.nodes[para].content).to_string();
                self.nodes[title].content = content;
                self.finalize(title);
                dl
            }
            BlockKind::DefinitionList => *container,
            _ => return false,
        };

        let offset = self.first_nonspace + 1 - self.offset;
        self.advance_offset(line, offset, false);
        if self
            .peek_at(line, self.offset)
            .map_or(false, is_space_or_tab)
        {
            self.advance_offset(line, 1, true);
        }
        *container = self.add_child(dl, BlockKind::DefinitionListDefinition);
        true
    }

    /// A delimiter row under an open paragraph turns its last line into a
    /// table header.
    fn try_open_table(&mut self, para: usize, line: &str) -> Option<usize> {
        let alignments = table::delimiter_row(&line[self.first_nonspace..])?;

        let content = strings::trim(&self.nodes[para].content).to_string();
        let header_line = content.rsplit('\n').next()?.to_string();
        let header_cells = table::row(&header_line)?;
        if header_cells.len() != alignments.len() {
            return None;
        }

        // Drop the header line from the paragraph; earlier lines stay.
        let remainder = match content.rfind('\n') {
            Some(ix) => content[..ix].to_string(),
            None => String::new(),
        };
        let parent = self.nodes[para].parent.expect("paragraph has parent");
        self.nodes[para].content = remainder;
        self.finalize(para);
        if self.nodes[para].content.is_empty() {
            let removed = self.nodes[parent].children.pop();
            debug_assert_eq!(removed, Some(para));
        }

        let table = self.add_child(parent, BlockKind::Table { alignments });
        let row = self.add_child(table, BlockKind::TableRow { header: true });
        for cell in header_cells {
            let cell_node = self.add_child(row, BlockKind::TableCell);
            self.nodes[cell_node].content = cell;
            self.finalize(cell_node);
        }
        self.finalize(row);

        self.advance_offset(line, line.len() - self.offset, false);
        Some(table)
    }

    fn add_table_row(&mut self, table: usize, line: &str) {
        self.find_first_nonspace(line);
        let columns = match &self.nodes[table].kind {
            BlockKind::Table { alignments } => alignments.len(),
            _ => unreachable!(),
        };

        if let Some(mut cells) = table::row(&line[self.first_nonspace..]) {
            // Body rows are padded or truncated to the header width.
            cells.truncate(columns);
            while cells.len() < columns {
                cells.push(String::new());
            }

            let row = self.add_child(table, BlockKind::TableRow { header: false });
            for cell in cells {
                let cell_node = self.add_child(row, BlockKind::TableCell);
                self.nodes[cell_node].content = cell;
                self.finalize(cell_node);
            }
            self.finalize(row);
        }
        self.advance_offset(line, line.len() - self.offset, false);
    }

    fn parse_list_marker(
        &self,
        line: &str,
        interrupts_paragraph: bool,
    ) -> Option<(usize, ListData)> {
        let bytes = line.as_bytes();
        let pos = self.first_nonspace;
        let c = *bytes.get(pos)?;

        if matches!(c, b'-' | b'+' | b'*') {
            if scanners::thematic_break(&line[pos..]).is_some() {
                return None;
            }
            match bytes.get(pos + 1) {
                None => {}
                Some(&next) if is_space_or_tab(next) || is_line_end_char(next) => {}
                _ => return None,
            }
            if interrupts_paragraph && strings::is_blank(&line[pos + 1..]) {
                return None;
            }
            return Some((
                1,
                ListData {
                    list_type: ListType::Bullet,
                    marker_offset: self.indent,
                    padding: 0,
                    start: 0,
                    delimiter: c,
                    tight: false,
                },
            ));
        }

        if c.is_ascii_digit() {
            let digits = bytes[pos..]
                .iter()
                .take_while(|c| c.is_ascii_digit())
                .count();
            if digits > 9 {
                return None;
            }
            let start: u64 = line[pos..pos + digits].parse().ok()?;
            let delimiter = match bytes.get(pos + digits) {
                Some(&d @ (b'.' | b')')) => d,
                _ => return None,
            };
            match bytes.get(pos + digits + 1) {
                None => {}
                Some(&next) if is_space_or_tab(next) || is_line_end_char(next) => {}
                _ => return None,
            }
            if interrupts_paragraph
                && (start != 1 || strings::is_blank(&line[pos + digits + 1..]))
            {
                return None;
            }
            return Some((
                digits + 1,
                ListData {
                    list_type: ListType::Ordered,
                    marker_offset: self.indent,
                    padding: 0,
                    start,
                    delimiter,
                    tight: false,
                },
            ));
        }

        None
    }

    /// Consumes the spaces after a list marker and settles the item's
    /// content padding, per CommonMark's one-to-four-spaces rule.
    fn compute_list_padding(&mut self, line: &str, mut data: ListData, matched: usize) -> ListData {
        let (save_offset, save_column, save_tab) =
            (self.offset, self.column, self.partially_consumed_tab);

        while self.column - save_column <= 5
            && self
                .peek_at(line, self.offset)
                .map_or(false, is_space_or_tab)
        {
            self.advance_offset(line, 1, true);
        }

        let i = self.column - save_column;
        let at_line_end = self
            .peek_at(line, self.offset)
            .map_or(true, is_line_end_char);
        if i >= 5 || i < 1 || at_line_end {
            data.padding = matched + 1;
            self.offset = save_offset;
            self.column = save_column;
            self.partially_consumed_tab = save_tab;
            if self
                .peek_at(line, self.offset)
                .map_or(false, is_space_or_tab)
            {
                self.advance_offset(line, 1, true);
            }
        } else {
            data.padding = matched + i;
        }
        data
    }

    //
    // Adding text.
    //

    fn add_text_to_container(
        &mut self,
        mut container: usize,
        last_matched_container: usize,
        line: &str,
    ) {
        self.find_first_nonspace(line);

        if self.blank {
            if let Some(&last_child) = self.nodes[container].children.last() {
                self.nodes[last_child].last_line_blank = true;
            }
        }

        self.nodes[container].last_line_blank = self.blank
            && match self.nodes[container].kind {
                BlockKind::BlockQuote { .. }
                | BlockKind::Heading { .. }
                | BlockKind::ThematicBreak => false,
                BlockKind::CodeBlock { fenced, .. } => !fenced,
                BlockKind::Item(..) => {
                    !self.nodes[container].children.is_empty()
                        || self.nodes[container].start_line != self.line_number
                }
                BlockKind::Table { .. } => false,
                _ => true,
            };

        let mut tmp = container;
        while let Some(parent) = self.nodes[tmp].parent {
            self.nodes[parent].last_line_blank = false;
            tmp = parent;
        }

        if self.current != last_matched_container
            && container == last_matched_container
            && !self.blank
            && matches!(self.nodes[self.current].kind, BlockKind::Paragraph)
            && self.nodes[self.current].open
        {
            // Lazy continuation.
            let count = self.first_nonspace - self.offset;
            self.advance_offset(line, count, false);
            self.add_line(self.current, line);
            return;
        }

        while self.current != last_matched_container {
            self.current = if self.nodes[self.current].open {
                self.finalize(self.current)
            } else {
                self.nodes[self.current].parent.unwrap_or(0)
            };
        }

        match self.nodes[container].kind {
            BlockKind::CodeBlock { .. } => {
                self.add_line(container, line);
            }
            BlockKind::HtmlBlock { block_type } => {
                self.add_line(container, line);
                let rest = &line[self.first_nonspace.min(line.len())..];
                let done = match block_type {
                    1 => scanners::html_block_end_1(rest),
                    2 => scanners::html_block_end_2(rest),
                    3 => scanners::html_block_end_3(rest),
                    4 => scanners::html_block_end_4(rest),
                    5 => scanners::html_block_end_5(rest),
                    _ => false,
                };
                if done {
                    container = self.finalize(container);
                }
            }
            _ => {
                if self.blank {
                    // Nothing to add.
                } else if self.nodes[container].accepts_lines() {
                    let count = self.first_nonspace - self.offset;
                    self.advance_offset(line, count, false);
                    self.add_line(container, line);
                } else {
                    container = self.add_child(container, BlockKind::Paragraph);
                    let count = self.first_nonspace - self.offset;
                    self.advance_offset(line, count, false);
                    self.add_line(container, line);
                }
            }
        }

        self.current = container;
    }

    fn add_line(&mut self, node: usize, line: &str) {
        debug_assert!(self.nodes[node].open);
        if self.partially_consumed_tab {
            self.offset += 1;
            let chars_to_tab = TAB_STOP - (self.column % TAB_STOP);
            for _ in 0..chars_to_tab {
                self.nodes[node].content.push(' ');
            }
            self.partially_consumed_tab = false;
        }
        if self.offset < line.len() {
            let content = line[self.offset..].to_string();
            self.nodes[node].content.push_str(&content);
        }
    }

    //
    // Tree maintenance.
    //

    fn add_child(&mut self, mut parent: usize, kind: BlockKind) -> usize {
        while !can_contain(&self.nodes[parent].kind, &kind) {
            parent = self.finalize(parent);
        }

        let node = BlockNode::new(kind, Some(parent), self.line_number);
        self.nodes.push(node);
        let id = self.nodes.len() - 1;
        self.nodes[parent].children.push(id);
        id
    }

    /// Closes a block, closing any open children first.  Returns the
    /// parent.
    fn finalize(&mut self, node: usize) -> usize {
        if let Some(&last_child) = self.nodes[node].children.last() {
            if self.nodes[last_child].open {
                self.finalize(last_child);
            }
        }
        self.nodes[node].open = false;

        match self.nodes[node].kind {
            BlockKind::Paragraph => {
                self.strip_reference_definitions(node);
                let trimmed = strings::trim(&self.nodes[node].content).to_string();
                self.nodes[node].content = trimmed;
            }
            BlockKind::Heading { setext, .. } => {
                let mut content = std::mem::take(&mut self.nodes[node].content);
                strings::chop_line_end(&mut content);
                if !setext {
                    strings::chop_trailing_hashtags(&mut content);
                }
                if self.options.heading_attributes {
                    if let Some((id, classes, stripped_len)) = parse_heading_attributes(&content) {
                        content.truncate(stripped_len);
                        if let BlockKind::Heading {
                            id: slot_id,
                            classes: slot_classes,
                            ..
                        } = &mut self.nodes[node].kind
                        {
                            *slot_id = id;
                            *slot_classes = classes;
                        }
                    }
                }
                self.nodes[node].content = strings::trim(&content).to_string();
            }
            BlockKind::CodeBlock { fenced, .. } => {
                if !fenced {
                    let mut content = std::mem::take(&mut self.nodes[node].content);
                    strings::remove_trailing_blank_lines(&mut content);
                    if !content.is_empty() {
                        content.push('\n');
                    }
                    self.nodes[node].content = content;
                }
            }
            BlockKind::Item(..) => self.finalize_item(node),
            BlockKind::List(..) => self.finalize_list(node),
            BlockKind::DefinitionListDefinition => self.finalize_definition(node),
            _ => {}
        }

        self.nodes[node].parent.unwrap_or(0)
    }

    /// Removes link-reference definitions from the front of a paragraph,
    /// recording them in the reference map.  Returns whether any content
    /// remains.
    fn strip_reference_definitions(&mut self, node: usize) -> bool {
        let content = std::mem::take(&mut self.nodes[node].content);
        let mut rest = content.as_str();
        loop {
            let trimmed = strings::ltrim(rest);
            if !trimmed.starts_with('[') {
                break;
            }
            match scan_reference_definition(trimmed) {
                Some((label, url, title, consumed)) => {
                    self.refmap.add_link(label, url, title);
                    rest = &trimmed[consumed..];
                }
                None => {
                    rest = trimmed;
                    break;
                }
            }
        }
        self.nodes[node].content = rest.to_string();
        !self.nodes[node].content.is_empty()
    }

    fn finalize_item(&mut self, item: usize) {
        if !self.options.tasklist {
            return;
        }
        let first_child = match self.nodes[item].children.first() {
            Some(&child) => child,
            None => return,
        };
        if !matches!(self.nodes[first_child].kind, BlockKind::Paragraph) {
            return;
        }

        let content = &self.nodes[first_child].content;
        let bytes = content.as_bytes();
        if bytes.len() < 3 || bytes[0] != b'[' || bytes[2] != b']' {
            return;
        }
        let checked = match bytes[1] {
            b' ' => false,
            b'x' | b'X' => true,
            _ => return,
        };
        match bytes.get(3) {
            None => {}
            Some(&c) if c == b' ' || c == b'\t' => {}
            _ => return,
        }

        let mut stripped = content[3..].to_string();
        if stripped.starts_with(' ') || stripped.starts_with('\t') {
            stripped.remove(0);
        }
        self.nodes[first_child].content = stripped;
        self.nodes[first_child].task = Some(checked);
    }

    fn finalize_list(&mut self, list: usize) {
        let tight = self.determine_list_tight(list);
        if let BlockKind::List(ref mut data) = self.nodes[list].kind {
            data.tight = tight;
        }
        if tight {
            let items = self.nodes[list].children.clone();
            for item in items {
                for child in self.nodes[item].children.clone() {
                    if matches!(self.nodes[child].kind, BlockKind::Paragraph) {
                        self.nodes[child].no_tag = true;
                    }
                }
            }
        }
    }

    fn determine_list_tight(&self, list: usize) -> bool {
        let items = &self.nodes[list].children;
        for (i, &item) in items.iter().enumerate() {
            if self.nodes[item].last_line_blank && i + 1 < items.len() {
                return false;
            }
            let subitems = &self.nodes[item].children;
            for (j, &subitem) in subitems.iter().enumerate() {
                if (i + 1 < items.len() || j + 1 < subitems.len())
                    && self.ends_with_blank_line(subitem)
                {
                    return false;
                }
            }
        }
        true
    }

    fn ends_with_blank_line(&self, node: usize) -> bool {
        if self.nodes[node].last_line_blank {
            return true;
        }
        if matches!(
            self.nodes[node].kind,
            BlockKind::List(..) | BlockKind::Item(..)
        ) {
            if let Some(&last) = self.nodes[node].children.last() {
                return self.ends_with_blank_line(last);
            }
        }
        false
    }

    /// Single-paragraph definitions render without paragraph tags, the
    /// way tight list items do.
    fn finalize_definition(&mut self, definition: usize) {
        let children = self.nodes[definition].children.clone();
        if let [only] = children[..] {
            if matches!(self.nodes[only].kind, BlockKind::Paragraph) {
                self.nodes[only].no_tag = true;
            }
        }
    }

    fn finalize_document(&mut self) {
        while self.current != 0 {
            self.current = if self.nodes[self.current].open {
                self.finalize(self.current)
            } else {
                self.nodes[self.current].parent.unwrap_or(0)
            };
        }
        self.finalize(0);
        self.merge_definition_lists(0);
    }

    /// Adjacent definition lists, produced by blank-line-separated
    /// groups, merge into one list.
    fn merge_definition_lists(&mut self, node: usize) {
        let children = self.nodes[node].children.clone();
        for &child in &children {
            self.merge_definition_lists(child);
        }

        let mut merged: Vec<usize> = Vec::with_capacity(children.len());
        for child in children {
            let both_dl = matches!(self.nodes[child].kind, BlockKind::DefinitionList)
                && merged.last().map_or(false, |&prev| {
                    matches!(self.nodes[prev].kind, BlockKind::DefinitionList)
                });
            if both_dl {
                let target = *merged.last().unwrap();
                let moved = std::mem::take(&mut self.nodes[child].children);
                for grandchild in moved {
                    self.nodes[grandchild].parent = Some(target);
                    self.nodes[target].children.push(grandchild);
                }
            } else {
                merged.push(child);
            }
        }
        self.nodes[node].children = merged;
    }
}

/// A trailing `{#id .class ...}` group on a heading line.  Returns the
/// id, the classes, and the content length once the group is stripped.
fn parse_heading_attributes(content: &str) -> Option<(Option<String>, Vec<String>, usize)> {
    let trimmed = strings::rtrim(content);
    if !trimmed.ends_with('}') {
        return None;
    }
    let open = trimmed.rfind('{')?;
    let inner = &trimmed[open + 1..trimmed.len() - 1];

    let mut id = None;
    let mut classes = Vec::new();
    for token in inner.split_whitespace() {
        if let Some(token_id) = token.strip_prefix('#') {
            if token_id.is_empty() {
                return None;
            }
            id = Some(token_id.to_string());
        } else if let Some(class) = token.strip_prefix('.') {
            if class.is_empty() {
                return None;
            }
            classes.push(class.to_string());
        } else {
            return None;
        }
    }
    Some((id, classes, open))
}

/// A link-reference definition at the start of `s`: `[label]: dest
/// "title"`.  Returns the normalized label, cleaned destination and
/// title, and the bytes consumed through the line end.
fn scan_reference_definition(s: &str) -> Option<(String, String, String, usize)> {
    let bytes = s.as_bytes();
    if *bytes.first()? != b'[' {
        return None;
    }

    let mut i = 1;
    while i < bytes.len() && i <= 1001 {
        match bytes[i] {
            b'\\' if i + 1 < bytes.len() => i += 2,
            b'[' => return None,
            b']' => break,
            _ => i += 1,
        }
    }
    if bytes.get(i) != Some(&b']') || bytes.get(i + 1) != Some(&b':') {
        return None;
    }
    let label = strings::normalize_label(&s[1..i]);
    if label.is_empty() {
        return None;
    }
    i += 2;

    i += scan_spaces_with_newline(&bytes[i..], 1)?;

    let (dest_raw, dest_len) = scan_destination(&s[i..])?;
    if dest_len == 0 {
        return None;
    }
    i += dest_len;

    let after_dest = i;
    let dest_line_end = scan_to_line_end(&bytes[i..]);

    // The title may follow on the same line or the next; when it fails to
    // parse, a destination alone still counts if its line is finished.
    let ws = scan_spaces_with_newline(&bytes[i..], 1).unwrap_or(0);
    if ws > 0 {
        if let Some(title_len) = scanners::link_title(&s[i + ws..]) {
            let title_raw = &s[i + ws..i + ws + title_len];
            let after_title = i + ws + title_len;
            if let Some(end) = scan_to_line_end(&bytes[after_title..]) {
                return Some((
                    label,
                    strings::clean_url(dest_raw),
                    strings::clean_title(title_raw),
                    after_title + end,
                ));
            }
        }
    }

    let end = dest_line_end?;
    Some((
        label,
        strings::clean_url(dest_raw),
        String::new(),
        after_dest + end,
    ))
}

/// Spaces and tabs with at most `max_newlines` line endings.
fn scan_spaces_with_newline(bytes: &[u8], max_newlines: usize) -> Option<usize> {
    let mut i = 0;
    let mut newlines = 0;
    while i < bytes.len() {
        match bytes[i] {
            b' ' | b'\t' => i += 1,
            b'\n' => {
                newlines += 1;
                if newlines > max_newlines {
                    return None;
                }
                i += 1;
            }
            b'\r' => i += 1,
            _ => break,
        }
    }
    Some(i)
}

/// Only spaces and tabs up to the end of the line; returns the offset
/// just past the line ending (or the end of input).
fn scan_to_line_end(bytes: &[u8]) -> Option<usize> {
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b' ' | b'\t' => i += 1,
            b'\r' => {
                i += 1;
                if bytes.get(i) == Some(&b'\n') {
                    i += 1;
                }
                return Some(i);
            }
            b'\n' => return Some(i + 1),
            _ => return None,
        }
    }
    Some(i)
}

fn scan_destination(s: &str) -> Option<(&str, usize)> {
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

    let mut i = 0;
    let mut depth = 0i32;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if i + 1 < bytes.len() && strings::ispunct(bytes[i + 1]) => i += 2,
            b'(' => {
                depth += 1;
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

/// A pull parser for Markdown: an iterator over [`Event`]s.
///
/// The stream is finite and single-pass; run a fresh parse to traverse a
/// document again.
///
/// ```rust
/// use inkmark::{html, Parser, Options};
///
/// let options = Options::default();
/// let parser = Parser::new("*hello*", &options);
/// let mut out = String::new();
/// html::push_html(&mut out, parser);
/// assert_eq!(out, "<p><em>hello</em></p>\n");
/// ```
pub struct Parser<'o> {
    options: &'o Options,
    nodes: Vec<BlockNode>,
    refmap: RefMap,
    queue: VecDeque<Event>,
    stack: Vec<Frame>,
}

enum Frame {
    Enter(usize),
    Exit(usize),
}

impl<'o> Parser<'o> {
    /// Runs the block pass over `text` and returns the lazy event
    /// iterator.
    pub fn new(text: &str, options: &'o Options) -> Self {
        let (nodes, refmap) = FirstPass::new(&options.extension).parse(text);
        Parser {
            options,
            nodes,
            refmap,
            queue: VecDeque::new(),
            stack: vec![Frame::Enter(0)],
        }
    }

    fn start_tag(&self, id: usize) -> Option<Tag> {
        let node = &self.nodes[id];
        match &node.kind {
            BlockKind::Document | BlockKind::HtmlBlock { .. } | BlockKind::ThematicBreak => None,
            BlockKind::Paragraph => {
                if node.no_tag {
                    None
                } else {
                    Some(Tag::Paragraph)
                }
            }
            BlockKind::Heading {
                level,
                id: heading_id,
                classes,
                ..
            } => Some(Tag::Heading {
                level: HeadingLevel::from_usize(*level),
                id: heading_id.clone(),
                classes: classes.clone(),
            }),
            BlockKind::BlockQuote { alert } => Some(Tag::BlockQuote(*alert)),
            BlockKind::CodeBlock { fenced, info, .. } => Some(Tag::CodeBlock(if *fenced {
                CodeBlockKind::Fenced(info.clone())
            } else {
                CodeBlockKind::Indented
            })),
            BlockKind::List(data) => Some(Tag::List(match data.list_type {
                ListType::Ordered => Some(data.start),
                ListType::Bullet => None,
            })),
            BlockKind::Item(..) => Some(Tag::Item),
            BlockKind::FootnoteDefinition { label } => {
                Some(Tag::FootnoteDefinition(label.clone()))
            }
            BlockKind::Table { alignments } => Some(Tag::Table(alignments.clone())),
            BlockKind::TableRow { header: true } => Some(Tag::TableHead),
            BlockKind::TableRow { header: false } => Some(Tag::TableRow),
            BlockKind::TableCell => Some(Tag::TableCell),
            BlockKind::DefinitionList => Some(Tag::DefinitionList),
            BlockKind::DefinitionListTitle => Some(Tag::DefinitionListTitle),
            BlockKind::DefinitionListDefinition => Some(Tag::DefinitionListDefinition),
        }
    }

    fn enter(&mut self, id: usize) {
        let has_inlines = matches!(
            self.nodes[id].kind,
            BlockKind::Paragraph
                | BlockKind::Heading { .. }
                | BlockKind::TableCell
                | BlockKind::DefinitionListTitle
        );

        if has_inlines && self.nodes[id].content.is_empty() && self.nodes[id].task.is_none() {
            if matches!(self.nodes[id].kind, BlockKind::Paragraph) {
                return;
            }
        }

        match self.nodes[id].kind {
            BlockKind::HtmlBlock { .. } => {
                self.queue
                    .push_back(Event::Html(self.nodes[id].content.clone()));
                return;
            }
            BlockKind::ThematicBreak => {
                self.queue.push_back(Event::Rule);
                return;
            }
            _ => {}
        }

        if let Some(tag) = self.start_tag(id) {
            self.queue.push_back(Event::Start(tag));
        }
        self.stack.push(Frame::Exit(id));

        if has_inlines {
            if let Some(checked) = self.nodes[id].task {
                self.queue.push_back(Event::TaskListMarker(checked));
            }
            let mut events = Vec::new();
            inlines::parse(
                &self.nodes[id].content,
                &self.options.extension,
                &self.refmap,
                &mut events,
            );
            self.queue.extend(events);
        } else if matches!(self.nodes[id].kind, BlockKind::CodeBlock { .. }) {
            if !self.nodes[id].content.is_empty() {
                self.queue
                    .push_back(Event::Text(self.nodes[id].content.clone()));
            }
        } else {
            for &child in self.nodes[id].children.iter().rev() {
                self.stack.push(Frame::Enter(child));
            }
        }
    }
}

impl<'o> Iterator for Parser<'o> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        loop {
            if let Some(event) = self.queue.pop_front() {
                return Some(event);
            }
            match self.stack.pop()? {
                Frame::Enter(id) => self.enter(id),
                Frame::Exit(id) => {
                    if let Some(tag) = self.start_tag(id) {
                        return Some(Event::End(tag.to_end()));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_definitions() {
        let (label, url, title, consumed) =
            scan_reference_definition("[Foo Bar]: /url \"the title\"\nrest").unwrap();
        assert_eq!(label, "foo bar");
        assert_eq!(url, "/url");
        assert_eq!(title, "the title");
        assert_eq!(&"[Foo Bar]: /url \"the title\"\nrest"[consumed..], "rest");

        assert!(scan_reference_definition("[foo]: /url extra\n").is_none());
        let (_, url, title, _) = scan_reference_definition("[foo]: </my url>\n").unwrap();
        assert_eq!(url, "/my url");
        assert_eq!(title, "");
    }

    #[test]
    fn heading_attribute_groups() {
        let (id, classes, len) = parse_heading_attributes("foo {#bar .baz}").unwrap();
        assert_eq!(id.as_deref(), Some("bar"));
        assert_eq!(classes, vec!["baz"]);
        assert_eq!("foo {#bar .baz}"[..len].trim_end(), "foo");

        assert!(parse_heading_attributes("foo {bar}").is_none());
        assert!(parse_heading_attributes("foo").is_none());
    }
}
