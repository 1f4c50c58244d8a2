//! Pipe tables.
//!
//! A header row, an alignment row with the same number of cells, and any
//! number of body rows. Cells are separated by unescaped `|`; a row ending
//! in `\` continues on the next line.

use super::node::{Alignment, Block, Row};
use super::parser::{BlockParse, BlockRule, DocumentParser};
use crate::limits::MAX_TABLE_COLUMNS;
use crate::text::{Text, TextFragment};

#[derive(Debug, Default, Clone, Copy)]
pub struct TableRule;

impl BlockRule for TableRule {
    fn name(&self) -> &str {
        "table"
    }

    fn restorable(&self) -> bool {
        true
    }

    fn parse(&self, doc: &mut DocumentParser<'_>) -> BlockParse {
        if !doc.short_line_indent() || find_pipe(doc.content().as_bytes()).is_none() {
            return BlockParse::NoMatch;
        }
        let Some(mut header) = parse_row(doc) else {
            return BlockParse::NoMatch;
        };
        doc.next_line();
        if doc.lazy_continuation() {
            return BlockParse::NoMatch;
        }
        let Some(delimiters) = parse_row(doc) else {
            return BlockParse::NoMatch;
        };
        if delimiters.len() != header.len() {
            return BlockParse::NoMatch;
        }
        let Some(mut alignments) = delimiters.iter().map(alignment).collect::<Option<Vec<_>>>() else {
            return BlockParse::NoMatch;
        };
        header.truncate(MAX_TABLE_COLUMNS);
        alignments.truncate(MAX_TABLE_COLUMNS);
        let columns = header.len();
        doc.next_line();

        let mut rows = Vec::new();
        while !doc.lazy_continuation() {
            let Some(mut row) = parse_row(doc) else {
                break;
            };
            row.resize_with(columns, Text::new);
            rows.push(row);
            doc.next_line();
        }
        BlockParse::Block(Block::Table {
            header,
            alignments,
            rows,
        })
    }
}

/// Offset of the first unescaped `|`.
fn find_pipe(line: &[u8]) -> Option<usize> {
    let mut escaped = false;
    for (i, &b) in line.iter().enumerate() {
        match b {
            b'|' if !escaped => return Some(i),
            b'\\' => escaped = !escaped,
            _ => escaped = false,
        }
    }
    None
}

/// Parse the current line (and its continuation lines) as a table row.
///
/// A row is valid if it contains at least one unescaped `|`.
fn parse_row(doc: &mut DocumentParser<'_>) -> Option<Row> {
    let mut line = doc.content();
    if line.is_empty() {
        return None;
    }
    let mut valid = false;
    if let Some(rest) = line.strip_prefix('|') {
        valid = true;
        line = rest.trim_start_matches([' ', '\t']);
    }
    let mut row = Row::new();
    let mut continued: Option<Text> = None;
    loop {
        if line.is_empty() {
            break;
        }
        match find_pipe(line.as_bytes()) {
            Some(pipe) => {
                push_cell(&mut row, &mut continued, line[..pipe].trim_end_matches(' '));
                valid = true;
                line = line[pipe + 1..].trim_start_matches([' ', '\t']);
            }
            None => {
                let cell = line.trim_end_matches(' ');
                match cell.strip_suffix('\\') {
                    Some(head) if !ends_escaped(head) => {
                        continued
                            .get_or_insert_with(Text::new)
                            .push(TextFragment::text(head));
                        doc.next_line();
                        if doc.finished() || doc.lazy_continuation() {
                            break;
                        }
                        line = doc.content();
                    }
                    _ => {
                        push_cell(&mut row, &mut continued, cell);
                        break;
                    }
                }
            }
        }
    }
    if let Some(text) = continued.take() {
        row.push(text);
    }
    (valid && !row.is_empty()).then_some(row)
}

/// Whether `s` ends in an odd number of backslashes.
fn ends_escaped(s: &str) -> bool {
    s.bytes().rev().take_while(|&b| b == b'\\').count() % 2 == 1
}

fn push_cell(row: &mut Row, continued: &mut Option<Text>, cell: &str) {
    match continued.take() {
        Some(mut text) => {
            text.push(TextFragment::text(cell));
            row.push(text);
        }
        None => row.push(Text::plain(cell)),
    }
}

/// Alignment of a delimiter-row cell: `:-+:`, `:-+`, `-+:` or `-+`.
fn alignment(cell: &Text) -> Option<Alignment> {
    let Some(TextFragment::Text(s)) = cell.first() else {
        return None;
    };
    let (left, s) = match s.strip_prefix(':') {
        Some(rest) => (true, rest),
        None => (false, s.as_str()),
    };
    let (right, dashes) = match s.strip_suffix(':') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    if dashes.is_empty() || !dashes.bytes().all(|b| b == b'-') {
        return None;
    }
    Some(match (left, right) {
        (true, true) => Alignment::Center,
        (true, false) => Alignment::Left,
        (false, true) => Alignment::Right,
        (false, false) => Alignment::Undefined,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_pipe_skips_escapes() {
        assert_eq!(find_pipe(b"a | b"), Some(2));
        assert_eq!(find_pipe(b"a \\| b"), None);
        assert_eq!(find_pipe(b"a \\\\| b"), Some(4));
    }

    #[test]
    fn test_alignment() {
        assert_eq!(alignment(&Text::plain("---")), Some(Alignment::Undefined));
        assert_eq!(alignment(&Text::plain(":--")), Some(Alignment::Left));
        assert_eq!(alignment(&Text::plain("--:")), Some(Alignment::Right));
        assert_eq!(alignment(&Text::plain(":-:")), Some(Alignment::Center));
        assert_eq!(alignment(&Text::plain(":")), None);
        assert_eq!(alignment(&Text::plain("::")), None);
        assert_eq!(alignment(&Text::plain("-x-")), None);
        assert_eq!(alignment(&Text::new()), None);
    }

    #[test]
    fn test_ends_escaped() {
        assert!(ends_escaped("a\\"));
        assert!(!ends_escaped("a\\\\"));
        assert!(!ends_escaped("a"));
    }
}
