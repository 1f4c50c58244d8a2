//! Link reference definitions (`[label]: destination "title"`).
//!
//! A definition may spread its label, destination and title over several
//! lines. The rule is restorable: any failure leaves the lines to the
//! paragraph rule.

use super::node::Block;
use super::parser::{BlockParse, BlockRule, DocumentParser};
use crate::limits::{MAX_LINK_LABEL_LEN, MAX_LINK_PAREN_DEPTH};

#[derive(Debug, Default, Clone, Copy)]
pub struct LinkRefDefRule;

impl BlockRule for LinkRefDefRule {
    fn name(&self) -> &str {
        "link-reference-definition"
    }

    fn may_interrupt_paragraph(&self) -> bool {
        false
    }

    fn restorable(&self) -> bool {
        true
    }

    fn parse(&self, doc: &mut DocumentParser<'_>) -> BlockParse {
        if !doc.short_line_indent() || doc.first_byte() != Some(b'[') {
            return BlockParse::NoMatch;
        }
        let Some((label, mut line, mut pos)) = scan_label(doc) else {
            return BlockParse::NoMatch;
        };
        if line.as_bytes().get(pos) != Some(&b':') {
            return BlockParse::NoMatch;
        }
        pos = skip_spaces(line, pos + 1);
        if pos == line.len() {
            if !continuation_line(doc) {
                return BlockParse::NoMatch;
            }
            line = doc.content();
            pos = 0;
        }
        let Some((destination, end)) = scan_destination(&line[pos..]) else {
            return BlockParse::NoMatch;
        };
        let after = pos + end;
        pos = skip_spaces(line, after);

        if pos < line.len() {
            // The title starts on the destination line, so it must succeed.
            if pos == after {
                return BlockParse::NoMatch;
            }
            return match scan_title(doc, line, pos) {
                Some(title) => BlockParse::Block(Block::ReferenceDef {
                    label,
                    destination,
                    title,
                }),
                None => BlockParse::NoMatch,
            };
        }

        doc.next_line();
        let next_line = doc.snapshot();
        if !doc.finished() && !doc.line_empty() && !doc.lazy_continuation() {
            let line = doc.content();
            if let Some(title) = scan_title(doc, line, 0) {
                return BlockParse::Block(Block::ReferenceDef {
                    label,
                    destination,
                    title,
                });
            }
            doc.restore(next_line);
        }
        BlockParse::Block(Block::ReferenceDef {
            label,
            destination,
            title: Vec::new(),
        })
    }
}

/// Advance to a line that may continue the definition.
fn continuation_line(doc: &mut DocumentParser<'_>) -> bool {
    doc.next_line();
    !doc.finished() && !doc.line_empty() && !doc.lazy_continuation()
}

fn skip_spaces(line: &str, mut pos: usize) -> usize {
    let bytes = line.as_bytes();
    while pos < bytes.len() && matches!(bytes[pos], b' ' | b'\t') {
        pos += 1;
    }
    pos
}

/// Scan the bracketed label starting at the current line's content.
///
/// Returns the label with whitespace collapsed, and the line and offset
/// just past the closing `]`.
fn scan_label<'a>(doc: &mut DocumentParser<'a>) -> Option<(String, &'a str, usize)> {
    let mut raw = String::new();
    let mut line = doc.content();
    let mut pos = 1;
    loop {
        let bytes = line.as_bytes();
        let mut i = pos;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 1,
                b'[' => return None,
                b']' => {
                    raw.push_str(&line[pos..i]);
                    if raw.chars().count() > MAX_LINK_LABEL_LEN {
                        return None;
                    }
                    let label = collapse_whitespace(&raw);
                    return (!label.is_empty()).then_some((label, line, i + 1));
                }
                _ => {}
            }
            i += 1;
        }
        raw.push_str(&line[pos..]);
        raw.push('\n');
        if raw.chars().count() > MAX_LINK_LABEL_LEN || !continuation_line(doc) {
            return None;
        }
        line = doc.content();
        pos = 0;
    }
}

/// Trim and collapse runs of whitespace to a single space.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Scan a link destination at the start of `s`.
///
/// Returns the destination and the offset past it. A destination in angle
/// brackets may be empty; a bare one must not be.
pub(crate) fn scan_destination(s: &str) -> Option<(String, usize)> {
    let bytes = s.as_bytes();
    if bytes.first() == Some(&b'<') {
        let mut i = 1;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' if i + 1 < bytes.len() => i += 1,
                b'<' | b'\n' => return None,
                b'>' => {
                    let next = bytes.get(i + 1);
                    return matches!(next, None | Some(b' ' | b'\t'))
                        .then(|| (s[1..i].to_owned(), i + 1));
                }
                _ => {}
            }
            i += 1;
        }
        return None;
    }
    let mut depth = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if bytes.get(i + 1).is_some_and(u8::is_ascii_punctuation) => i += 1,
            b'(' => {
                depth += 1;
                if depth > MAX_LINK_PAREN_DEPTH {
                    return None;
                }
            }
            b')' => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            b if b <= b' ' || b == 0x7f => break,
            _ => {}
        }
        i += 1;
    }
    (i > 0 && depth == 0).then(|| (s[..i].to_owned(), i))
}

/// Scan a quoted title starting at `line[pos]`, continuing over lines as
/// needed. Only whitespace may follow the closing quote. On success the
/// parser is left on the line after the title.
fn scan_title<'a>(doc: &mut DocumentParser<'a>, mut line: &'a str, pos: usize) -> Option<Vec<String>> {
    let opener = *line.as_bytes().get(pos)?;
    let closer = match opener {
        b'"' | b'\'' => opener,
        b'(' => b')',
        _ => return None,
    };
    let mut lines = Vec::new();
    let mut start = pos + 1;
    loop {
        let bytes = line.as_bytes();
        let mut i = start;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 1,
                b if b == closer => {
                    lines.push(line[start..i].to_owned());
                    if skip_spaces(line, i + 1) < line.len() {
                        return None;
                    }
                    doc.next_line();
                    return Some(lines);
                }
                b'(' if opener == b'(' => return None,
                _ => {}
            }
            i += 1;
        }
        lines.push(line[start..].to_owned());
        if !continuation_line(doc) {
            return None;
        }
        line = doc.content();
        start = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_destination() {
        assert_eq!(scan_destination("/url \"t\""), Some(("/url".into(), 4)));
        assert_eq!(scan_destination("<my url>"), Some(("my url".into(), 8)));
        assert_eq!(scan_destination("<>"), Some((String::new(), 2)));
        assert_eq!(scan_destination("<bar>(baz)"), None);
        assert_eq!(scan_destination("<a<b>"), None);
        assert_eq!(scan_destination("a(b(c))d"), Some(("a(b(c))d".into(), 8)));
        assert_eq!(scan_destination("a(b"), None);
        assert_eq!(scan_destination(""), None);
        assert_eq!(scan_destination("a\\(b"), Some(("a\\(b".into(), 4)));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("\nfoo\n bar \n"), "foo bar");
        assert_eq!(collapse_whitespace("Foo\\]"), "Foo\\]");
    }
}
