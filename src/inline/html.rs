//! Inline HTML recognition.
//!
//! Matches open tags, closing tags, comments, processing instructions,
//! declarations and CDATA sections.

/// Whether `content`, wrapped in `<` and `>`, is exactly one HTML construct.
pub(crate) fn is_html_tag(content: &str) -> bool {
    let mut text = Vec::with_capacity(content.len() + 2);
    text.push(b'<');
    text.extend_from_slice(content.as_bytes());
    text.push(b'>');
    parse_inline_html(&text, 0) == Some(text.len())
}

/// Parse an HTML construct starting at `text[start]`, returning its end.
fn parse_inline_html(text: &[u8], start: usize) -> Option<usize> {
    if text.get(start) != Some(&b'<') {
        return None;
    }
    if text.get(start + 1) == Some(&b'!') {
        if text[start..].starts_with(b"<!--") {
            return parse_html_comment(text, start);
        }
        if text[start..].starts_with(b"<![CDATA[") {
            return find_subsequence(text, start + 9, b"]]>").map(|end| end + 3);
        }
        return parse_html_declaration(text, start);
    }
    if text.get(start + 1) == Some(&b'?') {
        return find_subsequence(text, start + 2, b"?>").map(|end| end + 2);
    }
    parse_html_tag(text, start)
}

fn parse_html_comment(text: &[u8], start: usize) -> Option<usize> {
    let i = start + 4;
    if i >= text.len() {
        return None;
    }
    if text[i] == b'>' {
        return Some(i + 1);
    }
    if text[i] == b'-' && text.get(i + 1) == Some(&b'>') {
        return Some(i + 2);
    }
    find_subsequence(text, i, b"-->").map(|end| end + 3)
}

fn parse_html_declaration(text: &[u8], start: usize) -> Option<usize> {
    if !text.get(start + 2).is_some_and(u8::is_ascii_alphabetic) {
        return None;
    }
    let mut i = start + 2;
    while i < text.len() && (text[i].is_ascii_alphanumeric() || text[i] == b'-') {
        i += 1;
    }
    memchr::memchr(b'>', &text[i..]).map(|end| i + end + 1)
}

fn parse_html_tag(text: &[u8], start: usize) -> Option<usize> {
    let len = text.len();
    let mut i = start + 1;
    if i >= len {
        return None;
    }

    let closing = text[i] == b'/';
    if closing {
        i += 1;
    }

    if i >= len || !text[i].is_ascii_alphabetic() {
        return None;
    }
    i += 1;
    while i < len && (text[i].is_ascii_alphanumeric() || text[i] == b'-') {
        i += 1;
    }

    if closing {
        while i < len && is_html_whitespace(text[i]) {
            i += 1;
        }
        return (i < len && text[i] == b'>').then_some(i + 1);
    }

    loop {
        if i >= len {
            return None;
        }
        match text[i] {
            b'>' => return Some(i + 1),
            b'/' => return (text.get(i + 1) == Some(&b'>')).then_some(i + 2),
            b if !is_html_whitespace(b) => return None,
            _ => {}
        }
        while i < len && is_html_whitespace(text[i]) {
            i += 1;
        }
        if i >= len {
            return None;
        }
        match text[i] {
            b'>' => return Some(i + 1),
            b'/' => return (text.get(i + 1) == Some(&b'>')).then_some(i + 2),
            b if !is_attr_name_start(b) => return None,
            _ => {}
        }
        i += 1;
        while i < len && is_attr_name_char(text[i]) {
            i += 1;
        }

        let ws_start = i;
        while i < len && is_html_whitespace(text[i]) {
            i += 1;
        }
        if i >= len || text[i] != b'=' {
            i = ws_start;
            continue;
        }
        i += 1;
        while i < len && is_html_whitespace(text[i]) {
            i += 1;
        }
        i = attribute_value_end(text, i)?;
    }
}

/// End of a quoted or unquoted attribute value starting at `i`.
fn attribute_value_end(text: &[u8], i: usize) -> Option<usize> {
    let quote = *text.get(i)?;
    if quote == b'"' || quote == b'\'' {
        let end = memchr::memchr(quote, &text[i + 1..])?;
        return Some(i + 1 + end + 1);
    }
    let value = text[i..]
        .iter()
        .take_while(|&&b| !is_html_whitespace(b) && !matches!(b, b'"' | b'\'' | b'=' | b'<' | b'>' | b'`'))
        .count();
    (value > 0).then_some(i + value)
}

#[inline]
fn is_html_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0c')
}

#[inline]
fn is_attr_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b':'
}

#[inline]
fn is_attr_name_char(b: u8) -> bool {
    is_attr_name_start(b) || b.is_ascii_digit() || b == b'.' || b == b'-'
}

fn find_subsequence(text: &[u8], start: usize, needle: &[u8]) -> Option<usize> {
    if start >= text.len() {
        return None;
    }
    memchr::memmem::find(&text[start..], needle).map(|idx| start + idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_and_closing_tags() {
        assert!(is_html_tag("a"));
        assert!(is_html_tag("a href=\"x\" title='y'"));
        assert!(is_html_tag("br/"));
        assert!(is_html_tag("input disabled"));
        assert!(is_html_tag("/div"));
        assert!(is_html_tag("td\nclass=x"));
        assert!(!is_html_tag("/div class=x"));
        assert!(!is_html_tag("1a"));
        assert!(!is_html_tag("a href=\"x"));
        assert!(!is_html_tag("a b=>"));
    }

    #[test]
    fn test_other_constructs() {
        assert!(is_html_tag("!-- comment --"));
        assert!(is_html_tag("?php echo 1 ?"));
        assert!(is_html_tag("!DOCTYPE html"));
        assert!(is_html_tag("![CDATA[ x ]]"));
        assert!(!is_html_tag("!-- a -- b"));
    }

    #[test]
    fn test_must_span_whole_content() {
        assert!(!is_html_tag("a> <b"));
        assert!(!is_html_tag(""));
    }
}
