//! Code spans, autolinks and raw inline HTML.
//!
//! Code spans have the highest precedence among inline elements: a
//! backtick run is matched with the next run of exactly the same length,
//! and everything in between becomes literal code. Angle brackets are then
//! tried as autolinks (URI first, then email) and finally as HTML.
//!
//! A failed scan records where it gave up, so later openers of the same
//! kind fail without scanning the same fragments again.

use super::html::is_html_tag;
use super::links::{is_email_autolink, is_uri_autolink};
use super::{InlineParser, InlineTransformer};
use crate::limits::MAX_CODE_SPAN_BACKTICKS;
use crate::text::{AutolinkKind, Text, TextFragment};

#[derive(Debug, Default, Clone, Copy)]
pub struct CodeLinkHtmlTransformer;

impl InlineTransformer for CodeLinkHtmlTransformer {
    fn name(&self) -> &str {
        "code-link-html"
    }

    fn transform(&self, text: Text, owner: &InlineParser<'_>) -> Text {
        let fragments = text.into_fragments();
        let mut out = Text::new();
        let mut scans = ScanState::default();
        let mut i = 0;
        while i < fragments.len() {
            let matched = match &fragments[i] {
                TextFragment::Delimiter { ch: '`', count, run }
                    if run.is_empty() && *count <= MAX_CODE_SPAN_BACKTICKS =>
                {
                    scans.code_span(&fragments, i, *count)
                }
                TextFragment::Delimiter { ch: '<', count: 1, run } if run.is_empty() => scans.angle_brackets(&fragments, i),
                _ => None,
            };
            match matched {
                Some((fragment, next)) => {
                    out.push(fragment);
                    i = next;
                }
                None => {
                    self.transform_fragment(fragments[i].clone(), owner, &mut out);
                    i += 1;
                }
            }
        }
        out
    }
}

/// Whether a code span or angle-bracket scan may look past `fragment`.
fn scannable(fragment: &TextFragment) -> bool {
    matches!(
        fragment,
        TextFragment::Delimiter { .. } | TextFragment::Text(_) | TextFragment::SoftBreak | TextFragment::HardBreak
    )
}

/// Raw content of a code span: line breaks become spaces, and a single
/// space is stripped from both ends if present on both.
fn code_content(fragments: &[TextFragment]) -> String {
    let code: String = fragments.iter().map(TextFragment::raw_text).collect();
    if code.len() >= 2 && code.starts_with(' ') && code.ends_with(' ') && !code.bytes().all(|b| b == b' ') {
        code[1..code.len() - 1].to_owned()
    } else {
        code
    }
}

/// Dead ends found by earlier scans of one pass. Each entry is the index
/// a failed scan stopped at; an opener before it fails the same way.
#[derive(Debug)]
struct ScanState {
    /// No closing backtick run of each length before the index.
    code_spans: [usize; MAX_CODE_SPAN_BACKTICKS + 1],
    /// No `>` before the index.
    angle: usize,
    /// No end of a comment, processing instruction or CDATA section.
    raw_html: [usize; 3],
}

impl Default for ScanState {
    fn default() -> Self {
        Self {
            code_spans: [0; MAX_CODE_SPAN_BACKTICKS + 1],
            angle: 0,
            raw_html: [0; 3],
        }
    }
}

impl ScanState {
    fn code_span(&mut self, fragments: &[TextFragment], open: usize, count: usize) -> Option<(TextFragment, usize)> {
        if open < self.code_spans[count] {
            return None;
        }
        for (close, fragment) in fragments.iter().enumerate().skip(open + 1) {
            match fragment {
                TextFragment::Delimiter { ch: '`', count: n, .. } if *n == count => {
                    let code = code_content(&fragments[open + 1..close]);
                    return Some((TextFragment::Code(code), close + 1));
                }
                f if scannable(f) => {}
                _ => {
                    self.code_spans[count] = close;
                    return None;
                }
            }
        }
        self.code_spans[count] = fragments.len();
        None
    }

    fn angle_brackets(&mut self, fragments: &[TextFragment], open: usize) -> Option<(TextFragment, usize)> {
        if open < self.angle {
            return None;
        }
        let mut content = String::new();
        let mut seen_close = false;
        let mut stop = fragments.len();
        for (close, fragment) in fragments.iter().enumerate().skip(open + 1) {
            match fragment {
                TextFragment::Delimiter { ch: '>', count: 1, .. } => {
                    seen_close = true;
                    let fragment = if is_uri_autolink(&content) {
                        TextFragment::autolink(AutolinkKind::Uri, content)
                    } else if is_email_autolink(&content) {
                        TextFragment::autolink(AutolinkKind::Email, content)
                    } else if is_html_tag(&content) {
                        TextFragment::Html(content)
                    } else {
                        // Only raw sections and quoted attribute values may hold a `>`.
                        match raw_html_kind(&content) {
                            Some(kind) if open < self.raw_html[kind] => return None,
                            Some(_) => {}
                            None if has_open_quote(&content) => {}
                            None => return None,
                        }
                        content.push('>');
                        continue;
                    };
                    return Some((fragment, close + 1));
                }
                f if scannable(f) => content.push_str(&f.raw_text()),
                _ => {
                    stop = close;
                    break;
                }
            }
        }
        if !seen_close {
            self.angle = stop;
        }
        if let Some(kind) = raw_html_kind(&content) {
            self.raw_html[kind] = stop;
        }
        None
    }
}

/// Comments, processing instructions and CDATA end at a fixed terminator,
/// so the first one after the opener decides.
fn raw_html_kind(content: &str) -> Option<usize> {
    if content.starts_with("!--") {
        Some(0)
    } else if content.starts_with('?') {
        Some(1)
    } else if content.starts_with("![CDATA[") {
        Some(2)
    } else {
        None
    }
}

fn has_open_quote(content: &str) -> bool {
    let mut quote = None;
    for ch in content.chars() {
        match quote {
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            Some(q) if ch == q => quote = None,
            _ => {}
        }
    }
    quote.is_some()
}
