//! Delimiter tokenizing.
//!
//! Splits literal text into text and [`TextFragment::Delimiter`] pieces:
//! backtick runs, the bracket and quote characters used by links, `![`
//! image openers, and runs of emphasis characters annotated with their
//! flanking classification.

use super::{InlineParser, InlineTransformer};
use crate::chars::{is_unicode_punctuation, is_unicode_whitespace};
use crate::text::{DelimiterRunType, Text, TextFragment};

#[derive(Debug, Clone)]
pub struct DelimiterTransformer {
    emphasis: Vec<char>,
    /// Bytes that may start a delimiter or an escape.
    special: [bool; 256],
}

impl DelimiterTransformer {
    pub fn new(emphasis: impl IntoIterator<Item = char>) -> Self {
        let emphasis: Vec<char> = emphasis.into_iter().collect();
        let mut special = [false; 256];
        for &b in b"`<>[]()\"'!\\" {
            special[b as usize] = true;
        }
        for &ch in &emphasis {
            let mut buf = [0; 4];
            special[ch.encode_utf8(&mut buf).as_bytes()[0] as usize] = true;
        }
        Self { emphasis, special }
    }

    fn split(&self, s: &str, out: &mut Text) {
        let bytes = s.as_bytes();
        let mut i = 0;
        let mut start = 0;
        let mut escape = false;
        let mut split = false;

        let flush = |out: &mut Text, start: usize, end: usize| {
            if start < end {
                out.push(TextFragment::text(&s[start..end]));
            }
        };

        while i < bytes.len() {
            if !self.special[bytes[i] as usize] {
                i += 1;
                escape = false;
                continue;
            }
            let Some(ch) = s[i..].chars().next() else {
                break;
            };
            match ch {
                '`' => {
                    let n = bytes[i..].iter().take_while(|&&b| b == b'`').count();
                    flush(out, start, i);
                    let run = if escape {
                        DelimiterRunType::ESCAPED
                    } else {
                        DelimiterRunType::NONE
                    };
                    out.push(TextFragment::delimiter('`', n, run));
                    split = true;
                    i += n;
                    start = i;
                    escape = false;
                }
                '<' | '>' | '[' | ']' | '(' | ')' | '"' | '\'' => {
                    if !escape {
                        flush(out, start, i);
                        out.push(TextFragment::delimiter(ch, 1, DelimiterRunType::NONE));
                        split = true;
                        start = i + 1;
                    }
                    i += 1;
                    escape = false;
                }
                '!' => {
                    if !escape && bytes.get(i + 1) == Some(&b'[') {
                        flush(out, start, i);
                        out.push(TextFragment::delimiter('[', 1, DelimiterRunType::IMAGE));
                        split = true;
                        i += 2;
                        start = i;
                    } else {
                        i += 1;
                    }
                    escape = false;
                }
                '\\' => {
                    i += 1;
                    escape = !escape;
                }
                _ if self.emphasis.contains(&ch) => {
                    let width = ch.len_utf8();
                    if escape {
                        i += width;
                        escape = false;
                        continue;
                    }
                    let n = s[i..].chars().take_while(|&c| c == ch).count();
                    let end = i + n * width;
                    let run = flanking(s[..i].chars().next_back(), s[end..].chars().next());
                    flush(out, start, i);
                    out.push(TextFragment::delimiter(ch, n, run));
                    split = true;
                    i = end;
                    start = i;
                }
                _ => {
                    i += ch.len_utf8();
                    escape = false;
                }
            }
        }
        if split {
            flush(out, start, bytes.len());
        } else {
            out.push(TextFragment::text(s));
        }
    }
}

impl Default for DelimiterTransformer {
    fn default() -> Self {
        Self::new(['*', '_'])
    }
}

/// Classify a delimiter run by the characters around it.
fn flanking(prev: Option<char>, next: Option<char>) -> DelimiterRunType {
    let mut run = DelimiterRunType::NONE;
    let Some(prev) = prev else {
        if next.is_some_and(|n| !is_unicode_whitespace(n)) {
            run |= DelimiterRunType::LEFT_FLANKING;
        }
        return run;
    };
    let prev_punct = is_unicode_punctuation(prev);
    let prev_space = is_unicode_whitespace(prev);
    let next_punct = next.is_some_and(is_unicode_punctuation);
    let next_space = next.is_some_and(is_unicode_whitespace);

    if next.is_some() && !next_space && (!next_punct || prev_space || prev_punct) {
        run |= DelimiterRunType::LEFT_FLANKING;
        if prev_punct {
            run |= DelimiterRunType::LEFT_PUNCTUATION;
        }
        if next_punct {
            run |= DelimiterRunType::RIGHT_PUNCTUATION;
        }
    }
    if !prev_space && (!prev_punct || next.is_none() || next_space || next_punct) {
        run |= DelimiterRunType::RIGHT_FLANKING;
        if prev_punct {
            run |= DelimiterRunType::LEFT_PUNCTUATION;
        }
        if next_punct {
            run |= DelimiterRunType::RIGHT_PUNCTUATION;
        }
    }
    run
}

impl InlineTransformer for DelimiterTransformer {
    fn name(&self) -> &str {
        "delimiter"
    }

    fn transform_fragment(&self, fragment: TextFragment, _owner: &InlineParser<'_>, out: &mut Text) {
        match fragment {
            TextFragment::Text(s) => self.split(&s, out),
            other => out.push(other),
        }
    }
}
