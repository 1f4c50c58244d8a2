//! Backslash escape resolution.
//!
//! The last pass of the standard chain. Delimiter runs that nothing
//! claimed are turned back into literal text, adjacent text is merged,
//! and a backslash before ASCII punctuation is removed. Link and image
//! titles and destinations are resolved the same way.

use std::borrow::Cow;

use memchr::memchr;

use super::{InlineParser, InlineTransformer, transform_nested};
use crate::text::{Text, TextFragment};

#[derive(Debug, Default, Clone, Copy)]
pub struct EscapeTransformer;

impl InlineTransformer for EscapeTransformer {
    fn name(&self) -> &str {
        "escape"
    }

    fn transform(&self, text: Text, owner: &InlineParser<'_>) -> Text {
        let mut out = Text::new();
        let mut literal: Option<String> = None;
        for fragment in text {
            match fragment {
                TextFragment::Text(s) => literal.get_or_insert_with(String::new).push_str(&s),
                TextFragment::Delimiter { .. } => {
                    literal.get_or_insert_with(String::new).push_str(&fragment.raw_text());
                }
                other => {
                    if let Some(s) = literal.take() {
                        out.push(TextFragment::Text(resolve_escapes(&s).into_owned()));
                    }
                    self.transform_fragment(other, owner, &mut out);
                }
            }
        }
        if let Some(s) = literal {
            out.push(TextFragment::Text(resolve_escapes(&s).into_owned()));
        }
        out
    }

    fn transform_fragment(&self, fragment: TextFragment, owner: &InlineParser<'_>, out: &mut Text) {
        let fragment = match fragment {
            TextFragment::Link { text, uri, title } => TextFragment::Link {
                text: owner.nested(1, || self.transform(text, owner)),
                uri: uri.map(resolve_owned),
                title: title.map(resolve_owned),
            },
            TextFragment::Image { text, uri, title } => TextFragment::Image {
                text: owner.nested(1, || self.transform(text, owner)),
                uri: uri.map(resolve_owned),
                title: title.map(resolve_owned),
            },
            other => transform_nested(self, other, owner),
        };
        out.push(fragment);
    }
}

fn resolve_owned(s: String) -> String {
    match resolve_escapes(&s) {
        Cow::Borrowed(_) => s,
        Cow::Owned(resolved) => resolved,
    }
}

/// Remove backslashes that escape ASCII punctuation.
pub fn resolve_escapes(s: &str) -> Cow<'_, str> {
    let bytes = s.as_bytes();
    let Some(first) = memchr(b'\\', bytes) else {
        return Cow::Borrowed(s);
    };

    let mut out = String::with_capacity(s.len());
    let mut copied = 0;
    let mut pos = first;
    while pos < bytes.len() {
        if bytes[pos] == b'\\' && bytes.get(pos + 1).is_some_and(u8::is_ascii_punctuation) {
            out.push_str(&s[copied..pos]);
            copied = pos + 1;
            pos += 2;
            continue;
        }
        match memchr(b'\\', &bytes[pos + 1..]) {
            Some(next) => pos += 1 + next,
            None => break,
        }
    }
    out.push_str(&s[copied..]);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::DelimiterRunType;

    #[test]
    fn test_resolve_escapes() {
        assert_eq!(resolve_escapes("plain"), "plain");
        assert!(matches!(resolve_escapes("plain"), Cow::Borrowed(_)));
        assert_eq!(resolve_escapes("\\*a\\*"), "*a*");
        assert_eq!(resolve_escapes("\\\\x"), "\\x");
        assert_eq!(resolve_escapes("\\a\\"), "\\a\\");
        assert_eq!(resolve_escapes("C:\\\\path\\`"), "C:\\path`");
    }

    #[test]
    fn test_delimiters_fold_into_text() {
        let transformers: Vec<std::sync::Arc<dyn InlineTransformer>> = vec![std::sync::Arc::new(EscapeTransformer)];
        let doc = crate::block::Block::Document(vec![]);
        let parser = InlineParser::new(&transformers, &doc);
        let text = Text::from(vec![
            TextFragment::text("\\"),
            TextFragment::delimiter('`', 1, DelimiterRunType::ESCAPED),
            TextFragment::text("a"),
            TextFragment::delimiter('[', 1, DelimiterRunType::IMAGE),
            TextFragment::SoftBreak,
            TextFragment::delimiter('*', 2, DelimiterRunType::LEFT_FLANKING),
        ]);
        assert_eq!(
            parser.transform(text).fragments(),
            &[
                TextFragment::text("`a!["),
                TextFragment::SoftBreak,
                TextFragment::text("**"),
            ]
        );
    }

    #[test]
    fn test_link_title_and_destination() {
        let transformers: Vec<std::sync::Arc<dyn InlineTransformer>> = vec![std::sync::Arc::new(EscapeTransformer)];
        let doc = crate::block::Block::Document(vec![]);
        let parser = InlineParser::new(&transformers, &doc);
        let text = Text::from_fragment(TextFragment::link(
            Text::plain("\\[x\\]"),
            Some("/a\\*b"),
            Some("say \\\"hi\\\""),
        ));
        assert_eq!(
            parser.transform(text).fragments(),
            &[TextFragment::link(Text::plain("[x]"), Some("/a*b"), Some("say \"hi\""))]
        );
    }
}
