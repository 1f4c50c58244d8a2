//! Parser configuration.
//!
//! A [`ParserConfig`] lists which built-in block rules and inline
//! transformers run, in which order, plus the list bullets and emphasis
//! characters they recognize. It is validated when a
//! [`MarkdownParser`](crate::MarkdownParser) is built from it.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Built-in block rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum BlockRuleKind {
    AtxHeading,
    SetextHeading,
    ThematicBreak,
    IndentedCode,
    FencedCode,
    HtmlBlock,
    LinkRefDef,
    Blockquote,
    ListItem,
    Table,
}

impl BlockRuleKind {
    /// Standard CommonMark rule order.
    pub const STANDARD: [BlockRuleKind; 9] = [
        Self::AtxHeading,
        Self::SetextHeading,
        Self::ThematicBreak,
        Self::IndentedCode,
        Self::FencedCode,
        Self::HtmlBlock,
        Self::LinkRefDef,
        Self::Blockquote,
        Self::ListItem,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::AtxHeading => "atx-heading",
            Self::SetextHeading => "setext-heading",
            Self::ThematicBreak => "thematic-break",
            Self::IndentedCode => "indented-code",
            Self::FencedCode => "fenced-code",
            Self::HtmlBlock => "html-block",
            Self::LinkRefDef => "link-ref-def",
            Self::Blockquote => "blockquote",
            Self::ListItem => "list-item",
            Self::Table => "table",
        }
    }
}

impl fmt::Display for BlockRuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Built-in inline transformers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum TransformerKind {
    Delimiter,
    CodeLinkHtml,
    Link,
    Emphasis,
    Escape,
}

impl TransformerKind {
    pub const STANDARD: [TransformerKind; 5] = [
        Self::Delimiter,
        Self::CodeLinkHtml,
        Self::Link,
        Self::Emphasis,
        Self::Escape,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Delimiter => "delimiter",
            Self::CodeLinkHtml => "code-link-html",
            Self::Link => "link",
            Self::Emphasis => "emphasis",
            Self::Escape => "escape",
        }
    }
}

impl fmt::Display for TransformerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An emphasis character and whether it is special (`*`-like).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub struct EmphasisSpec {
    pub ch: char,
    pub special: bool,
}

impl EmphasisSpec {
    pub const fn new(ch: char, special: bool) -> Self {
        Self { ch, special }
    }
}

/// Configuration errors, reported when a parser is built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("block rule `{0}` is listed more than once")]
    DuplicateBlockRule(BlockRuleKind),
    #[error("inline transformer `{0}` is listed more than once")]
    DuplicateTransformer(TransformerKind),
    #[error("emphasis character {0:?} is configured more than once")]
    DuplicateEmphasis(char),
    #[error("{0:?} cannot be an emphasis character")]
    ReservedEmphasis(char),
    #[error("{0:?} cannot be a list bullet")]
    InvalidBullet(char),
    #[error("the list item rule needs at least one bullet character")]
    EmptyBullets,
}

/// Characters the delimiter tokenizer claims for other constructs.
const RESERVED_EMPHASIS: &[char] = &['`', '<', '>', '[', ']', '(', ')', '"', '\'', '!', '\\'];

/// Punctuation that starts other block constructs.
const RESERVED_BULLETS: &[char] = &['#', '>', '\\', '`', '<', '['];

/// Which built-ins run and what they recognize.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case", default))]
pub struct ParserConfig {
    /// Block rules, tried in order on every line.
    pub blocks: Vec<BlockRuleKind>,
    /// Inline transformers, applied in order.
    pub inlines: Vec<TransformerKind>,
    /// Bullet characters of the list item rule.
    pub bullets: Vec<char>,
    pub emphasis: Vec<EmphasisSpec>,
    /// Turn `Paragraph` + `:` list pairs into definition lists.
    pub definition_lists: bool,
}

impl ParserConfig {
    /// CommonMark grammar.
    pub fn standard() -> Self {
        Self {
            blocks: BlockRuleKind::STANDARD.to_vec(),
            inlines: TransformerKind::STANDARD.to_vec(),
            bullets: vec!['-', '+', '*'],
            emphasis: vec![EmphasisSpec::new('*', true), EmphasisSpec::new('_', false)],
            definition_lists: false,
        }
    }

    /// CommonMark plus tables and definition lists.
    pub fn extended() -> Self {
        let mut config = Self::standard();
        let list = config
            .blocks
            .iter()
            .position(|&kind| kind == BlockRuleKind::ListItem)
            .map_or(config.blocks.len(), |idx| idx + 1);
        config.blocks.insert(list, BlockRuleKind::Table);
        config.bullets.push(':');
        config.definition_lists = true;
        config
    }

    /// Check the configuration for duplicates and unusable characters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, kind) in self.blocks.iter().enumerate() {
            if self.blocks[..i].contains(kind) {
                return Err(ConfigError::DuplicateBlockRule(*kind));
            }
        }
        for (i, kind) in self.inlines.iter().enumerate() {
            if self.inlines[..i].contains(kind) {
                return Err(ConfigError::DuplicateTransformer(*kind));
            }
        }
        for (i, spec) in self.emphasis.iter().enumerate() {
            if self.emphasis[..i].iter().any(|other| other.ch == spec.ch) {
                return Err(ConfigError::DuplicateEmphasis(spec.ch));
            }
            if RESERVED_EMPHASIS.contains(&spec.ch) || spec.ch.is_whitespace() || spec.ch.is_alphanumeric() {
                return Err(ConfigError::ReservedEmphasis(spec.ch));
            }
        }
        if let Some(&bullet) = self
            .bullets
            .iter()
            .find(|&&ch| !ch.is_ascii_punctuation() || RESERVED_BULLETS.contains(&ch))
        {
            return Err(ConfigError::InvalidBullet(bullet));
        }
        if self.bullets.is_empty() && self.blocks.contains(&BlockRuleKind::ListItem) {
            return Err(ConfigError::EmptyBullets);
        }
        Ok(())
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::standard()
    }
}
