//! Parser façade: configuration in, block tree out.

use std::sync::Arc;

use crate::block::{
    AtxHeadingRule, Block, BlockRule, BlockquoteRule, DocumentParser, FencedCodeRule, HtmlBlockRule,
    IndentedCodeRule, LinkRefDefRule, ListItemRule, SetextHeadingRule, TableRule, ThematicBreakRule,
};
use crate::config::{BlockRuleKind, ConfigError, EmphasisSpec, ParserConfig, TransformerKind};
use crate::inline::{
    CodeLinkHtmlTransformer, DelimiterTransformer, Emphasis, EmphasisFactory, EmphasisTransformer,
    EscapeTransformer, InlineParser, InlineTransformer, LinkTransformer,
};

/// A configured Markdown parser.
///
/// Immutable once built: one parser can be shared across threads and
/// reused for any number of documents. Every call to
/// [`parse`](Self::parse) allocates its own parsing state.
///
/// # Example
/// ```
/// use markdown_tree::{Block, MarkdownParser};
///
/// let parser = MarkdownParser::standard();
/// let Block::Document(blocks) = parser.parse("# Title\n\nBody") else {
///     unreachable!();
/// };
/// assert_eq!(blocks.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MarkdownParser {
    rules: Vec<Arc<dyn BlockRule>>,
    transformers: Vec<Arc<dyn InlineTransformer>>,
    definition_lists: bool,
}

impl MarkdownParser {
    /// CommonMark parser.
    pub fn standard() -> Self {
        Self::assemble(&ParserConfig::standard(), ParserBuilder::new())
    }

    /// CommonMark parser with tables and definition lists.
    pub fn extended() -> Self {
        Self::assemble(&ParserConfig::extended(), ParserBuilder::new())
    }

    pub fn from_config(config: &ParserConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::assemble(config, ParserBuilder::new()))
    }

    pub fn builder() -> ParserBuilder {
        ParserBuilder::new()
    }

    fn assemble(config: &ParserConfig, extensions: ParserBuilder) -> Self {
        let ParserBuilder {
            rules: custom_rules,
            transformers: mut custom_transformers,
            factories,
            ..
        } = extensions;

        let mut rules: Vec<Arc<dyn BlockRule>> = config
            .blocks
            .iter()
            .map(|kind| block_rule(*kind, config))
            .collect();
        rules.extend(custom_rules);

        let emphasis: Vec<Emphasis> = config
            .emphasis
            .iter()
            .map(|spec| match factories.iter().find(|(ch, _)| *ch == spec.ch) {
                Some((_, factory)) => Emphasis::with_factory(spec.ch, spec.special, factory.clone()),
                None => Emphasis::new(spec.ch, spec.special),
            })
            .collect();

        let mut transformers: Vec<Arc<dyn InlineTransformer>> = Vec::with_capacity(config.inlines.len());
        for kind in &config.inlines {
            if *kind == TransformerKind::Escape {
                transformers.append(&mut custom_transformers);
            }
            transformers.push(transformer(*kind, &emphasis));
        }
        transformers.append(&mut custom_transformers);

        log::debug!(
            "parser built: blocks [{}], inlines [{}]",
            rules.iter().map(|r| r.name()).collect::<Vec<_>>().join(", "),
            transformers.iter().map(|t| t.name()).collect::<Vec<_>>().join(", ")
        );

        Self {
            rules,
            transformers,
            definition_lists: config.definition_lists,
        }
    }

    /// Parse `input` into a `Block::Document` with resolved inline content.
    pub fn parse(&self, input: &str) -> Block {
        let document = self.parse_blocks(input);
        let inline = InlineParser::new(&self.transformers, &document);
        log::debug!("inline parsing with {} link reference definitions", inline.link_refs().len());
        inline.parse(document)
    }

    /// The inline transformer chain, in order.
    pub(crate) fn transformers(&self) -> &[Arc<dyn InlineTransformer>] {
        &self.transformers
    }

    /// Run the block phase only. Inline text is left raw: one text fragment
    /// per source line, separated by line breaks.
    pub fn parse_blocks(&self, input: &str) -> Block {
        DocumentParser::new(input, &self.rules, self.definition_lists).parse()
    }
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::standard()
    }
}

fn block_rule(kind: BlockRuleKind, config: &ParserConfig) -> Arc<dyn BlockRule> {
    match kind {
        BlockRuleKind::AtxHeading => Arc::new(AtxHeadingRule),
        BlockRuleKind::SetextHeading => Arc::new(SetextHeadingRule),
        BlockRuleKind::ThematicBreak => Arc::new(ThematicBreakRule),
        BlockRuleKind::IndentedCode => Arc::new(IndentedCodeRule),
        BlockRuleKind::FencedCode => Arc::new(FencedCodeRule),
        BlockRuleKind::HtmlBlock => Arc::new(HtmlBlockRule),
        BlockRuleKind::LinkRefDef => Arc::new(LinkRefDefRule),
        BlockRuleKind::Blockquote => Arc::new(BlockquoteRule),
        BlockRuleKind::ListItem => Arc::new(ListItemRule::new(config.bullets.iter().copied())),
        BlockRuleKind::Table => Arc::new(TableRule),
    }
}

fn transformer(kind: TransformerKind, emphasis: &[Emphasis]) -> Arc<dyn InlineTransformer> {
    match kind {
        TransformerKind::Delimiter => Arc::new(DelimiterTransformer::new(emphasis.iter().map(|e| e.ch))),
        TransformerKind::CodeLinkHtml => Arc::new(CodeLinkHtmlTransformer),
        TransformerKind::Link => Arc::new(LinkTransformer),
        TransformerKind::Emphasis => Arc::new(EmphasisTransformer::new(emphasis.to_vec())),
        TransformerKind::Escape => Arc::new(EscapeTransformer),
    }
}

/// Builder for parsers with extensions that cannot be expressed in a
/// [`ParserConfig`].
///
/// ```
/// use std::sync::Arc;
/// use markdown_tree::{MarkdownParser, TextFragment};
///
/// let parser = MarkdownParser::builder()
///     .emphasis('~', true, Arc::new(|_, text| TextFragment::Code(text.raw_text())))
///     .build()
///     .unwrap();
/// # let _ = parser;
/// ```
#[derive(Default)]
pub struct ParserBuilder {
    config: ParserConfig,
    rules: Vec<Arc<dyn BlockRule>>,
    transformers: Vec<Arc<dyn InlineTransformer>>,
    factories: Vec<(char, EmphasisFactory)>,
}

impl ParserBuilder {
    /// Builder starting from the standard configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the configuration. Extensions added so far are kept.
    pub fn config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Append a block rule after the configured built-ins.
    pub fn block_rule(mut self, rule: Arc<dyn BlockRule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Add an inline transformer, run before escape resolution.
    pub fn transformer(mut self, transformer: Arc<dyn InlineTransformer>) -> Self {
        self.transformers.push(transformer);
        self
    }

    /// Recognize `ch` as an emphasis character whose matched pairs are built
    /// by `factory`. Replaces the factory of an already configured character.
    pub fn emphasis(mut self, ch: char, special: bool, factory: EmphasisFactory) -> Self {
        match self.config.emphasis.iter_mut().find(|spec| spec.ch == ch) {
            Some(spec) => spec.special = special,
            None => self.config.emphasis.push(EmphasisSpec::new(ch, special)),
        }
        self.factories.retain(|(c, _)| *c != ch);
        self.factories.push((ch, factory));
        self
    }

    pub fn build(self) -> Result<MarkdownParser, ConfigError> {
        self.config.validate()?;
        let config = self.config.clone();
        Ok(MarkdownParser::assemble(&config, self))
    }
}

impl std::fmt::Debug for ParserBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserBuilder")
            .field("config", &self.config)
            .field("rules", &self.rules)
            .field("transformers", &self.transformers)
            .field("factories", &self.factories.iter().map(|(ch, _)| ch).collect::<Vec<_>>())
            .finish()
    }
}
