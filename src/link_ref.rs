//! Link reference definitions collected from a document.

use rustc_hash::FxHashMap;

use crate::block::Block;

/// Destination and optional title of a link reference definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRefDef {
    pub destination: String,
    pub title: Option<String>,
}

/// Store of link reference definitions, keyed by normalized label.
#[derive(Debug, Default, Clone)]
pub struct LinkRefStore {
    defs: Vec<LinkRefDef>,
    by_label: FxHashMap<String, usize>,
}

impl LinkRefStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every `ReferenceDef` in document order. Definitions inside
    /// containers count; the first definition of a label wins.
    pub fn collect(document: &Block) -> Self {
        let mut store = Self::new();
        store.collect_block(document);
        log::debug!("collected {} link reference definitions", store.len());
        store
    }

    fn collect_block(&mut self, block: &Block) {
        match block {
            Block::ReferenceDef {
                label,
                destination,
                title,
            } => {
                let title = title.join("\n");
                self.insert(
                    normalize_label(label),
                    LinkRefDef {
                        destination: destination.clone(),
                        title: (!title.is_empty()).then_some(title),
                    },
                );
            }
            Block::DefinitionList(defs) => {
                for def in defs {
                    self.collect_blocks(&def.descriptions);
                }
            }
            _ => {
                if let Some(children) = block.children() {
                    self.collect_blocks(children);
                }
            }
        }
    }

    fn collect_blocks(&mut self, blocks: &[Block]) {
        for block in blocks {
            self.collect_block(block);
        }
    }

    /// Add a definition if the label is new. First definition wins.
    pub fn insert(&mut self, label: String, def: LinkRefDef) {
        if self.by_label.contains_key(&label) {
            log::trace!("duplicate link reference [{label}] ignored");
            return;
        }
        let idx = self.defs.len();
        self.defs.push(def);
        self.by_label.insert(label, idx);
    }

    /// Look up a label, normalizing it first.
    pub fn get(&self, label: &str) -> Option<&LinkRefDef> {
        let def = self
            .by_label
            .get(&normalize_label(label))
            .and_then(|&idx| self.defs.get(idx));
        if def.is_none() {
            log::trace!("no link reference for [{label}]");
        }
        def
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

/// Normalize a link label: decode entities, process backslash escapes of
/// brackets, collapse internal whitespace to single spaces, trim, and
/// case-fold.
pub fn normalize_label(label: &str) -> String {
    let decoded = html_escape::decode_html_entities(label);
    let mut out = String::with_capacity(decoded.len());
    let mut last_was_space = true;
    let mut chars = decoded.chars().peekable();

    while let Some(mut ch) = chars.next() {
        if ch == '\\' && chars.peek().is_some_and(|&next| matches!(next, '[' | ']' | '\\')) {
            if let Some(next) = chars.next() {
                ch = next;
            }
        }
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
            continue;
        }

        last_was_space = false;
        if ch == 'ß' || ch == 'ẞ' {
            out.push_str("ss");
        } else {
            out.extend(ch.to_lowercase());
        }
    }

    if out.ends_with(' ') {
        out.pop();
    }
    out
}
