//! Parse-time container arena.
//!
//! Open containers form a chain from the document root to the innermost
//! container. Each container records its parent by index; closing a
//! container turns it into a [`Block`] and appends it to the parent.

use super::node::{Block, ListType};

/// Index of a container in the arena.
pub type ContainerId = usize;

/// The document root.
pub const ROOT: ContainerId = 0;

/// Kind of an open container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Document,
    Blockquote,
    ListItem {
        kind: ListType,
        tight: bool,
        /// Columns of indentation required to continue the item.
        indent: usize,
    },
}

impl ContainerKind {
    /// Containers that close on a blank line unless the line re-supplies
    /// their marker.
    pub fn indent_required(&self) -> bool {
        matches!(self, Self::Blockquote)
    }

    /// Consume this container's continuation prefix from `line[start..]`.
    ///
    /// Returns the offset past the prefix, or `None` if the line does not
    /// continue the container.
    pub fn skip_indent(&self, line: &[u8], start: usize) -> Option<usize> {
        match self {
            Self::Document => Some(start),
            Self::Blockquote => {
                let mut i = start;
                while i < line.len() && line[i] == b' ' {
                    i += 1;
                }
                if i - start >= 4 || line.get(i) != Some(&b'>') {
                    return None;
                }
                i += 1;
                if line.get(i) == Some(&b' ') {
                    i += 1;
                }
                Some(i)
            }
            Self::ListItem { indent: required, .. } => {
                let mut i = start;
                let mut indent = 0;
                while i < line.len() && indent < *required {
                    match line[i] {
                        b' ' => indent += 1,
                        b'\t' => indent += 4,
                        _ => break,
                    }
                    i += 1;
                }
                (indent >= *required).then_some(i)
            }
        }
    }
}

#[derive(Debug)]
struct Container {
    kind: ContainerKind,
    parent: Option<ContainerId>,
    content: Vec<Block>,
}

/// Stack-shaped arena of open containers.
#[derive(Debug)]
pub struct ContainerStack {
    containers: Vec<Container>,
}

impl ContainerStack {
    pub fn new() -> Self {
        Self {
            containers: vec![Container {
                kind: ContainerKind::Document,
                parent: None,
                content: Vec::new(),
            }],
        }
    }

    /// The innermost open container.
    #[inline]
    pub fn innermost(&self) -> ContainerId {
        self.containers.len() - 1
    }

    /// Number of open containers, root included.
    #[inline]
    pub fn depth(&self) -> usize {
        self.containers.len()
    }

    #[inline]
    pub fn parent(&self, id: ContainerId) -> Option<ContainerId> {
        self.containers[id].parent
    }

    /// Open a container nested in the innermost one.
    pub fn push(&mut self, kind: ContainerKind) -> ContainerId {
        let parent = self.innermost();
        log::trace!("open container {kind:?} under #{parent}");
        self.containers.push(Container {
            kind,
            parent: Some(parent),
            content: Vec::new(),
        });
        self.innermost()
    }

    /// Append a block to the innermost container.
    #[inline]
    pub fn append(&mut self, block: Block) {
        let id = self.innermost();
        self.containers[id].content.push(block);
    }

    /// Match the open containers against a line, outermost first.
    ///
    /// Returns the offset past all matched prefixes and the deepest
    /// container the line continues.
    pub fn parse_indent(&self, line: &[u8], start: usize) -> (usize, ContainerId) {
        let mut pos = start;
        let mut matched = ROOT;
        for id in 1..self.containers.len() {
            match self.containers[id].kind.skip_indent(line, pos) {
                Some(next) => {
                    pos = next;
                    matched = id;
                }
                None => break,
            }
        }
        (pos, matched)
    }

    /// The outermost container between the innermost one and `upto`
    /// (exclusive) whose parent must be returned to on a blank line.
    pub fn outermost_indent_required(&self, upto: ContainerId) -> Option<ContainerId> {
        let mut result = None;
        let mut id = self.innermost();
        while id != upto {
            let Some(parent) = self.parent(id) else {
                break;
            };
            if self.containers[id].kind.indent_required() {
                result = Some(parent);
            }
            id = parent;
        }
        result
    }

    /// Close containers until `target` is the innermost.
    pub fn close_to(&mut self, target: ContainerId, bundle: &mut impl FnMut(Vec<Block>) -> Vec<Block>) {
        while self.innermost() > target {
            let Some(container) = self.containers.pop() else {
                break;
            };
            log::trace!("close container {:?}", container.kind);
            let block = make_block(container.kind, bundle(container.content));
            if let Some(parent) = container.parent {
                self.containers[parent].content.push(block);
            }
        }
    }

    /// Close every container and return the document block.
    pub fn finish(mut self, bundle: &mut impl FnMut(Vec<Block>) -> Vec<Block>) -> Block {
        self.close_to(ROOT, bundle);
        let root = self.containers.pop().map(|c| c.content).unwrap_or_default();
        Block::Document(bundle(root))
    }
}

impl Default for ContainerStack {
    fn default() -> Self {
        Self::new()
    }
}

fn make_block(kind: ContainerKind, content: Vec<Block>) -> Block {
    match kind {
        ContainerKind::Document => Block::Document(content),
        ContainerKind::Blockquote => Block::Blockquote(content),
        ContainerKind::ListItem { kind, tight, .. } => Block::ListItem { kind, tight, content },
    }
}
