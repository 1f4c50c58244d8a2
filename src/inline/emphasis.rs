//! Emphasis and strong emphasis resolution.
//!
//! Delimiter runs left by the earlier passes are linked into a stack in
//! text order. Each potential closer then looks back for the nearest
//! compatible opener of the same character, subject to the CommonMark
//! "rule of 3". Failed searches raise a per-class floor so no opener is
//! searched twice for the same kind of closer. Once all pairs are known
//! the fragments between them are wrapped, in one pass, by the factory
//! configured for that character.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::{InlineParser, InlineTransformer};
use crate::limits::MAX_INLINE_NESTING;
use crate::text::{DelimiterRunType, Text, TextFragment};

/// Builds the fragment for a matched pair. The flag is set for a double
/// delimiter (`**foo**`).
pub type EmphasisFactory = Arc<dyn Fn(bool, Text) -> TextFragment + Send + Sync>;

/// An emphasis character.
///
/// A `special` character may open and close even when it is both left
/// and right flanking. This is how `*` and `_` differ in CommonMark.
#[derive(Clone)]
pub struct Emphasis {
    pub ch: char,
    pub special: bool,
    factory: EmphasisFactory,
}

impl Emphasis {
    /// Emphasis producing `Strong` for double and `Emph` for single
    /// delimiters.
    pub fn new(ch: char, special: bool) -> Self {
        Self::with_factory(
            ch,
            special,
            Arc::new(|double, text| {
                if double {
                    TextFragment::Strong(text)
                } else {
                    TextFragment::Emph(text)
                }
            }),
        )
    }

    pub fn with_factory(ch: char, special: bool, factory: EmphasisFactory) -> Self {
        Self { ch, special, factory }
    }

    /// `*` (special) and `_`.
    pub fn defaults() -> Vec<Self> {
        vec![Self::new('*', true), Self::new('_', false)]
    }

    pub fn build(&self, double: bool, text: Text) -> TextFragment {
        (self.factory)(double, text)
    }
}

impl fmt::Debug for Emphasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emphasis")
            .field("ch", &self.ch)
            .field("special", &self.special)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct EmphasisTransformer {
    emphasis: Vec<Emphasis>,
}

impl EmphasisTransformer {
    pub fn new(emphasis: Vec<Emphasis>) -> Self {
        Self { emphasis }
    }

    fn position(&self, ch: char) -> Option<usize> {
        self.emphasis.iter().position(|e| e.ch == ch)
    }

    /// Pair closers with openers. Returns the matches in the order they
    /// were made; `stack` is left with the unused delimiter counts.
    fn process(&self, stack: &mut [StackEntry]) -> Vec<Match> {
        let mut matches = Vec::new();
        // Lowest stack entry still worth searching, per closer class. Every
        // opener below it already failed for a closer of the same class.
        let mut bottoms: FxHashMap<(char, bool, usize), usize> = FxHashMap::default();
        let mut current = (!stack.is_empty()).then_some(0);

        while let Some(c) = current {
            let closer = stack[c];
            if !closer.is_closer() {
                current = closer.next;
                continue;
            }
            let key = (closer.ch, closer.is_opener(), closer.length % 3);
            let bottom = bottoms.get(&key).copied().unwrap_or(0);

            let mut candidate = closer.prev;
            let mut found = None;
            while let Some(o) = candidate {
                if o < bottom {
                    break;
                }
                if stack[o].matches(&closer) {
                    found = Some(o);
                    break;
                }
                candidate = stack[o].prev;
            }

            let Some(o) = found else {
                bottoms.insert(key, c);
                current = closer.next;
                if !closer.is_opener() {
                    unlink(stack, c);
                }
                continue;
            };

            let delta = if stack[o].count > 1 && closer.count > 1 { 2 } else { 1 };
            stack[o].count -= delta;
            stack[c].count -= delta;
            matches.push(Match {
                opener: o,
                closer: c,
                delta,
            });

            // Delimiters between the pair can no longer match.
            stack[o].next = Some(c);
            stack[c].prev = Some(o);
            if stack[o].count == 0 {
                unlink(stack, o);
            }
            if stack[c].count == 0 {
                current = stack[c].next;
                unlink(stack, c);
            }
        }
        matches
    }

    /// Rebuild the fragment sequence with every match wrapped.
    ///
    /// Closing matches take the inner characters of a run first, opening
    /// matches the inner characters last, so each run is laid out as its
    /// closes, its unused rest, then its opens. Matches nested deeper than
    /// [`MAX_INLINE_NESTING`] keep their delimiters as text.
    fn build(
        &self,
        fragments: Vec<TextFragment>,
        stack: &[StackEntry],
        matches: &[Match],
        owner: &InlineParser<'_>,
    ) -> Text {
        let mut closing: Vec<SmallVec<[usize; 2]>> = vec![SmallVec::new(); stack.len()];
        let mut opening: Vec<SmallVec<[usize; 2]>> = vec![SmallVec::new(); stack.len()];
        for (id, m) in matches.iter().enumerate() {
            closing[m.closer].push(id);
            opening[m.opener].push(id);
        }

        let budget = MAX_INLINE_NESTING.saturating_sub(owner.depth());
        let mut wrapped = vec![false; matches.len()];
        let mut root = Text::new();
        let mut frames: Vec<Text> = Vec::new();
        let mut entries = stack.iter().enumerate().peekable();

        for (index, fragment) in fragments.into_iter().enumerate() {
            let Some((e, entry)) = entries.next_if(|(_, entry)| entry.index == index) else {
                let depth = frames.len();
                let out = frames.last_mut().unwrap_or(&mut root);
                owner.nested(depth, || self.transform_fragment(fragment, owner, out));
                continue;
            };

            for &id in &closing[e] {
                let delta = matches[id].delta;
                let piece = if wrapped[id] {
                    let inner = frames.pop().unwrap_or_default();
                    self.emphasis[entry.emphasis].build(delta > 1, inner)
                } else {
                    entry.fragment(delta)
                };
                frames.last_mut().unwrap_or(&mut root).push(piece);
            }
            if entry.count > 0 {
                frames.last_mut().unwrap_or(&mut root).push(entry.fragment(entry.count));
            }
            for &id in opening[e].iter().rev() {
                if frames.len() < budget {
                    wrapped[id] = true;
                    frames.push(Text::new());
                } else {
                    frames.last_mut().unwrap_or(&mut root).push(entry.fragment(matches[id].delta));
                }
            }
        }

        // Matches are properly nested, so every frame has been closed.
        debug_assert!(frames.is_empty());
        root
    }
}

impl Default for EmphasisTransformer {
    fn default() -> Self {
        Self::new(Emphasis::defaults())
    }
}

impl InlineTransformer for EmphasisTransformer {
    fn name(&self) -> &str {
        "emphasis"
    }

    fn transform(&self, text: Text, owner: &InlineParser<'_>) -> Text {
        let fragments = text.into_fragments();
        let mut stack = DelimiterStack::new();
        for (index, fragment) in fragments.iter().enumerate() {
            let &TextFragment::Delimiter { ch, count, run } = fragment else {
                continue;
            };
            let Some(emphasis) = self.position(ch) else {
                continue;
            };
            let position = stack.len();
            if let Some(last) = stack.last_mut() {
                last.next = Some(position);
            }
            stack.push(StackEntry {
                ch,
                special: self.emphasis[emphasis].special,
                emphasis,
                run,
                length: count,
                count,
                index,
                prev: position.checked_sub(1),
                next: None,
            });
        }
        let matches = self.process(&mut stack);
        self.build(fragments, &stack, &matches, owner)
    }
}

type DelimiterStack = SmallVec<[StackEntry; 8]>;

/// An emphasis delimiter run, linked to its neighbours still in play.
#[derive(Debug, Clone, Copy)]
struct StackEntry {
    ch: char,
    special: bool,
    /// Position of the character in the transformer's emphasis list.
    emphasis: usize,
    run: DelimiterRunType,
    /// Run length as written.
    length: usize,
    /// Characters not yet used by a match.
    count: usize,
    /// Position of the delimiter fragment in the input.
    index: usize,
    prev: Option<usize>,
    next: Option<usize>,
}

impl StackEntry {
    fn is_opener(&self) -> bool {
        self.run.contains(DelimiterRunType::LEFT_FLANKING)
            && (self.special
                || !self.run.contains(DelimiterRunType::RIGHT_FLANKING)
                || self.run.contains(DelimiterRunType::LEFT_PUNCTUATION))
    }

    fn is_closer(&self) -> bool {
        self.run.contains(DelimiterRunType::RIGHT_FLANKING)
            && (self.special
                || !self.run.contains(DelimiterRunType::LEFT_FLANKING)
                || self.run.contains(DelimiterRunType::RIGHT_PUNCTUATION))
    }

    /// Whether this opener pairs with `closer` under the rule of 3.
    fn matches(&self, closer: &StackEntry) -> bool {
        self.ch == closer.ch
            && self.is_opener()
            && ((!closer.is_opener() && !self.is_closer())
                || (closer.length % 3 == 0 && self.length % 3 == 0)
                || (self.length + closer.length) % 3 != 0)
    }

    fn fragment(&self, count: usize) -> TextFragment {
        TextFragment::delimiter(self.ch, count, self.run)
    }
}

/// A matched pair, by stack position.
#[derive(Debug, Clone, Copy)]
struct Match {
    opener: usize,
    closer: usize,
    delta: usize,
}

fn unlink(stack: &mut [StackEntry], e: usize) {
    let StackEntry { prev, next, .. } = stack[e];
    if let Some(p) = prev {
        stack[p].next = next;
    }
    if let Some(n) = next {
        stack[n].prev = prev;
    }
}
