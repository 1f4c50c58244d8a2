//! DoS prevention constants.
//!
//! These limits keep pathological inputs from causing
//! quadratic or worse time complexity, or unbounded recursion.

/// Maximum nesting depth for block containers (lists, blockquotes).
/// Markers beyond this depth are treated as paragraph text.
pub const MAX_BLOCK_NESTING: usize = 32;

/// Maximum nesting depth for inline elements (emphasis, links, images).
/// Deeper delimiters stay literal text.
pub const MAX_INLINE_NESTING: usize = 32;

/// Maximum bracket depth in link parsing `[[[...]]]`.
/// Past this depth the outermost open bracket becomes literal text.
pub const MAX_BRACKET_DEPTH: usize = 32;

/// Maximum parentheses nesting in bare link destinations (CommonMark: 32)
pub const MAX_LINK_PAREN_DEPTH: usize = 32;

/// Maximum backtick run length for code spans.
/// Longer runs are literal text.
pub const MAX_CODE_SPAN_BACKTICKS: usize = 32;

/// Maximum digits in an ordered list marker (prevents big-integer parsing)
pub const MAX_LIST_MARKER_DIGITS: usize = 9;

/// Maximum length of a link label, in characters.
pub const MAX_LINK_LABEL_LEN: usize = 999;

/// Maximum table columns. Cells beyond this are dropped.
pub const MAX_TABLE_COLUMNS: usize = 128;

/// Maximum ATX heading level.
pub const MAX_HEADING_LEVEL: usize = 6;
