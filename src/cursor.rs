//! Index-based cursor for byte scanning within a line.
//!
//! The cursor is a plain `usize` into an immutable slice, so saving and
//! restoring a position is a copy.

/// A cursor over `bytes[pos..end]`.
///
/// # Example
/// ```
/// use markdown_tree::cursor::Cursor;
///
/// let line = b"> quote";
/// let mut cursor = Cursor::new(line);
///
/// assert!(cursor.eat(b'>'));
/// assert_eq!(cursor.peek(), Some(b' '));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> Cursor<'a> {
    /// Create a cursor over the whole slice.
    #[inline]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            end: bytes.len(),
        }
    }

    /// Create a cursor over `bytes[start..end]`.
    #[inline]
    pub fn with_bounds(bytes: &'a [u8], start: usize, end: usize) -> Self {
        debug_assert!(start <= end && end <= bytes.len());
        Self {
            bytes,
            pos: start,
            end,
        }
    }

    /// Current absolute offset.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.end
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        if self.pos < self.end {
            Some(self.bytes[self.pos])
        } else {
            None
        }
    }

    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.end);
    }

    /// Consume `b` if it is the next byte.
    #[inline]
    pub fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }
}
