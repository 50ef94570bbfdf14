/// Byte cursor over the document being parsed.
///
/// Every recursion frame shares the same cursor, so a nested tag's frame leaves it exactly where
/// its parent has to resume.
pub(crate) struct Cursor<'a> {
    input: &'a str,
    loc: usize,
    /// Tags rendered so far.
    substitutions: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self {
            input,
            loc: 0,
            substitutions: 0,
        }
    }

    pub(crate) fn note_substitution(&mut self) {
        self.substitutions += 1;
    }

    pub(crate) fn substitutions(&self) -> usize {
        self.substitutions
    }

    /// Returns all input text left to parse.
    pub(crate) fn remaining(&self) -> &'a str {
        &self.input[self.loc..]
    }

    pub(crate) fn is_done(&self) -> bool {
        self.loc >= self.input.len()
    }

    pub(crate) fn position(&self) -> usize {
        self.loc
    }

    /// Rewind (or fast-forward) to a position previously returned by [Self::position].
    pub(crate) fn set_position(&mut self, loc: usize) {
        debug_assert!(self.input.is_char_boundary(loc));
        self.loc = loc;
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// The character after the next one.
    pub(crate) fn peek_second(&self) -> Option<char> {
        self.remaining().chars().nth(1)
    }

    pub(crate) fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.loc += ch.len_utf8();
        Some(ch)
    }

    /// Consume `ch` if it is next.
    pub(crate) fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.loc += ch.len_utf8();
            true
        } else {
            false
        }
    }

    /// Consume everything up to (not including) the next `stop`, or to the end of input.
    pub(crate) fn take_until(&mut self, stop: char) -> &'a str {
        let rem = self.remaining();
        let len = rem.find(stop).unwrap_or(rem.len());
        self.loc += len;
        &rem[..len]
    }

    /// Consume the longest run of characters matching `pred`.
    pub(crate) fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let rem = self.remaining();
        let len = rem.find(|c: char| !pred(c)).unwrap_or(rem.len());
        self.loc += len;
        &rem[..len]
    }

    /// Raw input text from `start` up to the current position.
    pub(crate) fn since(&self, start: usize) -> &'a str {
        &self.input[start..self.loc]
    }
}
