//! Attribute list of a start tag, `[tag name=value other="quoted value" bare]`.
use std::collections::HashMap;
use std::mem;

use super::cursor::Cursor;
use super::{is_name_char, CLOSE, EQUAL, SLASH};

/// Attribute name (as written) to value. Valueless attributes map to an empty string.
pub type Attributes = HashMap<String, String>;

const QUOTES: &[char] = &['"', '\''];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrState {
    /// Collecting a bare name, possibly still empty.
    NoName,
    /// Saw `name=`.
    AwaitingValue,
    ReadingUnquotedValue,
    ReadingQuotedValue(char),
}

/// How an attribute list ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AttrsEnd {
    /// `]`, the tag has content.
    Open,
    /// `/]`.
    SelfClosing,
    /// Input ran out first.
    Unterminated,
}

enum Step {
    Continue,
    End(AttrsEnd),
}

pub(crate) struct AttrParser {
    state: AttrState,
    name: String,
    value: String,
    attrs: Attributes,
}

impl AttrParser {
    pub(crate) fn new() -> Self {
        Self {
            state: AttrState::NoName,
            name: String::new(),
            value: String::new(),
            attrs: Attributes::new(),
        }
    }

    /// Starts right after `[tag=`, so the value that follows is keyed by the tag name itself.
    pub(crate) fn with_default_key(key: &str) -> Self {
        Self {
            state: AttrState::AwaitingValue,
            name: key.to_owned(),
            ..Self::new()
        }
    }

    /// Drive the machine until the tag head ends. The cursor is left after the closing `]`, or at
    /// the end of input.
    pub(crate) fn run(mut self, cursor: &mut Cursor<'_>) -> (Attributes, AttrsEnd) {
        while let Some(ch) = cursor.bump() {
            if let Step::End(end) = self.step(ch, cursor) {
                return (self.attrs, end);
            }
        }

        (self.attrs, AttrsEnd::Unterminated)
    }

    fn step(&mut self, ch: char, cursor: &mut Cursor<'_>) -> Step {
        match self.state {
            AttrState::ReadingQuotedValue(quote) => {
                if ch == quote {
                    self.finish();
                } else {
                    self.value.push(ch);
                }
                return Step::Continue;
            }
            AttrState::NoName if is_name_char(ch) => {
                self.name.push(ch);
                return Step::Continue;
            }
            AttrState::AwaitingValue | AttrState::ReadingUnquotedValue if is_name_char(ch) => {
                self.value.push(ch);
                self.state = AttrState::ReadingUnquotedValue;
                return Step::Continue;
            }
            AttrState::NoName if ch == EQUAL && !self.name.is_empty() => {
                self.state = AttrState::AwaitingValue;
                return Step::Continue;
            }
            AttrState::AwaitingValue if QUOTES.contains(&ch) => {
                self.state = AttrState::ReadingQuotedValue(ch);
                return Step::Continue;
            }
            _ => {}
        }

        // Anything else ends the pending token and is then looked at on its own.
        self.finish();

        match ch {
            CLOSE => Step::End(AttrsEnd::Open),
            SLASH if cursor.eat(CLOSE) => Step::End(AttrsEnd::SelfClosing),
            _ => Step::Continue,
        }
    }

    /// Commit the pending name/value pair, if any. Later duplicates overwrite earlier ones.
    fn finish(&mut self) {
        self.state = AttrState::NoName;
        if self.name.is_empty() {
            self.value.clear();
            return;
        }

        let name = mem::take(&mut self.name);
        let value = mem::take(&mut self.value);
        self.attrs.insert(name, value);
    }
}
