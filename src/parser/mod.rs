use std::convert::Infallible;

use bitflags::bitflags;
use static_assertions::assert_impl_all;
use tracing::{debug, trace};

use self::attrs::{AttrParser, AttrsEnd};
use self::cursor::Cursor;

mod attrs;
mod cursor;
mod registry;

pub use attrs::Attributes;
pub use registry::TagRegistry;

const OPEN: char = '[';
const CLOSE: char = ']';
const SLASH: char = '/';
const EQUAL: char = '=';

/// Characters allowed in tag names, attribute names and unquoted attribute values.
pub(crate) fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

bitflags! {
    /// Optional parser behaviors.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct ParserFeature: u32 {
        /// An end tag for a known tag that isn't open anywhere closes the innermost open tag
        /// instead of being kept as text.
        const LENIENT_CLOSE = 1 << 0;

        /// Tags still open at the end of the document are rendered as if they were closed there,
        /// rather than written back out as text.
        ///
        /// Without it, an open tag is written back exactly as it appears in the input, unless
        /// something nested inside it was already rendered. Then its start tag is followed by the
        /// parsed content, where `[[` has already become `[`.
        const CLOSE_AT_EOF = 1 << 1;

        /// All current and future feature flags.
        const ALL = u32::MAX;
    }
}

impl Default for ParserFeature {
    fn default() -> Self {
        ParserFeature::LENIENT_CLOSE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    pub feature_flags: ParserFeature,
    /// Maximum number of simultaneously open tags. Self-closing tags don't count.
    pub max_depth: usize,
}

impl ParserConfig {
    pub const DEFAULT_MAX_DEPTH: usize = 128;
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            feature_flags: ParserFeature::default(),
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Why [BBParser::parse] gave up. Malformed markup is never one of these.
#[derive(Debug, thiserror::Error)]
pub enum ParseError<E> {
    /// Tags were nested deeper than [ParserConfig::max_depth].
    #[error("tags nested deeper than the limit of {limit}")]
    DepthExceeded { limit: usize },

    /// The renderer failed. Its error is passed through as is.
    #[error(transparent)]
    Render(E),
}

/// Produces the replacement text for one resolved tag.
///
/// Implemented for any `Fn(&str, &str, &Attributes) -> Result<String, E>`. The tag name is the
/// registry's lower-case spelling and `content` already has every nested tag substituted.
/// Escaping for the output format, if any, is up to the renderer.
pub trait Renderer {
    type Error;

    fn render(&self, tag: &str, content: &str, attrs: &Attributes) -> Result<String, Self::Error>;
}

impl<F, E> Renderer for F
where
    F: Fn(&str, &str, &Attributes) -> Result<String, E>,
{
    type Error = E;

    fn render(&self, tag: &str, content: &str, attrs: &Attributes) -> Result<String, E> {
        self(tag, content, attrs)
    }
}

/// Start tag that named a registered tag.
struct OpenTag<'a> {
    /// Offset of the opening `[`.
    start: usize,
    /// The tag head exactly as written, `[` through `]`.
    raw: &'a str,
    name: String,
    attrs: Attributes,
    self_closing: bool,
}

enum HeadScan<T> {
    Tag(T),
    /// Not a tag we handle. The cursor sits on the character that gave it away.
    Literal,
    /// Input ended inside the head. The cursor is at the end.
    Unterminated,
}

/// How a run of content ended.
enum ContentEnd {
    Eof,
    /// The owning tag's end tag was consumed.
    Closed,
    /// An ancestor's end tag is next, unconsumed.
    Yielded,
}

/// Substitutes registered tags in a document using a [Renderer].
///
/// Configuration is only changed through `&mut self`, so a parser shared between threads is
/// effectively immutable and [BBParser::parse] can run on all of them at once.
#[doc(alias = "parser")]
#[derive(Debug, Clone)]
pub struct BBParser<R> {
    tags: TagRegistry,
    renderer: R,
    config: ParserConfig,
}

impl<R> BBParser<R>
where
    R: Renderer,
{
    pub fn new<I, S>(tags: I, renderer: R) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_config(tags, renderer, ParserConfig::default())
    }

    pub fn with_config<I, S>(tags: I, renderer: R, config: ParserConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tags: TagRegistry::new(tags),
            renderer,
            config,
        }
    }

    pub fn tags(&self) -> &TagRegistry {
        &self.tags
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn set_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = TagRegistry::new(tags);
    }

    pub fn set_renderer(&mut self, renderer: R) {
        self.renderer = renderer;
    }

    pub fn set_config(&mut self, config: ParserConfig) {
        self.config = config;
    }

    /// Parse `input`, replacing every registered tag with its rendered form.
    ///
    /// Unknown tags, stray end tags and anything else that doesn't parse as a registered tag is
    /// kept as written. `[[` is written out as a single `[`.
    ///
    /// # Errors
    /// Only when the renderer fails, or when tags nest deeper than [ParserConfig::max_depth].
    #[tracing::instrument(level = "trace", skip_all, fields(len = input.len()))]
    pub fn parse(&self, input: &str) -> Result<String, ParseError<R::Error>> {
        let mut cursor = Cursor::new(input);
        let mut out = String::with_capacity(input.len());
        let mut ancestors = vec![];

        self.parse_content(&mut cursor, &mut out, None, &mut ancestors)?;

        Ok(out)
    }

    /// Scan text into `out` until the input ends or, when `owner` is set, until an end tag
    /// settles the owner's fate. Nested registered tags are parsed recursively and their rendered
    /// output lands in `out` in their place.
    fn parse_content(
        &self,
        cursor: &mut Cursor<'_>,
        out: &mut String,
        owner: Option<&str>,
        ancestors: &mut Vec<String>,
    ) -> Result<ContentEnd, ParseError<R::Error>> {
        loop {
            if cursor.is_done() {
                return Ok(ContentEnd::Eof);
            }

            out.push_str(cursor.take_until(OPEN));
            let start = cursor.position();
            if !cursor.eat(OPEN) {
                continue;
            }

            if cursor.eat(OPEN) {
                out.push(OPEN);
                continue;
            }

            if let Some(owner) = owner {
                if cursor.peek() == Some(SLASH) {
                    cursor.bump();
                    match self.scan_close(cursor) {
                        HeadScan::Tag(name) => {
                            if name == owner {
                                return Ok(ContentEnd::Closed);
                            }

                            if ancestors.iter().any(|x| *x == name) {
                                trace!(tag = %name, open = owner, "leaving end tag to an ancestor");
                                cursor.set_position(start);
                                return Ok(ContentEnd::Yielded);
                            }

                            if self.config.feature_flags.contains(ParserFeature::LENIENT_CLOSE) {
                                debug!(
                                    tag = %name,
                                    open = owner,
                                    "mismatched end tag closes innermost tag"
                                );
                                return Ok(ContentEnd::Closed);
                            }

                            trace!(tag = %name, "stray end tag kept as text");
                            out.push_str(cursor.since(start));
                        }
                        HeadScan::Literal => out.push_str(cursor.since(start)),
                        HeadScan::Unterminated => {
                            trace!("input ended inside an end tag");
                            out.push_str(cursor.since(start));
                        }
                    }
                    continue;
                }
            }

            match self.scan_open(cursor, start) {
                HeadScan::Tag(tag) => {
                    if let Some(owner) = owner {
                        ancestors.push(owner.to_owned());
                    }
                    let res = self.parse_element(cursor, out, tag, ancestors);
                    if owner.is_some() {
                        ancestors.pop();
                    }
                    res?;
                }
                HeadScan::Literal => out.push_str(cursor.since(start)),
                HeadScan::Unterminated => {
                    trace!("input ended inside a start tag");
                    out.push_str(cursor.since(start));
                }
            }
        }
    }

    /// Parse the content of a resolved start tag and write its replacement into `out`.
    ///
    /// `ancestors` holds the tags open around this one, outermost first.
    fn parse_element(
        &self,
        cursor: &mut Cursor<'_>,
        out: &mut String,
        tag: OpenTag<'_>,
        ancestors: &mut Vec<String>,
    ) -> Result<(), ParseError<R::Error>> {
        if tag.self_closing {
            out.push_str(&self.render(cursor, &tag.name, "", &tag.attrs)?);
            return Ok(());
        }

        let limit = self.config.max_depth;
        if ancestors.len() >= limit {
            debug!(tag = %tag.name, limit, "nesting limit reached");
            return Err(ParseError::DepthExceeded { limit });
        }

        let rendered_before = cursor.substitutions();
        let mut content = String::new();
        match self.parse_content(cursor, &mut content, Some(&tag.name), ancestors)? {
            ContentEnd::Closed | ContentEnd::Yielded => {
                out.push_str(&self.render(cursor, &tag.name, &content, &tag.attrs)?);
            }
            ContentEnd::Eof if self.config.feature_flags.contains(ParserFeature::CLOSE_AT_EOF) => {
                out.push_str(&self.render(cursor, &tag.name, &content, &tag.attrs)?);
            }
            ContentEnd::Eof if cursor.substitutions() == rendered_before => {
                trace!(tag = %tag.name, "unterminated tag kept as text");
                out.push_str(cursor.since(tag.start));
            }
            ContentEnd::Eof => {
                // Nested tags were rendered, keep their output.
                trace!(tag = %tag.name, "unterminated tag kept as text");
                out.push_str(tag.raw);
                out.push_str(&content);
            }
        }

        Ok(())
    }

    fn render(
        &self,
        cursor: &mut Cursor<'_>,
        tag: &str,
        content: &str,
        attrs: &Attributes,
    ) -> Result<String, ParseError<R::Error>> {
        let rendered = self
            .renderer
            .render(tag, content, attrs)
            .map_err(ParseError::Render)?;
        cursor.note_substitution();
        Ok(rendered)
    }

    /// Scan a start tag head. The cursor must be just past its `[`, which sits at `start`.
    fn scan_open<'a>(&self, cursor: &mut Cursor<'a>, start: usize) -> HeadScan<OpenTag<'a>> {
        let written = cursor.take_while(is_name_char);

        let Some(name) = self.tags.lookup(written) else {
            if cursor.is_done() {
                return HeadScan::Unterminated;
            }
            if cursor.eat(CLOSE) {
                trace!(tag = written, "unknown tag kept as text");
            }
            return HeadScan::Literal;
        };
        let name = name.to_owned();

        let (attrs, end) = match cursor.peek() {
            None => return HeadScan::Unterminated,
            Some(CLOSE) => {
                cursor.bump();
                (Attributes::new(), AttrsEnd::Open)
            }
            Some(SLASH) if cursor.peek_second() == Some(CLOSE) => {
                cursor.bump();
                cursor.bump();
                (Attributes::new(), AttrsEnd::SelfClosing)
            }
            Some(EQUAL) => {
                cursor.bump();
                AttrParser::with_default_key(&name).run(cursor)
            }
            Some(_) => AttrParser::new().run(cursor),
        };

        let self_closing = match end {
            AttrsEnd::Open => false,
            AttrsEnd::SelfClosing => true,
            AttrsEnd::Unterminated => return HeadScan::Unterminated,
        };

        HeadScan::Tag(OpenTag {
            start,
            raw: cursor.since(start),
            name,
            attrs,
            self_closing,
        })
    }

    /// Scan an end tag head. The cursor must be just past its `[/`.
    ///
    /// Yields the canonical name of a registered tag. Unknown names are [HeadScan::Literal] with
    /// the closing `]` consumed.
    fn scan_close(&self, cursor: &mut Cursor<'_>) -> HeadScan<String> {
        let written = cursor.take_while(is_name_char);

        if cursor.is_done() {
            return HeadScan::Unterminated;
        }
        if !cursor.eat(CLOSE) {
            return HeadScan::Literal;
        }

        match self.tags.lookup(written) {
            Some(name) => HeadScan::Tag(name.to_owned()),
            None => HeadScan::Literal,
        }
    }
}

impl<F> BBParser<F>
where
    F: Fn(&str, &str, &Attributes) -> Result<String, Infallible>,
{
    /// Build a parser around a renderer closure that can't fail.
    ///
    /// Spelled out so closures get their argument types inferred; for fallible closures use
    /// [BBParser::new] with an annotated closure.
    pub fn from_fn<I, S>(tags: I, renderer: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(tags, renderer)
    }
}

assert_impl_all!(TagRegistry: Send, Sync);
assert_impl_all!(ParserConfig: Send, Sync, Copy);

#[cfg(test)]
mod tests;
