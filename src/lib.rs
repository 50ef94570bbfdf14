//! Recursive BBCode substitution parser.
//!
//! A [BBParser] is configured once with a set of known tag names and a [Renderer]. Parsing a
//! document replaces every known tag with whatever the renderer returns for it, innermost tags
//! first, and leaves everything else untouched.
//!
//! ```
//! use std::convert::Infallible;
//! use bbsub::{Attributes, BBParser};
//!
//! let parser = BBParser::from_fn(["b"], |tag: &str, content: &str, _: &Attributes| {
//!     Ok::<_, Infallible>(format!("<{tag}>{content}</{tag}>"))
//! });
//! assert_eq!(parser.parse("[b]x[/b] and [x]y[/x]").unwrap(), "<b>x</b> and [x]y[/x]");
//! ```

mod parser;

pub use parser::{
    Attributes, BBParser, ParseError, ParserConfig, ParserFeature, Renderer, TagRegistry,
};

#[cfg(feature = "html_gen")]
pub mod html;
