//! **Simple** HTML rendering for [BBParser].
//!  While not comprehensive of more exotic usecases, likely sufficient for most and includes many pre-made tags.
//!
//! Only attribute values are escaped. Text outside of tags is copied by the parser as is, so
//! untrusted documents need to be escaped before they are parsed.
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;

use static_assertions::{assert_impl_all, assert_obj_safe};

use crate::{Attributes, BBParser, Renderer};

/// The primary trait for converting BBCode tags to HTML.
pub trait HtmlTagWriter: Send + Sync {
    /// The tag names this writer handles. Case doesn't matter.
    fn tags(&self) -> &'static [&'static str];

    /// Produce the HTML for one tag, pushing it into the given buffer.
    /// # Remarks
    /// `content` is already rendered. `tag` is one of [Self::tags].
    /// The `out` buffer provided may already have contents, an implementation must not overwrite prior contents.
    fn write_tag(&self, tag: &str, content: &str, attrs: &Attributes, out: &mut String);
}

assert_obj_safe!(HtmlTagWriter);

/// A [Renderer] producing HTML from registered [HtmlTagWriter]s.
///
/// Tags the parser knows but no writer handles render as their bare content.
#[derive(Default)]
pub struct HtmlRenderer {
    tag_impls: Vec<Box<dyn HtmlTagWriter>>,
    /// Lower-case tag name to index into `tag_impls`.
    tag_cache: HashMap<String, usize>,
}

impl HtmlRenderer {
    /// Construct a new renderer with no tags.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Construct a new renderer with the given tags.
    pub fn with_tags(tags: Vec<Box<dyn HtmlTagWriter>>) -> Self {
        let mut renderer = Self::empty();
        renderer.register_tags(tags);
        renderer
    }

    /// Register the provided tags to the renderer.
    pub fn register_tags(&mut self, tags: Vec<Box<dyn HtmlTagWriter>>) {
        for tag in tags {
            self.register_tag(tag);
        }
    }

    /// Register the provided tag to the renderer. Names already claimed by an earlier writer stay
    /// with that writer. Names are matched ignoring ASCII case.
    pub fn register_tag(&mut self, tag: Box<dyn HtmlTagWriter>) {
        let idx = self.tag_impls.len();
        for name in tag.tags() {
            self.tag_cache.entry(name.to_ascii_lowercase()).or_insert(idx);
        }
        self.tag_impls.push(tag);
    }

    /// Attempt to locate the implementation for the given tag, if one exists.
    pub fn get_writer_for_tag(&self, tag_name: &str) -> Option<&dyn HtmlTagWriter> {
        self.tag_cache
            .get(tag_name.to_ascii_lowercase().as_str())
            .map(|idx| self.tag_impls[*idx].as_ref())
    }

    /// Every tag name some writer handles, lower-cased.
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tag_cache.keys().map(String::as_str)
    }
}

impl fmt::Debug for HtmlRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtmlRenderer")
            .field("tags", &self.tag_cache.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Renderer for HtmlRenderer {
    type Error = Infallible;

    fn render(&self, tag: &str, content: &str, attrs: &Attributes) -> Result<String, Infallible> {
        let mut out = String::with_capacity(content.len() + 16);
        match self.get_writer_for_tag(tag) {
            Some(writer) => writer.write_tag(tag, content, attrs, &mut out),
            None => out.push_str(content),
        }
        Ok(out)
    }
}

impl BBParser<HtmlRenderer> {
    /// A parser that knows exactly the tags `renderer` has writers for.
    pub fn html(renderer: HtmlRenderer) -> Self {
        let tags: Vec<String> = renderer.tag_names().map(str::to_owned).collect();
        Self::new(tags, renderer)
    }
}

assert_impl_all!(BBParser<HtmlRenderer>: Send, Sync);

pub mod builtins;
