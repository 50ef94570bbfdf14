//! Built-in implementations of common (i.e. used by many implementations, subjectively) BBCode tags.
use html_escape::encode_double_quoted_attribute;

use super::HtmlTagWriter;
use crate::Attributes;

impl<T: SimpleHtmlTagWriter> HtmlTagWriter for T {
    fn tags(&self) -> &'static [&'static str] {
        Self::TAGS
    }

    fn write_tag(&self, _: &str, content: &str, _: &Attributes, out: &mut String) {
        match Self::HTML_STANDALONE {
            Some(standalone) if content.is_empty() => out.push_str(standalone),
            _ => {
                out.push_str(Self::HTML_OPEN);
                out.push_str(content);
                out.push_str(Self::HTML_CLOSE);
            }
        }
    }
}

/// A tag that ignores its attributes and maps onto fixed HTML.
pub trait SimpleHtmlTagWriter: Send + Sync {
    const TAGS: &'static [&'static str];

    const HTML_OPEN: &'static str;

    const HTML_CLOSE: &'static str;

    /// Output used instead of open and close when the tag has no content.
    const HTML_STANDALONE: Option<&'static str>;
}

macro_rules! simple_tag {
    ($doc:expr, $name:ident, $tags:expr, $open:expr, $close:expr) => {
        #[derive(Copy, Clone, Debug, Default)]
        #[doc = $doc]
        #[doc = "<br/>"]
        #[doc = "This matches the following BBCode tags: `"]
        #[doc = stringify!($tags)]
        #[doc = "`"]
        #[doc = "# Exact output"]
        #[doc = "This tag converts exactly to"]
        #[doc = "```html"]
        #[doc = $open]
        #[doc = " contents"]
        #[doc = $close]
        #[doc = "```"]
        pub struct $name;

        impl SimpleHtmlTagWriter for $name {
            const TAGS: &'static [&'static str] = &$tags;
            const HTML_OPEN: &'static str = $open;
            const HTML_CLOSE: &'static str = $close;
            const HTML_STANDALONE: Option<&'static str> = None;
        }
    };
}

macro_rules! simple_standalone_tag {
    ($doc:expr, $name:ident, $tags:expr, $standalone:expr) => {
        #[derive(Copy, Clone, Debug, Default)]
        #[doc = $doc]
        #[doc = "<br/>"]
        #[doc = "This matches the following BBCode tags: `"]
        #[doc = stringify!($tags)]
        #[doc = "`"]
        #[doc = "# Exact output"]
        #[doc = "This tag converts exactly to"]
        #[doc = "```html"]
        #[doc = $standalone]
        #[doc = "```"]
        #[doc = "Should the tag have content anyway, the content is kept right after it."]
        pub struct $name;

        impl SimpleHtmlTagWriter for $name {
            const TAGS: &'static [&'static str] = &$tags;
            const HTML_OPEN: &'static str = $standalone;
            const HTML_CLOSE: &'static str = "";
            const HTML_STANDALONE: Option<&'static str> = Some($standalone);
        }
    };
}

// "Safe" tags, as per the definition in all_core_v1_tags.
simple_tag!{
    "A bold tag with no arguments, which converts directly to HTML5 `<b>`.",
    BoldTag, ["b", "bold"], "<b>", "</b>"
}
simple_tag!{
    "An italic tag with no arguments, which converts directly to HTML5 `<i>`.",
    ItalicTag, ["i", "italic"], "<i>", "</i>"
}
simple_tag!{
    "An underline tag no arguments, which converts directly to HTML5 `<u>`.",
    UnderlineTag, ["u", "underline", "under"], "<u>", "</u>"
}
simple_tag!{
    "A strikethrough tag with no arguments, which converts directly to HTML5 `<s>`.",
    StrikeTag, ["s", "strike"], "<s>", "</s>"
}
simple_standalone_tag!{
    "A linebreak tag with no arguments, which converts directly into HTML5 `<br/>`.",
    LinebreakTag, ["br"], "<br/>"
}
simple_standalone_tag!{
    "A horizontal rule tag with no arguments, which converts directly into HTML5 `<hr/>`.",
    RuleTag, ["hr"], "<hr/>"
}
simple_tag!{
    "A block quote tag with no arguments, which converts directly to HTML5 `<blockquote>`.",
    BlockQuoteTag, ["quote", "blockquote"], "<blockquote>", "</blockquote>"
}
simple_tag!{
    "Inline quote tag with no arguments, which converts directly to HTML5 `<q>`.",
    QuoteTag, ["q"], "<q>", "</q>"
}
simple_tag!{
    "Subscript tag with no arguments, which converts directly to HTML5 `<sub>`.",
    SubscriptTag, ["sub", "subscript", "small"], "<sub>", "</sub>"
}
simple_tag!{
    "Superscript tag with no arguments, which converts directly to HTML5 `<sup>`.",
    SuperscriptTag, ["sup", "super", "superscript"], "<sup>", "</sup>"
}
simple_tag!{
    "Header (tier 1) tag with no arguments, which converts directly to HTML5 `<h1>`.",
    Header1Tag, ["h1", "title"], "<h1>", "</h1>"
}
simple_tag!{
    "Header (tier 2) tag with no arguments, which converts directly to HTML5 `<h2>`.",
    Header2Tag, ["h2", "topic"], "<h2>", "</h2>"
}
simple_tag!{
    "Header (tier 3) tag with no arguments, which converts directly to HTML5 `<h3>`.",
    Header3Tag, ["h3", "subtopic"], "<h3>", "</h3>"
}
simple_tag!{
    "Header (tier 4) tag with no arguments, which converts directly to HTML5 `<h4>`.",
    Header4Tag, ["h4"], "<h4>", "</h4>"
}
simple_tag!{
    "Header (tier 5) tag with no arguments, which converts directly to HTML5 `<h5>`.",
    Header5Tag, ["h5"], "<h5>", "</h5>"
}
simple_tag!{
    "Header (tier 6) tag with no arguments, which converts directly to HTML5 `<h6>`.",
    Header6Tag, ["h6"], "<h6>", "</h6>"
}
simple_tag!{
    "Centering tag with no arguments, which converts to a div with styling to horizontally center it.",
    CenterTag, ["center"], "<div style=\"display: flex; justify-content: center;\"><div>", "</div></div>"
}
simple_tag!{
    "Left-align tag with no arguments, which converts to a div with styling to left-align it.",
    LeftTag, ["left"], "<div style=\"display: flex; justify-content: left;\"><div>", "</div></div>"
}
simple_tag!{
    "Right-align tag with no arguments, which converts to a div with styling to right-align it.",
    RightTag, ["right"], "<div style=\"display: flex; justify-content: right;\"><div>", "</div></div>"
}
simple_tag!{
    "Preformatted styling tag with no arguments, which converts directly to HTML5 `<pre>`.",
    PreformattedTag, ["pre", "codeblock"], "<pre>", "</pre>"
}
simple_tag!{
    "Code styling tag with no arguments, which converts directly to HTML5 `<code>`.",
    CodeTag, ["code"], "<code>", "</code>"
}
simple_tag!{
    "Keypress styling tag with no arguments, which converts directly to HTML5 `<kbd>`.",
    KbdTag, ["kbd"], "<kbd>", "</kbd>"
}

/// First non-empty attribute among `keys`.
fn attr<'a>(attrs: &'a Attributes, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| attrs.get(*k))
        .map(String::as_str)
        .find(|v| !v.is_empty())
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&encode_double_quoted_attribute(value));
    out.push('"');
}

/// Link tag, `[url="https://example.com"]text[/url]`, `[url href=...]` or `[url]https://example.com[/url]`.
///
/// Converts to `<a href="...">text</a>`. The target is not validated, so this is not safe for
/// untrusted input.
#[derive(Copy, Clone, Debug, Default)]
pub struct UrlTag;

impl HtmlTagWriter for UrlTag {
    fn tags(&self) -> &'static [&'static str] {
        &["url", "link"]
    }

    fn write_tag(&self, tag: &str, content: &str, attrs: &Attributes, out: &mut String) {
        let href = attr(attrs, &[tag, "href"]).unwrap_or(content);
        out.push_str("<a");
        push_attr(out, "href", href);
        out.push('>');
        out.push_str(content);
        out.push_str("</a>");
    }
}

/// Text color tag, `[color=red]text[/color]`. Converts to a styled `<span>`.
#[derive(Copy, Clone, Debug, Default)]
pub struct ColorTag;

impl HtmlTagWriter for ColorTag {
    fn tags(&self) -> &'static [&'static str] {
        &["color", "colour"]
    }

    fn write_tag(&self, tag: &str, content: &str, attrs: &Attributes, out: &mut String) {
        match attr(attrs, &[tag, "value"]) {
            Some(color) => {
                out.push_str("<span");
                push_attr(out, "style", &format!("color: {color};"));
                out.push('>');
                out.push_str(content);
                out.push_str("</span>");
            }
            None => out.push_str(content),
        }
    }
}

/// Image tag, `[img src="..." alt="..."/]`, `[img="..."/]` or `[img]...[/img]`.
///
/// Converts to `<img src="..."/>`. Like [UrlTag], the source is not validated.
#[derive(Copy, Clone, Debug, Default)]
pub struct ImgTag;

impl HtmlTagWriter for ImgTag {
    fn tags(&self) -> &'static [&'static str] {
        &["img", "image"]
    }

    fn write_tag(&self, tag: &str, content: &str, attrs: &Attributes, out: &mut String) {
        let src = attr(attrs, &[tag, "src"]).unwrap_or(content);
        out.push_str("<img");
        push_attr(out, "src", src);
        if let Some(alt) = attr(attrs, &["alt"]) {
            push_attr(out, "alt", alt);
        }
        out.push_str("/>");
    }
}

macro_rules! tag_list {
    ($($tag:ident),*) => {
        {
            let v: Vec<Box<dyn HtmlTagWriter>> = vec![
                $(
                    Box::new($tag::default()),
                )*
            ];

            v
        }
    };
}

/// Returns all built-in tags from v1.0.0 (or earlier) of the library that are considered "basic" and safe for all usages by the authors.
/// # "Safe"
/// Safe, in the context of this list, is defined as 100% no doubts safe for using from random user input. This precludes things like image embeds, complex formatting, and links, which can be unsafe in some contexts and require special parsing.
/// # Included tags
/// - [BoldTag]
/// - [ItalicTag]
/// - [UnderlineTag]
/// - [StrikeTag]
/// - [LinebreakTag]
/// - [RuleTag]
/// - [QuoteTag]
/// - [BlockQuoteTag]
/// - [SubscriptTag]
/// - [SuperscriptTag]
/// - [Header1Tag]
/// - [Header2Tag]
/// - [Header3Tag]
/// - [Header4Tag]
/// - [Header5Tag]
/// - [Header6Tag]
/// - [CenterTag]
/// - [LeftTag]
/// - [RightTag]
/// - [CodeTag]
/// - [PreformattedTag]
/// - [KbdTag]
pub fn all_core_v1_tags() -> Vec<Box<dyn HtmlTagWriter>> {
    tag_list!{
        BoldTag,
        ItalicTag,
        UnderlineTag,
        StrikeTag,
        LinebreakTag,
        RuleTag,
        QuoteTag,
        BlockQuoteTag,
        SubscriptTag,
        SuperscriptTag,
        Header1Tag,
        Header2Tag,
        Header3Tag,
        Header4Tag,
        Header5Tag,
        Header6Tag,
        CenterTag,
        LeftTag,
        RightTag,
        CodeTag,
        PreformattedTag,
        KbdTag
    }
}

/// [all_core_v1_tags] plus the tags that embed links, images or styles: [UrlTag], [ColorTag]
/// and [ImgTag].
pub fn all_tags() -> Vec<Box<dyn HtmlTagWriter>> {
    let mut tags = all_core_v1_tags();
    tags.append(&mut tag_list!{
        UrlTag,
        ColorTag,
        ImgTag
    });
    tags
}
