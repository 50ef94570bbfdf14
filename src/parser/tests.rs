use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use crate::{Attributes, BBParser, ParseError, ParserConfig, ParserFeature, Renderer};

const LOREM_IPSUM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. In lorem quam, fermentum id porttitor ac, iaculis eu arcu. Aliquam vulputate tempus felis consequat elementum. Cras auctor nunc a cursus lobortis. Fusce venenatis quam nec eleifend porta.";

fn wrap(tag: &str, content: &str, _: &Attributes) -> Result<String, Infallible> {
    Ok(format!("<{tag}>{content}</{tag}>"))
}

type WrapFn = fn(&str, &str, &Attributes) -> Result<String, Infallible>;

fn wrapping(tags: &[&str]) -> BBParser<WrapFn> {
    BBParser::new(tags, wrap as WrapFn)
}

fn wrapping_with(tags: &[&str], feature_flags: ParserFeature) -> BBParser<WrapFn> {
    let config = ParserConfig {
        feature_flags,
        ..Default::default()
    };
    BBParser::with_config(tags, wrap as WrapFn, config)
}

/// Records every renderer call, in call order.
#[derive(Default, Clone)]
struct Recorder {
    calls: Rc<RefCell<Vec<(String, String, Attributes)>>>,
}

impl Renderer for Recorder {
    type Error = Infallible;

    fn render(&self, tag: &str, content: &str, attrs: &Attributes) -> Result<String, Infallible> {
        self.calls
            .borrow_mut()
            .push((tag.to_owned(), content.to_owned(), attrs.clone()));
        Ok(format!("<{tag}>"))
    }
}

fn attrs(pairs: &[(&str, &str)]) -> Attributes {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
pub fn just_text() {
    let parser = wrapping(&["b", "i"]);
    assert_eq!(parser.parse(LOREM_IPSUM).unwrap(), LOREM_IPSUM);
    assert_eq!(parser.parse("").unwrap(), "");
    assert_eq!(parser.parse("a ] b / c = d").unwrap(), "a ] b / c = d");
}

#[test]
pub fn escaped_bracket() {
    assert_eq!(wrapping(&[]).parse("[[").unwrap(), "[");
    assert_eq!(wrapping(&["b"]).parse("[[").unwrap(), "[");
    assert_eq!(wrapping(&["b"]).parse("[[b]").unwrap(), "[b]");
    assert_eq!(wrapping(&["b"]).parse("[b][[b][/b]").unwrap(), "<b>[b]</b>");
}

#[test]
pub fn simple_tags() {
    let parser = wrapping(&["b"]);
    assert_eq!(parser.parse("[b]x[/b]").unwrap(), "<b>x</b>");
    assert_eq!(
        parser.parse("[b]This is a test![/b] and it's very cool.").unwrap(),
        "<b>This is a test!</b> and it's very cool."
    );
    assert_eq!(parser.parse("[b][/b]").unwrap(), "<b></b>");
    assert_eq!(parser.parse("1[b]2[/b]3[b]4[/b]5").unwrap(), "1<b>2</b>3<b>4</b>5");
}

#[test]
pub fn case_insensitive_names() {
    let parser = wrapping(&[" Bold "]);
    assert_eq!(parser.parse("[BOLD]x[/bOlD]").unwrap(), "<bold>x</bold>");
}

#[test]
pub fn unknown_tag_passthrough() {
    let parser = wrapping(&["b"]);
    assert_eq!(parser.parse("[x]hi[/x]").unwrap(), "[x]hi[/x]");
    assert_eq!(parser.parse("[b][x]hi[/x][/b]").unwrap(), "<b>[x]hi[/x]</b>");
    assert_eq!(
        parser.parse("[x a=\"1\" b]hi[/x c]").unwrap(),
        "[x a=\"1\" b]hi[/x c]"
    );
    assert_eq!(parser.parse("[]").unwrap(), "[]");
    assert_eq!(parser.parse("[ b]x[/b]").unwrap(), "[ b]x[/b]");
}

#[test]
pub fn stray_end_tag_at_top_level() {
    let parser = wrapping(&["b"]);
    assert_eq!(parser.parse("x[/b]y").unwrap(), "x[/b]y");
}

#[test]
pub fn unknown_head_does_not_swallow_next_tag() {
    let parser = wrapping(&["b"]);
    assert_eq!(parser.parse("[x[b]y[/b]").unwrap(), "[x<b>y</b>");
}

#[test]
pub fn self_closing() {
    let parser = BBParser::from_fn(["img"], |_: &str, content: &str, _: &Attributes| {
        Ok(if content.is_empty() {
            "<img>".to_owned()
        } else {
            content.to_owned()
        })
    });
    assert_eq!(parser.parse("[img/]").unwrap(), "<img>");
    assert_eq!(parser.parse("a[IMG/]b").unwrap(), "a<img>b");
}

#[test]
pub fn self_closing_equals_empty_pair() {
    let recorder = Recorder::default();
    let parser = BBParser::new(["img"], recorder.clone());
    assert_eq!(parser.parse("[img src=x/][img src=x][/img]").unwrap(), "<img><img>");

    let calls = recorder.calls.borrow();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], calls[1]);
    assert_eq!(calls[0].2, attrs(&[("src", "x")]));
}

#[test]
pub fn nested_ordering() {
    let parser = wrapping(&["b", "i"]);
    assert_eq!(parser.parse("[b][i]x[/i][/b]").unwrap(), "<b><i>x</i></b>");

    let recorder = Recorder::default();
    let parser = BBParser::new(["b", "i"], recorder.clone());
    parser.parse("[b]a[i]x[/i]c[/b]").unwrap();

    let calls = recorder.calls.borrow();
    assert_eq!(calls[0].0, "i");
    assert_eq!(calls[0].1, "x");
    assert_eq!(calls[1].0, "b");
    assert_eq!(calls[1].1, "a<i>c");
}

#[test]
pub fn same_tag_nested() {
    let parser = wrapping(&["quote"]);
    assert_eq!(
        parser.parse("[quote]a[quote]b[/quote]c[/quote]").unwrap(),
        "<quote>a<quote>b</quote>c</quote>"
    );
}

#[test]
pub fn attribute_parsing() {
    let recorder = Recorder::default();
    let parser = BBParser::new(["a"], recorder.clone());
    assert_eq!(
        parser.parse("[a href=\"http://x\" target=_blank]t[/a]").unwrap(),
        "<a>"
    );

    let calls = recorder.calls.borrow();
    assert_eq!(calls[0].1, "t");
    assert_eq!(calls[0].2, attrs(&[("href", "http://x"), ("target", "_blank")]));
}

#[test]
pub fn duplicate_attribute() {
    let recorder = Recorder::default();
    let parser = BBParser::new(["a"], recorder.clone());
    parser.parse("[a x=1 x=2/]").unwrap();

    assert_eq!(recorder.calls.borrow()[0].2, attrs(&[("x", "2")]));
}

#[test]
pub fn default_attribute() {
    let recorder = Recorder::default();
    let parser = BBParser::new(["color", "url"], recorder.clone());
    parser
        .parse("[COLOR=red]x[/color][url=\"http://a/b?c=d\" title=t]y[/url]")
        .unwrap();

    let calls = recorder.calls.borrow();
    assert_eq!(calls[0].2, attrs(&[("color", "red")]));
    assert_eq!(calls[1].2, attrs(&[("url", "http://a/b?c=d"), ("title", "t")]));
}

#[test]
pub fn trailing_equal_is_empty_value() {
    let recorder = Recorder::default();
    let parser = BBParser::new(["a"], recorder.clone());
    parser.parse("[a x=]t[/a]").unwrap();

    assert_eq!(recorder.calls.borrow()[0].2, attrs(&[("x", "")]));
}

#[test]
pub fn mismatched_end_closes_ancestor() {
    let parser = wrapping(&["b", "i"]);
    // `[/b]` belongs to the outer tag, so the inner one is closed implicitly.
    assert_eq!(parser.parse("[b][i]x[/b]y").unwrap(), "<b><i>x</i></b>y");
    assert_eq!(
        parser.parse("[b]1[i]2[i]3[/b]4").unwrap(),
        "<b>1<i>2<i>3</i></i></b>4"
    );
}

#[test]
pub fn lenient_close() {
    let parser = wrapping(&["b", "i"]);
    assert_eq!(parser.parse("[b]x[/i][/b]").unwrap(), "<b>x</b>[/b]");
}

#[test]
pub fn strict_close() {
    let parser = wrapping_with(&["b", "i"], ParserFeature::empty());
    assert_eq!(parser.parse("[b]x[/i][/b]").unwrap(), "<b>x[/i]</b>");
    // Ancestor end tags still close what is open inside them.
    assert_eq!(parser.parse("[b][i]x[/b]").unwrap(), "<b><i>x</i></b>");
}

#[test]
pub fn unknown_end_tag_inside_tag() {
    let parser = wrapping(&["b"]);
    assert_eq!(parser.parse("[b]x[/y]z[/b]").unwrap(), "<b>x[/y]z</b>");
    assert_eq!(parser.parse("[b]x[/b extra]z[/b]").unwrap(), "<b>x[/b extra]z</b>");
    assert_eq!(parser.parse("[b]x[/]z[/b]").unwrap(), "<b>x[/]z</b>");
}

#[test]
pub fn unterminated_tag() {
    let parser = wrapping(&["b", "i"]);
    assert_eq!(parser.parse("[b]hello").unwrap(), "[b]hello");
    assert_eq!(parser.parse("[b]x[i]y[/i] tail").unwrap(), "[b]x<i>y</i> tail");
    assert_eq!(parser.parse("[b]x[/b").unwrap(), "[b]x[/b");
    assert_eq!(parser.parse("x[b").unwrap(), "x[b");
    assert_eq!(parser.parse("x[not_a_tag=real ").unwrap(), "x[not_a_tag=real ");
    assert_eq!(parser.parse("[b x=\"[i]y[/i]").unwrap(), "[b x=\"[i]y[/i]");
    assert_eq!(parser.parse("[").unwrap(), "[");
}

#[test]
pub fn unterminated_tag_keeps_escapes() {
    let parser = wrapping(&["b", "i"]);
    assert_eq!(parser.parse("[b]a[[b]c").unwrap(), "[b]a[[b]c");
    assert_eq!(parser.parse("x[b]a[[i]y[/i").unwrap(), "x[b]a[[i]y[/i");
    // A rendered nested tag can't be written back as input.
    assert_eq!(parser.parse("[b][[[i]y[/i]").unwrap(), "[b][<i>y</i>");
}

#[test]
pub fn close_at_eof() {
    let parser = wrapping_with(
        &["b", "i"],
        ParserFeature::LENIENT_CLOSE | ParserFeature::CLOSE_AT_EOF,
    );
    assert_eq!(parser.parse("[b]x[i]y").unwrap(), "<b>x<i>y</i></b>");
}

#[test]
pub fn multibyte_text() {
    let parser = wrapping(&["b"]);
    assert_eq!(parser.parse("ü[b]日本[/b]€").unwrap(), "ü<b>日本</b>€");
    assert_eq!(parser.parse("[b日]").unwrap(), "[b日]");
}

#[test]
pub fn depth_limit() {
    let config = ParserConfig {
        max_depth: 2,
        ..Default::default()
    };
    let parser = BBParser::with_config(["b"], wrap as WrapFn, config);

    assert_eq!(parser.parse("[b][b]x[/b][/b]").unwrap(), "<b><b>x</b></b>");
    assert!(matches!(
        parser.parse("[b][b][b]x[/b][/b][/b]"),
        Err(ParseError::DepthExceeded { limit: 2 })
    ));
    // Self-closing tags never open a frame.
    assert_eq!(parser.parse("[b][b][b/][/b][/b]").unwrap(), "<b><b><b></b></b></b>");
}

#[test]
pub fn deep_nesting_fails_cleanly() {
    let input = "[b]".repeat(100_000);
    let parser = wrapping(&["b"]);
    assert!(matches!(
        parser.parse(&input),
        Err(ParseError::DepthExceeded {
            limit: ParserConfig::DEFAULT_MAX_DEPTH
        })
    ));
}

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("cannot render {0}")]
struct RenderFailure(String);

#[test]
pub fn renderer_error_propagates() {
    let parser = BBParser::new(
        ["b", "bad"],
        |tag: &str, content: &str, _: &Attributes| -> Result<String, RenderFailure> {
            if tag == "bad" {
                Err(RenderFailure(content.to_owned()))
            } else {
                Ok(content.to_owned())
            }
        },
    );

    assert_eq!(parser.parse("[b]ok[/b]").unwrap(), "ok");
    match parser.parse("[b][bad]boom[/bad][/b]") {
        Err(ParseError::Render(e)) => assert_eq!(e, RenderFailure("boom".to_owned())),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
pub fn reconfigure_between_parses() {
    let mut parser = wrapping(&["b"]);
    assert_eq!(parser.parse("[i]x[/i]").unwrap(), "[i]x[/i]");

    parser.set_tags(["i"]);
    assert_eq!(parser.parse("[i]x[/i]").unwrap(), "<i>x</i>");
    assert!(!parser.tags().contains("b"));

    parser.set_config(ParserConfig {
        max_depth: 0,
        ..Default::default()
    });
    assert!(parser.parse("[i]x[/i]").is_err());
}

#[test]
pub fn concurrent_parses() {
    let parser = wrapping(&["b"]);
    std::thread::scope(|s| {
        for n in 0..4 {
            let parser = &parser;
            s.spawn(move || {
                let input = format!("[b]{n}[/b]");
                assert_eq!(parser.parse(&input).unwrap(), format!("<b>{n}</b>"));
            });
        }
    });
}

#[test]
pub fn registry_normalizes() {
    let parser = wrapping(&["b", " B ", "", "  ", "i"]);
    assert_eq!(parser.tags().len(), 2);
    assert!(parser.tags().contains("I"));
    assert_eq!(parser.tags().lookup("B"), Some("b"));
    assert_eq!(parser.tags().lookup(""), None);
}
