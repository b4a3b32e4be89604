//! A whitespace-preserving parser for the supported XML subset.
//!
//! Supported: an optional `<?xml …?>` declaration, one root element, nested
//! elements, attributes with single or double quotes, character data,
//! comments, and self-closing tags. Every input byte lands in exactly one
//! prefix or content field, so printing the parsed tree reproduces the
//! input byte for byte.

use std::path::PathBuf;
use std::sync::Arc;

use recast_core::{Markers, TreeId};
use tracing::debug;
use winnow::combinator::{alt, delimited, opt, repeat};
use winnow::error::{ErrMode, ParserError};
use winnow::prelude::*;
use winnow::token::{take_until, take_while};
use winnow::ModalResult;

use crate::error::XmlError;
use crate::tree::{
    Attribute, CharData, Closing, Comment, Document, Prolog, Quote, Tag, Xml,
};

/// Parse one source file into an [`Xml::Document`].
///
/// A failed parse is an error value; callers processing many files capture
/// it and move on.
pub fn parse(source_path: impl Into<PathBuf>, input: &str) -> Result<Xml, XmlError> {
    let source_path = source_path.into();
    debug!(path = %source_path.display(), bytes = input.len(), "parsing xml document");
    let (prolog, root, eof) = document.parse(input).map_err(|e| XmlError::Parse {
        offset: e.offset(),
        message: format!("{:?}", e.inner()),
    })?;
    Ok(Xml::Document(Arc::new(Document {
        id: TreeId::random(),
        markers: Markers::empty(),
        source_path,
        prolog,
        root,
        eof,
    })))
}

/// Parse a fragment into a single tag. Leading whitespace becomes the
/// tag's prefix; trailing whitespace is discarded.
pub(crate) fn parse_tag(snippet: &str) -> Result<Arc<Tag>, XmlError> {
    let xml = fragment
        .parse(snippet)
        .map_err(|e| XmlError::InvalidSnippet(format!("{:?}", e.inner())))?;
    match xml {
        Xml::Tag(t) => Ok(t),
        _ => Err(XmlError::InvalidSnippet("not an element".to_string())),
    }
}

fn document(input: &mut &str) -> ModalResult<(Option<Xml>, Xml, String)> {
    let lead = whitespace(input)?;
    let (prolog, root_prefix) = if input.starts_with("<?") {
        let content = ("<?", take_until(0.., "?>"), "?>").take().parse_next(input)?;
        let prolog = Xml::Prolog(Arc::new(Prolog {
            id: TreeId::random(),
            prefix: lead.to_string(),
            markers: Markers::empty(),
            content: content.to_string(),
        }));
        (Some(prolog), whitespace(input)?)
    } else {
        (None, lead)
    };
    let root = element(root_prefix, input)?;
    let eof = whitespace(input)?;
    Ok((prolog, root, eof.to_string()))
}

fn fragment(input: &mut &str) -> ModalResult<Xml> {
    let prefix = whitespace(input)?;
    let el = element(prefix, input)?;
    whitespace(input)?;
    Ok(el)
}

fn element(prefix: &str, input: &mut &str) -> ModalResult<Xml> {
    '<'.parse_next(input)?;
    let name = name(input)?;
    let attributes: Vec<Xml> = repeat(0.., attribute).parse_next(input)?;
    let before_tag_delimiter = whitespace(input)?;

    if opt("/>").parse_next(input)?.is_some() {
        return Ok(Xml::Tag(Arc::new(Tag {
            id: TreeId::random(),
            prefix: prefix.to_string(),
            markers: Markers::empty(),
            name: name.to_string(),
            attributes,
            before_tag_delimiter: before_tag_delimiter.to_string(),
            content: None,
            closing: None,
        })));
    }

    '>'.parse_next(input)?;
    let (content, closing_prefix) = content_items(input)?;
    "</".parse_next(input)?;
    let closing_name = self::name(input)?;
    let closing_ws = whitespace(input)?;
    '>'.parse_next(input)?;
    if closing_name != name {
        // closing tag does not match the open tag
        return Err(ErrMode::from_input(input).cut());
    }

    Ok(Xml::Tag(Arc::new(Tag {
        id: TreeId::random(),
        prefix: prefix.to_string(),
        markers: Markers::empty(),
        name: name.to_string(),
        attributes,
        before_tag_delimiter: before_tag_delimiter.to_string(),
        content: Some(content),
        closing: Some(Closing {
            id: TreeId::random(),
            prefix: closing_prefix,
            name: closing_name.to_string(),
            before_tag_delimiter: closing_ws.to_string(),
        }),
    })))
}

/// Element content up to (not including) the closing tag. The whitespace
/// run before `</` is returned separately; it becomes the closing's prefix.
fn content_items(input: &mut &str) -> ModalResult<(Vec<Xml>, String)> {
    let mut items = Vec::new();
    loop {
        let ws = whitespace(input)?;
        if input.starts_with("</") {
            return Ok((items, ws.to_string()));
        }
        if input.starts_with("<!--") {
            let text = delimited("<!--", take_until(0.., "-->"), "-->").parse_next(input)?;
            items.push(Xml::Comment(Arc::new(Comment {
                id: TreeId::random(),
                prefix: ws.to_string(),
                markers: Markers::empty(),
                text: text.to_string(),
            })));
        } else if input.starts_with('<') {
            items.push(element(ws, input)?);
        } else {
            if input.is_empty() {
                // unclosed element
                return Err(ErrMode::from_input(input).cut());
            }
            let text = take_while(1.., |c| c != '<').parse_next(input)?;
            items.push(Xml::CharData(Arc::new(CharData {
                id: TreeId::random(),
                prefix: ws.to_string(),
                markers: Markers::empty(),
                text: text.to_string(),
            })));
        }
    }
}

fn attribute(input: &mut &str) -> ModalResult<Xml> {
    let prefix = whitespace(input)?;
    let key = take_while(1.., is_name_char).parse_next(input)?;
    let before_equals = whitespace(input)?;
    '='.parse_next(input)?;
    let value_prefix = whitespace(input)?;
    let quote = alt(('"'.value(Quote::Double), '\''.value(Quote::Single))).parse_next(input)?;
    let mut q = quote.as_char();
    let value = take_while(0.., move |c| c != q).parse_next(input)?;
    q.parse_next(input)?;
    Ok(Xml::Attribute(Arc::new(Attribute {
        id: TreeId::random(),
        prefix: prefix.to_string(),
        markers: Markers::empty(),
        key: key.to_string(),
        before_equals: before_equals.to_string(),
        value_prefix: value_prefix.to_string(),
        quote,
        value: value.to_string(),
    })))
}

fn name<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., is_name_char).parse_next(input)
}

fn whitespace<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(0.., char::is_whitespace).parse_next(input)
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ':')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_doc(input: &str) -> Arc<Document> {
        let xml = parse("test.xml", input).unwrap();
        match xml {
            Xml::Document(d) => d,
            other => panic!("expected document, got {other:?}"),
        }
    }

    fn root(doc: &Document) -> &Arc<Tag> {
        doc.root.as_tag().unwrap()
    }

    mod structure {
        use super::*;

        #[test]
        fn minimal_document() {
            let doc = parse_doc("<a/>");
            assert!(doc.prolog.is_none());
            let tag = root(&doc);
            assert_eq!(tag.name, "a");
            assert!(tag.content.is_none());
            assert!(tag.closing.is_none());
        }

        #[test]
        fn prolog_captures_declaration_and_leading_whitespace() {
            let doc = parse_doc("\n<?xml version=\"1.0\"?>\n<a/>");
            let Some(Xml::Prolog(prolog)) = &doc.prolog else {
                panic!("expected prolog");
            };
            assert_eq!(prolog.prefix, "\n");
            assert_eq!(prolog.content, "<?xml version=\"1.0\"?>");
            assert_eq!(root(&doc).prefix, "\n");
        }

        #[test]
        fn nested_elements_and_closing_prefix() {
            let doc = parse_doc("<a>\n  <b/>\n</a>");
            let tag = root(&doc);
            let content = tag.content.as_ref().unwrap();
            assert_eq!(content.len(), 1);
            let Xml::Tag(b) = &content[0] else {
                panic!("expected tag child");
            };
            assert_eq!(b.prefix, "\n  ");
            assert_eq!(tag.closing.as_ref().unwrap().prefix, "\n");
        }

        #[test]
        fn character_data_is_kept_verbatim() {
            let doc = parse_doc("<a>  two  words  </a>");
            let content = root(&doc).content.as_ref().unwrap();
            let Xml::CharData(text) = &content[0] else {
                panic!("expected chardata");
            };
            assert_eq!(format!("{}{}", text.prefix, text.text), "  two  words  ");
        }

        #[test]
        fn comments_inside_content() {
            let doc = parse_doc("<a><!-- note --></a>");
            let content = root(&doc).content.as_ref().unwrap();
            let Xml::Comment(comment) = &content[0] else {
                panic!("expected comment");
            };
            assert_eq!(comment.text, " note ");
        }

        #[test]
        fn trailing_whitespace_lands_in_eof() {
            let doc = parse_doc("<a/>\n\n");
            assert_eq!(doc.eof, "\n\n");
        }
    }

    mod attributes {
        use super::*;

        #[test]
        fn both_quote_styles_are_recognized() {
            let doc = parse_doc("<a one=\"1\" two='2'/>");
            let tag = root(&doc);
            assert_eq!(tag.attributes.len(), 2);
            let Xml::Attribute(one) = &tag.attributes[0] else {
                panic!("expected attribute");
            };
            assert_eq!((one.key.as_str(), one.value.as_str()), ("one", "1"));
            assert_eq!(one.quote, Quote::Double);
            let Xml::Attribute(two) = &tag.attributes[1] else {
                panic!("expected attribute");
            };
            assert_eq!(two.quote, Quote::Single);
        }

        #[test]
        fn whitespace_around_equals_is_preserved() {
            let doc = parse_doc("<a key = \"v\"/>");
            let Xml::Attribute(attr) = &root(&doc).attributes[0] else {
                panic!("expected attribute");
            };
            assert_eq!(attr.before_equals, " ");
            assert_eq!(attr.value_prefix, " ");
        }
    }

    mod failures {
        use super::*;

        #[test]
        fn unclosed_element_is_an_error() {
            assert!(matches!(
                parse("t.xml", "<a><b></a>"),
                Err(XmlError::Parse { .. })
            ));
        }

        #[test]
        fn garbage_is_an_error_with_an_offset() {
            let Err(XmlError::Parse { offset, .. }) = parse("t.xml", "not xml") else {
                panic!("expected parse error");
            };
            assert_eq!(offset, 0);
        }

        #[test]
        fn truncated_input_is_an_error() {
            assert!(parse("t.xml", "<a>text").is_err());
        }
    }

    mod snippets {
        use super::*;

        #[test]
        fn tag_build_parses_a_fragment() {
            let tag = Tag::build("<version>2.0</version>").unwrap();
            assert_eq!(tag.name, "version");
            assert_eq!(tag.value().as_deref(), Some("2.0"));
        }

        #[test]
        fn tag_build_rejects_non_elements() {
            assert!(Tag::build("just text").is_err());
        }
    }
}
