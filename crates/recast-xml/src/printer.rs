//! Printing: the inverse of parsing.
//!
//! Each node contributes its prefix and its literal content, in visitation
//! order. No escaping, reflowing or normalization happens here; whatever
//! the fields hold is what comes out, which is exactly what makes an
//! unmodified tree print byte-identically to its source.

use crate::tree::{Closing, Xml};

impl Xml {
    /// Render this subtree back to source text.
    pub fn print(&self) -> String {
        let mut out = String::new();
        print_into(self, &mut out);
        out
    }
}

fn print_into(xml: &Xml, out: &mut String) {
    match xml {
        Xml::Document(doc) => {
            if let Some(prolog) = &doc.prolog {
                print_into(prolog, out);
            }
            print_into(&doc.root, out);
            out.push_str(&doc.eof);
        }
        Xml::Prolog(prolog) => {
            out.push_str(&prolog.prefix);
            out.push_str(&prolog.content);
        }
        Xml::Tag(tag) => {
            out.push_str(&tag.prefix);
            out.push('<');
            out.push_str(&tag.name);
            for attr in &tag.attributes {
                print_into(attr, out);
            }
            out.push_str(&tag.before_tag_delimiter);
            match &tag.content {
                None => out.push_str("/>"),
                Some(content) => {
                    out.push('>');
                    for child in content {
                        print_into(child, out);
                    }
                    if let Some(closing) = &tag.closing {
                        print_closing(closing, out);
                    }
                }
            }
        }
        Xml::Attribute(attr) => {
            out.push_str(&attr.prefix);
            out.push_str(&attr.key);
            out.push_str(&attr.before_equals);
            out.push('=');
            out.push_str(&attr.value_prefix);
            out.push(attr.quote.as_char());
            out.push_str(&attr.value);
            out.push(attr.quote.as_char());
        }
        Xml::CharData(text) => {
            out.push_str(&text.prefix);
            out.push_str(&text.text);
        }
        Xml::Comment(comment) => {
            out.push_str(&comment.prefix);
            out.push_str("<!--");
            out.push_str(&comment.text);
            out.push_str("-->");
        }
    }
}

fn print_closing(closing: &Closing, out: &mut String) {
    out.push_str(&closing.prefix);
    out.push_str("</");
    out.push_str(&closing.name);
    out.push_str(&closing.before_tag_delimiter);
    out.push('>');
}
