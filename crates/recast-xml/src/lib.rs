//! Format-preserving XML for the recast engine.
//!
//! The tree model keeps every byte of the source: each node carries the
//! whitespace that precedes it, and printing an unmodified tree reproduces
//! the input exactly. Visitors rewrite nodes immutably; an edit rebuilds
//! only the path from the edited node to the root, and a visitor that
//! changes nothing hands back the very same allocations.
//!
//! The crate supplies:
//! - [`Xml`] and its node kinds ([`tree`]), the parser ([`parser::parse`])
//!   and the printer ([`Xml::print`]);
//! - [`XmlVisitor`] double dispatch plus the [`xml_tree_visitor!`] bridge
//!   to the generic engine;
//! - surgical edit and search visitors ([`visitors`]).

pub mod error;
pub mod format;
pub mod parser;
pub mod printer;
pub mod tree;
pub mod visitor;
pub mod visitors;

pub use error::XmlError;
pub use parser::parse;
pub use tree::{Attribute, CharData, Closing, Comment, Document, Prolog, Quote, Tag, Xml};
pub use visitor::{walk, walk_document, walk_tag, XmlVisitor};
pub use visitors::{
    AddToTagVisitor, ChangeTagValueVisitor, FindTagsVisitor, HasSourcePath,
    RemoveContentVisitor,
};
