//! The XML node model.
//!
//! Every node carries a `prefix`: the whitespace that precedes it in the
//! source. Content fields hold the rest verbatim, so printing an unmodified
//! tree reproduces the input byte for byte.
//!
//! Nodes are `Arc`-backed and immutable. An edit rebuilds only the spine
//! from the edited node to the root; untouched siblings keep their
//! allocations, which is what makes no-op detection a pointer comparison.

use std::path::PathBuf;
use std::sync::Arc;

use recast_core::{Markers, Tree, TreeId};

use crate::error::XmlError;

/// One XML node of any kind.
#[derive(Debug, Clone)]
pub enum Xml {
    Document(Arc<Document>),
    Prolog(Arc<Prolog>),
    Tag(Arc<Tag>),
    Attribute(Arc<Attribute>),
    CharData(Arc<CharData>),
    Comment(Arc<Comment>),
}

/// A parsed source file: optional declaration, one root element, trailing
/// whitespace in `eof`.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: TreeId,
    pub markers: Markers,
    pub source_path: PathBuf,
    pub prolog: Option<Xml>,
    pub root: Xml,
    pub eof: String,
}

/// An `<?xml …?>` declaration, kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Prolog {
    pub id: TreeId,
    pub prefix: String,
    pub markers: Markers,
    pub content: String,
}

/// An element. `content: None` means self-closing (`<a/>`); an empty
/// `Some(vec![])` means `<a></a>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub id: TreeId,
    pub prefix: String,
    pub markers: Markers,
    pub name: String,
    pub attributes: Vec<Xml>,
    /// Whitespace between the last attribute (or the name) and `>`/`/>`.
    pub before_tag_delimiter: String,
    pub content: Option<Vec<Xml>>,
    pub closing: Option<Closing>,
}

/// The `</name>` of a non-self-closing tag. Its `prefix` is the whitespace
/// run between the last child and `</`.
#[derive(Debug, Clone, PartialEq)]
pub struct Closing {
    pub id: TreeId,
    pub prefix: String,
    pub name: String,
    /// Whitespace between the name and `>`.
    pub before_tag_delimiter: String,
}

/// Quote style of an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Double,
    Single,
}

impl Quote {
    pub fn as_char(self) -> char {
        match self {
            Quote::Double => '"',
            Quote::Single => '\'',
        }
    }
}

/// A `key="value"` attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub id: TreeId,
    pub prefix: String,
    pub markers: Markers,
    pub key: String,
    /// Whitespace between the key and `=`.
    pub before_equals: String,
    /// Whitespace between `=` and the opening quote.
    pub value_prefix: String,
    pub quote: Quote,
    pub value: String,
}

/// A text run inside element content, verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct CharData {
    pub id: TreeId,
    pub prefix: String,
    pub markers: Markers,
    pub text: String,
}

/// A `<!-- … -->` comment; `text` is the inner text, verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: TreeId,
    pub prefix: String,
    pub markers: Markers,
    pub text: String,
}

// ============================================================
// Constructors
// ============================================================

impl Document {
    pub fn new(source_path: impl Into<PathBuf>, prolog: Option<Xml>, root: Xml, eof: String) -> Self {
        Self {
            id: TreeId::random(),
            markers: Markers::empty(),
            source_path: source_path.into(),
            prolog,
            root,
            eof,
        }
    }
}

impl Tag {
    /// A bare tag with no attributes and no content. Fails fast on an
    /// empty name; that is always a caller bug.
    pub fn new(name: impl Into<String>) -> Result<Self, XmlError> {
        let name = name.into();
        if name.is_empty() {
            return Err(XmlError::EmptyTagName);
        }
        Ok(Self {
            id: TreeId::random(),
            prefix: String::new(),
            markers: Markers::empty(),
            name,
            attributes: Vec::new(),
            before_tag_delimiter: String::new(),
            content: None,
            closing: None,
        })
    }

    /// Parse a source fragment into a tag, e.g.
    /// `Tag::build("<version>1.0</version>")`.
    pub fn build(snippet: &str) -> Result<Arc<Tag>, XmlError> {
        crate::parser::parse_tag(snippet)
    }
}

impl Attribute {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Result<Self, XmlError> {
        let key = key.into();
        if key.is_empty() {
            return Err(XmlError::EmptyAttributeKey);
        }
        Ok(Self {
            id: TreeId::random(),
            prefix: " ".to_string(),
            markers: Markers::empty(),
            key,
            before_equals: String::new(),
            value_prefix: String::new(),
            quote: Quote::Double,
            value: value.into(),
        })
    }
}

impl CharData {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: TreeId::random(),
            prefix: String::new(),
            markers: Markers::empty(),
            text: text.into(),
        }
    }
}

impl Closing {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TreeId::random(),
            prefix: String::new(),
            name: name.into(),
            before_tag_delimiter: String::new(),
        }
    }
}

// ============================================================
// With-field transformers
// ============================================================
//
// All of these preserve identity, change exactly one field, and return the
// receiver's own Arc when the new value equals the old one.

impl Document {
    pub fn with_prolog(self: &Arc<Self>, prolog: Option<Xml>) -> Arc<Self> {
        if self.prolog == prolog {
            return Arc::clone(self);
        }
        let mut next = (**self).clone();
        next.prolog = prolog;
        Arc::new(next)
    }

    pub fn with_root(self: &Arc<Self>, root: Xml) -> Arc<Self> {
        if self.root == root {
            return Arc::clone(self);
        }
        let mut next = (**self).clone();
        next.root = root;
        Arc::new(next)
    }

    pub fn with_markers(self: &Arc<Self>, markers: Markers) -> Arc<Self> {
        if self.markers == markers {
            return Arc::clone(self);
        }
        let mut next = (**self).clone();
        next.markers = markers;
        Arc::new(next)
    }
}

impl Tag {
    pub fn with_attributes(self: &Arc<Self>, attributes: Vec<Xml>) -> Arc<Self> {
        if self.attributes == attributes {
            return Arc::clone(self);
        }
        let mut next = (**self).clone();
        next.attributes = attributes;
        Arc::new(next)
    }

    pub fn with_content(self: &Arc<Self>, content: Option<Vec<Xml>>) -> Arc<Self> {
        if self.content == content {
            return Arc::clone(self);
        }
        let mut next = (**self).clone();
        next.content = content;
        Arc::new(next)
    }

    pub fn with_closing(self: &Arc<Self>, closing: Option<Closing>) -> Arc<Self> {
        if self.closing == closing {
            return Arc::clone(self);
        }
        let mut next = (**self).clone();
        next.closing = closing;
        Arc::new(next)
    }

    pub fn with_prefix(self: &Arc<Self>, prefix: String) -> Arc<Self> {
        if self.prefix == prefix {
            return Arc::clone(self);
        }
        let mut next = (**self).clone();
        next.prefix = prefix;
        Arc::new(next)
    }

    pub fn with_markers(self: &Arc<Self>, markers: Markers) -> Arc<Self> {
        if self.markers == markers {
            return Arc::clone(self);
        }
        let mut next = (**self).clone();
        next.markers = markers;
        Arc::new(next)
    }
}

impl Prolog {
    pub fn with_markers(self: &Arc<Self>, markers: Markers) -> Arc<Self> {
        if self.markers == markers {
            return Arc::clone(self);
        }
        let mut next = (**self).clone();
        next.markers = markers;
        Arc::new(next)
    }
}

impl Attribute {
    pub fn with_value(self: &Arc<Self>, value: String) -> Arc<Self> {
        if self.value == value {
            return Arc::clone(self);
        }
        let mut next = (**self).clone();
        next.value = value;
        Arc::new(next)
    }

    pub fn with_markers(self: &Arc<Self>, markers: Markers) -> Arc<Self> {
        if self.markers == markers {
            return Arc::clone(self);
        }
        let mut next = (**self).clone();
        next.markers = markers;
        Arc::new(next)
    }
}

impl CharData {
    pub fn with_text(self: &Arc<Self>, text: String) -> Arc<Self> {
        if self.text == text {
            return Arc::clone(self);
        }
        let mut next = (**self).clone();
        next.text = text;
        Arc::new(next)
    }

    pub fn with_markers(self: &Arc<Self>, markers: Markers) -> Arc<Self> {
        if self.markers == markers {
            return Arc::clone(self);
        }
        let mut next = (**self).clone();
        next.markers = markers;
        Arc::new(next)
    }
}

impl Comment {
    pub fn with_markers(self: &Arc<Self>, markers: Markers) -> Arc<Self> {
        if self.markers == markers {
            return Arc::clone(self);
        }
        let mut next = (**self).clone();
        next.markers = markers;
        Arc::new(next)
    }
}

// ============================================================
// Tag helpers
// ============================================================

impl Tag {
    /// The text value of a value-only tag (`<version>1.0</version>`),
    /// trimmed. `None` for self-closing tags and tags with element content.
    pub fn value(&self) -> Option<String> {
        match self.content.as_deref() {
            Some([Xml::CharData(c)]) => Some(c.text.trim().to_string()),
            _ => None,
        }
    }

    /// Child elements, in document order.
    pub fn children(&self) -> impl Iterator<Item = &Arc<Tag>> {
        self.content.iter().flatten().filter_map(|c| match c {
            Xml::Tag(t) => Some(t),
            _ => None,
        })
    }

    /// The first child element with the given name.
    pub fn child(&self, name: &str) -> Option<&Arc<Tag>> {
        self.children().find(|t| t.name == name)
    }
}

// ============================================================
// Xml dispatch
// ============================================================

impl Xml {
    /// Same allocation, and therefore the same unmodified node.
    pub fn ptr_eq(&self, other: &Xml) -> bool {
        match (self, other) {
            (Xml::Document(a), Xml::Document(b)) => Arc::ptr_eq(a, b),
            (Xml::Prolog(a), Xml::Prolog(b)) => Arc::ptr_eq(a, b),
            (Xml::Tag(a), Xml::Tag(b)) => Arc::ptr_eq(a, b),
            (Xml::Attribute(a), Xml::Attribute(b)) => Arc::ptr_eq(a, b),
            (Xml::CharData(a), Xml::CharData(b)) => Arc::ptr_eq(a, b),
            (Xml::Comment(a), Xml::Comment(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn as_document(&self) -> Option<&Arc<Document>> {
        match self {
            Xml::Document(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> Option<&Arc<Tag>> {
        match self {
            Xml::Tag(t) => Some(t),
            _ => None,
        }
    }
}

impl From<Arc<Document>> for Xml {
    fn from(d: Arc<Document>) -> Self {
        Xml::Document(d)
    }
}

impl From<Tag> for Xml {
    fn from(t: Tag) -> Self {
        Xml::Tag(Arc::new(t))
    }
}

impl From<CharData> for Xml {
    fn from(c: CharData) -> Self {
        Xml::CharData(Arc::new(c))
    }
}

impl PartialEq for Xml {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        match (self, other) {
            (Xml::Document(a), Xml::Document(b)) => a == b,
            (Xml::Prolog(a), Xml::Prolog(b)) => a == b,
            (Xml::Tag(a), Xml::Tag(b)) => a == b,
            (Xml::Attribute(a), Xml::Attribute(b)) => a == b,
            (Xml::CharData(a), Xml::CharData(b)) => a == b,
            (Xml::Comment(a), Xml::Comment(b)) => a == b,
            _ => false,
        }
    }
}

impl Tree for Xml {
    fn id(&self) -> TreeId {
        match self {
            Xml::Document(n) => n.id,
            Xml::Prolog(n) => n.id,
            Xml::Tag(n) => n.id,
            Xml::Attribute(n) => n.id,
            Xml::CharData(n) => n.id,
            Xml::Comment(n) => n.id,
        }
    }

    fn markers(&self) -> &Markers {
        match self {
            Xml::Document(n) => &n.markers,
            Xml::Prolog(n) => &n.markers,
            Xml::Tag(n) => &n.markers,
            Xml::Attribute(n) => &n.markers,
            Xml::CharData(n) => &n.markers,
            Xml::Comment(n) => &n.markers,
        }
    }

    fn with_markers(self, markers: Markers) -> Self {
        match self {
            Xml::Document(n) => Xml::Document(n.with_markers(markers)),
            Xml::Prolog(n) => Xml::Prolog(n.with_markers(markers)),
            Xml::Tag(n) => Xml::Tag(n.with_markers(markers)),
            Xml::Attribute(n) => Xml::Attribute(n.with_markers(markers)),
            Xml::CharData(n) => Xml::CharData(n.with_markers(markers)),
            Xml::Comment(n) => Xml::Comment(n.with_markers(markers)),
        }
    }
}
