//! Errors for XML parsing and node construction.

/// Failure to parse or construct XML.
///
/// Parse failures are values, not panics: one malformed file must not stop
/// other files from being processed. Construction variants signal caller
/// bugs (a tag cannot have an empty name) and are surfaced fail-fast.
#[derive(Debug, Clone, thiserror::Error)]
pub enum XmlError {
    /// The input is not well-formed in the supported subset.
    #[error("malformed xml at offset {offset}: {message}")]
    Parse {
        /// Byte offset of the failure.
        offset: usize,
        /// Parser diagnostic.
        message: String,
    },

    /// A closing tag does not match the open tag it should close.
    #[error("closing tag </{found}> does not match <{expected}>")]
    MismatchedClosingTag {
        /// Name of the open tag.
        expected: String,
        /// Name found in the closing tag.
        found: String,
    },

    /// A tag was constructed with an empty name.
    #[error("tag name must not be empty")]
    EmptyTagName,

    /// An attribute was constructed with an empty key.
    #[error("attribute key must not be empty")]
    EmptyAttributeKey,

    /// A fragment passed to `Tag::build` did not contain a single element.
    #[error("snippet does not parse to a single tag: {0}")]
    InvalidSnippet(String),
}
