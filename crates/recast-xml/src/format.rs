//! Indentation for inserted subtrees.
//!
//! Formatting is scope-bounded: only nodes being inserted get synthesized
//! prefixes, derived from the surrounding text. Existing nodes are never
//! reflowed.

use std::sync::Arc;

use crate::tree::{Tag, Xml};

const INDENT_UNIT: &str = "    ";

/// The indentation of the line a prefix ends on: the text after the last
/// newline, or the whole prefix when it holds no newline.
pub fn line_indent(prefix: &str) -> &str {
    match prefix.rfind('\n') {
        Some(idx) => &prefix[idx + 1..],
        None => prefix,
    }
}

/// The indent children of `scope` should get: taken from an existing child
/// element when one sits on its own line, otherwise the scope's own indent
/// plus one unit.
pub fn child_indent(scope: &Tag) -> String {
    for child in scope.children() {
        if child.prefix.contains('\n') {
            return line_indent(&child.prefix).to_string();
        }
    }
    format!("{}{}", line_indent(&scope.prefix), INDENT_UNIT)
}

/// Re-prefix an inserted tag (and its element descendants) for its new
/// position. Value-only tags stay on one line; tags with element content
/// get one line per child and a closing on its own line.
pub fn reindent(tag: &Arc<Tag>, indent: &str) -> Arc<Tag> {
    let mut next = (**tag).clone();
    next.prefix = format!("\n{indent}");
    let value_only = next
        .content
        .as_deref()
        .is_none_or(|c| c.iter().all(|n| matches!(n, Xml::CharData(_))));
    if value_only {
        if let Some(closing) = &mut next.closing {
            closing.prefix = String::new();
        }
    } else {
        let inner = format!("{indent}{INDENT_UNIT}");
        if let Some(content) = &mut next.content {
            for child in content.iter_mut() {
                if let Xml::Tag(t) = child {
                    *child = Xml::Tag(reindent(t, &inner));
                }
            }
        }
        if let Some(closing) = &mut next.closing {
            closing.prefix = format!("\n{indent}");
        }
    }
    Arc::new(next)
}
