//! Copy-on-write list transforms for child collections.
//!
//! Tree nodes hold their children in `Vec`s; a visitor rewriting children
//! needs replace, delete, and splice in one pass without sentinel values.
//! [`flat_map`] provides that, and keeps the no-op propagation contract at
//! the container level: when every element maps to itself unchanged the
//! original `Vec` (the same buffer) is returned, so parent reassembly can
//! detect "no child changed" without deep comparison.

/// Per-element outcome of a list transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transform<T> {
    /// Replace the element (possibly with itself, unchanged).
    Keep(T),
    /// Delete the element.
    Remove,
    /// Splice these elements in at the element's position, preserving
    /// their relative order. An empty vec behaves like [`Transform::Remove`].
    Flatten(Vec<T>),
}

impl<T> From<T> for Transform<T> {
    fn from(value: T) -> Self {
        Transform::Keep(value)
    }
}

impl<T> Transform<T> {
    /// `Some` keeps the element, `None` removes it.
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(t) => Transform::Keep(t),
            None => Transform::Remove,
        }
    }
}

/// Transform a child list in one left-to-right pass.
///
/// Mixed strategies are fine: one call can replace some elements, remove
/// others, and splice several in at a third position. The result never
/// contains sentinel values or nested lists.
///
/// When the pass changes nothing the input `Vec` is returned as-is.
pub fn flat_map<T, F>(ls: Vec<T>, mut f: F) -> Vec<T>
where
    T: Clone + PartialEq,
    F: FnMut(usize, T) -> Transform<T>,
{
    let mut out: Option<Vec<T>> = None;
    for (i, item) in ls.iter().enumerate() {
        match f(i, item.clone()) {
            Transform::Keep(t) => match out.as_mut() {
                Some(v) => v.push(t),
                None if t != *item => {
                    let mut v = ls[..i].to_vec();
                    v.push(t);
                    out = Some(v);
                }
                None => {}
            },
            Transform::Remove => {
                if out.is_none() {
                    out = Some(ls[..i].to_vec());
                }
            }
            Transform::Flatten(items) => {
                let unchanged = items.len() == 1 && items[0] == *item;
                match out.as_mut() {
                    Some(v) => v.extend(items),
                    None if !unchanged => {
                        let mut v = ls[..i].to_vec();
                        v.extend(items);
                        out = Some(v);
                    }
                    None => {}
                }
            }
        }
    }
    out.unwrap_or(ls)
}

/// 1→1 transform with the same copy-on-write no-op guarantee.
///
/// This is what default child reassembly in language crates uses: visit
/// each child, and if every child came back unchanged the parent keeps its
/// original child buffer.
pub fn map<T, F>(ls: Vec<T>, mut f: F) -> Vec<T>
where
    T: Clone + PartialEq,
    F: FnMut(usize, T) -> T,
{
    flat_map(ls, |i, t| Transform::Keep(f(i, t)))
}
