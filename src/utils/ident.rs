//! Namespace-tagged identifiers for iterators and computations.
//!
//! Cloning a subtree must produce names that cannot collide with the
//! originals. Instead of gluing a suffix onto the string and later cutting
//! it back off, every identifier carries an explicit stack of namespace
//! tags. Equality, hashing and ordering are structural, so `comp_x` read from
//! the input and `comp` tagged with namespace `x` are different identifiers
//! even though they render the same way.

use std::fmt;

/// A namespace token used to tag cloned identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Namespace conventionally used for the `n`-th clone in a session.
    pub fn clone_n(n: usize) -> Self {
        Self(format!("clone{}", n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of an iterator or a computation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ident {
    base: String,
    namespaces: Vec<Namespace>,
}

impl Ident {
    /// Create an identifier with no namespace tags.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            namespaces: Vec::new(),
        }
    }

    /// The name as it appeared in the input, without any tags.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Namespace tags, innermost first.
    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    pub fn is_tagged(&self) -> bool {
        !self.namespaces.is_empty()
    }

    /// Return this identifier moved into `ns`.
    pub fn in_namespace(&self, ns: &Namespace) -> Ident {
        let mut namespaces = self.namespaces.clone();
        namespaces.push(ns.clone());
        Ident {
            base: self.base.clone(),
            namespaces,
        }
    }

    /// Undo [`Ident::in_namespace`]. Returns `None` unless the outermost tag
    /// is exactly `ns`.
    pub fn strip_namespace(&self, ns: &Namespace) -> Option<Ident> {
        match self.namespaces.last() {
            Some(last) if last == ns => Some(Ident {
                base: self.base.clone(),
                namespaces: self.namespaces[..self.namespaces.len() - 1].to_vec(),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)?;
        for ns in &self.namespaces {
            write!(f, "_{}", ns)?;
        }
        Ok(())
    }
}

impl From<&str> for Ident {
    fn from(s: &str) -> Self {
        Ident::new(s)
    }
}

impl From<String> for Ident {
    fn from(s: String) -> Self {
        Ident::new(s)
    }
}

impl From<&Ident> for Ident {
    fn from(id: &Ident) -> Self {
        id.clone()
    }
}

impl PartialEq<str> for Ident {
    fn eq(&self, other: &str) -> bool {
        self.namespaces.is_empty() && self.base == other
    }
}

impl PartialEq<&str> for Ident {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

/// Build a `Vec<Ident>` from string literals.
pub fn idents<I, S>(names: I) -> Vec<Ident>
where
    I: IntoIterator<Item = S>,
    S: Into<Ident>,
{
    names.into_iter().map(Into::into).collect()
}
