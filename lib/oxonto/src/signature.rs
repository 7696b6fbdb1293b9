use oxrdf::{NamedNode, NamedNodeRef};
use std::collections::BTreeSet;
use std::collections::btree_set;
use std::fmt;

/// The set of entity IRIs referenced by an axiom or an axiom set.
///
/// Iteration is always in IRI order so anything derived from a signature is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Signature {
    iris: BTreeSet<NamedNode>,
}

impl Signature {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an IRI, returning true if it was not present yet.
    #[inline]
    pub fn insert(&mut self, iri: NamedNode) -> bool {
        self.iris.insert(iri)
    }

    #[inline]
    pub fn contains(&self, iri: &NamedNode) -> bool {
        self.iris.contains(iri)
    }

    /// Same as [`contains`](Self::contains) for borrowed IRIs.
    #[inline]
    pub fn contains_ref(&self, iri: NamedNodeRef<'_>) -> bool {
        self.iris.contains(&iri.into_owned())
    }

    #[inline]
    pub fn remove(&mut self, iri: &NamedNode) -> bool {
        self.iris.remove(iri)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.iris.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.iris.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> btree_set::Iter<'_, NamedNode> {
        self.iris.iter()
    }

    /// Adds all the IRIs of `other`, returning true if this signature grew.
    pub fn union_with(&mut self, other: &Self) -> bool {
        let before = self.iris.len();
        self.iris.extend(other.iris.iter().cloned());
        self.iris.len() != before
    }

    /// Returns true if the two signatures share at least one IRI.
    pub fn intersects(&self, other: &Self) -> bool {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.iris.iter().any(|iri| large.iris.contains(iri))
    }

    /// The IRIs present in both signatures.
    pub fn intersection(&self, other: &Self) -> Self {
        self.iris.intersection(&other.iris).cloned().collect()
    }

    /// The IRIs of this signature that are not in `other`.
    pub fn difference(&self, other: &Self) -> Self {
        self.iris.difference(&other.iris).cloned().collect()
    }

    #[inline]
    pub fn is_subset(&self, other: &Self) -> bool {
        self.iris.is_subset(&other.iris)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, iri) in self.iris.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{iri}")?;
        }
        f.write_str("}")
    }
}

impl FromIterator<NamedNode> for Signature {
    fn from_iter<I: IntoIterator<Item = NamedNode>>(iter: I) -> Self {
        Self {
            iris: iter.into_iter().collect(),
        }
    }
}

impl Extend<NamedNode> for Signature {
    fn extend<I: IntoIterator<Item = NamedNode>>(&mut self, iter: I) {
        self.iris.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Signature {
    type Item = &'a NamedNode;
    type IntoIter = btree_set::Iter<'a, NamedNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.iris.iter()
    }
}

impl IntoIterator for Signature {
    type Item = NamedNode;
    type IntoIter = btree_set::IntoIter<NamedNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.iris.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(iris: &[&str]) -> Signature {
        iris.iter()
            .map(|iri| NamedNode::new_unchecked(format!("http://example.org/{iri}")))
            .collect()
    }

    #[test]
    fn set_operations() {
        let a = sig(&["a", "b"]);
        let b = sig(&["b", "c"]);
        assert!(a.intersects(&b));
        assert_eq!(a.intersection(&b), sig(&["b"]));
        assert_eq!(a.difference(&b), sig(&["a"]));
        assert!(!a.intersects(&sig(&["d"])));
        assert!(sig(&["b"]).is_subset(&a));

        let mut c = a.clone();
        assert!(c.union_with(&b));
        assert!(!c.union_with(&b));
        assert_eq!(c, sig(&["a", "b", "c"]));
    }

    #[test]
    fn sorted_display() {
        assert_eq!(
            sig(&["z", "a"]).to_string(),
            "{<http://example.org/a>, <http://example.org/z>}"
        );
        assert!(sig(&["a"]).contains_ref(NamedNodeRef::new_unchecked("http://example.org/a")));
    }
}
