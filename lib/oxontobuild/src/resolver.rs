use crate::error::RecordError;
use oxmanchester::TermReference;
use oxonto::IriResolver;
use oxonto::vocab::obo;
use oxrdf::NamedNode;
use std::collections::{BTreeMap, BTreeSet};

/// Entity labels to the IRIs carrying them.
///
/// A label may be carried by several entities, it is then ambiguous unless written with a prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelMap {
    labels: BTreeMap<String, BTreeSet<NamedNode>>,
}

impl LabelMap {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>, iri: NamedNode) {
        self.labels.entry(label.into()).or_default().insert(iri);
    }

    /// The IRIs carrying `label`.
    pub fn get(&self, label: &str) -> impl Iterator<Item = &NamedNode> {
        self.labels.get(label).into_iter().flatten()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The IRIs carrying `label` and belonging to the `prefix` namespace.
    ///
    /// The prefix is matched both as an OBO ID space (`PO` for `http://purl.obolibrary.org/obo/PO_...`)
    /// and as a CURIE prefix.
    fn candidates<'a>(
        &'a self,
        label: &str,
        prefix: Option<&str>,
        resolver: &IriResolver,
    ) -> Vec<&'a NamedNode> {
        let Some(prefix) = prefix else {
            return self.get(label).collect();
        };
        let obo_namespace = format!("{}{prefix}_", obo::NAMESPACE);
        let namespace = resolver.prefixes().namespace(prefix);
        self.get(label)
            .filter(|iri| {
                iri.as_str().starts_with(&obo_namespace)
                    || namespace.is_some_and(|namespace| iri.as_str().starts_with(namespace))
            })
            .collect()
    }
}

impl<L: Into<String>> FromIterator<(L, NamedNode)> for LabelMap {
    fn from_iter<I: IntoIterator<Item = (L, NamedNode)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (label, iri) in iter {
            map.insert(label, iri);
        }
        map
    }
}

/// Turns the references written in the cells into IRIs.
///
/// Labels are looked up in the labels of the compiled terms first, then in the labels of the source ontologies.
#[derive(Clone, Copy)]
pub struct TermResolver<'a> {
    iris: &'a IriResolver,
    local: &'a LabelMap,
    external: &'a LabelMap,
}

impl<'a> TermResolver<'a> {
    pub fn new(iris: &'a IriResolver, local: &'a LabelMap, external: &'a LabelMap) -> Self {
        Self {
            iris,
            local,
            external,
        }
    }

    pub fn resolve(&self, reference: &TermReference) -> Result<NamedNode, RecordError> {
        match reference {
            TermReference::Iri(iri) => Ok(self.iris.resolve(&format!("<{iri}>"))?),
            TermReference::Name(name) => Ok(self.iris.resolve(name)?),
            TermReference::Label { prefix, label } => {
                self.resolve_label(label, prefix.as_deref(), reference)
            }
            TermReference::Anonymous(_) => Err(RecordError::Malformed(format!(
                "anonymous individual {reference} is not allowed here"
            ))),
        }
    }

    /// Resolves the identifier of a record, which may not be a label.
    pub fn resolve_id(&self, id: &str) -> Result<NamedNode, RecordError> {
        let id = id.trim();
        if id.starts_with('\'') || id.contains(":'") {
            return Err(RecordError::Malformed(format!(
                "the label {id} cannot be used as an identifier"
            )));
        }
        Ok(self.iris.resolve(id)?)
    }

    fn resolve_label(
        &self,
        label: &str,
        prefix: Option<&str>,
        reference: &TermReference,
    ) -> Result<NamedNode, RecordError> {
        let mut candidates = self.local.candidates(label, prefix, self.iris);
        if candidates.is_empty() {
            candidates = self.external.candidates(label, prefix, self.iris);
        }
        match candidates.as_slice() {
            [iri] => Ok((*iri).clone()),
            [] => Err(RecordError::unresolved(
                reference.to_string(),
                "no term has this label",
            )),
            _ => Err(RecordError::unresolved(
                reference.to_string(),
                format!(
                    "the label is ambiguous, it is used by {}",
                    candidates
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxonto::PrefixMap;

    fn iri(value: &str) -> NamedNode {
        NamedNode::new_unchecked(value)
    }

    fn resolver() -> IriResolver {
        IriResolver::new("http://example.org/obto/", PrefixMap::default()).unwrap()
    }

    #[test]
    fn identifiers() {
        let iris = resolver();
        let labels = LabelMap::new();
        let resolver = TermResolver::new(&iris, &labels, &labels);
        assert_eq!(
            resolver
                .resolve(&TermReference::Name("PO:0000003".into()))
                .unwrap(),
            iri("http://purl.obolibrary.org/obo/PO_0000003")
        );
        assert_eq!(
            resolver
                .resolve(&TermReference::Iri("leaf".into()))
                .unwrap(),
            iri("http://example.org/obto/leaf")
        );
        assert!(matches!(
            resolver.resolve(&TermReference::Name("nope:x".into())),
            Err(RecordError::UnresolvedReference { .. })
        ));
        assert!(resolver.resolve_id("'leaf'").is_err());
        assert!(resolver.resolve_id("PO:'leaf'").is_err());
        assert_eq!(
            resolver.resolve_id("OBTO:0010").unwrap(),
            iri("http://purl.obolibrary.org/obo/OBTO_0010")
        );
    }

    #[test]
    fn labels() {
        let iris = resolver();
        let local = [("leaf", iri("http://purl.obolibrary.org/obo/OBTO_0001"))]
            .into_iter()
            .collect::<LabelMap>();
        let external = [
            ("leaf", iri("http://purl.obolibrary.org/obo/PO_0025034")),
            ("root", iri("http://purl.obolibrary.org/obo/PO_0009005")),
            ("root", iri("http://purl.obolibrary.org/obo/TO_0000043")),
        ]
        .into_iter()
        .collect::<LabelMap>();
        let resolver = TermResolver::new(&iris, &local, &external);
        let label = |prefix: Option<&str>, label: &str| TermReference::Label {
            prefix: prefix.map(Into::into),
            label: label.into(),
        };

        assert_eq!(
            resolver.resolve(&label(None, "leaf")).unwrap(),
            iri("http://purl.obolibrary.org/obo/OBTO_0001")
        );
        assert_eq!(
            resolver.resolve(&label(Some("PO"), "leaf")).unwrap(),
            iri("http://purl.obolibrary.org/obo/PO_0025034")
        );
        assert!(matches!(
            resolver.resolve(&label(None, "root")),
            Err(RecordError::UnresolvedReference { reason, .. }) if reason.contains("ambiguous")
        ));
        assert_eq!(
            resolver.resolve(&label(Some("TO"), "root")).unwrap(),
            iri("http://purl.obolibrary.org/obo/TO_0000043")
        );
        assert!(resolver.resolve(&label(None, "stem")).is_err());
        assert!(
            resolver
                .resolve(&TermReference::Anonymous("b".into()))
                .is_err()
        );
    }
}
