use crate::resolver::LabelMap;
use oxonto::{EntityKind, OntologyModule};
use oxrdf::NamedNode;
use std::collections::BTreeMap;
use std::sync::Arc;

/// The source ontologies external terms are imported from, by name.
///
/// Sources are read-only and shared, so cloning a catalog is cheap.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    sources: BTreeMap<String, Arc<OntologyModule>>,
}

impl Catalog {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a source ontology, replacing any source with the same name.
    pub fn insert(&mut self, name: impl Into<String>, ontology: impl Into<Arc<OntologyModule>>) {
        self.sources.insert(name.into(), ontology.into());
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Arc<OntologyModule>> {
        self.sources.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    /// The sources, in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<OntologyModule>)> {
        self.sources
            .iter()
            .map(|(name, ontology)| (name.as_str(), ontology))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// The kind a source declares this IRI with, sources being tried in name order.
    pub fn kind_of(&self, iri: &NamedNode) -> Option<EntityKind> {
        self.sources
            .values()
            .find_map(|ontology| ontology.kind_of(iri))
    }

    /// The `rdfs:label`s of all the sources.
    pub fn labels(&self) -> LabelMap {
        self.sources
            .values()
            .flat_map(|ontology| ontology.labels())
            .map(|(iri, label)| (label.value(), iri.clone()))
            .collect()
    }

    /// The catalog with only the named sources.
    ///
    /// Fails with the first name that is not in the catalog.
    pub fn restricted_to<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, &'a str> {
        let mut restricted = Self::new();
        for name in names {
            let ontology = self.sources.get(name).ok_or(name)?;
            restricted
                .sources
                .insert(name.to_owned(), Arc::clone(ontology));
        }
        Ok(restricted)
    }
}

impl<N: Into<String>> FromIterator<(N, OntologyModule)> for Catalog {
    fn from_iter<I: IntoIterator<Item = (N, OntologyModule)>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for (name, ontology) in iter {
            catalog.insert(name, ontology);
        }
        catalog
    }
}
