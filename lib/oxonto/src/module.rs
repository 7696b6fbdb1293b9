//! Ontology modules - canonical sets of axioms.

use crate::axiom::Axiom;
use crate::entity::{Entity, EntityKind};
use crate::signature::Signature;
use oxrdf::vocab::rdfs;
use oxrdf::{Literal, NamedNode};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A set of axioms with its aggregate signature.
///
/// Axioms are kept sorted by their [canonical key](Axiom::canonical_key), so iteration order is
/// reproducible while equality is plain set equality. Inserting an axiom twice is a no-op.
///
/// The module signature always contains every IRI referenced by its axioms.
#[derive(Debug, Clone, Default)]
pub struct OntologyModule {
    /// The ontology IRI (optional)
    iri: Option<NamedNode>,

    /// The version IRI (optional)
    version_iri: Option<NamedNode>,

    /// The ontology this module was extracted from, if any
    source: Option<NamedNode>,

    /// Imported ontology IRIs
    imports: BTreeSet<NamedNode>,

    /// All axioms, by canonical key
    axioms: BTreeMap<String, Axiom>,

    /// Union of the axiom signatures
    signature: Signature,

    /// Declared entity kinds (for quick lookup)
    declarations: BTreeMap<NamedNode, BTreeSet<EntityKind>>,
}

impl OntologyModule {
    /// Creates a new empty module.
    pub fn new(iri: Option<NamedNode>) -> Self {
        Self {
            iri,
            ..Self::default()
        }
    }

    /// Returns the ontology IRI.
    pub fn iri(&self) -> Option<&NamedNode> {
        self.iri.as_ref()
    }

    /// Sets the ontology IRI.
    pub fn set_iri(&mut self, iri: Option<NamedNode>) {
        self.iri = iri;
    }

    /// Returns the version IRI.
    pub fn version_iri(&self) -> Option<&NamedNode> {
        self.version_iri.as_ref()
    }

    /// Sets the version IRI.
    pub fn set_version_iri(&mut self, iri: Option<NamedNode>) {
        self.version_iri = iri;
    }

    /// Returns the IRI of the ontology this module was extracted from.
    pub fn source(&self) -> Option<&NamedNode> {
        self.source.as_ref()
    }

    pub fn set_source(&mut self, source: Option<NamedNode>) {
        self.source = source;
    }

    /// Returns the imported ontology IRIs.
    pub fn imports(&self) -> impl Iterator<Item = &NamedNode> {
        self.imports.iter()
    }

    /// Adds an import declaration.
    pub fn add_import(&mut self, iri: NamedNode) {
        self.imports.insert(iri);
    }

    /// Adds an axiom, returning true if it was not already present.
    pub fn insert(&mut self, axiom: Axiom) -> bool {
        let key = axiom.canonical_key();
        if self.axioms.contains_key(&key) {
            return false;
        }
        axiom.collect_signature(&mut self.signature);
        if let Axiom::Declaration(entity) = &axiom {
            self.declarations
                .entry(entity.iri().clone())
                .or_default()
                .insert(entity.kind());
        }
        self.axioms.insert(key, axiom);
        true
    }

    /// Checks if the axiom belongs to this module.
    pub fn contains(&self, axiom: &Axiom) -> bool {
        self.axioms.contains_key(&axiom.canonical_key())
    }

    /// Returns all axioms, in canonical order.
    pub fn axioms(&self) -> impl Iterator<Item = &Axiom> {
        self.axioms.values()
    }

    /// Returns the canonical keys of all axioms, in order.
    pub fn canonical_keys(&self) -> impl Iterator<Item = &str> {
        self.axioms.keys().map(String::as_str)
    }

    /// Returns the number of axioms.
    pub fn len(&self) -> usize {
        self.axioms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axioms.is_empty()
    }

    /// Returns the aggregate signature of the axioms.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Returns the kinds this IRI is declared with.
    pub fn declared_kinds(&self, iri: &NamedNode) -> impl Iterator<Item = EntityKind> + '_ {
        self.declarations.get(iri).into_iter().flatten().copied()
    }

    /// Returns the first kind this IRI is declared with, if any.
    pub fn kind_of(&self, iri: &NamedNode) -> Option<EntityKind> {
        self.declared_kinds(iri).next()
    }

    /// Checks if the IRI is declared in this module.
    pub fn declares(&self, iri: &NamedNode) -> bool {
        self.declarations.contains_key(iri)
    }

    /// Returns all declared entities.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.declarations
            .iter()
            .flat_map(|(iri, kinds)| kinds.iter().map(|kind| Entity::new(*kind, iri.clone())))
    }

    /// Returns the `rdfs:label` values asserted in this module.
    pub fn labels(&self) -> impl Iterator<Item = (&NamedNode, &Literal)> {
        self.axioms.values().filter_map(|axiom| match axiom {
            Axiom::AnnotationAssertion {
                property,
                subject,
                value,
            } if *property.iri() == rdfs::LABEL => Some((subject, value)),
            _ => None,
        })
    }

    /// Keeps only the axioms for which `filter` returns true.
    ///
    /// The signature and declaration index are recomputed from the remaining axioms.
    pub fn retain(&mut self, mut filter: impl FnMut(&Axiom) -> bool) {
        self.axioms.retain(|_, axiom| filter(axiom));
        self.signature = Signature::new();
        self.declarations.clear();
        for axiom in self.axioms.values() {
            axiom.collect_signature(&mut self.signature);
            if let Axiom::Declaration(entity) = axiom {
                self.declarations
                    .entry(entity.iri().clone())
                    .or_default()
                    .insert(entity.kind());
            }
        }
    }

    /// Merges the axioms and imports of another module into this one.
    pub fn merge(&mut self, other: &Self) {
        for import in &other.imports {
            self.add_import(import.clone());
        }
        for axiom in other.axioms.values() {
            self.insert(axiom.clone());
        }
    }
}

impl PartialEq for OntologyModule {
    fn eq(&self, other: &Self) -> bool {
        self.iri == other.iri
            && self.version_iri == other.version_iri
            && self.axioms.len() == other.axioms.len()
            && self.axioms.keys().eq(other.axioms.keys())
    }
}

impl Eq for OntologyModule {}

impl Extend<Axiom> for OntologyModule {
    fn extend<I: IntoIterator<Item = Axiom>>(&mut self, iter: I) {
        for axiom in iter {
            self.insert(axiom);
        }
    }
}

impl FromIterator<Axiom> for OntologyModule {
    fn from_iter<I: IntoIterator<Item = Axiom>>(iter: I) -> Self {
        let mut module = Self::default();
        module.extend(iter);
        module
    }
}

impl fmt::Display for OntologyModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(iri) = &self.iri {
            write!(f, "Ontology({iri})")?;
        } else {
            write!(f, "Ontology(anonymous)")?;
        }
        write!(f, " [{} axioms]", self.axioms.len())
    }
}
