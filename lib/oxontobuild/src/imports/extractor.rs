use crate::imports::locality::is_local;
use crate::imports::terms::RelatedType;
use oxonto::{
    Axiom, ClassExpression, DataRange, Individual, ObjectPropertyExpression, OntologyModule,
    PropertyCharacteristic, Signature,
};
use oxrdf::NamedNode;
use rustc_hash::FxHashMap;
use std::collections::{BTreeSet, VecDeque};

/// Extracts modules from one source ontology.
///
/// Axioms are identified by their position in the canonical order of the source.
pub struct ModuleExtractor<'a> {
    axioms: Vec<&'a Axiom>,
    signatures: Vec<Signature>,
    /// For each IRI, the axioms using it.
    index: FxHashMap<NamedNode, Vec<usize>>,
}

impl<'a> ModuleExtractor<'a> {
    pub fn new(ontology: &'a OntologyModule) -> Self {
        let axioms = ontology.axioms().collect::<Vec<_>>();
        let signatures = axioms
            .iter()
            .map(|axiom| axiom.signature())
            .collect::<Vec<_>>();
        let mut index = FxHashMap::<NamedNode, Vec<usize>>::default();
        for (i, signature) in signatures.iter().enumerate() {
            for iri in signature {
                index.entry(iri.clone()).or_default().push(i);
            }
        }
        Self {
            axioms,
            signatures,
            index,
        }
    }

    #[inline]
    pub fn axiom(&self, id: usize) -> Option<&'a Axiom> {
        self.axioms.get(id).copied()
    }

    /// The signature of the axiom with the given identifier.
    #[inline]
    pub fn signature(&self, id: usize) -> Option<&Signature> {
        self.signatures.get(id)
    }

    fn uses(&self, iri: &NamedNode) -> &[usize] {
        self.index.get(iri).map(Vec::as_slice).unwrap_or_default()
    }

    /// The ⊥-locality module for `seed`.
    ///
    /// Only the axioms sharing a symbol with the working signature are classified. Each time a symbol joins
    /// the working signature, the axioms using it are classified again, until no axiom is added.
    pub fn extract(&self, seed: &Signature) -> BTreeSet<usize> {
        let mut signature = seed.clone();
        let mut module = BTreeSet::new();
        let mut pending = seed.iter().cloned().collect::<Vec<_>>();
        while let Some(symbol) = pending.pop() {
            for &id in self.uses(&symbol) {
                if module.contains(&id) || is_local(self.axioms[id], &signature) {
                    continue;
                }
                module.insert(id);
                for iri in &self.signatures[id] {
                    if signature.insert(iri.clone()) {
                        pending.push(iri.clone());
                    }
                }
            }
        }
        module
    }

    /// The declarations, annotation assertions and characteristics of the given entities.
    ///
    /// The annotation properties used by the selected assertions are extracted the same way.
    pub fn extract_single(&self, entities: &Signature) -> BTreeSet<usize> {
        let mut seen = entities.clone();
        let mut pending = entities.iter().cloned().collect::<Vec<_>>();
        let mut module = BTreeSet::new();
        while let Some(iri) = pending.pop() {
            for &id in self.uses(&iri) {
                let axiom = self.axioms[id];
                let selected = match axiom {
                    Axiom::Declaration(entity) => *entity.iri() == iri,
                    Axiom::AnnotationAssertion {
                        property, subject, ..
                    } if *subject == iri => {
                        if seen.insert(property.iri().clone()) {
                            pending.push(property.iri().clone());
                        }
                        true
                    }
                    _ => PropertyCharacteristic::of_axiom(axiom).is_some(),
                };
                if selected {
                    module.insert(id);
                }
            }
        }
        module
    }

    /// Follows the relationships of the given types from `start`, recursively.
    ///
    /// Returns the traversed axioms and the reached entities, `start` included.
    pub fn related(
        &self,
        start: &NamedNode,
        types: &BTreeSet<RelatedType>,
    ) -> (BTreeSet<usize>, Signature) {
        let mut reached = Signature::new();
        reached.insert(start.clone());
        let mut axioms = BTreeSet::new();
        if types.is_empty() {
            return (axioms, reached);
        }
        let mut queue = VecDeque::from([start.clone()]);
        while let Some(current) = queue.pop_front() {
            for &id in self.uses(&current) {
                let mut targets = Vec::new();
                for related_type in types {
                    relations(self.axioms[id], &current, *related_type, &mut targets);
                }
                if targets.is_empty() {
                    continue;
                }
                axioms.insert(id);
                for target in targets {
                    if reached.insert(target.clone()) {
                        queue.push_back(target.clone());
                    }
                }
            }
        }
        (axioms, reached)
    }
}

/// Pushes into `targets` the entities `axiom` relates `current` to with a relationship of the given type.
fn relations<'b>(
    axiom: &'b Axiom,
    current: &NamedNode,
    related_type: RelatedType,
    targets: &mut Vec<&'b NamedNode>,
) {
    match (related_type, axiom) {
        (
            RelatedType::Ancestors,
            Axiom::SubClassOf {
                sub_class: ClassExpression::Class(sub),
                super_class: ClassExpression::Class(sup),
            },
        ) if sub.iri() == current => targets.push(sup.iri()),
        (
            RelatedType::Descendants,
            Axiom::SubClassOf {
                sub_class: ClassExpression::Class(sub),
                super_class: ClassExpression::Class(sup),
            },
        ) if sup.iri() == current => targets.push(sub.iri()),
        (
            RelatedType::Ancestors,
            Axiom::SubObjectPropertyOf {
                sub_property: ObjectPropertyExpression::ObjectProperty(sub),
                super_property: ObjectPropertyExpression::ObjectProperty(sup),
            },
        ) if sub.iri() == current => targets.push(sup.iri()),
        (
            RelatedType::Descendants,
            Axiom::SubObjectPropertyOf {
                sub_property: ObjectPropertyExpression::ObjectProperty(sub),
                super_property: ObjectPropertyExpression::ObjectProperty(sup),
            },
        ) if sup.iri() == current => targets.push(sub.iri()),
        (
            RelatedType::Ancestors,
            Axiom::SubDataPropertyOf {
                sub_property,
                super_property,
            },
        ) if sub_property.iri() == current => targets.push(super_property.iri()),
        (
            RelatedType::Descendants,
            Axiom::SubDataPropertyOf {
                sub_property,
                super_property,
            },
        ) if super_property.iri() == current => targets.push(sub_property.iri()),
        (
            RelatedType::Ancestors,
            Axiom::SubAnnotationPropertyOf {
                sub_property,
                super_property,
            },
        ) if sub_property.iri() == current => targets.push(super_property.iri()),
        (
            RelatedType::Descendants,
            Axiom::SubAnnotationPropertyOf {
                sub_property,
                super_property,
            },
        ) if super_property.iri() == current => targets.push(sub_property.iri()),
        (RelatedType::Equivalents, Axiom::EquivalentClasses(classes))
        | (RelatedType::Disjoints, Axiom::DisjointClasses(classes)) => {
            let named = classes
                .iter()
                .filter_map(|c| c.as_class().map(|c| c.iri()))
                .collect::<Vec<_>>();
            if named.contains(&current) {
                targets.extend(named.into_iter().filter(|iri| *iri != current));
            }
        }
        (RelatedType::Equivalents, Axiom::EquivalentObjectProperties(properties))
        | (RelatedType::Disjoints, Axiom::DisjointObjectProperties(properties)) => {
            if properties.iter().any(|p| p.iri() == current) {
                targets.extend(
                    properties
                        .iter()
                        .map(|p| p.iri())
                        .filter(|iri| *iri != current),
                );
            }
        }
        (RelatedType::Equivalents, Axiom::EquivalentDataProperties(properties))
        | (RelatedType::Disjoints, Axiom::DisjointDataProperties(properties)) => {
            if properties.iter().any(|p| p.iri() == current) {
                targets.extend(
                    properties
                        .iter()
                        .map(|p| p.iri())
                        .filter(|iri| *iri != current),
                );
            }
        }
        (
            RelatedType::Domains,
            Axiom::ObjectPropertyDomain {
                property,
                domain: ClassExpression::Class(class),
            },
        ) if property.iri() == current => targets.push(class.iri()),
        (
            RelatedType::Domains,
            Axiom::DataPropertyDomain {
                property,
                domain: ClassExpression::Class(class),
            },
        ) if property.iri() == current => targets.push(class.iri()),
        (
            RelatedType::Ranges,
            Axiom::ObjectPropertyRange {
                property,
                range: ClassExpression::Class(class),
            },
        ) if property.iri() == current => targets.push(class.iri()),
        (
            RelatedType::Ranges,
            Axiom::DataPropertyRange {
                property,
                range: DataRange::Datatype(datatype),
            },
        ) if property.iri() == current => targets.push(datatype),
        (RelatedType::Inverses, Axiom::InverseObjectProperties(first, second)) => {
            if first.iri() == current {
                targets.push(second.iri());
            } else if second.iri() == current {
                targets.push(first.iri());
            }
        }
        (
            RelatedType::Types,
            Axiom::ClassAssertion {
                class: ClassExpression::Class(class),
                individual: Individual::Named(individual),
            },
        ) if individual == current => targets.push(class.iri()),
        (
            RelatedType::PropertyAssertions,
            Axiom::ObjectPropertyAssertion {
                source: Individual::Named(source),
                target: Individual::Named(target),
                ..
            },
        ) if source == current => targets.push(target),
        _ => (),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxonto::{Entity, EntityKind, ObjectProperty, OwlClass};

    fn iri(name: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.org/{name}"))
    }

    fn class(name: &str) -> OwlClass {
        OwlClass::new(iri(name))
    }

    fn source() -> OntologyModule {
        let mut ontology = OntologyModule::new(None);
        for name in ["a", "b", "c", "d"] {
            ontology.insert(Axiom::declaration(Entity::new(
                EntityKind::Class,
                iri(name),
            )));
        }
        ontology.insert(Axiom::declaration(Entity::new(
            EntityKind::ObjectProperty,
            iri("p"),
        )));
        ontology.insert(Axiom::subclass_of(class("a"), class("b")));
        ontology.insert(Axiom::subclass_of(class("b"), class("c")));
        ontology.insert(Axiom::subclass_of(class("d"), class("a")));
        ontology.insert(Axiom::subclass_of(
            class("c"),
            ClassExpression::some_values_from(ObjectProperty::new(iri("p")), class("d").into()),
        ));
        ontology.insert(Axiom::TransitiveObjectProperty(ObjectProperty::new(iri(
            "p",
        ))));
        ontology
    }

    fn extracted(extractor: &ModuleExtractor<'_>, ids: &BTreeSet<usize>) -> BTreeSet<String> {
        ids.iter()
            .filter_map(|id| extractor.axiom(*id))
            .map(Axiom::canonical_key)
            .collect()
    }

    #[test]
    fn locality_module_follows_superclasses() {
        let ontology = source();
        let extractor = ModuleExtractor::new(&ontology);
        let module = extractor.extract(&[iri("a")].into_iter().collect());
        let keys = extracted(&extractor, &module);
        assert!(keys.contains(&Axiom::subclass_of(class("a"), class("b")).canonical_key()));
        assert!(keys.contains(&Axiom::subclass_of(class("b"), class("c")).canonical_key()));
        assert!(keys.contains(&Axiom::TransitiveObjectProperty(ObjectProperty::new(iri("p"))).canonical_key()));
        // d only becomes part of the signature through the existential restriction on c
        assert!(keys.contains(&Axiom::subclass_of(class("d"), class("a")).canonical_key()));
    }

    #[test]
    fn locality_module_skips_subclasses() {
        let mut ontology = OntologyModule::new(None);
        ontology.insert(Axiom::declaration(Entity::new(EntityKind::Class, iri("c"))));
        ontology.insert(Axiom::subclass_of(class("a"), class("b")));
        ontology.insert(Axiom::subclass_of(class("b"), class("c")));
        let extractor = ModuleExtractor::new(&ontology);
        let module = extractor.extract(&[iri("c")].into_iter().collect());
        assert_eq!(
            extracted(&extractor, &module),
            [Axiom::declaration(Entity::new(EntityKind::Class, iri("c"))).canonical_key()].into()
        );
    }

    #[test]
    fn single_and_related() {
        let ontology = source();
        let extractor = ModuleExtractor::new(&ontology);
        let single = extractor.extract_single(&[iri("p")].into_iter().collect());
        assert_eq!(
            extracted(&extractor, &single),
            [
                Axiom::declaration(Entity::new(EntityKind::ObjectProperty, iri("p")))
                    .canonical_key(),
                Axiom::TransitiveObjectProperty(ObjectProperty::new(iri("p"))).canonical_key()
            ]
            .into()
        );

        let (axioms, reached) = extractor.related(&iri("d"), &[RelatedType::Ancestors].into());
        assert_eq!(axioms.len(), 3);
        assert_eq!(
            reached,
            [iri("a"), iri("b"), iri("c"), iri("d")].into_iter().collect()
        );
        let (_, descendants) = extractor.related(&iri("a"), &[RelatedType::Descendants].into());
        // a has d as subclass, d has no subclass: the traversal stops
        assert_eq!(descendants, [iri("a"), iri("d")].into_iter().collect());
    }
}
