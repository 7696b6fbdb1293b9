//! Syntactic ⊥-locality.
//!
//! An axiom is ⊥-local with respect to a signature Σ if it becomes a tautology once every class and property
//! outside of Σ is replaced by the empty class or the empty property. The classification below follows the
//! syntactic rules of Cuenca Grau, Horrocks, Kazakov and Sattler, "Modular Reuse of Ontologies: Theory and
//! Practice" (JAIR 2008).
//!
//! Declarations and annotation axioms have no logical meaning: they are non-local when their subject is in Σ.

use oxonto::vocab::owl;
use oxonto::{Axiom, ClassExpression, Signature};
use oxrdf::NamedNode;

/// Returns true if `axiom` can be left out of a module for `signature`.
pub fn is_local(axiom: &Axiom, signature: &Signature) -> bool {
    let l = Locality { signature };
    match axiom {
        Axiom::Declaration(entity) => !l.contains(entity.iri()),
        Axiom::AnnotationAssertion { subject, .. } => !l.contains(subject),
        Axiom::SubAnnotationPropertyOf { sub_property, .. } => !l.contains(sub_property.iri()),
        Axiom::SubClassOf {
            sub_class,
            super_class,
        } => l.is_bottom(sub_class) || l.is_top(super_class),
        Axiom::EquivalentClasses(classes) => {
            classes.iter().all(|c| l.is_bottom(c)) || classes.iter().all(|c| l.is_top(c))
        }
        Axiom::DisjointClasses(classes) => classes.iter().filter(|c| !l.is_bottom(c)).count() <= 1,
        Axiom::SubObjectPropertyOf { sub_property, .. } => !l.contains(sub_property.named().iri()),
        Axiom::EquivalentObjectProperties(properties) => {
            properties.iter().all(|p| !l.contains(p.iri()))
        }
        Axiom::DisjointObjectProperties(properties) => {
            properties.iter().filter(|p| l.contains(p.iri())).count() <= 1
        }
        Axiom::DisjointDataProperties(properties) => {
            properties.iter().filter(|p| l.contains(p.iri())).count() <= 1
        }
        Axiom::EquivalentDataProperties(properties) => {
            properties.iter().all(|p| !l.contains(p.iri()))
        }
        Axiom::ObjectPropertyDomain { property, domain } => {
            !l.contains(property.iri()) || l.is_top(domain)
        }
        Axiom::ObjectPropertyRange { property, range } => {
            !l.contains(property.iri()) || l.is_top(range)
        }
        Axiom::DataPropertyDomain { property, domain } => {
            !l.contains(property.iri()) || l.is_top(domain)
        }
        Axiom::InverseObjectProperties(first, second) => {
            !l.contains(first.iri()) && !l.contains(second.iri())
        }
        Axiom::FunctionalObjectProperty(property)
        | Axiom::InverseFunctionalObjectProperty(property)
        | Axiom::IrreflexiveObjectProperty(property)
        | Axiom::SymmetricObjectProperty(property)
        | Axiom::AsymmetricObjectProperty(property)
        | Axiom::TransitiveObjectProperty(property)
        | Axiom::NegativeObjectPropertyAssertion { property, .. } => !l.contains(property.iri()),
        Axiom::SubDataPropertyOf { sub_property, .. } => !l.contains(sub_property.iri()),
        Axiom::DataPropertyRange { property, .. }
        | Axiom::FunctionalDataProperty(property)
        | Axiom::NegativeDataPropertyAssertion { property, .. } => !l.contains(property.iri()),
        Axiom::ClassAssertion { class, .. } => l.is_top(class),
        // The empty property is never reflexive, and asserting a relation with it is never true.
        Axiom::ReflexiveObjectProperty(_)
        | Axiom::ObjectPropertyAssertion { .. }
        | Axiom::DataPropertyAssertion { .. } => false,
    }
}

#[derive(Clone, Copy)]
struct Locality<'a> {
    signature: &'a Signature,
}

impl Locality<'_> {
    fn contains(self, iri: &NamedNode) -> bool {
        self.signature.contains(iri)
    }

    /// The expression is equivalent to owl:Nothing once the symbols outside of the signature are emptied.
    fn is_bottom(self, expression: &ClassExpression) -> bool {
        match expression {
            ClassExpression::Class(class) => {
                *class.iri() == owl::NOTHING
                    || (*class.iri() != owl::THING && !self.contains(class.iri()))
            }
            ClassExpression::ObjectComplementOf(operand) => self.is_top(operand),
            ClassExpression::ObjectIntersectionOf(operands) => {
                operands.iter().any(|c| self.is_bottom(c))
            }
            ClassExpression::ObjectUnionOf(operands) => {
                operands.iter().all(|c| self.is_bottom(c))
            }
            ClassExpression::ObjectSomeValuesFrom { property, filler } => {
                !self.contains(property.named().iri()) || self.is_bottom(filler)
            }
            ClassExpression::ObjectHasValue { property, .. } => {
                !self.contains(property.named().iri())
            }
            ClassExpression::ObjectMinCardinality {
                cardinality,
                property,
                filler,
            }
            | ClassExpression::ObjectExactCardinality {
                cardinality,
                property,
                filler,
            } => {
                *cardinality > 0
                    && (!self.contains(property.named().iri())
                        || filler.as_deref().is_some_and(|c| self.is_bottom(c)))
            }
            ClassExpression::DataSomeValuesFrom { property, .. }
            | ClassExpression::DataHasValue { property, .. } => !self.contains(property.iri()),
            ClassExpression::DataMinCardinality {
                cardinality,
                property,
                ..
            }
            | ClassExpression::DataExactCardinality {
                cardinality,
                property,
                ..
            } => *cardinality > 0 && !self.contains(property.iri()),
            ClassExpression::ObjectAllValuesFrom { .. }
            | ClassExpression::ObjectMaxCardinality { .. }
            | ClassExpression::DataAllValuesFrom { .. }
            | ClassExpression::DataMaxCardinality { .. } => false,
        }
    }

    /// The expression is equivalent to owl:Thing once the symbols outside of the signature are emptied.
    fn is_top(self, expression: &ClassExpression) -> bool {
        match expression {
            ClassExpression::Class(class) => *class.iri() == owl::THING,
            ClassExpression::ObjectComplementOf(operand) => self.is_bottom(operand),
            ClassExpression::ObjectIntersectionOf(operands) => {
                operands.iter().all(|c| self.is_top(c))
            }
            ClassExpression::ObjectUnionOf(operands) => operands.iter().any(|c| self.is_top(c)),
            ClassExpression::ObjectAllValuesFrom { property, filler } => {
                !self.contains(property.named().iri()) || self.is_top(filler)
            }
            ClassExpression::ObjectMaxCardinality {
                property, filler, ..
            } => {
                !self.contains(property.named().iri())
                    || filler.as_deref().is_some_and(|c| self.is_bottom(c))
            }
            ClassExpression::ObjectMinCardinality { cardinality, .. }
            | ClassExpression::DataMinCardinality { cardinality, .. } => *cardinality == 0,
            ClassExpression::DataAllValuesFrom { property, .. }
            | ClassExpression::DataMaxCardinality { property, .. } => {
                !self.contains(property.iri())
            }
            ClassExpression::ObjectSomeValuesFrom { .. }
            | ClassExpression::ObjectHasValue { .. }
            | ClassExpression::ObjectExactCardinality { .. }
            | ClassExpression::DataSomeValuesFrom { .. }
            | ClassExpression::DataHasValue { .. }
            | ClassExpression::DataExactCardinality { .. } => false,
        }
    }
}
