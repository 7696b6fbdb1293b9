//! OWL 2 axiom types.
//!
//! Axioms are the basic statements in an OWL 2 ontology.

use crate::entity::{AnnotationProperty, DataProperty, Entity, Individual, ObjectProperty};
use crate::error::UnknownNameError;
use crate::expression::{ClassExpression, DataRange, ObjectPropertyExpression, write_list};
use crate::signature::Signature;
use oxrdf::{Literal, NamedNode};
use std::fmt;
use std::str::FromStr;

/// An OWL 2 axiom.
///
/// Axioms print in OWL functional syntax. That text is also their canonical key, see [`Axiom::canonical_key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Axiom {
    // === Declaration and Annotation Axioms ===

    /// Declaration(Class(C)), Declaration(ObjectProperty(P))...
    Declaration(Entity),

    /// AnnotationAssertion(P, s, v)
    AnnotationAssertion {
        property: AnnotationProperty,
        subject: NamedNode,
        value: Literal,
    },

    /// SubAnnotationPropertyOf(sub, super)
    SubAnnotationPropertyOf {
        sub_property: AnnotationProperty,
        super_property: AnnotationProperty,
    },

    // === Class Axioms ===

    /// SubClassOf(sub, super) - sub is a subclass of super
    SubClassOf {
        sub_class: ClassExpression,
        super_class: ClassExpression,
    },

    /// EquivalentClasses(C1, C2, ...) - all classes are equivalent
    EquivalentClasses(Vec<ClassExpression>),

    /// DisjointClasses(C1, C2, ...) - classes have no common instances
    DisjointClasses(Vec<ClassExpression>),

    // === Object Property Axioms ===

    /// SubObjectPropertyOf(sub, super)
    SubObjectPropertyOf {
        sub_property: ObjectPropertyExpression,
        super_property: ObjectPropertyExpression,
    },

    /// EquivalentObjectProperties(P1, P2, ...)
    EquivalentObjectProperties(Vec<ObjectProperty>),

    /// DisjointObjectProperties(P1, P2, ...)
    DisjointObjectProperties(Vec<ObjectProperty>),

    /// ObjectPropertyDomain(P, C) - domain of P is C
    ObjectPropertyDomain {
        property: ObjectProperty,
        domain: ClassExpression,
    },

    /// ObjectPropertyRange(P, C) - range of P is C
    ObjectPropertyRange {
        property: ObjectProperty,
        range: ClassExpression,
    },

    /// InverseObjectProperties(P1, P2)
    InverseObjectProperties(ObjectProperty, ObjectProperty),

    /// FunctionalObjectProperty(P)
    FunctionalObjectProperty(ObjectProperty),

    /// InverseFunctionalObjectProperty(P)
    InverseFunctionalObjectProperty(ObjectProperty),

    /// ReflexiveObjectProperty(P)
    ReflexiveObjectProperty(ObjectProperty),

    /// IrreflexiveObjectProperty(P)
    IrreflexiveObjectProperty(ObjectProperty),

    /// SymmetricObjectProperty(P)
    SymmetricObjectProperty(ObjectProperty),

    /// AsymmetricObjectProperty(P)
    AsymmetricObjectProperty(ObjectProperty),

    /// TransitiveObjectProperty(P)
    TransitiveObjectProperty(ObjectProperty),

    // === Data Property Axioms ===

    /// SubDataPropertyOf(sub, super)
    SubDataPropertyOf {
        sub_property: DataProperty,
        super_property: DataProperty,
    },

    /// EquivalentDataProperties(P1, P2, ...)
    EquivalentDataProperties(Vec<DataProperty>),

    /// DisjointDataProperties(P1, P2, ...)
    DisjointDataProperties(Vec<DataProperty>),

    /// DataPropertyDomain(P, C)
    DataPropertyDomain {
        property: DataProperty,
        domain: ClassExpression,
    },

    /// DataPropertyRange(P, D)
    DataPropertyRange {
        property: DataProperty,
        range: DataRange,
    },

    /// FunctionalDataProperty(P)
    FunctionalDataProperty(DataProperty),

    // === Individual Axioms (Assertions) ===

    /// ClassAssertion(C, a) - a is an instance of C
    ClassAssertion {
        class: ClassExpression,
        individual: Individual,
    },

    /// ObjectPropertyAssertion(P, a, b) - (a, b) is in P
    ObjectPropertyAssertion {
        property: ObjectProperty,
        source: Individual,
        target: Individual,
    },

    /// NegativeObjectPropertyAssertion(P, a, b) - (a, b) is NOT in P
    NegativeObjectPropertyAssertion {
        property: ObjectProperty,
        source: Individual,
        target: Individual,
    },

    /// DataPropertyAssertion(P, a, v) - (a, v) is in P
    DataPropertyAssertion {
        property: DataProperty,
        source: Individual,
        target: Literal,
    },

    /// NegativeDataPropertyAssertion(P, a, v)
    NegativeDataPropertyAssertion {
        property: DataProperty,
        source: Individual,
        target: Literal,
    },
}

impl Axiom {
    /// Creates a Declaration axiom.
    pub fn declaration(entity: Entity) -> Self {
        Self::Declaration(entity)
    }

    /// Creates an AnnotationAssertion axiom.
    pub fn annotation(
        property: impl Into<AnnotationProperty>,
        subject: NamedNode,
        value: Literal,
    ) -> Self {
        Self::AnnotationAssertion {
            property: property.into(),
            subject,
            value,
        }
    }

    /// Creates a SubClassOf axiom.
    pub fn subclass_of(sub: impl Into<ClassExpression>, sup: impl Into<ClassExpression>) -> Self {
        Self::SubClassOf {
            sub_class: sub.into(),
            super_class: sup.into(),
        }
    }

    /// Creates a ClassAssertion axiom.
    pub fn class_assertion(
        class: impl Into<ClassExpression>,
        individual: impl Into<Individual>,
    ) -> Self {
        Self::ClassAssertion {
            class: class.into(),
            individual: individual.into(),
        }
    }

    /// Creates an EquivalentClasses axiom with its operands in canonical order.
    pub fn equivalent_classes(classes: Vec<ClassExpression>) -> Self {
        Self::EquivalentClasses(canonical_operands(classes))
    }

    /// Creates a DisjointClasses axiom with its operands in canonical order.
    pub fn disjoint_classes(classes: Vec<ClassExpression>) -> Self {
        Self::DisjointClasses(canonical_operands(classes))
    }

    /// Creates an EquivalentObjectProperties axiom with its operands in canonical order.
    pub fn equivalent_object_properties(properties: Vec<ObjectProperty>) -> Self {
        Self::EquivalentObjectProperties(canonical_operands(properties))
    }

    /// Creates a DisjointObjectProperties axiom with its operands in canonical order.
    pub fn disjoint_object_properties(properties: Vec<ObjectProperty>) -> Self {
        Self::DisjointObjectProperties(canonical_operands(properties))
    }

    /// Creates an EquivalentDataProperties axiom with its operands in canonical order.
    pub fn equivalent_data_properties(properties: Vec<DataProperty>) -> Self {
        Self::EquivalentDataProperties(canonical_operands(properties))
    }

    /// Creates a DisjointDataProperties axiom with its operands in canonical order.
    pub fn disjoint_data_properties(properties: Vec<DataProperty>) -> Self {
        Self::DisjointDataProperties(canonical_operands(properties))
    }

    /// Creates an InverseObjectProperties axiom, ordering the pair canonically.
    pub fn inverse_object_properties(first: ObjectProperty, second: ObjectProperty) -> Self {
        if second < first {
            Self::InverseObjectProperties(second, first)
        } else {
            Self::InverseObjectProperties(first, second)
        }
    }

    /// The key axioms are sorted and compared by in ontology modules.
    pub fn canonical_key(&self) -> String {
        self.to_string()
    }

    /// Returns true for declarations and annotation axioms, which carry no logical meaning.
    pub fn is_annotation(&self) -> bool {
        matches!(
            self,
            Self::Declaration(_)
                | Self::AnnotationAssertion { .. }
                | Self::SubAnnotationPropertyOf { .. }
        )
    }

    /// The IRIs of all entities this axiom references.
    pub fn signature(&self) -> Signature {
        let mut signature = Signature::new();
        self.collect_signature(&mut signature);
        signature
    }

    /// Adds the IRIs of all entities this axiom references to `signature`.
    pub fn collect_signature(&self, signature: &mut Signature) {
        match self {
            Self::Declaration(entity) => {
                signature.insert(entity.iri().clone());
            }
            Self::AnnotationAssertion {
                property, subject, ..
            } => {
                signature.insert(property.iri().clone());
                signature.insert(subject.clone());
            }
            Self::SubAnnotationPropertyOf {
                sub_property,
                super_property,
            } => {
                signature.insert(sub_property.iri().clone());
                signature.insert(super_property.iri().clone());
            }
            Self::SubClassOf {
                sub_class,
                super_class,
            } => {
                sub_class.collect_signature(signature);
                super_class.collect_signature(signature);
            }
            Self::EquivalentClasses(classes) | Self::DisjointClasses(classes) => {
                for class in classes {
                    class.collect_signature(signature);
                }
            }
            Self::SubObjectPropertyOf {
                sub_property,
                super_property,
            } => {
                signature.insert(sub_property.named().iri().clone());
                signature.insert(super_property.named().iri().clone());
            }
            Self::EquivalentObjectProperties(properties)
            | Self::DisjointObjectProperties(properties) => {
                signature.extend(properties.iter().map(|p| p.iri().clone()));
            }
            Self::ObjectPropertyDomain {
                property,
                domain: class,
            }
            | Self::ObjectPropertyRange {
                property,
                range: class,
            } => {
                signature.insert(property.iri().clone());
                class.collect_signature(signature);
            }
            Self::InverseObjectProperties(first, second) => {
                signature.insert(first.iri().clone());
                signature.insert(second.iri().clone());
            }
            Self::FunctionalObjectProperty(property)
            | Self::InverseFunctionalObjectProperty(property)
            | Self::ReflexiveObjectProperty(property)
            | Self::IrreflexiveObjectProperty(property)
            | Self::SymmetricObjectProperty(property)
            | Self::AsymmetricObjectProperty(property)
            | Self::TransitiveObjectProperty(property) => {
                signature.insert(property.iri().clone());
            }
            Self::SubDataPropertyOf {
                sub_property,
                super_property,
            } => {
                signature.insert(sub_property.iri().clone());
                signature.insert(super_property.iri().clone());
            }
            Self::EquivalentDataProperties(properties)
            | Self::DisjointDataProperties(properties) => {
                signature.extend(properties.iter().map(|p| p.iri().clone()));
            }
            Self::DataPropertyDomain { property, domain } => {
                signature.insert(property.iri().clone());
                domain.collect_signature(signature);
            }
            Self::DataPropertyRange { property, range } => {
                signature.insert(property.iri().clone());
                range.collect_signature(signature);
            }
            Self::FunctionalDataProperty(property) => {
                signature.insert(property.iri().clone());
            }
            Self::ClassAssertion { class, individual } => {
                class.collect_signature(signature);
                collect_individual(individual, signature);
            }
            Self::ObjectPropertyAssertion {
                property,
                source,
                target,
            }
            | Self::NegativeObjectPropertyAssertion {
                property,
                source,
                target,
            } => {
                signature.insert(property.iri().clone());
                collect_individual(source, signature);
                collect_individual(target, signature);
            }
            Self::DataPropertyAssertion {
                property, source, ..
            }
            | Self::NegativeDataPropertyAssertion {
                property, source, ..
            } => {
                signature.insert(property.iri().clone());
                collect_individual(source, signature);
            }
        }
    }
}

impl fmt::Display for Axiom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declaration(entity) => write!(f, "Declaration({entity})"),
            Self::AnnotationAssertion {
                property,
                subject,
                value,
            } => write!(f, "AnnotationAssertion({property} {subject} {value})"),
            Self::SubAnnotationPropertyOf {
                sub_property,
                super_property,
            } => write!(
                f,
                "SubAnnotationPropertyOf({sub_property} {super_property})"
            ),
            Self::SubClassOf {
                sub_class,
                super_class,
            } => write!(f, "SubClassOf({sub_class} {super_class})"),
            Self::EquivalentClasses(classes) => write_list(f, "EquivalentClasses", classes),
            Self::DisjointClasses(classes) => write_list(f, "DisjointClasses", classes),
            Self::SubObjectPropertyOf {
                sub_property,
                super_property,
            } => write!(f, "SubObjectPropertyOf({sub_property} {super_property})"),
            Self::EquivalentObjectProperties(properties) => {
                write_list(f, "EquivalentObjectProperties", properties)
            }
            Self::DisjointObjectProperties(properties) => {
                write_list(f, "DisjointObjectProperties", properties)
            }
            Self::ObjectPropertyDomain { property, domain } => {
                write!(f, "ObjectPropertyDomain({property} {domain})")
            }
            Self::ObjectPropertyRange { property, range } => {
                write!(f, "ObjectPropertyRange({property} {range})")
            }
            Self::InverseObjectProperties(first, second) => {
                write!(f, "InverseObjectProperties({first} {second})")
            }
            Self::FunctionalObjectProperty(p) => write!(f, "FunctionalObjectProperty({p})"),
            Self::InverseFunctionalObjectProperty(p) => {
                write!(f, "InverseFunctionalObjectProperty({p})")
            }
            Self::ReflexiveObjectProperty(p) => write!(f, "ReflexiveObjectProperty({p})"),
            Self::IrreflexiveObjectProperty(p) => write!(f, "IrreflexiveObjectProperty({p})"),
            Self::SymmetricObjectProperty(p) => write!(f, "SymmetricObjectProperty({p})"),
            Self::AsymmetricObjectProperty(p) => write!(f, "AsymmetricObjectProperty({p})"),
            Self::TransitiveObjectProperty(p) => write!(f, "TransitiveObjectProperty({p})"),
            Self::SubDataPropertyOf {
                sub_property,
                super_property,
            } => write!(f, "SubDataPropertyOf({sub_property} {super_property})"),
            Self::EquivalentDataProperties(properties) => {
                write_list(f, "EquivalentDataProperties", properties)
            }
            Self::DisjointDataProperties(properties) => {
                write_list(f, "DisjointDataProperties", properties)
            }
            Self::DataPropertyDomain { property, domain } => {
                write!(f, "DataPropertyDomain({property} {domain})")
            }
            Self::DataPropertyRange { property, range } => {
                write!(f, "DataPropertyRange({property} {range})")
            }
            Self::FunctionalDataProperty(p) => write!(f, "FunctionalDataProperty({p})"),
            Self::ClassAssertion { class, individual } => {
                write!(f, "ClassAssertion({class} {individual})")
            }
            Self::ObjectPropertyAssertion {
                property,
                source,
                target,
            } => write!(f, "ObjectPropertyAssertion({property} {source} {target})"),
            Self::NegativeObjectPropertyAssertion {
                property,
                source,
                target,
            } => write!(
                f,
                "NegativeObjectPropertyAssertion({property} {source} {target})"
            ),
            Self::DataPropertyAssertion {
                property,
                source,
                target,
            } => write!(f, "DataPropertyAssertion({property} {source} {target})"),
            Self::NegativeDataPropertyAssertion {
                property,
                source,
                target,
            } => write!(
                f,
                "NegativeDataPropertyAssertion({property} {source} {target})"
            ),
        }
    }
}

/// A characteristic that can be asserted about a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropertyCharacteristic {
    Functional,
    InverseFunctional,
    Reflexive,
    Irreflexive,
    Symmetric,
    Asymmetric,
    Transitive,
}

impl PropertyCharacteristic {
    /// The axiom asserting this characteristic for an object property.
    pub fn object_property_axiom(self, property: ObjectProperty) -> Axiom {
        match self {
            Self::Functional => Axiom::FunctionalObjectProperty(property),
            Self::InverseFunctional => Axiom::InverseFunctionalObjectProperty(property),
            Self::Reflexive => Axiom::ReflexiveObjectProperty(property),
            Self::Irreflexive => Axiom::IrreflexiveObjectProperty(property),
            Self::Symmetric => Axiom::SymmetricObjectProperty(property),
            Self::Asymmetric => Axiom::AsymmetricObjectProperty(property),
            Self::Transitive => Axiom::TransitiveObjectProperty(property),
        }
    }

    /// The axiom asserting this characteristic for a data property.
    ///
    /// Only functionality applies to data properties.
    pub fn data_property_axiom(self, property: DataProperty) -> Option<Axiom> {
        matches!(self, Self::Functional).then(|| Axiom::FunctionalDataProperty(property))
    }

    /// The characteristic asserted by `axiom`, if it is a characteristic axiom.
    pub fn of_axiom(axiom: &Axiom) -> Option<Self> {
        Some(match axiom {
            Axiom::FunctionalObjectProperty(_) | Axiom::FunctionalDataProperty(_) => {
                Self::Functional
            }
            Axiom::InverseFunctionalObjectProperty(_) => Self::InverseFunctional,
            Axiom::ReflexiveObjectProperty(_) => Self::Reflexive,
            Axiom::IrreflexiveObjectProperty(_) => Self::Irreflexive,
            Axiom::SymmetricObjectProperty(_) => Self::Symmetric,
            Axiom::AsymmetricObjectProperty(_) => Self::Asymmetric,
            Axiom::TransitiveObjectProperty(_) => Self::Transitive,
            _ => return None,
        })
    }
}

impl FromStr for PropertyCharacteristic {
    type Err = UnknownNameError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let normalized = name
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();
        Ok(match normalized.as_str() {
            "functional" => Self::Functional,
            "inversefunctional" => Self::InverseFunctional,
            "reflexive" => Self::Reflexive,
            "irreflexive" => Self::Irreflexive,
            "symmetric" => Self::Symmetric,
            "asymmetric" => Self::Asymmetric,
            "transitive" => Self::Transitive,
            _ => return Err(UnknownNameError::new("property characteristic", name)),
        })
    }
}

fn collect_individual(individual: &Individual, signature: &mut Signature) {
    if let Individual::Named(iri) = individual {
        signature.insert(iri.clone());
    }
}

/// Sorts n-ary operands by their functional syntax and drops duplicates.
fn canonical_operands<T: fmt::Display>(operands: Vec<T>) -> Vec<T> {
    let mut keyed = operands
        .into_iter()
        .map(|operand| (operand.to_string(), operand))
        .collect::<Vec<_>>();
    keyed.sort_by(|(a, _), (b, _)| a.cmp(b));
    keyed.dedup_by(|(a, _), (b, _)| a == b);
    keyed.into_iter().map(|(_, operand)| operand).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityKind, OwlClass};

    fn iri(name: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.org/{name}"))
    }

    fn class(name: &str) -> ClassExpression {
        ClassExpression::class(iri(name))
    }

    #[test]
    fn disjoint_operands_are_canonical() {
        let a = Axiom::disjoint_classes(vec![class("B"), class("A")]);
        let b = Axiom::disjoint_classes(vec![class("A"), class("B"), class("A")]);
        assert_eq!(a, b);
        assert_eq!(
            a.to_string(),
            "DisjointClasses(<http://example.org/A> <http://example.org/B>)"
        );
    }

    #[test]
    fn signature_skips_anonymous_individuals() {
        let axiom = Axiom::ObjectPropertyAssertion {
            property: ObjectProperty::new(iri("knows")),
            source: Individual::Named(iri("alice")),
            target: Individual::Anonymous(oxrdf::BlankNode::default()),
        };
        let signature = axiom.signature();
        assert_eq!(signature.len(), 2);
        assert!(signature.contains(&iri("alice")));
    }

    #[test]
    fn declaration_signature() {
        let axiom = Axiom::declaration(Entity::new(EntityKind::Class, iri("A")));
        assert!(axiom.is_annotation());
        assert_eq!(axiom.signature().len(), 1);
        assert_eq!(
            axiom.canonical_key(),
            "Declaration(Class(<http://example.org/A>))"
        );
        let subclass = Axiom::subclass_of(OwlClass::new(iri("A")), class("B"));
        assert!(!subclass.is_annotation());
    }

    #[test]
    fn characteristics() {
        let property = ObjectProperty::new(iri("partOf"));
        let characteristic = "Inverse functional"
            .parse::<PropertyCharacteristic>()
            .ok();
        assert_eq!(characteristic, Some(PropertyCharacteristic::InverseFunctional));
        let axiom = PropertyCharacteristic::Transitive.object_property_axiom(property);
        assert_eq!(
            PropertyCharacteristic::of_axiom(&axiom),
            Some(PropertyCharacteristic::Transitive)
        );
        assert!(
            PropertyCharacteristic::Symmetric
                .data_property_axiom(DataProperty::new(iri("age")))
                .is_none()
        );
        assert!("commutative".parse::<PropertyCharacteristic>().is_err());
    }
}
