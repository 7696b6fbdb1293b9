//! OWL 2 class expressions, object property expressions, and data ranges.

use crate::entity::{DataProperty, Individual, ObjectProperty, OwlClass};
use crate::signature::Signature;
use oxrdf::{Literal, NamedNode};
use std::fmt;

/// An OWL 2 class expression.
///
/// Class expressions describe sets of individuals through various constructors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClassExpression {
    /// A named class (atomic class)
    Class(OwlClass),

    /// ObjectIntersectionOf(C1, ..., Cn) - intersection of classes
    ObjectIntersectionOf(Vec<ClassExpression>),

    /// ObjectUnionOf(C1, ..., Cn) - union of classes
    ObjectUnionOf(Vec<ClassExpression>),

    /// ObjectComplementOf(C) - complement of a class
    ObjectComplementOf(Box<ClassExpression>),

    /// ObjectSomeValuesFrom(P, C) - existential restriction
    ObjectSomeValuesFrom {
        property: ObjectPropertyExpression,
        filler: Box<ClassExpression>,
    },

    /// ObjectAllValuesFrom(P, C) - universal restriction
    ObjectAllValuesFrom {
        property: ObjectPropertyExpression,
        filler: Box<ClassExpression>,
    },

    /// ObjectHasValue(P, a) - has-value restriction
    ObjectHasValue {
        property: ObjectPropertyExpression,
        individual: Individual,
    },

    /// ObjectMinCardinality(n, P) or ObjectMinCardinality(n, P, C)
    ObjectMinCardinality {
        cardinality: u32,
        property: ObjectPropertyExpression,
        filler: Option<Box<ClassExpression>>,
    },

    /// ObjectMaxCardinality(n, P) or ObjectMaxCardinality(n, P, C)
    ObjectMaxCardinality {
        cardinality: u32,
        property: ObjectPropertyExpression,
        filler: Option<Box<ClassExpression>>,
    },

    /// ObjectExactCardinality(n, P) or ObjectExactCardinality(n, P, C)
    ObjectExactCardinality {
        cardinality: u32,
        property: ObjectPropertyExpression,
        filler: Option<Box<ClassExpression>>,
    },

    /// DataSomeValuesFrom(P, D) - existential data restriction
    DataSomeValuesFrom {
        property: DataProperty,
        filler: DataRange,
    },

    /// DataAllValuesFrom(P, D) - universal data restriction
    DataAllValuesFrom {
        property: DataProperty,
        filler: DataRange,
    },

    /// DataHasValue(P, v) - has-value data restriction
    DataHasValue {
        property: DataProperty,
        value: Literal,
    },

    /// DataMinCardinality(n, P) or DataMinCardinality(n, P, D)
    DataMinCardinality {
        cardinality: u32,
        property: DataProperty,
        filler: Option<DataRange>,
    },

    /// DataMaxCardinality(n, P) or DataMaxCardinality(n, P, D)
    DataMaxCardinality {
        cardinality: u32,
        property: DataProperty,
        filler: Option<DataRange>,
    },

    /// DataExactCardinality(n, P) or DataExactCardinality(n, P, D)
    DataExactCardinality {
        cardinality: u32,
        property: DataProperty,
        filler: Option<DataRange>,
    },
}

impl ClassExpression {
    /// Creates a named class expression.
    pub fn class(c: impl Into<OwlClass>) -> Self {
        Self::Class(c.into())
    }

    /// Creates the complement of a class expression.
    pub fn complement(c: Self) -> Self {
        Self::ObjectComplementOf(Box::new(c))
    }

    /// Creates an existential restriction.
    pub fn some_values_from(property: impl Into<ObjectPropertyExpression>, filler: Self) -> Self {
        Self::ObjectSomeValuesFrom {
            property: property.into(),
            filler: Box::new(filler),
        }
    }

    /// Creates a universal restriction.
    pub fn all_values_from(property: impl Into<ObjectPropertyExpression>, filler: Self) -> Self {
        Self::ObjectAllValuesFrom {
            property: property.into(),
            filler: Box::new(filler),
        }
    }

    /// Returns true if this is a named class.
    pub fn is_named(&self) -> bool {
        matches!(self, Self::Class(_))
    }

    /// Returns the named class if this is one.
    pub fn as_class(&self) -> Option<&OwlClass> {
        match self {
            Self::Class(c) => Some(c),
            _ => None,
        }
    }

    /// Adds every entity IRI used in this expression to `signature`.
    pub fn collect_signature(&self, signature: &mut Signature) {
        match self {
            Self::Class(c) => {
                signature.insert(c.iri().clone());
            }
            Self::ObjectIntersectionOf(operands) | Self::ObjectUnionOf(operands) => {
                for operand in operands {
                    operand.collect_signature(signature);
                }
            }
            Self::ObjectComplementOf(inner) => inner.collect_signature(signature),
            Self::ObjectSomeValuesFrom { property, filler }
            | Self::ObjectAllValuesFrom { property, filler } => {
                signature.insert(property.named().iri().clone());
                filler.collect_signature(signature);
            }
            Self::ObjectHasValue {
                property,
                individual,
            } => {
                signature.insert(property.named().iri().clone());
                if let Individual::Named(iri) = individual {
                    signature.insert(iri.clone());
                }
            }
            Self::ObjectMinCardinality {
                property, filler, ..
            }
            | Self::ObjectMaxCardinality {
                property, filler, ..
            }
            | Self::ObjectExactCardinality {
                property, filler, ..
            } => {
                signature.insert(property.named().iri().clone());
                if let Some(filler) = filler {
                    filler.collect_signature(signature);
                }
            }
            Self::DataSomeValuesFrom { property, filler }
            | Self::DataAllValuesFrom { property, filler } => {
                signature.insert(property.iri().clone());
                filler.collect_signature(signature);
            }
            Self::DataHasValue { property, .. } => {
                signature.insert(property.iri().clone());
            }
            Self::DataMinCardinality {
                property, filler, ..
            }
            | Self::DataMaxCardinality {
                property, filler, ..
            }
            | Self::DataExactCardinality {
                property, filler, ..
            } => {
                signature.insert(property.iri().clone());
                if let Some(filler) = filler {
                    filler.collect_signature(signature);
                }
            }
        }
    }
}

impl From<OwlClass> for ClassExpression {
    fn from(c: OwlClass) -> Self {
        Self::Class(c)
    }
}

impl fmt::Display for ClassExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(c) => write!(f, "{c}"),
            Self::ObjectIntersectionOf(operands) => {
                write_list(f, "ObjectIntersectionOf", operands)
            }
            Self::ObjectUnionOf(operands) => write_list(f, "ObjectUnionOf", operands),
            Self::ObjectComplementOf(inner) => write!(f, "ObjectComplementOf({inner})"),
            Self::ObjectSomeValuesFrom { property, filler } => {
                write!(f, "ObjectSomeValuesFrom({property} {filler})")
            }
            Self::ObjectAllValuesFrom { property, filler } => {
                write!(f, "ObjectAllValuesFrom({property} {filler})")
            }
            Self::ObjectHasValue {
                property,
                individual,
            } => write!(f, "ObjectHasValue({property} {individual})"),
            Self::ObjectMinCardinality {
                cardinality,
                property,
                filler,
            } => write_cardinality(f, "ObjectMinCardinality", *cardinality, property, filler),
            Self::ObjectMaxCardinality {
                cardinality,
                property,
                filler,
            } => write_cardinality(f, "ObjectMaxCardinality", *cardinality, property, filler),
            Self::ObjectExactCardinality {
                cardinality,
                property,
                filler,
            } => write_cardinality(f, "ObjectExactCardinality", *cardinality, property, filler),
            Self::DataSomeValuesFrom { property, filler } => {
                write!(f, "DataSomeValuesFrom({property} {filler})")
            }
            Self::DataAllValuesFrom { property, filler } => {
                write!(f, "DataAllValuesFrom({property} {filler})")
            }
            Self::DataHasValue { property, value } => {
                write!(f, "DataHasValue({property} {value})")
            }
            Self::DataMinCardinality {
                cardinality,
                property,
                filler,
            } => write_cardinality(f, "DataMinCardinality", *cardinality, property, filler),
            Self::DataMaxCardinality {
                cardinality,
                property,
                filler,
            } => write_cardinality(f, "DataMaxCardinality", *cardinality, property, filler),
            Self::DataExactCardinality {
                cardinality,
                property,
                filler,
            } => write_cardinality(f, "DataExactCardinality", *cardinality, property, filler),
        }
    }
}

/// An OWL 2 object property expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectPropertyExpression {
    /// A named object property
    ObjectProperty(ObjectProperty),

    /// ObjectInverseOf(P) - inverse of a property
    ObjectInverseOf(ObjectProperty),
}

impl ObjectPropertyExpression {
    /// Creates an inverse property expression.
    pub fn inverse(property: ObjectProperty) -> Self {
        Self::ObjectInverseOf(property)
    }

    /// Returns true if this is a named property.
    pub fn is_named(&self) -> bool {
        matches!(self, Self::ObjectProperty(_))
    }

    /// Returns the named property, removing the inverse if present.
    pub fn named(&self) -> &ObjectProperty {
        match self {
            Self::ObjectProperty(p) | Self::ObjectInverseOf(p) => p,
        }
    }
}

impl From<ObjectProperty> for ObjectPropertyExpression {
    fn from(p: ObjectProperty) -> Self {
        Self::ObjectProperty(p)
    }
}

impl fmt::Display for ObjectPropertyExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ObjectProperty(p) => write!(f, "{p}"),
            Self::ObjectInverseOf(p) => write!(f, "ObjectInverseOf({p})"),
        }
    }
}

/// An OWL 2 data range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataRange {
    /// A named datatype (e.g., xsd:string)
    Datatype(NamedNode),

    /// DataIntersectionOf(D1, ..., Dn)
    DataIntersectionOf(Vec<DataRange>),

    /// DataUnionOf(D1, ..., Dn)
    DataUnionOf(Vec<DataRange>),

    /// DataComplementOf(D)
    DataComplementOf(Box<DataRange>),
}

impl DataRange {
    /// Creates a datatype data range.
    pub fn datatype(dt: impl Into<NamedNode>) -> Self {
        Self::Datatype(dt.into())
    }

    /// Returns the datatype if this is a simple datatype.
    pub fn as_datatype(&self) -> Option<&NamedNode> {
        match self {
            Self::Datatype(dt) => Some(dt),
            _ => None,
        }
    }

    /// Adds the datatype IRIs used in this range to `signature`.
    pub fn collect_signature(&self, signature: &mut Signature) {
        match self {
            Self::Datatype(dt) => {
                signature.insert(dt.clone());
            }
            Self::DataIntersectionOf(operands) | Self::DataUnionOf(operands) => {
                for operand in operands {
                    operand.collect_signature(signature);
                }
            }
            Self::DataComplementOf(inner) => inner.collect_signature(signature),
        }
    }
}

impl From<NamedNode> for DataRange {
    fn from(node: NamedNode) -> Self {
        Self::Datatype(node)
    }
}

impl fmt::Display for DataRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Datatype(dt) => write!(f, "{dt}"),
            Self::DataIntersectionOf(operands) => write_list(f, "DataIntersectionOf", operands),
            Self::DataUnionOf(operands) => write_list(f, "DataUnionOf", operands),
            Self::DataComplementOf(inner) => write!(f, "DataComplementOf({inner})"),
        }
    }
}

pub(crate) fn write_list<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    operands: &[T],
) -> fmt::Result {
    write!(f, "{name}(")?;
    for (i, operand) in operands.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{operand}")?;
    }
    f.write_str(")")
}

fn write_cardinality<P: fmt::Display, F: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    cardinality: u32,
    property: &P,
    filler: &Option<F>,
) -> fmt::Result {
    write!(f, "{name}({cardinality} {property}")?;
    if let Some(filler) = filler {
        write!(f, " {filler}")?;
    }
    f.write_str(")")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str) -> ClassExpression {
        ClassExpression::class(NamedNode::new_unchecked(format!("http://example.org/{name}")))
    }

    fn property(name: &str) -> ObjectProperty {
        ObjectProperty::new(NamedNode::new_unchecked(format!("http://example.org/{name}")))
    }

    #[test]
    fn nested_signature() {
        let expression = ClassExpression::ObjectIntersectionOf(vec![
            class("A"),
            ClassExpression::some_values_from(
                ObjectPropertyExpression::inverse(property("partOf")),
                ClassExpression::complement(class("B")),
            ),
        ]);
        let mut signature = Signature::new();
        expression.collect_signature(&mut signature);
        assert_eq!(signature.len(), 3);
        assert!(signature.contains(property("partOf").iri()));
    }

    #[test]
    fn functional_syntax() {
        let expression = ClassExpression::ObjectExactCardinality {
            cardinality: 2,
            property: property("hasPart").into(),
            filler: Some(Box::new(class("Leaf"))),
        };
        assert_eq!(
            expression.to_string(),
            "ObjectExactCardinality(2 <http://example.org/hasPart> <http://example.org/Leaf>)"
        );
        assert_eq!(
            ClassExpression::ObjectUnionOf(vec![class("A"), class("B")]).to_string(),
            "ObjectUnionOf(<http://example.org/A> <http://example.org/B>)"
        );
    }
}
