//! OWL 2 entity types (classes, properties, individuals).

use crate::error::UnknownNameError;
use oxrdf::{BlankNode, NamedNode, NamedNodeRef};
use std::fmt;
use std::str::FromStr;

macro_rules! named_entity {
    ($(#[$attr:meta])* $name:ident, $keyword:literal) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(NamedNode);

        impl $name {
            #[doc = concat!("Creates a new ", $keyword, " from a named node.")]
            #[inline]
            pub fn new(iri: NamedNode) -> Self {
                Self(iri)
            }

            #[doc = concat!("Creates a new ", $keyword, " from an IRI string.")]
            #[inline]
            pub fn new_from_iri(iri: impl Into<String>) -> Result<Self, oxiri::IriParseError> {
                Ok(Self(NamedNode::new(iri)?))
            }

            /// Returns the IRI of this entity.
            #[inline]
            pub fn iri(&self) -> &NamedNode {
                &self.0
            }

            /// Converts this entity into its underlying named node.
            #[inline]
            pub fn into_inner(self) -> NamedNode {
                self.0
            }
        }

        impl fmt::Display for $name {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<NamedNode> for $name {
            #[inline]
            fn from(node: NamedNode) -> Self {
                Self(node)
            }
        }

        impl From<NamedNodeRef<'_>> for $name {
            #[inline]
            fn from(node: NamedNodeRef<'_>) -> Self {
                Self(node.into_owned())
            }
        }

        impl From<$name> for NamedNode {
            #[inline]
            fn from(entity: $name) -> Self {
                entity.0
            }
        }

        impl AsRef<NamedNode> for $name {
            #[inline]
            fn as_ref(&self) -> &NamedNode {
                &self.0
            }
        }
    };
}

named_entity!(
    /// An OWL class (owl:Class).
    ///
    /// Classes are sets of individuals. Every class is a subclass of owl:Thing
    /// and a superclass of owl:Nothing.
    OwlClass,
    "class"
);

named_entity!(
    /// An OWL object property (owl:ObjectProperty).
    ///
    /// Object properties relate individuals to individuals.
    ObjectProperty,
    "object property"
);

named_entity!(
    /// An OWL data property (owl:DatatypeProperty).
    ///
    /// Data properties relate individuals to literals.
    DataProperty,
    "data property"
);

named_entity!(
    /// An OWL annotation property (owl:AnnotationProperty).
    AnnotationProperty,
    "annotation property"
);

/// An OWL individual, either named or anonymous.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Individual {
    /// A named individual (owl:NamedIndividual).
    Named(NamedNode),
    /// An anonymous individual.
    Anonymous(BlankNode),
}

impl Individual {
    /// Returns true if this is a named individual.
    #[inline]
    pub fn is_named(&self) -> bool {
        matches!(self, Self::Named(_))
    }

    /// Returns the IRI if this is a named individual.
    #[inline]
    pub fn as_named(&self) -> Option<&NamedNode> {
        match self {
            Self::Named(n) => Some(n),
            Self::Anonymous(_) => None,
        }
    }
}

impl fmt::Display for Individual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(n) => write!(f, "{n}"),
            Self::Anonymous(b) => write!(f, "{b}"),
        }
    }
}

impl From<NamedNode> for Individual {
    #[inline]
    fn from(node: NamedNode) -> Self {
        Self::Named(node)
    }
}

impl From<BlankNode> for Individual {
    #[inline]
    fn from(node: BlankNode) -> Self {
        Self::Anonymous(node)
    }
}

/// The kind of a declared entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    Class,
    ObjectProperty,
    DataProperty,
    AnnotationProperty,
    NamedIndividual,
}

impl EntityKind {
    /// The name used for this kind in term tables.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::ObjectProperty => "object property",
            Self::DataProperty => "data property",
            Self::AnnotationProperty => "annotation property",
            Self::NamedIndividual => "individual",
        }
    }

    /// Returns true for the three property kinds.
    pub const fn is_property(self) -> bool {
        matches!(
            self,
            Self::ObjectProperty | Self::DataProperty | Self::AnnotationProperty
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityKind {
    type Err = UnknownNameError;

    /// Parses the kinds written in term tables, ignoring case, spaces and underscores.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let normalized = name
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();
        Ok(match normalized.as_str() {
            "class" | "owlclass" => Self::Class,
            "objectproperty" | "owlobjectproperty" => Self::ObjectProperty,
            "dataproperty" | "datatypeproperty" | "owldatatypeproperty" => Self::DataProperty,
            "annotationproperty" | "owlannotationproperty" => Self::AnnotationProperty,
            "individual" | "namedindividual" | "owlnamedindividual" => Self::NamedIndividual,
            _ => return Err(UnknownNameError::new("entity kind", name)),
        })
    }
}

/// A declared entity: a kind attached to an IRI.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Entity {
    Class(OwlClass),
    ObjectProperty(ObjectProperty),
    DataProperty(DataProperty),
    AnnotationProperty(AnnotationProperty),
    NamedIndividual(NamedNode),
}

impl Entity {
    /// Builds the entity of the given kind.
    pub fn new(kind: EntityKind, iri: NamedNode) -> Self {
        match kind {
            EntityKind::Class => Self::Class(OwlClass(iri)),
            EntityKind::ObjectProperty => Self::ObjectProperty(ObjectProperty(iri)),
            EntityKind::DataProperty => Self::DataProperty(DataProperty(iri)),
            EntityKind::AnnotationProperty => Self::AnnotationProperty(AnnotationProperty(iri)),
            EntityKind::NamedIndividual => Self::NamedIndividual(iri),
        }
    }

    #[inline]
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Class(_) => EntityKind::Class,
            Self::ObjectProperty(_) => EntityKind::ObjectProperty,
            Self::DataProperty(_) => EntityKind::DataProperty,
            Self::AnnotationProperty(_) => EntityKind::AnnotationProperty,
            Self::NamedIndividual(_) => EntityKind::NamedIndividual,
        }
    }

    #[inline]
    pub fn iri(&self) -> &NamedNode {
        match self {
            Self::Class(e) => e.iri(),
            Self::ObjectProperty(e) => e.iri(),
            Self::DataProperty(e) => e.iri(),
            Self::AnnotationProperty(e) => e.iri(),
            Self::NamedIndividual(iri) => iri,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self {
            Self::Class(_) => "Class",
            Self::ObjectProperty(_) => "ObjectProperty",
            Self::DataProperty(_) => "DataProperty",
            Self::AnnotationProperty(_) => "AnnotationProperty",
            Self::NamedIndividual(_) => "NamedIndividual",
        };
        write!(f, "{keyword}({})", self.iri())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owl_class() {
        let iri = NamedNode::new_unchecked("http://example.org/Person");
        let class = OwlClass::new(iri.clone());
        assert_eq!(class.iri(), &iri);
        assert_eq!(class.to_string(), iri.to_string());
        assert_eq!(NamedNode::from(class), iri);
    }

    #[test]
    fn test_individual() {
        let iri = NamedNode::new_unchecked("http://example.org/Alice");
        let named = Individual::from(iri.clone());
        assert!(named.is_named());
        assert_eq!(named.as_named(), Some(&iri));

        let anonymous = Individual::from(BlankNode::default());
        assert!(!anonymous.is_named());
        assert_eq!(anonymous.as_named(), None);
    }

    #[test]
    fn test_entity_kind_names() {
        assert_eq!("class".parse::<EntityKind>().ok(), Some(EntityKind::Class));
        assert_eq!(
            "Object Property".parse::<EntityKind>().ok(),
            Some(EntityKind::ObjectProperty)
        );
        assert_eq!(
            "owl:DatatypeProperty".replace(':', "").parse::<EntityKind>().ok(),
            Some(EntityKind::DataProperty)
        );
        assert_eq!(
            "named_individual".parse::<EntityKind>().ok(),
            Some(EntityKind::NamedIndividual)
        );
        assert!("datatype".parse::<EntityKind>().is_err());
        assert!(EntityKind::DataProperty.is_property());
        assert!(!EntityKind::NamedIndividual.is_property());
    }

    #[test]
    fn test_entity() {
        let iri = NamedNode::new_unchecked("http://example.org/partOf");
        let entity = Entity::new(EntityKind::ObjectProperty, iri.clone());
        assert_eq!(entity.kind(), EntityKind::ObjectProperty);
        assert_eq!(entity.iri(), &iri);
        assert_eq!(
            entity.to_string(),
            "ObjectProperty(<http://example.org/partOf>)"
        );
    }
}
