//! OWL 2 ontology model for compiled term tables.
//!
//! This crate provides:
//! - Entities (classes, properties, individuals) and their kinds
//! - Class expressions, data ranges and axioms with their signatures
//! - [`OntologyModule`], a set of axioms kept in canonical order
//! - IRI resolution for CURIEs and OBO identifiers
//!
//! # Example
//! ```
//! use oxonto::{Axiom, ClassExpression, OntologyModule, OwlClass};
//! use oxrdf::NamedNode;
//!
//! let cell = OwlClass::new(NamedNode::new("http://purl.obolibrary.org/obo/CL_0000000")?);
//! let neuron = OwlClass::new(NamedNode::new("http://purl.obolibrary.org/obo/CL_0000540")?);
//!
//! let mut module = OntologyModule::new(None);
//! module.insert(Axiom::subclass_of(neuron, ClassExpression::from(cell)));
//! assert_eq!(module.len(), 1);
//! assert_eq!(module.signature().len(), 2);
//! # Result::<_, Box<dyn std::error::Error>>::Ok(())
//! ```

mod axiom;
mod entity;
mod error;
mod expression;
mod iri;
mod module;
mod signature;
pub mod vocab;

pub use axiom::{Axiom, PropertyCharacteristic};
pub use entity::{
    AnnotationProperty, DataProperty, Entity, EntityKind, Individual, ObjectProperty, OwlClass,
};
pub use error::{IdentifierError, UnknownNameError};
pub use expression::{ClassExpression, DataRange, ObjectPropertyExpression};
pub use iri::{IriResolver, PrefixMap, iri_to_obo_id, is_obo_id, obo_id_to_iri};
pub use module::OntologyModule;
pub use signature::Signature;
