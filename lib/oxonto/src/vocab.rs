//! IRIs of the vocabularies the compiler emits or recognizes.

/// [OWL 2](https://www.w3.org/TR/owl2-syntax/) vocabulary.
pub mod owl {
    use oxrdf::NamedNodeRef;

    /// The OWL namespace.
    pub const NAMESPACE: &str = "http://www.w3.org/2002/07/owl#";
    /// The class of all individuals.
    pub const THING: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Thing");
    /// The empty class.
    pub const NOTHING: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#Nothing");
}

/// Vocabulary of the [OBO Foundry](https://obofoundry.org/) ontologies.
pub mod obo {
    use oxrdf::NamedNodeRef;

    /// The namespace OBO identifiers expand into.
    pub const NAMESPACE: &str = "http://purl.obolibrary.org/obo/";
    /// IAO:0000115, the textual definition annotation property.
    pub const DEFINITION: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://purl.obolibrary.org/obo/IAO_0000115");
}

/// [Dublin Core](https://www.dublincore.org/specifications/dublin-core/dcmi-terms/) elements.
pub mod dc {
    use oxrdf::NamedNodeRef;

    /// The namespace of the Dublin Core elements.
    pub const NAMESPACE: &str = "http://purl.org/dc/elements/1.1/";
    /// A related resource from which the described resource is derived.
    pub const SOURCE: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://purl.org/dc/elements/1.1/source");
}

/// Namespaces whose terms are part of the modelling language itself and never need importing.
pub const BUILTIN_NAMESPACES: [&str; 4] = [
    owl::NAMESPACE,
    "http://www.w3.org/1999/02/22-rdf-syntax-ns#",
    "http://www.w3.org/2000/01/rdf-schema#",
    "http://www.w3.org/2001/XMLSchema#",
];

/// Returns true if the IRI belongs to one of the [`BUILTIN_NAMESPACES`].
pub fn is_builtin(iri: &str) -> bool {
    BUILTIN_NAMESPACES
        .iter()
        .any(|namespace| iri.starts_with(namespace))
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::vocab::{rdfs, xsd};

    #[test]
    fn builtin_namespaces() {
        assert!(is_builtin(owl::THING.as_str()));
        assert!(is_builtin(rdfs::LABEL.as_str()));
        assert!(is_builtin(xsd::STRING.as_str()));
        assert!(!is_builtin(obo::DEFINITION.as_str()));
        assert!(!is_builtin(dc::SOURCE.as_str()));
    }
}
