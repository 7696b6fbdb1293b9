//! Expansion of CURIEs, OBO identifiers and relative IRIs.

use crate::error::IdentifierError;
use crate::vocab::{dc, obo, owl};
use oxiri::Iri;
use oxrdf::NamedNode;
use std::collections::BTreeMap;

/// Returns true if `id` is an OBO identifier like `PO:0000003` or `NCBI_Taxon:9606`.
pub fn is_obo_id(id: &str) -> bool {
    let Some((id_space, local)) = id.split_once(':') else {
        return false;
    };
    let mut parts = id_space.splitn(2, '_');
    parts.all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_alphabetic()))
        && !local.is_empty()
        && local.bytes().all(|b| b.is_ascii_digit())
}

/// Expands an OBO identifier into its PURL, e.g. `PO:0000003` into
/// `http://purl.obolibrary.org/obo/PO_0000003`.
pub fn obo_id_to_iri(id: &str) -> Option<NamedNode> {
    if !is_obo_id(id) {
        return None;
    }
    let (id_space, local) = id.split_once(':')?;
    Some(NamedNode::new_unchecked(format!(
        "{}{id_space}_{local}",
        obo::NAMESPACE
    )))
}

/// Compacts an OBO PURL back into an OBO identifier.
pub fn iri_to_obo_id(iri: &str) -> Option<String> {
    let (id_space, local) = iri.strip_prefix(obo::NAMESPACE)?.rsplit_once('_')?;
    let id = format!("{id_space}:{local}");
    is_obo_id(&id).then_some(id)
}

/// A mapping from CURIE prefixes to namespace IRIs.
///
/// The default map knows the `owl`, `rdf`, `rdfs`, `xsd`, `obo`, `dc`, `dcterms` and `skos` prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixMap {
    prefixes: BTreeMap<String, String>,
}

impl PrefixMap {
    /// A map without any prefix.
    pub fn empty() -> Self {
        Self {
            prefixes: BTreeMap::new(),
        }
    }

    /// Declares a prefix, replacing any previous namespace bound to it.
    pub fn insert(
        &mut self,
        prefix: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Result<(), IdentifierError> {
        let namespace = namespace.into();
        Iri::parse(namespace.as_str())
            .map_err(|error| IdentifierError::invalid_iri(namespace.clone(), error))?;
        self.prefixes.insert(prefix.into(), namespace);
        Ok(())
    }

    /// Returns the namespace bound to `prefix`.
    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    /// Iterates over `(prefix, namespace)` pairs in prefix order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes
            .iter()
            .map(|(prefix, namespace)| (prefix.as_str(), namespace.as_str()))
    }

    /// Expands a `prefix:local` CURIE.
    pub fn expand(&self, curie: &str) -> Result<NamedNode, IdentifierError> {
        let (prefix, local) = curie.split_once(':').unwrap_or(("", curie));
        let namespace = self
            .namespace(prefix)
            .ok_or_else(|| IdentifierError::UnknownPrefix {
                prefix: prefix.into(),
                identifier: curie.into(),
            })?;
        let iri = format!("{namespace}{local}");
        NamedNode::new(iri.as_str()).map_err(|error| IdentifierError::invalid_iri(iri, error))
    }
}

impl Default for PrefixMap {
    fn default() -> Self {
        Self {
            prefixes: [
                ("owl", owl::NAMESPACE),
                ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
                ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
                ("xsd", "http://www.w3.org/2001/XMLSchema#"),
                ("obo", obo::NAMESPACE),
                ("dc", dc::NAMESPACE),
                ("dcterms", "http://purl.org/dc/terms/"),
                ("skos", "http://www.w3.org/2004/02/skos/core#"),
            ]
            .into_iter()
            .map(|(prefix, namespace)| (prefix.to_owned(), namespace.to_owned()))
            .collect(),
        }
    }
}

/// Resolves the non-label identifier forms found in term tables into IRIs.
///
/// The accepted forms are tried in order:
/// 1. `<iri>`, resolved against the base IRI if relative
/// 2. OBO identifiers (`PO:0000003`)
/// 3. CURIEs with a declared prefix
/// 4. absolute IRIs written without brackets (`http://...`, `urn:...`)
/// 5. anything else without a colon, resolved against the base IRI
#[derive(Debug, Clone)]
pub struct IriResolver {
    base: Iri<String>,
    prefixes: PrefixMap,
}

impl IriResolver {
    pub fn new(base_iri: &str, prefixes: PrefixMap) -> Result<Self, IdentifierError> {
        let base = Iri::parse(base_iri.to_owned())
            .map_err(|error| IdentifierError::invalid_iri(base_iri, error))?;
        Ok(Self { base, prefixes })
    }

    #[inline]
    pub fn base_iri(&self) -> &str {
        self.base.as_str()
    }

    #[inline]
    pub fn prefixes(&self) -> &PrefixMap {
        &self.prefixes
    }

    pub fn resolve(&self, identifier: &str) -> Result<NamedNode, IdentifierError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(IdentifierError::Empty);
        }
        if let Some(inner) = identifier
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
        {
            return self.resolve_relative(inner);
        }
        if let Some(iri) = obo_id_to_iri(identifier) {
            return Ok(iri);
        }
        match identifier.split_once(':') {
            Some((prefix, _)) if self.prefixes.namespace(prefix).is_some() => {
                self.prefixes.expand(identifier)
            }
            Some(_) if identifier.contains("://") || identifier.starts_with("urn:") => {
                NamedNode::new(identifier)
                    .map_err(|error| IdentifierError::invalid_iri(identifier, error))
            }
            Some((prefix, _)) => Err(IdentifierError::UnknownPrefix {
                prefix: prefix.into(),
                identifier: identifier.into(),
            }),
            None => self.resolve_relative(identifier),
        }
    }

    fn resolve_relative(&self, iri: &str) -> Result<NamedNode, IdentifierError> {
        let resolved = self
            .base
            .resolve(iri)
            .map_err(|error| IdentifierError::invalid_iri(iri, error))?;
        Ok(NamedNode::new_unchecked(resolved.into_inner()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> IriResolver {
        let mut prefixes = PrefixMap::default();
        prefixes
            .insert("ex", "http://example.org/terms#")
            .unwrap();
        IriResolver::new("http://example.org/ontology/", prefixes).unwrap()
    }

    #[test]
    fn obo_ids() {
        assert!(is_obo_id("PO:0000003"));
        assert!(is_obo_id("NCBI_Taxon:9606"));
        assert!(!is_obo_id("PO:00a"));
        assert!(!is_obo_id("PO_0000003"));
        assert!(!is_obo_id(":0001"));
        assert_eq!(
            obo_id_to_iri("PO:0000003").unwrap().as_str(),
            "http://purl.obolibrary.org/obo/PO_0000003"
        );
        assert_eq!(
            iri_to_obo_id("http://purl.obolibrary.org/obo/NCBI_Taxon_9606").as_deref(),
            Some("NCBI_Taxon:9606")
        );
        assert_eq!(iri_to_obo_id("http://example.org/PO_1"), None);
    }

    #[test]
    fn identifier_forms() {
        let resolver = resolver();
        assert_eq!(
            resolver.resolve("OBTO:0010").unwrap().as_str(),
            "http://purl.obolibrary.org/obo/OBTO_0010"
        );
        assert_eq!(
            resolver.resolve("ex:Leaf").unwrap().as_str(),
            "http://example.org/terms#Leaf"
        );
        assert_eq!(
            resolver.resolve("<http://other.org/x>").unwrap().as_str(),
            "http://other.org/x"
        );
        assert_eq!(
            resolver.resolve("<local>").unwrap().as_str(),
            "http://example.org/ontology/local"
        );
        assert_eq!(
            resolver.resolve(" leaf ").unwrap().as_str(),
            "http://example.org/ontology/leaf"
        );
        assert_eq!(
            resolver.resolve("http://other.org/y").unwrap().as_str(),
            "http://other.org/y"
        );
        assert!(matches!(
            resolver.resolve("nope:thing"),
            Err(IdentifierError::UnknownPrefix { prefix, .. }) if prefix == "nope"
        ));
        assert!(matches!(resolver.resolve("  "), Err(IdentifierError::Empty)));
    }

    #[test]
    fn invalid_namespace() {
        let mut prefixes = PrefixMap::empty();
        assert!(prefixes.insert("bad", "not an iri").is_err());
        assert_eq!(prefixes.iter().count(), 0);
    }
}
