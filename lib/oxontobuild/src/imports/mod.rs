//! Import closure: the modules of the source ontologies needed by the compiled terms.

mod catalog;
mod extractor;
mod locality;
mod terms;

pub use catalog::Catalog;
pub use extractor::ModuleExtractor;
pub use locality::is_local;
pub use terms::{ExtractionMethod, ImportTerm, RelatedType};

use crate::error::ConfigError;
use oxonto::{OntologyModule, Signature};
use oxrdf::NamedNode;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Computes the import modules for a seed signature.
///
/// The result only depends on the seed, the catalog and the explicit import terms: sources are processed
/// in parallel but merged in name order.
///
/// ```
/// use oxonto::{Axiom, Entity, EntityKind, OntologyModule, Signature};
/// use oxontobuild::imports::{Catalog, ImportClosureBuilder};
/// use oxrdf::NamedNode;
///
/// let term = NamedNode::new("http://purl.obolibrary.org/obo/PO_0025034")?;
/// let mut po = OntologyModule::new(None);
/// po.insert(Axiom::declaration(Entity::new(EntityKind::Class, term.clone())));
/// let catalog = [("po", po)].into_iter().collect::<Catalog>();
///
/// let seed = [term].into_iter().collect::<Signature>();
/// let closure = ImportClosureBuilder::new(&catalog).build(&seed)?;
/// assert_eq!(closure.modules()["po"].len(), 1);
/// assert!(closure.missing().is_empty());
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub struct ImportClosureBuilder<'a> {
    catalog: &'a Catalog,
    module_base: Option<String>,
    terms: BTreeMap<String, Vec<ImportTerm>>,
}

impl<'a> ImportClosureBuilder<'a> {
    /// A builder extracting modules from every source of `catalog`.
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            module_base: None,
            terms: BTreeMap::new(),
        }
    }

    /// Names the modules `{module_base}{source}_import_module.owl`.
    #[must_use]
    pub fn with_module_base(mut self, module_base: impl Into<String>) -> Self {
        self.module_base = Some(module_base.into());
        self
    }

    /// Adds terms explicitly requested from the `source` ontology.
    #[must_use]
    pub fn with_terms(
        mut self,
        source: impl Into<String>,
        terms: impl IntoIterator<Item = ImportTerm>,
    ) -> Self {
        self.terms.entry(source.into()).or_default().extend(terms);
        self
    }

    pub fn build(&self, seed: &Signature) -> Result<ImportClosure, ConfigError> {
        if let Some(unknown) = self.terms.keys().find(|name| !self.catalog.contains(name)) {
            return Err(ConfigError::UnknownSource(unknown.clone()));
        }
        let mut sources = self
            .catalog
            .iter()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|(name, ontology)| {
                let ontology = ontology.as_ref();
                let extractor = ModuleExtractor::new(ontology);
                let requested = RequestedTerms::new(
                    &extractor,
                    self.terms
                        .get(name)
                        .map(Vec::as_slice)
                        .unwrap_or_default(),
                );
                Source {
                    name,
                    ontology,
                    explicit: requested.explicit_signature(&extractor),
                    extractor,
                    requested,
                    routed: None,
                    module: BTreeSet::new(),
                }
            })
            .collect::<Vec<_>>();

        // A source is seeded with the terms the other sources need from it, so extraction is repeated until
        // no seed changes and references between the sources close.
        loop {
            let contributions = sources.iter().map(Source::contribution).collect::<Vec<_>>();
            let changed = sources
                .par_iter_mut()
                .enumerate()
                .map(|(i, source)| {
                    let signature = source.ontology.signature();
                    let mut routed = seed.intersection(signature);
                    for (j, contribution) in contributions.iter().enumerate() {
                        if j != i {
                            routed.union_with(&contribution.intersection(signature));
                        }
                    }
                    routed.union_with(&source.requested.locality);
                    if source.routed.as_ref() == Some(&routed) {
                        return false;
                    }
                    source.module = source.extractor.extract(&routed);
                    source.routed = Some(routed);
                    true
                })
                .reduce(|| false, |a, b| a || b);
            if !changed {
                break;
            }
        }

        let mut modules = BTreeMap::new();
        for source in &sources {
            let module = self.module(source);
            debug!(source = source.name, axioms = module.len(), "import module extracted");
            if !module.is_empty() {
                modules.insert(source.name.to_owned(), module);
            }
        }
        let mut missing = seed
            .iter()
            .filter(|iri| {
                !self
                    .catalog
                    .iter()
                    .any(|(_, ontology)| ontology.signature().contains(iri))
            })
            .cloned()
            .collect::<Signature>();
        for source in &sources {
            for term in self.terms.get(source.name).into_iter().flatten() {
                if !source.ontology.signature().contains(term.iri()) {
                    missing.insert(term.iri().clone());
                }
            }
        }
        Ok(ImportClosure { modules, missing })
    }

    fn module(&self, source: &Source<'_>) -> OntologyModule {
        let iri = self.module_base.as_ref().map(|base| {
            NamedNode::new_unchecked(format!("{base}{}_import_module.owl", source.name))
        });
        let mut module = OntologyModule::new(iri);
        module.set_source(
            source
                .ontology
                .version_iri()
                .or_else(|| source.ontology.iri())
                .cloned(),
        );
        for id in source.module.iter().chain(&source.requested.axioms) {
            if let Some(axiom) = source.extractor.axiom(*id) {
                module.insert(axiom.clone());
            }
        }
        if !source.requested.excluded.is_empty() {
            let excluded = &source.requested.excluded;
            module.retain(|axiom| !axiom.signature().intersects(excluded));
        }
        module
    }
}

struct Source<'a> {
    name: &'a str,
    ontology: &'a OntologyModule,
    extractor: ModuleExtractor<'a>,
    requested: RequestedTerms,
    /// The signature of the explicitly requested axioms.
    explicit: Signature,
    /// The seed of the last extraction.
    routed: Option<Signature>,
    module: BTreeSet<usize>,
}

impl Source<'_> {
    /// The terms this source needs, from itself or from the other sources.
    fn contribution(&self) -> Signature {
        let mut signature = self.explicit.clone();
        for id in &self.module {
            if let Some(axiom_signature) = self.extractor.signature(*id) {
                signature.union_with(axiom_signature);
            }
        }
        signature
    }
}

/// The explicit import terms of a source, after following their relationships.
#[derive(Default)]
struct RequestedTerms {
    /// Terms joining the locality seed.
    locality: Signature,
    /// Axioms kept whatever the locality seed: traversed relationships and single extractions.
    axioms: BTreeSet<usize>,
    excluded: Signature,
}

impl RequestedTerms {
    fn new(extractor: &ModuleExtractor<'_>, terms: &[ImportTerm]) -> Self {
        let mut requested = Self::default();
        let mut single = Signature::new();
        for term in terms {
            let (axioms, reached) = extractor.related(term.iri(), term.related());
            if term.is_excluded() {
                requested.excluded.union_with(&reached);
                continue;
            }
            requested.axioms.extend(axioms);
            match term.method() {
                ExtractionMethod::Locality => {
                    requested.locality.union_with(&reached);
                }
                ExtractionMethod::Single => {
                    single.union_with(&reached);
                }
            }
        }
        requested.axioms.extend(extractor.extract_single(&single));
        requested
    }

    /// The signature of the axioms kept whatever the locality seed.
    fn explicit_signature(&self, extractor: &ModuleExtractor<'_>) -> Signature {
        let mut signature = self.locality.clone();
        for id in &self.axioms {
            if let Some(axiom_signature) = extractor.signature(*id) {
                signature.union_with(axiom_signature);
            }
        }
        signature
    }
}

/// The import modules of a build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportClosure {
    modules: BTreeMap<String, OntologyModule>,
    missing: Signature,
}

impl ImportClosure {
    /// The non-empty modules, by source name.
    #[inline]
    pub fn modules(&self) -> &BTreeMap<String, OntologyModule> {
        &self.modules
    }

    /// The seed IRIs no source ontology uses.
    #[inline]
    pub fn missing(&self) -> &Signature {
        &self.missing
    }

    /// The union of the module signatures.
    pub fn signature(&self) -> Signature {
        let mut signature = Signature::new();
        for module in self.modules.values() {
            signature.union_with(module.signature());
        }
        signature
    }

    pub fn into_modules(self) -> BTreeMap<String, OntologyModule> {
        self.modules
    }
}
