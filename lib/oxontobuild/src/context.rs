use crate::error::BuildError;
use crate::record::{Provenance, TermRecord};
use crate::report::{BuildReport, ErrorKind};
use crate::resolver::LabelMap;
use oxonto::{Axiom, EntityKind, OntologyModule, Signature, vocab};
use oxrdf::NamedNode;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::mem::take;
use tracing::debug;

/// What the build knows about a locally declared entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermEntry {
    pub kind: EntityKind,
    pub label: Option<String>,
    /// The first record declaring the entity.
    pub provenance: Provenance,
}

/// A record whose identifier has been resolved in the declaration pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredRecord {
    pub iri: NamedNode,
    pub record: TermRecord,
    /// Distinguishes the anonymous individuals of this record from the ones of the other records.
    pub anonymous_scope: usize,
}

/// The state of one build.
///
/// The compiled ontology only grows: axioms are appended, never modified or removed.
#[derive(Debug)]
pub struct BuildContext {
    terms: BTreeMap<NamedNode, TermEntry>,
    tables: Vec<Vec<DeclaredRecord>>,
    labels: LabelMap,
    ontology: OntologyModule,
    first_references: BTreeMap<NamedNode, Provenance>,
    report: BuildReport,
    anonymous_counter: usize,
}

impl BuildContext {
    /// An empty context for the ontology `ontology_iri`.
    pub fn new(ontology_iri: NamedNode, version_iri: Option<NamedNode>) -> Self {
        let mut ontology = OntologyModule::new(Some(ontology_iri));
        ontology.set_version_iri(version_iri);
        Self {
            terms: BTreeMap::new(),
            tables: Vec::new(),
            labels: LabelMap::new(),
            ontology,
            first_references: BTreeMap::new(),
            report: BuildReport::new(),
            anonymous_counter: 0,
        }
    }

    /// The locally declared entity with this IRI.
    #[inline]
    pub fn term(&self, iri: &NamedNode) -> Option<&TermEntry> {
        self.terms.get(iri)
    }

    #[inline]
    pub fn terms(&self) -> &BTreeMap<NamedNode, TermEntry> {
        &self.terms
    }

    /// The declared records, grouped by source table.
    #[inline]
    pub fn tables(&self) -> &[Vec<DeclaredRecord>] {
        &self.tables
    }

    pub fn records(&self) -> impl Iterator<Item = &DeclaredRecord> {
        self.tables.iter().flatten()
    }

    /// The labels of the locally declared entities.
    #[inline]
    pub fn labels(&self) -> &LabelMap {
        &self.labels
    }

    #[inline]
    pub fn ontology(&self) -> &OntologyModule {
        &self.ontology
    }

    #[inline]
    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    /// The first record that referenced an IRI which is not declared locally.
    #[inline]
    pub fn first_reference(&self, iri: &NamedNode) -> Option<&Provenance> {
        self.first_references.get(iri)
    }

    /// The IRIs used by the compiled axioms that are neither declared locally nor built into the language.
    ///
    /// Annotation properties minted or declared by the compiler count as declared locally.
    pub fn external_signature(&self) -> Signature {
        self.ontology
            .signature()
            .iter()
            .filter(|iri| {
                !self.terms.contains_key(*iri)
                    && !self.ontology.declares(iri)
                    && !vocab::is_builtin(iri.as_str())
            })
            .cloned()
            .collect()
    }

    /// Moves the report out of the context.
    pub fn take_report(&mut self) -> BuildReport {
        take(&mut self.report)
    }

    pub fn into_ontology(self) -> OntologyModule {
        self.ontology
    }

    pub(crate) fn report_mut(&mut self) -> &mut BuildReport {
        &mut self.report
    }

    pub(crate) fn start_table(&mut self) {
        self.tables.push(Vec::new());
    }

    /// Registers a record declaring `iri`.
    ///
    /// A second record with the same kind and a compatible label is merged with the first one, with a warning.
    /// A different kind or a different label is a [`BuildError::DuplicateIri`].
    pub(crate) fn declare(&mut self, iri: NamedNode, record: TermRecord) -> Result<(), BuildError> {
        match self.terms.entry(iri.clone()) {
            Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                if existing.kind != record.kind {
                    return Err(BuildError::kind_conflict(
                        iri,
                        existing.kind,
                        record.kind,
                        existing.provenance.clone(),
                        record.provenance,
                    ));
                }
                if let (Some(first), Some(second)) = (&existing.label, &record.label) {
                    if first != second {
                        return Err(BuildError::duplicate(
                            iri,
                            format!("labelled '{first}' then '{second}'"),
                            existing.provenance.clone(),
                            record.provenance,
                        ));
                    }
                }
                if existing.label.is_none() {
                    if let Some(label) = &record.label {
                        existing.label = Some(label.clone());
                        self.labels.insert(label.as_str(), iri.clone());
                    }
                }
                let message = format!(
                    "{iri} is already declared at {}, the two records are merged",
                    existing.provenance
                );
                self.report.warning(
                    ErrorKind::DuplicateIri,
                    message,
                    Some(record.provenance.clone()),
                );
            }
            Entry::Vacant(entry) => {
                debug!(%iri, kind = %record.kind, provenance = %record.provenance, "declared");
                if let Some(label) = &record.label {
                    self.labels.insert(label.as_str(), iri.clone());
                }
                entry.insert(TermEntry {
                    kind: record.kind,
                    label: record.label.clone(),
                    provenance: record.provenance.clone(),
                });
            }
        }
        let anonymous_scope = self.anonymous_counter;
        self.anonymous_counter += 1;
        if self.tables.is_empty() {
            self.start_table();
        }
        if let Some(table) = self.tables.last_mut() {
            table.push(DeclaredRecord {
                iri,
                record,
                anonymous_scope,
            });
        }
        Ok(())
    }

    /// Appends an axiom to the compiled ontology.
    pub(crate) fn emit(&mut self, axiom: Axiom, provenance: &Provenance) {
        for iri in axiom.signature() {
            if !self.terms.contains_key(&iri) {
                self.first_references
                    .entry(iri)
                    .or_insert_with(|| provenance.clone());
            }
        }
        self.ontology.insert(axiom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Severity;

    fn record(kind: EntityKind, label: Option<&str>, row: usize) -> TermRecord {
        let record = TermRecord::new("OBTO:0001", kind, Provenance::new("terms.csv", row));
        match label {
            Some(label) => record.with_label(label),
            None => record,
        }
    }

    fn context() -> BuildContext {
        BuildContext::new(NamedNode::new_unchecked("http://example.org/o.owl"), None)
    }

    fn iri() -> NamedNode {
        NamedNode::new_unchecked("http://purl.obolibrary.org/obo/OBTO_0001")
    }

    #[test]
    fn compatible_duplicates_merge() {
        let mut context = context();
        context
            .declare(iri(), record(EntityKind::Class, None, 1))
            .unwrap();
        context
            .declare(iri(), record(EntityKind::Class, Some("leaf"), 2))
            .unwrap();
        assert_eq!(context.term(&iri()).unwrap().label.as_deref(), Some("leaf"));
        assert_eq!(context.labels().get("leaf").collect::<Vec<_>>(), [&iri()]);
        assert_eq!(context.records().count(), 2);
        assert_eq!(context.report().entries()[0].severity, Severity::Warning);
        assert_eq!(context.report().count(ErrorKind::DuplicateIri), 1);
    }

    #[test]
    fn conflicting_duplicates_fail() {
        let mut context = context();
        context
            .declare(iri(), record(EntityKind::Class, Some("leaf"), 1))
            .unwrap();
        assert!(matches!(
            context.declare(iri(), record(EntityKind::NamedIndividual, Some("leaf"), 2)),
            Err(BuildError::DuplicateIri { .. })
        ));
        assert!(matches!(
            context.declare(iri(), record(EntityKind::Class, Some("blade"), 3)),
            Err(BuildError::DuplicateIri { .. })
        ));
    }

    #[test]
    fn external_references() {
        let mut context = context();
        context
            .declare(iri(), record(EntityKind::Class, None, 1))
            .unwrap();
        let parent = NamedNode::new_unchecked("http://purl.obolibrary.org/obo/OBITO_0001");
        let provenance = Provenance::new("terms.csv", 1);
        context.emit(
            Axiom::subclass_of(
                oxonto::OwlClass::new(iri()),
                oxonto::OwlClass::new(parent.clone()),
            ),
            &provenance,
        );
        context.emit(
            Axiom::subclass_of(
                oxonto::OwlClass::new(iri()),
                oxonto::OwlClass::from(vocab::owl::THING),
            ),
            &Provenance::new("terms.csv", 9),
        );
        assert_eq!(
            context.external_signature().into_iter().collect::<Vec<_>>(),
            [parent.clone()]
        );
        assert_eq!(context.first_reference(&parent), Some(&provenance));
        assert_eq!(context.ontology().len(), 2);
    }
}
