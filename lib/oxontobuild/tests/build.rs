//! End-to-end builds.

use oxonto::{Axiom, Entity, EntityKind, OntologyModule, OwlClass};
use oxontobuild::imports::Catalog;
use oxontobuild::reasoner::{ReasonerAdapter, ReasonerError, ReasonerVerdict};
use oxontobuild::{
    BuildConfig, BuildInput, BuildOrchestrator, BuildOutcome, BuildState, ErrorKind, MemorySink,
    OutputFormat, Provenance, ReasonerKind, Severity, SourceTable, TermRecord,
};
use oxrdf::NamedNode;
use std::time::Duration;

fn obo(id: &str) -> NamedNode {
    NamedNode::new(format!("http://purl.obolibrary.org/obo/{id}")).unwrap()
}

fn config() -> BuildConfig {
    BuildConfig::new("http://purl.obolibrary.org/obo/obto/")
}

fn record(id: &str, kind: EntityKind, row: usize) -> TermRecord {
    TermRecord::new(id, kind, Provenance::new("terms.csv", row))
}

fn input(records: impl IntoIterator<Item = TermRecord>) -> BuildInput {
    let mut table = SourceTable::new("terms.csv");
    for record in records {
        table.push(record);
    }
    BuildInput::new([table])
}

fn run(config: BuildConfig, catalog: Catalog, input: &BuildInput) -> BuildOutcome {
    BuildOrchestrator::from_config(config, catalog)
        .unwrap()
        .run(input, &mut MemorySink::new())
}

/// Two disjoint classes and a third class below both of them.
fn unsatisfiable_input() -> BuildInput {
    input([
        record("OBTO:0001", EntityKind::Class, 2),
        record("OBTO:0002", EntityKind::Class, 3).with_disjoint("OBTO:0001"),
        record("OBTO:0003", EntityKind::Class, 4).with_parent("OBTO:0001; OBTO:0002"),
    ])
}

struct FixedReasoner(fn() -> Result<ReasonerVerdict, ReasonerError>);

impl ReasonerAdapter for FixedReasoner {
    fn name(&self) -> &str {
        "fixed"
    }

    fn check(&self, _: &OntologyModule) -> Result<ReasonerVerdict, ReasonerError> {
        (self.0)()
    }
}

#[test]
fn test_config_from_json() {
    let config: BuildConfig = serde_json::from_str(
        r#"{
            "base_iri": "http://purl.obolibrary.org/obo/obto/",
            "version": "2024-05-01",
            "version_iri_pattern": "releases/{version}/obto.owl",
            "output_formats": ["turtle", "obo"],
            "reasoner": "elk",
            "reasoner_timeout_secs": 60,
            "unsatisfiable_severity": "error",
            "import_catalog": {"po": "imports/po.owl"},
            "prefixes": {"ex": "http://example.org/"}
        }"#,
    )
    .unwrap();
    assert_eq!(
        config.output_formats.iter().copied().collect::<Vec<_>>(),
        [OutputFormat::Turtle, OutputFormat::Obo]
    );
    assert_eq!(config.reasoner, ReasonerKind::Elk);
    assert_eq!(config.unsatisfiable_severity, Severity::Error);
    assert_eq!(config.reasoner_config().timeout, Some(Duration::from_secs(60)));
    assert!(!config.strict_mode);
    assert!(!config.merge_imports);
    assert_eq!(
        config.max_expression_depth,
        BuildConfig::default().max_expression_depth
    );
    let settings = config.validate().unwrap();
    assert_eq!(
        settings.version_iri.unwrap().as_str(),
        "http://purl.obolibrary.org/obo/obto/releases/2024-05-01/obto.owl"
    );

    assert!(serde_json::from_str::<BuildConfig>(r#"{"base": "http://example.org/"}"#).is_err());
    assert!(serde_json::from_str::<BuildConfig>(r#"{"reasoner": "fact++"}"#).is_err());
    assert_eq!(
        serde_json::from_str::<BuildConfig>("{}").unwrap(),
        BuildConfig::default()
    );
}

#[test]
fn test_inconsistent_ontology_fails() {
    let outcome = run(
        config(),
        Catalog::new(),
        &input([
            record("OBTO:0001", EntityKind::Class, 2),
            record("OBTO:0002", EntityKind::Class, 3).with_disjoint("OBTO:0001"),
            record("OBTO:0100", EntityKind::NamedIndividual, 4)
                .with_parent("OBTO:0001; OBTO:0002"),
        ]),
    );
    assert_eq!(outcome.state(), BuildState::Failed);
    assert_eq!(
        &outcome.states()[outcome.states().len() - 2..],
        [BuildState::Reasoning, BuildState::Failed]
    );
    assert!(outcome.ontology().is_none());
    assert!(!outcome.verdict().unwrap().consistent);
    assert_eq!(outcome.report().count(ErrorKind::Inconsistency), 1);
    assert!(outcome.report().has_errors());
}

#[test]
fn test_reasoner_failures() {
    let timeout = BuildOrchestrator::new(
        config(),
        Catalog::new(),
        Box::new(FixedReasoner(|| {
            Err(ReasonerError::Timeout(Duration::from_secs(5)))
        })),
    )
    .run(&unsatisfiable_input(), &mut MemorySink::new());
    assert_eq!(timeout.state(), BuildState::Failed);
    assert!(timeout.verdict().is_none());
    assert_eq!(timeout.report().count(ErrorKind::ReasonerTimeout), 1);

    let crash = BuildOrchestrator::new(
        config(),
        Catalog::new(),
        Box::new(FixedReasoner(|| {
            Err(ReasonerError::Backend("out of memory".into()))
        })),
    )
    .run(&unsatisfiable_input(), &mut MemorySink::new());
    assert_eq!(crash.state(), BuildState::Failed);
    assert_eq!(crash.report().count(ErrorKind::ReasonerFailure), 1);

    // only the verdict of the adapter counts
    let trusting = BuildOrchestrator::new(
        config(),
        Catalog::new(),
        Box::new(FixedReasoner(|| Ok(ReasonerVerdict::consistent()))),
    )
    .run(&unsatisfiable_input(), &mut MemorySink::new());
    assert_eq!(trusting.state(), BuildState::Done);
    assert!(trusting.report().is_empty());
}

#[test]
fn test_unsatisfiable_classes() {
    let lenient = run(config(), Catalog::new(), &unsatisfiable_input());
    assert_eq!(lenient.state(), BuildState::Done);
    let entries = lenient.report().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].severity, Severity::Warning);
    assert_eq!(entries[0].kind, ErrorKind::Inconsistency);
    assert!(entries[0].message.contains("OBTO_0003"));
    assert_eq!(
        lenient.verdict().unwrap().unsatisfiable.iter().collect::<Vec<_>>(),
        [&obo("OBTO_0003")]
    );

    let mut config = config();
    config.unsatisfiable_severity = Severity::Error;
    let strict = run(config, Catalog::new(), &unsatisfiable_input());
    assert_eq!(strict.state(), BuildState::Failed);
    assert_eq!(strict.report().count(ErrorKind::Inconsistency), 1);
    assert!(strict.report().has_errors());
}

#[test]
fn test_strict_mode_promotes_reasoner_warnings() {
    let mut config = config();
    config.strict_mode = true;
    let outcome = run(config, Catalog::new(), &unsatisfiable_input());
    assert_eq!(outcome.state(), BuildState::Failed);
    assert!(outcome.states().contains(&BuildState::Reasoning));
    assert!(!outcome.states().contains(&BuildState::Merging));
    let entries = outcome.report().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].severity, Severity::Error);
}

#[test]
fn test_merged_imports_and_inferred_axioms() {
    let plant_structure = OwlClass::new(obo("PO_0009011"));
    let plant_entity = OwlClass::new(obo("PO_0025131"));
    let mut po = OntologyModule::new(Some(obo("po.owl")));
    po.extend([
        Axiom::declaration(Entity::new(EntityKind::Class, obo("PO_0009011"))),
        Axiom::declaration(Entity::new(EntityKind::Class, obo("PO_0025131"))),
        Axiom::subclass_of(plant_structure.clone(), plant_entity.clone()),
    ]);
    let catalog = [("po", po)].into_iter().collect::<Catalog>();
    let input = input([record("OBTO:0001", EntityKind::Class, 2).with_parent("PO:0009011")]);

    let mut config = config();
    config.merge_imports = true;
    config.add_inferred = true;
    config.output_formats = [OutputFormat::Turtle, OutputFormat::OwlXml].into();
    let mut sink = MemorySink::new();
    let outcome = BuildOrchestrator::from_config(config, catalog.clone())
        .unwrap()
        .run(&input, &mut sink);
    assert_eq!(outcome.state(), BuildState::Done);
    let ontology = outcome.ontology().unwrap();
    assert_eq!(ontology.imports().count(), 0);
    assert!(ontology.contains(&Axiom::subclass_of(
        plant_structure.clone(),
        plant_entity.clone()
    )));
    assert!(ontology.contains(&Axiom::subclass_of(
        OwlClass::new(obo("OBTO_0001")),
        plant_entity.clone()
    )));
    assert_eq!(sink.len(), 2);
    assert_eq!(sink.ontology(OutputFormat::OwlXml), Some(ontology));
    assert_eq!(sink.modules(OutputFormat::Turtle).map(|m| m.len()), Some(1));

    // by default, the module is only imported
    let outcome = run(BuildConfig::new("http://purl.obolibrary.org/obo/obto/"), catalog, &input);
    let ontology = outcome.ontology().unwrap();
    assert_eq!(ontology.imports().count(), 1);
    assert!(!ontology.contains(&Axiom::subclass_of(plant_structure, plant_entity)));
    assert_eq!(ontology.len(), 2);
}

#[test]
fn test_report_as_json() {
    let outcome = run(
        config(),
        Catalog::new(),
        &input([record("OBTO:0001", EntityKind::Class, 2).with_parent("'no such label'")]),
    );
    assert_eq!(outcome.state(), BuildState::Done);
    let report = serde_json::to_value(outcome.report()).unwrap();
    let entries = report.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["severity"], "warning");
    assert_eq!(entries[0]["kind"], "UnresolvedReferenceError");
    assert_eq!(entries[0]["provenance"]["source"], "terms.csv");
    assert_eq!(entries[0]["provenance"]["row"], 2);
}

#[test]
fn test_strict_mode_stops_after_compiling() {
    let mut config = config();
    config.strict_mode = true;
    let outcome = run(
        config,
        Catalog::new(),
        &input([
            record("OBTO:0001", EntityKind::Class, 2).with_label("leaf"),
            record("OBTO:0002", EntityKind::Class, 3).with_parent("'no such label'"),
        ]),
    );
    assert_eq!(outcome.state(), BuildState::Failed);
    assert_eq!(
        outcome.states(),
        [
            BuildState::Idle,
            BuildState::Loading,
            BuildState::Compiling,
            BuildState::Failed,
        ]
    );
    let entries = outcome.report().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].severity, Severity::Error);
    assert_eq!(entries[0].kind, ErrorKind::UnresolvedReference);
    assert_eq!(entries[0].provenance, Some(Provenance::new("terms.csv", 3)));
}

#[test]
fn test_annotation_columns_are_not_imported() {
    let record = TermRecord::from_columns(
        [
            ("ID", "OBTO:0001"),
            ("Type", "class"),
            ("Label", "leaf"),
            ("Text Definition", "A lateral outgrowth of a stem."),
            ("Editor note", "check me"),
        ],
        None,
        Provenance::new("terms.csv", 2),
    )
    .unwrap();
    let mut config = config();
    config.strict_mode = true;
    let outcome = run(config, Catalog::new(), &input([record]));
    assert_eq!(outcome.state(), BuildState::Done);
    assert!(outcome.report().is_empty(), "{}", outcome.report());
    assert!(outcome.imports().is_empty());
    let ontology = outcome.ontology().unwrap();
    assert!(ontology.declares(&obo("obto/editor_note")));
    assert!(ontology.declares(&obo("IAO_0000115")));
    assert_eq!(ontology.imports().count(), 0);
}
