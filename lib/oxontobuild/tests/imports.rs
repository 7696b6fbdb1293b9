//! Import closure extraction.

use oxonto::{Axiom, ClassExpression, Entity, EntityKind, ObjectProperty, OntologyModule, OwlClass, Signature};
use oxontobuild::imports::{
    Catalog, ExtractionMethod, ImportClosure, ImportClosureBuilder, ImportTerm, RelatedType,
};
use oxrdf::vocab::rdfs;
use oxrdf::{Literal, NamedNode};

fn obo(id: &str) -> NamedNode {
    NamedNode::new(format!("http://purl.obolibrary.org/obo/{id}")).unwrap()
}

fn declaration(id: &str) -> Axiom {
    Axiom::declaration(Entity::new(EntityKind::Class, obo(id)))
}

fn subclass(sub: &str, sup: &str) -> Axiom {
    Axiom::subclass_of(OwlClass::new(obo(sub)), OwlClass::new(obo(sup)))
}

fn label(id: &str, label: &str) -> Axiom {
    Axiom::annotation(rdfs::LABEL, obo(id), Literal::new_simple_literal(label))
}

fn seed(ids: &[&str]) -> Signature {
    ids.iter().map(|id| obo(id)).collect()
}

/// A small anatomy ontology.
fn obito() -> OntologyModule {
    let mut ontology = OntologyModule::new(Some(obo("obito.owl")));
    ontology.set_version_iri(Some(obo("obito/2024-01-01/obito.owl")));
    ontology.extend([
        declaration("OBITO_0001"),
        declaration("OBITO_0002"),
        declaration("OBITO_0003"),
        declaration("OBITO_0004"),
        label("OBITO_0002", "leaf"),
        subclass("OBITO_0002", "OBITO_0001"),
        subclass("OBITO_0003", "OBITO_0002"),
        subclass("OBITO_0004", "OBITO_0003"),
        Axiom::disjoint_classes(vec![
            OwlClass::new(obo("OBITO_0002")).into(),
            OwlClass::new(obo("OBITO_0004")).into(),
        ]),
    ]);
    ontology
}

fn build(catalog: &Catalog, seed: &Signature) -> ImportClosure {
    ImportClosureBuilder::new(catalog)
        .with_module_base("http://purl.obolibrary.org/obo/obto/imports/")
        .build(seed)
        .unwrap()
}

#[test]
fn test_seed_without_references_keeps_only_its_declaration() {
    let catalog = [("obito", obito())].into_iter().collect::<Catalog>();
    let closure = build(&catalog, &seed(&["OBITO_0001"]));
    let module = &closure.modules()["obito"];
    assert_eq!(module.axioms().collect::<Vec<_>>(), [&declaration("OBITO_0001")]);
    assert_eq!(
        module.iri(),
        Some(&NamedNode::new("http://purl.obolibrary.org/obo/obto/imports/obito_import_module.owl").unwrap())
    );
    assert_eq!(module.source(), Some(&obo("obito/2024-01-01/obito.owl")));
    assert!(closure.missing().is_empty());
}

#[test]
fn test_superclasses_are_followed() {
    let catalog = [("obito", obito())].into_iter().collect::<Catalog>();
    let closure = build(&catalog, &seed(&["OBITO_0003"]));
    let module = &closure.modules()["obito"];
    for axiom in [
        declaration("OBITO_0001"),
        declaration("OBITO_0002"),
        declaration("OBITO_0003"),
        label("OBITO_0002", "leaf"),
        subclass("OBITO_0002", "OBITO_0001"),
        subclass("OBITO_0003", "OBITO_0002"),
    ] {
        assert!(module.contains(&axiom), "missing {axiom}");
    }
    assert!(!module.declares(&obo("OBITO_0004")));
    for axiom in module.axioms() {
        assert!(axiom.signature().is_subset(module.signature()));
    }
}

#[test]
fn test_extraction_is_deterministic() {
    let catalog = [("obito", obito()), ("other", obito())]
        .into_iter()
        .collect::<Catalog>();
    let seed = seed(&["OBITO_0002", "OBITO_0004"]);
    let first = build(&catalog, &seed);
    let second = build(&catalog, &seed);
    assert_eq!(first, second);
    assert_eq!(first.modules().len(), 2);
}

#[test]
fn test_larger_seeds_give_larger_modules() {
    let catalog = [("obito", obito())].into_iter().collect::<Catalog>();
    let seeds = [
        seed(&["OBITO_0001"]),
        seed(&["OBITO_0001", "OBITO_0002"]),
        seed(&["OBITO_0001", "OBITO_0002", "OBITO_0004"]),
    ];
    let closures = seeds
        .iter()
        .map(|seed| build(&catalog, seed))
        .collect::<Vec<_>>();
    for pair in closures.windows(2) {
        let smaller = &pair[0].modules()["obito"];
        let larger = &pair[1].modules()["obito"];
        assert!(smaller.axioms().all(|axiom| larger.contains(axiom)));
        assert!(smaller.len() <= larger.len());
    }
}

#[test]
fn test_cycles_between_sources_terminate() {
    let part_of = ObjectProperty::new(obo("BFO_0000050"));
    // a:0001 is part of some b:0001, and b:0001 is a subclass of a:0002
    let mut a = OntologyModule::new(Some(obo("a.owl")));
    a.extend([
        declaration("A_0001"),
        declaration("A_0002"),
        Axiom::subclass_of(
            OwlClass::new(obo("A_0001")),
            ClassExpression::some_values_from(part_of, OwlClass::new(obo("B_0001")).into()),
        ),
        subclass("A_0002", "A_0003"),
    ]);
    let mut b = OntologyModule::new(Some(obo("b.owl")));
    b.extend([
        declaration("B_0001"),
        subclass("B_0001", "A_0002"),
        subclass("B_0002", "B_0001"),
    ]);
    let catalog = [("a", a), ("b", b)].into_iter().collect::<Catalog>();

    let closure = build(&catalog, &seed(&["A_0001"]));
    let a = &closure.modules()["a"];
    let b = &closure.modules()["b"];
    assert!(b.contains(&subclass("B_0001", "A_0002")));
    assert!(b.contains(&declaration("B_0001")));
    assert!(!b.contains(&subclass("B_0002", "B_0001")));
    assert!(a.contains(&subclass("A_0002", "A_0003")));
    assert!(a.contains(&declaration("A_0002")));
    assert!(closure.signature().contains(&obo("A_0003")));
}

#[test]
fn test_missing_terms() {
    let catalog = [("obito", obito())].into_iter().collect::<Catalog>();
    let closure = ImportClosureBuilder::new(&catalog)
        .with_terms("obito", [ImportTerm::new(obo("OBITO_0404"))])
        .build(&seed(&["OBITO_0001", "PO_0000001"]))
        .unwrap();
    assert_eq!(closure.missing(), &seed(&["OBITO_0404", "PO_0000001"]));

    assert!(
        ImportClosureBuilder::new(&catalog)
            .with_terms("po", [ImportTerm::new(obo("PO_0000001"))])
            .build(&Signature::new())
            .is_err()
    );
}

#[test]
fn test_explicit_import_terms() {
    let catalog = [("obito", obito())].into_iter().collect::<Catalog>();

    // only the declaration and annotations of the term
    let single = ImportClosureBuilder::new(&catalog)
        .with_terms(
            "obito",
            [ImportTerm::new(obo("OBITO_0002")).with_method(ExtractionMethod::Single)],
        )
        .build(&Signature::new())
        .unwrap();
    let module = &single.modules()["obito"];
    assert_eq!(module.len(), 2);
    assert!(module.contains(&label("OBITO_0002", "leaf")));

    // the subclasses, without the locality closure
    let descendants = ImportClosureBuilder::new(&catalog)
        .with_terms(
            "obito",
            [ImportTerm::new(obo("OBITO_0002"))
                .with_method(ExtractionMethod::Single)
                .with_related([RelatedType::Descendants])],
        )
        .build(&Signature::new())
        .unwrap();
    let module = &descendants.modules()["obito"];
    assert!(module.contains(&subclass("OBITO_0003", "OBITO_0002")));
    assert!(module.contains(&subclass("OBITO_0004", "OBITO_0003")));
    assert!(module.declares(&obo("OBITO_0004")));
    assert!(!module.contains(&subclass("OBITO_0002", "OBITO_0001")));

    // exclusion drops every axiom mentioning the term
    let excluded = ImportClosureBuilder::new(&catalog)
        .with_terms("obito", [ImportTerm::new(obo("OBITO_0001")).excluded()])
        .build(&seed(&["OBITO_0003"]))
        .unwrap();
    let module = &excluded.modules()["obito"];
    assert!(module.contains(&subclass("OBITO_0003", "OBITO_0002")));
    assert!(!module.signature().contains(&obo("OBITO_0001")));
}
