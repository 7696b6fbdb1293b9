//! Integration tests for oxonto crate.

use oxonto::{
    Axiom, ClassExpression, DataProperty, DataRange, Entity, EntityKind, Individual, IriResolver,
    ObjectProperty, OntologyModule, OwlClass, PrefixMap,
};
use oxrdf::vocab::{rdfs, xsd};
use oxrdf::{Literal, NamedNode};

fn obo(id: &str) -> NamedNode {
    NamedNode::new(format!("http://purl.obolibrary.org/obo/{id}")).unwrap()
}

#[test]
fn test_create_empty_module() {
    let module = OntologyModule::new(None);
    assert!(module.iri().is_none());
    assert!(module.is_empty());
    assert!(module.signature().is_empty());
}

#[test]
fn test_module_signature_covers_axioms() {
    let mut module = OntologyModule::new(Some(obo("po.owl")));
    let part_of = ObjectProperty::new(obo("BFO_0000050"));
    let leaf = OwlClass::new(obo("PO_0025034"));
    let shoot = OwlClass::new(obo("PO_0009006"));

    module.insert(Axiom::declaration(Entity::Class(leaf.clone())));
    module.insert(Axiom::subclass_of(
        leaf.clone(),
        ClassExpression::some_values_from(part_of.clone(), ClassExpression::class(shoot.clone())),
    ));

    for axiom in module.axioms() {
        assert!(axiom.signature().is_subset(module.signature()));
    }
    assert!(module.signature().contains(part_of.iri()));
    assert!(module.signature().contains(shoot.iri()));
    assert!(module.declares(leaf.iri()));
    assert!(!module.declares(shoot.iri()));
}

#[test]
fn test_canonical_order_is_insertion_independent() {
    let axioms = vec![
        Axiom::declaration(Entity::new(EntityKind::Class, obo("OBTO_0011"))),
        Axiom::declaration(Entity::new(EntityKind::Class, obo("OBTO_0010"))),
        Axiom::subclass_of(
            OwlClass::new(obo("OBTO_0011")),
            ClassExpression::class(obo("OBITO_0001")),
        ),
        Axiom::disjoint_classes(vec![
            ClassExpression::class(obo("OBTO_0011")),
            ClassExpression::class(obo("OBTO_0010")),
        ]),
    ];
    let forward = axioms.iter().cloned().collect::<OntologyModule>();
    let backward = axioms.into_iter().rev().collect::<OntologyModule>();
    assert_eq!(forward, backward);
    assert_eq!(
        forward.canonical_keys().collect::<Vec<_>>(),
        backward.canonical_keys().collect::<Vec<_>>()
    );
}

#[test]
fn test_data_property_axioms() {
    let mut module = OntologyModule::new(None);
    let height = DataProperty::new(obo("PATO_0000119"));
    let plant = Individual::Named(obo("plant_1"));

    module.insert(Axiom::DataPropertyRange {
        property: height.clone(),
        range: DataRange::datatype(xsd::DECIMAL.into_owned()),
    });
    module.insert(Axiom::DataPropertyAssertion {
        property: height,
        source: plant,
        target: Literal::new_typed_literal("1.5", xsd::DECIMAL),
    });

    assert_eq!(module.len(), 2);
    assert!(module.signature().contains(&xsd::DECIMAL.into_owned()));
}

#[test]
fn test_labels_and_merge() {
    let mut first = OntologyModule::new(None);
    first.insert(Axiom::annotation(
        rdfs::LABEL,
        obo("PO_0025034"),
        Literal::new_language_tagged_literal("leaf", "en").unwrap(),
    ));
    let mut second = OntologyModule::new(None);
    second.add_import(obo("bfo.owl"));
    second.insert(Axiom::declaration(Entity::new(
        EntityKind::Class,
        obo("PO_0025034"),
    )));

    first.merge(&second);
    assert_eq!(first.len(), 2);
    assert_eq!(first.imports().count(), 1);
    let labels = first.labels().collect::<Vec<_>>();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].1.value(), "leaf");
}

#[test]
fn test_resolver_with_custom_prefix() {
    let mut prefixes = PrefixMap::default();
    prefixes.insert("plant", "http://example.org/plant#").unwrap();
    let resolver = IriResolver::new("http://example.org/plant/", prefixes).unwrap();
    assert_eq!(
        resolver.resolve("plant:Leaf").unwrap().as_str(),
        "http://example.org/plant#Leaf"
    );
    assert_eq!(resolver.resolve("PO:0025034").unwrap(), obo("PO_0025034"));
    assert_eq!(
        resolver.resolve("rdfs:label").unwrap(),
        rdfs::LABEL.into_owned()
    );
}
