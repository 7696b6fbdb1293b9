use super::{ReasonerAdapter, ReasonerConfig, ReasonerError, ReasonerVerdict};
use oxonto::vocab::owl;
use oxonto::{
    Axiom, ClassExpression, EntityKind, Individual, ObjectProperty, ObjectPropertyExpression,
    OntologyModule, OwlClass,
};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::debug;

/// A forward-chaining reasoner over the structure of named classes.
///
/// It handles the told class hierarchy, intersections and complements of named classes, disjointness,
/// existential restrictions on named fillers, object property domains and ranges, and class and property
/// assertions. Other axioms are ignored: it may miss an unsatisfiable class, it never reports a satisfiable one.
#[derive(Debug, Clone, Default)]
pub struct StructuralReasoner {
    config: ReasonerConfig,
}

impl StructuralReasoner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ReasonerConfig) -> Self {
        Self { config }
    }
}

impl ReasonerAdapter for StructuralReasoner {
    fn name(&self) -> &str {
        "structural"
    }

    fn check(&self, ontology: &OntologyModule) -> Result<ReasonerVerdict, ReasonerError> {
        let mut saturation = Saturation::new(&self.config);
        saturation.check_timeout()?;
        saturation.initialize(ontology);
        saturation.classify()?;
        saturation.realize()?;
        let verdict = saturation.verdict(ontology);
        debug!(
            iterations = saturation.iterations,
            consistent = verdict.consistent,
            unsatisfiable = verdict.unsatisfiable.len(),
            "structural reasoning done"
        );
        Ok(verdict)
    }
}

struct Saturation<'a> {
    config: &'a ReasonerConfig,
    start: Instant,
    iterations: usize,
    nothing: OwlClass,
    /// Named class -> its known superclasses, itself included
    supers: FxHashMap<OwlClass, BTreeSet<OwlClass>>,
    /// `(A, [B, C])` for B and C ⊑ A
    conjunctions: Vec<(OwlClass, Vec<OwlClass>)>,
    /// `(A, p, B)` for A ⊑ p some B
    existentials: Vec<(OwlClass, ObjectProperty, OwlClass)>,
    disjoint: FxHashSet<(OwlClass, OwlClass)>,
    domains: FxHashMap<ObjectProperty, BTreeSet<OwlClass>>,
    ranges: FxHashMap<ObjectProperty, BTreeSet<OwlClass>>,
    /// Individuals in order of first appearance
    individuals: Vec<Individual>,
    individual_ids: FxHashMap<Individual, usize>,
    types: Vec<BTreeSet<OwlClass>>,
    /// Asserted complement types
    complements: Vec<BTreeSet<OwlClass>>,
    relations: Vec<(usize, ObjectProperty, usize)>,
}

impl<'a> Saturation<'a> {
    fn new(config: &'a ReasonerConfig) -> Self {
        Self {
            config,
            start: Instant::now(),
            iterations: 0,
            nothing: OwlClass::from(owl::NOTHING),
            supers: FxHashMap::default(),
            conjunctions: Vec::new(),
            existentials: Vec::new(),
            disjoint: FxHashSet::default(),
            domains: FxHashMap::default(),
            ranges: FxHashMap::default(),
            individuals: Vec::new(),
            individual_ids: FxHashMap::default(),
            types: Vec::new(),
            complements: Vec::new(),
            relations: Vec::new(),
        }
    }

    fn check_timeout(&self) -> Result<(), ReasonerError> {
        match self.config.timeout {
            Some(timeout) if self.start.elapsed() >= timeout => Err(ReasonerError::Timeout(timeout)),
            _ => Ok(()),
        }
    }

    fn tick(&mut self) -> Result<(), ReasonerError> {
        self.iterations += 1;
        if self.iterations > self.config.max_iterations {
            return Err(ReasonerError::Backend(format!(
                "no fixpoint reached after {} iterations",
                self.config.max_iterations
            )));
        }
        self.check_timeout()
    }

    fn class(&mut self, class: &OwlClass) {
        if !self.supers.contains_key(class) {
            self.supers
                .insert(class.clone(), BTreeSet::from([class.clone()]));
        }
    }

    fn individual(&mut self, individual: &Individual) -> usize {
        if let Some(id) = self.individual_ids.get(individual) {
            return *id;
        }
        let id = self.individuals.len();
        self.individuals.push(individual.clone());
        self.individual_ids.insert(individual.clone(), id);
        self.types.push(BTreeSet::new());
        self.complements.push(BTreeSet::new());
        id
    }

    fn initialize(&mut self, ontology: &OntologyModule) {
        let nothing = self.nothing.clone();
        self.class(&nothing);
        for axiom in ontology.axioms() {
            match axiom {
                Axiom::Declaration(entity) => {
                    if entity.kind() == EntityKind::Class {
                        self.class(&OwlClass::new(entity.iri().clone()));
                    }
                }
                Axiom::SubClassOf {
                    sub_class,
                    super_class,
                } => self.subsumption(sub_class, super_class),
                Axiom::EquivalentClasses(classes) => {
                    for sub_class in classes {
                        for super_class in classes {
                            if sub_class != super_class {
                                self.subsumption(sub_class, super_class);
                            }
                        }
                    }
                }
                Axiom::DisjointClasses(classes) => {
                    let named = classes
                        .iter()
                        .filter_map(ClassExpression::as_class)
                        .cloned()
                        .collect::<Vec<_>>();
                    for first in &named {
                        self.class(first);
                        for second in &named {
                            if first != second {
                                self.disjoint.insert((first.clone(), second.clone()));
                            }
                        }
                    }
                }
                Axiom::ObjectPropertyDomain {
                    property,
                    domain: ClassExpression::Class(class),
                } => {
                    self.class(class);
                    self.domains
                        .entry(property.clone())
                        .or_default()
                        .insert(class.clone());
                }
                Axiom::ObjectPropertyRange {
                    property,
                    range: ClassExpression::Class(class),
                } => {
                    self.class(class);
                    self.ranges
                        .entry(property.clone())
                        .or_default()
                        .insert(class.clone());
                }
                Axiom::ClassAssertion { class, individual } => {
                    let id = self.individual(individual);
                    self.assert_type(id, class);
                }
                Axiom::ObjectPropertyAssertion {
                    property,
                    source,
                    target,
                } => {
                    let source = self.individual(source);
                    let target = self.individual(target);
                    self.relations.push((source, property.clone(), target));
                }
                _ => {}
            }
        }
    }

    fn subsumption(&mut self, sub_class: &ClassExpression, super_class: &ClassExpression) {
        match sub_class {
            ClassExpression::Class(class) => {
                self.class(class);
                self.super_expression(class, super_class);
            }
            ClassExpression::ObjectIntersectionOf(operands) => {
                let Some(super_class) = super_class.as_class() else {
                    return;
                };
                let Some(operands) = operands
                    .iter()
                    .map(|operand| operand.as_class().cloned())
                    .collect::<Option<Vec<_>>>()
                else {
                    return;
                };
                self.class(super_class);
                for operand in &operands {
                    self.class(operand);
                }
                self.conjunctions.push((super_class.clone(), operands));
            }
            _ => {}
        }
    }

    fn super_expression(&mut self, class: &OwlClass, super_class: &ClassExpression) {
        match super_class {
            ClassExpression::Class(super_class) => {
                self.class(super_class);
                if let Some(supers) = self.supers.get_mut(class) {
                    supers.insert(super_class.clone());
                }
            }
            ClassExpression::ObjectIntersectionOf(operands) => {
                for operand in operands {
                    self.super_expression(class, operand);
                }
            }
            ClassExpression::ObjectComplementOf(operand) => {
                if let ClassExpression::Class(other) = operand.as_ref() {
                    self.class(other);
                    self.disjoint.insert((class.clone(), other.clone()));
                    self.disjoint.insert((other.clone(), class.clone()));
                }
            }
            ClassExpression::ObjectSomeValuesFrom {
                property: ObjectPropertyExpression::ObjectProperty(property),
                filler,
            } => {
                if let ClassExpression::Class(filler) = filler.as_ref() {
                    self.class(filler);
                    self.existentials
                        .push((class.clone(), property.clone(), filler.clone()));
                }
            }
            _ => {}
        }
    }

    fn assert_type(&mut self, id: usize, class: &ClassExpression) {
        match class {
            ClassExpression::Class(class) => {
                self.class(class);
                self.types[id].insert(class.clone());
            }
            ClassExpression::ObjectIntersectionOf(operands) => {
                for operand in operands {
                    self.assert_type(id, operand);
                }
            }
            ClassExpression::ObjectComplementOf(operand) => {
                if let ClassExpression::Class(class) = operand.as_ref() {
                    self.class(class);
                    self.complements[id].insert(class.clone());
                }
            }
            _ => {}
        }
    }

    /// One saturation round of a set of named classes.
    fn close(&self, classes: &BTreeSet<OwlClass>) -> BTreeSet<OwlClass> {
        let mut closed = classes.clone();
        for class in classes {
            if let Some(supers) = self.supers.get(class) {
                closed.extend(supers.iter().cloned());
            }
        }
        for (class, operands) in &self.conjunctions {
            if operands.iter().all(|operand| closed.contains(operand)) {
                closed.insert(class.clone());
            }
        }
        for (class, property, filler) in &self.existentials {
            if closed.contains(class) {
                if self
                    .supers
                    .get(filler)
                    .is_some_and(|supers| supers.contains(&self.nothing))
                {
                    closed.insert(self.nothing.clone());
                }
                if let Some(domains) = self.domains.get(property) {
                    closed.extend(domains.iter().cloned());
                }
            }
        }
        if self
            .disjoint
            .iter()
            .any(|(first, second)| closed.contains(first) && closed.contains(second))
        {
            closed.insert(self.nothing.clone());
        }
        closed
    }

    /// Computes the superclasses of every named class.
    fn classify(&mut self) -> Result<(), ReasonerError> {
        let mut classes = self.supers.keys().cloned().collect::<Vec<_>>();
        classes.sort();
        loop {
            self.tick()?;
            let mut changed = false;
            for class in &classes {
                let Some(supers) = self.supers.get(class) else {
                    continue;
                };
                let closed = self.close(supers);
                if closed.len() != supers.len() {
                    self.supers.insert(class.clone(), closed);
                    changed = true;
                }
            }
            if !changed {
                return Ok(());
            }
        }
    }

    /// Computes the types of every individual.
    fn realize(&mut self) -> Result<(), ReasonerError> {
        for (source, property, target) in &self.relations {
            if let Some(domains) = self.domains.get(property) {
                self.types[*source].extend(domains.iter().cloned());
            }
            if let Some(ranges) = self.ranges.get(property) {
                self.types[*target].extend(ranges.iter().cloned());
            }
        }
        loop {
            self.tick()?;
            let mut changed = false;
            for id in 0..self.types.len() {
                let closed = self.close(&self.types[id]);
                if closed.len() != self.types[id].len() {
                    self.types[id] = closed;
                    changed = true;
                }
            }
            if !changed {
                return Ok(());
            }
        }
    }

    fn explanation(&self) -> Option<String> {
        for (id, individual) in self.individuals.iter().enumerate() {
            let types = &self.types[id];
            if let Some(class) = self.complements[id].intersection(types).next() {
                return Some(format!(
                    "{individual} is an instance of {class} and of its complement"
                ));
            }
            if !types.contains(&self.nothing) {
                continue;
            }
            let mut pairs = self
                .disjoint
                .iter()
                .filter(|(first, second)| {
                    first < second && types.contains(first) && types.contains(second)
                })
                .collect::<Vec<_>>();
            pairs.sort();
            return Some(match pairs.first() {
                Some((first, second)) => format!(
                    "{individual} is an instance of the disjoint classes {first} and {second}"
                ),
                None => format!("{individual} is an instance of {}", self.nothing),
            });
        }
        None
    }

    fn verdict(&self, ontology: &OntologyModule) -> ReasonerVerdict {
        let unsatisfiable = self
            .supers
            .iter()
            .filter(|(class, supers)| **class != self.nothing && supers.contains(&self.nothing))
            .map(|(class, _)| class.iri().clone())
            .collect::<BTreeSet<_>>();
        let explanation = self.explanation();
        let inferred = (self.config.materialize && explanation.is_none())
            .then(|| self.inferred(ontology));
        ReasonerVerdict {
            consistent: explanation.is_none(),
            unsatisfiable,
            inferred,
            explanation,
        }
    }

    fn inferred(&self, ontology: &OntologyModule) -> Vec<Axiom> {
        let mut inferred = Vec::new();
        for (class, supers) in &self.supers {
            if *class == self.nothing {
                continue;
            }
            for super_class in supers {
                if super_class != class && *super_class.iri() != owl::THING {
                    inferred.push(Axiom::subclass_of(class.clone(), super_class.clone()));
                }
            }
        }
        for (individual, types) in self.individuals.iter().zip(&self.types) {
            for class in types {
                if *class.iri() != owl::THING {
                    inferred.push(Axiom::class_assertion(class.clone(), individual.clone()));
                }
            }
        }
        inferred.retain(|axiom| !ontology.contains(axiom));
        inferred.sort_by_cached_key(Axiom::canonical_key);
        inferred.dedup();
        inferred
    }
}
