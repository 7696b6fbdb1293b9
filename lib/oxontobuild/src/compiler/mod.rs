//! The two-pass compilation of term records into axioms.
//!
//! The first pass declares every record of every table, so the second pass can resolve references to terms
//! defined in later rows or other tables.

mod convert;

use crate::config::BuildSettings;
use crate::context::{BuildContext, DeclaredRecord};
use crate::error::{BuildError, RecordError};
use crate::imports::Catalog;
use crate::record::{AnnotationText, Provenance, SourceTable, TermRecord};
use crate::resolver::{LabelMap, TermResolver};
use convert::Converter;
use oxmanchester::{ExpressionParser, Fact, Value, split_values};
use oxonto::{
    AnnotationProperty, Axiom, ClassExpression, DataProperty, Entity, EntityKind, Individual,
    IriResolver, ObjectProperty, OwlClass, PropertyCharacteristic, vocab,
};
use oxrdf::vocab::rdfs;
use oxrdf::{Literal, NamedNode};
use rayon::prelude::*;
use tracing::{debug, info};

/// Compiles term tables into the axioms of a [`BuildContext`].
///
/// ```
/// use oxonto::EntityKind;
/// use oxontobuild::imports::Catalog;
/// use oxontobuild::{BuildConfig, Compiler, Provenance, SourceTable, TermRecord};
///
/// let settings = BuildConfig::new("http://purl.obolibrary.org/obo/obto/").validate()?;
/// let catalog = Catalog::new();
/// let mut table = SourceTable::new("classes.csv");
/// table.push(
///     TermRecord::new("OBTO:0011", EntityKind::Class, Provenance::new("classes.csv", 2))
///         .with_label("leaf blade")
///         .with_parent("'leaf'"),
/// );
/// table.push(
///     TermRecord::new("OBTO:0010", EntityKind::Class, Provenance::new("classes.csv", 3))
///         .with_label("leaf"),
/// );
/// let context = Compiler::new(&settings, &catalog).compile(&[table])?;
/// assert!(context.report().is_empty());
/// assert_eq!(context.ontology().len(), 5);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub struct Compiler<'a> {
    settings: &'a BuildSettings,
    catalog: &'a Catalog,
    external_labels: LabelMap,
    parser: ExpressionParser,
}

/// A record after the declaration pass, before it is merged into the context.
struct Declared {
    iri: NamedNode,
    axioms: Vec<Axiom>,
}

/// The result of compiling one record.
struct Compiled {
    provenance: Provenance,
    axioms: Vec<Axiom>,
    errors: Vec<RecordError>,
}

impl<'a> Compiler<'a> {
    /// A compiler resolving identifiers with `settings` and labels of external terms with `catalog`.
    pub fn new(settings: &'a BuildSettings, catalog: &'a Catalog) -> Self {
        Self {
            settings,
            catalog,
            external_labels: catalog.labels(),
            parser: ExpressionParser::new().with_max_depth(settings.max_expression_depth),
        }
    }

    /// Runs both passes on a new context.
    pub fn compile(&self, tables: &[SourceTable]) -> Result<BuildContext, BuildError> {
        let mut context = BuildContext::new(
            self.settings.ontology_iri.clone(),
            self.settings.version_iri.clone(),
        );
        self.declare(&mut context, tables)?;
        self.compile_expressions(&mut context);
        Ok(context)
    }

    fn resolver(&self) -> &IriResolver {
        &self.settings.resolver
    }

    /// First pass: declares every record, with its label and annotations.
    ///
    /// Tables are processed in parallel and merged in order.
    /// Fails if two records declare the same IRI with different kinds or labels.
    pub fn declare(
        &self,
        context: &mut BuildContext,
        tables: &[SourceTable],
    ) -> Result<(), BuildError> {
        let declared = tables
            .par_iter()
            .map(|table| {
                table
                    .records()
                    .iter()
                    .map(|record| (record, self.declare_record(record)))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        for (table, records) in tables.iter().zip(declared) {
            context.start_table();
            for (record, result) in records {
                match result {
                    Ok(Declared { iri, axioms }) => {
                        context.declare(iri, record.clone())?;
                        for axiom in axioms {
                            context.emit(axiom, &record.provenance);
                        }
                    }
                    Err(error) => context.report_mut().warning(
                        error.kind(),
                        error.to_string(),
                        Some(record.provenance.clone()),
                    ),
                }
            }
            info!(table = table.name(), records = table.records().len(), "declared");
        }
        Ok(())
    }

    fn declare_record(&self, record: &TermRecord) -> Result<Declared, RecordError> {
        let iri = TermResolver::new(self.resolver(), &LabelMap::new(), &LabelMap::new())
            .resolve_id(&record.id)?;
        let mut axioms = vec![Axiom::declaration(Entity::new(record.kind, iri.clone()))];
        if let Some(label) = &record.label {
            axioms.push(Axiom::annotation(
                rdfs::LABEL,
                iri.clone(),
                Literal::new_simple_literal(label),
            ));
        }
        if let Some(definition) = &record.definition {
            axioms.push(Axiom::declaration(Entity::new(
                EntityKind::AnnotationProperty,
                vocab::obo::DEFINITION.into_owned(),
            )));
            axioms.push(Axiom::annotation(
                vocab::obo::DEFINITION,
                iri.clone(),
                Literal::new_simple_literal(definition),
            ));
        }
        for comment in &record.comments {
            axioms.push(Axiom::annotation(
                rdfs::COMMENT,
                iri.clone(),
                Literal::new_simple_literal(comment),
            ));
        }
        for (key, values) in &record.annotations {
            let property = self.annotation_property(key)?;
            if !vocab::is_builtin(property.as_str()) {
                axioms.push(Axiom::declaration(Entity::new(
                    EntityKind::AnnotationProperty,
                    property.clone(),
                )));
            }
            for value in values {
                axioms.push(Axiom::annotation(
                    property.clone(),
                    iri.clone(),
                    annotation_literal(value)?,
                ));
            }
        }
        debug!(%iri, axioms = axioms.len(), provenance = %record.provenance, "record declared");
        Ok(Declared { iri, axioms })
    }

    /// The annotation property of an annotation column or key.
    ///
    /// Identifiers (`<iri>`, CURIEs, OBO IDs) are resolved, other names are minted under the base IRI.
    fn annotation_property(&self, key: &str) -> Result<NamedNode, RecordError> {
        let key = key.trim();
        if key.starts_with('<') || (key.contains(':') && !key.contains(char::is_whitespace)) {
            return Ok(self.resolver().resolve(key)?);
        }
        let slug = key
            .trim_matches('\'')
            .split(|c: char| !c.is_alphanumeric())
            .filter(|part| !part.is_empty())
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("_");
        if slug.is_empty() {
            return Err(RecordError::Malformed(format!(
                "'{key}' is not a valid annotation name"
            )));
        }
        Ok(self.resolver().resolve(&slug)?)
    }

    /// Second pass: compiles the expression cells of every declared record.
    ///
    /// Errors are attached to their record and reported as warnings. They never stop the compilation of the
    /// other records.
    pub fn compile_expressions(&self, context: &mut BuildContext) {
        let compiled = {
            let resolver =
                TermResolver::new(self.resolver(), context.labels(), &self.external_labels);
            let terms = context.terms();
            context
                .tables()
                .par_iter()
                .map(|table| {
                    table
                        .iter()
                        .map(|declared| {
                            let converter = Converter::new(
                                resolver,
                                terms,
                                self.catalog,
                                declared.anonymous_scope,
                            );
                            self.compile_record(&converter, declared)
                        })
                        .collect::<Vec<_>>()
                })
                .collect::<Vec<_>>()
        };
        for record in compiled.into_iter().flatten() {
            for axiom in record.axioms {
                context.emit(axiom, &record.provenance);
            }
            for error in record.errors {
                context.report_mut().warning(
                    error.kind(),
                    error.to_string(),
                    Some(record.provenance.clone()),
                );
            }
        }
        info!(axioms = context.ontology().len(), "expressions compiled");
    }

    fn compile_record(&self, converter: &Converter<'_>, declared: &DeclaredRecord) -> Compiled {
        let mut compiled = Compiled {
            provenance: declared.record.provenance.clone(),
            axioms: Vec::new(),
            errors: Vec::new(),
        };
        let cells = RecordCompiler {
            parser: &self.parser,
            converter,
            iri: &declared.iri,
            record: &declared.record,
        };
        if let Err(error) = cells.compile(&mut compiled) {
            compiled.errors.push(error);
        }
        compiled
    }
}

fn annotation_literal(text: &AnnotationText) -> Result<Literal, RecordError> {
    match &text.language {
        Some(language) => Literal::new_language_tagged_literal(text.value.as_str(), language)
            .map_err(|error| {
                RecordError::Malformed(format!("invalid language tag '{language}': {error}"))
            }),
        None => Ok(Literal::new_simple_literal(text.value.as_str())),
    }
}

/// Compiles the cells of one record.
struct RecordCompiler<'r> {
    parser: &'r ExpressionParser,
    converter: &'r Converter<'r>,
    iri: &'r NamedNode,
    record: &'r TermRecord,
}

impl RecordCompiler<'_> {
    fn compile(&self, compiled: &mut Compiled) -> Result<(), RecordError> {
        let record = self.record;
        let unused = match record.kind {
            EntityKind::Class => {
                self.class_cells(compiled);
                [
                    ("domain", &record.domain),
                    ("range", &record.range),
                    ("inverse", &record.inverse),
                    ("characteristics", &record.characteristics),
                    ("instance of", &record.instance_of),
                    ("relations", &record.relations),
                    ("data facts", &record.data_facts),
                ]
                .to_vec()
            }
            EntityKind::ObjectProperty => {
                self.object_property_cells(compiled);
                [
                    ("instance of", &record.instance_of),
                    ("relations", &record.relations),
                    ("data facts", &record.data_facts),
                ]
                .to_vec()
            }
            EntityKind::DataProperty => {
                self.data_property_cells(compiled);
                [
                    ("inverse", &record.inverse),
                    ("instance of", &record.instance_of),
                    ("relations", &record.relations),
                    ("data facts", &record.data_facts),
                ]
                .to_vec()
            }
            EntityKind::AnnotationProperty => {
                self.annotation_property_cells(compiled);
                [
                    ("equivalent", &record.equivalent),
                    ("disjoint", &record.disjoint),
                    ("domain", &record.domain),
                    ("range", &record.range),
                    ("inverse", &record.inverse),
                    ("characteristics", &record.characteristics),
                    ("instance of", &record.instance_of),
                    ("relations", &record.relations),
                    ("data facts", &record.data_facts),
                ]
                .to_vec()
            }
            EntityKind::NamedIndividual => {
                self.individual_cells(compiled);
                [
                    ("children", &record.children),
                    ("equivalent", &record.equivalent),
                    ("disjoint", &record.disjoint),
                    ("domain", &record.domain),
                    ("range", &record.range),
                    ("inverse", &record.inverse),
                    ("characteristics", &record.characteristics),
                ]
                .to_vec()
            }
        };
        let unused = unused
            .into_iter()
            .filter(|(_, cell)| cell.is_some())
            .map(|(column, _)| column)
            .collect::<Vec<_>>();
        if unused.is_empty() {
            Ok(())
        } else {
            Err(RecordError::Malformed(format!(
                "the {} columns do not apply to a {}",
                unused.join(", "),
                record.kind
            )))
        }
    }

    /// Compiles each `;`-separated value of a cell with `f`, collecting the errors.
    fn each_value(
        &self,
        cell: Option<&String>,
        compiled: &mut Compiled,
        mut f: impl FnMut(&str) -> Result<Axiom, RecordError>,
    ) {
        let Some(cell) = cell else {
            return;
        };
        let values = match split_values(cell) {
            Ok(values) => values,
            Err(error) => {
                compiled.errors.push(error.into());
                return;
            }
        };
        for value in values {
            match f(&value) {
                Ok(axiom) => compiled.axioms.push(axiom),
                Err(error) => compiled.errors.push(error),
            }
        }
    }

    fn class_expression(&self, value: &str) -> Result<ClassExpression, RecordError> {
        self.converter
            .class_expression(&self.parser.parse(value)?)
    }

    fn term(&self, value: &str) -> Result<NamedNode, RecordError> {
        self.converter.iri(&self.parser.parse_term(value)?)
    }

    fn class_cells(&self, compiled: &mut Compiled) {
        let class = || ClassExpression::Class(OwlClass::new(self.iri.clone()));
        let record = self.record;
        self.each_value(record.parent.as_ref(), compiled, |value| {
            Ok(Axiom::subclass_of(class(), self.class_expression(value)?))
        });
        self.each_value(record.children.as_ref(), compiled, |value| {
            Ok(Axiom::subclass_of(self.class_expression(value)?, class()))
        });
        self.each_value(record.equivalent.as_ref(), compiled, |value| {
            Ok(Axiom::equivalent_classes(vec![
                class(),
                self.class_expression(value)?,
            ]))
        });
        self.each_value(record.disjoint.as_ref(), compiled, |value| {
            Ok(Axiom::disjoint_classes(vec![
                class(),
                self.class_expression(value)?,
            ]))
        });
    }

    fn object_property_cells(&self, compiled: &mut Compiled) {
        let property = || ObjectProperty::new(self.iri.clone());
        let record = self.record;
        self.each_value(record.parent.as_ref(), compiled, |value| {
            Ok(Axiom::SubObjectPropertyOf {
                sub_property: property().into(),
                super_property: ObjectProperty::new(self.term(value)?).into(),
            })
        });
        self.each_value(record.children.as_ref(), compiled, |value| {
            Ok(Axiom::SubObjectPropertyOf {
                sub_property: ObjectProperty::new(self.term(value)?).into(),
                super_property: property().into(),
            })
        });
        self.each_value(record.equivalent.as_ref(), compiled, |value| {
            Ok(Axiom::equivalent_object_properties(vec![
                property(),
                ObjectProperty::new(self.term(value)?),
            ]))
        });
        self.each_value(record.disjoint.as_ref(), compiled, |value| {
            Ok(Axiom::disjoint_object_properties(vec![
                property(),
                ObjectProperty::new(self.term(value)?),
            ]))
        });
        self.each_value(record.domain.as_ref(), compiled, |value| {
            Ok(Axiom::ObjectPropertyDomain {
                property: property(),
                domain: self.class_expression(value)?,
            })
        });
        self.each_value(record.range.as_ref(), compiled, |value| {
            Ok(Axiom::ObjectPropertyRange {
                property: property(),
                range: self.class_expression(value)?,
            })
        });
        self.each_value(record.inverse.as_ref(), compiled, |value| {
            Ok(Axiom::inverse_object_properties(
                property(),
                ObjectProperty::new(self.term(value)?),
            ))
        });
        self.each_value(record.characteristics.as_ref(), compiled, |value| {
            Ok(value
                .parse::<PropertyCharacteristic>()?
                .object_property_axiom(property()))
        });
    }

    fn data_property_cells(&self, compiled: &mut Compiled) {
        let property = || DataProperty::new(self.iri.clone());
        let record = self.record;
        self.each_value(record.parent.as_ref(), compiled, |value| {
            Ok(Axiom::SubDataPropertyOf {
                sub_property: property(),
                super_property: DataProperty::new(self.term(value)?),
            })
        });
        self.each_value(record.children.as_ref(), compiled, |value| {
            Ok(Axiom::SubDataPropertyOf {
                sub_property: DataProperty::new(self.term(value)?),
                super_property: property(),
            })
        });
        self.each_value(record.equivalent.as_ref(), compiled, |value| {
            Ok(Axiom::equivalent_data_properties(vec![
                property(),
                DataProperty::new(self.term(value)?),
            ]))
        });
        self.each_value(record.disjoint.as_ref(), compiled, |value| {
            Ok(Axiom::disjoint_data_properties(vec![
                property(),
                DataProperty::new(self.term(value)?),
            ]))
        });
        self.each_value(record.domain.as_ref(), compiled, |value| {
            Ok(Axiom::DataPropertyDomain {
                property: property(),
                domain: self.class_expression(value)?,
            })
        });
        self.each_value(record.range.as_ref(), compiled, |value| {
            Ok(Axiom::DataPropertyRange {
                property: property(),
                range: self.converter.data_range(&self.parser.parse(value)?)?,
            })
        });
        self.each_value(record.characteristics.as_ref(), compiled, |value| {
            value
                .parse::<PropertyCharacteristic>()?
                .data_property_axiom(property())
                .ok_or_else(|| {
                    RecordError::Malformed(format!(
                        "'{value}' does not apply to data properties, only 'functional' does"
                    ))
                })
        });
    }

    fn annotation_property_cells(&self, compiled: &mut Compiled) {
        let property = || AnnotationProperty::new(self.iri.clone());
        let record = self.record;
        self.each_value(record.parent.as_ref(), compiled, |value| {
            Ok(Axiom::SubAnnotationPropertyOf {
                sub_property: property(),
                super_property: AnnotationProperty::new(self.term(value)?),
            })
        });
        self.each_value(record.children.as_ref(), compiled, |value| {
            Ok(Axiom::SubAnnotationPropertyOf {
                sub_property: AnnotationProperty::new(self.term(value)?),
                super_property: property(),
            })
        });
    }

    fn individual_cells(&self, compiled: &mut Compiled) {
        let individual = || Individual::Named(self.iri.clone());
        let record = self.record;
        for cell in [&record.parent, &record.instance_of] {
            self.each_value(cell.as_ref(), compiled, |value| {
                Ok(Axiom::class_assertion(
                    self.class_expression(value)?,
                    individual(),
                ))
            });
        }
        self.each_value(record.relations.as_ref(), compiled, |value| {
            let fact = self.parser.parse_fact(value)?;
            let property = ObjectProperty::new(self.converter.iri(&fact.property)?);
            let Value::Individual(target) = &fact.value else {
                return Err(fact_error(&fact, "relations must relate to an individual"));
            };
            let target = self.converter.individual(target)?;
            Ok(if fact.negated {
                Axiom::NegativeObjectPropertyAssertion {
                    property,
                    source: individual(),
                    target,
                }
            } else {
                Axiom::ObjectPropertyAssertion {
                    property,
                    source: individual(),
                    target,
                }
            })
        });
        self.each_value(record.data_facts.as_ref(), compiled, |value| {
            let fact = self.parser.parse_fact(value)?;
            let property = DataProperty::new(self.converter.iri(&fact.property)?);
            let Value::Literal(literal) = &fact.value else {
                return Err(fact_error(&fact, "data facts must have a literal value"));
            };
            let target = self.converter.literal(literal)?;
            Ok(if fact.negated {
                Axiom::NegativeDataPropertyAssertion {
                    property,
                    source: individual(),
                    target,
                }
            } else {
                Axiom::DataPropertyAssertion {
                    property,
                    source: individual(),
                    target,
                }
            })
        });
    }
}

fn fact_error(fact: &Fact, message: &str) -> RecordError {
    RecordError::Malformed(format!("{message}, found '{fact}'"))
}
