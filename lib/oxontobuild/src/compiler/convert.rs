use crate::context::TermEntry;
use crate::error::RecordError;
use crate::imports::Catalog;
use crate::resolver::TermResolver;
use oxmanchester::{
    Expression, Filler, LiteralValue, Quantifier, Restriction, TermReference, Value,
};
use oxonto::{
    ClassExpression, DataProperty, DataRange, EntityKind, Individual, ObjectProperty,
    ObjectPropertyExpression, OwlClass,
};
use oxrdf::vocab::xsd;
use oxrdf::{BlankNode, Literal, NamedNode};
use std::collections::BTreeMap;

/// Turns parsed cells into the ontology model, resolving their references.
#[derive(Clone, Copy)]
pub(crate) struct Converter<'a> {
    resolver: TermResolver<'a>,
    terms: &'a BTreeMap<NamedNode, TermEntry>,
    catalog: &'a Catalog,
    anonymous_scope: usize,
}

impl<'a> Converter<'a> {
    pub(crate) fn new(
        resolver: TermResolver<'a>,
        terms: &'a BTreeMap<NamedNode, TermEntry>,
        catalog: &'a Catalog,
        anonymous_scope: usize,
    ) -> Self {
        Self {
            resolver,
            terms,
            catalog,
            anonymous_scope,
        }
    }

    pub(crate) fn iri(&self, reference: &TermReference) -> Result<NamedNode, RecordError> {
        self.resolver.resolve(reference)
    }

    /// The declared kind of an entity, locally or in a source ontology.
    pub(crate) fn kind_of(&self, iri: &NamedNode) -> Option<EntityKind> {
        self.terms
            .get(iri)
            .map(|term| term.kind)
            .or_else(|| self.catalog.kind_of(iri))
    }

    pub(crate) fn class_expression(
        &self,
        expression: &Expression,
    ) -> Result<ClassExpression, RecordError> {
        Ok(match expression {
            Expression::TermReference(reference) => {
                ClassExpression::Class(OwlClass::new(self.iri(reference)?))
            }
            Expression::Intersection(operands) => {
                ClassExpression::ObjectIntersectionOf(self.class_expressions(operands)?)
            }
            Expression::Union(operands) => {
                ClassExpression::ObjectUnionOf(self.class_expressions(operands)?)
            }
            Expression::Complement(operand) => {
                ClassExpression::complement(self.class_expression(operand)?)
            }
            Expression::Restriction(restriction) => self.restriction(restriction)?,
        })
    }

    fn class_expressions(
        &self,
        operands: &[Expression],
    ) -> Result<Vec<ClassExpression>, RecordError> {
        operands
            .iter()
            .map(|operand| self.class_expression(operand))
            .collect()
    }

    fn restriction(&self, restriction: &Restriction) -> Result<ClassExpression, RecordError> {
        let property = self.iri(&restriction.property.term)?;
        let is_data = match self.kind_of(&property) {
            Some(EntityKind::DataProperty) => true,
            Some(_) => false,
            None => matches!(
                restriction.filler,
                Some(Filler::Value(Value::Literal(_)))
            ),
        };
        if is_data {
            if restriction.property.inverse {
                return Err(RecordError::Malformed(format!(
                    "{} is a data property, it has no inverse",
                    restriction.property.term
                )));
            }
            self.data_restriction(DataProperty::new(property), restriction)
        } else {
            let property = if restriction.property.inverse {
                ObjectPropertyExpression::inverse(ObjectProperty::new(property))
            } else {
                ObjectProperty::new(property).into()
            };
            self.object_restriction(property, restriction)
        }
    }

    fn object_restriction(
        &self,
        property: ObjectPropertyExpression,
        restriction: &Restriction,
    ) -> Result<ClassExpression, RecordError> {
        let filler = match &restriction.filler {
            Some(Filler::Expression(expression)) => Some(self.class_expression(expression)?),
            Some(Filler::Value(Value::Individual(individual))) => {
                return if restriction.quantifier == Quantifier::Value {
                    Ok(ClassExpression::ObjectHasValue {
                        property,
                        individual: self.individual(individual)?,
                    })
                } else {
                    Err(misplaced_value(restriction))
                };
            }
            Some(Filler::Value(Value::Literal(_))) => {
                return Err(RecordError::Malformed(format!(
                    "{} is an object property, its value cannot be a literal",
                    restriction.property
                )));
            }
            None => None,
        };
        let cardinality = restriction.cardinality.unwrap_or_default();
        Ok(match (restriction.quantifier, filler) {
            (Quantifier::Some, Some(filler)) => ClassExpression::some_values_from(property, filler),
            (Quantifier::All, Some(filler)) => ClassExpression::all_values_from(property, filler),
            (Quantifier::Exactly, filler) => ClassExpression::ObjectExactCardinality {
                cardinality,
                property,
                filler: filler.map(Box::new),
            },
            (Quantifier::Min, filler) => ClassExpression::ObjectMinCardinality {
                cardinality,
                property,
                filler: filler.map(Box::new),
            },
            (Quantifier::Max, filler) => ClassExpression::ObjectMaxCardinality {
                cardinality,
                property,
                filler: filler.map(Box::new),
            },
            (Quantifier::Some | Quantifier::All | Quantifier::Value, _) => {
                return Err(missing_filler(restriction));
            }
        })
    }

    fn data_restriction(
        &self,
        property: DataProperty,
        restriction: &Restriction,
    ) -> Result<ClassExpression, RecordError> {
        let filler = match &restriction.filler {
            Some(Filler::Expression(expression)) => Some(self.data_range(expression)?),
            Some(Filler::Value(Value::Literal(literal))) => {
                return if restriction.quantifier == Quantifier::Value {
                    Ok(ClassExpression::DataHasValue {
                        property,
                        value: self.literal(literal)?,
                    })
                } else {
                    Err(misplaced_value(restriction))
                };
            }
            Some(Filler::Value(Value::Individual(_))) => {
                return Err(RecordError::Malformed(format!(
                    "{} is a data property, its value must be a literal",
                    restriction.property
                )));
            }
            None => None,
        };
        let cardinality = restriction.cardinality.unwrap_or_default();
        Ok(match (restriction.quantifier, filler) {
            (Quantifier::Some, Some(filler)) => ClassExpression::DataSomeValuesFrom { property, filler },
            (Quantifier::All, Some(filler)) => ClassExpression::DataAllValuesFrom { property, filler },
            (Quantifier::Exactly, filler) => ClassExpression::DataExactCardinality {
                cardinality,
                property,
                filler,
            },
            (Quantifier::Min, filler) => ClassExpression::DataMinCardinality {
                cardinality,
                property,
                filler,
            },
            (Quantifier::Max, filler) => ClassExpression::DataMaxCardinality {
                cardinality,
                property,
                filler,
            },
            (Quantifier::Some | Quantifier::All | Quantifier::Value, _) => {
                return Err(missing_filler(restriction));
            }
        })
    }

    /// Datatypes and their boolean combinations.
    pub(crate) fn data_range(&self, expression: &Expression) -> Result<DataRange, RecordError> {
        Ok(match expression {
            Expression::TermReference(reference) => DataRange::Datatype(self.iri(reference)?),
            Expression::Intersection(operands) => {
                DataRange::DataIntersectionOf(self.data_ranges(operands)?)
            }
            Expression::Union(operands) => DataRange::DataUnionOf(self.data_ranges(operands)?),
            Expression::Complement(operand) => {
                DataRange::DataComplementOf(Box::new(self.data_range(operand)?))
            }
            Expression::Restriction(_) => {
                return Err(RecordError::Malformed(format!(
                    "{expression} is not a data range"
                )));
            }
        })
    }

    fn data_ranges(&self, operands: &[Expression]) -> Result<Vec<DataRange>, RecordError> {
        operands
            .iter()
            .map(|operand| self.data_range(operand))
            .collect()
    }

    pub(crate) fn literal(&self, literal: &LiteralValue) -> Result<Literal, RecordError> {
        Ok(match literal {
            LiteralValue::String {
                value,
                language: None,
            } => Literal::new_simple_literal(value),
            LiteralValue::String {
                value,
                language: Some(language),
            } => Literal::new_language_tagged_literal(value, language).map_err(|error| {
                RecordError::Malformed(format!("invalid language tag '{language}': {error}"))
            })?,
            LiteralValue::Typed { value, datatype } => {
                Literal::new_typed_literal(value, self.iri(datatype)?)
            }
            LiteralValue::Integer(value) => Literal::new_typed_literal(value, xsd::INTEGER),
            LiteralValue::Decimal(value) => Literal::new_typed_literal(value, xsd::DECIMAL),
            LiteralValue::Boolean(value) => Literal::from(*value),
        })
    }

    /// Named individuals, or blank nodes local to the record for `_:name`.
    pub(crate) fn individual(&self, reference: &TermReference) -> Result<Individual, RecordError> {
        if let TermReference::Anonymous(name) = reference {
            let id = format!("t{}x{name}", self.anonymous_scope);
            return BlankNode::new(id)
                .map(Individual::Anonymous)
                .map_err(|error| {
                    RecordError::Malformed(format!("invalid anonymous individual {reference}: {error}"))
                });
        }
        Ok(Individual::Named(self.iri(reference)?))
    }
}

fn misplaced_value(restriction: &Restriction) -> RecordError {
    RecordError::Malformed(format!(
        "a single value is only allowed after 'value', in {restriction}"
    ))
}

fn missing_filler(restriction: &Restriction) -> RecordError {
    RecordError::Malformed(format!("{restriction} has no filler"))
}
