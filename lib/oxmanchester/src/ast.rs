//! [Expression] trees as written in table cells.
//!
//! Identifiers are kept as written: resolving them into IRIs is the job of the caller,
//! once every term the expression may refer to is known.

use std::fmt;

/// A class expression.
///
/// Nodes are built bottom-up by the parser and never modified afterwards.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum Expression {
    /// A reference to a named entity, resolved later.
    TermReference(TermReference),
    /// `A and B and ...`
    Intersection(Vec<Expression>),
    /// `A or B or ...`
    Union(Vec<Expression>),
    /// `not A`
    Complement(Box<Expression>),
    /// `p some A`, `p exactly 2 A`, `p value "v"`...
    Restriction(Box<Restriction>),
}

impl Expression {
    /// Returns all the term references of the expression, in reading order.
    pub fn term_references(&self) -> Vec<&TermReference> {
        let mut references = Vec::new();
        self.collect_term_references(&mut references);
        references
    }

    fn collect_term_references<'a>(&'a self, references: &mut Vec<&'a TermReference>) {
        match self {
            Self::TermReference(term) => references.push(term),
            Self::Intersection(operands) | Self::Union(operands) => {
                for operand in operands {
                    operand.collect_term_references(references);
                }
            }
            Self::Complement(inner) => inner.collect_term_references(references),
            Self::Restriction(restriction) => {
                references.push(&restriction.property.term);
                match &restriction.filler {
                    Some(Filler::Expression(filler)) => filler.collect_term_references(references),
                    Some(Filler::Value(Value::Individual(term))) => references.push(term),
                    Some(Filler::Value(Value::Literal(LiteralValue::Typed { datatype, .. }))) => {
                        references.push(datatype);
                    }
                    Some(Filler::Value(Value::Literal(_))) | None => (),
                }
            }
        }
    }

    /// Returns the depth of the expression tree, a single term having depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Self::TermReference(_) => 1,
            Self::Intersection(operands) | Self::Union(operands) => {
                1 + operands.iter().map(Self::depth).max().unwrap_or(0)
            }
            Self::Complement(inner) => 1 + inner.depth(),
            Self::Restriction(restriction) => match &restriction.filler {
                Some(Filler::Expression(filler)) => 1 + filler.depth(),
                _ => 1,
            },
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TermReference(term) => write!(f, "{term}"),
            Self::Intersection(operands) => write_operands(f, operands, " and "),
            Self::Union(operands) => write_operands(f, operands, " or "),
            Self::Complement(inner) => {
                if matches!(**inner, Self::Intersection(_) | Self::Union(_)) {
                    write!(f, "not ({inner})")
                } else {
                    write!(f, "not {inner}")
                }
            }
            Self::Restriction(restriction) => write!(f, "{restriction}"),
        }
    }
}

fn write_operands(f: &mut fmt::Formatter<'_>, operands: &[Expression], separator: &str) -> fmt::Result {
    for (i, operand) in operands.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        if matches!(operand, Expression::Intersection(_) | Expression::Union(_)) {
            write!(f, "({operand})")?;
        } else {
            write!(f, "{operand}")?;
        }
    }
    Ok(())
}

/// An identifier as written in a cell.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum TermReference {
    /// `<http://example.com/x>`, without the brackets.
    Iri(String),
    /// A CURIE (`ex:x`), an OBO identifier (`PO:0000003`) or a bare name.
    Name(String),
    /// `'leaf'` or `PO:'leaf'`.
    Label {
        prefix: Option<String>,
        label: String,
    },
    /// `_:x`, without the `_:`.
    Anonymous(String),
}

impl fmt::Display for TermReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(iri) => write!(f, "<{iri}>"),
            Self::Name(name) => f.write_str(name),
            Self::Label { prefix, label } => {
                if let Some(prefix) = prefix {
                    write!(f, "{prefix}:")?;
                }
                write_quoted(f, label, '\'')
            }
            Self::Anonymous(name) => write!(f, "_:{name}"),
        }
    }
}

/// The property of a restriction.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct PropertyReference {
    pub term: TermReference,
    /// `inverse p`
    pub inverse: bool,
}

impl fmt::Display for PropertyReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inverse {
            write!(f, "inverse {}", self.term)
        } else {
            write!(f, "{}", self.term)
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Quantifier {
    /// `some`
    Some,
    /// `only` or `all`
    All,
    /// `value`
    Value,
    /// `exactly`
    Exactly,
    /// `min`
    Min,
    /// `max`
    Max,
}

impl Quantifier {
    /// Returns true for the quantifiers that take a cardinality.
    pub fn has_cardinality(self) -> bool {
        matches!(self, Self::Exactly | Self::Min | Self::Max)
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Some => "some",
            Self::All => "only",
            Self::Value => "value",
            Self::Exactly => "exactly",
            Self::Min => "min",
            Self::Max => "max",
        })
    }
}

/// A property restriction.
///
/// `cardinality` is set exactly when the quantifier [has one](Quantifier::has_cardinality).
/// Cardinality restrictions may omit their filler.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Restriction {
    pub property: PropertyReference,
    pub quantifier: Quantifier,
    pub cardinality: Option<u32>,
    pub filler: Option<Filler>,
}

impl fmt::Display for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.property, self.quantifier)?;
        if let Some(cardinality) = self.cardinality {
            write!(f, " {cardinality}")?;
        }
        match &self.filler {
            Some(Filler::Expression(filler @ (Expression::Intersection(_) | Expression::Union(_)))) => {
                write!(f, " ({filler})")
            }
            Some(Filler::Expression(filler)) => write!(f, " {filler}"),
            Some(Filler::Value(value)) => write!(f, " {value}"),
            None => Ok(()),
        }
    }
}

/// What a restriction constrains the property values to.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum Filler {
    /// A class expression, or a data range for data properties.
    Expression(Expression),
    /// The single value of a `value` restriction.
    Value(Value),
}

/// An individual or a literal.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum Value {
    Individual(TermReference),
    Literal(LiteralValue),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Individual(term) => write!(f, "{term}"),
            Self::Literal(literal) => write!(f, "{literal}"),
        }
    }
}

/// A literal as written in a cell.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum LiteralValue {
    /// `"text"` or `"text"@en`
    String {
        value: String,
        language: Option<String>,
    },
    /// `"text"^^xsd:date`
    Typed {
        value: String,
        datatype: TermReference,
    },
    /// `42`, `-3`
    Integer(String),
    /// `1.5`
    Decimal(String),
    /// `true` or `false`
    Boolean(bool),
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String { value, language } => {
                write_quoted(f, value, '"')?;
                if let Some(language) = language {
                    write!(f, "@{language}")?;
                }
                Ok(())
            }
            Self::Typed { value, datatype } => {
                write_quoted(f, value, '"')?;
                write!(f, "^^{datatype}")
            }
            Self::Integer(value) | Self::Decimal(value) => f.write_str(value),
            Self::Boolean(value) => write!(f, "{value}"),
        }
    }
}

/// A property assertion cell: `[not] property value`.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Fact {
    pub negated: bool,
    pub property: TermReference,
    pub value: Value,
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("not ")?;
        }
        write!(f, "{} {}", self.property, self.value)
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str, quote: char) -> fmt::Result {
    write!(f, "{quote}")?;
    for c in value.chars() {
        if c == quote || c == '\\' {
            write!(f, "\\")?;
        }
        write!(f, "{c}")?;
    }
    write!(f, "{quote}")
}
