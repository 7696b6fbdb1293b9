//! Term records, the rows of the term tables.

use crate::error::RecordError;
use oxmanchester::{ExpressionParser, LiteralValue, Value, split_values};
use oxonto::EntityKind;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Where a record comes from: the name of its table and its row number.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Provenance {
    source: String,
    row: usize,
}

impl Provenance {
    #[inline]
    pub fn new(source: impl Into<String>, row: usize) -> Self {
        Self {
            source: source.into(),
            row,
        }
    }

    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn row(&self) -> usize {
        self.row
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.row)
    }
}

/// An annotation value, with an optional language tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnnotationText {
    pub value: String,
    pub language: Option<String>,
}

impl AnnotationText {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            language: None,
        }
    }
}

/// One table row describing a single entity.
///
/// Expression cells are kept as text: they are parsed and resolved by the compiler once every
/// table has been declared. Cells may hold several `;`-separated values.
///
/// `annotations` maps annotation property identifiers (or plain column names) to their values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermRecord {
    pub id: String,
    pub label: Option<String>,
    pub kind: EntityKind,
    pub parent: Option<String>,
    /// Entities this one is the parent of (`Superclass of`, `Superproperty of`).
    pub children: Option<String>,
    pub equivalent: Option<String>,
    pub disjoint: Option<String>,
    pub definition: Option<String>,
    pub comments: Vec<String>,
    pub domain: Option<String>,
    pub range: Option<String>,
    pub inverse: Option<String>,
    pub characteristics: Option<String>,
    pub instance_of: Option<String>,
    pub relations: Option<String>,
    pub data_facts: Option<String>,
    pub annotations: BTreeMap<String, Vec<AnnotationText>>,
    pub provenance: Provenance,
}

impl TermRecord {
    /// A record with only an identifier and a kind.
    pub fn new(id: impl Into<String>, kind: EntityKind, provenance: Provenance) -> Self {
        Self {
            id: id.into(),
            label: None,
            kind,
            parent: None,
            children: None,
            equivalent: None,
            disjoint: None,
            definition: None,
            comments: Vec::new(),
            domain: None,
            range: None,
            inverse: None,
            characteristics: None,
            instance_of: None,
            relations: None,
            data_facts: None,
            annotations: BTreeMap::new(),
            provenance,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub fn with_equivalent(mut self, equivalent: impl Into<String>) -> Self {
        self.equivalent = Some(equivalent.into());
        self
    }

    #[must_use]
    pub fn with_disjoint(mut self, disjoint: impl Into<String>) -> Self {
        self.disjoint = Some(disjoint.into());
        self
    }

    #[must_use]
    pub fn with_annotation(mut self, property: impl Into<String>, value: AnnotationText) -> Self {
        self.annotations
            .entry(property.into())
            .or_default()
            .push(value);
        self
    }

    /// Builds a record from `(column name, cell)` pairs.
    ///
    /// Column names are matched case-insensitively. `Type` gives the entity kind, falling back to `default_kind`
    /// for tables holding a single kind of entity. Cells of the `Annotations` column are `property "text"` pairs.
    /// Unknown columns, and columns whose name starts with `@`, become annotations keyed by the column name.
    /// Empty cells are ignored.
    ///
    /// ```
    /// use oxonto::EntityKind;
    /// use oxontobuild::{Provenance, TermRecord};
    ///
    /// let record = TermRecord::from_columns(
    ///     [("ID", "OBTO:0011"), ("Label", "leaf blade"), ("Subclass of", "OBITO:0001"), ("@rdfs:seeAlso", "x")],
    ///     Some(EntityKind::Class),
    ///     Provenance::new("classes.csv", 2),
    /// )?;
    /// assert_eq!(record.parent.as_deref(), Some("OBITO:0001"));
    /// assert_eq!(record.annotations["rdfs:seeAlso"][0].value, "x");
    /// # Result::<_, oxontobuild::RecordError>::Ok(())
    /// ```
    pub fn from_columns<'a>(
        columns: impl IntoIterator<Item = (&'a str, &'a str)>,
        default_kind: Option<EntityKind>,
        provenance: Provenance,
    ) -> Result<Self, RecordError> {
        let mut id = None;
        let mut kind = default_kind;
        let mut record = Self::new(String::new(), EntityKind::Class, provenance);
        for (column, cell) in columns {
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            let value = Some(cell.to_owned());
            match normalize_column(column).as_str() {
                "id" | "iri" => id = value,
                "label" => record.label = Some(unquote(cell)),
                "type" | "kind" | "entity type" => kind = Some(cell.parse()?),
                "parent" | "subclass of" | "subproperty of" => record.parent = value,
                "superclass of" | "superproperty of" | "children" => record.children = value,
                "equivalent to" | "equivalent" => record.equivalent = value,
                "disjoint with" | "disjoint" => record.disjoint = value,
                "text definition" | "definition" => record.definition = Some(unquote(cell)),
                "comments" | "comment" => {
                    for comment in split_values(cell)? {
                        record.comments.push(unquote(&comment));
                    }
                }
                "annotations" => {
                    for (property, text) in parse_annotations(cell)? {
                        record.annotations.entry(property).or_default().push(text);
                    }
                }
                "domain" => record.domain = value,
                "range" => record.range = value,
                "inverse" => record.inverse = value,
                "characteristics" => record.characteristics = value,
                "instance of" => record.instance_of = value,
                "relations" => record.relations = value,
                "data facts" => record.data_facts = value,
                _ => {
                    let property = column.trim();
                    let property = property.strip_prefix('@').unwrap_or(property).trim();
                    record
                        .annotations
                        .entry(property.to_owned())
                        .or_default()
                        .push(AnnotationText::new(unquote(cell)));
                }
            }
        }
        record.id = id.ok_or_else(|| RecordError::Malformed("the ID column is empty".into()))?;
        record.kind = kind.ok_or_else(|| {
            RecordError::Malformed(format!("no entity type is given for {}", record.id))
        })?;
        Ok(record)
    }
}

/// The rows of one input table, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTable {
    name: String,
    records: Vec<TermRecord>,
}

impl SourceTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Vec::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn records(&self) -> &[TermRecord] {
        &self.records
    }

    pub fn push(&mut self, record: TermRecord) {
        self.records.push(record);
    }
}

impl Extend<TermRecord> for SourceTable {
    fn extend<I: IntoIterator<Item = TermRecord>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}

fn normalize_column(column: &str) -> String {
    column
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Removes the double or single quotes around a value and unescapes the quotes inside.
pub(crate) fn unquote(value: &str) -> String {
    let value = value.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|inner| inner.strip_suffix(quote))
        {
            return inner.replace(&format!("\\{quote}"), &quote.to_string());
        }
    }
    value.to_owned()
}

fn parse_annotations(cell: &str) -> Result<Vec<(String, AnnotationText)>, RecordError> {
    let parser = ExpressionParser::new();
    let mut annotations = Vec::new();
    for value in split_values(cell)? {
        let fact = parser.parse_fact(&value)?;
        let text = match fact.value {
            Value::Literal(LiteralValue::String { value, language }) if !fact.negated => {
                AnnotationText { value, language }
            }
            _ => {
                return Err(RecordError::Malformed(format!(
                    "annotations must be written 'property \"text\"', found '{value}'"
                )));
            }
        };
        annotations.push((fact.property.to_string(), text));
    }
    Ok(annotations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provenance() -> Provenance {
        Provenance::new("terms.csv", 3)
    }

    #[test]
    fn columns_are_case_insensitive() {
        let record = TermRecord::from_columns(
            [
                ("id", "OBTO:0010"),
                ("TYPE", "object property"),
                ("Subproperty_of", "BFO:0000050"),
                ("Characteristics", "transitive"),
                ("Text Definition", "\"A \\\"part\\\" relation.\""),
            ],
            None,
            provenance(),
        )
        .unwrap();
        assert_eq!(record.kind, EntityKind::ObjectProperty);
        assert_eq!(record.parent.as_deref(), Some("BFO:0000050"));
        assert_eq!(record.definition.as_deref(), Some("A \"part\" relation."));
        assert_eq!(record.characteristics.as_deref(), Some("transitive"));
    }

    #[test]
    fn annotations_and_comments() {
        let record = TermRecord::from_columns(
            [
                ("ID", "OBTO:0011"),
                ("Comments", "\"first; still first\"; second"),
                ("Annotations", "ex:note \"bonjour\"@fr; rdfs:seeAlso \"x\""),
                ("editor note", "check the range"),
                ("Empty", "  "),
            ],
            Some(EntityKind::Class),
            provenance(),
        )
        .unwrap();
        assert_eq!(record.comments, ["first; still first", "second"]);
        assert_eq!(
            record.annotations["ex:note"],
            [AnnotationText {
                value: "bonjour".into(),
                language: Some("fr".into())
            }]
        );
        assert_eq!(record.annotations["rdfs:seeAlso"][0].value, "x");
        assert_eq!(
            record.annotations["editor note"][0].value,
            "check the range"
        );
        assert!(!record.annotations.contains_key("Empty"));
    }

    #[test]
    fn quoted_cells() {
        let record = TermRecord::from_columns(
            [
                ("ID", "OBTO:0012"),
                ("Label", "'leaf blade'"),
                ("Curator", "'J. O\\'Neill'"),
            ],
            Some(EntityKind::Class),
            provenance(),
        )
        .unwrap();
        assert_eq!(record.label.as_deref(), Some("leaf blade"));
        assert_eq!(record.annotations["Curator"][0].value, "J. O'Neill");
    }

    #[test]
    fn missing_columns() {
        assert!(matches!(
            TermRecord::from_columns([("Label", "leaf")], Some(EntityKind::Class), provenance()),
            Err(RecordError::Malformed(_))
        ));
        assert!(matches!(
            TermRecord::from_columns([("ID", "OBTO:0001")], None, provenance()),
            Err(RecordError::Malformed(_))
        ));
        assert!(matches!(
            TermRecord::from_columns(
                [("ID", "OBTO:0001"), ("Type", "rule")],
                None,
                provenance()
            ),
            Err(RecordError::UnknownName(_))
        ));
        assert!(
            TermRecord::from_columns(
                [("ID", "OBTO:0001"), ("Annotations", "ex:note 12")],
                Some(EntityKind::Class),
                provenance()
            )
            .is_err()
        );
    }
}
