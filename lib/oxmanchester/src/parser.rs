use crate::ast::{
    Expression, Fact, Filler, LiteralValue, PropertyReference, Quantifier, Restriction,
    TermReference, Value,
};
use crate::error::SyntaxError;
use crate::lexer::{Keyword, Token, TokenKind, tokenize};
use std::iter::Peekable;
use std::vec;

/// The default bound on the nesting depth of parsed expressions.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Parses the expressions written in term table cells.
///
/// The grammar is a subset of the Manchester syntax, from the loosest to the tightest binding:
/// ```text
/// expression  := conjunction ("or" conjunction)*
/// conjunction := complement ("and" complement)*
/// complement  := "not" complement | primary
/// primary     := "(" expression ")" | property restriction? | term
/// property    := "inverse"? term
/// restriction := ("some" | "only" | "all") complement
///              | "value" (literal | term)
///              | ("exactly" | "min" | "max") integer complement?
/// ```
///
/// Keywords are case-insensitive. Terms are IRIs (`<...>`), names (CURIEs, OBO identifiers...)
/// or quoted labels (`'leaf'`, `PO:'leaf'`); they are not resolved by the parser.
///
/// ```
/// use oxmanchester::{Expression, ExpressionParser};
///
/// let expression = ExpressionParser::new().parse("'part of' some PO:0009006 and not 'root'")?;
/// assert!(matches!(expression, Expression::Intersection(ref operands) if operands.len() == 2));
/// # Result::<_, oxmanchester::SyntaxError>::Ok(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ExpressionParser {
    max_depth: usize,
}

impl ExpressionParser {
    /// A parser with the default nesting limit, [`DEFAULT_MAX_DEPTH`].
    #[inline]
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Bounds the nesting depth of the parsed expressions.
    ///
    /// Deeper expressions are rejected with a [`SyntaxError`].
    #[inline]
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parses a class expression.
    pub fn parse(&self, input: &str) -> Result<Expression, SyntaxError> {
        let mut stream = self.stream(input)?;
        let expression = stream.union()?;
        stream.expect_end()?;
        Ok(expression)
    }

    /// Parses a single term, e.g. the content of an `inverse` or `range` cell.
    pub fn parse_term(&self, input: &str) -> Result<TermReference, SyntaxError> {
        let mut stream = self.stream(input)?;
        let term = stream.term("expected a term")?;
        stream.expect_end()?;
        Ok(term)
    }

    /// Parses a property assertion: `[not] property value`.
    pub fn parse_fact(&self, input: &str) -> Result<Fact, SyntaxError> {
        let mut stream = self.stream(input)?;
        let negated = stream.peek_keyword() == Some(Keyword::Not);
        if negated {
            stream.advance();
        }
        let property = stream.term("expected a property")?;
        let value = stream.value()?;
        stream.expect_end()?;
        Ok(Fact {
            negated,
            property,
            value,
        })
    }

    fn stream(&self, input: &str) -> Result<TokenStream, SyntaxError> {
        let tokens = tokenize(input)?;
        if tokens.is_empty() {
            return Err(SyntaxError::new(0, "empty expression"));
        }
        Ok(TokenStream {
            tokens: tokens.into_iter().peekable(),
            end: input.chars().count(),
            depth: 0,
            max_depth: self.max_depth,
        })
    }
}

impl Default for ExpressionParser {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a class expression with the default settings.
pub fn parse_expression(input: &str) -> Result<Expression, SyntaxError> {
    ExpressionParser::new().parse(input)
}

struct TokenStream {
    tokens: Peekable<vec::IntoIter<Token>>,
    end: usize,
    depth: usize,
    max_depth: usize,
}

impl TokenStream {
    fn advance(&mut self) -> Option<Token> {
        self.tokens.next()
    }

    fn peek(&mut self) -> Option<&TokenKind> {
        self.tokens.peek().map(|token| &token.kind)
    }

    fn peek_keyword(&mut self) -> Option<Keyword> {
        match self.peek() {
            Some(TokenKind::Keyword(keyword)) => Some(*keyword),
            _ => None,
        }
    }

    fn position(&mut self) -> usize {
        let end = self.end;
        self.tokens.peek().map_or(end, |token| token.position)
    }

    fn error(&mut self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(self.position(), message)
    }

    fn expect_end(&mut self) -> Result<(), SyntaxError> {
        match self.advance() {
            None => Ok(()),
            Some(Token {
                kind: TokenKind::RightParen,
                position,
            }) => Err(SyntaxError::new(
                position,
                "unbalanced parenthesis: unexpected ')'",
            )),
            Some(token) => Err(SyntaxError::new(
                token.position,
                format!("unexpected {} after the end of the expression", token.kind),
            )),
        }
    }

    fn enter(&mut self) -> Result<(), SyntaxError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            let max_depth = self.max_depth;
            return Err(self.error(format!(
                "the expression exceeds the maximum nesting depth of {max_depth}"
            )));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn union(&mut self) -> Result<Expression, SyntaxError> {
        let first = self.intersection()?;
        if self.peek_keyword() != Some(Keyword::Or) {
            return Ok(first);
        }
        let mut operands = vec![first];
        while self.peek_keyword() == Some(Keyword::Or) {
            self.advance();
            operands.push(self.intersection()?);
        }
        Ok(Expression::Union(operands))
    }

    fn intersection(&mut self) -> Result<Expression, SyntaxError> {
        let first = self.complement()?;
        if self.peek_keyword() != Some(Keyword::And) {
            return Ok(first);
        }
        let mut operands = vec![first];
        while self.peek_keyword() == Some(Keyword::And) {
            self.advance();
            operands.push(self.complement()?);
        }
        Ok(Expression::Intersection(operands))
    }

    fn complement(&mut self) -> Result<Expression, SyntaxError> {
        if self.peek_keyword() != Some(Keyword::Not) {
            return self.primary();
        }
        self.advance();
        self.enter()?;
        let inner = self.complement()?;
        self.leave();
        Ok(Expression::Complement(Box::new(inner)))
    }

    fn primary(&mut self) -> Result<Expression, SyntaxError> {
        let Some(token) = self.advance() else {
            return Err(self.error("unexpected end of the expression"));
        };
        match token.kind {
            TokenKind::LeftParen => {
                self.enter()?;
                let inner = self.union()?;
                self.leave();
                match self.advance() {
                    Some(Token {
                        kind: TokenKind::RightParen,
                        ..
                    }) => Ok(inner),
                    Some(other) => Err(SyntaxError::new(
                        other.position,
                        format!("expected ')', found {}", other.kind),
                    )),
                    None => Err(SyntaxError::new(
                        token.position,
                        "unbalanced parenthesis: missing ')'",
                    )),
                }
            }
            TokenKind::Keyword(Keyword::Inverse) => {
                let term = self.term("expected a property after 'inverse'")?;
                if !self.peek_keyword().is_some_and(Keyword::is_quantifier) {
                    return Err(self.error("expected a restriction after 'inverse <property>'"));
                }
                self.restriction(PropertyReference {
                    term,
                    inverse: true,
                })
            }
            TokenKind::Term(term) => {
                if self.peek_keyword().is_some_and(Keyword::is_quantifier) {
                    self.restriction(PropertyReference {
                        term,
                        inverse: false,
                    })
                } else {
                    Ok(Expression::TermReference(term))
                }
            }
            TokenKind::RightParen => Err(SyntaxError::new(
                token.position,
                "unbalanced parenthesis: unexpected ')'",
            )),
            kind => Err(SyntaxError::new(
                token.position,
                format!("expected a class expression, found {kind}"),
            )),
        }
    }

    fn restriction(&mut self, property: PropertyReference) -> Result<Expression, SyntaxError> {
        let Some(Token {
            kind: TokenKind::Keyword(keyword),
            position,
        }) = self.advance()
        else {
            return Err(self.error("expected a restriction keyword"));
        };
        let (quantifier, cardinality, filler) = match keyword {
            Keyword::Some | Keyword::Only => {
                let quantifier = if keyword == Keyword::Some {
                    Quantifier::Some
                } else {
                    Quantifier::All
                };
                (quantifier, None, Some(self.filler()?))
            }
            Keyword::Value => (Quantifier::Value, None, Some(Filler::Value(self.value()?))),
            Keyword::Exactly | Keyword::Min | Keyword::Max => {
                let quantifier = match keyword {
                    Keyword::Exactly => Quantifier::Exactly,
                    Keyword::Min => Quantifier::Min,
                    _ => Quantifier::Max,
                };
                let cardinality = self.cardinality()?;
                let filler = if self.starts_operand() {
                    Some(self.filler()?)
                } else {
                    None
                };
                (quantifier, Some(cardinality), filler)
            }
            _ => {
                return Err(SyntaxError::new(
                    position,
                    format!("'{keyword}' cannot start a restriction"),
                ));
            }
        };
        Ok(Expression::Restriction(Box::new(Restriction {
            property,
            quantifier,
            cardinality,
            filler,
        })))
    }

    fn filler(&mut self) -> Result<Filler, SyntaxError> {
        self.enter()?;
        let filler = self.complement()?;
        self.leave();
        Ok(Filler::Expression(filler))
    }

    fn starts_operand(&mut self) -> bool {
        matches!(
            self.peek(),
            Some(
                TokenKind::LeftParen
                    | TokenKind::Term(_)
                    | TokenKind::Keyword(Keyword::Not | Keyword::Inverse)
            )
        )
    }

    fn cardinality(&mut self) -> Result<u32, SyntaxError> {
        let position = self.position();
        match self.advance().map(|token| token.kind) {
            Some(TokenKind::Integer(value)) => value.parse::<u32>().map_err(|_| {
                SyntaxError::new(
                    position,
                    format!("cardinality must be a non-negative integer, found '{value}'"),
                )
            }),
            Some(TokenKind::Decimal(value)) => Err(SyntaxError::new(
                position,
                format!("cardinality must be a non-negative integer, found '{value}'"),
            )),
            Some(other) => Err(SyntaxError::new(
                position,
                format!("expected a cardinality, found {other}"),
            )),
            None => Err(SyntaxError::new(position, "expected a cardinality")),
        }
    }

    fn value(&mut self) -> Result<Value, SyntaxError> {
        let position = self.position();
        let Some(token) = self.advance() else {
            return Err(SyntaxError::new(
                position,
                "expected an individual or a literal",
            ));
        };
        Ok(match token.kind {
            TokenKind::String(value) => Value::Literal(self.string_literal(value)?),
            TokenKind::Integer(value) => Value::Literal(LiteralValue::Integer(value)),
            TokenKind::Decimal(value) => Value::Literal(LiteralValue::Decimal(value)),
            TokenKind::Term(TermReference::Name(name)) if name.eq_ignore_ascii_case("true") => {
                Value::Literal(LiteralValue::Boolean(true))
            }
            TokenKind::Term(TermReference::Name(name)) if name.eq_ignore_ascii_case("false") => {
                Value::Literal(LiteralValue::Boolean(false))
            }
            TokenKind::Term(term) => Value::Individual(term),
            other => {
                return Err(SyntaxError::new(
                    position,
                    format!("expected an individual or a literal, found {other}"),
                ));
            }
        })
    }

    fn string_literal(&mut self, value: String) -> Result<LiteralValue, SyntaxError> {
        match self.peek() {
            Some(TokenKind::LanguageTag(_)) => {
                let Some(Token {
                    kind: TokenKind::LanguageTag(language),
                    ..
                }) = self.advance()
                else {
                    return Err(self.error("expected a language tag"));
                };
                Ok(LiteralValue::String {
                    value,
                    language: Some(language),
                })
            }
            Some(TokenKind::DatatypeMarker) => {
                self.advance();
                let datatype = self.term("expected a datatype after '^^'")?;
                Ok(LiteralValue::Typed { value, datatype })
            }
            _ => Ok(LiteralValue::String {
                value,
                language: None,
            }),
        }
    }

    fn term(&mut self, message: &str) -> Result<TermReference, SyntaxError> {
        let position = self.position();
        match self.advance() {
            Some(Token {
                kind: TokenKind::Term(term),
                ..
            }) => Ok(term),
            Some(token) => Err(SyntaxError::new(
                position,
                format!("{message}, found {}", token.kind),
            )),
            None => Err(SyntaxError::new(position, message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(value: &str) -> Expression {
        Expression::TermReference(TermReference::Name(value.into()))
    }

    #[test]
    fn precedence() {
        let expression = parse_expression("a or b and not c").unwrap();
        assert_eq!(
            expression,
            Expression::Union(vec![
                name("a"),
                Expression::Intersection(vec![
                    name("b"),
                    Expression::Complement(Box::new(name("c")))
                ])
            ])
        );
        assert_eq!(expression.to_string(), "a or (b and not c)");
    }

    #[test]
    fn parenthesis_override_precedence() {
        let expression = parse_expression("(a or b) and c").unwrap();
        assert!(
            matches!(&expression, Expression::Intersection(operands) if matches!(operands[0], Expression::Union(_)))
        );
    }

    #[test]
    fn nested_restrictions() {
        let expression = parse_expression("p some q only A").unwrap();
        let Expression::Restriction(outer) = expression else {
            panic!("not a restriction");
        };
        assert_eq!(outer.quantifier, Quantifier::Some);
        let Some(Filler::Expression(Expression::Restriction(inner))) = &outer.filler else {
            panic!("not a nested restriction");
        };
        assert_eq!(inner.quantifier, Quantifier::All);
    }

    #[test]
    fn unbalanced() {
        assert_eq!(parse_expression("(a and b").unwrap_err().position(), 0);
        assert_eq!(parse_expression("a and b)").unwrap_err().position(), 7);
        assert!(parse_expression("()").is_err());
    }

    #[test]
    fn empty() {
        assert!(parse_expression("").is_err());
        assert!(parse_expression("   ").is_err());
        assert!(parse_expression("a and").is_err());
    }
}
