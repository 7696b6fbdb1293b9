use crate::ast::TermReference;
use crate::error::SyntaxError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Keyword {
    And,
    Or,
    Not,
    Some,
    Only,
    Value,
    Exactly,
    Min,
    Max,
    Inverse,
}

impl Keyword {
    fn from_word(word: &str) -> Option<Self> {
        Some(match word.to_ascii_lowercase().as_str() {
            "and" => Self::And,
            "or" => Self::Or,
            "not" => Self::Not,
            "some" => Self::Some,
            "only" | "all" => Self::Only,
            "value" => Self::Value,
            "exactly" => Self::Exactly,
            "min" => Self::Min,
            "max" => Self::Max,
            "inverse" => Self::Inverse,
            _ => return None,
        })
    }

    /// Keywords that follow a property to form a restriction.
    pub(crate) fn is_quantifier(self) -> bool {
        matches!(
            self,
            Self::Some | Self::Only | Self::Value | Self::Exactly | Self::Min | Self::Max
        )
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::Some => "some",
            Self::Only => "only",
            Self::Value => "value",
            Self::Exactly => "exactly",
            Self::Min => "min",
            Self::Max => "max",
            Self::Inverse => "inverse",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    LeftParen,
    RightParen,
    Keyword(Keyword),
    Term(TermReference),
    String(String),
    LanguageTag(String),
    DatatypeMarker,
    Integer(String),
    Decimal(String),
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LeftParen => f.write_str("'('"),
            Self::RightParen => f.write_str("')'"),
            Self::Keyword(keyword) => write!(f, "keyword '{keyword}'"),
            Self::Term(term) => write!(f, "term {term}"),
            Self::String(_) => f.write_str("string literal"),
            Self::LanguageTag(tag) => write!(f, "language tag '@{tag}'"),
            Self::DatatypeMarker => f.write_str("'^^'"),
            Self::Integer(value) | Self::Decimal(value) => write!(f, "number {value}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Position of the first character of the token.
    pub position: usize,
}

/// Splits an expression into tokens. Positions are counted in characters.
pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, SyntaxError> {
    let chars = input.chars().collect::<Vec<_>>();
    let mut tokens = Vec::new();
    let mut i = 0;
    while let Some(&c) = chars.get(i) {
        let start = i;
        let kind = match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '(' => {
                i += 1;
                TokenKind::LeftParen
            }
            ')' => {
                i += 1;
                TokenKind::RightParen
            }
            '<' => {
                let (iri, end) = read_iri(&chars, i)?;
                i = end;
                TokenKind::Term(TermReference::Iri(iri))
            }
            '\'' => {
                let (label, end) = read_quoted(&chars, i)?;
                i = end;
                TokenKind::Term(TermReference::Label {
                    prefix: None,
                    label,
                })
            }
            '"' => {
                let (value, end) = read_quoted(&chars, i)?;
                tokens.push(Token {
                    kind: TokenKind::String(value),
                    position: start,
                });
                i = end;
                match chars.get(i) {
                    Some('@') => {
                        let tag_start = i;
                        i += 1;
                        while chars
                            .get(i)
                            .is_some_and(|c| c.is_ascii_alphanumeric() || *c == '-')
                        {
                            i += 1;
                        }
                        let tag = chars[tag_start + 1..i].iter().collect::<String>();
                        if tag.is_empty() {
                            return Err(SyntaxError::new(tag_start, "empty language tag"));
                        }
                        tokens.push(Token {
                            kind: TokenKind::LanguageTag(tag),
                            position: tag_start,
                        });
                    }
                    Some('^') if chars.get(i + 1) == Some(&'^') => {
                        tokens.push(Token {
                            kind: TokenKind::DatatypeMarker,
                            position: i,
                        });
                        i += 2;
                    }
                    _ => (),
                }
                continue;
            }
            '>' | '^' | '@' => {
                return Err(SyntaxError::new(
                    i,
                    format!("unexpected character '{c}'"),
                ));
            }
            _ => {
                while chars.get(i).is_some_and(|c| is_word_char(*c)) {
                    i += 1;
                }
                let word = chars[start..i].iter().collect::<String>();
                if word.ends_with(':') && chars.get(i) == Some(&'\'') {
                    let (label, end) = read_quoted(&chars, i)?;
                    i = end;
                    TokenKind::Term(TermReference::Label {
                        prefix: Some(word[..word.len() - 1].to_owned()),
                        label,
                    })
                } else {
                    classify_word(word, start)?
                }
            }
        };
        tokens.push(Token {
            kind,
            position: start,
        });
    }
    Ok(tokens)
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '(' | ')' | '<' | '>' | '\'' | '"' | '^')
}

fn classify_word(word: String, position: usize) -> Result<TokenKind, SyntaxError> {
    if let Some(name) = word.strip_prefix("_:") {
        if name.is_empty() {
            return Err(SyntaxError::new(
                position,
                "anonymous individuals need a name after '_:'",
            ));
        }
        return Ok(TokenKind::Term(TermReference::Anonymous(name.to_owned())));
    }
    if is_integer(&word) {
        return Ok(TokenKind::Integer(word));
    }
    if is_decimal(&word) {
        return Ok(TokenKind::Decimal(word));
    }
    if let Some(keyword) = Keyword::from_word(&word) {
        return Ok(TokenKind::Keyword(keyword));
    }
    Ok(TokenKind::Term(TermReference::Name(word)))
}

fn is_integer(word: &str) -> bool {
    let digits = word.strip_prefix(['+', '-']).unwrap_or(word);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_decimal(word: &str) -> bool {
    let unsigned = word.strip_prefix(['+', '-']).unwrap_or(word);
    let Some((integer, fraction)) = unsigned.split_once('.') else {
        return false;
    };
    !fraction.is_empty()
        && integer.bytes().all(|b| b.is_ascii_digit())
        && fraction.bytes().all(|b| b.is_ascii_digit())
}

/// Reads `<...>` starting at the `<`, returning the IRI and the index after the `>`.
fn read_iri(chars: &[char], start: usize) -> Result<(String, usize), SyntaxError> {
    let mut i = start + 1;
    let mut iri = String::new();
    loop {
        match chars.get(i) {
            Some('>') => return Ok((iri, i + 1)),
            Some(c) if c.is_whitespace() => {
                return Err(SyntaxError::new(i, "whitespace inside of an IRI"));
            }
            Some(c) => iri.push(*c),
            None => return Err(SyntaxError::new(start, "unterminated IRI, missing '>'")),
        }
        i += 1;
    }
}

/// Reads a quoted text starting at the opening quote, returning the unescaped text and the index after the closing quote.
fn read_quoted(chars: &[char], start: usize) -> Result<(String, usize), SyntaxError> {
    let quote = chars[start];
    let mut i = start + 1;
    let mut text = String::new();
    loop {
        match chars.get(i) {
            Some('\\') => {
                let Some(escaped) = chars.get(i + 1) else {
                    return Err(SyntaxError::new(i, "unterminated escape sequence"));
                };
                text.push(*escaped);
                i += 2;
            }
            Some(c) if *c == quote => return Ok((text, i + 1)),
            Some(c) => {
                text.push(*c);
                i += 1;
            }
            None => {
                return Err(SyntaxError::new(
                    start,
                    format!("unterminated quoted text, missing {quote}"),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn words_and_keywords() {
        assert_eq!(
            kinds("PO:0000003 AND ex:leaf"),
            vec![
                TokenKind::Term(TermReference::Name("PO:0000003".into())),
                TokenKind::Keyword(Keyword::And),
                TokenKind::Term(TermReference::Name("ex:leaf".into())),
            ]
        );
        assert_eq!(
            kinds("(not x)"),
            vec![
                TokenKind::LeftParen,
                TokenKind::Keyword(Keyword::Not),
                TokenKind::Term(TermReference::Name("x".into())),
                TokenKind::RightParen,
            ]
        );
    }

    #[test]
    fn labels() {
        assert_eq!(
            kinds("PO:'plant organ' 'it\\'s'"),
            vec![
                TokenKind::Term(TermReference::Label {
                    prefix: Some("PO".into()),
                    label: "plant organ".into()
                }),
                TokenKind::Term(TermReference::Label {
                    prefix: None,
                    label: "it's".into()
                }),
            ]
        );
    }

    #[test]
    fn literals() {
        assert_eq!(
            kinds("\"leaf\"@en \"2\"^^xsd:int 3 -1.5 _:b1"),
            vec![
                TokenKind::String("leaf".into()),
                TokenKind::LanguageTag("en".into()),
                TokenKind::String("2".into()),
                TokenKind::DatatypeMarker,
                TokenKind::Term(TermReference::Name("xsd:int".into())),
                TokenKind::Integer("3".into()),
                TokenKind::Decimal("-1.5".into()),
                TokenKind::Term(TermReference::Anonymous("b1".into())),
            ]
        );
    }

    #[test]
    fn positions_are_in_characters() {
        let tokens = tokenize("'\u{e9}t\u{e9}' and x").unwrap();
        assert_eq!(tokens[1].position, 6);
        assert_eq!(tokens[2].position, 10);
    }

    #[test]
    fn errors() {
        assert_eq!(tokenize("'leaf").unwrap_err().position(), 0);
        assert_eq!(tokenize("a <http://x").unwrap_err().position(), 2);
        assert_eq!(tokenize("a > b").unwrap_err().position(), 2);
        assert!(tokenize("\"x\"@").is_err());
        assert!(tokenize("_:").is_err());
    }
}
