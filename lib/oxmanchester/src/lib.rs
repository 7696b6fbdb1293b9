#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![doc(test(attr(deny(warnings))))]

mod ast;
mod delimited;
mod error;
mod lexer;
mod parser;

pub use ast::{
    Expression, Fact, Filler, LiteralValue, PropertyReference, Quantifier, Restriction,
    TermReference, Value,
};
pub use delimited::split_values;
pub use error::SyntaxError;
pub use parser::{DEFAULT_MAX_DEPTH, ExpressionParser, parse_expression};
