pub mod ast;
pub mod error;
pub mod lexer;
pub mod naming;
pub mod parser;

pub use ast::{Attribute, Component, ComponentMap, Element, Span};
pub use error::{ParseError, ParseResult};
pub use lexer::{tokenize, MarkupToken, Tokenizer};
pub use parser::{parse, Parser};
