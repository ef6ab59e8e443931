/// Parser for Sorth
///
/// Hand-written recursive descent parser that type-checks stack effects as it
/// goes.

mod error;
mod lexer;
mod parser;

pub use error::{ErrorKind, Location, ParseError, ParseResult};
pub use lexer::{Keyword, Lexer, Token, TokenKind};
pub use parser::Parser;

use crate::ast::Program;

/// Parse and type-check a complete source text
pub fn parse_program(source: &str) -> ParseResult<Program> {
    Parser::new(source).parse()
}

/// Like `parse_program`, with `file_name` included in error locations
pub fn parse_program_named(source: &str, file_name: &str) -> ParseResult<Program> {
    Parser::new_with_filename(source, file_name).parse()
}

#[cfg(test)]
mod tests;
