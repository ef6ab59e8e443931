/// Sorth - a small concatenative language
///
/// This crate implements the Sorth front end:
/// - Abstract syntax tree (AST) representation
/// - Lexer and recursive descent parser
/// - Stack-effect type checking fused into the parser
///
/// The result is a `Program` whose every scope carries its inferred
/// signature, ready for a separate code generation stage.

pub mod ast;
pub mod parser;
pub mod typechecker;

pub use ast::types::{Type, TypeSignature, TypeStack};
pub use ast::{Conditional, ConditionalBranch, Expr, Function, Loop, Operation, Program, Scope};
pub use parser::{ParseError, ParseResult, Parser, parse_program, parse_program_named};
