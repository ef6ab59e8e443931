/**
Parse failures for Sorth

Every problem found while parsing and type-checking a source file is a
`ParseError`: where it happened and what went wrong. Parsing stops at the
first one.
*/

use crate::ast::types::{TypeSignature, TypeStack};
use crate::parser::lexer::Keyword;
use std::fmt;
use thiserror::Error;

/// Source position of the token that triggered the failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: Option<String>,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}:", file)?;
        }
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("unexpected end of file, scope is left unclosed")]
    UnterminatedScope,

    #[error("unknown word: {0}")]
    UnknownWord(String),

    #[error("not enough data on the stack for '{word}': needs {required}, has {available}")]
    StackUnderflow {
        word: String,
        required: usize,
        available: usize,
    },

    #[error("types on the stack don't match '{word}': expected [{expected}], found [{found}]")]
    TypeMismatch {
        word: String,
        expected: TypeStack,
        found: TypeStack,
    },

    #[error("unexpected '{keyword}': {reason}")]
    MisplacedKeyword {
        keyword: Keyword,
        reason: &'static str,
    },

    #[error("{0} not implemented yet")]
    Unimplemented(&'static str),

    #[error("redefinition of function: {0}")]
    DuplicateFunction(String),

    #[error("unknown type: {0}")]
    UnknownType(String),

    #[error("function '{name}' signature does not match: expected ({expected}), got ({actual})")]
    SignatureMismatch {
        name: String,
        expected: TypeSignature,
        actual: TypeSignature,
    },

    #[error("conditional branch {branch} has effect ({actual}), other branches have ({expected})")]
    BranchMismatch {
        branch: usize,
        expected: TypeSignature,
        actual: TypeSignature,
    },

    #[error("condition must leave a bool on top of the stack, found [{found}]")]
    ConditionNotBool { found: TypeStack },

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parse error at {location}: {kind}")]
pub struct ParseError {
    pub kind: ErrorKind,
    pub location: Location,
}

pub type ParseResult<T> = Result<T, ParseError>;
