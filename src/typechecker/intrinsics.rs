/**
Intrinsic catalog for Sorth

Built-in operations, their input arity, the AST operation each one becomes,
and the rule that computes each one's stack effect from the types currently
on top of the stack:
- Arithmetic and logic: +, -, *, /, and, or, xor, not
- Stack operations: drop, dup, swap
- Comparisons: =, <, >
*/

use crate::ast::Operation;
use crate::ast::types::{Type, TypeSignature, TypeStack};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intrinsic {
    // arithmetic
    Add,
    Sub,
    Mul,
    Div,
    // logic
    And,
    Or,
    Xor,
    Not,
    // stack ops
    Drop,
    Swap,
    Dup,
    // comparisons
    Equal,
    Less,
    Greater,
}

/// Every intrinsic with its source spelling
pub const INTRINSICS: &[(&str, Intrinsic)] = &[
    ("+", Intrinsic::Add),
    ("-", Intrinsic::Sub),
    ("*", Intrinsic::Mul),
    ("/", Intrinsic::Div),
    ("and", Intrinsic::And),
    ("or", Intrinsic::Or),
    ("xor", Intrinsic::Xor),
    ("not", Intrinsic::Not),
    ("drop", Intrinsic::Drop),
    ("swap", Intrinsic::Swap),
    ("dup", Intrinsic::Dup),
    ("=", Intrinsic::Equal),
    ("<", Intrinsic::Less),
    (">", Intrinsic::Greater),
];

impl Intrinsic {
    pub fn from_symbol(symbol: &str) -> Option<Intrinsic> {
        INTRINSICS
            .iter()
            .find(|(name, _)| *name == symbol)
            .map(|(_, intrinsic)| *intrinsic)
    }

    pub fn symbol(&self) -> &'static str {
        INTRINSICS
            .iter()
            .find(|(_, intrinsic)| intrinsic == self)
            .map(|(name, _)| *name)
            .unwrap_or("?")
    }

    /// Number of stack values the intrinsic consumes
    pub fn input_arity(&self) -> usize {
        match self {
            Intrinsic::Drop | Intrinsic::Dup => 1,
            Intrinsic::Add
            | Intrinsic::Sub
            | Intrinsic::Mul
            | Intrinsic::Div
            | Intrinsic::Swap
            | Intrinsic::And
            | Intrinsic::Or
            | Intrinsic::Xor
            | Intrinsic::Not
            | Intrinsic::Equal
            | Intrinsic::Less
            | Intrinsic::Greater => 2,
        }
    }

    pub fn to_operation(&self) -> Operation {
        match self {
            Intrinsic::Add => Operation::Add,
            Intrinsic::Sub => Operation::Sub,
            Intrinsic::Mul => Operation::Mul,
            Intrinsic::Div => Operation::Div,
            Intrinsic::And => Operation::And,
            Intrinsic::Or => Operation::Or,
            Intrinsic::Xor => Operation::Xor,
            Intrinsic::Not => Operation::Not,
            Intrinsic::Drop => Operation::Drop,
            Intrinsic::Swap => Operation::Swap,
            Intrinsic::Dup => Operation::Dup,
            Intrinsic::Equal => Operation::Equal,
            Intrinsic::Less => Operation::Less,
            Intrinsic::Greater => Operation::Greater,
        }
    }

    /// Stack effect of the intrinsic given the current stack.
    ///
    /// The caller must have checked that `stack` holds at least
    /// `input_arity()` values.
    pub fn signature_for(&self, stack: &TypeStack) -> TypeSignature {
        let top = stack.top(self.input_arity()).unwrap_or_else(|| {
            panic!(
                "signature_for({}) called with {} values on the stack",
                self,
                stack.depth()
            )
        });

        match self {
            // TODO: pick the arithmetic result type from the operands once floats exist
            Intrinsic::Add
            | Intrinsic::Sub
            | Intrinsic::Mul
            | Intrinsic::Div
            | Intrinsic::And
            | Intrinsic::Or
            | Intrinsic::Xor
            | Intrinsic::Not => TypeSignature::from_vecs(vec![Type::Int, Type::Int], vec![Type::Int]),
            Intrinsic::Drop => TypeSignature::from_vecs(vec![top[0]], vec![]),
            Intrinsic::Dup => TypeSignature::from_vecs(vec![top[0]], vec![top[0], top[0]]),
            Intrinsic::Swap => {
                let (below, above) = (top[0], top[1]);
                TypeSignature::from_vecs(vec![below, above], vec![above, below])
            }
            Intrinsic::Equal | Intrinsic::Less | Intrinsic::Greater => {
                TypeSignature::from_vecs(vec![Type::Int, Type::Int], vec![Type::Bool])
            }
        }
    }
}

impl fmt::Display for Intrinsic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
