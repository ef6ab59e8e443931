/// Abstract Syntax Tree definitions for Sorth
///
/// The parser emits this tree with every scope already carrying its inferred
/// stack effect. Each node owns its children; there is no sharing.

pub mod types;

use std::collections::HashMap;
use std::fmt;
use types::TypeSignature;

/// A complete Sorth program, keyed by function name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub functions: HashMap<String, Function>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }

    pub fn get(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Register a function. Returns the function back if the name is taken.
    pub fn insert(&mut self, function: Function) -> Result<(), Function> {
        if self.contains(&function.name) {
            return Err(function);
        }
        self.functions.insert(function.name.clone(), function);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Functions sorted by name, for stable output
    pub fn sorted(&self) -> Vec<&Function> {
        let mut functions: Vec<&Function> = self.functions.values().collect();
        functions.sort_by(|a, b| a.name.cmp(&b.name));
        functions
    }
}

/// Function definition
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub signature: TypeSignature,
    pub body: Scope,
}

/// Primitive action performed by an operation node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    PushInt,
    Call,
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
    // stack
    Drop,
    Dup,
    Swap,
    // comparisons
    Equal,
    Less,
    Greater,
}

impl Operation {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operation::PushInt => "push",
            Operation::Call => "call",
            Operation::Add => "+",
            Operation::Sub => "-",
            Operation::Mul => "*",
            Operation::Div => "/",
            Operation::And => "and",
            Operation::Or => "or",
            Operation::Xor => "xor",
            Operation::Not => "not",
            Operation::Drop => "drop",
            Operation::Dup => "dup",
            Operation::Swap => "swap",
            Operation::Equal => "=",
            Operation::Less => "<",
            Operation::Greater => ">",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Expression in the body of a scope
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Intrinsic with no payload
    Operation(Operation),

    /// Operation carrying a name (function calls)
    StringOperation { op: Operation, value: String },

    /// Operation carrying an integer (literal pushes)
    IntOperation { op: Operation, value: i64 },

    /// Nested block
    Scope(Scope),

    /// if / elif / else chain
    Conditional(Conditional),

    /// While loop
    Loop(Loop),
}

impl Expr {
    pub fn push_int(value: i64) -> Self {
        Expr::IntOperation {
            op: Operation::PushInt,
            value,
        }
    }

    pub fn call(name: impl Into<String>) -> Self {
        Expr::StringOperation {
            op: Operation::Call,
            value: name.into(),
        }
    }
}

/// Ordered block of expressions with its inferred net effect
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    pub signature: TypeSignature,
    pub exprs: Vec<Expr>,
}

impl Scope {
    pub fn new() -> Self {
        Scope::default()
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionalBranch {
    pub condition: Scope,
    pub body: Scope,
}

/// `if cond { body } elif cond { body } else { body }`
///
/// A missing `else` is represented by an empty `else_body`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditional {
    pub signature: TypeSignature,
    pub first: ConditionalBranch,
    pub else_ifs: Vec<ConditionalBranch>,
    pub else_body: Scope,
}

impl Conditional {
    /// All condition/body pairs in source order
    pub fn branches(&self) -> impl Iterator<Item = &ConditionalBranch> {
        std::iter::once(&self.first).chain(self.else_ifs.iter())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Loop {
    pub signature: TypeSignature,
    pub condition: Scope,
    pub body: Scope,
}

fn write_exprs(f: &mut fmt::Formatter<'_>, exprs: &[Expr]) -> fmt::Result {
    for expr in exprs {
        write!(f, "{} ", expr)?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Operation(op) => write!(f, "{}", op),
            Expr::StringOperation { value, .. } => write!(f, "{}", value),
            Expr::IntOperation { value, .. } => write!(f, "{}", value),
            Expr::Scope(scope) => write!(f, "{}", scope),
            Expr::Conditional(cond) => write!(f, "{}", cond),
            Expr::Loop(lp) => {
                write!(f, "while ")?;
                write_exprs(f, &lp.condition.exprs)?;
                write!(f, "{}", lp.body)
            }
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ ")?;
        write_exprs(f, &self.exprs)?;
        write!(f, "}}")
    }
}

impl fmt::Display for Conditional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, branch) in self.branches().enumerate() {
            write!(f, "{}", if i == 0 { "if " } else { " elif " })?;
            write_exprs(f, &branch.condition.exprs)?;
            write!(f, "{}", branch.body)?;
        }
        if !self.else_body.is_empty() {
            write!(f, " else {}", self.else_body)?;
        }
        Ok(())
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "func {} ", self.name)?;
        if !self.signature.inputs.is_empty() {
            write!(f, "{} ", self.signature.inputs)?;
        }
        write!(f, "-- ")?;
        if !self.signature.outputs.is_empty() {
            write!(f, "{} ", self.signature.outputs)?;
        }
        write!(f, "{}", self.body)
    }
}
