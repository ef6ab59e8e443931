/// Type system for Sorth
///
/// Sorth only knows a handful of basic types. A `TypeStack` records what the
/// runtime data stack holds at compile time, and a `TypeSignature` describes
/// the net effect of a piece of code on the top of that stack.

use std::fmt;

/// A basic type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    /// Sentinel returned when a type name does not resolve
    Invalid,
    Int,
    Bool,
    Char,
}

impl Type {
    /// Every type a program may name
    pub const BASIC: [Type; 3] = [Type::Int, Type::Bool, Type::Char];

    /// Resolve a type name, returning `Type::Invalid` for unknown names
    pub fn from_name(name: &str) -> Type {
        match name {
            "int" => Type::Int,
            "bool" => Type::Bool,
            "char" => Type::Char,
            _ => Type::Invalid,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Type::Invalid => "invalid",
            Type::Int => "int",
            Type::Bool => "bool",
            Type::Char => "char",
        }
    }

    pub fn is_valid(&self) -> bool {
        *self != Type::Invalid
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve a type name. Callers decide whether `Type::Invalid` is an error.
pub fn resolve_type(name: &str) -> Type {
    Type::from_name(name)
}

pub fn type_name(ty: Type) -> &'static str {
    ty.name()
}

/// Compile-time picture of the data stack, bottom first, top last
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TypeStack {
    types: Vec<Type>,
}

impl TypeStack {
    pub fn empty() -> Self {
        TypeStack { types: Vec::new() }
    }

    pub fn from_vec(types: Vec<Type>) -> Self {
        TypeStack { types }
    }

    pub fn depth(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn push(&mut self, ty: Type) {
        self.types.push(ty);
    }

    pub fn pop(&mut self) -> Option<Type> {
        self.types.pop()
    }

    /// The top-most type, if any
    pub fn peek(&self) -> Option<Type> {
        self.types.last().copied()
    }

    /// The top `count` types in bottom-to-top order, or `None` if the stack
    /// is shallower than `count`
    pub fn top(&self, count: usize) -> Option<&[Type]> {
        let start = self.types.len().checked_sub(count)?;
        Some(&self.types[start..])
    }

    /// Remove the top `count` types. The stack must hold at least that many.
    pub fn truncate_top(&mut self, count: usize) {
        let keep = self.types.len().saturating_sub(count);
        self.types.truncate(keep);
    }

    pub fn extend_from(&mut self, other: &TypeStack) {
        self.types.extend_from_slice(&other.types);
    }

    pub fn as_slice(&self) -> &[Type] {
        &self.types
    }

    pub fn iter(&self) -> impl Iterator<Item = &Type> {
        self.types.iter()
    }
}

impl From<Vec<Type>> for TypeStack {
    fn from(types: Vec<Type>) -> Self {
        TypeStack::from_vec(types)
    }
}

impl From<&[Type]> for TypeStack {
    fn from(types: &[Type]) -> Self {
        TypeStack::from_vec(types.to_vec())
    }
}

impl fmt::Display for TypeStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, ty) in self.types.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", ty)?;
        }
        Ok(())
    }
}

/// Net stack effect `( inputs -- outputs )`
///
/// Only the touched portion of the stack is described. Anything below
/// `inputs` passes through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TypeSignature {
    pub inputs: TypeStack,
    pub outputs: TypeStack,
}

impl TypeSignature {
    pub fn new(inputs: TypeStack, outputs: TypeStack) -> Self {
        TypeSignature { inputs, outputs }
    }

    pub fn from_vecs(inputs: Vec<Type>, outputs: Vec<Type>) -> Self {
        TypeSignature {
            inputs: TypeStack::from_vec(inputs),
            outputs: TypeStack::from_vec(outputs),
        }
    }

    /// The identity effect `( -- )`
    pub fn identity() -> Self {
        TypeSignature::default()
    }
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.inputs.is_empty() {
            write!(f, "{} ", self.inputs)?;
        }
        write!(f, "--")?;
        if !self.outputs.is_empty() {
            write!(f, " {}", self.outputs)?;
        }
        Ok(())
    }
}
