/// Stack-effect checking for Sorth
///
/// Type checking happens while parsing: the parser drives these helpers to
/// simulate the data stack and infer every scope's signature.
/// - Intrinsic catalog (arity, operation, signature rule)
/// - Signature application and scope effect tracking
/// - Declared-versus-inferred signature matching
/// - Conditional branch unification

pub mod effects;
pub mod intrinsics;

pub use effects::{
    BranchMismatch, ScopeEffect, check_and_apply_signature, match_signature, unify_branches,
};
pub use intrinsics::Intrinsic;
