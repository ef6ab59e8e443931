/**
Stack-effect bookkeeping for Sorth

The parser simulates the data stack with a single `TypeStack` per function.
While a scope is being parsed, a `ScopeEffect` counts how many of the top
stack slots were produced inside that scope. Any step that reaches below that
watermark is consuming values borrowed from an enclosing scope, and those
values become the scope's own inputs.
*/

use crate::ast::types::{Type, TypeSignature, TypeStack};

/// Apply `signature` to `stack` if its inputs sit on top of the stack.
///
/// Returns `false` and leaves the stack untouched when the top of the stack
/// does not match the signature's inputs position by position, or when the
/// stack is too shallow.
pub fn check_and_apply_signature(signature: &TypeSignature, stack: &mut TypeStack) -> bool {
    let consumed = signature.inputs.depth();
    match stack.top(consumed) {
        Some(top) if top == signature.inputs.as_slice() => {}
        _ => return false,
    }
    stack.truncate_top(consumed);
    stack.extend_from(&signature.outputs);
    true
}

/// Running effect of a scope that is still being parsed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeEffect {
    local_offset: usize,
    inputs: Vec<Type>,
}

impl ScopeEffect {
    pub fn new() -> Self {
        ScopeEffect::default()
    }

    /// Number of top stack slots produced inside this scope
    pub fn local_offset(&self) -> usize {
        self.local_offset
    }

    /// Inputs discovered so far, bottom first
    pub fn borrowed(&self) -> &[Type] {
        &self.inputs
    }

    /// A literal pushed one value
    pub fn produce(&mut self) {
        self.local_offset += 1;
    }

    /// Account for a step whose effect `applied` has already been applied to
    /// the stack.
    pub fn recalibrate(&mut self, applied: &TypeSignature) {
        let consumed = applied.inputs.depth();
        if consumed > self.local_offset {
            // The deepest inputs of this step predate the scope
            let borrowed = consumed - self.local_offset;
            let mut inputs = applied.inputs.as_slice()[..borrowed].to_vec();
            inputs.append(&mut self.inputs);
            self.inputs = inputs;
            self.local_offset = 0;
        } else {
            self.local_offset -= consumed;
        }
        self.local_offset += applied.outputs.depth();
    }

    /// Finish the scope. Its outputs are the top `local_offset` slots of the
    /// final stack.
    pub fn seal(self, stack: &TypeStack) -> TypeSignature {
        debug_assert!(self.local_offset <= stack.depth());
        let outputs = stack.top(self.local_offset).map(TypeStack::from).unwrap_or_default();
        TypeSignature::new(TypeStack::from_vec(self.inputs), outputs)
    }
}

/// Check an inferred body effect against a declared signature.
///
/// The declaration may list more inputs than the body consumes. The extra
/// leading inputs are never touched, so they must reappear unchanged as the
/// leading outputs.
pub fn match_signature(declared: &TypeSignature, inferred: &TypeSignature) -> bool {
    let Some(offset) = declared.inputs.depth().checked_sub(inferred.inputs.depth()) else {
        return false;
    };
    let inputs = declared.inputs.as_slice();
    let outputs = declared.outputs.as_slice();
    if outputs.len() < offset {
        return false;
    }
    inputs[..offset] == outputs[..offset] && outputs[offset..] == *inferred.outputs.as_slice()
}

/// Two branches of a conditional disagree on their net effect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchMismatch {
    /// Index of the offending branch, in source order
    pub branch: usize,
    pub expected: TypeSignature,
    pub actual: TypeSignature,
}

/// Widen `signature` so it consumes `passthrough.len()` more values that it
/// hands back unchanged.
fn widen(signature: &TypeSignature, passthrough: &[Type]) -> TypeSignature {
    let mut inputs = passthrough.to_vec();
    inputs.extend(signature.inputs.iter().copied());
    let mut outputs = passthrough.to_vec();
    outputs.extend(signature.outputs.iter().copied());
    TypeSignature::from_vecs(inputs, outputs)
}

/// Merge the net effects of every branch of a conditional, each inferred
/// from the same starting `stack`.
///
/// Branches that reach less deep are widened with the untouched slots of
/// `stack` until all consume the same number of values, after which they must
/// be identical.
pub fn unify_branches(
    stack: &TypeStack,
    branches: &[TypeSignature],
) -> Result<TypeSignature, BranchMismatch> {
    let depth = branches.iter().map(|b| b.inputs.depth()).max().unwrap_or(0);
    let slots = stack.top(depth).unwrap_or(stack.as_slice());

    let mut unified: Option<TypeSignature> = None;
    for (index, branch) in branches.iter().enumerate() {
        let extra = depth.saturating_sub(branch.inputs.depth());
        let widened = widen(branch, &slots[..extra.min(slots.len())]);
        match &unified {
            None => unified = Some(widened),
            Some(expected) if *expected == widened => {}
            Some(expected) => {
                return Err(BranchMismatch {
                    branch: index,
                    expected: expected.clone(),
                    actual: widened,
                });
            }
        }
    }
    Ok(unified.unwrap_or_default())
}
