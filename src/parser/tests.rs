use super::*;
use crate::ast::types::{Type, TypeSignature};
use crate::ast::{Expr, Operation, Program};
use proptest::prelude::*;

fn parse(input: &str) -> Program {
    match parse_program(input) {
        Ok(program) => program,
        Err(e) => panic!("failed to parse {:?}: {}", input, e),
    }
}

fn parse_err(input: &str) -> ParseError {
    match parse_program(input) {
        Ok(_) => panic!("expected {:?} to fail", input),
        Err(e) => e,
    }
}

fn sig(inputs: &[Type], outputs: &[Type]) -> TypeSignature {
    TypeSignature::from_vecs(inputs.to_vec(), outputs.to_vec())
}

#[test]
fn test_add2_borrows_its_input() {
    let program = parse("func add2 int -- int { 1 + }");
    let add2 = program.get("add2").unwrap();

    assert_eq!(add2.signature, sig(&[Type::Int], &[Type::Int]));
    assert_eq!(add2.body.signature, sig(&[Type::Int], &[Type::Int]));
    assert_eq!(
        add2.body.exprs,
        vec![Expr::push_int(1), Expr::Operation(Operation::Add)]
    );
}

#[test]
fn test_dup_output_does_not_match_bool() {
    let err = parse_err("func bad int -- bool { dup }");
    match err.kind {
        ErrorKind::SignatureMismatch {
            name,
            expected,
            actual,
        } => {
            assert_eq!(name, "bad");
            assert_eq!(expected, sig(&[Type::Int], &[Type::Bool]));
            assert_eq!(actual, sig(&[Type::Int], &[Type::Int, Type::Int]));
        }
        e => panic!("Expected SignatureMismatch, got {:?}", e),
    }
}

#[test]
fn test_literal_scope_has_no_inputs() {
    let program = parse("func lits -- int char int { 1 'a' 2 }");
    let body = &program.get("lits").unwrap().body;
    assert_eq!(body.signature, sig(&[], &[Type::Int, Type::Char, Type::Int]));
    assert_eq!(body.exprs[1], Expr::push_int('a' as i64));
}

#[test]
fn test_dup_add_reports_one_input() {
    let program = parse("func double int -- int { dup + }");
    assert_eq!(
        program.get("double").unwrap().body.signature,
        sig(&[Type::Int], &[Type::Int])
    );
}

#[test]
fn test_nested_scope_borrows_from_enclosing() {
    let program = parse("func sum3 int int int -- int { { + } + }");
    let body = &program.get("sum3").unwrap().body;

    match &body.exprs[0] {
        Expr::Scope(inner) => {
            assert_eq!(inner.signature, sig(&[Type::Int, Type::Int], &[Type::Int]));
        }
        e => panic!("Expected Scope, got {:?}", e),
    }
    assert_eq!(body.signature, sig(&[Type::Int, Type::Int, Type::Int], &[Type::Int]));
}

#[test]
fn test_nested_scope_outputs_stay_local_to_outer() {
    // inner produces two ints that the outer scope then consumes
    let program = parse("func three -- int { { 1 2 } + }");
    let body = &program.get("three").unwrap().body;
    assert_eq!(body.signature, sig(&[], &[Type::Int]));
}

#[test]
fn test_untouched_inputs_pass_through() {
    let program = parse("func bump char int -- char int { 1 + }");
    let bump = program.get("bump").unwrap();
    assert_eq!(bump.body.signature, sig(&[Type::Int], &[Type::Int]));

    let err = parse_err("func bad char int -- int int { 1 + }");
    assert!(matches!(err.kind, ErrorKind::SignatureMismatch { .. }));
}

#[test]
fn test_missing_separator_means_inputs_only() {
    let program = parse("func discard int bool { drop drop }");
    assert_eq!(
        program.get("discard").unwrap().signature,
        sig(&[Type::Int, Type::Bool], &[])
    );
}

#[test]
fn test_swap_uses_actual_order() {
    let program = parse("func flip int bool -- bool int { swap }");
    assert_eq!(
        program.get("flip").unwrap().body.signature,
        sig(&[Type::Int, Type::Bool], &[Type::Bool, Type::Int])
    );
}

#[test]
fn test_calls_apply_function_signatures() {
    let program = parse(
        "func square int -- int { dup * }
         func quad int -- int { square square }",
    );
    assert_eq!(program.len(), 2);
    let quad = program.get("quad").unwrap();
    assert_eq!(quad.body.exprs, vec![Expr::call("square"), Expr::call("square")]);
    assert_eq!(quad.body.signature, sig(&[Type::Int], &[Type::Int]));
}

#[test]
fn test_call_with_wrong_types_fails() {
    let err = parse_err(
        "func negate bool -- bool { }
         func f -- bool { 1 negate }",
    );
    match err.kind {
        ErrorKind::TypeMismatch {
            word,
            expected,
            found,
        } => {
            assert_eq!(word, "negate");
            assert_eq!(expected.as_slice(), &[Type::Bool]);
            assert_eq!(found.as_slice(), &[Type::Int]);
        }
        e => panic!("Expected TypeMismatch, got {:?}", e),
    }
    assert_eq!(err.location.line, 2);
}

#[test]
fn test_comparison_rejects_bool_operand() {
    let err = parse_err("func f bool -- bool { 1 < }");
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
}

#[test]
fn test_stack_underflow() {
    let err = parse_err("func f -- int {\n  + }");
    match &err.kind {
        ErrorKind::StackUnderflow {
            word,
            required,
            available,
        } => {
            assert_eq!(word, "+");
            assert_eq!(*required, 2);
            assert_eq!(*available, 0);
        }
        e => panic!("Expected StackUnderflow, got {:?}", e),
    }
    assert_eq!((err.location.line, err.location.column), (2, 2));
    assert!(err.to_string().starts_with("Parse error at 2:2:"));
}

#[test]
fn test_duplicate_function_fails() {
    let err = parse_err(
        "func f int -- int { }
         func f int -- int { }",
    );
    assert_eq!(err.kind, ErrorKind::DuplicateFunction("f".to_string()));
    assert_eq!(err.location.line, 2);
}

#[test]
fn test_forward_reference_fails() {
    let err = parse_err(
        "func g -- int { h }
         func h -- int { 1 }",
    );
    assert_eq!(err.kind, ErrorKind::UnknownWord("h".to_string()));
    assert_eq!(err.location.line, 1);
}

#[test]
fn test_recursion_is_unknown_word() {
    let err = parse_err("func f int -- int { f }");
    assert_eq!(err.kind, ErrorKind::UnknownWord("f".to_string()));
}

#[test]
fn test_unknown_type() {
    let err = parse_err("func f integer -- { }");
    assert_eq!(err.kind, ErrorKind::UnknownType("integer".to_string()));

    let err = parse_err("func f int -- int -- int { }");
    assert_eq!(err.kind, ErrorKind::UnknownType("--".to_string()));
}

#[test]
fn test_bad_function_names() {
    let err = parse_err("func + -- { }");
    assert!(matches!(err.kind, ErrorKind::UnexpectedToken { expected: "function name", .. }));

    let err = parse_err("func");
    assert!(matches!(err.kind, ErrorKind::UnexpectedToken { expected: "function name", .. }));
}

#[test]
fn test_unterminated_scope() {
    let err = parse_err("func f -- int { 1");
    assert_eq!(err.kind, ErrorKind::UnterminatedScope);

    let err = parse_err("func f -- { { }");
    assert_eq!(err.kind, ErrorKind::UnterminatedScope);
}

#[test]
fn test_misplaced_keywords() {
    for (input, keyword) in [
        ("func f -- { else }", Keyword::Else),
        ("func f -- { elif }", Keyword::ElseIf),
        ("func f -- { func g -- { } }", Keyword::Func),
        ("}", Keyword::End),
        ("if", Keyword::If),
    ] {
        match parse_err(input).kind {
            ErrorKind::MisplacedKeyword { keyword: found, .. } => assert_eq!(found, keyword),
            e => panic!("Expected MisplacedKeyword for {:?}, got {:?}", input, e),
        }
    }
}

#[test]
fn test_unimplemented_features() {
    for (input, feature) in [
        ("func f -- { while 1 1 = { } }", "while loops"),
        ("func f -- { \"hi\" }", "string literals"),
        ("func f -- { const }", "constants"),
        ("const x", "constants"),
    ] {
        assert_eq!(parse_err(input).kind, ErrorKind::Unimplemented(feature));
    }
}

#[test]
fn test_top_level_must_be_function() {
    let err = parse_err("1 2 +");
    assert!(matches!(err.kind, ErrorKind::UnexpectedToken { expected: "function definition", .. }));
}

#[test]
fn test_invalid_token_in_body() {
    let err = parse_err("func f -- { 12abc }");
    assert!(matches!(err.kind, ErrorKind::InvalidToken(_)));
}

#[test]
fn test_empty_program() {
    assert!(parse("").is_empty());
    assert!(parse("  \n ").is_empty());
}

#[test]
fn test_if_elif_else_chain() {
    let program = parse(
        "func sign int -- int {
            if dup 0 < { drop 0 1 - }
            elif dup 0 > { drop 1 }
            else { drop 0 }
         }",
    );
    let sign = program.get("sign").unwrap();
    assert_eq!(sign.body.signature, sig(&[Type::Int], &[Type::Int]));

    match &sign.body.exprs[0] {
        Expr::Conditional(cond) => {
            assert_eq!(cond.signature, sig(&[Type::Int], &[Type::Int]));
            assert_eq!(cond.else_ifs.len(), 1);
            assert_eq!(cond.branches().count(), 2);
            assert_eq!(cond.first.condition.signature, sig(&[Type::Int], &[Type::Int, Type::Bool]));
            assert_eq!(cond.first.body.signature, sig(&[Type::Int], &[Type::Int]));
            assert_eq!(cond.else_body.len(), 2);
        }
        e => panic!("Expected Conditional, got {:?}", e),
    }
}

#[test]
fn test_if_without_else_must_be_neutral() {
    let program = parse("func clamp int -- int { if dup 0 < { drop 0 } }");
    let clamp = program.get("clamp").unwrap();
    assert_eq!(clamp.body.signature, sig(&[Type::Int], &[Type::Int]));

    let err = parse_err("func f int -- int { if dup 0 < { 1 } }");
    match err.kind {
        ErrorKind::BranchMismatch {
            branch,
            expected,
            actual,
        } => {
            assert_eq!(branch, 1);
            assert_eq!(expected, sig(&[Type::Int], &[Type::Int, Type::Int]));
            assert_eq!(actual, sig(&[Type::Int], &[Type::Int]));
        }
        e => panic!("Expected BranchMismatch, got {:?}", e),
    }
}

#[test]
fn test_branches_with_different_depths_unify() {
    // the else branch never touches the int, the if branch replaces it
    let program = parse("func f char int -- char int { if 1 1 = { drop 5 } else { } }");
    let f = program.get("f").unwrap();
    match &f.body.exprs[0] {
        Expr::Conditional(cond) => assert_eq!(cond.signature, sig(&[Type::Int], &[Type::Int])),
        e => panic!("Expected Conditional, got {:?}", e),
    }
}

#[test]
fn test_branch_result_types_must_agree() {
    let err = parse_err("func f -- { if 1 1 = { 1 } else { 'c' } drop }");
    assert!(matches!(err.kind, ErrorKind::BranchMismatch { branch: 1, .. }));
}

#[test]
fn test_condition_can_consume_borrowed_bool() {
    let program = parse("func when bool -- { if { } }");
    assert_eq!(
        program.get("when").unwrap().body.signature,
        sig(&[Type::Bool], &[])
    );
}

#[test]
fn test_condition_must_leave_bool() {
    let err = parse_err("func f int -- int { if dup { } }");
    match err.kind {
        ErrorKind::ConditionNotBool { found } => assert_eq!(found.as_slice(), &[Type::Int]),
        e => panic!("Expected ConditionNotBool, got {:?}", e),
    }

    let err = parse_err("func f -- { if { } }");
    assert!(matches!(err.kind, ErrorKind::ConditionNotBool { .. }));
}

#[test]
fn test_else_requires_block() {
    let err = parse_err("func f -- { if 1 1 = { } else 2 }");
    assert!(matches!(err.kind, ErrorKind::UnexpectedToken { expected: "'{' after else", .. }));
}

#[test]
fn test_conditional_inside_nested_scope() {
    let program = parse(
        "func pick int int bool -- int {
            { if { drop } else { swap drop } }
         }",
    );
    let pick = program.get("pick").unwrap();
    assert_eq!(
        pick.body.signature,
        sig(&[Type::Int, Type::Int, Type::Bool], &[Type::Int])
    );
}

#[test]
fn test_filename_in_error() {
    let err = parse_program_named("func f -- { nope }", "main.sorth").unwrap_err();
    assert_eq!(err.location.file.as_deref(), Some("main.sorth"));
    assert_eq!(err.to_string(), "Parse error at main.sorth:1:12: unknown word: nope");
}

proptest! {
    /// Literal-only scopes produce exactly their literals and borrow nothing.
    #[test]
    fn prop_literal_scope_outputs_match(literals in prop::collection::vec((any::<bool>(), 0i64..1000), 0..24)) {
        let mut body = String::new();
        let mut types = Vec::new();
        for (is_char, value) in &literals {
            if *is_char {
                let c = (b'a' + (*value % 26) as u8) as char;
                body.push_str(&format!("'{}' ", c));
                types.push(Type::Char);
            } else {
                body.push_str(&format!("{} ", value));
                types.push(Type::Int);
            }
        }
        let outputs: Vec<&str> = types.iter().map(|t| t.name()).collect();
        let source = format!("func lits -- {} {{ {}}}", outputs.join(" "), body);

        let program = parse_program(&source).unwrap();
        let lits = program.get("lits").unwrap();
        prop_assert!(lits.body.signature.inputs.is_empty());
        prop_assert_eq!(lits.body.signature.outputs.as_slice(), types.as_slice());
        prop_assert_eq!(lits.body.len(), literals.len());
    }
}
