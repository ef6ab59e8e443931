/// Recursive descent parser for Sorth
///
/// Parsing and type checking happen in a single pass. While a function body
/// is parsed, one `TypeStack` simulates the data stack and is threaded through
/// every nested scope and conditional, so each block's stack effect is known
/// the moment its closing keyword is read.

use crate::ast::types::{Type, TypeSignature, TypeStack, resolve_type};
use crate::ast::{Conditional, ConditionalBranch, Expr, Function, Program, Scope};
use crate::parser::error::{ErrorKind, Location, ParseError, ParseResult};
use crate::parser::lexer::{Keyword, Lexer, Token, TokenKind};
use crate::typechecker::{
    Intrinsic, ScopeEffect, check_and_apply_signature, match_signature, unify_branches,
};
use tracing::{debug, trace};

/// Separates input types from output types in a function header
const SIGNATURE_SEPARATOR: &str = "--";

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    filename: Option<String>,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        let mut lexer = Lexer::new(input);
        let tokens = lexer.tokenize();
        Parser {
            tokens,
            current: 0,
            filename: None,
        }
    }

    pub fn new_with_filename(input: &str, filename: &str) -> Self {
        let mut parser = Parser::new(input);
        parser.filename = Some(filename.to_string());
        parser
    }

    pub fn parse(&mut self) -> ParseResult<Program> {
        let mut program = Program::new();

        while !self.is_at_end() {
            let token = self.peek().clone();
            match &token.kind {
                TokenKind::Keyword(Keyword::Func) => {
                    self.advance();
                    let function = self.parse_function(&program)?;
                    debug!(name = %function.name, signature = %function.signature, "registered function");
                    program.insert(function).map_err(|function| {
                        self.error_at(&token, ErrorKind::DuplicateFunction(function.name))
                    })?;
                }
                TokenKind::Keyword(Keyword::Const) => {
                    return Err(self.error_at(&token, ErrorKind::Unimplemented("constants")));
                }
                TokenKind::Keyword(keyword) => {
                    return Err(self.error_at(
                        &token,
                        ErrorKind::MisplacedKeyword {
                            keyword: *keyword,
                            reason: "only function definitions are allowed at top level",
                        },
                    ));
                }
                _ => return Err(self.unexpected(&token, "function definition")),
            }
        }

        debug!(functions = program.len(), "parsed program");
        Ok(program)
    }

    /// `name <inputs> -- <outputs> { body }`, with `func` already consumed
    fn parse_function(&mut self, program: &Program) -> ParseResult<Function> {
        let name_token = self.peek().clone();
        if name_token.kind != TokenKind::Ident {
            return Err(self.unexpected(&name_token, "function name"));
        }
        let name = name_token.lexeme.clone();
        if program.contains(&name) {
            return Err(self.error_at(&name_token, ErrorKind::DuplicateFunction(name)));
        }
        self.advance();

        let signature = self.parse_signature()?;

        let mut stack = signature.inputs.clone();
        let body = self.parse_scope(program, &mut stack, Keyword::End)?;

        if !match_signature(&signature, &body.signature) {
            return Err(self.error_at(
                &name_token,
                ErrorKind::SignatureMismatch {
                    name,
                    expected: signature,
                    actual: body.signature,
                },
            ));
        }

        Ok(Function {
            name,
            signature,
            body,
        })
    }

    /// Type names up to and including the `{` that opens the body
    fn parse_signature(&mut self) -> ParseResult<TypeSignature> {
        let mut inputs = Vec::new();
        let mut outputs = Vec::new();
        let mut seen_separator = false;

        loop {
            let token = self.peek().clone();
            match &token.kind {
                TokenKind::Keyword(Keyword::Begin) => {
                    self.advance();
                    break;
                }
                TokenKind::Ident if token.lexeme == SIGNATURE_SEPARATOR && !seen_separator => {
                    seen_separator = true;
                }
                TokenKind::Ident => {
                    let ty = resolve_type(&token.lexeme);
                    if !ty.is_valid() {
                        return Err(self.error_at(&token, ErrorKind::UnknownType(token.lexeme.clone())));
                    }
                    if seen_separator {
                        outputs.push(ty);
                    } else {
                        inputs.push(ty);
                    }
                }
                _ => return Err(self.unexpected(&token, "type name in function signature")),
            }
            self.advance();
        }

        Ok(TypeSignature::from_vecs(inputs, outputs))
    }

    /// Parse expressions until `terminator`, which is consumed.
    ///
    /// `stack` is the simulated stack of the whole function. It is left in the
    /// state reached at the end of the scope.
    fn parse_scope(
        &mut self,
        program: &Program,
        stack: &mut TypeStack,
        terminator: Keyword,
    ) -> ParseResult<Scope> {
        let mut effect = ScopeEffect::new();
        let mut exprs = Vec::new();

        loop {
            let token = self.peek().clone();
            match &token.kind {
                TokenKind::Keyword(keyword) if *keyword == terminator => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => {
                    return Err(self.error_at(&token, ErrorKind::UnterminatedScope));
                }
                TokenKind::IntLiteral => {
                    exprs.push(Expr::push_int(token.value));
                    stack.push(Type::Int);
                    effect.produce();
                    self.advance();
                }
                TokenKind::CharLiteral => {
                    exprs.push(Expr::push_int(token.value));
                    stack.push(Type::Char);
                    effect.produce();
                    self.advance();
                }
                TokenKind::Ident => {
                    let function = program.get(&token.lexeme).ok_or_else(|| {
                        self.error_at(&token, ErrorKind::UnknownWord(token.lexeme.clone()))
                    })?;
                    self.apply(&token, &function.signature, stack)?;
                    effect.recalibrate(&function.signature);
                    exprs.push(Expr::call(token.lexeme.clone()));
                    self.advance();
                }
                TokenKind::Intrinsic(intrinsic) => {
                    let signature = self.intrinsic_signature(&token, *intrinsic, stack)?;
                    self.apply(&token, &signature, stack)?;
                    effect.recalibrate(&signature);
                    exprs.push(Expr::Operation(intrinsic.to_operation()));
                    self.advance();
                }
                TokenKind::Keyword(Keyword::Begin) => {
                    self.advance();
                    let inner = self.parse_scope(program, stack, Keyword::End)?;
                    effect.recalibrate(&inner.signature);
                    exprs.push(Expr::Scope(inner));
                }
                TokenKind::Keyword(Keyword::If) => {
                    self.advance();
                    let conditional = self.parse_conditional(program, stack, &token)?;
                    effect.recalibrate(&conditional.signature);
                    exprs.push(Expr::Conditional(conditional));
                }
                TokenKind::Keyword(Keyword::While) => {
                    return Err(self.error_at(&token, ErrorKind::Unimplemented("while loops")));
                }
                TokenKind::Keyword(Keyword::Const) => {
                    return Err(self.error_at(&token, ErrorKind::Unimplemented("constants")));
                }
                TokenKind::Keyword(keyword) => {
                    let reason = match keyword {
                        Keyword::Func => "functions are only allowed at top level",
                        Keyword::Else | Keyword::ElseIf => "not attached to an if",
                        _ => "unexpected end of scope",
                    };
                    return Err(self.error_at(
                        &token,
                        ErrorKind::MisplacedKeyword {
                            keyword: *keyword,
                            reason,
                        },
                    ));
                }
                TokenKind::StringLiteral => {
                    return Err(self.error_at(&token, ErrorKind::Unimplemented("string literals")));
                }
                TokenKind::Invalid => {
                    return Err(self.error_at(&token, ErrorKind::InvalidToken(token.lexeme.clone())));
                }
            }
        }

        let signature = effect.seal(stack);
        trace!(signature = %signature, exprs = exprs.len(), "sealed scope");
        Ok(Scope { signature, exprs })
    }

    /// `cond { body } [elif cond { body }]* [else { body }]`, with `if`
    /// already consumed.
    ///
    /// Every branch is simulated on the path that reaches it, so each `elif`
    /// condition starts where the previous condition left the stack after its
    /// bool was taken. The branches' net effects must agree.
    fn parse_conditional(
        &mut self,
        program: &Program,
        stack: &mut TypeStack,
        if_token: &Token,
    ) -> ParseResult<Conditional> {
        let start = stack.clone();
        let mut path = ScopeEffect::new();
        let mut effects = Vec::new();

        let first = self.parse_branch(program, stack, &mut path, &mut effects)?;

        let mut else_ifs = Vec::new();
        while self.check_keyword(Keyword::ElseIf) {
            self.advance();
            else_ifs.push(self.parse_branch(program, stack, &mut path, &mut effects)?);
        }

        let else_body = if self.check_keyword(Keyword::Else) {
            self.advance();
            self.expect_keyword(Keyword::Begin, "'{' after else")?;
            self.parse_scope(program, stack, Keyword::End)?
        } else {
            Scope::new()
        };
        let mut otherwise = path;
        otherwise.recalibrate(&else_body.signature);
        effects.push(otherwise.seal(stack));

        let signature = unify_branches(&start, &effects).map_err(|mismatch| {
            self.error_at(
                if_token,
                ErrorKind::BranchMismatch {
                    branch: mismatch.branch,
                    expected: mismatch.expected,
                    actual: mismatch.actual,
                },
            )
        })?;

        *stack = start;
        self.apply(if_token, &signature, stack)?;
        trace!(signature = %signature, branches = effects.len(), "sealed conditional");

        Ok(Conditional {
            signature,
            first,
            else_ifs,
            else_body,
        })
    }

    /// One `cond { body }` pair. Extends `path` with the condition and pushes
    /// the branch's net effect onto `effects`. On return `stack` holds the
    /// state the next condition starts from.
    fn parse_branch(
        &mut self,
        program: &Program,
        stack: &mut TypeStack,
        path: &mut ScopeEffect,
        effects: &mut Vec<TypeSignature>,
    ) -> ParseResult<ConditionalBranch> {
        let condition = self.parse_scope(program, stack, Keyword::Begin)?;
        if stack.peek() != Some(Type::Bool) {
            let found = stack.top(1).map(TypeStack::from).unwrap_or_default();
            let brace = self.previous().clone();
            return Err(self.error_at(&brace, ErrorKind::ConditionNotBool { found }));
        }
        stack.pop();
        path.recalibrate(&condition.signature);
        path.recalibrate(&TypeSignature::from_vecs(vec![Type::Bool], vec![]));

        let after_condition = stack.clone();
        let body = self.parse_scope(program, stack, Keyword::End)?;

        let mut branch = path.clone();
        branch.recalibrate(&body.signature);
        effects.push(branch.seal(stack));

        *stack = after_condition;
        Ok(ConditionalBranch { condition, body })
    }

    fn intrinsic_signature(
        &self,
        token: &Token,
        intrinsic: Intrinsic,
        stack: &TypeStack,
    ) -> ParseResult<TypeSignature> {
        self.require_depth(token, intrinsic.input_arity(), stack)?;
        Ok(intrinsic.signature_for(stack))
    }

    /// Check `signature` against the stack and apply it
    fn apply(&self, token: &Token, signature: &TypeSignature, stack: &mut TypeStack) -> ParseResult<()> {
        let required = signature.inputs.depth();
        self.require_depth(token, required, stack)?;
        if !check_and_apply_signature(signature, stack) {
            let found = stack.top(required).map(TypeStack::from).unwrap_or_default();
            return Err(self.error_at(
                token,
                ErrorKind::TypeMismatch {
                    word: token.lexeme.clone(),
                    expected: signature.inputs.clone(),
                    found,
                },
            ));
        }
        Ok(())
    }

    fn require_depth(&self, token: &Token, required: usize, stack: &TypeStack) -> ParseResult<()> {
        if stack.depth() < required {
            return Err(self.error_at(
                token,
                ErrorKind::StackUnderflow {
                    word: token.lexeme.clone(),
                    required,
                    available: stack.depth(),
                },
            ));
        }
        Ok(())
    }

    // Helper methods

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.peek().kind == TokenKind::Keyword(keyword)
    }

    fn expect_keyword(&mut self, keyword: Keyword, expected: &'static str) -> ParseResult<()> {
        if self.check_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(self.peek(), expected))
        }
    }

    fn unexpected(&self, token: &Token, expected: &'static str) -> ParseError {
        let found = match token.kind {
            TokenKind::Eof => token.kind.describe().to_string(),
            _ => format!("{} '{}'", token.kind.describe(), token.lexeme),
        };
        self.error_at(token, ErrorKind::UnexpectedToken { expected, found })
    }

    fn error_at(&self, token: &Token, kind: ErrorKind) -> ParseError {
        ParseError {
            kind,
            location: Location {
                file: self.filename.clone(),
                line: token.line,
                column: token.column,
            },
        }
    }
}
