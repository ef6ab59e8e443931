/// Lexer for Sorth
///
/// Sorth source is a sequence of whitespace-separated words. Quoted strings
/// may contain spaces and run to the closing quote on the same line.

use crate::typechecker::Intrinsic;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Func,
    Const,
    Begin,
    End,
    If,
    Else,
    ElseIf,
    While,
}

impl Keyword {
    pub fn from_word(word: &str) -> Option<Keyword> {
        match word {
            "func" => Some(Keyword::Func),
            "const" => Some(Keyword::Const),
            "{" => Some(Keyword::Begin),
            "}" => Some(Keyword::End),
            "if" => Some(Keyword::If),
            "else" => Some(Keyword::Else),
            "elif" => Some(Keyword::ElseIf),
            "while" => Some(Keyword::While),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Func => "func",
            Keyword::Const => "const",
            Keyword::Begin => "{",
            Keyword::End => "}",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::ElseIf => "elif",
            Keyword::While => "while",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Eof,
    IntLiteral,
    Ident,
    Keyword(Keyword),
    Intrinsic(Intrinsic),
    StringLiteral,
    CharLiteral,
    /// Malformed input; the lexeme holds the reason
    Invalid,
}

impl TokenKind {
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Eof => "end of file",
            TokenKind::IntLiteral => "integer literal",
            TokenKind::Ident => "word",
            TokenKind::Keyword(_) => "keyword",
            TokenKind::Intrinsic(_) => "intrinsic",
            TokenKind::StringLiteral => "string literal",
            TokenKind::CharLiteral => "character literal",
            TokenKind::Invalid => "invalid token",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text; string contents for string literals
    pub lexeme: String,
    /// Integer payload of integer and character literals
    pub value: i64,
    /// 1-based
    pub line: usize,
    /// 0-based
    pub column: usize,
}

pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            chars: input.chars().peekable(),
            line: 1,
            column: 0,
        }
    }

    /// Tokenize the whole input. The result always ends with an `Eof` token.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        let (line, column) = (self.line, self.column);

        let Some(&first) = self.chars.peek() else {
            return Token {
                kind: TokenKind::Eof,
                lexeme: String::new(),
                value: 0,
                line,
                column,
            };
        };

        let (kind, lexeme, value) = match first {
            '"' => self.read_string(),
            '\'' => Self::classify_char(self.read_word()),
            '0'..='9' => Self::classify_number(self.read_word()),
            _ => {
                let word = self.read_word();
                let kind = if let Some(keyword) = Keyword::from_word(&word) {
                    TokenKind::Keyword(keyword)
                } else if let Some(intrinsic) = Intrinsic::from_symbol(&word) {
                    TokenKind::Intrinsic(intrinsic)
                } else {
                    TokenKind::Ident
                };
                (kind, word, 0)
            }
        };

        Token {
            kind,
            lexeme,
            value,
            line,
            column,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|c| is_whitespace(*c)) {
            self.bump();
        }
    }

    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(&c) = self.chars.peek() {
            if is_whitespace(c) {
                break;
            }
            word.push(c);
            self.bump();
        }
        word
    }

    fn read_string(&mut self) -> (TokenKind, String, i64) {
        self.bump(); // opening quote
        let mut contents = String::new();
        while let Some(&c) = self.chars.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
            if c == '"' {
                return (TokenKind::StringLiteral, contents, 0);
            }
            contents.push(c);
        }
        (TokenKind::Invalid, "unclosed string".to_string(), 0)
    }

    fn classify_char(word: String) -> (TokenKind, String, i64) {
        let inner = word
            .strip_prefix('\'')
            .and_then(|rest| rest.strip_suffix('\''));
        let Some(inner) = inner else {
            return (TokenKind::Invalid, "open ' has to be closed".to_string(), 0);
        };
        let mut chars = inner.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii() => (TokenKind::CharLiteral, word, c as i64),
            _ => (TokenKind::Invalid, format!("invalid character literal {}", word), 0),
        }
    }

    fn classify_number(word: String) -> (TokenKind, String, i64) {
        match word.parse::<i64>() {
            Ok(value) => (TokenKind::IntLiteral, word, value),
            Err(_) => (TokenKind::Invalid, format!("invalid number {}", word), 0),
        }
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}
