use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::str::Chars;
use lazy_static::lazy_static;
use thiserror::Error;
use crate::util;


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenPos {
    pub line: i32,
    pub column: i32,
}

impl TokenPos {
    pub fn new(line: i32, column: i32) -> TokenPos {
        TokenPos { line, column }
    }

    pub fn begin() -> TokenPos {
        TokenPos::new(1, 1)
    }
}

impl Display for TokenPos {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[line {} column {}]", self.line, self.column)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenType {
    None,

    ParenthesisLeft, ParenthesisRight,
    SquareBracketLeft, SquareBracketRight,
    Comma, Semicolon,

    Assign, Equal, NotEqual,
    Greater, GreaterEqual,
    Less, LessEqual,

    Plus, PlusPlus, PlusAssign,
    Minus, MinusMinus, MinusAssign,
    Multiply, MultiplyAssign,
    Divide, DivideAssign,

    And, Or,

    Identifier,
    LiteralInt,
    LiteralString,

    // Keywords
    Print, Exit,
    If, Then, Else, EndIf,
    While, Do, EndWhile,
    For, EndFor,
    Function, EndFunction, Return,
    Global,
    Append, Remove,
    Id, Eval,

    // EOF
    Eof,
}

lazy_static! {
    static ref KEYWORDS: HashMap<&'static str, TokenType> = HashMap::from([
        ("print", TokenType::Print),
        ("exit", TokenType::Exit),
        ("if", TokenType::If),
        ("then", TokenType::Then),
        ("else", TokenType::Else),
        ("endif", TokenType::EndIf),
        ("while", TokenType::While),
        ("do", TokenType::Do),
        ("endwhile", TokenType::EndWhile),
        ("for", TokenType::For),
        ("endfor", TokenType::EndFor),
        ("function", TokenType::Function),
        ("endfunction", TokenType::EndFunction),
        ("return", TokenType::Return),
        ("global", TokenType::Global),
        ("append", TokenType::Append),
        ("remove", TokenType::Remove),
        ("id", TokenType::Id),
        ("eval", TokenType::Eval),
    ]);
}

/// Payload carried by literal tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Literal {
    None,
    Int(i64),
    Str(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    token_type: TokenType,
    source: String,
    literal: Literal,
    start: TokenPos,
}

impl Token {
    pub fn new(token_type: TokenType, source: String, literal: Literal, start: TokenPos) -> Token {
        Token { token_type, source, literal, start }
    }

    pub fn empty() -> Token {
        Token::new(TokenType::None, String::new(), Literal::None, TokenPos::begin())
    }

    pub fn token_type(&self) -> TokenType { self.token_type }
    pub fn source(&self) -> &str { &self.source }
    pub fn literal(&self) -> &Literal { &self.literal }
    pub fn start(&self) -> &TokenPos { &self.start }
    pub fn line(&self) -> i32 { self.start.line }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.token_type {
            TokenType::None => f.write_str("None"),
            TokenType::Eof => f.write_str("EOF"),
            _ => f.write_str(&self.source),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexerError {
    #[error("{pos} Illegal character '{character}'")]
    IllegalCharacter { pos: TokenPos, character: char },
    #[error("{pos} Unterminated string")]
    UnterminatedString { pos: TokenPos },
    #[error("{pos} Integer literal {literal} is too large")]
    IntegerTooLarge { pos: TokenPos, literal: String },
}

impl LexerError {
    pub fn get_pos(&self) -> TokenPos {
        match self {
            LexerError::IllegalCharacter { pos, .. } => *pos,
            LexerError::UnterminatedString { pos } => *pos,
            LexerError::IntegerTooLarge { pos, .. } => *pos,
        }
    }
}

type LexerResult<T> = Result<T, LexerError>;

pub struct Lexer<'source> {
    input: &'source str,

    chars: Chars<'source>,
    peek_1: Option<char>,

    start_index: usize,
    current_index: usize,

    start_pos: TokenPos,
    current_pos: TokenPos,

    errors: Vec<LexerError>,
    finished: bool,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Lexer<'source> {
        Lexer {
            input: source,

            chars: source.chars(),
            peek_1: None,

            start_index: 0,
            current_index: 0,

            start_pos: TokenPos::begin(),
            current_pos: TokenPos::begin(),

            errors: Vec::new(),
            finished: false,
        }
    }

    /// Rewinds to the beginning of the input, forgetting earlier diagnostics.
    pub fn reset(&mut self) {
        *self = Lexer::new(self.input);
    }

    pub fn errors(&self) -> &[LexerError] {
        &self.errors
    }

    /// Scans the next token. An `Err` means one bad character or literal was
    /// consumed and skipped; scanning can simply continue afterwards.
    pub fn scan_token(&mut self) -> LexerResult<Token> {
        loop {
            self.skip_whitespace();
            self.start_index = self.current_index;
            self.start_pos = self.current_pos;

            let c = match self.consume() {
                Some(c) => c,
                None => return Ok(self.make_token(TokenType::Eof)),
            };

            return match c {
                '(' => Ok(self.make_token(TokenType::ParenthesisLeft)),
                ')' => Ok(self.make_token(TokenType::ParenthesisRight)),
                '[' => Ok(self.make_token(TokenType::SquareBracketLeft)),
                ']' => Ok(self.make_token(TokenType::SquareBracketRight)),
                ',' => Ok(self.make_token(TokenType::Comma)),
                ';' => Ok(self.make_token(TokenType::Semicolon)),

                '=' => Ok(if self.expect('=') { self.make_token(TokenType::Equal) } else {
                    self.make_token(TokenType::Assign)
                }),
                '!' => if self.expect('=') { Ok(self.make_token(TokenType::NotEqual)) } else {
                    Err(LexerError::IllegalCharacter { pos: self.start_pos, character: c })
                },
                '>' => Ok(if self.expect('=') { self.make_token(TokenType::GreaterEqual) } else {
                    self.make_token(TokenType::Greater)
                }),
                '<' => Ok(if self.expect('=') { self.make_token(TokenType::LessEqual) } else {
                    self.make_token(TokenType::Less)
                }),
                '&' => if self.expect('&') { Ok(self.make_token(TokenType::And)) } else {
                    Err(LexerError::IllegalCharacter { pos: self.start_pos, character: c })
                },
                '|' => if self.expect('|') { Ok(self.make_token(TokenType::Or)) } else {
                    Err(LexerError::IllegalCharacter { pos: self.start_pos, character: c })
                },

                '+' => Ok(if self.expect('+') { self.make_token(TokenType::PlusPlus) } else if self.expect('=') {
                    self.make_token(TokenType::PlusAssign)
                } else {
                    self.make_token(TokenType::Plus)
                }),
                '-' => Ok(if self.expect('-') { self.make_token(TokenType::MinusMinus) } else if self.expect('=') {
                    self.make_token(TokenType::MinusAssign)
                } else {
                    self.make_token(TokenType::Minus)
                }),
                '*' => Ok(if self.expect('=') { self.make_token(TokenType::MultiplyAssign) } else {
                    self.make_token(TokenType::Multiply)
                }),
                '/' => Ok(if self.expect('=') { self.make_token(TokenType::DivideAssign) } else if self.expect('/') {
                    self.skip_line();
                    continue;
                } else {
                    self.make_token(TokenType::Divide)
                }),

                '"' | '\'' => self.scan_string(c),
                c if util::is_numeric(c) => self.scan_number(),
                c if util::is_alphabetic(c) => Ok(self.scan_identifier()),

                _ => Err(LexerError::IllegalCharacter { pos: self.start_pos, character: c }),
            };
        }
    }

    fn scan_string(&mut self, quote: char) -> LexerResult<Token> {
        let mut rest = self.input[self.current_index..].char_indices();

        // Only commit to the string once the closing quote is known to exist,
        // so an unterminated one costs just the opening quote.
        let length = match rest.find(|(_, c)| *c == quote) {
            Some((length, _)) => length,
            None => return Err(LexerError::UnterminatedString { pos: self.start_pos }),
        };

        let end = self.current_index + length;

        while self.current_index < end {
            self.consume();
        }

        self.consume(); // the closing quote

        let value = self.input[(self.start_index + 1)..end].to_owned();
        Ok(Token {
            token_type: TokenType::LiteralString,
            source: self.input[self.start_index..self.current_index].to_owned(),
            literal: Literal::Str(value),
            start: self.start_pos,
        })
    }

    fn scan_number(&mut self) -> LexerResult<Token> {
        while let Some(c) = self.peek() {
            if !util::is_numeric(c) {
                break;
            }

            self.consume();
        }

        let source = &self.input[self.start_index..self.current_index];

        match source.parse::<i64>() {
            Ok(value) => Ok(Token {
                token_type: TokenType::LiteralInt,
                source: source.to_owned(),
                literal: Literal::Int(value),
                start: self.start_pos,
            }),
            Err(_) => Err(LexerError::IntegerTooLarge { pos: self.start_pos, literal: source.to_owned() }),
        }
    }

    fn scan_identifier(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if !util::is_alphanumeric(c) {
                break;
            }

            self.consume();
        }

        let name = &self.input[self.start_index..self.current_index];
        let token_type = KEYWORDS.get(name).copied().unwrap_or(TokenType::Identifier);

        Token { token_type, source: name.to_owned(), literal: Literal::None, start: self.start_pos }
    }

    fn make_token(&self, token_type: TokenType) -> Token {
        Token {
            token_type,
            source: self.input[self.start_index..self.current_index].to_owned(),
            literal: Literal::None,
            start: self.start_pos,
        }
    }

    fn consume(&mut self) -> Option<char> {
        let c = match self.peek_1.take() {
            Some(c) => Some(c),
            None => self.chars.next(),
        }?;

        self.current_index += c.len_utf8();

        if c == '\n' {
            self.current_pos.line += 1;
            self.current_pos.column = 1;
        } else {
            self.current_pos.column += 1;
        }

        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        if self.peek_1.is_none() {
            self.peek_1 = self.chars.next();
        }

        self.peek_1
    }

    fn expect(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.consume();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !matches!(c, ' ' | '\t' | '\r' | '\n') {
                return;
            }

            self.consume();
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                return;
            }

            self.consume();
        }
    }
}

impl<'source> Iterator for Lexer<'source> {
    type Item = Token;

    /// Yields tokens up to and including a single `Eof`. Lexer errors are
    /// reported on stderr, recorded, and skipped over.
    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }

        loop {
            match self.scan_token() {
                Ok(token) => {
                    if token.token_type() == TokenType::Eof {
                        self.finished = true;
                    }

                    return Some(token);
                },
                Err(err) => {
                    eprintln!("{}", err);
                    self.errors.push(err);
                },
            }
        }
    }
}
