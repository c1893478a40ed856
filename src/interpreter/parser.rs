use std::rc::Rc;
use lazy_static::lazy_static;
use thiserror::Error;
use crate::interpreter::ast::{Arguments, BinaryOperator, Block, Call, Chain, CompoundOperator, Expr, Function, IncrementOperator, LiteralValue, Parameters, Stmt};
use crate::interpreter::lexer::{Lexer, LexerError, Literal, Token, TokenType};

#[cfg(test)]
mod tests;

lazy_static! {
    static ref BLOCK_TERMINATORS: [TokenType; 6] = [
        TokenType::Else, TokenType::EndIf,
        TokenType::EndWhile, TokenType::EndFor, TokenType::EndFunction,
        TokenType::Eof,
    ];

    // Binding strength, lowest first. `*` and `/` group to the right.
    static ref EQUALITY_OPERATORS: [TokenType; 5] = [
        TokenType::And,
        TokenType::Equal, TokenType::NotEqual,
        TokenType::GreaterEqual, TokenType::LessEqual,
    ];
    static ref TERM_OPERATORS: [TokenType; 5] = [
        TokenType::Plus, TokenType::Minus, TokenType::Or,
        TokenType::Greater, TokenType::Less,
    ];
    static ref FACTOR_OPERATORS: [TokenType; 2] = [TokenType::Multiply, TokenType::Divide];
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("Syntax error at line {line} : {value} ({message})")]
    UnexpectedToken {
        line: i32,
        value: String,
        message: String,
    },
    #[error("Syntax error at end of input ({message})")]
    UnexpectedEof {
        message: String,
    },
}

pub type ParseResult<T> = Result<T, SyntaxError>;

/// Deepest nesting of blocks, parentheses and operator chains the parser accepts.
pub const MAX_NESTING: usize = 128;

/// Recursive-descent parser over a [`Lexer`]. Parsing stops at the first
/// syntax error; there is no recovery and no partial tree.
pub struct Parser<'source> {
    lexer: Lexer<'source>,
    previous: Token, current: Token,
    depth: usize,
}

impl<'source> Parser<'source> {
    pub fn new(lexer: Lexer<'_>) -> Parser<'_> {
        Parser {
            lexer,
            previous: Token::empty(), current: Token::empty(),
            depth: 0,
        }
    }

    /// Parses one standalone expression, as used by `eval`.
    pub fn parse_expression_source(source: &str) -> ParseResult<Expr> {
        let mut parser = Parser::new(Lexer::new(source));
        parser.consume();

        let expr = parser.parse_expression()?;

        if !parser.is_eof() {
            return Err(parser.error_at_current("Expected end of expression"));
        }

        Ok(expr)
    }

    pub fn lexer_errors(&self) -> &[LexerError] {
        self.lexer.errors()
    }

    pub fn parse(&mut self) -> ParseResult<Block> {
        self.consume();

        let block = self.parse_block()?;

        if !self.is_eof() {
            return Err(self.error_at_current("Expected statement"));
        }

        Ok(block)
    }

    // Statement parsing

    fn parse_block(&mut self) -> ParseResult<Block> {
        self.nested(Self::parse_statements)
    }

    fn parse_statements(&mut self) -> ParseResult<Block> {
        let head = self.parse_terminated_statement()?;
        let mut rest = vec![];

        while !self.check_any(&*BLOCK_TERMINATORS) {
            rest.push(self.parse_terminated_statement()?);
        }

        Ok(Chain::new(head, rest))
    }

    fn parse_terminated_statement(&mut self) -> ParseResult<Stmt> {
        let stmt = self.parse_statement()?;
        self.expect_statement_end()?;
        Ok(stmt)
    }

    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        if self.matches(TokenType::Exit) {
            Ok(Stmt::Exit)
        } else if self.matches(TokenType::Print) {
            self.parse_print_statement()
        } else if self.matches(TokenType::If) {
            self.parse_if_statement()
        } else if self.matches(TokenType::While) {
            self.parse_while_statement()
        } else if self.matches(TokenType::For) {
            self.parse_for_statement()
        } else if self.matches(TokenType::Function) {
            self.parse_function_statement()
        } else if self.matches(TokenType::Return) {
            Ok(Stmt::Return(self.parse_expression()?))
        } else if self.matches(TokenType::Global) {
            self.parse_global_statement()
        } else if self.matches(TokenType::Append) {
            let (target, value) = self.parse_array_method("append")?;
            Ok(Stmt::ArrayAppend { target, value })
        } else if self.matches(TokenType::Remove) {
            let (target, value) = self.parse_array_method("remove")?;
            Ok(Stmt::ArrayRemove { target, value })
        } else {
            self.parse_simple_statement()
        }
    }

    fn parse_print_statement(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenType::ParenthesisLeft, "Expected '(' after 'print'")?;
        let arguments = self.parse_arguments()?;
        self.expect(TokenType::ParenthesisRight, "Expected ')' after print arguments")?;

        Ok(Stmt::Print(arguments))
    }

    fn parse_if_statement(&mut self) -> ParseResult<Stmt> {
        let condition = self.parse_expression()?;
        self.expect(TokenType::Then, "Expected 'then' after 'if' condition")?;

        let then = self.parse_block()?;
        let otherwise = if self.matches(TokenType::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };

        self.expect(TokenType::EndIf, "Expected 'endif' after 'if' block")?;
        Ok(Stmt::If { condition, then, otherwise })
    }

    fn parse_while_statement(&mut self) -> ParseResult<Stmt> {
        let condition = self.parse_expression()?;
        self.expect(TokenType::Do, "Expected 'do' after 'while' condition")?;

        let body = self.parse_block()?;
        self.expect(TokenType::EndWhile, "Expected 'endwhile' after 'while' body")?;

        Ok(Stmt::While { condition, body })
    }

    fn parse_for_statement(&mut self) -> ParseResult<Stmt> {
        let init = self.parse_statement()?;
        self.expect(TokenType::Semicolon, "Expected ';' after 'for' initializer")?;

        let condition = self.parse_expression()?;
        self.expect(TokenType::Semicolon, "Expected ';' after 'for' condition")?;

        let step = self.parse_statement()?;
        self.expect(TokenType::Do, "Expected 'do' after 'for' step")?;

        let body = self.parse_block()?;
        self.expect(TokenType::EndFor, "Expected 'endfor' after 'for' body")?;

        Ok(Stmt::For { init: Box::new(init), condition, step: Box::new(step), body })
    }

    fn parse_function_statement(&mut self) -> ParseResult<Stmt> {
        let name = self.expect_identifier("Expected name after 'function'")?;
        self.expect(TokenType::ParenthesisLeft, "Expected '(' after function name")?;

        let parameters = if self.check(TokenType::ParenthesisRight) {
            None
        } else {
            let first = self.expect_identifier("Expected parameter name after '('")?;
            Some(self.parse_names(first)?)
        };

        self.expect(TokenType::ParenthesisRight, "Expected ')' after function parameters")?;

        let body = self.parse_block()?;
        self.expect(TokenType::EndFunction, "Expected 'endfunction' after function body")?;

        Ok(Stmt::FunctionDef(Rc::new(Function { name, parameters, body })))
    }

    fn parse_global_statement(&mut self) -> ParseResult<Stmt> {
        let name = self.expect_identifier("Expected name after 'global'")?;

        if self.matches(TokenType::Assign) {
            let value = self.parse_expression()?;
            Ok(Stmt::GlobalDeclare { name, value })
        } else {
            Ok(Stmt::GlobalPromote { name })
        }
    }

    fn parse_array_method(&mut self, method: &str) -> ParseResult<(Expr, Expr)> {
        self.expect(TokenType::ParenthesisLeft, &format!("Expected '(' after '{}'", method))?;
        let target = self.parse_expression()?;
        self.expect(TokenType::Comma, &format!("Expected ',' after '{}' target", method))?;
        let value = self.parse_expression()?;
        self.expect(TokenType::ParenthesisRight, &format!("Expected ')' after '{}' value", method))?;

        Ok((target, value))
    }

    /// Statements that start like an expression: assignments of every kind,
    /// calls, and bare expressions.
    fn parse_simple_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.parse_expression()?;

        match expr {
            Expr::Identifier(name) => {
                if self.matches(TokenType::Assign) {
                    let value = self.parse_expression()?;
                    Ok(Stmt::Assign { name, value })
                } else if self.matches(TokenType::PlusPlus) {
                    Ok(Stmt::Increment { name, operator: IncrementOperator::Increment })
                } else if self.matches(TokenType::MinusMinus) {
                    Ok(Stmt::Increment { name, operator: IncrementOperator::Decrement })
                } else if let Some(operator) = CompoundOperator::from_token(self.current.token_type()) {
                    self.consume();
                    let value = self.parse_expression()?;
                    Ok(Stmt::CompoundAssign { name, operator, value })
                } else if self.check(TokenType::Comma) {
                    let names = self.parse_names(name)?;
                    self.expect(TokenType::Assign, "Expected '=' after names")?;
                    let values = self.parse_arguments()?;
                    Ok(Stmt::MultiAssign { names, values })
                } else {
                    Ok(Stmt::Expression(Expr::Identifier(name)))
                }
            },
            Expr::Index { name, indices } if self.check(TokenType::Assign) => {
                self.consume();
                let value = self.parse_expression()?;
                Ok(Stmt::ArrayIndexAssign { name, indices, value })
            },
            Expr::Call(call) => Ok(Stmt::Call(call)),
            expr => Ok(Stmt::Expression(expr)),
        }
    }

    /// Parses `, name, name ...` following an already consumed first name.
    fn parse_names(&mut self, first: String) -> ParseResult<Parameters> {
        let mut rest = vec![];

        while self.matches(TokenType::Comma) {
            rest.push(self.expect_identifier("Expected name after ','")?);
        }

        Ok(Chain::new(first, rest))
    }

    fn parse_arguments(&mut self) -> ParseResult<Arguments> {
        let head = self.parse_expression()?;
        let mut rest = vec![];

        while self.matches(TokenType::Comma) {
            rest.push(self.parse_expression()?);
        }

        Ok(Chain::new(head, rest))
    }

    // Expression parsing

    pub fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.nested(Self::parse_equality)
    }

    fn parse_equality(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_term()?;

        while let Some(operator) = self.match_operator(&*EQUALITY_OPERATORS) {
            let right = self.parse_term()?;
            expr = Expr::Binary { operator, left: Box::new(expr), right: Box::new(right) };
        }

        Ok(expr)
    }

    fn parse_term(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_factor()?;

        while let Some(operator) = self.match_operator(&*TERM_OPERATORS) {
            let right = self.parse_factor()?;
            expr = Expr::Binary { operator, left: Box::new(expr), right: Box::new(right) };
        }

        Ok(expr)
    }

    fn parse_factor(&mut self) -> ParseResult<Expr> {
        let expr = self.parse_primary()?;

        if let Some(operator) = self.match_operator(&*FACTOR_OPERATORS) {
            // Right-associative: `8 / 4 / 2` is `8 / (4 / 2)`
            let right = self.nested(Self::parse_factor)?;
            return Ok(Expr::Binary { operator, left: Box::new(expr), right: Box::new(right) });
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        if self.matches(TokenType::LiteralInt) {
            return match self.previous.literal() {
                Literal::Int(value) => Ok(Expr::Literal(LiteralValue::Int(*value))),
                _ => Err(self.error_at_previous("Malformed integer literal")),
            };
        } else if self.matches(TokenType::LiteralString) {
            return match self.previous.literal() {
                Literal::Str(value) => Ok(Expr::Literal(LiteralValue::Str(value.clone()))),
                _ => Err(self.error_at_previous("Malformed string literal")),
            };
        } else if self.matches(TokenType::Identifier) {
            let name = self.previous.source().to_owned();

            if self.matches(TokenType::ParenthesisLeft) {
                return Ok(Expr::Call(self.finish_call(name)?));
            } else if self.check(TokenType::SquareBracketLeft) {
                let indices = self.parse_indices()?;
                return Ok(Expr::Index { name, indices });
            }

            return Ok(Expr::Identifier(name));
        } else if self.matches(TokenType::ParenthesisLeft) {
            let expr = self.parse_expression()?;
            self.expect(TokenType::ParenthesisRight, "Expected ')' after expression")?;

            return Ok(expr);
        } else if self.matches(TokenType::SquareBracketLeft) {
            if self.matches(TokenType::SquareBracketRight) {
                return Ok(Expr::ArrayLiteral(None));
            }

            let elements = self.parse_arguments()?;
            self.expect(TokenType::SquareBracketRight, "Expected ']' after array elements")?;

            return Ok(Expr::ArrayLiteral(Some(elements)));
        } else if self.matches(TokenType::Eval) {
            return Ok(Expr::DynamicEval(Box::new(self.parse_parenthesized("eval")?)));
        } else if self.matches(TokenType::Id) {
            return Ok(Expr::Identity(Box::new(self.parse_parenthesized("id")?)));
        }

        Err(self.error_at_current("Expected expression"))
    }

    fn finish_call(&mut self, name: String) -> ParseResult<Call> {
        let arguments = if self.check(TokenType::ParenthesisRight) {
            None
        } else {
            Some(self.parse_arguments()?)
        };

        self.expect(TokenType::ParenthesisRight, "Expected ')' after function call arguments")?;
        Ok(Call { name, arguments })
    }

    fn parse_indices(&mut self) -> ParseResult<Chain<Expr>> {
        let mut indices = vec![];

        while self.matches(TokenType::SquareBracketLeft) {
            indices.push(self.parse_expression()?);
            self.expect(TokenType::SquareBracketRight, "Expected ']' after index expression")?;
        }

        Chain::from_vec(indices).ok_or_else(|| self.error_at_current("Expected '['"))
    }

    fn parse_parenthesized(&mut self, keyword: &str) -> ParseResult<Expr> {
        self.expect(TokenType::ParenthesisLeft, &format!("Expected '(' after '{}'", keyword))?;
        let expr = self.parse_expression()?;
        self.expect(TokenType::ParenthesisRight, &format!("Expected ')' after '{}' operand", keyword))?;

        Ok(expr)
    }

    // Token handling

    fn consume(&mut self) {
        std::mem::swap(&mut self.previous, &mut self.current);

        self.current = match self.lexer.next() {
            Some(token) => token,
            None => Token::new(TokenType::Eof, String::new(), Literal::None, *self.previous.start()),
        };
    }

    fn expect(&mut self, token_type: TokenType, message: &str) -> ParseResult<()> {
        if self.current.token_type() == token_type {
            self.consume();
            return Ok(());
        }

        Err(self.error_at_current(message))
    }

    fn expect_identifier(&mut self, message: &str) -> ParseResult<String> {
        self.expect(TokenType::Identifier, message)?;
        Ok(self.previous.source().to_owned())
    }

    #[inline]
    fn expect_statement_end(&mut self) -> ParseResult<()> {
        self.expect(TokenType::Semicolon, "Expected ';' after statement")
    }

    fn matches(&mut self, token_type: TokenType) -> bool { // Should be called "match", but that's a keyword
        if !self.check(token_type) {
            return false;
        }

        self.consume();
        true
    }

    fn match_operator(&mut self, token_types: &[TokenType]) -> Option<BinaryOperator> {
        if !self.check_any(token_types) {
            return None;
        }

        self.consume();
        BinaryOperator::from_token(self.previous.token_type())
    }

    #[inline]
    fn check(&self, token_type: TokenType) -> bool {
        self.current.token_type() == token_type
    }

    fn check_any(&self, token_types: &[TokenType]) -> bool {
        token_types.contains(&self.current.token_type())
    }

    fn is_eof(&self) -> bool {
        self.current.token_type() == TokenType::Eof
    }

    // Error handling

    fn nested<T>(&mut self, parse: impl FnOnce(&mut Parser<'source>) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(self.error_at_current("Nested too deeply"));
        }

        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;

        result
    }

    fn error_at_current(&self, message: &str) -> SyntaxError {
        Self::error_at(&self.current, message)
    }

    fn error_at_previous(&self, message: &str) -> SyntaxError {
        Self::error_at(&self.previous, message)
    }

    fn error_at(token: &Token, message: &str) -> SyntaxError {
        if token.token_type() == TokenType::Eof {
            SyntaxError::UnexpectedEof { message: message.to_owned() }
        } else {
            SyntaxError::UnexpectedToken { line: token.line(), value: token.source().to_owned(), message: message.to_owned() }
        }
    }
}
