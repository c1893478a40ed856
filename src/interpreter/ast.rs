use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;
use crate::interpreter::lexer::TokenType;

pub mod chain;

pub use chain::Chain;

/// Statements of a block, head first.
pub type Block = Chain<Stmt>;
pub type Arguments = Chain<Expr>;
pub type Parameters = Chain<String>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    Add, Subtract, Multiply, Divide,
    And, Or,
    Greater, Less, Equal, GreaterEqual, LessEqual, NotEqual,
}

impl BinaryOperator {
    pub fn from_token(token_type: TokenType) -> Option<BinaryOperator> {
        Some(match token_type {
            TokenType::Plus => BinaryOperator::Add,
            TokenType::Minus => BinaryOperator::Subtract,
            TokenType::Multiply => BinaryOperator::Multiply,
            TokenType::Divide => BinaryOperator::Divide,
            TokenType::And => BinaryOperator::And,
            TokenType::Or => BinaryOperator::Or,
            TokenType::Greater => BinaryOperator::Greater,
            TokenType::Less => BinaryOperator::Less,
            TokenType::Equal => BinaryOperator::Equal,
            TokenType::GreaterEqual => BinaryOperator::GreaterEqual,
            TokenType::LessEqual => BinaryOperator::LessEqual,
            TokenType::NotEqual => BinaryOperator::NotEqual,
            _ => return None,
        })
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
            BinaryOperator::Greater => ">",
            BinaryOperator::Less => "<",
            BinaryOperator::Equal => "==",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::NotEqual => "!=",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IncrementOperator {
    Increment,
    Decrement,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompoundOperator {
    Add, Subtract, Multiply, Divide,
}

impl CompoundOperator {
    pub fn from_token(token_type: TokenType) -> Option<CompoundOperator> {
        Some(match token_type {
            TokenType::PlusAssign => CompoundOperator::Add,
            TokenType::MinusAssign => CompoundOperator::Subtract,
            TokenType::MultiplyAssign => CompoundOperator::Multiply,
            TokenType::DivideAssign => CompoundOperator::Divide,
            _ => return None,
        })
    }

    pub fn binary_operator(&self) -> BinaryOperator {
        match self {
            CompoundOperator::Add => BinaryOperator::Add,
            CompoundOperator::Subtract => BinaryOperator::Subtract,
            CompoundOperator::Multiply => BinaryOperator::Multiply,
            CompoundOperator::Divide => BinaryOperator::Divide,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LiteralValue {
    Int(i64),
    Str(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub name: String,
    pub arguments: Option<Arguments>,
}

/// A user function: `None` parameters means `function name()`.
#[derive(Debug, PartialEq)]
pub struct Function {
    pub name: String,
    pub parameters: Option<Parameters>,
    pub body: Block,
}

#[derive(Clone, PartialEq)]
pub enum Expr {
    Literal(LiteralValue),
    Identifier(String),
    Binary {
        operator: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call(Call),
    Index {
        name: String,
        indices: Chain<Expr>,
    },
    ArrayLiteral(Option<Arguments>),
    DynamicEval(Box<Expr>),
    Identity(Box<Expr>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Exit,
    Print(Arguments),
    If {
        condition: Expr,
        then: Block,
        otherwise: Option<Block>,
    },
    While {
        condition: Expr,
        body: Block,
    },
    For {
        init: Box<Stmt>,
        condition: Expr,
        step: Box<Stmt>,
        body: Block,
    },
    FunctionDef(Rc<Function>),
    Return(Expr),
    Call(Call),

    Assign {
        name: String,
        value: Expr,
    },
    MultiAssign {
        names: Parameters,
        values: Arguments,
    },
    GlobalDeclare {
        name: String,
        value: Expr,
    },
    GlobalPromote {
        name: String,
    },
    ArrayIndexAssign {
        name: String,
        indices: Chain<Expr>,
        value: Expr,
    },
    ArrayAppend {
        target: Expr,
        value: Expr,
    },
    ArrayRemove {
        target: Expr,
        value: Expr,
    },
    Increment {
        name: String,
        operator: IncrementOperator,
    },
    CompoundAssign {
        name: String,
        operator: CompoundOperator,
        value: Expr,
    },

    Expression(Expr),
}

fn write_list<T: Display>(f: &mut Formatter<'_>, items: Option<&Chain<T>>) -> std::fmt::Result {
    if let Some(items) = items {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }

            write!(f, "{}", item)?;
        }
    }

    Ok(())
}

impl Display for Call {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(", self.name)?;
        write_list(f, self.arguments.as_ref())?;
        f.write_str(")")
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Literal(LiteralValue::Int(value)) => write!(f, "{}", value),
            Expr::Literal(LiteralValue::Str(value)) => write!(f, "\"{}\"", value),
            Expr::Identifier(name) => f.write_str(name),
            Expr::Binary { operator, left, right } => write!(f, "({} {} {})", left, operator.symbol(), right),
            Expr::Call(call) => write!(f, "{}", call),
            Expr::Index { name, indices } => {
                f.write_str(name)?;

                for index in indices.iter() {
                    write!(f, "[{}]", index)?;
                }

                Ok(())
            },
            Expr::ArrayLiteral(elements) => {
                f.write_str("[")?;
                write_list(f, elements.as_ref())?;
                f.write_str("]")
            },
            Expr::DynamicEval(expr) => write!(f, "eval({})", expr),
            Expr::Identity(expr) => write!(f, "id({})", expr),
        }
    }
}

impl Debug for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
