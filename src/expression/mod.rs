//! Expression nodes handed over by the parser.

pub mod formatter;

use crate::span::Span;
use crate::statement::VariableDecl;
use crate::string::Name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Bang,
    Minus,
    Tilde,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    EqualEqual,
    BangEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    String(Name),
}

/// A call argument, optionally passed by parameter name.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: Option<Name>,
    pub value: Expression,
}

impl Argument {
    pub fn positional(value: Expression) -> Self {
        Self { name: None, value }
    }

    pub fn named(name: &str, value: Expression) -> Self {
        Self {
            name: Some(name.into()),
            value,
        }
    }
}

/// Where the first element of a chain is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOrigin {
    /// The scope the chain is evaluated in.
    Scope,
    /// The instance the enclosing method runs against. Set when a leading
    /// accessor (`self.`) is stripped at method registration.
    Instance,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChainElement {
    Read(Name),
    Assign { name: Name, value: Box<Expression> },
    Declare(Box<VariableDecl>),
    Call {
        name: Name,
        arguments: Vec<Argument>,
    },
}

impl ChainElement {
    pub fn read(name: &str) -> Self {
        ChainElement::Read(name.into())
    }

    pub fn assign(name: &str, value: Expression) -> Self {
        ChainElement::Assign {
            name: name.into(),
            value: Box::new(value),
        }
    }

    pub fn declare(decl: VariableDecl) -> Self {
        ChainElement::Declare(Box::new(decl))
    }

    pub fn call(name: &str, arguments: Vec<Expression>) -> Self {
        ChainElement::Call {
            name: name.into(),
            arguments: arguments.into_iter().map(Argument::positional).collect(),
        }
    }

    pub fn name(&self) -> &Name {
        match self {
            ChainElement::Read(name)
            | ChainElement::Assign { name, .. }
            | ChainElement::Call { name, .. } => name,
            ChainElement::Declare(decl) => &decl.name,
        }
    }
}

/// `a.b.c(...)`: evaluated left to right, switching scope at every instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub origin: ChainOrigin,
    pub elements: Vec<ChainElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Literal(Literal),
    List(Vec<Expression>),
    Array(Vec<Expression>),
    Set(Vec<Expression>),
    Dict(Vec<(Expression, Expression)>),
    Variable(Name),
    SelfReference,
    Unary {
        operator: UnaryOperator,
        rhs: Box<Expression>,
    },
    Binary {
        operator: BinaryOperator,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    Logical {
        operator: LogicalOperator,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    Call {
        callee: Name,
        arguments: Vec<Argument>,
    },
    CallValue {
        callee: Box<Expression>,
        arguments: Vec<Argument>,
    },
    Chain(Chain),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub span: Span,
}

impl Expression {
    pub fn new(kind: ExpressionKind) -> Self {
        Self {
            kind,
            span: Span::default(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn literal(literal: Literal) -> Self {
        Self::new(ExpressionKind::Literal(literal))
    }

    pub fn null() -> Self {
        Self::literal(Literal::Null)
    }

    pub fn bool(value: bool) -> Self {
        Self::literal(Literal::Bool(value))
    }

    pub fn int(value: i32) -> Self {
        Self::literal(Literal::Int(value))
    }

    pub fn long(value: i64) -> Self {
        Self::literal(Literal::Long(value))
    }

    pub fn float(value: f32) -> Self {
        Self::literal(Literal::Float(value))
    }

    pub fn double(value: f64) -> Self {
        Self::literal(Literal::Double(value))
    }

    pub fn char(value: char) -> Self {
        Self::literal(Literal::Char(value))
    }

    pub fn string(value: &str) -> Self {
        Self::literal(Literal::String(value.into()))
    }

    pub fn list(items: Vec<Expression>) -> Self {
        Self::new(ExpressionKind::List(items))
    }

    pub fn dict(entries: Vec<(Expression, Expression)>) -> Self {
        Self::new(ExpressionKind::Dict(entries))
    }

    pub fn variable(name: &str) -> Self {
        Self::new(ExpressionKind::Variable(name.into()))
    }

    pub fn unary(operator: UnaryOperator, rhs: Expression) -> Self {
        Self::new(ExpressionKind::Unary {
            operator,
            rhs: Box::new(rhs),
        })
    }

    pub fn binary(operator: BinaryOperator, lhs: Expression, rhs: Expression) -> Self {
        Self::new(ExpressionKind::Binary {
            operator,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    pub fn logical(operator: LogicalOperator, lhs: Expression, rhs: Expression) -> Self {
        Self::new(ExpressionKind::Logical {
            operator,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    pub fn call(callee: &str, arguments: Vec<Expression>) -> Self {
        let arguments = arguments.into_iter().map(Argument::positional).collect();
        Self::call_with(callee, arguments)
    }

    pub fn call_with(callee: &str, arguments: Vec<Argument>) -> Self {
        Self::new(ExpressionKind::Call {
            callee: callee.into(),
            arguments,
        })
    }

    pub fn call_value(callee: Expression, arguments: Vec<Expression>) -> Self {
        Self::new(ExpressionKind::CallValue {
            callee: Box::new(callee),
            arguments: arguments.into_iter().map(Argument::positional).collect(),
        })
    }

    pub fn chain(elements: Vec<ChainElement>) -> Self {
        Self::new(ExpressionKind::Chain(Chain {
            origin: ChainOrigin::Scope,
            elements,
        }))
    }
}
