//! Statement nodes handed over by the parser.

mod accessor;
mod free_variables;

pub use accessor::strip_accessor;

use crate::expression::Expression;
use crate::span::Span;
use crate::string::Name;
use crate::types::TypeAnnotation;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeclFlags {
    pub is_const: bool,
    pub is_mutable: bool,
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub name: Name,
    pub annotation: Option<TypeAnnotation>,
    pub initial: Option<Expression>,
    pub flags: DeclFlags,
}

impl VariableDecl {
    pub fn new(
        name: &str,
        annotation: Option<TypeAnnotation>,
        initial: Option<Expression>,
    ) -> Self {
        Self {
            name: name.into(),
            annotation,
            initial,
            flags: DeclFlags::default(),
        }
    }

    pub fn constant(mut self) -> Self {
        self.flags.is_const = true;
        self
    }

    pub fn mutable(mut self) -> Self {
        self.flags.is_mutable = true;
        self
    }

    pub fn static_member(mut self) -> Self {
        self.flags.is_static = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: Name,
    pub annotation: Option<TypeAnnotation>,
    pub default: Option<Expression>,
    pub variadic: bool,
    pub flags: DeclFlags,
}

impl Parameter {
    pub fn untyped(name: &str) -> Self {
        Self {
            name: name.into(),
            annotation: None,
            default: None,
            variadic: false,
            flags: DeclFlags::default(),
        }
    }

    pub fn typed(name: &str, annotation: TypeAnnotation) -> Self {
        Self {
            annotation: Some(annotation),
            ..Self::untyped(name)
        }
    }

    pub fn with_default(mut self, default: Expression) -> Self {
        self.default = Some(default);
        self
    }

    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    pub fn mutable(mut self) -> Self {
        self.flags.is_mutable = true;
        self
    }
}

/// `function` definitions are isolated from their defining scope; `def`
/// definitions are closures over the free variables they mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Function,
    Def,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Name,
    pub kind: FunctionKind,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeAnnotation>,
    pub body: Vec<Statement>,
}

impl FunctionDecl {
    pub fn free_variables(&self) -> BTreeSet<Name> {
        free_variables::of_function(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: Name,
    /// Implicit self token used inside method bodies. Defaults to `self`.
    pub accessor: Option<Name>,
    pub body: Vec<Statement>,
}

impl ClassDecl {
    pub fn free_variables(&self) -> BTreeSet<Name> {
        free_variables::of_block(&self.body)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfBranch {
    pub condition: Expression,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementNode {
    Expression(Expression),
    VariableDecl(VariableDecl),
    Assignment {
        name: Name,
        value: Expression,
    },
    Block(Vec<Statement>),
    /// `if` followed by any number of `elif` branches, then an optional `else`.
    If {
        branches: Vec<IfBranch>,
        otherwise: Option<Vec<Statement>>,
    },
    While {
        condition: Expression,
        body: Vec<Statement>,
    },
    Return(Option<Expression>),
    Break,
    Continue,
    Throw(Expression),
    FunctionDecl(FunctionDecl),
    ClassDecl(ClassDecl),
    TypeAlias {
        name: Name,
        annotation: TypeAnnotation,
    },
}

/// Discriminant of a statement, used to label diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Expression,
    VariableDecl,
    Assignment,
    Block,
    If,
    While,
    Return,
    Break,
    Continue,
    Throw,
    FunctionDecl,
    ClassDecl,
    TypeAlias,
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            StatementKind::Expression => "expression",
            StatementKind::VariableDecl => "variable declaration",
            StatementKind::Assignment => "assignment",
            StatementKind::Block => "block",
            StatementKind::If => "if",
            StatementKind::While => "while",
            StatementKind::Return => "return",
            StatementKind::Break => "break",
            StatementKind::Continue => "continue",
            StatementKind::Throw => "throw",
            StatementKind::FunctionDecl => "function definition",
            StatementKind::ClassDecl => "class definition",
            StatementKind::TypeAlias => "type alias",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub node: StatementNode,
    pub span: Span,
}

impl Statement {
    pub fn new(node: StatementNode) -> Self {
        Self {
            node,
            span: Span::default(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn kind(&self) -> StatementKind {
        match self.node {
            StatementNode::Expression(_) => StatementKind::Expression,
            StatementNode::VariableDecl(_) => StatementKind::VariableDecl,
            StatementNode::Assignment { .. } => StatementKind::Assignment,
            StatementNode::Block(_) => StatementKind::Block,
            StatementNode::If { .. } => StatementKind::If,
            StatementNode::While { .. } => StatementKind::While,
            StatementNode::Return(_) => StatementKind::Return,
            StatementNode::Break => StatementKind::Break,
            StatementNode::Continue => StatementKind::Continue,
            StatementNode::Throw(_) => StatementKind::Throw,
            StatementNode::FunctionDecl(_) => StatementKind::FunctionDecl,
            StatementNode::ClassDecl(_) => StatementKind::ClassDecl,
            StatementNode::TypeAlias { .. } => StatementKind::TypeAlias,
        }
    }

    pub fn expression(expression: Expression) -> Self {
        Self::new(StatementNode::Expression(expression))
    }

    pub fn var(name: &str, annotation: Option<TypeAnnotation>, initial: Expression) -> Self {
        Self::new(StatementNode::VariableDecl(VariableDecl::new(name, annotation, Some(initial))))
    }

    pub fn declare(decl: VariableDecl) -> Self {
        Self::new(StatementNode::VariableDecl(decl))
    }

    pub fn assign(name: &str, value: Expression) -> Self {
        Self::new(StatementNode::Assignment {
            name: name.into(),
            value,
        })
    }

    pub fn block(body: Vec<Statement>) -> Self {
        Self::new(StatementNode::Block(body))
    }

    pub fn if_else(
        condition: Expression,
        body: Vec<Statement>,
        otherwise: Option<Vec<Statement>>,
    ) -> Self {
        Self::new(StatementNode::If {
            branches: vec![IfBranch { condition, body }],
            otherwise,
        })
    }

    pub fn while_loop(condition: Expression, body: Vec<Statement>) -> Self {
        Self::new(StatementNode::While { condition, body })
    }

    pub fn return_value(value: Expression) -> Self {
        Self::new(StatementNode::Return(Some(value)))
    }

    pub fn brk() -> Self {
        Self::new(StatementNode::Break)
    }

    pub fn cont() -> Self {
        Self::new(StatementNode::Continue)
    }

    pub fn throw(value: Expression) -> Self {
        Self::new(StatementNode::Throw(value))
    }

    pub fn function(
        name: &str,
        parameters: Vec<Parameter>,
        return_type: Option<TypeAnnotation>,
        body: Vec<Statement>,
    ) -> Self {
        Self::new(StatementNode::FunctionDecl(FunctionDecl {
            name: name.into(),
            kind: FunctionKind::Function,
            parameters,
            return_type,
            body,
        }))
    }

    pub fn def(name: &str, parameters: Vec<Parameter>, body: Vec<Statement>) -> Self {
        Self::new(StatementNode::FunctionDecl(FunctionDecl {
            name: name.into(),
            kind: FunctionKind::Def,
            parameters,
            return_type: None,
            body,
        }))
    }

    pub fn class(name: &str, body: Vec<Statement>) -> Self {
        Self::new(StatementNode::ClassDecl(ClassDecl {
            name: name.into(),
            accessor: None,
            body,
        }))
    }

    pub fn type_alias(name: &str, annotation: TypeAnnotation) -> Self {
        Self::new(StatementNode::TypeAlias {
            name: name.into(),
            annotation,
        })
    }

    pub fn collect_free_variables(&self) -> BTreeSet<Name> {
        free_variables::of_block(std::slice::from_ref(self))
    }
}

impl Expression {
    pub fn collect_free_variables(&self) -> BTreeSet<Name> {
        free_variables::of_expression(self)
    }
}
