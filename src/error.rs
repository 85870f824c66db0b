use crate::callable::BindingFailure;
use crate::span::Span;
use crate::statement::StatementKind;
use crate::string::Name;
use crate::value::Value;
use compact_str::CompactString;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum RuntimeErrorKind {
    #[error("Undefined Variable: {0}")]
    UndefinedVariable(Name),
    #[error("Redeclaration: {0} is already declared in this scope")]
    Redeclaration(Name),
    #[error("Const Violation: {0} can't be reassigned")]
    ConstViolation(Name),
    #[error("Type Mismatch: {name} expects {expected} but got {actual}")]
    TypeMismatch {
        name: Name,
        expected: CompactString,
        actual: CompactString,
    },
    #[error("Function Not Found: {0}")]
    FunctionNotFound(Name),
    #[error(
        "No Matching Overload: none of the {candidates} overloads of {name} accept the arguments"
    )]
    NoMatchingOverload { name: Name, candidates: usize },
    #[error("Ambiguous Overload: {candidates} overloads of {name} match equally well")]
    AmbiguousOverload { name: Name, candidates: usize },
    #[error("Invalid Arguments for {callee}: {reason}")]
    ArgumentBinding {
        callee: Name,
        reason: BindingFailure,
    },
    #[error("Missing Constructor: class {class} has no `{constructor}` method")]
    MissingConstructor { class: Name, constructor: Name },
    #[error("Class Redefinition: {0}")]
    ClassRedefinition(Name),
    #[error("Unsupported Operator: {operator} for [{operands}]")]
    UnsupportedOperator {
        operator: CompactString,
        operands: CompactString,
    },
    #[error("Division By Zero")]
    DivisionByZero,
    #[error("Invalid Chain Access: `{element}` on {target}")]
    InvalidChainAccess {
        target: CompactString,
        element: CompactString,
    },
    #[error("Invalid Argument to `{operation}`: {reason}")]
    InvalidVirtualArgument {
        operation: Name,
        reason: CompactString,
    },
    #[error("Missing Instance: `{0}` used outside of a method")]
    MissingInstance(Name),
    #[error("Invalid Callee: {0}")]
    InvalidCallee(Value),
    #[error("Missing Return: {0} must return a value")]
    MissingReturn(Name),
    #[error("Uncaught Throw: {0}")]
    UncaughtThrow(Value),
    #[error("Scope Cycle: scope `{0}` can't become its own ancestor")]
    ScopeCycle(Name),
    #[error("Misplaced Control: `{control}` in {place}")]
    MisplacedControl {
        control: &'static str,
        place: &'static str,
    },
}

impl RuntimeErrorKind {
    pub fn at(self, span: Span) -> RuntimeError {
        RuntimeError {
            kind: self,
            span,
            context: None,
        }
    }
}

/// Where an error crossed its first statement boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
    pub statement: StatementKind,
    pub scope_owner: Name,
}

#[derive(Debug, Error, Clone)]
#[error("{kind}")]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub span: Span,
    pub context: Option<ErrorContext>,
}

impl RuntimeError {
    pub fn code(&self) -> &'static str {
        match self.kind {
            RuntimeErrorKind::UndefinedVariable(_) => "RT001",
            RuntimeErrorKind::Redeclaration(_) => "RT002",
            RuntimeErrorKind::ConstViolation(_) => "RT003",
            RuntimeErrorKind::TypeMismatch { .. } => "RT004",
            RuntimeErrorKind::FunctionNotFound(_) => "RT005",
            RuntimeErrorKind::NoMatchingOverload { .. } => "RT006",
            RuntimeErrorKind::AmbiguousOverload { .. } => "RT007",
            RuntimeErrorKind::ArgumentBinding { .. } => "RT008",
            RuntimeErrorKind::MissingConstructor { .. } => "RT009",
            RuntimeErrorKind::ClassRedefinition(_) => "RT010",
            RuntimeErrorKind::UnsupportedOperator { .. } => "RT011",
            RuntimeErrorKind::DivisionByZero => "RT012",
            RuntimeErrorKind::InvalidChainAccess { .. } => "RT013",
            RuntimeErrorKind::InvalidVirtualArgument { .. } => "RT014",
            RuntimeErrorKind::MissingInstance(_) => "RT015",
            RuntimeErrorKind::InvalidCallee(_) => "RT016",
            RuntimeErrorKind::MissingReturn(_) => "RT017",
            RuntimeErrorKind::UncaughtThrow(_) => "RT018",
            RuntimeErrorKind::ScopeCycle(_) => "RT019",
            RuntimeErrorKind::MisplacedControl { .. } => "RT020",
        }
    }

    /// Attaches the statement context unless an inner statement already did.
    pub fn with_context(mut self, statement: StatementKind, scope_owner: &str) -> Self {
        if self.context.is_none() {
            self.context = Some(ErrorContext {
                statement,
                scope_owner: scope_owner.into(),
            });
        }
        self
    }

    /// Replaces an empty span with the span of the node that observed the error.
    pub fn or_span(mut self, span: Span) -> Self {
        if self.span.is_empty() {
            self.span = span;
        }
        self
    }
}

impl From<RuntimeErrorKind> for RuntimeError {
    fn from(kind: RuntimeErrorKind) -> Self {
        kind.at(Span::default())
    }
}
