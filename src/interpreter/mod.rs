//! The tree-walking evaluator.
//!
//! Statements are interpreted into an [`EvalResult`], expressions into a
//! plain [`Value`]. Control flow (`return`, `break`, `continue`, `throw`)
//! travels outward as an [`EvalResult`] until a loop or a call boundary
//! consumes it.

mod call;
mod chain;
mod definition;
mod expression;
mod native;
mod tree;

pub use native::NativeMethod;
pub use tree::TreeWalkStatementInterpreter;

use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::scope::Scope;
use crate::statement::Statement;
use crate::string::Name;
use crate::types::MatchOptions;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct InterpreterConfig {
    pub match_options: MatchOptions,
    /// Implicit instance token stripped from method bodies.
    pub accessor: Name,
    /// Method every class must define; invoked on instantiation.
    pub constructor: Name,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            match_options: MatchOptions::default(),
            accessor: "self".into(),
            constructor: "construct".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    None,
    Return,
    Break,
    Continue,
    Throw,
}

impl ControlFlow {
    pub fn keyword(self) -> &'static str {
        match self {
            ControlFlow::None => "",
            ControlFlow::Return => "return",
            ControlFlow::Break => "break",
            ControlFlow::Continue => "continue",
            ControlFlow::Throw => "throw",
        }
    }
}

/// Outcome of interpreting a statement.
#[derive(Debug, Clone)]
pub struct EvalResult {
    pub flow: ControlFlow,
    pub value: Value,
}

impl EvalResult {
    pub fn none() -> Self {
        Self::settled(Value::null())
    }

    pub fn settled(value: Value) -> Self {
        Self {
            flow: ControlFlow::None,
            value,
        }
    }

    pub fn returned(value: Value) -> Self {
        Self {
            flow: ControlFlow::Return,
            value,
        }
    }

    pub fn broke() -> Self {
        Self {
            flow: ControlFlow::Break,
            value: Value::null(),
        }
    }

    pub fn continued() -> Self {
        Self {
            flow: ControlFlow::Continue,
            value: Value::null(),
        }
    }

    pub fn thrown(value: Value) -> Self {
        Self {
            flow: ControlFlow::Throw,
            value,
        }
    }

    /// Whether the remaining statements of a block must be skipped.
    pub fn is_control(&self) -> bool {
        self.flow != ControlFlow::None
    }
}

pub struct TreeWalkInterpreter {
    root: Scope,
    interpreter: TreeWalkStatementInterpreter,
}

impl TreeWalkInterpreter {
    pub fn new() -> Self {
        Self::with_config(InterpreterConfig::default())
    }

    pub fn with_config(config: InterpreterConfig) -> Self {
        Self {
            root: Scope::root(config.match_options),
            interpreter: TreeWalkStatementInterpreter::create(config),
        }
    }

    pub fn root(&self) -> &Scope {
        &self.root
    }

    pub fn config(&self) -> &InterpreterConfig {
        self.interpreter.config()
    }

    pub fn statements(&self) -> &TreeWalkStatementInterpreter {
        &self.interpreter
    }

    /// Runs `program` in the root scope.
    ///
    /// Yields the value of the last settled statement, or the value of a
    /// top-level `return`. A `break` or `continue` outside of a loop is an
    /// error.
    pub fn run(&self, program: &[Statement]) -> Result<Value, RuntimeError> {
        let mut last = Value::null();
        for statement in program {
            let result = self
                .interpreter
                .interpret_statement(statement, &self.root, None)?;
            match result.flow {
                ControlFlow::None => last = result.value,
                ControlFlow::Return => return Ok(result.value),
                ControlFlow::Throw => {
                    return Err(RuntimeErrorKind::UncaughtThrow(result.value).at(statement.span))
                }
                ControlFlow::Break | ControlFlow::Continue => {
                    return Err(RuntimeErrorKind::MisplacedControl {
                        control: result.flow.keyword(),
                        place: "top level",
                    }
                    .at(statement.span));
                }
            }
        }
        Ok(last)
    }

    pub fn evaluate(
        &self,
        expression: &crate::expression::Expression,
    ) -> Result<Value, RuntimeError> {
        self.interpreter.evaluate(expression, &self.root, None)
    }
}

impl Default for TreeWalkInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TreeWalkInterpreter {
    fn drop(&mut self) {
        self.root.teardown();
    }
}
