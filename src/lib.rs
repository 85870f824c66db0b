pub mod callable;
pub mod error;
pub mod expression;
pub mod interpreter;
pub mod scope;
pub mod span;
pub mod statement;
pub mod string;
pub mod types;
pub mod value;

pub use error::{RuntimeError, RuntimeErrorKind};
pub use interpreter::{InterpreterConfig, TreeWalkInterpreter};
pub use value::Value;
