#![allow(dead_code)]

use color_eyre::eyre::eyre;
use color_eyre::Result;
use kestrel::expression::{BinaryOperator, Expression};
use kestrel::statement::Statement;
use kestrel::{RuntimeError, TreeWalkInterpreter, Value};

/// Interpreter errors hold `Rc`s, so they are rendered before being reported.
pub trait Reported<T> {
    fn reported(self) -> Result<T>;
}

impl<T, E: std::fmt::Display> Reported<T> for std::result::Result<T, E> {
    fn reported(self) -> Result<T> {
        self.map_err(|error| eyre!("{error}"))
    }
}

pub fn run(program: &[Statement]) -> Result<Value> {
    TreeWalkInterpreter::new().run(program).reported()
}

pub fn run_err(program: &[Statement]) -> Result<RuntimeError> {
    match TreeWalkInterpreter::new().run(program) {
        Ok(value) => Err(eyre!("expected an error but got {value}")),
        Err(error) => Ok(error),
    }
}

pub fn var(name: &str) -> Expression {
    Expression::variable(name)
}

pub fn add(lhs: Expression, rhs: Expression) -> Expression {
    Expression::binary(BinaryOperator::Add, lhs, rhs)
}

pub fn less(lhs: Expression, rhs: Expression) -> Expression {
    Expression::binary(BinaryOperator::LessThan, lhs, rhs)
}

pub fn equals(lhs: Expression, rhs: Expression) -> Expression {
    Expression::binary(BinaryOperator::EqualEqual, lhs, rhs)
}
