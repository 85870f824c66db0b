use super::TreeWalkStatementInterpreter;
use crate::callable::{CallArguments, Callable, ClassInstance, OverloadSet};
use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::expression::{
    Argument, BinaryOperator, Expression, ExpressionKind, Literal, LogicalOperator, UnaryOperator,
};
use crate::scope::Scope;
use crate::value::Value;
use std::rc::Rc;

// Expression evaluator
impl TreeWalkStatementInterpreter {
    pub fn evaluate(
        &self,
        expression: &Expression,
        scope: &Scope,
        instance: Option<&Rc<ClassInstance>>,
    ) -> Result<Value, RuntimeError> {
        self.evaluate_expression(expression, scope, instance)
            .map_err(|error| error.or_span(expression.span))
    }

    fn evaluate_expression(
        &self,
        expression: &Expression,
        scope: &Scope,
        instance: Option<&Rc<ClassInstance>>,
    ) -> Result<Value, RuntimeError> {
        match &expression.kind {
            ExpressionKind::Literal(literal) => Ok(Self::evaluate_literal(literal)),
            ExpressionKind::List(items) => {
                Ok(Value::list(self.evaluate_items(items, scope, instance)?))
            }
            ExpressionKind::Array(items) => {
                Ok(Value::array(self.evaluate_items(items, scope, instance)?))
            }
            ExpressionKind::Set(items) => {
                Ok(Value::set(self.evaluate_items(items, scope, instance)?))
            }
            ExpressionKind::Dict(entries) => {
                let mut pairs = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    let key = self.evaluate(key, scope, instance)?.duplicate();
                    let value = self.evaluate(value, scope, instance)?.duplicate();
                    pairs.push((key, value));
                }
                Ok(Value::dict(pairs))
            }
            ExpressionKind::Variable(name) => Ok(self.read_variable(name, scope)?),
            ExpressionKind::SelfReference => match instance {
                Some(instance) => Ok(Value::instance(Rc::clone(instance))),
                None => {
                    let accessor = self.config().accessor.clone();
                    Err(RuntimeErrorKind::MissingInstance(accessor).into())
                }
            },
            ExpressionKind::Unary { operator, rhs } => {
                let rhs = self.evaluate(rhs, scope, instance)?;
                Ok(Self::evaluate_unary(*operator, &rhs)?)
            }
            ExpressionKind::Binary { operator, lhs, rhs } => {
                let lhs = self.evaluate(lhs, scope, instance)?;
                let rhs = self.evaluate(rhs, scope, instance)?;
                Ok(Self::evaluate_binary(*operator, &lhs, &rhs)?)
            }
            ExpressionKind::Logical { operator, lhs, rhs } => {
                self.evaluate_logical(*operator, lhs, rhs, scope, instance)
            }
            ExpressionKind::Call { callee, arguments } => {
                let arguments = self.evaluate_arguments(arguments, scope, instance)?;
                self.call_by_name(callee, arguments, scope, instance)
            }
            ExpressionKind::CallValue { callee, arguments } => {
                let callee = self.evaluate(callee, scope, instance)?;
                let arguments = self.evaluate_arguments(arguments, scope, instance)?;
                self.call_value(&callee, arguments, scope, instance)
            }
            ExpressionKind::Chain(chain) => self.evaluate_chain(chain, scope, instance),
        }
    }

    fn evaluate_literal(literal: &Literal) -> Value {
        match literal {
            Literal::Null => Value::null(),
            Literal::Bool(value) => Value::bool(*value),
            Literal::Int(value) => Value::int(*value),
            Literal::Long(value) => Value::long(*value),
            Literal::Float(value) => Value::float(*value),
            Literal::Double(value) => Value::double(*value),
            Literal::Char(value) => Value::char(*value),
            Literal::String(value) => Value::string(value),
        }
    }

    fn evaluate_items(
        &self,
        items: &[Expression],
        scope: &Scope,
        instance: Option<&Rc<ClassInstance>>,
    ) -> Result<Vec<Value>, RuntimeError> {
        items
            .iter()
            .map(|item| Ok(self.evaluate(item, scope, instance)?.duplicate()))
            .collect()
    }

    /// Evaluates every argument exactly once, in source order.
    pub(super) fn evaluate_arguments(
        &self,
        arguments: &[Argument],
        scope: &Scope,
        instance: Option<&Rc<ClassInstance>>,
    ) -> Result<CallArguments, RuntimeError> {
        let mut evaluated = CallArguments::default();
        for argument in arguments {
            let value = self.evaluate(&argument.value, scope, instance)?;
            match argument.name {
                Some(ref name) => evaluated.named.push((name.clone(), value)),
                None => evaluated.positional.push(value),
            }
        }
        Ok(evaluated)
    }

    /// Variables first, then function references, then classes.
    pub(super) fn read_variable(
        &self,
        name: &str,
        scope: &Scope,
    ) -> Result<Value, RuntimeErrorKind> {
        match scope.get_variable(name) {
            Ok(value) => Ok(value),
            Err(error) => {
                if let Some(signatures) = scope.lookup_function(name) {
                    return Ok(Value::overload_set(Rc::new(OverloadSet {
                        name: name.into(),
                        signatures,
                    })));
                }
                match scope.lookup_class(name) {
                    Some(class) => Ok(Value::callable(Callable::Class(class))),
                    None => Err(error),
                }
            }
        }
    }

    fn evaluate_unary(operator: UnaryOperator, rhs: &Value) -> Result<Value, RuntimeErrorKind> {
        match operator {
            UnaryOperator::Bang => Ok(Value::bool(rhs.logical_not())),
            UnaryOperator::Minus => rhs.numeric_negate(),
            UnaryOperator::Tilde => rhs.bitwise_not(),
        }
    }

    fn evaluate_binary(
        operator: BinaryOperator,
        lhs: &Value,
        rhs: &Value,
    ) -> Result<Value, RuntimeErrorKind> {
        match operator {
            BinaryOperator::Add => lhs.add(rhs),
            BinaryOperator::Subtract => lhs.subtract(rhs),
            BinaryOperator::Multiply => lhs.multiply(rhs),
            BinaryOperator::Divide => lhs.divide(rhs),
            BinaryOperator::Modulo => lhs.modulo(rhs),
            BinaryOperator::BitAnd => lhs.bitwise_and(rhs),
            BinaryOperator::BitOr => lhs.bitwise_or(rhs),
            BinaryOperator::BitXor => lhs.bitwise_xor(rhs),
            BinaryOperator::ShiftLeft => lhs.shift_left(rhs),
            BinaryOperator::ShiftRight => lhs.shift_right(rhs),
            BinaryOperator::LessThan => lhs.less_than(rhs),
            BinaryOperator::LessThanEqual => lhs.less_than_or_equal(rhs),
            BinaryOperator::GreaterThan => lhs.greater_than(rhs),
            BinaryOperator::GreaterThanEqual => lhs.greater_than_or_equal(rhs),
            BinaryOperator::EqualEqual => Ok(lhs.is_equal(rhs)),
            BinaryOperator::BangEqual => Ok(lhs.is_not_equal(rhs)),
        }
    }

    fn evaluate_logical(
        &self,
        operator: LogicalOperator,
        lhs: &Expression,
        rhs: &Expression,
        scope: &Scope,
        instance: Option<&Rc<ClassInstance>>,
    ) -> Result<Value, RuntimeError> {
        let lhs = self.evaluate(lhs, scope, instance)?;
        match operator {
            LogicalOperator::And if !lhs.is_truthy() => Ok(lhs),
            LogicalOperator::Or if lhs.is_truthy() => Ok(lhs),
            _ => self.evaluate(rhs, scope, instance),
        }
    }
}
