use super::{ControlFlow, EvalResult, InterpreterConfig};
use crate::callable::ClassInstance;
use crate::error::RuntimeError;
use crate::expression::Expression;
use crate::scope::{Binding, Scope, ScopeKind};
use crate::statement::{IfBranch, Statement, StatementNode, VariableDecl};
use crate::value::Value;
use std::rc::Rc;

pub struct TreeWalkStatementInterpreter {
    config: InterpreterConfig,
}

impl TreeWalkStatementInterpreter {
    pub(super) fn create(config: InterpreterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Interprets one statement in `scope`. `instance` is the receiver when
    /// running inside a method body.
    pub fn interpret_statement(
        &self,
        statement: &Statement,
        scope: &Scope,
        instance: Option<&Rc<ClassInstance>>,
    ) -> Result<EvalResult, RuntimeError> {
        let result = match &statement.node {
            StatementNode::Expression(expression) => self
                .evaluate(expression, scope, instance)
                .map(EvalResult::settled),
            StatementNode::VariableDecl(decl) => self
                .interpret_variable_declaration(decl, scope, scope, instance)
                .map(EvalResult::settled),
            StatementNode::Assignment { name, value } => {
                self.interpret_assignment(name, value, scope, instance)
            }
            StatementNode::Block(body) => self.interpret_block_statement(body, scope, instance),
            StatementNode::If {
                branches,
                otherwise,
            } => self.interpret_if_statement(branches, otherwise.as_deref(), scope, instance),
            StatementNode::While { condition, body } => {
                self.interpret_while_statement(condition, body, scope, instance)
            }
            StatementNode::Return(value) => match value {
                Some(value) => self
                    .evaluate(value, scope, instance)
                    .map(EvalResult::returned),
                None => Ok(EvalResult::returned(Value::null())),
            },
            StatementNode::Break => Ok(EvalResult::broke()),
            StatementNode::Continue => Ok(EvalResult::continued()),
            StatementNode::Throw(value) => self
                .evaluate(value, scope, instance)
                .map(EvalResult::thrown),
            StatementNode::FunctionDecl(decl) => self
                .interpret_function_declaration(decl, scope)
                .map(|_| EvalResult::none()),
            StatementNode::ClassDecl(decl) => self
                .interpret_class_declaration(decl, scope)
                .map(|_| EvalResult::none()),
            StatementNode::TypeAlias { name, annotation } => {
                scope.bind_alias(name, annotation);
                Ok(EvalResult::none())
            }
        };
        result.map_err(|error| {
            error
                .or_span(statement.span)
                .with_context(statement.kind(), &scope.owner_label())
        })
    }

    /// Interprets `body` in `scope`, stopping at the first statement that
    /// yields a control signal.
    pub fn interpret_block(
        &self,
        body: &[Statement],
        scope: &Scope,
        instance: Option<&Rc<ClassInstance>>,
    ) -> Result<EvalResult, RuntimeError> {
        let mut last = Value::null();
        for statement in body {
            let result = self.interpret_statement(statement, scope, instance)?;
            if result.is_control() {
                return Ok(result);
            }
            last = result.value;
        }
        Ok(EvalResult::settled(last))
    }

    /// Declares `decl` in `target`, evaluating its initializer in `scope`.
    pub(super) fn interpret_variable_declaration(
        &self,
        decl: &VariableDecl,
        scope: &Scope,
        target: &Scope,
        instance: Option<&Rc<ClassInstance>>,
    ) -> Result<Value, RuntimeError> {
        let declared = scope.bind_type(decl.annotation.as_ref());
        let mut value = match decl.initial {
            Some(ref initial) => {
                let value = self.evaluate(initial, scope, instance)?;
                target.check_type(&decl.name, declared, &value)?;
                value
            }
            None => Value::null(),
        };
        value.meta_mut().inferred_sig = scope.infer_type(&value);
        value.meta_mut().display_name = Some(decl.name.clone());
        target.declare_variable(
            &decl.name,
            Binding::declared(value.clone(), decl.flags, declared),
        )?;
        Ok(value)
    }

    fn interpret_assignment(
        &self,
        name: &str,
        value: &Expression,
        scope: &Scope,
        instance: Option<&Rc<ClassInstance>>,
    ) -> Result<EvalResult, RuntimeError> {
        let value = self.evaluate(value, scope, instance)?;
        scope.update_variable(name, value.clone())?;
        Ok(EvalResult::settled(value))
    }

    fn interpret_block_statement(
        &self,
        body: &[Statement],
        scope: &Scope,
        instance: Option<&Rc<ClassInstance>>,
    ) -> Result<EvalResult, RuntimeError> {
        let block_scope = scope.create_child(ScopeKind::Block, &scope.owner_label());
        let result = self.interpret_block(body, &block_scope, instance);
        scope.remove_child(&block_scope);
        result
    }

    fn interpret_if_statement(
        &self,
        branches: &[IfBranch],
        otherwise: Option<&[Statement]>,
        scope: &Scope,
        instance: Option<&Rc<ClassInstance>>,
    ) -> Result<EvalResult, RuntimeError> {
        for branch in branches {
            if self
                .evaluate(&branch.condition, scope, instance)?
                .is_truthy()
            {
                return self.interpret_block(&branch.body, scope, instance);
            }
        }
        match otherwise {
            Some(body) => self.interpret_block(body, scope, instance),
            None => Ok(EvalResult::none()),
        }
    }

    fn interpret_while_statement(
        &self,
        condition: &Expression,
        body: &[Statement],
        scope: &Scope,
        instance: Option<&Rc<ClassInstance>>,
    ) -> Result<EvalResult, RuntimeError> {
        while self.evaluate(condition, scope, instance)?.is_truthy() {
            let result = self.interpret_block(body, scope, instance)?;
            match result.flow {
                ControlFlow::None | ControlFlow::Continue => continue,
                ControlFlow::Break => break,
                ControlFlow::Return | ControlFlow::Throw => return Ok(result),
            }
        }
        Ok(EvalResult::none())
    }
}
