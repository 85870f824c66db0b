use super::TreeWalkStatementInterpreter;
use crate::callable::ClassInstance;
use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::expression::formatter::{ExpressionFormatter, SExpressionFormatter};
use crate::expression::{Chain, ChainElement, ChainOrigin};
use crate::scope::Scope;
use crate::value::intrinsics::call_intrinsic;
use crate::value::Value;
use std::rc::Rc;

fn invalid_access(target: &Value, element: &ChainElement) -> RuntimeErrorKind {
    RuntimeErrorKind::InvalidChainAccess {
        target: target.type_name(),
        element: SExpressionFormatter.format_chain_element(element).into(),
    }
}

// Chain evaluator
impl TreeWalkStatementInterpreter {
    /// Evaluates `a.b.c(...)` left to right. Whenever the running value is
    /// an instance, the next element is resolved inside that instance.
    pub(super) fn evaluate_chain(
        &self,
        chain: &Chain,
        scope: &Scope,
        instance: Option<&Rc<ClassInstance>>,
    ) -> Result<Value, RuntimeError> {
        let mut elements = chain.elements.iter();
        let Some(head) = elements.next() else {
            return Ok(Value::null());
        };

        let mut current = match chain.origin {
            ChainOrigin::Scope => self.evaluate_chain_head(head, scope, instance)?,
            ChainOrigin::Instance => {
                let receiver = instance.ok_or_else(|| {
                    RuntimeErrorKind::MissingInstance(self.config().accessor.clone())
                })?;
                self.evaluate_member(head, receiver, scope, instance)?
            }
        };

        for element in elements {
            current = match current.as_instance() {
                Some(receiver) => {
                    let receiver = Rc::clone(receiver);
                    self.evaluate_member(element, &receiver, scope, instance)?
                }
                None => self.evaluate_virtual(&current, element, scope, instance)?,
            };
        }
        Ok(current)
    }

    fn evaluate_chain_head(
        &self,
        element: &ChainElement,
        scope: &Scope,
        instance: Option<&Rc<ClassInstance>>,
    ) -> Result<Value, RuntimeError> {
        match element {
            ChainElement::Read(name) => Ok(self.read_variable(name, scope)?),
            ChainElement::Assign { name, value } => {
                let value = self.evaluate(value, scope, instance)?;
                scope.update_variable(name, value.clone())?;
                Ok(value)
            }
            ChainElement::Declare(decl) => {
                self.interpret_variable_declaration(decl, scope, scope, instance)
            }
            ChainElement::Call { name, arguments } => {
                let arguments = self.evaluate_arguments(arguments, scope, instance)?;
                self.call_by_name(name, arguments, scope, instance)
            }
        }
    }

    /// Resolves `element` against `receiver`. Arguments and right-hand sides
    /// are still evaluated in the caller's `scope`.
    ///
    /// Members are the receiver's own bindings plus the static members of
    /// its class; nothing further up is reachable through a chain.
    fn evaluate_member(
        &self,
        element: &ChainElement,
        receiver: &Rc<ClassInstance>,
        scope: &Scope,
        instance: Option<&Rc<ClassInstance>>,
    ) -> Result<Value, RuntimeError> {
        let members = receiver.scope();
        let statics = receiver.class().class_scope();
        match element {
            ChainElement::Read(name) => members
                .get_local_variable(name)
                .or_else(|| statics.get_local_variable(name))
                .ok_or_else(|| {
                    invalid_access(&Value::instance(Rc::clone(receiver)), element).into()
                }),
            ChainElement::Assign { name, value } => {
                let value = self.evaluate(value, scope, instance)?;
                if members.has_local_variable(name) {
                    members.update_local_variable(name, value.clone())?;
                } else if statics.has_local_variable(name) {
                    statics.update_local_variable(name, value.clone())?;
                } else {
                    return Err(RuntimeErrorKind::UndefinedVariable(name.clone()).into());
                }
                Ok(value)
            }
            ChainElement::Declare(decl) => {
                self.interpret_variable_declaration(decl, scope, members, instance)
            }
            ChainElement::Call { name, arguments } => {
                if !members.has_local_function(name) {
                    let target = Value::instance(Rc::clone(receiver));
                    return Err(invalid_access(&target, element).into());
                }
                let arguments = self.evaluate_arguments(arguments, scope, instance)?;
                self.call_method(receiver, name, arguments, scope)
            }
        }
    }

    /// Chains on values that are not instances only reach the intrinsic
    /// operations.
    fn evaluate_virtual(
        &self,
        target: &Value,
        element: &ChainElement,
        scope: &Scope,
        instance: Option<&Rc<ClassInstance>>,
    ) -> Result<Value, RuntimeError> {
        let result = match element {
            ChainElement::Read(name) => call_intrinsic(target, name, &[]),
            ChainElement::Call { name, arguments } => {
                let arguments = self.evaluate_arguments(arguments, scope, instance)?;
                if !arguments.named.is_empty() {
                    return Err(invalid_access(target, element).into());
                }
                call_intrinsic(target, name, &arguments.positional)
            }
            ChainElement::Assign { .. } | ChainElement::Declare(_) => None,
        };
        match result {
            Some(result) => Ok(result?),
            None => Err(invalid_access(target, element).into()),
        }
    }
}
