use super::{ControlFlow, TreeWalkStatementInterpreter};
use crate::callable::{
    resolve_overload, Body, BoundArguments, BoundSlot, CallArguments, Callable, CallableSignature,
    CallableType, ClassBase, ClassInstance, Function, Method, NativeCall, Procedure, Resolution,
};
use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::scope::{Binding, Scope};
use crate::statement::Statement;
use crate::types::TypeSignatureId;
use crate::value::{Value, ValueData};
use std::rc::Rc;

impl TreeWalkStatementInterpreter {
    /// `name(...)`: a callable held in a variable, else the overloads
    /// registered under `name`, else instantiation of class `name`.
    pub(super) fn call_by_name(
        &self,
        name: &str,
        arguments: CallArguments,
        scope: &Scope,
        instance: Option<&Rc<ClassInstance>>,
    ) -> Result<Value, RuntimeError> {
        if let Ok(value) = scope.get_variable(name) {
            if value.is_callable() {
                return self.call_value(&value, arguments, scope, instance);
            }
        }
        if scope.has_function(name) {
            let resolution = scope.resolve_function_overload(name, &arguments)?;
            return self.invoke(resolution, scope, instance);
        }
        match scope.lookup_class(name) {
            Some(class) => self.instantiate(&class, arguments, scope),
            None => Err(RuntimeErrorKind::FunctionNotFound(name.into()).into()),
        }
    }

    pub(super) fn call_value(
        &self,
        callee: &Value,
        arguments: CallArguments,
        scope: &Scope,
        instance: Option<&Rc<ClassInstance>>,
    ) -> Result<Value, RuntimeError> {
        let (name, candidates) = match callee.data() {
            ValueData::FunctionOverloadSet(set) => (set.name.clone(), set.signatures.clone()),
            ValueData::Callable(Callable::Class(class)) => {
                return self.instantiate(class, arguments, scope)
            }
            ValueData::Callable(callable) => (
                callable.name().clone(),
                vec![CallableSignature::new(callable.clone(), CallableType::Function)],
            ),
            _ => return Err(RuntimeErrorKind::InvalidCallee(callee.clone()).into()),
        };
        let types = scope.types();
        let resolution = resolve_overload(
            &name,
            &candidates,
            &arguments,
            &mut types.manager_mut(),
            types.options(),
        )?;
        self.invoke(resolution, scope, instance)
    }

    /// Invokes method `name` on `receiver`. Only the receiver's own method
    /// table is consulted.
    pub(super) fn call_method(
        &self,
        receiver: &Rc<ClassInstance>,
        name: &str,
        arguments: CallArguments,
        scope: &Scope,
    ) -> Result<Value, RuntimeError> {
        let resolution = receiver
            .scope()
            .resolve_function_overload(name, &arguments)?;
        self.invoke(resolution, scope, Some(receiver))
    }

    fn invoke(
        &self,
        resolution: Resolution,
        scope: &Scope,
        instance: Option<&Rc<ClassInstance>>,
    ) -> Result<Value, RuntimeError> {
        let Resolution {
            signature,
            arguments,
        } = resolution;
        match signature.callable {
            Callable::Function(ref function) => self.invoke_function(function, arguments, scope),
            Callable::Method(ref method) => match instance {
                Some(receiver) => self.invoke_method(method, arguments, receiver, scope),
                None => {
                    let name = method.procedure.name.clone();
                    Err(RuntimeErrorKind::MissingInstance(name).into())
                }
            },
            Callable::Class(_) => {
                let callee = Value::callable(signature.callable.clone());
                Err(RuntimeErrorKind::InvalidCallee(callee).into())
            }
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(name = %function.procedure.name))]
    fn invoke_function(
        &self,
        function: &Rc<Function>,
        arguments: BoundArguments,
        scope: &Scope,
    ) -> Result<Value, RuntimeError> {
        let procedure = &function.procedure;
        match procedure.body {
            Body::Native(ref native) => {
                let values = self.materialize_arguments(procedure, arguments, scope, None)?;
                let value = native(NativeCall {
                    arguments: &values,
                    scope,
                    instance: None,
                })?;
                scope.check_type(&procedure.name, procedure.return_type, &value)?;
                Ok(value)
            }
            Body::User(ref body) => {
                let call_scope = scope.build_function_call_scope(function)?;
                let result = self.run_procedure(procedure, body, arguments, &call_scope, None);
                scope.remove_child(&call_scope);
                result
            }
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(name = %method.procedure.name))]
    fn invoke_method(
        &self,
        method: &Rc<Method>,
        arguments: BoundArguments,
        receiver: &Rc<ClassInstance>,
        scope: &Scope,
    ) -> Result<Value, RuntimeError> {
        let procedure = &method.procedure;
        match procedure.body {
            Body::Native(ref native) => {
                let values =
                    self.materialize_arguments(procedure, arguments, scope, Some(receiver))?;
                let value = native(NativeCall {
                    arguments: &values,
                    scope: receiver.scope(),
                    instance: Some(receiver),
                })?;
                scope.check_type(&procedure.name, procedure.return_type, &value)?;
                Ok(value)
            }
            Body::User(ref body) => {
                let call_scope = scope.build_method_call_scope(receiver, &procedure.name)?;
                let result =
                    self.run_procedure(procedure, body, arguments, &call_scope, Some(receiver));
                scope.remove_child(&call_scope);
                result
            }
        }
    }

    fn run_procedure(
        &self,
        procedure: &Procedure,
        body: &[Statement],
        arguments: BoundArguments,
        call_scope: &Scope,
        instance: Option<&Rc<ClassInstance>>,
    ) -> Result<Value, RuntimeError> {
        self.install_arguments(procedure, arguments, call_scope, instance)?;
        let result = self.interpret_block(body, call_scope, instance)?;
        let value = match result.flow {
            ControlFlow::Return => result.value,
            ControlFlow::Throw => {
                return Err(RuntimeErrorKind::UncaughtThrow(result.value).into());
            }
            ControlFlow::Break | ControlFlow::Continue => {
                return Err(RuntimeErrorKind::MisplacedControl {
                    control: result.flow.keyword(),
                    place: "function body",
                }
                .into());
            }
            ControlFlow::None => {
                let value = Value::null();
                if call_scope
                    .check_type(&procedure.name, procedure.return_type, &value)
                    .is_err()
                {
                    return Err(RuntimeErrorKind::MissingReturn(procedure.name.clone()).into());
                }
                value
            }
        };
        call_scope.check_type(&procedure.name, procedure.return_type, &value)?;
        Ok(value)
    }

    /// Turns bound slots into one value per parameter for a native body.
    /// Defaults are evaluated in the caller's scope.
    fn materialize_arguments(
        &self,
        procedure: &Procedure,
        arguments: BoundArguments,
        scope: &Scope,
        instance: Option<&Rc<ClassInstance>>,
    ) -> Result<Vec<Value>, RuntimeError> {
        procedure
            .parameters
            .iter()
            .zip(arguments.slots)
            .map(|(parameter, slot)| -> Result<Value, RuntimeError> {
                let value = match slot {
                    BoundSlot::Value(value) => value,
                    BoundSlot::Spread(values) => return Ok(Value::list(values)),
                    BoundSlot::Omitted => match parameter.default {
                        Some(ref default) => self.evaluate(default, scope, instance)?,
                        None => Value::null(),
                    },
                };
                if parameter.enforced {
                    scope.check_type(&parameter.name, parameter.signature, &value)?;
                }
                Ok(value)
            })
            .collect()
    }

    fn install_arguments(
        &self,
        procedure: &Procedure,
        arguments: BoundArguments,
        call_scope: &Scope,
        instance: Option<&Rc<ClassInstance>>,
    ) -> Result<(), RuntimeError> {
        for (parameter, slot) in procedure.parameters.iter().zip(arguments.slots) {
            let (value, declared) = match slot {
                BoundSlot::Spread(values) => (Value::list(values), TypeSignatureId::INVALID),
                BoundSlot::Value(value) => (value, parameter.signature),
                BoundSlot::Omitted => {
                    let value = match parameter.default {
                        Some(ref default) => self.evaluate(default, call_scope, instance)?,
                        None => Value::null(),
                    };
                    (value, parameter.signature)
                }
            };
            let declared = if parameter.enforced {
                call_scope.check_type(&parameter.name, declared, &value)?;
                declared
            } else {
                TypeSignatureId::INVALID
            };
            call_scope.declare_variable(
                &parameter.name,
                Binding::declared(value, parameter.flags, declared),
            )?;
        }
        Ok(())
    }

    /// Builds an instance of `class` and runs its constructor on it.
    #[tracing::instrument(level = "debug", skip_all, fields(class = %class.name()))]
    pub(super) fn instantiate(
        &self,
        class: &Rc<ClassBase>,
        arguments: CallArguments,
        scope: &Scope,
    ) -> Result<Value, RuntimeError> {
        let constructor = &self.config().constructor;
        let instance = Rc::new(ClassInstance::new(
            Rc::clone(class),
            Scope::build_instance_scope(class),
        ));
        if !instance.scope().has_local_function(constructor) {
            return Err(RuntimeErrorKind::MissingConstructor {
                class: class.name().clone(),
                constructor: constructor.clone(),
            }
            .into());
        }
        self.call_method(&instance, constructor, arguments, scope)?;
        Ok(Value::instance(instance))
    }
}
