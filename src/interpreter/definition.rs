use super::{ControlFlow, TreeWalkStatementInterpreter};
use crate::callable::{
    Body, Callable, CallableSignature, CallableType, ClassBase, Function, Method, ParameterSpec,
    Procedure,
};
use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::scope::Scope;
use crate::statement::{
    strip_accessor, ClassDecl, FunctionDecl, FunctionKind, Parameter, StatementNode,
};
use crate::types::TypeAnnotation;
use std::rc::Rc;

/// Binds parameter annotations against `scope`.
pub(super) fn bind_parameters(parameters: &[Parameter], scope: &Scope) -> Vec<ParameterSpec> {
    parameters
        .iter()
        .map(|parameter| ParameterSpec {
            name: parameter.name.clone(),
            signature: scope.bind_type(parameter.annotation.as_ref()),
            enforced: parameter
                .annotation
                .as_ref()
                .is_some_and(|annotation| !annotation.is_any()),
            default: parameter.default.clone(),
            variadic: parameter.variadic,
            flags: parameter.flags,
        })
        .collect()
}

pub(super) fn build_procedure(
    name: &str,
    parameters: &[Parameter],
    return_type: Option<&TypeAnnotation>,
    body: Body,
    scope: &Scope,
) -> Procedure {
    Procedure {
        name: name.into(),
        parameters: bind_parameters(parameters, scope),
        return_type: scope.bind_type(return_type),
        body,
    }
}

impl TreeWalkStatementInterpreter {
    pub(super) fn interpret_function_declaration(
        &self,
        decl: &FunctionDecl,
        scope: &Scope,
    ) -> Result<(), RuntimeError> {
        let captured = scope.build_function_def_scope(decl);
        let procedure = build_procedure(
            &decl.name,
            &decl.parameters,
            decl.return_type.as_ref(),
            Body::User(decl.body.clone().into()),
            scope,
        );
        let primary = match decl.kind {
            FunctionKind::Function => CallableType::Function,
            FunctionKind::Def => CallableType::Def,
        };
        let function = Function {
            procedure,
            captured: Some(captured),
        };
        scope.register_function(
            &decl.name,
            CallableSignature::new(Callable::Function(Rc::new(function)), primary),
        );
        Ok(())
    }

    /// Builds the class, runs its body in the class scope and registers it
    /// once a constructor is known to exist.
    #[tracing::instrument(level = "debug", skip_all, fields(class = %decl.name))]
    pub(super) fn interpret_class_declaration(
        &self,
        decl: &ClassDecl,
        scope: &Scope,
    ) -> Result<(), RuntimeError> {
        let accessor = decl
            .accessor
            .clone()
            .unwrap_or_else(|| self.config().accessor.clone());
        let def_scope = scope.build_class_def_scope(decl);
        let class_scope = def_scope.build_class_scope(&decl.name);
        let type_id = scope
            .types()
            .manager_mut()
            .registry_mut()
            .get_or_declare(&decl.name);
        let class = ClassBase::new(
            decl.name.clone(),
            type_id,
            accessor,
            class_scope.clone(),
            Some(def_scope),
        );

        for statement in &decl.body {
            match statement.node {
                StatementNode::FunctionDecl(ref method) => {
                    self.define_method(method, &class);
                }
                _ => {
                    let result = self.interpret_statement(statement, &class_scope, None)?;
                    match result.flow {
                        ControlFlow::None => {}
                        ControlFlow::Throw => {
                            return Err(RuntimeErrorKind::UncaughtThrow(result.value)
                                .at(statement.span));
                        }
                        flow => {
                            return Err(RuntimeErrorKind::MisplacedControl {
                                control: flow.keyword(),
                                place: "class body",
                            }
                            .at(statement.span));
                        }
                    }
                }
            }
        }

        let constructor = &self.config().constructor;
        if !class_scope.has_local_function(constructor) {
            return Err(RuntimeErrorKind::MissingConstructor {
                class: decl.name.clone(),
                constructor: constructor.clone(),
            }
            .into());
        }
        scope.register_class(class)?;
        Ok(())
    }

    fn define_method(&self, decl: &FunctionDecl, class: &Rc<ClassBase>) {
        let mut body = decl.body.clone();
        strip_accessor(&mut body, class.accessor());
        let procedure = build_procedure(
            &decl.name,
            &decl.parameters,
            decl.return_type.as_ref(),
            Body::User(body.into()),
            class.class_scope(),
        );
        let method = Method {
            procedure,
            class: Rc::downgrade(class),
        };
        let mut signature =
            CallableSignature::new(Callable::Method(Rc::new(method)), CallableType::Method);
        if decl.kind == FunctionKind::Def {
            signature = signature.with_secondary(CallableType::Def);
        }
        class.class_scope().register_function(&decl.name, signature);
    }
}
