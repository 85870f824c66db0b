use super::definition::bind_parameters;
use super::TreeWalkInterpreter;
use crate::callable::{
    Body, Callable, CallableSignature, CallableType, ClassBase, Function, Method, NativeCall,
    NativeFn, Procedure,
};
use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::statement::Parameter;
use crate::string::Name;
use crate::value::Value;
use std::rc::Rc;

/// A host-implemented method of a native class.
pub struct NativeMethod {
    pub name: Name,
    pub parameters: Vec<Parameter>,
    pub body: NativeFn,
}

impl NativeMethod {
    pub fn new<F>(name: &str, parameters: Vec<Parameter>, body: F) -> Self
    where
        F: Fn(NativeCall<'_>) -> Result<Value, RuntimeErrorKind> + 'static,
    {
        Self {
            name: name.into(),
            parameters,
            body: Rc::new(body),
        }
    }
}

// Native registration
impl TreeWalkInterpreter {
    /// Registers a host function in the root scope. It is resolved and
    /// overloaded like any user definition.
    pub fn register_native_function<F>(&self, name: &str, parameters: Vec<Parameter>, body: F)
    where
        F: Fn(NativeCall<'_>) -> Result<Value, RuntimeErrorKind> + 'static,
    {
        let root = self.root();
        let function = Function {
            procedure: Procedure {
                name: name.into(),
                parameters: bind_parameters(&parameters, root),
                return_type: root.bind_type(None),
                body: Body::Native(Rc::new(body)),
            },
            captured: None,
        };
        root.register_function(
            name,
            CallableSignature::new(Callable::Function(Rc::new(function)), CallableType::Native),
        );
    }

    /// Registers a host class in the root scope. `constructor` becomes the
    /// class's constructor method; it typically attaches a payload with
    /// [`crate::callable::ClassInstance::set_native`].
    pub fn register_native_class(
        &self,
        name: &str,
        accessor: Option<&str>,
        methods: Vec<NativeMethod>,
        constructor: NativeMethod,
    ) -> Result<(), RuntimeError> {
        let root = self.root();
        let accessor = accessor
            .map(Name::from)
            .unwrap_or_else(|| self.config().accessor.clone());
        let class_scope = root.build_class_scope(name);
        let type_id = root
            .types()
            .manager_mut()
            .registry_mut()
            .get_or_declare(name);
        let class = ClassBase::new(name.into(), type_id, accessor, class_scope.clone(), None);

        let constructor = NativeMethod {
            name: self.config().constructor.clone(),
            ..constructor
        };
        for method in methods.into_iter().chain(std::iter::once(constructor)) {
            let procedure = Procedure {
                name: method.name.clone(),
                parameters: bind_parameters(&method.parameters, &class_scope),
                return_type: class_scope.bind_type(None),
                body: Body::Native(method.body),
            };
            let method_value = Method {
                procedure,
                class: Rc::downgrade(&class),
            };
            let callable = Callable::Method(Rc::new(method_value));
            let signature = CallableSignature::new(callable, CallableType::Method)
                .with_secondary(CallableType::Native);
            class_scope.register_function(&method.name, signature);
        }
        root.register_class(class)?;
        Ok(())
    }
}
