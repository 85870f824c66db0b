//! Everything that can be invoked: functions, methods and classes, user
//! defined or native.

mod arguments;
mod class;
mod function;
mod overload;

pub use arguments::{bind_arguments, BindingFailure, BoundArguments, BoundSlot, CallArguments};
pub use class::{ClassBase, ClassInstance, NativePayload};
pub use function::{Body, Function, Method, NativeCall, NativeFn, ParameterSpec, Procedure};
pub use overload::{resolve_overload, OverloadSet, Resolution};

use crate::string::Name;
use crate::types::{InvocableSignature, TypeSignatureId, TypeSignatureManager};
use std::cell::OnceCell;
use std::rc::Rc;

/// Classification of an overload entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallableType {
    Function,
    Method,
    Class,
    Native,
    /// Untyped `def` definitions. Always eligible, ranked below typed overloads.
    Def,
}

#[derive(Clone)]
pub enum Callable {
    Function(Rc<Function>),
    Method(Rc<Method>),
    Class(Rc<ClassBase>),
}

impl Callable {
    pub fn name(&self) -> &Name {
        match self {
            Callable::Function(function) => &function.procedure.name,
            Callable::Method(method) => &method.procedure.name,
            Callable::Class(class) => class.name(),
        }
    }

    pub fn parameters(&self) -> &[ParameterSpec] {
        match self {
            Callable::Function(function) => &function.procedure.parameters,
            Callable::Method(method) => &method.procedure.parameters,
            Callable::Class(_) => &[],
        }
    }

    pub fn ptr_eq(&self, other: &Callable) -> bool {
        match (self, other) {
            (Callable::Function(lhs), Callable::Function(rhs)) => Rc::ptr_eq(lhs, rhs),
            (Callable::Method(lhs), Callable::Method(rhs)) => Rc::ptr_eq(lhs, rhs),
            (Callable::Class(lhs), Callable::Class(rhs)) => Rc::ptr_eq(lhs, rhs),
            _ => false,
        }
    }
}

impl std::fmt::Debug for Callable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Callable::Function(function) => write!(f, "Function({})", function.procedure.name),
            Callable::Method(method) => write!(f, "Method({})", method.procedure.name),
            Callable::Class(class) => write!(f, "Class({})", class.name()),
        }
    }
}

impl std::fmt::Display for Callable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Callable::Function(function) => match function.procedure.body {
                Body::Native(_) => write!(f, "<native fn {}>", function.procedure.name),
                Body::User(_) => write!(f, "<fn {}>", function.procedure.name),
            },
            Callable::Method(method) => match method.class.upgrade() {
                Some(class) => write!(f, "<method {}.{}>", class.name(), method.procedure.name),
                None => write!(f, "<method {}>", method.procedure.name),
            },
            Callable::Class(class) => write!(f, "<class {}>", class.name()),
        }
    }
}

/// One overload entry of a function table.
#[derive(Debug, Clone)]
pub struct CallableSignature {
    pub callable: Callable,
    pub primary: CallableType,
    pub secondary: Option<CallableType>,
    invocable: OnceCell<TypeSignatureId>,
}

impl CallableSignature {
    pub fn new(callable: Callable, primary: CallableType) -> Self {
        Self {
            callable,
            primary,
            secondary: None,
            invocable: OnceCell::new(),
        }
    }

    pub fn with_secondary(mut self, secondary: CallableType) -> Self {
        self.secondary = Some(secondary);
        self
    }

    pub fn name(&self) -> &Name {
        self.callable.name()
    }

    pub fn parameters(&self) -> &[ParameterSpec] {
        self.callable.parameters()
    }

    pub fn is_def(&self) -> bool {
        self.primary == CallableType::Def || self.secondary == Some(CallableType::Def)
    }

    pub fn return_type(&self) -> Option<TypeSignatureId> {
        match self.callable {
            Callable::Function(ref function) => Some(function.procedure.return_type),
            Callable::Method(ref method) => Some(method.procedure.return_type),
            Callable::Class(_) => None,
        }
    }

    /// Invocable signature of this overload, interned on first use.
    pub fn invocable(&self, manager: &mut TypeSignatureManager) -> TypeSignatureId {
        *self.invocable.get_or_init(|| {
            let parameters = self.parameters();
            let signature = InvocableSignature {
                parameters: parameters.iter().map(|p| p.signature).collect(),
                enforced: parameters.iter().map(|p| p.enforced).collect(),
                return_type: self.return_type().unwrap_or_else(|| manager.any()),
                variadic: parameters.last().is_some_and(|p| p.variadic),
            };
            manager.invocable(signature)
        })
    }
}
