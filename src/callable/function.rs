use super::{ClassBase, ClassInstance};
use crate::error::RuntimeErrorKind;
use crate::expression::Expression;
use crate::scope::Scope;
use crate::statement::{DeclFlags, Statement};
use crate::string::Name;
use crate::types::TypeSignatureId;
use crate::value::Value;
use std::rc::{Rc, Weak};

/// What a native body receives when it is invoked.
pub struct NativeCall<'a> {
    /// One value per declared parameter. A variadic tail arrives as a list.
    pub arguments: &'a [Value],
    pub scope: &'a Scope,
    pub instance: Option<&'a Rc<ClassInstance>>,
}

impl NativeCall<'_> {
    pub fn argument(&self, index: usize) -> Value {
        self.arguments.get(index).cloned().unwrap_or_default()
    }
}

pub type NativeFn = Rc<dyn Fn(NativeCall<'_>) -> Result<Value, RuntimeErrorKind>>;

#[derive(Clone)]
pub enum Body {
    User(Rc<[Statement]>),
    Native(NativeFn),
}

impl std::fmt::Debug for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Body::User(body) => write!(f, "User({} statements)", body.len()),
            Body::Native(_) => write!(f, "Native"),
        }
    }
}

/// A parameter with its annotation already bound to a signature.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    pub name: Name,
    pub signature: TypeSignatureId,
    /// `false` for untyped and `Any` parameters.
    pub enforced: bool,
    pub default: Option<Expression>,
    pub variadic: bool,
    pub flags: DeclFlags,
}

impl ParameterSpec {
    pub fn untyped(name: &str, any: TypeSignatureId) -> Self {
        Self {
            name: name.into(),
            signature: any,
            enforced: false,
            default: None,
            variadic: false,
            flags: DeclFlags::default(),
        }
    }
}

/// The part shared by functions and methods.
#[derive(Debug)]
pub struct Procedure {
    pub name: Name,
    pub parameters: Vec<ParameterSpec>,
    pub return_type: TypeSignatureId,
    pub body: Body,
}

#[derive(Debug)]
pub struct Function {
    pub procedure: Procedure,
    /// Scope built at definition time. Natives run in their caller's scope.
    pub captured: Option<Scope>,
}

#[derive(Debug)]
pub struct Method {
    pub procedure: Procedure,
    pub class: Weak<ClassBase>,
}
