//! Named compositions of the scope primitives, one per construct that
//! captures or enters a scope.

use super::{Scope, ScopeKind};
use crate::callable::{ClassBase, ClassInstance, Function};
use crate::error::RuntimeErrorKind;
use crate::statement::{ClassDecl, FunctionDecl, FunctionKind};
use std::collections::BTreeSet;

impl Scope {
    /// `function` definitions see only their parameters and the functions
    /// and classes local to the defining scope. `def` definitions also
    /// capture copies of the free variables they mention.
    pub fn build_function_def_scope(&self, decl: &FunctionDecl) -> Scope {
        match decl.kind {
            FunctionKind::Function => self.isolate(&BTreeSet::new(), &decl.name),
            FunctionKind::Def => self.detach(&decl.free_variables(), &decl.name),
        }
    }

    pub fn build_class_def_scope(&self, decl: &ClassDecl) -> Scope {
        self.detach_as(ScopeKind::ClassDef, &decl.free_variables(), &decl.name)
    }

    /// Scope holding a class's methods and member defaults.
    pub fn build_class_scope(&self, name: &str) -> Scope {
        self.make_call_scope(ScopeKind::ClassScope, name)
    }

    /// Enters `function` from this (calling) scope.
    ///
    /// The call scope hangs lexically off the captured scope and is owned by
    /// the caller until [`Scope::remove_child`] releases it.
    pub fn build_function_call_scope(
        &self,
        function: &Function,
    ) -> Result<Scope, RuntimeErrorKind> {
        let name = &function.procedure.name;
        let call_scope = match function.captured {
            Some(ref captured) => captured.make_call_scope(ScopeKind::FunctionCall, name),
            None => self.make_call_scope(ScopeKind::FunctionCall, name),
        };
        call_scope.set_caller(self);
        self.append_child(&call_scope)?;
        Ok(call_scope)
    }

    /// Enters method `name` on `instance` from this (calling) scope.
    pub fn build_method_call_scope(
        &self,
        instance: &ClassInstance,
        name: &str,
    ) -> Result<Scope, RuntimeErrorKind> {
        let call_scope = instance
            .scope()
            .make_call_scope(ScopeKind::MethodCall, name);
        call_scope.set_caller(self);
        self.append_child(&call_scope)?;
        Ok(call_scope)
    }

    /// Fresh instance scope for `class`: every non-static member binding is
    /// duplicated and every method overload copied. Static members stay in
    /// the class scope and are reached through the parent link.
    pub fn build_instance_scope(class: &ClassBase) -> Scope {
        let class_scope = class.class_scope();
        let instance_scope = class_scope.make_call_scope(ScopeKind::Instance, class.name());
        {
            let source = class_scope.0.borrow();
            let mut target = instance_scope.0.borrow_mut();
            target.variables = source
                .variables
                .iter()
                .filter(|(_, binding)| !binding.is_static)
                .map(|(name, binding)| (name.clone(), binding.duplicate()))
                .collect();
            target.functions = source.functions.clone();
        }
        instance_scope
    }
}
