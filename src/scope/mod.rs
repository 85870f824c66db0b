//! Hierarchical environments.
//!
//! A [`Scope`] owns its children strongly and reaches its parent, its caller
//! and the global registries through weak handles, so the scope graph never
//! forms a strong cycle. Only the root owns the [`Globals`].

mod binding;
mod builders;

pub use binding::Binding;

use crate::callable::{resolve_overload, CallArguments, CallableSignature, ClassBase, Resolution};
use crate::error::RuntimeErrorKind;
use crate::string::Name;
use crate::types::{
    bind_resolved_type, AliasResolver, MatchOptions, MatchResult, ScopeTypes, TypeAnnotation,
    TypeSignatureId, TypeSignatureManager,
};
use crate::value::Value;
use std::cell::{Ref, RefCell, RefMut};
use std::collections::{BTreeSet, HashMap};
use std::rc::{Rc, Weak};

pub type FunctionTable = HashMap<Name, Vec<CallableSignature>>;
pub type ClassTable = HashMap<Name, Rc<ClassBase>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Root,
    Block,
    FunctionCall,
    MethodCall,
    /// Detached scope a class body is evaluated against.
    ClassDef,
    ClassScope,
    Instance,
    /// Copies named free variables; the parent stays reachable for function
    /// and class lookup only.
    Detached,
    /// Copies named free variables and the local tables; no parent at all.
    Isolated,
}

#[derive(Debug, Clone)]
pub struct ScopeMeta {
    pub level: usize,
    /// Label used in diagnostics: the function, class or construct that
    /// created the scope.
    pub owner: Name,
    pub cloned: bool,
    torn_down: bool,
}

/// Function and class registrations made at the root.
#[derive(Debug, Default)]
pub struct Globals {
    functions: RefCell<FunctionTable>,
    classes: RefCell<ClassTable>,
}

impl Globals {
    fn clear(&self) {
        let functions = std::mem::take(&mut *self.functions.borrow_mut());
        let classes = std::mem::take(&mut *self.classes.borrow_mut());
        drop(functions);
        drop(classes);
    }
}

#[derive(Debug, Clone)]
enum GlobalsHandle {
    Owned(Rc<Globals>),
    Shared(Weak<Globals>),
}

impl GlobalsHandle {
    fn get(&self) -> Option<Rc<Globals>> {
        match self {
            GlobalsHandle::Owned(globals) => Some(Rc::clone(globals)),
            GlobalsHandle::Shared(globals) => globals.upgrade(),
        }
    }

    fn share(&self) -> GlobalsHandle {
        match self {
            GlobalsHandle::Owned(globals) => GlobalsHandle::Shared(Rc::downgrade(globals)),
            GlobalsHandle::Shared(globals) => GlobalsHandle::Shared(globals.clone()),
        }
    }
}

/// The signature pool and the options every type check of an interpreter
/// runs with.
#[derive(Debug)]
pub struct TypeContext {
    manager: RefCell<TypeSignatureManager>,
    options: MatchOptions,
}

impl TypeContext {
    pub fn new(options: MatchOptions) -> Self {
        Self {
            manager: RefCell::new(TypeSignatureManager::new()),
            options,
        }
    }

    pub fn manager(&self) -> Ref<'_, TypeSignatureManager> {
        self.manager.borrow()
    }

    pub fn manager_mut(&self) -> RefMut<'_, TypeSignatureManager> {
        self.manager.borrow_mut()
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }
}

pub struct ScopeData {
    kind: ScopeKind,
    meta: ScopeMeta,
    variables: HashMap<Name, Binding>,
    functions: FunctionTable,
    classes: ClassTable,
    aliases: ScopeTypes,
    children: Vec<Scope>,
    /// Lexical parent.
    parent: Option<WeakScope>,
    /// Scope this one was appended to.
    owner: Option<WeakScope>,
    /// Scope that invoked the call this scope belongs to.
    caller: Option<WeakScope>,
    globals: GlobalsHandle,
    types: Rc<TypeContext>,
}

#[derive(Clone)]
pub struct Scope(Rc<RefCell<ScopeData>>);

#[derive(Clone)]
pub struct WeakScope(Weak<RefCell<ScopeData>>);

impl WeakScope {
    pub fn upgrade(&self) -> Option<Scope> {
        self.0.upgrade().map(Scope)
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("Scope")
            .field("kind", &data.kind)
            .field("owner", &data.meta.owner)
            .field("level", &data.meta.level)
            .field("variables", &data.variables.len())
            .field("children", &data.children.len())
            .finish()
    }
}

// Construction
impl Scope {
    pub fn root(options: MatchOptions) -> Self {
        tracing::trace!("creating root scope");
        Scope(Rc::new(RefCell::new(ScopeData {
            kind: ScopeKind::Root,
            meta: ScopeMeta {
                level: 0,
                owner: "<root>".into(),
                cloned: false,
                torn_down: false,
            },
            variables: HashMap::new(),
            functions: HashMap::new(),
            classes: HashMap::new(),
            aliases: ScopeTypes::new(),
            children: Vec::new(),
            parent: None,
            owner: None,
            caller: None,
            globals: GlobalsHandle::Owned(Rc::new(Globals::default())),
            types: Rc::new(TypeContext::new(options)),
        })))
    }

    fn derive(&self, kind: ScopeKind, owner: &str, parent: Option<WeakScope>) -> Scope {
        let data = self.0.borrow();
        tracing::trace!(?kind, owner, level = data.meta.level + 1, "creating scope");
        Scope(Rc::new(RefCell::new(ScopeData {
            kind,
            meta: ScopeMeta {
                level: data.meta.level + 1,
                owner: owner.into(),
                cloned: false,
                torn_down: false,
            },
            variables: HashMap::new(),
            functions: HashMap::new(),
            classes: HashMap::new(),
            aliases: ScopeTypes::new(),
            children: Vec::new(),
            parent,
            owner: None,
            caller: None,
            globals: data.globals.share(),
            types: Rc::clone(&data.types),
        })))
    }

    pub fn downgrade(&self) -> WeakScope {
        WeakScope(Rc::downgrade(&self.0))
    }

    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// New lexical child, appended to this scope's children.
    pub fn create_child(&self, kind: ScopeKind, owner: &str) -> Scope {
        let child = self.derive(kind, owner, Some(self.downgrade()));
        child.0.borrow_mut().owner = Some(self.downgrade());
        self.0.borrow_mut().children.push(child.clone());
        child
    }

    /// Empty scope whose lexical parent is this one. Not appended anywhere.
    pub fn make_call_scope(&self, kind: ScopeKind, owner: &str) -> Scope {
        self.derive(kind, owner, Some(self.downgrade()))
    }

    /// Copies the named free variables, found anywhere up the variable
    /// chain, into a new scope with empty local tables.
    pub fn detach(&self, free_variables: &BTreeSet<Name>, owner: &str) -> Scope {
        self.detach_as(ScopeKind::Detached, free_variables, owner)
    }

    pub(crate) fn detach_as(
        &self,
        kind: ScopeKind,
        free_variables: &BTreeSet<Name>,
        owner: &str,
    ) -> Scope {
        let detached = self.derive(kind, owner, Some(self.downgrade()));
        detached.0.borrow_mut().variables = self.capture_variables(free_variables);
        detached
    }

    /// Like [`Scope::detach`], but also copies this scope's local function
    /// and class tables and keeps no parent.
    pub fn isolate(&self, free_variables: &BTreeSet<Name>, owner: &str) -> Scope {
        let isolated = self.derive(ScopeKind::Isolated, owner, None);
        {
            let source = self.0.borrow();
            let mut target = isolated.0.borrow_mut();
            target.variables = self.capture_variables(free_variables);
            target.functions = source.functions.clone();
            target.classes = source.classes.clone();
            target.aliases = source.aliases.clone();
        }
        isolated
    }

    fn capture_variables(&self, names: &BTreeSet<Name>) -> HashMap<Name, Binding> {
        names
            .iter()
            .filter_map(|name| {
                self.find_binding(name, |binding| binding.deep_clone())
                    .map(|binding| (name.clone(), binding))
            })
            .collect()
    }

    /// Copy with duplicated bindings and the same parent links.
    pub fn duplicate(&self) -> Scope {
        let data = self.0.borrow();
        let copy = self.derive(data.kind, &data.meta.owner, data.parent.clone());
        {
            let mut target = copy.0.borrow_mut();
            target.meta.level = data.meta.level;
            target.meta.cloned = true;
            target.variables = data
                .variables
                .iter()
                .map(|(name, binding)| (name.clone(), binding.duplicate()))
                .collect();
            target.functions = data.functions.clone();
            target.classes = data.classes.clone();
            target.aliases = data.aliases.clone();
        }
        copy
    }
}

// Structure
impl Scope {
    pub fn kind(&self) -> ScopeKind {
        self.0.borrow().kind
    }

    pub fn meta(&self) -> ScopeMeta {
        self.0.borrow().meta.clone()
    }

    pub fn owner_label(&self) -> Name {
        self.0.borrow().meta.owner.clone()
    }

    pub fn level(&self) -> usize {
        self.0.borrow().meta.level
    }

    pub fn is_root(&self) -> bool {
        self.0.borrow().kind == ScopeKind::Root
    }

    pub fn parent(&self) -> Option<Scope> {
        self.0.borrow().parent.as_ref().and_then(WeakScope::upgrade)
    }

    pub fn caller(&self) -> Option<Scope> {
        self.0.borrow().caller.as_ref().and_then(WeakScope::upgrade)
    }

    pub fn children(&self) -> Vec<Scope> {
        self.0.borrow().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.0.borrow().children.len()
    }

    pub fn types(&self) -> Rc<TypeContext> {
        Rc::clone(&self.0.borrow().types)
    }

    pub(crate) fn set_caller(&self, caller: &Scope) {
        self.0.borrow_mut().caller = Some(caller.downgrade());
    }

    /// Appends `child` to this scope's children.
    ///
    /// Fails when `child` is this scope or already owns it, directly or
    /// through its descendants.
    pub fn append_child(&self, child: &Scope) -> Result<(), RuntimeErrorKind> {
        let mut cursor = Some(self.clone());
        while let Some(scope) = cursor {
            if scope.ptr_eq(child) {
                return Err(RuntimeErrorKind::ScopeCycle(child.owner_label()));
            }
            cursor = scope.0.borrow().owner.as_ref().and_then(WeakScope::upgrade);
        }
        child.0.borrow_mut().owner = Some(self.downgrade());
        self.0.borrow_mut().children.push(child.clone());
        Ok(())
    }

    pub fn remove_child(&self, child: &Scope) {
        let removed = {
            let mut data = self.0.borrow_mut();
            let index = data.children.iter().position(|c| c.ptr_eq(child));
            index.map(|index| data.children.remove(index))
        };
        if let Some(removed) = removed {
            removed.0.borrow_mut().owner = None;
        }
    }

    /// Clears registries, then tears down children depth first.
    ///
    /// Idempotent. The root also releases the global registries.
    pub fn teardown(&self) {
        let (variables, functions, classes, children, globals) = {
            let mut data = self.0.borrow_mut();
            if data.meta.torn_down {
                return;
            }
            data.meta.torn_down = true;
            data.aliases.clear();
            let globals = match data.globals {
                GlobalsHandle::Owned(ref globals) => Some(Rc::clone(globals)),
                GlobalsHandle::Shared(_) => None,
            };
            (
                std::mem::take(&mut data.variables),
                std::mem::take(&mut data.functions),
                std::mem::take(&mut data.classes),
                std::mem::take(&mut data.children),
                globals,
            )
        };
        tracing::trace!(
            owner = %self.owner_label(),
            children = children.len(),
            "tearing down scope"
        );
        if let Some(globals) = globals {
            globals.clear();
        }
        drop(functions);
        drop(classes);
        drop(variables);
        for child in children {
            child.teardown();
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.0.borrow().meta.torn_down
    }
}

// Variables
impl Scope {
    /// Next scope on the variable chain. Detached and class definition
    /// scopes keep their parent for function lookup only.
    fn variable_parent(&self) -> Option<Scope> {
        let data = self.0.borrow();
        match data.kind {
            ScopeKind::Detached | ScopeKind::ClassDef | ScopeKind::Isolated => None,
            _ => data.parent.as_ref().and_then(WeakScope::upgrade),
        }
    }

    fn find_binding<T>(&self, name: &str, map: impl Fn(&Binding) -> T) -> Option<T> {
        let mut cursor = Some(self.clone());
        while let Some(scope) = cursor {
            if let Some(binding) = scope.0.borrow().variables.get(name) {
                return Some(map(binding));
            }
            cursor = scope.variable_parent();
        }
        None
    }

    pub fn declare_variable(&self, name: &str, binding: Binding) -> Result<(), RuntimeErrorKind> {
        if self.has_local_variable(name) {
            return Err(RuntimeErrorKind::Redeclaration(name.into()));
        }
        let mut slot = binding;
        slot.value = slot.prepare(slot.value.clone());
        self.0.borrow_mut().variables.insert(name.into(), slot);
        Ok(())
    }

    /// Assigns to the nearest binding of `name`, enforcing const and the
    /// declared signature.
    pub fn update_variable(&self, name: &str, value: Value) -> Result<(), RuntimeErrorKind> {
        let mut cursor = Some(self.clone());
        while let Some(scope) = cursor {
            let owns = scope.0.borrow().variables.contains_key(name);
            if owns {
                return scope.update_local_variable(name, value);
            }
            cursor = scope.variable_parent();
        }
        Err(RuntimeErrorKind::UndefinedVariable(name.into()))
    }

    /// Assigns to a binding of this scope only.
    pub fn update_local_variable(&self, name: &str, value: Value) -> Result<(), RuntimeErrorKind> {
        let Some(binding) = self.0.borrow().variables.get(name).cloned() else {
            return Err(RuntimeErrorKind::UndefinedVariable(name.into()));
        };
        if binding.is_const {
            return Err(RuntimeErrorKind::ConstViolation(name.into()));
        }
        self.check_type(name, binding.declared_sig, &value)?;
        // Copy before borrowing: duplicating an instance may read this scope.
        let value = binding.prepare(value);
        if let Some(slot) = self.0.borrow_mut().variables.get_mut(name) {
            slot.value = value;
        }
        Ok(())
    }

    pub fn get_variable(&self, name: &str) -> Result<Value, RuntimeErrorKind> {
        self.find_binding(name, |binding| binding.value.clone())
            .ok_or_else(|| RuntimeErrorKind::UndefinedVariable(name.into()))
    }

    pub fn get_binding(&self, name: &str) -> Option<Binding> {
        self.find_binding(name, Binding::clone)
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.find_binding(name, |_| ()).is_some()
    }

    pub fn get_local_variable(&self, name: &str) -> Option<Value> {
        self.0
            .borrow()
            .variables
            .get(name)
            .map(|binding| binding.value.clone())
    }

    pub fn has_local_variable(&self, name: &str) -> bool {
        self.0.borrow().variables.contains_key(name)
    }
}

// Functions and classes
impl Scope {
    /// Parent used for function and class lookup. Unlike variables this
    /// crosses detached boundaries.
    fn lookup_parent(&self) -> Option<Scope> {
        self.0.borrow().parent.as_ref().and_then(WeakScope::upgrade)
    }

    fn globals(&self) -> Option<Rc<Globals>> {
        self.0.borrow().globals.get()
    }

    /// Walks local tables up the lexical chain, then the lexical chains of
    /// the callers met on the way, so nested functions can recurse.
    fn find_registered<T>(&self, select: impl Fn(&ScopeData) -> Option<T>) -> Option<T> {
        let mut pending = vec![self.clone()];
        let mut next = 0;
        while let Some(start) = pending.get(next).cloned() {
            next += 1;
            let mut cursor = Some(start);
            while let Some(scope) = cursor {
                let data = scope.0.borrow();
                if let Some(found) = select(&data) {
                    return Some(found);
                }
                if let Some(caller) = data.caller.as_ref().and_then(WeakScope::upgrade) {
                    if !pending.iter().any(|seen| seen.ptr_eq(&caller)) {
                        pending.push(caller);
                    }
                }
                drop(data);
                cursor = scope.lookup_parent();
            }
        }
        None
    }

    pub fn register_function(&self, name: &str, signature: CallableSignature) {
        tracing::debug!(
            name,
            kind = ?signature.primary,
            scope = %self.owner_label(),
            "registering function"
        );
        if self.is_root() {
            if let Some(globals) = self.globals() {
                globals
                    .functions
                    .borrow_mut()
                    .entry(name.into())
                    .or_default()
                    .push(signature);
                return;
            }
        }
        self.0
            .borrow_mut()
            .functions
            .entry(name.into())
            .or_default()
            .push(signature);
    }

    /// Overloads of `name` from the nearest table that defines it.
    pub fn lookup_function(&self, name: &str) -> Option<Vec<CallableSignature>> {
        self.find_registered(|data| data.functions.get(name).cloned())
            .or_else(|| {
                self.globals()
                    .and_then(|globals| globals.functions.borrow().get(name).cloned())
            })
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.lookup_function(name).is_some()
    }

    pub fn has_local_function(&self, name: &str) -> bool {
        self.0.borrow().functions.contains_key(name)
    }

    pub fn resolve_function_overload(
        &self,
        name: &str,
        arguments: &CallArguments,
    ) -> Result<Resolution, RuntimeErrorKind> {
        let candidates = self
            .lookup_function(name)
            .ok_or_else(|| RuntimeErrorKind::FunctionNotFound(name.into()))?;
        let types = self.types();
        let mut manager = types.manager_mut();
        resolve_overload(
            &name.into(),
            &candidates,
            arguments,
            &mut manager,
            types.options(),
        )
    }

    pub fn register_class(&self, class: Rc<ClassBase>) -> Result<(), RuntimeErrorKind> {
        let name = class.name().clone();
        tracing::debug!(name = %name, scope = %self.owner_label(), "registering class");
        if self.is_root() {
            if let Some(globals) = self.globals() {
                let mut classes = globals.classes.borrow_mut();
                if classes.contains_key(&name) {
                    return Err(RuntimeErrorKind::ClassRedefinition(name));
                }
                classes.insert(name, class);
                return Ok(());
            }
        }
        let mut data = self.0.borrow_mut();
        if data.classes.contains_key(&name) {
            return Err(RuntimeErrorKind::ClassRedefinition(name));
        }
        data.classes.insert(name, class);
        Ok(())
    }

    pub fn lookup_class(&self, name: &str) -> Option<Rc<ClassBase>> {
        self.find_registered(|data| data.classes.get(name).cloned())
            .or_else(|| {
                self.globals()
                    .and_then(|globals| globals.classes.borrow().get(name).cloned())
            })
    }
}

// Types
impl Scope {
    pub fn bind_type(&self, annotation: Option<&TypeAnnotation>) -> TypeSignatureId {
        let types = self.types();
        let mut manager = types.manager_mut();
        match annotation {
            Some(annotation) => bind_resolved_type(annotation, self, &mut manager),
            None => manager.any(),
        }
    }

    pub fn bind_alias(&self, name: &str, annotation: &TypeAnnotation) -> TypeSignatureId {
        let signature = self.bind_type(Some(annotation));
        self.0
            .borrow_mut()
            .aliases
            .bind_alias(name.into(), signature);
        signature
    }

    pub fn infer_type(&self, value: &Value) -> TypeSignatureId {
        self.types().manager_mut().infer_from_value(value)
    }

    pub fn match_value(&self, expected: TypeSignatureId, value: &Value) -> MatchResult {
        let types = self.types();
        let manager = types.manager();
        manager.match_value(expected, value, types.options())
    }

    /// Checks `value` against `expected`, naming `name` on mismatch.
    pub fn check_type(
        &self,
        name: &str,
        expected: TypeSignatureId,
        value: &Value,
    ) -> Result<(), RuntimeErrorKind> {
        let types = self.types();
        let manager = types.manager();
        if !expected.is_valid() || manager.is_any(expected) {
            return Ok(());
        }
        if manager.match_value(expected, value, types.options()).ok {
            Ok(())
        } else {
            Err(RuntimeErrorKind::TypeMismatch {
                name: name.into(),
                expected: manager.display(expected),
                actual: value.type_name(),
            })
        }
    }

    pub fn display_type(&self, signature: TypeSignatureId) -> Name {
        self.types().manager().display(signature)
    }
}

impl AliasResolver for Scope {
    fn resolve_alias(&self, name: &str) -> Option<TypeSignatureId> {
        let mut cursor = Some(self.clone());
        while let Some(scope) = cursor {
            if let Some(signature) = scope.0.borrow().aliases.get_alias(name) {
                return Some(signature);
            }
            cursor = scope.lookup_parent();
        }
        None
    }
}
