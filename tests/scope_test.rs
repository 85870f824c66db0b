mod common;

use color_eyre::Result;
use common::Reported;
use kestrel::expression::Expression;
use kestrel::scope::{Binding, Scope, ScopeKind};
use kestrel::statement::{ClassDecl, Statement};
use kestrel::types::MatchOptions;
use kestrel::value::Value;
use kestrel::RuntimeErrorKind;
use proptest::prelude::*;
use std::collections::BTreeSet;

fn root() -> Scope {
    Scope::root(MatchOptions::default())
}

fn names(items: &[&str]) -> BTreeSet<kestrel::string::Name> {
    items.iter().map(|name| (*name).into()).collect()
}

#[test]
fn test_child_reads_parent_variables() -> Result<()> {
    let root = root();
    root.declare_variable("x", Binding::new(Value::int(1)))
        .reported()?;
    let child = root.create_child(ScopeKind::Block, "block");
    assert_eq!(child.get_variable("x").reported()?, Value::int(1));
    assert_eq!(child.level(), 1);
    assert!(child.parent().is_some_and(|parent| parent.ptr_eq(&root)));
    Ok(())
}

#[test]
fn test_redeclaration_in_same_scope() -> Result<()> {
    let root = root();
    root.declare_variable("x", Binding::new(Value::int(1)))
        .reported()?;
    let error = root
        .declare_variable("x", Binding::new(Value::int(2)))
        .unwrap_err();
    assert!(matches!(
        error,
        RuntimeErrorKind::Redeclaration(ref name) if name == "x"
    ));
    Ok(())
}

#[test]
fn test_const_binding_rejects_update() -> Result<()> {
    let root = root();
    root.declare_variable("limit", Binding::new(Value::int(10)).constant())
        .reported()?;
    let child = root.create_child(ScopeKind::Block, "block");
    let error = child.update_variable("limit", Value::int(11)).unwrap_err();
    assert!(matches!(error, RuntimeErrorKind::ConstViolation(_)));
    assert_eq!(root.get_variable("limit").reported()?, Value::int(10));
    Ok(())
}

#[test]
fn test_update_reaches_nearest_binding() -> Result<()> {
    let root = root();
    root.declare_variable("x", Binding::new(Value::int(1)))
        .reported()?;
    let child = root.create_child(ScopeKind::Block, "block");
    child.update_variable("x", Value::int(5)).reported()?;
    assert_eq!(root.get_variable("x").reported()?, Value::int(5));
    assert!(matches!(
        child.update_variable("missing", Value::null()),
        Err(RuntimeErrorKind::UndefinedVariable(_))
    ));
    Ok(())
}

#[test]
fn test_detached_scope_sees_only_free_variables() -> Result<()> {
    let root = root();
    root.declare_variable("a", Binding::new(Value::int(1)))
        .reported()?;
    root.declare_variable("b", Binding::new(Value::int(2)))
        .reported()?;
    let detached = root.detach(&names(&["a"]), "closure");
    assert_eq!(detached.kind(), ScopeKind::Detached);
    assert_eq!(detached.get_variable("a").reported()?, Value::int(1));
    assert!(!detached.has_variable("b"));
    Ok(())
}

#[test]
fn test_class_def_scope_sees_only_free_variables() -> Result<()> {
    let root = root();
    root.declare_variable("a", Binding::new(Value::int(1)))
        .reported()?;
    root.declare_variable("b", Binding::new(Value::int(2)))
        .reported()?;
    let decl = ClassDecl {
        name: "Shape".into(),
        accessor: None,
        body: vec![Statement::var("side", None, Expression::variable("a"))],
    };
    let def_scope = root.build_class_def_scope(&decl);
    assert_eq!(def_scope.kind(), ScopeKind::ClassDef);
    assert_eq!(def_scope.get_variable("a").reported()?, Value::int(1));
    assert!(!def_scope.has_variable("b"));
    Ok(())
}

#[test]
fn test_isolated_scope_has_no_parent() {
    let root = root();
    let block = root.create_child(ScopeKind::Block, "block");
    let isolated = block.isolate(&BTreeSet::new(), "function");
    assert_eq!(isolated.kind(), ScopeKind::Isolated);
    assert!(isolated.parent().is_none());
}

#[test]
fn test_detached_list_is_a_copy() -> Result<()> {
    let root = root();
    root.declare_variable("items", Binding::new(Value::list(vec![Value::int(1)])))
        .reported()?;
    let detached = root.detach(&names(&["items"]), "closure");
    let copy = detached.get_variable("items").reported()?;
    let kestrel::value::ValueData::List(ref items) = *copy.data() else {
        panic!("expected a list");
    };
    items.borrow_mut().push(Value::int(2));
    let original = root.get_variable("items").reported()?;
    assert_eq!(original, Value::list(vec![Value::int(1)]));
    Ok(())
}

#[test]
fn test_scope_cycle_is_rejected() {
    let root = root();
    let child = root.create_child(ScopeKind::Block, "child");
    let grandchild = child.create_child(ScopeKind::Block, "grandchild");
    assert!(matches!(
        grandchild.append_child(&root),
        Err(RuntimeErrorKind::ScopeCycle(_))
    ));
    assert!(matches!(
        child.append_child(&child),
        Err(RuntimeErrorKind::ScopeCycle(_))
    ));
}

#[test]
fn test_remove_child_releases_scope() {
    let root = root();
    let child = root.create_child(ScopeKind::Block, "child");
    assert_eq!(root.child_count(), 1);
    root.remove_child(&child);
    assert_eq!(root.child_count(), 0);
}

#[test]
fn test_teardown_is_idempotent() -> Result<()> {
    let root = root();
    root.declare_variable("x", Binding::new(Value::int(1)))
        .reported()?;
    let child = root.create_child(ScopeKind::Block, "child");
    child
        .declare_variable("y", Binding::new(Value::int(2)))
        .reported()?;

    root.teardown();
    assert!(root.is_torn_down());
    assert!(child.is_torn_down());
    assert_eq!(root.child_count(), 0);
    assert!(!root.has_variable("x"));
    assert!(!child.has_local_variable("y"));

    root.teardown();
    assert!(root.is_torn_down());
    Ok(())
}

#[test]
fn test_declared_type_is_enforced_on_update() -> Result<()> {
    let root = root();
    let int = root.bind_type(Some(&kestrel::types::TypeAnnotation::named("Int")));
    root.declare_variable(
        "x",
        Binding::declared(Value::int(5), Default::default(), int),
    )
    .reported()?;
    assert!(matches!(
        root.update_variable("x", Value::string("hi")),
        Err(RuntimeErrorKind::TypeMismatch { .. })
    ));
    root.update_variable("x", Value::int(6)).reported()?;
    assert_eq!(root.get_variable("x").reported()?, Value::int(6));
    Ok(())
}

proptest! {
    #[test]
    fn test_shadowing_leaves_parent_untouched(outer in any::<i32>(), inner in any::<i32>()) {
        let root = root();
        root.declare_variable("x", Binding::new(Value::int(outer))).unwrap();
        let child = root.create_child(ScopeKind::Block, "block");
        child.declare_variable("x", Binding::new(Value::int(inner))).unwrap();
        prop_assert_eq!(child.get_variable("x").unwrap(), Value::int(inner));
        prop_assert_eq!(root.get_variable("x").unwrap(), Value::int(outer));
    }

    #[test]
    fn test_detach_does_not_write_back(initial in any::<i32>(), update in any::<i32>()) {
        let root = root();
        root.declare_variable("x", Binding::new(Value::int(initial))).unwrap();
        let detached = root.detach(&names(&["x"]), "closure");
        detached.update_variable("x", Value::int(update)).unwrap();
        prop_assert_eq!(detached.get_variable("x").unwrap(), Value::int(update));
        prop_assert_eq!(root.get_variable("x").unwrap(), Value::int(initial));
    }
}
