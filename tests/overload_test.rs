mod common;

use color_eyre::Result;
use common::{add, run, run_err, var, Reported};
use kestrel::callable::{
    bind_arguments, resolve_overload, BindingFailure, CallArguments, Callable, CallableSignature,
    CallableType,
};
use kestrel::expression::Expression;
use kestrel::statement::{Parameter, Statement};
use kestrel::types::TypeAnnotation;
use kestrel::{RuntimeErrorKind, TreeWalkInterpreter, Value};
use proptest::prelude::*;

fn typed(name: &str, ty: &str) -> Parameter {
    Parameter::typed(name, TypeAnnotation::named(ty))
}

/// `add(Int, Int)` tags its result with "int", `add(Float, Float)` with "float".
fn add_overloads() -> Vec<Statement> {
    vec![
        Statement::function(
            "add",
            vec![typed("a", "Int"), typed("b", "Int")],
            None,
            vec![Statement::return_value(Expression::string("int"))],
        ),
        Statement::function(
            "add",
            vec![typed("a", "Float"), typed("b", "Float")],
            None,
            vec![Statement::return_value(Expression::string("float"))],
        ),
    ]
}

fn call_add(lhs: Expression, rhs: Expression) -> Result<Value> {
    let mut program = add_overloads();
    let call = Expression::call("add", vec![lhs, rhs]);
    program.push(Statement::expression(call));
    run(&program)
}

#[test]
fn test_exact_overload_wins() -> Result<()> {
    assert_eq!(
        call_add(Expression::int(1), Expression::int(2))?,
        Value::string("int")
    );
    assert_eq!(
        call_add(Expression::float(1.0), Expression::float(2.0))?,
        Value::string("float")
    );
    Ok(())
}

#[test]
fn test_widening_selects_wider_overload() -> Result<()> {
    assert_eq!(
        call_add(Expression::int(1), Expression::float(2.0))?,
        Value::string("float")
    );
    Ok(())
}

#[test]
fn test_no_matching_overload() -> Result<()> {
    let mut program = add_overloads();
    program.push(Statement::expression(Expression::call(
        "add",
        vec![Expression::string("a"), Expression::string("b")],
    )));
    let error = run_err(&program)?;
    assert!(matches!(
        error.kind,
        RuntimeErrorKind::NoMatchingOverload { candidates: 2, .. }
    ));
    Ok(())
}

#[test]
fn test_equal_scores_are_ambiguous() -> Result<()> {
    let error = run_err(&[
        Statement::function("pick", vec![typed("a", "Int")], None, vec![]),
        Statement::function("pick", vec![typed("b", "Int")], None, vec![]),
        Statement::expression(Expression::call("pick", vec![Expression::int(1)])),
    ])?;
    assert!(matches!(
        error.kind,
        RuntimeErrorKind::AmbiguousOverload { candidates: 2, .. }
    ));
    Ok(())
}

#[test]
fn test_lower_widening_cost_breaks_ties() -> Result<()> {
    let value = run(&[
        Statement::function(
            "widen",
            vec![typed("a", "Long")],
            None,
            vec![Statement::return_value(Expression::string("long"))],
        ),
        Statement::function(
            "widen",
            vec![typed("a", "Double")],
            None,
            vec![Statement::return_value(Expression::string("double"))],
        ),
        Statement::expression(Expression::call("widen", vec![Expression::int(1)])),
    ])?;
    assert_eq!(value, Value::string("long"));
    Ok(())
}

#[test]
fn test_typed_overload_beats_untyped() -> Result<()> {
    let value = run(&[
        Statement::function(
            "show",
            vec![Parameter::untyped("a")],
            None,
            vec![Statement::return_value(Expression::string("any"))],
        ),
        Statement::function(
            "show",
            vec![typed("a", "String")],
            None,
            vec![Statement::return_value(Expression::string("string"))],
        ),
        Statement::expression(Expression::call("show", vec![Expression::string("x")])),
    ])?;
    assert_eq!(value, Value::string("string"));
    Ok(())
}

#[test]
fn test_def_is_the_fallback() -> Result<()> {
    let program = |argument: Expression| {
        let mut program = add_overloads();
        program.push(Statement::def(
            "add",
            vec![Parameter::untyped("a"), Parameter::untyped("b")],
            vec![Statement::return_value(add(var("a"), var("b")))],
        ));
        program.push(Statement::expression(Expression::call(
            "add",
            vec![argument, Expression::string("!")],
        )));
        program
    };
    assert_eq!(
        run(&program(Expression::string("hi")))?,
        Value::string("hi!")
    );

    let mut typed_call = add_overloads();
    typed_call.push(Statement::def(
        "add",
        vec![Parameter::untyped("a"), Parameter::untyped("b")],
        vec![Statement::return_value(Expression::string("def"))],
    ));
    typed_call.push(Statement::expression(Expression::call(
        "add",
        vec![Expression::int(1), Expression::int(2)],
    )));
    assert_eq!(run(&typed_call)?, Value::string("int"));
    Ok(())
}

#[test]
fn test_single_candidate_reports_binding_failure() -> Result<()> {
    let error = run_err(&[
        Statement::function("one", vec![Parameter::untyped("a")], None, vec![]),
        Statement::expression(Expression::call(
            "one",
            vec![Expression::int(1), Expression::int(2)],
        )),
    ])?;
    assert!(matches!(
        error.kind,
        RuntimeErrorKind::ArgumentBinding {
            reason: BindingFailure::TooManyArguments {
                expected: 1,
                actual: 2
            },
            ..
        }
    ));
    Ok(())
}

#[test]
fn test_unknown_function() -> Result<()> {
    let call = Expression::call("nowhere", vec![]);
    let error = run_err(&[Statement::expression(call)])?;
    assert!(matches!(error.kind, RuntimeErrorKind::FunctionNotFound(_)));
    assert_eq!(error.code(), "RT005");
    Ok(())
}

#[test]
fn test_bind_arguments_rejects_duplicates() -> Result<()> {
    let interpreter = TreeWalkInterpreter::new();
    interpreter
        .run(&[Statement::function(
            "pair",
            vec![Parameter::untyped("a"), Parameter::untyped("b")],
            None,
            vec![],
        )])
        .reported()?;
    let candidates = interpreter
        .root()
        .lookup_function("pair")
        .ok_or_else(|| color_eyre::eyre::eyre!("pair is not registered"))?;
    let arguments = CallArguments::positional(vec![Value::int(1), Value::int(2)])
        .with_named("a", Value::int(3));
    assert_eq!(
        bind_arguments(candidates[0].parameters(), &arguments).unwrap_err(),
        BindingFailure::DuplicateArgument("a".into())
    );
    Ok(())
}

#[test]
fn test_overloads_registered_in_order() -> Result<()> {
    let interpreter = TreeWalkInterpreter::new();
    interpreter.run(&add_overloads()).reported()?;
    let candidates = interpreter
        .root()
        .lookup_function("add")
        .ok_or_else(|| color_eyre::eyre::eyre!("add is not registered"))?;
    assert_eq!(candidates.len(), 2);
    assert!(candidates
        .iter()
        .all(|candidate| candidate.primary == CallableType::Function));
    assert!(matches!(candidates[0].callable, Callable::Function(_)));
    Ok(())
}

proptest! {
    #[test]
    fn test_resolution_is_deterministic(
        a in any::<i32>(),
        b in any::<i32>(),
        reversed in any::<bool>(),
    ) {
        let interpreter = TreeWalkInterpreter::new();
        interpreter.run(&add_overloads()).unwrap();
        let root = interpreter.root();
        let mut candidates: Vec<CallableSignature> = root.lookup_function("add").unwrap();
        if reversed {
            candidates.reverse();
        }
        let arguments = CallArguments::positional(vec![Value::int(a), Value::int(b)]);
        let types = root.types();
        let resolve = || {
            resolve_overload(
                &"add".into(),
                &candidates,
                &arguments,
                &mut types.manager_mut(),
                types.options(),
            )
            .unwrap()
        };
        let first = resolve();
        let second = resolve();
        prop_assert!(first.signature.callable.ptr_eq(&second.signature.callable));
        let int_overload = root.lookup_function("add").unwrap().remove(0);
        prop_assert!(first.signature.callable.ptr_eq(&int_overload.callable));
    }
}
