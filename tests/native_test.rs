mod common;

use color_eyre::Result;
use common::Reported;
use kestrel::callable::{NativeCall, NativePayload};
use kestrel::expression::{ChainElement, Expression};
use kestrel::interpreter::NativeMethod;
use kestrel::statement::{Parameter, Statement};
use kestrel::types::TypeAnnotation;
use kestrel::value::ValueData;
use kestrel::{RuntimeErrorKind, TreeWalkInterpreter, Value};
use std::cell::RefCell;
use std::rc::Rc;

fn with_stack<T>(
    call: &NativeCall<'_>,
    apply: impl FnOnce(&mut Vec<Value>) -> T,
) -> Result<T, RuntimeErrorKind> {
    let missing = || RuntimeErrorKind::MissingInstance("stack".into());
    let payload = call
        .instance
        .and_then(|instance| instance.native())
        .ok_or_else(missing)?;
    let mut payload = payload.borrow_mut();
    let stack = payload.downcast_mut::<Vec<Value>>().ok_or_else(missing)?;
    Ok(apply(stack))
}

fn stack_interpreter() -> Result<TreeWalkInterpreter> {
    let interpreter = TreeWalkInterpreter::new();
    let construct = NativeMethod::new("init", vec![], |call| {
        let payload: NativePayload = Rc::new(RefCell::new(Vec::<Value>::new()));
        if let Some(instance) = call.instance {
            instance.set_native(payload);
        }
        Ok(Value::null())
    });
    let methods = vec![
        NativeMethod::new("push", vec![Parameter::untyped("item")], |call| {
            let item = call.argument(0);
            with_stack(&call, |stack| stack.push(item))?;
            Ok(Value::null())
        }),
        NativeMethod::new("pop", vec![], |call| {
            with_stack(&call, |stack| stack.pop().unwrap_or_default())
        }),
        NativeMethod::new("size", vec![], |call| {
            with_stack(&call, |stack| Value::long(stack.len() as i64))
        }),
    ];
    interpreter
        .register_native_class("Stack", None, methods, construct)
        .reported()?;
    Ok(interpreter)
}

fn call(target: &str, name: &str, arguments: Vec<Expression>) -> Statement {
    Statement::expression(Expression::chain(vec![
        ChainElement::read(target),
        ChainElement::call(name, arguments),
    ]))
}

#[test]
fn test_native_function_is_resolved_like_user_functions() -> Result<()> {
    let interpreter = TreeWalkInterpreter::new();
    interpreter.register_native_function(
        "twice",
        vec![Parameter::typed("n", TypeAnnotation::named("Int"))],
        |call| {
            let n = call.argument(0);
            n.add(&n)
        },
    );
    let value = interpreter
        .run(&[Statement::expression(Expression::call("twice", vec![Expression::int(21)]))])
        .reported()?;
    assert_eq!(value, Value::int(42));

    let error = interpreter
        .run(&[Statement::expression(Expression::call("twice", vec![Expression::string("x")]))])
        .unwrap_err();
    assert!(matches!(
        error.kind,
        RuntimeErrorKind::NoMatchingOverload { .. }
    ));
    Ok(())
}

#[test]
fn test_native_variadic_arguments_arrive_as_list() -> Result<()> {
    let interpreter = TreeWalkInterpreter::new();
    interpreter.register_native_function(
        "count",
        vec![Parameter::untyped("values").variadic()],
        |call| match call.argument(0).data() {
            ValueData::List(items) => Ok(Value::long(items.borrow().len() as i64)),
            _ => Ok(Value::null()),
        },
    );
    let value = interpreter
        .run(&[Statement::expression(Expression::call(
            "count",
            vec![Expression::int(1), Expression::int(2), Expression::int(3)],
        ))])
        .reported()?;
    assert_eq!(value, Value::long(3));
    Ok(())
}

#[test]
fn test_native_default_is_evaluated() -> Result<()> {
    let interpreter = TreeWalkInterpreter::new();
    interpreter.register_native_function(
        "echo",
        vec![Parameter::untyped("value").with_default(Expression::string("fallback"))],
        |call| Ok(call.argument(0)),
    );
    let value = interpreter
        .run(&[Statement::expression(Expression::call("echo", vec![]))])
        .reported()?;
    assert_eq!(value, Value::string("fallback"));
    Ok(())
}

#[test]
fn test_native_errors_propagate() -> Result<()> {
    let interpreter = TreeWalkInterpreter::new();
    interpreter.register_native_function("fail", vec![], |_| {
        Err(RuntimeErrorKind::InvalidVirtualArgument {
            operation: "fail".into(),
            reason: "always".into(),
        })
    });
    let error = interpreter
        .run(&[Statement::expression(Expression::call("fail", vec![]))])
        .unwrap_err();
    assert!(matches!(
        error.kind,
        RuntimeErrorKind::InvalidVirtualArgument { .. }
    ));
    Ok(())
}

#[test]
fn test_native_class_keeps_payload() -> Result<()> {
    let interpreter = stack_interpreter()?;
    let value = interpreter
        .run(&[
            Statement::var("s", None, Expression::call("Stack", vec![])),
            call("s", "push", vec![Expression::int(1)]),
            call("s", "push", vec![Expression::int(2)]),
            call("s", "pop", vec![]),
            call("s", "size", vec![]),
        ])
        .reported()?;
    assert_eq!(value, Value::long(1));
    Ok(())
}

#[test]
fn test_native_instances_have_separate_payloads() -> Result<()> {
    let interpreter = stack_interpreter()?;
    let value = interpreter
        .run(&[
            Statement::var("a", None, Expression::call("Stack", vec![])),
            Statement::var("b", None, Expression::call("Stack", vec![])),
            call("a", "push", vec![Expression::string("x")]),
            call("b", "size", vec![]),
        ])
        .reported()?;
    assert_eq!(value, Value::long(0));
    Ok(())
}

#[test]
fn test_native_class_name_is_taken() -> Result<()> {
    let interpreter = stack_interpreter()?;
    let error = interpreter
        .run(&[Statement::class(
            "Stack",
            vec![Statement::function("construct", vec![], None, vec![])],
        )])
        .unwrap_err();
    assert!(matches!(error.kind, RuntimeErrorKind::ClassRedefinition(_)));
    Ok(())
}
