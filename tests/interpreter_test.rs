mod common;

use color_eyre::Result;
use common::{add, equals, less, run, run_err, var, Reported};
use kestrel::expression::{Argument, BinaryOperator, ChainElement, Expression, LogicalOperator};
use kestrel::statement::{Parameter, Statement, StatementKind, VariableDecl};
use kestrel::types::TypeAnnotation;
use kestrel::{RuntimeErrorKind, TreeWalkInterpreter, Value};
use proptest::prelude::*;

fn int_type() -> Option<TypeAnnotation> {
    Some(TypeAnnotation::named("Int"))
}

fn method(target: &str, name: &str, arguments: Vec<Expression>) -> Expression {
    Expression::chain(vec![
        ChainElement::read(target),
        ChainElement::call(name, arguments),
    ])
}

#[test]
fn test_declared_type_survives_reassignment() -> Result<()> {
    let error = run_err(&[
        Statement::var("x", int_type(), Expression::int(5)),
        Statement::assign("x", Expression::string("hi")),
    ])?;
    assert!(matches!(error.kind, RuntimeErrorKind::TypeMismatch { .. }));
    assert_eq!(error.code(), "RT004");
    let context = error.context.expect("statement context");
    assert_eq!(context.statement, StatementKind::Assignment);
    assert_eq!(context.scope_owner, "<root>");
    Ok(())
}

#[test]
fn test_declaration_checks_initializer() -> Result<()> {
    let error = run_err(&[Statement::var(
        "name",
        Some(TypeAnnotation::named("String")),
        Expression::int(1),
    )])?;
    assert!(matches!(error.kind, RuntimeErrorKind::TypeMismatch { .. }));
    Ok(())
}

#[test]
fn test_widening_on_declaration() -> Result<()> {
    let value = run(&[
        Statement::var(
            "x",
            Some(TypeAnnotation::named("Double")),
            Expression::int(2),
        ),
        Statement::expression(var("x")),
    ])?;
    assert_eq!(value, Value::int(2));
    Ok(())
}

#[test]
fn test_constant_rejects_assignment() -> Result<()> {
    let limit = VariableDecl::new("limit", None, Some(Expression::int(3)));
    let error = run_err(&[
        Statement::declare(limit.constant()),
        Statement::assign("limit", Expression::int(4)),
    ])?;
    assert!(matches!(error.kind, RuntimeErrorKind::ConstViolation(_)));
    Ok(())
}

#[test]
fn test_while_with_break_and_continue() -> Result<()> {
    let value = run(&[
        Statement::var("i", None, Expression::int(0)),
        Statement::var("total", None, Expression::int(0)),
        Statement::while_loop(
            less(var("i"), Expression::int(10)),
            vec![
                Statement::assign("i", add(var("i"), Expression::int(1))),
                Statement::if_else(
                    equals(var("i"), Expression::int(3)),
                    vec![Statement::cont()],
                    None,
                ),
                Statement::if_else(
                    equals(var("i"), Expression::int(6)),
                    vec![Statement::brk()],
                    None,
                ),
                Statement::assign("total", add(var("total"), var("i"))),
            ],
        ),
        Statement::expression(var("total")),
    ])?;
    assert_eq!(value, Value::int(1 + 2 + 4 + 5));
    Ok(())
}

#[test]
fn test_return_escapes_loop() -> Result<()> {
    let value = run(&[
        Statement::function(
            "first_over",
            vec![Parameter::untyped("limit")],
            None,
            vec![
                Statement::var("i", None, Expression::int(0)),
                Statement::while_loop(
                    Expression::bool(true),
                    vec![
                        Statement::assign("i", add(var("i"), Expression::int(1))),
                        Statement::if_else(
                            Expression::binary(BinaryOperator::GreaterThan, var("i"), var("limit")),
                            vec![Statement::return_value(var("i"))],
                            None,
                        ),
                    ],
                ),
            ],
        ),
        Statement::expression(Expression::call("first_over", vec![Expression::int(3)])),
    ])?;
    assert_eq!(value, Value::int(4));
    Ok(())
}

#[test]
fn test_elif_chain() -> Result<()> {
    let branch = |value: i32| {
        Statement::new(kestrel::statement::StatementNode::If {
            branches: vec![
                kestrel::statement::IfBranch {
                    condition: less(Expression::int(value), Expression::int(0)),
                    body: vec![Statement::expression(Expression::string("negative"))],
                },
                kestrel::statement::IfBranch {
                    condition: equals(Expression::int(value), Expression::int(0)),
                    body: vec![Statement::expression(Expression::string("zero"))],
                },
            ],
            otherwise: Some(vec![Statement::expression(Expression::string("positive"))]),
        })
    };
    assert_eq!(run(&[branch(-4)])?, Value::string("negative"));
    assert_eq!(run(&[branch(0)])?, Value::string("zero"));
    assert_eq!(run(&[branch(9)])?, Value::string("positive"));
    Ok(())
}

#[test]
fn test_recursive_function() -> Result<()> {
    let value = run(&[
        Statement::function(
            "fact",
            vec![Parameter::typed("n", TypeAnnotation::named("Int"))],
            int_type(),
            vec![
                Statement::if_else(
                    less(var("n"), Expression::int(2)),
                    vec![Statement::return_value(Expression::int(1))],
                    None,
                ),
                Statement::return_value(Expression::binary(
                    BinaryOperator::Multiply,
                    var("n"),
                    Expression::call(
                        "fact",
                        vec![Expression::binary(
                            BinaryOperator::Subtract,
                            var("n"),
                            Expression::int(1),
                        )],
                    ),
                )),
            ],
        ),
        Statement::expression(Expression::call("fact", vec![Expression::int(5)])),
    ])?;
    assert_eq!(value, Value::int(120));
    Ok(())
}

#[test]
fn test_function_does_not_see_outer_variables() -> Result<()> {
    let error = run_err(&[
        Statement::var("secret", None, Expression::int(1)),
        Statement::function(
            "peek",
            vec![],
            None,
            vec![Statement::return_value(var("secret"))],
        ),
        Statement::expression(Expression::call("peek", vec![])),
    ])?;
    assert!(matches!(
        error.kind,
        RuntimeErrorKind::UndefinedVariable(ref name) if name == "secret"
    ));
    Ok(())
}

#[test]
fn test_def_captures_a_snapshot() -> Result<()> {
    let value = run(&[
        Statement::var("count", None, Expression::int(1)),
        Statement::def(
            "snapshot",
            vec![],
            vec![Statement::return_value(var("count"))],
        ),
        Statement::assign("count", Expression::int(5)),
        Statement::expression(Expression::call("snapshot", vec![])),
    ])?;
    assert_eq!(value, Value::int(1));
    Ok(())
}

#[test]
fn test_missing_return_for_typed_function() -> Result<()> {
    let error = run_err(&[
        Statement::function("nothing", vec![], int_type(), vec![]),
        Statement::expression(Expression::call("nothing", vec![])),
    ])?;
    assert!(matches!(error.kind, RuntimeErrorKind::MissingReturn(_)));
    Ok(())
}

#[test]
fn test_return_value_is_checked() -> Result<()> {
    let error = run_err(&[
        Statement::function(
            "wrong",
            vec![],
            int_type(),
            vec![Statement::return_value(Expression::string("x"))],
        ),
        Statement::expression(Expression::call("wrong", vec![])),
    ])?;
    assert!(matches!(error.kind, RuntimeErrorKind::TypeMismatch { .. }));
    Ok(())
}

#[test]
fn test_uncaught_throw() -> Result<()> {
    let error = run_err(&[Statement::throw(Expression::string("boom"))])?;
    assert!(matches!(
        error.kind,
        RuntimeErrorKind::UncaughtThrow(ref value) if *value == Value::string("boom")
    ));

    let error = run_err(&[
        Statement::function(
            "explode",
            vec![],
            None,
            vec![Statement::throw(Expression::int(7))],
        ),
        Statement::expression(Expression::call("explode", vec![])),
    ])?;
    assert!(matches!(error.kind, RuntimeErrorKind::UncaughtThrow(_)));
    Ok(())
}

#[test]
fn test_block_scope_shadows() -> Result<()> {
    let value = run(&[
        Statement::var("x", None, Expression::int(1)),
        Statement::block(vec![Statement::var("x", None, Expression::int(2))]),
        Statement::expression(var("x")),
    ])?;
    assert_eq!(value, Value::int(1));
    Ok(())
}

#[test]
fn test_logical_short_circuit() -> Result<()> {
    let value = run(&[Statement::expression(Expression::logical(
        LogicalOperator::And,
        Expression::bool(false),
        var("undefined"),
    ))])?;
    assert_eq!(value, Value::bool(false));

    let value = run(&[Statement::expression(Expression::logical(
        LogicalOperator::Or,
        Expression::int(3),
        var("undefined"),
    ))])?;
    assert_eq!(value, Value::int(3));
    Ok(())
}

#[test]
fn test_list_intrinsics() -> Result<()> {
    let value = run(&[
        Statement::var(
            "items",
            None,
            Expression::list(vec![Expression::int(1), Expression::int(2)]),
        ),
        Statement::expression(method("items", "push", vec![Expression::int(3)])),
        Statement::expression(method("items", "length", vec![])),
    ])?;
    assert_eq!(value, Value::long(3));
    Ok(())
}

#[test]
fn test_string_intrinsics() -> Result<()> {
    let value = run(&[
        Statement::var("text", None, Expression::string("kestrel")),
        Statement::expression(method(
            "text",
            "substring",
            vec![Expression::int(1), Expression::int(4)],
        )),
    ])?;
    assert_eq!(value, Value::string("est"));
    Ok(())
}

#[test]
fn test_unknown_intrinsic() -> Result<()> {
    let error = run_err(&[
        Statement::var("n", None, Expression::int(1)),
        Statement::expression(method("n", "push", vec![Expression::int(3)])),
    ])?;
    assert!(matches!(
        error.kind,
        RuntimeErrorKind::InvalidChainAccess { .. }
    ));
    Ok(())
}

#[test]
fn test_assignment_copies_lists() -> Result<()> {
    let value = run(&[
        Statement::var("a", None, Expression::list(vec![Expression::int(1)])),
        Statement::var("b", None, var("a")),
        Statement::expression(method("b", "push", vec![Expression::int(2)])),
        Statement::expression(method("a", "length", vec![])),
    ])?;
    assert_eq!(value, Value::long(1));
    Ok(())
}

#[test]
fn test_mutable_binding_shares_list() -> Result<()> {
    let value = run(&[
        Statement::var("a", None, Expression::list(vec![Expression::int(1)])),
        Statement::declare(VariableDecl::new("b", None, Some(var("a"))).mutable()),
        Statement::expression(method("b", "push", vec![Expression::int(2)])),
        Statement::expression(method("a", "length", vec![])),
    ])?;
    assert_eq!(value, Value::long(2));
    Ok(())
}

#[test]
fn test_named_arguments_and_defaults() -> Result<()> {
    let greet = Statement::function(
        "greet",
        vec![
            Parameter::untyped("name"),
            Parameter::untyped("greeting").with_default(Expression::string("hi ")),
        ],
        None,
        vec![Statement::return_value(add(var("greeting"), var("name")))],
    );
    let value = run(&[
        greet.clone(),
        Statement::expression(Expression::call_with(
            "greet",
            vec![Argument::named("name", Expression::string("bob"))],
        )),
    ])?;
    assert_eq!(value, Value::string("hi bob"));

    let value = run(&[
        greet,
        Statement::expression(Expression::call_with(
            "greet",
            vec![
                Argument::named("greeting", Expression::string("yo ")),
                Argument::named("name", Expression::string("amy")),
            ],
        )),
    ])?;
    assert_eq!(value, Value::string("yo amy"));
    Ok(())
}

#[test]
fn test_unknown_named_argument() -> Result<()> {
    let error = run_err(&[
        Statement::function("one", vec![Parameter::untyped("a")], None, vec![]),
        Statement::expression(Expression::call_with(
            "one",
            vec![Argument::named("b", Expression::int(1))],
        )),
    ])?;
    assert!(matches!(
        error.kind,
        RuntimeErrorKind::ArgumentBinding { .. }
    ));
    Ok(())
}

#[test]
fn test_variadic_parameter() -> Result<()> {
    let value = run(&[
        Statement::function(
            "count_rest",
            vec![
                Parameter::untyped("first"),
                Parameter::untyped("rest").variadic(),
            ],
            None,
            vec![Statement::return_value(method("rest", "length", vec![]))],
        ),
        Statement::expression(Expression::call(
            "count_rest",
            vec![Expression::int(1), Expression::int(2), Expression::int(3)],
        )),
    ])?;
    assert_eq!(value, Value::long(2));
    Ok(())
}

#[test]
fn test_division_by_zero() -> Result<()> {
    let error = run_err(&[Statement::expression(Expression::binary(
        BinaryOperator::Divide,
        Expression::int(1),
        Expression::int(0),
    ))])?;
    assert!(matches!(error.kind, RuntimeErrorKind::DivisionByZero));
    Ok(())
}

#[test]
fn test_type_alias_statement() -> Result<()> {
    let number_type = || Some(TypeAnnotation::named("Number"));
    let number = TypeAnnotation::Union(vec![
        TypeAnnotation::named("Int"),
        TypeAnnotation::named("Double"),
    ]);
    let value = run(&[
        Statement::type_alias("Number", number.clone()),
        Statement::var("x", number_type(), Expression::double(1.5)),
        Statement::assign("x", Expression::int(2)),
        Statement::expression(var("x")),
    ])?;
    assert_eq!(value, Value::int(2));

    let error = run_err(&[
        Statement::type_alias("Number", number),
        Statement::var("x", number_type(), Expression::int(1)),
        Statement::assign("x", Expression::string("one")),
    ])?;
    assert!(matches!(error.kind, RuntimeErrorKind::TypeMismatch { .. }));
    Ok(())
}

#[test]
fn test_function_reference_as_value() -> Result<()> {
    let value = run(&[
        Statement::function(
            "double_it",
            vec![Parameter::untyped("n")],
            None,
            vec![Statement::return_value(add(var("n"), var("n")))],
        ),
        Statement::var("f", None, var("double_it")),
        Statement::expression(Expression::call("f", vec![Expression::int(21)])),
    ])?;
    assert_eq!(value, Value::int(42));
    Ok(())
}

#[test]
fn test_calling_a_non_callable() -> Result<()> {
    let error = run_err(&[Statement::expression(Expression::call_value(
        Expression::int(3),
        vec![],
    ))])?;
    assert!(matches!(error.kind, RuntimeErrorKind::InvalidCallee(_)));
    Ok(())
}

#[test]
fn test_evaluate_in_root_scope() -> Result<()> {
    let interpreter = TreeWalkInterpreter::new();
    interpreter
        .run(&[Statement::var("x", None, Expression::int(40))])
        .reported()?;
    let value = interpreter
        .evaluate(&add(var("x"), Expression::int(2)))
        .reported()?;
    assert_eq!(value, Value::int(42));
    Ok(())
}

#[test]
fn test_call_scopes_are_released() -> Result<()> {
    let interpreter = TreeWalkInterpreter::new();
    interpreter
        .run(&[
            Statement::function("noop", vec![], None, vec![]),
            Statement::expression(Expression::call("noop", vec![])),
            Statement::block(vec![]),
        ])
        .reported()?;
    assert_eq!(interpreter.root().child_count(), 0);
    Ok(())
}

#[test]
fn test_inner_break_keeps_outer_loop_running() -> Result<()> {
    let value = run(&[
        Statement::var("i", None, Expression::int(0)),
        Statement::var("inner_runs", None, Expression::int(0)),
        Statement::while_loop(
            less(var("i"), Expression::int(3)),
            vec![
                Statement::assign("i", add(var("i"), Expression::int(1))),
                Statement::while_loop(
                    Expression::bool(true),
                    vec![
                        Statement::assign("inner_runs", add(var("inner_runs"), Expression::int(1))),
                        Statement::brk(),
                    ],
                ),
            ],
        ),
        Statement::expression(add(var("i"), var("inner_runs"))),
    ])?;
    assert_eq!(value, Value::int(6));
    Ok(())
}

#[test]
fn test_break_at_top_level_is_rejected() -> Result<()> {
    let error = run_err(&[
        Statement::var("x", None, Expression::int(1)),
        Statement::brk(),
    ])?;
    assert!(matches!(
        error.kind,
        RuntimeErrorKind::MisplacedControl {
            control: "break",
            place: "top level",
        }
    ));
    assert_eq!(error.code(), "RT020");
    Ok(())
}

#[test]
fn test_continue_in_function_body_is_rejected() -> Result<()> {
    let error = run_err(&[
        Statement::function("skip", vec![], None, vec![Statement::cont()]),
        Statement::expression(Expression::call("skip", vec![])),
    ])?;
    assert!(matches!(
        error.kind,
        RuntimeErrorKind::MisplacedControl {
            control: "continue",
            place: "function body",
        }
    ));
    Ok(())
}

#[test]
fn test_string_repetition() -> Result<()> {
    let value = TreeWalkInterpreter::new()
        .evaluate(&Expression::binary(
            BinaryOperator::Multiply,
            Expression::string("ab"),
            Expression::int(3),
        ))
        .reported()?;
    assert_eq!(value, Value::string("ababab"));
    Ok(())
}

#[test]
fn test_oversized_string_repetition_is_rejected() -> Result<()> {
    let error = run_err(&[Statement::expression(Expression::binary(
        BinaryOperator::Multiply,
        Expression::string("ab"),
        Expression::long(i64::MAX),
    ))])?;
    assert!(matches!(
        error.kind,
        RuntimeErrorKind::InvalidVirtualArgument { .. }
    ));
    Ok(())
}

proptest! {
    #[test]
    fn test_integer_addition_wraps(lhs in any::<i32>(), rhs in any::<i32>()) {
        let value = TreeWalkInterpreter::new()
            .evaluate(&add(Expression::int(lhs), Expression::int(rhs)))
            .unwrap();
        prop_assert_eq!(value, Value::int(lhs.wrapping_add(rhs)));
    }

    #[test]
    fn test_widened_addition_is_long(lhs in any::<i32>(), rhs in any::<i64>()) {
        let value = TreeWalkInterpreter::new()
            .evaluate(&add(Expression::int(lhs), Expression::long(rhs)))
            .unwrap();
        prop_assert_eq!(value, Value::long((lhs as i64).wrapping_add(rhs)));
    }
}
