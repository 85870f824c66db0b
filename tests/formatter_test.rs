mod common;

use color_eyre::Result;
use common::run_err;
use kestrel::expression::Expression;
use kestrel::span::Span;
use kestrel::statement::Statement;
use kestrel::types::TypeAnnotation;
use kestrel::value::formatter::{BasicFormatter, DebugFormatter, PrettyFormatter, ValueFormatter};
use kestrel::Value;
use std::path::Path;

const SOURCE: &str = "var x: Int = 5\nx = \"hi\"\n";

fn mismatch() -> Result<kestrel::RuntimeError> {
    run_err(&[
        Statement::var("x", Some(TypeAnnotation::named("Int")), Expression::int(5))
            .with_span(Span::new(0, 14)),
        Statement::assign("x", Expression::string("hi")).with_span(Span::new(15, 23)),
    ])
}

#[test]
fn test_basic_formatter_reports_line_and_context() -> Result<()> {
    let error = mismatch()?;
    assert_eq!(error.span, Span::new(15, 23));
    let formatter = BasicFormatter::new(SOURCE);
    assert_eq!(
        formatter.format_error(&error),
        "(2) [RT004] Type Mismatch: x expects Int but got String {assignment in <root>}"
    );
    Ok(())
}

#[test]
fn test_pretty_formatter_includes_code() -> Result<()> {
    let error = mismatch()?;
    let formatter = PrettyFormatter::new(SOURCE, Path::new("main.ks"));
    let report = formatter.format_error(&error);
    assert!(report.contains("RT004"));
    assert!(report.contains("main.ks"));
    Ok(())
}

#[test]
fn test_value_formatting() {
    let list = Value::list(vec![Value::int(1), Value::string("a")]);
    assert_eq!(BasicFormatter::format_verbose(&list), "List[2]");
    assert_eq!(BasicFormatter::format_verbose(&Value::int(3)), "Int(3)");
    assert_eq!(BasicFormatter::format_verbose(&Value::null()), "Null");
    assert!(DebugFormatter.format(&Value::bool(true)).contains("Bool"));
}
