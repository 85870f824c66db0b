use super::{Value, ValueData};
use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::span::LineBreaks;
use ariadne::{Color, ColorGenerator, Fmt, Label, Report, ReportKind, Source};
use std::path::Path;

pub trait ValueFormatter {
    fn format(&self, value: &Value) -> String;
    fn format_error(&self, error: &RuntimeError) -> String;
}

pub struct DebugFormatter;

impl ValueFormatter for DebugFormatter {
    fn format(&self, value: &Value) -> String {
        format!("{value:?}")
    }

    fn format_error(&self, error: &RuntimeError) -> String {
        format!("{error:?}")
    }
}

/// One-line errors prefixed with the source line they happened on.
pub struct BasicFormatter {
    line_breaks: LineBreaks,
}

impl BasicFormatter {
    pub fn new(text: &str) -> Self {
        let line_breaks = LineBreaks::new(text);
        Self { line_breaks }
    }

    pub fn format_verbose(value: &Value) -> String {
        match value.data() {
            ValueData::Null => "Null".into(),
            ValueData::Bool(v) => format!("Bool({v})"),
            ValueData::Int(v) => format!("Int({v})"),
            ValueData::Long(v) => format!("Long({v})"),
            ValueData::Float(v) => format!("Float({v})"),
            ValueData::Double(v) => format!("Double({v})"),
            ValueData::Char(v) => format!("Char('{v}')"),
            ValueData::String(v) => format!("String(\"{v}\")"),
            ValueData::List(items) => format!("List[{}]", items.borrow().len()),
            ValueData::Array(items) => format!("Array[{}]", items.borrow().len()),
            ValueData::Dict(entries) => format!("Dict[{}]", entries.borrow().len()),
            ValueData::Set(items) => format!("Set[{}]", items.borrow().len()),
            ValueData::Callable(callable) => format!("Callable({})", callable.name()),
            ValueData::Instance(instance) => format!("Instance({})", instance.class().name()),
            ValueData::FunctionOverloadSet(set) => {
                format!("Overloads({}, {})", set.name, set.signatures.len())
            }
        }
    }
}

impl ValueFormatter for BasicFormatter {
    fn format(&self, value: &Value) -> String {
        format!("{value}")
    }

    fn format_error(&self, error: &RuntimeError) -> String {
        let line = self.line_breaks.get_line_from_span(error.span);
        let message = match &error.kind {
            RuntimeErrorKind::InvalidCallee(callee) => {
                format!("Invalid Callee: {}", Self::format_verbose(callee))
            }
            RuntimeErrorKind::UncaughtThrow(value) => {
                format!("Uncaught Throw: {}", Self::format_verbose(value))
            }
            kind => kind.to_string(),
        };
        match error.context {
            Some(ref context) => format!(
                "({line}) [{}] {message} {{{} in {}}}",
                error.code(),
                context.statement,
                context.scope_owner
            ),
            None => format!("({line}) [{}] {message}", error.code()),
        }
    }
}

/// Renders errors as annotated source snippets.
pub struct PrettyFormatter<'src> {
    text: &'src str,
    path: &'src Path,
}

impl<'src> PrettyFormatter<'src> {
    pub fn new(text: &'src str, path: &'src Path) -> Self {
        Self { text, path }
    }

    fn headline(kind: &RuntimeErrorKind) -> &'static str {
        match kind {
            RuntimeErrorKind::UndefinedVariable(_) => "Attempted to use a name that is not defined",
            RuntimeErrorKind::Redeclaration(_) => "Attempted to declare a name twice in one scope",
            RuntimeErrorKind::ConstViolation(_) => "Attempted to reassign a constant",
            RuntimeErrorKind::TypeMismatch { .. } => "Value does not match the declared type",
            RuntimeErrorKind::FunctionNotFound(_) => "Attempted to call an undefined function",
            RuntimeErrorKind::NoMatchingOverload { .. } => "No overload accepts these arguments",
            RuntimeErrorKind::AmbiguousOverload { .. } => "Several overloads match equally well",
            RuntimeErrorKind::ArgumentBinding { .. } => {
                "Arguments could not be bound to parameters"
            }
            RuntimeErrorKind::MissingConstructor { .. } => "Class has no constructor",
            RuntimeErrorKind::ClassRedefinition(_) => "Attempted to define a class twice",
            RuntimeErrorKind::UnsupportedOperator { .. } => {
                "Operator is not defined for these operands"
            }
            RuntimeErrorKind::DivisionByZero => "Attempted to divide by zero",
            RuntimeErrorKind::InvalidChainAccess { .. } => "Invalid member access",
            RuntimeErrorKind::InvalidVirtualArgument { .. } => {
                "Invalid argument to a built-in operation"
            }
            RuntimeErrorKind::MissingInstance(_) => "Instance reference used outside of a method",
            RuntimeErrorKind::InvalidCallee(_) => "Attempted to call a value that is not callable",
            RuntimeErrorKind::MissingReturn(_) => "Function ended without returning a value",
            RuntimeErrorKind::UncaughtThrow(_) => "A thrown value was never caught",
            RuntimeErrorKind::ScopeCycle(_) => "Scope would become its own ancestor",
            RuntimeErrorKind::MisplacedControl { .. } => "Control flow escaped its construct",
        }
    }

    fn label(kind: &RuntimeErrorKind) -> String {
        let mut colors = ColorGenerator::new();
        match kind {
            RuntimeErrorKind::TypeMismatch {
                name,
                expected,
                actual,
            } => format!(
                "`{}` expects {} but got {}",
                name.fg(Color::BrightYellow),
                expected.fg(colors.next()),
                actual.fg(Color::BrightRed)
            ),
            RuntimeErrorKind::InvalidCallee(callee) => format!(
                "{} is not callable.",
                BasicFormatter::format_verbose(callee).fg(Color::BrightRed)
            ),
            RuntimeErrorKind::UncaughtThrow(value) => format!(
                "{} was thrown here.",
                BasicFormatter::format_verbose(value).fg(Color::BrightRed)
            ),
            RuntimeErrorKind::UndefinedVariable(name)
            | RuntimeErrorKind::FunctionNotFound(name) => {
                format!("{} has not been defined.", name.fg(Color::BrightRed))
            }
            kind => kind.to_string(),
        }
    }
}

impl ValueFormatter for PrettyFormatter<'_> {
    fn format(&self, value: &Value) -> String {
        format!("{value}")
    }

    fn format_error(&self, error: &RuntimeError) -> String {
        let path = self.path.to_string_lossy();
        let path: &str = &path;
        let span = error.span;
        let mut report = Report::build(ReportKind::Error, (path, span.range()))
            .with_code(error.code())
            .with_message(Self::headline(&error.kind))
            .with_label(
                Label::new((path, span.range()))
                    .with_message(Self::label(&error.kind))
                    .with_color(Color::BrightRed),
            );
        if let Some(ref context) = error.context {
            report = report.with_note(format!(
                "raised by a {} statement in `{}`",
                context.statement, context.scope_owner
            ));
        }

        let mut output = std::io::Cursor::new(Vec::new());
        if report
            .finish()
            .write((path, Source::from(self.text)), &mut output)
            .is_err()
        {
            return BasicFormatter::new(self.text).format_error(error);
        }
        String::from_utf8_lossy(&output.into_inner()).into_owned()
    }
}
