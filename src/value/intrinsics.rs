//! Operations a chain may apply to values that are not class instances.

use super::{Value, ValueData};
use crate::error::RuntimeErrorKind;
use compact_str::{format_compact, ToCompactString};

fn invalid(operation: &str, reason: impl std::fmt::Display) -> RuntimeErrorKind {
    RuntimeErrorKind::InvalidVirtualArgument {
        operation: operation.into(),
        reason: format_compact!("{reason}"),
    }
}

fn expect_arity(
    operation: &str,
    arguments: &[Value],
    range: std::ops::RangeInclusive<usize>,
) -> Result<(), RuntimeErrorKind> {
    if range.contains(&arguments.len()) {
        Ok(())
    } else {
        Err(invalid(
            operation,
            format_compact!(
                "expected {}..={} arguments but got {}",
                range.start(),
                range.end(),
                arguments.len()
            ),
        ))
    }
}

fn expect_index(
    operation: &str,
    value: &Value,
    len: usize,
    inclusive: bool,
) -> Result<usize, RuntimeErrorKind> {
    let index = value.as_int().ok_or_else(|| {
        invalid(
            operation,
            format_compact!("{} is not an integer index", value.type_name()),
        )
    })?;
    let limit = if inclusive {
        len
    } else {
        len.saturating_sub(1)
    };
    match usize::try_from(index) {
        Ok(index) if index <= limit && (inclusive || len > 0) => Ok(index),
        _ => Err(invalid(
            operation,
            format_compact!("index {index} out of range for length {len}"),
        )),
    }
}

fn range_bounds(
    operation: &str,
    arguments: &[Value],
    len: usize,
) -> Result<(usize, usize), RuntimeErrorKind> {
    expect_arity(operation, arguments, 1..=2)?;
    let start = expect_index(operation, &arguments[0], len, true)?;
    let end = match arguments.get(1) {
        Some(end) => expect_index(operation, end, len, true)?,
        None => len,
    };
    if start > end {
        return Err(invalid(
            operation,
            format_compact!("start {start} is past end {end}"),
        ));
    }
    Ok((start, end))
}

/// Applies the intrinsic `name` to `target`.
///
/// Returns `None` when `name` is not defined for the target's kind.
pub fn call_intrinsic(
    target: &Value,
    name: &str,
    arguments: &[Value],
) -> Option<Result<Value, RuntimeErrorKind>> {
    let result = match (name, target.data()) {
        ("clone", _) => expect_arity(name, arguments, 0..=0).map(|_| target.deep_clone()),
        ("to_string", _) => {
            expect_arity(name, arguments, 0..=0).map(|_| Value::string(&target.to_compact_string()))
        }
        ("clear", ValueData::List(items) | ValueData::Array(items)) => {
            expect_arity(name, arguments, 0..=0).map(|_| {
                items.borrow_mut().clear();
                Value::null()
            })
        }
        ("clear", ValueData::Dict(dict)) => expect_arity(name, arguments, 0..=0).map(|_| {
            dict.borrow_mut().clear();
            Value::null()
        }),
        ("clear", ValueData::Set(set)) => expect_arity(name, arguments, 0..=0).map(|_| {
            set.borrow_mut().clear();
            Value::null()
        }),
        ("length" | "size" | "is_empty", _) => {
            let len = match target.data() {
                ValueData::String(text) => text.chars().count(),
                ValueData::List(items) | ValueData::Array(items) => items.borrow().len(),
                ValueData::Dict(dict) => dict.borrow().len(),
                ValueData::Set(set) => set.borrow().len(),
                _ => return None,
            };
            expect_arity(name, arguments, 0..=0).map(|_| {
                if name == "is_empty" {
                    Value::bool(len == 0)
                } else {
                    Value::long(len as i64)
                }
            })
        }
        ("substring" | "slice", ValueData::String(text)) => {
            let chars: Vec<char> = text.chars().collect();
            range_bounds(name, arguments, chars.len())
                .map(|(start, end)| Value::string(&chars[start..end].iter().collect::<String>()))
        }
        ("slice", ValueData::List(items)) => {
            let items = items.borrow();
            range_bounds(name, arguments, items.len())
                .map(|(start, end)| Value::list(items[start..end].to_vec()))
        }
        ("slice", ValueData::Array(items)) => {
            let items = items.borrow();
            range_bounds(name, arguments, items.len())
                .map(|(start, end)| Value::array(items[start..end].to_vec()))
        }
        ("contains", ValueData::String(text)) => {
            expect_arity(name, arguments, 1..=1).and_then(|_| match arguments[0].data() {
                ValueData::String(needle) => Ok(Value::bool(text.contains(needle.as_str()))),
                ValueData::Char(needle) => Ok(Value::bool(text.contains(*needle))),
                _ => Err(invalid(name, "expected a String or Char")),
            })
        }
        ("contains", ValueData::List(items) | ValueData::Array(items)) => {
            expect_arity(name, arguments, 1..=1).map(|_| {
                let needle = &arguments[0];
                Value::bool(items.borrow().iter().any(|item| item.loose_eq(needle)))
            })
        }
        ("contains", ValueData::Set(set)) => {
            expect_arity(name, arguments, 1..=1)
                .map(|_| Value::bool(set.borrow().contains(&arguments[0])))
        }
        ("contains", ValueData::Dict(dict)) => expect_arity(name, arguments, 1..=1)
            .map(|_| Value::bool(dict.borrow().contains_key(&arguments[0]))),
        ("push", ValueData::List(items)) => expect_arity(name, arguments, 1..=1).map(|_| {
            items.borrow_mut().push(arguments[0].duplicate());
            Value::null()
        }),
        ("pop", ValueData::List(items)) => expect_arity(name, arguments, 0..=0).and_then(|_| {
            let popped = items.borrow_mut().pop();
            popped.ok_or_else(|| invalid(name, "list is empty"))
        }),
        ("get", ValueData::List(items) | ValueData::Array(items)) => {
            expect_arity(name, arguments, 1..=1).and_then(|_| {
                let items = items.borrow();
                let index = expect_index(name, &arguments[0], items.len(), false)?;
                Ok(items[index].clone())
            })
        }
        ("get", ValueData::String(text)) => expect_arity(name, arguments, 1..=1).and_then(|_| {
            let chars: Vec<char> = text.chars().collect();
            let index = expect_index(name, &arguments[0], chars.len(), false)?;
            Ok(Value::char(chars[index]))
        }),
        ("get", ValueData::Dict(dict)) => expect_arity(name, arguments, 1..=1).and_then(|_| {
            dict.borrow()
                .get(&arguments[0])
                .cloned()
                .ok_or_else(|| invalid(name, format_compact!("missing key {}", arguments[0])))
        }),
        ("set", ValueData::List(items) | ValueData::Array(items)) => {
            expect_arity(name, arguments, 2..=2).and_then(|_| {
                let mut items = items.borrow_mut();
                let index = expect_index(name, &arguments[0], items.len(), false)?;
                items[index] = arguments[1].duplicate();
                Ok(Value::null())
            })
        }
        ("set" | "insert", ValueData::Dict(dict)) => expect_arity(name, arguments, 2..=2).map(|_| {
            dict.borrow_mut()
                .insert(arguments[0].duplicate(), arguments[1].duplicate())
                .unwrap_or_default()
        }),
        ("insert", ValueData::List(items)) => expect_arity(name, arguments, 2..=2).and_then(|_| {
            let mut items = items.borrow_mut();
            let index = expect_index(name, &arguments[0], items.len(), true)?;
            items.insert(index, arguments[1].duplicate());
            Ok(Value::null())
        }),
        ("insert", ValueData::Set(set)) => expect_arity(name, arguments, 1..=1)
            .map(|_| Value::bool(set.borrow_mut().insert(arguments[0].duplicate()))),
        ("remove", ValueData::List(items)) => expect_arity(name, arguments, 1..=1).and_then(|_| {
            let mut items = items.borrow_mut();
            let index = expect_index(name, &arguments[0], items.len(), false)?;
            Ok(items.remove(index))
        }),
        ("remove", ValueData::Dict(dict)) => expect_arity(name, arguments, 1..=1)
            .map(|_| dict.borrow_mut().remove(&arguments[0]).unwrap_or_default()),
        ("remove", ValueData::Set(set)) => expect_arity(name, arguments, 1..=1)
            .map(|_| Value::bool(set.borrow_mut().remove(&arguments[0]))),
        ("keys", ValueData::Dict(dict)) => expect_arity(name, arguments, 0..=0).map(|_| {
            let dict = dict.borrow();
            Value::list(dict.entries().iter().map(|(k, _)| k.clone()).collect())
        }),
        ("values", ValueData::Dict(dict)) => expect_arity(name, arguments, 0..=0).map(|_| {
            let dict = dict.borrow();
            Value::list(dict.entries().iter().map(|(_, v)| v.clone()).collect())
        }),
        _ => return None,
    };
    Some(result)
}
