use super::{Value, ValueData};
use crate::error::RuntimeErrorKind;
use compact_str::{format_compact, CompactStringExt};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::ops::{BitAnd, BitOr, BitXor};
use std::rc::Rc;

/// A numeric payload, ordered by widening rank `Int < Long < Float < Double`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl Numeric {
    fn rank(&self) -> u8 {
        match self {
            Numeric::Int(_) => 0,
            Numeric::Long(_) => 1,
            Numeric::Float(_) => 2,
            Numeric::Double(_) => 3,
        }
    }

    fn widen(self, rank: u8) -> Numeric {
        match (self, rank) {
            (n, r) if n.rank() == r => n,
            (Numeric::Int(v), 1) => Numeric::Long(v as i64),
            (Numeric::Int(v), 2) => Numeric::Float(v as f32),
            (Numeric::Int(v), _) => Numeric::Double(v as f64),
            (Numeric::Long(v), 2) => Numeric::Float(v as f32),
            (Numeric::Long(v), _) => Numeric::Double(v as f64),
            (Numeric::Float(v), _) => Numeric::Double(v as f64),
            (n, _) => n,
        }
    }

    fn unify(lhs: Numeric, rhs: Numeric) -> (Numeric, Numeric) {
        let rank = lhs.rank().max(rhs.rank());
        (lhs.widen(rank), rhs.widen(rank))
    }

    fn into_value(self) -> Value {
        match self {
            Numeric::Int(v) => Value::int(v),
            Numeric::Long(v) => Value::long(v),
            Numeric::Float(v) => Value::float(v),
            Numeric::Double(v) => Value::double(v),
        }
    }
}

/// Longest string `String * Int` may produce.
pub const MAX_REPEAT_LEN: usize = 1 << 24;

/// A negative count repeats zero times.
fn repeat(text: &str, count: i64) -> Result<Value, RuntimeErrorKind> {
    let count = usize::try_from(count).unwrap_or(0);
    match text.len().checked_mul(count) {
        Some(len) if len <= MAX_REPEAT_LEN => {
            Ok(Value::new(ValueData::String(text.repeat(count).into())))
        }
        _ => Err(RuntimeErrorKind::InvalidVirtualArgument {
            operation: "*".into(),
            reason: format_compact!("repeating {} characters {count} times", text.len()),
        }),
    }
}

fn unsupported(operator: &str, operands: &[&Value]) -> RuntimeErrorKind {
    let operands: Vec<_> = operands.iter().map(|v| v.type_name()).collect();
    RuntimeErrorKind::UnsupportedOperator {
        operator: operator.into(),
        operands: operands.join(", ").into(),
    }
}

macro_rules! integer_op {
    ($name:ident, $symbol:literal, $op:ident) => {
        pub fn $name(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
            match (self.numeric(), other.numeric()) {
                (Some(lhs), Some(rhs)) => match Numeric::unify(lhs, rhs) {
                    (Numeric::Int(lhs), Numeric::Int(rhs)) => Ok(Value::int(lhs.$op(rhs))),
                    (Numeric::Long(lhs), Numeric::Long(rhs)) => Ok(Value::long(lhs.$op(rhs))),
                    _ => Err(unsupported($symbol, &[self, other])),
                },
                _ => Err(unsupported($symbol, &[self, other])),
            }
        }
    };
}

// Unary operators
impl Value {
    pub fn numeric(&self) -> Option<Numeric> {
        match self.data {
            ValueData::Int(v) => Some(Numeric::Int(v)),
            ValueData::Long(v) => Some(Numeric::Long(v)),
            ValueData::Float(v) => Some(Numeric::Float(v)),
            ValueData::Double(v) => Some(Numeric::Double(v)),
            _ => None,
        }
    }

    pub fn logical_not(&self) -> bool {
        !self.is_truthy()
    }

    pub fn numeric_negate(&self) -> Result<Value, RuntimeErrorKind> {
        match self.numeric() {
            Some(Numeric::Int(v)) => Ok(Value::int(v.wrapping_neg())),
            Some(Numeric::Long(v)) => Ok(Value::long(v.wrapping_neg())),
            Some(Numeric::Float(v)) => Ok(Value::float(-v)),
            Some(Numeric::Double(v)) => Ok(Value::double(-v)),
            None => Err(unsupported("-", &[self])),
        }
    }

    pub fn bitwise_not(&self) -> Result<Value, RuntimeErrorKind> {
        match self.data {
            ValueData::Int(v) => Ok(Value::int(!v)),
            ValueData::Long(v) => Ok(Value::long(!v)),
            _ => Err(unsupported("~", &[self])),
        }
    }
}

// Arithmetic, concatenation and bitwise operators
impl Value {
    pub fn add(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        if let (Some(lhs), Some(rhs)) = (self.numeric(), other.numeric()) {
            let result = match Numeric::unify(lhs, rhs) {
                (Numeric::Int(lhs), Numeric::Int(rhs)) => Numeric::Int(lhs.wrapping_add(rhs)),
                (Numeric::Long(lhs), Numeric::Long(rhs)) => Numeric::Long(lhs.wrapping_add(rhs)),
                (Numeric::Float(lhs), Numeric::Float(rhs)) => Numeric::Float(lhs + rhs),
                (Numeric::Double(lhs), Numeric::Double(rhs)) => Numeric::Double(lhs + rhs),
                _ => unreachable!("unified operands share a rank"),
            };
            return Ok(result.into_value());
        }
        match (&self.data, &other.data) {
            (ValueData::String(lhs), ValueData::String(rhs)) => {
                Ok(Value::new(ValueData::String([lhs, rhs].concat_compact())))
            }
            (ValueData::String(lhs), ValueData::Char(rhs)) => {
                Ok(Value::new(ValueData::String(format_compact!("{lhs}{rhs}"))))
            }
            (ValueData::Char(lhs), ValueData::String(rhs)) => {
                Ok(Value::new(ValueData::String(format_compact!("{lhs}{rhs}"))))
            }
            (ValueData::Char(lhs), ValueData::Char(rhs)) => {
                Ok(Value::new(ValueData::String(format_compact!("{lhs}{rhs}"))))
            }
            (ValueData::List(lhs), ValueData::List(rhs)) => {
                let mut items = lhs.borrow().clone();
                items.extend(rhs.borrow().iter().cloned());
                Ok(Value::new(ValueData::List(Rc::new(RefCell::new(items)))))
            }
            _ => Err(unsupported("+", &[self, other])),
        }
    }

    pub fn subtract(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        self.arithmetic(
            other,
            "-",
            i32::wrapping_sub,
            i64::wrapping_sub,
            |a, b| a - b,
            |a, b| a - b,
        )
    }

    pub fn multiply(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        if let (ValueData::String(text), Some(count)) = (&self.data, other.as_int()) {
            return repeat(text, count);
        }
        self.arithmetic(
            other,
            "*",
            i32::wrapping_mul,
            i64::wrapping_mul,
            |a, b| a * b,
            |a, b| a * b,
        )
    }

    pub fn divide(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        self.checked_integer_divisor(other, "/")?;
        self.arithmetic(
            other,
            "/",
            i32::wrapping_div,
            i64::wrapping_div,
            |a, b| a / b,
            |a, b| a / b,
        )
    }

    pub fn modulo(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        self.checked_integer_divisor(other, "%")?;
        self.arithmetic(
            other,
            "%",
            i32::wrapping_rem,
            i64::wrapping_rem,
            |a, b| a % b,
            |a, b| a % b,
        )
    }

    fn checked_integer_divisor(
        &self,
        other: &Value,
        operator: &str,
    ) -> Result<(), RuntimeErrorKind> {
        match (self.numeric(), other.numeric()) {
            (Some(lhs), Some(rhs)) => match Numeric::unify(lhs, rhs) {
                (_, Numeric::Int(0)) | (_, Numeric::Long(0)) => {
                    Err(RuntimeErrorKind::DivisionByZero)
                }
                _ => Ok(()),
            },
            _ => Err(unsupported(operator, &[self, other])),
        }
    }

    fn arithmetic(
        &self,
        other: &Value,
        operator: &str,
        int_op: fn(i32, i32) -> i32,
        long_op: fn(i64, i64) -> i64,
        float_op: fn(f32, f32) -> f32,
        double_op: fn(f64, f64) -> f64,
    ) -> Result<Value, RuntimeErrorKind> {
        let (Some(lhs), Some(rhs)) = (self.numeric(), other.numeric()) else {
            return Err(unsupported(operator, &[self, other]));
        };
        let result = match Numeric::unify(lhs, rhs) {
            (Numeric::Int(lhs), Numeric::Int(rhs)) => Numeric::Int(int_op(lhs, rhs)),
            (Numeric::Long(lhs), Numeric::Long(rhs)) => Numeric::Long(long_op(lhs, rhs)),
            (Numeric::Float(lhs), Numeric::Float(rhs)) => Numeric::Float(float_op(lhs, rhs)),
            (Numeric::Double(lhs), Numeric::Double(rhs)) => Numeric::Double(double_op(lhs, rhs)),
            _ => unreachable!("unified operands share a rank"),
        };
        Ok(result.into_value())
    }

    integer_op!(bitwise_and, "&", bitand);
    integer_op!(bitwise_or, "|", bitor);
    integer_op!(bitwise_xor, "^", bitxor);

    pub fn shift_left(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        match (&self.data, other.as_int()) {
            (ValueData::Int(v), Some(shift)) => Ok(Value::int(v.wrapping_shl(shift as u32))),
            (ValueData::Long(v), Some(shift)) => Ok(Value::long(v.wrapping_shl(shift as u32))),
            _ => Err(unsupported("<<", &[self, other])),
        }
    }

    pub fn shift_right(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        match (&self.data, other.as_int()) {
            (ValueData::Int(v), Some(shift)) => Ok(Value::int(v.wrapping_shr(shift as u32))),
            (ValueData::Long(v), Some(shift)) => Ok(Value::long(v.wrapping_shr(shift as u32))),
            _ => Err(unsupported(">>", &[self, other])),
        }
    }
}

// Comparison and equality
impl Value {
    pub fn compare(&self, other: &Value, operator: &str) -> Result<Ordering, RuntimeErrorKind> {
        let ordering = match (self.numeric(), other.numeric()) {
            (Some(lhs), Some(rhs)) => match Numeric::unify(lhs, rhs) {
                (Numeric::Int(lhs), Numeric::Int(rhs)) => lhs.partial_cmp(&rhs),
                (Numeric::Long(lhs), Numeric::Long(rhs)) => lhs.partial_cmp(&rhs),
                (Numeric::Float(lhs), Numeric::Float(rhs)) => lhs.partial_cmp(&rhs),
                (Numeric::Double(lhs), Numeric::Double(rhs)) => lhs.partial_cmp(&rhs),
                _ => None,
            },
            _ => match (&self.data, &other.data) {
                (ValueData::String(lhs), ValueData::String(rhs)) => lhs.partial_cmp(rhs),
                (ValueData::Char(lhs), ValueData::Char(rhs)) => lhs.partial_cmp(rhs),
                (ValueData::Bool(lhs), ValueData::Bool(rhs)) => lhs.partial_cmp(rhs),
                _ => None,
            },
        };
        ordering.ok_or_else(|| unsupported(operator, &[self, other]))
    }

    pub fn less_than(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        Ok(Value::bool(self.compare(other, "<")?.is_lt()))
    }

    pub fn less_than_or_equal(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        Ok(Value::bool(self.compare(other, "<=")?.is_le()))
    }

    pub fn greater_than(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        Ok(Value::bool(self.compare(other, ">")?.is_gt()))
    }

    pub fn greater_than_or_equal(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        Ok(Value::bool(self.compare(other, ">=")?.is_ge()))
    }

    /// Equality used by `==`: numbers compare across kinds after widening.
    pub fn loose_eq(&self, other: &Value) -> bool {
        if let (Some(lhs), Some(rhs)) = (self.numeric(), other.numeric()) {
            let (lhs, rhs) = Numeric::unify(lhs, rhs);
            return lhs == rhs;
        }
        match (&self.data, &other.data) {
            (ValueData::List(lhs), ValueData::List(rhs))
            | (ValueData::Array(lhs), ValueData::Array(rhs)) => {
                let (lhs, rhs) = (lhs.borrow(), rhs.borrow());
                lhs.len() == rhs.len() && lhs.iter().zip(rhs.iter()).all(|(a, b)| a.loose_eq(b))
            }
            (ValueData::Dict(lhs), ValueData::Dict(rhs)) => {
                let (lhs, rhs) = (lhs.borrow(), rhs.borrow());
                lhs.len() == rhs.len()
                    && lhs.entries().iter().all(|(key, value)| {
                        rhs.get(key).is_some_and(|other| value.loose_eq(other))
                    })
            }
            (ValueData::Set(lhs), ValueData::Set(rhs)) => {
                let (lhs, rhs) = (lhs.borrow(), rhs.borrow());
                lhs.len() == rhs.len() && lhs.items().iter().all(|item| rhs.contains(item))
            }
            _ => self == other,
        }
    }

    pub fn is_equal(&self, other: &Value) -> Value {
        Value::bool(self.loose_eq(other))
    }

    pub fn is_not_equal(&self, other: &Value) -> Value {
        Value::bool(!self.loose_eq(other))
    }
}
