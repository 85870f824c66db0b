pub mod formatter;
pub mod intrinsics;
mod ops;

use crate::callable::{Callable, ClassInstance, OverloadSet};
use crate::string::Name;
use crate::types::{PrimitiveType, TypeId, TypeSignatureId};
use compact_str::CompactString;
use std::cell::RefCell;
use std::rc::Rc;

pub use ops::Numeric;

pub type SharedList = Rc<RefCell<Vec<Value>>>;
pub type SharedDict = Rc<RefCell<Dict>>;
pub type SharedSet = Rc<RefCell<ValueSet>>;

/// The runtime tag of a [`Value`]. Always derived from the payload, so the
/// tag and the payload can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Long,
    Float,
    Double,
    Char,
    String,
    List,
    Dict,
    Set,
    Array,
    Callable,
    ClassInstance,
    FunctionOverloadSet,
}

#[derive(Debug, Clone)]
pub enum ValueData {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    String(CompactString),
    List(SharedList),
    Dict(SharedDict),
    Set(SharedSet),
    Array(SharedList),
    Callable(Callable),
    Instance(Rc<ClassInstance>),
    FunctionOverloadSet(Rc<OverloadSet>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueMeta {
    pub is_const: bool,
    pub is_mutable: bool,
    pub is_static: bool,
    pub declared_sig: TypeSignatureId,
    pub inferred_sig: TypeSignatureId,
    pub display_name: Option<Name>,
}

/// A runtime datum: a tagged payload plus its declaration metadata.
///
/// `Clone` is cheap and shares container and instance handles. Use
/// [`Value::duplicate`] when a binding must not alias its source.
#[derive(Debug, Clone)]
pub struct Value {
    data: ValueData,
    meta: ValueMeta,
}

/// Insertion-ordered dictionary keyed by value equality.
#[derive(Debug, Clone, Default)]
pub struct Dict {
    entries: Vec<(Value, Value)>,
}

impl Dict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.loose_eq(key))
            .map(|(_, v)| v)
    }

    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        match self.entries.iter_mut().find(|(k, _)| k.loose_eq(&key)) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        let index = self.entries.iter().position(|(k, _)| k.loose_eq(key))?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.get(key).is_some()
    }

    pub fn entries(&self) -> &[(Value, Value)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Insertion-ordered set keyed by value equality.
#[derive(Debug, Clone, Default)]
pub struct ValueSet {
    items: Vec<Value>,
}

impl ValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: Value) -> bool {
        if self.contains(&value) {
            false
        } else {
            self.items.push(value);
            true
        }
    }

    pub fn remove(&mut self, value: &Value) -> bool {
        match self.items.iter().position(|item| item.loose_eq(value)) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.items.iter().any(|item| item.loose_eq(value))
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

// Constructors
impl Value {
    pub fn new(data: ValueData) -> Self {
        Self {
            data,
            meta: ValueMeta::default(),
        }
    }

    pub fn null() -> Self {
        Self::new(ValueData::Null)
    }

    pub fn bool(value: bool) -> Self {
        Self::new(ValueData::Bool(value))
    }

    pub fn int(value: i32) -> Self {
        Self::new(ValueData::Int(value))
    }

    pub fn long(value: i64) -> Self {
        Self::new(ValueData::Long(value))
    }

    pub fn float(value: f32) -> Self {
        Self::new(ValueData::Float(value))
    }

    pub fn double(value: f64) -> Self {
        Self::new(ValueData::Double(value))
    }

    pub fn char(value: char) -> Self {
        Self::new(ValueData::Char(value))
    }

    pub fn string(value: &str) -> Self {
        Self::new(ValueData::String(value.into()))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Self::new(ValueData::List(Rc::new(RefCell::new(items))))
    }

    pub fn array(items: Vec<Value>) -> Self {
        Self::new(ValueData::Array(Rc::new(RefCell::new(items))))
    }

    pub fn dict(entries: Vec<(Value, Value)>) -> Self {
        let mut dict = Dict::new();
        for (key, value) in entries {
            dict.insert(key, value);
        }
        Self::new(ValueData::Dict(Rc::new(RefCell::new(dict))))
    }

    pub fn set(items: Vec<Value>) -> Self {
        let mut set = ValueSet::new();
        for item in items {
            set.insert(item);
        }
        Self::new(ValueData::Set(Rc::new(RefCell::new(set))))
    }

    pub fn callable(callable: Callable) -> Self {
        Self::new(ValueData::Callable(callable))
    }

    pub fn instance(instance: Rc<ClassInstance>) -> Self {
        Self::new(ValueData::Instance(instance))
    }

    pub fn overload_set(set: Rc<OverloadSet>) -> Self {
        Self::new(ValueData::FunctionOverloadSet(set))
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::null()
    }
}

// Accessors
impl Value {
    pub fn data(&self) -> &ValueData {
        &self.data
    }

    pub fn meta(&self) -> &ValueMeta {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut ValueMeta {
        &mut self.meta
    }

    pub fn kind(&self) -> ValueKind {
        match self.data {
            ValueData::Null => ValueKind::Null,
            ValueData::Bool(_) => ValueKind::Bool,
            ValueData::Int(_) => ValueKind::Int,
            ValueData::Long(_) => ValueKind::Long,
            ValueData::Float(_) => ValueKind::Float,
            ValueData::Double(_) => ValueKind::Double,
            ValueData::Char(_) => ValueKind::Char,
            ValueData::String(_) => ValueKind::String,
            ValueData::List(_) => ValueKind::List,
            ValueData::Dict(_) => ValueKind::Dict,
            ValueData::Set(_) => ValueKind::Set,
            ValueData::Array(_) => ValueKind::Array,
            ValueData::Callable(_) => ValueKind::Callable,
            ValueData::Instance(_) => ValueKind::ClassInstance,
            ValueData::FunctionOverloadSet(_) => ValueKind::FunctionOverloadSet,
        }
    }

    /// Nominal type of the payload. Instances report their class.
    pub fn type_id(&self) -> TypeId {
        let primitive = match &self.data {
            ValueData::Null => PrimitiveType::Null,
            ValueData::Bool(_) => PrimitiveType::Bool,
            ValueData::Int(_) => PrimitiveType::Int,
            ValueData::Long(_) => PrimitiveType::Long,
            ValueData::Float(_) => PrimitiveType::Float,
            ValueData::Double(_) => PrimitiveType::Double,
            ValueData::Char(_) => PrimitiveType::Char,
            ValueData::String(_) => PrimitiveType::String,
            ValueData::List(_) => PrimitiveType::List,
            ValueData::Dict(_) => PrimitiveType::Dict,
            ValueData::Set(_) => PrimitiveType::Set,
            ValueData::Array(_) => PrimitiveType::Array,
            ValueData::Callable(Callable::Class(_)) => PrimitiveType::Class,
            ValueData::Callable(_) | ValueData::FunctionOverloadSet(_) => PrimitiveType::Function,
            ValueData::Instance(instance) => return instance.class().type_id(),
        };
        primitive.type_id()
    }

    pub fn type_name(&self) -> CompactString {
        match &self.data {
            ValueData::Instance(instance) => instance.class().name().clone(),
            _ => format!("{:?}", self.kind()).into(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.data, ValueData::Null)
    }

    pub fn is_instance(&self) -> bool {
        matches!(self.data, ValueData::Instance(_))
    }

    pub fn is_callable(&self) -> bool {
        matches!(
            self.data,
            ValueData::Callable(_) | ValueData::FunctionOverloadSet(_)
        )
    }

    pub fn as_instance(&self) -> Option<&Rc<ClassInstance>> {
        match &self.data {
            ValueData::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.data {
            ValueData::Int(v) => Some(v as i64),
            ValueData::Long(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.data {
            ValueData::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match &self.data {
            ValueData::Null => false,
            ValueData::Bool(v) => *v,
            ValueData::Int(v) => *v != 0,
            ValueData::Long(v) => *v != 0,
            ValueData::Float(v) => *v != 0.0,
            ValueData::Double(v) => *v != 0.0,
            ValueData::Char(_) => true,
            ValueData::String(v) => !v.is_empty(),
            ValueData::List(v) | ValueData::Array(v) => !v.borrow().is_empty(),
            ValueData::Dict(v) => !v.borrow().is_empty(),
            ValueData::Set(v) => !v.borrow().is_empty(),
            ValueData::Callable(_) | ValueData::Instance(_) | ValueData::FunctionOverloadSet(_) => {
                true
            }
        }
    }
}

// Copy semantics
impl Value {
    /// Copy used when the value is stored into a binding.
    ///
    /// Mutable values keep sharing their payload; everything else gets an
    /// independent copy of containers and instances.
    pub fn duplicate(&self) -> Value {
        if self.meta.is_mutable {
            self.clone()
        } else {
            self.deep_clone()
        }
    }

    /// Copies container and instance payloads regardless of mutability.
    pub fn deep_clone(&self) -> Value {
        let data = match &self.data {
            ValueData::List(items) => ValueData::List(Rc::new(RefCell::new(
                items.borrow().iter().map(Value::deep_clone).collect(),
            ))),
            ValueData::Array(items) => ValueData::Array(Rc::new(RefCell::new(
                items.borrow().iter().map(Value::deep_clone).collect(),
            ))),
            ValueData::Dict(dict) => {
                let entries = dict
                    .borrow()
                    .entries()
                    .iter()
                    .map(|(k, v)| (k.deep_clone(), v.deep_clone()))
                    .collect();
                ValueData::Dict(Rc::new(RefCell::new(Dict { entries })))
            }
            ValueData::Set(set) => {
                let items = set.borrow().items().iter().map(Value::deep_clone).collect();
                ValueData::Set(Rc::new(RefCell::new(ValueSet { items })))
            }
            ValueData::Instance(instance) => ValueData::Instance(instance.duplicate()),
            other => other.clone(),
        };
        Value {
            data,
            meta: self.meta.clone(),
        }
    }
}

/// Strict value equality: same kind and structurally equal payloads.
/// Instances and callables compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (&self.data, &other.data) {
            (ValueData::Null, ValueData::Null) => true,
            (ValueData::Bool(lhs), ValueData::Bool(rhs)) => lhs == rhs,
            (ValueData::Int(lhs), ValueData::Int(rhs)) => lhs == rhs,
            (ValueData::Long(lhs), ValueData::Long(rhs)) => lhs == rhs,
            (ValueData::Float(lhs), ValueData::Float(rhs)) => lhs == rhs,
            (ValueData::Double(lhs), ValueData::Double(rhs)) => lhs == rhs,
            (ValueData::Char(lhs), ValueData::Char(rhs)) => lhs == rhs,
            (ValueData::String(lhs), ValueData::String(rhs)) => lhs == rhs,
            (ValueData::List(lhs), ValueData::List(rhs))
            | (ValueData::Array(lhs), ValueData::Array(rhs)) => {
                Rc::ptr_eq(lhs, rhs) || *lhs.borrow() == *rhs.borrow()
            }
            (ValueData::Dict(lhs), ValueData::Dict(rhs)) => {
                Rc::ptr_eq(lhs, rhs) || lhs.borrow().entries == rhs.borrow().entries
            }
            (ValueData::Set(lhs), ValueData::Set(rhs)) => {
                Rc::ptr_eq(lhs, rhs) || {
                    let (lhs, rhs) = (lhs.borrow(), rhs.borrow());
                    lhs.len() == rhs.len() && lhs.items.iter().all(|item| rhs.items.contains(item))
                }
            }
            (ValueData::Callable(lhs), ValueData::Callable(rhs)) => lhs.ptr_eq(rhs),
            (ValueData::Instance(lhs), ValueData::Instance(rhs)) => Rc::ptr_eq(lhs, rhs),
            (ValueData::FunctionOverloadSet(lhs), ValueData::FunctionOverloadSet(rhs)) => {
                Rc::ptr_eq(lhs, rhs)
            }
            _ => false,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn join(f: &mut std::fmt::Formatter<'_>, items: &[Value]) -> std::fmt::Result {
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    write!(f, ", ")?;
                }
                item.fmt_nested(f)?;
            }
            Ok(())
        }

        match &self.data {
            ValueData::Null => write!(f, "null"),
            ValueData::Bool(v) => write!(f, "{v}"),
            ValueData::Int(v) => write!(f, "{v}"),
            ValueData::Long(v) => write!(f, "{v}"),
            ValueData::Float(v) => write!(f, "{v}"),
            ValueData::Double(v) => write!(f, "{v}"),
            ValueData::Char(v) => write!(f, "{v}"),
            ValueData::String(v) => write!(f, "{v}"),
            ValueData::List(items) | ValueData::Array(items) => {
                write!(f, "[")?;
                join(f, &items.borrow())?;
                write!(f, "]")
            }
            ValueData::Set(set) => {
                write!(f, "{{")?;
                join(f, set.borrow().items())?;
                write!(f, "}}")
            }
            ValueData::Dict(dict) => {
                write!(f, "{{")?;
                for (index, (key, value)) in dict.borrow().entries().iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    key.fmt_nested(f)?;
                    write!(f, ": ")?;
                    value.fmt_nested(f)?;
                }
                write!(f, "}}")
            }
            ValueData::Callable(callable) => write!(f, "{callable}"),
            ValueData::Instance(instance) => write!(f, "<{} instance>", instance.class().name()),
            ValueData::FunctionOverloadSet(set) => {
                write!(f, "<fn {} ({} overloads)>", set.name, set.signatures.len())
            }
        }
    }
}

impl Value {
    fn fmt_nested(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.data {
            ValueData::String(v) => write!(f, "\"{v}\""),
            ValueData::Char(v) => write!(f, "'{v}'"),
            _ => write!(f, "{self}"),
        }
    }
}
