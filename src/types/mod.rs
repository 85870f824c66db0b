//! Nominal type identities and structural type signatures.
//!
//! [`TypeRegistry`] hands out one [`TypeId`] per type name. The
//! [`TypeSignatureManager`] owns the registry and interns structural
//! [`TypeSignature`]s built on top of those ids, so two structurally equal
//! annotations always resolve to the same [`TypeSignatureId`].

pub mod alias;
pub mod annotation;
pub mod signature;

pub use alias::{AliasResolver, ScopeTypes};
pub use annotation::{bind_resolved_type, TypeAnnotation};
pub use signature::{
    ArgumentShape, InvocableSignature, MatchOptions, MatchResult, TypeSignature, TypeSignatureId,
    TypeSignatureManager,
};

use crate::string::Name;
use compact_str::ToCompactString;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    pub const INVALID: TypeId = TypeId(0);

    pub const fn is_valid(&self) -> bool {
        self.0 != 0
    }

    pub const fn to_usize(&self) -> usize {
        self.0 as usize
    }
}

/// Built-in nominal types. Their ids are fixed: `PrimitiveType as u32 + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
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
    Function,
    Class,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 14] = [
        PrimitiveType::Null,
        PrimitiveType::Bool,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
        PrimitiveType::Char,
        PrimitiveType::String,
        PrimitiveType::List,
        PrimitiveType::Dict,
        PrimitiveType::Set,
        PrimitiveType::Array,
        PrimitiveType::Function,
        PrimitiveType::Class,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveType::Null => "Null",
            PrimitiveType::Bool => "Bool",
            PrimitiveType::Int => "Int",
            PrimitiveType::Long => "Long",
            PrimitiveType::Float => "Float",
            PrimitiveType::Double => "Double",
            PrimitiveType::Char => "Char",
            PrimitiveType::String => "String",
            PrimitiveType::List => "List",
            PrimitiveType::Dict => "Dict",
            PrimitiveType::Set => "Set",
            PrimitiveType::Array => "Array",
            PrimitiveType::Function => "Function",
            PrimitiveType::Class => "Class",
        }
    }

    pub const fn type_id(&self) -> TypeId {
        TypeId(*self as u32 + 1)
    }

    /// Position in the numeric widening order `Int < Long < Float < Double`.
    pub fn numeric_rank(&self) -> Option<u32> {
        match self {
            PrimitiveType::Int => Some(0),
            PrimitiveType::Long => Some(1),
            PrimitiveType::Float => Some(2),
            PrimitiveType::Double => Some(3),
            _ => None,
        }
    }

    /// Number of element arguments a bare container annotation defaults to.
    pub fn container_arity(&self) -> Option<usize> {
        match self {
            PrimitiveType::List | PrimitiveType::Set | PrimitiveType::Array => Some(1),
            PrimitiveType::Dict => Some(2),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypeRegistry {
    names: Vec<Name>,
    ids: HashMap<Name, TypeId>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            // Slot 0 backs `TypeId::INVALID`.
            names: vec![Name::default()],
            ids: HashMap::new(),
        };
        for primitive in PrimitiveType::ALL {
            let id = registry.get_or_declare(primitive.name());
            debug_assert_eq!(id, primitive.type_id());
        }
        registry
    }

    /// Returns the id for `name`, forward-declaring it on first use.
    pub fn get_or_declare(&mut self, name: &str) -> TypeId {
        if let Some(id) = self.ids.get(name) {
            return *id;
        }
        let id = TypeId(self.names.len() as u32);
        self.names.push(name.to_compact_string());
        self.ids.insert(name.to_compact_string(), id);
        id
    }

    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.ids.get(name).copied()
    }

    pub fn name(&self, id: TypeId) -> Option<&str> {
        if !id.is_valid() {
            return None;
        }
        self.names.get(id.to_usize()).map(|name| name.as_str())
    }

    pub fn as_primitive(&self, id: TypeId) -> Option<PrimitiveType> {
        PrimitiveType::ALL
            .iter()
            .find(|primitive| primitive.type_id() == id)
            .copied()
    }

    pub fn len(&self) -> usize {
        self.names.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
