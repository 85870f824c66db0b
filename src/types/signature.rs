use super::{PrimitiveType, TypeId, TypeRegistry};
use crate::value::{Value, ValueData};
use compact_str::{format_compact, CompactString, ToCompactString};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TypeSignatureId(u32);

impl TypeSignatureId {
    pub const INVALID: TypeSignatureId = TypeSignatureId(0);

    pub const fn is_valid(&self) -> bool {
        self.0 != 0
    }

    pub const fn to_usize(&self) -> usize {
        self.0 as usize
    }
}

/// Structural type descriptor. The derived `Hash`/`Eq` form the interning key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSignature {
    Any,
    Nominal(TypeId),
    Container {
        base: TypeId,
        arguments: Vec<TypeSignatureId>,
    },
    Union(Vec<TypeSignatureId>),
    Invocable(InvocableSignature),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InvocableSignature {
    pub parameters: Vec<TypeSignatureId>,
    pub enforced: Vec<bool>,
    pub return_type: TypeSignatureId,
    pub variadic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    pub allow_any: bool,
    pub allow_numeric_widening: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            allow_any: true,
            allow_numeric_widening: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    pub ok: bool,
    pub score: u32,
    pub cost: u32,
}

impl MatchResult {
    pub const SCORE_EXACT: u32 = 3;
    pub const SCORE_WIDENED: u32 = 2;
    pub const SCORE_ANY: u32 = 1;
    pub const SCORE_UNENFORCED: u32 = 1;

    pub const fn accept(score: u32, cost: u32) -> Self {
        Self {
            ok: true,
            score,
            cost,
        }
    }

    pub const fn reject() -> Self {
        Self {
            ok: false,
            score: 0,
            cost: 0,
        }
    }
}

/// How one parameter slot of a bound call is filled.
#[derive(Debug, Clone, Copy)]
pub enum ArgumentShape<'a> {
    Value(&'a Value),
    /// Left to the parameter's default.
    Omitted,
    /// Values collected by the trailing variadic parameter.
    Spread(&'a [Value]),
}

impl<'a> ArgumentShape<'a> {
    /// Lays out purely positional arguments over `parameter_count` slots.
    ///
    /// Returns `None` when the arity can't fit: too few arguments, or too many
    /// without a variadic tail.
    pub fn positional(
        values: &'a [Value],
        parameter_count: usize,
        variadic: bool,
    ) -> Option<Vec<ArgumentShape<'a>>> {
        if variadic {
            let fixed = parameter_count.checked_sub(1)?;
            if values.len() < fixed {
                return None;
            }
            let mut shapes: Vec<_> = values[..fixed].iter().map(ArgumentShape::Value).collect();
            shapes.push(ArgumentShape::Spread(&values[fixed..]));
            Some(shapes)
        } else if values.len() == parameter_count {
            Some(values.iter().map(ArgumentShape::Value).collect())
        } else {
            None
        }
    }
}

/// Interning pool of type signatures, shared by every scope of an interpreter.
#[derive(Debug, Clone)]
pub struct TypeSignatureManager {
    registry: TypeRegistry,
    pool: Vec<TypeSignature>,
    interned: HashMap<TypeSignature, TypeSignatureId>,
    any: TypeSignatureId,
}

impl TypeSignatureManager {
    pub fn new() -> Self {
        let mut manager = Self {
            registry: TypeRegistry::new(),
            // Slot 0 backs `TypeSignatureId::INVALID` and is never interned.
            pool: vec![TypeSignature::Any],
            interned: HashMap::new(),
            any: TypeSignatureId::INVALID,
        };
        manager.any = manager.intern(TypeSignature::Any);
        manager
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        &mut self.registry
    }

    pub fn any(&self) -> TypeSignatureId {
        self.any
    }

    pub fn is_any(&self, id: TypeSignatureId) -> bool {
        id == self.any
    }

    pub fn get(&self, id: TypeSignatureId) -> Option<&TypeSignature> {
        if !id.is_valid() {
            return None;
        }
        self.pool.get(id.to_usize())
    }

    pub fn len(&self) -> usize {
        self.pool.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn intern(&mut self, signature: TypeSignature) -> TypeSignatureId {
        let signature = self.normalize(signature);
        if let TypeSignature::Union(ref members) = signature {
            if members.len() == 1 {
                return members[0];
            }
        }
        if let Some(id) = self.interned.get(&signature) {
            return *id;
        }
        let id = TypeSignatureId(self.pool.len() as u32);
        self.pool.push(signature.clone());
        self.interned.insert(signature, id);
        id
    }

    // Unions are flattened, sorted and deduplicated so member order never
    // affects identity. A union containing `Any` collapses to `Any`.
    fn normalize(&self, signature: TypeSignature) -> TypeSignature {
        let TypeSignature::Union(members) = signature else {
            return signature;
        };
        let mut flat = Vec::with_capacity(members.len());
        for member in members {
            match self.get(member) {
                Some(TypeSignature::Union(inner)) => flat.extend(inner.iter().copied()),
                Some(TypeSignature::Any) => return TypeSignature::Any,
                _ => flat.push(member),
            }
        }
        flat.sort();
        flat.dedup();
        TypeSignature::Union(flat)
    }

    pub fn nominal(&mut self, base: TypeId) -> TypeSignatureId {
        self.intern(TypeSignature::Nominal(base))
    }

    pub fn primitive(&mut self, primitive: PrimitiveType) -> TypeSignatureId {
        self.nominal(primitive.type_id())
    }

    pub fn nominal_named(&mut self, name: &str) -> TypeSignatureId {
        let base = self.registry.get_or_declare(name);
        self.nominal(base)
    }

    pub fn container(&mut self, base: TypeId, arguments: Vec<TypeSignatureId>) -> TypeSignatureId {
        self.intern(TypeSignature::Container { base, arguments })
    }

    pub fn union(&mut self, members: Vec<TypeSignatureId>) -> TypeSignatureId {
        self.intern(TypeSignature::Union(members))
    }

    pub fn invocable(&mut self, signature: InvocableSignature) -> TypeSignatureId {
        self.intern(TypeSignature::Invocable(signature))
    }

    /// Signature of a runtime value. Containers get `Any` element types.
    pub fn infer_from_value(&mut self, value: &Value) -> TypeSignatureId {
        let base = value.type_id();
        match self
            .registry
            .as_primitive(base)
            .and_then(|p| p.container_arity())
        {
            Some(arity) => {
                let any = self.any;
                self.container(base, vec![any; arity])
            }
            None => self.nominal(base),
        }
    }

    pub fn match_value(
        &self,
        expected: TypeSignatureId,
        value: &Value,
        options: &MatchOptions,
    ) -> MatchResult {
        let Some(signature) = self.get(expected) else {
            return MatchResult::reject();
        };
        match signature {
            TypeSignature::Any => {
                if options.allow_any {
                    MatchResult::accept(MatchResult::SCORE_ANY, 0)
                } else {
                    MatchResult::reject()
                }
            }
            TypeSignature::Nominal(base) => self.match_nominal(*base, value, options),
            TypeSignature::Container { base, .. } => {
                if value.type_id() == *base {
                    MatchResult::accept(MatchResult::SCORE_EXACT, 0)
                } else {
                    MatchResult::reject()
                }
            }
            TypeSignature::Union(members) => members
                .iter()
                .map(|member| self.match_value(*member, value, options))
                .filter(|result| result.ok)
                .max_by(|lhs, rhs| lhs.score.cmp(&rhs.score).then(rhs.cost.cmp(&lhs.cost)))
                .unwrap_or(MatchResult::reject()),
            TypeSignature::Invocable(_) => match value.data() {
                ValueData::Callable(_) | ValueData::FunctionOverloadSet(_) => {
                    MatchResult::accept(MatchResult::SCORE_EXACT, 0)
                }
                _ => MatchResult::reject(),
            },
        }
    }

    fn match_nominal(&self, base: TypeId, value: &Value, options: &MatchOptions) -> MatchResult {
        let actual = value.type_id();
        if actual == base {
            return MatchResult::accept(MatchResult::SCORE_EXACT, 0);
        }
        if !options.allow_numeric_widening {
            return MatchResult::reject();
        }
        let expected_rank = self
            .registry
            .as_primitive(base)
            .and_then(|p| p.numeric_rank());
        let actual_rank = self
            .registry
            .as_primitive(actual)
            .and_then(|p| p.numeric_rank());
        match (actual_rank, expected_rank) {
            (Some(actual), Some(expected)) if actual < expected => {
                MatchResult::accept(MatchResult::SCORE_WIDENED, expected - actual)
            }
            _ => MatchResult::reject(),
        }
    }

    /// Scores a bound call against an invocable signature.
    ///
    /// `arguments` must hold one shape per parameter; a variadic signature
    /// expects its last shape to be a spread.
    pub fn match_call(
        &self,
        invocable: TypeSignatureId,
        arguments: &[ArgumentShape],
        options: &MatchOptions,
    ) -> MatchResult {
        let Some(TypeSignature::Invocable(signature)) = self.get(invocable) else {
            return MatchResult::reject();
        };
        if arguments.len() != signature.parameters.len() {
            return MatchResult::reject();
        }

        let mut score = 0;
        let mut cost = 0;
        for (index, argument) in arguments.iter().enumerate() {
            let is_tail = index + 1 == arguments.len();
            let parameter = signature.parameters[index];
            let enforced = signature.enforced.get(index).copied().unwrap_or(false);
            let values: &[Value] = match argument {
                ArgumentShape::Omitted => {
                    score += MatchResult::SCORE_UNENFORCED;
                    continue;
                }
                ArgumentShape::Value(value) => {
                    if signature.variadic && is_tail {
                        return MatchResult::reject();
                    }
                    std::slice::from_ref(*value)
                }
                ArgumentShape::Spread(values) => {
                    if !(signature.variadic && is_tail) {
                        return MatchResult::reject();
                    }
                    *values
                }
            };
            for value in values {
                if !enforced {
                    score += MatchResult::SCORE_UNENFORCED;
                    continue;
                }
                let result = self.match_value(parameter, value, options);
                if !result.ok {
                    return MatchResult::reject();
                }
                score += result.score;
                cost += result.cost;
            }
        }
        MatchResult::accept(score, cost)
    }

    pub fn display(&self, id: TypeSignatureId) -> CompactString {
        let Some(signature) = self.get(id) else {
            return "<invalid>".into();
        };
        match signature {
            TypeSignature::Any => "Any".into(),
            TypeSignature::Nominal(base) => self.display_type(*base),
            TypeSignature::Container { base, arguments } => {
                let arguments: Vec<_> = arguments.iter().map(|a| self.display(*a)).collect();
                format_compact!("{}[{}]", self.display_type(*base), arguments.join(", "))
            }
            TypeSignature::Union(members) => {
                let members: Vec<_> = members.iter().map(|m| self.display(*m)).collect();
                members.join(" | ").to_compact_string()
            }
            TypeSignature::Invocable(invocable) => {
                let mut parameters: Vec<_> = invocable
                    .parameters
                    .iter()
                    .map(|p| self.display(*p).to_string())
                    .collect();
                if invocable.variadic {
                    if let Some(last) = parameters.last_mut() {
                        last.insert_str(0, "...");
                    }
                }
                format_compact!(
                    "({}) -> {}",
                    parameters.join(", "),
                    self.display(invocable.return_type)
                )
            }
        }
    }

    fn display_type(&self, id: TypeId) -> CompactString {
        self.registry
            .name(id)
            .map(|name| name.to_compact_string())
            .unwrap_or_else(|| "<unknown>".into())
    }
}

impl Default for TypeSignatureManager {
    fn default() -> Self {
        Self::new()
    }
}
