use crate::statement::DeclFlags;
use crate::types::TypeSignatureId;
use crate::value::Value;

/// A variable slot: the stored value plus how it was declared.
#[derive(Debug, Clone)]
pub struct Binding {
    pub value: Value,
    pub is_const: bool,
    pub is_mutable: bool,
    pub is_static: bool,
    /// `INVALID` or the `Any` id leave the binding unchecked.
    pub declared_sig: TypeSignatureId,
}

impl Binding {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            is_const: false,
            is_mutable: false,
            is_static: false,
            declared_sig: TypeSignatureId::INVALID,
        }
    }

    pub fn declared(value: Value, flags: DeclFlags, declared_sig: TypeSignatureId) -> Self {
        Self {
            value,
            is_const: flags.is_const,
            is_mutable: flags.is_mutable,
            is_static: flags.is_static,
            declared_sig,
        }
    }

    pub fn constant(mut self) -> Self {
        self.is_const = true;
        self
    }

    pub fn mutable(mut self) -> Self {
        self.is_mutable = true;
        self
    }

    /// Readies `value` for this binding: copies it unless either side is
    /// mutable, and stamps the binding's flags onto its metadata.
    pub(super) fn prepare(&self, value: Value) -> Value {
        let mut value = if self.is_mutable {
            value
        } else {
            value.duplicate()
        };
        let meta = value.meta_mut();
        meta.is_const = self.is_const;
        meta.is_mutable = self.is_mutable || meta.is_mutable;
        meta.is_static = self.is_static;
        meta.declared_sig = self.declared_sig;
        value
    }

    /// Binding copy handed to a new owner, such as an instance or a
    /// detached scope.
    pub(super) fn duplicate(&self) -> Self {
        Self {
            value: self.value.duplicate(),
            ..self.clone()
        }
    }

    pub(super) fn deep_clone(&self) -> Self {
        Self {
            value: self.value.deep_clone(),
            ..self.clone()
        }
    }
}
