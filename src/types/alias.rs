use super::TypeSignatureId;
use crate::string::Name;
use std::collections::HashMap;

/// Resolves locally bound type names before falling back to the shared pool.
pub trait AliasResolver {
    fn resolve_alias(&self, name: &str) -> Option<TypeSignatureId>;
}

/// Scope-local alias table. Aliases point into the shared signature pool but
/// are only visible from the scope that declared them and its descendants.
#[derive(Debug, Clone, Default)]
pub struct ScopeTypes {
    aliases: HashMap<Name, TypeSignatureId>,
}

impl ScopeTypes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_alias(
        &mut self,
        name: Name,
        signature: TypeSignatureId,
    ) -> Option<TypeSignatureId> {
        self.aliases.insert(name, signature)
    }

    pub fn get_alias(&self, name: &str) -> Option<TypeSignatureId> {
        self.aliases.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    pub fn clear(&mut self) {
        self.aliases.clear();
    }
}

impl AliasResolver for ScopeTypes {
    fn resolve_alias(&self, name: &str) -> Option<TypeSignatureId> {
        self.get_alias(name)
    }
}
