use super::{AliasResolver, InvocableSignature, TypeSignatureId, TypeSignatureManager};
use crate::string::Name;

/// A parsed type annotation, as handed over by the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeAnnotation {
    Any,
    Named {
        name: Name,
        arguments: Vec<TypeAnnotation>,
    },
    Union(Vec<TypeAnnotation>),
    Invocable {
        parameters: Vec<TypeAnnotation>,
        return_type: Box<TypeAnnotation>,
        variadic: bool,
    },
}

impl TypeAnnotation {
    pub fn named(name: &str) -> Self {
        TypeAnnotation::Named {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    pub fn generic(name: &str, arguments: Vec<TypeAnnotation>) -> Self {
        TypeAnnotation::Named {
            name: name.into(),
            arguments,
        }
    }

    pub fn is_any(&self) -> bool {
        match self {
            TypeAnnotation::Any => true,
            TypeAnnotation::Named { name, arguments } => name == "Any" && arguments.is_empty(),
            _ => false,
        }
    }
}

/// Turns an annotation tree into an interned signature.
///
/// Local aliases win over nominal names; unknown names are forward-declared
/// in the type registry.
pub fn bind_resolved_type(
    annotation: &TypeAnnotation,
    aliases: &dyn AliasResolver,
    manager: &mut TypeSignatureManager,
) -> TypeSignatureId {
    match annotation {
        TypeAnnotation::Any => manager.any(),
        TypeAnnotation::Named { name, arguments } => {
            if name == "Any" {
                return manager.any();
            }
            if arguments.is_empty() {
                if let Some(alias) = aliases.resolve_alias(name) {
                    return alias;
                }
            }
            let base = manager.registry_mut().get_or_declare(name);
            let default_arity = manager
                .registry()
                .as_primitive(base)
                .and_then(|primitive| primitive.container_arity());
            if arguments.is_empty() {
                match default_arity {
                    Some(arity) => {
                        let any = manager.any();
                        manager.container(base, vec![any; arity])
                    }
                    None => manager.nominal(base),
                }
            } else {
                let arguments = arguments
                    .iter()
                    .map(|argument| bind_resolved_type(argument, aliases, manager))
                    .collect();
                manager.container(base, arguments)
            }
        }
        TypeAnnotation::Union(members) => {
            let members = members
                .iter()
                .map(|member| bind_resolved_type(member, aliases, manager))
                .collect();
            manager.union(members)
        }
        TypeAnnotation::Invocable {
            parameters,
            return_type,
            variadic,
        } => {
            let enforced = parameters.iter().map(|p| !p.is_any()).collect();
            let parameters = parameters
                .iter()
                .map(|parameter| bind_resolved_type(parameter, aliases, manager))
                .collect();
            let return_type = bind_resolved_type(return_type, aliases, manager);
            manager.invocable(InvocableSignature {
                parameters,
                enforced,
                return_type,
                variadic: *variadic,
            })
        }
    }
}
