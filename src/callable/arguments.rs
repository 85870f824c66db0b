use super::ParameterSpec;
use crate::string::Name;
use crate::types::ArgumentShape;
use crate::value::Value;
use thiserror::Error;

/// Evaluated call arguments, before they are matched to any parameter list.
#[derive(Debug, Clone, Default)]
pub struct CallArguments {
    pub positional: Vec<Value>,
    pub named: Vec<(Name, Value)>,
}

impl CallArguments {
    pub fn positional(values: Vec<Value>) -> Self {
        Self {
            positional: values,
            named: Vec::new(),
        }
    }

    pub fn with_named(mut self, name: &str, value: Value) -> Self {
        self.named.push((name.into(), value));
        self
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BindingFailure {
    #[error("expected at most {expected} arguments but got {actual}")]
    TooManyArguments { expected: usize, actual: usize },
    #[error("missing argument for parameter `{0}`")]
    MissingArgument(Name),
    #[error("no parameter named `{0}`")]
    UnknownParameter(Name),
    #[error("parameter `{0}` is given more than once")]
    DuplicateArgument(Name),
    #[error("variadic parameter `{0}` can't be passed by name")]
    VariadicByName(Name),
}

/// How a single parameter is filled for one call.
#[derive(Debug, Clone)]
pub enum BoundSlot {
    Value(Value),
    /// Evaluated from the parameter's default inside the call scope.
    Omitted,
    Spread(Vec<Value>),
}

/// One slot per parameter, in declaration order.
#[derive(Debug, Clone)]
pub struct BoundArguments {
    pub slots: Vec<BoundSlot>,
}

impl BoundArguments {
    pub fn shapes(&self) -> Vec<ArgumentShape<'_>> {
        self.slots
            .iter()
            .map(|slot| match slot {
                BoundSlot::Value(value) => ArgumentShape::Value(value),
                BoundSlot::Omitted => ArgumentShape::Omitted,
                BoundSlot::Spread(values) => ArgumentShape::Spread(values),
            })
            .collect()
    }
}

/// Structurally binds call arguments to a parameter list.
///
/// Positional arguments fill fixed parameters in order, extra positional
/// arguments go to a trailing variadic parameter, named arguments fill the
/// parameter of the same name, and anything left uses its default.
pub fn bind_arguments(
    parameters: &[ParameterSpec],
    arguments: &CallArguments,
) -> Result<BoundArguments, BindingFailure> {
    let variadic = parameters.last().is_some_and(|p| p.variadic);
    let fixed = if variadic {
        parameters.len() - 1
    } else {
        parameters.len()
    };

    let mut slots: Vec<Option<BoundSlot>> = vec![None; parameters.len()];
    let mut spread = Vec::new();
    for (index, value) in arguments.positional.iter().enumerate() {
        if index < fixed {
            slots[index] = Some(BoundSlot::Value(value.clone()));
        } else if variadic {
            spread.push(value.clone());
        } else {
            return Err(BindingFailure::TooManyArguments {
                expected: fixed,
                actual: arguments.len(),
            });
        }
    }

    for (name, value) in arguments.named.iter() {
        let Some(index) = parameters.iter().position(|p| &p.name == name) else {
            return Err(BindingFailure::UnknownParameter(name.clone()));
        };
        if parameters[index].variadic {
            return Err(BindingFailure::VariadicByName(name.clone()));
        }
        if slots[index].is_some() {
            return Err(BindingFailure::DuplicateArgument(name.clone()));
        }
        slots[index] = Some(BoundSlot::Value(value.clone()));
    }

    if variadic {
        slots[fixed] = Some(BoundSlot::Spread(spread));
    }

    let slots = slots
        .into_iter()
        .zip(parameters)
        .map(|(slot, parameter)| match slot {
            Some(slot) => Ok(slot),
            None if parameter.default.is_some() => Ok(BoundSlot::Omitted),
            None => Err(BindingFailure::MissingArgument(parameter.name.clone())),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(BoundArguments { slots })
}
