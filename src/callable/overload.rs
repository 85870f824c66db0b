use super::{bind_arguments, BindingFailure, BoundArguments, CallArguments, CallableSignature};
use crate::error::RuntimeErrorKind;
use crate::string::Name;
use crate::types::{MatchOptions, TypeSignatureManager};
use std::cmp::Reverse;

/// An overload set captured as a first-class value.
#[derive(Debug, Clone)]
pub struct OverloadSet {
    pub name: Name,
    pub signatures: Vec<CallableSignature>,
}

/// The winning overload together with its bound arguments.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub signature: CallableSignature,
    pub arguments: BoundArguments,
}

struct Candidate {
    // Typed overloads always outrank `def` fallbacks.
    typed: bool,
    score: u32,
    cost: u32,
    resolution: Resolution,
}

impl Candidate {
    fn rank(&self) -> (bool, u32, Reverse<u32>) {
        (self.typed, self.score, Reverse(self.cost))
    }
}

/// Picks the best overload of `name` for `arguments`.
///
/// Candidates that can't bind the arguments structurally are dropped, the
/// rest are scored by [`TypeSignatureManager::match_call`]. The highest score
/// wins and ties go to the lowest widening cost.
pub fn resolve_overload(
    name: &Name,
    candidates: &[CallableSignature],
    arguments: &CallArguments,
    manager: &mut TypeSignatureManager,
    options: &MatchOptions,
) -> Result<Resolution, RuntimeErrorKind> {
    if candidates.is_empty() {
        return Err(RuntimeErrorKind::FunctionNotFound(name.clone()));
    }

    let mut viable = Vec::new();
    let mut last_failure: Option<BindingFailure> = None;
    for candidate in candidates {
        let bound = match bind_arguments(candidate.parameters(), arguments) {
            Ok(bound) => bound,
            Err(failure) => {
                last_failure = Some(failure);
                continue;
            }
        };
        if candidate.is_def() {
            viable.push(Candidate {
                typed: false,
                score: 0,
                cost: 0,
                resolution: Resolution {
                    signature: candidate.clone(),
                    arguments: bound,
                },
            });
            continue;
        }
        let invocable = candidate.invocable(manager);
        let result = manager.match_call(invocable, &bound.shapes(), options);
        if result.ok {
            viable.push(Candidate {
                typed: true,
                score: result.score,
                cost: result.cost,
                resolution: Resolution {
                    signature: candidate.clone(),
                    arguments: bound,
                },
            });
        }
    }

    let Some(best) = viable.iter().map(Candidate::rank).max() else {
        return Err(match (candidates.len(), last_failure) {
            (1, Some(reason)) => RuntimeErrorKind::ArgumentBinding {
                callee: name.clone(),
                reason,
            },
            (count, _) => RuntimeErrorKind::NoMatchingOverload {
                name: name.clone(),
                candidates: count,
            },
        });
    };

    let mut winners: Vec<_> = viable
        .into_iter()
        .filter(|candidate| candidate.rank() == best)
        .collect();
    if winners.len() > 1 {
        return Err(RuntimeErrorKind::AmbiguousOverload {
            name: name.clone(),
            candidates: winners.len(),
        });
    }
    let winner = winners.remove(0);
    tracing::debug!(
        name = %name,
        score = winner.score,
        cost = winner.cost,
        typed = winner.typed,
        "resolved overload"
    );
    Ok(winner.resolution)
}
