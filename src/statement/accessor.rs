use super::{Statement, StatementNode};
use crate::expression::{Argument, ChainElement, ChainOrigin, Expression, ExpressionKind};

/// Rewrites a method body so that uses of the class accessor refer to the
/// instance the method is invoked on.
///
/// `self.a.b` becomes an instance-origin chain `a.b` and a bare `self`
/// becomes [`ExpressionKind::SelfReference`]. Nested function and class
/// definitions keep their own meaning of the accessor name.
pub fn strip_accessor(body: &mut [Statement], accessor: &str) {
    for statement in body {
        strip_statement(statement, accessor);
    }
}

fn strip_statement(statement: &mut Statement, accessor: &str) {
    match &mut statement.node {
        StatementNode::Expression(expression) | StatementNode::Throw(expression) => {
            strip_expression(expression, accessor)
        }
        StatementNode::VariableDecl(decl) => {
            if let Some(ref mut initial) = decl.initial {
                strip_expression(initial, accessor);
            }
        }
        StatementNode::Assignment { value, .. } => strip_expression(value, accessor),
        StatementNode::Block(body) => strip_accessor(body, accessor),
        StatementNode::If {
            branches,
            otherwise,
        } => {
            for branch in branches {
                strip_expression(&mut branch.condition, accessor);
                strip_accessor(&mut branch.body, accessor);
            }
            if let Some(otherwise) = otherwise {
                strip_accessor(otherwise, accessor);
            }
        }
        StatementNode::While { condition, body } => {
            strip_expression(condition, accessor);
            strip_accessor(body, accessor);
        }
        StatementNode::Return(Some(value)) => strip_expression(value, accessor),
        StatementNode::Return(None)
        | StatementNode::Break
        | StatementNode::Continue
        | StatementNode::TypeAlias { .. }
        | StatementNode::FunctionDecl(_)
        | StatementNode::ClassDecl(_) => {}
    }
}

fn strip_arguments(arguments: &mut [Argument], accessor: &str) {
    for argument in arguments {
        strip_expression(&mut argument.value, accessor);
    }
}

fn strip_expression(expression: &mut Expression, accessor: &str) {
    match &mut expression.kind {
        ExpressionKind::Literal(_) | ExpressionKind::SelfReference => {}
        ExpressionKind::Variable(name) => {
            if name == accessor {
                expression.kind = ExpressionKind::SelfReference;
            }
        }
        ExpressionKind::List(items) | ExpressionKind::Array(items) | ExpressionKind::Set(items) => {
            for item in items {
                strip_expression(item, accessor);
            }
        }
        ExpressionKind::Dict(entries) => {
            for (key, value) in entries {
                strip_expression(key, accessor);
                strip_expression(value, accessor);
            }
        }
        ExpressionKind::Unary { rhs, .. } => strip_expression(rhs, accessor),
        ExpressionKind::Binary { lhs, rhs, .. } | ExpressionKind::Logical { lhs, rhs, .. } => {
            strip_expression(lhs, accessor);
            strip_expression(rhs, accessor);
        }
        ExpressionKind::Call { arguments, .. } => strip_arguments(arguments, accessor),
        ExpressionKind::CallValue { callee, arguments } => {
            strip_expression(callee, accessor);
            strip_arguments(arguments, accessor);
        }
        ExpressionKind::Chain(chain) => {
            for element in chain.elements.iter_mut() {
                match element {
                    ChainElement::Read(_) => {}
                    ChainElement::Assign { value, .. } => strip_expression(value, accessor),
                    ChainElement::Declare(decl) => {
                        if let Some(ref mut initial) = decl.initial {
                            strip_expression(initial, accessor);
                        }
                    }
                    ChainElement::Call { arguments, .. } => strip_arguments(arguments, accessor),
                }
            }
            let leads_with_accessor = chain.origin == ChainOrigin::Scope
                && matches!(
                    chain.elements.first(),
                    Some(ChainElement::Read(name)) if name == accessor
                );
            if leads_with_accessor {
                chain.elements.remove(0);
                chain.origin = ChainOrigin::Instance;
                if chain.elements.is_empty() {
                    expression.kind = ExpressionKind::SelfReference;
                }
            }
        }
    }
}
