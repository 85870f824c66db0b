use super::{FunctionDecl, FunctionKind, Statement, StatementNode};
use crate::expression::{Argument, ChainElement, ChainOrigin, Expression, ExpressionKind};
use crate::string::Name;
use std::collections::BTreeSet;

/// Names referenced by a body that it doesn't bind itself.
#[derive(Default)]
struct Collector {
    referenced: BTreeSet<Name>,
    bound: BTreeSet<Name>,
}

impl Collector {
    fn finish(self) -> BTreeSet<Name> {
        self.referenced
            .into_iter()
            .filter(|name| !self.bound.contains(name))
            .collect()
    }

    fn visit_block(&mut self, body: &[Statement]) {
        for statement in body {
            self.visit_statement(statement);
        }
    }

    fn visit_statement(&mut self, statement: &Statement) {
        match &statement.node {
            StatementNode::Expression(expression) | StatementNode::Throw(expression) => {
                self.visit_expression(expression)
            }
            StatementNode::VariableDecl(decl) => {
                if let Some(ref initial) = decl.initial {
                    self.visit_expression(initial);
                }
                self.bound.insert(decl.name.clone());
            }
            StatementNode::Assignment { name, value } => {
                self.referenced.insert(name.clone());
                self.visit_expression(value);
            }
            StatementNode::Block(body) => self.visit_block(body),
            StatementNode::If {
                branches,
                otherwise,
            } => {
                for branch in branches {
                    self.visit_expression(&branch.condition);
                    self.visit_block(&branch.body);
                }
                if let Some(otherwise) = otherwise {
                    self.visit_block(otherwise);
                }
            }
            StatementNode::While { condition, body } => {
                self.visit_expression(condition);
                self.visit_block(body);
            }
            StatementNode::Return(value) => {
                if let Some(value) = value {
                    self.visit_expression(value);
                }
            }
            StatementNode::Break | StatementNode::Continue | StatementNode::TypeAlias { .. } => {}
            StatementNode::FunctionDecl(function) => {
                self.bound.insert(function.name.clone());
                // Plain functions are isolated and capture nothing.
                if function.kind == FunctionKind::Def {
                    self.referenced.extend(of_function(function));
                }
            }
            StatementNode::ClassDecl(class) => {
                self.bound.insert(class.name.clone());
                self.referenced.extend(of_block(&class.body));
            }
        }
    }

    fn visit_arguments(&mut self, arguments: &[Argument]) {
        for argument in arguments {
            self.visit_expression(&argument.value);
        }
    }

    fn visit_expression(&mut self, expression: &Expression) {
        match &expression.kind {
            ExpressionKind::Literal(_) | ExpressionKind::SelfReference => {}
            ExpressionKind::List(items)
            | ExpressionKind::Array(items)
            | ExpressionKind::Set(items) => {
                for item in items {
                    self.visit_expression(item);
                }
            }
            ExpressionKind::Dict(entries) => {
                for (key, value) in entries {
                    self.visit_expression(key);
                    self.visit_expression(value);
                }
            }
            ExpressionKind::Variable(name) => {
                self.referenced.insert(name.clone());
            }
            ExpressionKind::Unary { rhs, .. } => self.visit_expression(rhs),
            ExpressionKind::Binary { lhs, rhs, .. } | ExpressionKind::Logical { lhs, rhs, .. } => {
                self.visit_expression(lhs);
                self.visit_expression(rhs);
            }
            ExpressionKind::Call { callee, arguments } => {
                self.referenced.insert(callee.clone());
                self.visit_arguments(arguments);
            }
            ExpressionKind::CallValue { callee, arguments } => {
                self.visit_expression(callee);
                self.visit_arguments(arguments);
            }
            ExpressionKind::Chain(chain) => {
                for (index, element) in chain.elements.iter().enumerate() {
                    // Only the head of a scope chain names something in scope.
                    if index == 0 && chain.origin == ChainOrigin::Scope {
                        self.referenced.insert(element.name().clone());
                    }
                    match element {
                        ChainElement::Read(_) => {}
                        ChainElement::Assign { value, .. } => self.visit_expression(value),
                        ChainElement::Declare(decl) => {
                            if let Some(ref initial) = decl.initial {
                                self.visit_expression(initial);
                            }
                        }
                        ChainElement::Call { arguments, .. } => self.visit_arguments(arguments),
                    }
                }
            }
        }
    }
}

pub(super) fn of_block(body: &[Statement]) -> BTreeSet<Name> {
    let mut collector = Collector::default();
    collector.visit_block(body);
    collector.finish()
}

pub(super) fn of_function(function: &FunctionDecl) -> BTreeSet<Name> {
    let mut collector = Collector::default();
    for parameter in &function.parameters {
        if let Some(ref default) = parameter.default {
            collector.visit_expression(default);
        }
        collector.bound.insert(parameter.name.clone());
    }
    collector.visit_block(&function.body);
    collector.finish()
}

pub(super) fn of_expression(expression: &Expression) -> BTreeSet<Name> {
    let mut collector = Collector::default();
    collector.visit_expression(expression);
    collector.finish()
}
