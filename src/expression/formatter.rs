use super::{
    Argument, BinaryOperator, ChainElement, ChainOrigin, Expression, ExpressionKind, Literal,
    LogicalOperator, UnaryOperator,
};

pub trait ExpressionFormatter {
    fn format(&self, expression: &Expression) -> String;
    fn format_chain_element(&self, element: &ChainElement) -> String;
}

pub struct DebugFormatter;

impl ExpressionFormatter for DebugFormatter {
    fn format(&self, expression: &Expression) -> String {
        format!("{expression:?}")
    }

    fn format_chain_element(&self, element: &ChainElement) -> String {
        format!("{element:?}")
    }
}

pub struct SExpressionFormatter;

impl SExpressionFormatter {
    fn format_node(expression: &Expression) -> String {
        match &expression.kind {
            ExpressionKind::Literal(literal) => Self::format_literal(literal),
            ExpressionKind::List(items) => Self::format_sequence("list", items),
            ExpressionKind::Array(items) => Self::format_sequence("array", items),
            ExpressionKind::Set(items) => Self::format_sequence("set", items),
            ExpressionKind::Dict(entries) => {
                let entries: Vec<_> = entries
                    .iter()
                    .map(|(k, v)| format!("({} {})", Self::format_node(k), Self::format_node(v)))
                    .collect();
                Self::wrap("dict", &entries)
            }
            ExpressionKind::Variable(name) => format!("{name}"),
            ExpressionKind::SelfReference => "self".into(),
            ExpressionKind::Unary { operator, rhs } => format!(
                "({} {})",
                Self::format_unary_operator(operator),
                Self::format_node(rhs),
            ),
            ExpressionKind::Binary { operator, lhs, rhs } => format!(
                "({} {} {})",
                Self::format_binary_operator(operator),
                Self::format_node(lhs),
                Self::format_node(rhs),
            ),
            ExpressionKind::Logical { operator, lhs, rhs } => format!(
                "({} {} {})",
                Self::format_logical_operator(operator),
                Self::format_node(lhs),
                Self::format_node(rhs),
            ),
            ExpressionKind::Call { callee, arguments } => Self::wrap(
                &format!("call {callee}"),
                &Self::format_arguments(arguments),
            ),
            ExpressionKind::CallValue { callee, arguments } => Self::wrap(
                &format!("call {}", Self::format_node(callee)),
                &Self::format_arguments(arguments),
            ),
            ExpressionKind::Chain(chain) => {
                let mut elements: Vec<_> =
                    chain.elements.iter().map(Self::format_element).collect();
                if chain.origin == ChainOrigin::Instance {
                    elements.insert(0, "self".into());
                }
                Self::wrap("chain", &elements)
            }
        }
    }

    fn format_element(element: &ChainElement) -> String {
        match element {
            ChainElement::Read(name) => format!("{name}"),
            ChainElement::Assign { name, value } => {
                format!("(= {name} {})", Self::format_node(value))
            }
            ChainElement::Declare(decl) => match decl.initial {
                Some(ref initial) => format!("(var {} {})", decl.name, Self::format_node(initial)),
                None => format!("(var {})", decl.name),
            },
            ChainElement::Call { name, arguments } => {
                Self::wrap(&format!("call {name}"), &Self::format_arguments(arguments))
            }
        }
    }

    fn format_arguments(arguments: &[Argument]) -> Vec<String> {
        arguments
            .iter()
            .map(|argument| match argument.name {
                Some(ref name) => format!("(: {name} {})", Self::format_node(&argument.value)),
                None => Self::format_node(&argument.value),
            })
            .collect()
    }

    fn format_sequence(head: &str, items: &[Expression]) -> String {
        let items: Vec<_> = items.iter().map(Self::format_node).collect();
        Self::wrap(head, &items)
    }

    fn wrap(head: &str, items: &[String]) -> String {
        if items.is_empty() {
            format!("({head})")
        } else {
            format!("({head} {})", items.join(" "))
        }
    }

    fn format_literal(literal: &Literal) -> String {
        match literal {
            Literal::Null => "null".into(),
            Literal::Bool(value) => format!("{value}"),
            Literal::Int(value) => format!("{value}"),
            Literal::Long(value) => format!("{value}L"),
            Literal::Float(value) => format!("{value:?}f"),
            Literal::Double(value) => format!("{value:?}"),
            Literal::Char(value) => format!("'{value}'"),
            Literal::String(value) => format!("\"{value}\""),
        }
    }

    fn format_unary_operator(operator: &UnaryOperator) -> &'static str {
        match operator {
            UnaryOperator::Bang => "!",
            UnaryOperator::Minus => "-",
            UnaryOperator::Tilde => "~",
        }
    }

    fn format_binary_operator(operator: &BinaryOperator) -> &'static str {
        match operator {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::BitOr => "|",
            BinaryOperator::BitXor => "^",
            BinaryOperator::ShiftLeft => "<<",
            BinaryOperator::ShiftRight => ">>",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessThanEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterThanEqual => ">=",
            BinaryOperator::EqualEqual => "==",
            BinaryOperator::BangEqual => "!=",
        }
    }

    fn format_logical_operator(operator: &LogicalOperator) -> &'static str {
        match operator {
            LogicalOperator::And => "and",
            LogicalOperator::Or => "or",
        }
    }
}

impl ExpressionFormatter for SExpressionFormatter {
    fn format(&self, expression: &Expression) -> String {
        SExpressionFormatter::format_node(expression)
    }

    fn format_chain_element(&self, element: &ChainElement) -> String {
        SExpressionFormatter::format_element(element)
    }
}
