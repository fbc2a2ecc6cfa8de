//! Syntax tree of accessor expressions, as produced by the [`analyzer`](crate::analyzer).

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanEqual,
    GreaterThanEqual,
    And,
    Or,
}

impl BinaryOperator {
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOperator::Add
                | BinaryOperator::Subtract
                | BinaryOperator::Multiply
                | BinaryOperator::Divide
                | BinaryOperator::Modulo
        )
    }

    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            BinaryOperator::LessThan
                | BinaryOperator::GreaterThan
                | BinaryOperator::LessThanEqual
                | BinaryOperator::GreaterThanEqual
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOperator::And | BinaryOperator::Or)
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::LessThan => "<",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::LessThanEqual => "<=",
            BinaryOperator::GreaterThanEqual => ">=",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
        };
        f.write_str(symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Negate,
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOperator::Not => f.write_str("!"),
            UnaryOperator::Negate => f.write_str("-"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    /// The input instance
    This,
    Variable(String),
    /// `target.name`
    Property {
        target: Box<Expression>,
        name: String,
    },
    /// `target.method(args)`, or a bare `method(args)` when `target` is `None`
    MethodCall {
        target: Option<Box<Expression>>,
        method: String,
        arguments: Vec<Expression>,
    },
    /// `target[index]`
    Index {
        target: Box<Expression>,
        index: Box<Expression>,
    },
    /// `a.b.Name.class`, holding the dotted name as written
    ClassLiteral(String),
    List(Vec<Expression>),
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Ternary {
        condition: Box<Expression>,
        then_branch: Box<Expression>,
        else_branch: Box<Expression>,
    },
}

impl Expression {
    pub fn property(target: Expression, name: impl Into<String>) -> Self {
        Expression::Property {
            target: Box::new(target),
            name: name.into(),
        }
    }

    pub fn binary(op: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Height of the tree; a leaf has depth 1. Walks with an explicit stack so arbitrarily deep
    /// trees are measured safely.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((expr, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            pending.extend(expr.children().into_iter().map(|child| (child, depth + 1)));
        }
        deepest
    }

    fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Literal(_)
            | Expression::This
            | Expression::Variable(_)
            | Expression::ClassLiteral(_) => Vec::new(),
            Expression::Property { target, .. } => vec![target.as_ref()],
            Expression::MethodCall {
                target, arguments, ..
            } => target.iter().map(|t| t.as_ref()).chain(arguments).collect(),
            Expression::Index { target, index } => vec![target.as_ref(), index.as_ref()],
            Expression::List(items) => items.iter().collect(),
            Expression::UnaryOp { operand, .. } => vec![operand.as_ref()],
            Expression::BinaryOp { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Expression::Ternary {
                condition,
                then_branch,
                else_branch,
            } => vec![condition.as_ref(), then_branch.as_ref(), else_branch.as_ref()],
        }
    }

    /// The dotted name spelled by a chain of variables and properties, e.g. `a.b.C`.
    pub fn dotted_name(&self) -> Option<String> {
        match self {
            Expression::Variable(name) => Some(name.clone()),
            Expression::Property { target, name } => target
                .dotted_name()
                .map(|prefix| format!("{}.{}", prefix, name)),
            _ => None,
        }
    }
}
