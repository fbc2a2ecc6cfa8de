//! Type-annotated expression tree. Every member access and call has been resolved to the
//! strategy the evaluator will use for it.

use crate::ast::{BinaryOperator, UnaryOperator};
use crate::eval::BuiltinMethod;
use crate::types::{MethodDef, TypeHandle};
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct TypedExpression {
    pub ty: TypeHandle,
    pub kind: TypedKind,
}

#[derive(Debug, Clone)]
pub enum TypedKind {
    Literal(Value),
    /// The input instance
    Input,
    /// Declared field of an object type
    Field {
        target: Box<TypedExpression>,
        name: String,
    },
    /// Member looked up by name at evaluation time
    DynamicProperty {
        target: Box<TypedExpression>,
        name: String,
    },
    /// `map.key`
    MapEntry {
        target: Box<TypedExpression>,
        key: String,
    },
    NativeMethod {
        target: Box<TypedExpression>,
        method: MethodDef,
        arguments: Vec<TypedExpression>,
    },
    BuiltinMethod {
        target: Box<TypedExpression>,
        method: BuiltinMethod,
        arguments: Vec<TypedExpression>,
    },
    /// Method looked up by name at evaluation time
    DynamicMethod {
        target: Box<TypedExpression>,
        name: String,
        arguments: Vec<TypedExpression>,
    },
    Index {
        target: Box<TypedExpression>,
        index: Box<TypedExpression>,
    },
    List(Vec<TypedExpression>),
    Class(TypeHandle),
    Unary {
        op: UnaryOperator,
        operand: Box<TypedExpression>,
    },
    Binary {
        op: BinaryOperator,
        left: Box<TypedExpression>,
        right: Box<TypedExpression>,
    },
    Ternary {
        condition: Box<TypedExpression>,
        then_branch: Box<TypedExpression>,
        else_branch: Box<TypedExpression>,
    },
}

impl TypedExpression {
    pub fn new(ty: TypeHandle, kind: TypedKind) -> Self {
        Self { ty, kind }
    }

    /// Whether evaluation depends on a by-name lookup somewhere in the tree.
    pub fn is_dynamic(&self) -> bool {
        match &self.kind {
            TypedKind::DynamicProperty { .. } | TypedKind::DynamicMethod { .. } => true,
            TypedKind::Literal(_) | TypedKind::Input | TypedKind::Class(_) => false,
            TypedKind::Field { target, .. } | TypedKind::MapEntry { target, .. } => {
                target.is_dynamic()
            }
            TypedKind::NativeMethod {
                target, arguments, ..
            }
            | TypedKind::BuiltinMethod {
                target, arguments, ..
            } => target.is_dynamic() || arguments.iter().any(TypedExpression::is_dynamic),
            TypedKind::Index { target, index } => target.is_dynamic() || index.is_dynamic(),
            TypedKind::List(items) => items.iter().any(TypedExpression::is_dynamic),
            TypedKind::Unary { operand, .. } => operand.is_dynamic(),
            TypedKind::Binary { left, right, .. } => left.is_dynamic() || right.is_dynamic(),
            TypedKind::Ternary {
                condition,
                then_branch,
                else_branch,
            } => condition.is_dynamic() || then_branch.is_dynamic() || else_branch.is_dynamic(),
        }
    }
}
