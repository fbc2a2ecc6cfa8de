//! Runtime semantics of unary and binary operators.
//!
//! Integer arithmetic is checked: overflow is an [`EvalError::InvalidOperation`] and integer
//! division or remainder by zero is [`EvalError::DivisionByZero`]. As soon as one operand is a
//! float the operation is carried out in `f64`.

use std::cmp::Ordering;

use super::{EvalError, EvalResult};
use crate::ast::{BinaryOperator, UnaryOperator};
use crate::value::Value;

enum Numeric {
    Integer(i64, i64),
    Float(f64, f64),
}

fn numeric(left: &Value, right: &Value) -> Option<Numeric> {
    match (left, right) {
        (Value::Integer(l), Value::Integer(r)) => Some(Numeric::Integer(*l, *r)),
        (Value::Integer(l), Value::Float(r)) => Some(Numeric::Float(*l as f64, *r)),
        (Value::Float(l), Value::Integer(r)) => Some(Numeric::Float(*l, *r as f64)),
        (Value::Float(l), Value::Float(r)) => Some(Numeric::Float(*l, *r)),
        _ => None,
    }
}

fn kind_name(value: &Value) -> String {
    value.type_handle().to_string()
}

fn invalid_operands(op: BinaryOperator, left: &Value, right: &Value) -> EvalError {
    EvalError::InvalidOperation(format!(
        "`{}` cannot be applied to {} and {}",
        op,
        kind_name(left),
        kind_name(right)
    ))
}

fn overflow(op: BinaryOperator) -> EvalError {
    EvalError::InvalidOperation(format!("integer overflow in `{}`", op))
}

pub fn unary(op: UnaryOperator, operand: Value) -> EvalResult<Value> {
    match (op, operand) {
        (UnaryOperator::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
        (UnaryOperator::Negate, Value::Integer(i)) => i
            .checked_neg()
            .map(Value::Integer)
            .ok_or_else(|| EvalError::InvalidOperation("integer overflow in `-`".to_string())),
        (UnaryOperator::Negate, Value::Float(x)) => Ok(Value::Float(-x)),
        (UnaryOperator::Not, other) => Err(EvalError::type_mismatch("Boolean", kind_name(&other))),
        (UnaryOperator::Negate, other) => Err(EvalError::type_mismatch("number", kind_name(&other))),
    }
}

/// Applies a binary operator to two evaluated operands. `&&` and `||` are accepted here for
/// completeness; compiled expressions short-circuit them before reaching this point.
pub fn binary(op: BinaryOperator, left: Value, right: Value) -> EvalResult<Value> {
    use BinaryOperator::*;

    match op {
        Add => add(left, right),
        Subtract | Multiply | Divide | Modulo => arithmetic(op, &left, &right),
        Equal => Ok(Value::Boolean(values_equal(&left, &right))),
        NotEqual => Ok(Value::Boolean(!values_equal(&left, &right))),
        LessThan | GreaterThan | LessThanEqual | GreaterThanEqual => {
            let ordering = compare(op, &left, &right)?;
            Ok(Value::Boolean(match op {
                LessThan => ordering == Ordering::Less,
                GreaterThan => ordering == Ordering::Greater,
                LessThanEqual => ordering != Ordering::Greater,
                _ => ordering != Ordering::Less,
            }))
        }
        And | Or => match (&left, &right) {
            (Value::Boolean(l), Value::Boolean(r)) => Ok(Value::Boolean(if op == And {
                *l && *r
            } else {
                *l || *r
            })),
            _ => Err(invalid_operands(op, &left, &right)),
        },
    }
}

fn add(left: Value, right: Value) -> EvalResult<Value> {
    match (&left, &right) {
        (Value::Text(l), r) => Ok(Value::Text(format!("{}{}", l, r))),
        (l, Value::Text(r)) => Ok(Value::Text(format!("{}{}", l, r))),
        _ => arithmetic(BinaryOperator::Add, &left, &right),
    }
}

fn arithmetic(op: BinaryOperator, left: &Value, right: &Value) -> EvalResult<Value> {
    match numeric(left, right) {
        Some(Numeric::Integer(l, r)) => {
            let result = match op {
                BinaryOperator::Add => l.checked_add(r),
                BinaryOperator::Subtract => l.checked_sub(r),
                BinaryOperator::Multiply => l.checked_mul(r),
                BinaryOperator::Divide | BinaryOperator::Modulo if r == 0 => {
                    return Err(EvalError::DivisionByZero)
                }
                BinaryOperator::Divide => l.checked_div(r),
                BinaryOperator::Modulo => l.checked_rem(r),
                _ => return Err(invalid_operands(op, left, right)),
            };
            result.map(Value::Integer).ok_or_else(|| overflow(op))
        }
        Some(Numeric::Float(l, r)) => Ok(Value::Float(match op {
            BinaryOperator::Add => l + r,
            BinaryOperator::Subtract => l - r,
            BinaryOperator::Multiply => l * r,
            BinaryOperator::Divide => l / r,
            BinaryOperator::Modulo => l % r,
            _ => return Err(invalid_operands(op, left, right)),
        })),
        None => {
            if left.is_null() || right.is_null() {
                Err(EvalError::null_dereference(op.to_string()))
            } else {
                Err(invalid_operands(op, left, right))
            }
        }
    }
}

/// Equality with integers and floats compared by numeric value.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match numeric(left, right) {
        Some(Numeric::Integer(l, r)) => l == r,
        Some(Numeric::Float(l, r)) => l == r,
        None => left == right,
    }
}

fn compare(op: BinaryOperator, left: &Value, right: &Value) -> EvalResult<Ordering> {
    match (numeric(left, right), left, right) {
        (Some(Numeric::Integer(l, r)), _, _) => Ok(l.cmp(&r)),
        (Some(Numeric::Float(l, r)), _, _) => l
            .partial_cmp(&r)
            .ok_or_else(|| EvalError::InvalidOperation("comparison with NaN".to_string())),
        (None, Value::Text(l), Value::Text(r)) => Ok(l.cmp(r)),
        (None, Value::Null, _) | (None, _, Value::Null) => {
            Err(EvalError::null_dereference(op.to_string()))
        }
        _ => Err(invalid_operands(op, left, right)),
    }
}
