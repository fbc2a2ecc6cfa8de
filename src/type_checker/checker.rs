use tracing::trace;

use super::{
    error::{TypeCheckError, TypeCheckResult},
    typed::{TypedExpression, TypedKind},
};
use crate::ast::{BinaryOperator, Expression, Literal, UnaryOperator};
use crate::compiler::CompileScope;
use crate::eval::BuiltinMethod;
use crate::types::TypeHandle;
use crate::value::Value;

/// Infers the static type of an expression within a [`CompileScope`] and resolves every member
/// access to a concrete access strategy.
pub struct TypeChecker<'a> {
    scope: &'a CompileScope,
}

impl<'a> TypeChecker<'a> {
    pub fn new(scope: &'a CompileScope) -> Self {
        Self { scope }
    }

    fn strict(&self) -> bool {
        self.scope.options().strong_typing
    }

    /// Fails in strict mode when `ty` is not statically known.
    fn require_static(&self, ty: &TypeHandle, what: impl FnOnce() -> String) -> TypeCheckResult<()> {
        if self.strict() && ty.is_any() {
            Err(TypeCheckError::strict(format!("{} has no static type", what())))
        } else {
            Ok(())
        }
    }

    fn input(&self) -> TypedExpression {
        TypedExpression::new(self.scope.input_type().clone(), TypedKind::Input)
    }

    pub fn check(&self, expr: &Expression) -> TypeCheckResult<TypedExpression> {
        match expr {
            Expression::Literal(literal) => Ok(self.check_literal(literal)),
            Expression::This => Ok(self.input()),
            Expression::Variable(name) => self.check_variable(name),
            Expression::Property { target, name } => {
                let target = self.check(target)?;
                self.member(target, name)
            }
            Expression::MethodCall {
                target,
                method,
                arguments,
            } => {
                let receiver = match target {
                    Some(target) => self.check(target)?,
                    None if self.scope.options().allow_bare_method_calls => self.input(),
                    None => return Err(TypeCheckError::feature_disabled("bare method calls")),
                };
                let arguments = arguments
                    .iter()
                    .map(|argument| self.check(argument))
                    .collect::<TypeCheckResult<Vec<_>>>()?;
                self.call(receiver, method, arguments)
            }
            Expression::Index { target, index } => {
                let target = self.check(target)?;
                let index = self.check(index)?;
                self.index(target, index)
            }
            Expression::ClassLiteral(name) => {
                if !self.scope.options().support_java_style_class_literals {
                    return Err(TypeCheckError::feature_disabled("class literals"));
                }
                let ty = self.resolve_class(name)?;
                Ok(TypedExpression::new(TypeHandle::Class, TypedKind::Class(ty)))
            }
            Expression::List(items) => {
                let items = items
                    .iter()
                    .map(|item| self.check(item))
                    .collect::<TypeCheckResult<Vec<_>>>()?;
                let element = items
                    .iter()
                    .map(|item| item.ty.clone())
                    .reduce(|a, b| a.unify(&b))
                    .unwrap_or(TypeHandle::Any);
                Ok(TypedExpression::new(
                    TypeHandle::list(element),
                    TypedKind::List(items),
                ))
            }
            Expression::UnaryOp { op, operand } => {
                let operand = self.check(operand)?;
                self.unary(*op, operand)
            }
            Expression::BinaryOp { op, left, right } => {
                let left = self.check(left)?;
                let right = self.check(right)?;
                self.binary(*op, left, right)
            }
            Expression::Ternary {
                condition,
                then_branch,
                else_branch,
            } => self.ternary(condition, then_branch, else_branch),
        }
    }

    fn check_literal(&self, literal: &Literal) -> TypedExpression {
        let (ty, value) = match literal {
            Literal::Integer(i) => (TypeHandle::Integer, Value::Integer(*i)),
            Literal::Float(x) => (TypeHandle::Float, Value::Float(*x)),
            Literal::Text(s) => (TypeHandle::Text, Value::Text(s.clone())),
            Literal::Boolean(b) => (TypeHandle::Boolean, Value::Boolean(*b)),
            Literal::Null => (TypeHandle::Null, Value::Null),
        };
        TypedExpression::new(ty, TypedKind::Literal(value))
    }

    /// A free identifier names the input itself or one of its members.
    fn check_variable(&self, name: &str) -> TypeCheckResult<TypedExpression> {
        if name == self.scope.input_name() {
            return Ok(self.input());
        }
        self.member(self.input(), name).map_err(|e| match e {
            TypeCheckError::UnknownMember { member, .. } => {
                TypeCheckError::UndefinedVariable(member)
            }
            other => other,
        })
    }

    fn member(&self, target: TypedExpression, name: &str) -> TypeCheckResult<TypedExpression> {
        trace!("member `{}` of {}", name, target.ty);
        let target_type = target.ty.clone();
        let target = Box::new(target);
        let dynamic = |target: Box<TypedExpression>| {
            TypedExpression::new(
                TypeHandle::Any,
                TypedKind::DynamicProperty {
                    target,
                    name: name.to_string(),
                },
            )
        };

        match &target_type {
            TypeHandle::Object(type_name) => {
                let field = self
                    .scope
                    .resolver()
                    .definition(type_name)
                    .and_then(|definition| definition.field(name).map(|f| f.ty.clone()));
                match field {
                    Some(ty) => Ok(TypedExpression::new(
                        ty,
                        TypedKind::Field {
                            target,
                            name: name.to_string(),
                        },
                    )),
                    None if self.strict() => {
                        Err(TypeCheckError::unknown_member(type_name, name))
                    }
                    None => Ok(dynamic(target)),
                }
            }
            TypeHandle::Map(value) => {
                if self.scope.options().allow_override_all_property_handling {
                    Ok(TypedExpression::new(
                        value.as_ref().clone(),
                        TypedKind::MapEntry {
                            target,
                            key: name.to_string(),
                        },
                    ))
                } else {
                    Err(TypeCheckError::feature_disabled("property access on maps"))
                }
            }
            TypeHandle::Any => {
                self.require_static(&target_type, || format!("the target of `.{}`", name))?;
                Ok(dynamic(target))
            }
            other => Err(TypeCheckError::unknown_member(other, name)),
        }
    }

    fn check_arguments(
        &self,
        method: &str,
        params: &[TypeHandle],
        arguments: &[TypedExpression],
    ) -> TypeCheckResult<()> {
        if params.len() != arguments.len() {
            return Err(TypeCheckError::InvalidArgument {
                method: method.to_string(),
                message: format!(
                    "expected {} argument(s), found {}",
                    params.len(),
                    arguments.len()
                ),
            });
        }
        for (position, (param, argument)) in params.iter().zip(arguments).enumerate() {
            if argument.ty.is_any() && !param.is_any() {
                self.require_static(&argument.ty, || {
                    format!("argument {} of `{}`", position + 1, method)
                })?;
                continue;
            }
            if !param.is_assignable_from(&argument.ty) {
                return Err(TypeCheckError::InvalidArgument {
                    method: method.to_string(),
                    message: format!(
                        "argument {} expected {}, found {}",
                        position + 1,
                        param,
                        argument.ty
                    ),
                });
            }
        }
        Ok(())
    }

    fn call(
        &self,
        receiver: TypedExpression,
        method: &str,
        arguments: Vec<TypedExpression>,
    ) -> TypeCheckResult<TypedExpression> {
        trace!("method `{}` of {}", method, receiver.ty);
        let receiver_type = receiver.ty.clone();
        let dynamic = |target: Box<TypedExpression>, arguments: Vec<TypedExpression>| {
            TypedExpression::new(
                TypeHandle::Any,
                TypedKind::DynamicMethod {
                    target,
                    name: method.to_string(),
                    arguments,
                },
            )
        };

        match &receiver_type {
            TypeHandle::Object(type_name) => {
                let native = self
                    .scope
                    .resolver()
                    .definition(type_name)
                    .and_then(|definition| definition.method(method).cloned());
                match native {
                    Some(native) => {
                        self.check_arguments(method, native.params(), &arguments)?;
                        Ok(TypedExpression::new(
                            native.returns().clone(),
                            TypedKind::NativeMethod {
                                target: Box::new(receiver),
                                method: native,
                                arguments,
                            },
                        ))
                    }
                    None if self.strict() => {
                        Err(TypeCheckError::unknown_method(type_name, method))
                    }
                    None => Ok(dynamic(Box::new(receiver), arguments)),
                }
            }
            TypeHandle::Any => {
                self.require_static(&receiver_type, || format!("the receiver of `{}()`", method))?;
                Ok(dynamic(Box::new(receiver), arguments))
            }
            other => match BuiltinMethod::lookup(other, method) {
                Some((builtin, signature)) => {
                    self.check_arguments(method, &signature.params, &arguments)?;
                    Ok(TypedExpression::new(
                        signature.returns,
                        TypedKind::BuiltinMethod {
                            target: Box::new(receiver),
                            method: builtin,
                            arguments,
                        },
                    ))
                }
                None => Err(TypeCheckError::unknown_method(other, method)),
            },
        }
    }

    fn index(
        &self,
        target: TypedExpression,
        index: TypedExpression,
    ) -> TypeCheckResult<TypedExpression> {
        let result = match (&target.ty, &index.ty) {
            (TypeHandle::List(element), TypeHandle::Integer) => element.as_ref().clone(),
            (TypeHandle::Map(value), TypeHandle::Text) => value.as_ref().clone(),
            (TypeHandle::List(element), TypeHandle::Any)
            | (TypeHandle::Map(element), TypeHandle::Any) => {
                self.require_static(&index.ty, || "the index".to_string())?;
                element.as_ref().clone()
            }
            (TypeHandle::Any, _) => {
                self.require_static(&target.ty, || "the indexed value".to_string())?;
                TypeHandle::Any
            }
            (target_type, index_type) => {
                return Err(TypeCheckError::InvalidOperatorType {
                    operator: "[]".to_string(),
                    left_type: target_type.clone(),
                    right_type: index_type.clone(),
                })
            }
        };
        Ok(TypedExpression::new(
            result,
            TypedKind::Index {
                target: Box::new(target),
                index: Box::new(index),
            },
        ))
    }

    fn unary(&self, op: UnaryOperator, operand: TypedExpression) -> TypeCheckResult<TypedExpression> {
        self.require_static(&operand.ty, || format!("the operand of `{}`", op))?;
        let ty = match (op, &operand.ty) {
            (UnaryOperator::Not, TypeHandle::Boolean | TypeHandle::Any) => TypeHandle::Boolean,
            (UnaryOperator::Negate, ty) if ty.is_numeric() || ty.is_any() => ty.clone(),
            (_, ty) => {
                return Err(TypeCheckError::InvalidOperandType {
                    operator: op.to_string(),
                    operand_type: ty.clone(),
                })
            }
        };
        Ok(TypedExpression::new(
            ty,
            TypedKind::Unary {
                op,
                operand: Box::new(operand),
            },
        ))
    }

    fn binary(
        &self,
        op: BinaryOperator,
        left: TypedExpression,
        right: TypedExpression,
    ) -> TypeCheckResult<TypedExpression> {
        self.require_static(&left.ty, || format!("the left operand of `{}`", op))?;
        self.require_static(&right.ty, || format!("the right operand of `{}`", op))?;
        let ty = self.binary_type(op, &left.ty, &right.ty)?;
        Ok(TypedExpression::new(
            ty,
            TypedKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
        ))
    }

    fn binary_type(
        &self,
        op: BinaryOperator,
        left: &TypeHandle,
        right: &TypeHandle,
    ) -> TypeCheckResult<TypeHandle> {
        use TypeHandle::{Any, Boolean, Float, Integer, Text};

        let invalid = || TypeCheckError::InvalidOperatorType {
            operator: op.to_string(),
            left_type: left.clone(),
            right_type: right.clone(),
        };
        let dynamic = left.is_any() || right.is_any();

        match op {
            BinaryOperator::And | BinaryOperator::Or => match (left, right) {
                (Boolean | Any, Boolean | Any) => Ok(Boolean),
                _ => Err(invalid()),
            },
            BinaryOperator::Equal | BinaryOperator::NotEqual => {
                let comparable = dynamic
                    || (left.is_numeric() && right.is_numeric())
                    || left.is_assignable_from(right)
                    || right.is_assignable_from(left);
                if comparable {
                    Ok(Boolean)
                } else {
                    Err(invalid())
                }
            }
            op if op.is_ordering() => match (left, right) {
                _ if dynamic => Ok(Boolean),
                (l, r) if l.is_numeric() && r.is_numeric() => Ok(Boolean),
                (Text, Text) => Ok(Boolean),
                _ => Err(invalid()),
            },
            BinaryOperator::Add if *left == Text || *right == Text => Ok(Text),
            _ => match (left, right) {
                _ if dynamic => Ok(Any),
                (Integer, Integer) => Ok(Integer),
                (l, r) if l.is_numeric() && r.is_numeric() => Ok(Float),
                _ => Err(invalid()),
            },
        }
    }

    fn ternary(
        &self,
        condition: &Expression,
        then_branch: &Expression,
        else_branch: &Expression,
    ) -> TypeCheckResult<TypedExpression> {
        let condition = self.check(condition)?;
        match &condition.ty {
            TypeHandle::Boolean => {}
            TypeHandle::Any => {
                self.require_static(&condition.ty, || "the condition".to_string())?
            }
            other => {
                return Err(TypeCheckError::type_mismatch(
                    TypeHandle::Boolean,
                    other.clone(),
                ))
            }
        }

        let then_branch = self.check(then_branch)?;
        let else_branch = self.check(else_branch)?;
        let ty = then_branch.ty.unify(&else_branch.ty);
        if ty.is_any() && !(then_branch.ty.is_any() && else_branch.ty.is_any()) && self.strict() {
            return Err(TypeCheckError::strict(format!(
                "branches of type {} and {} have no common type",
                then_branch.ty, else_branch.ty
            )));
        }
        Ok(TypedExpression::new(
            ty,
            TypedKind::Ternary {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            },
        ))
    }

    /// Resolves the name of a class literal. With inner-class resolution enabled, trailing dots
    /// are turned into `$` one at a time until a type is found.
    fn resolve_class(&self, name: &str) -> TypeCheckResult<TypeHandle> {
        let qualified = self.scope.parser_config().qualify(name);
        let mut names = vec![qualified.clone()];
        if qualified != name {
            names.push(name.to_string());
        }

        for base in names {
            let mut candidate = base;
            loop {
                if let Ok(ty) = self.scope.resolver().resolve(&candidate) {
                    return Ok(ty);
                }
                if !self
                    .scope
                    .options()
                    .allow_resolve_inner_classes_via_dot_notation
                {
                    break;
                }
                match candidate.rfind('.') {
                    Some(pos) => candidate.replace_range(pos..pos + 1, "$"),
                    None => break,
                }
            }
        }
        Err(TypeCheckError::UndefinedType(name.to_string()))
    }
}
