//! Lowering of a [`TypedExpression`] into a tree of closures.
//!
//! Every node is turned into a boxed closure once, at compile time. Evaluation then only walks the
//! closures, so nothing is parsed, resolved or logged on the hot path apart from the by-name
//! lookups the type checker could not settle statically.

use std::sync::Arc;

use super::{
    methods::{list_get, BuiltinMethod},
    operators, EvalError, EvalResult,
};
use crate::ast::BinaryOperator;
use crate::context::TypeResolver;
use crate::type_checker::{TypedExpression, TypedKind};
use crate::types::TypeHandle;
use crate::value::Value;

/// A compiled expression node: evaluates against the input instance.
pub type CompiledNode = Box<dyn Fn(&Value) -> EvalResult<Value> + Send + Sync>;

/// Lowers a checked expression. `resolver` backs the by-name member lookups.
pub fn lower(expr: TypedExpression, resolver: Arc<dyn TypeResolver>) -> CompiledNode {
    Lowering { resolver }.lower(expr)
}

struct Lowering {
    resolver: Arc<dyn TypeResolver>,
}

impl Lowering {
    fn lower_all(&self, exprs: Vec<TypedExpression>) -> Vec<CompiledNode> {
        exprs.into_iter().map(|expr| self.lower(expr)).collect()
    }

    fn lower(&self, expr: TypedExpression) -> CompiledNode {
        match expr.kind {
            TypedKind::Literal(value) => Box::new(move |_| Ok(value.clone())),
            TypedKind::Input => Box::new(|input| Ok(input.clone())),
            TypedKind::Field { target, name } => {
                let target = self.lower(*target);
                let declared = expr.ty;
                Box::new(move |input| read_field(target(input)?, &name, &declared))
            }
            TypedKind::DynamicProperty { target, name } => {
                let target = self.lower(*target);
                let resolver = Arc::clone(&self.resolver);
                Box::new(move |input| read_property(resolver.as_ref(), target(input)?, &name))
            }
            TypedKind::MapEntry { target, key } => {
                let target = self.lower(*target);
                Box::new(move |input| read_entry(target(input)?, &key))
            }
            TypedKind::NativeMethod {
                target,
                method,
                arguments,
            } => {
                let target = self.lower(*target);
                let arguments = self.lower_all(arguments);
                Box::new(move |input| match target(input)? {
                    Value::Object(object) => {
                        method.invoke(&object, &evaluate_all(&arguments, input)?)
                    }
                    Value::Null => Err(EvalError::null_dereference(method.name())),
                    other => Err(EvalError::type_mismatch("object", other.type_handle())),
                })
            }
            TypedKind::BuiltinMethod {
                target,
                method,
                arguments,
            } => {
                let target = self.lower(*target);
                let arguments = self.lower_all(arguments);
                Box::new(move |input| {
                    let receiver = target(input)?;
                    method.invoke(&receiver, &evaluate_all(&arguments, input)?)
                })
            }
            TypedKind::DynamicMethod {
                target,
                name,
                arguments,
            } => {
                let target = self.lower(*target);
                let arguments = self.lower_all(arguments);
                let resolver = Arc::clone(&self.resolver);
                Box::new(move |input| {
                    let receiver = target(input)?;
                    let arguments = evaluate_all(&arguments, input)?;
                    call_by_name(resolver.as_ref(), &receiver, &name, &arguments)
                })
            }
            TypedKind::Index { target, index } => {
                let target = self.lower(*target);
                let index = self.lower(*index);
                Box::new(move |input| read_index(target(input)?, index(input)?))
            }
            TypedKind::List(items) => {
                let items = self.lower_all(items);
                Box::new(move |input| evaluate_all(&items, input).map(Value::List))
            }
            TypedKind::Class(ty) => Box::new(move |_| Ok(Value::Class(ty.clone()))),
            TypedKind::Unary { op, operand } => {
                let operand = self.lower(*operand);
                Box::new(move |input| operators::unary(op, operand(input)?))
            }
            TypedKind::Binary { op, left, right } => {
                let left = self.lower(*left);
                let right = self.lower(*right);
                match op {
                    BinaryOperator::And => Box::new(move |input| {
                        if as_boolean(left(input)?)? {
                            right(input).and_then(as_boolean).map(Value::Boolean)
                        } else {
                            Ok(Value::Boolean(false))
                        }
                    }),
                    BinaryOperator::Or => Box::new(move |input| {
                        if as_boolean(left(input)?)? {
                            Ok(Value::Boolean(true))
                        } else {
                            right(input).and_then(as_boolean).map(Value::Boolean)
                        }
                    }),
                    op => Box::new(move |input| operators::binary(op, left(input)?, right(input)?)),
                }
            }
            TypedKind::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition = self.lower(*condition);
                let then_branch = self.lower(*then_branch);
                let else_branch = self.lower(*else_branch);
                Box::new(move |input| {
                    if as_boolean(condition(input)?)? {
                        then_branch(input)
                    } else {
                        else_branch(input)
                    }
                })
            }
        }
    }
}

fn evaluate_all(nodes: &[CompiledNode], input: &Value) -> EvalResult<Vec<Value>> {
    nodes.iter().map(|node| node(input)).collect()
}

fn as_boolean(value: Value) -> EvalResult<bool> {
    match value {
        Value::Boolean(b) => Ok(b),
        other => Err(EvalError::type_mismatch("Boolean", other.type_handle())),
    }
}

/// Declared field; an unset field reads as `null`. A stored value must conform to the declared
/// type, and integers stored in `Float` fields widen.
fn read_field(target: Value, name: &str, declared: &TypeHandle) -> EvalResult<Value> {
    match target {
        Value::Object(object) => match object.get(name) {
            None | Some(Value::Null) => Ok(Value::Null),
            Some(Value::Integer(i)) if *declared == TypeHandle::Float => Ok(Value::Float(*i as f64)),
            Some(value) if value.conforms_to(declared) => Ok(value.clone()),
            Some(value) => Err(EvalError::type_mismatch(declared, value.type_handle())),
        },
        Value::Null => Err(EvalError::null_dereference(name)),
        other => Err(EvalError::type_mismatch("object", other.type_handle())),
    }
}

fn read_entry(target: Value, key: &str) -> EvalResult<Value> {
    match target {
        Value::Map(entries) => Ok(entries.get(key).cloned().unwrap_or_default()),
        Value::Null => Err(EvalError::null_dereference(key)),
        other => Err(EvalError::type_mismatch("map", other.type_handle())),
    }
}

fn read_property(resolver: &dyn TypeResolver, target: Value, name: &str) -> EvalResult<Value> {
    match target {
        Value::Object(object) => match object.get(name) {
            Some(value) => Ok(value.clone()),
            None if resolver
                .definition(object.type_name())
                .is_some_and(|definition| definition.field(name).is_some()) =>
            {
                Ok(Value::Null)
            }
            None => Err(EvalError::UnknownProperty {
                type_name: object.type_name().to_string(),
                property: name.to_string(),
            }),
        },
        Value::Map(entries) => Ok(entries.get(name).cloned().unwrap_or_default()),
        Value::Null => Err(EvalError::null_dereference(name)),
        other => Err(EvalError::UnknownProperty {
            type_name: other.type_handle().to_string(),
            property: name.to_string(),
        }),
    }
}

/// Native methods of the receiver's runtime type first, then built-in methods.
fn call_by_name(
    resolver: &dyn TypeResolver,
    receiver: &Value,
    name: &str,
    arguments: &[Value],
) -> EvalResult<Value> {
    if let Value::Object(object) = receiver {
        let native = resolver
            .definition(object.type_name())
            .and_then(|definition| definition.method(name).cloned());
        if let Some(method) = native {
            if method.params().len() != arguments.len() {
                return Err(EvalError::method(
                    name,
                    format!(
                        "expected {} argument(s), found {}",
                        method.params().len(),
                        arguments.len()
                    ),
                ));
            }
            return method.invoke(object, arguments);
        }
    }
    if receiver.is_null() {
        return Err(EvalError::null_dereference(name));
    }
    match BuiltinMethod::lookup(&receiver.type_handle(), name) {
        Some((method, _)) => method.invoke(receiver, arguments),
        None => Err(EvalError::UnknownMethod {
            type_name: receiver.type_handle().to_string(),
            method: name.to_string(),
        }),
    }
}

fn read_index(target: Value, index: Value) -> EvalResult<Value> {
    match (target, index) {
        (Value::List(items), Value::Integer(i)) => list_get(&items, i),
        (Value::Map(entries), Value::Text(key)) => Ok(entries.get(&key).cloned().unwrap_or_default()),
        (Value::Null, _) => Err(EvalError::null_dereference("[]")),
        (Value::List(_), index) => Err(EvalError::type_mismatch("Integer", index.type_handle())),
        (Value::Map(_), index) => Err(EvalError::type_mismatch("Text", index.type_handle())),
        (other, _) => Err(EvalError::InvalidOperation(format!(
            "{} cannot be indexed",
            other.type_handle()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::parse_tokens;
    use crate::compiler::CompileScope;
    use crate::config::{CompilerOptions, ParserConfiguration};
    use crate::context::TypeRegistry;
    use crate::tokenizer::token::Tokenizer;
    use crate::type_checker::TypeChecker;
    use crate::types::{MethodDef, TypeDef, TypeHandle};
    use crate::value::Object;
    use std::collections::BTreeMap;

    fn registry() -> Arc<TypeRegistry> {
        let registry = TypeRegistry::new();
        registry.register(
            TypeDef::new("Person")
                .with_field("name", TypeHandle::Text)
                .with_field("age", TypeHandle::Integer)
                .with_field("nickname", TypeHandle::Text)
                .with_field("address", TypeHandle::object("Address"))
                .with_field("tags", TypeHandle::list(TypeHandle::Text))
                .with_field("attributes", TypeHandle::map(TypeHandle::Integer))
                .with_field("extra", TypeHandle::Any)
                .with_method(MethodDef::new(
                    "greet",
                    vec![TypeHandle::Text],
                    TypeHandle::Text,
                    |person, args| {
                        Ok(Value::Text(format!(
                            "{}, {}",
                            args[0],
                            person.get("name").cloned().unwrap_or_default()
                        )))
                    },
                )),
        );
        registry.register(TypeDef::new("Address").with_field("city", TypeHandle::Text));
        Arc::new(registry)
    }

    fn compile(source: &str, strict: bool) -> CompiledNode {
        let registry = registry();
        let scope = CompileScope::new(
            "this",
            TypeHandle::object("Person"),
            registry.clone(),
            Arc::new(ParserConfiguration::default()),
            CompilerOptions::for_accessor(strict),
        );
        let tokens = Tokenizer::new().tokenize(source).unwrap();
        let expr = parse_tokens(&tokens).unwrap();
        let typed = TypeChecker::new(&scope).check(&expr).unwrap();
        lower(typed, registry)
    }

    fn ann() -> Value {
        let address = Object::new("Address").with("city", "Kyoto");
        let attributes = BTreeMap::from([("height".to_string(), Value::Integer(170))]);
        Value::from(
            Object::new("Person")
                .with("name", "Ann")
                .with("age", 30)
                .with("address", address)
                .with("tags", vec!["a", "b"])
                .with("attributes", Value::Map(attributes))
                .with("extra", Object::new("Address").with("city", "Osaka")),
        )
    }

    fn eval(source: &str) -> EvalResult<Value> {
        compile(source, false)(&ann())
    }

    #[test]
    fn test_field_access() {
        assert_eq!(eval("name"), Ok(Value::from("Ann")));
        assert_eq!(eval("this.age + 1"), Ok(Value::Integer(31)));
        assert_eq!(eval("address.city"), Ok(Value::from("Kyoto")));
        assert_eq!(eval("nickname"), Ok(Value::Null));
    }

    #[test]
    fn test_field_values_follow_declared_types() {
        let odd = Value::from(
            Object::new("Person")
                .with("age", "x")
                .with("name", 5)
                .with("tags", vec![Value::Integer(1)]),
        );
        assert_eq!(
            compile("age + 1", true)(&odd),
            Err(EvalError::type_mismatch("Integer", "Text"))
        );
        assert_eq!(
            compile("name", true)(&odd),
            Err(EvalError::type_mismatch("Text", "Integer"))
        );
        assert!(matches!(
            compile("tags[0]", true)(&odd),
            Err(EvalError::TypeMismatch { .. })
        ));
        let unset = Value::from(Object::new("Person").with("nickname", Value::Null));
        assert_eq!(compile("nickname", true)(&unset), Ok(Value::Null));
    }

    #[test]
    fn test_collections() {
        assert_eq!(eval("tags[1]"), Ok(Value::from("b")));
        assert_eq!(eval("tags.size()"), Ok(Value::Integer(2)));
        assert_eq!(eval("attributes.height"), Ok(Value::Integer(170)));
        assert_eq!(eval("attributes['weight']"), Ok(Value::Null));
        assert_eq!(
            eval("tags[5]"),
            Err(EvalError::IndexOutOfBounds { index: 5, len: 2 })
        );
        assert_eq!(
            eval("[age, 2]"),
            Ok(Value::List(vec![Value::Integer(30), Value::Integer(2)]))
        );
    }

    #[test]
    fn test_methods() {
        assert_eq!(eval("greet('Hello')"), Ok(Value::from("Hello, Ann")));
        assert_eq!(eval("name.toUpperCase()"), Ok(Value::from("ANN")));
        assert_eq!(eval("extra.city.length()"), Ok(Value::Integer(5)));
        assert!(matches!(
            eval("extra.shout()"),
            Err(EvalError::UnknownMethod { .. })
        ));
    }

    #[test]
    fn test_dynamic_properties() {
        assert_eq!(eval("extra.city"), Ok(Value::from("Osaka")));
        assert_eq!(
            eval("extra.zip"),
            Err(EvalError::UnknownProperty {
                type_name: "Address".to_string(),
                property: "zip".to_string()
            })
        );
    }

    #[test]
    fn test_null_dereference() {
        let bob = Value::from(Object::new("Person").with("name", "Bob"));
        assert_eq!(
            compile("address.city", true)(&bob),
            Err(EvalError::null_dereference("city"))
        );
        assert_eq!(
            compile("nickname.length()", true)(&bob),
            Err(EvalError::null_dereference("length"))
        );
    }

    #[test]
    fn test_short_circuit() {
        let bob = Value::from(Object::new("Person").with("name", "Bob"));
        let node = compile("address != null && address.city == 'Kyoto'", true);
        assert_eq!(node(&bob), Ok(Value::Boolean(false)));
        assert_eq!(node(&ann()), Ok(Value::Boolean(true)));

        let node = compile("address == null || address.city == 'Kyoto'", true);
        assert_eq!(node(&bob), Ok(Value::Boolean(true)));
    }

    #[test]
    fn test_ternary_and_class() {
        assert_eq!(eval("age >= 18 ? 'adult' : 'minor'"), Ok(Value::from("adult")));
        assert_eq!(
            eval("Person.class"),
            Ok(Value::Class(TypeHandle::object("Person")))
        );
    }

    #[test]
    fn test_runtime_errors() {
        assert_eq!(eval("age / 0"), Err(EvalError::DivisionByZero));
        assert!(matches!(
            eval("extra.city > 1"),
            Err(EvalError::InvalidOperation(_))
        ));
    }
}
