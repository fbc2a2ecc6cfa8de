use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::Arc,
};

use crate::context::TypeResolver;
use crate::eval::{EvalError, EvalResult};
use crate::types::TypeHandle;

/// Runtime value produced by and fed to compiled expressions.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Object(Arc<Object>),
    Class(TypeHandle),
}

/// An instance of an object type: its qualified type name and field values.
#[derive(Clone, Debug, PartialEq)]
pub struct Object {
    type_name: String,
    fields: HashMap<String, Value>,
}

impl Object {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: HashMap::new(),
        }
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }
}

impl Value {
    /// Runtime type of the value. Collections report `Any` elements.
    pub fn type_handle(&self) -> TypeHandle {
        match self {
            Value::Null => TypeHandle::Null,
            Value::Boolean(_) => TypeHandle::Boolean,
            Value::Integer(_) => TypeHandle::Integer,
            Value::Float(_) => TypeHandle::Float,
            Value::Text(_) => TypeHandle::Text,
            Value::List(_) => TypeHandle::list(TypeHandle::Any),
            Value::Map(_) => TypeHandle::map(TypeHandle::Any),
            Value::Object(object) => TypeHandle::object(object.type_name()),
            Value::Class(_) => TypeHandle::Class,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether the value can be bound where `ty` is expected.
    pub fn conforms_to(&self, ty: &TypeHandle) -> bool {
        match (ty, self) {
            (TypeHandle::Any, _) => true,
            (ty, Value::Null) => ty.is_nullable(),
            (TypeHandle::Float, Value::Integer(_)) => true,
            (TypeHandle::List(element), Value::List(items)) => {
                items.iter().all(|item| item.conforms_to(element))
            }
            (TypeHandle::Map(value), Value::Map(entries)) => {
                entries.values().all(|entry| entry.conforms_to(value))
            }
            (TypeHandle::Object(name), Value::Object(object)) => object.type_name() == name,
            (ty, value) => *ty == value.type_handle(),
        }
    }

    /// Binds a JSON document to a value of type `ty`, using `resolver` for object layouts.
    pub fn from_json(
        json: &serde_json::Value,
        ty: &TypeHandle,
        resolver: &dyn TypeResolver,
    ) -> EvalResult<Value> {
        use serde_json::Value as Json;

        let mismatch = || EvalError::TypeMismatch {
            expected: ty.to_string(),
            found: json_kind(json).to_string(),
        };

        match (ty, json) {
            (_, Json::Null) if ty.is_nullable() => Ok(Value::Null),
            (TypeHandle::Any, json) => Ok(Self::from_untyped_json(json)),
            (TypeHandle::Boolean, Json::Bool(b)) => Ok(Value::Boolean(*b)),
            (TypeHandle::Integer, Json::Number(n)) => n.as_i64().map(Value::Integer).ok_or_else(mismatch),
            (TypeHandle::Float, Json::Number(n)) => n.as_f64().map(Value::Float).ok_or_else(mismatch),
            (TypeHandle::Text, Json::String(s)) => Ok(Value::Text(s.clone())),
            (TypeHandle::Class, Json::String(s)) => Ok(Value::Class(resolver.resolve(s).map_err(|_| mismatch())?)),
            (TypeHandle::List(element), Json::Array(items)) => items
                .iter()
                .map(|item| Self::from_json(item, element, resolver))
                .collect::<EvalResult<Vec<_>>>()
                .map(Value::List),
            (TypeHandle::Map(value), Json::Object(entries)) => entries
                .iter()
                .map(|(k, v)| Ok((k.clone(), Self::from_json(v, value, resolver)?)))
                .collect::<EvalResult<BTreeMap<_, _>>>()
                .map(Value::Map),
            (TypeHandle::Object(name), Json::Object(entries)) => {
                let definition = resolver.definition(name).ok_or_else(mismatch)?;
                let mut object = Object::new(name.clone());
                for (key, raw) in entries {
                    let value = match definition.field(key) {
                        Some(field) => Self::from_json(raw, &field.ty, resolver)?,
                        None => Self::from_untyped_json(raw),
                    };
                    object.fields.insert(key.clone(), value);
                }
                Ok(Value::Object(Arc::new(object)))
            }
            _ => Err(mismatch()),
        }
    }

    fn from_untyped_json(json: &serde_json::Value) -> Value {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Boolean(*b),
            Json::Number(n) => n
                .as_i64()
                .map(Value::Integer)
                .unwrap_or_else(|| Value::Float(n.as_f64().unwrap_or(f64::NAN))),
            Json::String(s) => Value::Text(s.clone()),
            Json::Array(items) => Value::List(items.iter().map(Self::from_untyped_json).collect()),
            Json::Object(entries) => Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Self::from_untyped_json(v)))
                    .collect(),
            ),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Null => Json::Null,
            Value::Boolean(b) => Json::Bool(*b),
            Value::Integer(i) => Json::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Text(s) => Json::String(s.clone()),
            Value::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(entries) => Json::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Object(object) => Json::Object(
                object
                    .fields()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Class(ty) => Json::String(ty.to_string()),
        }
    }
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Object(object) => write!(f, "{}{{..}}", object.type_name()),
            Value::Class(ty) => write!(f, "{}.class", ty),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Value::Object(Arc::new(value))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}
