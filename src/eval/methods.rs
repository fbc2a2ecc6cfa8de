//! Methods available on text, list and map values without any type registration.

use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use super::{operators::values_equal, EvalError, EvalResult};
use crate::types::TypeHandle;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, EnumIter, AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum BuiltinMethod {
    Length,
    IsEmpty,
    ToUpperCase,
    ToLowerCase,
    Trim,
    Contains,
    StartsWith,
    EndsWith,
    Size,
    Get,
    ContainsKey,
}

/// Parameter and return types of a method for one receiver type.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub params: Vec<TypeHandle>,
    pub returns: TypeHandle,
}

impl Signature {
    fn new(params: Vec<TypeHandle>, returns: TypeHandle) -> Self {
        Self { params, returns }
    }
}

impl BuiltinMethod {
    /// Finds `name` among the methods of `receiver`.
    pub fn lookup(receiver: &TypeHandle, name: &str) -> Option<(BuiltinMethod, Signature)> {
        let method = name.parse::<BuiltinMethod>().ok()?;
        method.signature(receiver).map(|signature| (method, signature))
    }

    pub fn signature(self, receiver: &TypeHandle) -> Option<Signature> {
        use BuiltinMethod::*;

        let signature = match (receiver, self) {
            (TypeHandle::Text, Length) => Signature::new(vec![], TypeHandle::Integer),
            (TypeHandle::Text, IsEmpty) => Signature::new(vec![], TypeHandle::Boolean),
            (TypeHandle::Text, ToUpperCase | ToLowerCase | Trim) => {
                Signature::new(vec![], TypeHandle::Text)
            }
            (TypeHandle::Text, Contains | StartsWith | EndsWith) => {
                Signature::new(vec![TypeHandle::Text], TypeHandle::Boolean)
            }
            (TypeHandle::List(_) | TypeHandle::Map(_), Size) => {
                Signature::new(vec![], TypeHandle::Integer)
            }
            (TypeHandle::List(_) | TypeHandle::Map(_), IsEmpty) => {
                Signature::new(vec![], TypeHandle::Boolean)
            }
            (TypeHandle::List(element), Get) => {
                Signature::new(vec![TypeHandle::Integer], element.as_ref().clone())
            }
            (TypeHandle::List(_), Contains) => {
                Signature::new(vec![TypeHandle::Any], TypeHandle::Boolean)
            }
            (TypeHandle::Map(_), ContainsKey) => {
                Signature::new(vec![TypeHandle::Text], TypeHandle::Boolean)
            }
            (TypeHandle::Map(value), Get) => {
                Signature::new(vec![TypeHandle::Text], value.as_ref().clone())
            }
            _ => return None,
        };
        Some(signature)
    }

    pub fn invoke(self, receiver: &Value, args: &[Value]) -> EvalResult<Value> {
        use BuiltinMethod::*;

        match (self, receiver, args) {
            (Length, Value::Text(s), []) => Ok(Value::Integer(s.chars().count() as i64)),
            (IsEmpty, Value::Text(s), []) => Ok(Value::Boolean(s.is_empty())),
            (ToUpperCase, Value::Text(s), []) => Ok(Value::Text(s.to_uppercase())),
            (ToLowerCase, Value::Text(s), []) => Ok(Value::Text(s.to_lowercase())),
            (Trim, Value::Text(s), []) => Ok(Value::Text(s.trim().to_string())),
            (Contains, Value::Text(s), [Value::Text(needle)]) => {
                Ok(Value::Boolean(s.contains(needle.as_str())))
            }
            (StartsWith, Value::Text(s), [Value::Text(prefix)]) => {
                Ok(Value::Boolean(s.starts_with(prefix.as_str())))
            }
            (EndsWith, Value::Text(s), [Value::Text(suffix)]) => {
                Ok(Value::Boolean(s.ends_with(suffix.as_str())))
            }

            (Size, Value::List(items), []) => Ok(Value::Integer(items.len() as i64)),
            (IsEmpty, Value::List(items), []) => Ok(Value::Boolean(items.is_empty())),
            (Get, Value::List(items), [Value::Integer(index)]) => list_get(items, *index),
            (Contains, Value::List(items), [needle]) => Ok(Value::Boolean(
                items.iter().any(|item| values_equal(item, needle)),
            )),

            (Size, Value::Map(entries), []) => Ok(Value::Integer(entries.len() as i64)),
            (IsEmpty, Value::Map(entries), []) => Ok(Value::Boolean(entries.is_empty())),
            (ContainsKey, Value::Map(entries), [Value::Text(key)]) => {
                Ok(Value::Boolean(entries.contains_key(key)))
            }
            (Get, Value::Map(entries), [Value::Text(key)]) => {
                Ok(entries.get(key).cloned().unwrap_or_default())
            }

            (_, Value::Null, _) => Err(EvalError::null_dereference(self.to_string())),
            (_, receiver, _) => match self.signature(&receiver.type_handle()) {
                Some(signature) => Err(EvalError::method(
                    self.to_string(),
                    format!(
                        "expected {} argument(s) of type {}",
                        signature.params.len(),
                        signature
                            .params
                            .iter()
                            .map(ToString::to_string)
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                )),
                None => Err(EvalError::UnknownMethod {
                    type_name: receiver.type_handle().to_string(),
                    method: self.to_string(),
                }),
            },
        }
    }
}

pub(crate) fn list_get(items: &[Value], index: i64) -> EvalResult<Value> {
    usize::try_from(index)
        .ok()
        .and_then(|i| items.get(i))
        .cloned()
        .ok_or(EvalError::IndexOutOfBounds {
            index,
            len: items.len(),
        })
}
