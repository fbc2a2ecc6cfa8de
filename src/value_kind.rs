use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::types::TypeHandle;

/// Coarse classification of a statically known result type, used by consumers to pick a
/// coercion or comparison strategy without evaluating anything.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Null,
    Boolean,
    Integer,
    Float,
    Text,
    List,
    Map,
    Object,
    ClassLiteral,
}

/// Maps a result type to its [`ValueKind`].
#[mockall::automock]
pub trait ValueKindClassifier: Send + Sync {
    fn classify(&self, ty: &TypeHandle) -> ValueKind;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultValueKindClassifier;

impl ValueKindClassifier for DefaultValueKindClassifier {
    fn classify(&self, ty: &TypeHandle) -> ValueKind {
        match ty {
            TypeHandle::Null => ValueKind::Null,
            TypeHandle::Boolean => ValueKind::Boolean,
            TypeHandle::Integer => ValueKind::Integer,
            TypeHandle::Float => ValueKind::Float,
            TypeHandle::Text => ValueKind::Text,
            TypeHandle::List(_) => ValueKind::List,
            TypeHandle::Map(_) => ValueKind::Map,
            TypeHandle::Class => ValueKind::ClassLiteral,
            TypeHandle::Object(_) | TypeHandle::Any => ValueKind::Object,
        }
    }
}
