use thiserror::Error;

use crate::types::TypeHandle;

/// Error type for type checking operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypeCheckError {
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: TypeHandle,
        found: TypeHandle,
    },

    #[error("unknown member `{member}` on {type_name}")]
    UnknownMember { type_name: String, member: String },

    #[error("unknown method `{method}` on {type_name}")]
    UnknownMethod { type_name: String, method: String },

    #[error("undefined variable: {0}")]
    UndefinedVariable(String),

    #[error("undefined type: {0}")]
    UndefinedType(String),

    #[error("invalid operator type: operator {operator} cannot be applied to {left_type} and {right_type}")]
    InvalidOperatorType {
        operator: String,
        left_type: TypeHandle,
        right_type: TypeHandle,
    },

    #[error("invalid operand type: operator {operator} cannot be applied to {operand_type}")]
    InvalidOperandType {
        operator: String,
        operand_type: TypeHandle,
    },

    #[error("invalid arguments for `{method}`: {message}")]
    InvalidArgument { method: String, message: String },

    #[error("strong typing violation: {message}")]
    StrictTyping { message: String },

    #[error("{feature} are not enabled")]
    FeatureDisabled { feature: String },
}

impl TypeCheckError {
    pub fn type_mismatch(expected: TypeHandle, found: TypeHandle) -> Self {
        Self::TypeMismatch { expected, found }
    }

    pub fn unknown_member(type_name: impl ToString, member: impl Into<String>) -> Self {
        Self::UnknownMember {
            type_name: type_name.to_string(),
            member: member.into(),
        }
    }

    pub fn unknown_method(type_name: impl ToString, method: impl Into<String>) -> Self {
        Self::UnknownMethod {
            type_name: type_name.to_string(),
            method: method.into(),
        }
    }

    pub fn strict(message: impl Into<String>) -> Self {
        Self::StrictTyping {
            message: message.into(),
        }
    }

    pub fn feature_disabled(feature: impl Into<String>) -> Self {
        Self::FeatureDisabled {
            feature: feature.into(),
        }
    }
}

/// Result type for type checking operations
pub type TypeCheckResult<T> = Result<T, TypeCheckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let error = TypeCheckError::unknown_member(TypeHandle::object("com.acme.Person"), "nmae");
        assert_eq!(error.to_string(), "unknown member `nmae` on com.acme.Person");

        let error = TypeCheckError::InvalidOperatorType {
            operator: "-".to_string(),
            left_type: TypeHandle::Text,
            right_type: TypeHandle::Integer,
        };
        assert_eq!(
            error.to_string(),
            "invalid operator type: operator - cannot be applied to Text and Integer"
        );

        let error = TypeCheckError::feature_disabled("class literals");
        assert_eq!(error.to_string(), "class literals are not enabled");
    }
}
