use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use field_accessor::{AccessorDescriptor, PersistError};
use proptest::prelude::*;

use crate::{context, PERSON};

fn hash_of(descriptor: &AccessorDescriptor) -> u64 {
    let mut hasher = DefaultHasher::new();
    descriptor.hash(&mut hasher);
    hasher.finish()
}

proptest! {
    #[test]
    fn binary_round_trip(
        type_name in "[a-zA-Z][a-zA-Z0-9.$]{0,40}",
        expression in "\\PC{0,120}",
        strict in any::<bool>(),
    ) {
        let descriptor = AccessorDescriptor::new(type_name, expression, strict);
        let bytes = descriptor.to_bytes().unwrap();
        let restored = AccessorDescriptor::from_bytes(&bytes).unwrap();
        prop_assert_eq!(&restored, &descriptor);
        prop_assert_eq!(restored.to_string(), descriptor.to_string());
        prop_assert!(!restored.is_compiled());
    }

    #[test]
    fn serde_round_trip(
        type_name in "[a-zA-Z][a-zA-Z0-9.$]{0,40}",
        expression in "\\PC{0,120}",
        strict in any::<bool>(),
    ) {
        let descriptor = AccessorDescriptor::new(type_name, expression, strict);
        let json = serde_json::to_string(&descriptor).unwrap();
        let restored: AccessorDescriptor = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(&restored, &descriptor);
        prop_assert!(!restored.is_compiled());
    }

    #[test]
    fn truncated_input_is_rejected(
        type_name in "[a-z.]{1,20}",
        expression in "[a-z. +]{0,30}",
        strict in any::<bool>(),
    ) {
        let bytes = AccessorDescriptor::new(type_name, expression, strict).to_bytes().unwrap();
        for cut in 0..bytes.len() {
            let truncated = AccessorDescriptor::from_bytes(&bytes[..cut]);
            prop_assert!(matches!(truncated, Err(PersistError::Io(_))), "cut at {}", cut);
        }
    }

    #[test]
    fn equality_follows_source_fields(
        a in ("[ab]{1,2}", "[xy]{1,2}", any::<bool>()),
        b in ("[ab]{1,2}", "[xy]{1,2}", any::<bool>()),
    ) {
        let left = AccessorDescriptor::new(a.0.clone(), a.1.clone(), a.2);
        let right = AccessorDescriptor::new(b.0.clone(), b.1.clone(), b.2);
        prop_assert_eq!(left == right, a == b);
        if left == right {
            prop_assert_eq!(hash_of(&left), hash_of(&right));
        }
    }
}

#[test]
fn test_compiled_descriptor_round_trips_uncompiled() {
    let mut descriptor = AccessorDescriptor::new(PERSON, "address.city", true);
    descriptor.compile(&context()).unwrap();

    let mut buffer = Vec::new();
    descriptor.write_external(&mut buffer).unwrap();
    let mut restored = AccessorDescriptor::read_external(&mut buffer.as_slice()).unwrap();
    assert_eq!(restored, descriptor);
    assert!(!restored.is_compiled());

    restored.compile(&context()).unwrap();
    assert_eq!(restored.result_kind(), descriptor.result_kind());
}

#[test]
fn test_invalid_boolean_byte() {
    let mut bytes = AccessorDescriptor::new(PERSON, "name", true)
        .to_bytes()
        .unwrap();
    if let Some(last) = bytes.last_mut() {
        *last = 7;
    }
    assert!(matches!(
        AccessorDescriptor::from_bytes(&bytes),
        Err(PersistError::InvalidBoolean(7))
    ));
}

#[test]
fn test_multibyte_text_length_is_in_bytes() {
    let descriptor = AccessorDescriptor::new("T", "名前", false);
    let bytes = descriptor.to_bytes().unwrap();
    assert_eq!(&bytes[3..5], &[0, 6]);
    assert_eq!(AccessorDescriptor::from_bytes(&bytes).unwrap(), descriptor);
}
