use std::thread;

use field_accessor::{AccessorDescriptor, Value};

use crate::{context, person, PERSON};

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_descriptor_is_shareable() {
    assert_send_sync::<AccessorDescriptor>();
}

#[test]
fn test_concurrent_evaluation() {
    let mut descriptor = AccessorDescriptor::new(PERSON, "age * 2 + name.length()", true);
    descriptor.compile(&context()).unwrap();
    let descriptor = &descriptor;

    thread::scope(|scope| {
        let workers: Vec<_> = (0..8)
            .map(|worker| {
                scope.spawn(move || {
                    for age in 0..500_i64 {
                        let instance = Value::from(person("Ann", age + worker));
                        let expected = Value::Integer((age + worker) * 2 + 3);
                        assert_eq!(descriptor.evaluate(&instance), Ok(expected));
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
    });
}

#[test]
fn test_independent_descriptors_compile_in_parallel() {
    let expressions = ["name", "age + 1", "address.city", "tags.size()"];
    let descriptors: Vec<AccessorDescriptor> = thread::scope(|scope| {
        let handles: Vec<_> = expressions
            .iter()
            .map(|expression| {
                scope.spawn(move || {
                    let mut descriptor = AccessorDescriptor::new(PERSON, *expression, true);
                    descriptor.compile(&context()).map(|_| descriptor)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap().unwrap())
            .collect()
    });
    assert!(descriptors.iter().all(AccessorDescriptor::is_compiled));
}
