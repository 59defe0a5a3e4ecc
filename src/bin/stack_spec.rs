// Stack example suite, runnable as a libtest-compatible binary.
// Usage: cargo run --bin stack_spec -- [FILTER...] [--list] [--exact] [--skip FILTER]

use std::cell::RefCell;

use scenario::{assert_fails, harness, Scope, Specification};

struct StackSpec;

impl Specification for StackSpec {
    fn name() -> String {
        "stack_spec".to_string()
    }

    fn define(s: &mut Scope) {
        s.subject("stack", |s| {
            let stack = RefCell::new(Vec::new());

            s.when("non-empty", |s| {
                let value = 7;
                stack.borrow_mut().push(value);

                s.should("return the head value on pop", || {
                    assert_eq!(stack.borrow_mut().pop(), Some(value));
                });

                s.should("not be empty", || {
                    assert!(!stack.borrow().is_empty());
                });

                s.and("another value is pushed", |s| {
                    stack.borrow_mut().push(value * 2);

                    s.should("have two values", || {
                        assert_eq!(stack.borrow().len(), 2);
                    });
                });
            });

            s.when("empty", |s| {
                s.should("complain on pop", || {
                    let error = assert_fails(|| match stack.borrow_mut().pop() {
                        Some(_) => Ok(()),
                        None => Err("stack is empty"),
                    });
                    assert_eq!(error.to_string(), "stack is empty");
                });

                s.should("have zero length", || {
                    assert_eq!(stack.borrow().len(), 0);
                });
            });
        });
    }
}

fn main() {
    harness::main::<StackSpec>();
}
