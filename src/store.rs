// Cross-session persisted state
//
// URL-addressed breakpoint descriptions outlive a Debugger session so a
// future enable can re-apply them. The storage backend is external; this
// module defines the value shape and the key-value interface the agent
// drives, plus a HashMap-backed implementation for tests and demos.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::breakpoints::{BreakpointDescription, BreakpointId};

/// Closed set of persisted value shapes. Cloning is explicit per variant;
/// the set is fixed at compile time, so no dynamic dispatch is involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateValue {
    Breakpoint(BreakpointDescription),
}

/// Store key for one persisted breakpoint description.
pub fn breakpoint_key(id: BreakpointId) -> String {
    format!("breakpoint/{id}")
}

/// Key-value store for state that survives domain teardown. Values are
/// cloned on the way in; the store owns its copies.
pub trait StateStore {
    fn put(&mut self, key: String, value: StateValue);
    fn remove(&mut self, key: &str);
    fn entries(&self) -> Vec<(String, StateValue)>;
}

/// In-memory store. Sufficient for sessions within one process; embedders
/// with durable storage supply their own `StateStore`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, StateValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn put(&mut self, key: String, value: StateValue) {
        self.values.insert(key, value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    fn entries(&self) -> Vec<(String, StateValue)> {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

// A shared handle lets one store back several sessions in turn, the way a
// durable backend would.
impl<S: StateStore> StateStore for Rc<RefCell<S>> {
    fn put(&mut self, key: String, value: StateValue) {
        self.borrow_mut().put(key, value);
    }

    fn remove(&mut self, key: &str) {
        self.borrow_mut().remove(key);
    }

    fn entries(&self) -> Vec<(String, StateValue)> {
        self.borrow().entries()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn description(url: &str) -> BreakpointDescription {
        BreakpointDescription {
            url: Some(url.to_string()),
            line: 10,
            column: None,
            condition: None,
        }
    }

    #[test]
    fn test_put_replaces_and_remove_deletes() {
        let mut store = MemoryStore::new();
        let key = breakpoint_key(100);

        store.put(key.clone(), StateValue::Breakpoint(description("a.js")));
        store.put(key.clone(), StateValue::Breakpoint(description("b.js")));
        assert_eq!(store.entries().len(), 1);

        let (_, value) = store.entries().pop().unwrap();
        assert_eq!(value, StateValue::Breakpoint(description("b.js")));

        store.remove(&key);
        assert!(store.entries().is_empty());
    }

    #[test]
    fn test_stored_value_is_an_independent_clone() {
        let mut store = MemoryStore::new();
        let mut original = description("a.js");
        store.put(
            breakpoint_key(100),
            StateValue::Breakpoint(original.clone()),
        );

        original.line = 99;

        let (_, value) = store.entries().pop().unwrap();
        let StateValue::Breakpoint(stored) = value;
        assert_eq!(stored.line, 10);
    }
}
