//! Per-invocation variable dictionaries.

use std::collections::HashMap;
use std::rc::Rc;

use crate::term::Variable;

/// A repository of variables for one rule invocation.
///
/// Looking up the same name twice returns handles to the same binding
/// cell; this is what gives same-named occurrences within one rule their
/// shared identity, and what makes different invocations of the same rule
/// disjoint (each gets its own scope).
#[derive(Default)]
pub struct Scope {
    variables: HashMap<Rc<str>, Variable>,
}

impl Scope {
    /// An empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the variable of the given name, creating it on first sight.
    pub fn lookup(&mut self, name: &str) -> Variable {
        if let Some(variable) = self.variables.get(name) {
            return variable.clone();
        }
        let variable = Variable::new(name);
        self.variables.insert(variable.name_key(), variable.clone());
        variable
    }

    /// Removes all variables from this scope.
    pub fn clear(&mut self) {
        self.variables.clear();
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
