use std::collections::HashMap;
use std::rc::Rc;
use crate::interpreter::ast::Function;
use crate::interpreter::value::Value;

/// Name-to-value bindings. Used both for the local environment and the
/// global table; the two are never chained, the evaluator consults the
/// globals itself after a local miss.
#[derive(Clone, Debug, Default)]
pub struct Environment {
    variables: HashMap<String, Value>,
}

/// A saved copy of an [`Environment`], restorable with [`Environment::restore`].
/// Arrays inside are shared with the live environment, not copied.
#[derive(Debug)]
pub struct Checkpoint(HashMap<String, Value>);

impl Environment {
    pub fn new() -> Environment {
        Environment::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn set(&mut self, name: String, value: Value) {
        self.variables.insert(name, value);
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.variables.clone())
    }

    /// Overwrites every binding with the checkpoint's, discarding names
    /// introduced and values reassigned since it was taken.
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.variables = checkpoint.0;
    }
}

/// Flat function namespace; redefinition replaces the earlier function.
#[derive(Debug, Default)]
pub struct FunctionTable {
    functions: HashMap<String, Rc<Function>>,
}

impl FunctionTable {
    pub fn new() -> FunctionTable {
        FunctionTable::default()
    }

    pub fn define(&mut self, function: Rc<Function>) {
        self.functions.insert(function.name.clone(), function);
    }

    pub fn get(&self, name: &str) -> Option<Rc<Function>> {
        self.functions.get(name).map(Rc::clone)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }
}
