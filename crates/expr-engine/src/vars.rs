use crate::value::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// Read-only name lookup used while evaluating.
///
/// Only top-level names go through the scope; `a.b` and `a[0]` are resolved
/// by the evaluator on the value returned for `a`.
pub trait Scope {
    fn lookup(&self, name: &str) -> Option<&Value>;
}

impl Scope for HashMap<String, Value> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl Scope for BTreeMap<String, Value> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl<S: Scope + ?Sized> Scope for &S {
    fn lookup(&self, name: &str) -> Option<&Value> {
        (**self).lookup(name)
    }
}

/// Variable store for evaluations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vars {
    vars: Map,
}

impl Vars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Binds `name`, returning the previous value if any.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.vars.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn del(&mut self, name: &str) -> Option<Value> {
        self.vars.remove(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.vars.iter()
    }

    /// Builds a store from a JSON object; any other JSON value yields `None`.
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        match Value::from(value) {
            Value::Map(vars) => Some(Vars { vars }),
            _ => None,
        }
    }
}

impl Scope for Vars {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }
}

impl From<Map> for Vars {
    fn from(vars: Map) -> Self {
        Vars { vars }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Vars {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Vars {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl From<Vars> for Value {
    fn from(v: Vars) -> Self {
        Value::Map(v.vars)
    }
}
