use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// A directed call from one function to a name.
///
/// `callee` is recorded as written; it may not match any defined function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallEdge {
    pub caller: String,
    pub callee: String,
}

impl CallEdge {
    pub fn new(caller: impl Into<String>, callee: impl Into<String>) -> Self {
        Self {
            caller: caller.into(),
            callee: callee.into(),
        }
    }
}

/// The result of one extraction.
///
/// - `functions`: every defined name, once, in first-seen order
/// - `calls`: call edges grouped by caller in visit order
/// - `code`: name → source text of the last definition with that name
///
/// Every `caller` in `calls` is in `functions`; callees need not be.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub functions: IndexSet<String>,
    pub calls: Vec<CallEdge>,
    pub code: IndexMap<String, String>,
}

impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.calls.is_empty() && self.code.is_empty()
    }

    pub fn contains_function(&self, name: &str) -> bool {
        self.functions.contains(name)
    }

    /// Names called by `caller`, in edge order.
    pub fn callees_of<'a>(&'a self, caller: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.calls
            .iter()
            .filter(move |e| e.caller == caller)
            .map(|e| e.callee.as_str())
    }

    /// Edges whose callee is not a defined function.
    pub fn dangling_edges(&self) -> impl Iterator<Item = &CallEdge> {
        self.calls
            .iter()
            .filter(|e| !self.functions.contains(e.callee.as_str()))
    }

    pub fn has_edge(&self, caller: &str, callee: &str) -> bool {
        self.calls
            .iter()
            .any(|e| e.caller == caller && e.callee == callee)
    }
}
