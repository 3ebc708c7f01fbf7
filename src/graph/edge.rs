/// The kind of directed edge between two nodes in the call graph.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum EdgeKind {
    /// Function -> Function or Function -> Unresolved: the caller invokes the callee by name.
    Calls,
}
