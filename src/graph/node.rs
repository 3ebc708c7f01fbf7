/// Metadata about a defined function.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FunctionInfo {
    /// The function's identifier.
    pub name: String,
    /// Source text of the (last) definition.
    pub code: String,
}

/// A node in the call graph: a defined function, or a name that is called but
/// never defined in the source unit (builtins, imports, typos).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum GraphNode {
    Function(FunctionInfo),
    Unresolved { name: String },
}

impl GraphNode {
    pub fn name(&self) -> &str {
        match self {
            GraphNode::Function(info) => &info.name,
            GraphNode::Unresolved { name } => name,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self, GraphNode::Function(_))
    }
}
