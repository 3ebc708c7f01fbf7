use indexmap::IndexSet;
use tree_sitter::Node;

use crate::error::Result;
use crate::parser::definitions::{DefinitionSite, node_text};
use crate::parser::languages::GrammarKinds;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// What a call expression invokes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallTarget {
    /// Direct call of a bare name: `foo()`.
    Name(String),
    /// Call through member access: `obj.method()`. Never resolved.
    Attribute { object: String, attribute: String },
    /// Anything else: `fns[0]()`, `make()()`, `(lambda: 1)()`. Never resolved.
    Other,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Classify the callee of a single `call` node.
pub fn classify_call(call: Node<'_>, source: &str, kinds: &GrammarKinds) -> Result<CallTarget> {
    let Some(function) = call.child_by_field_name(kinds.function_field) else {
        return Ok(CallTarget::Other);
    };

    let kind = function.kind();
    if kind == kinds.identifier {
        return Ok(CallTarget::Name(node_text(function, source)?.to_owned()));
    }
    if kind == kinds.attribute {
        let object = match function.child_by_field_name(kinds.object_field) {
            Some(n) => node_text(n, source)?.to_owned(),
            None => String::new(),
        };
        let attribute = match function.child_by_field_name(kinds.attribute_field) {
            Some(n) => node_text(n, source)?.to_owned(),
            None => String::new(),
        };
        return Ok(CallTarget::Attribute { object, attribute });
    }
    Ok(CallTarget::Other)
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Calls found in one subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefinitionCalls {
    /// Bare-name callees. A name called twice appears once, at the position
    /// of its first call in document order.
    pub callees: IndexSet<String>,
    /// `(object, attribute)` of every member call, in document order.
    pub attribute_calls: Vec<(String, String)>,
}

/// Collect the calls inside `root`'s subtree, at any depth.
pub fn collect_direct_calls(
    root: Node<'_>,
    source: &str,
    kinds: &GrammarKinds,
    out: &mut DefinitionCalls,
) -> Result<()> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.kind() == kinds.call {
            match classify_call(node, source, kinds)? {
                CallTarget::Name(name) => {
                    out.callees.insert(name);
                }
                CallTarget::Attribute { object, attribute } => {
                    out.attribute_calls.push((object, attribute));
                }
                CallTarget::Other => {}
            }
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    Ok(())
}

/// Calls of one definition: its decorators first, then its own subtree
/// (parameters, body and every nested definition inside it).
pub fn calls_of_definition(
    def: &DefinitionSite<'_>,
    source: &str,
    kinds: &GrammarKinds,
) -> Result<DefinitionCalls> {
    let mut calls = DefinitionCalls::default();
    for decorator in &def.decorators {
        collect_direct_calls(*decorator, source, kinds, &mut calls)?;
    }
    collect_direct_calls(def.node, source, kinds, &mut calls)?;
    Ok(calls)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
