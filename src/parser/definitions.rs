use tree_sitter::Node;

use crate::error::{ExtractError, Result};
use crate::parser::SyntaxTree;
use crate::parser::span::Span;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// A function definition found in the syntax tree.
#[derive(Debug, Clone)]
pub struct DefinitionSite<'t> {
    /// The function's identifier.
    pub name: String,
    /// The `function_definition` node: header plus body.
    pub node: Node<'t>,
    /// From `def` (or `async`) to the last token of the body. Decorators and
    /// trailing comments are not part of it.
    pub span: Span,
    /// `true` for `async def`.
    pub is_async: bool,
    /// Decorator nodes attached to this definition, in source order.
    /// Their expressions count as part of the definition for call extraction.
    pub decorators: Vec<Node<'t>>,
}

impl DefinitionSite<'_> {
    /// 1-based line of the `def` keyword (or `async`).
    pub fn line(&self) -> usize {
        self.span.start_line
    }
}

// ---------------------------------------------------------------------------
// Helper utilities
// ---------------------------------------------------------------------------

pub(crate) fn node_text<'a>(node: Node<'_>, source: &'a str) -> Result<&'a str> {
    node.utf8_text(source.as_bytes()).map_err(|e| {
        ExtractError::MalformedTree(format!(
            "node `{}` at line {} is not valid UTF-8: {e}",
            node.kind(),
            node.start_position().row + 1
        ))
    })
}

fn is_async(node: Node<'_>, async_keyword: &str) -> bool {
    node.child(0).is_some_and(|c| c.kind() == async_keyword)
}

/// The last token of `node` that is not a comment, descending through the
/// last child at every level. tree-sitter attaches comments that trail an
/// indented body to the innermost block, so the node's own end overshoots.
fn last_token(node: Node<'_>) -> Node<'_> {
    let mut current = node;
    loop {
        let mut cursor = current.walk();
        let last = current
            .children(&mut cursor)
            .filter(|c| !c.is_extra())
            .last();
        match last {
            Some(child) => current = child,
            None => return current,
        }
    }
}

fn decorators_of<'t>(node: Node<'t>, tree: &SyntaxTree) -> Vec<Node<'t>> {
    let kinds = tree.kinds();
    match node.parent() {
        Some(parent) if parent.kind() == kinds.decorated_definition => {
            let mut cursor = parent.walk();
            parent
                .named_children(&mut cursor)
                .filter(|c| c.kind() == kinds.decorator)
                .collect()
        }
        _ => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Collect every function definition in the tree, depth-first in document order.
///
/// Nested definitions (inside other functions, classes, or control blocks) are
/// returned as first-class entries, each directly after its enclosing
/// definition.
///
/// # Parameters
/// - `tree`: an error-free syntax tree
/// - `source`: the text `tree` was parsed from
/// - `include_async`: whether `async def` counts as a definition
///
/// # Errors
/// [`ExtractError::MalformedTree`] if a definition has no name node or its name
/// cannot be read from `source`.
pub fn collect_definitions<'t>(
    tree: &'t SyntaxTree,
    source: &str,
    include_async: bool,
) -> Result<Vec<DefinitionSite<'t>>> {
    let kinds = tree.kinds();
    let mut out = Vec::new();

    let mut stack = vec![tree.root_node()];
    while let Some(node) = stack.pop() {
        if node.kind() == kinds.function_definition {
            let is_async = is_async(node, kinds.async_keyword);
            if include_async || !is_async {
                let name_node = node.child_by_field_name(kinds.name_field).ok_or_else(|| {
                    ExtractError::MalformedTree(format!(
                        "function definition at line {} has no name",
                        node.start_position().row + 1
                    ))
                })?;
                out.push(DefinitionSite {
                    name: node_text(name_node, source)?.to_owned(),
                    node,
                    span: Span::between(node, last_token(node)),
                    is_async,
                    decorators: decorators_of(node, tree),
                });
            }
        }

        let mut cursor = node.walk();
        let children: Vec<Node<'t>> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }

    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
