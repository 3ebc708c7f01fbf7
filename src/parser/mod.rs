pub mod calls;
pub mod definitions;
pub mod languages;
pub mod span;

use std::cell::RefCell;

use tree_sitter::{Node, Parser, Tree};

use crate::error::{ExtractError, Result, SyntaxError};

use languages::{GrammarKinds, PYTHON_KINDS};

// Thread-local Parser instance: one per rayon worker thread, no lock contention.
thread_local! {
    static PARSER_PY: RefCell<Parser> = RefCell::new({
        let mut p = Parser::new();
        p.set_language(&tree_sitter_python::LANGUAGE.into())
            .expect("tree-sitter-python grammar is ABI-compatible with tree-sitter");
        p
    });
}

/// A parsed source unit together with the node-kind table of its grammar.
///
/// Only produced for error-free trees: a [`Frontend`] reports broken input as
/// [`SyntaxError`] instead.
pub struct SyntaxTree {
    tree: Tree,
    kinds: &'static GrammarKinds,
}

impl SyntaxTree {
    pub fn new(tree: Tree, kinds: &'static GrammarKinds) -> Self {
        Self { tree, kinds }
    }

    pub fn root_node(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn kinds(&self) -> &'static GrammarKinds {
        self.kinds
    }
}

/// Turns source text into a [`SyntaxTree`].
pub trait Frontend {
    /// # Errors
    /// - [`ExtractError::Syntax`] when the text does not parse
    /// - [`ExtractError::Frontend`] when the underlying parser gives up
    fn parse(&self, source: &str) -> Result<SyntaxTree>;
}

/// Python front end backed by tree-sitter-python.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonFrontend;

impl Frontend for PythonFrontend {
    fn parse(&self, source: &str) -> Result<SyntaxTree> {
        let tree = PARSER_PY
            .with(|p| p.borrow_mut().parse(source, None))
            .ok_or_else(|| ExtractError::Frontend("tree-sitter returned no tree".into()))?;

        if let Some(err) = first_syntax_error(tree.root_node(), &PYTHON_KINDS) {
            return Err(err.into());
        }

        Ok(SyntaxTree::new(tree, &PYTHON_KINDS))
    }
}

/// Locate the first syntax error in document order.
///
/// tree-sitter recovers from bad input instead of failing, and its grammar is
/// looser than the language, so three things count as errors here:
/// - `ERROR` and `MISSING` nodes
/// - statement kinds listed in [`GrammarKinds::rejected_statements`]
/// - a block whose line-leading statements do not share one column
pub fn first_syntax_error(root: Node<'_>, kinds: &GrammarKinds) -> Option<SyntaxError> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_missing() || node.is_error() {
            let message = if node.is_missing() {
                format!("expected `{}`", node.kind())
            } else {
                "invalid syntax".to_owned()
            };
            return Some(syntax_error_at(node, message));
        }
        if kinds.rejected_statements.contains(&node.kind()) && !has_child_kind(node, kinds.chevron) {
            let keyword = node.child(0).map(|c| c.kind()).unwrap_or("statement");
            return Some(syntax_error_at(
                node,
                format!("invalid syntax: `{keyword}` is a statement only in Python 2"),
            ));
        }
        if node.kind() == kinds.block
            && let Some(err) = misaligned_statement(node)
        {
            return Some(err);
        }

        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }

    // has_error() was set but no offending node was reachable; still a failure.
    if root.has_error() {
        return Some(syntax_error_at(root, "invalid syntax".to_owned()));
    }
    None
}

fn syntax_error_at(node: Node<'_>, message: String) -> SyntaxError {
    let pos = node.start_position();
    SyntaxError {
        message,
        line: pos.row + 1,
        column: pos.column + 1,
    }
}

fn has_child_kind(node: Node<'_>, kind: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == kind);
    found
}

/// Check that every statement opening a line in `block` starts at the column
/// of the first one. Statements sharing a line with the previous one
/// (`a; b`, or an inline body after `:`) and comments are not checked.
fn misaligned_statement(block: Node<'_>) -> Option<SyntaxError> {
    let mut prev_end_row = block.prev_sibling().map(|n| n.end_position().row);
    let mut indent: Option<usize> = None;

    let mut cursor = block.walk();
    let children: Vec<Node<'_>> = block.named_children(&mut cursor).collect();
    for child in children.into_iter().filter(|c| !c.is_extra()) {
        let start = child.start_position();
        let leads_line = prev_end_row.is_none_or(|row| start.row > row);
        prev_end_row = Some(child.end_position().row);
        if !leads_line {
            continue;
        }
        match indent {
            None => indent = Some(start.column),
            Some(col) if start.column > col => {
                return Some(syntax_error_at(child, "unexpected indent".to_owned()));
            }
            Some(col) if start.column < col => {
                return Some(syntax_error_at(
                    child,
                    "unindent does not match any outer indentation level".to_owned(),
                ));
            }
            Some(_) => {}
        }
    }
    None
}
