use tree_sitter::Language;

/// Node kinds and field names the call graph builder relies on.
///
/// The builder never matches on grammar strings directly; it goes through one
/// of these tables, so a front end for another grammar only has to supply its
/// own table.
#[derive(Debug)]
pub struct GrammarKinds {
    pub function_definition: &'static str,
    pub decorated_definition: &'static str,
    pub decorator: &'static str,
    pub call: &'static str,
    /// Bare name reference.
    pub identifier: &'static str,
    /// Member access: `obj.attr`.
    pub attribute: &'static str,
    pub async_keyword: &'static str,
    /// Indented statement sequence; every line-leading statement in it must
    /// start at the same column.
    pub block: &'static str,
    /// Statement kinds the grammar accepts but the language rejects.
    pub rejected_statements: &'static [&'static str],
    /// Child that makes a rejected `print` statement a valid expression
    /// (`print >> f, x` is a tuple expression in Python 3).
    pub chevron: &'static str,
    pub name_field: &'static str,
    pub function_field: &'static str,
    pub object_field: &'static str,
    pub attribute_field: &'static str,
}

/// tree-sitter-python node kinds.
pub static PYTHON_KINDS: GrammarKinds = GrammarKinds {
    function_definition: "function_definition",
    decorated_definition: "decorated_definition",
    decorator: "decorator",
    call: "call",
    identifier: "identifier",
    attribute: "attribute",
    async_keyword: "async",
    block: "block",
    rejected_statements: &["print_statement", "exec_statement"],
    chevron: "chevron",
    name_field: "name",
    function_field: "function",
    object_field: "object",
    attribute_field: "attribute",
};

/// Return the tree-sitter [`Language`] for the given file extension, or `None` if the extension
/// is not supported.
///
/// Only Python is handled: `.py` and `.pyi` (stubs parse with the same grammar).
pub fn language_for_extension(ext: &str) -> Option<Language> {
    match ext {
        "py" | "pyi" => Some(tree_sitter_python::LANGUAGE.into()),
        _ => None,
    }
}
