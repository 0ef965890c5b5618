//! tree-sitter parsing for Go sources.
//!
//! A [`ParsedFile`] owns its source text and syntax tree together so node
//! text can always be resolved. Lines reported by the helpers here are
//! 1-indexed.

use tree_sitter::{Node, Parser, Tree};

use crate::error::{GoError, GoResult};

/// Reusable Go parser.
pub struct GoParser {
    parser: Parser,
}

impl GoParser {
    /// Create a parser loaded with the Go grammar.
    pub fn new() -> GoResult<Self> {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_go::LANGUAGE.into())?;
        Ok(GoParser { parser })
    }

    /// Parse `source`; `path` is only used for error messages.
    pub fn parse(&mut self, path: &str, source: impl Into<String>) -> GoResult<ParsedFile> {
        let source = source.into();
        let tree = self
            .parser
            .parse(&source, None)
            .ok_or_else(|| GoError::NoTree {
                path: path.to_string(),
            })?;
        Ok(ParsedFile { source, tree })
    }
}

/// A Go file together with its syntax tree.
pub struct ParsedFile {
    source: String,
    tree: Tree,
}

impl std::fmt::Debug for ParsedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedFile")
            .field("len", &self.source.len())
            .field("has_errors", &self.has_errors())
            .finish()
    }
}

impl ParsedFile {
    /// Parse a single file with a fresh parser.
    pub fn parse(path: &str, source: impl Into<String>) -> GoResult<Self> {
        GoParser::new()?.parse(path, source)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// The `source_file` node.
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Whether the tree contains syntax errors.
    pub fn has_errors(&self) -> bool {
        self.root().has_error()
    }

    /// Source text covered by `node`.
    pub fn text(&self, node: Node<'_>) -> &str {
        self.source.get(node.byte_range()).unwrap_or("")
    }

    /// Name from the file's `package` clause.
    pub fn package_name(&self) -> Option<&str> {
        let clause = named_children(self.root())
            .into_iter()
            .find(|n| n.kind() == "package_clause")?;
        let ident = named_children(clause)
            .into_iter()
            .find(|n| n.kind() == "package_identifier")?;
        Some(self.text(ident))
    }
}

/// 1-indexed line where `node` starts.
pub fn line_of(node: Node<'_>) -> u32 {
    node.start_position().row as u32 + 1
}

/// Named children of `node`, in order.
pub fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Every child stored under `field`, in order.
pub fn field_children<'t>(node: Node<'t>, field: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor).collect()
}

/// Whether `node` has an anonymous child token of kind `token`.
pub fn has_token(node: Node<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == token);
    found
}
