//! Declaration extraction.
//!
//! Walks the top level of one parsed file and produces its
//! [`FileDeclarations`]. Nothing is filtered by export status. A declaration
//! whose name cannot be read (missing node, empty text, or the blank
//! identifier) is skipped.

use goqual_core::catalogue::{
    DeclKind, Declaration, FileDeclarations, InterfaceDeclaration, InterfaceMethod,
};
use tree_sitter::Node;

use crate::parser::{field_children, line_of, named_children, ParsedFile};

/// Extract every top-level declaration of `file`.
pub fn extract_declarations(file: &ParsedFile) -> FileDeclarations {
    let mut decls = FileDeclarations::default();

    for node in named_children(file.root()) {
        match node.kind() {
            "import_declaration" => collect_imports(file, node, &mut decls.imports),
            "function_declaration" => {
                decls.functions.extend(named_decl(file, node, DeclKind::Function));
            }
            "method_declaration" => {
                decls.functions.extend(named_decl(file, node, DeclKind::Method));
            }
            "type_declaration" => collect_types(file, node, &mut decls),
            "const_declaration" => {
                collect_values(file, node, "const_spec", DeclKind::Const, &mut decls.constants);
            }
            "var_declaration" => {
                collect_values(file, node, "var_spec", DeclKind::Var, &mut decls.variables);
            }
            _ => {}
        }
    }

    decls
}

fn declared_name(file: &ParsedFile, name: Node<'_>) -> Option<(String, u32)> {
    let text = file.text(name).trim();
    if text.is_empty() || text == "_" {
        return None;
    }
    Some((text.to_string(), line_of(name)))
}

fn named_decl(file: &ParsedFile, node: Node<'_>, kind: DeclKind) -> Option<Declaration> {
    let (name, line) = declared_name(file, node.child_by_field_name("name")?)?;
    Some(Declaration::new(name, kind, line))
}

fn collect_imports(file: &ParsedFile, node: Node<'_>, imports: &mut Vec<String>) {
    for child in named_children(node) {
        match child.kind() {
            "import_spec" => {
                if let Some(path) = child.child_by_field_name("path") {
                    imports.push(file.text(path).to_string());
                }
            }
            "import_spec_list" => collect_imports(file, child, imports),
            _ => {}
        }
    }
}

fn collect_types(file: &ParsedFile, node: Node<'_>, decls: &mut FileDeclarations) {
    for spec in named_children(node) {
        if !matches!(spec.kind(), "type_spec" | "type_alias") {
            continue;
        }
        let Some(decl) = named_decl(file, spec, DeclKind::Type) else {
            continue;
        };
        match spec.child_by_field_name("type") {
            Some(ty) if ty.kind() == "interface_type" => {
                decls.interfaces.push(InterfaceDeclaration {
                    decl: Declaration {
                        kind: DeclKind::Interface,
                        ..decl
                    },
                    methods: interface_methods(file, ty),
                });
            }
            _ => decls.types.push(decl),
        }
    }
}

/// Method names of an interface body in source order, duplicates kept.
fn interface_methods(file: &ParsedFile, body: Node<'_>) -> Vec<InterfaceMethod> {
    named_children(body)
        .into_iter()
        .filter(|elem| matches!(elem.kind(), "method_elem" | "method_spec"))
        .filter_map(|elem| declared_name(file, elem.child_by_field_name("name")?))
        .map(|(name, line)| InterfaceMethod { name, line })
        .collect()
}

fn collect_values(
    file: &ParsedFile,
    node: Node<'_>,
    spec_kind: &str,
    kind: DeclKind,
    out: &mut Vec<Declaration>,
) {
    for child in named_children(node) {
        if child.kind() == spec_kind {
            for name in field_children(child, "name") {
                if let Some((name, line)) = declared_name(file, name) {
                    out.push(Declaration::new(name, kind, line));
                }
            }
        } else if child.kind().ends_with("_spec_list") {
            collect_values(file, child, spec_kind, kind, out);
        }
    }
}
