//! Type-satisfaction oracle.
//!
//! [`TypeOracle`] is the narrow capability the implementation matcher needs:
//! list the named types of the loaded packages, and answer whether a type's
//! value or pointer method set satisfies an interface. [`SyntaxOracle`]
//! answers from syntax alone:
//!
//! - Method sets follow Go's receiver rules: `T` has the value-receiver
//!   methods, `*T` has all of them.
//! - Methods of embedded struct fields are promoted. A field embedded by
//!   value contributes its value methods to `T` and all methods to `*T`; a
//!   field embedded by pointer contributes all methods to both. A name
//!   promoted at a shallower depth hides deeper ones; a name supplied by two
//!   embeds at the same depth is ambiguous and belongs to neither set.
//! - `type T U` keeps only the methods declared on `T`, but still promotes
//!   through the embedded fields of `U`'s underlying struct.
//! - Interfaces are flattened through embedded interfaces, including the
//!   predeclared `error`. Interfaces carrying type terms are constraints and
//!   are never satisfied.
//! - Signatures are compared after whitespace normalization with package
//!   qualifiers dropped, so `io.Reader` and `Reader` compare equal.
//! - Generic types and aliases are not modeled.
//!
//! When an answer depends on a type outside the loaded packages the oracle
//! returns `None` rather than guessing.

use std::collections::{BTreeMap, BTreeSet};

use tree_sitter::Node;

use crate::index::GoPackage;
use crate::parser::{field_children, has_token, named_children, ParsedFile};

// ============================================================================
// Capability
// ============================================================================

/// Which method set of a type is queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Receiver {
    /// The method set of `T`.
    Value,
    /// The method set of `*T`.
    Pointer,
}

impl Receiver {
    /// Implementer label for `label` under this receiver.
    pub fn implementer_label(self, label: &str) -> String {
        match self {
            Receiver::Value => label.to_string(),
            Receiver::Pointer => format!("*{}", label),
        }
    }
}

/// A named type declared in a loaded package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef {
    /// Directory of the declaring package, relative to the scan root.
    pub package_dir: String,
    /// Declared package name; `None` when the file had no package clause.
    pub package: Option<String>,
    pub name: String,
}

impl TypeRef {
    pub fn new(package_dir: impl Into<String>, package: Option<&str>, name: impl Into<String>) -> Self {
        TypeRef {
            package_dir: package_dir.into(),
            package: package.map(str::to_string),
            name: name.into(),
        }
    }

    /// `<package>.<Name>`, or `None` without a resolvable package.
    pub fn label(&self) -> Option<String> {
        self.package
            .as_ref()
            .map(|package| format!("{}.{}", package, self.name))
    }

    fn same_package(&self, name: &str) -> TypeRef {
        TypeRef {
            package_dir: self.package_dir.clone(),
            package: self.package.clone(),
            name: name.to_string(),
        }
    }
}

/// Answers "does this method set satisfy that interface".
pub trait TypeOracle {
    /// Named non-interface types, in a stable order.
    fn concrete_types(&self) -> Vec<TypeRef>;

    /// Named interface types, in a stable order.
    fn interfaces(&self) -> Vec<TypeRef>;

    /// Whether `candidate`'s `receiver` method set satisfies `target`.
    ///
    /// `None` means the oracle cannot decide.
    fn satisfies(&self, candidate: &TypeRef, receiver: Receiver, target: &TypeRef) -> Option<bool>;
}

// ============================================================================
// Syntax Model
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum TypeName {
    Local(String),
    Qualified { package: String, name: String },
}

#[derive(Debug, Clone)]
enum InterfaceEmbed {
    Named(TypeName),
    /// A union, approximation, or other type term.
    Constraint,
}

#[derive(Debug, Clone)]
struct FieldEmbed {
    /// `None` when the embedded type cannot be named (e.g. generic).
    target: Option<TypeName>,
    pointer: bool,
}

#[derive(Debug, Clone)]
enum TypeShape {
    Interface {
        methods: Vec<(String, String)>,
        embeds: Vec<InterfaceEmbed>,
    },
    Struct(Vec<FieldEmbed>),
    /// `type T U` for another named type `U`.
    Defined(TypeName),
    Other,
}

#[derive(Debug, Clone)]
struct MethodDecl {
    name: String,
    signature: String,
    pointer: bool,
}

#[derive(Debug, Clone)]
struct Required {
    signature: String,
    /// Package (dir, name) declaring the method; matters for unexported names.
    origin: (String, Option<String>),
}

enum Requirement {
    Methods(BTreeMap<String, Required>),
    Unsatisfiable,
    Unknown,
}

#[derive(Default)]
struct MethodSet {
    methods: BTreeMap<String, String>,
    incomplete: bool,
}

/// A method name reachable from a type.
#[derive(Debug, Clone)]
struct Selector {
    /// Embedding depth; `0` for methods declared on the type itself.
    depth: usize,
    /// `None` when the name is ambiguous at its depth or its receiver
    /// excludes it from the queried method set.
    signature: Option<String>,
}

impl Selector {
    fn at(depth: usize, signature: Option<String>) -> Self {
        Selector { depth, signature }
    }
}

#[derive(Default)]
struct Selectors {
    names: BTreeMap<String, Selector>,
    incomplete: bool,
}

impl Selectors {
    fn unknown() -> Self {
        Selectors {
            incomplete: true,
            ..Default::default()
        }
    }
}

enum Underlying<'a> {
    /// The struct and the type its embedded names resolve from.
    Struct(TypeRef, &'a [FieldEmbed]),
    /// No embedded fields to promote.
    Opaque,
    Unknown,
}

const ERROR_INTERFACE: &str = "error";
const ERROR_METHOD: &str = "Error";
const ERROR_SIGNATURE: &str = "()(string)";

/// Longest `type T U` chain followed before giving up.
const MAX_DEFINED_DEPTH: usize = 16;

// ============================================================================
// Syntax Oracle
// ============================================================================

/// [`TypeOracle`] computed from the parsed packages.
#[derive(Debug, Default)]
pub struct SyntaxOracle {
    types: BTreeMap<TypeRef, TypeShape>,
    methods: BTreeMap<TypeRef, Vec<MethodDecl>>,
    /// (package name, type name) to the first matching type, in dir order.
    by_qualified: BTreeMap<(String, String), TypeRef>,
}

impl SyntaxOracle {
    /// Build the model from every file of every package.
    pub fn new(packages: &[GoPackage]) -> Self {
        let mut oracle = SyntaxOracle::default();
        for package in packages {
            for file in &package.files {
                oracle.collect_file(&package.dir, package.name.as_deref(), &file.parsed);
            }
        }
        for key in oracle.types.keys() {
            if let Some(package) = &key.package {
                oracle
                    .by_qualified
                    .entry((package.clone(), key.name.clone()))
                    .or_insert_with(|| key.clone());
            }
        }
        tracing::debug!(
            "oracle: {} named types, {} receivers with methods",
            oracle.types.len(),
            oracle.methods.len()
        );
        oracle
    }

    fn collect_file(&mut self, dir: &str, package: Option<&str>, file: &ParsedFile) {
        for node in named_children(file.root()) {
            match node.kind() {
                "type_declaration" => {
                    for spec in named_children(node) {
                        if spec.kind() != "type_spec"
                            || spec.child_by_field_name("type_parameters").is_some()
                        {
                            continue;
                        }
                        let (Some(name), Some(ty)) =
                            (spec.child_by_field_name("name"), spec.child_by_field_name("type"))
                        else {
                            continue;
                        };
                        let key = TypeRef::new(dir, package, file.text(name));
                        self.types.insert(key, shape_of(file, ty));
                    }
                }
                "method_declaration" => {
                    let Some((receiver, pointer)) = receiver_of(file, node) else {
                        continue;
                    };
                    let Some(name) = node.child_by_field_name("name") else {
                        continue;
                    };
                    let signature = signature(
                        file,
                        node.child_by_field_name("parameters"),
                        node.child_by_field_name("result"),
                    );
                    self.methods
                        .entry(TypeRef::new(dir, package, receiver))
                        .or_default()
                        .push(MethodDecl {
                            name: file.text(name).to_string(),
                            signature,
                            pointer,
                        });
                }
                _ => {}
            }
        }
    }

    fn resolve(&self, from: &TypeRef, name: &TypeName) -> Option<TypeRef> {
        match name {
            TypeName::Local(local) => {
                let key = from.same_package(local);
                self.types.contains_key(&key).then_some(key)
            }
            TypeName::Qualified { package, name } => self
                .by_qualified
                .get(&(package.clone(), name.clone()))
                .cloned(),
        }
    }

    fn is_builtin_error(&self, from: &TypeRef, name: &TypeName) -> bool {
        matches!(name, TypeName::Local(local) if local == ERROR_INTERFACE)
            && self.resolve(from, name).is_none()
    }

    fn is_interface(&self, ty: &TypeRef, depth: usize) -> bool {
        match self.types.get(ty) {
            Some(TypeShape::Interface { .. }) => true,
            Some(TypeShape::Defined(name)) if depth < MAX_DEFINED_DEPTH => {
                self.is_builtin_error(ty, name)
                    || self
                        .resolve(ty, name)
                        .is_some_and(|target| self.is_interface(&target, depth + 1))
            }
            _ => false,
        }
    }

    /// Flattened method requirements of an interface.
    fn requirements(&self, target: &TypeRef, visited: &mut BTreeSet<TypeRef>) -> Requirement {
        if !visited.insert(target.clone()) {
            return Requirement::Methods(BTreeMap::new());
        }
        let origin = (target.package_dir.clone(), target.package.clone());
        let embeds: Vec<InterfaceEmbed> = match self.types.get(target) {
            Some(TypeShape::Interface { embeds, .. }) => embeds.clone(),
            Some(TypeShape::Defined(name)) => vec![InterfaceEmbed::Named(name.clone())],
            Some(_) => return Requirement::Unsatisfiable,
            None => return Requirement::Unknown,
        };

        let mut required = BTreeMap::new();
        if let Some(TypeShape::Interface { methods, .. }) = self.types.get(target) {
            for (name, signature) in methods {
                required.insert(
                    name.clone(),
                    Required {
                        signature: signature.clone(),
                        origin: origin.clone(),
                    },
                );
            }
        }

        let mut unknown = false;
        for embed in embeds {
            let name = match embed {
                InterfaceEmbed::Constraint => return Requirement::Unsatisfiable,
                InterfaceEmbed::Named(name) => name,
            };
            if self.is_builtin_error(target, &name) {
                required.entry(ERROR_METHOD.to_string()).or_insert(Required {
                    signature: ERROR_SIGNATURE.to_string(),
                    origin: (String::new(), None),
                });
                continue;
            }
            let Some(embedded) = self.resolve(target, &name) else {
                // `comparable` and friends, or a package outside the scan
                if matches!(name, TypeName::Local(_)) {
                    return Requirement::Unsatisfiable;
                }
                unknown = true;
                continue;
            };
            match self.requirements(&embedded, visited) {
                Requirement::Methods(methods) => {
                    for (name, req) in methods {
                        required.entry(name).or_insert(req);
                    }
                }
                Requirement::Unsatisfiable => return Requirement::Unsatisfiable,
                Requirement::Unknown => unknown = true,
            }
        }

        if unknown {
            Requirement::Unknown
        } else {
            Requirement::Methods(required)
        }
    }

    /// Method set of `ty` under `receiver`, including promoted methods.
    fn method_set(&self, ty: &TypeRef, receiver: Receiver) -> MethodSet {
        let selectors = self.selectors(ty, receiver, &mut BTreeSet::new());
        MethodSet {
            methods: selectors
                .names
                .into_iter()
                .filter_map(|(name, selector)| selector.signature.map(|signature| (name, signature)))
                .collect(),
            incomplete: selectors.incomplete,
        }
    }

    /// Method selectors of `ty`, each at the shallowest depth it occurs.
    ///
    /// `path` holds the types on the current embedding chain.
    fn selectors(&self, ty: &TypeRef, receiver: Receiver, path: &mut BTreeSet<TypeRef>) -> Selectors {
        let mut found = Selectors::default();
        if !self.types.contains_key(ty) {
            found.incomplete = true;
            return found;
        }
        if !path.insert(ty.clone()) {
            return found;
        }

        if self.is_interface(ty, 0) {
            match self.requirements(ty, &mut BTreeSet::new()) {
                Requirement::Methods(methods) => {
                    for (name, req) in methods {
                        found.names.insert(name, Selector::at(0, Some(req.signature)));
                    }
                }
                _ => found.incomplete = true,
            }
            path.remove(ty);
            return found;
        }

        // Declared methods outside the set still shadow promoted ones.
        for method in self.methods.get(ty).map(Vec::as_slice).unwrap_or(&[]) {
            let signature = (!method.pointer || receiver == Receiver::Pointer)
                .then(|| method.signature.clone());
            found.names.insert(method.name.clone(), Selector::at(0, signature));
        }

        let mut promoted: BTreeMap<String, Selector> = BTreeMap::new();
        match self.underlying_struct(ty) {
            Underlying::Struct(owner, embeds) => {
                for embed in embeds {
                    let inner = self.embedded_selectors(&owner, embed, receiver, path);
                    found.incomplete |= inner.incomplete;
                    for (name, selector) in inner.names {
                        let depth = selector.depth + 1;
                        match promoted.get_mut(&name) {
                            None => {
                                promoted.insert(name, Selector::at(depth, selector.signature));
                            }
                            Some(existing) if depth < existing.depth => {
                                *existing = Selector::at(depth, selector.signature);
                            }
                            // Two embeds supply the name at one depth: ambiguous.
                            Some(existing) if depth == existing.depth => existing.signature = None,
                            Some(_) => {}
                        }
                    }
                }
            }
            Underlying::Opaque => {}
            Underlying::Unknown => found.incomplete = true,
        }
        for (name, selector) in promoted {
            found.names.entry(name).or_insert(selector);
        }

        path.remove(ty);
        found
    }

    fn embedded_selectors(
        &self,
        owner: &TypeRef,
        embed: &FieldEmbed,
        receiver: Receiver,
        path: &mut BTreeSet<TypeRef>,
    ) -> Selectors {
        let Some(name) = &embed.target else {
            return Selectors::unknown();
        };
        if self.is_builtin_error(owner, name) {
            let mut found = Selectors::default();
            found.names.insert(
                ERROR_METHOD.to_string(),
                Selector::at(0, Some(ERROR_SIGNATURE.to_string())),
            );
            return found;
        }
        let Some(target) = self.resolve(owner, name) else {
            return Selectors::unknown();
        };
        let inner_receiver = if embed.pointer {
            Receiver::Pointer
        } else {
            receiver
        };
        self.selectors(&target, inner_receiver, path)
    }

    /// The struct underneath `ty`, following `type T U` chains.
    fn underlying_struct(&self, ty: &TypeRef) -> Underlying<'_> {
        let mut current = ty.clone();
        for _ in 0..MAX_DEFINED_DEPTH {
            match self.types.get(&current) {
                Some(TypeShape::Struct(embeds)) => return Underlying::Struct(current, embeds),
                Some(TypeShape::Defined(name)) => match self.resolve(&current, name) {
                    Some(next) => current = next,
                    // A predeclared type such as `int`
                    None if matches!(name, TypeName::Local(_)) => return Underlying::Opaque,
                    None => return Underlying::Unknown,
                },
                Some(_) => return Underlying::Opaque,
                None => return Underlying::Unknown,
            }
        }
        Underlying::Unknown
    }
}

impl TypeOracle for SyntaxOracle {
    fn concrete_types(&self) -> Vec<TypeRef> {
        self.types
            .keys()
            .filter(|ty| !self.is_interface(ty, 0))
            .cloned()
            .collect()
    }

    fn interfaces(&self) -> Vec<TypeRef> {
        self.types
            .keys()
            .filter(|ty| self.is_interface(ty, 0))
            .cloned()
            .collect()
    }

    fn satisfies(&self, candidate: &TypeRef, receiver: Receiver, target: &TypeRef) -> Option<bool> {
        if candidate == target {
            return Some(false);
        }
        let required = match self.requirements(target, &mut BTreeSet::new()) {
            Requirement::Methods(methods) => methods,
            Requirement::Unsatisfiable => return Some(false),
            Requirement::Unknown => return None,
        };
        let set = self.method_set(candidate, receiver);
        let candidate_package = (candidate.package_dir.clone(), candidate.package.clone());

        let mut undecided = false;
        for (name, req) in &required {
            if !is_exported(name) && req.origin != candidate_package {
                return Some(false);
            }
            match set.methods.get(name) {
                Some(signature) if *signature == req.signature => {}
                Some(_) => return Some(false),
                None if set.incomplete => undecided = true,
                None => return Some(false),
            }
        }
        if undecided {
            None
        } else {
            Some(true)
        }
    }
}

// ============================================================================
// Syntax Helpers
// ============================================================================

fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

fn type_name(file: &ParsedFile, node: Node<'_>) -> Option<TypeName> {
    match node.kind() {
        "type_identifier" => Some(TypeName::Local(file.text(node).to_string())),
        "qualified_type" => Some(TypeName::Qualified {
            package: file.text(node.child_by_field_name("package")?).to_string(),
            name: file.text(node.child_by_field_name("name")?).to_string(),
        }),
        _ => None,
    }
}

fn shape_of(file: &ParsedFile, ty: Node<'_>) -> TypeShape {
    match ty.kind() {
        "interface_type" => {
            let mut methods = Vec::new();
            let mut embeds = Vec::new();
            for elem in named_children(ty) {
                match elem.kind() {
                    "method_elem" | "method_spec" => {
                        if let Some(name) = elem.child_by_field_name("name") {
                            methods.push((
                                file.text(name).to_string(),
                                signature(
                                    file,
                                    elem.child_by_field_name("parameters"),
                                    elem.child_by_field_name("result"),
                                ),
                            ));
                        }
                    }
                    "type_elem" | "constraint_elem" => {
                        let terms = named_children(elem);
                        let embed = match terms.as_slice() {
                            [single] => type_name(file, *single)
                                .map(InterfaceEmbed::Named)
                                .unwrap_or(InterfaceEmbed::Constraint),
                            _ => InterfaceEmbed::Constraint,
                        };
                        embeds.push(embed);
                    }
                    "type_identifier" | "qualified_type" => {
                        if let Some(name) = type_name(file, elem) {
                            embeds.push(InterfaceEmbed::Named(name));
                        }
                    }
                    "comment" => {}
                    _ => embeds.push(InterfaceEmbed::Constraint),
                }
            }
            TypeShape::Interface { methods, embeds }
        }
        "struct_type" => {
            let mut embeds = Vec::new();
            for list in named_children(ty) {
                if list.kind() != "field_declaration_list" {
                    continue;
                }
                for field in named_children(list) {
                    if field.kind() != "field_declaration" || !field_children(field, "name").is_empty() {
                        continue;
                    }
                    let Some(mut embedded) = field.child_by_field_name("type") else {
                        continue;
                    };
                    let mut pointer = has_token(field, "*");
                    if embedded.kind() == "pointer_type" {
                        pointer = true;
                        match embedded.named_child(0) {
                            Some(inner) => embedded = inner,
                            None => continue,
                        }
                    }
                    embeds.push(FieldEmbed {
                        target: type_name(file, embedded),
                        pointer,
                    });
                }
            }
            TypeShape::Struct(embeds)
        }
        "type_identifier" | "qualified_type" => type_name(file, ty)
            .map(TypeShape::Defined)
            .unwrap_or(TypeShape::Other),
        _ => TypeShape::Other,
    }
}

/// Receiver type name of a method and whether the receiver is a pointer.
fn receiver_of(file: &ParsedFile, method: Node<'_>) -> Option<(String, bool)> {
    let list = method.child_by_field_name("receiver")?;
    let param = named_children(list)
        .into_iter()
        .find(|n| n.kind() == "parameter_declaration")?;
    let mut ty = param.child_by_field_name("type")?;
    let mut pointer = false;
    if ty.kind() == "pointer_type" {
        pointer = true;
        ty = ty.named_child(0)?;
    }
    (ty.kind() == "type_identifier").then(|| (file.text(ty).to_string(), pointer))
}

/// `(<params>)(<results>)` with one entry per parameter, types normalized.
fn signature(file: &ParsedFile, params: Option<Node<'_>>, result: Option<Node<'_>>) -> String {
    let params = params.map(|p| parameter_types(file, p)).unwrap_or_default();
    let results = match result {
        Some(node) if node.kind() == "parameter_list" => parameter_types(file, node),
        Some(node) => vec![normalize_type(file.text(node))],
        None => Vec::new(),
    };
    format!("({})({})", params.join(","), results.join(","))
}

fn parameter_types(file: &ParsedFile, list: Node<'_>) -> Vec<String> {
    let mut types = Vec::new();
    for param in named_children(list) {
        let Some(ty) = param.child_by_field_name("type") else {
            continue;
        };
        let ty = normalize_type(file.text(ty));
        match param.kind() {
            "parameter_declaration" => {
                let count = field_children(param, "name").len().max(1);
                for _ in 0..count {
                    types.push(ty.clone());
                }
            }
            "variadic_parameter_declaration" => types.push(format!("...{}", ty)),
            _ => {}
        }
    }
    types
}

/// Collapse whitespace and drop package qualifiers from a type expression.
fn normalize_type(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut ident_start: Option<usize> = None;
    let mut pending_space = false;

    for (i, &c) in chars.iter().enumerate() {
        let is_ident = c.is_alphanumeric() || c == '_';
        if c.is_whitespace() {
            pending_space = true;
            ident_start = None;
            continue;
        }
        if is_ident {
            if ident_start.is_none() {
                if pending_space && out.chars().last().is_some_and(|p| p.is_alphanumeric() || p == '_') {
                    out.push(' ');
                }
                ident_start = Some(out.len());
            }
            out.push(c);
        } else if let (Some(start), '.') = (ident_start, c) {
            let next_is_ident = chars
                .get(i + 1)
                .is_some_and(|n| n.is_alphabetic() || *n == '_');
            if next_is_ident {
                out.truncate(start);
            } else {
                out.push(c);
            }
            ident_start = None;
        } else {
            ident_start = None;
            out.push(c);
        }
        pending_space = false;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::LoadedFile;

    fn package(dir: &str, files: &[&str]) -> GoPackage {
        let files: Vec<LoadedFile> = files
            .iter()
            .enumerate()
            .map(|(i, source)| LoadedFile {
                relative: format!("{}/f{}.go", dir, i),
                parsed: ParsedFile::parse("test.go", *source).unwrap(),
            })
            .collect();
        let name = files[0].parsed.package_name().map(str::to_string);
        GoPackage {
            dir: dir.to_string(),
            name,
            files,
        }
    }

    fn ty(dir: &str, name: &str) -> TypeRef {
        TypeRef::new(dir, Some(dir.rsplit('/').next().unwrap_or(dir)), name)
    }

    mod normalization {
        use super::*;

        #[test]
        fn qualifiers_and_spaces() {
            assert_eq!(normalize_type("io.Reader"), "Reader");
            assert_eq!(normalize_type("[]  *bytes.Buffer"), "[]*Buffer");
            assert_eq!(normalize_type("map[string] chan int"), "map[string]chan int");
            assert_eq!(normalize_type("func(a int) error"), "func(a int)error");
        }

        #[test]
        fn parameter_names_are_ignored() {
            let file = ParsedFile::parse(
                "t.go",
                "package p\ntype I interface {\n\tM(int, int) (string, error)\n}\nfunc (T) M(a, b int) (s string, err error) { return }\ntype T struct{}\n",
            )
            .unwrap();
            let oracle = SyntaxOracle::new(&[GoPackage {
                dir: "p".to_string(),
                name: Some("p".to_string()),
                files: vec![LoadedFile {
                    relative: "p/t.go".to_string(),
                    parsed: file,
                }],
            }]);
            assert_eq!(
                oracle.satisfies(&ty("p", "T"), Receiver::Value, &ty("p", "I")),
                Some(true)
            );
        }
    }

    mod receivers {
        use super::*;

        const SOURCE: &str = "package shapes

type Shape interface {
	Area() float64
}

type Square struct{ side float64 }

func (s Square) Area() float64 { return s.side * s.side }

type Circle struct{ r float64 }

func (c *Circle) Area() float64 { return 3 * c.r * c.r }
";

        #[test]
        fn value_receiver_satisfies_both_sets() {
            let oracle = SyntaxOracle::new(&[package("shapes", &[SOURCE])]);
            let shape = ty("shapes", "Shape");
            let square = ty("shapes", "Square");
            assert_eq!(oracle.satisfies(&square, Receiver::Value, &shape), Some(true));
            assert_eq!(oracle.satisfies(&square, Receiver::Pointer, &shape), Some(true));
        }

        #[test]
        fn pointer_receiver_satisfies_only_pointer_set() {
            let oracle = SyntaxOracle::new(&[package("shapes", &[SOURCE])]);
            let shape = ty("shapes", "Shape");
            let circle = ty("shapes", "Circle");
            assert_eq!(oracle.satisfies(&circle, Receiver::Value, &shape), Some(false));
            assert_eq!(oracle.satisfies(&circle, Receiver::Pointer, &shape), Some(true));
        }

        #[test]
        fn candidates_exclude_interfaces() {
            let oracle = SyntaxOracle::new(&[package("shapes", &[SOURCE])]);
            assert_eq!(
                oracle.concrete_types(),
                vec![ty("shapes", "Circle"), ty("shapes", "Square")]
            );
            assert_eq!(oracle.interfaces(), vec![ty("shapes", "Shape")]);
        }

        #[test]
        fn mismatched_signature_does_not_satisfy() {
            let oracle = SyntaxOracle::new(&[package(
                "p",
                &["package p\ntype I interface{ M(x int) }\ntype T struct{}\nfunc (T) M(x string) {}\n"],
            )]);
            assert_eq!(
                oracle.satisfies(&ty("p", "T"), Receiver::Pointer, &ty("p", "I")),
                Some(false)
            );
        }
    }

    mod embedding {
        use super::*;

        #[test]
        fn value_embed_promotes_value_methods() {
            let oracle = SyntaxOracle::new(&[package(
                "p",
                &["package p
type Namer interface{ Name() string }
type Setter interface{ SetName(string) }
type Base struct{}
func (Base) Name() string { return \"\" }
func (*Base) SetName(string) {}
type Outer struct{ Base }
type Ptr struct{ *Base }
"],
            )]);
            let namer = ty("p", "Namer");
            let setter = ty("p", "Setter");
            let outer = ty("p", "Outer");
            let ptr = ty("p", "Ptr");
            assert_eq!(oracle.satisfies(&outer, Receiver::Value, &namer), Some(true));
            assert_eq!(oracle.satisfies(&outer, Receiver::Value, &setter), Some(false));
            assert_eq!(oracle.satisfies(&outer, Receiver::Pointer, &setter), Some(true));
            assert_eq!(oracle.satisfies(&ptr, Receiver::Value, &setter), Some(true));
        }

        #[test]
        fn same_depth_names_are_ambiguous() {
            let oracle = SyntaxOracle::new(&[package(
                "p",
                &["package p
type I interface{ M() }
type A struct{}
func (A) M() {}
type B struct{}
func (B) M() {}
type T struct {
	A
	B
}
"],
            )]);
            let i = ty("p", "I");
            assert_eq!(oracle.satisfies(&ty("p", "T"), Receiver::Value, &i), Some(false));
            assert_eq!(oracle.satisfies(&ty("p", "T"), Receiver::Pointer, &i), Some(false));
        }

        #[test]
        fn shallower_embed_wins_over_field_order() {
            let oracle = SyntaxOracle::new(&[package(
                "p",
                &["package p
type I interface{ M() int }
type Deep struct{}
func (Deep) M() string { return \"\" }
type Wrap struct{ Deep }
type Near struct{}
func (Near) M() int { return 0 }
type T struct {
	Wrap
	Near
}
type U struct {
	Wrap
}
"],
            )]);
            let i = ty("p", "I");
            assert_eq!(oracle.satisfies(&ty("p", "T"), Receiver::Value, &i), Some(true));
            assert_eq!(oracle.satisfies(&ty("p", "U"), Receiver::Value, &i), Some(false));
        }

        #[test]
        fn diamond_embedding_is_ambiguous() {
            let oracle = SyntaxOracle::new(&[package(
                "p",
                &["package p
type I interface{ M() }
type C struct{}
func (C) M() {}
type A struct{ C }
type B struct{ C }
type T struct {
	A
	B
}
"],
            )]);
            assert_eq!(
                oracle.satisfies(&ty("p", "T"), Receiver::Value, &ty("p", "I")),
                Some(false)
            );
        }

        #[test]
        fn declared_pointer_method_hides_promoted_value_method() {
            let oracle = SyntaxOracle::new(&[package(
                "p",
                &["package p
type I interface{ M() }
type Base struct{}
func (Base) M() {}
type T struct{ Base }
func (*T) M() {}
"],
            )]);
            let i = ty("p", "I");
            assert_eq!(oracle.satisfies(&ty("p", "T"), Receiver::Value, &i), Some(false));
            assert_eq!(oracle.satisfies(&ty("p", "T"), Receiver::Pointer, &i), Some(true));
        }

        #[test]
        fn defined_type_promotes_through_underlying_struct() {
            let oracle = SyntaxOracle::new(&[package(
                "p",
                &["package p
type Namer interface{ Name() string }
type Closer interface{ Close() }
type Base struct{}
func (Base) Name() string { return \"\" }
type Outer struct{ Base }
func (Outer) Close() {}
type Renamed Outer
"],
            )]);
            let renamed = ty("p", "Renamed");
            assert_eq!(oracle.satisfies(&renamed, Receiver::Value, &ty("p", "Namer")), Some(true));
            assert_eq!(oracle.satisfies(&renamed, Receiver::Value, &ty("p", "Closer")), Some(false));
        }

        #[test]
        fn embedded_builtin_error_is_promoted() {
            let oracle = SyntaxOracle::new(&[package(
                "p",
                &["package p
type Failure interface{ Error() string }
type Wrapped struct{ error }
"],
            )]);
            assert_eq!(
                oracle.satisfies(&ty("p", "Wrapped"), Receiver::Value, &ty("p", "Failure")),
                Some(true)
            );
        }

        #[test]
        fn embedded_interfaces_are_flattened() {
            let oracle = SyntaxOracle::new(&[package(
                "p",
                &["package p
type Reader interface{ Read([]byte) (int, error) }
type Closer interface{ Close() error }
type ReadCloser interface {
	Reader
	Closer
}
type File struct{}
func (*File) Read(b []byte) (int, error) { return 0, nil }
func (*File) Close() error { return nil }
type Half struct{}
func (Half) Close() error { return nil }
"],
            )]);
            let rc = ty("p", "ReadCloser");
            assert_eq!(oracle.satisfies(&ty("p", "File"), Receiver::Pointer, &rc), Some(true));
            assert_eq!(oracle.satisfies(&ty("p", "Half"), Receiver::Pointer, &rc), Some(false));
        }

        #[test]
        fn builtin_error_is_known() {
            let oracle = SyntaxOracle::new(&[package(
                "p",
                &["package p
type Failure interface {
	error
	Code() int
}
type E struct{}
func (E) Error() string { return \"\" }
func (E) Code() int { return 1 }
"],
            )]);
            assert_eq!(
                oracle.satisfies(&ty("p", "E"), Receiver::Value, &ty("p", "Failure")),
                Some(true)
            );
        }

        #[test]
        fn qualified_embed_across_packages() {
            let oracle = SyntaxOracle::new(&[
                package("lib/base", &["package base\ntype Runner interface{ Run() }\ntype Impl struct{}\nfunc (Impl) Run() {}\n"]),
                package("app", &["package app\nimport \"lib/base\"\ntype Job struct{ base.Impl }\n"]),
            ]);
            assert_eq!(
                oracle.satisfies(&ty("app", "Job"), Receiver::Value, &ty("lib/base", "Runner")),
                Some(true)
            );
        }

        #[test]
        fn unknown_external_embed_is_undecided() {
            let oracle = SyntaxOracle::new(&[package(
                "p",
                &["package p\nimport \"sync\"\ntype I interface{ Lock() }\ntype T struct{ sync.Mutex }\n"],
            )]);
            assert_eq!(oracle.satisfies(&ty("p", "T"), Receiver::Pointer, &ty("p", "I")), None);
        }
    }

    mod interfaces {
        use super::*;

        #[test]
        fn constraint_interfaces_are_never_satisfied() {
            let oracle = SyntaxOracle::new(&[package(
                "p",
                &["package p\ntype Number interface{ ~int | ~float64 }\ntype N int\n"],
            )]);
            assert_eq!(
                oracle.satisfies(&ty("p", "N"), Receiver::Value, &ty("p", "Number")),
                Some(false)
            );
        }

        #[test]
        fn empty_interface_matches_everything() {
            let oracle = SyntaxOracle::new(&[package("p", &["package p\ntype Any interface{}\ntype N int\n"])]);
            assert_eq!(
                oracle.satisfies(&ty("p", "N"), Receiver::Value, &ty("p", "Any")),
                Some(true)
            );
        }

        #[test]
        fn unexported_methods_stay_in_their_package() {
            let oracle = SyntaxOracle::new(&[
                package("a", &["package a\ntype sealed interface{ seal() }\ntype Inside struct{}\nfunc (Inside) seal() {}\n"]),
                package("b", &["package b\ntype Outside struct{}\nfunc (Outside) seal() {}\n"]),
            ]);
            let sealed = ty("a", "sealed");
            assert_eq!(oracle.satisfies(&ty("a", "Inside"), Receiver::Value, &sealed), Some(true));
            assert_eq!(oracle.satisfies(&ty("b", "Outside"), Receiver::Value, &sealed), Some(false));
        }

        #[test]
        fn generic_types_are_not_modeled() {
            let oracle = SyntaxOracle::new(&[package(
                "p",
                &["package p\ntype List[T any] struct{ items []T }\ntype Plain struct{}\n"],
            )]);
            assert_eq!(oracle.concrete_types(), vec![ty("p", "Plain")]);
        }
    }

    #[test]
    fn labels() {
        assert_eq!(ty("x/pkg", "T").label().as_deref(), Some("pkg.T"));
        assert_eq!(TypeRef::new("x", None, "T").label(), None);
        assert_eq!(Receiver::Pointer.implementer_label("pkg.T"), "*pkg.T");
        assert_eq!(Receiver::Value.implementer_label("pkg.T"), "pkg.T");
    }
}
