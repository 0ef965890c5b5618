//! Catalogue data model: per-file declarations, the implementation matrix,
//! and the reverse symbol index.
//!
//! The catalogue is built once per indexer run and is immutable afterwards.
//! Maps are ordered so that serializing an unchanged tree yields identical
//! output.
//!
//! ## Reverse Index Collision Policy
//!
//! The reverse index maps a symbol name to exactly one defining file. It is
//! built from every file's declarations without an export filter, visiting
//! files in path order and, within a file, the categories in
//! [`SymbolCategory::ORDER`]. A later write for the same name overwrites the
//! earlier owner ([`SymbolIndex::insert_or_overwrite`] returns the displaced
//! path so callers can report it). Names declared in more than one file
//! therefore resolve to whichever file was written last.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GoqualError;

// ============================================================================
// Declarations
// ============================================================================

/// Kind of a top-level declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Const,
    Var,
    Type,
    Function,
    Method,
    Interface,
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeclKind::Const => "const",
            DeclKind::Var => "var",
            DeclKind::Type => "type",
            DeclKind::Function => "function",
            DeclKind::Method => "method",
            DeclKind::Interface => "interface",
        };
        f.write_str(name)
    }
}

/// A named top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclKind,
    /// 1-indexed line of the declared name.
    pub line: u32,
}

impl Declaration {
    pub fn new(name: impl Into<String>, kind: DeclKind, line: u32) -> Self {
        Declaration {
            name: name.into(),
            kind,
            line,
        }
    }
}

/// A method name required by an interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceMethod {
    pub name: String,
    pub line: u32,
}

/// An interface type declaration with its method names in source order.
///
/// Only names are kept here; whether a type satisfies the interface is
/// answered by the type oracle, not derived from this list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDeclaration {
    #[serde(flatten)]
    pub decl: Declaration,
    pub methods: Vec<InterfaceMethod>,
}

/// Structured breakdown of one source file's declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDeclarations {
    /// Import paths, as written in the source.
    pub imports: Vec<String>,
    pub constants: Vec<Declaration>,
    pub variables: Vec<Declaration>,
    pub types: Vec<Declaration>,
    /// Functions and methods (methods carry [`DeclKind::Method`]).
    pub functions: Vec<Declaration>,
    pub interfaces: Vec<InterfaceDeclaration>,
}

impl FileDeclarations {
    /// Total number of declarations (imports excluded).
    pub fn declaration_count(&self) -> usize {
        self.constants.len()
            + self.variables.len()
            + self.types.len()
            + self.functions.len()
            + self.interfaces.len()
    }
}

// ============================================================================
// Reverse Symbol Index
// ============================================================================

/// Category of the reverse index a symbol is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolCategory {
    Constants,
    Variables,
    Types,
    Functions,
    Interfaces,
}

impl SymbolCategory {
    /// Fixed visiting order used when building and when flattening.
    pub const ORDER: [SymbolCategory; 5] = [
        SymbolCategory::Constants,
        SymbolCategory::Variables,
        SymbolCategory::Types,
        SymbolCategory::Functions,
        SymbolCategory::Interfaces,
    ];
}

/// Reverse lookup: symbol name to defining file path, grouped by category.
///
/// Serialized as `{constants, variables, types, functions, interfaces}`, each
/// an object of name to path. Missing categories decode as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolIndex {
    #[serde(default)]
    pub constants: BTreeMap<String, String>,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    #[serde(default)]
    pub types: BTreeMap<String, String>,
    #[serde(default)]
    pub functions: BTreeMap<String, String>,
    #[serde(default)]
    pub interfaces: BTreeMap<String, String>,
}

/// Flattened reverse index: one owner per name across all categories.
pub type FlatIndex = BTreeMap<String, String>;

impl SymbolIndex {
    pub fn category(&self, category: SymbolCategory) -> &BTreeMap<String, String> {
        match category {
            SymbolCategory::Constants => &self.constants,
            SymbolCategory::Variables => &self.variables,
            SymbolCategory::Types => &self.types,
            SymbolCategory::Functions => &self.functions,
            SymbolCategory::Interfaces => &self.interfaces,
        }
    }

    fn category_mut(&mut self, category: SymbolCategory) -> &mut BTreeMap<String, String> {
        match category {
            SymbolCategory::Constants => &mut self.constants,
            SymbolCategory::Variables => &mut self.variables,
            SymbolCategory::Types => &mut self.types,
            SymbolCategory::Functions => &mut self.functions,
            SymbolCategory::Interfaces => &mut self.interfaces,
        }
    }

    /// Record `name → path`, replacing any prior owner in the same category.
    ///
    /// Returns the displaced owner, if any.
    pub fn insert_or_overwrite(
        &mut self,
        category: SymbolCategory,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> Option<String> {
        self.category_mut(category).insert(name.into(), path.into())
    }

    /// Number of entries across all categories.
    pub fn len(&self) -> usize {
        SymbolCategory::ORDER
            .iter()
            .map(|c| self.category(*c).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Merge all categories into one map.
    ///
    /// Categories are merged in [`SymbolCategory::ORDER`]; a name present in
    /// several categories keeps the owner from the last one.
    pub fn flatten(&self) -> FlatIndex {
        let mut flat = FlatIndex::new();
        for category in SymbolCategory::ORDER {
            for (name, path) in self.category(category) {
                flat.insert(name.clone(), path.clone());
            }
        }
        flat
    }
}

/// A reverse-index write that displaced an earlier owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexCollision {
    pub name: String,
    pub previous: String,
    pub current: String,
}

/// Build the reverse index from per-file declarations.
///
/// Methods are indexed under `functions` alongside plain functions, so a
/// method name can displace a function of the same name. Every overwrite by
/// another file is returned as an [`IndexCollision`].
pub fn build_symbol_index(
    files: &BTreeMap<String, FileDeclarations>,
) -> (SymbolIndex, Vec<IndexCollision>) {
    let mut index = SymbolIndex::default();
    let mut collisions = Vec::new();

    for (path, decls) in files {
        for category in SymbolCategory::ORDER {
            let names: Vec<&str> = match category {
                SymbolCategory::Constants => decls.constants.iter().map(|d| d.name.as_str()).collect(),
                SymbolCategory::Variables => decls.variables.iter().map(|d| d.name.as_str()).collect(),
                SymbolCategory::Types => decls.types.iter().map(|d| d.name.as_str()).collect(),
                SymbolCategory::Functions => decls.functions.iter().map(|d| d.name.as_str()).collect(),
                SymbolCategory::Interfaces => {
                    decls.interfaces.iter().map(|d| d.decl.name.as_str()).collect()
                }
            };
            for name in names {
                if let Some(previous) = index.insert_or_overwrite(category, name, path.as_str()) {
                    if previous != *path {
                        tracing::debug!(
                            "reverse index: {} moved from {} to {}",
                            name,
                            previous,
                            path
                        );
                        collisions.push(IndexCollision {
                            name: name.to_string(),
                            previous,
                            current: path.clone(),
                        });
                    }
                }
            }
        }
    }

    (index, collisions)
}

// ============================================================================
// Global Catalogue
// ============================================================================

/// Whole-tree catalogue produced by the indexer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalCatalogue {
    /// Per-file declarations keyed by path relative to the scan root.
    pub files: BTreeMap<String, FileDeclarations>,
    /// Interface label to the labels of its implementers.
    ///
    /// Labels are `<package>.<Name>`; pointer-receiver implementers carry a
    /// leading `*`.
    pub implementations: BTreeMap<String, BTreeSet<String>>,
    /// Optional reverse lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<SymbolIndex>,
}

impl GlobalCatalogue {
    /// Create a catalogue from per-file declarations.
    pub fn from_files(files: BTreeMap<String, FileDeclarations>) -> Self {
        GlobalCatalogue {
            files,
            ..Default::default()
        }
    }

    /// Populate the reverse index from the current files.
    pub fn with_reverse_index(mut self) -> (Self, Vec<IndexCollision>) {
        let (index, collisions) = build_symbol_index(&self.files);
        self.index = Some(index);
        (self, collisions)
    }

    /// Number of (interface, implementer) relations.
    pub fn implementation_count(&self) -> usize {
        self.implementations.values().map(BTreeSet::len).sum()
    }
}

// ============================================================================
// Catalogue File (patcher input)
// ============================================================================

/// The part of a catalogue document the patcher consumes.
///
/// Only `index` is read; other top-level fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogueFile {
    #[serde(default)]
    pub index: SymbolIndex,
}

impl CatalogueFile {
    /// Decode a catalogue document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read and decode a catalogue file.
    pub fn load(path: &Path) -> Result<Self, GoqualError> {
        let display = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|e| GoqualError::CatalogueUnreadable {
            path: display.clone(),
            reason: e.to_string(),
        })?;
        Self::from_json(&content).map_err(|e| GoqualError::CatalogueMalformed {
            path: display,
            reason: e.to_string(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
