//! Core Data Structures for the Code Fact Database
//!
//! An entity is one semantic fact about a codebase element: a function, a
//! class, a field, and so on. Entities live in an array owned by the
//! database, and every cross-reference between entities is the array index
//! of the target, not a name. Anything that reorders or extends that array
//! must remap the indices it holds.
//!
//! @module db/types

use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::error::{Error, Result};

// =============================================================================
// ENTITY KIND
// =============================================================================

/// Classification of database entities.
///
/// `File`, `Dir` and `MultiDirs` are synthetic kinds used only for
/// completion lists; analyzers never produce them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Function,
    Class,
    Module,
    Type,
    Constant,
    Global,
    Macro,
    Method,
    StaticMethod,
    Field,
    File,
    Dir,
    MultiDirs,
}

/// All entity kinds, in code order.
pub const ALL_KINDS: [EntityKind; 13] = [
    EntityKind::Function,
    EntityKind::Class,
    EntityKind::Module,
    EntityKind::Type,
    EntityKind::Constant,
    EntityKind::Global,
    EntityKind::Method,
    EntityKind::StaticMethod,
    EntityKind::Field,
    EntityKind::File,
    EntityKind::Dir,
    EntityKind::MultiDirs,
    EntityKind::Macro,
];

impl EntityKind {
    /// Integer code used by the compact on-disk encoding.
    ///
    /// These codes are part of the persisted format and must never be
    /// renumbered. `Macro` was added after the synthetic kinds, hence 13.
    pub fn code(self) -> u32 {
        match self {
            Self::Function => 1,
            Self::Class => 2,
            Self::Module => 3,
            Self::Type => 4,
            Self::Constant => 5,
            Self::Global => 6,
            Self::Method => 7,
            Self::StaticMethod => 8,
            Self::Field => 9,
            Self::File => 10,
            Self::Dir => 11,
            Self::MultiDirs => 12,
            Self::Macro => 13,
        }
    }

    /// Decode an integer code. Fails for anything outside the fixed table.
    pub fn from_code(code: u64) -> Result<Self> {
        match code {
            1 => Ok(Self::Function),
            2 => Ok(Self::Class),
            3 => Ok(Self::Module),
            4 => Ok(Self::Type),
            5 => Ok(Self::Constant),
            6 => Ok(Self::Global),
            7 => Ok(Self::Method),
            8 => Ok(Self::StaticMethod),
            9 => Ok(Self::Field),
            10 => Ok(Self::File),
            11 => Ok(Self::Dir),
            12 => Ok(Self::MultiDirs),
            13 => Ok(Self::Macro),
            other => Err(Error::UnknownEntityKind {
                code: other.to_string(),
            }),
        }
    }

    /// Canonical name used by the verbose encoding.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Function => "Function",
            Self::Class => "Class",
            Self::Module => "Module",
            Self::Type => "Type",
            Self::Constant => "Constant",
            Self::Global => "Global",
            Self::Macro => "Macro",
            Self::Method => "Method",
            Self::StaticMethod => "StaticMethod",
            Self::Field => "Field",
            Self::File => "File",
            Self::Dir => "Dir",
            Self::MultiDirs => "MultiDirs",
        }
    }

    /// Decode a canonical name. Fails for anything outside the vocabulary.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "Function" => Ok(Self::Function),
            "Class" => Ok(Self::Class),
            "Module" => Ok(Self::Module),
            "Type" => Ok(Self::Type),
            "Constant" => Ok(Self::Constant),
            "Global" => Ok(Self::Global),
            "Macro" => Ok(Self::Macro),
            "Method" => Ok(Self::Method),
            "StaticMethod" => Ok(Self::StaticMethod),
            "Field" => Ok(Self::Field),
            "File" => Ok(Self::File),
            "Dir" => Ok(Self::Dir),
            "MultiDirs" => Ok(Self::MultiDirs),
            other => Err(Error::UnknownEntityKind {
                code: other.to_string(),
            }),
        }
    }

    /// Short abbreviation (1-3 characters) for compact display.
    pub fn abbrev(self) -> &'static str {
        match self {
            Self::Function => "f",
            Self::Class => "c",
            Self::Module => "mod",
            Self::Type => "t",
            Self::Constant => "cst",
            Self::Global => "g",
            Self::Macro => "mac",
            Self::Method => "mth",
            Self::StaticMethod => "sm",
            Self::Field => "fld",
            Self::File => "F",
            Self::Dir => "D",
            Self::MultiDirs => "Ds",
        }
    }

    /// True for the completion-only kinds never produced by analyzers.
    pub fn is_synthetic(self) -> bool {
        matches!(self, Self::File | Self::Dir | Self::MultiDirs)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ENTITY ID
// =============================================================================

/// The position of an entity inside its owning database's entity array.
///
/// Not a durable identifier: merging or rebuilding a database invalidates
/// captured ids unless they are explicitly remapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// Wrap an array index as an id.
    pub fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// The array index this id denotes.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// ENTITY
// =============================================================================

/// One semantic fact about a codebase element.
///
/// Immutable after construction except for two fields: the external user
/// count and the example-use list, both reachable only through the narrow
/// mutation methods below. The kind in particular is never reassigned.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    kind: EntityKind,
    /// Short display name
    name: String,
    /// Fully qualified name; empty means "identical to `name`"
    full_name: String,
    file: PathBuf,
    /// 1-based line
    line: u32,
    /// 0-based column
    column: u32,
    /// Approximate number of uses from outside the defining file/unit
    external_users: u32,
    /// Curated ids of good illustrative use sites, within the same database
    example_uses: Vec<EntityId>,
}

impl Entity {
    /// Create an entity with zeroed counters.
    pub fn new(
        kind: EntityKind,
        name: impl Into<String>,
        full_name: impl Into<String>,
        file: impl Into<PathBuf>,
        line: u32,
        column: u32,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            full_name: full_name.into(),
            file: file.into(),
            line,
            column,
            external_users: 0,
            example_uses: Vec::new(),
        }
    }

    /// Set the external user count at construction time.
    pub fn with_external_users(mut self, count: u32) -> Self {
        self.external_users = count;
        self
    }

    /// Set the example-use list at construction time.
    pub fn with_example_uses(mut self, ids: Vec<EntityId>) -> Self {
        self.example_uses = ids;
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[inline]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// The fully qualified name when one is stored, else the short name.
    pub fn display_name(&self) -> &str {
        if self.full_name.is_empty() {
            &self.name
        } else {
            &self.full_name
        }
    }

    #[inline]
    pub fn file(&self) -> &Path {
        &self.file
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[inline]
    pub fn column(&self) -> u32 {
        self.column
    }

    #[inline]
    pub fn external_users(&self) -> u32 {
        self.external_users
    }

    #[inline]
    pub fn example_uses(&self) -> &[EntityId] {
        &self.example_uses
    }

    // -------------------------------------------------------------------------
    // Narrow mutation interface
    // -------------------------------------------------------------------------

    /// Record one more external use of this entity.
    pub fn record_external_user(&mut self) {
        self.external_users += 1;
    }

    /// Integer-divide the external user count by `n` (no-op for `n == 0`).
    pub fn divide_external_users(&mut self, n: u32) {
        if n > 0 {
            self.external_users /= n;
        }
    }

    /// Append an example use site.
    pub fn add_example_use(&mut self, id: EntityId) {
        self.example_uses.push(id);
    }

    /// Rewrite every example-use id through `f`.
    ///
    /// Layout-changing operations (merge, any future compaction) must call
    /// this on affected entities so indices keep pointing at the same
    /// logical targets.
    pub fn remap_example_uses(&mut self, f: impl Fn(EntityId) -> EntityId) {
        for id in &mut self.example_uses {
            *id = f(*id);
        }
    }

    /// Clone with the short name replaced by the display name.
    ///
    /// Completion favors fully-qualified matching.
    pub(crate) fn favoring_full_name(&self) -> Entity {
        let mut e = self.clone();
        e.name = self.display_name().to_string();
        e
    }
}

// =============================================================================
// TESTS
// =============================================================================
