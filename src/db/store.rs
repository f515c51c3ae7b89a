//! Database Store - the aggregate holding all code facts
//!
//! A `Database` owns the entity arena plus per-directory and per-file
//! external reference counters. The position of an entity in the arena is
//! its id, so the arena order is load-bearing: everything that reorders or
//! extends it goes through methods that keep cross-references valid.
//!
//! Persistence is JSON through the compact codec. The default on-disk name
//! is `PFFF_DB.db`; callers are free to ignore the convention.
//!
//! @module db/store

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::codec;
use super::types::{Entity, EntityId};
use crate::core::error::{Error, Result};

/// Conventional filename for a persisted database.
pub const DEFAULT_DB_FILENAME: &str = "PFFF_DB.db";

// =============================================================================
// DATABASE
// =============================================================================

/// The aggregate of all semantic facts about one codebase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Database {
    /// Common prefix of all analyzed paths; used only for display stripping.
    pub(crate) root: PathBuf,
    /// Directory path -> external reference count. Insertion order is
    /// irrelevant; merge sums these by key.
    pub(crate) dirs: Vec<(PathBuf, u32)>,
    /// File path -> external reference count. Merge concatenates these, so
    /// duplicates are legal after a merge.
    pub(crate) files: Vec<(PathBuf, u32)>,
    /// The entity arena. Array position **is** the id space.
    pub(crate) entities: Vec<Entity>,
}

impl Database {
    /// An empty store: empty root, no dirs, files or entities.
    pub fn empty() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dirs(&self) -> &[(PathBuf, u32)] {
        &self.dirs
    }

    pub fn files(&self) -> &[(PathBuf, u32)] {
        &self.files
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Look up an entity by id.
    #[inline]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.index())
    }

    /// Mutable entity access, for the later analysis passes that adjust
    /// counters and example uses. The entity's own interface keeps the
    /// mutation narrow.
    #[inline]
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.index())
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.dirs.is_empty() && self.files.is_empty()
    }

    // -------------------------------------------------------------------------
    // Building Methods
    // -------------------------------------------------------------------------

    /// Set the common path prefix of the analyzed tree.
    pub fn set_root(&mut self, root: impl Into<PathBuf>) {
        self.root = root.into();
    }

    /// Append an entity, returning its id.
    pub fn add_entity(&mut self, entity: Entity) -> EntityId {
        let id = EntityId::from_index(self.entities.len());
        self.entities.push(entity);
        id
    }

    /// Add `count` external references to a directory, keyed by path.
    pub fn add_dir_count(&mut self, dir: impl Into<PathBuf>, count: u32) {
        let dir = dir.into();
        match self.dirs.iter_mut().find(|(path, _)| *path == dir) {
            Some((_, existing)) => *existing += count,
            None => self.dirs.push((dir, count)),
        }
    }

    /// Add `count` external references to a file, keyed by path.
    pub fn add_file_count(&mut self, file: impl Into<PathBuf>, count: u32) {
        let file = file.into();
        match self.files.iter_mut().find(|(path, _)| *path == file) {
            Some((_, existing)) => *existing += count,
            None => self.files.push((file, count)),
        }
    }

    // -------------------------------------------------------------------------
    // Invariant Checking
    // -------------------------------------------------------------------------

    /// Check that every example-use id points inside the arena.
    pub fn validate(&self) -> Result<()> {
        let n = self.entities.len();
        for (index, entity) in self.entities.iter().enumerate() {
            for id in entity.example_uses() {
                if id.index() >= n {
                    return Err(Error::MalformedDatabase {
                        message: format!(
                            "entity {index} references example use {id} but the store has {n} entities"
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    /// Load a database from a JSON file written by [`Database::save`].
    ///
    /// Fails with `Io` when the file is unreadable, `MalformedDatabase` /
    /// `MalformedRecord` when the content is not this schema, and validates
    /// the example-use invariant before handing the store out.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&text).map_err(|e| Error::MalformedDatabase {
            message: format!("{}: not valid JSON: {e}", path.display()),
        })?;
        let db = codec::decode_database(&value)?;
        db.validate()?;
        debug!(
            path = %path.display(),
            entities = db.entity_count(),
            "loaded database"
        );
        Ok(db)
    }

    /// Write the database as compact-entity JSON.
    ///
    /// `readable` selects pretty printing; otherwise output is minified.
    pub fn save(&self, path: impl AsRef<Path>, readable: bool) -> Result<()> {
        let path = path.as_ref();
        let value = codec::encode_database(self);
        let text = if readable {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        fs::write(path, text)?;
        debug!(
            path = %path.display(),
            entities = self.entity_count(),
            readable,
            "saved database"
        );
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Statistics
    // -------------------------------------------------------------------------

    /// Summary counters for display or JSON output.
    pub fn stats(&self) -> DatabaseStats {
        let mut by_kind: HashMap<String, usize> = HashMap::new();
        for entity in &self.entities {
            *by_kind.entry(entity.kind().as_str().to_string()).or_insert(0) += 1;
        }
        DatabaseStats {
            entities: self.entities.len(),
            files: self.files.len(),
            dirs: self.dirs.len(),
            by_kind,
        }
    }
}

// =============================================================================
// DATABASE STATISTICS
// =============================================================================

/// Statistics about a database
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseStats {
    pub entities: usize,
    pub files: usize,
    pub dirs: usize,
    /// Entities per kind, keyed by the kind's canonical name
    pub by_kind: HashMap<String, usize>,
}

impl fmt::Display for DatabaseStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Entities: {:>8}", self.entities)?;
        writeln!(f, "  Files:    {:>8}", self.files)?;
        writeln!(f, "  Dirs:     {:>8}", self.dirs)?;
        let mut kinds: Vec<_> = self.by_kind.iter().collect();
        kinds.sort();
        for (kind, count) in kinds {
            writeln!(f, "  {kind:<12} {count:>6}")?;
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
