//! Merge Engine - structural combination of two databases
//!
//! Merging is concatenation plus bookkeeping, nothing smarter: directory
//! counts are summed by path, file counts are concatenated verbatim
//! (duplicate paths across the two inputs are kept, a known limitation of
//! the format), and the right-hand entity arena is appended with every
//! example-use id shifted so it still points at the same logical entity.
//! No content-level deduplication is attempted.
//!
//! @module db/merge

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::warn;

use super::store::Database;
use super::types::EntityId;
use crate::core::error::{Error, Result};

/// Merge two databases built against the same root.
///
/// Fails with `RootMismatch` when the roots differ; use [`merge_forced`]
/// to combine anyway.
pub fn merge(a: Database, b: Database) -> Result<Database> {
    if a.root != b.root {
        return Err(Error::RootMismatch {
            left: a.root,
            right: b.root,
        });
    }
    Ok(combine(a, b))
}

/// Merge two databases even when their roots differ.
///
/// The result keeps the left-hand root; a mismatch is logged, since paths
/// from the right-hand store will not strip cleanly against it.
pub fn merge_forced(a: Database, b: Database) -> Database {
    if a.root != b.root {
        warn!(
            left = %a.root.display(),
            right = %b.root.display(),
            "merging databases with different roots"
        );
    }
    combine(a, b)
}

fn combine(a: Database, b: Database) -> Database {
    let offset = a.entities.len();

    // Directory counts: union, summed by path, first-seen order.
    let mut dirs = a.dirs;
    let positions: HashMap<PathBuf, usize> = dirs
        .iter()
        .enumerate()
        .map(|(i, (path, _))| (path.clone(), i))
        .collect();
    for (path, count) in b.dirs {
        match positions.get(&path) {
            Some(&i) => dirs[i].1 += count,
            None => dirs.push((path, count)),
        }
    }

    // File counts: plain concatenation, duplicates and all.
    let mut files = a.files;
    files.extend(b.files);

    // Entities of `a` keep their ids; entities of `b` land at `offset..`,
    // so their example uses shift by the same amount.
    let mut entities = a.entities;
    entities.reserve(b.entities.len());
    for mut entity in b.entities {
        entity.remap_example_uses(|id| EntityId::from_index(id.index() + offset));
        entities.push(entity);
    }

    Database {
        root: a.root,
        dirs,
        files,
        entities,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::types::{Entity, EntityKind};
    use std::path::PathBuf;

    fn entity(name: &str, uses: Vec<usize>) -> Entity {
        Entity::new(EntityKind::Function, name, "", "a.py", 1, 0)
            .with_example_uses(uses.into_iter().map(EntityId::from_index).collect())
    }

    fn db_with(root: &str, entities: Vec<Entity>) -> Database {
        let mut db = Database::empty();
        db.set_root(root);
        for e in entities {
            db.add_entity(e);
        }
        db
    }

    #[test]
    fn test_example_uses_are_renumbered() {
        // a: entity 0 cites entity 1; b: entity 0 cites itself.
        let a = db_with("/repo", vec![entity("a0", vec![1]), entity("a1", vec![])]);
        let b = db_with("/repo", vec![entity("b0", vec![0])]);

        let merged = merge(a, b).unwrap();
        assert_eq!(merged.entity_count(), 3);
        assert_eq!(merged.entities()[0].name(), "a0");
        assert_eq!(merged.entities()[1].name(), "a1");
        assert_eq!(merged.entities()[2].name(), "b0");

        // a0's reference is untouched; b0's shifted by len(a) = 2.
        assert_eq!(merged.entities()[0].example_uses(), &[EntityId::from_index(1)]);
        assert_eq!(merged.entities()[2].example_uses(), &[EntityId::from_index(2)]);

        merged.validate().unwrap();
    }

    #[test]
    fn test_dir_counts_are_summed() {
        let mut a = db_with("/repo", vec![]);
        a.add_dir_count("/repo/src", 3);
        a.add_dir_count("/repo/lib", 1);
        let mut b = db_with("/repo", vec![]);
        b.add_dir_count("/repo/src", 4);
        b.add_dir_count("/repo/doc", 2);

        let merged = merge(a, b).unwrap();
        assert_eq!(
            merged.dirs(),
            &[
                (PathBuf::from("/repo/src"), 7),
                (PathBuf::from("/repo/lib"), 1),
                (PathBuf::from("/repo/doc"), 2),
            ]
        );
    }

    #[test]
    fn test_files_are_concatenated_with_duplicates() {
        let mut a = db_with("/repo", vec![]);
        a.add_file_count("/repo/a.py", 1);
        let mut b = db_with("/repo", vec![]);
        b.add_file_count("/repo/a.py", 5);
        b.add_file_count("/repo/b.py", 2);

        let merged = merge(a, b).unwrap();
        assert_eq!(
            merged.files(),
            &[
                (PathBuf::from("/repo/a.py"), 1),
                (PathBuf::from("/repo/a.py"), 5),
                (PathBuf::from("/repo/b.py"), 2),
            ]
        );
    }

    #[test]
    fn test_root_mismatch_refused_unless_forced() {
        let a = db_with("/repo", vec![entity("a0", vec![])]);
        let b = db_with("/elsewhere", vec![entity("b0", vec![])]);
        assert!(matches!(
            merge(a.clone(), b.clone()),
            Err(Error::RootMismatch { .. })
        ));

        let merged = merge_forced(a, b);
        assert_eq!(merged.root(), std::path::Path::new("/repo"));
        assert_eq!(merged.entity_count(), 2);
    }

    #[test]
    fn test_merge_empty_stores() {
        let merged = merge(Database::empty(), Database::empty()).unwrap();
        assert!(merged.is_empty());

        let a = db_with("", vec![entity("a0", vec![0])]);
        let merged = merge(a, Database::empty()).unwrap();
        assert_eq!(merged.entity_count(), 1);
        assert_eq!(merged.entities()[0].example_uses(), &[EntityId::from_index(0)]);
    }
}
