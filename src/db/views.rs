//! Derived Views - presentation-ready projections of a database
//!
//! Nothing here changes what the database knows; these are grouping and
//! ranking passes computed on demand:
//!
//! - top-K entities per file, by external user count;
//! - a completion list mixing real entities with synthesized directory,
//!   file and multi-directory pseudo-entities;
//! - the usage-count correction heuristic for overloaded member names.
//!
//! @module db/views

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use compact_str::CompactString;
use smallvec::SmallVec;
use tracing::warn;

use super::store::Database;
use super::types::{Entity, EntityId, EntityKind};

// =============================================================================
// TOP-K PER FILE
// =============================================================================

/// The `k` most externally used entities of each file.
///
/// Groups the arena by file, sorts each group descending by external user
/// count (stable, so ties keep their arena order) and truncates to `k`.
pub fn top_entities_per_file(db: &Database, k: usize) -> HashMap<PathBuf, Vec<EntityId>> {
    let mut groups: HashMap<PathBuf, Vec<EntityId>> = HashMap::new();
    for (index, entity) in db.entities().iter().enumerate() {
        groups
            .entry(entity.file().to_path_buf())
            .or_default()
            .push(EntityId::from_index(index));
    }

    let arena = db.entities();
    for ids in groups.values_mut() {
        ids.sort_by(|a, b| {
            arena[b.index()]
                .external_users()
                .cmp(&arena[a.index()].external_users())
        });
        ids.truncate(k);
    }
    groups
}

// =============================================================================
// COMPLETION ENTITIES
// =============================================================================

/// Result of [`completion_entities`].
#[derive(Debug, Clone)]
pub struct CompletionList {
    /// Synthesized and real entities, ordered by descending priority.
    pub entities: Vec<Entity>,
    /// True when real entities were dropped to bound the list size.
    pub truncated: bool,
}

/// Sort key for the completion list. Synthesized navigation entries rank
/// above real entities, which compete on their own usage counts.
fn completion_priority(entity: &Entity) -> u32 {
    match entity.kind() {
        EntityKind::MultiDirs => 100,
        EntityKind::Dir => 40,
        EntityKind::File => 20,
        _ => entity.external_users(),
    }
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Build the pseudo-entity list used by name-completion searches.
///
/// Synthesizes one `Dir` entity per directory entry (named `basename/`),
/// one `File` entity per file entry, and one `MultiDirs` entity for every
/// leaf directory name that occurs under two or more parents; the
/// `MultiDirs` entity stores the pipe-joined matching paths in its `file`
/// field and the number of matches as its count. Real entities come along
/// with their short name replaced by the full name when one is stored.
///
/// When the store holds more than `max_real` entities the real ones are
/// dropped (directories and files are always kept) and the result is
/// flagged truncated, to bound UI latency on huge stores.
pub fn completion_entities(db: &Database, max_real: usize) -> CompletionList {
    // Dir entities, tracking which positions share a leaf name.
    let mut dir_entities: Vec<Entity> = Vec::with_capacity(db.dirs().len());
    let mut by_leaf: HashMap<CompactString, SmallVec<[usize; 4]>> = HashMap::new();
    for (path, count) in db.dirs() {
        let name = format!("{}/", basename(path));
        by_leaf
            .entry(CompactString::new(&name))
            .or_default()
            .push(dir_entities.len());
        dir_entities.push(
            Entity::new(EntityKind::Dir, name, "", path.clone(), 1, 0).with_external_users(*count),
        );
    }

    // MultiDirs aliases for leaf names that recur under different parents.
    // The file field holds a pipe-joined path list, not a normal path.
    let mut entities: Vec<Entity> = Vec::new();
    for (name, members) in &by_leaf {
        if members.len() < 2 {
            continue;
        }
        let joined = members
            .iter()
            .map(|&i| dir_entities[i].file().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("|");
        entities.push(
            Entity::new(EntityKind::MultiDirs, name.as_str(), "", joined, 1, 0)
                .with_external_users(members.len() as u32),
        );
    }

    entities.extend(dir_entities);
    entities.extend(db.files().iter().map(|(path, count)| {
        Entity::new(EntityKind::File, basename(path), "", path.clone(), 1, 0)
            .with_external_users(*count)
    }));

    let truncated = db.entity_count() > max_real;
    if truncated {
        warn!(
            entities = db.entity_count(),
            max_real, "dropping real entities from completion list"
        );
    } else {
        entities.extend(db.entities().iter().map(Entity::favoring_full_name));
    }

    // Stable sort: ties keep their synthesis/arena order.
    entities.sort_by(|a, b| completion_priority(b).cmp(&completion_priority(a)));

    CompletionList {
        entities,
        truncated,
    }
}

// =============================================================================
// MEMBER USAGE CORRECTION
// =============================================================================

/// Correct double-counted usage of overloaded member names, in place.
///
/// Analyzers that cannot disambiguate receivers attribute every use of a
/// member name to every same-named definition. Dividing each Method/Field
/// entity's count by the fan-out of definitions sharing its name is a
/// documented approximation of the real per-definition usage.
///
/// Not idempotent: running it again divides again. Callers run it exactly
/// once per analysis pass.
pub fn adjust_member_usage(db: &mut Database) {
    let mut groups: HashMap<CompactString, SmallVec<[usize; 4]>> = HashMap::new();
    for (index, entity) in db.entities.iter().enumerate() {
        if matches!(entity.kind(), EntityKind::Method | EntityKind::Field) {
            groups
                .entry(CompactString::new(entity.name()))
                .or_default()
                .push(index);
        }
    }

    for members in groups.values() {
        let n = members.len() as u32;
        if n < 2 {
            continue;
        }
        for &index in members {
            db.entities[index].divide_external_users(n);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(kind: EntityKind, name: &str, file: &str, count: u32) -> Entity {
        Entity::new(kind, name, "", file, 1, 0).with_external_users(count)
    }

    #[test]
    fn test_top_k_per_file() {
        let mut db = Database::empty();
        db.add_entity(entity(EntityKind::Function, "low", "a.py", 1));
        db.add_entity(entity(EntityKind::Function, "high", "a.py", 9));
        db.add_entity(entity(EntityKind::Function, "mid", "a.py", 5));
        db.add_entity(entity(EntityKind::Function, "other", "b.py", 3));

        let top = top_entities_per_file(&db, 2);
        assert_eq!(top.len(), 2);

        let a = &top[Path::new("a.py")];
        assert_eq!(a.len(), 2);
        assert_eq!(db.entity(a[0]).unwrap().name(), "high");
        assert_eq!(db.entity(a[1]).unwrap().name(), "mid");

        // Smaller group than k: returns the whole group.
        let b = &top[Path::new("b.py")];
        assert_eq!(b.len(), 1);
        assert_eq!(db.entity(b[0]).unwrap().name(), "other");
    }

    #[test]
    fn test_top_k_zero() {
        let mut db = Database::empty();
        db.add_entity(entity(EntityKind::Function, "f", "a.py", 1));
        let top = top_entities_per_file(&db, 0);
        assert!(top[Path::new("a.py")].is_empty());
    }

    #[test]
    fn test_top_k_ties_keep_arena_order() {
        let mut db = Database::empty();
        let first = db.add_entity(entity(EntityKind::Function, "first", "a.py", 4));
        let second = db.add_entity(entity(EntityKind::Function, "second", "a.py", 4));
        let top = top_entities_per_file(&db, 2);
        assert_eq!(top[Path::new("a.py")], vec![first, second]);
    }

    #[test]
    fn test_completion_synthesis() {
        let mut db = Database::empty();
        db.add_dir_count("/repo/src/util", 3);
        db.add_dir_count("/repo/lib/util", 1);
        db.add_dir_count("/repo/doc", 2);
        db.add_file_count("/repo/src/util/io.py", 4);
        db.add_entity(
            Entity::new(EntityKind::Method, "run", "Job.run", "/repo/src/util/io.py", 9, 4)
                .with_external_users(6),
        );

        let list = completion_entities(&db, 100);
        assert!(!list.truncated);

        // One MultiDirs for the recurring "util/" leaf.
        let multi: Vec<&Entity> = list
            .entities
            .iter()
            .filter(|e| e.kind() == EntityKind::MultiDirs)
            .collect();
        assert_eq!(multi.len(), 1);
        assert_eq!(multi[0].name(), "util/");
        assert_eq!(multi[0].external_users(), 2);
        let joined = multi[0].file().to_string_lossy();
        assert!(joined.contains('|'));
        assert!(joined.contains("/repo/src/util"));
        assert!(joined.contains("/repo/lib/util"));

        // Dir names carry a trailing slash, file names are basenames.
        assert!(list
            .entities
            .iter()
            .any(|e| e.kind() == EntityKind::Dir && e.name() == "doc/"));
        assert!(list
            .entities
            .iter()
            .any(|e| e.kind() == EntityKind::File && e.name() == "io.py"));

        // Real entity comes through under its full name.
        assert!(list
            .entities
            .iter()
            .any(|e| e.kind() == EntityKind::Method && e.name() == "Job.run"));
    }

    #[test]
    fn test_completion_ordering_contract() {
        let mut db = Database::empty();
        db.add_dir_count("/repo/a/util", 0);
        db.add_dir_count("/repo/b/util", 0);
        db.add_file_count("/repo/a/util/x.py", 50);
        db.add_entity(entity(EntityKind::Function, "f", "/repo/a/util/x.py", 19));

        let list = completion_entities(&db, 100);
        let rank = |kind: EntityKind| {
            list.entities
                .iter()
                .position(|e| e.kind() == kind)
                .unwrap()
        };
        // MultiDirs before Dir before File before real entities below 20 uses,
        // regardless of the counts on the synthesized entries.
        assert!(rank(EntityKind::MultiDirs) < rank(EntityKind::Dir));
        assert!(rank(EntityKind::Dir) < rank(EntityKind::File));
        assert!(rank(EntityKind::File) < rank(EntityKind::Function));
    }

    #[test]
    fn test_completion_threshold_drops_real_entities() {
        let mut db = Database::empty();
        db.add_dir_count("/repo/src", 1);
        db.add_file_count("/repo/src/a.py", 1);
        for i in 0..5 {
            db.add_entity(entity(
                EntityKind::Function,
                &format!("f{i}"),
                "/repo/src/a.py",
                i,
            ));
        }

        let list = completion_entities(&db, 3);
        assert!(list.truncated);
        assert!(list.entities.iter().all(|e| e.kind().is_synthetic()));
        // Dir and File survive the cut.
        assert_eq!(list.entities.len(), 2);
    }

    #[test]
    fn test_member_usage_correction() {
        let mut db = Database::empty();
        db.add_entity(entity(EntityKind::Method, "run", "a.py", 9));
        db.add_entity(entity(EntityKind::Method, "run", "b.py", 0));
        db.add_entity(entity(EntityKind::Method, "run", "c.py", 3));
        // Same name, different kind family: untouched.
        db.add_entity(entity(EntityKind::Function, "run", "d.py", 9));
        // Lone member name: untouched.
        db.add_entity(entity(EntityKind::Field, "size", "a.py", 8));

        adjust_member_usage(&mut db);

        let counts: Vec<u32> = db.entities().iter().map(Entity::external_users).collect();
        assert_eq!(counts, vec![3, 0, 1, 9, 8]);
    }
}
