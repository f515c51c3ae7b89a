//! codedb - a language-agnostic database of semantic code facts
//!
//! External analyzers record what a codebase contains (functions, classes,
//! fields, files, directories) and how much each item is used from the
//! outside; codedb stores those facts, persists them as JSON, merges
//! per-analyzer stores into one, and projects the result into the views a
//! visualizer or completion engine wants.

pub mod core;
pub mod db;

pub use crate::core::error::{Error, Result};
pub use crate::db::{
    adjust_member_usage, completion_entities, merge, merge_forced, top_entities_per_file,
    CompactCodec, CompletionList, Database, DatabaseStats, Entity, EntityCodec, EntityId,
    EntityKind, Occurrence, TokenTag, VerboseCodec, DEFAULT_DB_FILENAME,
};
