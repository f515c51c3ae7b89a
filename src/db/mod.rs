//! Code Fact Database - entities, persistence, merge, derived views
//!
//! This module is the whole database subsystem:
//! - Entity records with index-based cross-references (types.rs)
//! - Verbose and compact JSON codecs (codec.rs)
//! - The aggregate store with load/save (store.rs)
//! - Structural merge with id renumbering (merge.rs)
//! - Top-K, completion and usage-correction views (views.rs)
//! - The token-tag classification adapter (classify.rs)
//!
//! The one invariant everything here protects: entity references are array
//! indices into the owning store, so any operation that changes the arena
//! layout must renumber every cross-reference it moves.
//!
//! @module db

pub mod classify;
pub mod codec;
pub mod merge;
pub mod store;
pub mod types;
pub mod views;

// =============================================================================
// RE-EXPORTS: Entity Model (types.rs)
// =============================================================================

pub use types::{Entity, EntityId, EntityKind, ALL_KINDS};

// =============================================================================
// RE-EXPORTS: Codec (codec.rs)
// =============================================================================

pub use codec::{decode_database, encode_database, CompactCodec, EntityCodec, VerboseCodec};

// =============================================================================
// RE-EXPORTS: Store (store.rs)
// =============================================================================

pub use store::{Database, DatabaseStats, DEFAULT_DB_FILENAME};

// =============================================================================
// RE-EXPORTS: Merge (merge.rs)
// =============================================================================

pub use merge::{merge, merge_forced};

// =============================================================================
// RE-EXPORTS: Derived Views (views.rs)
// =============================================================================

pub use views::{adjust_member_usage, completion_entities, top_entities_per_file, CompletionList};

// =============================================================================
// RE-EXPORTS: Classification Adapter (classify.rs)
// =============================================================================

pub use classify::{kind_from_definition_tag, kind_from_use_tag, matches_use, Occurrence, TokenTag};
