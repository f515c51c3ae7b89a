//! JSON Codecs for Entities and Databases
//!
//! Two encodings of the same logical data sit behind one trait:
//!
//! - **Verbose**: one object per entity with named fields, for humans and
//!   debugging tools.
//! - **Compact**: one positional array per entity, the persisted form.
//!
//! Both schemas are strict. Field presence, field order and element types
//! must match exactly on decode; any deviation fails with a field-level
//! error rather than being papered over. The positional format in
//! particular breaks on any reorder, so all shape checking lives here.
//!
//! @module db/codec

use serde_json::{json, Map, Value};

use super::store::Database;
use super::types::{Entity, EntityId, EntityKind};
use crate::core::error::{Error, Result};

// =============================================================================
// CODEC TRAIT
// =============================================================================

/// An entity encoding strategy.
pub trait EntityCodec {
    /// Encode one entity as a JSON value.
    fn encode(&self, entity: &Entity) -> Value;

    /// Decode one entity, rejecting any shape deviation.
    fn decode(&self, value: &Value) -> Result<Entity>;
}

// =============================================================================
// SHAPE HELPERS
// =============================================================================

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn record_err(message: String) -> Error {
    Error::MalformedRecord { message }
}

fn db_err(message: String) -> Error {
    Error::MalformedDatabase { message }
}

fn str_of(value: &Value, what: &str) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| record_err(format!("`{what}`: expected string, got {}", json_type(value))))
}

fn u32_of(value: &Value, what: &str) -> Result<u32> {
    let n = value
        .as_u64()
        .ok_or_else(|| {
            record_err(format!(
                "`{what}`: expected non-negative integer, got {}",
                json_type(value)
            ))
        })?;
    u32::try_from(n).map_err(|_| record_err(format!("`{what}`: {n} out of range")))
}

fn ids_of(value: &Value, what: &str) -> Result<Vec<EntityId>> {
    let arr = value
        .as_array()
        .ok_or_else(|| record_err(format!("`{what}`: expected array, got {}", json_type(value))))?;
    arr.iter()
        .map(|v| Ok(EntityId::from_index(u32_of(v, what)? as usize)))
        .collect()
}

fn position_of(value: &Value, what: &str) -> Result<(u32, u32)> {
    let arr = value
        .as_array()
        .ok_or_else(|| record_err(format!("`{what}`: expected [line, column], got {}", json_type(value))))?;
    if arr.len() != 2 {
        return Err(record_err(format!(
            "`{what}`: expected 2 elements, got {}",
            arr.len()
        )));
    }
    Ok((u32_of(&arr[0], what)?, u32_of(&arr[1], what)?))
}

// =============================================================================
// VERBOSE CODEC
// =============================================================================

/// Object-per-entity encoding with named fields.
pub struct VerboseCodec;

/// Verbose field names, in the order decode requires.
const VERBOSE_FIELDS: [&str; 7] = ["kind", "name", "full_name", "file", "pos", "cnt", "u"];

impl EntityCodec for VerboseCodec {
    fn encode(&self, entity: &Entity) -> Value {
        json!({
            "kind": entity.kind().as_str(),
            "name": entity.name(),
            "full_name": entity.full_name(),
            "file": entity.file().to_string_lossy(),
            "pos": [entity.line(), entity.column()],
            "cnt": entity.external_users(),
            "u": entity
                .example_uses()
                .iter()
                .map(|id| id.index() as u64)
                .collect::<Vec<_>>(),
        })
    }

    fn decode(&self, value: &Value) -> Result<Entity> {
        let obj = value
            .as_object()
            .ok_or_else(|| record_err(format!("expected object, got {}", json_type(value))))?;

        let keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        if keys != VERBOSE_FIELDS {
            return Err(record_err(format!(
                "expected fields {VERBOSE_FIELDS:?}, got {keys:?}"
            )));
        }

        let kind = EntityKind::from_name(&str_of(&obj["kind"], "kind")?)?;
        let name = str_of(&obj["name"], "name")?;
        let full_name = str_of(&obj["full_name"], "full_name")?;
        let file = str_of(&obj["file"], "file")?;
        let (line, column) = position_of(&obj["pos"], "pos")?;
        let cnt = u32_of(&obj["cnt"], "cnt")?;
        let uses = ids_of(&obj["u"], "u")?;

        Ok(Entity::new(kind, name, full_name, file, line, column)
            .with_external_users(cnt)
            .with_example_uses(uses))
    }
}

// =============================================================================
// COMPACT CODEC
// =============================================================================

/// Array-per-entity positional encoding, smaller on disk.
///
/// Layout: `[kind_code, name, full_name, file, line, column, cnt, [ids]]`.
pub struct CompactCodec;

const COMPACT_LEN: usize = 8;

impl EntityCodec for CompactCodec {
    fn encode(&self, entity: &Entity) -> Value {
        json!([
            entity.kind().code(),
            entity.name(),
            entity.full_name(),
            entity.file().to_string_lossy(),
            entity.line(),
            entity.column(),
            entity.external_users(),
            entity
                .example_uses()
                .iter()
                .map(|id| id.index() as u64)
                .collect::<Vec<_>>(),
        ])
    }

    fn decode(&self, value: &Value) -> Result<Entity> {
        let arr = value
            .as_array()
            .ok_or_else(|| record_err(format!("expected array, got {}", json_type(value))))?;
        if arr.len() != COMPACT_LEN {
            return Err(record_err(format!(
                "expected {COMPACT_LEN} elements, got {}",
                arr.len()
            )));
        }

        let code = arr[0]
            .as_u64()
            .ok_or_else(|| record_err(format!("`kind`: expected integer, got {}", json_type(&arr[0]))))?;
        let kind = EntityKind::from_code(code)?;
        let name = str_of(&arr[1], "name")?;
        let full_name = str_of(&arr[2], "full_name")?;
        let file = str_of(&arr[3], "file")?;
        let line = u32_of(&arr[4], "line")?;
        let column = u32_of(&arr[5], "column")?;
        let cnt = u32_of(&arr[6], "cnt")?;
        let uses = ids_of(&arr[7], "u")?;

        Ok(Entity::new(kind, name, full_name, file, line, column)
            .with_external_users(cnt)
            .with_example_uses(uses))
    }
}

// =============================================================================
// DATABASE CODEC
// =============================================================================

/// Database keys, in the order decode requires.
const DATABASE_FIELDS: [&str; 4] = ["root", "dirs", "files", "entities"];

/// Encode a whole database (compact entities, the persisted form).
pub fn encode_database(db: &Database) -> Value {
    let pairs = |entries: &[(std::path::PathBuf, u32)]| -> Value {
        Value::Array(
            entries
                .iter()
                .map(|(path, count)| json!([path.to_string_lossy(), count]))
                .collect(),
        )
    };

    let mut obj = Map::new();
    obj.insert("root".into(), json!(db.root().to_string_lossy()));
    obj.insert("dirs".into(), pairs(db.dirs()));
    obj.insert("files".into(), pairs(db.files()));
    obj.insert(
        "entities".into(),
        Value::Array(db.entities().iter().map(|e| CompactCodec.encode(e)).collect()),
    );
    Value::Object(obj)
}

fn count_pairs(value: &Value, what: &str) -> Result<Vec<(std::path::PathBuf, u32)>> {
    let arr = value
        .as_array()
        .ok_or_else(|| db_err(format!("`{what}`: expected array, got {}", json_type(value))))?;
    arr.iter()
        .map(|pair| {
            let elems = pair
                .as_array()
                .ok_or_else(|| db_err(format!("`{what}`: expected [path, count] pair, got {}", json_type(pair))))?;
            if elems.len() != 2 {
                return Err(db_err(format!(
                    "`{what}`: expected 2-element pair, got {} elements",
                    elems.len()
                )));
            }
            let path = elems[0]
                .as_str()
                .ok_or_else(|| db_err(format!("`{what}`: path must be a string, got {}", json_type(&elems[0]))))?;
            let count = elems[1]
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| db_err(format!("`{what}`: bad count for {path}")))?;
            Ok((std::path::PathBuf::from(path), count))
        })
        .collect()
}

/// Decode a whole database. Rejects any top-level shape other than the
/// exact `{root, dirs, files, entities}` object.
pub fn decode_database(value: &Value) -> Result<Database> {
    let obj = value
        .as_object()
        .ok_or_else(|| db_err(format!("expected object, got {}", json_type(value))))?;

    let keys: Vec<&str> = obj.keys().map(String::as_str).collect();
    if keys != DATABASE_FIELDS {
        return Err(db_err(format!(
            "expected fields {DATABASE_FIELDS:?}, got {keys:?}"
        )));
    }

    let root = obj["root"]
        .as_str()
        .ok_or_else(|| db_err(format!("`root`: expected string, got {}", json_type(&obj["root"]))))?;
    let dirs = count_pairs(&obj["dirs"], "dirs")?;
    let files = count_pairs(&obj["files"], "files")?;

    let raw_entities = obj["entities"]
        .as_array()
        .ok_or_else(|| db_err(format!("`entities`: expected array, got {}", json_type(&obj["entities"]))))?;
    let entities = raw_entities
        .iter()
        .map(|v| CompactCodec.decode(v))
        .collect::<Result<Vec<Entity>>>()?;

    Ok(Database {
        root: root.into(),
        dirs,
        files,
        entities,
    })
}

// =============================================================================
// TESTS
// =============================================================================
