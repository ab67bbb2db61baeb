// Table persistence
//
// The table is turned into a flat list of serde mirror nodes and handed to a
// codec. Each node keeps the array part apart from the keyed entries and tags
// each value with its variant, so integer/float/string keys survive a round
// trip. Nested tables are node indices, so neither side recurses.
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::rc::Rc;

use ::serde::{Deserialize, Serialize};
use tracing::debug;

use crate::lua_error::{LuaError, LuaResult};
use crate::lua_value::{LuaTable, LuaValue};

/// Turns a table into bytes and back.
///
/// `decode(encode(t))` must equal `t` for every table the codec accepts.
pub trait TableCodec {
    fn encode(&self, table: &LuaTable) -> LuaResult<Vec<u8>>;
    fn decode(&self, bytes: &[u8]) -> LuaResult<LuaTable>;
}

/// Lossless JSON encoding. Userdata and non-finite floats are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    pub pretty: bool,
}

impl JsonCodec {
    pub fn new(pretty: bool) -> Self {
        JsonCodec { pretty }
    }
}

impl TableCodec for JsonCodec {
    fn encode(&self, table: &LuaTable) -> LuaResult<Vec<u8>> {
        let stored = StoredDocument::from_table(table)?;
        let result = if self.pretty {
            serde_json::to_vec_pretty(&stored)
        } else {
            serde_json::to_vec(&stored)
        };
        result.map_err(|e| LuaError::Serialize(format!("Failed to encode table: {}", e)))
    }

    fn decode(&self, bytes: &[u8]) -> LuaResult<LuaTable> {
        let stored: StoredDocument = serde_json::from_slice(bytes)
            .map_err(|e| LuaError::Serialize(format!("Failed to decode table: {}", e)))?;
        stored.into_table()
    }
}

/// Options for writing a table to disk
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveOptions {
    /// Replace an existing file; when false an existing path is an `AlreadyExists` error
    pub overwrite: bool,
    /// Human-readable JSON output
    pub pretty: bool,
}

impl SaveOptions {
    pub fn save(&self, table: &LuaTable, path: impl AsRef<Path>) -> LuaResult<()> {
        save_with(&JsonCodec::new(self.pretty), table, path, self.overwrite)
    }
}

/// Write `table` to `path` as compact JSON
pub fn save(table: &LuaTable, path: impl AsRef<Path>, overwrite: bool) -> LuaResult<()> {
    save_with(&JsonCodec::default(), table, path, overwrite)
}

/// Read a table written by [`save`]
pub fn load(path: impl AsRef<Path>) -> LuaResult<LuaTable> {
    load_with(&JsonCodec::default(), path)
}

pub fn save_with<C: TableCodec + ?Sized>(
    codec: &C,
    table: &LuaTable,
    path: impl AsRef<Path>,
    overwrite: bool,
) -> LuaResult<()> {
    let path = path.as_ref();
    // Encode first so a bad table never leaves a truncated file behind
    let bytes = codec.encode(table)?;

    let mut options = OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    let mut file = options.open(path)?;
    file.write_all(&bytes)?;
    file.flush()?;

    debug!(path = %path.display(), bytes = bytes.len(), entries = table.len(), "saved table");
    Ok(())
}

pub fn load_with<C: TableCodec + ?Sized>(codec: &C, path: impl AsRef<Path>) -> LuaResult<LuaTable> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let table = codec.decode(&bytes)?;

    debug!(path = %path.display(), bytes = bytes.len(), entries = table.len(), "loaded table");
    Ok(table)
}

/// Every table of the tree as one flat node list; `tables[0]` is the root.
/// Nesting in the output stays constant no matter how deep the table is.
#[derive(Serialize, Deserialize)]
struct StoredDocument {
    tables: Vec<StoredTable>,
}

#[derive(Serialize, Deserialize)]
struct StoredTable {
    array: Vec<StoredValue>,
    hash: Vec<(StoredValue, StoredValue)>,
}

#[derive(Serialize, Deserialize)]
enum StoredValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// Index into `StoredDocument::tables`, always past the referring table
    Table(usize),
}

impl StoredDocument {
    /// Breadth-first walk: a nested table takes the next free slot when it is
    /// first seen, so children always land after their parent
    fn from_table(root: &LuaTable) -> LuaResult<Self> {
        let mut pending: Vec<&LuaTable> = vec![root];
        let mut tables = Vec::new();

        while let Some(&table) = pending.get(tables.len()) {
            let array = table
                .array
                .iter()
                .map(|value| store_value(value, &mut pending))
                .collect::<LuaResult<Vec<_>>>()?;
            let hash = table
                .hash
                .iter()
                .map(|(key, value)| -> LuaResult<_> {
                    Ok((store_value(key, &mut pending)?, store_value(value, &mut pending)?))
                })
                .collect::<LuaResult<Vec<_>>>()?;
            tables.push(StoredTable { array, hash });
        }

        Ok(StoredDocument { tables })
    }

    /// Rebuild from the last node back to the root, so every child is ready
    /// before its parent asks for it. Rebuilding goes through `update`, so a
    /// hand-edited file still yields a canonical table.
    fn into_table(self) -> LuaResult<LuaTable> {
        let mut built: Vec<Option<Rc<LuaTable>>> = vec![None; self.tables.len()];

        for (index, stored) in self.tables.into_iter().enumerate().rev() {
            let mut table = LuaTable::with_capacity(stored.array.len(), stored.hash.len());
            for value in stored.array {
                table.insert(load_value(value, index, &built)?);
            }
            for (key, value) in stored.hash {
                table.update(load_value(key, index, &built)?, load_value(value, index, &built)?)?;
            }
            built[index] = Some(Rc::new(table));
        }

        let root = built
            .into_iter()
            .next()
            .flatten()
            .ok_or_else(|| LuaError::Serialize("Stored document has no root table".to_string()))?;
        Ok(Rc::try_unwrap(root).unwrap_or_else(|shared| (*shared).clone()))
    }
}

fn store_value<'a>(value: &'a LuaValue, pending: &mut Vec<&'a LuaTable>) -> LuaResult<StoredValue> {
    Ok(match value {
        LuaValue::Boolean(b) => StoredValue::Boolean(*b),
        LuaValue::Integer(i) => StoredValue::Integer(*i),
        LuaValue::Float(n) if n.is_finite() => StoredValue::Float(*n),
        LuaValue::Float(n) => {
            return Err(LuaError::Serialize(format!("Cannot encode number: {}", n)));
        }
        LuaValue::String(s) => StoredValue::String(s.to_string()),
        LuaValue::Table(t) => {
            pending.push(&**t);
            StoredValue::Table(pending.len() - 1)
        }
        LuaValue::Userdata(_) => {
            return Err(LuaError::Serialize("Cannot encode userdata".to_string()));
        }
    })
}

fn load_value(value: StoredValue, owner: usize, built: &[Option<Rc<LuaTable>>]) -> LuaResult<LuaValue> {
    Ok(match value {
        StoredValue::Boolean(b) => LuaValue::Boolean(b),
        StoredValue::Integer(i) => LuaValue::Integer(i),
        StoredValue::Float(n) => LuaValue::Float(n),
        StoredValue::String(s) => LuaValue::from(s),
        StoredValue::Table(child) => {
            // Only forward references; anything else would be a cycle or a dangling slot
            let table = built
                .get(child)
                .filter(|_| child > owner)
                .and_then(Option::as_ref)
                .ok_or_else(|| {
                    LuaError::Serialize(format!("Table {} refers to invalid table {}", owner, child))
                })?;
            LuaValue::Table(Rc::clone(table))
        }
    })
}
