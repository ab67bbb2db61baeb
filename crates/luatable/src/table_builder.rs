//! Fluent builder and literal macro for constructing tables.
//!
//! `TableBuilder` collects sequential and keyed entries and materialises them
//! in one shot via [`build`](TableBuilder::build).
//!
//! # Example
//!
//! ```
//! use luatable::{LuaValue, TableBuilder};
//!
//! let config = TableBuilder::new()
//!     .set("host", "localhost")
//!     .set("port", 8080)
//!     .set("debug", true)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.get_str("port"), Some(&LuaValue::integer(8080)));
//! ```

use crate::lua_error::LuaResult;
use crate::lua_value::{LuaTable, LuaValue};

/// Fluent builder for tables.
///
/// The array part is laid down first, keyed entries afterwards, so a keyed
/// integer entry overrides a pushed value at the same position.
pub struct TableBuilder {
    /// Keyed entries, applied in insertion order.
    entries: Vec<(LuaValue, LuaValue)>,
    /// Sequential array entries (1-based).
    array: Vec<LuaValue>,
}

impl TableBuilder {
    /// Create an empty builder.
    #[inline]
    pub fn new() -> Self {
        TableBuilder {
            entries: Vec::new(),
            array: Vec::new(),
        }
    }

    /// Add a string-keyed entry.
    #[inline]
    pub fn set(mut self, key: &str, value: impl Into<LuaValue>) -> Self {
        self.entries.push((LuaValue::from(key), value.into()));
        self
    }

    /// Add an integer-keyed entry.
    #[inline]
    pub fn set_int(mut self, key: i64, value: impl Into<LuaValue>) -> Self {
        self.entries.push((LuaValue::integer(key), value.into()));
        self
    }

    /// Add an entry under an arbitrary key (tables, booleans, floats, ...).
    #[inline]
    pub fn set_value(mut self, key: LuaValue, value: impl Into<LuaValue>) -> Self {
        self.entries.push((key, value.into()));
        self
    }

    /// Append a value to the sequential (array) part of the table.
    ///
    /// Values are assigned keys 1, 2, 3, … in order.
    #[inline]
    pub fn push(mut self, value: impl Into<LuaValue>) -> Self {
        self.array.push(value.into());
        self
    }

    /// Materialise the table. Fails only on a NaN key.
    pub fn build(self) -> LuaResult<LuaTable> {
        let mut table = LuaTable::from_values(self.array);
        for (key, value) in self.entries {
            table.update(key, value)?;
        }
        Ok(table)
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Table literal.
///
/// - `lua_table![a, b, c]` builds a sequence with keys `1..=3`.
/// - `lua_table!{k1 => v1, k2 => v2}` builds from pairs and returns
///   `LuaResult<LuaTable>`, since a NaN key is rejected.
///
/// ```
/// use luatable::{LuaValue, lua_table};
///
/// let seq = lua_table![10, "twenty", 30.5];
/// assert_eq!(seq.top_index(), 3);
///
/// let map = lua_table! { "name" => "lua", 1 => true }.unwrap();
/// assert_eq!(map.get_str("name"), Some(&LuaValue::from("lua")));
/// ```
#[macro_export]
macro_rules! lua_table {
    () => {
        $crate::LuaTable::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::LuaTable::from_pairs([
            $(($crate::LuaValue::from($key), $crate::LuaValue::from($value))),+
        ])
    };
    ($($value:expr),+ $(,)?) => {
        $crate::LuaTable::from_values([$($crate::LuaValue::from($value)),+])
    };
}
