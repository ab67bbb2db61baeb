/// Serde support for tables
///
/// Two layers:
/// - JSON interop (`lua_to_json` / `json_to_lua`): natural JSON shapes, arrays for
///   sequences and objects for everything else. Lossy for non-string keys.
/// - Persistence (`save` / `load`): a lossless encoding behind the `TableCodec`
///   collaborator, JSON by default.
mod deserializer;
mod persist;
mod serializer;

pub use deserializer::{from_str as deserialize_from_json_str, from_value as deserialize_from_json};
pub use persist::{JsonCodec, SaveOptions, TableCodec, load, load_with, save, save_with};
pub use serializer::{to_string as serialize_to_json_string, to_value as serialize_to_json};

use crate::lua_error::LuaResult;
use crate::lua_value::LuaValue;

/// Convert a value to a serde_json::Value
pub fn lua_to_json(lua_value: &LuaValue) -> LuaResult<serde_json::Value> {
    serialize_to_json(lua_value)
}

/// Convert a value to a JSON string
pub fn lua_to_json_string(lua_value: &LuaValue, pretty: bool) -> LuaResult<String> {
    serialize_to_json_string(lua_value, pretty)
}

/// Convert a serde_json::Value to a value
pub fn json_to_lua(json_value: &serde_json::Value) -> LuaResult<LuaValue> {
    deserialize_from_json(json_value)
}

/// Convert a JSON string to a value
pub fn json_string_to_lua(json_str: &str) -> LuaResult<LuaValue> {
    deserialize_from_json_str(json_str)
}
