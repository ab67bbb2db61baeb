/// Deserializer for converting serde_json::Value to values
///
/// - JSON boolean -> boolean
/// - JSON number -> integer when it fits i64, float otherwise
/// - JSON string -> string
/// - JSON array -> table (sequence)
/// - JSON object -> table (string keys)
/// - JSON null -> error, tables cannot store an absent value
use serde_json::Value as JsonValue;

use crate::lua_error::{LuaError, LuaResult};
use crate::lua_value::{LuaTable, LuaValue};

/// Convert a serde_json::Value to a value
pub fn from_value(json_value: &JsonValue) -> LuaResult<LuaValue> {
    match json_value {
        JsonValue::Null => Err(LuaError::Serialize(
            "JSON null has no table representation".to_string(),
        )),

        JsonValue::Bool(b) => Ok(LuaValue::boolean(*b)),

        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(LuaValue::integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(LuaValue::float(f))
            } else {
                Err(LuaError::Serialize("Invalid JSON number".to_string()))
            }
        }

        JsonValue::String(s) => Ok(LuaValue::from(s.as_str())),

        JsonValue::Array(arr) => json_array_to_lua_table(arr),

        JsonValue::Object(obj) => json_object_to_lua_table(obj),
    }
}

/// Convert a JSON string to a value
pub fn from_str(json_str: &str) -> LuaResult<LuaValue> {
    let json_value: JsonValue = serde_json::from_str(json_str)
        .map_err(|e| LuaError::Serialize(format!("Failed to parse JSON: {}", e)))?;

    from_value(&json_value)
}

fn json_array_to_lua_table(arr: &[JsonValue]) -> LuaResult<LuaValue> {
    let values = arr.iter().map(from_value).collect::<LuaResult<Vec<_>>>()?;
    Ok(LuaValue::from(LuaTable::from_values(values)))
}

fn json_object_to_lua_table(obj: &serde_json::Map<String, JsonValue>) -> LuaResult<LuaValue> {
    let mut table = LuaTable::with_capacity(0, obj.len());

    for (key_str, value_json) in obj {
        let value = from_value(value_json)?;
        table.set_str(key_str, value);
    }

    Ok(LuaValue::from(table))
}
