/// Serializer for converting values to serde_json::Value
///
/// - boolean -> JSON boolean
/// - integer / float -> JSON number
/// - string -> JSON string
/// - table (pure sequence) -> JSON array
/// - table (anything else) -> JSON object, keys stringified
/// - userdata -> error
use serde_json::{Map, Number, Value as JsonValue};
use tracing::warn;

use crate::lua_error::{LuaError, LuaResult};
use crate::lua_value::{LuaTable, LuaValue};

/// Convert a value to a serde_json::Value
pub fn to_value(lua_value: &LuaValue) -> LuaResult<JsonValue> {
    match lua_value {
        LuaValue::Boolean(b) => Ok(JsonValue::Bool(*b)),

        LuaValue::Integer(i) => Ok(JsonValue::Number(Number::from(*i))),

        LuaValue::Float(n) => Number::from_f64(*n)
            .map(JsonValue::Number)
            .ok_or_else(|| LuaError::Serialize(format!("Invalid number: {}", n))),

        LuaValue::String(s) => Ok(JsonValue::String(s.to_string())),

        LuaValue::Table(t) => {
            // The hash part is empty exactly when the table is a sequence 1..n
            if t.hash.is_empty() {
                table_to_json_array(t)
            } else {
                table_to_json_object(t)
            }
        }

        LuaValue::Userdata(_) => Err(LuaError::Serialize(
            "Cannot serialize userdata to JSON".to_string(),
        )),
    }
}

/// Convert a value to a JSON string
pub fn to_string(lua_value: &LuaValue, pretty: bool) -> LuaResult<String> {
    let json_value = to_value(lua_value)?;

    let result = if pretty {
        serde_json::to_string_pretty(&json_value)
    } else {
        serde_json::to_string(&json_value)
    };
    result.map_err(|e| LuaError::Serialize(format!("Failed to serialize to JSON: {}", e)))
}

fn table_to_json_array(table: &LuaTable) -> LuaResult<JsonValue> {
    table
        .array()
        .iter()
        .map(to_value)
        .collect::<LuaResult<Vec<_>>>()
        .map(JsonValue::Array)
}

fn table_to_json_object(table: &LuaTable) -> LuaResult<JsonValue> {
    let mut object = Map::new();

    for (key, value) in table.iter() {
        let key_str = match &key {
            LuaValue::String(s) => s.to_string(),
            LuaValue::Integer(i) => i.to_string(),
            LuaValue::Float(n) => n.to_string(),
            LuaValue::Boolean(b) => b.to_string(),
            LuaValue::Table(_) | LuaValue::Userdata(_) => {
                warn!(key_type = key.type_name(), "skipping key with no JSON form");
                continue;
            }
        };

        object.insert(key_str, to_value(value)?);
    }

    Ok(JsonValue::Object(object))
}
