// Tests for persistence to disk and JSON interop
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::serde::{
    JsonCodec, SaveOptions, TableCodec, json_string_to_lua, json_to_lua, load, load_with,
    lua_to_json, lua_to_json_string, save, save_with,
};
use crate::*;

static NEXT_FILE: AtomicUsize = AtomicUsize::new(0);

/// Unique path under the system temp dir; removed when dropped
struct TempPath(PathBuf);

impl TempPath {
    fn new(name: &str) -> Self {
        let n = NEXT_FILE.fetch_add(1, Ordering::Relaxed);
        let file = format!("luatable-{}-{}-{}.json", std::process::id(), n, name);
        TempPath(std::env::temp_dir().join(file))
    }
}

impl Drop for TempPath {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

fn sample() -> LuaTable {
    let mut t = lua_table![lua_table![1, 2], 3, "four"];
    t.set_str("name", "sample");
    t.set_int(8, 8.5);
    t.update(false, lua_table!["nested", lua_table![]]).unwrap();
    t
}

#[test]
fn test_save_load_round_trip() {
    let path = TempPath::new("round-trip");
    let table = sample();

    save(&table, &path.0, false).unwrap();
    let loaded = load(&path.0).unwrap();

    assert_eq!(loaded, table);
    assert_eq!(loaded.top_index(), 3);
}

#[test]
fn test_save_without_overwrite_fails_on_existing() {
    let path = TempPath::new("no-overwrite");
    save(&lua_table![1], &path.0, false).unwrap();

    let err = save(&lua_table![2], &path.0, false).unwrap_err();
    assert!(matches!(err, LuaError::Io(ref e) if e.kind() == std::io::ErrorKind::AlreadyExists));
    assert_eq!(load(&path.0).unwrap(), lua_table![1]);

    save(&lua_table![2], &path.0, true).unwrap();
    assert_eq!(load(&path.0).unwrap(), lua_table![2]);
}

#[test]
fn test_save_options_pretty() {
    let path = TempPath::new("pretty");
    let options = SaveOptions {
        overwrite: true,
        pretty: true,
    };
    options.save(&sample(), &path.0).unwrap();

    let text = std::fs::read_to_string(&path.0).unwrap();
    assert!(text.contains('\n'));
    assert_eq!(load_with(&JsonCodec::new(true), &path.0).unwrap(), sample());
}

#[test]
fn test_userdata_not_persisted() {
    let path = TempPath::new("userdata");
    let table = lua_table![LuaUserdata::new(1u32)];

    let err = save(&table, &path.0, true).unwrap_err();
    assert!(matches!(err, LuaError::Serialize(_)));
    assert!(!path.0.exists());
}

#[test]
fn test_load_missing_file() {
    let path = TempPath::new("missing");
    let err = load(&path.0).unwrap_err();
    assert!(matches!(err, LuaError::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
}

/// Codec that stores only the array part, one integer per line
struct LineCodec;

impl TableCodec for LineCodec {
    fn encode(&self, table: &LuaTable) -> LuaResult<Vec<u8>> {
        let mut out = String::new();
        for value in table.array() {
            let i = value.as_integer().ok_or_else(|| {
                LuaError::Serialize(format!("not an integer: {}", value))
            })?;
            out.push_str(&i.to_string());
            out.push('\n');
        }
        Ok(out.into_bytes())
    }

    fn decode(&self, bytes: &[u8]) -> LuaResult<LuaTable> {
        let text = std::str::from_utf8(bytes).map_err(|e| LuaError::Serialize(e.to_string()))?;
        text.lines()
            .map(|line| line.parse::<i64>().map_err(|e| LuaError::Serialize(e.to_string())))
            .collect::<LuaResult<Vec<_>>>()
            .map(LuaTable::from_values)
    }
}

#[test]
fn test_custom_codec() {
    let path = TempPath::new("lines");
    save_with(&LineCodec, &lua_table![3, 1, 2], &path.0, false).unwrap();

    assert_eq!(std::fs::read_to_string(&path.0).unwrap(), "3\n1\n2\n");
    assert_eq!(load_with(&LineCodec, &path.0).unwrap(), lua_table![3, 1, 2]);

    let codec: &dyn TableCodec = &LineCodec;
    assert!(codec.encode(&lua_table!["x"]).is_err());
}

#[test]
fn test_json_interop() {
    let value = LuaValue::from(lua_table![1, "two", lua_table![3.5]]);
    assert_eq!(lua_to_json_string(&value, false).unwrap(), "[1,\"two\",[3.5]]");

    let json = serde_json::json!({"name": "x", "list": [1, 2]});
    let table = json_to_lua(&json).unwrap();
    let table = table.as_table().unwrap();
    assert_eq!(table.get_str("name"), Some(&LuaValue::from("x")));
    assert_eq!(
        table.get_str("list").and_then(LuaValue::as_table),
        Some(&lua_table![1, 2])
    );

    assert_eq!(lua_to_json(&json_to_lua(&json).unwrap()).unwrap(), json);
    assert!(json_string_to_lua("null").is_err());
}
