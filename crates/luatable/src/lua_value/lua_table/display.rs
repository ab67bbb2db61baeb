use std::fmt;

use super::LuaTable;
use crate::lua_value::LuaValue;

const INDENT: &str = "  ";

impl LuaTable {
    /// Entries in rendering order: the prefix by index, then the hash part
    /// sorted by rendered key so output is stable between runs
    fn display_entries(&self) -> Vec<(String, &LuaValue)> {
        let mut buffer = itoa::Buffer::new();
        let mut entries: Vec<(String, &LuaValue)> = self
            .array
            .iter()
            .enumerate()
            .map(|(i, value)| (buffer.format(i + 1).to_owned(), value))
            .collect();

        let mut keyed: Vec<(String, &LuaValue)> = self
            .hash
            .iter()
            .map(|(key, value)| (render_key(key, &mut buffer), value))
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));

        entries.extend(keyed);
        entries
    }
}

fn render_key(key: &LuaValue, buffer: &mut itoa::Buffer) -> String {
    match key {
        LuaValue::Integer(i) => buffer.format(*i).to_owned(),
        LuaValue::String(s) => s.to_string(),
        // A table used as a key renders on one line
        other => other.to_string().split_whitespace().collect::<Vec<_>>().join(" "),
    }
}

impl fmt::Display for LuaTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("{}");
        }

        f.write_str("{\n")?;
        for (key, value) in self.display_entries() {
            let rendered = value.to_string();
            let mut lines = rendered.lines();
            writeln!(f, "{}{}: {}", INDENT, key, lines.next().unwrap_or(""))?;
            // Continuation lines of a nested table line up after "key: "
            let pad = key.chars().count() + 2;
            for line in lines {
                writeln!(f, "{}{:pad$}{}", INDENT, "", line, pad = pad)?;
            }
        }
        f.write_str("}")
    }
}

impl fmt::Debug for LuaTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
