// Structural transforms between a tree of nested tables and one flat sequence.
//
// Both walks keep their own stack of frames instead of recursing, so nesting
// depth is bounded by the heap rather than the native stack.
use std::rc::Rc;

use tracing::trace;

use super::LuaTable;
use crate::lua_error::{LuaError, LuaResult};
use crate::lua_value::LuaValue;

impl LuaTable {
    /// A table takes part in flatten/inverse_flatten only as a pure sequence
    fn ensure_sequence(&self, role: &str) -> LuaResult<()> {
        if self.hash.is_empty() {
            return Ok(());
        }
        Err(LuaError::precondition(format!(
            "{} table must be a dense sequence 1..n, found {} entries outside the prefix of {}",
            role,
            self.hash.len(),
            self.array.len()
        )))
    }

    /// Collapse nested tables into one sequence of leaves, depth-first, left to right
    pub fn flatten(&self) -> LuaResult<LuaTable> {
        self.ensure_sequence("flatten")?;

        let mut leaves = Vec::with_capacity(self.array.len());
        // (table being walked, next position to visit)
        let mut stack: Vec<(&LuaTable, usize)> = vec![(self, 0)];

        while let Some(frame) = stack.last_mut() {
            let (table, pos) = *frame;
            if pos == table.array.len() {
                stack.pop();
                continue;
            }
            frame.1 += 1;

            match &table.array[pos] {
                LuaValue::Table(child) => {
                    child.ensure_sequence("flatten")?;
                    stack.push((&**child, 0));
                }
                leaf => leaves.push(leaf.clone()),
            }
        }

        trace!(leaves = leaves.len(), "flattened table");
        Ok(LuaTable::from_values(leaves))
    }

    /// Rebuild the shape of `template` using the leaves of `self`, in order.
    ///
    /// Every nested table in `template` becomes a rebuilt table; every leaf
    /// position consumes the next leaf. Leaves left over at the end are ignored.
    pub fn inverse_flatten(&self, template: &LuaTable) -> LuaResult<LuaTable> {
        template.ensure_sequence("inverse_flatten template")?;

        struct Frame<'a> {
            shape: &'a LuaTable,
            pos: usize,
            built: Vec<LuaValue>,
        }

        let mut cursor: i64 = 1;
        let mut rebuilt = None;
        let mut stack = vec![Frame {
            shape: template,
            pos: 0,
            built: Vec::with_capacity(template.array.len()),
        }];

        while let Some(frame) = stack.last_mut() {
            if frame.pos == frame.shape.array.len() {
                let done = LuaTable::from_values(std::mem::take(&mut frame.built));
                stack.pop();
                match stack.last_mut() {
                    Some(parent) => parent.built.push(LuaValue::Table(Rc::new(done))),
                    None => rebuilt = Some(done),
                }
                continue;
            }

            let shape = frame.shape;
            let pos = frame.pos;
            frame.pos += 1;

            match &shape.array[pos] {
                LuaValue::Table(child) => {
                    child.ensure_sequence("inverse_flatten template")?;
                    stack.push(Frame {
                        shape: &**child,
                        pos: 0,
                        built: Vec::with_capacity(child.array.len()),
                    });
                }
                _ => {
                    let leaf = self.get_int(cursor).cloned().ok_or_else(|| {
                        LuaError::KeyNotFound(format!(
                            "{} (template needs more leaves than the flat table holds)",
                            cursor
                        ))
                    })?;
                    cursor += 1;
                    frame.built.push(leaf);
                }
            }
        }

        trace!(consumed = cursor - 1, "rebuilt table from leaves");
        // The root frame is always the last one popped
        Ok(rebuilt.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use crate::{LuaError, LuaTable, LuaValue, lua_table};

    #[test]
    fn test_flatten_nested() {
        let t = lua_table![lua_table![1, 2], 3, lua_table![4, 5]];
        assert_eq!(t.flatten().unwrap(), lua_table![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_flatten_skips_empty_children() {
        let t = lua_table![LuaTable::new(), 1, lua_table![LuaTable::new()], 2];
        assert_eq!(t.flatten().unwrap(), lua_table![1, 2]);
    }

    #[test]
    fn test_flatten_rejects_sparse() {
        let mut inner = lua_table![1];
        inner.set_str("tag", "x");
        let t = lua_table![inner, 2];
        assert!(matches!(t.flatten(), Err(LuaError::PreconditionViolation(_))));
    }

    #[test]
    fn test_inverse_flatten_round_trip() {
        let t = lua_table![lua_table![1, lua_table!["a", "b"]], 3, LuaTable::new(), 4.5];
        let flat = t.flatten().unwrap();
        assert_eq!(flat.len(), 5);
        assert_eq!(flat.inverse_flatten(&t).unwrap(), t);
    }

    #[test]
    fn test_inverse_flatten_uses_new_leaves() {
        let shape = lua_table![lua_table![0, 0], 0];
        let leaves = lua_table!["x", "y", "z"];
        let rebuilt = leaves.inverse_flatten(&shape).unwrap();
        assert_eq!(rebuilt, lua_table![lua_table!["x", "y"], "z"]);
    }

    #[test]
    fn test_inverse_flatten_short_of_leaves() {
        let shape = lua_table![0, lua_table![0, 0]];
        let leaves = lua_table![1, 2];
        let err = leaves.inverse_flatten(&shape).unwrap_err();
        assert!(matches!(err, LuaError::KeyNotFound(msg) if msg.starts_with('3')));
    }

    #[test]
    fn test_deep_nesting() {
        let mut t = lua_table![0];
        for i in 1..1_000 {
            t = lua_table![LuaValue::from(t), i];
        }
        let flat = t.flatten().unwrap();
        assert_eq!(flat.len(), 1_000);
        assert_eq!(flat.get_int(1), Some(&LuaValue::integer(0)));
        assert_eq!(flat.get_int(1_000), Some(&LuaValue::integer(999)));

        let rebuilt = flat.inverse_flatten(&t).unwrap();
        assert_eq!(rebuilt, t);
        assert_eq!(rebuilt.clone(), t);
    }
}
