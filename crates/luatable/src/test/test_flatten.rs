// Tests for flatten / inverse_flatten over nested sequences
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::*;

/// Random nested sequence whose leaves count up from `next`
fn random_shape(rng: &mut StdRng, depth: u32, next: &mut i64) -> LuaTable {
    let mut table = LuaTable::new();
    for _ in 0..rng.gen_range(0..5) {
        if depth > 0 && rng.gen_bool(0.3) {
            table.insert(random_shape(rng, depth - 1, next));
        } else {
            *next += 1;
            table.insert(*next);
        }
    }
    table
}

#[test]
fn test_flatten_scenario() {
    let t = lua_table![lua_table![1, 2], 3, lua_table![4, 5]];
    let flat = t.flatten().unwrap();

    assert_eq!(flat, lua_table![1, 2, 3, 4, 5]);
    assert_eq!(flat.top_index(), 5);
}

#[test]
fn test_flatten_keeps_non_table_leaves() {
    let data = LuaUserdata::new(vec![1u8, 2, 3]);
    let t = lua_table![lua_table![true, "s"], data.clone(), 1.5];
    let flat = t.flatten().unwrap();

    assert_eq!(flat.len(), 4);
    assert!(flat.get_int(3).and_then(LuaValue::as_userdata).unwrap().ptr_eq(&data));
}

#[test]
fn test_flatten_empty() {
    assert!(LuaTable::new().flatten().unwrap().is_empty());
}

#[test]
fn test_flatten_rejects_keyed_root() {
    let mut t = lua_table![1, 2];
    t.set_int(4, 4);
    let err = t.flatten().unwrap_err();
    assert!(matches!(err, LuaError::PreconditionViolation(_)));
}

#[test]
fn test_flatten_does_not_touch_source() {
    let t = lua_table![lua_table![1], 2];
    let before = t.clone();
    t.flatten().unwrap();
    assert_eq!(t, before);
}

#[test]
fn test_inverse_flatten_ignores_surplus_leaves() {
    let shape = lua_table![0, lua_table![0]];
    let leaves = lua_table!["a", "b", "c", "d"];
    let rebuilt = leaves.inverse_flatten(&shape).unwrap();
    assert_eq!(rebuilt, lua_table!["a", lua_table!["b"]]);
}

#[test]
fn test_inverse_flatten_rejects_keyed_template() {
    let mut shape = lua_table![0];
    shape.set_str("meta", 1);
    let err = lua_table![1].inverse_flatten(&shape).unwrap_err();
    assert!(matches!(err, LuaError::PreconditionViolation(_)));
}

#[test]
fn test_inverse_flatten_empty_template() {
    let rebuilt = lua_table![1, 2].inverse_flatten(&LuaTable::new()).unwrap();
    assert!(rebuilt.is_empty());
}

#[test]
fn test_random_round_trips() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let mut next = 0;
        let shape = random_shape(&mut rng, 4, &mut next);

        let flat = shape.flatten().unwrap();
        assert_eq!(flat.len(), next as usize);
        assert_eq!(flat.top_index(), next as usize);
        for i in 1..=next {
            assert_eq!(flat.get_int(i), Some(&LuaValue::integer(i)));
        }

        assert_eq!(flat.inverse_flatten(&shape).unwrap(), shape);
    }
}
