// Table value representation
// A closed tagged variant shared by keys and values; absence is `Option`, there is no nil
mod lua_convert;
mod lua_table;
mod lua_value;

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use smol_str::SmolStr;

use crate::lua_error::{LuaError, LuaResult};

pub use lua_convert::FromLua;
pub use lua_table::LuaTable;
pub use lua_value::{LuaValue, LuaValueKind};

/// Userdata - arbitrary Rust data stored as an opaque leaf
///
/// Compared and hashed by identity: two handles are equal only when they
/// point at the same allocation.
#[derive(Clone)]
pub struct LuaUserdata {
    data: Rc<dyn Any>,
}

impl LuaUserdata {
    pub fn new<T: Any>(data: T) -> Self {
        LuaUserdata {
            data: Rc::new(data),
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.data.is::<T>()
    }

    #[inline]
    pub fn ptr_eq(&self, other: &LuaUserdata) -> bool {
        self.addr() == other.addr()
    }

    #[inline]
    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.data) as *const () as usize
    }
}

impl fmt::Debug for LuaUserdata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Userdata(0x{:x})", self.addr())
    }
}

/// Normalize a key before it is stored.
///
/// Floats with an exact integer value address the same slot as the integer.
/// A key that is NaN, or a table holding NaN at any depth, is never equal to
/// itself, so it could not be found again and is rejected.
pub(crate) fn normalize_key(key: LuaValue) -> LuaResult<LuaValue> {
    match key {
        LuaValue::Float(n) if n.is_nan() => {
            Err(LuaError::precondition("table index is NaN"))
        }
        LuaValue::Float(_) => match key.as_integer() {
            Some(i) => Ok(LuaValue::Integer(i)),
            None => Ok(key),
        },
        LuaValue::Table(ref t) if holds_nan(t) => {
            Err(LuaError::precondition("table index contains a NaN value"))
        }
        _ => Ok(key),
    }
}

/// Search a table tree for a NaN value. Keys need no check, they were
/// normalized when stored.
fn holds_nan(root: &LuaTable) -> bool {
    let mut pending = vec![root];
    while let Some(table) = pending.pop() {
        for value in table.values() {
            match value {
                LuaValue::Float(n) if n.is_nan() => return true,
                LuaValue::Table(child) => pending.push(&**child),
                _ => {}
            }
        }
    }
    false
}

impl From<SmolStr> for LuaValue {
    #[inline]
    fn from(s: SmolStr) -> Self {
        LuaValue::String(s)
    }
}

#[cfg(test)]
mod value_tests {
    use super::*;

    #[test]
    fn test_normalize_integral_float_key() {
        let key = normalize_key(LuaValue::Float(2.0)).unwrap();
        assert!(matches!(key, LuaValue::Integer(2)));

        let key = normalize_key(LuaValue::Float(2.5)).unwrap();
        assert!(matches!(key, LuaValue::Float(n) if n == 2.5));
    }

    #[test]
    fn test_normalize_nan_key() {
        let err = normalize_key(LuaValue::Float(f64::NAN)).unwrap_err();
        assert!(matches!(err, LuaError::PreconditionViolation(_)));
    }

    #[test]
    fn test_normalize_table_key_with_nan() {
        let flat = LuaValue::from(LuaTable::from_values([f64::NAN]));
        assert!(matches!(normalize_key(flat), Err(LuaError::PreconditionViolation(_))));

        let mut inner = LuaTable::new();
        inner.set_str("x", f64::NAN);
        let deep = LuaValue::from(LuaTable::from_values([LuaValue::from(inner)]));
        assert!(matches!(normalize_key(deep), Err(LuaError::PreconditionViolation(_))));

        let clean = LuaValue::from(LuaTable::from_values([1.5]));
        assert!(normalize_key(clean).is_ok());
    }

    #[test]
    fn test_userdata_identity() {
        let a = LuaUserdata::new(5u32);
        let b = a.clone();
        let c = LuaUserdata::new(5u32);

        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
        assert_eq!(a.downcast_ref::<u32>(), Some(&5));
        assert!(a.is::<u32>());
        assert!(a.downcast_ref::<i64>().is_none());
    }
}
