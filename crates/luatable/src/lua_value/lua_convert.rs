//! `FromLua` / `From<T> for LuaValue`: conversion between Rust types and `LuaValue`.
//!
//! Reads out of a table go through [`FromLua`], which checks the variant tag
//! and reports [`LuaError::TypeMismatch`] instead of casting blindly.
//!
//! # Built-in impls
//! - `bool`, `i8`..`i64`, `isize`, `u8`..`u64`, `usize`, `f32`, `f64`
//! - `String`, `SmolStr`
//! - `LuaTable` (cloned out), `Rc<LuaTable>` (shared), `LuaUserdata`
//! - `LuaValue` (identity)
//!
//! # User extensibility
//! ```ignore
//! impl FromLua for Point {
//!     fn from_lua(value: &LuaValue) -> LuaResult<Self> {
//!         let t = Rc::<LuaTable>::from_lua(value)?;
//!         Ok(Point { x: t.index_as(&"x".into())?, y: t.index_as(&"y".into())? })
//!     }
//! }
//! ```

use std::rc::Rc;

use smol_str::SmolStr;

use crate::lua_error::{LuaError, LuaResult};
use crate::lua_value::{LuaTable, LuaUserdata, LuaValue};

/// Convert a `LuaValue` into a Rust type.
///
/// Return `Err(LuaError::TypeMismatch { .. })` when the value holds another variant.
pub trait FromLua: Sized {
    fn from_lua(value: &LuaValue) -> LuaResult<Self>;
}

#[inline]
fn mismatch(expected: &'static str, value: &LuaValue) -> LuaError {
    LuaError::TypeMismatch {
        expected,
        found: value.type_name(),
    }
}

// ==================== Identity: LuaValue ====================

impl FromLua for LuaValue {
    #[inline]
    fn from_lua(value: &LuaValue) -> LuaResult<Self> {
        Ok(value.clone())
    }
}

// ==================== Boolean ====================

impl FromLua for bool {
    #[inline]
    fn from_lua(value: &LuaValue) -> LuaResult<Self> {
        value.as_boolean().ok_or_else(|| mismatch("boolean", value))
    }
}

impl From<bool> for LuaValue {
    #[inline]
    fn from(b: bool) -> Self {
        LuaValue::Boolean(b)
    }
}

// ==================== Integer types ====================

macro_rules! impl_from_lua_int {
    ($($ty:ty),*) => {
        $(
            impl FromLua for $ty {
                #[inline]
                fn from_lua(value: &LuaValue) -> LuaResult<Self> {
                    value
                        .as_integer()
                        .and_then(|i| <$ty>::try_from(i).ok())
                        .ok_or_else(|| mismatch(stringify!($ty), value))
                }
            }
        )*
    };
}

impl_from_lua_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

// Only the lossless ones become LuaValue::Integer
macro_rules! impl_into_lua_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for LuaValue {
                #[inline]
                fn from(i: $ty) -> Self {
                    LuaValue::Integer(i as i64)
                }
            }
        )*
    };
}

impl_into_lua_int!(i8, i16, i32, i64, u8, u16, u32);

// ==================== Float types ====================

impl FromLua for f64 {
    #[inline]
    fn from_lua(value: &LuaValue) -> LuaResult<Self> {
        value.as_number().ok_or_else(|| mismatch("number", value))
    }
}

impl FromLua for f32 {
    #[inline]
    fn from_lua(value: &LuaValue) -> LuaResult<Self> {
        value
            .as_number()
            .map(|n| n as f32)
            .ok_or_else(|| mismatch("number", value))
    }
}

impl From<f64> for LuaValue {
    #[inline]
    fn from(n: f64) -> Self {
        LuaValue::Float(n)
    }
}

impl From<f32> for LuaValue {
    #[inline]
    fn from(n: f32) -> Self {
        LuaValue::Float(n as f64)
    }
}

// ==================== String ====================

impl FromLua for String {
    #[inline]
    fn from_lua(value: &LuaValue) -> LuaResult<Self> {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| mismatch("string", value))
    }
}

impl FromLua for SmolStr {
    #[inline]
    fn from_lua(value: &LuaValue) -> LuaResult<Self> {
        match value {
            LuaValue::String(s) => Ok(s.clone()),
            _ => Err(mismatch("string", value)),
        }
    }
}

impl From<&str> for LuaValue {
    #[inline]
    fn from(s: &str) -> Self {
        LuaValue::String(SmolStr::new(s))
    }
}

impl From<String> for LuaValue {
    #[inline]
    fn from(s: String) -> Self {
        LuaValue::String(SmolStr::from(s))
    }
}

// ==================== Table ====================

impl FromLua for Rc<LuaTable> {
    #[inline]
    fn from_lua(value: &LuaValue) -> LuaResult<Self> {
        value
            .as_table_rc()
            .cloned()
            .ok_or_else(|| mismatch("table", value))
    }
}

impl FromLua for LuaTable {
    #[inline]
    fn from_lua(value: &LuaValue) -> LuaResult<Self> {
        value
            .as_table()
            .cloned()
            .ok_or_else(|| mismatch("table", value))
    }
}

impl From<LuaTable> for LuaValue {
    #[inline]
    fn from(t: LuaTable) -> Self {
        LuaValue::Table(Rc::new(t))
    }
}

impl From<Rc<LuaTable>> for LuaValue {
    #[inline]
    fn from(t: Rc<LuaTable>) -> Self {
        LuaValue::Table(t)
    }
}

// ==================== Userdata ====================

impl FromLua for LuaUserdata {
    #[inline]
    fn from_lua(value: &LuaValue) -> LuaResult<Self> {
        value
            .as_userdata()
            .cloned()
            .ok_or_else(|| mismatch("userdata", value))
    }
}

impl From<LuaUserdata> for LuaValue {
    #[inline]
    fn from(u: LuaUserdata) -> Self {
        LuaValue::Userdata(u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_conversion() {
        assert_eq!(i64::from_lua(&LuaValue::integer(7)).unwrap(), 7);
        assert_eq!(u8::from_lua(&LuaValue::float(200.0)).unwrap(), 200);

        let err = u8::from_lua(&LuaValue::integer(300)).unwrap_err();
        assert!(matches!(err, LuaError::TypeMismatch { expected: "u8", found: "integer" }));

        let err = i32::from_lua(&LuaValue::float(1.5)).unwrap_err();
        assert!(matches!(err, LuaError::TypeMismatch { found: "float", .. }));
    }

    #[test]
    fn test_float_conversion() {
        assert_eq!(f64::from_lua(&LuaValue::integer(2)).unwrap(), 2.0);
        assert!(f64::from_lua(&LuaValue::string("2")).is_err());
    }

    #[test]
    fn test_string_conversion() {
        assert_eq!(String::from_lua(&LuaValue::from("abc")).unwrap(), "abc");
        let err = String::from_lua(&LuaValue::integer(1)).unwrap_err();
        assert!(matches!(err, LuaError::TypeMismatch { expected: "string", found: "integer" }));
    }

    #[test]
    fn test_table_conversion() {
        let value = LuaValue::from(LuaTable::from_values([1, 2]));
        let shared = Rc::<LuaTable>::from_lua(&value).unwrap();
        assert_eq!(shared.len(), 2);
        assert!(Rc::ptr_eq(&shared, value.as_table_rc().unwrap()));

        assert!(LuaTable::from_lua(&LuaValue::boolean(false)).is_err());
    }

    #[test]
    fn test_bool_is_strict() {
        assert!(bool::from_lua(&LuaValue::boolean(true)).unwrap());
        assert!(bool::from_lua(&LuaValue::integer(1)).is_err());
    }
}
