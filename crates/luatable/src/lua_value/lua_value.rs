// LuaValue - tagged value stored in tables
//
// Keys and values share one type. Equality follows Lua:
// - integer and float compare equal when the float represents the integer exactly
// - strings compare by content
// - tables compare structurally (identity short-circuits)
// - userdata compare by identity
//
// Hashing must agree with equality, so numbers hash through their f64 bits
// and tables hash order-independently (see LuaTable's Hash impl).
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use smol_str::SmolStr;

use super::{LuaTable, LuaUserdata};

// ============ Basic type tags ============
// Only used to separate variants while hashing
pub const LUA_TBOOLEAN: u8 = 1;
pub const LUA_TNUMBER: u8 = 3;
pub const LUA_TSTRING: u8 = 4;
pub const LUA_TTABLE: u8 = 5;
pub const LUA_TUSERDATA: u8 = 7;

#[derive(Clone)]
pub enum LuaValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(SmolStr),
    Table(Rc<LuaTable>),
    Userdata(LuaUserdata),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LuaValueKind {
    Boolean,
    Integer,
    Float,
    String,
    Table,
    Userdata,
}

impl LuaValue {
    // ============ Constructors ============

    #[inline(always)]
    pub fn boolean(b: bool) -> Self {
        LuaValue::Boolean(b)
    }

    #[inline(always)]
    pub fn integer(i: i64) -> Self {
        LuaValue::Integer(i)
    }

    #[inline(always)]
    pub fn float(n: f64) -> Self {
        LuaValue::Float(n)
    }

    #[inline]
    pub fn string(s: impl Into<SmolStr>) -> Self {
        LuaValue::String(s.into())
    }

    #[inline]
    pub fn table(t: LuaTable) -> Self {
        LuaValue::Table(Rc::new(t))
    }

    #[inline]
    pub fn userdata(u: LuaUserdata) -> Self {
        LuaValue::Userdata(u)
    }

    // ============ Type checks ============

    pub fn kind(&self) -> LuaValueKind {
        match self {
            LuaValue::Boolean(_) => LuaValueKind::Boolean,
            LuaValue::Integer(_) => LuaValueKind::Integer,
            LuaValue::Float(_) => LuaValueKind::Float,
            LuaValue::String(_) => LuaValueKind::String,
            LuaValue::Table(_) => LuaValueKind::Table,
            LuaValue::Userdata(_) => LuaValueKind::Userdata,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind() {
            LuaValueKind::Boolean => "boolean",
            LuaValueKind::Integer => "integer",
            LuaValueKind::Float => "float",
            LuaValueKind::String => "string",
            LuaValueKind::Table => "table",
            LuaValueKind::Userdata => "userdata",
        }
    }

    #[inline(always)]
    pub fn is_boolean(&self) -> bool {
        matches!(self, LuaValue::Boolean(_))
    }

    #[inline(always)]
    pub fn is_integer(&self) -> bool {
        matches!(self, LuaValue::Integer(_))
    }

    #[inline(always)]
    pub fn is_float(&self) -> bool {
        matches!(self, LuaValue::Float(_))
    }

    #[inline(always)]
    pub fn is_number(&self) -> bool {
        matches!(self, LuaValue::Integer(_) | LuaValue::Float(_))
    }

    #[inline(always)]
    pub fn is_string(&self) -> bool {
        matches!(self, LuaValue::String(_))
    }

    #[inline(always)]
    pub fn is_table(&self) -> bool {
        matches!(self, LuaValue::Table(_))
    }

    #[inline(always)]
    pub fn is_userdata(&self) -> bool {
        matches!(self, LuaValue::Userdata(_))
    }

    // ============ Accessors ============

    #[inline]
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            LuaValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer view; floats convert only when they hold an exact integer
    #[inline]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            LuaValue::Integer(i) => Some(*i),
            LuaValue::Float(n) => float_to_integer(*n),
            _ => None,
        }
    }

    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            LuaValue::Float(n) => Some(*n),
            LuaValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        self.as_float()
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            LuaValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    #[inline]
    pub fn as_table(&self) -> Option<&LuaTable> {
        match self {
            LuaValue::Table(t) => Some(&**t),
            _ => None,
        }
    }

    #[inline]
    pub fn as_table_rc(&self) -> Option<&Rc<LuaTable>> {
        match self {
            LuaValue::Table(t) => Some(t),
            _ => None,
        }
    }

    #[inline]
    pub fn as_userdata(&self) -> Option<&LuaUserdata> {
        match self {
            LuaValue::Userdata(u) => Some(u),
            _ => None,
        }
    }
}

/// Float to integer, only if the conversion is exact
#[inline(always)]
fn float_to_integer(n: f64) -> Option<i64> {
    if !n.is_finite() || n != n.floor() {
        return None;
    }
    // i64::MIN is exactly representable as f64, i64::MAX is not
    if n < i64::MIN as f64 || n >= (i64::MAX as f64) + 1.0 {
        return None;
    }
    Some(n as i64)
}

/// Check if a float value exactly equals an integer value.
#[inline(always)]
fn float_eq_int(f: f64, i: i64) -> bool {
    float_to_integer(f) == Some(i)
}

impl PartialEq for LuaValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LuaValue::Boolean(a), LuaValue::Boolean(b)) => a == b,
            (LuaValue::Integer(a), LuaValue::Integer(b)) => a == b,
            // f64 compare so that NaN != NaN
            (LuaValue::Float(a), LuaValue::Float(b)) => a == b,
            (LuaValue::Integer(i), LuaValue::Float(f)) | (LuaValue::Float(f), LuaValue::Integer(i)) => {
                float_eq_int(*f, *i)
            }
            (LuaValue::String(a), LuaValue::String(b)) => a == b,
            (LuaValue::Table(a), LuaValue::Table(b)) => Rc::ptr_eq(a, b) || **a == **b,
            (LuaValue::Userdata(a), LuaValue::Userdata(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

// NaN is the only value not equal to itself. Keys that are NaN or contain NaN
// anywhere are rejected by normalize_key, so every stored key is Eq
impl Eq for LuaValue {}

impl Hash for LuaValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            LuaValue::Boolean(b) => {
                LUA_TBOOLEAN.hash(state);
                b.hash(state);
            }
            // Numbers hash as floats so that 1 and 1.0 land together
            LuaValue::Integer(i) => {
                LUA_TNUMBER.hash(state);
                number_bits(*i as f64).hash(state);
            }
            LuaValue::Float(n) => {
                LUA_TNUMBER.hash(state);
                number_bits(*n).hash(state);
            }
            LuaValue::String(s) => {
                LUA_TSTRING.hash(state);
                s.as_str().hash(state);
            }
            LuaValue::Table(t) => {
                LUA_TTABLE.hash(state);
                t.hash(state);
            }
            LuaValue::Userdata(u) => {
                LUA_TUSERDATA.hash(state);
                u.addr().hash(state);
            }
        }
    }
}

/// 0.0 == -0.0, so both must hash alike
#[inline(always)]
fn number_bits(n: f64) -> u64 {
    if n == 0.0 { 0 } else { n.to_bits() }
}

impl std::fmt::Debug for LuaValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LuaValue::Boolean(b) => write!(f, "{}", b),
            LuaValue::Integer(i) => write!(f, "{}", i),
            LuaValue::Float(n) => write!(f, "{:?}", n),
            LuaValue::String(s) => write!(f, "\"{}\"", s),
            LuaValue::Table(t) => write!(f, "{:?}", t),
            LuaValue::Userdata(u) => write!(f, "{:?}", u),
        }
    }
}

impl std::fmt::Display for LuaValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LuaValue::Boolean(b) => write!(f, "{}", b),
            LuaValue::Integer(i) => write!(f, "{}", i),
            LuaValue::Float(n) => write!(f, "{:?}", n),
            LuaValue::String(s) => write!(f, "{}", s),
            LuaValue::Table(t) => write!(f, "{}", t),
            LuaValue::Userdata(u) => write!(f, "userdata: 0x{:x}", u.addr()),
        }
    }
}
