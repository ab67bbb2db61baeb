// Lua-style table
// A hybrid 1-based array / hash map container with structural flatten and unflatten

#[cfg(test)]
mod test;

pub mod activity;
pub mod lua_error;
pub mod lua_value;
pub mod table_builder;

#[cfg(feature = "serde")]
pub mod serde;

pub use activity::Activity;
pub use lua_error::{LuaError, LuaResult};
pub use lua_value::{FromLua, LuaTable, LuaUserdata, LuaValue, LuaValueKind};
pub use table_builder::TableBuilder;
