//! Built-in engine backends
//!
//! Each backend implements [`ScriptEngine`](crate::engine::ScriptEngine)
//! for one interpreter and registers its factory with the global registry
//! at link time.

pub mod lua;
pub mod rhai;

pub use lua::LuaEngineFactory;
pub use rhai::RhaiEngineFactory;
