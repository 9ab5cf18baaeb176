//! Script Engine - pluggable script interpreters for Weft activities
//!
//! This crate provides the engine abstraction used by the script activity:
//! a per-invocation interpreter handle with a variable-binding table and
//! captured I/O channels, plus a process-wide registry that resolves
//! human-readable engine names to factories.
//!
//! # Architecture
//!
//! - `ScriptEngine`: one interpreter instance per invocation (bindings and
//!   capture channels are never shared across runs)
//! - `EngineFactory`: names an engine and mints fresh handles
//! - `EngineRegistry`: link-time collected factory set, queried by exact
//!   display name
//!
//! Backends for Rhai and Lua ship in [`backends`].

pub mod backends;
pub mod engine;
pub mod error;
pub mod registry;

pub use engine::{EngineFactory, ScriptEngine};
pub use error::EvalError;
pub use registry::{EngineRegistration, EngineRegistry};
