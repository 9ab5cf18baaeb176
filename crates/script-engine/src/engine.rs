//! Engine handle and factory traits
//!
//! A `ScriptEngine` is a resolved, ready-to-run interpreter bound to one
//! invocation's private variable table and I/O capture channels. Handles
//! are created fresh per run and discarded afterwards so no state leaks
//! between invocations.

use serde_json::Value;

use crate::error::EvalError;

/// A script interpreter scoped to a single invocation.
///
/// Values cross the boundary as `serde_json::Value`; each backend converts
/// to and from its native representation. The three I/O channels mirror a
/// process: an input source fed via [`set_stdin`](Self::set_stdin) and two
/// writable capture channels accumulated during evaluation.
pub trait ScriptEngine {
    /// Place a variable into the engine's binding table.
    fn bind(&mut self, name: &str, value: &Value) -> Result<(), EvalError>;

    /// Feed the input channel. Defaults to an empty source when never
    /// called.
    fn set_stdin(&mut self, text: &str);

    /// Evaluate the script against the populated binding table. This is
    /// the single blocking step of an invocation.
    fn eval(&mut self, script: &str) -> Result<(), EvalError>;

    /// Read a binding back by its exact name. `None` when the script
    /// produced no value under that name.
    fn variable(&mut self, name: &str) -> Result<Option<Value>, EvalError>;

    /// Text accumulated on the standard-output capture channel.
    fn stdout(&self) -> String;

    /// Text accumulated on the standard-error capture channel.
    fn stderr(&self) -> String;
}

/// Factory for a script engine, keyed by its display name.
///
/// Factories are cheap, shared, and thread-safe; the handles they mint are
/// not. Resolution by display name happens on the registry, so a factory
/// only has to describe itself and create handles.
pub trait EngineFactory: Send + Sync {
    /// Display name used for exact, case-sensitive registry lookup
    /// (e.g. `"Rhai"`).
    fn engine_name(&self) -> &str;

    /// Invocation short names. A factory exposing no aliases is treated
    /// as unresolvable by the registry.
    fn aliases(&self) -> &[&str];

    /// Mint a fresh engine handle for one invocation.
    fn create_engine(&self) -> Box<dyn ScriptEngine>;
}
