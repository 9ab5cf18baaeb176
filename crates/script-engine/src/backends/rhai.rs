//! Rhai engine backend
//!
//! Bindings are pushed into a [`rhai::Scope`] and read back through the
//! same scope after evaluation. The capture channels hook the engine's
//! `print` and `debug` callbacks; scripts reach the input channel through
//! a registered `stdin()` function.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use rhai::serde::{from_dynamic, to_dynamic};
use rhai::{Engine, Scope};
use serde_json::Value;

use crate::engine::{EngineFactory, ScriptEngine};
use crate::error::EvalError;
use crate::registry::EngineRegistration;

/// Factory for the Rhai interpreter.
pub struct RhaiEngineFactory;

impl EngineFactory for RhaiEngineFactory {
    fn engine_name(&self) -> &str {
        "Rhai"
    }

    fn aliases(&self) -> &[&str] {
        &["rhai"]
    }

    fn create_engine(&self) -> Box<dyn ScriptEngine> {
        Box::new(RhaiScriptEngine::new())
    }
}

fn rhai_factory() -> Arc<dyn EngineFactory> {
    Arc::new(RhaiEngineFactory)
}

inventory::submit!(EngineRegistration(rhai_factory));

/// One invocation's Rhai interpreter.
pub struct RhaiScriptEngine {
    engine: Engine,
    scope: Scope<'static>,
    stdin: Rc<RefCell<String>>,
    stdout: Rc<RefCell<String>>,
    stderr: Rc<RefCell<String>>,
}

impl RhaiScriptEngine {
    /// Create a fresh interpreter with empty bindings and capture channels.
    ///
    /// `print` writes verbatim to the standard-output capture, `debug` to
    /// the standard-error capture, and `stdin()` returns the fed input
    /// text (empty when nothing was fed).
    pub fn new() -> Self {
        let mut engine = Engine::new();
        let stdin = Rc::new(RefCell::new(String::new()));
        let stdout = Rc::new(RefCell::new(String::new()));
        let stderr = Rc::new(RefCell::new(String::new()));

        let out = Rc::clone(&stdout);
        engine.on_print(move |text| {
            out.borrow_mut().push_str(text);
        });

        let err = Rc::clone(&stderr);
        engine.on_debug(move |text, _source, _pos| {
            err.borrow_mut().push_str(text);
        });

        let input = Rc::clone(&stdin);
        engine.register_fn("stdin", move || -> String { input.borrow().clone() });

        Self {
            engine,
            scope: Scope::new(),
            stdin,
            stdout,
            stderr,
        }
    }
}

impl Default for RhaiScriptEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptEngine for RhaiScriptEngine {
    fn bind(&mut self, name: &str, value: &Value) -> Result<(), EvalError> {
        let dynamic = to_dynamic(value).map_err(|e| EvalError::message(e.to_string()))?;
        self.scope.push_dynamic(name.to_string(), dynamic);
        Ok(())
    }

    fn set_stdin(&mut self, text: &str) {
        *self.stdin.borrow_mut() = text.to_string();
    }

    fn eval(&mut self, script: &str) -> Result<(), EvalError> {
        self.engine
            .run_with_scope(&mut self.scope, script)
            .map_err(|boxed| {
                let mut err = *boxed;
                // Strip the position before rendering so the message is not
                // annotated twice once the caller prefixes "Line <n>:".
                let line = err.take_position().line();
                EvalError {
                    message: err.to_string(),
                    line,
                }
            })
    }

    fn variable(&mut self, name: &str) -> Result<Option<Value>, EvalError> {
        let Some(dynamic) = self.scope.get(name) else {
            return Ok(None);
        };
        if dynamic.is_unit() {
            return Ok(None);
        }
        let value: Value = from_dynamic(dynamic).map_err(|e| EvalError::message(e.to_string()))?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(value))
    }

    fn stdout(&self) -> String {
        self.stdout.borrow().clone()
    }

    fn stderr(&self) -> String {
        self.stderr.borrow().clone()
    }
}
