//! Lua engine backend (mlua, Lua 5.4)
//!
//! Bindings become globals via serde conversion and are read back the same
//! way. The stock `print`/`io` entry points are replaced with shims over
//! the capture channels before every evaluation: `print` keeps the Lua
//! convention (tab-joined, newline-terminated), `io.write` and
//! `io.stderr:write` append verbatim, `io.read` returns the fed input
//! text.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use mlua::{Lua, LuaSerdeExt, Variadic};
use serde_json::Value;

use crate::engine::{EngineFactory, ScriptEngine};
use crate::error::EvalError;
use crate::registry::EngineRegistration;

/// Chunk name under which scripts are loaded; Lua error messages carry it
/// as the `script:<line>:` prefix the line extractor looks for.
const CHUNK_NAME: &str = "=script";

/// Factory for the Lua 5.4 interpreter.
pub struct LuaEngineFactory;

impl EngineFactory for LuaEngineFactory {
    fn engine_name(&self) -> &str {
        "Lua"
    }

    fn aliases(&self) -> &[&str] {
        &["lua", "lua54"]
    }

    fn create_engine(&self) -> Box<dyn ScriptEngine> {
        Box::new(LuaScriptEngine::new())
    }
}

fn lua_factory() -> Arc<dyn EngineFactory> {
    Arc::new(LuaEngineFactory)
}

inventory::submit!(EngineRegistration(lua_factory));

/// One invocation's Lua interpreter.
pub struct LuaScriptEngine {
    lua: Lua,
    stdin: Rc<RefCell<String>>,
    stdout: Rc<RefCell<String>>,
    stderr: Rc<RefCell<String>>,
}

impl LuaScriptEngine {
    /// Create a fresh interpreter with empty globals and capture channels.
    pub fn new() -> Self {
        Self {
            lua: Lua::new(),
            stdin: Rc::new(RefCell::new(String::new())),
            stdout: Rc::new(RefCell::new(String::new())),
            stderr: Rc::new(RefCell::new(String::new())),
        }
    }

    /// Replace `print` and `io` with capture-channel shims.
    fn install_io_shims(&self) -> Result<(), EvalError> {
        let globals = self.lua.globals();

        let out = Rc::clone(&self.stdout);
        let print = self
            .lua
            .create_function(move |_, args: Variadic<mlua::Value>| {
                let mut out = out.borrow_mut();
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push('\t');
                    }
                    out.push_str(&display_value(arg));
                }
                out.push('\n');
                Ok(())
            })
            .map_err(convert)?;
        globals.set("print", print).map_err(convert)?;

        let io = self.lua.create_table().map_err(convert)?;

        let out = Rc::clone(&self.stdout);
        let write = self
            .lua
            .create_function(move |_, args: Variadic<mlua::Value>| {
                let mut out = out.borrow_mut();
                for arg in args.iter() {
                    out.push_str(&display_value(arg));
                }
                Ok(())
            })
            .map_err(convert)?;
        io.set("write", write).map_err(convert)?;

        let input = Rc::clone(&self.stdin);
        let read = self
            .lua
            .create_function(move |_, _args: Variadic<mlua::Value>| Ok(input.borrow().clone()))
            .map_err(convert)?;
        io.set("read", read).map_err(convert)?;

        let stderr_handle = self.lua.create_table().map_err(convert)?;
        let err = Rc::clone(&self.stderr);
        let stderr_write = self
            .lua
            .create_function(
                move |_, (_this, args): (mlua::Value, Variadic<mlua::Value>)| {
                    let mut err = err.borrow_mut();
                    for arg in args.iter() {
                        err.push_str(&display_value(arg));
                    }
                    Ok(())
                },
            )
            .map_err(convert)?;
        stderr_handle.set("write", stderr_write).map_err(convert)?;
        io.set("stderr", stderr_handle).map_err(convert)?;

        globals.set("io", io).map_err(convert)?;
        Ok(())
    }
}

impl Default for LuaScriptEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptEngine for LuaScriptEngine {
    fn bind(&mut self, name: &str, value: &Value) -> Result<(), EvalError> {
        let lua_value = self.lua.to_value(value).map_err(convert)?;
        self.lua.globals().set(name, lua_value).map_err(convert)
    }

    fn set_stdin(&mut self, text: &str) {
        *self.stdin.borrow_mut() = text.to_string();
    }

    fn eval(&mut self, script: &str) -> Result<(), EvalError> {
        self.install_io_shims()?;
        self.lua
            .load(script)
            .set_name(CHUNK_NAME)
            .exec()
            .map_err(convert)
    }

    fn variable(&mut self, name: &str) -> Result<Option<Value>, EvalError> {
        let value: mlua::Value = self.lua.globals().get(name).map_err(convert)?;
        if value.is_nil() {
            return Ok(None);
        }
        let json: Value = self.lua.from_value(value).map_err(convert)?;
        if json.is_null() {
            return Ok(None);
        }
        Ok(Some(json))
    }

    fn stdout(&self) -> String {
        self.stdout.borrow().clone()
    }

    fn stderr(&self) -> String {
        self.stderr.borrow().clone()
    }
}

fn convert(err: mlua::Error) -> EvalError {
    let message = err.to_string();
    let line = line_from_message(&message);
    EvalError { message, line }
}

/// Extract the source line from Lua's `script:<line>:` error prefix.
fn line_from_message(message: &str) -> Option<usize> {
    let start = message.find("script:")? + "script:".len();
    let rest = &message[start..];
    let digits: &str = rest
        .split(':')
        .next()
        .filter(|d| !d.is_empty() && d.chars().all(|c| c.is_ascii_digit()))?;
    digits.parse().ok()
}

fn display_value(value: &mlua::Value) -> String {
    match value {
        mlua::Value::Nil => "nil".to_string(),
        mlua::Value::Boolean(b) => b.to_string(),
        mlua::Value::Integer(i) => i.to_string(),
        mlua::Value::Number(n) => n.to_string(),
        mlua::Value::String(s) => s.to_string_lossy().to_string(),
        other => format!("{}: {:p}", other.type_name(), other.to_pointer()),
    }
}
