//! Activity configuration
//!
//! The serialized surface consumed from the host: engine selection,
//! script text, stream pseudo-port flags, per-port escaping, port
//! definitions and the local dependency file names the health check
//! verifies.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigurationError;
use crate::escaping::EscapingType;
use crate::ports::{InputPortDefinition, OutputPortDefinition};

/// Configuration for a script activity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptActivityConfig {
    /// Display name of the engine to run the script with (e.g. `"Rhai"`)
    pub engine_name: String,
    /// The script text
    #[serde(default)]
    pub script: String,
    /// Expose the `STDIN` pseudo-port feeding the engine's input channel
    #[serde(default)]
    pub include_std_in: bool,
    /// Expose the `STDOUT` pseudo-port carrying captured output text
    #[serde(default)]
    pub include_std_out: bool,
    /// Expose the `STDERR` pseudo-port carrying captured error text
    #[serde(default)]
    pub include_std_err: bool,
    /// Per-input-port escaping; ports without an entry default to Text
    #[serde(default)]
    pub input_escaping: HashMap<String, EscapingType>,
    /// Declared input ports
    #[serde(default)]
    pub input_port_definitions: Vec<InputPortDefinition>,
    /// Declared output ports, in declaration order
    #[serde(default)]
    pub output_port_definitions: Vec<OutputPortDefinition>,
    /// File names the script expects in the host's library directory;
    /// checked by the health check only
    #[serde(default)]
    pub local_dependencies: Vec<String>,
}

impl ScriptActivityConfig {
    /// Create a configuration with the given engine and script and no
    /// ports or escaping declared.
    pub fn new(engine_name: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            engine_name: engine_name.into(),
            script: script.into(),
            ..Self::default()
        }
    }

    /// Escaping declared for an input port; Text when absent.
    pub fn input_escaping(&self, port_name: &str) -> EscapingType {
        self.input_escaping
            .get(port_name)
            .copied()
            .unwrap_or_default()
    }

    /// Load a serialized configuration.
    ///
    /// Accepts both the current escaping-aware shape and the older shape
    /// that carried a raw `dependencies` list and no escaping map. An
    /// explicit `configVersion` tag wins when present; otherwise the
    /// presence of `inputEscaping` selects the current shape. Legacy
    /// configurations migrate with `dependencies` becoming
    /// `localDependencies` and every port defaulting to Text escaping.
    pub fn from_value(value: Value) -> Result<Self, ConfigurationError> {
        let legacy = match value.get("configVersion").and_then(Value::as_str) {
            Some("1") => true,
            Some(_) => false,
            None => value.get("inputEscaping").is_none() && value.get("dependencies").is_some(),
        };
        if legacy {
            let legacy: LegacyScriptActivityConfig = serde_json::from_value(value)?;
            Ok(legacy.migrate())
        } else {
            Ok(serde_json::from_value(value)?)
        }
    }
}

/// Older serialized shape: raw dependency list, `included*` flag names,
/// no per-port escaping.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyScriptActivityConfig {
    engine_name: String,
    #[serde(default)]
    script: String,
    #[serde(default)]
    included_std_in: bool,
    #[serde(default)]
    included_std_out: bool,
    #[serde(default)]
    included_std_err: bool,
    #[serde(default)]
    input_port_definitions: Vec<InputPortDefinition>,
    #[serde(default)]
    output_port_definitions: Vec<OutputPortDefinition>,
    #[serde(default)]
    dependencies: Vec<String>,
}

impl LegacyScriptActivityConfig {
    fn migrate(self) -> ScriptActivityConfig {
        ScriptActivityConfig {
            engine_name: self.engine_name,
            script: self.script,
            include_std_in: self.included_std_in,
            include_std_out: self.included_std_out,
            include_std_err: self.included_std_err,
            input_escaping: HashMap::new(),
            input_port_definitions: self.input_port_definitions,
            output_port_definitions: self.output_port_definitions,
            local_dependencies: self.dependencies,
        }
    }
}
