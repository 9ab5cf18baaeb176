//! Script activity facade
//!
//! The host configures an activity once and then drives invocations
//! through the [`Executable`] contract; scheduling, concurrency and
//! cancellation are host concerns. Each invocation is independent: a
//! fresh engine binding context and capture channels, no state shared
//! with concurrent runs.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::ScriptActivityConfig;
use crate::error::{ActivityError, ConfigurationError};
use crate::executor;
use crate::ports::{
    self, ElementType, InputPortDefinition, OutputPortDefinition, STDERR, STDIN, STDOUT,
};
use crate::reference::{ReferenceService, ValueRef};

/// Host collaborators available to one invocation.
#[derive(Clone)]
pub struct InvocationContext {
    reference_service: Arc<dyn ReferenceService>,
}

impl InvocationContext {
    /// Create a context around the host's reference service.
    pub fn new(reference_service: Arc<dyn ReferenceService>) -> Self {
        Self { reference_service }
    }

    /// The reference/data resolution service for this invocation.
    pub fn reference_service(&self) -> &Arc<dyn ReferenceService> {
        &self.reference_service
    }
}

/// Output set handed to the host when an invocation succeeds.
#[derive(Debug, Clone)]
pub struct InvocationOutputs {
    /// Registered value references keyed by declared output port name
    pub data: HashMap<String, ValueRef>,
    /// Iteration index; empty signals no further iteration
    pub index: Vec<usize>,
}

/// Asynchronous invocation contract the host scheduler drives.
#[async_trait]
pub trait Executable: Send + Sync {
    /// Run one invocation over the supplied input references.
    ///
    /// On failure the host receives a single classified error; no partial
    /// outputs are produced.
    async fn execute(
        &self,
        data: HashMap<String, ValueRef>,
        context: &InvocationContext,
    ) -> Result<InvocationOutputs, ActivityError>;
}

/// A configured script activity.
///
/// Holds the configuration plus the effective port sets: declared ports
/// and, per the stream flags, the reserved pseudo-ports.
#[derive(Debug)]
pub struct ScriptActivity {
    id: Uuid,
    config: ScriptActivityConfig,
    input_ports: Vec<InputPortDefinition>,
    output_ports: Vec<OutputPortDefinition>,
}

impl ScriptActivity {
    /// Configure an activity.
    ///
    /// Granular depths are normalized to the declared depth, reserved
    /// stream tokens are rejected as ordinary port names, and the stream
    /// pseudo-ports are materialized from the include flags.
    pub fn configure(mut config: ScriptActivityConfig) -> Result<Self, ConfigurationError> {
        check_granular_depths(&mut config);

        for name in config
            .input_port_definitions
            .iter()
            .map(|p| &p.name)
            .chain(config.output_port_definitions.iter().map(|p| &p.name))
        {
            if ports::is_reserved_port_name(name) {
                return Err(ConfigurationError::ReservedPortName(name.clone()));
            }
        }

        let mut input_ports = config.input_port_definitions.clone();
        if config.include_std_in {
            input_ports.push(InputPortDefinition::new(STDIN, 0, ElementType::Text));
        }

        let mut output_ports = config.output_port_definitions.clone();
        if config.include_std_out {
            output_ports.push(OutputPortDefinition::new(STDOUT, 0));
        }
        if config.include_std_err {
            output_ports.push(OutputPortDefinition::new(STDERR, 0));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            config,
            input_ports,
            output_ports,
        })
    }

    /// The normalized configuration.
    pub fn configuration(&self) -> &ScriptActivityConfig {
        &self.config
    }

    /// Look up an effective input port by name.
    pub fn input_port(&self, name: &str) -> Option<&InputPortDefinition> {
        self.input_ports.iter().find(|port| port.name == name)
    }

    /// Effective input ports, pseudo-ports included.
    pub fn input_ports(&self) -> &[InputPortDefinition] {
        &self.input_ports
    }

    /// Effective output ports, pseudo-ports included.
    pub fn output_ports(&self) -> &[OutputPortDefinition] {
        &self.output_ports
    }
}

/// Granular depths always equal the declared depth in this activity.
///
/// Workflow definitions from older releases set the granular depth to 0;
/// any mismatch is corrected here with a warning, never preserved.
fn check_granular_depths(config: &mut ScriptActivityConfig) {
    for port in &mut config.output_port_definitions {
        if port.granular_depth != port.depth {
            log::warn!("Replacing granular depth of port {}", port.name);
            port.granular_depth = port.depth;
        }
    }
}

impl fmt::Display for ScriptActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScriptActivity({})", self.id)
    }
}

#[async_trait]
impl Executable for ScriptActivity {
    async fn execute(
        &self,
        data: HashMap<String, ValueRef>,
        context: &InvocationContext,
    ) -> Result<InvocationOutputs, ActivityError> {
        executor::run(self, data, context).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_output(depth: u32, granular_depth: u32) -> ScriptActivityConfig {
        let mut config = ScriptActivityConfig::new("Rhai", "");
        config.output_port_definitions.push(
            OutputPortDefinition::new("result", depth).with_granular_depth(granular_depth),
        );
        config
    }

    #[test]
    fn test_configure_normalizes_granular_depths() {
        let activity = ScriptActivity::configure(config_with_output(2, 0)).unwrap();
        let port = &activity.configuration().output_port_definitions[0];
        assert_eq!(port.depth, 2);
        assert_eq!(port.granular_depth, 2);
    }

    #[test]
    fn test_configure_keeps_matching_granular_depths() {
        let activity = ScriptActivity::configure(config_with_output(1, 1)).unwrap();
        assert_eq!(
            activity.configuration().output_port_definitions[0].granular_depth,
            1
        );
    }

    #[test]
    fn test_reserved_output_port_name_is_rejected() {
        let mut config = ScriptActivityConfig::new("Rhai", "");
        config
            .output_port_definitions
            .push(OutputPortDefinition::new("STDOUT", 0));
        let err = ScriptActivity::configure(config).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::ReservedPortName(name) if name == "STDOUT"
        ));
    }

    #[test]
    fn test_reserved_input_port_name_is_rejected() {
        let mut config = ScriptActivityConfig::new("Rhai", "");
        config
            .input_port_definitions
            .push(InputPortDefinition::new("STDIN", 0, ElementType::Text));
        assert!(ScriptActivity::configure(config).is_err());
    }

    #[test]
    fn test_stream_flags_materialize_pseudo_ports() {
        let mut config = ScriptActivityConfig::new("Rhai", "");
        config.include_std_in = true;
        config.include_std_out = true;
        config.include_std_err = true;
        let activity = ScriptActivity::configure(config).unwrap();

        assert!(activity.input_port(STDIN).is_some());
        let output_names: Vec<&str> = activity
            .output_ports()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(output_names, vec![STDOUT, STDERR]);
    }

    #[test]
    fn test_input_port_lookup_is_by_declared_name() {
        let mut config = ScriptActivityConfig::new("Rhai", "");
        config
            .input_port_definitions
            .push(InputPortDefinition::new("xml-text", 0, ElementType::Text));
        let activity = ScriptActivity::configure(config).unwrap();

        assert!(activity.input_port("xml-text").is_some());
        assert!(activity.input_port("xmltext").is_none());
    }

    #[test]
    fn test_display_names_the_instance() {
        let activity = ScriptActivity::configure(ScriptActivityConfig::new("Rhai", "")).unwrap();
        assert!(activity.to_string().starts_with("ScriptActivity("));
    }
}
