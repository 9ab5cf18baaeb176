//! Execution core
//!
//! One invocation runs the sequential pipeline: resolve the engine, bind
//! inputs, evaluate the script, collect outputs. Script evaluation is the
//! single blocking step and runs on the blocking pool; the engine handle
//! is created and dropped inside that section so nothing leaks across
//! invocations.

use std::collections::HashMap;
use std::sync::Arc;

use script_engine::{EngineFactory, EngineRegistry, EvalError};
use serde_json::Value;

use crate::activity::{InvocationContext, InvocationOutputs, ScriptActivity};
use crate::error::ActivityError;
use crate::escaping::value_text;
use crate::ports::{self, sanitize_port_name, OutputPortDefinition};
use crate::reference::ValueRef;

/// Variable table and input-channel text prepared for one run.
struct BoundInputs {
    variables: Vec<(String, Value)>,
    stdin: Option<String>,
}

/// Raw engine-side results before registration.
struct RawOutputs {
    variables: HashMap<String, Option<Value>>,
    stdout: String,
    stderr: String,
}

pub(crate) async fn run(
    activity: &ScriptActivity,
    data: HashMap<String, ValueRef>,
    context: &InvocationContext,
) -> Result<InvocationOutputs, ActivityError> {
    let config = activity.configuration();

    let factory = EngineRegistry::global()
        .factory(&config.engine_name)
        .ok_or_else(|| {
            log::error!(
                "{activity}: no script engine named '{}' is available",
                config.engine_name
            );
            ActivityError::EngineNotFound
        })?;

    let inputs = bind_inputs(activity, &data, context)?;

    let script = config.script.clone();
    let output_ports = activity.output_ports().to_vec();
    let run_ports = output_ports.clone();
    let raw = tokio::task::spawn_blocking(move || evaluate(factory, &script, inputs, &run_ports))
        .await
        .map_err(|join_error| {
            log::error!("{join_error}");
            ActivityError::Evaluation(EvalError::message(join_error.to_string()))
        })?
        .map_err(|eval_error| {
            log::error!("{eval_error}");
            ActivityError::Evaluation(eval_error)
        })?;

    collect_outputs(activity, &output_ports, raw, context)
}

/// Render every supplied reference and build the engine's variable table.
///
/// Fails fast on data for undeclared ports; nothing is evaluated in that
/// case. Binding order across inputs is immaterial.
fn bind_inputs(
    activity: &ScriptActivity,
    data: &HashMap<String, ValueRef>,
    context: &InvocationContext,
) -> Result<BoundInputs, ActivityError> {
    let mut variables = Vec::with_capacity(data.len());
    let mut stdin = None;

    for (port_name, reference) in data {
        let port = activity.input_port(port_name).ok_or_else(|| {
            log::error!("{activity}: data supplied for undeclared port '{port_name}'");
            ActivityError::UnexpectedData(port_name.clone())
        })?;

        let value = context
            .reference_service()
            .render(reference, port.element_type)
            .map_err(|error| {
                log::error!("{activity}: failed to render input '{port_name}': {error}");
                ActivityError::DataAccess(activity.to_string())
            })?;

        let bound_name = sanitize_port_name(port_name);
        if bound_name == ports::STDIN {
            stdin = Some(value_text(&value));
        } else {
            let escaping = activity.configuration().input_escaping(port_name);
            variables.push((bound_name, escaping.apply(&value)));
        }
    }

    Ok(BoundInputs { variables, stdin })
}

/// The blocking section: fresh engine, bound table, one evaluation, raw
/// read-back of every non-stream output port.
fn evaluate(
    factory: Arc<dyn EngineFactory>,
    script: &str,
    inputs: BoundInputs,
    output_ports: &[OutputPortDefinition],
) -> Result<RawOutputs, EvalError> {
    let mut engine = factory.create_engine();

    for (name, value) in &inputs.variables {
        engine.bind(name, value)?;
    }
    if let Some(text) = &inputs.stdin {
        engine.set_stdin(text);
    }

    engine.eval(script)?;

    let mut variables = HashMap::new();
    for port in output_ports {
        if port.name != ports::STDOUT && port.name != ports::STDERR {
            variables.insert(port.name.clone(), engine.variable(&port.name)?);
        }
    }

    Ok(RawOutputs {
        variables,
        stdout: engine.stdout(),
        stderr: engine.stderr(),
    })
}

/// Register every declared output at its declared depth.
///
/// A port the script left unbound yields an error placeholder instead of
/// failing the invocation.
fn collect_outputs(
    activity: &ScriptActivity,
    output_ports: &[OutputPortDefinition],
    raw: RawOutputs,
    context: &InvocationContext,
) -> Result<InvocationOutputs, ActivityError> {
    let reference_service = context.reference_service();
    let mut data = HashMap::with_capacity(output_ports.len());

    for port in output_ports {
        let value = if port.name == ports::STDOUT {
            Some(Value::String(raw.stdout.clone()))
        } else if port.name == ports::STDERR {
            Some(Value::String(raw.stderr.clone()))
        } else {
            raw.variables.get(&port.name).cloned().flatten()
        };

        let registered = match value {
            Some(value) => reference_service.register(value, port.depth),
            None => {
                log::warn!("{activity}: no value produced for output port '{}'", port.name);
                reference_service.register_error(
                    &format!("No value produced for output variable {}", port.name),
                    port.depth,
                )
            }
        }
        .map_err(|error| {
            log::error!("{activity}: failed to register output '{}': {error}", port.name);
            ActivityError::DataAccess(activity.to_string())
        })?;

        data.insert(port.name.clone(), registered);
    }

    Ok(InvocationOutputs {
        data,
        index: Vec::new(),
    })
}
