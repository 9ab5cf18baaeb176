//! Script Activity - script execution and data binding for Weft workflows
//!
//! This crate is the execution core of the scripting activity: it binds
//! named workflow values into a script engine's variable table (applying
//! per-input escaping), evaluates a user-supplied script with captured
//! I/O channels, and reads named outputs back into depth-annotated value
//! references.
//!
//! # Components
//!
//! - [`EscapingType`]: pure per-input value transform (Text/JSON/XML)
//! - [`ports`]: port definitions, reserved stream tokens, name sanitizer
//! - [`ScriptActivityConfig`]: configuration surface, with a loader for
//!   the legacy serialized shape
//! - [`ReferenceService`]: the host's reference/data resolution boundary
//! - [`ScriptActivity`]: the configured activity and its asynchronous
//!   invocation contract
//! - [`HealthCheckable`]: read-only diagnostics for an external
//!   health-check collaborator

pub mod activity;
pub mod config;
pub mod error;
pub mod escaping;
mod executor;
pub mod health;
pub mod ports;
pub mod reference;

pub use activity::{Executable, InvocationContext, InvocationOutputs, ScriptActivity};
pub use config::ScriptActivityConfig;
pub use error::{ActivityError, ConfigurationError};
pub use escaping::EscapingType;
pub use health::{HealthCheckable, HealthReport, HealthStatus};
pub use ports::{ElementType, InputPortDefinition, OutputPortDefinition, STDERR, STDIN, STDOUT};
pub use reference::{InMemoryReferenceService, ReferenceError, ReferenceService, ValueRef};
