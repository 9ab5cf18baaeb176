//! Reference service boundary
//!
//! The host hands an activity opaque, depth-annotated references rather
//! than concrete values; rendering them and registering produced values
//! is delegated to the host's reference/data service. An in-memory
//! implementation backs tests and embedded hosts.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::escaping::value_text;
use crate::ports::ElementType;

/// Opaque, depth-annotated handle to a workflow value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRef {
    /// Identifier issued by the reference service
    pub id: Uuid,
    /// Nesting depth the value was registered at
    pub depth: u32,
}

/// Failures raised by the reference service.
#[derive(Debug, Error)]
pub enum ReferenceError {
    /// The reference was never registered with this service
    #[error("unknown reference {0}")]
    NotFound(Uuid),

    /// The reference points at an error document, not a value
    #[error("reference resolves to an error document: {0}")]
    ErrorDocument(String),
}

/// The host's reference/data resolution service.
///
/// Implementations must be safe for concurrent use; one invocation calls
/// `render` while binding inputs and `register`/`register_error` while
/// collecting outputs.
pub trait ReferenceService: Send + Sync {
    /// Render a reference into a concrete value of the declared element
    /// type.
    fn render(&self, reference: &ValueRef, element_type: ElementType)
        -> Result<Value, ReferenceError>;

    /// Register a produced value at the given depth, returning its
    /// reference.
    fn register(&self, value: Value, depth: u32) -> Result<ValueRef, ReferenceError>;

    /// Register an error placeholder carrying `message` at the given
    /// depth.
    fn register_error(&self, message: &str, depth: u32) -> Result<ValueRef, ReferenceError>;
}

enum Entry {
    Value(Value),
    Error(String),
}

/// In-memory reference service.
#[derive(Default)]
pub struct InMemoryReferenceService {
    entries: RwLock<HashMap<Uuid, Entry>>,
}

impl InMemoryReferenceService {
    /// Create an empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored value behind a reference, when it is a plain value.
    pub fn resolve(&self, reference: &ValueRef) -> Option<Value> {
        match self.entries.read().get(&reference.id) {
            Some(Entry::Value(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Message behind an error-document reference.
    pub fn error_message(&self, reference: &ValueRef) -> Option<String> {
        match self.entries.read().get(&reference.id) {
            Some(Entry::Error(message)) => Some(message.clone()),
            _ => None,
        }
    }
}

impl ReferenceService for InMemoryReferenceService {
    fn render(
        &self,
        reference: &ValueRef,
        element_type: ElementType,
    ) -> Result<Value, ReferenceError> {
        match self.entries.read().get(&reference.id) {
            None => Err(ReferenceError::NotFound(reference.id)),
            Some(Entry::Error(message)) => Err(ReferenceError::ErrorDocument(message.clone())),
            Some(Entry::Value(value)) => Ok(match element_type {
                ElementType::Json => value.clone(),
                ElementType::Text => to_text(value),
            }),
        }
    }

    fn register(&self, value: Value, depth: u32) -> Result<ValueRef, ReferenceError> {
        let id = Uuid::new_v4();
        self.entries.write().insert(id, Entry::Value(value));
        Ok(ValueRef { id, depth })
    }

    fn register_error(&self, message: &str, depth: u32) -> Result<ValueRef, ReferenceError> {
        let id = Uuid::new_v4();
        self.entries
            .write()
            .insert(id, Entry::Error(message.to_string()));
        Ok(ValueRef { id, depth })
    }
}

/// Text rendering of a stored value, element-wise over sequences.
fn to_text(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Array(items) => Value::Array(items.iter().map(to_text).collect()),
        other => Value::String(value_text(other)),
    }
}
