//! Record model errors
//!
//! Absent or null attributes are never errors here; accessors return their
//! documented defaults. Errors cover the few cases that cannot be answered
//! with a default: a missing argument, a stored value that cannot be
//! converted to the requested scalar, and XML encoding problems.

use thiserror::Error;

/// Errors raised by attribute access and cloning
#[derive(Debug, Error)]
pub enum EntityError {
    /// A required argument was not supplied
    #[error("Value cannot be null. Parameter name: {0}")]
    ArgumentNull(&'static str),

    /// The stored value cannot be converted to the requested type
    #[error("Cannot convert attribute '{attribute}' of type {actual} to {target}")]
    Conversion {
        attribute: String,
        actual: String,
        target: &'static str,
    },

    /// Serialization or deserialization failed
    #[error(transparent)]
    Serialization(#[from] SerializationError),
}

impl EntityError {
    /// Creates a Conversion error
    pub fn conversion(
        attribute: impl Into<String>,
        actual: impl Into<String>,
        target: &'static str,
    ) -> Self {
        EntityError::Conversion {
            attribute: attribute.into(),
            actual: actual.into(),
            target,
        }
    }
}

/// Errors raised by the XML encoder and decoder
#[derive(Debug, Error)]
pub enum SerializationError {
    /// Writing the XML document failed
    #[error("XML write error: {0}")]
    Write(String),

    /// The XML document is not well formed
    #[error("XML read error: {0}")]
    Read(#[from] quick_xml::Error),

    /// An element appeared where another was expected
    #[error("Unexpected XML content: expected {expected}, found {found}")]
    Unexpected {
        expected: &'static str,
        found: String,
    },

    /// A required XML attribute is missing
    #[error("Missing XML attribute '{attribute}' on <{element}>")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// The type tag is not registered with the known-types table
    #[error("Unknown attribute type '{0}'")]
    UnknownType(String),

    /// A value's kind is not registered for serialization
    #[error("Attribute type '{0}' is not registered")]
    UnregisteredType(&'static str),

    /// A scalar value could not be parsed
    #[error("Invalid {kind} value '{value}'")]
    InvalidValue {
        kind: &'static str,
        value: String,
    },
}

impl SerializationError {
    pub(crate) fn invalid(kind: &'static str, value: impl Into<String>) -> Self {
        SerializationError::InvalidValue {
            kind,
            value: value.into(),
        }
    }
}
