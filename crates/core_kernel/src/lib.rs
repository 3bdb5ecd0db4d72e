//! Core Kernel - Foundational types for the CRM record toolkit
//!
//! This crate provides the building blocks shared by the record model and the
//! service wrappers:
//! - Entity identifiers with a nil "empty" sentinel
//! - The decimal `Money` carrier used by money attributes
//! - Port error types for calls into the external organization service
//! - Logging setup for hosts embedding the toolkit

pub mod money;
pub mod identifiers;
pub mod error;
pub mod ports;
pub mod telemetry;

pub use money::Money;
pub use identifiers::EntityId;
pub use error::CoreError;
pub use ports::{PortError, DomainPort};
pub use telemetry::{LogConfig, LogFormat, init_tracing};
