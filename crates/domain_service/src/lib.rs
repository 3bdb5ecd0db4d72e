//! Domain Service - Wrappers over the host-supplied platform services
//!
//! - [`OrganizationService`]: the record store port, with create and
//!   retrieve shortcuts on [`OrganizationServiceExt`]
//! - [`TracingService`]: the host's trace sink, with severity-prefixed
//!   helpers on [`TracingServiceExt`] and a `tracing`-backed adapter
//! - [`ToolkitConfig`]: logging and clone policy settings
//!
//! In-memory implementations of both services are available under the
//! `mock` feature for tests.

pub mod config;
pub mod ports;
pub mod tracing_service;

pub use crate::config::ToolkitConfig;
pub use ports::{ColumnSet, OrganizationService, OrganizationServiceExt};
pub use tracing_service::{LogTracingService, Severity, TracingService, TracingServiceExt};
