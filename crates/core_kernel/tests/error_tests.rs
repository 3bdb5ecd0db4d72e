//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::ports::PortError;

#[test]
fn test_core_error_configuration() {
    let error = CoreError::configuration("Missing config");

    match error {
        CoreError::Configuration(msg) => assert_eq!(msg, "Missing config"),
        _ => panic!("Expected Configuration error"),
    }
}

#[test]
fn test_core_error_display() {
    let error = CoreError::Telemetry("subscriber already set".to_string());
    let display = format!("{}", error);

    assert!(display.contains("Telemetry error"));
    assert!(display.contains("subscriber already set"));
}

#[test]
fn test_port_error_source_chain() {
    let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
    let error = PortError::Connection {
        message: "organization service unreachable".to_string(),
        source: Some(Box::new(io)),
    };

    let source = std::error::Error::source(&error).expect("connection error keeps its cause");
    assert_eq!(source.to_string(), "reset by peer");
    assert!(!error.is_not_found());
}

#[test]
fn test_port_error_internal_has_no_source() {
    let error = PortError::internal("unexpected payload");
    assert!(std::error::Error::source(&error).is_none());
    assert!(!error.is_not_found());
}
