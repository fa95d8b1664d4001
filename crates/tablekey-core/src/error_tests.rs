//! Tests for `error` module

use super::error::*;
use crate::config::ConfigError;
use crate::table::RowId;

// -------------------------------------------------------------------------
// Error code tests
// -------------------------------------------------------------------------

#[test]
fn test_error_codes_are_unique() {
    // Arrange - create all error variants
    let errors: Vec<Error> = vec![
        Error::RowNotFound(RowId::new(3)),
        Error::ColumnOutOfRange {
            index: 4,
            column_count: 3,
        },
        Error::ColumnCountMismatch {
            expected: 3,
            actual: 2,
        },
        Error::RowIndexOutOfRange {
            index: 9,
            row_count: 2,
        },
        Error::Config("test".into()),
        Error::Structure("test".into()),
        Error::Io(std::io::Error::other("test")),
    ];

    // Act - collect all codes
    let codes: Vec<&str> = errors.iter().map(Error::code).collect();

    // Assert - all codes are unique and follow pattern
    let mut unique_codes = codes.clone();
    unique_codes.sort_unstable();
    unique_codes.dedup();
    assert_eq!(codes.len(), unique_codes.len(), "Error codes must be unique");

    for code in &codes {
        assert!(
            code.starts_with("TABLEKEY-"),
            "Code {code} should start with TABLEKEY-"
        );
    }
}

#[test]
fn test_error_display_includes_code() {
    // Arrange
    let err = Error::RowNotFound(RowId::new(17));

    // Act
    let display = format!("{err}");

    // Assert
    assert!(display.contains("TABLEKEY-001"));
    assert!(display.contains("17"));
}

#[test]
fn test_column_count_mismatch_display() {
    // Arrange
    let err = Error::ColumnCountMismatch {
        expected: 3,
        actual: 5,
    };

    // Act
    let display = format!("{err}");

    // Assert
    assert!(display.contains("TABLEKEY-003"));
    assert!(display.contains('3'));
    assert!(display.contains('5'));
}

#[test]
fn test_from_io_error() {
    // Arrange
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");

    // Act
    let err: Error = io_err.into();

    // Assert
    assert_eq!(err.code(), "TABLEKEY-007");
    assert!(format!("{err}").contains("file not found"));
    assert!(!err.is_recoverable());
}

#[test]
fn test_from_config_error() {
    // Arrange
    let config_err = ConfigError::InvalidValue {
        key: "validation.violation_cap".to_string(),
        message: "must be at least 1".to_string(),
    };

    // Act
    let err: Error = config_err.into();

    // Assert
    assert_eq!(err.code(), "TABLEKEY-005");
    assert!(format!("{err}").contains("violation_cap"));
    assert!(err.is_recoverable());
}

#[test]
fn test_error_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Error>();
}
