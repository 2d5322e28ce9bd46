//! Unified error-code interface.
//!
//! Every Warden error enum implements [`ErrorCode`] so that the transaction
//! layer, the CLI and log output can treat failures uniformly.
//!
//! # Code Convention
//!
//! | Crate | Prefix |
//! |-------|--------|
//! | warden-auth | `ACCESS_`, `TOKEN_` |
//! | warden-command | `COMMAND_` |
//! | warden-runtime | `REGISTRY_`, `TRANSACTION_`, `APP_` |
//!
//! Codes are UPPER_SNAKE_CASE and stable once published.
//!
//! # Example
//!
//! ```
//! use warden_types::ErrorCode;
//!
//! #[derive(Debug)]
//! enum LookupError {
//!     Missing,
//!     Busy,
//! }
//!
//! impl ErrorCode for LookupError {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::Missing => "LOOKUP_MISSING",
//!             Self::Busy => "LOOKUP_BUSY",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::Busy)
//!     }
//! }
//!
//! assert_eq!(LookupError::Busy.code(), "LOOKUP_BUSY");
//! assert!(!LookupError::Missing.is_recoverable());
//! ```

/// Machine-readable error classification.
pub trait ErrorCode {
    /// Returns the stable UPPER_SNAKE_CASE code for this error.
    fn code(&self) -> &'static str;

    /// Returns whether a caller can act on the error and try again.
    ///
    /// Access-control denials that can be cured by authenticating are
    /// recoverable; malformed input and internal faults are not.
    fn is_recoverable(&self) -> bool;
}

/// Asserts that an error code is non-empty, prefixed and UPPER_SNAKE_CASE.
///
/// # Panics
///
/// Panics with a descriptive message when a check fails.
///
/// # Example
///
/// ```
/// use warden_types::{assert_error_code, ErrorCode};
///
/// struct Oops;
///
/// impl ErrorCode for Oops {
///     fn code(&self) -> &'static str { "DEMO_OOPS" }
///     fn is_recoverable(&self) -> bool { false }
/// }
///
/// assert_error_code(&Oops, "DEMO_");
/// ```
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "Error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "Error code '{}' must start with prefix '{}'",
        code,
        expected_prefix
    );
    assert!(
        is_upper_snake_case(code),
        "Error code '{}' must be UPPER_SNAKE_CASE",
        code
    );
}

/// Runs [`assert_error_code`] over every error in `errors`.
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    if s.is_empty() || s.starts_with('_') || s.ends_with('_') || s.contains("__") {
        return false;
    }

    s.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
