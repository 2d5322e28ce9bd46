//! Fallible construction.
//!
//! | Pattern | Use When |
//! |---------|----------|
//! | `new()` | Construction always succeeds |
//! | [`TryNew`] | Construction validates its input |
//! | `TryFrom<T>` | Converting from another type |
//!
//! Warden uses [`TryNew`] for values whose invariants are checked once at
//! the edge, such as [`Keyword`](crate::Keyword) and command arguments.
//!
//! # Example
//!
//! ```
//! use warden_types::TryNew;
//!
//! struct Port(u16);
//!
//! #[derive(Debug, PartialEq)]
//! struct ZeroPort;
//!
//! impl TryNew for Port {
//!     type Error = ZeroPort;
//!     type Args = u16;
//!
//!     fn try_new(value: u16) -> Result<Self, Self::Error> {
//!         if value == 0 {
//!             return Err(ZeroPort);
//!         }
//!         Ok(Port(value))
//!     }
//! }
//!
//! assert!(Port::try_new(8080).is_ok());
//! assert_eq!(Port::try_new(0).err(), Some(ZeroPort));
//! ```

/// Fallible construction with validation.
///
/// Types implementing `TryNew` should not also expose a plain `new()`
/// performing the same validation; the `try_` prefix keeps fallibility
/// visible at the call site.
pub trait TryNew {
    /// Why validation failed.
    type Error;

    /// Construction input. Use a tuple or a struct for several values.
    type Args;

    /// Attempts to create a new instance.
    ///
    /// # Errors
    ///
    /// Returns `Self::Error` if the input violates the type's invariants.
    fn try_new(args: Self::Args) -> Result<Self, Self::Error>
    where
        Self: Sized;
}
