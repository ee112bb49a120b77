//! Core JavaScript value types and error handling.
//!
//! This crate provides the foundational types shared by the object model:
//! value representation and the error type surfaced by property operations.
//!
//! # Overview
//!
//! - [`Value`] - Tagged representation of JavaScript values
//! - [`SymbolId`] - Identity of a symbol
//! - [`number_to_string`] - JavaScript number formatting
//! - [`JsError`] - JavaScript errors
//! - [`ErrorKind`] - Types of JavaScript errors
//!
//! # Examples
//!
//! ```
//! use core_types::{ErrorKind, JsError, Value};
//!
//! let num = Value::Double(1e21);
//! assert!(num.is_number());
//! assert_eq!(num.to_string(), "1e+21");
//!
//! let error = JsError::new(ErrorKind::TypeError, "undefined is not a function");
//! assert_eq!(error.kind, ErrorKind::TypeError);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod number;
mod value;

pub use error::{ErrorKind, JsError};
pub use number::number_to_string;
pub use value::{SymbolId, Value};
