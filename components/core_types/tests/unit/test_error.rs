//! Unit tests for JsError and ErrorKind

use core_types::{ErrorKind, JsError};

#[cfg(test)]
mod error_kind_tests {
    use super::*;

    #[test]
    fn test_error_kind_display_names() {
        assert_eq!(ErrorKind::SyntaxError.to_string(), "SyntaxError");
        assert_eq!(ErrorKind::TypeError.to_string(), "TypeError");
        assert_eq!(ErrorKind::ReferenceError.to_string(), "ReferenceError");
        assert_eq!(ErrorKind::RangeError.to_string(), "RangeError");
        assert_eq!(ErrorKind::InternalError.to_string(), "InternalError");
    }

    #[test]
    fn test_error_kind_copy_and_eq() {
        let kind1 = ErrorKind::TypeError;
        let kind2 = kind1;
        assert_eq!(kind1, kind2);
        assert_ne!(kind1, ErrorKind::RangeError);
    }
}

#[cfg(test)]
mod js_error_tests {
    use super::*;

    #[test]
    fn test_type_error_constructor() {
        let error = JsError::type_error("setter failed");
        assert_eq!(error.kind, ErrorKind::TypeError);
        assert_eq!(error.message, "setter failed");
    }

    #[test]
    fn test_error_display() {
        let error = JsError::new(ErrorKind::InternalError, "dead cell");
        assert_eq!(format!("{}", error), "InternalError: dead cell");
    }

    #[test]
    fn test_error_is_std_error() {
        fn takes_error(_: &dyn std::error::Error) {}
        takes_error(&JsError::range_error("x"));
    }

    #[test]
    fn test_error_propagates_with_question_mark() {
        fn inner() -> Result<(), JsError> {
            Err(JsError::type_error("inner"))
        }
        fn outer() -> Result<u32, JsError> {
            inner()?;
            Ok(1)
        }
        assert_eq!(outer().unwrap_err().message, "inner");
    }
}
