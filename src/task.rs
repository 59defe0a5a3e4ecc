//! Units of work handed to subjects, actions and tests.
//!
//! A body may finish with `()` and signal failure by panicking (the way
//! `assert!` and friends do), or it may return `Result<(), E>` for any error
//! that converts into `Box<dyn Error>`. Both shapes are normalised into an
//! [`Outcome`] at the boundary.

use std::error::Error as StdError;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::errors::Failure;

/// The normalised result of running one body.
pub type Outcome = Result<(), Failure>;

/// Conversion from whatever a body returns into an [`Outcome`].
pub trait IntoOutcome {
    fn into_outcome(self) -> Outcome;
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Outcome {
        Ok(())
    }
}

impl<E> IntoOutcome for Result<(), E>
where
    E: Into<Box<dyn StdError + 'static>>,
{
    fn into_outcome(self) -> Outcome {
        self.map_err(|error| Failure::Returned {
            source: error.into(),
        })
    }
}

/// Runs `task` and returns the error it failed with.
///
/// A returned `Err` is handed back as is; a panic is turned into an error
/// carrying the panic message.
///
/// # Panics
/// Panics with `task did not fail` when the task completes successfully.
///
/// # Example
/// ```
/// use scenario::assert_fails;
///
/// let error = assert_fails(|| "forty two".parse::<u8>().map(drop));
/// assert!(error.to_string().contains("invalid digit"));
/// ```
pub fn assert_fails<F, R>(task: F) -> Box<dyn StdError + 'static>
where
    F: FnOnce() -> R,
    R: IntoOutcome,
{
    match catch_unwind(AssertUnwindSafe(|| task().into_outcome())) {
        Ok(Ok(())) => panic!("task did not fail"),
        Ok(Err(failure)) => failure.into_error(),
        Err(payload) => Failure::from_panic(payload).into_error(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_unit_is_success() {
        assert!(().into_outcome().is_ok());
    }

    #[test]
    fn test_err_becomes_returned_failure() {
        let result: Result<(), io::Error> = Err(io::Error::new(io::ErrorKind::Other, "nope"));
        match result.into_outcome() {
            Err(Failure::Returned { source }) => assert_eq!(source.to_string(), "nope"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_string_errors_are_accepted() {
        let result: Result<(), String> = Err("plain message".to_string());
        assert!(result.into_outcome().is_err());
    }

    #[test]
    fn test_assert_fails_returns_the_error() {
        let error = assert_fails(|| -> Result<(), io::Error> {
            Err(io::Error::new(io::ErrorKind::NotFound, "missing"))
        });
        let io_error = error
            .downcast_ref::<io::Error>()
            .expect("the original io::Error should be returned");
        assert_eq!(io_error.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_assert_fails_turns_panics_into_errors() {
        let error = assert_fails::<_, ()>(|| panic!("exploded"));
        assert_eq!(error.to_string(), "exploded");
    }

    #[test]
    #[should_panic(expected = "task did not fail")]
    fn test_assert_fails_panics_on_success() {
        assert_fails(|| {});
    }
}
