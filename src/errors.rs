//! Scenario error handling.
//!
//! Two families of errors exist and they never mix:
//!
//! - [`ScenarioError`] is raised while a scenario is being *constructed*. It
//!   wraps a [`StructureError`] (subjects, actions and tests nested the wrong
//!   way) or a definition body that failed during discovery. Either one aborts
//!   construction, and with it the whole suite.
//! - [`Failure`] is the outcome of a single test replay. It is reported for
//!   exactly one test and never affects any other.

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

use crate::path::PathKey;

// ============================================================================
// STRUCTURE ERRORS
// ============================================================================

/// Type-safe classification of every nesting rule a declaration tree must obey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureKind {
    /// A subject was declared while another subject was still open.
    SubjectInSubject,
    /// An action was declared outside of any subject.
    ActionWithoutSubject,
    /// A test was declared outside of any subject.
    TestWithoutSubject,
    /// An action finished without declaring a single test beneath it.
    ActionWithoutTests,
    /// Two tests ended up with the same fully qualified name.
    DuplicateTest,
}

impl StructureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StructureKind::SubjectInSubject => "subject inside another subject",
            StructureKind::ActionWithoutSubject => "action without subject",
            StructureKind::TestWithoutSubject => "test without subject",
            StructureKind::ActionWithoutTests => "action without tests",
            StructureKind::DuplicateTest => "test with identical name has been already defined",
        }
    }

    fn code(&self) -> &'static str {
        match self {
            StructureKind::SubjectInSubject => "scenario::structure::subject_in_subject",
            StructureKind::ActionWithoutSubject => "scenario::structure::action_without_subject",
            StructureKind::TestWithoutSubject => "scenario::structure::test_without_subject",
            StructureKind::ActionWithoutTests => "scenario::structure::action_without_tests",
            StructureKind::DuplicateTest => "scenario::structure::duplicate_test",
        }
    }

    fn help(&self) -> &'static str {
        match self {
            StructureKind::SubjectInSubject => {
                "close the outer subject first; use an action to describe a nested situation"
            }
            StructureKind::ActionWithoutSubject | StructureKind::TestWithoutSubject => {
                "wrap the declaration in a subject"
            }
            StructureKind::ActionWithoutTests => {
                "declare at least one test inside the action, otherwise it can never run"
            }
            StructureKind::DuplicateTest => "rename one of the tests or the sections leading to it",
        }
    }
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A mistake in how subjects, actions and tests are nested.
///
/// Always raised during discovery, never while a test runs. `path` is the
/// position in the tree where the rule was violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("wrong structure: {kind}{}", located(.path))]
pub struct StructureError {
    pub kind: StructureKind,
    pub path: PathKey,
}

impl StructureError {
    pub fn new(kind: StructureKind, path: PathKey) -> Self {
        Self { kind, path }
    }
}

impl Diagnostic for StructureError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.kind.help()))
    }
}

fn located(path: &PathKey) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!(" (at `{path}`)")
    }
}

/// Fails with a [`StructureError`] of the given kind unless `condition` holds.
pub fn ensure(condition: bool, kind: StructureKind, path: &PathKey) -> Result<(), StructureError> {
    if condition {
        Ok(())
    } else {
        Err(StructureError::new(kind, path.clone()))
    }
}

/// Everything that can stop a scenario from being constructed.
#[derive(Debug, Error, Diagnostic)]
pub enum ScenarioError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Structure(#[from] StructureError),
    /// A subject or action body failed while the tree was being discovered.
    #[error("definition of `{path}` failed: {failure}")]
    #[diagnostic(
        code(scenario::definition),
        help("subject and action bodies run once during discovery; they must not fail")
    )]
    Definition {
        path: PathKey,
        #[source]
        failure: Failure,
    },
}

impl ScenarioError {
    /// Returns the structural classification, if this is a structure error.
    pub fn structure_kind(&self) -> Option<StructureKind> {
        match self {
            ScenarioError::Structure(error) => Some(error.kind),
            ScenarioError::Definition { .. } => None,
        }
    }
}

// ============================================================================
// TEST FAILURES
// ============================================================================

/// The reason a single replayed test did not pass.
#[derive(Debug, Error, Diagnostic)]
pub enum Failure {
    /// The test, or an action leading to it, panicked. Assertion macros land here.
    #[error("panicked: {message}")]
    #[diagnostic(code(scenario::test::panicked))]
    Panicked { message: String },
    /// The test, or an action leading to it, returned an error.
    #[error("returned an error: {source}")]
    #[diagnostic(code(scenario::test::returned))]
    Returned {
        #[source]
        source: Box<dyn StdError + 'static>,
    },
    /// Replay walked the whole tree without meeting the recorded leaf.
    #[error("test `{name}` was not reached during replay")]
    #[diagnostic(
        code(scenario::test::unreached),
        help("declarations must be deterministic so every replay declares the same tree")
    )]
    Unreached { name: String },
}

impl Failure {
    /// Builds a failure from a panic payload caught by `catch_unwind`.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        Failure::Panicked {
            message: panic_message(payload),
        }
    }

    /// Returns the underlying error when the failure carries one.
    pub fn cause(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Failure::Returned { source } => Some(source.as_ref()),
            Failure::Panicked { .. } | Failure::Unreached { .. } => None,
        }
    }

    /// Consumes the failure and yields it as a plain error value.
    pub fn into_error(self) -> Box<dyn StdError + 'static> {
        match self {
            Failure::Returned { source } => source,
            Failure::Panicked { message } => message.into(),
            other => Box::new(other),
        }
    }
}

impl From<Box<dyn StdError + 'static>> for Failure {
    fn from(source: Box<dyn StdError + 'static>) -> Self {
        Failure::Returned { source }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_passes_when_condition_holds() {
        assert!(ensure(true, StructureKind::DuplicateTest, &PathKey::new()).is_ok());
    }

    #[test]
    fn test_ensure_carries_kind_and_path() {
        let path: PathKey = ["test", "should fail"].into_iter().collect();
        let error = ensure(false, StructureKind::DuplicateTest, &path).unwrap_err();
        assert_eq!(error.kind, StructureKind::DuplicateTest);
        assert_eq!(error.path, path);
        let message = error.to_string();
        assert!(message.contains("test with identical name has been already defined"));
        assert!(message.contains("test should fail"));
    }

    #[test]
    fn test_structure_error_at_root_has_no_location() {
        let error = StructureError::new(StructureKind::TestWithoutSubject, PathKey::new());
        assert_eq!(error.to_string(), "wrong structure: test without subject");
    }

    #[test]
    fn test_structure_diagnostic_has_code_and_help() {
        let error = StructureError::new(StructureKind::ActionWithoutTests, PathKey::new());
        let report = miette::Report::new(error);
        let output = format!("{report:?}");
        assert!(output.contains("action without tests"));
        assert!(output.contains("scenario::structure::action_without_tests"));
    }

    #[test]
    fn test_panic_payloads_become_messages() {
        let failure = Failure::from_panic(Box::new("boom"));
        assert!(matches!(failure, Failure::Panicked { ref message } if message == "boom"));

        let failure = Failure::from_panic(Box::new(String::from("owned boom")));
        assert_eq!(failure.to_string(), "panicked: owned boom");

        let failure = Failure::from_panic(Box::new(42_u8));
        assert_eq!(failure.to_string(), "panicked: non-string panic payload");
    }

    #[test]
    fn test_returned_failure_exposes_its_cause() {
        let source: Box<dyn StdError> = "disk on fire".into();
        let failure = Failure::from(source);
        assert_eq!(failure.cause().map(ToString::to_string).as_deref(), Some("disk on fire"));
        assert_eq!(failure.into_error().to_string(), "disk on fire");
    }

    #[test]
    fn test_scenario_error_exposes_structure_kind() {
        let error: ScenarioError =
            StructureError::new(StructureKind::SubjectInSubject, PathKey::new()).into();
        assert_eq!(error.structure_kind(), Some(StructureKind::SubjectInSubject));
        assert!(error.to_string().contains("subject inside another subject"));
    }
}
