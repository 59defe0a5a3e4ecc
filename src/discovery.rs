//! The discovery pass: one walk over a scenario's definition.
//!
//! The [`Recorder`] tracks the open subject and the path being built. Subjects
//! open and close around their body, actions push and pop a segment, and
//! every test snapshots the path into the catalog. Nesting rules are checked
//! as each declaration is opened.

use tracing::{debug, trace};

use crate::errors::{ensure, Failure, ScenarioError, StructureError, StructureKind};
use crate::path::PathKey;
use crate::registry::{SubjectBody, SubjectRegistry, TestCatalog};
use crate::task::Outcome;

// =====================
// Discovery state
// =====================

/// Bookkeeping for the single discovery pass over a scenario's definition.
///
/// The first error halts the recorder: every later declaration becomes a
/// no-op and the error is handed back by [`Recorder::finish`].
#[derive(Debug, Default)]
pub(crate) struct Recorder {
    subjects: SubjectRegistry,
    tests: TestCatalog,
    path: PathKey,
    subject_open: bool,
    error: Option<ScenarioError>,
}

impl Recorder {
    pub(crate) fn is_halted(&self) -> bool {
        self.error.is_some()
    }

    pub(crate) fn halt(&mut self, error: impl Into<ScenarioError>) {
        if self.error.is_none() {
            let error = error.into();
            debug!(path = %self.path, %error, "discovery halted");
            self.error = Some(error);
        }
    }

    fn halt_on_failure(&mut self, outcome: Outcome) {
        if let Err(failure) = outcome {
            self.halt(definition_failed(&self.path, failure));
        }
    }

    pub(crate) fn open_subject(&mut self, name: &str, body: SubjectBody) -> Result<(), StructureError> {
        ensure(!self.subject_open, StructureKind::SubjectInSubject, &self.path)?;
        self.subjects.register(name, body);
        self.path.push(name);
        self.subject_open = true;
        debug!(subject = name, "recording subject");
        Ok(())
    }

    pub(crate) fn close_subject(&mut self, outcome: Outcome) {
        self.halt_on_failure(outcome);
        self.path.pop();
        self.subject_open = false;
    }

    /// Enters an action and returns the number of tests recorded so far.
    pub(crate) fn open_action(&mut self, description: &str) -> Result<usize, StructureError> {
        ensure(self.subject_open, StructureKind::ActionWithoutSubject, &self.path)?;
        self.path.push(description);
        trace!(path = %self.path, "recording action");
        Ok(self.tests.len())
    }

    pub(crate) fn close_action(&mut self, tests_before: usize, outcome: Outcome) {
        self.halt_on_failure(outcome);
        let has_tests = ensure(
            self.tests.len() > tests_before,
            StructureKind::ActionWithoutTests,
            &self.path,
        );
        if let Err(error) = has_tests {
            self.halt(error);
        }
        self.path.pop();
    }

    pub(crate) fn record_test(&mut self, description: &str) -> Result<(), StructureError> {
        ensure(self.subject_open, StructureKind::TestWithoutSubject, &self.path)?;
        self.path.push(description);
        let recorded = self.tests.insert(self.path.clone()).map(|test| {
            debug!(test = test.name(), "recorded test");
        });
        self.path.pop();
        recorded
    }

    pub(crate) fn finish(self) -> Result<(SubjectRegistry, TestCatalog), ScenarioError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok((self.subjects, self.tests)),
        }
    }
}

fn definition_failed(path: &PathKey, failure: Failure) -> ScenarioError {
    ScenarioError::Definition {
        path: path.clone(),
        failure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use crate::scope::Scope;

    fn body() -> SubjectBody {
        Rc::new(|_: &mut Scope| Ok(()))
    }

    #[test]
    fn test_records_test_under_open_subject() {
        let mut recorder = Recorder::default();
        recorder.open_subject("stack", body()).unwrap();
        let before = recorder.open_action("when empty").unwrap();
        recorder.record_test("should be empty").unwrap();
        recorder.close_action(before, Ok(()));
        recorder.close_subject(Ok(()));

        let (subjects, tests) = recorder.finish().unwrap();
        assert_eq!(subjects.bodies("stack").len(), 1);
        let names: Vec<_> = tests.names().collect();
        assert_eq!(names, ["stack when empty should be empty"]);
    }

    #[test]
    fn test_nested_subject_is_rejected_and_not_registered() {
        let mut recorder = Recorder::default();
        recorder.open_subject("outer", body()).unwrap();
        let error = recorder.open_subject("inner", body()).unwrap_err();
        assert_eq!(error.kind, StructureKind::SubjectInSubject);
        assert_eq!(error.path.segments(), ["outer"]);
        assert!(recorder.subjects.bodies("inner").is_empty());
    }

    #[test]
    fn test_action_without_tests_halts_with_its_path() {
        let mut recorder = Recorder::default();
        recorder.open_subject("test", body()).unwrap();
        let before = recorder.open_action("when empty").unwrap();
        recorder.close_action(before, Ok(()));
        recorder.close_subject(Ok(()));

        let error = recorder.finish().unwrap_err();
        assert_eq!(error.structure_kind(), Some(StructureKind::ActionWithoutTests));
        assert!(error.to_string().contains("test when empty"));
    }

    #[test]
    fn test_first_error_wins() {
        let mut recorder = Recorder::default();
        recorder.halt(StructureError::new(StructureKind::TestWithoutSubject, PathKey::new()));
        recorder.halt(StructureError::new(StructureKind::DuplicateTest, PathKey::new()));
        let error = recorder.finish().unwrap_err();
        assert_eq!(error.structure_kind(), Some(StructureKind::TestWithoutSubject));
    }

    #[test]
    fn test_path_is_restored_after_each_declaration() {
        let mut recorder = Recorder::default();
        recorder.open_subject("s", body()).unwrap();
        recorder.record_test("should a").unwrap();
        assert_eq!(recorder.path.segments(), ["s"]);
        recorder.close_subject(Ok(()));
        assert!(recorder.path.is_empty());
        assert!(!recorder.subject_open);
    }

    #[test]
    fn test_failed_body_becomes_definition_error() {
        let mut recorder = Recorder::default();
        recorder.open_subject("s", body()).unwrap();
        recorder.record_test("should a").unwrap();
        recorder.close_subject(Err(Failure::Panicked {
            message: "setup broke".to_string(),
        }));
        match recorder.finish().unwrap_err() {
            ScenarioError::Definition { path, failure } => {
                assert_eq!(path.segments(), ["s"]);
                assert!(failure.to_string().contains("setup broke"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
