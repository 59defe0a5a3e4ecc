//! Path-guided replay of a scenario's subject bodies.
//!
//! Replaying a test re-invokes the subject bodies registered under the first
//! segment of its path. Every action or test declared along the way is
//! compared against the head of a [`ReplayCursor`]: matching declarations are
//! entered, everything else is skipped without running its body. Local state
//! built by the enclosing closures is therefore fresh for every replayed test.

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{debug, debug_span, trace};

use crate::errors::Failure;
use crate::path::PathKey;
use crate::registry::{SubjectRegistry, TestCase};
use crate::scope::Scope;
use crate::task::Outcome;

/// The segments of a recorded path that have not been matched yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayCursor {
    remaining: VecDeque<String>,
}

impl ReplayCursor {
    pub fn new(path: &PathKey) -> Self {
        Self {
            remaining: path.segments().iter().cloned().collect(),
        }
    }

    /// Consumes the subject segment the replay starts from.
    pub fn take_subject(&mut self) -> Option<String> {
        self.remaining.pop_front()
    }

    /// Consumes the head if it equals `description`.
    pub fn enter(&mut self, description: &str) -> bool {
        if self.head() == Some(description) {
            self.remaining.pop_front();
            true
        } else {
            false
        }
    }

    /// Consumes the head only if segments remain behind it and it equals
    /// `description`. An action is never the leaf of a path.
    pub fn enter_branch(&mut self, description: &str) -> bool {
        self.remaining.len() > 1 && self.enter(description)
    }

    /// Consumes the head only if it is the last segment and equals `description`.
    pub fn enter_leaf(&mut self, description: &str) -> bool {
        self.remaining.len() == 1 && self.enter(description)
    }

    /// Restores `description` as the head while segments remain, so a sibling
    /// branch carrying the same label gets its own attempt at matching.
    pub fn leave(&mut self, description: &str) {
        if !self.remaining.is_empty() {
            self.remaining.push_front(description.to_string());
        }
    }

    pub fn head(&self) -> Option<&str> {
        self.remaining.front().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }
}

/// Replay state carried by a [`Scope`] while one test is being replayed.
#[derive(Debug)]
pub(crate) struct Replayer {
    cursor: ReplayCursor,
    reached: bool,
    failure: Option<Failure>,
}

impl Replayer {
    pub(crate) fn new(cursor: ReplayCursor) -> Self {
        Self {
            cursor,
            reached: false,
            failure: None,
        }
    }

    /// True once the leaf ran or something failed; nothing else will be entered.
    pub(crate) fn is_done(&self) -> bool {
        self.reached || self.has_failed()
    }

    pub(crate) fn has_failed(&self) -> bool {
        self.failure.is_some()
    }

    pub(crate) fn record(&mut self, outcome: Outcome) {
        if let Err(failure) = outcome {
            if self.failure.is_none() {
                debug!(%failure, "replay failed");
                self.failure = Some(failure);
            }
        }
    }

    pub(crate) fn enter_action(&mut self, description: &str) -> bool {
        if self.failure.is_some() {
            return false;
        }
        let matched = self.cursor.enter_branch(description);
        trace!(action = description, matched, "replaying action");
        matched
    }

    pub(crate) fn leave_action(&mut self, description: &str, outcome: Outcome) {
        self.record(outcome);
        self.cursor.leave(description);
    }

    pub(crate) fn enter_test(&mut self, description: &str) -> bool {
        if self.is_done() {
            return false;
        }
        self.reached = self.cursor.enter_leaf(description);
        trace!(test = description, matched = self.reached, "replaying test");
        self.reached
    }

    fn finish(self, test: &TestCase) -> Outcome {
        match self.failure {
            Some(failure) => Err(failure),
            None if self.reached => Ok(()),
            None => Err(Failure::Unreached {
                name: test.name().to_string(),
            }),
        }
    }
}

/// Replays `test` against the registered subject bodies and returns how it went.
///
/// Every body registered under the test's subject runs, in registration order.
/// Bodies after the one holding the leaf enter nothing, since the cursor is
/// exhausted by then. The first failure stops the replay. Panics are caught
/// here and reported as [`Failure::Panicked`].
pub(crate) fn replay(subjects: &SubjectRegistry, test: &TestCase) -> Outcome {
    let span = debug_span!("replay", test = test.name());
    let _guard = span.enter();

    let mut cursor = ReplayCursor::new(test.path());
    let Some(subject) = cursor.take_subject() else {
        return Err(Failure::Unreached {
            name: test.name().to_string(),
        });
    };

    let mut scope = Scope::replaying(Replayer::new(cursor));
    let caught = catch_unwind(AssertUnwindSafe(|| {
        for body in subjects.bodies(&subject) {
            let outcome = body(&mut scope);
            if let Some(replayer) = scope.replayer_mut() {
                replayer.record(outcome);
                if replayer.has_failed() {
                    break;
                }
            }
        }
    }));

    if let Err(payload) = caught {
        let failure = Failure::from_panic(payload);
        debug!(%failure, "replay panicked");
        return Err(failure);
    }
    match scope.into_replayer() {
        Some(replayer) => replayer.finish(test),
        None => Err(Failure::Unreached {
            name: test.name().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(segments: &[&str]) -> ReplayCursor {
        let path: PathKey = segments.iter().copied().collect();
        ReplayCursor::new(&path)
    }

    #[test]
    fn test_cursor_consumes_matching_heads() {
        let mut cursor = cursor(&["s", "when a", "should t"]);
        assert_eq!(cursor.take_subject().as_deref(), Some("s"));
        assert!(!cursor.enter("when b"));
        assert!(cursor.enter("when a"));
        assert_eq!(cursor.head(), Some("should t"));
    }

    #[test]
    fn test_leaf_must_be_last_segment() {
        let mut cursor = cursor(&["when a", "should t"]);
        assert!(!cursor.enter_leaf("when a"));
        assert!(cursor.enter("when a"));
        assert!(cursor.enter_leaf("should t"));
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_branch_never_consumes_the_last_segment() {
        let mut cursor = cursor(&["should t"]);
        assert!(!cursor.enter_branch("should t"));
        assert_eq!(cursor.head(), Some("should t"));
        assert!(cursor.enter_leaf("should t"));
    }

    #[test]
    fn test_replayer_skips_action_sharing_the_leaf_label() {
        let mut replayer = Replayer::new(cursor(&["should t"]));
        assert!(!replayer.enter_action("should t"));
        assert!(replayer.enter_test("should t"));
    }

    #[test]
    fn test_leave_restores_head_while_segments_remain() {
        let mut cursor = cursor(&["when a", "should t"]);
        assert!(cursor.enter("when a"));
        cursor.leave("when a");
        assert_eq!(cursor.head(), Some("when a"));
        assert_eq!(cursor.len(), 2);
    }

    #[test]
    fn test_leave_after_exhaustion_keeps_cursor_empty() {
        let mut cursor = cursor(&["should t"]);
        assert!(cursor.enter_leaf("should t"));
        cursor.leave("when a");
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_replayer_keeps_first_failure_and_stops_entering() {
        let mut replayer = Replayer::new(cursor(&["when a", "should t"]));
        replayer.record(Err(Failure::Panicked {
            message: "first".to_string(),
        }));
        replayer.record(Err(Failure::Panicked {
            message: "second".to_string(),
        }));
        assert!(!replayer.enter_action("when a"));
        let test = TestCase::new(["s", "when a", "should t"].into_iter().collect());
        let failure = replayer.finish(&test).unwrap_err();
        assert_eq!(failure.to_string(), "panicked: first");
    }

    #[test]
    fn test_replayer_reports_unreached_leaf() {
        let replayer = Replayer::new(cursor(&["should t"]));
        let test = TestCase::new(["s", "should t"].into_iter().collect());
        assert!(matches!(replayer.finish(&test), Err(Failure::Unreached { .. })));
    }
}
