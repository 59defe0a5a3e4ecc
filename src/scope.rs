//! The declaration DSL: subjects, actions and tests.
//!
//! A [`Scope`] is handed to every definition body. The same body is run in
//! two modes: once while the scenario is discovered, when every subject and
//! action body runs and every test is recorded without being run, and then
//! once per test while that test is replayed, when only the declarations on
//! the test's path are entered.
//!
//! ```
//! use std::cell::RefCell;
//! use scenario::Scenario;
//!
//! let scenario = Scenario::new("stack", |s| {
//!     s.subject("stack", |s| {
//!         let stack = RefCell::new(Vec::new());
//!
//!         s.when("non-empty", |s| {
//!             stack.borrow_mut().push(42);
//!
//!             s.should("return the head value on pop", || {
//!                 assert_eq!(stack.borrow_mut().pop(), Some(42));
//!             });
//!         });
//!
//!         s.when("empty", |s| {
//!             s.should("return nothing on pop", || {
//!                 assert_eq!(stack.borrow_mut().pop(), None);
//!             });
//!         });
//!     });
//! })
//! .unwrap();
//!
//! let names: Vec<_> = scenario.tests().names().collect();
//! assert_eq!(
//!     names,
//!     [
//!         "stack when non-empty should return the head value on pop",
//!         "stack when empty should return nothing on pop",
//!     ]
//! );
//! ```

use std::rc::Rc;

use crate::discovery::Recorder;
use crate::errors::ScenarioError;
use crate::registry::{SubjectBody, SubjectRegistry, TestCatalog};
use crate::replay::Replayer;
use crate::task::IntoOutcome;

/// Declaration context passed to subject and action bodies.
#[derive(Debug, Default)]
pub struct Scope {
    recorder: Recorder,
    replayer: Option<Replayer>,
}

impl Scope {
    pub(crate) fn discovering() -> Self {
        Self::default()
    }

    pub(crate) fn replaying(replayer: Replayer) -> Self {
        Self {
            recorder: Recorder::default(),
            replayer: Some(replayer),
        }
    }

    pub(crate) fn replayer_mut(&mut self) -> Option<&mut Replayer> {
        self.replayer.as_mut()
    }

    pub(crate) fn into_replayer(self) -> Option<Replayer> {
        self.replayer
    }

    pub(crate) fn finish_discovery(self) -> Result<(SubjectRegistry, TestCatalog), ScenarioError> {
        self.recorder.finish()
    }

    /// True while the definition is being discovered, false while a test replays.
    pub fn is_discovering(&self) -> bool {
        self.replayer.is_none()
    }

    // ============================================================================
    // SUBJECTS
    // ============================================================================

    /// Declares the entity under test.
    ///
    /// Subjects cannot be nested. Several subjects may share a name; each
    /// keeps its own tests.
    pub fn subject<F, R>(&mut self, name: impl Into<String>, body: F)
    where
        F: Fn(&mut Scope) -> R + 'static,
        R: IntoOutcome,
    {
        // Replay invokes subject bodies straight from the registry.
        if !self.is_discovering() || self.recorder.is_halted() {
            return;
        }
        let name = name.into();
        let body: SubjectBody = Rc::new(move |scope: &mut Scope| body(scope).into_outcome());
        if let Err(error) = self.recorder.open_subject(&name, Rc::clone(&body)) {
            self.recorder.halt(error);
            return;
        }
        let outcome = body(self);
        self.recorder.close_subject(outcome);
    }

    // ============================================================================
    // ACTIONS
    // ============================================================================

    /// Declares a situation of the open subject. It must contain at least one test.
    pub fn action<F, R>(&mut self, description: impl Into<String>, body: F)
    where
        F: FnOnce(&mut Scope) -> R,
        R: IntoOutcome,
    {
        let description = description.into();
        if self.is_discovering() {
            self.record_action(&description, body);
        } else {
            self.replay_action(&description, body);
        }
    }

    /// Declares a situation, named `when <description>`.
    pub fn when<F, R>(&mut self, description: &str, body: F)
    where
        F: FnOnce(&mut Scope) -> R,
        R: IntoOutcome,
    {
        self.action(format!("when {description}"), body);
    }

    /// Declares an additional situation, named `and <description>`.
    pub fn and<F, R>(&mut self, description: &str, body: F)
    where
        F: FnOnce(&mut Scope) -> R,
        R: IntoOutcome,
    {
        self.action(format!("and {description}"), body);
    }

    fn record_action<F, R>(&mut self, description: &str, body: F)
    where
        F: FnOnce(&mut Scope) -> R,
        R: IntoOutcome,
    {
        if self.recorder.is_halted() {
            return;
        }
        let tests_before = match self.recorder.open_action(description) {
            Ok(count) => count,
            Err(error) => {
                self.recorder.halt(error);
                return;
            }
        };
        let outcome = body(self).into_outcome();
        self.recorder.close_action(tests_before, outcome);
    }

    fn replay_action<F, R>(&mut self, description: &str, body: F)
    where
        F: FnOnce(&mut Scope) -> R,
        R: IntoOutcome,
    {
        let entered = self
            .replayer
            .as_mut()
            .is_some_and(|replayer| replayer.enter_action(description));
        if !entered {
            return;
        }
        let outcome = body(self).into_outcome();
        if let Some(replayer) = self.replayer.as_mut() {
            replayer.leave_action(description, outcome);
        }
    }

    // ============================================================================
    // TESTS
    // ============================================================================

    /// Declares a test of the open subject.
    ///
    /// The body only runs when this very test is replayed.
    pub fn test<F, R>(&mut self, description: impl Into<String>, body: F)
    where
        F: FnOnce() -> R,
        R: IntoOutcome,
    {
        let description = description.into();
        match self.replayer.as_mut() {
            None => {
                if self.recorder.is_halted() {
                    return;
                }
                if let Err(error) = self.recorder.record_test(&description) {
                    self.recorder.halt(error);
                }
            }
            Some(replayer) => {
                if replayer.enter_test(&description) {
                    replayer.record(body().into_outcome());
                }
            }
        }
    }

    /// Declares an assertion about the subject, named `should <description>`.
    pub fn should<F, R>(&mut self, description: &str, body: F)
    where
        F: FnOnce() -> R,
        R: IntoOutcome,
    {
        self.test(format!("should {description}"), body);
    }
}
