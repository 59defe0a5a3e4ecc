//! A discovered scenario: the registries built by one discovery pass.

use tracing::{debug, debug_span};

use crate::errors::ScenarioError;
use crate::registry::{SubjectRegistry, TestCase, TestCatalog};
use crate::replay;
use crate::scope::Scope;
use crate::task::Outcome;

/// A test suite written as a type, the way a test class would be.
///
/// ```
/// use scenario::{Scenario, Scope, Specification};
///
/// struct Arithmetic;
///
/// impl Specification for Arithmetic {
///     fn define(s: &mut Scope) {
///         s.subject("addition", |s| {
///             s.should("be commutative", || assert_eq!(2 + 3, 3 + 2));
///         });
///     }
/// }
///
/// let scenario = Scenario::of::<Arithmetic>().unwrap();
/// assert_eq!(scenario.tests().len(), 1);
/// ```
pub trait Specification {
    /// Name of the suite; defaults to the implementing type's name.
    fn name() -> String {
        std::any::type_name::<Self>().to_string()
    }

    fn define(scope: &mut Scope);
}

/// Owns the subject registry and test catalog of one scenario.
///
/// Construction runs the definition exactly once. Every call to
/// [`Scenario::run_test`] replays the subject bodies again, so closure-local
/// state is rebuilt for each test.
#[derive(Debug)]
pub struct Scenario {
    name: String,
    subjects: SubjectRegistry,
    tests: TestCatalog,
}

impl Scenario {
    /// Discovers every subject, action and test declared by `definition`.
    ///
    /// Fails fast on the first structural mistake.
    pub fn new<F>(name: impl Into<String>, definition: F) -> Result<Self, ScenarioError>
    where
        F: FnOnce(&mut Scope),
    {
        let name = name.into();
        let span = debug_span!("discover", scenario = %name);
        let _guard = span.enter();

        let mut scope = Scope::discovering();
        definition(&mut scope);
        let (subjects, tests) = scope.finish_discovery()?;
        debug!(
            subjects = subjects.len(),
            tests = tests.len(),
            "discovery finished"
        );
        Ok(Self {
            name,
            subjects,
            tests,
        })
    }

    pub fn of<S: Specification>() -> Result<Self, ScenarioError> {
        Self::new(S::name(), S::define)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tests(&self) -> &TestCatalog {
        &self.tests
    }

    /// Replays one discovered test.
    pub fn run_test(&self, test: &TestCase) -> Outcome {
        replay::replay(&self.subjects, test)
    }

    /// Replays the test with the given fully qualified name, if it exists.
    pub fn run(&self, name: &str) -> Option<Outcome> {
        self.tests.get(name).map(|test| self.run_test(test))
    }
}
