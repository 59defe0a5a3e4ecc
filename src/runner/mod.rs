//! Adapter between a [`Scenario`] and a host test-reporting protocol.
//!
//! The runner constructs the scenario once, exposes its catalog as a
//! [`SuiteDescription`], and runs every test in catalog order, translating
//! each outcome into [`Reporter`] notifications. A failing test never stops
//! the run; only construction errors escape.

use serde::Serialize;
use tracing::{debug, info};

use crate::errors::ScenarioError;
use crate::registry::TestCase;
use crate::scenario::{Scenario, Specification};
use crate::scope::Scope;

pub mod config;
pub mod report;

pub use config::{ColorMode, ListFormat, RunConfig, TestFilter};
pub use report::{ConsoleReporter, Reporter, TestSummary};

// ============================================================================
// DESCRIPTIONS
// ============================================================================

/// Identifies one test towards the host: the suite it belongs to and its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TestDescription {
    pub suite: String,
    pub name: String,
}

impl TestDescription {
    pub fn new(suite: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            name: name.into(),
        }
    }
}

/// The suite as the host sees it: one child per discovered test, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteDescription {
    pub name: String,
    pub children: Vec<TestDescription>,
}

impl SuiteDescription {
    pub fn test_count(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

// ============================================================================
// RUNNER
// ============================================================================

#[derive(Debug)]
pub struct Runner {
    scenario: Scenario,
}

impl Runner {
    /// Builds the scenario from `definition`; structural errors are fatal.
    pub fn new<F>(name: impl Into<String>, definition: F) -> Result<Self, ScenarioError>
    where
        F: FnOnce(&mut Scope),
    {
        Scenario::new(name, definition).map(Self::from_scenario)
    }

    pub fn of<S: Specification>() -> Result<Self, ScenarioError> {
        Scenario::of::<S>().map(Self::from_scenario)
    }

    pub fn from_scenario(scenario: Scenario) -> Self {
        Self { scenario }
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn description(&self) -> SuiteDescription {
        SuiteDescription {
            name: self.scenario.name().to_string(),
            children: self
                .scenario
                .tests()
                .iter()
                .map(|test| self.describe(test))
                .collect(),
        }
    }

    /// Runs every test, in catalog order.
    pub fn run(&self, reporter: &mut dyn Reporter) -> TestSummary {
        self.run_filtered(&TestFilter::default(), reporter)
    }

    /// Runs the tests selected by `filter`; the rest are reported as skipped.
    pub fn run_filtered(&self, filter: &TestFilter, reporter: &mut dyn Reporter) -> TestSummary {
        let mut summary = TestSummary::default();
        reporter.suite_started(&self.description());
        for test in self.scenario.tests() {
            let description = self.describe(test);
            if filter.matches(test.name()) {
                self.run_one(test, &description, reporter, &mut summary);
            } else {
                summary.filtered += 1;
                reporter.test_skipped(&description);
            }
        }
        info!(
            suite = self.scenario.name(),
            passed = summary.passed,
            failed = summary.failed,
            filtered = summary.filtered,
            "suite finished"
        );
        reporter.suite_finished(&summary);
        summary
    }

    fn run_one(
        &self,
        test: &TestCase,
        description: &TestDescription,
        reporter: &mut dyn Reporter,
        summary: &mut TestSummary,
    ) {
        reporter.test_started(description);
        match self.scenario.run_test(test) {
            Ok(()) => {
                summary.passed += 1;
                reporter.test_passed(description);
            }
            Err(failure) => {
                debug!(test = test.name(), %failure, "test failed");
                summary.failed += 1;
                reporter.test_failed(description, &failure);
            }
        }
        reporter.test_finished(description);
    }

    fn describe(&self, test: &TestCase) -> TestDescription {
        TestDescription::new(self.scenario.name(), test.name())
    }
}
