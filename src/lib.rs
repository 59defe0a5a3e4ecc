//! Scenario: subject, action and test declarations built from plain closures.
//!
//! A scenario is discovered once: every subject and action body runs and every
//! test leaf is recorded under its fully qualified name, the path segments
//! joined by spaces. Each test then runs on its own by replaying the subject
//! bodies along its path only. Local state created by enclosing closures is
//! rebuilt for every test, so siblings never see each other's mutations.
//!
//! ```
//! use std::cell::Cell;
//! use scenario::Runner;
//!
//! let runner = Runner::new("counter", |s| {
//!     s.subject("counter", |s| {
//!         let count = Cell::new(0);
//!
//!         s.when("incremented", |s| {
//!             count.set(count.get() + 1);
//!             s.should("be one", || assert_eq!(count.get(), 1));
//!         });
//!
//!         s.should("start at zero", || assert_eq!(count.get(), 0));
//!     });
//! })
//! .unwrap();
//!
//! let summary = runner.run(&mut ());
//! assert_eq!(summary.passed, 2);
//! ```

pub use crate::errors::{ensure, Failure, ScenarioError, StructureError, StructureKind};
pub use crate::path::PathKey;
pub use crate::registry::{TestCase, TestCatalog};
pub use crate::replay::ReplayCursor;
pub use crate::runner::{
    ConsoleReporter, Reporter, RunConfig, Runner, SuiteDescription, TestDescription, TestFilter,
    TestSummary,
};
pub use crate::scenario::{Scenario, Specification};
pub use crate::scope::Scope;
pub use crate::task::{assert_fails, IntoOutcome, Outcome};

pub mod errors;
pub mod harness;
pub mod path;
pub mod registry;
pub mod runner;
pub mod scenario;
pub mod scope;
pub mod task;

mod discovery;
mod replay;
