//! Entry point for `harness = false` test targets.
//!
//! ```toml
//! [[test]]
//! name = "stack"
//! path = "tests/stack.rs"
//! harness = false
//! ```
//!
//! ```no_run
//! use scenario::{harness, Scope, Specification};
//!
//! struct Stack;
//!
//! impl Specification for Stack {
//!     fn define(s: &mut Scope) {
//!         s.subject("stack", |s| {
//!             let stack: Vec<u8> = Vec::new();
//!             s.should("start empty", || assert!(stack.is_empty()));
//!         });
//!     }
//! }
//!
//! fn main() {
//!     harness::main::<Stack>();
//! }
//! ```

use std::io::{self, Write};

use miette::GraphicalReportHandler;
use tracing_subscriber::EnvFilter;

use crate::errors::ScenarioError;
use crate::runner::{ConsoleReporter, ListFormat, RunConfig, Runner, TestFilter};
use crate::scenario::Specification;
use crate::scope::Scope;

/// Environment variable holding the `tracing` filter directives.
pub const LOG_ENV: &str = "SCENARIO_LOG";

/// Exit code when a test failed or the suite could not be built, as libtest does.
pub const FAILURE_EXIT_CODE: i32 = 101;

/// Runs the suite defined by `S` with the process arguments and exits.
pub fn main<S: Specification>() {
    init_tracing();
    let config = RunConfig::from_args();
    std::process::exit(run(&config, Runner::of::<S>()));
}

/// Runs the suite defined by `definition` with the process arguments and exits.
pub fn run_definition<F>(name: &str, definition: F)
where
    F: FnOnce(&mut Scope),
{
    init_tracing();
    let config = RunConfig::from_args();
    std::process::exit(run(&config, Runner::new(name, definition)));
}

/// Lists or runs the tests of `runner` and returns the process exit code.
pub fn run(config: &RunConfig, runner: Result<Runner, ScenarioError>) -> i32 {
    let runner = match runner {
        Ok(runner) => runner,
        Err(error) => {
            report_construction_error(&error);
            return FAILURE_EXIT_CODE;
        }
    };

    if config.list {
        let mut stdout = io::stdout().lock();
        return match write_listing(&runner, &config.filter(), config.format, &mut stdout) {
            Ok(()) => 0,
            Err(error) => {
                eprintln!("error: failed to list tests: {error}");
                FAILURE_EXIT_CODE
            }
        };
    }

    let mut reporter = ConsoleReporter::stdout(config.color.choice(), config.quiet);
    let summary = runner.run_filtered(&config.filter(), &mut reporter);
    if summary.has_failures() {
        FAILURE_EXIT_CODE
    } else {
        0
    }
}

/// Writes the tests selected by `filter` in the requested format.
pub fn write_listing(
    runner: &Runner,
    filter: &TestFilter,
    format: ListFormat,
    out: &mut dyn Write,
) -> io::Result<()> {
    let mut description = runner.description();
    description.children.retain(|test| filter.matches(&test.name));

    match format {
        ListFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &description)?;
            writeln!(out)
        }
        ListFormat::Terse | ListFormat::Pretty => {
            for test in &description.children {
                writeln!(out, "{}: test", test.name)?;
            }
            if format == ListFormat::Pretty {
                let count = description.test_count();
                let plural = if count == 1 { "" } else { "s" };
                writeln!(out, "\n{count} test{plural}")?;
            }
            Ok(())
        }
    }
}

/// Installs a stderr `tracing` subscriber filtered by [`LOG_ENV`].
///
/// Does nothing if a global subscriber is already set.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn report_construction_error(error: &ScenarioError) {
    let mut rendered = String::new();
    match GraphicalReportHandler::new().render_report(&mut rendered, error) {
        Ok(()) => eprintln!("{rendered}"),
        Err(_) => eprintln!("error: {error}"),
    }
}
