//! Reporting protocol and console output for scenario runs.

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::errors::Failure;
use crate::runner::{SuiteDescription, TestDescription};

/// Receives the notifications of a run.
///
/// For every selected test the runner calls `test_started`, then exactly one
/// of `test_passed` or `test_failed`, then `test_finished`. Tests deselected
/// by a filter only get `test_skipped`.
pub trait Reporter {
    fn suite_started(&mut self, _suite: &SuiteDescription) {}

    fn test_started(&mut self, _test: &TestDescription) {}

    fn test_passed(&mut self, _test: &TestDescription) {}

    fn test_failed(&mut self, _test: &TestDescription, _failure: &Failure) {}

    fn test_skipped(&mut self, _test: &TestDescription) {}

    fn test_finished(&mut self, _test: &TestDescription) {}

    fn suite_finished(&mut self, _summary: &TestSummary) {}
}

/// Discards every notification.
impl Reporter for () {}

/// Test result summary for CLI reporting
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TestSummary {
    pub passed: usize,
    pub failed: usize,
    pub filtered: usize,
}

impl TestSummary {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn total_tests(&self) -> usize {
        self.passed + self.failed
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_tests() == 0 {
            return 0.0;
        }
        (self.passed as f64 / self.total_tests() as f64) * 100.0
    }
}

// ============================================================================
// CONSOLE REPORTER
// ============================================================================

/// Prints libtest-style progress and a colored summary.
///
/// Write errors are ignored: a broken terminal must not fail the run.
pub struct ConsoleReporter<W: WriteColor> {
    out: W,
    quiet: bool,
    failures: Vec<(String, String)>,
}

impl ConsoleReporter<StandardStream> {
    pub fn stdout(choice: ColorChoice, quiet: bool) -> Self {
        Self::new(StandardStream::stdout(choice), quiet)
    }
}

impl<W: WriteColor> ConsoleReporter<W> {
    pub fn new(out: W, quiet: bool) -> Self {
        Self {
            out,
            quiet,
            failures: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn colored(&mut self, text: &str, color: Color) {
        let _ = self.out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
        let _ = write!(self.out, "{text}");
        let _ = self.out.reset();
    }

    fn print_failures(&mut self) {
        if self.failures.is_empty() {
            return;
        }
        let failures = std::mem::take(&mut self.failures);
        let _ = writeln!(self.out, "\nfailures:\n");
        for (name, details) in &failures {
            let _ = writeln!(self.out, "---- {name} ----");
            let _ = writeln!(self.out, "{details}\n");
        }
        let _ = writeln!(self.out, "failures:");
        for (name, _) in &failures {
            let _ = writeln!(self.out, "    {name}");
        }
    }
}

impl<W: WriteColor> Reporter for ConsoleReporter<W> {
    fn suite_started(&mut self, suite: &SuiteDescription) {
        let count = suite.test_count();
        let plural = if count == 1 { "" } else { "s" };
        let _ = writeln!(self.out, "\nrunning {count} test{plural} in {}", suite.name);
    }

    fn test_started(&mut self, test: &TestDescription) {
        if !self.quiet {
            let _ = write!(self.out, "test {} ... ", test.name);
            let _ = self.out.flush();
        }
    }

    fn test_passed(&mut self, _test: &TestDescription) {
        if self.quiet {
            self.colored(".", Color::Green);
        } else {
            self.colored("ok", Color::Green);
            let _ = writeln!(self.out);
        }
    }

    fn test_failed(&mut self, test: &TestDescription, failure: &Failure) {
        if self.quiet {
            self.colored("F", Color::Red);
        } else {
            self.colored("FAILED", Color::Red);
            let _ = writeln!(self.out);
        }
        self.failures.push((test.name.clone(), describe_failure(failure)));
    }

    fn suite_finished(&mut self, summary: &TestSummary) {
        if self.quiet {
            let _ = writeln!(self.out);
        }
        self.print_failures();
        let _ = write!(self.out, "\ntest result: ");
        if summary.has_failures() {
            self.colored("FAILED", Color::Red);
        } else {
            self.colored("ok", Color::Green);
        }
        let _ = writeln!(
            self.out,
            ". {} passed; {} failed; {} filtered out\n",
            summary.passed, summary.failed, summary.filtered
        );
    }
}

/// Renders a failure and its chain of causes, one per line.
fn describe_failure(failure: &Failure) -> String {
    let mut details = failure.to_string();
    let mut cause = failure.cause().and_then(std::error::Error::source);
    while let Some(error) = cause {
        details.push_str(&format!("\n  caused by: {error}"));
        cause = error.source();
    }
    details
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcolor::NoColor;

    fn output(reporter: ConsoleReporter<NoColor<Vec<u8>>>) -> String {
        String::from_utf8(reporter.into_inner().into_inner()).unwrap()
    }

    fn suite(names: &[&str]) -> SuiteDescription {
        SuiteDescription {
            name: "suite".to_string(),
            children: names.iter().map(|name| TestDescription::new("suite", *name)).collect(),
        }
    }

    #[test]
    fn test_console_reports_each_test_and_summary() {
        let mut reporter = ConsoleReporter::new(NoColor::new(Vec::new()), false);
        let passing = TestDescription::new("suite", "s should pass");
        let failing = TestDescription::new("suite", "s should fail");

        reporter.suite_started(&suite(&["s should pass", "s should fail"]));
        reporter.test_started(&passing);
        reporter.test_passed(&passing);
        reporter.test_finished(&passing);
        reporter.test_started(&failing);
        reporter.test_failed(
            &failing,
            &Failure::Panicked {
                message: "assertion failed".to_string(),
            },
        );
        reporter.test_finished(&failing);
        reporter.suite_finished(&TestSummary {
            passed: 1,
            failed: 1,
            filtered: 0,
        });

        let text = output(reporter);
        assert!(text.contains("running 2 tests in suite"));
        assert!(text.contains("test s should pass ... ok"));
        assert!(text.contains("test s should fail ... FAILED"));
        assert!(text.contains("---- s should fail ----"));
        assert!(text.contains("panicked: assertion failed"));
        assert!(text.contains("test result: FAILED. 1 passed; 1 failed; 0 filtered out"));
    }

    #[test]
    fn test_quiet_mode_prints_progress_marks() {
        let mut reporter = ConsoleReporter::new(NoColor::new(Vec::new()), true);
        let test = TestDescription::new("suite", "s should pass");
        reporter.suite_started(&suite(&["s should pass"]));
        reporter.test_started(&test);
        reporter.test_passed(&test);
        reporter.suite_finished(&TestSummary {
            passed: 1,
            ..TestSummary::default()
        });

        let text = output(reporter);
        assert!(text.contains("running 1 test in suite"));
        assert!(!text.contains("test s should pass ..."));
        assert!(text.contains('.'));
        assert!(text.contains("test result: ok. 1 passed; 0 failed; 0 filtered out"));
    }

    #[test]
    fn test_summary_rates() {
        let summary = TestSummary {
            passed: 3,
            failed: 1,
            filtered: 2,
        };
        assert!(summary.has_failures());
        assert_eq!(summary.total_tests(), 4);
        assert_eq!(summary.success_rate(), 75.0);
        assert_eq!(TestSummary::default().success_rate(), 0.0);
    }
}
