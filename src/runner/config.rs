//! Command-line configuration for scenario test binaries.
//!
//! The arguments follow the libtest conventions cargo and nextest pass to a
//! `harness = false` test target, so `cargo test -- <filter>` keeps working.

use clap::{Parser, ValueEnum};
use termcolor::ColorChoice;

/// Options of one run.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "scenario",
    about = "Run the tests of a scenario suite.",
    disable_version_flag = true
)]
pub struct RunConfig {
    /// Run only tests whose name contains one of these filters.
    #[arg(value_name = "FILTER")]
    pub filters: Vec<String>,

    /// Filters must match the full test name exactly.
    #[arg(long)]
    pub exact: bool,

    /// Skip tests whose name contains this filter. May be repeated.
    #[arg(long = "skip", value_name = "FILTER")]
    pub skip: Vec<String>,

    /// List the tests instead of running them.
    #[arg(long)]
    pub list: bool,

    /// Output format of `--list`.
    #[arg(long, value_enum, default_value_t = ListFormat::Pretty)]
    pub format: ListFormat,

    /// Whether to color the output.
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Print one character per test instead of one line.
    #[arg(short, long)]
    pub quiet: bool,

    /// Run only ignored tests. Scenario tests are never ignored, so this selects nothing.
    #[arg(long, hide = true)]
    pub ignored: bool,

    // Accepted for compatibility with libtest; tests always run on one thread
    // and their output is never captured.
    #[arg(long, hide = true)]
    pub nocapture: bool,
    #[arg(long, hide = true)]
    pub show_output: bool,
    #[arg(long, hide = true, value_name = "N")]
    pub test_threads: Option<usize>,
}

impl RunConfig {
    /// Parses the process arguments, exiting with usage on error.
    pub fn from_args() -> Self {
        Self::parse()
    }

    pub fn filter(&self) -> TestFilter {
        TestFilter {
            filters: self.filters.clone(),
            skip: self.skip.clone(),
            exact: self.exact,
            ignored_only: self.ignored,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// One `name: test` line per test followed by a count.
    #[default]
    Pretty,
    /// One `name: test` line per test.
    Terse,
    /// The suite description as JSON.
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Color when stdout is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn choice(self) -> ColorChoice {
        match self {
            ColorMode::Auto if atty::is(atty::Stream::Stdout) => ColorChoice::Auto,
            ColorMode::Auto => ColorChoice::Never,
            ColorMode::Always => ColorChoice::Always,
            ColorMode::Never => ColorChoice::Never,
        }
    }
}

/// Selects tests by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestFilter {
    pub filters: Vec<String>,
    pub skip: Vec<String>,
    pub exact: bool,
    pub ignored_only: bool,
}

impl TestFilter {
    pub fn matches(&self, name: &str) -> bool {
        if self.ignored_only {
            return false;
        }
        let selected = self.filters.is_empty()
            || self.filters.iter().any(|filter| self.matches_one(filter, name));
        selected && !self.skip.iter().any(|skip| self.matches_one(skip, name))
    }

    fn matches_one(&self, pattern: &str, name: &str) -> bool {
        if self.exact {
            name == pattern
        } else {
            name.contains(pattern)
        }
    }
}
