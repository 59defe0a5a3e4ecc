//! Registries filled by discovery and read by replay.
//!
//! Both registries are built once, while a scenario is constructed, and are
//! never modified afterwards.
//!
//! Registry invariants:
//! - several subject bodies may share a name; they are kept in registration
//!   order, which is also the order they are replayed in;
//! - test names are unique across the whole tree.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use crate::errors::{ensure, StructureError, StructureKind};
use crate::path::PathKey;
use crate::scope::Scope;
use crate::task::Outcome;

/// A subject definition that can be invoked any number of times.
pub(crate) type SubjectBody = Rc<dyn Fn(&mut Scope) -> Outcome>;

// ============================================================================
// SUBJECTS
// ============================================================================

/// Maps a subject name to every body registered under it.
#[derive(Default)]
pub(crate) struct SubjectRegistry {
    subjects: HashMap<String, Vec<SubjectBody>>,
}

impl SubjectRegistry {
    /// Appends `body` under `name`; earlier bodies with the same name are kept.
    pub(crate) fn register(&mut self, name: &str, body: SubjectBody) {
        self.subjects.entry(name.to_string()).or_default().push(body);
    }

    /// Returns the bodies registered under `name`, in registration order.
    pub(crate) fn bodies(&self, name: &str) -> &[SubjectBody] {
        self.subjects.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub(crate) fn len(&self) -> usize {
        self.subjects.values().map(Vec::len).sum()
    }
}

impl fmt::Debug for SubjectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.subjects.iter().map(|(name, bodies)| (name, bodies.len())))
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================

/// One discovered test: its fully qualified name and the path leading to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCase {
    name: String,
    path: PathKey,
}

impl TestCase {
    pub fn new(path: PathKey) -> Self {
        Self {
            name: path.name(),
            path,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &PathKey {
        &self.path
    }
}

/// Ordered catalog of every discovered test, in first-discovered order.
#[derive(Debug, Clone, Default)]
pub struct TestCatalog {
    tests: Vec<TestCase>,
    index: HashMap<String, usize>,
}

impl TestCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the test at `path`, rejecting a name that is already taken.
    pub fn insert(&mut self, path: PathKey) -> Result<&TestCase, StructureError> {
        let test = TestCase::new(path);
        ensure(
            !self.index.contains_key(test.name()),
            StructureKind::DuplicateTest,
            test.path(),
        )?;
        let position = self.tests.len();
        self.index.insert(test.name.clone(), position);
        self.tests.push(test);
        Ok(&self.tests[position])
    }

    pub fn get(&self, name: &str) -> Option<&TestCase> {
        self.index.get(name).map(|&position| &self.tests[position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TestCase> {
        self.tests.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tests.iter().map(TestCase::name)
    }
}

impl<'a> IntoIterator for &'a TestCatalog {
    type Item = &'a TestCase;
    type IntoIter = std::slice::Iter<'a, TestCase>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
