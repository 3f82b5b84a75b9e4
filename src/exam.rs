#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::grade::{AggregationError, Grade, GradeAggregator, MarksTree};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// One rulebook applied to the marks of several students.
pub struct Exam {
    /// Rulebook shared by every student.
    rulebook: GradeAggregator,
    /// Marks of every student, by username.
    marks:    BTreeMap<String, MarksTree>,
}

impl Exam {
    /// An exam without any student yet.
    pub fn new(rulebook: GradeAggregator) -> Self {
        Self {
            rulebook,
            marks: BTreeMap::new(),
        }
    }

    /// Returns this exam with the marks of `username` set, replacing any
    /// previous ones.
    pub fn with(mut self, username: impl Into<String>, marks: MarksTree) -> Self {
        self.marks.insert(username.into(), marks);
        self
    }

    /// The shared rulebook.
    pub fn rulebook(&self) -> &GradeAggregator {
        &self.rulebook
    }

    /// Usernames, sorted.
    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.marks.keys().map(String::as_str)
    }

    /// Marks of `username`.
    pub fn marks_of(&self, username: &str) -> Option<&MarksTree> {
        self.marks.get(username)
    }

    /// Grade of `username`, if known.
    pub fn grade_of(&self, username: &str) -> Option<Result<Grade, AggregationError>> {
        self.marks
            .get(username)
            .map(|marks| self.rulebook.evaluate(marks))
    }

    /// Grades every student independently: a student whose marks do not fit
    /// the rulebook gets an error without affecting the others.
    pub fn grades(&self) -> BTreeMap<&str, Result<Grade, AggregationError>> {
        self.marks
            .iter()
            .map(|(username, marks)| {
                let grade = self.rulebook.evaluate(marks);
                if let Err(e) = &grade {
                    tracing::warn!("Could not grade {username}: {e}");
                }
                (username.as_str(), grade)
            })
            .collect()
    }
}
