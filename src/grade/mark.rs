#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::criterion::Criterion;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMark")]
/// A leaf judgment: some points and a free-text comment explaining them.
pub struct Mark {
    /// Points awarded; always finite.
    points:  f64,
    /// Why these points were awarded.
    comment: String,
}

/// Unvalidated wire form of a [`Mark`].
#[derive(Deserialize)]
struct RawMark {
    /// Points as read.
    points:  f64,
    /// Comment as read.
    #[serde(default)]
    comment: String,
}

impl TryFrom<RawMark> for Mark {
    type Error = String;

    fn try_from(raw: RawMark) -> Result<Self, Self::Error> {
        if raw.points.is_finite() {
            Ok(Mark {
                points:  raw.points,
                comment: raw.comment,
            })
        } else {
            Err(format!("mark points must be finite, got {}", raw.points))
        }
    }
}

impl Mark {
    /// Creates a mark.
    ///
    /// # Panics
    /// If `points` is NaN or infinite.
    pub fn new(points: f64, comment: impl Into<String>) -> Self {
        assert!(points.is_finite(), "mark points must be finite, got {points}");
        Self {
            points,
            comment: comment.into(),
        }
    }

    /// A mark of zero points with the given comment.
    pub fn zero(comment: impl Into<String>) -> Self {
        Self::new(0.0, comment)
    }

    /// A mark of one point with the given comment.
    pub fn one(comment: impl Into<String>) -> Self {
        Self::new(1.0, comment)
    }

    /// One point if `condition` holds, zero otherwise; no comment.
    pub fn binary(condition: bool) -> Self {
        Self::new(if condition { 1.0 } else { 0.0 }, "")
    }

    /// Points awarded.
    pub fn points(&self) -> f64 {
        self.points
    }

    /// Comment attached to the points.
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Returns this mark with a different comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

impl Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.comment.is_empty() {
            write!(f, "{:.2}", self.points)
        } else {
            write!(f, "{:.2} ({})", self.points, self.comment)
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// A mark together with the criterion it was obtained for; the unit
/// aggregators compute weights over.
pub struct SubMark {
    /// The criterion this mark was obtained for.
    pub criterion: Criterion,
    /// The mark itself.
    pub mark:      Mark,
}

impl SubMark {
    /// Pairs a criterion with its mark.
    pub fn new(criterion: impl Into<Criterion>, mark: Mark) -> Self {
        Self {
            criterion: criterion.into(),
            mark,
        }
    }

    /// Points of the mark.
    pub fn points(&self) -> f64 {
        self.mark.points()
    }
}
