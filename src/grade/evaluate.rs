#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use serde::{Deserialize, Serialize};

use super::{
    criterion::{CriteriaPath, Criterion},
    error::AggregationError,
    map::CriterionMap,
    mark::{Mark, SubMark},
    marks_tree::MarksTree,
    rulebook::GradeAggregator,
};

#[derive(Clone, Debug, PartialEq)]
/// A child of an evaluated node with the weight it was given.
pub struct WeightedGrade {
    /// Weight given to this child by its parent's rule.
    pub weight: f64,
    /// The evaluated child.
    pub grade:  Grade,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GradeRepr", into = "GradeRepr")]
/// A marks tree folded against a rulebook: every node carries its resulting
/// mark and every child the weight it received. Losing branches stay in the
/// tree with their (possibly zero) weight, for audit.
pub enum Grade {
    /// A leaf mark, taken as is.
    Leaf(Mark),
    /// An aggregated node.
    Composite {
        /// The aggregated mark of this node.
        mark:       Mark,
        /// Weighted children, in the marks tree's order.
        sub_grades: CriterionMap<WeightedGrade>,
    },
}

impl Grade {
    /// Folds `tree` against `rulebook`.
    ///
    /// Fails with a structural rejection naming the offending node when the
    /// tree's shape does not fit the rulebook.
    pub fn given(tree: &MarksTree, rulebook: &GradeAggregator) -> Result<Self, AggregationError> {
        evaluate_at(tree, rulebook, &CriteriaPath::ROOT)
    }

    /// Resulting mark of this node.
    pub fn mark(&self) -> &Mark {
        match self {
            Grade::Leaf(mark) => mark,
            Grade::Composite { mark, .. } => mark,
        }
    }

    /// Resulting points of this node.
    pub fn points(&self) -> f64 {
        self.mark().points()
    }

    /// Weighted children; empty for a leaf.
    pub fn sub_grades(&self) -> Option<&CriterionMap<WeightedGrade>> {
        match self {
            Grade::Leaf(_) => None,
            Grade::Composite { sub_grades, .. } => Some(sub_grades),
        }
    }

    /// Evaluated child for `criterion`.
    pub fn sub_grade(&self, criterion: &Criterion) -> Option<&Grade> {
        self.sub_grades()
            .and_then(|s| s.get(criterion))
            .map(|w| &w.grade)
    }

    /// Weight given to the child `criterion`.
    pub fn weight_of(&self, criterion: &Criterion) -> Option<f64> {
        self.sub_grades()
            .and_then(|s| s.get(criterion))
            .map(|w| w.weight)
    }

    /// Evaluated node reached by following `path`.
    pub fn grade_at(&self, path: &CriteriaPath) -> Option<&Grade> {
        path.iter()
            .try_fold(self, |grade, criterion| grade.sub_grade(criterion))
    }

    /// The child with the largest weight, the first one on ties. Under a Max
    /// rule this is the selected branch.
    pub fn winner(&self) -> Option<(&Criterion, &WeightedGrade)> {
        self.sub_grades()?
            .iter()
            .fold(None, |best: Option<(&Criterion, &WeightedGrade)>, (c, w)| match best {
                Some((_, b)) if b.weight >= w.weight => best,
                _ => Some((c, w)),
            })
    }

    /// The marks tree this grade was computed from. A composite grade
    /// without sub-grades becomes its own mark.
    pub fn to_marks_tree(&self) -> MarksTree {
        match self {
            Grade::Leaf(mark) => MarksTree::Mark(mark.clone()),
            Grade::Composite { mark, sub_grades } => MarksTree::composite(
                sub_grades
                    .iter()
                    .map(|(c, w)| (c.clone(), w.grade.to_marks_tree())),
            )
            .unwrap_or_else(|_| MarksTree::Mark(mark.clone())),
        }
    }
}

impl GradeAggregator {
    /// Folds `tree` against this rulebook, see [`Grade::given`].
    pub fn evaluate(&self, tree: &MarksTree) -> Result<Grade, AggregationError> {
        Grade::given(tree, self)
    }
}

/// Folds the subtree found at `path`.
fn evaluate_at(
    tree: &MarksTree,
    rulebook: &GradeAggregator,
    path: &CriteriaPath,
) -> Result<Grade, AggregationError> {
    let children = match tree {
        MarksTree::Mark(mark) => return Ok(Grade::Leaf(mark.clone())),
        MarksTree::Composite(children) => children,
    };

    let mut evaluated = Vec::with_capacity(children.len());
    for (criterion, child) in children.iter() {
        let rules = rulebook
            .child_rule_for(criterion)
            .map_err(|e| e.at(path))?;
        let grade = evaluate_at(child, rules, &path.with_suffix(criterion.clone()))?;
        evaluated.push((criterion.clone(), grade));
    }

    let sub_marks: Vec<SubMark> = evaluated
        .iter()
        .map(|(c, g)| SubMark::new(c.clone(), g.mark().clone()))
        .collect();
    let rule = rulebook.rule();
    let weights = rule.weights(&sub_marks).map_err(|e| {
        tracing::debug!("{} rejected children at `{}`", rule.variant_name(), path);
        e.at(path)
    })?;
    let points = rule.fold(&weights, &sub_marks).map_err(|e| e.at(path))?;

    let sub_grades = CriterionMap::try_from_entries(evaluated.into_iter().map(|(c, grade)| {
        let weight = weights.get(&c).copied().unwrap_or_default();
        (c, WeightedGrade { weight, grade })
    }))?;

    Ok(Grade::Composite {
        mark: Mark::new(points, ""),
        sub_grades,
    })
}

/// One weighted child on the wire.
#[derive(Serialize, Deserialize)]
struct WeightedGradeRepr {
    /// Child key.
    criterion: Criterion,
    /// Weight received.
    weight:    f64,
    /// Evaluated child.
    grade:     Grade,
}

/// Wire form of a composite [`Grade`].
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompositeGradeRepr {
    /// Aggregated points.
    points:     f64,
    /// Aggregated comment.
    #[serde(default)]
    comment:    String,
    /// Weighted children, in order.
    sub_grades: Vec<WeightedGradeRepr>,
}

/// Wire form of a [`Grade`]. The composite form comes first: a plain mark
/// object would otherwise match it too.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum GradeRepr {
    /// An aggregated node.
    Composite(CompositeGradeRepr),
    /// A leaf.
    Leaf(Mark),
}

impl TryFrom<GradeRepr> for Grade {
    type Error = AggregationError;

    fn try_from(repr: GradeRepr) -> Result<Self, Self::Error> {
        match repr {
            GradeRepr::Leaf(mark) => Ok(Grade::Leaf(mark)),
            GradeRepr::Composite(c) => {
                if !c.points.is_finite() || c.sub_grades.is_empty() {
                    return Err(AggregationError::InvalidArgument(
                        "a composite grade needs finite points and at least one sub-grade".into(),
                    ));
                }
                let sub_grades = CriterionMap::try_from_entries(c.sub_grades.into_iter().map(|s| {
                    (s.criterion, WeightedGrade {
                        weight: s.weight,
                        grade:  s.grade,
                    })
                }))?;
                Ok(Grade::Composite {
                    mark: Mark::new(c.points, c.comment),
                    sub_grades,
                })
            }
        }
    }
}

impl From<Grade> for GradeRepr {
    fn from(grade: Grade) -> Self {
        match grade {
            Grade::Leaf(mark) => GradeRepr::Leaf(mark),
            Grade::Composite { mark, sub_grades } => GradeRepr::Composite(CompositeGradeRepr {
                points:     mark.points(),
                comment:    mark.comment().to_string(),
                sub_grades: sub_grades
                    .into_iter()
                    .map(|(criterion, w)| WeightedGradeRepr {
                        criterion,
                        weight: w.weight,
                        grade: w.grade,
                    })
                    .collect(),
            }),
        }
    }
}
