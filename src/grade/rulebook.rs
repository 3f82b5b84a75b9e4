#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use serde::{Deserialize, Serialize};

use super::{
    aggregator::MarkAggregator,
    criterion::{CriteriaPath, Criterion},
    error::AggregationError,
    map::CriterionMap,
    marks_tree::MarksTree,
};

/// The rulebook used below leaves and for any child a static rulebook does
/// not list.
static TRIVIAL: GradeAggregator = GradeAggregator {
    rule:     MarkAggregator::Void,
    children: CriterionMap::new(),
    default:  None,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Whether a rulebook node knows its children's criteria in advance.
pub enum RulebookKind {
    /// Closed set of criteria; unlisted children fall back to the trivial
    /// rulebook.
    Static,
    /// Open set of criteria (one per commit, per cut time...); unlisted
    /// children share an explicit default rulebook.
    Dynamic,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GradeAggregatorRepr", into = "GradeAggregatorRepr")]
/// A grading rulebook: a [`MarkAggregator`] at every node, independent of any
/// particular [`MarksTree`].
///
/// Built once per assignment and reused for every submission.
pub struct GradeAggregator {
    /// How this node folds its children.
    rule:     MarkAggregator,
    /// Rulebooks for specific children. For dynamic nodes, entries equal to
    /// the default are never stored.
    children: CriterionMap<GradeAggregator>,
    /// Shared rulebook for unlisted children of a dynamic node; `None` for a
    /// static node.
    default:  Option<Box<GradeAggregator>>,
}

impl GradeAggregator {
    /// The terminal rulebook: accepts no children.
    pub fn trivial() -> Self {
        TRIVIAL.clone()
    }

    /// A node whose rule accepts a closed set of criteria (Static,
    /// NormalizingStatic or Void); unlisted children get the trivial rulebook.
    pub fn closed<I, C>(rule: MarkAggregator, children: I) -> Result<Self, AggregationError>
    where
        I: IntoIterator<Item = (C, GradeAggregator)>,
        C: Into<Criterion>,
    {
        if !rule.is_closed() {
            return Err(AggregationError::InvalidArgument(format!(
                "{} accepts an open set of criteria and needs a default sub-rulebook",
                rule.variant_name()
            )));
        }
        let children = Self::checked_children(&rule, children)?;
        Ok(Self {
            rule,
            children,
            default: None,
        })
    }

    /// A node whose rule accepts an open set of criteria (Parametric, OWA,
    /// Absolute); unlisted children get `default`.
    pub fn dynamic<I, C>(
        rule: MarkAggregator,
        children: I,
        default: GradeAggregator,
    ) -> Result<Self, AggregationError>
    where
        I: IntoIterator<Item = (C, GradeAggregator)>,
        C: Into<Criterion>,
    {
        if rule.is_closed() {
            return Err(AggregationError::InvalidArgument(format!(
                "{} accepts a closed set of criteria and takes no default sub-rulebook",
                rule.variant_name()
            )));
        }
        let children = Self::checked_children(&rule, children)?.retain(|_, c| *c != default);
        Ok(Self {
            rule,
            children,
            default: Some(Box::new(default)),
        })
    }

    /// Validates explicit children against `rule`.
    fn checked_children<I, C>(
        rule: &MarkAggregator,
        children: I,
    ) -> Result<CriterionMap<GradeAggregator>, AggregationError>
    where
        I: IntoIterator<Item = (C, GradeAggregator)>,
        C: Into<Criterion>,
    {
        let children =
            CriterionMap::try_from_entries(children.into_iter().map(|(c, g)| (c.into(), g)))?;
        for criterion in children.keys() {
            rule.probe(criterion).map_err(|e| {
                AggregationError::InvalidArgument(format!("sub-rulebook for `{criterion}`: {e}"))
            })?;
        }
        Ok(children)
    }

    /// Static weights with fixed sub-rulebooks; unlisted criteria are leaves.
    pub fn static_weights<W, WC, I, C>(weights: W, children: I) -> Result<Self, AggregationError>
    where
        W: IntoIterator<Item = (WC, f64)>,
        WC: Into<Criterion>,
        I: IntoIterator<Item = (C, GradeAggregator)>,
        C: Into<Criterion>,
    {
        Self::closed(MarkAggregator::static_weights(weights)?, children)
    }

    /// Normalizing static weights with fixed sub-rulebooks; unlisted criteria
    /// are leaves.
    pub fn normalizing_static<W, WC, I, C>(
        weights: W,
        children: I,
    ) -> Result<Self, AggregationError>
    where
        W: IntoIterator<Item = (WC, f64)>,
        WC: Into<Criterion>,
        I: IntoIterator<Item = (C, GradeAggregator)>,
        C: Into<Criterion>,
    {
        Self::closed(MarkAggregator::normalizing_static(weights)?, children)
    }

    /// Interpolates `multiplied` (graded with `multiplied_rules`) by the leaf
    /// mark found under `weighting`; a third, remainder criterion is graded
    /// with `remainder_rules`.
    pub fn parametric(
        multiplied: impl Into<Criterion>,
        weighting: impl Into<Criterion>,
        multiplied_rules: GradeAggregator,
        remainder_rules: GradeAggregator,
    ) -> Result<Self, AggregationError> {
        let multiplied = multiplied.into();
        let weighting = weighting.into();
        let rule = MarkAggregator::parametric(multiplied.clone(), weighting.clone())?;
        Self::dynamic(
            rule,
            [
                (multiplied, multiplied_rules),
                (weighting, GradeAggregator::trivial()),
            ],
            remainder_rules,
        )
    }

    /// Keeps the best child, every child graded with `sub_rules`.
    pub fn max(sub_rules: GradeAggregator) -> Self {
        Self {
            rule:     MarkAggregator::max(),
            children: CriterionMap::new(),
            default:  Some(Box::new(sub_rules)),
        }
    }

    /// Keeps the worst child, every child graded with `sub_rules`.
    pub fn min(sub_rules: GradeAggregator) -> Self {
        Self {
            rule:     MarkAggregator::min(),
            children: CriterionMap::new(),
            default:  Some(Box::new(sub_rules)),
        }
    }

    /// Order-weighted average of children, every child graded with
    /// `sub_rules`.
    pub fn owa<I>(weights: I, sub_rules: GradeAggregator) -> Result<Self, AggregationError>
    where
        I: IntoIterator<Item = f64>,
    {
        Self::dynamic(
            MarkAggregator::owa(weights)?,
            Vec::<(Criterion, GradeAggregator)>::new(),
            sub_rules,
        )
    }

    /// Unweighted sum of bonuses and penalties.
    pub fn absolute<I, C>(children: I, default: GradeAggregator) -> Result<Self, AggregationError>
    where
        I: IntoIterator<Item = (C, GradeAggregator)>,
        C: Into<Criterion>,
    {
        Self::dynamic(MarkAggregator::absolute(), children, default)
    }

    /// The rule folding this node's children.
    pub fn rule(&self) -> &MarkAggregator {
        &self.rule
    }

    /// Whether this node lists its children in advance.
    pub fn kind(&self) -> RulebookKind {
        if self.default.is_some() {
            RulebookKind::Dynamic
        } else {
            RulebookKind::Static
        }
    }

    /// Explicitly stored sub-rulebooks.
    pub fn children(&self) -> &CriterionMap<GradeAggregator> {
        &self.children
    }

    /// Sub-rulebook used for any child not stored explicitly.
    pub fn default_child(&self) -> &GradeAggregator {
        self.default.as_deref().unwrap_or(&TRIVIAL)
    }

    /// Returns `true` for the terminal rulebook.
    pub fn is_trivial(&self) -> bool {
        *self == TRIVIAL
    }

    /// Sub-rulebook governing the child `criterion`.
    ///
    /// Fails when this node's rule rejects `criterion` whatever its siblings,
    /// which lets callers probe compatibility without any marks.
    pub fn child_rule_for(&self, criterion: &Criterion) -> Result<&GradeAggregator, AggregationError> {
        self.rule.probe(criterion)?;
        Ok(self
            .children
            .get(criterion)
            .unwrap_or_else(|| self.default_child()))
    }

    /// Sub-rulebook reached by following `path`.
    pub fn child_rule_at(&self, path: &CriteriaPath) -> Result<&GradeAggregator, AggregationError> {
        let mut current = self;
        let mut walked = CriteriaPath::ROOT;
        for criterion in path {
            current = current
                .child_rule_for(criterion)
                .map_err(|e| e.at(&walked))?;
            walked = walked.with_suffix(criterion.clone());
        }
        Ok(current)
    }

    /// Checks that `tree` fits this rulebook everywhere, without computing
    /// any points.
    pub fn check(&self, tree: &MarksTree) -> Result<(), AggregationError> {
        self.check_at(tree, &CriteriaPath::ROOT)
    }

    /// Recursive part of [`GradeAggregator::check`].
    fn check_at(&self, tree: &MarksTree, path: &CriteriaPath) -> Result<(), AggregationError> {
        let Some(children) = tree.children() else {
            return Ok(());
        };
        self.rule
            .check_criteria(children.keys())
            .map_err(|e| e.at(path))?;
        for (criterion, child) in children.iter() {
            let rules = self.child_rule_for(criterion).map_err(|e| e.at(path))?;
            rules.check_at(child, &path.with_suffix(criterion.clone()))?;
        }
        Ok(())
    }
}

impl Default for GradeAggregator {
    fn default() -> Self {
        Self::trivial()
    }
}

/// One explicit sub-rulebook on the wire.
#[derive(Serialize, Deserialize)]
struct SubRulebookRepr {
    /// Child key.
    criterion:  Criterion,
    /// Child rulebook.
    aggregator: GradeAggregator,
}

/// Wire form of a [`GradeAggregator`].
#[derive(Serialize, Deserialize)]
struct GradeAggregatorRepr {
    /// How the node folds its children.
    rule:     MarkAggregator,
    /// Explicit sub-rulebooks, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<SubRulebookRepr>,
    /// Shared sub-rulebook of a dynamic node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default:  Option<Box<GradeAggregator>>,
}

impl TryFrom<GradeAggregatorRepr> for GradeAggregator {
    type Error = AggregationError;

    fn try_from(repr: GradeAggregatorRepr) -> Result<Self, Self::Error> {
        let children = repr
            .children
            .into_iter()
            .map(|s| (s.criterion, s.aggregator));
        match repr.default {
            Some(default) => GradeAggregator::dynamic(repr.rule, children, *default),
            None => GradeAggregator::closed(repr.rule, children),
        }
    }
}

impl From<GradeAggregator> for GradeAggregatorRepr {
    fn from(rulebook: GradeAggregator) -> Self {
        Self {
            rule:     rulebook.rule,
            children: rulebook
                .children
                .into_iter()
                .map(|(criterion, aggregator)| SubRulebookRepr {
                    criterion,
                    aggregator,
                })
                .collect(),
            default:  rulebook.default,
        }
    }
}
