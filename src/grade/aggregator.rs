#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::collections::HashSet;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::{
    criterion::Criterion,
    error::AggregationError,
    map::CriterionMap,
    mark::{Mark, SubMark},
};

#[derive(Clone, Debug, PartialEq)]
/// Fixed, non-negative weights keyed by criterion.
pub struct StaticWeighter {
    /// Weight of every known criterion.
    weights: CriterionMap<f64>,
}

impl StaticWeighter {
    /// Validates and stores the given weights.
    fn new<I, C>(weights: I) -> Result<Self, AggregationError>
    where
        I: IntoIterator<Item = (C, f64)>,
        C: Into<Criterion>,
    {
        let weights =
            CriterionMap::try_from_entries(weights.into_iter().map(|(c, w)| (c.into(), w)))?;
        if weights.is_empty() {
            return Err(AggregationError::InvalidArgument(
                "static weights need at least one criterion".into(),
            ));
        }
        if let Some((criterion, weight)) = weights
            .iter()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(AggregationError::InvalidArgument(format!(
                "weight of `{criterion}` must be finite and non-negative, got {weight}"
            )));
        }
        Ok(Self { weights })
    }

    /// Configured weights, in insertion order.
    pub fn weights(&self) -> &CriterionMap<f64> {
        &self.weights
    }

    /// Configured weight of `criterion`, if known.
    pub fn weight(&self, criterion: &Criterion) -> Option<f64> {
        self.weights.get(criterion).copied()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Interpolates between two criteria using the points of a third, steering
/// one: `w × multiplied + (1 − w) × remainder`.
pub struct ParametricWeighter {
    /// Criterion whose points get scaled by `w`.
    multiplied: Criterion,
    /// Criterion whose points are `w`; it gets no weight itself.
    weighting:  Criterion,
}

impl ParametricWeighter {
    /// Criterion whose points get scaled by the weighting mark.
    pub fn multiplied(&self) -> &Criterion {
        &self.multiplied
    }

    /// Criterion whose points steer the interpolation.
    pub fn weighting(&self) -> &Criterion {
        &self.weighting
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Order-weighted averages: weights are assigned by rank, never by criterion.
pub enum OwaWeighter {
    /// Everything on the best sub-mark.
    Max,
    /// Everything on the worst sub-mark.
    Min,
    /// A fixed sequence, best sub-mark first, renormalized to sum to one.
    Weighted(Vec<f64>),
}

impl OwaWeighter {
    /// Weights by rank for `n` sub-marks, best first, or `None` if this
    /// weighter cannot handle `n` sub-marks.
    fn by_rank(&self, n: usize) -> Option<Vec<f64>> {
        match self {
            OwaWeighter::Max => Some((0..n).map(|i| if i == 0 { 1.0 } else { 0.0 }).collect()),
            OwaWeighter::Min => {
                Some((0..n).map(|i| if i + 1 == n { 1.0 } else { 0.0 }).collect())
            }
            OwaWeighter::Weighted(weights) if weights.len() == n => {
                let sum: f64 = weights.iter().sum();
                Some(weights.iter().map(|w| w / sum).collect())
            }
            OwaWeighter::Weighted(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// A rule computing one weight per sibling sub-mark, used to fold children
/// into their parent's mark.
///
/// Every variant can tell which sets of criteria it accepts before seeing any
/// mark, see [`MarkAggregator::check_criteria`].
pub enum MarkAggregator {
    /// Fixed weights; unknown criteria are rejected, absent ones count zero.
    Static(StaticWeighter),
    /// Fixed weights rescaled so that the weights of the present criteria sum
    /// to one.
    NormalizingStatic(StaticWeighter),
    /// Linear interpolation steered by the points of one criterion.
    Parametric(ParametricWeighter),
    /// Weights by rank.
    Owa(OwaWeighter),
    /// Every sub-mark counts once, for additive bonuses and penalties.
    Absolute,
    /// Accepts only the empty set.
    Void,
}

impl MarkAggregator {
    /// Static weights, used as given.
    pub fn static_weights<I, C>(weights: I) -> Result<Self, AggregationError>
    where
        I: IntoIterator<Item = (C, f64)>,
        C: Into<Criterion>,
    {
        StaticWeighter::new(weights).map(MarkAggregator::Static)
    }

    /// Static weights, renormalized over the criteria actually present.
    pub fn normalizing_static<I, C>(weights: I) -> Result<Self, AggregationError>
    where
        I: IntoIterator<Item = (C, f64)>,
        C: Into<Criterion>,
    {
        StaticWeighter::new(weights).map(MarkAggregator::NormalizingStatic)
    }

    /// Interpolation of `multiplied` steered by the points of `weighting`.
    pub fn parametric(
        multiplied: impl Into<Criterion>,
        weighting: impl Into<Criterion>,
    ) -> Result<Self, AggregationError> {
        let multiplied = multiplied.into();
        let weighting = weighting.into();
        if multiplied == weighting {
            return Err(AggregationError::InvalidArgument(format!(
                "the multiplied and weighting criteria must differ, both are `{multiplied}`"
            )));
        }
        Ok(MarkAggregator::Parametric(ParametricWeighter {
            multiplied,
            weighting,
        }))
    }

    /// Picks the best sub-mark.
    pub fn max() -> Self {
        MarkAggregator::Owa(OwaWeighter::Max)
    }

    /// Picks the worst sub-mark.
    pub fn min() -> Self {
        MarkAggregator::Owa(OwaWeighter::Min)
    }

    /// An order-weighted average with the given weights, best sub-mark first.
    pub fn owa<I>(weights: I) -> Result<Self, AggregationError>
    where
        I: IntoIterator<Item = f64>,
    {
        let weights: Vec<f64> = weights.into_iter().collect();
        if weights.is_empty() {
            return Err(AggregationError::InvalidArgument(
                "an order-weighted average needs at least one weight".into(),
            ));
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(AggregationError::InvalidArgument(format!(
                "order weights must be finite and non-negative, got {weights:?}"
            )));
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(AggregationError::InvalidArgument(
                "order weights must not all be zero".into(),
            ));
        }
        Ok(MarkAggregator::Owa(OwaWeighter::Weighted(weights)))
    }

    /// Unweighted sum, clamped to `[-1, 1]`.
    pub fn absolute() -> Self {
        MarkAggregator::Absolute
    }

    /// Accepts nothing but the empty set.
    pub fn void() -> Self {
        MarkAggregator::Void
    }

    /// Name of the variant, for error messages.
    pub fn variant_name(&self) -> &'static str {
        match self {
            MarkAggregator::Static(_) => "Static",
            MarkAggregator::NormalizingStatic(_) => "NormalizingStatic",
            MarkAggregator::Parametric(_) => "Parametric",
            MarkAggregator::Owa(OwaWeighter::Max) => "Max",
            MarkAggregator::Owa(OwaWeighter::Min) => "Min",
            MarkAggregator::Owa(OwaWeighter::Weighted(_)) => "Owa",
            MarkAggregator::Absolute => "Absolute",
            MarkAggregator::Void => "Void",
        }
    }

    /// Returns `true` if the criteria this rule accepts form a closed,
    /// known-in-advance set.
    pub fn is_closed(&self) -> bool {
        match self {
            MarkAggregator::Static(_) | MarkAggregator::NormalizingStatic(_) => true,
            MarkAggregator::Void => true,
            MarkAggregator::Parametric(_) | MarkAggregator::Owa(_) | MarkAggregator::Absolute => {
                false
            }
        }
    }

    /// Fails if `criterion` can never be part of a set this rule accepts,
    /// whatever its siblings.
    pub fn probe(&self, criterion: &Criterion) -> Result<(), AggregationError> {
        let reject = |reason: &str| {
            Err(AggregationError::rejected(
                self.variant_name(),
                [criterion],
                reason,
            ))
        };
        match self {
            MarkAggregator::Static(w) | MarkAggregator::NormalizingStatic(w)
                if !w.weights.contains(criterion) =>
            {
                reject("unknown criterion")
            }
            MarkAggregator::Void => reject("no criterion is accepted"),
            _ => Ok(()),
        }
    }

    /// Fails unless this rule accepts exactly this set of sibling criteria.
    pub fn check_criteria<'a, I>(&self, criteria: I) -> Result<(), AggregationError>
    where
        I: IntoIterator<Item = &'a Criterion>,
    {
        let criteria: Vec<&Criterion> = criteria.into_iter().collect();
        let reject = |reason: String| {
            Err(AggregationError::rejected(
                self.variant_name(),
                criteria.iter().copied(),
                reason,
            ))
        };

        let distinct: HashSet<&Criterion> = criteria.iter().copied().collect();
        if distinct.len() != criteria.len() {
            return reject("criteria must be distinct".into());
        }

        match self {
            MarkAggregator::Static(w) | MarkAggregator::NormalizingStatic(w) => {
                match criteria.iter().find(|c| !w.weights.contains(c)) {
                    Some(unknown) => reject(format!("unknown criterion `{unknown}`")),
                    None => Ok(()),
                }
            }
            MarkAggregator::Parametric(p) => {
                if !distinct.contains(&p.multiplied) || !distinct.contains(&p.weighting) {
                    reject(format!(
                        "both `{}` and `{}` must be present",
                        p.multiplied, p.weighting
                    ))
                } else if criteria.len() > 3 {
                    reject(format!("at most three criteria, got {}", criteria.len()))
                } else {
                    Ok(())
                }
            }
            MarkAggregator::Owa(owa) => match owa.by_rank(criteria.len()) {
                Some(_) => Ok(()),
                None => reject(format!("cannot rank {} sub-marks", criteria.len())),
            },
            MarkAggregator::Absolute => Ok(()),
            MarkAggregator::Void if criteria.is_empty() => Ok(()),
            MarkAggregator::Void => reject("only the empty set is accepted".into()),
        }
    }

    /// Weight of every sub-mark, in the order of `sub_marks`.
    pub fn weights(&self, sub_marks: &[SubMark]) -> Result<CriterionMap<f64>, AggregationError> {
        self.check_criteria(sub_marks.iter().map(|s| &s.criterion))?;

        let weights: Vec<f64> = match self {
            MarkAggregator::Static(w) => sub_marks
                .iter()
                .map(|s| w.weight(&s.criterion).unwrap_or_default())
                .collect(),
            MarkAggregator::NormalizingStatic(w) => {
                let raw: Vec<f64> = sub_marks
                    .iter()
                    .map(|s| w.weight(&s.criterion).unwrap_or_default())
                    .collect();
                let sum: f64 = raw.iter().sum();
                if sum > 0.0 {
                    raw.into_iter().map(|x| x / sum).collect()
                } else {
                    raw
                }
            }
            MarkAggregator::Parametric(p) => {
                let steering = sub_marks
                    .iter()
                    .find(|s| s.criterion == p.weighting)
                    .map(SubMark::points)
                    .unwrap_or_default();
                sub_marks
                    .iter()
                    .map(|s| {
                        if s.criterion == p.weighting {
                            0.0
                        } else if s.criterion == p.multiplied {
                            steering
                        } else {
                            1.0 - steering
                        }
                    })
                    .collect()
            }
            MarkAggregator::Owa(owa) => {
                let by_rank = owa.by_rank(sub_marks.len()).unwrap_or_default();
                let mut weights = vec![0.0; sub_marks.len()];
                let ranked = (0..sub_marks.len()).sorted_by(|&a, &b| {
                    sub_marks[b]
                        .points()
                        .total_cmp(&sub_marks[a].points())
                        .then_with(|| sub_marks[a].criterion.collate(&sub_marks[b].criterion))
                });
                for (rank, index) in ranked.enumerate() {
                    weights[index] = by_rank[rank];
                }
                weights
            }
            MarkAggregator::Absolute => vec![1.0; sub_marks.len()],
            MarkAggregator::Void => Vec::new(),
        };

        CriterionMap::try_from_entries(
            sub_marks
                .iter()
                .map(|s| s.criterion.clone())
                .zip(weights),
        )
    }

    /// Range the aggregated points are clamped to.
    pub fn bounds(&self) -> (f64, f64) {
        match self {
            MarkAggregator::Absolute => (-1.0, 1.0),
            _ => (0.0, 1.0),
        }
    }

    /// Folds the given sub-marks into one mark: the weighted sum of their
    /// points, clamped to [`MarkAggregator::bounds`].
    pub fn aggregate(&self, sub_marks: &[SubMark]) -> Result<Mark, AggregationError> {
        let weights = self.weights(sub_marks)?;
        Ok(Mark::new(self.fold(&weights, sub_marks)?, ""))
    }

    /// Weighted sum of `sub_marks` under already computed `weights`, clamped.
    ///
    /// Fails when the sum is undefined, i.e. positive and negative terms
    /// both overflow.
    pub(crate) fn fold(
        &self,
        weights: &CriterionMap<f64>,
        sub_marks: &[SubMark],
    ) -> Result<f64, AggregationError> {
        let (low, high) = self.bounds();
        let sum = sub_marks
            .iter()
            .map(|s| weights.get(&s.criterion).copied().unwrap_or_default() * s.points())
            .sum::<f64>();
        if sum.is_nan() {
            return Err(AggregationError::rejected(
                self.variant_name(),
                sub_marks.iter().map(|s| &s.criterion),
                "the weighted sum overflows",
            ));
        }
        Ok(sum.clamp(low, high))
    }
}

/// One entry of a static weight list on the wire.
#[derive(Serialize, Deserialize)]
struct WeightRepr {
    /// Weighted criterion.
    criterion: Criterion,
    /// Its weight.
    weight:    f64,
}

/// Wire form of a [`MarkAggregator`], tagged by variant.
#[derive(Serialize, Deserialize)]
#[serde(tag = "type")]
enum MarkAggregatorRepr {
    /// See [`MarkAggregator::Static`].
    Static {
        /// Configured weights.
        weights: Vec<WeightRepr>,
    },
    /// See [`MarkAggregator::NormalizingStatic`].
    NormalizingStatic {
        /// Configured weights.
        weights: Vec<WeightRepr>,
    },
    /// See [`MarkAggregator::Parametric`].
    Parametric {
        /// Criterion scaled by the weighting mark.
        multiplied: Criterion,
        /// Criterion steering the interpolation.
        weighting:  Criterion,
    },
    /// See [`OwaWeighter::Max`].
    Max,
    /// See [`OwaWeighter::Min`].
    Min,
    /// See [`OwaWeighter::Weighted`].
    Owa {
        /// Weights by rank, best first.
        weights: Vec<f64>,
    },
    /// See [`MarkAggregator::Absolute`].
    Absolute,
    /// See [`MarkAggregator::Void`].
    Void,
}

impl TryFrom<MarkAggregatorRepr> for MarkAggregator {
    type Error = AggregationError;

    fn try_from(repr: MarkAggregatorRepr) -> Result<Self, Self::Error> {
        match repr {
            MarkAggregatorRepr::Static { weights } => {
                MarkAggregator::static_weights(weights.into_iter().map(|w| (w.criterion, w.weight)))
            }
            MarkAggregatorRepr::NormalizingStatic { weights } => MarkAggregator::normalizing_static(
                weights.into_iter().map(|w| (w.criterion, w.weight)),
            ),
            MarkAggregatorRepr::Parametric {
                multiplied,
                weighting,
            } => MarkAggregator::parametric(multiplied, weighting),
            MarkAggregatorRepr::Max => Ok(MarkAggregator::max()),
            MarkAggregatorRepr::Min => Ok(MarkAggregator::min()),
            MarkAggregatorRepr::Owa { weights } => MarkAggregator::owa(weights),
            MarkAggregatorRepr::Absolute => Ok(MarkAggregator::Absolute),
            MarkAggregatorRepr::Void => Ok(MarkAggregator::Void),
        }
    }
}

impl From<MarkAggregator> for MarkAggregatorRepr {
    fn from(aggregator: MarkAggregator) -> Self {
        let weight_list = |w: StaticWeighter| {
            w.weights
                .into_iter()
                .map(|(criterion, weight)| WeightRepr { criterion, weight })
                .collect()
        };
        match aggregator {
            MarkAggregator::Static(w) => MarkAggregatorRepr::Static {
                weights: weight_list(w),
            },
            MarkAggregator::NormalizingStatic(w) => MarkAggregatorRepr::NormalizingStatic {
                weights: weight_list(w),
            },
            MarkAggregator::Parametric(p) => MarkAggregatorRepr::Parametric {
                multiplied: p.multiplied,
                weighting:  p.weighting,
            },
            MarkAggregator::Owa(OwaWeighter::Max) => MarkAggregatorRepr::Max,
            MarkAggregator::Owa(OwaWeighter::Min) => MarkAggregatorRepr::Min,
            MarkAggregator::Owa(OwaWeighter::Weighted(weights)) => {
                MarkAggregatorRepr::Owa { weights }
            }
            MarkAggregator::Absolute => MarkAggregatorRepr::Absolute,
            MarkAggregator::Void => MarkAggregatorRepr::Void,
        }
    }
}

impl Serialize for MarkAggregator {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        MarkAggregatorRepr::from(self.clone()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MarkAggregator {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = MarkAggregatorRepr::deserialize(deserializer)?;
        MarkAggregator::try_from(repr).map_err(serde::de::Error::custom)
    }
}
