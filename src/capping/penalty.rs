#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use chrono::TimeDelta;

use crate::grade::{AggregationError, Mark};

/// Turns lateness into the fraction of credit a submission keeps.
pub trait LatenessPenalizer {
    /// A mark in `[0, 1]`: 1 keeps all the credit, 0 keeps nothing. Negative
    /// or zero `lateness` means on time.
    fn penalty(&self, lateness: TimeDelta) -> Mark;
}

impl<F> LatenessPenalizer for F
where
    F: Fn(TimeDelta) -> Mark,
{
    fn penalty(&self, lateness: TimeDelta) -> Mark {
        self(lateness)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Credit decreasing linearly from full at the deadline to nothing after a
/// fixed window.
pub struct LinearPenalizer {
    /// Lateness from which no credit is left.
    zero_credit_after: TimeDelta,
}

impl LinearPenalizer {
    /// A penalizer leaving no credit once `zero_credit_after` has elapsed past
    /// the deadline.
    pub fn new(zero_credit_after: TimeDelta) -> Result<Self, AggregationError> {
        if zero_credit_after <= TimeDelta::zero() {
            return Err(AggregationError::InvalidArgument(format!(
                "the penalty window must be positive, got {zero_credit_after}"
            )));
        }
        Ok(Self { zero_credit_after })
    }

    /// Lateness from which no credit is left.
    pub fn zero_credit_after(&self) -> TimeDelta {
        self.zero_credit_after
    }
}

impl LatenessPenalizer for LinearPenalizer {
    fn penalty(&self, lateness: TimeDelta) -> Mark {
        if lateness <= TimeDelta::zero() {
            return Mark::one("On time");
        }
        let ratio = lateness.num_milliseconds() as f64
            / self.zero_credit_after.num_milliseconds() as f64;
        let kept = (1.0 - ratio).clamp(0.0, 1.0);
        Mark::new(
            kept,
            format!(
                "Late by {}: {:.0}% of the credit kept",
                human_duration(lateness),
                kept * 100.0
            ),
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Keeps all the credit whatever the lateness.
pub struct NoPenalty;

impl LatenessPenalizer for NoPenalty {
    fn penalty(&self, lateness: TimeDelta) -> Mark {
        if lateness <= TimeDelta::zero() {
            Mark::one("On time")
        } else {
            Mark::one(format!("Late by {}, not penalized", human_duration(lateness)))
        }
    }
}

/// Renders a duration as days, hours, minutes and seconds, skipping leading
/// zero units.
pub fn human_duration(delta: TimeDelta) -> String {
    let total = delta.num_seconds().abs();
    let (days, hours, minutes, seconds) =
        (total / 86_400, total % 86_400 / 3_600, total % 3_600 / 60, total % 60);
    let sign = if delta < TimeDelta::zero() { "-" } else { "" };
    let body = if days > 0 {
        format!("{days}d {hours}h {minutes}m {seconds}s")
    } else if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    };
    format!("{sign}{body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_penalty_decays_over_the_window() {
        let penalizer = LinearPenalizer::new(TimeDelta::minutes(10)).unwrap();
        assert_eq!(penalizer.penalty(TimeDelta::minutes(-3)).points(), 1.0);
        assert_eq!(penalizer.penalty(TimeDelta::zero()).points(), 1.0);
        assert!((penalizer.penalty(TimeDelta::minutes(5)).points() - 0.5).abs() < 1e-9);
        assert_eq!(penalizer.penalty(TimeDelta::minutes(30)).points(), 0.0);
    }

    #[test]
    fn rejects_empty_window() {
        assert!(LinearPenalizer::new(TimeDelta::zero()).is_err());
    }

    #[test]
    fn formats_durations_without_leading_zero_units() {
        assert_eq!(human_duration(TimeDelta::seconds(42)), "42s");
        assert_eq!(human_duration(TimeDelta::seconds(600)), "10m 0s");
        assert_eq!(human_duration(TimeDelta::seconds(90_061)), "1d 1h 1m 1s");
    }
}
