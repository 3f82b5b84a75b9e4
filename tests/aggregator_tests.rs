use gradebook::grade::{AggregationError, Criterion, Mark, MarkAggregator, SubMark};

fn sub(name: &str, points: f64) -> SubMark {
    SubMark::new(name, Mark::new(points, ""))
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn weight(weights: &gradebook::grade::CriterionMap<f64>, name: &str) -> f64 {
    *weights.get(&Criterion::new(name)).expect("weight present")
}

#[test]
fn static_weights_are_used_as_given_then_clamped() {
    let rule = MarkAggregator::static_weights([("A", 2.0), ("B", 1.0)]).expect("valid weights");
    let marks = [sub("A", 1.0), sub("B", 0.0)];

    let weights = rule.weights(&marks).expect("accepted");
    assert_eq!(weight(&weights, "A"), 2.0);
    assert_eq!(weight(&weights, "B"), 1.0);
    assert_eq!(rule.aggregate(&marks).expect("accepted").points(), 1.0);

    let rule = MarkAggregator::static_weights([("A", 0.2), ("B", 0.3)]).expect("valid weights");
    let mark = rule.aggregate(&[sub("A", 1.0), sub("B", 1.0)]).expect("accepted");
    assert!(close(mark.points(), 0.5));
}

#[test]
fn static_weights_leave_absent_criteria_out_without_renormalizing() {
    let rule = MarkAggregator::static_weights([("A", 0.5), ("B", 0.5)]).expect("valid weights");
    let mark = rule.aggregate(&[sub("A", 1.0)]).expect("subset accepted");
    assert!(close(mark.points(), 0.5));
}

#[test]
fn static_weights_reject_unknown_criteria() {
    let rule = MarkAggregator::static_weights([("A", 2.0), ("B", 1.0)]).expect("valid weights");
    let err = rule
        .weights(&[sub("A", 1.0), sub("C", 1.0)])
        .expect_err("C is unknown");

    assert!(err.is_rejection());
    match err {
        AggregationError::Rejected {
            variant, criteria, ..
        } => {
            assert_eq!(variant, "Static");
            assert_eq!(criteria, vec![Criterion::new("A"), Criterion::new("C")]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn normalizing_static_rescales_over_present_criteria() {
    let rule = MarkAggregator::normalizing_static([("A", 2.0), ("B", 1.0)]).expect("valid weights");

    let mark = rule
        .aggregate(&[sub("A", 1.0), sub("B", 0.0)])
        .expect("accepted");
    assert!((mark.points() - 0.667).abs() < 1e-3);

    let weights = rule.weights(&[sub("B", 0.4)]).expect("subset accepted");
    assert_eq!(weight(&weights, "B"), 1.0);
    assert!(rule.weights(&[sub("Z", 0.4)]).is_err());
}

#[test]
fn parametric_interpolates_with_the_weighting_mark() {
    let rule = MarkAggregator::parametric("main", "lateness").expect("distinct roles");

    let two = [sub("main", 0.8), sub("lateness", 0.5)];
    let weights = rule.weights(&two).expect("two roles accepted");
    assert_eq!(weight(&weights, "lateness"), 0.0);
    assert_eq!(weight(&weights, "main"), 0.5);
    assert!(close(rule.aggregate(&two).expect("accepted").points(), 0.4));

    let three = [sub("main", 0.8), sub("lateness", 0.5), sub("other", 0.3)];
    let weights = rule.weights(&three).expect("remainder accepted");
    assert_eq!(weight(&weights, "other"), 0.5);
    assert!(close(rule.aggregate(&three).expect("accepted").points(), 0.55));
}

#[test]
fn parametric_rejects_missing_roles_and_extra_criteria() {
    let rule = MarkAggregator::parametric("main", "lateness").expect("distinct roles");

    assert!(rule.weights(&[sub("main", 1.0), sub("other", 1.0)]).is_err());
    assert!(rule.weights(&[sub("main", 1.0)]).is_err());
    assert!(
        rule.weights(&[
            sub("main", 1.0),
            sub("lateness", 1.0),
            sub("x", 1.0),
            sub("y", 1.0),
        ])
        .is_err()
    );
    assert!(matches!(
        MarkAggregator::parametric("same", "same"),
        Err(AggregationError::InvalidArgument(_))
    ));
}

#[test]
fn max_keeps_the_best_and_breaks_ties_by_name() {
    let rule = MarkAggregator::max();

    let marks = [sub("a", 0.3), sub("b", 0.9), sub("c", 0.5)];
    let weights = rule.weights(&marks).expect("any set accepted");
    assert_eq!(weight(&weights, "b"), 1.0);
    assert_eq!(weight(&weights, "a"), 0.0);
    assert_eq!(weight(&weights, "c"), 0.0);
    assert_eq!(rule.aggregate(&marks).expect("accepted").points(), 0.9);

    let tied = rule
        .weights(&[sub("b", 0.5), sub("a", 0.5)])
        .expect("any set accepted");
    assert_eq!(weight(&tied, "a"), 1.0);
    assert_eq!(weight(&tied, "b"), 0.0);
}

#[test]
fn min_mirrors_max() {
    let rule = MarkAggregator::min();

    let marks = [sub("a", 0.3), sub("b", 0.9)];
    assert_eq!(rule.aggregate(&marks).expect("accepted").points(), 0.3);

    let tied = rule
        .weights(&[sub("a", 0.5), sub("b", 0.5)])
        .expect("any set accepted");
    assert_eq!(weight(&tied, "b"), 1.0);
    assert_eq!(weight(&tied, "a"), 0.0);
}

#[test]
fn owa_assigns_normalized_weights_by_rank() {
    let rule = MarkAggregator::owa([3.0, 1.0]).expect("valid weights");

    let marks = [sub("x", 0.2), sub("y", 1.0)];
    let weights = rule.weights(&marks).expect("two sub-marks accepted");
    assert!(close(weight(&weights, "y"), 0.75));
    assert!(close(weight(&weights, "x"), 0.25));
    assert!(close(rule.aggregate(&marks).expect("accepted").points(), 0.8));

    assert!(
        rule.weights(&[sub("x", 0.2), sub("y", 1.0), sub("z", 0.0)])
            .is_err()
    );
    assert!(MarkAggregator::owa([0.0, 0.0]).is_err());
    assert!(MarkAggregator::owa(Vec::new()).is_err());
}

#[test]
fn absolute_sums_signed_contributions() {
    let rule = MarkAggregator::absolute();

    let mark = rule
        .aggregate(&[sub("bonus", 0.3), sub("malus", -0.5)])
        .expect("accepted");
    assert!(close(mark.points(), -0.2));

    let capped = rule
        .aggregate(&[sub("a", 0.8), sub("b", 0.7)])
        .expect("accepted");
    assert_eq!(capped.points(), 1.0);

    assert!(rule.weights(&[sub("a", 0.1), sub("a", 0.2)]).is_err());
}

#[test]
fn void_accepts_only_the_empty_set() {
    let rule = MarkAggregator::void();
    assert!(rule.weights(&[]).expect("empty accepted").is_empty());
    assert!(rule.weights(&[sub("a", 1.0)]).is_err());
}

#[test]
fn acceptance_is_checkable_before_any_mark() {
    let rule = MarkAggregator::static_weights([("A", 1.0)]).expect("valid weights");
    let a = Criterion::new("A");
    let b = Criterion::new("B");

    assert!(rule.check_criteria([&a]).is_ok());
    assert!(rule.check_criteria([&a, &b]).is_err());
    assert!(rule.probe(&b).is_err());
    assert!(MarkAggregator::max().probe(&b).is_ok());
}

#[test]
fn malformed_weights_fail_fast() {
    assert!(matches!(
        MarkAggregator::static_weights(Vec::<(&str, f64)>::new()),
        Err(AggregationError::InvalidArgument(_))
    ));
    assert!(matches!(
        MarkAggregator::static_weights([("A", -1.0)]),
        Err(AggregationError::InvalidArgument(_))
    ));
    assert!(matches!(
        MarkAggregator::normalizing_static([("A", 1.0), ("A", 2.0)]),
        Err(AggregationError::InvalidArgument(_))
    ));
}

#[test]
fn normalizing_static_keeps_zero_weights_when_present_ones_sum_to_zero() {
    let rule = MarkAggregator::normalizing_static([("A", 0.0), ("B", 0.0), ("C", 1.0)])
        .expect("valid weights");
    let marks = [sub("A", 1.0), sub("B", 0.5)];

    let weights = rule.weights(&marks).expect("subset accepted");
    assert_eq!(weight(&weights, "A"), 0.0);
    assert_eq!(weight(&weights, "B"), 0.0);
    assert_eq!(rule.aggregate(&marks).expect("accepted").points(), 0.0);
}

#[test]
fn overflowing_sums_saturate_or_are_rejected() {
    let rule =
        MarkAggregator::static_weights([("A", 1e308), ("B", 1e308)]).expect("valid weights");

    let saturated = rule
        .aggregate(&[sub("A", 10.0), sub("B", 10.0)])
        .expect("an infinite sum is clamped");
    assert_eq!(saturated.points(), 1.0);

    let err = rule
        .aggregate(&[sub("A", 10.0), sub("B", -10.0)])
        .expect_err("the sum is undefined");
    assert!(err.is_rejection());
    assert!(err.to_string().contains("overflows"));
}
