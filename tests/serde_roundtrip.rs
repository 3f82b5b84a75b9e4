use gradebook::grade::{CriteriaPath, Grade, GradeAggregator, Mark, MarksTree};
use serde_json::json;

fn submission() -> MarksTree {
    MarksTree::composite([
        ("compile", MarksTree::mark(Mark::new(1.0, "compiles"))),
        (
            "tests",
            MarksTree::composite([
                ("fast", MarksTree::mark(Mark::new(0.5, "3 of 6"))),
                ("slow", MarksTree::mark(Mark::zero("timed out"))),
            ])
            .expect("tree"),
        ),
    ])
    .expect("tree")
}

#[test]
fn marks_trees_use_arrays_of_named_subtrees() {
    let value = serde_json::to_value(submission()).expect("serializable");
    assert_eq!(
        value,
        json!([
            { "criterion": "compile", "grade": { "points": 1.0, "comment": "compiles" } },
            { "criterion": "tests", "grade": [
                { "criterion": "fast", "grade": { "points": 0.5, "comment": "3 of 6" } },
                { "criterion": "slow", "grade": { "points": 0.0, "comment": "timed out" } },
            ] },
        ])
    );

    let back: MarksTree = serde_json::from_value(value).expect("reads back");
    assert_eq!(back, submission());
}

#[test]
fn marks_default_to_an_empty_comment() {
    let tree: MarksTree =
        serde_json::from_value(json!({ "points": 0.25 })).expect("a bare mark is a tree");
    assert_eq!(tree.as_mark(), Some(&Mark::new(0.25, "")));
}

#[test]
fn malformed_marks_trees_are_refused() {
    let empty = serde_json::from_value::<MarksTree>(json!([]));
    assert!(empty.is_err());

    let duplicated = serde_json::from_value::<MarksTree>(json!([
        { "criterion": "a", "grade": { "points": 1.0 } },
        { "criterion": "a", "grade": { "points": 0.0 } },
    ]));
    assert!(duplicated.is_err());
}

#[test]
fn rulebooks_read_back_to_equal_rulebooks() {
    let rules = GradeAggregator::normalizing_static([("compile", 1.0), ("tests", 3.0)], [(
        "tests",
        GradeAggregator::owa([2.0, 1.0], GradeAggregator::trivial()).expect("valid weights"),
    )])
    .expect("valid rulebook");

    let value = serde_json::to_value(&rules).expect("serializable");
    assert_eq!(
        value,
        json!({
            "rule": { "type": "NormalizingStatic", "weights": [
                { "criterion": "compile", "weight": 1.0 },
                { "criterion": "tests", "weight": 3.0 },
            ] },
            "children": [{
                "criterion": "tests",
                "aggregator": {
                    "rule": { "type": "Owa", "weights": [2.0, 1.0] },
                    "default": { "rule": { "type": "Void" } },
                },
            }],
        })
    );

    let back: GradeAggregator = serde_json::from_value(value).expect("reads back");
    assert_eq!(back, rules);
}

#[test]
fn invalid_rulebooks_are_refused_on_read() {
    let open_without_default = json!({ "rule": { "type": "Max" } });
    assert!(serde_json::from_value::<GradeAggregator>(open_without_default).is_err());

    let closed_with_default = json!({
        "rule": { "type": "Static", "weights": [{ "criterion": "a", "weight": 1.0 }] },
        "default": { "rule": { "type": "Void" } },
    });
    assert!(serde_json::from_value::<GradeAggregator>(closed_with_default).is_err());

    let unknown_child = json!({
        "rule": { "type": "Static", "weights": [{ "criterion": "a", "weight": 1.0 }] },
        "children": [{ "criterion": "b", "aggregator": { "rule": { "type": "Void" } } }],
    });
    assert!(serde_json::from_value::<GradeAggregator>(unknown_child).is_err());

    let empty_weights = json!({ "rule": { "type": "Static", "weights": [] } });
    assert!(serde_json::from_value::<GradeAggregator>(empty_weights).is_err());
}

#[test]
fn grades_serialize_points_comment_and_sub_grades() {
    let rules =
        GradeAggregator::static_weights([("a", 0.5), ("b", 0.5)], Vec::<(&str, _)>::new())
            .expect("valid rulebook");
    let tree = MarksTree::composite([
        ("a", MarksTree::mark(Mark::one("ok"))),
        ("b", MarksTree::mark(Mark::zero("missing"))),
    ])
    .expect("tree");
    let grade = rules.evaluate(&tree).expect("fits");

    let value = serde_json::to_value(&grade).expect("serializable");
    assert_eq!(
        value,
        json!({
            "points": 0.5,
            "comment": "",
            "subGrades": [
                { "criterion": "a", "weight": 0.5, "grade": { "points": 1.0, "comment": "ok" } },
                { "criterion": "b", "weight": 0.5, "grade": { "points": 0.0, "comment": "missing" } },
            ],
        })
    );

    let back: Grade = serde_json::from_value(value).expect("reads back");
    assert_eq!(back, grade);
}

#[test]
fn paths_serialize_as_slash_joined_strings() {
    let path = CriteriaPath::from_criteria(["Capping at 2024-05-01T12:00:00.000Z", "main", "tests"]);
    let value = serde_json::to_value(&path).expect("serializable");
    assert_eq!(value, json!("Capping at 2024-05-01T12:00:00.000Z/main/tests"));

    let back: CriteriaPath = serde_json::from_value(value).expect("reads back");
    assert_eq!(back, path);
    assert_eq!(
        serde_json::from_value::<CriteriaPath>(json!("")).expect("root"),
        CriteriaPath::ROOT
    );
}
