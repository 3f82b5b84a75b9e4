use std::time::Duration;

use anyhow::{anyhow, bail};
use gradebook::{
    batch::{BatchOptions, grade_batch, guard_invocation},
    grade::{Mark, MarksTree},
};

#[tokio::test]
async fn successful_invocations_pass_their_marks_through() {
    let marks = guard_invocation(Duration::from_secs(5), async {
        anyhow::Ok(MarksTree::mark(Mark::one("all tests pass")))
    })
    .await;
    assert_eq!(marks, MarksTree::mark(Mark::one("all tests pass")));
}

#[tokio::test]
async fn failing_invocations_become_zero_marks() {
    let marks = guard_invocation(Duration::from_secs(5), async {
        Err::<MarksTree, _>(anyhow!("process exited with status 101"))
    })
    .await;
    let mark = marks.as_mark().expect("a single mark");
    assert_eq!(mark.points(), 0.0);
    assert!(mark.comment().contains("status 101"));
}

#[tokio::test]
async fn slow_invocations_time_out_as_zero_marks() {
    let marks = guard_invocation(Duration::from_millis(50), async {
        tokio::time::sleep(Duration::from_secs(10)).await;
        anyhow::Ok(MarksTree::mark(Mark::one("too late")))
    })
    .await;
    let mark = marks.as_mark().expect("a single mark");
    assert_eq!(mark.points(), 0.0);
    assert!(mark.comment().starts_with("Timed out"));
}

#[tokio::test]
async fn batches_keep_input_order_and_isolate_failures() {
    let options = BatchOptions::builder().concurrency(2).build();
    let students = vec!["alice", "bob", "carol", "dave"];

    let results = grade_batch(students.clone(), &options, |student| async move {
        // later students finish first
        let delay = match student {
            "alice" => 30,
            "bob" => 20,
            _ => 1,
        };
        tokio::time::sleep(Duration::from_millis(delay)).await;
        if student == "carol" {
            bail!("could not clone the repository of {student}");
        }
        Ok(student.len())
    })
    .await;

    let order: Vec<&str> = results.iter().map(|(s, _)| *s).collect();
    assert_eq!(order, students);
    assert_eq!(results[0].1.as_ref().expect("graded"), &5);
    assert_eq!(results[1].1.as_ref().expect("graded"), &3);
    assert!(results[2].1.is_err());
    assert_eq!(results[3].1.as_ref().expect("graded"), &4);
}

#[test]
fn default_options_match_the_documented_defaults() {
    let options = BatchOptions::default();
    assert_eq!(options.concurrency, 4);
    assert_eq!(options.timeout, Duration::from_secs(60));
}

#[test]
fn configured_options_fall_back_to_the_defaults() {
    let options = BatchOptions::from_config().expect("defaults apply");
    assert_eq!(options, BatchOptions::default());
}
