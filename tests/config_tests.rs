use chrono::{TimeZone, Utc};
use gradebook::{batch::BatchOptions, capping::TimeCappedSelector};

#[test]
fn malformed_settings_are_reported_as_errors() {
    // Only test of this binary: nothing else reads the environment meanwhile.
    unsafe { std::env::set_var("GRADEBOOK_PENALTY_WINDOW_SECS", "abc") };

    let deadline = Utc
        .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("valid date");
    let err = TimeCappedSelector::from_config(deadline).expect_err("window is not a number");
    assert!(format!("{err:#}").contains("GRADEBOOK_PENALTY_WINDOW_SECS"));
    assert!(BatchOptions::from_config().is_err());
}
