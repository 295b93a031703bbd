//! Tests for DayGrid and clock label parsing

use station_udf_core_rs::{slot_from_clock, DayGrid, GridError, TIME_SLOTS};

#[test]
fn test_half_hour_grid() {
    let grid = DayGrid::new(30.0).unwrap();
    assert_eq!(grid.steps_per_day(), 48);

    // One step per slot
    for step in 0..grid.steps_per_day() {
        assert_eq!(grid.slot_of_step(step), step);
    }
}

#[test]
fn test_fine_grid_reuses_slots() {
    let grid = DayGrid::new(10.0).unwrap();
    assert_eq!(grid.steps_per_day(), 144);

    // Three 10-minute steps per half-hour slot
    assert_eq!(grid.slot_of_step(0), 0);
    assert_eq!(grid.slot_of_step(2), 0);
    assert_eq!(grid.slot_of_step(3), 1);
    assert_eq!(grid.slot_of_step(143), 47);
}

#[test]
fn test_coarse_grid_skips_slots() {
    let grid = DayGrid::new(60.0).unwrap();
    assert_eq!(grid.steps_per_day(), 24);

    assert_eq!(grid.slot_of_step(1), 2);
    assert_eq!(grid.slot_of_step(23), 46);
}

#[test]
fn test_slot_wraps_past_end_of_day() {
    let grid = DayGrid::new(30.0).unwrap();
    assert_eq!(grid.slot_of_step(TIME_SLOTS), 0);
    assert_eq!(grid.slot_of_step(TIME_SLOTS + 5), 5);
}

#[test]
fn test_step_longer_than_day() {
    let grid = DayGrid::new(2000.0).unwrap();
    assert_eq!(grid.steps_per_day(), 1);
    assert_eq!(grid.slot_of_step(0), 0);
}

#[test]
fn test_invalid_step_length() {
    assert_eq!(DayGrid::new(-30.0), Err(GridError::InvalidStepLength(-30.0)));
}

#[test]
fn test_clock_labels() {
    assert_eq!(slot_from_clock("00:29"), Some(0));
    assert_eq!(slot_from_clock("00:30"), Some(1));
    assert_eq!(slot_from_clock("12:00"), Some(24));
    assert_eq!(slot_from_clock(" 23:30 "), Some(47));

    assert_eq!(slot_from_clock("24:00"), None);
    assert_eq!(slot_from_clock("12:60"), None);
    assert_eq!(slot_from_clock("noon"), None);
    assert_eq!(slot_from_clock("12"), None);
}
