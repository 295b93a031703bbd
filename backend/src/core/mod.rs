//! Core primitives shared by the engine and the batch layer

pub mod time;

pub use time::{slot_from_clock, DayGrid, GridError, MINUTES_PER_DAY, SLOT_MINUTES, TIME_SLOTS};
