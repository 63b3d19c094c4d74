//! Scheduler tests, organized by feature area.

mod helpers;

mod nesting_tests;
