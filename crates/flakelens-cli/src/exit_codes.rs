//! Process exit codes. Part of the CLI contract.

pub const SUCCESS: i32 = 0;
pub const FLAKY_DETECTED: i32 = 1; // Only with --fail-on-flaky
pub const CONFIG_ERROR: i32 = 2; // Missing/invalid report, events or thresholds
