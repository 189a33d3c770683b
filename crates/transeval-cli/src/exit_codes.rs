//! Process exit codes. Per-record failures never change the exit status.

pub const SUCCESS: i32 = 0;
pub const CONFIG_ERROR: i32 = 2; // Missing credential, unreadable store, bad arguments
