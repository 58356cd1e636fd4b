//! CLI command implementations for the `onpage` binary.

pub mod analyze_cmd;
pub mod output;
pub mod progress;
