pub mod common;
pub mod completions;
pub mod config_cmd;
pub mod records;
pub mod stats;
pub mod sync_cmd;
pub mod transfer;
pub mod watch;
