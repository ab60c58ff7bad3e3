//! Engine module: intake primitives, timestamps, snapshot storage and the CLI front end

pub mod arg_parser;
pub mod db_ops;
pub mod handlers;
pub mod queue;
pub mod skip;
pub mod stability;
pub mod state;
pub mod timer;
pub mod timestamp;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use db_ops::{
    Snapshot, SnapshotInfo, load_snapshot, open_db, open_db_in_memory, save_snapshot,
};
pub use handlers::{handle_run, resolve_settings};
pub use queue::{EventQueue, dedup};
pub use skip::SkipSet;
pub use stability::{StableFileDetector, wait_until_stable};
pub use state::{IntakeState, SharedIntake, lock_intake, new_shared_intake};
pub use timer::BatchTimer;
pub use timestamp::{RecordingTime, end_timestamp, recording_time, timestamp_from_filename};
