//! Statistics recording for protection events.

pub mod log;

pub use log::{
    create_shared_log_with_persistence, ProtectionLog, ProtectionStats, SharedProtectionLog,
};
