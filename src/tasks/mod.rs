//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside a pool.
//!
//! # Tasks
//! - Purge: Removes expired records at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
