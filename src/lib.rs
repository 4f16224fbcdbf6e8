//! Loads song metadata and user activity logs into a songplays star schema.

pub mod config;
pub mod pipeline;
pub mod sqlite_persistence;
pub mod transform;
pub mod warehouse;
