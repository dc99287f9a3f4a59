//! A Tokio-based bounded-concurrency task group: it runs independent
//! subtasks belonging to one logical operation, caps how many execute at
//! once, cancels siblings on the first failure, and reports that failure
//! (or success) once every admitted subtask has finished.

mod barrier;
mod error;
mod group;
mod slot;

pub use error::GroupError;
pub use group::LimitGroup;
