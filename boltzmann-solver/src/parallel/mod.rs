//! # Parallel
//!
//! Static work partitioning and the collective reduction used by every distributed step
//! of the solver.

mod partition;
mod team;

pub use partition::Partition;
pub use team::{Published, WorkerTeam};
