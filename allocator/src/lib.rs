//! Background task-allocation worker for the SEAD swarm
//!
//! Runs an isolated, warm-startable assignment search that talks to its
//! mission controller exclusively through two unbounded channels: rosters in,
//! (fitness, solution) candidates out. The controller spawns `run_worker` on
//! a blocking task; nothing in here shares memory with the control loop.

pub mod error;
pub mod search;
pub mod worker;

pub use error::{AllocatorError, AllocatorResult};
pub use search::{SearchConfig, SeadSearch};
pub use worker::run_worker;
