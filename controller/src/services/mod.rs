//! Concrete service implementations wired by the simulation binary

pub mod clock;
pub mod link;

pub use clock::{ManualClock, MonotonicClock};
pub use link::{BusLink, GossipBus};
