//! Service traits injected into the mission controller
//!
//! The controller is generic over its link and clock so tests can drive it
//! with mocks or manual time while the binary wires the in-memory gossip bus
//! and a monotonic clock.

use async_trait::async_trait;
use shared::messages::GroundEvent;
use shared::types::{StatePacket, VehicleId};
use shared::SharedResult;

/// Vehicle-to-vehicle gossip plus the ground-station event stream.
///
/// Radio framing and byte layout live behind this seam; the controller only
/// ever deals in typed packets and events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Link: Send {
    /// Broadcast this vehicle's state packet to every peer
    async fn broadcast(&self, packet: StatePacket) -> SharedResult<()>;

    /// Unicast a packet to one peer
    async fn send(&self, peer: VehicleId, packet: StatePacket) -> SharedResult<()>;

    /// Drain every peer packet received since the last poll
    fn poll(&mut self) -> Vec<StatePacket>;

    /// Report a textual mission event to the ground station
    async fn send_event(&self, event: GroundEvent) -> SharedResult<()>;
}

/// Monotonic mission clock, seconds since controller start
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send {
    fn now(&self) -> f64;
}

/// Whether `period` seconds have passed since `since` at time `now`
pub fn elapsed_at_least(period: f64, since: f64, now: f64) -> bool {
    now - since >= period
}
