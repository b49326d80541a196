//! In-memory gossip bus standing in for the vehicle radio
//!
//! Every vehicle gets a `BusLink` endpoint on one shared broadcast channel;
//! mission events flow over a separate channel to the ground-station sink.
//! Wire framing and byte layout live outside this system's scope, so packets
//! cross the bus as typed values.

use crate::traits::Link;
use async_trait::async_trait;
use shared::messages::GroundEvent;
use shared::types::{StatePacket, VehicleId};
use shared::{SharedError, SharedResult};
use tokio::sync::broadcast;
use tokio::sync::mpsc;

const BUS_CAPACITY: usize = 256;

/// Shared medium connecting all vehicles and the ground station
pub struct GossipBus {
    packet_tx: broadcast::Sender<StatePacket>,
    event_tx: mpsc::UnboundedSender<GroundEvent>,
}

impl GossipBus {
    /// Create the bus; the returned receiver is the ground-station event feed
    pub fn new() -> (Self, mpsc::UnboundedReceiver<GroundEvent>) {
        let (packet_tx, _) = broadcast::channel(BUS_CAPACITY);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (Self { packet_tx, event_tx }, event_rx)
    }

    /// Attach one vehicle to the bus
    pub fn endpoint(&self, id: VehicleId) -> BusLink {
        BusLink {
            id,
            packet_tx: self.packet_tx.clone(),
            packet_rx: self.packet_tx.subscribe(),
            event_tx: self.event_tx.clone(),
        }
    }
}

/// One vehicle's attachment to the gossip bus
pub struct BusLink {
    id: VehicleId,
    packet_tx: broadcast::Sender<StatePacket>,
    packet_rx: broadcast::Receiver<StatePacket>,
    event_tx: mpsc::UnboundedSender<GroundEvent>,
}

#[async_trait]
impl Link for BusLink {
    async fn broadcast(&self, packet: StatePacket) -> SharedResult<()> {
        // Own subscription keeps the channel alive, so send cannot fail
        // while this endpoint exists
        self.packet_tx
            .send(packet)
            .map(|_| ())
            .map_err(|_| SharedError::LinkClosed {
                context: format!("broadcast from vehicle {}", self.id),
            })
    }

    async fn send(&self, _peer: VehicleId, packet: StatePacket) -> SharedResult<()> {
        // The shared medium is a broadcast radio; unicast rides the same
        // channel and peers filter on id
        self.broadcast(packet).await
    }

    fn poll(&mut self) -> Vec<StatePacket> {
        let mut packets = Vec::new();
        loop {
            match self.packet_rx.try_recv() {
                Ok(packet) => {
                    if packet.id != self.id {
                        packets.push(packet);
                    }
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(vehicle = self.id, skipped, "gossip bus lagged");
                }
                Err(_) => break,
            }
        }
        packets
    }

    async fn send_event(&self, event: GroundEvent) -> SharedResult<()> {
        self.event_tx
            .send(event)
            .map_err(|_| SharedError::LinkClosed {
                context: "ground-station sink".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::types::{Chromosome, VehicleClass};

    fn packet(id: VehicleId) -> StatePacket {
        StatePacket {
            id,
            class: VehicleClass::Combat,
            speed: 10.0,
            min_turn_radius: 20.0,
            position: [0.0, 0.0, 0.0],
            base: [0.0, 0.0, 0.0],
            lock: false,
            priority: 1.0,
            solution: Chromosome::default(),
            terminated: Vec::new(),
            discovered: Vec::new(),
        }
    }

    #[tokio::test]
    async fn peers_receive_broadcasts_but_not_their_own() {
        let (bus, _events) = GossipBus::new();
        let alpha = bus.endpoint(1);
        let mut bravo = bus.endpoint(2);

        alpha.broadcast(packet(1)).await.unwrap();
        alpha.broadcast(packet(1)).await.unwrap();

        let received = bravo.poll();
        assert_eq!(received.len(), 2);
        assert!(received.iter().all(|p| p.id == 1));

        let mut alpha = alpha;
        assert!(alpha.poll().is_empty());
    }

    #[tokio::test]
    async fn events_reach_the_ground_station() {
        let (bus, mut events) = GossipBus::new();
        let link = bus.endpoint(1);
        link.send_event(GroundEvent {
            at: 1.0,
            event: shared::messages::MissionEvent::MissionComplete { vehicle: 1 },
        })
        .await
        .unwrap();
        assert!(events.try_recv().is_ok());
    }
}
