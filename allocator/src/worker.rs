//! Worker loop driving the assignment search over its two channels
//!
//! Protocol (one controller on the far end of both channels):
//! - block once at startup for the initial roster;
//! - run the search for a fixed time slice, publish the best candidate;
//! - non-blocking poll for a newer roster, reseeding when one arrived;
//! - exit cleanly on `AllocatorCommand::Shutdown`.
//!
//! No retries anywhere: a malformed roster fails the worker fast, and the
//! controller disappearing mid-mission is a fatal configuration error.

use crate::error::{AllocatorError, AllocatorResult};
use crate::search::{SeadSearch, SearchConfig};
use shared::messages::{AllocatorCommand, Candidate};
use shared::types::Target;
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// Run the allocation worker until shutdown.
///
/// Intended for `tokio::task::spawn_blocking`: the search slices are pure CPU
/// work and the only blocking receive happens before the first slice.
pub fn run_worker(
    target_sites: Vec<Target>,
    time_slice: Duration,
    config: SearchConfig,
    update_tx: UnboundedSender<Candidate>,
    mut command_rx: UnboundedReceiver<AllocatorCommand>,
) -> AllocatorResult<()> {
    let mut search = SeadSearch::new(target_sites, config);

    // Block once, at startup, for the initial roster
    let mut roster = match command_rx.blocking_recv() {
        Some(AllocatorCommand::Roster(roster)) => roster,
        Some(AllocatorCommand::Shutdown) | None => {
            debug!("allocator shut down before the first roster");
            return Ok(());
        }
    };

    let mut reseed = true;
    loop {
        let candidate = search.solve(time_slice, &roster, reseed)?;
        update_tx
            .send(candidate)
            .map_err(|_| AllocatorError::ChannelClosed { channel: "update" })?;

        // Consume at most the newest pending command; keep refining the
        // current population when nothing arrived
        match command_rx.try_recv() {
            Ok(AllocatorCommand::Roster(next)) => {
                roster = next;
                reseed = true;
            }
            Ok(AllocatorCommand::Shutdown) => {
                debug!("allocator received shutdown");
                break;
            }
            Err(TryRecvError::Empty) => reseed = false,
            Err(TryRecvError::Disconnected) => {
                return Err(AllocatorError::ChannelClosed { channel: "command" })
            }
        }
    }
    Ok(())
}
