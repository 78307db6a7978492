//! Fire-and-forget exploration progress events
//!
//! The planners publish every expanded state for external visualization.
//! Publishing must never stall the search: the channel is bounded, a full
//! buffer or an absent/disconnected subscriber simply drops the event.

use std::sync::mpsc::{sync_channel, Receiver, SyncSender};

use crate::common::VehicleState;

/// Default bound on buffered progress events
pub const DEFAULT_PROGRESS_CAPACITY: usize = 1024;

/// Single-producer publish side of the exploration-progress stream.
///
/// At most one subscriber is active; subscribing again replaces the
/// previous stream.
#[derive(Debug)]
pub struct ProgressPublisher {
    sender: Option<SyncSender<VehicleState>>,
    capacity: usize,
}

impl ProgressPublisher {
    pub fn new(capacity: usize) -> Self {
        Self {
            sender: None,
            capacity: capacity.max(1),
        }
    }

    /// Open a fresh subscription, replacing any previous one
    pub fn subscribe(&mut self) -> Receiver<VehicleState> {
        let (tx, rx) = sync_channel(self.capacity);
        self.sender = Some(tx);
        rx
    }

    /// Publish one expanded state; drops the event when nobody listens or
    /// the buffer is full
    pub fn publish(&self, state: &VehicleState) {
        if let Some(sender) = &self.sender {
            let _ = sender.try_send(*state);
        }
    }
}

impl Default for ProgressPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_CAPACITY)
    }
}
