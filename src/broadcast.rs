//! Room Broadcast Gateway - fan-out of transaction outcomes.
//!
//! Fire-and-forget from the coordinator's perspective: a publish failure is
//! logged and never rolls back a committed transaction. Room routing is
//! always a parameter; there is no hardcoded room id anywhere in the
//! publish path.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::core_types::{Identity, Level, RoomId};

/// Event published to room subscribers after a committed transaction.
///
/// Wire names are kept compatible with the existing client protocol:
/// `gift_received` for the room notification, `global_announcement` for the
/// cross-room super-gift banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RoomEvent {
    GiftReceived {
        sender: Identity,
        receiver: Identity,
        amount: u64,
        leveled_up: bool,
        new_receiver_level: Level,
    },
    GlobalAnnouncement {
        sender: Identity,
        receiver: Identity,
        amount: u64,
    },
}

/// Publish/subscribe fan-out of room events.
pub trait BroadcastGateway: Send + Sync {
    /// Publish to one room's subscribers. Fire-and-forget.
    fn publish(&self, room: &RoomId, event: RoomEvent);

    /// Publish to every room (super-gift announcements). Fire-and-forget.
    fn publish_global(&self, event: RoomEvent);
}

/// Default per-room channel capacity. Slow subscribers lag, they never
/// block the publisher.
const ROOM_CHANNEL_CAPACITY: usize = 256;

/// Tokio broadcast-channel based gateway.
///
/// One channel per room plus one global channel, registered lazily in a
/// DashMap for lock-free concurrent access.
pub struct RoomBroadcaster {
    rooms: DashMap<RoomId, broadcast::Sender<RoomEvent>>,
    global: broadcast::Sender<RoomEvent>,
}

impl RoomBroadcaster {
    pub fn new() -> Self {
        let (global, _) = broadcast::channel(ROOM_CHANNEL_CAPACITY);
        Self {
            rooms: DashMap::new(),
            global,
        }
    }

    /// Subscribe to one room's event stream, creating the room lazily.
    pub fn subscribe(&self, room: &RoomId) -> broadcast::Receiver<RoomEvent> {
        self.rooms
            .entry(room.clone())
            .or_insert_with(|| broadcast::channel(ROOM_CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Subscribe to the cross-room announcement stream.
    pub fn subscribe_global(&self) -> broadcast::Receiver<RoomEvent> {
        self.global.subscribe()
    }

    /// Number of rooms with a live channel.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

impl Default for RoomBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl BroadcastGateway for RoomBroadcaster {
    fn publish(&self, room: &RoomId, event: RoomEvent) {
        match self.rooms.get(room) {
            Some(tx) => {
                // send() only errs when there are zero receivers; that is a
                // normal empty-room condition, not a failure.
                if let Err(e) = tx.send(event) {
                    debug!(room = %room, "No subscribers for room event: {}", e);
                }
            }
            None => {
                debug!(room = %room, "Publish to unregistered room dropped");
            }
        }
    }

    fn publish_global(&self, event: RoomEvent) {
        if self.global.send(event).is_err() {
            warn!("Global announcement had no subscribers");
        }
    }
}
