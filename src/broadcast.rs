// Vendor-neutral fan-out for live draft-room updates.
//
// Messages are invalidate-and-refetch signals only: the store is the sole
// source of truth for pick data, and callers publish strictly after a
// successful persistent write. A subscriber that misses a message (lagged
// channel, late join) loses nothing it can't recover by refetching.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::warn;

/// A notification to other draft-room participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DraftMessage {
    /// A pick slot was filled (or a race loser should refresh).
    PickMade {
        draft_id: i64,
        pick_id: i64,
        overall: u32,
    },
    /// Keeper rows changed for the draft; derived views are stale.
    KeepersChanged { draft_id: i64 },
    /// The pick list was regenerated; all cached picks are stale.
    OrderRegenerated { draft_id: i64 },
}

/// Publish side of the draft-room channel, decoupled from any vendor.
#[async_trait]
pub trait Broadcast: Send + Sync {
    async fn publish(&self, topic: &str, message: DraftMessage) -> anyhow::Result<()>;
}

/// In-process implementation over per-topic tokio broadcast channels.
/// Topics are created lazily on first publish or subscribe.
pub struct ChannelBroadcast {
    topics: Mutex<HashMap<String, broadcast::Sender<DraftMessage>>>,
    capacity: usize,
}

impl ChannelBroadcast {
    pub fn new(capacity: usize) -> Self {
        ChannelBroadcast {
            topics: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    /// Subscribe to a topic. Only messages published after this call are
    /// delivered; earlier state comes from the store.
    pub fn subscribe(&self, topic: &str) -> broadcast::Receiver<DraftMessage> {
        self.sender(topic).subscribe()
    }

    fn sender(&self, topic: &str) -> broadcast::Sender<DraftMessage> {
        let mut topics = self.topics.lock().expect("broadcast topic map poisoned");
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }
}

#[async_trait]
impl Broadcast for ChannelBroadcast {
    async fn publish(&self, topic: &str, message: DraftMessage) -> anyhow::Result<()> {
        let sender = self.sender(topic);
        // No subscribers is fine: the message only exists to wake listeners.
        if sender.send(message).is_err() {
            warn!("published to topic '{topic}' with no subscribers");
        }
        Ok(())
    }
}

/// Conventional topic name for a draft's room.
pub fn draft_topic(draft_id: i64) -> String {
    format!("draft:{draft_id}")
}
