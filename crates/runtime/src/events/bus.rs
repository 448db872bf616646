//! Topic-based event bus implementation.

use std::collections::HashMap;

use battle_core::{BattleEvent, Tick};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Session lifecycle: start, finish, tier upgrades
    Session,
    /// Agents joining or leaving a session
    Membership,
    /// Signals addressed to the observing agent
    Observer,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Session, Topic::Membership, Topic::Observer];

    pub fn of(event: &BattleEvent) -> Self {
        match event {
            BattleEvent::BattleStarted { .. }
            | BattleEvent::BattleFinished { .. }
            | BattleEvent::BattleLevelUpgraded { .. } => Topic::Session,
            BattleEvent::CharacterJoinBattle { .. } | BattleEvent::CharacterExitBattle { .. } => {
                Topic::Membership
            }
            BattleEvent::ObserverKillEnemy { .. } => Topic::Observer,
        }
    }
}

/// A battle event stamped with the step that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub tick: Tick,
    pub battle: BattleEvent,
}

impl Event {
    pub fn new(tick: Tick, battle: BattleEvent) -> Self {
        Self { tick, battle }
    }

    pub fn topic(&self) -> Topic {
        Topic::of(&self.battle)
    }

    /// JSON form used by external log sinks.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Topic-based event bus
///
/// Every topic has its own broadcast channel, created up front. Publishing
/// is best-effort: events sent while a topic has no subscribers are dropped.
#[derive(Clone)]
pub struct EventBus {
    session: broadcast::Sender<Event>,
    membership: broadcast::Sender<Event>,
    observer: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            session: broadcast::channel(capacity).0,
            membership: broadcast::channel(capacity).0,
            observer: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Session => &self.session,
            Topic::Membership => &self.membership,
            Topic::Observer => &self.observer,
        }
    }

    /// Publish an event to its corresponding topic.
    ///
    /// Returns the number of subscribers that received it.
    pub fn publish(&self, event: Event) -> usize {
        let topic = event.topic();
        match self.sender(topic).send(event) {
            Ok(receivers) => receivers,
            Err(_) => {
                // No subscribers for this topic - this is normal, not an error
                tracing::trace!("No subscribers for topic {:?}", topic);
                0
            }
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.sender(topic).receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
