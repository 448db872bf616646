//! Topic-based event bus for battle events.
//!
//! Battle events drained from the manager after every step are published to
//! a topic, and consumers subscribe only to the topics they need.

mod bus;

pub use bus::{Event, EventBus, Topic};
