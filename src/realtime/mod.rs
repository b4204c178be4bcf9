pub mod hub;

pub use hub::{BroadcastHub, HubError, HubHandle, SubscriberId, Subscription};
