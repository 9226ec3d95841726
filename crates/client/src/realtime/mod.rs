mod channel;
mod protocol;
mod subscriptions;

pub use channel::{CloseHook, EventSink, PushConnection, PushConnector, SocketIoConnector};
pub use protocol::{EnginePacket, SCORE_UPDATE_EVENT, SocketPacket};
pub use subscriptions::{Subscription, SubscriptionManager};

#[cfg(test)]
pub(crate) use subscriptions::testing;
