pub mod bus;
pub mod lifecycle;

pub use bus::{FnListener, Listener, NotificationBus, SubscriptionId};
pub use lifecycle::{DeathRegistry, LifecycleEvent, LifecycleEventHub, OwnedEvent};
