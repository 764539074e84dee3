//! # strider_event - Event Bus
//!
//! Typed publish/subscribe with:
//! - Hierarchical dispatch: an event is delivered to listeners of its own
//!   type, then of each base type it embeds, most specific first
//! - Stop-propagation and cancelable events
//! - One-shot listeners
//! - Permanent registrations that survive [`EventBus::cleanup`]
//! - A FIFO queue drained once per tick, optionally time-budgeted
//!
//! # Example
//!
//! ```
//! use strider_event::{impl_event, EventBus, EventHeader};
//!
//! #[derive(Default)]
//! struct Landed { header: EventHeader }
//! impl_event!(Landed);
//!
//! let mut bus = EventBus::new();
//! bus.add_listener(|_: &mut Landed| log::info!("landed"));
//! bus.raise(&mut Landed::default());
//! ```
//!
//! The bus is an explicit value. Whoever owns the scene owns the bus and
//! passes it by reference to the components that publish or subscribe.

pub mod bus;
pub mod config;
pub mod event;

pub use bus::{EventBus, EventSender, ListenerId};
pub use config::BusConfig;
pub use event::{AsAny, Cancelable, Event, EventHeader};

/// Prelude
pub mod prelude {
    pub use crate::impl_event;
    pub use crate::{
        BusConfig, Cancelable, Event, EventBus, EventHeader, EventSender, ListenerId,
    };
}
