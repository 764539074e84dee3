//! The event bus

use crate::config::BusConfig;
use crate::event::Event;
use parking_lot::Mutex;
use std::any::{Any, TypeId};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;

/// Type-erased listener. Receives the `Any` view of one level of the event
/// chain and downcasts to the type it was registered for.
type ErasedHandler = Box<dyn FnMut(&mut dyn Any) + Send>;

/// Pending events awaiting the next [`EventBus::process_queue`]
type EventQueue = Arc<Mutex<VecDeque<Box<dyn Event>>>>;

/// Token returned on registration, used to remove a single listener
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

struct Listener {
    id: ListenerId,
    /// Removed by the dispatch loop right after its first invocation
    once: bool,
    handler: ErasedHandler,
}

/// Handle for enqueuing events from places that cannot borrow the bus,
/// most notably from inside a listener.
#[derive(Clone)]
pub struct EventSender {
    queue: EventQueue,
}

impl EventSender {
    /// Append an event to the bus queue. Always succeeds.
    pub fn enqueue<E: Event>(&self, event: E) -> bool {
        log::trace!("Enqueuing event {}", event.event_name());
        self.queue.lock().push_back(Box::new(event));
        true
    }
}

/// Event bus for publishing and subscribing to events
///
/// Listeners for a type live in exactly one of two tables: the normal one,
/// emptied by [`cleanup`](Self::cleanup), or the permanent one, which only
/// [`shutdown`](Self::shutdown) empties.
pub struct EventBus {
    listeners: HashMap<TypeId, Vec<Listener>>,
    permanent: HashMap<TypeId, Vec<Listener>>,
    type_names: HashMap<TypeId, &'static str>,
    queue: EventQueue,
    config: BusConfig,
    next_listener_id: u64,
}

impl EventBus {
    /// Create a new bus with unlimited queue processing
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    pub fn with_config(config: BusConfig) -> Self {
        Self {
            listeners: HashMap::new(),
            permanent: HashMap::new(),
            type_names: HashMap::new(),
            queue: Arc::new(Mutex::new(VecDeque::new())),
            config,
            next_listener_id: 1,
        }
    }

    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: BusConfig) {
        self.config = config;
    }

    /// Register a listener for `E` and every event type that embeds `E`
    pub fn add_listener<E, F>(&mut self, handler: F) -> ListenerId
    where
        E: Event,
        F: FnMut(&mut E) + Send + 'static,
    {
        self.register::<E, F>(handler, false)
    }

    /// Register a listener removed automatically after its first invocation
    pub fn add_listener_once<E, F>(&mut self, handler: F) -> ListenerId
    where
        E: Event,
        F: FnMut(&mut E) + Send + 'static,
    {
        self.register::<E, F>(handler, true)
    }

    fn register<E, F>(&mut self, mut handler: F, once: bool) -> ListenerId
    where
        E: Event,
        F: FnMut(&mut E) + Send + 'static,
    {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;

        let type_id = TypeId::of::<E>();
        let type_name = std::any::type_name::<E>();
        self.type_names.insert(type_id, type_name);
        log::trace!("Adding listener {:?} for {}", id, type_name);

        let wrapped: ErasedHandler = Box::new(move |any: &mut dyn Any| {
            if let Some(event) = any.downcast_mut::<E>() {
                handler(event);
            }
        });
        let listener = Listener {
            id,
            once,
            handler: wrapped,
        };

        // A type marked permanent keeps receiving its registrations there
        if let Some(permanent) = self.permanent.get_mut(&type_id) {
            permanent.push(listener);
        } else {
            self.listeners.entry(type_id).or_default().push(listener);
        }

        id
    }

    /// Remove one listener of `E`. Unknown ids are ignored.
    pub fn remove_listener<E: Event>(&mut self, id: ListenerId) {
        let type_id = TypeId::of::<E>();
        log::trace!("Removing listener {:?} for {}", id, std::any::type_name::<E>());

        if let Some(permanent) = self.permanent.get_mut(&type_id) {
            permanent.retain(|l| l.id != id);
        } else if let Some(listeners) = self.listeners.get_mut(&type_id) {
            listeners.retain(|l| l.id != id);
            if listeners.is_empty() {
                self.listeners.remove(&type_id);
            }
        }
    }

    /// Remove every listener of `E`. A permanent type stays permanent.
    pub fn clear_listeners<E: Event>(&mut self) {
        let type_id = TypeId::of::<E>();
        log::trace!("Clearing listeners for {}", std::any::type_name::<E>());

        if let Some(permanent) = self.permanent.get_mut(&type_id) {
            permanent.clear();
        } else {
            self.listeners.remove(&type_id);
        }
    }

    /// Whether at least one listener is registered for exactly `E`
    pub fn has_listener<E: Event>(&self) -> bool {
        self.listener_count::<E>() > 0
    }

    /// Number of listeners registered for exactly `E`
    pub fn listener_count<E: Event>(&self) -> usize {
        let type_id = TypeId::of::<E>();
        self.permanent
            .get(&type_id)
            .or_else(|| self.listeners.get(&type_id))
            .map_or(0, Vec::len)
    }

    /// Move current and future listeners of `E` out of reach of `cleanup`
    pub fn mark_permanent<E: Event>(&mut self) {
        let type_id = TypeId::of::<E>();
        log::trace!("Marking {} as permanent", std::any::type_name::<E>());

        if self.permanent.contains_key(&type_id) {
            return;
        }
        self.type_names
            .insert(type_id, std::any::type_name::<E>());
        let existing = self.listeners.remove(&type_id).unwrap_or_default();
        self.permanent.insert(type_id, existing);
    }

    /// Drop every non-permanent listener and the pending queue.
    /// Call on scene transitions.
    pub fn cleanup(&mut self) {
        log::debug!(
            "Bus cleanup: dropping {} listener type(s) and {} queued event(s)",
            self.listeners.len(),
            self.pending_count()
        );
        self.listeners.clear();
        self.queue.lock().clear();
    }

    /// Drop everything, permanent registrations included
    pub fn shutdown(&mut self) {
        self.cleanup();
        self.permanent.clear();
        self.type_names.clear();
    }

    /// Dispatch synchronously.
    ///
    /// Listeners of the event's own type run first, then those of each
    /// embedded base type. If any listener stops propagation, the levels
    /// above the current one are skipped. A level with no listeners is
    /// simply passed over. Raising an event nobody listens to is a no-op.
    pub fn raise<E: Event>(&mut self, event: &mut E) {
        self.dispatch(event);
    }

    fn dispatch(&mut self, event: &mut (dyn Event + 'static)) {
        let mut level: &mut (dyn Event + 'static) = event;
        loop {
            log::trace!("Raising {}", level.event_name());
            let type_id = (*level).as_any().type_id();
            self.invoke(type_id, (*level).as_any_mut());

            if level.is_propagation_stopped() {
                break;
            }
            match level.parent_mut() {
                Some(parent) => level = parent,
                None => break,
            }
        }
    }

    fn invoke(&mut self, type_id: TypeId, event: &mut dyn Any) {
        let is_permanent = self.permanent.contains_key(&type_id);
        let slot = if is_permanent {
            self.permanent.get_mut(&type_id)
        } else {
            self.listeners.get_mut(&type_id)
        };
        let Some(listeners) = slot else {
            return;
        };

        let mut any_once = false;
        for listener in listeners.iter_mut() {
            (listener.handler)(event);
            any_once |= listener.once;
        }
        if !any_once {
            return;
        }

        listeners.retain(|l| !l.once);
        if !is_permanent && listeners.is_empty() {
            self.listeners.remove(&type_id);
        }
    }

    /// Append an event to the queue for a later [`process_queue`](Self::process_queue)
    pub fn enqueue<E: Event>(&self, event: E) -> bool {
        self.sender().enqueue(event)
    }

    /// A cloneable handle that enqueues onto this bus
    pub fn sender(&self) -> EventSender {
        EventSender {
            queue: Arc::clone(&self.queue),
        }
    }

    /// Drain the queue in FIFO order. Call once per tick.
    ///
    /// With a budget configured, draining stops after the first event
    /// dispatched past the budget; the rest wait, in order, for the next
    /// tick. Returns the number of events dispatched.
    pub fn process_queue(&mut self) -> usize {
        let budget = self.config.budget();
        let started = Instant::now();
        let mut dispatched = 0;

        loop {
            // The lock is released before dispatch so listeners can enqueue
            let next = self.queue.lock().pop_front();
            let Some(mut event) = next else {
                break;
            };
            self.dispatch(&mut *event);
            dispatched += 1;

            if let Some(budget) = budget {
                if started.elapsed() >= budget {
                    break;
                }
            }
        }

        dispatched
    }

    pub fn pending_count(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.lock().is_empty()
    }

    /// Log both registries at debug level
    pub fn log_event_table(&self) {
        let name = |type_id: &TypeId| self.type_names.get(type_id).copied().unwrap_or("?");

        log::debug!("=== Event table (permanent) ===");
        for (type_id, listeners) in &self.permanent {
            log::debug!("{}\t{} listener(s)", name(type_id), listeners.len());
        }
        log::debug!("=== Event table ===");
        for (type_id, listeners) in &self.listeners {
            log::debug!("{}\t{} listener(s)", name(type_id), listeners.len());
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
