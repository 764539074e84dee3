//! Event trait and the base-type chain
//!
//! Rust has no struct inheritance, so an event "derives" from another by
//! embedding it as a field and exposing it through [`Event::parent_mut`].
//! The root of every chain holds the [`EventHeader`]; derived events forward
//! `header()` to their base, so a stop-propagation set on any view is seen
//! by the whole chain.

use std::any::Any;

/// State shared by every event regardless of type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventHeader {
    stop_propagation: bool,
}

/// Object-safe access to `Any` for event trait objects
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Trait for events
///
/// Implement with [`impl_event!`](crate::impl_event) rather than by hand.
pub trait Event: AsAny + Send + Sync {
    /// The shared header at the root of this event's chain
    fn header(&self) -> &EventHeader;

    fn header_mut(&mut self) -> &mut EventHeader;

    /// The embedded base-type view, `None` for events with no base type
    fn parent(&self) -> Option<&(dyn Event + 'static)> {
        None
    }

    fn parent_mut(&mut self) -> Option<&mut (dyn Event + 'static)> {
        None
    }

    /// Short type name, used in logs
    fn event_name(&self) -> &'static str;

    /// Halt dispatch to base-type listeners once the current level finishes
    fn stop_propagation(&mut self) {
        self.header_mut().stop_propagation = true;
    }

    fn is_propagation_stopped(&self) -> bool {
        self.header().stop_propagation
    }

    /// Names from this type up to the root, most specific first
    fn lineage(&self) -> Vec<&'static str> {
        let mut names = vec![self.event_name()];
        let mut current = self.parent();
        while let Some(level) = current {
            names.push(level.event_name());
            current = level.parent();
        }
        names
    }
}

/// Events a listener may veto before the publisher commits to them
pub trait Cancelable {
    fn is_canceled(&self) -> bool;

    fn set_canceled(&mut self, canceled: bool);

    fn cancel(&mut self) {
        self.set_canceled(true);
    }
}

/// Implement [`Event`] for a struct.
///
/// `impl_event!(Root)` for an event with no base type; the struct must have
/// a `header: EventHeader` field.
///
/// `impl_event!(Derived => base)` for an event embedding its base type in
/// the field `base`.
#[macro_export]
macro_rules! impl_event {
    ($ty:ty) => {
        impl $crate::Event for $ty {
            fn header(&self) -> &$crate::EventHeader {
                &self.header
            }

            fn header_mut(&mut self) -> &mut $crate::EventHeader {
                &mut self.header
            }

            fn event_name(&self) -> &'static str {
                stringify!($ty)
            }
        }
    };
    ($ty:ty => $base:ident) => {
        impl $crate::Event for $ty {
            fn header(&self) -> &$crate::EventHeader {
                $crate::Event::header(&self.$base)
            }

            fn header_mut(&mut self) -> &mut $crate::EventHeader {
                $crate::Event::header_mut(&mut self.$base)
            }

            fn parent(&self) -> Option<&(dyn $crate::Event + 'static)> {
                Some(&self.$base)
            }

            fn parent_mut(&mut self) -> Option<&mut (dyn $crate::Event + 'static)> {
                Some(&mut self.$base)
            }

            fn event_name(&self) -> &'static str {
                stringify!($ty)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Base {
        header: EventHeader,
    }
    impl_event!(Base);

    #[derive(Default)]
    struct Derived {
        base: Base,
    }
    impl_event!(Derived => base);

    #[test]
    fn test_header_is_shared_along_the_chain() {
        let mut event = Derived::default();
        assert!(!event.is_propagation_stopped());

        event.parent_mut().unwrap().stop_propagation();
        assert!(event.is_propagation_stopped());
        assert!(event.base.is_propagation_stopped());
    }

    #[test]
    fn test_lineage() {
        let event = Derived::default();
        assert_eq!(event.lineage(), vec!["Derived", "Base"]);
        assert_eq!(Base::default().lineage(), vec!["Base"]);
    }
}
