//! Sensor contacts with enter/exit tracking

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strider_core::Id;

/// Type of contact event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactKind {
    /// A solid collider started overlapping the sensor
    Enter,
    /// A previously overlapping collider no longer overlaps
    Exit,
}

/// A contact between a sensor and a solid collider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub kind: ContactKind,
    /// The node carrying the sensor
    pub sensor: Id,
    /// The node carrying the solid collider
    pub other: Id,
}

impl Contact {
    pub fn enter(sensor: Id, other: Id) -> Self {
        Self {
            kind: ContactKind::Enter,
            sensor,
            other,
        }
    }

    pub fn exit(sensor: Id, other: Id) -> Self {
        Self {
            kind: ContactKind::Exit,
            sensor,
            other,
        }
    }

    pub fn is_enter(&self) -> bool {
        self.kind == ContactKind::Enter
    }

    pub fn is_exit(&self) -> bool {
        self.kind == ContactKind::Exit
    }
}

/// Remembers which pairs overlapped on the previous pass
#[derive(Debug, Default)]
pub struct ContactTracker {
    overlapping: HashSet<(Id, Id)>,
}

impl ContactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff the current overlaps against the previous pass.
    ///
    /// Pairs absent from `current` exit, including pairs whose sensor was
    /// disabled or removed, so re-enabling a sensor over a collider enters
    /// again.
    pub fn update(&mut self, current: HashSet<(Id, Id)>) -> Vec<Contact> {
        let mut contacts = Vec::new();

        let mut exited: Vec<_> = self.overlapping.difference(&current).copied().collect();
        exited.sort();
        contacts.extend(exited.into_iter().map(|(s, o)| Contact::exit(s, o)));

        let mut entered: Vec<_> = current.difference(&self.overlapping).copied().collect();
        entered.sort();
        contacts.extend(entered.into_iter().map(|(s, o)| Contact::enter(s, o)));

        self.overlapping = current;
        contacts
    }

    pub fn is_overlapping(&self, sensor: Id, other: Id) -> bool {
        self.overlapping.contains(&(sensor, other))
    }
}
