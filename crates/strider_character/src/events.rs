//! Character events
//!
//! ```text
//! CharacterEvent
//! ├── MovementRequested (cancelable)
//! │   └── PlayerMovementRequested
//! ├── MovementCompleted
//! │   └── PlayerMovementCompleted
//! └── FacingChanged
//! ```
//!
//! A listener on [`CharacterEvent`] observes every one of them.

use crate::facing::Facing;
use strider_core::Id;
use strider_event::{impl_event, Cancelable, EventHeader};
use strider_math::Vec2;

/// Base for everything a character publishes
#[derive(Debug, Clone)]
pub struct CharacterEvent {
    header: EventHeader,
    /// The character node that generated the event
    pub character: Id,
}
impl_event!(CharacterEvent);

impl CharacterEvent {
    pub fn new(character: Id) -> Self {
        Self {
            header: EventHeader::default(),
            character,
        }
    }
}

/// Published before a position change is committed
#[derive(Debug, Clone)]
pub struct MovementRequested {
    pub base: CharacterEvent,
    /// Where the character is about to move to
    pub destination: Vec2,
    canceled: bool,
}
impl_event!(MovementRequested => base);

impl MovementRequested {
    pub fn new(character: Id, destination: Vec2) -> Self {
        Self {
            base: CharacterEvent::new(character),
            destination,
            canceled: false,
        }
    }
}

impl Cancelable for MovementRequested {
    fn is_canceled(&self) -> bool {
        self.canceled
    }

    fn set_canceled(&mut self, canceled: bool) {
        self.canceled = canceled;
    }
}

#[derive(Debug, Clone)]
pub struct PlayerMovementRequested {
    pub base: MovementRequested,
}
impl_event!(PlayerMovementRequested => base);

impl PlayerMovementRequested {
    pub fn new(player: Id, destination: Vec2) -> Self {
        Self {
            base: MovementRequested::new(player, destination),
        }
    }

    pub fn destination(&self) -> Vec2 {
        self.base.destination
    }
}

impl Cancelable for PlayerMovementRequested {
    fn is_canceled(&self) -> bool {
        self.base.is_canceled()
    }

    fn set_canceled(&mut self, canceled: bool) {
        self.base.set_canceled(canceled);
    }
}

/// Published after a position change was committed
#[derive(Debug, Clone)]
pub struct MovementCompleted {
    pub base: CharacterEvent,
}
impl_event!(MovementCompleted => base);

impl MovementCompleted {
    pub fn new(character: Id) -> Self {
        Self {
            base: CharacterEvent::new(character),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlayerMovementCompleted {
    pub base: MovementCompleted,
}
impl_event!(PlayerMovementCompleted => base);

impl PlayerMovementCompleted {
    pub fn new(player: Id) -> Self {
        Self {
            base: MovementCompleted::new(player),
        }
    }

    pub fn player(&self) -> Id {
        self.base.base.character
    }
}

/// Published whenever the direction of travel flips
#[derive(Debug, Clone)]
pub struct FacingChanged {
    pub base: CharacterEvent,
    pub facing_right: bool,
}
impl_event!(FacingChanged => base);

impl FacingChanged {
    pub fn new(character: Id, facing: Facing) -> Self {
        Self {
            base: CharacterEvent::new(character),
            facing_right: facing.is_right(),
        }
    }

    pub fn facing(&self) -> Facing {
        Facing::from_right(self.facing_right)
    }
}
