//! # strider_character - Character Movement
//!
//! Movement-intent and facing events published on the bus, the controller
//! that publishes them, and a horizontal follower for the streaming host.

pub mod controller;
pub mod events;
pub mod facing;
pub mod follow;

pub use controller::{MovementController, StepOutcome};
pub use events::{
    CharacterEvent, FacingChanged, MovementCompleted, MovementRequested, PlayerMovementCompleted,
    PlayerMovementRequested,
};
pub use facing::Facing;
pub use follow::follow_player;

pub mod prelude {
    pub use crate::{
        CharacterEvent, Facing, FacingChanged, MovementController, PlayerMovementCompleted,
        PlayerMovementRequested, StepOutcome,
    };
}
