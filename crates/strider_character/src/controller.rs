//! Horizontal movement driven through the event bus

use crate::events::{FacingChanged, PlayerMovementCompleted, PlayerMovementRequested};
use crate::facing::Facing;
use strider_core::{Id, Shared};
use strider_event::{Cancelable, EventBus};
use strider_scene::{Result, SceneError, SceneGraph};

/// Outcome of a movement step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Zero delta, nothing published
    Idle,
    /// A listener canceled the request
    Canceled,
    Moved,
}

/// Moves the player node and publishes the movement events
///
/// The scene lock is never held while an event is raised, so listeners are
/// free to lock the scene themselves.
#[derive(Debug)]
pub struct MovementController {
    player: Id,
    facing: Facing,
}

impl MovementController {
    pub fn new(player: Id, facing: Facing) -> Self {
        Self { player, facing }
    }

    pub fn player(&self) -> Id {
        self.player
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Try to move the player by `dx`.
    ///
    /// Raises [`PlayerMovementRequested`]; unless canceled, translates the
    /// player, raises [`FacingChanged`] if the direction of travel flipped,
    /// then raises [`PlayerMovementCompleted`].
    pub fn step<S: SceneGraph>(
        &mut self,
        bus: &mut EventBus,
        scene: &Shared<S>,
        dx: f32,
    ) -> Result<StepOutcome> {
        let Some(direction) = Facing::from_delta(dx) else {
            return Ok(StepOutcome::Idle);
        };

        let position = scene
            .lock()
            .local_position(self.player)
            .ok_or(SceneError::NodeNotFound(self.player))?;
        let target = position.translate(dx, 0.0);

        let mut request = PlayerMovementRequested::new(self.player, target);
        bus.raise(&mut request);
        if request.is_canceled() {
            log::trace!("Movement of {} to {:?} canceled", self.player, target);
            return Ok(StepOutcome::Canceled);
        }

        scene.lock().set_local_position(self.player, target)?;

        if direction != self.facing {
            self.facing = direction;
            log::debug!("{} now facing {:?}", self.player, direction);
            bus.raise(&mut FacingChanged::new(self.player, direction));
        }

        bus.raise(&mut PlayerMovementCompleted::new(self.player));
        Ok(StepOutcome::Moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{CharacterEvent, MovementRequested};
    use parking_lot::Mutex;
    use std::sync::Arc;
    use strider_core::shared;
    use strider_math::Vec2;
    use strider_scene::Scene;

    fn setup() -> (EventBus, Shared<Scene>, MovementController) {
        let mut scene = Scene::default();
        let player = scene.spawn("Player", None, Vec2::ZERO).unwrap();
        (
            EventBus::new(),
            shared(scene),
            MovementController::new(player, Facing::Right),
        )
    }

    #[test]
    fn test_step_moves_and_publishes() {
        let (mut bus, scene, mut controller) = setup();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bus.add_listener(move |e: &mut CharacterEvent| sink.lock().push(e.character));

        let outcome = controller.step(&mut bus, &scene, 0.5).unwrap();
        assert_eq!(outcome, StepOutcome::Moved);
        assert_eq!(
            scene.lock().local_position(controller.player()),
            Some(Vec2::new(0.5, 0.0))
        );
        // request + completion, no facing change
        assert_eq!(seen.lock().len(), 2);
    }

    #[test]
    fn test_canceled_request_does_not_move() {
        let (mut bus, scene, mut controller) = setup();
        bus.add_listener(|e: &mut MovementRequested| e.cancel());
        let completed = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&completed);
        bus.add_listener(move |_: &mut PlayerMovementCompleted| *sink.lock() += 1);

        let outcome = controller.step(&mut bus, &scene, -1.0).unwrap();
        assert_eq!(outcome, StepOutcome::Canceled);
        assert_eq!(scene.lock().local_position(controller.player()), Some(Vec2::ZERO));
        assert_eq!(controller.facing(), Facing::Right);
        assert_eq!(*completed.lock(), 0);
    }

    #[test]
    fn test_facing_flips_only_on_sign_change() {
        let (mut bus, scene, mut controller) = setup();
        let flips = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&flips);
        bus.add_listener(move |e: &mut FacingChanged| sink.lock().push(e.facing_right));

        controller.step(&mut bus, &scene, 1.0).unwrap();
        controller.step(&mut bus, &scene, -1.0).unwrap();
        controller.step(&mut bus, &scene, -1.0).unwrap();
        assert_eq!(controller.step(&mut bus, &scene, 0.0).unwrap(), StepOutcome::Idle);
        controller.step(&mut bus, &scene, 1.0).unwrap();

        assert_eq!(*flips.lock(), vec![false, true]);
    }

    #[test]
    fn test_listener_may_lock_scene() {
        let (mut bus, scene, mut controller) = setup();
        let player = controller.player();
        let observed = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&observed);
        let scene_view = Arc::clone(&scene);
        bus.add_listener(move |_: &mut PlayerMovementCompleted| {
            *sink.lock() = scene_view.lock().world_position(player);
        });

        controller.step(&mut bus, &scene, 2.0).unwrap();
        assert_eq!(*observed.lock(), Some(Vec2::new(2.0, 0.0)));
    }

    #[test]
    fn test_missing_player() {
        let mut bus = EventBus::new();
        let scene = shared(Scene::default());
        let mut controller = MovementController::new(Id::new(3, 0), Facing::Right);
        assert!(controller.step(&mut bus, &scene, 1.0).is_err());
    }
}
