//! Keep a node horizontally aligned with the player

use crate::events::PlayerMovementCompleted;
use strider_core::{Id, Shared};
use strider_event::{EventBus, ListenerId};
use strider_scene::SceneGraph;

/// Snap `follower`'s world x to the player's after every completed move.
/// The follower's y is left alone.
pub fn follow_player<S>(bus: &mut EventBus, scene: Shared<S>, follower: Id) -> ListenerId
where
    S: SceneGraph + Send + 'static,
{
    bus.add_listener(move |event: &mut PlayerMovementCompleted| {
        let mut scene = scene.lock();
        let (Some(target), Some(current), Some(local)) = (
            scene.world_position(event.player()),
            scene.world_position(follower),
            scene.local_position(follower),
        ) else {
            return;
        };
        let moved = local.translate(target.x - current.x, 0.0);
        if let Err(err) = scene.set_local_position(follower, moved) {
            log::warn!("Follower {} lost: {}", follower, err);
        }
    })
}
