use hecs::World;
use crate::math::Transform;
use crate::{Game, RunContext};
use super::MoveInput;

/// Walks an entity around according to its [`MoveInput`].
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct PlayerController {
    /// Units per second.
    pub speed: f32,
}

impl Default for PlayerController {
    fn default() -> Self {
        Self { speed: 10.0 }
    }
}

pub(crate) fn move_players(game: &mut Game, ctx: RunContext) {
    let mut world = game.get::<&mut World>();
    let delta = ctx.delta_secs();
    for (_, (transform, controller, input)) in world.query_mut::<(&mut Transform, &PlayerController, &MoveInput)>() {
        let direction = input.direction();
        if direction.length_squared() > 0.0 {
            transform.translation += direction.normalize() * controller.speed * delta;
        }
    }
}
