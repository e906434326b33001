use hecs::{Entity, World};
use crate::math::Transform;
use crate::{spawn_group, Color, Model, Visual};

/// Spawns the ground plane under the play area.
pub fn spawn_environment(world: &mut World) -> Entity {
    world.spawn((
        Transform::IDENTITY
            .with_xyz(-8.0, 42.0, 0.0)
            .with_uniform_scale(0.1),
        Visual::new(Model::Environment, Color::WHITE),
    ))
}

/// Empty nodes that hold every target and every bullet.
pub fn spawn_groups(world: &mut World) -> (Entity, Entity) {
    let targets = spawn_group(world, "targets", None);
    let bullets = spawn_group(world, "bullets", None);
    (targets, bullets)
}
