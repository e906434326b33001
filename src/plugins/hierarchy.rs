use glam::Mat4;
use hecs::{Entity, World};
use crate::math::Transform;

/// Deepest parent chain followed before giving up.
const MAX_DEPTH: usize = 32;

/**
 * Attaches an entity to another.
 * The child's [`Transform`] is relative to its parent's.
 */
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Parent(pub Entity);

/**
 * An entity that only groups other entities, like the "bullets" and "targets" nodes.
 * Has a [`Transform`] but nothing to draw.
 */
#[derive(Clone, Debug)]
pub struct SceneGroup {
    pub name: String,
}

impl SceneGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Spawns an empty group node at the origin.
pub fn spawn_group(world: &mut World, name: &str, parent: Option<Entity>) -> Entity {
    let group = world.spawn((SceneGroup::new(name), Transform::IDENTITY));
    if let Some(parent) = parent {
        let _ = world.insert_one(group, Parent(parent));
    }
    group
}

/**
 * Transform of an entity relative to the world, found by walking up its [`Parent`] chain.
 * None if the entity, or one of its ancestors, has no [`Transform`].
 */
pub fn global_transform(world: &World, entity: Entity) -> Option<Mat4> {
    let mut global = Mat4::from(*world.get::<&Transform>(entity).ok()?);
    let mut current = entity;
    for _ in 0..MAX_DEPTH {
        let parent = match world.get::<&Parent>(current) {
            Ok(parent) => parent.0,
            Err(_) => return Some(global),
        };
        let parent_transform = *world.get::<&Transform>(parent).ok()?;
        global = Mat4::from(parent_transform) * global;
        current = parent;
    }
    log::warn!("Parent chain of {entity:?} is deeper than {MAX_DEPTH}, possibly cyclic");
    Some(global)
}
