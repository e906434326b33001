//! Sphere collision traversal.
//!
//! Every tick, colliders that can act as a "from" solid are tested against colliders that can be
//! collided "into". Masks decide which pairs are tested at all. Contacts that begin this tick
//! are reported as [`CollisionEvent`]s named after an "in pattern", like "bullet-into-target".

use glam::{Mat4, Vec3};
use hecs::{Entity, World};
use crate::math::Sphere;
use crate::{global_transform, AppBuilder, Game, HashSet, Plugin, RunContext, Stage};

/// Pattern used when none is configured.
pub const DEFAULT_IN_PATTERN: &str = "%fn-into-%in";

/// Adds a [`CollisionTraverser`] that runs during [`Stage::UpdatePhysics`].
pub struct CollisionPlugin {
    pub in_pattern: String,
}

impl Default for CollisionPlugin {
    fn default() -> Self {
        Self { in_pattern: DEFAULT_IN_PATTERN.to_owned() }
    }
}

impl Plugin for CollisionPlugin {
    fn install(&mut self, builder: &mut AppBuilder) {
        let in_pattern = self.in_pattern.clone();
        builder.game().init(|_| CollisionTraverser::new(in_pattern));
        builder.system(Stage::UpdatePhysics, traverse_collisions);
    }
}

/**
 * Collision solid attached to an entity.
 * `center` and `radius` are in the entity's local space, so they scale with it.
 * A non-uniform scale uses its largest axis for the radius.
 */
#[derive(Clone, Debug)]
pub struct Collider {
    pub name: String,
    pub center: Vec3,
    pub radius: f32,
    /// Bits this collider tests with when acting as the moving "from" solid. 0 disables.
    pub from_mask: u32,
    /// Bits this collider accepts from "from" solids. 0 disables.
    pub into_mask: u32,
}

impl Collider {

    pub fn sphere(name: impl Into<String>, radius: f32) -> Self {
        Self {
            name: name.into(),
            center: Vec3::ZERO,
            radius,
            from_mask: 0,
            into_mask: 0,
        }
    }

    pub fn with_from_mask(mut self, from_mask: u32) -> Self {
        self.from_mask = from_mask;
        self
    }

    pub fn with_into_mask(mut self, into_mask: u32) -> Self {
        self.into_mask = into_mask;
        self
    }

    pub fn with_center(mut self, center: Vec3) -> Self {
        self.center = center;
        self
    }

    /// The solid placed in the world by the entity's global transform.
    pub fn world_sphere(&self, global: Mat4) -> Sphere {
        let (scale, _, _) = global.to_scale_rotation_translation();
        Sphere::new(
            global.transform_point3(self.center),
            self.radius * scale.abs().max_element(),
        )
    }
}

/// A contact that started this tick.
#[derive(Clone, PartialEq, Debug)]
pub struct CollisionEvent {
    /// In pattern with "%fn" and "%in" substituted, IE: "bullet-into-target".
    pub name: String,
    /// Entity whose collider was the "from" solid.
    pub from: Entity,
    /// Entity whose collider was collided into.
    pub into: Entity,
}

/// Finds overlapping colliders, and remembers them so that ongoing contacts are reported once.
pub struct CollisionTraverser {
    in_pattern: String,
    contacts: HashSet<(Entity, Entity)>,
}

impl CollisionTraverser {

    pub fn new(in_pattern: impl Into<String>) -> Self {
        Self {
            in_pattern: in_pattern.into(),
            contacts: HashSet::default(),
        }
    }

    /// Pairs currently in contact.
    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    /**
     * Tests all from/into pairs in the world.
     * Returns an event for each pair that overlaps now, but did not during the previous traversal.
     */
    pub fn traverse(&mut self, world: &World) -> Vec<CollisionEvent> {
        let mut from_solids = Vec::new();
        let mut into_solids = Vec::new();
        let mut query = world.query::<&Collider>();
        for (entity, collider) in query.iter() {
            if collider.from_mask == 0 && collider.into_mask == 0 {
                continue;
            }
            let Some(global) = global_transform(world, entity) else { continue };
            let sphere = collider.world_sphere(global);
            if collider.from_mask != 0 {
                from_solids.push((entity, collider, sphere));
            }
            if collider.into_mask != 0 {
                into_solids.push((entity, collider, sphere));
            }
        }

        let mut contacts = HashSet::default();
        let mut events = Vec::new();
        for (from_entity, from_collider, from_sphere) in &from_solids {
            for (into_entity, into_collider, into_sphere) in &into_solids {
                if from_entity == into_entity { continue }
                if from_collider.from_mask & into_collider.into_mask == 0 { continue }
                if !from_sphere.intersects(into_sphere) { continue }
                let pair = (*from_entity, *into_entity);
                contacts.insert(pair);
                if !self.contacts.contains(&pair) {
                    log::debug!("{} ({from_entity:?}) hit {} ({into_entity:?})", from_collider.name, into_collider.name);
                    events.push(CollisionEvent {
                        name: self.event_name(&from_collider.name, &into_collider.name),
                        from: *from_entity,
                        into: *into_entity,
                    });
                }
            }
        }
        self.contacts = contacts;
        events
    }

    fn event_name(&self, from_name: &str, into_name: &str) -> String {
        self.in_pattern
            .replace("%fn", from_name)
            .replace("%in", into_name)
    }
}

impl Default for CollisionTraverser {
    fn default() -> Self {
        Self::new(DEFAULT_IN_PATTERN)
    }
}

fn traverse_collisions(game: &mut Game, mut ctx: RunContext) {
    let (world, mut traverser) = game.all::<(&World, &mut CollisionTraverser)>();
    for event in traverser.traverse(&world) {
        ctx.fire(event);
    }
}
