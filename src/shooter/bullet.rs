use glam::Vec3;
use hecs::{Entity, World};
use crate::math::Transform;
use crate::{global_transform, Collider, Color, Game, Model, Parent, RunContext, Visual};
use super::{BulletConfig, ShootEvent, ShooterConfig, ShooterScene};

/// Collision bit shared by bullets and the things they can hit.
pub const BULLET_MASK: u32 = 0x1;

/// A projectile flying in a straight line.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Bullet {
    /// Unit vector.
    pub direction: Vec3,
    pub speed: f32,
    /// Bullets past this distance on x or y are destroyed.
    pub bound: f32,
    alive: bool,
}

impl Bullet {

    pub fn new(direction: Vec3, speed: f32, bound: f32) -> Self {
        Self {
            direction: direction.normalize_or_zero(),
            speed,
            bound,
            alive: true,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Marks the bullet dead. Returns false if it already was.
    pub fn destroy(&mut self) -> bool {
        std::mem::replace(&mut self.alive, false)
    }

    fn out_of_bounds(&self, position: Vec3) -> bool {
        position.y > self.bound || position.y < -self.bound || position.x.abs() > self.bound
    }
}

/**
 * Spawns a bullet at the shooter's muzzle, flying along +Y.
 * None if the shooter has no position.
 */
pub fn spawn_bullet(world: &mut World, config: &BulletConfig, shooter: Entity, group: Entity) -> Option<Entity> {
    let origin = global_transform(world, shooter)?.transform_point3(Vec3::ZERO);
    let position = origin + Vec3::new(0.0, 0.0, config.muzzle_height);
    let bullet = world.spawn((
        Transform::IDENTITY
            .with_translation(position)
            .with_uniform_scale(config.scale),
        Bullet::new(Vec3::Y, config.speed, config.bound),
        Visual::new(Model::Ball, Color::YELLOW),
        Collider::sphere("bullet", config.radius).with_from_mask(BULLET_MASK),
        Parent(group),
    ));
    log::debug!("Spawned bullet {bullet:?} at {position}");
    Some(bullet)
}

/**
 * Kills a bullet and removes it from the world.
 * Returns false if the entity is not a living bullet, in which case nothing happens.
 */
pub fn destroy_bullet(world: &mut World, entity: Entity) -> bool {
    let destroyed = match world.get::<&mut Bullet>(entity) {
        Ok(mut bullet) => bullet.destroy(),
        Err(_) => false,
    };
    if destroyed {
        let _ = world.despawn(entity);
    }
    destroyed
}

pub(crate) fn on_shoot(game: &mut Game, event: &ShootEvent, _ctx: &mut RunContext) {
    let (mut world, config, scene) = game.all::<(&mut World, &ShooterConfig, &ShooterScene)>();
    if spawn_bullet(&mut world, &config.bullet, event.shooter, scene.bullets).is_none() {
        log::warn!("Shooter {:?} has no position", event.shooter);
    }
}

/// Moves bullets, and destroys those that left the play area.
pub(crate) fn update_bullets(game: &mut Game, ctx: RunContext) {
    let mut world = game.get::<&mut World>();
    let delta = ctx.delta_secs();
    let mut escaped = Vec::new();
    for (entity, (transform, bullet)) in world.query_mut::<(&mut Transform, &Bullet)>() {
        transform.translation += bullet.direction * bullet.speed * delta;
        if bullet.out_of_bounds(transform.translation) {
            escaped.push(entity);
        }
    }
    for entity in escaped {
        log::trace!("Bullet {entity:?} left the play area");
        destroy_bullet(&mut world, entity);
    }
}
