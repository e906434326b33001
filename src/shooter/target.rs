use glam::Vec3;
use hecs::{Entity, World};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use crate::math::Transform;
use crate::{Collider, Color, Model, Parent, Visual};
use super::{TargetConfig, BULLET_MASK};

/// Something to shoot at.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Target;

/// Random numbers for gameplay.
pub struct GameRng(pub SmallRng);

impl GameRng {
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(SmallRng::seed_from_u64(seed)),
            None => Self(SmallRng::from_entropy()),
        }
    }
}

/// Uniformly random point in the target area.
pub fn random_target_position(rng: &mut impl Rng, config: &TargetConfig) -> Vec3 {
    let [min_x, max_x] = config.x_range;
    let [min_y, max_y] = config.y_range;
    Vec3::new(
        rng.gen_range(min_x..=max_x),
        rng.gen_range(min_y..=max_y),
        config.z,
    )
}

pub fn spawn_target(world: &mut World, config: &TargetConfig, rng: &mut impl Rng, group: Entity) -> Entity {
    let position = random_target_position(rng, config);
    let target = world.spawn((
        Transform::IDENTITY
            .with_translation(position)
            .with_uniform_scale(config.scale),
        Target,
        Visual::new(Model::Box, Color::RED),
        Collider::sphere("target", config.radius).with_into_mask(BULLET_MASK),
        Parent(group),
    ));
    log::debug!("Spawned target {target:?} at {position}");
    target
}

/// Moves a target somewhere else. False if the entity is not a target.
pub fn respawn_target(world: &mut World, config: &TargetConfig, rng: &mut impl Rng, target: Entity) -> bool {
    let Ok((transform, _)) = world.query_one_mut::<(&mut Transform, &Target)>(target) else {
        return false;
    };
    transform.translation = random_target_position(rng, config);
    log::debug!("Target {target:?} moved to {}", transform.translation);
    true
}


#[cfg(test)]
mod test {
    use hecs::World;
    use crate::math::Transform;
    use crate::spawn_group;
    use crate::shooter::{random_target_position, respawn_target, spawn_target, GameRng, TargetConfig};

    #[test]
    fn positions_stay_in_range() {
        let config = TargetConfig::default();
        let mut rng = GameRng::new(Some(3));
        for _ in 0..500 {
            let position = random_target_position(&mut rng.0, &config);
            assert!((-8.0..=8.0).contains(&position.x));
            assert!((10.0..=30.0).contains(&position.y));
            assert_eq!(1.5, position.z);
        }
    }

    #[test]
    fn degenerate_range() {
        let config = TargetConfig { x_range: [2.0, 2.0], ..Default::default() };
        let mut rng = GameRng::new(Some(3));
        assert_eq!(2.0, random_target_position(&mut rng.0, &config).x);
    }

    #[test]
    fn seeded_rng_repeats() {
        let config = TargetConfig::default();
        let mut a = GameRng::new(Some(42));
        let mut b = GameRng::new(Some(42));
        assert_eq!(
            random_target_position(&mut a.0, &config),
            random_target_position(&mut b.0, &config),
        );
    }

    #[test]
    fn respawn_moves_only_targets() {
        let config = TargetConfig::default();
        let mut rng = GameRng::new(Some(1));
        let mut world = World::new();
        let group = spawn_group(&mut world, "targets", None);
        let target = spawn_target(&mut world, &config, &mut rng.0, group);
        let before = world.get::<&Transform>(target).unwrap().translation;
        assert!(respawn_target(&mut world, &config, &mut rng.0, target));
        let after = world.get::<&Transform>(target).unwrap().translation;
        assert_ne!(before, after);
        assert!(!respawn_target(&mut world, &config, &mut rng.0, group));
    }
}
