use glam::{Mat4, Vec3};
use hecs::{Entity, World};
use crate::math::Transform;
use crate::{global_transform, AppBuilder, Game, Plugin, RunContext, Stage};

/// Moves [`ThirdPersonCamera`]s after everything else has moved.
pub struct CameraPlugin;
impl Plugin for CameraPlugin {
    fn install(&mut self, builder: &mut AppBuilder) {
        builder.system(Stage::PostUpdate, follow_targets);
    }
}

/**
 * Perspective projection of a camera entity.
 * The view comes from the entity's [`Transform`], looking down its -Z axis.
 */
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Camera {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov_degrees: 40.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {

    /// Projection matrix for a viewport with the aspect ratio specified (width / height).
    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), aspect.max(f32::EPSILON), self.near, self.far)
    }
}

/// Keeps a camera behind and above a target entity, looking slightly above it.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ThirdPersonCamera {
    pub target: Entity,
    /// How far behind (-Y) the target the camera sits.
    pub distance: f32,
    /// How far above the target the camera sits.
    pub height: f32,
    /// Height above the target's origin that the camera looks at.
    pub look_height: f32,
}

impl ThirdPersonCamera {

    pub fn new(target: Entity) -> Self {
        Self {
            target,
            distance: 15.0,
            height: 5.0,
            look_height: 1.5,
        }
    }

    /// Transform the camera should have when its target is at `target_pos`.
    pub fn transform_for(&self, target_pos: Vec3) -> Transform {
        let eye = target_pos + Vec3::new(0.0, -self.distance, self.height);
        let look_at = target_pos + Vec3::new(0.0, 0.0, self.look_height);
        Transform::looking_at(eye, look_at, Vec3::Z)
    }
}

fn follow_targets(game: &mut Game, _ctx: RunContext) {
    let world = game.get::<&World>();
    let mut moves = Vec::new();
    for (entity, follow) in world.query::<&ThirdPersonCamera>().iter() {
        let Some(target) = global_transform(&world, follow.target) else { continue };
        let target_pos = target.transform_point3(Vec3::ZERO);
        moves.push((entity, follow.transform_for(target_pos)));
    }
    for (entity, transform) in moves {
        if let Ok(mut camera_transform) = world.get::<&mut Transform>(entity) {
            *camera_transform = transform;
        }
    }
}


#[cfg(test)]
mod test {
    use glam::{Vec3, Vec4};
    use hecs::World;
    use crate::math::Transform;
    use crate::{App, Camera, CameraPlugin, EcsPlugin, ThirdPersonCamera};

    #[test]
    fn follows_target() {
        let mut builder = App::builder();
        builder.plugin(EcsPlugin).plugin(CameraPlugin);
        let mut app = builder.build();
        let (player, camera) = {
            let mut world = app.game.get::<&mut World>();
            let player = world.spawn((Transform::IDENTITY.with_xyz(2.0, 3.0, 0.0),));
            let camera = world.spawn((Transform::IDENTITY, Camera::default(), ThirdPersonCamera::new(player)));
            (player, camera)
        };
        app.run_tick();

        let world = app.game.get::<&World>();
        let transform = *world.get::<&Transform>(camera).unwrap();
        assert!(transform.translation.abs_diff_eq(Vec3::new(2.0, -12.0, 5.0), 1e-5));
        let expected_forward = (Vec3::new(2.0, 3.0, 1.5) - transform.translation).normalize();
        assert!(transform.forward().abs_diff_eq(expected_forward, 1e-4));
        assert!(world.contains(player));
    }

    #[test]
    fn missing_target_leaves_camera() {
        let mut world = World::new();
        let missing = world.reserve_entity();
        let follow = ThirdPersonCamera::new(missing);
        let camera = world.spawn((Transform::IDENTITY.with_xyz(1.0, 1.0, 1.0), follow));
        let mut builder = App::builder();
        builder.plugin(CameraPlugin);
        builder.game().add(world);
        let mut app = builder.build();
        app.run_tick();
        let world = app.game.get::<&World>();
        assert_eq!(Vec3::ONE, world.get::<&Transform>(camera).unwrap().translation);
    }

    #[test]
    fn projection_keeps_look_point_centered() {
        let follow = ThirdPersonCamera::new(hecs::Entity::DANGLING);
        let view = glam::Mat4::from(follow.transform_for(Vec3::ZERO)).inverse();
        let proj = Camera::default().projection(800.0 / 600.0);
        let clip = proj * view * Vec4::new(0.0, 0.0, 1.5, 1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
