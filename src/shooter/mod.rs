//! Third-person target shooter.
//!
//! The player walks with WASD and fires bullets along +Y with space.
//! Each bullet that strikes a target scores a point and sends the target somewhere else.

mod config;
mod controls;
mod player;
mod bullet;
mod target;
mod score;
mod environment;

pub use config::*;
pub use controls::*;
pub use player::*;
pub use bullet::*;
pub use target::*;
pub use score::*;
pub use environment::*;

use glam::Vec3;
use hecs::{Entity, World};
use rand::Rng;
use crate::math::Transform;
use crate::{AppBuilder, Camera, CollisionEvent, Color, Game, Hud, Plugin, RunContext, Stage, StartEvent, TextLabel, ThirdPersonCamera, Visual};

/// Adds the game's rules. Expects the engine plugins to be installed as well.
pub struct ShooterPlugin {
    pub config: ShooterConfig,
}

impl Plugin for ShooterPlugin {
    fn install(&mut self, builder: &mut AppBuilder) {
        let seed = self.config.rng_seed;
        builder.game()
            .add(self.config.clone())
            .init(|_| Score::default())
            .init(|_| KeyBindings::default())
            .init(|_| GameRng::new(seed));
        builder
            .system(Stage::PreUpdate, controls::read_controls)
            .system(Stage::Update, player::move_players)
            .system(Stage::Update, bullet::update_bullets)
            .event_handler::<StartEvent>(setup)
            .event_handler::<ShootEvent>(bullet::on_shoot)
            .event_handler::<CollisionEvent>(score::on_collision);
    }
}

/// Notable entities created at startup.
#[derive(Copy, Clone, Debug)]
pub struct ShooterScene {
    pub environment: Entity,
    pub player: Entity,
    pub camera: Entity,
    /// Group holding all targets.
    pub targets: Entity,
    /// Group holding all bullets.
    pub bullets: Entity,
}

fn setup(game: &mut Game, _event: &StartEvent, _ctx: &mut RunContext) {
    let scene = {
        let (mut world, config, mut rng) = game.all::<(&mut World, &ShooterConfig, &mut GameRng)>();
        spawn_scene(&mut world, &config, &mut rng.0)
    };
    let points = game.get::<&Score>().points;
    let label = TextLabel::new(Score::text(points))
        .with_position(-1.2, 0.9)
        .with_scale(0.07)
        .with_color(Color::WHITE);
    let label = game.get::<&mut Hud>().add(label);
    game.get::<&mut Score>().label = Some(label);
    game.add(scene);
    log::info!("Scene ready");
}

/// Spawns the ground, the player, its camera and the targets.
pub fn spawn_scene(world: &mut World, config: &ShooterConfig, rng: &mut impl Rng) -> ShooterScene {
    let environment = spawn_environment(world);
    let (targets, bullets) = spawn_groups(world);

    let player = world.spawn((
        Transform::IDENTITY.with_uniform_scale(config.player.scale),
        Visual::new(config.player.model, Color::WHITE),
        PlayerController { speed: config.player.speed },
        MoveInput::default(),
    ));

    let follow = ThirdPersonCamera {
        target: player,
        distance: config.camera.distance,
        height: config.camera.height,
        look_height: config.camera.look_height,
    };
    let camera = world.spawn((
        follow.transform_for(Vec3::ZERO),
        Camera { fov_degrees: config.camera.fov, ..Default::default() },
        follow,
    ));

    for _ in 0..config.targets.count {
        spawn_target(world, &config.targets, rng, targets);
    }

    ShooterScene { environment, player, camera, targets, bullets }
}


#[cfg(test)]
mod test {
    use glam::Vec3;
    use hecs::{Entity, World};
    use winit::keyboard::KeyCode;
    use crate::math::Transform;
    use crate::{App, GraphicsPlugin, HeadlessEnginePlugin, Hud, Keyboard, Renderable, Scene};
    use crate::shooter::{Bullet, Score, ShooterConfig, ShooterPlugin, ShooterScene, Target};

    fn config() -> ShooterConfig {
        ShooterConfig { rng_seed: Some(7), ..Default::default() }
    }

    fn shooter_app(config: ShooterConfig) -> App {
        let mut builder = App::builder();
        builder
            .plugin(HeadlessEnginePlugin)
            .plugin(ShooterPlugin { config })
            .tick_rate(60.0);
        let mut app = builder.build();
        app.run_tick();
        app
    }

    fn scene(app: &App) -> ShooterScene {
        *app.game.get::<&ShooterScene>()
    }

    fn position(app: &App, entity: Entity) -> Vec3 {
        app.game.get::<&World>().get::<&Transform>(entity).unwrap().translation
    }

    fn bullets(app: &App) -> Vec<Entity> {
        let world = app.game.get::<&World>();
        let mut query = world.query::<&Bullet>();
        let entities: Vec<Entity> = query.iter().map(|(entity, _)| entity).collect();
        entities
    }

    fn targets(app: &App) -> Vec<Entity> {
        let world = app.game.get::<&World>();
        let mut query = world.query::<&Target>();
        let entities: Vec<Entity> = query.iter().map(|(entity, _)| entity).collect();
        entities
    }

    fn place(app: &mut App, entity: Entity, position: Vec3) {
        let world = app.game.get::<&World>();
        world.get::<&mut Transform>(entity).unwrap().translation = position;
    }

    fn run_ticks(app: &mut App, ticks: u32) {
        for _ in 0..ticks {
            app.run_tick();
        }
    }

    fn tap(app: &mut App, key: KeyCode) {
        app.game.get::<&mut Keyboard>().press(key);
        app.run_tick();
        app.game.get::<&mut Keyboard>().release(key);
    }

    fn score(app: &App) -> u32 {
        app.game.get::<&Score>().points
    }

    #[test]
    fn setup_builds_scene() {
        let app = shooter_app(config());
        let scene = scene(&app);
        assert_eq!(3, targets(&app).len());
        assert!(bullets(&app).is_empty());
        assert_eq!(Vec3::ZERO, position(&app, scene.player));
        assert!(position(&app, scene.camera).abs_diff_eq(Vec3::new(0.0, -15.0, 5.0), 1e-5));
        for target in targets(&app) {
            let position = position(&app, target);
            assert!((-8.0..=8.0).contains(&position.x));
            assert!((10.0..=30.0).contains(&position.y));
            assert_eq!(1.5, position.z);
        }

        let hud = app.game.get::<&Hud>();
        let label = app.game.get::<&Score>().label.unwrap();
        assert_eq!("SCORE: 0", hud.label(label).unwrap().text);
    }

    #[test]
    fn walks_forward() {
        let mut app = shooter_app(config());
        let player = scene(&app).player;
        app.game.get::<&mut Keyboard>().press(KeyCode::KeyW);
        run_ticks(&mut app, 60);
        let player_pos = position(&app, player);
        assert!(player_pos.abs_diff_eq(Vec3::new(0.0, 10.0, 0.0), 1e-3), "{player_pos}");

        // Camera keeps its offset.
        let camera_pos = position(&app, scene(&app).camera);
        assert!(camera_pos.abs_diff_eq(player_pos + Vec3::new(0.0, -15.0, 5.0), 1e-3));

        // Stops once released.
        app.game.get::<&mut Keyboard>().release(KeyCode::KeyW);
        run_ticks(&mut app, 10);
        assert_eq!(player_pos, position(&app, player));
    }

    #[test]
    fn diagonals_are_not_faster() {
        let mut app = shooter_app(config());
        let player = scene(&app).player;
        {
            let mut keyboard = app.game.get::<&mut Keyboard>();
            keyboard.press(KeyCode::KeyW);
            keyboard.press(KeyCode::KeyD);
        }
        run_ticks(&mut app, 60);
        let player_pos = position(&app, player);
        assert!((player_pos.length() - 10.0).abs() < 1e-3, "{player_pos}");
        assert!((player_pos.x - player_pos.y).abs() < 1e-4);
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut app = shooter_app(config());
        let player = scene(&app).player;
        {
            let mut keyboard = app.game.get::<&mut Keyboard>();
            keyboard.press(KeyCode::KeyA);
            keyboard.press(KeyCode::KeyD);
        }
        run_ticks(&mut app, 30);
        assert_eq!(Vec3::ZERO, position(&app, player));
    }

    #[test]
    fn one_bullet_per_press() {
        let mut app = shooter_app(config());
        app.game.get::<&mut Keyboard>().press(KeyCode::Space);
        run_ticks(&mut app, 5);
        assert_eq!(1, bullets(&app).len());

        app.game.get::<&mut Keyboard>().release(KeyCode::Space);
        app.run_tick();
        tap(&mut app, KeyCode::Space);
        assert_eq!(2, bullets(&app).len());
    }

    #[test]
    fn quick_tap_fires() {
        let mut app = shooter_app(config());
        {
            let mut keyboard = app.game.get::<&mut Keyboard>();
            keyboard.press(KeyCode::Space);
            keyboard.release(KeyCode::Space);
        }
        app.run_tick();
        assert_eq!(1, bullets(&app).len());
        app.run_tick();
        assert_eq!(1, bullets(&app).len());
    }

    #[test]
    fn bullets_fly_then_expire() {
        let mut app = shooter_app(ShooterConfig {
            targets: crate::shooter::TargetConfig { x_range: [6.0, 8.0], ..Default::default() },
            ..config()
        });
        let player = scene(&app).player;
        place(&mut app, player, Vec3::new(-2.0, 0.0, 0.0));
        tap(&mut app, KeyCode::Space);
        let bullet = bullets(&app)[0];
        let start = position(&app, bullet);
        assert!(start.abs_diff_eq(Vec3::new(-2.0, 0.5, 1.5), 1e-4), "{start}");
        app.run_tick();
        assert!((position(&app, bullet).y - 1.0).abs() < 1e-4);

        run_ticks(&mut app, 250);
        assert!(bullets(&app).is_empty());
        assert_eq!(0, score(&app));
    }

    #[test]
    fn hit_scores_and_moves_target() {
        let mut app = shooter_app(config());
        let target = targets(&app)[0];
        place(&mut app, target, Vec3::new(0.0, 5.0, 1.5));
        tap(&mut app, KeyCode::Space);
        run_ticks(&mut app, 20);

        assert_eq!(1, score(&app));
        assert!(bullets(&app).is_empty());
        assert_eq!(3, targets(&app).len());
        let moved = position(&app, target);
        assert!((10.0..=30.0).contains(&moved.y), "{moved}");

        let hud = app.game.get::<&Hud>();
        let label = app.game.get::<&Score>().label.unwrap();
        assert_eq!("SCORE: 1", hud.label(label).unwrap().text);
    }

    #[test]
    fn bullet_hits_every_target_it_touches() {
        let mut app = shooter_app(config());
        let targets = targets(&app);
        place(&mut app, targets[0], Vec3::new(0.0, 5.0, 1.5));
        place(&mut app, targets[1], Vec3::new(0.0, 5.0, 1.5));
        tap(&mut app, KeyCode::Space);
        run_ticks(&mut app, 20);
        assert_eq!(2, score(&app));
        assert!(bullets(&app).is_empty());
        for target in &targets[..2] {
            let moved = position(&app, *target);
            assert!((10.0..=30.0).contains(&moved.y), "{moved}");
        }
    }

    #[test]
    fn escape_quits() {
        let mut app = shooter_app(config());
        app.run_tick();
        assert!(!app.quit_requested());
        tap(&mut app, KeyCode::Escape);
        assert!(app.quit_requested());
    }

    #[test]
    fn scene_graph_mirrors_world() {
        let mut builder = App::builder();
        builder
            .plugin(HeadlessEnginePlugin)
            .plugin(GraphicsPlugin)
            .plugin(ShooterPlugin { config: config() });
        let mut app = builder.build();
        app.run_tick();

        // Ground, player, two groups and three targets. The camera draws nothing.
        assert_eq!(7, app.game.get::<&Scene<Renderable>>().len());
        tap(&mut app, KeyCode::Space);
        assert_eq!(8, app.game.get::<&Scene<Renderable>>().len());

        let bullet = bullets(&app)[0];
        crate::shooter::destroy_bullet(&mut app.game.get::<&mut World>(), bullet);
        app.run_tick();
        assert_eq!(7, app.game.get::<&Scene<Renderable>>().len());
    }
}
