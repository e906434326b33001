use std::time::Duration;
use crate::{AppBuilder, CameraPlugin, CollisionPlugin, EcsPlugin, GraphicsPlugin, HudPlugin, InputPlugin, Plugin, WindowPlugin};

/**
 * Main game engine plugin.
 * Bundles everything a windowed game needs: input, ECS, collision, cameras, graphics and HUD.
 */
pub struct EnginePlugin {
    pub title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub tick_duration: Duration,
}

impl Default for EnginePlugin {
    fn default() -> Self {
        Self {
            title: "Shooter".to_owned(),
            window_width: 800,
            window_height: 600,
            tick_duration: Duration::from_secs_f64(1.0/60.0),
        }
    }
}

impl Plugin for EnginePlugin {
    fn install(&mut self, builder: &mut AppBuilder) {
        builder
            .plugin(HeadlessEnginePlugin)
            .plugin(GraphicsPlugin)
            .plugin(WindowPlugin {
                title: self.title.clone(),
                window_width: self.window_width,
                window_height: self.window_height,
            })
            .tick_duration(self.tick_duration);
    }
}

/// Engine services that don't need a window or GPU.
/// Good for tests and servers.
pub struct HeadlessEnginePlugin;
impl Plugin for HeadlessEnginePlugin {
    fn install(&mut self, builder: &mut AppBuilder) {
        builder
            .plugin(InputPlugin)
            .plugin(EcsPlugin)
            .plugin(CollisionPlugin::default())
            .plugin(CameraPlugin)
            .plugin(HudPlugin);
    }
}


#[cfg(test)]
mod test {
    use hecs::World;
    use crate::{App, CollisionTraverser, HeadlessEnginePlugin, Hud, Keyboard};

    #[test]
    fn headless_domains() {
        let mut builder = App::builder();
        builder.plugin(HeadlessEnginePlugin);
        let mut app = builder.build();
        app.run_tick();
        assert!(app.game.contains::<World>());
        assert!(app.game.contains::<Keyboard>());
        assert!(app.game.contains::<Hud>());
        assert!(app.game.contains::<CollisionTraverser>());
    }
}
