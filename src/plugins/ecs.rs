use hecs::World;
use crate::{AppBuilder, Plugin};

/// Adds the ECS [`World`] that holds every game object.
pub struct EcsPlugin;
impl Plugin for EcsPlugin {
    fn install(&mut self, builder: &mut AppBuilder) {
        builder.game().init(|_| World::new());
    }
}
