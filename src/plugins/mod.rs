mod ecs;
mod hierarchy;
mod input;
mod collision;
mod camera;
mod hud;
mod graphics;
mod window;
mod engine;

pub use ecs::*;
pub use hierarchy::*;
pub use input::*;
pub use collision::*;
pub use camera::*;
pub use hud::*;
pub use graphics::*;
pub use window::*;
pub use engine::*;
