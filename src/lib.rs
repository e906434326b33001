mod framework;
mod plugins;
pub mod math;
pub mod shooter;

pub use framework::*;
pub use plugins::*;
