mod game;
mod app;
mod event;
mod tracker;
mod util;

pub use game::*;
pub use app::*;
pub use event::*;
pub use tracker::*;
pub use util::*;
