//! Math primitives shared by gameplay, collision and graphics.

mod transform;
mod shape;

pub use transform::*;
pub use shape::*;
