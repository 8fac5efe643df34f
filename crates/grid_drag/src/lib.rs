//! Grid-constrained, collision-aware dragging of rectangular blocks.
//!
//! [`BlockMotionController`] owns a block's position and drag state. It moves
//! the block toward the pointer through a [`ShapeCaster`], sliding along
//! whatever it bumps into, and snaps it onto a [`GridLayout`] cell on release.
//! [`GridDragPlugin`] wires this into Bevy with avian2d shape casts.

mod cast;
mod grid;
mod motion;
mod plugin;
mod pointer;

#[cfg(test)]
mod testing;

pub use cast::*;
pub use grid::*;
pub use motion::*;
pub use plugin::*;
pub use pointer::*;
