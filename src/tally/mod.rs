//! Modal input state machine and text renderer.
//!
//! The seams follow the `model/update/render` split: [`model`] holds state,
//! [`update`] applies one character at a time, and [`render`] turns the state
//! into a text block. None of them perform I/O. [`batch`] drives the machine
//! from a complete input string.

pub mod batch;
pub mod model;
pub mod render;
pub mod update;

#[cfg(test)]
mod test_properties;

pub use batch::{SessionOutcome, feed_batch};
pub use model::{Mode, Sign, TallyModel, Transition};
pub use render::render;
pub use update::update;
