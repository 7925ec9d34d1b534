//! Command implementations for unit-cli

pub mod compose;
pub mod render;
pub mod sync;
pub mod units;

pub use compose::run_compose;
pub use render::{run_changelog, run_render};
pub use sync::{run_seed, run_sync};
pub use units::run_units;
