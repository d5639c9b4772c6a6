//! REST handlers.

mod system;
mod tasks;
mod tickets;
mod well_known;

#[cfg(test)]
mod well_known_test;

pub use system::*;
pub use tasks::*;
pub use tickets::*;
pub use well_known::*;
