//! Scoped domain operations over the entity store.
//!
//! Every operation takes the caller's scope, which can only be obtained from
//! a verified [`Principal`](crate::auth::Principal). Both protocol surfaces
//! call through here; neither talks to the repositories directly.

mod clock;
mod tasks;
mod tickets;

#[cfg(test)]
mod tickets_test;

#[cfg(test)]
pub use clock::MockIdClock;
pub use clock::{IdClock, SystemClock};
pub use tasks::TaskService;
pub use tickets::{DEFAULT_ORGANIZATION_NAME, TicketService, TicketStatistics};
