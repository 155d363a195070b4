//! Domain types and the quest/leveling state machine.
//!
//! Nothing in this crate talks to the network or a database directly;
//! storage and AI backends are reached through the traits in [`store`],
//! [`loot`], [`quest`] and [`image_cache`].

pub mod error;
pub mod image_cache;
pub mod ledger;
pub mod lifecycle;
pub mod loot;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod quest;
pub mod store;
pub mod types;
pub mod user;
