pub mod api;
pub mod config;
pub mod core;
pub mod infrastructure;
pub mod realtime;

pub use crate::core::errors::LedgerError;
pub use crate::core::services::LedgerService;
pub use infrastructure::{logging::in_memory::InMemoryLogging, storage::in_memory::InMemoryStorage};
pub use realtime::{BroadcastHub, HubHandle};

#[cfg(test)]
mod tests; // Include integration tests
