//! Database module
//!
//! SQLite integration using sqlx with:
//! - Connection pool management and embedded migrations
//! - Row types with FromRow
//! - Repository functions for the channels table

pub mod models;
pub mod pool;
pub mod repository;

// Re-export commonly used items
pub use models::{ChannelRow, NewChannel};
pub use pool::{create_pool, health_check, run_migrations};
