// Library crate for the livestream statistics server
// This file exposes the public API for integration tests

pub mod server;
pub mod session;
pub mod shared;
pub mod stats;

// Re-export commonly used types for easier access in tests
pub use server::{build_router, ServerConfig};
pub use session::{SessionClaims, TokenConfig};
pub use shared::{AppError, AppState};
pub use stats::{
    InMemoryStatsRepository, LivestreamStatistics, PostgresStatsRepository, Ranking,
    StatsError, StatsRepository, StatsService, UserStatistics,
};
