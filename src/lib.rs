pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod seed;
pub mod stats;
pub mod store;

pub use config::AppConfig;
pub use error::{Result, StakebookError};
pub use seed::{DemoSeeder, SeedPlan};
pub use stats::StatsClient;
pub use store::JournalStore;
