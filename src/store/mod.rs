//! Postgres persistence for the betting journal. One `JournalStore` over a
//! shared pool; repository methods are grouped per table family, one file
//! each. All writers are idempotent upserts or guarded updates so sync jobs
//! can be re-run safely.

pub mod dvp;
pub mod line_movement;
pub mod players;
pub mod postgres;
pub mod prediction;

pub use postgres::JournalStore;
