pub mod adjustments;
pub mod benchmark;
pub mod comparability;
pub mod compliance;
pub mod config;
pub mod error;
pub mod materiality;
pub mod statistics;
pub mod types;

pub use error::BenchmarkError;
pub use types::*;

/// Standard result type for all benchmarking operations
pub type BenchmarkResult<T> = Result<T, BenchmarkError>;
