pub mod adjustments;
pub mod benchmark;
pub mod statistics;
