//! Economic adjustments that restate a comparable's margin onto the tested
//! party's circumstances. Each calculator is a pure function of its inputs
//! and returns a signed fraction together with a methodology narrative.

pub mod accounting;
pub mod capacity;
pub mod geographic;
pub mod risk;
pub mod working_capital;
