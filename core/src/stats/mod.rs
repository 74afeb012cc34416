//! Statistics
//!
//! Each statistic lives in a thread local cell declared with one of the
//! `stat_*` macros. Worker threads merge their cells into the global
//! `StatsAccumulator` with `report_stats!()` when they finish.

mod accumulator;
mod macros;
mod registrar;

pub use accumulator::*;
pub use registrar::*;
