//! Statistics Registration

use super::StatsAccumulator;
use std::sync::{Mutex, OnceLock};

/// Callback that moves one thread's statistics into an accumulator.
pub type StatsFn = fn(&mut StatsAccumulator);

/// Return the global statistics registrar.
pub fn stats_registrar() -> &'static Mutex<StatsRegistrar> {
    static DATA: OnceLock<Mutex<StatsRegistrar>> = OnceLock::new();
    DATA.get_or_init(|| Mutex::new(StatsRegistrar::default()))
}

/// Registers callback functions for statistics.
#[derive(Default)]
pub struct StatsRegistrar {
    /// Callback functions.
    stats_funcs: Vec<StatsFn>,
}

impl StatsRegistrar {
    /// Register a callback function for reporting statistics.
    ///
    /// * `func` - Callback created by one of the `stat_*` macros.
    pub fn register_stat_func(&mut self, func: StatsFn) {
        if !self.stats_funcs.iter().any(|f| *f as usize == func as usize) {
            self.stats_funcs.push(func);
        }
    }

    /// Call all callback functions, merging the calling thread's statistics
    /// into `accum`.
    ///
    /// * `accum` - The accumulator.
    pub fn call_stat_funcs(&self, accum: &mut StatsAccumulator) {
        self.stats_funcs.iter().for_each(|func| func(accum));
    }
}
