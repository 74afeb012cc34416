//! Macros

/// Declares a thread local `i64` counter and the callback that moves it into
/// a `StatsAccumulator`.
///
/// * `$title`      - Statistic name using `/` to separate the category,
///                   e.g. "Integrator/Volume interactions".
/// * `$var`        - Identifier for the thread local variable.
/// * `$stats_func` - Identifier for the generated callback.
#[macro_export]
macro_rules! stat_counter {
    ($title: expr, $var: ident, $stats_func: ident $(,)?) => {
        thread_local! { pub(crate) static $var: std::cell::RefCell<i64> = std::cell::RefCell::new(0); }

        pub(crate) fn $stats_func(accum: &mut $crate::stats::StatsAccumulator) {
            let val = $var.with(|v| v.replace(0));
            accum.report_counter($title, val);
        }
    };
}

/// Declares a thread local integer distribution and the callback that moves
/// it into a `StatsAccumulator`.
///
/// * `$title`      - Statistic name using `/` to separate the category,
///                   e.g. "Integrator/Path length".
/// * `$var`        - Identifier for the thread local variable.
/// * `$stats_func` - Identifier for the generated callback.
#[macro_export]
macro_rules! stat_int_distribution {
    ($title: expr, $var: ident, $stats_func: ident $(,)?) => {
        thread_local! {
            pub(crate) static $var: std::cell::RefCell<$crate::stats::StatsDistribution> =
                std::cell::RefCell::new($crate::stats::StatsDistribution::default());
        }

        pub(crate) fn $stats_func(accum: &mut $crate::stats::StatsAccumulator) {
            let val = $var.with(|v| v.replace($crate::stats::StatsDistribution::default()));
            accum.report_int_distribution($title, &val);
        }
    };
}

/// Declares thread local numerator/denominator counters reported as a ratio.
///
/// * `$title`      - Statistic name.
/// * `$var_num`    - Identifier for the numerator.
/// * `$var_denom`  - Identifier for the denominator.
/// * `$stats_func` - Identifier for the generated callback.
#[macro_export]
macro_rules! stat_ratio {
    ($title: expr, $var_num: ident, $var_denom: ident, $stats_func: ident $(,)?) => {
        thread_local! {
            pub(crate) static $var_num: std::cell::RefCell<i64> = std::cell::RefCell::new(0);
            pub(crate) static $var_denom: std::cell::RefCell<i64> = std::cell::RefCell::new(0);
        }

        pub(crate) fn $stats_func(accum: &mut $crate::stats::StatsAccumulator) {
            let num = $var_num.with(|v| v.replace(0));
            let denom = $var_denom.with(|v| v.replace(0));
            accum.report_ratio($title, num, denom);
        }
    };
}

/// Increments a thread local counter.
#[macro_export]
macro_rules! stat_inc {
    ($var: ident, $e: expr) => {
        $var.with(|v| *v.borrow_mut() += $e);
    };
}

/// Records a value in a thread local distribution.
#[macro_export]
macro_rules! stat_dist {
    ($var: ident, $e: expr) => {
        $var.with(|v| v.borrow_mut().report($e));
    };
}

/// Generates `register_stats()` for a module, which adds the module's
/// callbacks to the global registrar once.
///
/// * `$($stat_func: ident),+` - Callbacks created by the `stat_*` macros.
#[macro_export]
macro_rules! stat_register_fns {
    ($($stat_func: ident),+ $(,)?) => {
        /// Registers this module's statistics callbacks.
        pub(crate) fn register_stats() {
            static REGISTERED: std::sync::Once = std::sync::Once::new();
            REGISTERED.call_once(|| {
                let mut sr = match $crate::stats::stats_registrar().lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                $(
                    sr.register_stat_func($stat_func);
                )+
            });
        }
    };
}

/// Merges the calling thread's statistics into the global accumulator. Call
/// at the end of each worker thread.
#[macro_export]
macro_rules! report_stats {
    () => {{
        if let (Ok(mut accum), Ok(registrar)) = (
            $crate::stats::stats_accumulator().lock(),
            $crate::stats::stats_registrar().lock(),
        ) {
            registrar.call_stat_funcs(&mut accum);
        }
    }};
}

/// Prints the global statistics.
#[macro_export]
macro_rules! print_stats {
    () => {{
        if let Ok(accum) = $crate::stats::stats_accumulator().lock() {
            accum.print();
        }
    }};
}

/// Clears the global statistics.
#[macro_export]
macro_rules! clear_stats {
    () => {{
        if let Ok(mut accum) = $crate::stats::stats_accumulator().lock() {
            accum.clear();
        }
    }};
}
