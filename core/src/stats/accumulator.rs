//! Statistics Accumulator

use std::collections::BTreeMap;
use std::sync::{Mutex, OnceLock};

/// Return the global statistics accumulator.
pub fn stats_accumulator() -> &'static Mutex<StatsAccumulator> {
    static DATA: OnceLock<Mutex<StatsAccumulator>> = OnceLock::new();
    DATA.get_or_init(|| Mutex::new(StatsAccumulator::default()))
}

/// Summary of an integer valued distribution.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StatsDistribution {
    /// Sum of all values.
    pub sum: i64,

    /// Number of values.
    pub count: u64,

    /// Minimum value.
    pub min: Option<i64>,

    /// Maximum value.
    pub max: Option<i64>,
}

impl StatsDistribution {
    /// Record a value.
    ///
    /// * `val` - The value.
    pub fn report(&mut self, val: i64) {
        self.sum += val;
        self.count += 1;
        self.min = Some(self.min.map_or(val, |m| m.min(val)));
        self.max = Some(self.max.map_or(val, |m| m.max(val)));
    }

    /// Merge another distribution into this one.
    ///
    /// * `other` - The other distribution.
    pub fn merge(&mut self, other: &Self) {
        self.sum += other.sum;
        self.count += other.count;
        self.min = match (self.min, other.min) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.max = match (self.max, other.max) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }

    /// Returns the mean value, or 0 when empty.
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum as f64 / self.count as f64
        }
    }

    /// Clear all recorded values.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Aggregates statistics reported by all threads.
#[derive(Default)]
pub struct StatsAccumulator {
    /// Counters.
    counters: BTreeMap<String, i64>,

    /// Integer distributions.
    int_distributions: BTreeMap<String, StatsDistribution>,

    /// Ratios as (numerator, denominator).
    ratios: BTreeMap<String, (i64, i64)>,
}

impl StatsAccumulator {
    /// Accumulates a counter value.
    ///
    /// * `name` - Statistic name.
    /// * `val`  - Counter value.
    pub fn report_counter(&mut self, name: &str, val: i64) {
        *self.counters.entry(name.to_string()).or_insert(0) += val;
    }

    /// Accumulates an integer distribution.
    ///
    /// * `name`    - Statistic name.
    /// * `distrib` - Distribution.
    pub fn report_int_distribution(&mut self, name: &str, distrib: &StatsDistribution) {
        self.int_distributions
            .entry(name.to_string())
            .or_default()
            .merge(distrib);
    }

    /// Accumulates a ratio.
    ///
    /// * `name`  - Statistic name.
    /// * `num`   - Numerator.
    /// * `denom` - Denominator.
    pub fn report_ratio(&mut self, name: &str, num: i64, denom: i64) {
        let v = self.ratios.entry(name.to_string()).or_insert((0, 0));
        v.0 += num;
        v.1 += denom;
    }

    /// Returns an accumulated counter.
    ///
    /// * `name` - Statistic name.
    pub fn counter(&self, name: &str) -> Option<i64> {
        self.counters.get(name).copied()
    }

    /// Returns an accumulated distribution.
    ///
    /// * `name` - Statistic name.
    pub fn int_distribution(&self, name: &str) -> Option<StatsDistribution> {
        self.int_distributions.get(name).copied()
    }

    /// Returns an accumulated ratio.
    ///
    /// * `name` - Statistic name.
    pub fn ratio(&self, name: &str) -> Option<(i64, i64)> {
        self.ratios.get(name).copied()
    }

    /// Formats the statistics grouped by category.
    pub fn report(&self) -> String {
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for (k, v) in self.counters.iter().filter(|(_, v)| **v != 0) {
            let (category, title) = category_and_title(k);
            groups
                .entry(category)
                .or_default()
                .push(format!("{title:<42}               {v:12}"));
        }

        for (k, d) in self.int_distributions.iter().filter(|(_, d)| d.count > 0) {
            let (category, title) = category_and_title(k);
            let mn = d.min.unwrap_or(0);
            let mx = d.max.unwrap_or(0);
            groups.entry(category).or_default().push(format!(
                "{title:<42}                      {:.3} avg [range {mn} - {mx}]",
                d.average()
            ));
        }

        for (k, &(num, denom)) in self.ratios.iter().filter(|(_, r)| r.1 != 0) {
            let (category, title) = category_and_title(k);
            groups.entry(category).or_default().push(format!(
                "{title:<42}{num:12} / {denom:12} ({:.2}x)",
                num as f64 / denom as f64
            ));
        }

        let mut out = String::from("Statistics:\n");
        for (category, items) in groups {
            out.push_str(&format!("  {category}\n"));
            for item in items {
                out.push_str(&format!("    {item}\n"));
            }
        }
        out
    }

    /// Prints the report to stdout.
    pub fn print(&self) {
        print!("{}", self.report());
    }

    /// Clear the accumulated statistics.
    pub fn clear(&mut self) {
        self.counters.clear();
        self.int_distributions.clear();
        self.ratios.clear();
    }
}

/// Splits a statistic name at the first `/` into category and title.
///
/// * `s` - The statistic name.
fn category_and_title(s: &str) -> (String, String) {
    match s.split_once('/') {
        Some((category, title)) => (category.to_string(), title.to_string()),
        None => (String::new(), s.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distributions_merge_across_threads() {
        let mut a = StatsDistribution::default();
        [1, 4, 2].iter().for_each(|v| a.report(*v));
        let mut b = StatsDistribution::default();
        [7, 0].iter().for_each(|v| b.report(*v));

        let mut accum = StatsAccumulator::default();
        accum.report_int_distribution("Integrator/Path length", &a);
        accum.report_int_distribution("Integrator/Path length", &b);

        let d = accum.int_distribution("Integrator/Path length").unwrap();
        assert_eq!(d.count, 5);
        assert_eq!(d.sum, 14);
        assert_eq!(d.min, Some(0));
        assert_eq!(d.max, Some(7));
    }

    #[test]
    fn counters_sum_and_report_by_category() {
        let mut accum = StatsAccumulator::default();
        accum.report_counter("Integrator/Volume interactions", 3);
        accum.report_counter("Integrator/Volume interactions", 4);
        accum.report_ratio("Layered/Walk depth", 10, 4);
        assert_eq!(accum.counter("Integrator/Volume interactions"), Some(7));
        let text = accum.report();
        assert!(text.contains("  Integrator\n"));
        assert!(text.contains("Volume interactions"));
        assert!(text.contains("(2.50x)"));
        accum.clear();
        assert_eq!(accum.counter("Integrator/Volume interactions"), None);
    }
}
