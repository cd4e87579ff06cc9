//! Time-domain value history.
//!
//! A [`History`] logs one quantity (a port voltage or branch current) against
//! a [`TimeGrid`]. The grid is normally shared: the analysis driver owns a
//! time logger (see [`History::time_logger`]) and every element history
//! adopts its grid through [`History::apply`]. Each history owns its value
//! series exclusively.
//!
//! Values are right-aligned with the grid: the newest value belongs to the
//! newest time. Old values are pruned once they fall outside the age bound,
//! so the value series may be shorter than the grid.
//!
//! After a rejected step the driver truncates the element histories first
//! and the shared grid last; value alignment is computed from the grid
//! length.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, trace};
use nodal_interp::{Boundary, Spline};

/// Values older than the age bound are only erased once this many have
/// accumulated.
pub const DEFAULT_PRUNE_BATCH: usize = 127;

/// Number of samples older than the age bound that pruning always keeps.
const KEEP_OLD: usize = 2;

/// A shared, append-mostly time vector.
///
/// Clones refer to the same vector; a push through one handle is seen by
/// every history that adopted it.
#[derive(Debug, Clone, Default)]
pub struct TimeGrid(Arc<RwLock<Vec<f64>>>);

impl TimeGrid {
    /// Create an empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<f64>> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<f64>> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a time point.
    pub fn push(&self, t: f64) {
        self.write().push(t);
    }

    /// Remove every time point newer than `tcut`.
    pub fn truncate(&self, tcut: f64) {
        let mut times = self.write();
        let keep = times.partition_point(|&t| t <= tcut);
        times.truncate(keep);
    }

    /// Remove every time point.
    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<f64> {
        self.read().get(idx).copied()
    }

    pub fn last(&self) -> Option<f64> {
        self.read().last().copied()
    }

    /// Copy of the current time points.
    pub fn snapshot(&self) -> Vec<f64> {
        self.read().clone()
    }

    /// Check whether two handles refer to the same grid.
    pub fn same_as(&self, other: &TimeGrid) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Retention parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryParams {
    /// Retention span in seconds; 0 keeps everything.
    pub age: f64,
    /// Minimum number of expired values erased at once.
    pub prune_batch: usize,
}

impl Default for HistoryParams {
    fn default() -> Self {
        Self {
            age: 0.0,
            prune_batch: DEFAULT_PRUNE_BATCH,
        }
    }
}

impl HistoryParams {
    /// Parameters with the given age bound and the default batch.
    pub fn with_age(age: f64) -> Self {
        Self {
            age,
            ..Default::default()
        }
    }
}

/// Where a history's values live.
#[derive(Debug, Clone)]
enum Series {
    /// An owned value series aligned against the grid.
    Owned(Vec<f64>),
    /// The values are the grid itself.
    TimeGrid,
}

/// Which side of the nearest sample a query time lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Query time is before the sample.
    Before,
    /// Query time coincides with the sample.
    Exact,
    /// Query time is after the sample.
    After,
}

/// Result of a nearest-sample search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nearest {
    /// Logical sample index (0 is the oldest retained sample).
    pub index: usize,
    pub side: Side,
}

/// One logged quantity.
#[derive(Debug, Clone)]
pub struct History {
    grid: TimeGrid,
    values: Series,
    params: HistoryParams,
}

impl Default for History {
    fn default() -> Self {
        Self::new(HistoryParams::default())
    }
}

impl History {
    /// Create a history with its own, empty time grid.
    pub fn new(params: HistoryParams) -> Self {
        Self {
            grid: TimeGrid::new(),
            values: Series::Owned(Vec::new()),
            params,
        }
    }

    /// Create a history whose values are its own time grid.
    ///
    /// Pushing a value appends a time point. Used by the analysis driver to
    /// log the global time grid that element histories then adopt.
    pub fn time_logger() -> Self {
        Self {
            grid: TimeGrid::new(),
            values: Series::TimeGrid,
            params: HistoryParams::default(),
        }
    }

    /// Check whether this history logs its own grid.
    pub fn is_time_logger(&self) -> bool {
        matches!(self.values, Series::TimeGrid)
    }

    /// Adopt the time grid of `other`.
    pub fn apply(&mut self, other: &History) {
        self.grid = other.grid.clone();
    }

    /// Adopt a time grid handle directly.
    pub fn set_grid(&mut self, grid: TimeGrid) {
        self.grid = grid;
    }

    /// The time grid this history is aligned against.
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    pub fn age(&self) -> f64 {
        self.params.age
    }

    pub fn set_age(&mut self, age: f64) {
        self.params.age = age;
    }

    pub fn params(&self) -> HistoryParams {
        self.params
    }

    pub fn set_params(&mut self, params: HistoryParams) {
        self.params = params;
    }

    /// Run `f` on the aligned (times, values) slices.
    fn with_view<R>(&self, f: impl FnOnce(&[f64], &[f64]) -> R) -> R {
        let grid = self.grid.read();
        match &self.values {
            Series::TimeGrid => f(&grid, &grid),
            Series::Owned(values) => {
                let n = grid.len().min(values.len());
                f(&grid[grid.len() - n..], &values[values.len() - n..])
            }
        }
    }

    /// Check that the time grid covers every stored value.
    ///
    /// A history whose values outrun its grid (usually one that never
    /// adopted the driver's grid) is neither pruned nor fully visible.
    pub fn is_aligned(&self) -> bool {
        match &self.values {
            Series::TimeGrid => true,
            Series::Owned(values) => values.len() <= self.grid.len(),
        }
    }

    /// Number of retained samples.
    pub fn len(&self) -> usize {
        self.with_view(|times, _| times.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Time of the oldest retained sample, or 0.0 if empty.
    pub fn first(&self) -> f64 {
        self.with_view(|times, _| times.first().copied().unwrap_or(0.0))
    }

    /// Time of the newest sample, or 0.0 if empty.
    pub fn last(&self) -> f64 {
        self.with_view(|times, _| times.last().copied().unwrap_or(0.0))
    }

    /// Time of logical sample `idx`, or 0.0 if out of range.
    pub fn time_at(&self, idx: usize) -> f64 {
        self.with_view(|times, _| times.get(idx).copied().unwrap_or(0.0))
    }

    /// Value of logical sample `idx`, or 0.0 if out of range.
    pub fn value_at(&self, idx: usize) -> f64 {
        self.with_view(|_, values| values.get(idx).copied().unwrap_or(0.0))
    }

    /// Append a value for the newest time point and prune expired values.
    pub fn push_back(&mut self, value: f64) {
        match &mut self.values {
            Series::TimeGrid => self.grid.push(value),
            Series::Owned(values) => {
                values.push(value);
                self.prune();
            }
        }
    }

    /// Erase values older than the age bound in batches, keeping the two
    /// newest expired ones.
    fn prune(&mut self) {
        let age = self.params.age;
        if age <= 0.0 {
            return;
        }
        let Series::Owned(values) = &mut self.values else {
            return;
        };

        let grid = self.grid.read();
        let n = values.len();
        if grid.len() < n {
            if grid.len() + 1 == n {
                debug!(
                    "history: {} values outrun a {}-point time grid, not pruning",
                    n,
                    grid.len()
                );
            }
            return;
        }
        if n == 0 {
            return;
        }
        let times = &grid[grid.len() - n..];
        let newest = times[n - 1];
        if newest - times[0] <= age {
            return;
        }

        let expired = times.iter().take_while(|&&t| newest - t >= age).count();
        let erase = expired.saturating_sub(KEEP_OLD);
        if erase > self.params.prune_batch {
            trace!("history: pruning {} of {} values", erase, n);
            values.drain(..erase);
        }
    }

    /// Remove every value newer than `tcut`.
    ///
    /// A time logger truncates its grid; element histories only drop values
    /// and must be truncated before the grid they share.
    pub fn truncate(&mut self, tcut: f64) {
        match &mut self.values {
            Series::TimeGrid => self.grid.truncate(tcut),
            Series::Owned(values) => {
                let grid = self.grid.read();
                let n = grid.len().min(values.len());
                let newer = grid[grid.len() - n..]
                    .iter()
                    .rev()
                    .take_while(|&&t| t > tcut)
                    .count();
                let keep = values.len() - newer;
                values.truncate(keep);
            }
        }
    }

    /// Remove every value. A time logger clears its grid.
    pub fn clear(&mut self) {
        match &mut self.values {
            Series::TimeGrid => self.grid.clear(),
            Series::Owned(values) => values.clear(),
        }
    }

    /// Find the retained sample closest to `t`.
    ///
    /// On a tie the older sample wins. Returns `None` if empty.
    pub fn seek(&self, t: f64) -> Option<Nearest> {
        self.with_view(|times, _| seek(times, t))
    }

    /// Value at time `t`.
    ///
    /// Without `interpolate` this is the value of the nearest sample. With
    /// it, a natural spline through the two samples on either side of `t`
    /// refines the answer; if that window is not available the nearest
    /// value is returned. An empty history yields 0.0.
    pub fn nearest(&self, t: f64, interpolate: bool) -> f64 {
        self.with_view(|times, values| {
            let Some(hit) = seek(times, t) else {
                return 0.0;
            };
            let raw = values[hit.index];
            if !interpolate || hit.side == Side::Exact {
                return raw;
            }
            refine(times, values, hit, t).unwrap_or(raw)
        })
    }
}

/// Iterative bisection for the sample closest to `t`.
fn seek(times: &[f64], t: f64) -> Option<Nearest> {
    if times.is_empty() {
        return None;
    }

    let (mut lo, mut hi) = (0, times.len() - 1);
    let mut best = 0;
    let mut best_diff = f64::INFINITY;
    loop {
        let mid = lo + (hi - lo) / 2;
        let diff = times[mid] - t;
        let dist = diff.abs();
        if dist < best_diff || (dist == best_diff && mid < best) {
            best = mid;
            best_diff = dist;
        }
        if diff == 0.0 || lo == hi {
            break;
        }
        if diff < 0.0 {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }

    let side = match t.partial_cmp(&times[best]) {
        Some(std::cmp::Ordering::Less) => Side::Before,
        Some(std::cmp::Ordering::Greater) => Side::After,
        _ => Side::Exact,
    };
    Some(Nearest { index: best, side })
}

/// Local four-point spline around the interval bracketing `t`.
fn refine(times: &[f64], values: &[f64], hit: Nearest, t: f64) -> Option<f64> {
    let left = match hit.side {
        Side::After => hit.index,
        _ => hit.index.checked_sub(1)?,
    };
    let start = left.checked_sub(1)?;
    let end = left + 2;
    if end >= times.len() {
        return None;
    }

    let x = &times[start..=end];
    if x.windows(2).any(|w| w[1] == w[0]) {
        return None;
    }
    let spline = Spline::from_points(&values[start..=end], x, Boundary::Natural).ok()?;
    Some(spline.evaluate(t).f0)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Time logger with `times` and one history with `values` on it.
    fn logged(times: &[f64], values: &[f64], params: HistoryParams) -> (History, History) {
        let mut clock = History::time_logger();
        let mut h = History::new(params);
        h.apply(&clock);
        for (&t, &v) in times.iter().zip(values) {
            clock.push_back(t);
            h.push_back(v);
        }
        (clock, h)
    }

    fn ramp() -> (History, History) {
        let times: Vec<f64> = (0..10).map(|k| k as f64).collect();
        let values: Vec<f64> = times.iter().map(|t| 10.0 * t).collect();
        logged(&times, &values, HistoryParams::default())
    }

    #[test]
    fn test_values_without_grid_are_not_aligned() {
        let mut h = History::new(HistoryParams::with_age(1.0));
        for k in 0..3 {
            h.push_back(k as f64);
        }
        assert!(!h.is_aligned());
        assert_eq!(h.len(), 0);
        assert_eq!(h.nearest(1.0, false), 0.0);

        let mut clock = History::time_logger();
        for k in 0..3 {
            clock.push_back(k as f64);
        }
        h.apply(&clock);
        assert!(h.is_aligned());
        assert_eq!(h.len(), 3);
        assert_eq!(h.nearest(1.0, false), 1.0);
        assert!(clock.is_aligned());
    }

    #[test]
    fn test_nearest_raw() {
        let (_, h) = ramp();
        assert_eq!(h.nearest(4.4, false), 40.0);
        assert_eq!(h.nearest(4.6, false), 50.0);
        assert_eq!(h.nearest(7.0, false), 70.0);
    }

    #[test]
    fn test_nearest_interpolated() {
        let (_, h) = ramp();
        let v = h.nearest(4.4, true);
        assert!((v - 44.0).abs() < 1e-9, "nearest(4.4) = {}, expected 44", v);
        let v = h.nearest(4.6, true);
        assert!((v - 46.0).abs() < 1e-9, "nearest(4.6) = {}, expected 46", v);
    }

    #[test]
    fn test_nearest_edges_fall_back_to_raw() {
        let (_, h) = ramp();
        // No sample left of the bracket.
        assert_eq!(h.nearest(0.3, true), 0.0);
        // Outside the logged range.
        assert_eq!(h.nearest(-2.0, true), 0.0);
        assert_eq!(h.nearest(12.0, true), 90.0);
    }

    #[test]
    fn test_nearest_empty() {
        let h = History::default();
        assert_eq!(h.nearest(1.0, true), 0.0);
        assert!(h.seek(1.0).is_none());
    }

    #[test]
    fn test_seek_tie_prefers_older() {
        let (_, h) = logged(&[0.0, 1.0, 2.0], &[5.0, 6.0, 7.0], HistoryParams::default());
        let hit = h.seek(0.5).unwrap();
        assert_eq!(hit.index, 0);
        assert_eq!(hit.side, Side::After);

        let hit = h.seek(2.0).unwrap();
        assert_eq!(hit.index, 2);
        assert_eq!(hit.side, Side::Exact);
    }

    #[test]
    fn test_accessors() {
        let (_, h) = ramp();
        assert_eq!(h.len(), 10);
        assert_eq!(h.first(), 0.0);
        assert_eq!(h.last(), 9.0);
        assert_eq!(h.time_at(3), 3.0);
        assert_eq!(h.value_at(3), 30.0);
        assert_eq!(h.value_at(99), 0.0);
    }

    #[test]
    fn test_truncate_then_grid() {
        let (mut clock, mut h) = ramp();
        h.truncate(5.5);
        clock.truncate(5.5);

        assert_eq!(clock.len(), 6);
        assert_eq!(h.len(), 6);
        assert_eq!(h.last(), 5.0);
        assert_eq!(h.value_at(5), 50.0);

        // Continue from the retry point.
        clock.push_back(5.75);
        h.push_back(57.5);
        assert_eq!(h.nearest(5.75, false), 57.5);
    }

    #[test]
    fn test_time_logger_values_are_times() {
        let mut clock = History::time_logger();
        for t in [0.0, 0.5, 1.25] {
            clock.push_back(t);
        }
        assert!(clock.is_time_logger());
        assert_eq!(clock.len(), 3);
        assert_eq!(clock.nearest(1.2, false), 1.25);
    }

    #[test]
    fn test_apply_shares_grid() {
        let mut clock = History::time_logger();
        let mut a = History::default();
        let mut b = History::default();
        a.apply(&clock);
        b.apply(&clock);
        assert!(a.grid().same_as(b.grid()));

        clock.push_back(0.0);
        a.push_back(1.0);
        b.push_back(2.0);
        assert_eq!(a.len(), 1);
        assert_eq!(b.nearest(0.0, false), 2.0);
    }

    #[test]
    fn test_prune_bounds_retention() {
        let age = 10.0;
        let dt = 0.1;
        let times: Vec<f64> = (0..1000).map(|k| k as f64 * dt).collect();
        let values: Vec<f64> = times.iter().map(|t| t.sin()).collect();
        let (clock, h) = logged(&times, &values, HistoryParams::with_age(age));

        assert_eq!(clock.len(), 1000);
        assert!(h.len() < 1000, "expired values were never pruned");
        // Within-age samples plus the kept old ones plus one pending batch.
        assert!(h.len() <= 101 + KEEP_OLD + DEFAULT_PRUNE_BATCH + 1);
        assert!(
            h.last() - h.first() >= age - 1e-9,
            "history no longer covers its age bound"
        );
        assert!((h.nearest(99.9, false) - 99.9f64.sin()).abs() < 1e-12);
    }

    #[test]
    fn test_prune_batch_is_tunable() {
        let times: Vec<f64> = (0..50).map(|k| k as f64).collect();
        let params = HistoryParams {
            age: 5.0,
            prune_batch: 4,
        };
        let (_, h) = logged(&times, &times, params);
        assert!(h.len() <= 6 + KEEP_OLD + 4 + 1, "len = {}", h.len());
        assert!(h.last() - h.first() >= 5.0);
    }

    #[test]
    fn test_zero_age_keeps_everything() {
        let times: Vec<f64> = (0..500).map(|k| k as f64).collect();
        let (_, h) = logged(&times, &times, HistoryParams::default());
        assert_eq!(h.len(), 500);
    }

    #[test]
    fn test_time_stays_monotonic() {
        let times: Vec<f64> = (0..400).map(|k| k as f64 * 0.5).collect();
        let (mut clock, mut h) = logged(&times, &times, HistoryParams::with_age(20.0));
        h.truncate(150.0);
        clock.truncate(150.0);
        for k in 1..50 {
            let t = 150.0 + k as f64 * 0.25;
            clock.push_back(t);
            h.push_back(t);
        }

        let grid = clock.grid().snapshot();
        assert!(grid.windows(2).all(|w| w[0] <= w[1]));
        assert!(grid.len() >= h.len());
        for i in 0..h.len() {
            assert_eq!(h.time_at(i), h.value_at(i));
        }
    }
}
