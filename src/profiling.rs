//! Simulation Counters
//!
//! Deterministic per-pass statistics for the collision pipeline. Everything
//! here counts work items rather than wall-clock time, so the numbers are
//! reproducible across platforms and replay runs, and the module works
//! without any clock at all on `no_std` targets.
//!
//! [`crate::world::World`] fills a [`StepStats`] on every collision pass;
//! a [`StepProfiler`] accumulates those frames into totals, averages and
//! peaks per counter.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Work counts from a single collision pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Narrow-phase tests performed (pairs that survived the skip checks).
    pub pairs_tested: u32,
    /// Contacts found and handed to the resolver.
    pub contacts_resolved: u32,
    /// Enabled bodies seen by the pass.
    pub active_bodies: u32,
    /// Enabled bodies with infinite mass.
    pub static_bodies: u32,
}

/// Accumulated history of one counter across frames.
#[derive(Clone, Debug)]
pub struct CounterEntry {
    /// Counter name.
    pub name: &'static str,
    /// Sum over all recorded frames.
    pub total: u64,
    /// Number of frames recorded.
    pub frames: u64,
    /// Most recent frame's value.
    pub last: u32,
    /// Largest single-frame value.
    pub peak: u32,
}

impl CounterEntry {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            total: 0,
            frames: 0,
            last: 0,
            peak: 0,
        }
    }

    /// Mean value per recorded frame.
    #[inline]
    pub fn average(&self) -> u64 {
        if self.frames == 0 {
            0
        } else {
            self.total / self.frames
        }
    }

    fn record(&mut self, value: u32) {
        self.total += u64::from(value);
        self.frames += 1;
        self.last = value;
        if value > self.peak {
            self.peak = value;
        }
    }

    fn reset(&mut self) {
        self.total = 0;
        self.frames = 0;
        self.last = 0;
        self.peak = 0;
    }
}

/// Narrow-phase test counter index.
pub const COUNTER_PAIRS_TESTED: usize = 0;
/// Resolved contact counter index.
pub const COUNTER_CONTACTS_RESOLVED: usize = 1;
/// Active body counter index.
pub const COUNTER_ACTIVE_BODIES: usize = 2;
/// Static body counter index.
pub const COUNTER_STATIC_BODIES: usize = 3;

/// Frame-over-frame accumulator for [`StepStats`].
pub struct StepProfiler {
    entries: Vec<CounterEntry>,
    /// Frames recorded since the last reset.
    pub frame_count: u64,
    /// When false, [`StepProfiler::record_frame`] is a no-op.
    pub enabled: bool,
}

impl StepProfiler {
    /// Profiler with one entry per [`StepStats`] counter.
    pub fn new() -> Self {
        let entries = vec![
            CounterEntry::new("pairs_tested"),
            CounterEntry::new("contacts_resolved"),
            CounterEntry::new("active_bodies"),
            CounterEntry::new("static_bodies"),
        ];

        Self {
            entries,
            frame_count: 0,
            enabled: true,
        }
    }

    /// Fold one pass's stats into the history.
    pub fn record_frame(&mut self, stats: &StepStats) {
        if !self.enabled {
            return;
        }

        self.entries[COUNTER_PAIRS_TESTED].record(stats.pairs_tested);
        self.entries[COUNTER_CONTACTS_RESOLVED].record(stats.contacts_resolved);
        self.entries[COUNTER_ACTIVE_BODIES].record(stats.active_bodies);
        self.entries[COUNTER_STATIC_BODIES].record(stats.static_bodies);
        self.frame_count += 1;
    }

    /// Counter history by index.
    pub fn get(&self, counter: usize) -> Option<&CounterEntry> {
        self.entries.get(counter)
    }

    /// Most recent frame's value for a counter.
    pub fn last(&self, counter: usize) -> u32 {
        self.entries.get(counter).map_or(0, |e| e.last)
    }

    /// Mean per-frame value for a counter.
    pub fn average(&self, counter: usize) -> u64 {
        self.entries.get(counter).map_or(0, CounterEntry::average)
    }

    /// Clear all history.
    pub fn reset(&mut self) {
        for entry in &mut self.entries {
            entry.reset();
        }
        self.frame_count = 0;
    }

    /// `(name, last, average, peak)` for every counter.
    pub fn summary(&self) -> Vec<(&'static str, u32, u64, u32)> {
        self.entries
            .iter()
            .map(|e| (e.name, e.last, e.average(), e.peak))
            .collect()
    }
}

impl Default for StepProfiler {
    fn default() -> Self {
        Self::new()
    }
}
