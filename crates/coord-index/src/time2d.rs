//! Two-dimensional (run, forecast offset) time coordinate.
//!
//! Every run carries its own set of forecast offsets. When all runs share
//! one offset sequence the coordinate is *orthogonal* and addresses data as
//! `(run_index, shared_time_index)`. When runs of the same cycle hour share
//! offsets it is *regular*. Otherwise each run keeps an explicit axis.
//!
//! Whatever the layout, the coordinate's value sequence is the full sorted
//! list of `Time2D` pairs.

use chrono::{DateTime, Utc};
use coord_common::{run_hour, IndexError, IndexResult, Time2D, TimeUnit};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use crate::axis::Axis;

/// How forecast offsets are laid out across runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TimeLayout {
    /// One offset axis shared by every run.
    Orthogonal(Axis<i32>),
    /// One offset axis per UTC hour of day of the runtime.
    Regular(BTreeMap<u32, Axis<i32>>),
    /// One offset axis per run, in runtime order.
    Explicit(Vec<Axis<i32>>),
}

/// Runtime axis plus per-run forecast offsets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoordinateTime2D {
    runtime: Axis<DateTime<Utc>>,
    layout: TimeLayout,
    values: Vec<Time2D>,
}

impl CoordinateTime2D {
    /// Classify per-run offset axes and build the coordinate.
    ///
    /// `times[i]` holds the offsets of `runtime[i]`.
    pub(crate) fn assemble(
        runtime: Axis<DateTime<Utc>>,
        times: Vec<Axis<i32>>,
        detect_regular: bool,
    ) -> Self {
        debug_assert_eq!(runtime.len(), times.len());

        let mut values = Vec::with_capacity(times.iter().map(Axis::len).sum());
        for (run, offsets) in runtime.iter().zip(&times) {
            values.extend(offsets.iter().map(|&time| Time2D::new(*run, time)));
        }

        let layout = if times.windows(2).all(|w| w[0] == w[1]) {
            TimeLayout::Orthogonal(times.into_iter().next().unwrap_or_default())
        } else if let Some(regular) = detect_regular
            .then(|| group_by_hour(&runtime, &times))
            .flatten()
        {
            TimeLayout::Regular(regular)
        } else {
            TimeLayout::Explicit(times)
        };

        Self {
            runtime,
            layout,
            values,
        }
    }

    /// Build from a sorted, deduplicated pair list.
    pub(crate) fn from_sorted_values(values: Vec<Time2D>, detect_regular: bool) -> Self {
        let mut runs = Vec::new();
        let mut times: Vec<Vec<i32>> = Vec::new();
        for t in &values {
            if runs.last() != Some(&t.run) {
                runs.push(t.run);
                times.push(Vec::new());
            }
            if let Some(offsets) = times.last_mut() {
                offsets.push(t.time);
            }
        }

        let times = times.into_iter().map(Axis::from_sorted_unchecked).collect();
        Self::assemble(Axis::from_sorted_unchecked(runs), times, detect_regular)
    }

    /// Rebuild from a persisted pair list, rejecting unsorted input.
    pub fn from_values(values: Vec<Time2D>, detect_regular: bool) -> IndexResult<Self> {
        let values = Axis::from_sorted(values)?.into_vec();
        Ok(Self::from_sorted_values(values, detect_regular))
    }

    pub fn runtime(&self) -> &Axis<DateTime<Utc>> {
        &self.runtime
    }

    pub fn layout(&self) -> &TimeLayout {
        &self.layout
    }

    pub fn is_orthogonal(&self) -> bool {
        matches!(self.layout, TimeLayout::Orthogonal(_))
    }

    pub fn is_regular(&self) -> bool {
        matches!(self.layout, TimeLayout::Regular(_))
    }

    pub fn nruns(&self) -> usize {
        self.runtime.len()
    }

    /// Largest number of offsets any run has.
    pub fn ntimes(&self) -> usize {
        match &self.layout {
            TimeLayout::Orthogonal(shared) => shared.len(),
            TimeLayout::Regular(by_hour) => by_hour.values().map(Axis::len).max().unwrap_or(0),
            TimeLayout::Explicit(times) => times.iter().map(Axis::len).max().unwrap_or(0),
        }
    }

    /// Sorted pair list; this is the coordinate's value sequence.
    pub fn values(&self) -> &[Time2D] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Position of a pair in the value sequence.
    pub fn index_of(&self, value: &Time2D) -> Option<usize> {
        self.values.binary_search(value).ok()
    }

    /// Offset axis of one run.
    pub fn time_coordinate(&self, run_idx: usize) -> Option<&Axis<i32>> {
        match &self.layout {
            TimeLayout::Orthogonal(shared) => (run_idx < self.nruns()).then_some(shared),
            TimeLayout::Regular(by_hour) => {
                let run = self.runtime.get(run_idx)?;
                by_hour.get(&run_hour(run))
            }
            TimeLayout::Explicit(times) => times.get(run_idx),
        }
    }

    /// The pair at `(run_idx, time_idx)` of the 2D layout.
    pub fn time2d_at(&self, run_idx: usize, time_idx: usize) -> Option<Time2D> {
        let run = self.runtime.get(run_idx)?;
        let time = self.time_coordinate(run_idx)?.get(time_idx)?;
        Some(Time2D::new(*run, *time))
    }

    /// Inverse of [`time2d_at`](Self::time2d_at).
    pub fn find_index(&self, value: &Time2D) -> Option<(usize, usize)> {
        let run_idx = self.runtime.index_of(&value.run)?;
        let time_idx = self.time_coordinate(run_idx)?.index_of(&value.time)?;
        Some((run_idx, time_idx))
    }

    /// Offset of a run from the first runtime.
    pub fn run_offset(&self, run_idx: usize, unit: TimeUnit) -> Option<i32> {
        let first = self.runtime.first()?;
        let run = self.runtime.get(run_idx)?;
        Some(unit.offset_between(*first, *run))
    }

    /// Unique offsets across all runs, ascending.
    pub fn offsets_sorted(&self) -> Vec<i32> {
        match &self.layout {
            TimeLayout::Orthogonal(shared) => shared.as_slice().to_vec(),
            TimeLayout::Regular(by_hour) => collect_sorted(by_hour.values()),
            TimeLayout::Explicit(times) => collect_sorted(times.iter()),
        }
    }

    /// Build the "best" time coordinate: every valid time reachable from any
    /// run, each attributed to the latest run that produces it.
    ///
    /// `master` is the collection-wide runtime axis; each run of this
    /// coordinate must appear on it.
    pub fn make_best(&self, master: &Axis<DateTime<Utc>>, unit: TimeUnit) -> IndexResult<BestTime> {
        let mut run_to_master = Vec::with_capacity(self.nruns());
        for run in self.runtime.iter() {
            let idx = master.index_of(run).ok_or_else(|| {
                IndexError::invariant(format!("runtime {} missing from master runtime axis", run))
            })?;
            run_to_master.push(idx);
        }

        let mut valid = BTreeSet::new();
        for run_idx in 0..self.nruns() {
            let shift = self.run_offset(run_idx, unit).unwrap_or(0);
            if let Some(offsets) = self.time_coordinate(run_idx) {
                valid.extend(offsets.iter().map(|t| t + shift));
            }
        }
        let offsets = Axis::from_sorted_unchecked(valid.into_iter().collect());
        let position: HashMap<i32, usize> =
            offsets.iter().enumerate().map(|(i, &v)| (v, i)).collect();

        // later runs overwrite earlier ones
        let mut time_to_runtime = vec![0u32; offsets.len()];
        for (run_idx, &master_idx) in run_to_master.iter().enumerate() {
            let shift = self.run_offset(run_idx, unit).unwrap_or(0);
            let Some(run_offsets) = self.time_coordinate(run_idx) else {
                continue;
            };
            for t in run_offsets.iter() {
                let slot = position.get(&(t + shift)).copied().ok_or_else(|| {
                    IndexError::invariant(format!("best offset {} not collected", t + shift))
                })?;
                time_to_runtime[slot] = master_idx as u32 + 1;
            }
        }

        Ok(BestTime {
            reference: self.runtime.first().copied(),
            unit,
            offsets,
            time_to_runtime,
        })
    }
}

fn group_by_hour(
    runtime: &Axis<DateTime<Utc>>,
    times: &[Axis<i32>],
) -> Option<BTreeMap<u32, Axis<i32>>> {
    let mut by_hour: BTreeMap<u32, Axis<i32>> = BTreeMap::new();
    for (run, offsets) in runtime.iter().zip(times) {
        match by_hour.entry(run_hour(run)) {
            Entry::Vacant(slot) => {
                slot.insert(offsets.clone());
            }
            Entry::Occupied(slot) => {
                if slot.get() != offsets {
                    return None;
                }
            }
        }
    }
    Some(by_hour)
}

fn collect_sorted<'a>(axes: impl Iterator<Item = &'a Axis<i32>>) -> Vec<i32> {
    let set: BTreeSet<i32> = axes.flat_map(|axis| axis.iter().copied()).collect();
    set.into_iter().collect()
}

impl fmt::Display for CoordinateTime2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "time2D nruns={} ntimes={} isOrthogonal={} isRegular={}",
            self.nruns(),
            self.ntimes(),
            self.is_orthogonal(),
            self.is_regular()
        )
    }
}

/// Persisted form: the pair list plus whether regular grouping was found.
#[derive(Serialize, Deserialize)]
struct Time2DParts {
    values: Vec<Time2D>,
    regular: bool,
}

impl Serialize for CoordinateTime2D {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Time2DParts {
            values: self.values.clone(),
            regular: self.is_regular(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CoordinateTime2D {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let parts = Time2DParts::deserialize(deserializer)?;
        CoordinateTime2D::from_values(parts.values, parts.regular).map_err(serde::de::Error::custom)
    }
}

/// Valid-time coordinate where each time comes from the latest run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestTime {
    /// First runtime of the source coordinate; offsets count from here.
    pub reference: Option<DateTime<Utc>>,
    pub unit: TimeUnit,
    pub offsets: Axis<i32>,
    /// 1-based index into the master runtime axis per offset, 0 = missing.
    pub time_to_runtime: Vec<u32>,
}

impl BestTime {
    /// Master runtime index that supplies offset `idx`.
    pub fn runtime_index(&self, idx: usize) -> Option<usize> {
        match self.time_to_runtime.get(idx) {
            Some(&k) if k > 0 => Some(k as usize - 1),
            _ => None,
        }
    }
}
