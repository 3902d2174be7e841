//! Shares identical coordinates across the variables of one group.

use coord_common::{IndexError, IndexResult};
use std::collections::HashMap;

use crate::coordinate::Coordinate;
use crate::time2d::CoordinateTime2D;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Collecting,
    Finished,
}

/// Dedups whole coordinates so each distinct axis is stored once per group.
///
/// Variables contribute their coordinate lists with
/// [`add_coords`](Self::add_coords); after [`finish`](Self::finish) each
/// list maps to positions in the shared list.
#[derive(Debug, Clone)]
pub struct CoordinateSharer {
    shared: Vec<Coordinate>,
    positions: HashMap<Coordinate, usize>,
    phase: Phase,
}

impl Default for CoordinateSharer {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordinateSharer {
    pub fn new() -> Self {
        Self {
            shared: Vec::new(),
            positions: HashMap::new(),
            phase: Phase::Collecting,
        }
    }

    pub fn add_coords(&mut self, coords: &[Coordinate]) -> IndexResult<()> {
        if self.phase == Phase::Finished {
            return Err(IndexError::illegal_state("sharer: add_coords after finish"));
        }
        for coord in coords {
            self.insert(coord);
        }
        Ok(())
    }

    fn insert(&mut self, coord: &Coordinate) -> usize {
        if let Some(&idx) = self.positions.get(coord) {
            return idx;
        }
        let idx = self.shared.len();
        self.shared.push(coord.clone());
        self.positions.insert(coord.clone(), idx);
        idx
    }

    /// Freeze the shared list. The runtime axis of every 2D time coordinate
    /// is shared too, so it is appended when no equal runtime is present.
    pub fn finish(&mut self) -> IndexResult<&[Coordinate]> {
        if self.phase == Phase::Finished {
            return Err(IndexError::illegal_state("sharer: finish called twice"));
        }

        let runtimes: Vec<Coordinate> = self
            .shared
            .iter()
            .filter_map(Coordinate::as_time2d)
            .map(|time2d| Coordinate::Runtime(time2d.runtime().clone()))
            .collect();
        for runtime in &runtimes {
            self.insert(runtime);
        }

        self.phase = Phase::Finished;
        tracing::debug!(shared = self.shared.len(), "shared coordinates finished");
        Ok(&self.shared)
    }

    pub fn shared(&self) -> IndexResult<&[Coordinate]> {
        match self.phase {
            Phase::Finished => Ok(&self.shared),
            Phase::Collecting => Err(IndexError::illegal_state(
                "sharer: shared coordinates requested before finish",
            )),
        }
    }

    /// Position of each coordinate in the shared list.
    pub fn reindex_to_shared(&self, coords: &[Coordinate]) -> IndexResult<Vec<usize>> {
        self.shared()?;
        coords.iter().map(|coord| self.position(coord)).collect()
    }

    /// Position of the runtime axis a 2D time coordinate shares.
    pub fn runtime_index(&self, time2d: &CoordinateTime2D) -> IndexResult<usize> {
        self.shared()?;
        self.position(&Coordinate::Runtime(time2d.runtime().clone()))
    }

    fn position(&self, coord: &Coordinate) -> IndexResult<usize> {
        self.positions.get(coord).copied().ok_or_else(|| {
            tracing::error!(kind = %coord.kind(), size = coord.size(), "coordinate was never shared");
            IndexError::invariant(format!(
                "{} coordinate of size {} missing from shared list",
                coord.kind(),
                coord.size()
            ))
        })
    }
}
