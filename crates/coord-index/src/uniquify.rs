//! Canonical per-kind axes and reindexing of sources onto them.
//!
//! Usage runs in two phases:
//!
//! 1. Every source contributes its axes through
//!    [`add_coordinates`](CoordinateUniquify::add_coordinates); values of the
//!    same kind are merged into one running builder.
//! 2. After [`finish`](CoordinateUniquify::finish) the canonical axes are
//!    frozen and each source can be re-expressed against them with
//!    [`reindex`](CoordinateUniquify::reindex).

use coord_common::{CoordinateKind, IndexError, IndexResult};
use rayon::prelude::*;
use std::mem;

use crate::builder::CoordinateBuilder;
use crate::config::IndexConfig;
use crate::coordinate::Coordinate;
use crate::nd::CoordinateND;
use crate::sparse::SparseArrayBuilder;
use crate::time2d::BestTime;
use crate::unionizer::CoordinateTime2DUnionizer;

#[derive(Debug, Clone)]
enum KindAccumulator {
    Plain(CoordinateBuilder),
    Time2D(CoordinateTime2DUnionizer),
}

impl KindAccumulator {
    fn new(kind: CoordinateKind, detect_regular: bool) -> Self {
        match kind {
            CoordinateKind::Time2D => KindAccumulator::Time2D(
                CoordinateTime2DUnionizer::new().with_regular_detection(detect_regular),
            ),
            other => KindAccumulator::Plain(CoordinateBuilder::new(other)),
        }
    }

    fn kind(&self) -> CoordinateKind {
        match self {
            KindAccumulator::Plain(builder) => builder.kind(),
            KindAccumulator::Time2D(_) => CoordinateKind::Time2D,
        }
    }

    fn add(&mut self, coord: &Coordinate) -> IndexResult<()> {
        match self {
            KindAccumulator::Plain(builder) => builder.add_all(coord),
            KindAccumulator::Time2D(unionizer) => unionizer.add_coordinate(coord),
        }
    }

    fn finish(self) -> IndexResult<Coordinate> {
        match self {
            KindAccumulator::Plain(builder) => Ok(builder.finish()),
            KindAccumulator::Time2D(mut unionizer) => {
                unionizer.finish()?;
                unionizer.into_coordinate().map(Coordinate::Time2D)
            }
        }
    }
}

#[derive(Debug, Clone)]
enum State {
    Collecting(Vec<KindAccumulator>),
    Finished(Vec<Coordinate>),
}

/// A source re-expressed on the canonical axes.
#[derive(Debug, Clone, PartialEq)]
pub struct Reindexed<T> {
    pub coordinate: CoordinateND<T>,
    /// Per source axis, `translations[axis][local_idx] = canonical_idx`.
    pub translations: Vec<Vec<usize>>,
}

/// Merges the axes of many sources into one superset axis per kind.
#[derive(Debug, Clone)]
pub struct CoordinateUniquify {
    config: IndexConfig,
    state: State,
}

impl Default for CoordinateUniquify {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordinateUniquify {
    pub fn new() -> Self {
        Self::with_config(IndexConfig::default())
    }

    pub fn with_config(config: IndexConfig) -> Self {
        Self {
            config,
            state: State::Collecting(Vec::new()),
        }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Merge every axis of one source.
    pub fn add_coordinates(&mut self, coords: &[Coordinate]) -> IndexResult<()> {
        for coord in coords {
            self.add_coordinate(coord)?;
        }
        Ok(())
    }

    pub fn add_coordinate(&mut self, coord: &Coordinate) -> IndexResult<()> {
        let State::Collecting(accumulators) = &mut self.state else {
            return Err(IndexError::illegal_state("uniquify: add_coordinates after finish"));
        };

        let kind = coord.kind();
        let idx = match accumulators.iter().position(|acc| acc.kind() == kind) {
            Some(idx) => idx,
            None => {
                accumulators.push(KindAccumulator::new(kind, self.config.detect_regular));
                accumulators.len() - 1
            }
        };
        accumulators[idx].add(coord)
    }

    /// Freeze one canonical axis per kind, in first-seen kind order.
    pub fn finish(&mut self) -> IndexResult<&[Coordinate]> {
        let accumulators = match mem::replace(&mut self.state, State::Finished(Vec::new())) {
            State::Collecting(accumulators) => accumulators,
            finished @ State::Finished(_) => {
                self.state = finished;
                return Err(IndexError::illegal_state("uniquify: finish called twice"));
            }
        };

        let canonical = accumulators
            .into_iter()
            .map(KindAccumulator::finish)
            .collect::<IndexResult<Vec<_>>>()?;

        for coord in &canonical {
            tracing::debug!(kind = %coord.kind(), size = coord.size(), "canonical coordinate");
        }
        tracing::info!(axes = canonical.len(), "canonical coordinates finished");

        self.state = State::Finished(canonical);
        self.canonical()
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Finished(_))
    }

    pub fn canonical(&self) -> IndexResult<&[Coordinate]> {
        match &self.state {
            State::Finished(canonical) => Ok(canonical),
            State::Collecting(_) => Err(IndexError::illegal_state(
                "uniquify: canonical coordinates requested before finish",
            )),
        }
    }

    /// Canonical axis of one kind.
    pub fn canonical_for(&self, kind: CoordinateKind) -> IndexResult<Option<&Coordinate>> {
        Ok(self.canonical()?.iter().find(|c| c.kind() == kind))
    }

    /// Best time coordinate of the canonical 2D time axis, in the configured
    /// time unit. Run indices refer to the canonical runtime axis when there
    /// is one, else to the 2D axis's own runs.
    pub fn best_time(&self) -> IndexResult<Option<BestTime>> {
        let Some(time2d) = self
            .canonical_for(CoordinateKind::Time2D)?
            .and_then(Coordinate::as_time2d)
        else {
            return Ok(None);
        };
        let master = self
            .canonical_for(CoordinateKind::Runtime)?
            .and_then(Coordinate::as_runtime)
            .unwrap_or_else(|| time2d.runtime());
        time2d.make_best(master, self.config.time_unit).map(Some)
    }

    /// Re-express `source` on the canonical axes, keeping its axis order.
    pub fn reindex<T: Clone>(&self, source: &CoordinateND<T>) -> IndexResult<Reindexed<T>> {
        let canonical = self.canonical()?;

        let mut axes = Vec::with_capacity(source.rank());
        let mut translations = Vec::with_capacity(source.rank());
        for local in source.coordinates() {
            let canon = canonical
                .iter()
                .find(|c| c.kind() == local.kind())
                .ok_or_else(|| {
                    tracing::error!(kind = %local.kind(), "no canonical coordinate for source axis");
                    IndexError::invariant(format!("no canonical {} coordinate", local.kind()))
                })?;
            translations.push(translate(local, canon)?);
            axes.push(canon.clone());
        }

        let shape: Vec<usize> = axes.iter().map(Coordinate::size).collect();
        let total = shape
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
            .filter(|&total| total <= self.config.max_total_size)
            .ok_or_else(|| {
                IndexError::configuration(format!(
                    "reindexed shape {:?} exceeds max_total_size {}",
                    shape, self.config.max_total_size
                ))
            })?;

        let mut builder = SparseArrayBuilder::new(shape)?;
        let sparse = source.sparse_array();
        let mut dest = vec![0usize; source.rank()];
        for (flat, record) in sparse.iter() {
            for (axis, local_idx) in sparse.unflatten(flat).into_iter().enumerate() {
                dest[axis] = translations[axis][local_idx];
            }
            builder.set(&dest, record.clone())?;
        }
        let reindexed = builder.finish()?;

        if reindexed.ndups() > 0 || reindexed.count() != sparse.count() {
            tracing::error!(
                ndups = reindexed.ndups(),
                source_count = sparse.count(),
                dest_count = reindexed.count(),
                "reindex aliased distinct source cells"
            );
            return Err(IndexError::invariant(format!(
                "reindex aliased {} source cells",
                reindexed.ndups()
            )));
        }

        tracing::debug!(
            records = reindexed.count(),
            total,
            density = reindexed.density(),
            "source reindexed"
        );

        Ok(Reindexed {
            coordinate: CoordinateND::new(axes, reindexed)?,
            translations,
        })
    }

    /// Reindex a batch of sources, on the rayon pool when the batch is large
    /// enough and parallel reindexing is enabled.
    pub fn reindex_all<T>(&self, sources: &[CoordinateND<T>]) -> IndexResult<Vec<Reindexed<T>>>
    where
        T: Clone + Send + Sync,
    {
        if self.config.use_parallel(sources.len()) {
            tracing::debug!(sources = sources.len(), "reindexing in parallel");
            sources.par_iter().map(|source| self.reindex(source)).collect()
        } else {
            sources.iter().map(|source| self.reindex(source)).collect()
        }
    }

    /// Position in the canonical list of each coordinate: the canonical axis
    /// of the same kind, which must contain every value of it.
    pub fn reindex_coordinates(&self, coords: &[Coordinate]) -> IndexResult<Vec<usize>> {
        let canonical = self.canonical()?;
        coords
            .iter()
            .map(|coord| {
                canonical
                    .iter()
                    .position(|c| c.is_superset_of(coord))
                    .ok_or_else(|| {
                        IndexError::invariant(format!(
                            "{} coordinate of size {} not covered by the canonical list",
                            coord.kind(),
                            coord.size()
                        ))
                    })
            })
            .collect()
    }
}

/// `translate[local_idx] = canonical_idx` for every value of `local`.
fn translate(local: &Coordinate, canon: &Coordinate) -> IndexResult<Vec<usize>> {
    let mut out = Vec::with_capacity(local.size());
    for (local_idx, value) in local.iter().enumerate() {
        match canon.index_of(&value) {
            Some(idx) => out.push(idx),
            None => {
                tracing::error!(
                    kind = %local.kind(),
                    local_idx,
                    value = %value,
                    "value missing from canonical coordinate"
                );
                return Err(IndexError::invariant(format!(
                    "{} value {} missing from canonical coordinate",
                    local.kind(),
                    value
                )));
            }
        }
    }
    Ok(out)
}
