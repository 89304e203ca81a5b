use crate::index::timeline::{ActiveSet, TimelineIndex, Windows};

fn candidates(windows: &Windows) -> u64 {
    windows.iter().map(|&(lo, hi)| (hi - lo) as u64).sum()
}

/// How a cursor query was served.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStrategy {
    /// Windows advanced incrementally from the previous query.
    Advance,
    /// Windows relocated by binary search (first query, backwards or large jump, new index).
    Relocate,
}

/// Running counters for one [`TimelineCursor`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct CursorStats {
    /// Queries served by walking the windows forward.
    pub advanced: u64,
    /// Queries served by binary-search relocation.
    pub relocated: u64,
    /// Records examined across all queries, covering or not.
    pub candidates: u64,
}

/// Stateful query position over a [`TimelineIndex`].
///
/// Ticks normally arrive in non-decreasing time order, so the per-track windows are walked
/// forward (amortized O(1)). A backwards move, a forward jump larger than
/// `max_incremental_step`, or a different index relocates them by binary search.
/// Either way the result equals [`TimelineIndex::query_linear`].
#[derive(Clone, Debug)]
pub struct TimelineCursor {
    max_incremental_step: f64,
    position: Option<Position>,
    stats: CursorStats,
}

#[derive(Clone, Debug)]
struct Position {
    index_id: u64,
    time: f64,
    overlays: Windows,
    commentary: Windows,
    markers: Windows,
}

impl Position {
    fn locate(index: &TimelineIndex, t: f64) -> Self {
        Self {
            index_id: index.id(),
            time: t,
            overlays: index.overlays.windows(t),
            commentary: index.commentary.windows(t),
            markers: index.markers.windows(t),
        }
    }

    fn advance(&mut self, index: &TimelineIndex, t: f64) {
        index.overlays.advance_windows(&mut self.overlays, t);
        index.commentary.advance_windows(&mut self.commentary, t);
        index.markers.advance_windows(&mut self.markers, t);
        self.time = t;
    }
}

impl TimelineCursor {
    /// Cursor that walks forward for steps up to `max_incremental_step` seconds.
    pub fn new(max_incremental_step: f64) -> Self {
        Self {
            max_incremental_step: max_incremental_step.max(0.0),
            position: None,
            stats: CursorStats::default(),
        }
    }

    /// Forget the current position; the next query relocates.
    pub fn reset(&mut self) {
        self.position = None;
    }

    /// Counters since construction.
    pub fn stats(&self) -> CursorStats {
        self.stats
    }

    /// Time of the last query, unless reset.
    pub fn last_time(&self) -> Option<f64> {
        self.position.as_ref().map(|p| p.time)
    }

    fn strategy_for(&self, index: &TimelineIndex, t: f64) -> QueryStrategy {
        match &self.position {
            Some(p)
                if p.index_id == index.id()
                    && t >= p.time
                    && t - p.time <= self.max_incremental_step =>
            {
                QueryStrategy::Advance
            }
            _ => QueryStrategy::Relocate,
        }
    }

    /// Active set at `t`; equal to [`TimelineIndex::query_linear`].
    pub fn query<'a>(&mut self, index: &'a TimelineIndex, t: f64) -> ActiveSet<'a> {
        self.query_with_strategy(index, t).0
    }

    /// Like [`TimelineCursor::query`], also reporting how the query was served.
    pub fn query_with_strategy<'a>(
        &mut self,
        index: &'a TimelineIndex,
        t: f64,
    ) -> (ActiveSet<'a>, QueryStrategy) {
        let strategy = self.strategy_for(index, t);
        let pos = match (strategy, self.position.take()) {
            (QueryStrategy::Advance, Some(mut p)) => {
                p.advance(index, t);
                self.stats.advanced += 1;
                p
            }
            _ => {
                self.stats.relocated += 1;
                tracing::trace!(t, index_id = index.id(), "cursor relocated");
                Position::locate(index, t)
            }
        };
        self.stats.candidates +=
            candidates(&pos.overlays) + candidates(&pos.commentary) + candidates(&pos.markers);

        let set = index.collect(
            t,
            &index.overlays.covering(&pos.overlays, t),
            &index.commentary.covering(&pos.commentary, t),
            &index.markers.covering(&pos.markers, t),
        );
        self.position = Some(pos);
        (set, strategy)
    }
}

impl Default for TimelineCursor {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/index/cursor.rs"]
mod tests;
