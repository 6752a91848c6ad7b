//! Run state machine
//!
//! `Idle -> CollectingObjects -> AggregatingCheckouts -> ResolvingTagDepths
//! -> ComputingHistoryDepth -> Done`, with `Failed` reachable from any
//! non-terminal state.

use std::time::{Duration, Instant};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AnalysisState {
    Idle,
    CollectingObjects,
    AggregatingCheckouts,
    ResolvingTagDepths,
    ComputingHistoryDepth,
    Done,
    Failed,
}

impl AnalysisState {
    /// The state that follows this one on success, if any
    pub fn next(self) -> Option<AnalysisState> {
        match self {
            AnalysisState::Idle => Some(AnalysisState::CollectingObjects),
            AnalysisState::CollectingObjects => Some(AnalysisState::AggregatingCheckouts),
            AnalysisState::AggregatingCheckouts => Some(AnalysisState::ResolvingTagDepths),
            AnalysisState::ResolvingTagDepths => Some(AnalysisState::ComputingHistoryDepth),
            AnalysisState::ComputingHistoryDepth => Some(AnalysisState::Done),
            AnalysisState::Done | AnalysisState::Failed => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AnalysisState::Idle => "idle",
            AnalysisState::CollectingObjects => "collecting objects",
            AnalysisState::AggregatingCheckouts => "aggregating checkouts",
            AnalysisState::ResolvingTagDepths => "resolving tag depths",
            AnalysisState::ComputingHistoryDepth => "computing history depth",
            AnalysisState::Done => "done",
            AnalysisState::Failed => "failed",
        }
    }
}

/// Wall-clock time spent in each phase of a run
#[derive(Debug, Clone, Default)]
pub struct PhaseTimings {
    phases: Vec<(AnalysisState, Duration)>,
}

impl PhaseTimings {
    pub fn record(&mut self, state: AnalysisState, start: Instant) {
        self.phases.push((state, start.elapsed()));
    }

    pub fn get(&self, state: AnalysisState) -> Option<Duration> {
        self.phases
            .iter()
            .find(|(s, _)| *s == state)
            .map(|(_, d)| *d)
    }

    pub fn total(&self) -> Duration {
        self.phases.iter().map(|(_, d)| *d).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_states_advance_in_order() {
        let mut state = AnalysisState::Idle;
        let mut seen = vec![state];
        while let Some(next) = state.next() {
            state = next;
            seen.push(state);
        }
        assert_eq!(
            seen,
            vec![
                AnalysisState::Idle,
                AnalysisState::CollectingObjects,
                AnalysisState::AggregatingCheckouts,
                AnalysisState::ResolvingTagDepths,
                AnalysisState::ComputingHistoryDepth,
                AnalysisState::Done,
            ]
        );
    }

    #[test]
    fn test_nothing_follows_terminal_states() {
        assert!(AnalysisState::Failed.next().is_none());
        assert!(AnalysisState::Done.next().is_none());
    }

    #[test]
    fn test_timings_lookup() {
        let mut timings = PhaseTimings::default();
        timings.record(AnalysisState::CollectingObjects, Instant::now());
        assert!(timings.get(AnalysisState::CollectingObjects).is_some());
        assert!(timings.get(AnalysisState::ResolvingTagDepths).is_none());
        assert!(timings.total() >= timings.get(AnalysisState::CollectingObjects).unwrap());
    }
}
