//! Routing decisions evaluated after the planner and after the analyzer.
//!
//! Both decision points are pure functions over [`RunState`]: no I/O, no
//! mutation. The engine records the chosen [`Route`] on the state afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::state::RunState;

/// Hard ceiling on search passes; once reached the run always moves forward.
pub const MAX_SEARCH_ITERATIONS: u32 = 3;
/// Below this confidence the analyzer asks for another search pass.
pub const MIN_CONFIDENCE_TO_PROCEED: f64 = 70.0;
/// At or above this confidence fact-checking is skipped.
pub const SKIP_FACT_CHECK_CONFIDENCE: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Research,
    MoreResearch,
    FactCheck,
    Write,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Route::Research => "research",
            Route::MoreResearch => "more_research",
            Route::FactCheck => "fact_check",
            Route::Write => "write",
        };
        write!(f, "{label}")
    }
}

/// Always `Research`; kept as a decision point so planning can branch later.
pub fn route_after_plan(_state: &RunState) -> Route {
    Route::Research
}

/// Loop, fact-check or write, checked in this order:
/// 1. more research was requested and the iteration cap is not reached
/// 2. confidence is below the proceed threshold and the cap is not reached
/// 3. confidence is high enough to skip fact-checking
/// 4. otherwise fact-check
pub fn route_after_analysis(state: &RunState) -> Route {
    let below_cap = state.iteration() < MAX_SEARCH_ITERATIONS;
    let confidence = state.confidence();

    if state.needs_more_research() && below_cap {
        Route::MoreResearch
    } else if confidence < MIN_CONFIDENCE_TO_PROCEED && below_cap {
        Route::MoreResearch
    } else if confidence >= SKIP_FACT_CHECK_CONFIDENCE {
        Route::Write
    } else {
        Route::FactCheck
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzed_state(iterations: u32, confidence: f64, needs_more: bool) -> RunState {
        let mut state = RunState::new("q");
        for _ in 0..iterations {
            state.record_search("{}", Vec::new());
        }
        state.record_analysis("analysis", confidence, needs_more);
        state
    }

    #[test]
    fn plan_always_routes_to_research() {
        assert_eq!(route_after_plan(&RunState::new("q")), Route::Research);
    }

    #[test]
    fn explicit_request_loops_back_below_cap() {
        let state = analyzed_state(1, 95.0, true);
        assert_eq!(route_after_analysis(&state), Route::MoreResearch);
    }

    #[test]
    fn high_confidence_skips_fact_check() {
        let state = analyzed_state(1, 85.0, false);
        assert_eq!(route_after_analysis(&state), Route::Write);
    }

    #[test]
    fn low_confidence_at_cap_is_forced_to_fact_check() {
        let state = analyzed_state(3, 60.0, false);
        assert_eq!(route_after_analysis(&state), Route::FactCheck);
    }

    #[test]
    fn request_for_more_at_cap_follows_confidence() {
        assert_eq!(
            route_after_analysis(&analyzed_state(3, 90.0, true)),
            Route::Write
        );
        assert_eq!(
            route_after_analysis(&analyzed_state(3, 75.0, true)),
            Route::FactCheck
        );
    }

    #[test]
    fn low_confidence_below_cap_loops_back() {
        let state = analyzed_state(2, 69.9, false);
        assert_eq!(route_after_analysis(&state), Route::MoreResearch);
    }

    #[test]
    fn middle_band_goes_to_fact_check() {
        assert_eq!(
            route_after_analysis(&analyzed_state(1, 70.0, false)),
            Route::FactCheck
        );
        assert_eq!(
            route_after_analysis(&analyzed_state(1, 79.9, false)),
            Route::FactCheck
        );
        assert_eq!(
            route_after_analysis(&analyzed_state(1, 80.0, false)),
            Route::Write
        );
    }
}
