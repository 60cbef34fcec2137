//! Feasibility-constrained 2-opt improvement
//!
//! Scans segment reversals `(i, j)` with `1 <= i < j <= len - 2`, so the
//! anchors never move. The first feasible reversal with a strictly lower cost
//! is taken and the scan restarts from the top. The loop ends once a full
//! scan finds nothing, leaving a 2-opt local optimum.

use super::evaluator::{evaluate, Evaluation};
use super::problem::{Problem, Route};

/// Improve `route` to a 2-opt local optimum.
///
/// An infeasible input is returned unchanged.
pub fn refine(route: &Route, problem: &Problem) -> Route {
    let mut best = route.clone();
    let mut best_evaluation = evaluate(&best, problem);
    if !best_evaluation.feasible {
        return best;
    }

    let mut candidate = best.clone();
    while let Some((improved, evaluation)) =
        first_improvement(&best, &best_evaluation, &mut candidate, problem)
    {
        best = improved;
        best_evaluation = evaluation;
    }

    best
}

/// First improving reversal of `current`, reusing `scratch` as the candidate buffer.
fn first_improvement(
    current: &Route,
    current_evaluation: &Evaluation,
    scratch: &mut Route,
    problem: &Problem,
) -> Option<(Route, Evaluation)> {
    let len = current.len();
    if len < 4 {
        return None;
    }

    for i in 1..len - 2 {
        for j in i + 1..len - 1 {
            scratch.clone_from(current);
            scratch.as_mut_slice()[i..=j].reverse();

            let evaluation = evaluate(scratch, problem);
            if evaluation.improves_on(current_evaluation) {
                return Some((scratch.clone(), evaluation));
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::vrptw::evaluator::Cost;
    use crate::services::vrptw::problem::{Stop, StopId, TimeWindow, TravelTimeMatrix};

    const ORIGIN: StopId = -1;
    const DEST: StopId = 0;

    /// Symmetric line metric: origin at 0, stops at their id, destination at n + 1.
    fn line_problem(n: i64, windows: &[(StopId, TimeWindow)]) -> Problem {
        let position = |id: i64| if id == ORIGIN { 0 } else if id == DEST { n + 1 } else { id };
        let mut ids = vec![ORIGIN, DEST];
        ids.extend(1..=n);
        let mut matrix = TravelTimeMatrix::new();
        for &a in &ids {
            for &b in &ids {
                if a != b {
                    matrix.set(a, b, (position(a) - position(b)).unsigned_abs());
                }
            }
        }
        let stops = (1..=n)
            .map(|id| {
                let window = windows
                    .iter()
                    .find(|(stop, _)| *stop == id)
                    .map(|(_, w)| *w)
                    .unwrap_or_else(TimeWindow::unconstrained);
                Stop::regular(id, window)
            })
            .collect();
        Problem::new(
            Stop::origin(ORIGIN, TimeWindow::unconstrained()),
            Stop::destination(DEST, TimeWindow::unconstrained()),
            stops,
            matrix,
            0,
        )
        .unwrap()
    }

    /// Manhattan distances between grid points, all windows open.
    fn grid_problem(points: &[(StopId, (i64, i64))]) -> Problem {
        let mut matrix = TravelTimeMatrix::new();
        for (a, (ax, ay)) in points {
            for (b, (bx, by)) in points {
                if a != b {
                    matrix.set(*a, *b, ((ax - bx).abs() + (ay - by).abs()) as u64);
                }
            }
        }
        let stops = points
            .iter()
            .filter(|(id, _)| *id != ORIGIN && *id != DEST)
            .map(|(id, _)| Stop::regular(*id, TimeWindow::unconstrained()))
            .collect();
        Problem::new(
            Stop::origin(ORIGIN, TimeWindow::unconstrained()),
            Stop::destination(DEST, TimeWindow::unconstrained()),
            stops,
            matrix,
            0,
        )
        .unwrap()
    }

    fn scattered_problem() -> Problem {
        grid_problem(&[
            (ORIGIN, (4, 7)),
            (DEST, (4, 2)),
            (1, (2, 7)),
            (2, (8, 7)),
            (3, (5, 8)),
            (4, (2, 6)),
            (5, (9, 8)),
        ])
    }

    fn is_two_opt_optimal(route: &Route, problem: &Problem) -> bool {
        let current = evaluate(route, problem);
        let len = route.len();
        for i in 1..len.saturating_sub(2) {
            for j in i + 1..len - 1 {
                if evaluate(&route.with_reversed(i, j), problem).improves_on(&current) {
                    return false;
                }
            }
        }
        true
    }

    #[test]
    fn test_uncrosses_reversed_line() {
        let problem = line_problem(4, &[]);
        let route = Route::new(vec![ORIGIN, 4, 3, 2, 1, DEST]);

        let refined = refine(&route, &problem);

        assert_eq!(refined.stops(), &[ORIGIN, 1, 2, 3, 4, DEST]);
        assert_eq!(evaluate(&refined, &problem).cost, Cost::Finite(5));
    }

    #[test]
    fn test_result_is_local_optimum() {
        let problem = line_problem(7, &[]);
        let route = Route::new(vec![ORIGIN, 3, 7, 1, 5, 2, 6, 4, DEST]);

        let refined = refine(&route, &problem);

        assert!(is_two_opt_optimal(&refined, &problem));
        assert!(evaluate(&refined, &problem).cost <= evaluate(&route, &problem).cost);
    }

    #[test]
    fn test_infeasible_input_returned_unchanged() {
        // Stop 1 must be served before minute 1, unreachable from the origin in time
        let problem = line_problem(3, &[(1, TimeWindow::new(0, 0))]);
        let route = Route::new(vec![ORIGIN, 3, 2, 1, DEST]);

        assert_eq!(refine(&route, &problem), route);
    }

    #[test]
    fn test_windows_block_cheaper_reversal() {
        // Stop 1 opens late, so visiting it last stays forced despite the detour
        let problem = line_problem(3, &[(1, TimeWindow::new(50, 1440)), (3, TimeWindow::new(0, 10))]);
        let route = Route::new(vec![ORIGIN, 2, 3, 1, DEST]);
        assert!(evaluate(&route, &problem).feasible);

        let refined = refine(&route, &problem);

        assert!(evaluate(&refined, &problem).feasible);
        let stops = refined.stops();
        let pos = |id| stops.iter().position(|&s| s == id).unwrap();
        assert!(pos(3) < pos(1));
        assert!(is_two_opt_optimal(&refined, &problem));
    }

    #[test]
    fn test_takes_first_improving_reversal_in_scan_order() {
        let problem = scattered_problem();
        let route = Route::new(vec![ORIGIN, 1, 2, 3, 4, 5, DEST]);
        let evaluation = evaluate(&route, &problem);
        assert_eq!(evaluation.cost, Cost::Finite(37));
        let mut scratch = route.clone();

        let (next, next_evaluation) =
            first_improvement(&route, &evaluation, &mut scratch, &problem).unwrap();

        // Reversal (1, 3) comes first; the steepest one would reach cost 25
        assert_eq!(next.stops(), &[ORIGIN, 3, 2, 1, 4, 5, DEST]);
        assert_eq!(next_evaluation.cost, Cost::Finite(33));
    }

    #[test]
    fn test_first_improvement_reaches_its_own_local_optimum() {
        let problem = scattered_problem();
        let route = Route::new(vec![ORIGIN, 1, 2, 3, 4, 5, DEST]);

        let refined = refine(&route, &problem);

        // Always taking the steepest reversal would stop at [-1, 1, 4, 3, 5, 2, 0] (cost 23)
        assert_eq!(refined.stops(), &[ORIGIN, 3, 5, 2, 1, 4, DEST]);
        assert_eq!(evaluate(&refined, &problem).cost, Cost::Finite(21));
        assert!(is_two_opt_optimal(&refined, &problem));
    }

    #[test]
    fn test_short_routes_are_untouched() {
        let problem = line_problem(1, &[]);
        let route = Route::new(vec![ORIGIN, 1, DEST]);
        assert_eq!(refine(&route, &problem), route);
    }

    #[test]
    fn test_anchors_never_move() {
        let problem = line_problem(5, &[]);
        let refined = refine(&Route::new(vec![ORIGIN, 5, 1, 4, 2, 3, DEST]), &problem);
        assert_eq!(refined.stops().first(), Some(&ORIGIN));
        assert_eq!(refined.stops().last(), Some(&DEST));
    }
}
