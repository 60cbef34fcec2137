//! Problem instance for the single-vehicle VRPTW engine
//!
//! A problem is assembled once per optimization request and consumed
//! read-only by the solver.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::defaults::MINUTES_PER_DAY;

/// Stop identifier, unique within a problem instance
pub type StopId = i64;

/// Duration or minute-of-day value
pub type Minutes = u64;

/// `[earliest, latest]` window in minutes of day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub earliest: Minutes,
    pub latest: Minutes,
}

impl TimeWindow {
    pub fn new(earliest: Minutes, latest: Minutes) -> Self {
        Self { earliest, latest }
    }

    /// Whole-day window `[0, 1440]`
    pub fn unconstrained() -> Self {
        Self::new(0, MINUTES_PER_DAY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StopRole {
    Origin,
    Destination,
    Regular,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stop {
    pub id: StopId,
    pub role: StopRole,
    pub window: TimeWindow,
}

impl Stop {
    pub fn origin(id: StopId, window: TimeWindow) -> Self {
        Self { id, role: StopRole::Origin, window }
    }

    pub fn destination(id: StopId, window: TimeWindow) -> Self {
        Self { id, role: StopRole::Destination, window }
    }

    pub fn regular(id: StopId, window: TimeWindow) -> Self {
        Self { id, role: StopRole::Regular, window }
    }
}

/// Directed travel times in minutes.
///
/// A pair without an entry is unreachable. On the wire, unreachable pairs may
/// also be written as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "HashMap<StopId, HashMap<StopId, Option<Minutes>>>")]
pub struct TravelTimeMatrix {
    durations: HashMap<StopId, HashMap<StopId, Minutes>>,
}

impl TravelTimeMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, from: StopId, to: StopId, minutes: Minutes) {
        self.durations.entry(from).or_default().insert(to, minutes);
    }

    /// Builder-style `set`, convenient for literal matrices
    pub fn with(mut self, from: StopId, to: StopId, minutes: Minutes) -> Self {
        self.set(from, to, minutes);
        self
    }

    /// Travel time from `from` to `to`, `None` when unreachable
    pub fn travel(&self, from: StopId, to: StopId) -> Option<Minutes> {
        self.durations.get(&from).and_then(|row| row.get(&to)).copied()
    }

    /// Copy of this matrix containing only pairs between `ids`
    pub fn restricted_to(&self, ids: &[StopId]) -> Self {
        let keep: HashSet<StopId> = ids.iter().copied().collect();
        let durations = self
            .durations
            .iter()
            .filter(|(from, _)| keep.contains(from))
            .map(|(from, row)| {
                let row = row
                    .iter()
                    .filter(|(to, _)| keep.contains(to))
                    .map(|(to, minutes)| (*to, *minutes))
                    .collect();
                (*from, row)
            })
            .collect();
        Self { durations }
    }
}

impl From<HashMap<StopId, HashMap<StopId, Option<Minutes>>>> for TravelTimeMatrix {
    fn from(raw: HashMap<StopId, HashMap<StopId, Option<Minutes>>>) -> Self {
        let durations = raw
            .into_iter()
            .map(|(from, row)| {
                let row = row
                    .into_iter()
                    .filter_map(|(to, minutes)| minutes.map(|m| (to, m)))
                    .collect();
                (from, row)
            })
            .collect();
        Self { durations }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProblemError {
    #[error("origin and destination must be different stops (both are {0})")]
    SameAnchors(StopId),
    #[error("stop {0} appears more than once")]
    DuplicateStop(StopId),
}

/// Immutable problem instance: anchors, regular stops, matrix and service time
#[derive(Debug, Clone)]
pub struct Problem {
    origin: Stop,
    destination: Stop,
    regular: Vec<Stop>,
    index: HashMap<StopId, usize>,
    matrix: TravelTimeMatrix,
    service_time: Minutes,
}

impl Problem {
    /// Roles on the given stops are normalized to their position.
    pub fn new(
        origin: Stop,
        destination: Stop,
        regular: Vec<Stop>,
        matrix: TravelTimeMatrix,
        service_time: Minutes,
    ) -> Result<Self, ProblemError> {
        if origin.id == destination.id {
            return Err(ProblemError::SameAnchors(origin.id));
        }

        let mut index = HashMap::with_capacity(regular.len());
        let mut seen = HashSet::from([origin.id, destination.id]);
        for (position, stop) in regular.iter().enumerate() {
            if !seen.insert(stop.id) {
                return Err(ProblemError::DuplicateStop(stop.id));
            }
            index.insert(stop.id, position);
        }

        Ok(Self {
            origin: Stop { role: StopRole::Origin, ..origin },
            destination: Stop { role: StopRole::Destination, ..destination },
            regular: regular
                .into_iter()
                .map(|stop| Stop { role: StopRole::Regular, ..stop })
                .collect(),
            index,
            matrix,
            service_time,
        })
    }

    pub fn origin(&self) -> &Stop {
        &self.origin
    }

    pub fn destination(&self) -> &Stop {
        &self.destination
    }

    /// Regular stops in input order
    pub fn regular_stops(&self) -> &[Stop] {
        &self.regular
    }

    pub fn matrix(&self) -> &TravelTimeMatrix {
        &self.matrix
    }

    pub fn service_time(&self) -> Minutes {
        self.service_time
    }

    pub fn stop(&self, id: StopId) -> Option<&Stop> {
        if id == self.origin.id {
            Some(&self.origin)
        } else if id == self.destination.id {
            Some(&self.destination)
        } else {
            self.index.get(&id).map(|&position| &self.regular[position])
        }
    }

    /// Service applied on arrival: the fixed service time for regular stops, zero for anchors
    pub fn service_duration(&self, stop: &Stop) -> Minutes {
        match stop.role {
            StopRole::Regular => self.service_time,
            StopRole::Origin | StopRole::Destination => 0,
        }
    }

    pub fn travel(&self, from: StopId, to: StopId) -> Option<Minutes> {
        self.matrix.travel(from, to)
    }
}

/// Ordered visiting sequence, origin first and destination last
#[derive(Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Route(Vec<StopId>);

impl Clone for Route {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }

    fn clone_from(&mut self, source: &Self) {
        self.0.clone_from(&source.0);
    }
}

impl Route {
    pub fn new(stops: Vec<StopId>) -> Self {
        Self(stops)
    }

    pub fn stops(&self) -> &[StopId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Interior stops, anchors excluded
    pub fn interior(&self) -> &[StopId] {
        match self.0.len() {
            0..=2 => &[],
            n => &self.0[1..n - 1],
        }
    }

    /// Copy with `id` placed at `position`
    pub fn with_inserted(&self, position: usize, id: StopId) -> Self {
        let mut stops = Vec::with_capacity(self.0.len() + 1);
        stops.extend_from_slice(&self.0[..position]);
        stops.push(id);
        stops.extend_from_slice(&self.0[position..]);
        Self(stops)
    }

    /// Copy with the segment `[i, j]` reversed
    pub fn with_reversed(&self, i: usize, j: usize) -> Self {
        let mut stops = self.0.clone();
        stops[i..=j].reverse();
        Self(stops)
    }

    /// Copy with positions `a` and `b` exchanged
    pub fn with_swapped(&self, a: usize, b: usize) -> Self {
        let mut stops = self.0.clone();
        stops.swap(a, b);
        Self(stops)
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [StopId] {
        &mut self.0
    }

    pub fn into_inner(self) -> Vec<StopId> {
        self.0
    }
}

impl From<Vec<StopId>> for Route {
    fn from(stops: Vec<StopId>) -> Self {
        Self(stops)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|id| id.to_string()).collect();
        write!(f, "[{}]", parts.join(" -> "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> TimeWindow {
        TimeWindow::unconstrained()
    }

    #[test]
    fn test_matrix_missing_pair_is_unreachable() {
        let matrix = TravelTimeMatrix::new().with(1, 2, 5);
        assert_eq!(matrix.travel(1, 2), Some(5));
        assert_eq!(matrix.travel(2, 1), None);
        assert_eq!(matrix.travel(7, 8), None);
    }

    #[test]
    fn test_matrix_deserializes_null_as_unreachable() {
        let json = r#"{"-1": {"0": 12, "5": null}, "5": {"0": 3}}"#;
        let matrix: TravelTimeMatrix = serde_json::from_str(json).unwrap();

        assert_eq!(matrix.travel(-1, 0), Some(12));
        assert_eq!(matrix.travel(-1, 5), None);
        assert_eq!(matrix.travel(5, 0), Some(3));
    }

    #[test]
    fn test_matrix_restricted_to_drops_other_stops() {
        let matrix = TravelTimeMatrix::new().with(1, 2, 5).with(1, 3, 7).with(3, 2, 1);
        let restricted = matrix.restricted_to(&[1, 2]);

        assert_eq!(restricted.travel(1, 2), Some(5));
        assert_eq!(restricted.travel(1, 3), None);
        assert_eq!(restricted.travel(3, 2), None);
    }

    #[test]
    fn test_problem_rejects_same_anchors() {
        let result = Problem::new(
            Stop::origin(0, window()),
            Stop::destination(0, window()),
            vec![],
            TravelTimeMatrix::new(),
            1,
        );
        assert_eq!(result.unwrap_err(), ProblemError::SameAnchors(0));
    }

    #[test]
    fn test_problem_rejects_duplicate_stop() {
        let result = Problem::new(
            Stop::origin(-1, window()),
            Stop::destination(0, window()),
            vec![Stop::regular(4, window()), Stop::regular(-1, window())],
            TravelTimeMatrix::new(),
            1,
        );
        assert_eq!(result.unwrap_err(), ProblemError::DuplicateStop(-1));
    }

    #[test]
    fn test_problem_lookup_and_service_duration() {
        let problem = Problem::new(
            Stop::origin(-1, window()),
            Stop::destination(0, window()),
            vec![Stop::regular(4, TimeWindow::new(10, 20))],
            TravelTimeMatrix::new(),
            2,
        )
        .unwrap();

        let student = problem.stop(4).unwrap();
        assert_eq!(student.window, TimeWindow::new(10, 20));
        assert_eq!(problem.service_duration(student), 2);
        assert_eq!(problem.service_duration(problem.origin()), 0);
        assert_eq!(problem.service_duration(problem.destination()), 0);
        assert!(problem.stop(99).is_none());
    }

    #[test]
    fn test_route_copy_helpers_leave_original_untouched() {
        let route = Route::new(vec![-1, 1, 2, 3, 0]);

        assert_eq!(route.with_inserted(1, 9).stops(), &[-1, 9, 1, 2, 3, 0]);
        assert_eq!(route.with_reversed(1, 3).stops(), &[-1, 3, 2, 1, 0]);
        assert_eq!(route.with_swapped(1, 3).stops(), &[-1, 3, 2, 1, 0]);
        assert_eq!(route.stops(), &[-1, 1, 2, 3, 0]);
        assert_eq!(route.interior(), &[1, 2, 3]);
    }

    #[test]
    fn test_route_display() {
        assert_eq!(Route::new(vec![-1, 4, 0]).to_string(), "[-1 -> 4 -> 0]");
    }
}
