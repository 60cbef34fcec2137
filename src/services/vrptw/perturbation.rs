//! Random interior swaps used to kick the search out of local optima

use rand::seq::index;
use rand::Rng;

use super::problem::Route;

/// Apply `level` random swaps of two distinct interior positions.
///
/// No feasibility check is done; the caller re-optimizes and evaluates the
/// result. Routes with fewer than two interior stops come back unchanged.
pub fn perturb<R: Rng + ?Sized>(route: &Route, level: usize, rng: &mut R) -> Route {
    let mut perturbed = route.clone();
    let interior = route.interior().len();
    if interior < 2 {
        return perturbed;
    }

    for _ in 0..level {
        let picked = index::sample(rng, interior, 2);
        // Offset by one to skip the origin anchor
        perturbed.as_mut_slice().swap(picked.index(0) + 1, picked.index(1) + 1);
    }

    perturbed
}
