//! Weighted destination rotation for A/B links.

use rand::Rng;

use crate::domain::entities::RotationTarget;

/// Picks one target with probability proportional to its weight.
///
/// Zero-weight targets are never chosen. Returns `None` when the list is
/// empty or every weight is zero.
pub fn pick_weighted<'a, R: Rng + ?Sized>(
    targets: &'a [RotationTarget],
    rng: &mut R,
) -> Option<&'a RotationTarget> {
    let total: u64 = targets.iter().map(|t| u64::from(t.weight)).sum();
    if total == 0 {
        return None;
    }

    let mut roll = rng.random_range(0..total);
    for target in targets {
        let weight = u64::from(target.weight);
        if roll < weight {
            return Some(target);
        }
        roll -= weight;
    }

    None
}

/// Picks a rotation URL using the thread-local RNG.
pub fn pick_rotation_url(targets: &[RotationTarget]) -> Option<&str> {
    pick_weighted(targets, &mut rand::rng()).map(|t| t.url.as_str())
}
