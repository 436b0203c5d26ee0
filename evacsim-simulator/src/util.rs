use glam::DVec2;

/// Direction in which `q` pushes `p`.
///
/// Returns the unit vector from `q` to `p` when the points are farther apart than `epsilon`.
/// Closer points yield a vector of length `fallback_scale` along `p - q`, so that overlapping
/// bodies separate violently instead of producing NaN. When the points coincide exactly there
/// is no such direction and `coincident` supplies it instead. It must return a unit vector.
pub fn interaction_direction(
    p: DVec2,
    q: DVec2,
    epsilon: f64,
    fallback_scale: f64,
    coincident: impl FnOnce() -> DVec2,
) -> DVec2 {
    let difference = p - q;
    let distance = difference.length();

    if distance > epsilon {
        difference / distance
    } else {
        difference.try_normalize().unwrap_or_else(coincident) * fallback_scale
    }
}

/// Returns `gap` when the bodies touch or overlap, and zero otherwise.
pub fn contact_indicator(gap: f64) -> f64 {
    if gap <= 0.0 {
        gap
    } else {
        0.0
    }
}
