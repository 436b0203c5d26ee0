use glam::{dvec2, DVec2};

/// Source of initial agent positions.
pub trait PositionSampler {
    /// Draw a position inside the rectangle spanned by `min` and `max`.
    fn sample(&mut self, min: DVec2, max: DVec2) -> DVec2;
}

/// Samples positions uniformly.
#[derive(Debug, Clone)]
pub struct UniformSampler {
    rng: fastrand::Rng,
}

impl UniformSampler {
    pub fn new() -> Self {
        UniformSampler {
            rng: fastrand::Rng::new(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        UniformSampler {
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl Default for UniformSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionSampler for UniformSampler {
    fn sample(&mut self, min: DVec2, max: DVec2) -> DVec2 {
        let t = dvec2(self.rng.f64(), self.rng.f64());
        min + (max - min) * t
    }
}

/// Replays a fixed list of positions, ignoring the requested bounds.
///
/// Once the list is exhausted it starts over.
#[derive(Debug, Clone)]
pub struct FixedPositions {
    positions: Vec<DVec2>,
    next: usize,
}

impl FixedPositions {
    pub fn new(positions: Vec<DVec2>) -> Self {
        FixedPositions { positions, next: 0 }
    }
}

impl PositionSampler for FixedPositions {
    fn sample(&mut self, min: DVec2, _max: DVec2) -> DVec2 {
        if self.positions.is_empty() {
            return min;
        }
        let p = self.positions[self.next % self.positions.len()];
        self.next += 1;
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sampler_bounds() {
        let mut sampler = UniformSampler::with_seed(7);
        let (min, max) = (dvec2(5.0, 5.0), dvec2(45.0, 45.0));

        for _ in 0..1000 {
            let p = sampler.sample(min, max);
            assert!(p.cmpge(min).all() && p.cmple(max).all());
        }
    }

    #[test]
    fn test_uniform_sampler_seeded() {
        let mut a = UniformSampler::with_seed(42);
        let mut b = UniformSampler::with_seed(42);

        for _ in 0..10 {
            assert_eq!(
                a.sample(DVec2::ZERO, DVec2::ONE),
                b.sample(DVec2::ZERO, DVec2::ONE)
            );
        }
    }

    #[test]
    fn test_fixed_positions() {
        let mut sampler = FixedPositions::new(vec![dvec2(1.0, 2.0), dvec2(3.0, 4.0)]);

        assert_eq!(sampler.sample(DVec2::ZERO, DVec2::ONE), dvec2(1.0, 2.0));
        assert_eq!(sampler.sample(DVec2::ZERO, DVec2::ONE), dvec2(3.0, 4.0));
        assert_eq!(sampler.sample(DVec2::ZERO, DVec2::ONE), dvec2(1.0, 2.0));
    }
}
