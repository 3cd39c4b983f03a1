// Min-max normalization across the candidate pool.

use serde::Serialize;

/// Observed range of one signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Bounds {
    /// No observations yet. Normalizes everything to 0.
    pub const EMPTY: Bounds = Bounds {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        values.into_iter().fold(Self::EMPTY, |mut b, v| {
            b.include(v);
            b
        })
    }

    pub fn include(&mut self, value: f64) {
        if value.is_finite() {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
    }

    /// `(value - min) / (max - min)`, or 0 when the range is empty, flat, or
    /// not finite. Values outside the range are not clamped.
    pub fn normalize(&self, value: f64) -> f64 {
        if !self.min.is_finite() || !self.max.is_finite() || self.min == self.max || !value.is_finite() {
            return 0.0;
        }
        (value - self.min) / (self.max - self.min)
    }
}

/// The four raw signals that feed the weighted score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RawSignals {
    pub fixtures: f64,
    pub form: f64,
    pub total_points: f64,
    pub xg: f64,
}

/// Per-signal bounds, computed once from the candidate pool and reused for
/// scoring rostered players.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SignalBounds {
    pub fixtures: Bounds,
    pub form: Bounds,
    pub total_points: Bounds,
    pub xg: Bounds,
}

impl SignalBounds {
    pub fn from_pool<'a>(pool: impl IntoIterator<Item = &'a RawSignals>) -> Self {
        pool.into_iter().fold(Self::default(), |mut b, s| {
            b.fixtures.include(s.fixtures);
            b.form.include(s.form);
            b.total_points.include(s.total_points);
            b.xg.include(s.xg);
            b
        })
    }

    pub fn normalize(&self, raw: &RawSignals) -> RawSignals {
        RawSignals {
            fixtures: self.fixtures.normalize(raw.fixtures),
            form: self.form.normalize(raw.form),
            total_points: self.total_points.normalize(raw.total_points),
            xg: self.xg.normalize(raw.xg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn normalizes_into_unit_range() {
        let b = Bounds::from_values([2.0, 6.0, 4.0]);
        assert!(approx_eq(b.normalize(2.0), 0.0, 1e-12));
        assert!(approx_eq(b.normalize(4.0), 0.5, 1e-12));
        assert!(approx_eq(b.normalize(6.0), 1.0, 1e-12));
        // Outside the observed range is not clamped.
        assert!(approx_eq(b.normalize(8.0), 1.5, 1e-12));
    }

    #[test]
    fn flat_or_empty_range_is_zero() {
        assert_eq!(Bounds::EMPTY.normalize(3.0), 0.0);
        assert_eq!(Bounds::from_values([5.0, 5.0]).normalize(5.0), 0.0);
        assert_eq!(Bounds::from_values([f64::NAN]).normalize(1.0), 0.0);
    }

    #[test]
    fn non_finite_observations_are_ignored() {
        let b = Bounds::from_values([1.0, f64::INFINITY, 3.0]);
        assert_eq!(b, Bounds { min: 1.0, max: 3.0 });
        assert_eq!(b.normalize(f64::NAN), 0.0);
    }

    #[test]
    fn signal_bounds_cover_each_signal() {
        let pool = [
            RawSignals { fixtures: 1.0, form: 2.0, total_points: 10.0, xg: 0.1 },
            RawSignals { fixtures: 3.0, form: 2.0, total_points: 30.0, xg: 0.5 },
        ];
        let bounds = SignalBounds::from_pool(&pool);
        let n = bounds.normalize(&pool[1]);
        assert!(approx_eq(n.fixtures, 1.0, 1e-12));
        assert_eq!(n.form, 0.0);
        assert!(approx_eq(n.total_points, 1.0, 1e-12));
        assert!(approx_eq(n.xg, 1.0, 1e-12));

        let empty = SignalBounds::from_pool(Vec::<RawSignals>::new().iter());
        assert_eq!(empty.normalize(&pool[0]), RawSignals::default());
    }
}
