//! Vessel interior profile.
//!
//! The vessel is a lathe shape: wide chambers above and below, pinched to a
//! narrow constriction at y = 0. `radius(y)` is the only geometry query the
//! integrator needs; everything else (walls, spawn placement, ceiling) is
//! derived from it.

use crate::constants::MIN_PROFILE_RADIUS;
use crate::params::SimParams;

/// Piecewise interior radius of the hourglass, by height.
#[derive(Clone, Copy, Debug)]
pub struct VesselProfile {
    height_span: f32,
    neck_band: f32,
    neck_min_radius: f32,
    neck_slope: f32,
    chamber_min_radius: f32,
    chamber_slope: f32,
}

impl VesselProfile {
    pub fn from_params(params: &SimParams) -> Self {
        Self {
            height_span: params.height_span,
            neck_band: params.neck_band,
            neck_min_radius: params.neck_min_radius,
            neck_slope: params.neck_slope,
            chamber_min_radius: params.chamber_min_radius,
            chamber_slope: params.chamber_slope,
        }
    }

    /// Interior radius at height `y`.
    ///
    /// Pure and total: heights outside the vessel clamp to the rims, and a
    /// misconfigured profile clamps to a small positive radius rather than
    /// letting a zero reach the division in the funnel or wall steps.
    pub fn radius(&self, y: f32) -> f32 {
        let t = (y / self.height_span + 0.5).clamp(0.0, 1.0);
        let d = (t - 0.5).abs();

        let r = if d < self.neck_band {
            self.neck_min_radius + d * self.neck_slope
        } else {
            self.chamber_min_radius + (d - self.neck_band) * self.chamber_slope
        };

        r.max(MIN_PROFILE_RADIUS)
    }

    /// Top rim of the vessel.
    #[inline]
    pub fn top(&self) -> f32 {
        self.height_span * 0.5
    }

    /// Bottom rim of the vessel.
    #[inline]
    pub fn bottom(&self) -> f32 {
        -self.height_span * 0.5
    }

    #[inline]
    pub fn half_height(&self) -> f32 {
        self.height_span * 0.5
    }

    /// Height at which the neck band ends and the upper chamber begins.
    #[inline]
    pub fn neck_top(&self) -> f32 {
        self.neck_band * self.height_span
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> VesselProfile {
        VesselProfile::from_params(&SimParams::default())
    }

    #[test]
    fn test_narrowest_at_constriction() {
        let v = profile();
        let r0 = v.radius(0.0);
        for y in [-1.0f32, -0.5, -0.2, -0.05, 0.05, 0.2, 0.5, 1.0] {
            assert!(
                v.radius(y) >= r0,
                "radius({}) = {} dips below the neck radius {}",
                y,
                v.radius(y),
                r0
            );
        }
    }

    #[test]
    fn test_monotonic_away_from_neck() {
        let v = profile();
        let mut prev = v.radius(0.0);
        let mut y = 0.0;
        while y < v.top() {
            y += 0.01;
            let r = v.radius(y);
            assert!(r + 1e-6 >= prev, "profile narrows at y = {}", y);
            prev = r;
        }
    }

    #[test]
    fn test_always_positive_even_misconfigured() {
        let params = SimParams {
            neck_min_radius: 1e-9,
            neck_slope: 0.0,
            ..Default::default()
        };
        // validate() would reject this; radius() still defends itself.
        let v = VesselProfile::from_params(&params);
        assert!(v.radius(0.0) >= MIN_PROFILE_RADIUS);
    }

    #[test]
    fn test_total_outside_span() {
        let v = profile();
        // Heights beyond the rims clamp instead of extrapolating.
        assert_eq!(v.radius(5.0), v.radius(v.top()));
        assert_eq!(v.radius(-5.0), v.radius(v.bottom()));
    }
}
