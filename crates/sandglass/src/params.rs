//! Simulation parameters.
//!
//! One configuration struct owns every start-time constant: vessel shape,
//! particle count, integrator coefficients, flow-control law, pile grid.
//! Values are fixed for the lifetime of a simulation; out-of-range values
//! are rejected at construction.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants;

/// All start-time configuration for [`crate::HourglassSimulation`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimParams {
    /// Number of dynamic particles. Fixed for the simulation's lifetime.
    pub particle_count: usize,
    /// RNG and turbulence seed. Fixed seed => reproducible run.
    pub seed: u64,

    // ===== Vessel profile =====
    /// Total vessel height; the constriction sits at y = 0.
    pub height_span: f32,
    /// Half-height of the neck region, as a fraction of the normalized span.
    pub neck_band: f32,
    /// Interior radius at the narrowest point of the constriction.
    pub neck_min_radius: f32,
    /// Radius gain per normalized unit inside the neck band.
    pub neck_slope: f32,
    /// Interior radius where the chamber region begins.
    pub chamber_min_radius: f32,
    /// Radius gain per normalized unit through the chambers.
    pub chamber_slope: f32,

    // ===== Integration =====
    /// Gravity acceleration (negative Y).
    pub gravity: f32,
    /// Air resistance factor per reference frame, in (0, 1).
    pub air_damping: f32,
    /// Normal velocity kept on bounce, in [0, 1).
    pub restitution: f32,
    /// Horizontal velocity kept on a floor bounce, in [0, 1].
    pub friction: f32,
    /// Tangential velocity kept on a wall hit, in [0, 1].
    pub wall_tangent_damping: f32,
    /// Amplitude of the Perlin turbulence applied to vx/vz. Zero disables.
    pub turbulence_amplitude: f32,
    /// Spatial frequency of the turbulence field.
    pub turbulence_frequency: f32,

    // ===== Wall / funnel / neck =====
    /// Gap kept between particle centers and the glass.
    pub wall_margin: f32,
    /// Particle radius used for pile stacking and spawn placement.
    pub particle_radius: f32,
    /// Centripetal pull coefficient near the constriction.
    pub funnel_strength: f32,
    /// Half-height of the funnel band around y = 0.
    pub funnel_half_height: f32,
    /// Extra downward acceleration inside the funnel band.
    pub funnel_down_bias: f32,
    /// Half-height of the hard radial clamp band around y = 0.
    pub neck_clamp_half_height: f32,
    /// Hard radial limit inside the clamp band.
    pub neck_radius: f32,

    // ===== Floor / pile =====
    /// Horizontal quantization of the pile height map.
    pub pile_cell_size: f32,
    /// Resting floor of the lower chamber (default pile height).
    pub floor_y: f32,
    /// Floor/pile collision is only evaluated below this height.
    pub floor_check_height: f32,
    /// Speed below which a floor contact settles instead of bouncing.
    pub settle_threshold: f32,

    // ===== Lifetime / respawn =====
    /// Frames a particle lives before the respawn rule fires.
    pub lifetime_cap: u32,
    /// Particles below this height are recycled unconditionally.
    pub kill_height: f32,

    // ===== Flow control =====
    /// Fraction of N always eligible to move. Zero keeps the vessel inert
    /// before the interval starts.
    pub base_fraction: f32,
    /// Fraction of N activated in proportion to the flow rate.
    pub variable_fraction: f32,
    /// Flow rate ceiling while the interval is active.
    pub cap_before_depletion: f32,
    /// Flow rate multiplier while the interval is inactive.
    pub idle_damping: f32,
    /// Respawn probability per frame at full flow and full reservoir.
    pub respawn_gain: f32,

    // ===== Bulk reservoirs =====
    /// Static "resting sand" points per reservoir group.
    pub bulk_count: usize,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            particle_count: 2600,
            seed: 42,

            height_span: 2.0,
            neck_band: 0.1,
            neck_min_radius: 0.055,
            neck_slope: 2.2,
            chamber_min_radius: 0.275, // continuous with the neck branch at d = neck_band
            chamber_slope: 1.1,

            gravity: constants::GRAVITY,
            air_damping: constants::AIR_DAMPING,
            restitution: constants::RESTITUTION,
            friction: constants::FRICTION,
            wall_tangent_damping: constants::WALL_TANGENT_DAMPING,
            turbulence_amplitude: 0.12,
            turbulence_frequency: 3.0,

            wall_margin: 0.01,
            particle_radius: 0.012,
            funnel_strength: 0.012,
            funnel_half_height: 0.35,
            funnel_down_bias: 0.6,
            neck_clamp_half_height: 0.08,
            neck_radius: 0.06,

            pile_cell_size: 0.03,
            floor_y: -0.9,
            floor_check_height: 0.0,
            settle_threshold: 0.35,

            lifetime_cap: 1500, // 25 s at the reference rate
            kill_height: -1.1,

            base_fraction: 0.0,
            variable_fraction: 0.85,
            cap_before_depletion: 0.95,
            idle_damping: 0.25,
            respawn_gain: 0.35,

            bulk_count: 900,
        }
    }
}

impl SimParams {
    /// Check every field against its documented range.
    ///
    /// Misconfiguration is a construction-time error; nothing in the step
    /// loop re-validates.
    pub fn validate(&self) -> Result<(), ParamsError> {
        fn positive(field: &'static str, v: f32) -> Result<(), ParamsError> {
            if v > 0.0 && v.is_finite() {
                Ok(())
            } else {
                Err(ParamsError::NonPositive { field })
            }
        }
        fn unit_range(field: &'static str, v: f32) -> Result<(), ParamsError> {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(ParamsError::OutOfRange {
                    field,
                    min: 0.0,
                    max: 1.0,
                })
            }
        }

        if self.particle_count == 0 {
            return Err(ParamsError::NonPositive {
                field: "particle_count",
            });
        }
        if self.bulk_count == 0 {
            return Err(ParamsError::NonPositive { field: "bulk_count" });
        }

        positive("height_span", self.height_span)?;
        positive("neck_min_radius", self.neck_min_radius)?;
        positive("chamber_min_radius", self.chamber_min_radius)?;
        positive("particle_radius", self.particle_radius)?;
        positive("pile_cell_size", self.pile_cell_size)?;
        positive("settle_threshold", self.settle_threshold)?;
        positive("funnel_half_height", self.funnel_half_height)?;
        positive("neck_radius", self.neck_radius)?;

        if !(0.0 < self.neck_band && self.neck_band < 0.5) {
            return Err(ParamsError::OutOfRange {
                field: "neck_band",
                min: 0.0,
                max: 0.5,
            });
        }
        if self.neck_slope < 0.0 || self.chamber_slope < 0.0 {
            return Err(ParamsError::NonPositive { field: "slope" });
        }
        if !(0.0 < self.air_damping && self.air_damping < 1.0) {
            return Err(ParamsError::OutOfRange {
                field: "air_damping",
                min: 0.0,
                max: 1.0,
            });
        }
        if !(0.0..1.0).contains(&self.restitution) {
            return Err(ParamsError::OutOfRange {
                field: "restitution",
                min: 0.0,
                max: 1.0,
            });
        }
        unit_range("friction", self.friction)?;
        unit_range("wall_tangent_damping", self.wall_tangent_damping)?;
        unit_range("base_fraction", self.base_fraction)?;
        unit_range("variable_fraction", self.variable_fraction)?;
        unit_range("cap_before_depletion", self.cap_before_depletion)?;
        unit_range("idle_damping", self.idle_damping)?;
        unit_range("respawn_gain", self.respawn_gain)?;

        if self.gravity >= 0.0 {
            return Err(ParamsError::OutOfRange {
                field: "gravity",
                min: f32::NEG_INFINITY,
                max: 0.0,
            });
        }
        if self.lifetime_cap == 0 {
            return Err(ParamsError::NonPositive {
                field: "lifetime_cap",
            });
        }
        if self.kill_height >= self.floor_y {
            return Err(ParamsError::OutOfRange {
                field: "kill_height",
                min: f32::NEG_INFINITY,
                max: self.floor_y,
            });
        }

        Ok(())
    }
}

/// Rejected configuration value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamsError {
    /// Field must be strictly positive and finite.
    NonPositive { field: &'static str },
    /// Field fell outside its allowed interval.
    OutOfRange {
        field: &'static str,
        min: f32,
        max: f32,
    },
}

impl fmt::Display for ParamsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamsError::NonPositive { field } => {
                write!(f, "parameter `{field}` must be positive")
            }
            ParamsError::OutOfRange { field, min, max } => {
                write!(f, "parameter `{field}` must lie in ({min}, {max})")
            }
        }
    }
}

impl std::error::Error for ParamsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_valid() {
        assert!(SimParams::default().validate().is_ok());
    }

    #[test]
    fn test_zero_particle_count_rejected() {
        let params = SimParams {
            particle_count: 0,
            ..Default::default()
        };
        assert_eq!(
            params.validate(),
            Err(ParamsError::NonPositive {
                field: "particle_count"
            })
        );
    }

    #[test]
    fn test_damping_must_shrink_velocity() {
        let params = SimParams {
            air_damping: 1.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_kill_height_below_floor() {
        let params = SimParams {
            kill_height: -0.5, // above floor_y
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_neck_band_range() {
        let params = SimParams {
            neck_band: 0.5,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
