//! Per-frame integration.
//!
//! One `step` call advances the whole simulation by `dt` seconds: the flow
//! law is evaluated once, the bulk reservoirs are re-synced if progress
//! moved, and the dynamic particles are integrated in substeps of at most
//! [`MAX_SUBSTEP`]. Constants are tuned at [`REFERENCE_DT`]; per-substep
//! quantities scale by the substep length so hosts running at 30 or 144 Hz
//! see the same pour.
//!
//! Per eligible particle, per substep, in order: gravity + turbulence
//! integration, wall constraint, funnel field, neck clamp, floor/pile
//! collision, ceiling clamp, air damping, lifetime/respawn. Wall
//! correction resolves before floor correction. Pile reads within a
//! substep observe the previous batch; settle events apply afterwards.

use glam::Vec3;
use noise::NoiseFn;
use rand::{rngs::StdRng, Rng};
use std::f32::consts::TAU;

use crate::constants::{
    AXIS_EPS, CEILING_PUSH, FUNNEL_EPS, MAX_SUBSTEP, MAX_SUBSTEPS, NECK_TANGENT_DAMPING,
    PARK_DEPTH, PROGRESS_EPSILON, REFERENCE_DT, SAND_COLOR, SAND_COLOR_JITTER,
};
use crate::flow::{FlowOutput, ProgressSnapshot};
use crate::params::SimParams;
use crate::particle::Particle;
use crate::vessel::VesselProfile;
use crate::HourglassSimulation;

/// What one `step` call did, for diagnostics and logging.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Substeps the frame was divided into.
    pub substeps: usize,
    /// Particles that came to rest on the floor or pile.
    pub settled: usize,
    /// Expired particles reseeded into the upper reservoir.
    pub respawned: usize,
    /// Expired particles parked off-scene.
    pub parked: usize,
}

impl HourglassSimulation {
    /// Advance the simulation by `dt` seconds using one progress snapshot.
    ///
    /// Safe to call from any host loop or headless harness; `dt <= 0`
    /// re-exports the buffers without integrating.
    pub fn step(&mut self, dt: f32, snapshot: ProgressSnapshot) -> StepReport {
        let mut report = StepReport::default();

        let snapshot = ProgressSnapshot {
            progress: snapshot.progress.clamp(0.0, 1.0),
            active: snapshot.active,
        };
        let flow = self.flow.evaluate(snapshot);

        if (snapshot.progress - self.last_bulk_progress).abs() > PROGRESS_EPSILON {
            self.upper_bulk.set_progress(snapshot.progress);
            self.lower_bulk.set_progress(snapshot.progress);
            self.last_bulk_progress = snapshot.progress;
        }

        if dt > 0.0 && dt.is_finite() {
            let substeps = ((dt / MAX_SUBSTEP).ceil() as usize).clamp(1, MAX_SUBSTEPS);
            let h = dt / substeps as f32;
            for _ in 0..substeps {
                self.substep(h, &flow, &mut report);
            }
            report.substeps = substeps;
        }

        self.render
            .write_particles(&self.particles, self.params.kill_height);
        report
    }

    fn substep(&mut self, h: f32, flow: &FlowOutput, report: &mut StepReport) {
        self.time += h;
        self.frame += 1;

        let params = self.params.clone();
        let vessel = self.vessel;
        let damping = params.air_damping.powf(h / REFERENCE_DT);
        let park_y = params.kill_height - PARK_DEPTH;
        let time = self.time as f64 * 0.35;
        let ceiling = vessel.top() - params.particle_radius;

        self.pending_settles.clear();

        let eligible = flow.active_count.min(self.particles.len());
        for i in 0..eligible {
            let p = &mut self.particles.list[i];

            if p.settled {
                p.lifetime = p.lifetime.saturating_add(1);
                let expired =
                    p.is_parked(params.kill_height) || p.lifetime > params.lifetime_cap;
                if expired {
                    if self.rng.gen::<f32>() < flow.respawn_probability {
                        reseed_into_upper(p, &mut self.rng, &vessel, &params, flow.sand_remaining);
                        report.respawned += 1;
                    } else if !p.is_parked(params.kill_height) {
                        p.park(park_y);
                        report.parked += 1;
                    }
                }
                continue;
            }

            // 1. integrate under gravity, with optional turbulence
            p.velocity.y += params.gravity * h;
            if params.turbulence_amplitude > 0.0 {
                let f = params.turbulence_frequency as f64;
                let ax = self.turbulence.get([
                    p.position.x as f64 * f,
                    p.position.y as f64 * f,
                    time,
                ]) as f32;
                let az = self.turbulence.get([
                    p.position.z as f64 * f + 17.3,
                    p.position.y as f64 * f - 5.1,
                    time,
                ]) as f32;
                p.velocity.x += ax * params.turbulence_amplitude * h;
                p.velocity.z += az * params.turbulence_amplitude * h;
            }
            p.position += p.velocity * h;

            // 2. wall constraint
            collide_wall(p, &vessel, &params);

            // 3. funnel field
            let y_abs = p.position.y.abs();
            if y_abs < params.funnel_half_height {
                let band = 1.0 - y_abs / params.funnel_half_height;
                let r_sq = p.position.x * p.position.x + p.position.z * p.position.z;
                if r_sq > AXIS_EPS * AXIS_EPS {
                    let r = r_sq.sqrt();
                    let pull = params.funnel_strength * band / (r_sq + FUNNEL_EPS);
                    p.velocity.x -= p.position.x / r * pull * h;
                    p.velocity.z -= p.position.z / r * pull * h;
                }
                p.velocity.y -= params.funnel_down_bias * band * h;
            }

            // 4. neck clamp
            if p.position.y.abs() < params.neck_clamp_half_height {
                clamp_to_neck(p, &params);
            }

            // 5. floor / pile collision
            if p.position.y < params.floor_check_height {
                let cell = self.pile.cell_of(p.position.x, p.position.z);
                let ground = self.pile.query(cell);
                let target = ground + params.particle_radius;
                if p.position.y < target {
                    p.position.y = target;
                    project_inside_wall(p, &vessel, &params);
                    let cell = self.pile.cell_of(p.position.x, p.position.z);

                    if p.velocity.length() < params.settle_threshold {
                        p.settle(target);
                        self.pending_settles.push((cell, target));
                        report.settled += 1;
                        continue;
                    }
                    p.velocity.y = p.velocity.y.abs() * params.restitution;
                    p.velocity.x *= params.friction;
                    p.velocity.z *= params.friction;
                }
            }

            // 6. ceiling clamp
            if p.position.y > ceiling {
                p.position.y = ceiling;
                p.velocity.y = -p.velocity.y.abs() * params.restitution - CEILING_PUSH;
            }

            // 7. air damping
            p.velocity *= damping;

            // 8. lifetime & respawn
            p.lifetime = p.lifetime.saturating_add(1);
            if p.position.y < params.kill_height || p.lifetime > params.lifetime_cap {
                if self.rng.gen::<f32>() < flow.respawn_probability {
                    reseed_into_upper(p, &mut self.rng, &vessel, &params, flow.sand_remaining);
                    report.respawned += 1;
                } else {
                    p.park(park_y);
                    report.parked += 1;
                }
            }
        }

        self.pile.apply_batch(&self.pending_settles);
    }
}

/// Project a particle that escaped the glass back onto the wall and
/// reflect the radial component of its velocity, damping the tangential
/// component. The wall normal is taken radially in the XZ plane.
fn collide_wall(p: &mut Particle, vessel: &VesselProfile, params: &SimParams) {
    let r_max = (vessel.radius(p.position.y) - params.wall_margin).max(AXIS_EPS);
    let r_sq = p.position.x * p.position.x + p.position.z * p.position.z;
    if r_sq <= r_max * r_max || r_sq < AXIS_EPS * AXIS_EPS {
        return;
    }

    let r = r_sq.sqrt();
    let nx = p.position.x / r;
    let nz = p.position.z / r;
    p.position.x = nx * r_max;
    p.position.z = nz * r_max;

    let v_radial = p.velocity.x * nx + p.velocity.z * nz;
    let tx = p.velocity.x - v_radial * nx;
    let tz = p.velocity.z - v_radial * nz;
    // only an outward radial component reflects; inward motion passes
    let v_radial = if v_radial > 0.0 {
        -v_radial * params.restitution
    } else {
        v_radial
    };
    p.velocity.x = tx * params.wall_tangent_damping + v_radial * nx;
    p.velocity.z = tz * params.wall_tangent_damping + v_radial * nz;
}

/// Position-only wall clamp, used after a floor lift changes `y`.
fn project_inside_wall(p: &mut Particle, vessel: &VesselProfile, params: &SimParams) {
    let r_max = (vessel.radius(p.position.y) - params.wall_margin).max(AXIS_EPS);
    let r_sq = p.position.x * p.position.x + p.position.z * p.position.z;
    if r_sq > r_max * r_max && r_sq > AXIS_EPS * AXIS_EPS {
        let scale = r_max / r_sq.sqrt();
        p.position.x *= scale;
        p.position.z *= scale;
    }
}

/// Hard radial clamp inside the constriction band. The lathe profile is a
/// discrete approximation near y = 0; without this clamp particles can
/// straddle the neck wall between profile samples.
fn clamp_to_neck(p: &mut Particle, params: &SimParams) {
    let r_sq = p.position.x * p.position.x + p.position.z * p.position.z;
    let limit = params.neck_radius;
    if r_sq <= limit * limit || r_sq < AXIS_EPS * AXIS_EPS {
        return;
    }

    let r = r_sq.sqrt();
    let nx = p.position.x / r;
    let nz = p.position.z / r;
    p.position.x = nx * limit;
    p.position.z = nz * limit;

    let v_radial = p.velocity.x * nx + p.velocity.z * nz;
    let tx = p.velocity.x - v_radial * nx;
    let tz = p.velocity.z - v_radial * nz;
    // outward radial motion stops dead at the clamp
    let v_radial = v_radial.min(0.0);
    p.velocity.x = tx * NECK_TANGENT_DAMPING + v_radial * nx;
    p.velocity.z = tz * NECK_TANGENT_DAMPING + v_radial * nz;
}

/// Re-initialize a particle into the upper reservoir.
///
/// The spawn band shrinks with `sand_remaining`, so late in the interval
/// grains emerge from what is left of the upper sand instead of the full
/// chamber height.
pub(crate) fn reseed_into_upper(
    p: &mut Particle,
    rng: &mut StdRng,
    vessel: &VesselProfile,
    params: &SimParams,
    sand_remaining: f32,
) {
    let band_bottom = vessel.neck_top() + params.particle_radius * 2.0 + 0.02;
    let band_top = vessel.top() - 0.05;
    let span = ((band_top - band_bottom) * sand_remaining.max(0.05)).max(0.01);

    let y = band_bottom + rng.gen::<f32>() * span;
    let r_limit = (vessel.radius(y) - params.wall_margin - params.particle_radius).max(0.0);
    let r = r_limit * 0.9 * rng.gen::<f32>().sqrt();
    let theta = rng.gen::<f32>() * TAU;

    p.position = Vec3::new(r * theta.cos(), y, r * theta.sin());
    p.velocity = Vec3::new(0.0, -(0.02 + rng.gen::<f32>() * 0.06), 0.0);
    p.lifetime = 0;
    p.settled = false;
    p.rest_height = 0.0;
    p.color = sand_color(rng);
}

fn sand_color(rng: &mut StdRng) -> [f32; 3] {
    let jitter = (rng.gen::<f32>() - 0.5) * 2.0 * SAND_COLOR_JITTER;
    [
        (SAND_COLOR[0] + jitter).clamp(0.0, 1.0),
        (SAND_COLOR[1] + jitter).clamp(0.0, 1.0),
        (SAND_COLOR[2] + jitter).clamp(0.0, 1.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn setup() -> (SimParams, VesselProfile, StdRng) {
        let params = SimParams::default();
        let vessel = VesselProfile::from_params(&params);
        (params, vessel, StdRng::seed_from_u64(1))
    }

    #[test]
    fn test_wall_collision_projects_and_reflects() {
        let (params, vessel, _) = setup();
        let y = 0.8;
        let r_max = vessel.radius(y) - params.wall_margin;
        let mut p = Particle {
            position: Vec3::new(r_max + 0.1, y, 0.0),
            velocity: Vec3::new(1.0, -0.5, 0.2),
            ..Default::default()
        };
        collide_wall(&mut p, &vessel, &params);

        let r = (p.position.x * p.position.x + p.position.z * p.position.z).sqrt();
        assert!((r - r_max).abs() < 1e-5);
        // outward radial velocity reversed and reduced
        assert!(p.velocity.x < 0.0);
        assert!(p.velocity.x.abs() <= params.restitution + 1e-6);
        // vertical component untouched by the wall
        assert_eq!(p.velocity.y, -0.5);
    }

    #[test]
    fn test_wall_ignores_inward_motion() {
        let (params, vessel, _) = setup();
        let y = 0.8;
        let r_max = vessel.radius(y) - params.wall_margin;
        let mut p = Particle {
            position: Vec3::new(r_max + 0.05, y, 0.0),
            velocity: Vec3::new(-0.3, 0.0, 0.0),
            ..Default::default()
        };
        collide_wall(&mut p, &vessel, &params);
        // already heading inside: position clamps, velocity keeps its sign
        assert!(p.velocity.x < 0.0);
    }

    #[test]
    fn test_neck_clamp_hard_limits_radius() {
        let (params, _, _) = setup();
        let mut p = Particle {
            position: Vec3::new(0.2, 0.0, 0.0),
            velocity: Vec3::new(0.5, -1.0, 0.0),
            ..Default::default()
        };
        clamp_to_neck(&mut p, &params);
        assert!((p.position.x - params.neck_radius).abs() < 1e-6);
        // outward radial velocity removed entirely
        assert!(p.velocity.x <= 0.0 + 1e-6);
        assert_eq!(p.velocity.y, -1.0);
    }

    #[test]
    fn test_reseed_lands_in_upper_chamber() {
        let (params, vessel, mut rng) = setup();
        let mut p = Particle::default();
        for _ in 0..200 {
            reseed_into_upper(&mut p, &mut rng, &vessel, &params, 1.0);
            assert!(p.position.y > vessel.neck_top());
            assert!(p.position.y < vessel.top());
            let r = (p.position.x * p.position.x + p.position.z * p.position.z).sqrt();
            assert!(r <= vessel.radius(p.position.y) - params.wall_margin + 1e-5);
            assert!(!p.settled);
            assert!(p.velocity.y < 0.0);
            assert_eq!(p.lifetime, 0);
        }
    }

    #[test]
    fn test_reseed_band_shrinks_with_depletion() {
        let (params, vessel, mut rng) = setup();
        let mut p = Particle::default();
        let mut max_full = f32::MIN;
        let mut max_depleted = f32::MIN;
        for _ in 0..300 {
            reseed_into_upper(&mut p, &mut rng, &vessel, &params, 1.0);
            max_full = max_full.max(p.position.y);
            reseed_into_upper(&mut p, &mut rng, &vessel, &params, 0.1);
            max_depleted = max_depleted.max(p.position.y);
        }
        assert!(
            max_depleted < max_full,
            "depleted spawn band should sit lower: {} vs {}",
            max_depleted,
            max_full
        );
    }
}
