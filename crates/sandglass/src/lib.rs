//! Hourglass particle simulation.
//!
//! Visualizes the fractional progress of a time interval (0.0 at the start,
//! 1.0 at the end) as sand migrating from an upper to a lower reservoir
//! through the constriction of an hourglass. The crate is the numeric core
//! only: it advances particle positions and velocities under gravity,
//! vessel-wall constraints, a funneling field near the constriction, and a
//! pile accumulation rule, and exports flat position/color buffers for an
//! external renderer. Wall-clock countdown math, scene setup and drawing
//! are the host's business.
//!
//! # Example
//!
//! ```
//! use sandglass::{HourglassSimulation, ProgressSnapshot, SimParams};
//!
//! let params = SimParams {
//!     particle_count: 500,
//!     ..Default::default()
//! };
//! let mut sim = HourglassSimulation::new(params).expect("valid params");
//!
//! // Host loop: one step per rendered frame, progress from a timer.
//! for frame in 0..120 {
//!     let snapshot = ProgressSnapshot {
//!         progress: frame as f32 / 1200.0,
//!         active: true,
//!     };
//!     sim.step(1.0 / 60.0, snapshot);
//! }
//!
//! assert_eq!(sim.particle_count(), 500);
//! assert!(sim.render.is_dirty());
//! ```

pub mod constants;
pub mod flow;
pub mod params;
pub mod particle;
pub mod pile;
pub mod render;
pub mod reservoir;
pub mod step;
pub mod vessel;

pub use flow::{FlowController, FlowOutput, ProgressSnapshot, ProgressSource};
pub use glam::Vec3;
pub use params::{ParamsError, SimParams};
pub use particle::{Particle, Particles};
pub use pile::{PileCell, PileHeightMap};
pub use render::RenderExport;
pub use reservoir::{ReservoirBulk, ReservoirKind};
pub use step::StepReport;
pub use vessel::VesselProfile;

use noise::Perlin;
use rand::{rngs::StdRng, SeedableRng};

/// The owned simulation: particle buffer, pile map, flow law, bulk
/// reservoirs and render exports, parameterized once at construction.
pub struct HourglassSimulation {
    /// Configuration, fixed for the simulation's lifetime.
    pub params: SimParams,
    /// All dynamic particles. Length never changes.
    pub particles: Particles,
    /// Settled-material height map for the lower chamber.
    pub pile: PileHeightMap,
    /// Exported buffers for the dynamic particles.
    pub render: RenderExport,
    /// Resting sand in the upper chamber, driven directly by progress.
    pub upper_bulk: ReservoirBulk,
    /// Resting sand in the lower chamber, driven directly by progress.
    pub lower_bulk: ReservoirBulk,

    pub(crate) vessel: VesselProfile,
    pub(crate) flow: FlowController,
    pub(crate) rng: StdRng,
    pub(crate) turbulence: Perlin,
    pub(crate) time: f32,
    pub(crate) frame: u64,
    pub(crate) last_bulk_progress: f32,
    pub(crate) pending_settles: Vec<(PileCell, f32)>,
}

impl HourglassSimulation {
    /// Build a simulation from validated parameters.
    ///
    /// Allocates every buffer up front; the step loop allocates nothing.
    pub fn new(params: SimParams) -> Result<Self, ParamsError> {
        params.validate()?;

        let vessel = VesselProfile::from_params(&params);
        let mut rng = StdRng::seed_from_u64(params.seed);
        let turbulence = Perlin::new(params.seed as u32);

        let mut particles = Particles::with_count(params.particle_count);
        for p in &mut particles.list {
            step::reseed_into_upper(p, &mut rng, &vessel, &params, 1.0);
        }

        let upper_bulk = ReservoirBulk::new(ReservoirKind::Upper, &vessel, &params, &mut rng);
        let lower_bulk = ReservoirBulk::new(ReservoirKind::Lower, &vessel, &params, &mut rng);

        let mut render = RenderExport::with_count(params.particle_count);
        render.write_particles(&particles, params.kill_height);

        let pile = PileHeightMap::new(params.pile_cell_size, params.floor_y);
        let flow = FlowController::new(&params);
        let pending_settles = Vec::with_capacity(params.particle_count);

        log::info!(
            "hourglass simulation ready: {} particles, {} bulk points per reservoir, seed {}",
            params.particle_count,
            params.bulk_count,
            params.seed
        );

        Ok(Self {
            params,
            particles,
            pile,
            render,
            upper_bulk,
            lower_bulk,
            vessel,
            flow,
            rng,
            turbulence,
            time: 0.0,
            frame: 0,
            last_bulk_progress: 0.0,
            pending_settles,
        })
    }

    /// Convenience wrapper reading the snapshot from a [`ProgressSource`].
    pub fn step_from<S: ProgressSource>(&mut self, dt: f32, source: &S) -> StepReport {
        self.step(dt, source.snapshot())
    }

    /// Start a new epoch: reseed every particle into the upper reservoir,
    /// clear the pile map and rewind the clock. The buffers themselves are
    /// kept; nothing reallocates.
    pub fn reset(&mut self) {
        self.pile.reset();
        for p in &mut self.particles.list {
            step::reseed_into_upper(p, &mut self.rng, &self.vessel, &self.params, 1.0);
        }
        self.upper_bulk.set_progress(0.0);
        self.lower_bulk.set_progress(0.0);
        self.last_bulk_progress = 0.0;
        self.time = 0.0;
        self.frame = 0;
        self.render
            .write_particles(&self.particles, self.params.kill_height);
        log::debug!("simulation reset: new epoch");
    }

    /// The vessel interior profile.
    pub fn vessel(&self) -> &VesselProfile {
        &self.vessel
    }

    /// Total particle count N, constant over the simulation's lifetime.
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Particles currently settled, parked ones included.
    pub fn settled_count(&self) -> usize {
        self.particles.settled_count()
    }

    /// Particles resting on the lower floor or pile.
    pub fn settled_in_pile_count(&self) -> usize {
        self.particles.settled_in_pile_count(self.params.kill_height)
    }

    /// Apparent fill of the upper reservoir, in [0, 1].
    pub fn upper_amount(&self) -> f32 {
        self.upper_bulk.amount()
    }

    /// Apparent fill of the lower reservoir, in [0, 1].
    pub fn lower_amount(&self) -> f32 {
        self.lower_bulk.amount()
    }

    /// Substeps integrated since construction or the last reset.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Simulated seconds since construction or the last reset.
    pub fn time(&self) -> f32 {
        self.time
    }
}
