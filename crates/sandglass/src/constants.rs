//! Canonical physics constants for the hourglass simulation.
//!
//! Earlier revisions of this visualization carried several slightly
//! different gravity/damping/funnel tunings. This module is the single
//! authoritative set; `SimParams::default()` is built from it.
//!
//! Units: the vessel is sized in abstract world units (height span 2.0),
//! so gravity is scaled well below 9.81 to keep the pour readable.

/// Reference timestep the constants are tuned against (60 Hz).
pub const REFERENCE_DT: f32 = 1.0 / 60.0;

/// Largest substep `step` will integrate; longer frames are subdivided.
pub const MAX_SUBSTEP: f32 = 1.0 / 60.0;

/// Upper bound on substeps per `step` call, so a huge `dt` (e.g. a host
/// that was suspended) cannot stall the frame.
pub const MAX_SUBSTEPS: usize = 8;

/// Gravity acceleration (world units / s^2) - negative Y direction.
pub const GRAVITY: f32 = -2.5;

/// Per-reference-frame air resistance factor applied to falling particles.
pub const AIR_DAMPING: f32 = 0.96;

/// Velocity kept after bouncing off glass or the pile (inelastic).
pub const RESTITUTION: f32 = 0.3;

/// Horizontal velocity kept after a floor/pile bounce.
pub const FRICTION: f32 = 0.8;

/// Tangential velocity kept after sliding along the vessel wall.
pub const WALL_TANGENT_DAMPING: f32 = 0.85;

/// Tangential velocity kept after the hard neck clamp.
pub const NECK_TANGENT_DAMPING: f32 = 0.6;

/// Softening term in the funnel pull denominator `r^2 + eps`.
pub const FUNNEL_EPS: f32 = 0.01;

/// Radius below which the outward normal is undefined; radial forces and
/// wall projection are skipped inside it.
pub const AXIS_EPS: f32 = 1e-6;

/// Smallest radius `VesselProfile::radius` will report, guarding the
/// divisions in the funnel and wall steps against a misconfigured profile.
pub const MIN_PROFILE_RADIUS: f32 = 1e-3;

/// Downward kick added when a particle is clamped back under the ceiling.
pub const CEILING_PUSH: f32 = 0.05;

/// How far below the kill height parked particles are held.
pub const PARK_DEPTH: f32 = 0.5;

/// Progress deltas smaller than this do not reposition the bulk reservoirs.
pub const PROGRESS_EPSILON: f32 = 1e-3;

/// Base sand color (linear RGB, display range).
pub const SAND_COLOR: [f32; 3] = [0.93, 0.79, 0.52];

/// Per-spawn brightness jitter applied to [`SAND_COLOR`].
pub const SAND_COLOR_JITTER: f32 = 0.06;
