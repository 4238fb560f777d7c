//! Flow control law.
//!
//! Maps the externally supplied progress snapshot to (a) how many particles
//! are eligible to move this frame and (b) the probability that an expired
//! particle respawns into the upper reservoir rather than parking. Together
//! these make the visible pour rate track the progress signal while the
//! upper reservoir depletes in lockstep with it: at progress 1.0 the
//! respawn probability reaches zero and the pour starves.

use serde::{Deserialize, Serialize};

/// One per-frame reading of the external progress source.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Normalized elapsed fraction of the interval, clamped to [0, 1].
    pub progress: f32,
    /// Whether the interval is currently running.
    pub active: bool,
}

/// Host-side supplier of progress snapshots, read once per frame.
pub trait ProgressSource {
    fn progress(&self) -> f32;
    fn is_active(&self) -> bool;

    fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            progress: self.progress(),
            active: self.is_active(),
        }
    }
}

/// Per-frame output of the flow control law.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowOutput {
    /// Effective flow rate in [0, 1].
    pub flow_rate: f32,
    /// Particles (by index) eligible to move this frame.
    pub active_count: usize,
    /// Chance per frame that an expired particle reseeds instead of parking.
    pub respawn_probability: f32,
    /// Fraction of the upper reservoir still to drain.
    pub sand_remaining: f32,
}

/// Derives flow-rate, eligibility and respawn outputs from progress.
#[derive(Clone, Copy, Debug)]
pub struct FlowController {
    particle_count: usize,
    base_fraction: f32,
    variable_fraction: f32,
    cap_before_depletion: f32,
    idle_damping: f32,
    respawn_gain: f32,
}

impl FlowController {
    pub fn new(params: &crate::SimParams) -> Self {
        Self {
            particle_count: params.particle_count,
            base_fraction: params.base_fraction,
            variable_fraction: params.variable_fraction,
            cap_before_depletion: params.cap_before_depletion,
            idle_damping: params.idle_damping,
            respawn_gain: params.respawn_gain,
        }
    }

    /// Evaluate the control law for one frame.
    pub fn evaluate(&self, snapshot: ProgressSnapshot) -> FlowOutput {
        let progress = snapshot.progress.clamp(0.0, 1.0);

        let flow_rate = if snapshot.active {
            progress.min(self.cap_before_depletion)
        } else {
            progress * self.idle_damping
        };

        let active_fraction =
            (self.base_fraction + flow_rate * self.variable_fraction).clamp(0.0, 1.0);
        let active_count = (self.particle_count as f32 * active_fraction).floor() as usize;

        let sand_remaining = 1.0 - progress;
        let respawn_probability = (self.respawn_gain * flow_rate).min(1.0) * sand_remaining;

        FlowOutput {
            flow_rate,
            active_count,
            respawn_probability,
            sand_remaining,
        }
    }
}
