//! Bulk reservoir sand.
//!
//! Two static point sets stand in for the resting mass of sand in the upper
//! and lower chambers. They are not simulated: their vertical offset and
//! brightness are driven directly by the progress value, so the reservoirs
//! drain and fill in lockstep with the interval even when only a few
//! thousand dynamic grains are in flight.

use glam::Vec3;
use rand::{rngs::StdRng, Rng};
use std::f32::consts::TAU;

use crate::constants::SAND_COLOR;
use crate::params::SimParams;
use crate::render::RenderExport;
use crate::vessel::VesselProfile;

/// Which chamber a bulk group fills.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReservoirKind {
    Upper,
    Lower,
}

pub struct ReservoirBulk {
    kind: ReservoirKind,
    points: Vec<Vec3>,
    travel: f32,
    offset_y: f32,
    brightness: f32,
    /// Exported positions/colors for this group.
    pub render: RenderExport,
}

impl ReservoirBulk {
    /// Sample `params.bulk_count` points filling the chamber interior.
    pub fn new(
        kind: ReservoirKind,
        vessel: &VesselProfile,
        params: &SimParams,
        rng: &mut StdRng,
    ) -> Self {
        let margin = params.wall_margin + params.particle_radius;
        let (y_min, y_max) = match kind {
            ReservoirKind::Upper => (vessel.neck_top() + 0.05, vessel.top() - 0.05),
            ReservoirKind::Lower => (params.floor_y, -vessel.neck_top() - 0.05),
        };

        let mut points = Vec::with_capacity(params.bulk_count);
        for _ in 0..params.bulk_count {
            let y = y_min + rng.gen::<f32>() * (y_max - y_min);
            let r_max = (vessel.radius(y) - margin).max(0.0);
            let r = r_max * rng.gen::<f32>().sqrt();
            let theta = rng.gen::<f32>() * TAU;
            points.push(Vec3::new(r * theta.cos(), y, r * theta.sin()));
        }

        let mut bulk = Self {
            kind,
            render: RenderExport::with_count(points.len()),
            points,
            travel: y_max - y_min,
            offset_y: 0.0,
            brightness: 0.0,
        };
        bulk.set_progress(0.0);
        bulk
    }

    /// Reposition the group for a new progress value.
    ///
    /// The upper group sinks and fades as progress rises; the lower group
    /// rises out of the floor and brightens. The caller gates calls by the
    /// progress epsilon.
    pub fn set_progress(&mut self, progress: f32) {
        let p = progress.clamp(0.0, 1.0);
        match self.kind {
            ReservoirKind::Upper => {
                self.offset_y = -p * self.travel;
                self.brightness = 1.0 - p;
            }
            ReservoirKind::Lower => {
                self.offset_y = -(1.0 - p) * self.travel;
                self.brightness = p;
            }
        }
        self.render
            .write_points(&self.points, self.offset_y, SAND_COLOR, self.brightness);
    }

    /// Apparent amount of sand in this reservoir, in [0, 1].
    pub fn amount(&self) -> f32 {
        self.brightness
    }

    #[inline]
    pub fn offset_y(&self) -> f32 {
        self.offset_y
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
