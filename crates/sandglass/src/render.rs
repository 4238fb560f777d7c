//! Render export buffers.
//!
//! The boundary to the rendering collaborator: flat position and color
//! buffers (3 floats per particle), rewritten after each step and flagged
//! dirty. The core never issues draw calls; the host uploads these however
//! it likes and acknowledges with `mark_clean`.

use crate::particle::Particles;
use glam::Vec3;

pub struct RenderExport {
    /// xyz triples, one per particle. Length is fixed at construction.
    pub positions: Vec<f32>,
    /// rgb triples in display range, one per particle.
    pub colors: Vec<f32>,
    dirty: bool,
}

impl RenderExport {
    pub fn with_count(count: usize) -> Self {
        Self {
            positions: vec![0.0; count * 3],
            colors: vec![0.0; count * 3],
            dirty: false,
        }
    }

    /// Number of points in the buffers.
    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Rewrite both buffers from the particle state.
    ///
    /// Parked particles keep their off-scene position and are blacked out
    /// so the renderer never shows them.
    pub fn write_particles(&mut self, particles: &Particles, kill_height: f32) {
        debug_assert_eq!(self.len(), particles.len());

        for (i, p) in particles.list.iter().enumerate() {
            let base = i * 3;
            self.positions[base] = p.position.x;
            self.positions[base + 1] = p.position.y;
            self.positions[base + 2] = p.position.z;

            let color = if p.is_parked(kill_height) {
                [0.0; 3]
            } else {
                p.color
            };
            self.colors[base] = color[0];
            self.colors[base + 1] = color[1];
            self.colors[base + 2] = color[2];
        }
        self.dirty = true;
    }

    /// Rewrite the buffers from a static point set, shifted vertically and
    /// scaled to `brightness`. Used by the bulk reservoir groups.
    pub fn write_points(&mut self, points: &[Vec3], offset_y: f32, color: [f32; 3], brightness: f32) {
        debug_assert_eq!(self.len(), points.len());

        for (i, point) in points.iter().enumerate() {
            let base = i * 3;
            self.positions[base] = point.x;
            self.positions[base + 1] = point.y + offset_y;
            self.positions[base + 2] = point.z;

            self.colors[base] = color[0] * brightness;
            self.colors[base + 1] = color[1] * brightness;
            self.colors[base + 2] = color[2] * brightness;
        }
        self.dirty = true;
    }

    /// True when the buffers changed since the host last drained them.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Host acknowledgement after uploading the buffers.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Particle;

    #[test]
    fn test_buffers_fixed_length() {
        let export = RenderExport::with_count(16);
        assert_eq!(export.positions.len(), 48);
        assert_eq!(export.colors.len(), 48);
        assert!(!export.is_dirty());
    }

    #[test]
    fn test_write_sets_dirty_and_copies() {
        let mut particles = Particles::with_count(2);
        particles.list[1] = Particle {
            position: Vec3::new(0.1, -0.2, 0.3),
            color: [0.9, 0.8, 0.5],
            ..Default::default()
        };

        let mut export = RenderExport::with_count(2);
        export.write_particles(&particles, -1.1);
        assert!(export.is_dirty());
        assert_eq!(&export.positions[3..6], &[0.1, -0.2, 0.3]);
        assert_eq!(&export.colors[3..6], &[0.9, 0.8, 0.5]);

        export.mark_clean();
        assert!(!export.is_dirty());
    }

    #[test]
    fn test_parked_particles_blacked_out() {
        let mut particles = Particles::with_count(1);
        particles.list[0].color = [1.0; 3];
        particles.list[0].park(-1.6);

        let mut export = RenderExport::with_count(1);
        export.write_particles(&particles, -1.1);
        assert_eq!(&export.colors[0..3], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_points_shift_and_brightness() {
        let points = [Vec3::new(0.0, 0.5, 0.0)];
        let mut export = RenderExport::with_count(1);
        export.write_points(&points, -0.25, [1.0, 0.8, 0.4], 0.5);
        assert_eq!(export.positions[1], 0.25);
        assert_eq!(&export.colors[0..3], &[0.5, 0.4, 0.2]);
    }
}
