//! Particle storage for the hourglass simulation.
//!
//! A fixed-size array of structs, allocated once at construction. Particles
//! are never added or removed at runtime; the respawn cycle re-initializes
//! entries in place.

use glam::Vec3;

/// One grain of sand.
#[derive(Clone, Copy, Debug)]
pub struct Particle {
    /// World position.
    pub position: Vec3,
    /// Current velocity. Exactly zero while settled.
    pub velocity: Vec3,
    /// Frames since the last (re)spawn.
    pub lifetime: u32,
    /// Resting on the floor or pile (or parked off-scene).
    pub settled: bool,
    /// Height the particle settled at. Only meaningful while `settled`.
    pub rest_height: f32,
    /// Display color (linear RGB).
    pub color: [f32; 3],
}

impl Particle {
    /// A particle that has come to rest at `rest_height`.
    pub fn settle(&mut self, rest_height: f32) {
        self.position.y = rest_height;
        self.velocity = Vec3::ZERO;
        self.settled = true;
        self.rest_height = rest_height;
    }

    /// Hold the particle off-scene as a degenerate settled entry.
    pub fn park(&mut self, park_y: f32) {
        self.position = Vec3::new(0.0, park_y, 0.0);
        self.velocity = Vec3::ZERO;
        self.settled = true;
        self.rest_height = park_y;
        self.lifetime = 0;
    }

    /// Parked particles sit below the kill height, outside the vessel.
    #[inline]
    pub fn is_parked(&self, kill_height: f32) -> bool {
        self.settled && self.position.y < kill_height
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            lifetime: 0,
            settled: false,
            rest_height: 0.0,
            color: [0.0; 3],
        }
    }
}

/// The owned particle buffer. Length is fixed at construction.
pub struct Particles {
    pub list: Vec<Particle>,
}

impl Particles {
    /// Allocate `count` default particles. The caller seeds positions.
    pub fn with_count(count: usize) -> Self {
        Self {
            list: vec![Particle::default(); count],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Settled particles, parked ones included.
    pub fn settled_count(&self) -> usize {
        self.list.iter().filter(|p| p.settled).count()
    }

    /// Particles settled inside the vessel (resting on the floor or pile).
    pub fn settled_in_pile_count(&self, kill_height: f32) -> usize {
        self.list
            .iter()
            .filter(|p| p.settled && !p.is_parked(kill_height))
            .count()
    }
}
