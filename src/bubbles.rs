//! Bubble simulation
//!
//! A fixed pool of slots. Bubbles are released from the aerator on a timer,
//! float up with a jittered buoyancy, bounce off the underside of the shelf
//! and the back wall, and burst at the water surface.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BubbleConfig {
    /// Number of slots in the pool
    pub capacity: usize,
    /// Seconds between releases
    pub spawn_interval: f32,
    /// Upward acceleration
    pub buoyancy: f32,
    /// Velocity kept (and reversed) on a bounce
    pub bounce: f32,
    /// Bubbles above this height burst
    pub surface_height: f32,
    pub origin: [f32; 3],
    /// Width of the uniform horizontal launch velocity
    pub spread: f32,
}

impl Default for BubbleConfig {
    fn default() -> Self {
        Self {
            capacity: 60,
            spawn_interval: 0.3,
            buoyancy: 10.0,
            bounce: 0.3,
            surface_height: 40.0,
            origin: [0.0, 7.0, -20.0],
            spread: 4.0,
        }
    }
}

/// Underside of the shelf, as seen by a bubble centre
const SHELF_BOTTOM: f32 = 19.2;
const SHELF_FRONT: f32 = -15.0;
const SHELF_HALF_WIDTH: f32 = 10.0;
/// Back wall, as seen by a bubble centre
const BACK_WALL: f32 = -24.2;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bubble {
    pub position: Vec3,
    pub velocity: Vec3,
    pub active: bool,
}

impl Bubble {
    fn under_shelf(&self) -> bool {
        self.position.y >= SHELF_BOTTOM
            && self.position.z < SHELF_FRONT
            && self.position.x > -SHELF_HALF_WIDTH
            && self.position.x < SHELF_HALF_WIDTH
    }

    fn behind_wall(&self) -> bool {
        self.position.z < BACK_WALL
    }
}

/// Outcome of one [`BubblePool::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BubbleReport {
    /// Slots that were active when the tick started
    pub active: usize,
    pub spawned: usize,
    /// A release was due but every slot was taken
    pub exhausted: bool,
}

pub struct BubblePool {
    config: BubbleConfig,
    bubbles: Vec<Bubble>,
    since_spawn: f32,
    exhausted: bool,
}

impl BubblePool {
    pub fn new(config: BubbleConfig) -> Self {
        Self {
            bubbles: vec![Bubble::default(); config.capacity],
            config,
            since_spawn: 0.0,
            exhausted: false,
        }
    }

    pub fn active(&self) -> impl Iterator<Item = &Bubble> {
        self.bubbles.iter().filter(|b| b.active)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.bubbles.len()
    }

    /// Advance every slot by `dt` seconds
    pub fn tick(&mut self, dt: f32, rng: &mut impl Rng) -> BubbleReport {
        let BubbleConfig {
            spawn_interval,
            buoyancy,
            bounce,
            surface_height,
            origin,
            spread,
            ..
        } = self.config;

        self.since_spawn += dt;
        let mut report = BubbleReport {
            active: self.bubbles.iter().filter(|b| b.active).count(),
            ..BubbleReport::default()
        };

        for bubble in &mut self.bubbles {
            if bubble.active {
                bubble.position += bubble.velocity * dt;
                // Per-tick jitter, so the spread depends on the frame rate
                bubble.velocity.y += buoyancy * dt * (1.0 + 0.5 * (rng.gen::<f32>() - 0.5));

                if bubble.position.y > surface_height {
                    bubble.active = false;
                    continue;
                }
                if bubble.under_shelf() {
                    bubble.position.y = SHELF_BOTTOM;
                    bubble.velocity.y = -bubble.velocity.y * bounce;
                }
                if bubble.behind_wall() {
                    bubble.position.z = BACK_WALL;
                    bubble.velocity.z = -bubble.velocity.z * bounce;
                }
            } else if self.since_spawn > spawn_interval {
                let vx = spread * (rng.gen::<f32>() - 0.5);
                let vz = spread * (rng.gen::<f32>() - 0.5);
                *bubble = Bubble {
                    position: Vec3::from(origin),
                    velocity: Vec3::new(vx, 0.0, vz),
                    active: true,
                };
                self.since_spawn -= spawn_interval;
                report.spawned += 1;
            }
        }

        report.exhausted =
            self.since_spawn > spawn_interval && report.active + report.spawned == self.capacity();
        if report.exhausted && !self.exhausted {
            tracing::warn!("bubble pool exhausted ({} slots)", self.capacity());
        }
        self.exhausted = report.exhausted;
        report
    }
}
