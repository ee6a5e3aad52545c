//! Submarine kinematics
//!
//! The hull points along -X in its own frame. `dive` pitches it about Z
//! and `turn` yaws it about Y; thrust, collision and drawing all apply the
//! pitch first. Collision keeps an oriented bounding box inside the water.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::math3d::pitch_then_yaw;

/// Lower corner of the water volume
pub const TANK_MIN: Vec3 = Vec3::new(-50.0, 0.0, -25.0);
/// Upper corner of the water volume
pub const TANK_MAX: Vec3 = Vec3::new(50.0, 40.0, 25.0);

/// Hull extents in the submarine's own frame
const BOX_X: [f32; 2] = [-6.0, 7.25];
const BOX_Y: [f32; 2] = [-1.5, 2.0];
const BOX_Z: [f32; 2] = [-2.0, 2.0];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmarineConfig {
    /// Velocity added by one forward or backward command
    pub thrust: f32,
    /// Fraction of velocity lost per second
    pub water_resistance: f32,
    /// Fraction of velocity kept (and reversed) after hitting a wall
    pub bounce: f32,
    /// Degrees per tilt command
    pub pitch_step: f32,
    /// Degrees per turn command
    pub yaw_step: f32,
    /// Pitch limit in degrees, either way
    pub max_dive: f32,
}

impl Default for SubmarineConfig {
    fn default() -> Self {
        Self {
            thrust: 0.4,
            water_resistance: 0.7,
            bounce: 0.5,
            pitch_step: 1.0,
            yaw_step: 2.0,
            max_dive: 60.0,
        }
    }
}

/// Velocity change from accelerating by `a` along the hull
#[inline]
pub fn thrust_vector(a: f32, dive: f32, turn: f32) -> Vec3 {
    pitch_then_yaw(dive, turn) * Vec3::new(-a, 0.0, 0.0)
}

#[derive(Debug, Clone)]
pub struct Submarine {
    pub position: Vec3,
    pub velocity: Vec3,
    dive: f32,
    turn: f32,
    config: SubmarineConfig,
}

impl Submarine {
    pub fn new(config: SubmarineConfig) -> Self {
        Self {
            position: Vec3::new(0.0, 20.0, 0.0),
            velocity: Vec3::ZERO,
            dive: 0.0,
            turn: 0.0,
            config,
        }
    }

    /// Pitch in degrees, within [-max_dive, max_dive]
    #[inline]
    pub fn dive(&self) -> f32 {
        self.dive
    }

    /// Yaw in degrees, within [0, 360)
    #[inline]
    pub fn turn(&self) -> f32 {
        self.turn
    }

    pub fn accelerate(&mut self, a: f32) {
        self.velocity += thrust_vector(a, self.dive, self.turn);
    }

    pub fn forward(&mut self) {
        self.accelerate(self.config.thrust);
    }

    pub fn backward(&mut self) {
        self.accelerate(-self.config.thrust);
    }

    pub fn tilt_up(&mut self) {
        self.set_dive(self.dive - self.config.pitch_step);
    }

    pub fn tilt_down(&mut self) {
        self.set_dive(self.dive + self.config.pitch_step);
    }

    pub fn turn_port(&mut self) {
        self.set_turn(self.turn + self.config.yaw_step);
    }

    pub fn turn_starboard(&mut self) {
        self.set_turn(self.turn - self.config.yaw_step);
    }

    fn set_dive(&mut self, dive: f32) {
        let limit = self.config.max_dive.abs();
        self.dive = dive.max(-limit).min(limit);
    }

    fn set_turn(&mut self, turn: f32) {
        let wrapped = turn.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360 for tiny negative inputs
        self.turn = if wrapped >= 360.0 { 0.0 } else { wrapped };
    }

    /// Integrate, collide, then apply water resistance
    pub fn tick(&mut self, dt: f32) {
        self.position += self.velocity * dt;
        self.resolve_collisions();
        self.velocity -= self.velocity * (self.config.water_resistance * dt);
    }

    /// The eight hull corners in world space
    pub fn bounding_box(&self) -> [Vec3; 8] {
        let orientation = pitch_then_yaw(self.dive, self.turn);
        let mut corners = [Vec3::ZERO; 8];
        let mut k = 0;
        for x in BOX_X {
            for y in BOX_Y {
                for z in BOX_Z {
                    corners[k] = self.position + orientation * Vec3::new(x, y, z);
                    k += 1;
                }
            }
        }
        corners
    }

    /// Push the hull back inside the water. Each axis gets the largest
    /// correction any corner needs, and a corrected axis bounces.
    /// Returns the correction applied.
    pub fn resolve_collisions(&mut self) -> Vec3 {
        let mut adjust = Vec3::ZERO;
        for corner in self.bounding_box() {
            for axis in 0..3 {
                let (lo, hi, c) = (TANK_MIN[axis], TANK_MAX[axis], corner[axis]);
                if c < lo && lo - c > adjust[axis] {
                    adjust[axis] = lo - c;
                }
                if c > hi && hi - c < adjust[axis] {
                    adjust[axis] = hi - c;
                }
            }
        }
        if self.position.y > TANK_MAX.y {
            adjust.y = adjust.y.min(TANK_MAX.y - self.position.y);
        }

        for axis in 0..3 {
            if adjust[axis] != 0.0 {
                self.position[axis] += adjust[axis];
                self.velocity[axis] = -self.velocity[axis] * self.config.bounce;
            }
        }
        adjust
    }
}

impl Default for Submarine {
    fn default() -> Self {
        Self::new(SubmarineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    fn inside(sub: &Submarine) -> bool {
        sub.bounding_box().iter().all(|c| {
            (0..3).all(|a| c[a] >= TANK_MIN[a] - EPS && c[a] <= TANK_MAX[a] + EPS)
        })
    }

    #[test]
    fn test_initial_state() {
        let sub = Submarine::default();
        assert_eq!(sub.position, Vec3::new(0.0, 20.0, 0.0));
        assert_eq!(sub.velocity, Vec3::ZERO);
        assert_eq!((sub.dive(), sub.turn()), (0.0, 0.0));
        assert!(inside(&sub));
    }

    #[test]
    fn test_forward_points_along_negative_x() {
        let mut sub = Submarine::default();
        sub.forward();
        assert!((sub.velocity - Vec3::new(-0.4, 0.0, 0.0)).length() < 1e-6);
        sub.backward();
        assert!(sub.velocity.length() < 1e-6);
    }

    #[test]
    fn test_thrust_is_pitch_then_yaw() {
        // Nose down 90 then yaw 90: thrust points straight down whatever the yaw
        let v = thrust_vector(1.0, 90.0, 90.0);
        assert!((v - Vec3::new(0.0, -1.0, 0.0)).length() < 1e-5, "{v}");
        // Yaw first then pitch would give a different vector
        let yaw_first = glam::Mat3::from_rotation_z(90f32.to_radians())
            * glam::Mat3::from_rotation_y(90f32.to_radians())
            * Vec3::new(-1.0, 0.0, 0.0);
        assert!((v - yaw_first).length() > 0.5);

        let v = thrust_vector(1.0, 0.0, 90.0);
        assert!((v - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5, "{v}");
    }

    #[test]
    fn test_dive_clamped() {
        let mut sub = Submarine::default();
        for _ in 0..100 {
            sub.tilt_down();
        }
        assert_eq!(sub.dive(), 60.0);
        for _ in 0..200 {
            sub.tilt_up();
        }
        assert_eq!(sub.dive(), -60.0);
    }

    #[test]
    fn test_negative_dive_limit_does_not_panic() {
        let mut sub = Submarine::new(SubmarineConfig {
            max_dive: -10.0,
            ..SubmarineConfig::default()
        });
        for _ in 0..20 {
            sub.tilt_down();
        }
        assert_eq!(sub.dive(), 10.0);
    }

    #[test]
    fn test_turn_wraps() {
        let mut sub = Submarine::default();
        sub.turn_starboard();
        assert_eq!(sub.turn(), 358.0);
        for _ in 0..181 {
            sub.turn_port();
        }
        assert!((0.0..360.0).contains(&sub.turn()));
        assert!((sub.turn() - 0.0).abs() < 1e-3);
    }

    #[test]
    fn test_collision_pushes_back_from_every_face() {
        let centres = [
            Vec3::new(-49.0, 20.0, 0.0),
            Vec3::new(49.0, 20.0, 0.0),
            Vec3::new(0.0, 0.5, 0.0),
            Vec3::new(0.0, 39.5, 0.0),
            Vec3::new(0.0, 20.0, -24.0),
            Vec3::new(0.0, 20.0, 24.0),
        ];
        for (dive, turn) in [(0.0, 0.0), (30.0, 45.0), (-60.0, 300.0)] {
            for centre in centres {
                let mut sub = Submarine::default();
                sub.dive = dive;
                sub.turn = turn;
                sub.position = centre;
                sub.velocity = Vec3::new(3.0, -2.0, 1.0);
                let adjust = sub.resolve_collisions();
                assert!(adjust != Vec3::ZERO, "{centre} at {dive}/{turn}");
                assert!(inside(&sub), "{centre} at {dive}/{turn} still outside");
            }
        }
    }

    #[test]
    fn test_collision_reverses_velocity() {
        let mut sub = Submarine::default();
        sub.position = Vec3::new(-47.0, 20.0, 0.0);
        sub.velocity = Vec3::new(-4.0, 1.0, 0.0);
        let adjust = sub.resolve_collisions();
        assert!((adjust.x - 3.0).abs() < 1e-4);
        assert_eq!(adjust.y, 0.0);
        assert_eq!(sub.velocity, Vec3::new(2.0, 1.0, 0.0));
    }

    #[test]
    fn test_centre_above_surface_is_pulled_down() {
        let mut sub = Submarine::default();
        sub.position = Vec3::new(0.0, 45.0, 0.0);
        sub.resolve_collisions();
        assert!(sub.position.y <= 38.0 + EPS);
    }

    #[test]
    fn test_resistance_slows() {
        let mut sub = Submarine::default();
        sub.velocity = Vec3::new(1.0, 0.0, 0.0);
        sub.tick(0.1);
        assert!((sub.position.x - 0.1).abs() < 1e-6);
        assert!((sub.velocity.x - 0.93).abs() < 1e-6);
    }
}
