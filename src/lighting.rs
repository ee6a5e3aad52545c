//! Light set and per-vertex lighting
//!
//! Seven point lights: the dim room light (0) high above the tank, and six
//! spotlights (1-6) hanging under the lamp spheres and shining straight
//! down. Shading follows the classic fixed-function model: emission, scene
//! ambient, then per light an ambient, Lambert diffuse and Blinn specular
//! term, all scaled by the spotlight cone.

use glam::{Vec3, Vec4};

use crate::camera::CameraMode;
use crate::geometry::Material;

pub const LIGHT_COUNT: usize = 7;
const SPOT_CUTOFF_DEGREES: f32 = 30.0;

const ROOM_LIGHT_COLOR: Vec3 = Vec3::new(0.04, 0.04, 0.03);
const SPOT_COLOR_OUTSIDE: Vec3 = Vec3::ONE;
const SPOT_COLOR_UNDERWATER: Vec3 = Vec3::new(0.4, 0.4, 1.0);
const AMBIENT_OUTSIDE: Vec3 = Vec3::new(0.7, 0.7, 0.7);
const AMBIENT_UNDERWATER: Vec3 = Vec3::new(0.5, 0.5, 1.0);

const POSITIONS: [Vec3; LIGHT_COUNT] = [
    Vec3::new(0.0, 400.0, 100.0),
    Vec3::new(-30.0, 50.0, 12.0),
    Vec3::new(-30.0, 50.0, -12.0),
    Vec3::new(0.0, 50.0, 12.0),
    Vec3::new(0.0, 50.0, -12.0),
    Vec3::new(30.0, 50.0, 12.0),
    Vec3::new(30.0, 50.0, -12.0),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub direction: Vec3,
    /// Half-angle of the cone in degrees; 180 means omnidirectional
    pub cutoff: f32,
    /// Ambient, diffuse and specular intensity
    pub color: Vec3,
    pub enabled: bool,
}

impl Light {
    /// Spotlight factor at a point: 1 inside the cone, 0 outside
    fn spot(&self, to_light: Vec3) -> f32 {
        if self.cutoff >= 180.0 {
            return 1.0;
        }
        let cos_angle = (-to_light).dot(self.direction);
        if cos_angle >= self.cutoff.to_radians().cos() {
            1.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone)]
pub struct LightSet {
    lights: [Light; LIGHT_COUNT],
    scene_ambient: Vec3,
}

impl LightSet {
    /// All lights on, set up for the exterior view
    pub fn new() -> Self {
        let lights = std::array::from_fn(|i| {
            if i == 0 {
                Light {
                    position: POSITIONS[0],
                    direction: Vec3::NEG_Y,
                    cutoff: 180.0,
                    color: ROOM_LIGHT_COLOR,
                    enabled: true,
                }
            } else {
                Light {
                    position: POSITIONS[i],
                    direction: Vec3::NEG_Y,
                    cutoff: SPOT_CUTOFF_DEGREES,
                    color: SPOT_COLOR_OUTSIDE,
                    enabled: true,
                }
            }
        });
        let mut set = Self {
            lights,
            scene_ambient: AMBIENT_OUTSIDE,
        };
        set.set_view(CameraMode::Exterior);
        set
    }

    /// Flip spotlight `n` (1-6). Returns false for any other number.
    pub fn toggle(&mut self, n: u8) -> bool {
        match n {
            1..=6 => {
                let light = &mut self.lights[n as usize];
                light.enabled = !light.enabled;
                true
            }
            _ => false,
        }
    }

    #[inline]
    pub fn is_enabled(&self, n: usize) -> bool {
        self.lights.get(n).is_some_and(|l| l.enabled)
    }

    #[inline]
    pub fn lights(&self) -> &[Light; LIGHT_COUNT] {
        &self.lights
    }

    #[inline]
    pub fn scene_ambient(&self) -> Vec3 {
        self.scene_ambient
    }

    /// The room light only shines outside; underwater the spots turn blue
    /// and the ambient tint shifts.
    pub fn set_view(&mut self, mode: CameraMode) {
        let (room, spot, ambient) = match mode {
            CameraMode::Exterior => (true, SPOT_COLOR_OUTSIDE, AMBIENT_OUTSIDE),
            CameraMode::Interior => (false, SPOT_COLOR_UNDERWATER, AMBIENT_UNDERWATER),
        };
        self.lights[0].enabled = room;
        for light in &mut self.lights[1..] {
            light.color = spot;
        }
        self.scene_ambient = ambient;
    }

    /// Lit colour of a surface point. `viewer` is the unit direction
    /// towards the eye. Colour channels are clamped to [0, 1]; alpha is
    /// the material's.
    pub fn shade(&self, point: Vec3, normal: Vec3, viewer: Vec3, material: &Material) -> Vec4 {
        let reflect = material.color.truncate();
        let mut color = material.emission + self.scene_ambient * reflect;

        for light in self.lights.iter().filter(|l| l.enabled) {
            let to_light = (light.position - point).normalize_or_zero();
            let spot = light.spot(to_light);
            if spot == 0.0 {
                continue;
            }
            let mut contribution = light.color * reflect;
            let diffuse = normal.dot(to_light);
            if diffuse > 0.0 {
                contribution += light.color * reflect * diffuse;
                let half = (to_light + viewer).normalize_or_zero();
                let specular = normal.dot(half).max(0.0).powf(material.shininess);
                contribution += light.color * reflect * specular;
            }
            color += contribution * spot;
        }

        color.clamp(Vec3::ZERO, Vec3::ONE).extend(material.color.w)
    }
}

impl Default for LightSet {
    fn default() -> Self {
        Self::new()
    }
}
