//! Camera placement
//!
//! Two viewpoints: a fixed one outside the tank, and a first-person one
//! riding in the submarine.

use glam::{Mat4, Vec3};

use crate::submarine::Submarine;

const FOV_Y_DEGREES: f32 = 45.0;
const NEAR: f32 = 1.0;
const FAR: f32 = 400.0;

const EXTERIOR_EYE: Vec3 = Vec3::new(100.0, 50.0, 150.0);
const EXTERIOR_TARGET: Vec3 = Vec3::new(0.0, 25.0, 0.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    /// Fixed view from outside the tank
    #[default]
    Exterior,
    /// Looking out of the submarine
    Interior,
}

impl CameraMode {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Exterior => Self::Interior,
            Self::Interior => Self::Exterior,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Exterior => "fixed view",
            Self::Interior => "submarine view",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub view: Mat4,
    pub projection: Mat4,
    /// Eye position in world space
    pub eye: Vec3,
}

impl Camera {
    /// Fixed viewpoint outside the tank
    pub fn exterior(aspect: f32) -> Self {
        Self {
            view: Mat4::look_at_rh(EXTERIOR_EYE, EXTERIOR_TARGET, Vec3::Y),
            projection: projection(aspect),
            eye: EXTERIOR_EYE,
        }
    }

    /// First-person view from the submarine: undo its translation, yaw and
    /// pitch, looking down the hull's -X axis
    pub fn interior(sub: &Submarine, aspect: f32) -> Self {
        let view = Mat4::from_rotation_x(sub.dive().to_radians())
            * Mat4::from_rotation_y((-sub.turn() - 90.0).to_radians())
            * Mat4::from_translation(-sub.position);
        Self {
            view,
            projection: projection(aspect),
            eye: sub.position,
        }
    }

    pub fn for_mode(mode: CameraMode, sub: &Submarine, aspect: f32) -> Self {
        match mode {
            CameraMode::Exterior => Self::exterior(aspect),
            CameraMode::Interior => Self::interior(sub, aspect),
        }
    }

    #[inline]
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// World-space direction towards the viewer for an infinitely distant
    /// eye, i.e. the camera's +Z axis
    pub fn viewer_direction(&self) -> Vec3 {
        self.view.inverse().transform_vector3(Vec3::Z).normalize_or_zero()
    }
}

fn projection(aspect: f32) -> Mat4 {
    Mat4::perspective_rh_gl(FOV_Y_DEGREES.to_radians(), aspect, NEAR, FAR)
}
