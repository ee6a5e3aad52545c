//! 3D Math Utilities
//!
//! Small helpers on top of `glam`: the hull orientation shared by thrust,
//! collision and drawing, endpoint-pinned interpolation, ring sampling and
//! procedural meshes with per-vertex normals.

use glam::{Mat3, Mat4, Vec3};
use std::f32::consts::{PI, TAU};

/// Orientation of a hull whose nose points along -X.
///
/// Pitch (`dive`) rotates about Z first, then yaw (`turn`) about Y. Both angles
/// are in degrees. The order matters: the two rotations do not commute.
#[inline]
pub fn pitch_then_yaw(dive_deg: f32, turn_deg: f32) -> Mat3 {
    Mat3::from_rotation_y(turn_deg.to_radians()) * Mat3::from_rotation_z(dive_deg.to_radians())
}

/// Linear interpolation at step `i` of `steps`, with `i == 0` and
/// `i == steps` returning the literal endpoints instead of interpolated values.
#[inline]
pub fn lerp_pinned(a: f32, b: f32, i: usize, steps: usize) -> f32 {
    if i == 0 {
        a
    } else if i == steps {
        b
    } else {
        a + i as f32 / steps as f32 * (b - a)
    }
}

/// Sample the unit circle at `(TAU / segments) * i`, returned as `(sin, cos)`.
pub fn unit_ring(segments: usize) -> Vec<(f32, f32)> {
    (0..segments)
        .map(|i| (TAU / segments as f32 * i as f32).sin_cos())
        .collect()
}

// ============================================================================
// Mesh
// ============================================================================

/// A triangle mesh with one normal per vertex
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub faces: Vec<[usize; 3]>,
}

impl Mesh {
    /// Create an empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            normals: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Cube centered at origin with flat face normals (24 vertices).
    /// Faces wind counter-clockwise seen from outside.
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        let axes = [
            (Vec3::X, Vec3::Y),
            (Vec3::NEG_X, Vec3::Y),
            (Vec3::Y, Vec3::Z),
            (Vec3::NEG_Y, Vec3::Z),
            (Vec3::Z, Vec3::X),
            (Vec3::NEG_Z, Vec3::X),
        ];

        let mut mesh = Self::new();
        for (normal, u) in axes {
            let v = normal.cross(u);
            let base = mesh.vertices.len();
            for corner in [-u - v, u - v, u + v, -u + v] {
                mesh.vertices.push((normal + corner) * h);
                mesh.normals.push(normal);
            }
            mesh.faces.push([base, base + 1, base + 2]);
            mesh.faces.push([base, base + 2, base + 3]);
        }
        mesh
    }

    /// Latitude/longitude sphere with poles on the Y axis
    pub fn sphere(radius: f32, slices: usize, stacks: usize) -> Self {
        let slices = slices.max(3);
        let stacks = stacks.max(2);
        let mut mesh = Self::new();

        for i in 0..=stacks {
            let phi = PI * i as f32 / stacks as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();
            for j in 0..=slices {
                let theta = TAU * j as f32 / slices as f32;
                let (sin_theta, cos_theta) = theta.sin_cos();
                let normal = Vec3::new(sin_phi * sin_theta, cos_phi, sin_phi * cos_theta);
                mesh.vertices.push(normal * radius);
                mesh.normals.push(normal);
            }
        }

        let row = slices + 1;
        for i in 0..stacks {
            for j in 0..slices {
                let a = i * row + j;
                let b = a + row;
                // Skip the degenerate triangles that collapse onto a pole
                if i != 0 {
                    mesh.faces.push([a, b, a + 1]);
                }
                if i != stacks - 1 {
                    mesh.faces.push([a + 1, b, b + 1]);
                }
            }
        }
        mesh
    }

    /// Copy of this mesh with every vertex moved by `transform`.
    /// Normals go through the inverse transpose so non-uniform scales stay correct.
    pub fn transformed(&self, transform: Mat4) -> Self {
        let normal_matrix = Mat3::from_mat4(transform).inverse().transpose();
        Self {
            vertices: self
                .vertices
                .iter()
                .map(|&v| transform.transform_point3(v))
                .collect(),
            normals: self
                .normals
                .iter()
                .map(|&n| (normal_matrix * n).normalize_or_zero())
                .collect(),
            faces: self.faces.clone(),
        }
    }

    /// Get face normal from the winding (for lighting checks and tests)
    pub fn face_normal(&self, face_idx: usize) -> Vec3 {
        let [a, b, c] = self.faces[face_idx];
        let edge1 = self.vertices[b] - self.vertices[a];
        let edge2 = self.vertices[c] - self.vertices[a];
        edge1.cross(edge2).normalize_or_zero()
    }
}
