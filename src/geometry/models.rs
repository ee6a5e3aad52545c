//! The aquarium's static scenery
//!
//! World units: the water fills x in [-50, 50], y in [0, 40], z in [-25, 25].
//! The glass reaches y = 50 and sits on a wooden base whose skirt touches
//! the ground at y = -5.

use glam::{Mat4, Vec2, Vec3};

use super::{DisplayList, DisplayListPool, GeometryError, ListBuilder, Material};
use crate::math3d::{unit_ring, Mesh};
use crate::texture::TextureId;

/// Segments of the aerator and the light shades
const CONE_SEGMENTS: usize = 10;
/// Segments of the hull sphere and propeller guard
const SUBMARINE_SEGMENTS: usize = 16;
const WATER_SIDES_SUBDIVISION: usize = 3;
const WATER_TOP_SUBDIVISION: usize = 10;

/// Centres of the six lamp spheres hanging over the tank
pub const LAMP_POSITIONS: [Vec3; 6] = [
    Vec3::new(-30.0, 54.0, 12.0),
    Vec3::new(-30.0, 54.0, -12.0),
    Vec3::new(0.0, 54.0, 12.0),
    Vec3::new(0.0, 54.0, -12.0),
    Vec3::new(30.0, 54.0, 12.0),
    Vec3::new(30.0, 54.0, -12.0),
];
const LAMP_RADIUS: f32 = 3.0;

/// Base of the aerator cone, where bubbles are released from above
pub const AERATOR_POSITION: Vec3 = Vec3::new(0.0, 0.0, -20.0);

/// Glass corners: bottom ring (y = 0) then top ring (y = 50)
const GLASS: [Vec3; 8] = [
    Vec3::new(-50.0, 0.0, 25.0),
    Vec3::new(-50.0, 0.0, -25.0),
    Vec3::new(50.0, 0.0, -25.0),
    Vec3::new(50.0, 0.0, 25.0),
    Vec3::new(-50.0, 50.0, 25.0),
    Vec3::new(-50.0, 50.0, -25.0),
    Vec3::new(50.0, 50.0, -25.0),
    Vec3::new(50.0, 50.0, 25.0),
];
const GLASS_NORMALS: [Vec3; 4] = [Vec3::NEG_X, Vec3::NEG_Z, Vec3::X, Vec3::Z];

const BASE: [Vec3; 4] = [
    Vec3::new(-55.0, -5.0, 30.0),
    Vec3::new(-55.0, -5.0, -30.0),
    Vec3::new(55.0, -5.0, -30.0),
    Vec3::new(55.0, -5.0, 30.0),
];
const LID: [Vec3; 4] = [
    Vec3::new(-40.0, 60.0, 15.0),
    Vec3::new(-40.0, 60.0, -15.0),
    Vec3::new(40.0, 60.0, -15.0),
    Vec3::new(40.0, 60.0, 15.0),
];
/// Outward-and-up normals of the sloping base and lid sides
const SLOPE_NORMALS: [Vec3; 4] = [
    Vec3::new(-0.707, 0.707, 0.0),
    Vec3::new(0.0, 0.707, -0.707),
    Vec3::new(0.707, 0.707, 0.0),
    Vec3::new(0.0, 0.707, 0.707),
];

/// Water corners: floor ring (y = 0) then surface ring (y = 40)
const WATER: [Vec3; 8] = [
    Vec3::new(-50.0, 0.0, -25.0),
    Vec3::new(50.0, 0.0, -25.0),
    Vec3::new(50.0, 0.0, 25.0),
    Vec3::new(-50.0, 0.0, 25.0),
    Vec3::new(-50.0, 40.0, -25.0),
    Vec3::new(50.0, 40.0, -25.0),
    Vec3::new(50.0, 40.0, 25.0),
    Vec3::new(-50.0, 40.0, 25.0),
];

const WATER_MATERIAL: Material = Material::rgba(0.2, 0.2, 0.8, 0.3).with_shininess(100.0);
const SUBMARINE_MATERIAL: Material = Material::rgb(0.0124, 0.1288, 0.1992).with_shininess(100.0);

/// Every display list the scene replays
#[derive(Debug)]
pub struct SceneBatches {
    pub ground: DisplayList,
    pub tank: DisplayList,
    pub water_back: DisplayList,
    pub water_front: DisplayList,
    pub lights: DisplayList,
    pub aerator: DisplayList,
    pub submarine: DisplayList,
}

impl SceneBatches {
    /// Compile the whole scene; needs seven free handles in `pool`
    pub fn build(pool: &mut DisplayListPool) -> Result<Self, GeometryError> {
        let batches = Self {
            ground: pool.compile("ground", ground)?,
            tank: pool.compile("tank", tank)?,
            water_back: pool.compile("waterBack", water_back)?,
            water_front: pool.compile("waterFront", water_front)?,
            lights: pool.compile("lights", lights)?,
            aerator: pool.compile("aerator", aerator)?,
            submarine: pool.compile("submarine", submarine)?,
        };
        tracing::info!("compiled {} display lists", pool.live());
        Ok(batches)
    }
}

/// Texture coordinates for the sloping wooden quads
const SLOPE_UVS: [Vec2; 4] = [
    Vec2::new(1.0, 0.0),
    Vec2::new(0.0, 0.0),
    Vec2::new(0.0, 1.0),
    Vec2::new(1.0, 1.0),
];

fn ground(b: &mut ListBuilder) {
    b.material(Material::rgb(1.0, 1.0, 1.0))
        .texture(Some(TextureId::Ground))
        .textured_quad(
            [
                Vec3::new(-75.0, -5.0, 50.0),
                Vec3::new(-75.0, -5.0, -50.0),
                Vec3::new(75.0, -5.0, -50.0),
                Vec3::new(75.0, -5.0, 50.0),
            ],
            [
                Vec2::new(0.0, 1.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(0.0, 0.0),
            ],
            Vec3::Y,
        );
}

fn tank(b: &mut ListBuilder) {
    // Glass edges
    b.material(Material::rgba(0.4, 0.8, 0.8, 0.5).with_shininess(100.0))
        .texture(None);
    for i in 0..4 {
        let next = (i + 1) % 4;
        b.line_loop(
            &[GLASS[i], GLASS[i + 4], GLASS[next + 4], GLASS[next]],
            GLASS_NORMALS[i],
        );
    }

    // Sand floor
    b.material(Material::rgb(0.4, 0.4, 1.0))
        .texture(Some(TextureId::Sand))
        .textured_quad(
            [GLASS[0], GLASS[1], GLASS[2], GLASS[3]],
            [
                Vec2::new(0.0, 0.0),
                Vec2::new(0.0, 1.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(1.0, 0.0),
            ],
            Vec3::Y,
        );

    // Wooden base sloping from the glass down to the skirt
    b.material(Material::rgb(0.8, 0.8, 0.8).with_shininess(64.0))
        .texture(Some(TextureId::Wood));
    for i in 0..4 {
        let next = (i + 1) % 4;
        b.textured_quad(
            [GLASS[i], BASE[i], BASE[next], GLASS[next]],
            SLOPE_UVS,
            SLOPE_NORMALS[i],
        );
    }

    // Lid sides and top
    b.material(Material::rgb(0.5, 0.5, 0.5).with_shininess(64.0));
    for i in 0..4 {
        let next = (i + 1) % 4;
        b.textured_quad(
            [GLASS[i + 4], LID[i], LID[next], GLASS[next + 4]],
            SLOPE_UVS,
            SLOPE_NORMALS[i],
        );
    }
    b.textured_quad(LID, SLOPE_UVS, Vec3::Y);

    // Shelf the bubbles bounce off
    b.material(Material::rgb(0.2, 0.2, 0.2).with_shininess(64.0))
        .texture(None)
        .mesh(
            &Mesh::cube(1.0),
            Mat4::from_translation(Vec3::new(0.0, 20.5, -20.0))
                * Mat4::from_scale(Vec3::new(20.0, 1.0, 10.0)),
        );
}

fn water_back(b: &mut ListBuilder) {
    b.material(WATER_MATERIAL).grid(
        &super::subdivide_xy(WATER[0], WATER[5], WATER_SIDES_SUBDIVISION),
        Vec3::NEG_Z,
    );
}

fn water_front(b: &mut ListBuilder) {
    b.material(WATER_MATERIAL)
        .grid(
            &super::subdivide_xz(WATER[4], WATER[6], WATER_TOP_SUBDIVISION),
            Vec3::Y,
        )
        .grid(
            &super::subdivide_yz(WATER[1], WATER[6], WATER_SIDES_SUBDIVISION),
            Vec3::X,
        )
        .grid(
            &super::subdivide_xy(WATER[2], WATER[7], WATER_SIDES_SUBDIVISION),
            Vec3::Z,
        )
        .grid(
            &super::subdivide_yz(WATER[3], WATER[4], WATER_SIDES_SUBDIVISION),
            Vec3::NEG_X,
        );
}

fn lights(b: &mut ListBuilder) {
    let lamp = Mesh::sphere(LAMP_RADIUS, 15, 15);
    b.material(
        Material::rgb(1.0, 1.0, 0.8)
            .with_shininess(128.0)
            .with_emission(Vec3::ONE),
    );
    for position in LAMP_POSITIONS {
        b.mesh(&lamp, Mat4::from_translation(position));
    }

    // Open cylinders around each lamp
    let ring = unit_ring(CONE_SEGMENTS);
    let normals: Vec<Vec3> = ring.iter().map(|&(s, c)| Vec3::new(s, 0.0, c)).collect();
    let shade_radius = LAMP_RADIUS + 0.2;
    b.material(Material::rgb(0.0, 0.0, 0.0).with_shininess(128.0));
    for position in LAMP_POSITIONS {
        let at_height = |y: f32| -> Vec<Vec3> {
            normals
                .iter()
                .map(|n| position + Vec3::new(n.x * shade_radius, y, n.z * shade_radius))
                .collect()
        };
        b.ring_strip(&at_height(-LAMP_RADIUS), &at_height(LAMP_RADIUS), &normals);
    }
}

fn aerator(b: &mut ListBuilder) {
    let (top_radius, bottom_radius, height) = (1.0, 4.0, 7.0);
    let ring = unit_ring(CONE_SEGMENTS);
    let at = |radius: f32, y: f32| -> Vec<Vec3> {
        ring.iter()
            .map(|&(s, c)| AERATOR_POSITION + Vec3::new(radius * s, y, radius * c))
            .collect()
    };
    let normals: Vec<Vec3> = ring
        .iter()
        .map(|&(s, c)| Vec3::new(height * s, bottom_radius - top_radius, height * c).normalize())
        .collect();

    b.two_sided(
        Material::rgb(0.2, 0.07, 0.02),
        Material::rgb(0.0, 0.0, 1.0).with_shininess(128.0),
    )
    .texture(None)
    .ring_strip(&at(top_radius, height), &at(bottom_radius, 0.0), &normals);
}

fn submarine(b: &mut ListBuilder) {
    let radius = 1.5;
    b.material(SUBMARINE_MATERIAL).texture(None).mesh(
        &Mesh::sphere(radius, SUBMARINE_SEGMENTS, SUBMARINE_SEGMENTS),
        Mat4::from_scale(Vec3::new(4.0, 1.0, 1.0)),
    );

    // Propeller guard
    let normals: Vec<Vec3> = unit_ring(SUBMARINE_SEGMENTS)
        .into_iter()
        .map(|(s, c)| Vec3::new(0.0, s, c))
        .collect();
    let at = |x: f32| -> Vec<Vec3> {
        normals
            .iter()
            .map(|n| Vec3::new(x, n.y * radius, n.z * radius))
            .collect()
    };
    b.ring_strip(&at(5.5), &at(6.5), &normals);

    // Tower
    b.mesh(
        &Mesh::cube(1.0),
        Mat4::from_translation(Vec3::new(0.0, 1.5, 0.0))
            * Mat4::from_scale(Vec3::new(3.0, 1.0, 1.0)),
    );
    // Elevators
    b.mesh(
        &Mesh::cube(0.5),
        Mat4::from_translation(Vec3::new(-2.5, 0.0, 0.0))
            * Mat4::from_scale(Vec3::new(3.0, 1.0, 8.0)),
    );
    // Rudder
    b.mesh(
        &Mesh::cube(0.25),
        Mat4::from_translation(Vec3::new(6.75, 0.0, 0.0))
            * Mat4::from_scale(Vec3::new(2.0, 8.0 * radius, 1.0)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Shape;

    fn batches() -> SceneBatches {
        let mut pool = DisplayListPool::new(16);
        SceneBatches::build(&mut pool).unwrap()
    }

    #[test]
    fn test_build_needs_seven_handles() {
        let mut pool = DisplayListPool::new(6);
        let err = SceneBatches::build(&mut pool).unwrap_err();
        assert_eq!(
            err,
            GeometryError::ResourceExhausted {
                list: "submarine",
                capacity: 6
            }
        );
        // Lists compiled before the failure were dropped again
        assert_eq!(pool.live(), 0);
    }

    #[test]
    fn test_water_grid_sizes() {
        let scene = batches();
        assert_eq!(scene.water_back.primitives().len(), 9);
        assert_eq!(scene.water_front.primitives().len(), 100 + 3 * 9);
        assert_eq!(scene.water_front.name(), "waterFront");
    }

    #[test]
    fn test_tank_contents() {
        let scene = batches();
        let prims = scene.tank.primitives();
        let outlines = prims.iter().filter(|p| p.shape == Shape::LineLoop).count();
        assert_eq!(outlines, 4);
        let wood = prims
            .iter()
            .filter(|p| p.texture == Some(TextureId::Wood))
            .count();
        assert_eq!(wood, 9);
        // Shelf top face sits at y = 21
        let shelf_top = prims
            .iter()
            .flat_map(|p| &p.vertices)
            .filter(|v| v.normal == Vec3::Y && (v.position.y - 21.0).abs() < 1e-4)
            .count();
        assert!(shelf_top > 0);
    }

    #[test]
    fn test_aerator_is_two_sided_and_faces_out() {
        let scene = batches();
        for prim in scene.aerator.primitives() {
            assert!(prim.back.is_some());
            for v in &prim.vertices {
                let radial = Vec3::new(v.position.x, 0.0, v.position.z + 20.0);
                assert!(v.normal.dot(radial) > 0.0);
                assert!(v.normal.y > 0.0);
            }
        }
    }

    #[test]
    fn test_lamps_glow() {
        let scene = batches();
        let glowing = scene
            .lights
            .primitives()
            .iter()
            .filter(|p| p.material.emission == Vec3::ONE)
            .count();
        let shades = scene.lights.primitives().len() - glowing;
        assert_eq!(shades, 6 * CONE_SEGMENTS);
        assert!(glowing > 0);
    }

    #[test]
    fn test_submarine_fits_its_bounding_box() {
        let scene = batches();
        for v in scene.submarine.primitives().iter().flat_map(|p| &p.vertices) {
            assert!(v.position.x >= -6.0 - 1e-4 && v.position.x <= 7.25 + 1e-4);
            assert!(v.position.y >= -1.5 - 1e-4 && v.position.y <= 2.0 + 1e-4);
            assert!(v.position.z.abs() <= 2.0 + 1e-4);
        }
    }
}
