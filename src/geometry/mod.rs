//! Display lists
//!
//! Static scenery is built once at startup into immutable [`DisplayList`]s
//! and replayed by the renderer every frame. A [`DisplayListPool`] hands
//! out a bounded number of list handles; a handle goes back to the pool
//! when its list is dropped.

pub mod models;
pub mod subdivide;

pub use models::SceneBatches;
pub use subdivide::{subdivide_xy, subdivide_xz, subdivide_yz, Grid};

use glam::{Mat4, Vec2, Vec3, Vec4};
use std::cell::Cell;
use std::rc::Rc;
use thiserror::Error;

use crate::math3d::Mesh;
use crate::texture::TextureId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("no display list handle left for {list} (capacity {capacity})")]
    ResourceExhausted { list: &'static str, capacity: usize },
}

// ============================================================================
// Primitives
// ============================================================================

/// Surface material. The colour serves as ambient, diffuse and specular
/// reflectance; its alpha is the fragment alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Vec4,
    pub emission: Vec3,
    pub shininess: f32,
}

impl Material {
    pub const fn new(color: Vec4, shininess: f32) -> Self {
        Self {
            color,
            emission: Vec3::ZERO,
            shininess,
        }
    }

    /// Opaque material with no specular highlight
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(Vec4::new(r, g, b, 1.0), 0.0)
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self::new(Vec4::new(r, g, b, a), 0.0)
    }

    #[must_use]
    pub const fn with_shininess(mut self, shininess: f32) -> Self {
        self.shininess = shininess;
        self
    }

    #[must_use]
    pub const fn with_emission(mut self, emission: Vec3) -> Self {
        self.emission = emission;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

impl Vertex {
    pub const fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position,
            normal,
            uv: Vec2::ZERO,
        }
    }

    #[must_use]
    pub const fn with_uv(mut self, uv: Vec2) -> Self {
        self.uv = uv;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Convex polygon, filled
    Polygon,
    /// Closed outline through every vertex
    LineLoop,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub shape: Shape,
    pub vertices: Vec<Vertex>,
    pub material: Material,
    /// Back-face material; when set the back side is lit with the
    /// reversed normal
    pub back: Option<Material>,
    pub texture: Option<TextureId>,
}

// ============================================================================
// Builder
// ============================================================================

/// Records primitives for one display list. Material, back material and
/// texture are sticky state applied to everything emitted after them.
pub struct ListBuilder {
    primitives: Vec<Primitive>,
    material: Material,
    back: Option<Material>,
    texture: Option<TextureId>,
}

impl ListBuilder {
    fn new() -> Self {
        Self {
            primitives: Vec::new(),
            material: Material::rgb(0.8, 0.8, 0.8),
            back: None,
            texture: None,
        }
    }

    /// Use `material` for both sides
    pub fn material(&mut self, material: Material) -> &mut Self {
        self.material = material;
        self.back = None;
        self
    }

    /// Separate front and back materials (two-sided lighting)
    pub fn two_sided(&mut self, front: Material, back: Material) -> &mut Self {
        self.material = front;
        self.back = Some(back);
        self
    }

    pub fn texture(&mut self, texture: Option<TextureId>) -> &mut Self {
        self.texture = texture;
        self
    }

    fn push(&mut self, shape: Shape, vertices: Vec<Vertex>) -> &mut Self {
        self.primitives.push(Primitive {
            shape,
            vertices,
            material: self.material,
            back: self.back,
            texture: self.texture,
        });
        self
    }

    /// Convex polygon with its own per-vertex normals and texture coordinates
    pub fn polygon(&mut self, vertices: Vec<Vertex>) -> &mut Self {
        self.push(Shape::Polygon, vertices)
    }

    /// Flat quad with one shared normal
    pub fn quad(&mut self, corners: [Vec3; 4], normal: Vec3) -> &mut Self {
        let vertices = corners.iter().map(|&p| Vertex::new(p, normal)).collect();
        self.polygon(vertices)
    }

    pub fn textured_quad(&mut self, corners: [Vec3; 4], uvs: [Vec2; 4], normal: Vec3) -> &mut Self {
        let vertices = corners
            .iter()
            .zip(uvs)
            .map(|(&p, uv)| Vertex::new(p, normal).with_uv(uv))
            .collect();
        self.polygon(vertices)
    }

    pub fn line_loop(&mut self, points: &[Vec3], normal: Vec3) -> &mut Self {
        let vertices = points.iter().map(|&p| Vertex::new(p, normal)).collect();
        self.push(Shape::LineLoop, vertices)
    }

    /// Band of quads joining two rings of equal length. Segment `i` uses
    /// `normals[i]` on both rings, and the last segment closes back to 0.
    pub fn ring_strip(&mut self, first: &[Vec3], second: &[Vec3], normals: &[Vec3]) -> &mut Self {
        let n = first.len().min(second.len()).min(normals.len());
        for i in 0..n {
            let k = (i + 1) % n;
            self.polygon(vec![
                Vertex::new(first[i], normals[i]),
                Vertex::new(second[i], normals[i]),
                Vertex::new(second[k], normals[k]),
                Vertex::new(first[k], normals[k]),
            ]);
        }
        self
    }

    /// Every face of `mesh`, moved by `transform`
    pub fn mesh(&mut self, mesh: &Mesh, transform: Mat4) -> &mut Self {
        let mesh = mesh.transformed(transform);
        for &[a, b, c] in &mesh.faces {
            self.polygon(
                [a, b, c]
                    .iter()
                    .map(|&i| Vertex::new(mesh.vertices[i], mesh.normals[i]))
                    .collect(),
            );
        }
        self
    }

    /// All quads of a subdivided plane with one shared normal
    pub fn grid(&mut self, grid: &Grid, normal: Vec3) -> &mut Self {
        for corners in grid.quads() {
            self.quad(corners, normal);
        }
        self
    }
}

// ============================================================================
// Pool
// ============================================================================

/// Keeps a pool slot occupied for as long as its list lives
#[derive(Debug)]
struct ListHandle {
    id: u32,
    live: Rc<Cell<usize>>,
}

impl Drop for ListHandle {
    fn drop(&mut self) {
        self.live.set(self.live.get().saturating_sub(1));
    }
}

/// An immutable, named batch of primitives
#[derive(Debug)]
pub struct DisplayList {
    name: &'static str,
    handle: ListHandle,
    primitives: Vec<Primitive>,
}

impl DisplayList {
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.handle.id
    }

    #[inline]
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn vertex_count(&self) -> usize {
        self.primitives.iter().map(|p| p.vertices.len()).sum()
    }
}

/// Bounded allocator of display list handles
pub struct DisplayListPool {
    capacity: usize,
    live: Rc<Cell<usize>>,
    next_id: u32,
}

impl DisplayListPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            live: Rc::new(Cell::new(0)),
            next_id: 1,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lists currently alive
    #[inline]
    pub fn live(&self) -> usize {
        self.live.get()
    }

    /// Record a new list. Fails without running `build` when every handle
    /// is taken.
    pub fn compile(
        &mut self,
        name: &'static str,
        build: impl FnOnce(&mut ListBuilder),
    ) -> Result<DisplayList, GeometryError> {
        if self.live.get() >= self.capacity {
            return Err(GeometryError::ResourceExhausted {
                list: name,
                capacity: self.capacity,
            });
        }

        let mut builder = ListBuilder::new();
        build(&mut builder);

        self.live.set(self.live.get() + 1);
        let handle = ListHandle {
            id: self.next_id,
            live: Rc::clone(&self.live),
        };
        self.next_id += 1;

        let list = DisplayList {
            name,
            handle,
            primitives: builder.primitives,
        };
        tracing::debug!(
            "display list {} #{}: {} primitives, {} vertices",
            name,
            list.id(),
            list.primitives.len(),
            list.vertex_count()
        );
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_capacity_is_enforced() {
        let mut pool = DisplayListPool::new(2);
        let a = pool.compile("a", |_| {});
        let b = pool.compile("b", |_| {});
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(pool.live(), 2);

        let err = pool.compile("c", |_| {}).unwrap_err();
        assert_eq!(
            err,
            GeometryError::ResourceExhausted {
                list: "c",
                capacity: 2
            }
        );
    }

    #[test]
    fn test_dropping_a_list_frees_its_handle() {
        let mut pool = DisplayListPool::new(1);
        let first = pool.compile("first", |_| {}).unwrap();
        assert!(pool.compile("second", |_| {}).is_err());
        drop(first);
        assert_eq!(pool.live(), 0);
        let second = pool.compile("second", |_| {}).unwrap();
        assert_eq!(second.name(), "second");
        assert_eq!(second.id(), 2);
    }

    #[test]
    fn test_builder_state_is_sticky() {
        let mut pool = DisplayListPool::new(4);
        let red = Material::rgb(1.0, 0.0, 0.0);
        let blue = Material::rgb(0.0, 0.0, 1.0);
        let list = pool
            .compile("state", |b| {
                b.material(red)
                    .texture(Some(TextureId::Wood))
                    .quad([Vec3::ZERO, Vec3::X, Vec3::ONE, Vec3::Y], Vec3::Z);
                b.two_sided(red, blue)
                    .texture(None)
                    .line_loop(&[Vec3::ZERO, Vec3::X, Vec3::Y], Vec3::Z);
            })
            .unwrap();

        let [quad, outline] = list.primitives() else {
            panic!("expected two primitives");
        };
        assert_eq!(quad.shape, Shape::Polygon);
        assert_eq!(quad.texture, Some(TextureId::Wood));
        assert_eq!(quad.back, None);
        assert_eq!(outline.shape, Shape::LineLoop);
        assert_eq!(outline.back, Some(blue));
        assert_eq!(outline.texture, None);
        assert_eq!(list.vertex_count(), 7);
    }

    #[test]
    fn test_ring_strip_closes_the_band() {
        let ring = |y: f32| -> Vec<Vec3> {
            crate::math3d::unit_ring(4)
                .into_iter()
                .map(|(s, c)| Vec3::new(s, y, c))
                .collect()
        };
        let normals: Vec<Vec3> = ring(0.0);
        let mut pool = DisplayListPool::new(1);
        let list = pool
            .compile("band", |b| {
                b.ring_strip(&ring(1.0), &ring(0.0), &normals);
            })
            .unwrap();
        assert_eq!(list.primitives().len(), 4);
        let last = &list.primitives()[3];
        assert_eq!(last.vertices[2].position, ring(0.0)[0]);
        assert_eq!(last.vertices[3].position, ring(1.0)[0]);
        assert_eq!(last.vertices[3].normal, normals[0]);
    }

    #[test]
    fn test_mesh_emits_one_polygon_per_face() {
        let mut pool = DisplayListPool::new(1);
        let cube = Mesh::cube(1.0);
        let list = pool
            .compile("cube", |b| {
                b.mesh(&cube, Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0)));
            })
            .unwrap();
        assert_eq!(list.primitives().len(), 12);
        assert!(list
            .primitives()
            .iter()
            .flat_map(|p| &p.vertices)
            .all(|v| (v.position.y - 5.0).abs() <= 0.5 + 1e-6));
    }
}
