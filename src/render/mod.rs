//! Scene rendering
//!
//! Each frame clears the buffer, places the camera, then replays the
//! display lists and draws the moving parts in a fixed order so the
//! translucent water in front is blended last.

mod pixel_buffer;
pub mod raster;

pub use pixel_buffer::PixelBuffer;
pub use raster::{RasterVertex, Rasterizer};

use glam::{Mat3, Mat4, Vec3, Vec4};
use rand::Rng;

use crate::camera::{Camera, CameraMode};
use crate::config::AquariumConfig;
use crate::error::StartupError;
use crate::geometry::{DisplayList, DisplayListPool, Material, SceneBatches, Shape, Vertex};
use crate::lighting::LightSet;
use crate::math3d::Mesh;
use crate::sim::Aquarium;
use crate::texture::{TextureId, TextureSet};

/// Clear colour, 0.3 grey
const BACKGROUND: u8 = 77;
const BUBBLE_MATERIAL: Material = Material::rgba(0.8, 0.8, 1.0, 0.2).with_shininess(50.0);
const BUBBLE_RADIUS: f32 = 0.8;
/// Pixel radius of a bubble drawn as a point
const BUBBLE_POINT_RADIUS: f32 = 2.0;

pub struct SceneRenderer {
    batches: SceneBatches,
    textures: TextureSet,
    bubble: Mesh,
}

/// Per-frame state shared by every draw call
struct Frame<'a> {
    view_projection: Mat4,
    viewer: Vec3,
    lights: &'a LightSet,
    textures: &'a TextureSet,
}

impl SceneRenderer {
    pub fn new(batches: SceneBatches, textures: TextureSet) -> Self {
        Self {
            batches,
            textures,
            bubble: Mesh::sphere(BUBBLE_RADIUS, 10, 10),
        }
    }

    /// Decode the textures and compile the display lists
    pub fn load(config: &AquariumConfig) -> Result<Self, StartupError> {
        let textures = TextureSet::load(&config.textures)?;
        let mut pool = DisplayListPool::new(config.display_list_capacity);
        let batches = SceneBatches::build(&mut pool)?;
        Ok(Self::new(batches, textures))
    }

    pub fn batches(&self) -> &SceneBatches {
        &self.batches
    }

    /// Draw the current state of `scene` into `target`
    pub fn render<R: Rng>(&self, scene: &Aquarium<R>, target: &mut PixelBuffer) {
        self.draw(scene, target, Pass::for_view(scene.view()));
    }

    fn draw<R: Rng>(&self, scene: &Aquarium<R>, target: &mut PixelBuffer, passes: &[Pass]) {
        target.clear_all(BACKGROUND, BACKGROUND, BACKGROUND);

        let camera = Camera::for_mode(scene.view(), scene.submarine(), target.aspect());
        let frame = Frame {
            view_projection: camera.view_projection(),
            viewer: camera.viewer_direction(),
            lights: scene.lights(),
            textures: &self.textures,
        };
        let mut raster = Rasterizer::new(target);
        let batches = &self.batches;

        for pass in passes {
            match pass {
                Pass::Static => {
                    for list in [
                        &batches.lights,
                        &batches.ground,
                        &batches.tank,
                        &batches.water_back,
                        &batches.aerator,
                    ] {
                        frame.list(&mut raster, list, Mat4::IDENTITY);
                    }
                }
                Pass::BubbleSpheres => {
                    for bubble in scene.bubbles().active() {
                        let model = Mat4::from_translation(bubble.position);
                        frame.mesh(&mut raster, &self.bubble, model, &BUBBLE_MATERIAL);
                    }
                }
                Pass::BubblePoints => {
                    for bubble in scene.bubbles().active() {
                        let color = frame.lights.shade(
                            bubble.position,
                            Vec3::Y,
                            frame.viewer,
                            &BUBBLE_MATERIAL,
                        );
                        let vertex = RasterVertex {
                            clip: raster::to_clip(&frame.view_projection, bubble.position),
                            color,
                            uv: glam::Vec2::ZERO,
                        };
                        raster.point(&vertex, BUBBLE_POINT_RADIUS);
                    }
                }
                Pass::Submarine => {
                    let sub = scene.submarine();
                    let model = Mat4::from_translation(sub.position)
                        * Mat4::from_rotation_y(sub.turn().to_radians())
                        * Mat4::from_rotation_z(sub.dive().to_radians());
                    frame.list(&mut raster, &batches.submarine, model);
                }
                Pass::WaterFront => {
                    frame.list(&mut raster, &batches.water_front, Mat4::IDENTITY);
                }
            }
        }
    }
}

/// One step of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    /// Lamps, ground, tank, back water and aerator
    Static,
    BubbleSpheres,
    BubblePoints,
    Submarine,
    /// Translucent, so it goes last
    WaterFront,
}

impl Pass {
    /// Drawing order for a view. From inside the hull the submarine is
    /// not drawn and bubbles are close enough to need real geometry.
    const fn for_view(view: CameraMode) -> &'static [Self] {
        match view {
            CameraMode::Interior => &[Self::Static, Self::BubbleSpheres, Self::WaterFront],
            CameraMode::Exterior => &[
                Self::Static,
                Self::BubblePoints,
                Self::Submarine,
                Self::WaterFront,
            ],
        }
    }
}

impl Frame<'_> {
    fn list(&self, raster: &mut Rasterizer, list: &DisplayList, model: Mat4) {
        let normal_matrix = Mat3::from_mat4(model).inverse().transpose();
        for prim in list.primitives() {
            let texture = prim.texture.map(|id: TextureId| self.textures.get(id));
            let (front, back) = self.shade(
                &prim.vertices,
                model,
                normal_matrix,
                &prim.material,
                prim.back.as_ref(),
            );
            match prim.shape {
                Shape::Polygon => raster.polygon(&front, back.as_deref(), texture),
                Shape::LineLoop => {
                    for i in 0..front.len() {
                        raster.line(&front[i], &front[(i + 1) % front.len()]);
                    }
                }
            }
        }
    }

    fn mesh(&self, raster: &mut Rasterizer, mesh: &Mesh, model: Mat4, material: &Material) {
        let normal_matrix = Mat3::from_mat4(model).inverse().transpose();
        for face in &mesh.faces {
            let vertices = face.map(|i| Vertex::new(mesh.vertices[i], mesh.normals[i]));
            let (front, _) = self.shade(&vertices, model, normal_matrix, material, None);
            raster.polygon(&front, None, None);
        }
    }

    /// Light every vertex, and again with the reversed normal for
    /// two-sided primitives
    fn shade(
        &self,
        vertices: &[Vertex],
        model: Mat4,
        normal_matrix: Mat3,
        material: &Material,
        back: Option<&Material>,
    ) -> (Vec<RasterVertex>, Option<Vec<Vec4>>) {
        let mut front = Vec::with_capacity(vertices.len());
        let mut back_colors = back.map(|_| Vec::with_capacity(vertices.len()));
        for v in vertices {
            let position = model.transform_point3(v.position);
            let normal = (normal_matrix * v.normal).normalize_or_zero();
            front.push(RasterVertex {
                clip: raster::to_clip(&self.view_projection, position),
                color: self.lights.shade(position, normal, self.viewer, material),
                uv: v.uv,
            });
            if let (Some(colors), Some(back)) = (back_colors.as_mut(), back) {
                colors.push(self.lights.shade(position, -normal, self.viewer, back));
            }
        }
        (front, back_colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::DisplayListPool;
    use crate::input::Command;
    use crate::texture::Texture;

    const SIZE: u32 = 400;

    fn renderer() -> SceneRenderer {
        let mut pool = DisplayListPool::new(16);
        let batches = SceneBatches::build(&mut pool).unwrap();
        let textures = TextureSet::from_textures([
            Texture::checkerboard(256, 32, (220, 200, 150), (180, 160, 110)),
            Texture::checkerboard(256, 32, (90, 90, 80), (60, 60, 50)),
            Texture::checkerboard(256, 16, (140, 90, 40), (110, 70, 30)),
        ]);
        SceneRenderer::new(batches, textures)
    }

    fn aquarium() -> Aquarium {
        Aquarium::new(&AquariumConfig {
            seed: Some(9),
            ..AquariumConfig::default()
        })
    }

    /// Pixel the submarine's centre lands on from the fixed camera
    fn hull_pixel(scene: &Aquarium) -> (i32, i32) {
        let camera = Camera::exterior(1.0);
        let clip = raster::to_clip(&camera.view_projection(), scene.submarine().position);
        let ndc = clip.truncate() / clip.w;
        let x = (ndc.x + 1.0) * 0.5 * SIZE as f32;
        let y = (1.0 - ndc.y) * 0.5 * SIZE as f32;
        (x as i32, y as i32)
    }

    fn pixel_with(
        renderer: &SceneRenderer,
        scene: &Aquarium,
        passes: &[Pass],
        (x, y): (i32, i32),
    ) -> (u8, u8, u8) {
        let mut buffer = PixelBuffer::with_depth(SIZE, SIZE);
        renderer.draw(scene, &mut buffer, passes);
        buffer.get_pixel(x, y).unwrap()
    }

    #[test]
    fn test_pass_order() {
        let outside = Pass::for_view(CameraMode::Exterior);
        assert_eq!(outside.last(), Some(&Pass::WaterFront));
        assert!(outside.contains(&Pass::Submarine));
        assert!(outside.contains(&Pass::BubblePoints));
        assert!(!outside.contains(&Pass::BubbleSpheres));

        let inside = Pass::for_view(CameraMode::Interior);
        assert_eq!(inside.last(), Some(&Pass::WaterFront));
        assert!(!inside.contains(&Pass::Submarine));
        assert!(inside.contains(&Pass::BubbleSpheres));
        assert!(!inside.contains(&Pass::BubblePoints));
    }

    #[test]
    fn test_submarine_seen_through_front_water() {
        let renderer = renderer();
        let scene = aquarium();
        let at = hull_pixel(&scene);

        let full = pixel_with(&renderer, &scene, Pass::for_view(CameraMode::Exterior), at);
        let without_sub = pixel_with(
            &renderer,
            &scene,
            &[Pass::Static, Pass::BubblePoints, Pass::WaterFront],
            at,
        );
        let bare_hull = pixel_with(
            &renderer,
            &scene,
            &[Pass::Static, Pass::BubblePoints, Pass::Submarine],
            at,
        );
        assert_ne!(full, without_sub, "hull hidden");
        assert_ne!(full, bare_hull, "front water not blended over the hull");
    }

    #[test]
    fn test_front_water_first_would_hide_the_hull() {
        let renderer = renderer();
        let scene = aquarium();
        let at = hull_pixel(&scene);

        let water_first = pixel_with(
            &renderer,
            &scene,
            &[Pass::Static, Pass::WaterFront, Pass::Submarine],
            at,
        );
        let without_sub = pixel_with(&renderer, &scene, &[Pass::Static, Pass::WaterFront], at);
        assert_eq!(water_first, without_sub);
    }

    #[test]
    fn test_interior_skips_the_hull() {
        let renderer = renderer();
        let mut scene = aquarium();
        scene.apply(Command::View(CameraMode::Interior));

        let mut rendered = PixelBuffer::with_depth(64, 64);
        renderer.render(&scene, &mut rendered);
        let mut with_sub = PixelBuffer::with_depth(64, 64);
        renderer.draw(
            &scene,
            &mut with_sub,
            &[Pass::Static, Pass::Submarine, Pass::WaterFront],
        );
        assert_ne!(rendered.as_bytes(), with_sub.as_bytes(), "camera sits inside the hull");
    }
}
