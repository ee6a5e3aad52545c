//! Triangle, line and point rasterization
//!
//! Vertices arrive in clip space with their lit colours already computed.
//! Polygons are clipped against the near plane, fanned into triangles and
//! filled with perspective-correct colour and texture interpolation.
//! Every fragment is depth tested; translucent ones blend over the frame.

use glam::{Vec2, Vec3, Vec4};

use super::pixel_buffer::PixelBuffer;
use crate::texture::Texture;

/// Fragments with alpha at or above this are written opaque
const OPAQUE: f32 = 0.999;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterVertex {
    pub clip: Vec4,
    pub color: Vec4,
    pub uv: Vec2,
}

/// A vertex carrying both lit colours through clipping
#[derive(Debug, Clone, Copy)]
struct ClipVertex {
    clip: Vec4,
    front: Vec4,
    back: Vec4,
    uv: Vec2,
}

impl ClipVertex {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            clip: self.clip.lerp(other.clip, t),
            front: self.front.lerp(other.front, t),
            back: self.back.lerp(other.back, t),
            uv: self.uv.lerp(other.uv, t),
        }
    }

    /// Signed distance to the near plane, non-negative when visible
    #[inline]
    fn near_distance(&self) -> f32 {
        self.clip.z + self.clip.w
    }
}

/// A vertex after the perspective divide
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    /// Pixel position, y growing downwards
    pos: Vec2,
    depth: f32,
    inv_w: f32,
    /// Colour divided by w
    color: Vec4,
    /// Texture coordinates divided by w
    uv: Vec2,
}

#[inline]
fn to_u8(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

/// Sutherland-Hodgman against the near plane
fn clip_near(polygon: &[ClipVertex]) -> Vec<ClipVertex> {
    let mut out = Vec::with_capacity(polygon.len() + 2);
    for (i, current) in polygon.iter().enumerate() {
        let next = &polygon[(i + 1) % polygon.len()];
        let (dc, dn) = (current.near_distance(), next.near_distance());
        if dc >= 0.0 {
            out.push(*current);
        }
        if (dc >= 0.0) != (dn >= 0.0) {
            out.push(current.lerp(next, dc / (dc - dn)));
        }
    }
    out
}

pub struct Rasterizer<'a> {
    target: &'a mut PixelBuffer,
    width: f32,
    height: f32,
}

impl<'a> Rasterizer<'a> {
    pub fn new(target: &'a mut PixelBuffer) -> Self {
        let width = target.width() as f32;
        let height = target.height() as f32;
        Self {
            target,
            width,
            height,
        }
    }

    fn project(&self, clip: Vec4, color: Vec4, uv: Vec2) -> ScreenVertex {
        let inv_w = 1.0 / clip.w;
        let ndc = clip.truncate() * inv_w;
        ScreenVertex {
            pos: Vec2::new(
                (ndc.x + 1.0) * 0.5 * self.width,
                (1.0 - ndc.y) * 0.5 * self.height,
            ),
            depth: ndc.z * 0.5 + 0.5,
            inv_w,
            color: color * inv_w,
            uv: uv * inv_w,
        }
    }

    /// Fill a convex polygon. With `back_colors` the side facing the viewer
    /// picks the colour set: counter-clockwise on screen is the front.
    pub fn polygon(
        &mut self,
        vertices: &[RasterVertex],
        back_colors: Option<&[Vec4]>,
        texture: Option<&Texture>,
    ) {
        if vertices.len() < 3 {
            return;
        }
        let input: Vec<ClipVertex> = vertices
            .iter()
            .enumerate()
            .map(|(i, v)| ClipVertex {
                clip: v.clip,
                front: v.color,
                back: back_colors
                    .and_then(|colors| colors.get(i).copied())
                    .unwrap_or(v.color),
                uv: v.uv,
            })
            .collect();
        let clipped = clip_near(&input);
        if clipped.len() < 3 {
            return;
        }

        // Winding in normalized device coordinates (y up)
        let ndc: Vec<Vec2> = clipped
            .iter()
            .map(|v| v.clip.truncate().truncate() / v.clip.w)
            .collect();
        let area: f32 = (0..ndc.len())
            .map(|i| ndc[i].perp_dot(ndc[(i + 1) % ndc.len()]))
            .sum();
        let front_facing = area >= 0.0;

        let screen: Vec<ScreenVertex> = clipped
            .iter()
            .map(|v| {
                let color = if front_facing { v.front } else { v.back };
                self.project(v.clip, color, v.uv)
            })
            .collect();

        for i in 1..screen.len() - 1 {
            self.triangle(&screen[0], &screen[i], &screen[i + 1], texture);
        }
    }

    fn triangle(
        &mut self,
        a: &ScreenVertex,
        b: &ScreenVertex,
        c: &ScreenVertex,
        texture: Option<&Texture>,
    ) {
        let edge =
            |p: Vec2, q: Vec2, r: Vec2| (q.x - p.x) * (r.y - p.y) - (q.y - p.y) * (r.x - p.x);

        // Orient so the interior has positive edge values
        let (a, b, c) = if edge(a.pos, b.pos, c.pos) < 0.0 {
            (a, c, b)
        } else {
            (a, b, c)
        };
        let area = edge(a.pos, b.pos, c.pos);
        if area <= f32::EPSILON {
            return;
        }

        // Top-left fill rule so shared edges are drawn exactly once
        let top_left = |p: Vec2, q: Vec2| {
            let d = q - p;
            (d.y == 0.0 && d.x > 0.0) || d.y < 0.0
        };
        let covers = |w: f32, owns: bool| w > 0.0 || (w == 0.0 && owns);
        let owns = [top_left(b.pos, c.pos), top_left(c.pos, a.pos), top_left(a.pos, b.pos)];

        let min = a.pos.min(b.pos).min(c.pos).max(Vec2::ZERO);
        let max = a
            .pos
            .max(b.pos)
            .max(c.pos)
            .min(Vec2::new(self.width - 1.0, self.height - 1.0));
        let (x0, y0) = (min.x.floor() as i32, min.y.floor() as i32);
        let (x1, y1) = (max.x.ceil() as i32, max.y.ceil() as i32);

        for y in y0..=y1 {
            for x in x0..=x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let w0 = edge(b.pos, c.pos, p);
                let w1 = edge(c.pos, a.pos, p);
                let w2 = edge(a.pos, b.pos, p);
                if !(covers(w0, owns[0]) && covers(w1, owns[1]) && covers(w2, owns[2])) {
                    continue;
                }
                let (l0, l1, l2) = (w0 / area, w1 / area, w2 / area);

                let depth = l0 * a.depth + l1 * b.depth + l2 * c.depth;
                let inv_w = l0 * a.inv_w + l1 * b.inv_w + l2 * c.inv_w;
                let w = 1.0 / inv_w;
                let mut color = (a.color * l0 + b.color * l1 + c.color * l2) * w;
                if let Some(tex) = texture {
                    let uv = (a.uv * l0 + b.uv * l1 + c.uv * l2) * w;
                    let (r, g, bl, al) = tex.sample_rgba(uv.x, uv.y);
                    color *= Vec4::new(r as f32, g as f32, bl as f32, al as f32) / 255.0;
                }
                self.fragment(x, y, depth, color);
            }
        }
    }

    #[inline]
    fn fragment(&mut self, x: i32, y: i32, depth: f32, color: Vec4) {
        let (r, g, b) = (to_u8(color.x), to_u8(color.y), to_u8(color.z));
        if color.w >= OPAQUE {
            self.target.set_pixel_z(x, y, depth, r, g, b);
        } else {
            self.target.blend_pixel_z(x, y, depth, r, g, b, to_u8(color.w));
        }
    }

    /// One-pixel line with interpolated colour
    pub fn line(&mut self, from: &RasterVertex, to: &RasterVertex) {
        let wrap = |v: &RasterVertex| ClipVertex {
            clip: v.clip,
            front: v.color,
            back: v.color,
            uv: v.uv,
        };
        let (mut p, mut q) = (wrap(from), wrap(to));
        let (dp, dq) = (p.near_distance(), q.near_distance());
        if dp < 0.0 && dq < 0.0 {
            return;
        }
        if dp < 0.0 {
            p = p.lerp(&q, dp / (dp - dq));
        } else if dq < 0.0 {
            q = q.lerp(&p, dq / (dq - dp));
        }

        let a = self.project(p.clip, p.front, p.uv);
        let b = self.project(q.clip, q.front, q.uv);
        let delta = b.pos - a.pos;
        let steps = delta.x.abs().max(delta.y.abs()).ceil().max(1.0) as i32;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let pos = a.pos + delta * t;
            let inv_w = a.inv_w + (b.inv_w - a.inv_w) * t;
            let color = a.color.lerp(b.color, t) / inv_w;
            let depth = a.depth + (b.depth - a.depth) * t;
            self.fragment(pos.x.floor() as i32, pos.y.floor() as i32, depth, color);
        }
    }

    /// Round point sprite of the given pixel radius
    pub fn point(&mut self, vertex: &RasterVertex, radius: f32) {
        if vertex.clip.z + vertex.clip.w < 0.0 || vertex.clip.w <= 0.0 {
            return;
        }
        let v = self.project(vertex.clip, vertex.color, vertex.uv);
        let c = vertex.color;
        self.target.fill_disc_blend_z(
            v.pos.x,
            v.pos.y,
            radius,
            v.depth,
            to_u8(c.x),
            to_u8(c.y),
            to_u8(c.z),
            to_u8(c.w),
        );
    }
}

/// Transform a world-space point into clip space
#[inline]
pub fn to_clip(view_projection: &glam::Mat4, point: Vec3) -> Vec4 {
    *view_projection * point.extend(1.0)
}
