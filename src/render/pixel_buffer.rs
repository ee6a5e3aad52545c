// ============================================================================
// Utility Functions
// ============================================================================

/// Alpha blend a single color channel
/// Uses fast approximation: (x + 1 + (x >> 8)) >> 8 instead of x / 255
#[inline]
fn blend_channel(src: u8, dst: u8, alpha: u16) -> u8 {
    let result = src as u16 * alpha + dst as u16 * (255 - alpha);
    ((result + 1 + (result >> 8)) >> 8) as u8
}

/// Write ABGR pixel to slice (RGBA8888 little-endian byte order)
#[inline]
fn write_pixel(dest: &mut [u8], r: u8, g: u8, b: u8) {
    dest[0] = 255; // A
    dest[1] = b; // B
    dest[2] = g; // G
    dest[3] = r; // R
}

// ============================================================================
// PixelBuffer
// ============================================================================

/// RGBA8888 colour buffer with an attached depth buffer.
/// The frame is rendered here and then uploaded to the window texture.
pub struct PixelBuffer {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    depth: Vec<f32>,
}

impl PixelBuffer {
    /// Create a pixel buffer with an attached depth buffer (initialized to infinity)
    pub fn with_depth(width: u32, height: u32) -> Self {
        let pixel_count = (width * height) as usize;
        Self {
            pixels: vec![0; pixel_count * 4],
            width,
            height,
            depth: vec![f32::INFINITY; pixel_count],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width over height, as used by the projection
    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Check if coordinates are within bounds
    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Calculate byte offset for pixel at (x, y)
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        ((y * self.width + x) * 4) as usize
    }

    /// Clear to a solid color
    /// Optimized: uses u32 fill for maximum speed
    pub fn clear(&mut self, r: u8, g: u8, b: u8) {
        // Create ABGR u32 pattern
        let pixel = u32::from_ne_bytes([255, b, g, r]);

        // Safety: pixels.len() is always divisible by 4 (width * height * 4).
        // We use write_unaligned to avoid assuming alignment of Vec<u8>.
        let ptr = self.pixels.as_mut_ptr().cast::<u32>();
        let len = self.pixels.len() / 4;

        for i in 0..len {
            // Safety: i < len ensures we stay within bounds
            unsafe {
                ptr.add(i).write_unaligned(pixel);
            }
        }
    }

    // ========================================================================
    // Depth Buffer
    // ========================================================================

    /// Reset depth buffer to infinity
    pub fn clear_depth(&mut self) {
        self.depth.fill(f32::INFINITY);
    }

    /// Clear color (A=255) and depth in one call
    pub fn clear_all(&mut self, r: u8, g: u8, b: u8) {
        self.clear(r, g, b);
        self.clear_depth();
    }

    /// Read depth value at (x, y). Returns None if out of bounds.
    #[inline]
    pub fn depth_at(&self, x: i32, y: i32) -> Option<f32> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(self.depth[(y as u32 * self.width + x as u32) as usize])
    }

    /// Depth test at (x, y): passes if z is nearer than the stored depth,
    /// in which case the stored depth is replaced.
    #[inline]
    fn depth_pass(&mut self, x: i32, y: i32, z: f32) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let pi = (y as u32 * self.width + x as u32) as usize;
        if z >= self.depth[pi] {
            return false;
        }
        self.depth[pi] = z;
        true
    }

    /// Depth-tested pixel write: writes only if z < current depth, then updates depth.
    #[inline]
    pub fn set_pixel_z(&mut self, x: i32, y: i32, z: f32, r: u8, g: u8, b: u8) {
        if self.depth_pass(x, y, z) {
            let idx = self.pixel_index(x as u32, y as u32);
            write_pixel(&mut self.pixels[idx..idx + 4], r, g, b);
        }
    }

    /// Depth-tested alpha blend. Translucent fragments still write depth.
    #[inline]
    pub fn blend_pixel_z(&mut self, x: i32, y: i32, z: f32, r: u8, g: u8, b: u8, a: u8) {
        if self.depth_pass(x, y, z) {
            self.blend_unchecked(x as u32, y as u32, r, g, b, a);
        }
    }

    #[inline]
    fn blend_unchecked(&mut self, x: u32, y: u32, r: u8, g: u8, b: u8, a: u8) {
        let idx = self.pixel_index(x, y);
        let alpha = a as u16;
        self.pixels[idx] = 255; // A - always opaque
        self.pixels[idx + 1] = blend_channel(b, self.pixels[idx + 1], alpha);
        self.pixels[idx + 2] = blend_channel(g, self.pixels[idx + 2], alpha);
        self.pixels[idx + 3] = blend_channel(r, self.pixels[idx + 3], alpha);
    }

    /// Read a pixel from the buffer (bounds checked)
    /// Returns None if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<(u8, u8, u8)> {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            Some((
                self.pixels[idx + 3], // R
                self.pixels[idx + 2], // G
                self.pixels[idx + 1], // B
            ))
        } else {
            None
        }
    }

    /// Depth-tested blended disc, used for point sprites.
    /// Every covered pixel gets the same depth `z`.
    pub fn fill_disc_blend_z(
        &mut self,
        cx: f32,
        cy: f32,
        radius: f32,
        z: f32,
        r: u8,
        g: u8,
        b: u8,
        a: u8,
    ) {
        let r2 = radius * radius;
        let y0 = (cy - radius).floor() as i32;
        let y1 = (cy + radius).ceil() as i32;
        let x0 = (cx - radius).floor() as i32;
        let x1 = (cx + radius).ceil() as i32;
        for y in y0..y1 {
            let dy = y as f32 + 0.5 - cy;
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - cx;
                if dx * dx + dy * dy <= r2 {
                    self.blend_pixel_z(x, y, z, r, g, b, a);
                }
            }
        }
    }

    /// Raw bytes for SDL texture upload
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_all_resets_color_and_depth() {
        let mut buf = PixelBuffer::with_depth(4, 3);
        buf.set_pixel_z(1, 1, 0.5, 9, 9, 9);
        buf.clear_all(77, 77, 77);
        assert_eq!(buf.get_pixel(1, 1), Some((77, 77, 77)));
        assert_eq!(buf.depth_at(1, 1), Some(f32::INFINITY));
        assert_eq!(buf.as_bytes().len(), 4 * 3 * 4);
    }

    #[test]
    fn test_depth_rejects_farther_fragment() {
        let mut buf = PixelBuffer::with_depth(2, 2);
        buf.set_pixel_z(0, 0, 0.3, 255, 0, 0);
        buf.set_pixel_z(0, 0, 0.6, 0, 255, 0);
        assert_eq!(buf.get_pixel(0, 0), Some((255, 0, 0)));
        buf.set_pixel_z(0, 0, 0.1, 0, 0, 255);
        assert_eq!(buf.get_pixel(0, 0), Some((0, 0, 255)));
        assert_eq!(buf.depth_at(0, 0), Some(0.1));
    }

    #[test]
    fn test_blend_writes_depth() {
        let mut buf = PixelBuffer::with_depth(2, 2);
        buf.clear_all(0, 0, 0);
        buf.blend_pixel_z(1, 0, 0.4, 255, 255, 255, 128);
        let (r, _, _) = buf.get_pixel(1, 0).unwrap_or_default();
        assert!((126..=130).contains(&r), "half blend, got {r}");
        assert_eq!(buf.depth_at(1, 0), Some(0.4));
        // Behind the translucent fragment: rejected
        buf.blend_pixel_z(1, 0, 0.5, 0, 0, 0, 255);
        assert_eq!(buf.get_pixel(1, 0).map(|p| p.0), Some(r));
    }

    #[test]
    fn test_out_of_bounds_is_ignored() {
        let mut buf = PixelBuffer::with_depth(2, 2);
        buf.set_pixel_z(-1, 0, 0.0, 1, 2, 3);
        buf.blend_pixel_z(0, 5, 0.0, 1, 2, 3, 255);
        assert_eq!(buf.get_pixel(-1, 0), None);
        assert_eq!(buf.depth_at(0, 5), None);
    }

    #[test]
    fn test_disc_covers_center_only() {
        let mut buf = PixelBuffer::with_depth(10, 10);
        buf.clear_all(0, 0, 0);
        buf.fill_disc_blend_z(5.0, 5.0, 2.0, 0.5, 255, 255, 255, 255);
        assert_eq!(buf.get_pixel(5, 5), Some((255, 255, 255)));
        assert_eq!(buf.get_pixel(4, 4), Some((255, 255, 255)));
        assert_eq!(buf.get_pixel(0, 0), Some((0, 0, 0)));
        assert_eq!(buf.get_pixel(8, 5), Some((0, 0, 0)));
    }
}
