//! Software-rendered aquarium
//!
//! A glass tank with sand, a wooden shelf and an aerator, lit by six
//! switchable spotlights. A small submarine can be steered around the tank
//! and the view switched between a fixed camera outside and the
//! submarine's cockpit. Everything is drawn by a software rasterizer into
//! a [`render::PixelBuffer`]; the window itself lives in the binary.

pub mod bubbles;
pub mod camera;
pub mod config;
pub mod control;
pub mod error;
pub mod geometry;
pub mod input;
pub mod lighting;
pub mod math3d;
pub mod render;
pub mod sgi;
pub mod sim;
pub mod submarine;
pub mod texture;
pub mod util;

pub const WINDOW_TITLE: &str = "Aquarium";
pub const WINDOW_WIDTH: u32 = 400;
pub const WINDOW_HEIGHT: u32 = 400;
