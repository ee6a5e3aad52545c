//! SDL2 window that shows a [`PixelBuffer`] and turns keyboard and mouse
//! events into aquarium commands

use aquarium::input::Command;
use aquarium::render::PixelBuffer;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::mouse::MouseButton;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;

pub struct Display {
    canvas: Canvas<Window>,
    event_pump: EventPump,
}

/// Streaming texture the pixel buffer is uploaded into
pub struct RenderTarget<'a> {
    texture: Texture<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Window closed
    Quit,
    Command(Command),
    /// Middle click: switch between the two views
    ToggleView,
}

/// Arrow keys steer; printable keys go through [`Command::from_char`]
fn key_command(key: Keycode) -> Option<Command> {
    let ch = match key {
        Keycode::Up => return Some(Command::TiltUp),
        Keycode::Down => return Some(Command::TiltDown),
        Keycode::Left => return Some(Command::TurnPort),
        Keycode::Right => return Some(Command::TurnStarboard),
        Keycode::Escape => '\u{1b}',
        Keycode::Num1 => '1',
        Keycode::Num2 => '2',
        Keycode::Num3 => '3',
        Keycode::Num4 => '4',
        Keycode::Num5 => '5',
        Keycode::Num6 => '6',
        Keycode::F => 'f',
        Keycode::J => 'j',
        Keycode::I => 'i',
        Keycode::O => 'o',
        _ => return None,
    };
    Command::from_char(ch)
}

impl Display {
    /// Open a centred window
    /// vsync=true: locked to monitor refresh (typically 60fps)
    /// vsync=false: uncapped framerate
    pub fn open(
        title: &str,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<(Self, TextureCreator<WindowContext>), String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;

        let mut canvas_builder = window.into_canvas().accelerated();
        if vsync {
            canvas_builder = canvas_builder.present_vsync();
        }
        let canvas = canvas_builder.build().map_err(|e| e.to_string())?;

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump()?;

        Ok((
            Self {
                canvas,
                event_pump,
            },
            texture_creator,
        ))
    }

    pub fn set_title(&mut self, title: &str) -> Result<(), String> {
        self.canvas
            .window_mut()
            .set_title(title)
            .map_err(|e| e.to_string())
    }

    /// Upload the frame and flip
    pub fn present(
        &mut self,
        target: &mut RenderTarget,
        frame: &PixelBuffer,
    ) -> Result<(), String> {
        target
            .texture
            .update(None, frame.as_bytes(), (frame.width() * 4) as usize)
            .map_err(|e| e.to_string())?;

        self.canvas.copy(&target.texture, None, None)?;
        self.canvas.present();
        Ok(())
    }

    /// Drain pending SDL events. Keys without a binding are dropped.
    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        self.event_pump
            .poll_iter()
            .filter_map(|event| match event {
                Event::Quit { .. } => Some(InputEvent::Quit),
                Event::KeyDown {
                    keycode: Some(key),
                    ..
                } => key_command(key).map(InputEvent::Command),
                Event::MouseButtonDown {
                    mouse_btn: MouseButton::Middle,
                    ..
                } => Some(InputEvent::ToggleView),
                _ => None,
            })
            .collect()
    }
}

impl<'a> RenderTarget<'a> {
    pub fn new(
        texture_creator: &'a TextureCreator<WindowContext>,
        width: u32,
        height: u32,
    ) -> Result<Self, String> {
        let texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::RGBA8888, width, height)
            .map_err(|e| e.to_string())?;
        Ok(Self { texture })
    }
}
