//! Commands from the keyboard, the view menu and the control socket

use crate::camera::CameraMode;

/// One discrete user action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Flip spotlight 1-6
    ToggleLight(u8),
    Forward,
    Backward,
    TiltUp,
    TiltDown,
    TurnPort,
    TurnStarboard,
    View(CameraMode),
    Quit,
}

impl Command {
    /// Printable keys. Arrow keys have no character and are mapped by the
    /// window layer.
    pub fn from_char(key: char) -> Option<Self> {
        match key {
            '1'..='6' => Some(Self::ToggleLight(key as u8 - b'0')),
            'f' => Some(Self::Forward),
            'j' => Some(Self::Backward),
            'i' => Some(Self::View(CameraMode::Interior)),
            'o' => Some(Self::View(CameraMode::Exterior)),
            '\u{1b}' => Some(Self::Quit),
            _ => None,
        }
    }

    /// Parse one line of the text control protocol
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim().to_lowercase();
        match line.as_str() {
            "forward" | "f" => Some(Self::Forward),
            "backward" | "back" | "j" => Some(Self::Backward),
            "up" => Some(Self::TiltUp),
            "down" => Some(Self::TiltDown),
            "left" | "port" => Some(Self::TurnPort),
            "right" | "starboard" => Some(Self::TurnStarboard),
            "inside" | "i" | "submarine view" => Some(Self::View(CameraMode::Interior)),
            "outside" | "o" | "fixed view" => Some(Self::View(CameraMode::Exterior)),
            "quit" | "exit" | "q" => Some(Self::Quit),
            _ => {
                // "light N" or just "N"
                let n = line.strip_prefix("light ").unwrap_or(&line).trim();
                match n.parse::<u8>() {
                    Ok(n @ 1..=6) => Some(Self::ToggleLight(n)),
                    _ => None,
                }
            }
        }
    }
}

/// Entries of the view menu, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    FixedView,
    SubmarineView,
    Exit,
}

impl MenuEntry {
    pub const ALL: [Self; 3] = [Self::FixedView, Self::SubmarineView, Self::Exit];

    pub fn label(self) -> &'static str {
        match self {
            Self::FixedView => "Fixed View",
            Self::SubmarineView => "Submarine View",
            Self::Exit => "Exit",
        }
    }

    pub fn command(self) -> Command {
        match self {
            Self::FixedView => Command::View(CameraMode::Exterior),
            Self::SubmarineView => Command::View(CameraMode::Interior),
            Self::Exit => Command::Quit,
        }
    }
}
