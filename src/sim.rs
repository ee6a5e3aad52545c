//! The aquarium: everything that changes while the program runs
//!
//! Owns the submarine, the bubble pool, the light set and the current view.
//! Input arrives as [`Command`]s; time advances through [`Aquarium::tick`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::bubbles::{BubblePool, BubbleReport};
use crate::camera::CameraMode;
use crate::config::AquariumConfig;
use crate::input::Command;
use crate::lighting::LightSet;
use crate::submarine::Submarine;
use crate::util::Clock;

/// Whether the main loop should keep going after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub dt: f32,
    pub bubbles: BubbleReport,
}

pub struct Aquarium<R: Rng = StdRng> {
    submarine: Submarine,
    bubbles: BubblePool,
    lights: LightSet,
    view: CameraMode,
    rng: R,
}

impl Aquarium<StdRng> {
    /// Seeded from `config.seed` when present, from entropy otherwise
    pub fn new(config: &AquariumConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> Aquarium<R> {
    pub fn with_rng(config: &AquariumConfig, rng: R) -> Self {
        let view = CameraMode::default();
        let mut lights = LightSet::new();
        lights.set_view(view);
        Self {
            submarine: Submarine::new(config.submarine),
            bubbles: BubblePool::new(config.bubbles),
            lights,
            view,
            rng,
        }
    }

    /// Act on one command
    pub fn apply(&mut self, command: Command) -> Flow {
        debug!(?command, "apply");
        match command {
            Command::ToggleLight(n) => {
                self.lights.toggle(n);
            }
            Command::Forward => self.submarine.forward(),
            Command::Backward => self.submarine.backward(),
            Command::TiltUp => self.submarine.tilt_up(),
            Command::TiltDown => self.submarine.tilt_down(),
            Command::TurnPort => self.submarine.turn_port(),
            Command::TurnStarboard => self.submarine.turn_starboard(),
            Command::View(mode) => {
                self.view = mode;
                self.lights.set_view(mode);
            }
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Advance the submarine, then the bubbles, by `dt` seconds
    pub fn tick(&mut self, dt: f32) -> TickReport {
        self.submarine.tick(dt);
        let bubbles = self.bubbles.tick(dt, &mut self.rng);
        TickReport { dt, bubbles }
    }

    /// Tick by however long `clock` says has passed
    pub fn step(&mut self, clock: &mut impl Clock) -> TickReport {
        self.tick(clock.tick())
    }

    #[inline]
    pub fn view(&self) -> CameraMode {
        self.view
    }

    #[inline]
    pub fn submarine(&self) -> &Submarine {
        &self.submarine
    }

    #[inline]
    pub fn bubbles(&self) -> &BubblePool {
        &self.bubbles
    }

    #[inline]
    pub fn lights(&self) -> &LightSet {
        &self.lights
    }
}
