mod display;

use anyhow::Context;
use aquarium::config::{AquariumConfig, CONFIG_FILE};
use aquarium::control::Controller;
use aquarium::input::{Command, MenuEntry};
use aquarium::render::{PixelBuffer, SceneRenderer};
use aquarium::sim::{Aquarium, Flow};
use aquarium::util::{FpsCounter, SystemClock};
use aquarium::{WINDOW_HEIGHT, WINDOW_TITLE, WINDOW_WIDTH};
use display::{Display, InputEvent, RenderTarget};
use std::io::Write;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn print_banner() {
    println!("=== {WINDOW_TITLE} ===");
    println!("Controls:");
    println!("  1-6        - Toggle spotlights");
    println!("  f / j      - Forward / back");
    println!("  Up / Down  - Tilt up / down");
    println!("  Left/Right - Turn port / starboard");
    println!("  i / o      - Inside / outside view");
    println!("  Escape     - Exit");
    println!();
    let entries: Vec<&str> = MenuEntry::ALL.iter().map(|e| e.label()).collect();
    println!("Middle click switches view. Menu: {}", entries.join(", "));
    println!(
        "Commands are also read from {}",
        aquarium::control::SOCKET_PATH
    );
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    print_banner();

    let config = AquariumConfig::load_or_default(CONFIG_FILE);
    let (mut display, texture_creator) =
        Display::open(WINDOW_TITLE, WINDOW_WIDTH, WINDOW_HEIGHT, config.vsync)
            .map_err(anyhow::Error::msg)?;
    let mut target = RenderTarget::new(&texture_creator, WINDOW_WIDTH, WINDOW_HEIGHT)
        .map_err(anyhow::Error::msg)?;
    let mut buffer = PixelBuffer::with_depth(WINDOW_WIDTH, WINDOW_HEIGHT);

    let renderer = SceneRenderer::load(&config).context("failed to set up the scene")?;
    let mut scene = Aquarium::new(&config);

    let controller = match Controller::new() {
        Ok(controller) => {
            info!(path = %controller.socket_path().display(), "listening for commands");
            Some(controller)
        }
        Err(e) => {
            warn!(error = %e, "remote control unavailable");
            None
        }
    };

    let mut clock = SystemClock::new();
    let mut fps_counter = FpsCounter::new(60);
    let mut last_fps = 0.0;
    let mut title = String::from(WINDOW_TITLE);

    'main: loop {
        let mut commands = Vec::new();
        for event in display.poll_events() {
            match event {
                InputEvent::Quit => break 'main,
                InputEvent::Command(command) => commands.push(command),
                InputEvent::ToggleView => commands.push(Command::View(scene.view().toggled())),
            }
        }
        if let Some(controller) = &controller {
            commands.extend(controller.poll());
        }
        for command in commands {
            if scene.apply(command) == Flow::Quit {
                break 'main;
            }
        }

        let report = scene.step(&mut clock);

        if let Some(fps) = fps_counter.record(report.dt) {
            last_fps = fps;
        }
        let active = report.bubbles.active;
        eprint!("\rFPS: {last_fps:.1}   Active bubbles: {active:2}   ");
        let _ = std::io::stderr().flush();

        let status = format!(
            "{WINDOW_TITLE} - {} - {:.0} fps - {active} bubbles",
            scene.view().label(),
            fps_counter.average_fps()
        );
        if status != title {
            display.set_title(&status).map_err(anyhow::Error::msg)?;
            title = status;
        }

        renderer.render(&scene, &mut buffer);
        display
            .present(&mut target, &buffer)
            .map_err(anyhow::Error::msg)?;
    }

    eprintln!();
    info!(view = scene.view().label(), "exiting");
    Ok(())
}
