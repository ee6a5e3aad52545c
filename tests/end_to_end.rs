use aquarium::bubbles::BubbleConfig;
use aquarium::camera::CameraMode;
use aquarium::config::AquariumConfig;
use aquarium::geometry::{DisplayListPool, SceneBatches};
use aquarium::input::{Command, MenuEntry};
use aquarium::render::{PixelBuffer, SceneRenderer};
use aquarium::sim::{Aquarium, Flow};
use aquarium::submarine::{TANK_MAX, TANK_MIN};
use aquarium::texture::{Texture, TextureSet};
use aquarium::util::FixedStep;

const BACKGROUND: (u8, u8, u8) = (77, 77, 77);

fn seeded(config: AquariumConfig) -> Aquarium {
    Aquarium::new(&AquariumConfig {
        seed: Some(1234),
        ..config
    })
}

fn synthetic_renderer() -> SceneRenderer {
    let mut pool = DisplayListPool::new(16);
    let batches = SceneBatches::build(&mut pool).unwrap();
    let textures = TextureSet::from_textures([
        Texture::checkerboard(256, 32, (220, 200, 150), (180, 160, 110)),
        Texture::checkerboard(256, 32, (90, 90, 80), (60, 60, 50)),
        Texture::checkerboard(256, 16, (140, 90, 40), (110, 70, 30)),
    ]);
    SceneRenderer::new(batches, textures)
}

fn drawn_pixels(buffer: &PixelBuffer) -> usize {
    let (w, h) = (buffer.width() as i32, buffer.height() as i32);
    (0..h)
        .flat_map(|y| (0..w).map(move |x| (x, y)))
        .filter(|&(x, y)| buffer.get_pixel(x, y) != Some(BACKGROUND))
        .count()
}

#[test]
fn bubble_pool_runs_out_after_its_capacity() {
    let mut aquarium = seeded(AquariumConfig {
        bubbles: BubbleConfig {
            buoyancy: 0.0,
            spread: 0.0,
            ..BubbleConfig::default()
        },
        ..AquariumConfig::default()
    });
    let mut clock = FixedStep(0.301);

    for _ in 0..60 {
        let report = aquarium.step(&mut clock);
        assert_eq!(report.bubbles.spawned, 1);
        assert!(!report.bubbles.exhausted);
    }
    let report = aquarium.step(&mut clock);
    assert_eq!(report.bubbles.active, 60);
    assert!(report.bubbles.exhausted);
    assert_eq!(aquarium.bubbles().active().count(), aquarium.bubbles().capacity());
}

#[test]
fn steering_keeps_attitude_in_range() {
    let mut aquarium = seeded(AquariumConfig::default());
    for _ in 0..100 {
        aquarium.apply(Command::TiltDown);
    }
    assert!((aquarium.submarine().dive().abs() - 60.0).abs() < 1e-4);
    for _ in 0..200 {
        aquarium.apply(Command::TiltUp);
    }
    assert!((aquarium.submarine().dive().abs() - 60.0).abs() < 1e-4);

    for _ in 0..500 {
        aquarium.apply(Command::TurnStarboard);
        let turn = aquarium.submarine().turn();
        assert!((0.0..360.0).contains(&turn));
    }
    for _ in 0..500 {
        aquarium.apply(Command::TurnPort);
        let turn = aquarium.submarine().turn();
        assert!((0.0..360.0).contains(&turn));
    }
}

#[test]
fn full_throttle_stays_inside_the_tank() {
    let mut aquarium = seeded(AquariumConfig::default());
    let mut clock = FixedStep(1.0 / 30.0);
    for frame in 0..900 {
        if frame % 3 == 0 {
            aquarium.apply(Command::Forward);
        }
        if frame % 40 == 0 {
            aquarium.apply(Command::TurnPort);
            aquarium.apply(Command::TiltUp);
        }
        aquarium.step(&mut clock);
        let p = aquarium.submarine().position;
        assert!(p.cmpge(TANK_MIN).all() && p.cmple(TANK_MAX).all(), "frame {frame}: {p}");
    }
}

#[test]
fn menu_and_keys_drive_view_and_exit() {
    let mut aquarium = seeded(AquariumConfig::default());
    assert_eq!(aquarium.apply(MenuEntry::SubmarineView.command()), Flow::Continue);
    assert_eq!(aquarium.view(), CameraMode::Interior);
    assert!(!aquarium.lights().is_enabled(0));

    let key = Command::from_char('o').unwrap();
    aquarium.apply(key);
    assert_eq!(aquarium.view(), CameraMode::Exterior);
    assert!(aquarium.lights().is_enabled(0));

    for n in 1..=6 {
        aquarium.apply(Command::ToggleLight(n));
        assert!(!aquarium.lights().is_enabled(n as usize));
    }
    assert_eq!(aquarium.apply(Command::from_char('\u{1b}').unwrap()), Flow::Quit);
    assert_eq!(aquarium.apply(MenuEntry::Exit.command()), Flow::Quit);
}

#[test]
fn inside_view_tints_the_spotlights() {
    let mut aquarium = seeded(AquariumConfig::default());
    let outside = aquarium.lights().lights()[1].color;
    aquarium.apply(Command::View(CameraMode::Interior));
    let inside = aquarium.lights().lights()[1].color;
    assert!(!aquarium.lights().is_enabled(0));
    assert!(inside.z > inside.x && inside.z > inside.y);
    assert!(inside.x < outside.x);
}

#[test]
fn hand_edited_config_cannot_crash_steering() {
    let config: AquariumConfig =
        serde_json::from_str(r#"{ "seed": 1, "submarine": { "max_dive": -10.0 } }"#).unwrap();
    assert!(config.validate().is_err());

    let mut aquarium = Aquarium::new(&config);
    for _ in 0..20 {
        aquarium.apply(Command::TiltDown);
    }
    assert!(aquarium.submarine().dive().abs() <= 10.0);
}

#[test]
fn renders_both_views() {
    let renderer = synthetic_renderer();
    let mut aquarium = seeded(AquariumConfig::default());
    for _ in 0..30 {
        aquarium.tick(0.1);
    }
    assert!(aquarium.bubbles().active().count() > 0);

    let mut buffer = PixelBuffer::with_depth(120, 120);
    renderer.render(&aquarium, &mut buffer);
    let outside = drawn_pixels(&buffer);
    assert!(outside > 120 * 120 / 8, "only {outside} pixels drawn outside");

    aquarium.apply(Command::View(CameraMode::Interior));
    renderer.render(&aquarium, &mut buffer);
    let inside = drawn_pixels(&buffer);
    assert!(inside > 0, "nothing drawn from the submarine");
}

#[test]
fn renderer_needs_seven_display_lists() {
    let mut pool = DisplayListPool::new(6);
    assert!(SceneBatches::build(&mut pool).is_err());
    assert_eq!(pool.live(), 0);

    let renderer = synthetic_renderer();
    assert_eq!(renderer.batches().submarine.name(), "submarine");
}
