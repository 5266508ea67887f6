use anyhow::Context;
use clap::Parser;
use colored::*;
use log::{debug, info};
use minifb::Key;
use std::time::Instant;

use rusty_hue::app::{App, AppEvent};
use rusty_hue::args::Args;
use rusty_hue::camera::{self, CameraSource, StreamRequest};
use rusty_hue::clipboard;
use rusty_hue::config::AppConfig;
use rusty_hue::draw::{self, Canvas, TextRenderer};
use rusty_hue::output::WindowOutput;
use rusty_hue::permission::{Granted, NokhwaAuthorization, PermissionManager};
use rusty_hue::presenter::{self, View};
use rusty_hue::sampler::SamplingSession;
use rusty_hue::types::FacingMode;

fn open_session(
    args: &Args,
    config: &AppConfig,
    granted: Granted,
) -> anyhow::Result<SamplingSession<CameraSource>> {
    let facing = if config.camera.prefer_rear {
        FacingMode::Environment
    } else {
        FacingMode::User
    };
    // Shaped once from the configured viewport; resizing the window later
    // does not renegotiate the stream.
    let request = StreamRequest::for_viewport(
        facing,
        config.camera.ideal_width,
        (config.display.width, config.display.height),
        config.display.handheld,
    );
    debug!("stream request: {:?}", request);

    let index = camera::resolve_index(args.cam_index, &request).context("Failed to pick a camera")?;
    let source = CameraSource::open(index, &request, granted).context("Failed to open camera stream")?;
    println!("Format: {}x{} ({})", source.width(), source.height(), source.name());

    Ok(SamplingSession::start(source, granted, config.sampling.interval(), Instant::now())
        .with_mirror(config.camera.mirror))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.list {
        let cameras = camera::list_devices()?;
        println!("Available Cameras:");
        println!("{:<5} | {:<30} | {:<10}", "Index", "Name", "Misc");
        println!("{}", "-".repeat(60));
        for cam in cameras {
            println!("{:<5} | {:<30} | {:?}", cam.index().to_string(), cam.human_name(), cam.misc());
        }
        return Ok(());
    }

    // 0. Config
    let mut config = AppConfig::load_from(&args.config)?;
    config.display.handheld |= args.handheld;
    config.camera.mirror |= args.mirror;

    // 1. Window, shown before the permission prompt so the user sees why
    // nothing is happening yet.
    let (view_w, view_h) = (config.display.width.max(1), config.display.height.max(1));
    let mut window = WindowOutput::new("Rusty Hue", view_w as usize, view_h as usize)?;
    let text = TextRenderer::load(&config.ui.font_family, config.ui.font_size_pt, config.ui.text_scale);
    let mut app = App::new(config.sampling.copy_feedback());
    let mut display = vec![0u8; view_w as usize * view_h as usize * 3];

    let checking = presenter::present(&app, Instant::now(), (view_w, view_h), &config.ui, |s| text.measure(s));
    draw::render(&mut Canvas::new(&mut display, view_w as usize, view_h as usize), &checking, &text);
    window.update(&display, view_w as usize, view_h as usize)?;

    // 2. Permission, then the stream
    let mut permissions = PermissionManager::new(NokhwaAuthorization::new(config.camera.permission_timeout()));
    let state = permissions.resolve();
    app.handle(AppEvent::PermissionResolved(state))?;

    let mut session = match permissions.granted() {
        Some(granted) => match open_session(&args, &config, granted) {
            Ok(session) => Some(session),
            Err(e) => {
                println!("{}", format!("{:#}", e).red());
                app.handle(AppEvent::StreamFailed(format!("{:#}", e)))?;
                None
            }
        },
        None => {
            println!("{}", presenter::DENIED_TEXT.red());
            None
        }
    };

    let mut clipboard = clipboard::system_or_null();
    println!("Controls: [Click] or [C] Copy color  [Esc] Quit");

    // 3. Loop
    while window.is_open() && !window.is_key_down(Key::Escape) {
        let now = Instant::now();

        if let Some(s) = session.as_mut() {
            match s.advance(now) {
                Ok(Some(color)) => app.handle(AppEvent::Sampled(color))?,
                Ok(None) => {}
                Err(e) => debug!("frame skipped: {}", e),
            }
        }

        let live_frame = session
            .as_ref()
            .map(|s| s.frame())
            .filter(|f| f.width() > 0 && f.height() > 0);
        display.clear();
        let (w, h) = match live_frame {
            Some(frame) => {
                display.extend_from_slice(frame.as_raw());
                frame.dimensions()
            }
            None => {
                display.resize(view_w as usize * view_h as usize * 3, 0);
                (view_w, view_h)
            }
        };

        let view = presenter::present(&app, now, (w, h), &config.ui, |s| text.measure(s));

        // --- INPUT ---
        let pill_bounds = match &view {
            View::Live(live) => live.pill.as_ref().map(|p| p.bounds),
            View::Status { .. } => None,
        };
        let clicked = window
            .take_click(w as usize, h as usize)
            .zip(pill_bounds)
            .map_or(false, |((x, y), bounds)| bounds.contains(x, y));
        let key_copy = window.keys_pressed().contains(&Key::C);
        if clicked || key_copy {
            app.request_copy(clipboard.as_mut(), now);
        }

        // --- DRAWING ---
        draw::render(&mut Canvas::new(&mut display, w as usize, h as usize), &view, &text);
        window.update(&display, w as usize, h as usize)?;
    }

    drop(session);
    info!("Camera released.");
    Ok(())
}
