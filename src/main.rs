// =============================================================================
// FRAME LOOP RENDERER
// =============================================================================
//
// ARCHITECTURE OVERVIEW:
// ┌─────────────────────────────────────────────────────────────────┐
// │  WindowPump (winit, pumped by this loop)                        │
// │    └── Renderer                                                 │
// │          ├── SwapchainManager + SurfaceWatcher                  │
// │          ├── RenderGraphResources (target, pass, framebuffers)  │
// │          ├── CommandRecorder (one buffer per image)             │
// │          └── FrameScheduler (N slots: fence + 2 semaphores)     │
// └─────────────────────────────────────────────────────────────────┘
//
// FRAME FLOW:
// 1. Pump window events, route keys/resizes/UI input
// 2. Wait on the current slot's fence, acquire an image
// 3. Record scene + overlay into that image's command buffer
// 4. Submit, present, advance the slot ring
// 5. Stale surface at any step -> recreation cascade
//
// =============================================================================

use anyhow::{Context, Result};
use frameloop::backend::shader::ShaderPair;
use frameloop::backend::VulkanDevice;
use frameloop::config::Config;
use frameloop::frame::{FrameOutcome, Renderer, RendererOptions, WindowSystem};
use frameloop::input::WindowPump;
use frameloop::ui::EguiOverlay;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;
use winit::keyboard::KeyCode;
use winit::window::Window;

fn main() -> Result<()> {
    let config = Config::load();

    init_logging(&config)?;
    log::info!("Starting frame loop renderer");
    log::info!(
        "Window: {}x{} ({})",
        config.window.width,
        config.window.height,
        if config.window.fullscreen { "fullscreen" } else { "windowed" }
    );
    log::info!("Present mode preference: {}", config.graphics.present_mode);

    let mut pump = WindowPump::new(config.window.clone())?;
    let window = pump.window()?;
    let device = VulkanDevice::new(&config.window.title, config.debug.validation_layers, &window)?;

    let scene_shaders = ShaderPair::load(
        &config.shader_path("triangle.vert.spv"),
        &config.shader_path("triangle.frag.spv"),
    )
    .context("Failed to load scene shaders")?;
    let overlay_shaders = ShaderPair::load(
        &config.shader_path("overlay.vert.spv"),
        &config.shader_path("overlay.frag.spv"),
    )
    .context("Failed to load overlay shaders")?;

    let overlay = EguiOverlay::new(&device, Arc::clone(&window), &overlay_shaders)?;
    let options = RendererOptions::from_config(&config)?;
    let initial_extent = pump.framebuffer_size();
    let mut renderer = Renderer::setup(Arc::clone(&device), overlay, options, &scene_shaders, initial_extent)?;

    let start = Instant::now();
    let mut last_frame = start;
    let mut fps = FpsCounter::new(config.debug.show_fps, start);

    loop {
        pump.poll();

        let router = pump.router_mut();
        if router.close_requested() {
            break;
        }
        if router.keys().is_hit(KeyCode::Escape) {
            log::info!("ESC pressed, exiting...");
            break;
        }
        if router.keys().is_hit(KeyCode::F11) {
            router.toggle_fullscreen();
        }
        if let Some(extent) = router.take_resize() {
            renderer.notify_resize(extent);
        }
        for event in router.take_ui_events() {
            renderer.ui_mut().handle_event(&event);
        }

        let now = Instant::now();
        let delta = now.duration_since(last_frame).as_secs_f32();
        let total = now.duration_since(start).as_secs_f32();
        last_frame = now;

        match renderer.run_frame(&mut pump, delta, total) {
            Ok(FrameOutcome::Closed) => break,
            Ok(FrameOutcome::Presented) => {
                fps.frame(&window, &config.window.title, pump.router().is_fullscreen(), delta, total)
            }
            Ok(_) => {}
            Err(e) => {
                log::error!("Render error: {:?}", e);
                break;
            }
        }

        pump.router_mut().keys_mut().end_frame();
    }

    log::info!("Shutting down...");
    let stats = renderer.shutdown();
    log::info!(
        "Presented {} frames, {} recreations, {} skipped",
        stats.presents,
        stats.recreations,
        stats.skipped
    );
    Ok(())
}

/// Initialize logging with an optional copy of every record in a file
fn init_logging(config: &Config) -> Result<()> {
    use env_logger::{Builder, Env, Target};

    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));

    if config.debug.log_to_file {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&config.debug.log_file)
            .with_context(|| format!("Failed to open log file {}", config.debug.log_file))?;
        writeln!(file, "=== Frame Loop Log ===")?;
        writeln!(file, "Started: {:?}", std::time::SystemTime::now())?;
        writeln!(file)?;
        builder.target(Target::Pipe(Box::new(Tee { file })));
    }

    builder.init();
    Ok(())
}

/// Writes to stderr and the log file
struct Tee {
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        std::io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        std::io::stderr().flush()?;
        self.file.flush()
    }
}

/// Window title FPS readout, refreshed once per second
struct FpsCounter {
    enabled: bool,
    frames: u32,
    last_update: Instant,
}

impl FpsCounter {
    fn new(enabled: bool, now: Instant) -> Self {
        Self {
            enabled,
            frames: 0,
            last_update: now,
        }
    }

    fn frame(&mut self, window: &Window, title: &str, fullscreen: bool, delta: f32, total: f32) {
        if !self.enabled {
            return;
        }

        self.frames += 1;
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f32();
        if elapsed < 1.0 {
            return;
        }

        let fps = self.frames as f32 / elapsed;
        let mode = if fullscreen { "fullscreen" } else { "windowed" };
        window.set_title(&format!(
            "{} - {:.0} FPS ({:.2}ms) {:.0}s [{}]",
            title,
            fps,
            delta * 1000.0,
            total,
            mode
        ));

        self.frames = 0;
        self.last_update = now;
    }
}
