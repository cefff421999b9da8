// Renderer - one loop iteration over the five frame components
//
// ARCHITECTURE OVERVIEW:
// ┌─────────────────────────────────────────────────────────────────┐
// │  FrameScheduler (slot ring, acquire/submit/present)             │
// │    ├── SwapchainManager (images, views, negotiation)            │
// │    ├── RenderGraphResources (target, pass, framebuffers)        │
// │    ├── CommandRecorder (pool, one buffer per image)             │
// │    └── SurfaceWatcher (staleness -> one recreation request)     │
// └─────────────────────────────────────────────────────────────────┘
//
// Staleness is handled here and never surfaces as an error. Anything that
// does come back as Err is fatal for the loop.

use anyhow::{Context, Result};
use ash::vk;
use std::sync::Arc;

use super::recorder::CommandRecorder;
use super::render_graph::RenderGraphResources;
use super::scene::ScenePipeline;
use super::scheduler::{FrameScheduler, FrameStart, PresentOutcome, RecordSync};
use super::swapchain::{SwapchainManager, SwapchainPreferences};
use super::watcher::{RecreateReason, SurfaceWatcher};
use crate::backend::gpu::Gpu;
use crate::backend::shader::ShaderPair;
use crate::config::Config;
use crate::error::RenderError;
use crate::settings::RenderSettings;
use crate::ui::UiOverlay;

/// The window-system operations the loop needs
pub trait WindowSystem {
    /// Current framebuffer size in pixels; zero while minimized.
    fn framebuffer_size(&self) -> vk::Extent2D;
    /// Block until at least one window event has been handled.
    fn wait_events(&mut self);
    fn close_requested(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Presented,
    Recreated,
    /// The surface reported a zero extent; recreation retried next frame.
    Deferred,
    /// Acquire or present failed for a reason other than staleness.
    Skipped,
    /// The window closed during the zero-size stall.
    Closed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub presents: u64,
    pub recreations: u64,
    pub skipped: u64,
}

/// Startup choices for the renderer
#[derive(Debug, Clone)]
pub struct RendererOptions {
    pub frames_in_flight: usize,
    pub clear_color: [f32; 4],
    pub swapchain: SwapchainPreferences,
    pub record_sync: RecordSync,
    pub settings: RenderSettings,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            frames_in_flight: 3,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            swapchain: SwapchainPreferences::default(),
            record_sync: RecordSync::DeviceIdle,
            settings: RenderSettings::default(),
        }
    }
}

impl RendererOptions {
    pub fn from_config(config: &Config) -> Result<Self, RenderError> {
        Ok(Self {
            frames_in_flight: config.frames_in_flight()?,
            clear_color: config.graphics.clear_color,
            swapchain: SwapchainPreferences {
                present_mode: config.present_mode(),
                undefined_extent: config.undefined_extent(),
            },
            record_sync: config.record_sync(),
            settings: config.render_settings(),
        })
    }
}

pub struct Renderer<G: Gpu, U: UiOverlay<G>> {
    gpu: Arc<G>,
    ui: U,
    settings: RenderSettings,
    swapchain: SwapchainManager,
    graph: RenderGraphResources,
    scene: ScenePipeline,
    recorder: CommandRecorder,
    scheduler: FrameScheduler,
    watcher: SurfaceWatcher,
    stats: FrameStats,
}

impl<G: Gpu, U: UiOverlay<G>> Renderer<G, U> {
    /// Build every component in dependency order:
    /// swapchain -> render target -> pass -> framebuffers -> commands -> slots.
    pub fn setup(
        gpu: Arc<G>,
        mut ui: U,
        options: RendererOptions,
        shaders: &ShaderPair,
        window_extent: vk::Extent2D,
    ) -> Result<Self> {
        log::info!("Setting up renderer...");
        let device = &*gpu;

        let support = device.surface_support().context("Failed to query surface support")?;
        let swapchain = SwapchainManager::create(device, &support, options.swapchain, window_extent)
            .context("Failed to create swapchain")?;

        let settings = options.settings;
        let samples = settings.samples(device.supported_sample_counts());
        let graph = RenderGraphResources::create(device, &swapchain, samples)?;
        let scene = ScenePipeline::new(device, shaders, graph.render_pass(), samples)?;
        ui.rebuild(device, &graph.pass_info()).context("Failed to build overlay")?;

        let image_count = swapchain.image_count();
        let recorder = CommandRecorder::new(device, image_count, options.clear_color)?;
        let scheduler = FrameScheduler::new(device, options.frames_in_flight, options.record_sync, image_count)?;
        let watcher = SurfaceWatcher::new(swapchain.extent());

        log::info!("Renderer ready");

        Ok(Self {
            gpu,
            ui,
            settings,
            swapchain,
            graph,
            scene,
            recorder,
            scheduler,
            watcher,
            stats: FrameStats::default(),
        })
    }

    /// One loop iteration. `delta` and `total` are in seconds.
    pub fn run_frame<W: WindowSystem>(&mut self, window: &mut W, delta: f32, total: f32) -> Result<FrameOutcome> {
        let gpu = Arc::clone(&self.gpu);
        let gpu = &*gpu;

        self.ui.prepare_frame(delta, total, &mut self.settings);
        if self.settings.take_changed() {
            self.watcher.request_external(RecreateReason::SettingsChanged);
        }

        let image_index = match self.scheduler.begin_frame(gpu, &self.swapchain, &mut self.watcher)? {
            FrameStart::Ready(index) => index,
            FrameStart::Stale(reason) => return self.recreate(window, reason),
            FrameStart::Failed(code) => {
                log::error!("Failed to acquire swapchain image: {:?}", code);
                self.stats.skipped += 1;
                return Ok(FrameOutcome::Skipped);
            }
        };

        if image_index as usize >= self.swapchain.image_count() {
            return Err(RenderError::ImageIndexOutOfRange {
                index: image_index,
                count: self.swapchain.image_count(),
            }
            .into());
        }

        self.scheduler.claim_image(gpu, image_index)?;
        self.ui.upload_geometry(gpu, image_index)?;

        let cmd = self
            .recorder
            .record(gpu, image_index, &self.graph, self.scene.pipeline(), &mut self.ui)?;
        self.scheduler.submit(gpu, cmd)?;

        match self.scheduler.present(gpu, &self.swapchain, image_index, &mut self.watcher) {
            PresentOutcome::Presented => {
                self.stats.presents += 1;
                Ok(FrameOutcome::Presented)
            }
            PresentOutcome::Recreate(reason) => self.recreate(window, reason),
            PresentOutcome::Failed(code) => {
                log::error!("Failed to present image {}: {:?}", image_index, code);
                self.stats.skipped += 1;
                Ok(FrameOutcome::Skipped)
            }
        }
    }

    /// The recreation cascade. Never runs against a zero-sized window.
    fn recreate<W: WindowSystem>(&mut self, window: &mut W, reason: RecreateReason) -> Result<FrameOutcome> {
        log::info!("Recreating swapchain: {}", reason);

        let Some(window_extent) = wait_for_surface(window) else {
            log::info!("Window closed while minimized");
            return Ok(FrameOutcome::Closed);
        };

        let gpu = Arc::clone(&self.gpu);
        let gpu = &*gpu;

        let support = gpu.surface_support().context("Failed to query surface support")?;
        let current = support.capabilities.current_extent;
        if current.width == 0 || current.height == 0 {
            log::debug!("Surface still reports a zero extent, deferring recreation");
            // Sleep until the window system has something new to say
            window.wait_events();
            if window.close_requested() {
                return Ok(FrameOutcome::Closed);
            }
            self.watcher.request_external(reason);
            return Ok(FrameOutcome::Deferred);
        }

        gpu.wait_idle().context("Device idle wait before recreation failed")?;

        // Teardown: command buffers -> framebuffers -> pass -> target -> swapchain
        self.recorder.release(gpu);
        self.scene.release(gpu);
        self.graph.destroy(gpu);

        self.swapchain
            .rebuild(gpu, &support, window_extent)
            .context("Failed to recreate swapchain")?;

        let samples = self.settings.samples(gpu.supported_sample_counts());
        self.graph = RenderGraphResources::create(gpu, &self.swapchain, samples)?;
        self.scene.build(gpu, self.graph.render_pass(), samples)?;
        self.ui.rebuild(gpu, &self.graph.pass_info())?;

        let image_count = self.swapchain.image_count();
        self.recorder.repool(gpu, image_count)?;
        self.scheduler.reset_image_tracking(image_count);

        self.watcher.set_current_extent(self.swapchain.extent());
        self.watcher.clear();
        self.stats.recreations += 1;

        let extent = self.swapchain.extent();
        log::info!(
            "Recreated swapchain: {}x{}, {} images, {:?} samples",
            extent.width,
            extent.height,
            image_count,
            samples
        );
        Ok(FrameOutcome::Recreated)
    }

    /// Forward a window resize; ignored if it matches the current extent.
    pub fn notify_resize(&mut self, extent: vk::Extent2D) {
        self.watcher.notify_resize(extent);
    }

    /// Release everything after a final idle wait.
    pub fn shutdown(self) -> FrameStats {
        self.stats
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn ui_mut(&mut self) -> &mut U {
        &mut self.ui
    }

    pub fn current_slot(&self) -> usize {
        self.scheduler.current_slot()
    }

    pub fn extent(&self) -> vk::Extent2D {
        self.swapchain.extent()
    }

    pub fn image_count(&self) -> usize {
        self.swapchain.image_count()
    }

    pub fn framebuffer_count(&self) -> usize {
        self.graph.framebuffers().len()
    }

    pub fn command_buffer_count(&self) -> usize {
        self.recorder.buffers().len()
    }

    pub fn swapchain(&self) -> &SwapchainManager {
        &self.swapchain
    }
}

impl<G: Gpu, U: UiOverlay<G>> Drop for Renderer<G, U> {
    fn drop(&mut self) {
        log::info!("Cleaning up renderer resources...");

        let gpu = Arc::clone(&self.gpu);
        let gpu = &*gpu;

        // In-flight submissions always run to completion first
        if let Err(e) = gpu.wait_idle() {
            log::error!("Idle wait during shutdown failed: {:#}", e);
        }

        // Reverse order of creation
        self.scheduler.destroy(gpu);
        self.recorder.destroy(gpu);
        self.ui.destroy(gpu);
        self.scene.destroy(gpu);
        self.graph.destroy(gpu);
        self.swapchain.destroy(gpu);

        log::info!(
            "Cleanup complete ({} presents, {} recreations, {} skipped)",
            self.stats.presents,
            self.stats.recreations,
            self.stats.skipped
        );
    }
}

/// Block on window events until the framebuffer has a non-zero area.
/// Returns None if the window is closed first.
fn wait_for_surface<W: WindowSystem>(window: &mut W) -> Option<vk::Extent2D> {
    let mut size = window.framebuffer_size();
    if size.width == 0 || size.height == 0 {
        log::info!("Window minimized, waiting for a non-zero size");
    }

    while size.width == 0 || size.height == 0 {
        if window.close_requested() {
            return None;
        }
        window.wait_events();
        size = window.framebuffer_size();
    }
    Some(size)
}
