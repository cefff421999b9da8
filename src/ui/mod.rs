// UI overlay collaborator
//
// The frame loop treats the overlay as an opaque producer of draw calls. It
// is told about every new render pass and asked, per frame, to advance,
// upload its geometry and append its draws to the scene's command buffer.

pub mod egui_overlay;

use anyhow::Result;
use ash::vk;

use crate::backend::gpu::Gpu;
use crate::settings::RenderSettings;

pub use egui_overlay::EguiOverlay;

/// What the overlay needs to know about the pass it draws into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassInfo {
    pub render_pass: vk::RenderPass,
    pub samples: vk::SampleCountFlags,
    pub extent: vk::Extent2D,
    pub image_count: usize,
}

pub trait UiOverlay<G: Gpu> {
    /// Advance UI state. Widgets may write render settings.
    fn prepare_frame(&mut self, delta: f32, total: f32, settings: &mut RenderSettings);

    /// Push the current draw lists into buffers owned by `image_index`.
    fn upload_geometry(&mut self, gpu: &G, image_index: u32) -> Result<()>;

    /// Append bind/push-constant/draw calls inside the open render pass.
    fn record_draws(&mut self, gpu: &G, cmd: vk::CommandBuffer, image_index: u32);

    /// Called after every render pass (re)creation.
    fn rebuild(&mut self, gpu: &G, pass: &PassInfo) -> Result<()>;

    fn destroy(&mut self, gpu: &G);
}
