// GPU seam - the device operations the frame loop is written against
//
// VulkanDevice implements this with ash. The frame components only ever talk
// to `G: Gpu`, which keeps their sequencing testable without a GPU.
//
// Handles are plain ash handles; every method takes &self the same way
// ash::Device does.

use anyhow::Result;
use ash::prelude::VkResult;
use ash::vk;

/// Surface properties queried before every swapchain (re)creation
#[derive(Debug, Clone, Default)]
pub struct SurfaceSupport {
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilies {
    pub graphics: u32,
    pub present: u32,
}

impl QueueFamilies {
    pub fn shared(&self) -> bool {
        self.graphics == self.present
    }
}

/// Everything needed to build a swapchain once negotiation is done
#[derive(Debug, Clone, Copy)]
pub struct SwapchainDesc {
    pub min_image_count: u32,
    pub surface_format: vk::SurfaceFormatKHR,
    pub extent: vk::Extent2D,
    pub present_mode: vk::PresentModeKHR,
    pub pre_transform: vk::SurfaceTransformFlagsKHR,
    pub queue_families: QueueFamilies,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireStatus {
    Success,
    /// Usable this frame, recreate after present.
    Suboptimal,
    OutOfDate,
    Failed(vk::Result),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acquired {
    pub index: u32,
    pub status: AcquireStatus,
}

impl Acquired {
    pub fn from_result(result: VkResult<(u32, bool)>) -> Self {
        match result {
            Ok((index, false)) => Self { index, status: AcquireStatus::Success },
            Ok((index, true)) => Self { index, status: AcquireStatus::Suboptimal },
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Self { index: 0, status: AcquireStatus::OutOfDate },
            Err(e) => Self { index: 0, status: AcquireStatus::Failed(e) },
        }
    }

    pub fn is_usable(&self) -> bool {
        matches!(self.status, AcquireStatus::Success | AcquireStatus::Suboptimal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentStatus {
    Success,
    Suboptimal,
    OutOfDate,
    Failed(vk::Result),
}

impl PresentStatus {
    pub fn from_result(result: VkResult<bool>) -> Self {
        match result {
            Ok(false) => Self::Success,
            Ok(true) => Self::Suboptimal,
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Self::OutOfDate,
            Err(e) => Self::Failed(e),
        }
    }
}

/// One graphics-queue submission: a single command buffer between the
/// slot's acquire and render-finished semaphores
#[derive(Debug, Clone, Copy)]
pub struct SubmitDesc {
    pub command_buffer: vk::CommandBuffer,
    pub wait_semaphore: vk::Semaphore,
    pub wait_stage: vk::PipelineStageFlags,
    pub signal_semaphore: vk::Semaphore,
    pub fence: vk::Fence,
}

/// Attachments and the single external dependency of the one-subpass pass.
/// Attachment 0 is the color target; attachment 1, when present, its resolve.
#[derive(Debug, Clone)]
pub struct RenderPassDesc {
    pub attachments: Vec<vk::AttachmentDescription>,
    pub resolve: bool,
    pub dependency: vk::SubpassDependency,
}

#[derive(Debug, Clone, Copy)]
pub struct ScenePipelineDesc {
    pub vertex_shader: vk::ShaderModule,
    pub fragment_shader: vk::ShaderModule,
    pub render_pass: vk::RenderPass,
    pub samples: vk::SampleCountFlags,
}

pub trait Gpu {
    // ── synchronization ─────────────────────────────────────────────────────
    fn create_semaphore(&self) -> Result<vk::Semaphore>;
    fn create_fence(&self, signaled: bool) -> Result<vk::Fence>;
    fn destroy_semaphore(&self, semaphore: vk::Semaphore);
    fn destroy_fence(&self, fence: vk::Fence);
    /// Blocks without timeout.
    fn wait_for_fence(&self, fence: vk::Fence) -> Result<()>;
    fn reset_fence(&self, fence: vk::Fence) -> Result<()>;
    fn wait_idle(&self) -> Result<()>;
    fn submit(&self, submit: &SubmitDesc) -> Result<()>;

    // ── presentation ────────────────────────────────────────────────────────
    fn queue_families(&self) -> QueueFamilies;
    fn surface_support(&self) -> Result<SurfaceSupport>;
    fn create_swapchain(&self, desc: &SwapchainDesc) -> Result<vk::SwapchainKHR>;
    fn swapchain_images(&self, swapchain: vk::SwapchainKHR) -> Result<Vec<vk::Image>>;
    fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR);
    fn acquire_next_image(&self, swapchain: vk::SwapchainKHR, semaphore: vk::Semaphore) -> Acquired;
    fn present(&self, swapchain: vk::SwapchainKHR, image_index: u32, wait: vk::Semaphore) -> PresentStatus;
    fn create_image_view(&self, image: vk::Image, format: vk::Format) -> Result<vk::ImageView>;
    fn destroy_image_view(&self, view: vk::ImageView);

    // ── render targets and passes ───────────────────────────────────────────
    /// Highest color sample counts usable for framebuffers.
    fn supported_sample_counts(&self) -> vk::SampleCountFlags;
    /// Transient device-local color image plus its view.
    fn create_color_target(
        &self,
        extent: vk::Extent2D,
        format: vk::Format,
        samples: vk::SampleCountFlags,
    ) -> Result<(vk::Image, vk::ImageView)>;
    fn destroy_color_target(&self, image: vk::Image, view: vk::ImageView);
    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<vk::RenderPass>;
    fn destroy_render_pass(&self, render_pass: vk::RenderPass);
    fn create_framebuffer(
        &self,
        render_pass: vk::RenderPass,
        attachments: &[vk::ImageView],
        extent: vk::Extent2D,
    ) -> Result<vk::Framebuffer>;
    fn destroy_framebuffer(&self, framebuffer: vk::Framebuffer);

    // ── pipelines ───────────────────────────────────────────────────────────
    fn create_shader_module(&self, code: &[u32]) -> Result<vk::ShaderModule>;
    fn destroy_shader_module(&self, module: vk::ShaderModule);
    fn create_scene_pipeline(&self, desc: &ScenePipelineDesc) -> Result<(vk::Pipeline, vk::PipelineLayout)>;
    fn destroy_pipeline(&self, pipeline: vk::Pipeline, layout: vk::PipelineLayout);

    // ── commands ────────────────────────────────────────────────────────────
    fn create_command_pool(&self) -> Result<vk::CommandPool>;
    fn destroy_command_pool(&self, pool: vk::CommandPool);
    fn allocate_command_buffers(&self, pool: vk::CommandPool, count: u32) -> Result<Vec<vk::CommandBuffer>>;
    fn free_command_buffers(&self, pool: vk::CommandPool, buffers: &[vk::CommandBuffer]);
    fn begin_command_buffer(&self, cmd: vk::CommandBuffer, flags: vk::CommandBufferUsageFlags) -> Result<()>;
    fn end_command_buffer(&self, cmd: vk::CommandBuffer) -> Result<()>;
    fn cmd_begin_render_pass(
        &self,
        cmd: vk::CommandBuffer,
        render_pass: vk::RenderPass,
        framebuffer: vk::Framebuffer,
        extent: vk::Extent2D,
        clear_values: &[vk::ClearValue],
    );
    fn cmd_end_render_pass(&self, cmd: vk::CommandBuffer);
    fn cmd_set_viewport(&self, cmd: vk::CommandBuffer, viewport: vk::Viewport);
    fn cmd_set_scissor(&self, cmd: vk::CommandBuffer, scissor: vk::Rect2D);
    fn cmd_bind_pipeline(&self, cmd: vk::CommandBuffer, pipeline: vk::Pipeline);
    fn cmd_draw(&self, cmd: vk::CommandBuffer, vertex_count: u32);
}
