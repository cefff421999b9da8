// Scripted Gpu for loop-level tests
//
// Every call is appended to a log so tests can assert ordering. Handles are
// fake but unique, and every created object is tracked until destroyed.

use anyhow::Result;
use ash::vk::{self, Handle};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use super::renderer::WindowSystem;
use crate::backend::gpu::{
    Acquired, AcquireStatus, Gpu, PresentStatus, QueueFamilies, RenderPassDesc, ScenePipelineDesc,
    SubmitDesc, SurfaceSupport, SwapchainDesc,
};
use crate::settings::RenderSettings;
use crate::ui::{PassInfo, UiOverlay};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    WaitFence(vk::Fence),
    ResetFence(vk::Fence),
    WaitIdle,
    Submit {
        cmd: vk::CommandBuffer,
        fence: vk::Fence,
        wait: vk::Semaphore,
        signal: vk::Semaphore,
    },
    Acquire(vk::Semaphore),
    Present { index: u32, wait: vk::Semaphore },
    CreateSwapchain(vk::Extent2D),
    DestroySwapchain,
    CreateImageView,
    DestroyImageView,
    CreateColorTarget(vk::SampleCountFlags),
    DestroyColorTarget,
    CreateRenderPass { resolve: bool },
    DestroyRenderPass,
    CreateFramebuffer { attachments: usize },
    DestroyFramebuffer,
    CreatePipeline(vk::SampleCountFlags),
    DestroyPipeline,
    AllocateCommandBuffers(u32),
    FreeCommandBuffers(usize),
    BeginCommandBuffer(vk::CommandBuffer),
    EndCommandBuffer,
    BeginRenderPass {
        clear_color: [f32; 4],
        depth: f32,
        stencil: u32,
        clear_count: usize,
    },
    EndRenderPass,
    SetViewport { width: f32, height: f32 },
    SetScissor(vk::Extent2D),
    BindPipeline,
    Draw(u32),
    UiUpload(u32),
    UiRecord(u32),
    UiRebuild(usize),
    UiDestroy,
    WaitEvents,
}

struct MockState {
    calls: Vec<Call>,
    next_handle: u64,
    live: HashSet<u64>,
    /// Signaled state of every live fence
    fences: HashMap<u64, bool>,
    /// Fences that may still be created before creation starts failing
    fence_budget: Option<usize>,
    capabilities: vk::SurfaceCapabilitiesKHR,
    swapchain_images: u32,
    next_image: u32,
    acquire_script: VecDeque<AcquireStatus>,
    present_script: VecDeque<PresentStatus>,
}

pub struct MockGpu {
    state: RefCell<MockState>,
}

pub const HD: vk::Extent2D = vk::Extent2D { width: 1280, height: 720 };

impl MockGpu {
    /// A surface of `extent` whose swapchains always hold `image_count` images
    pub fn new(extent: vk::Extent2D, image_count: u32) -> Arc<Self> {
        Arc::new(Self {
            state: RefCell::new(MockState {
                calls: Vec::new(),
                next_handle: 0,
                live: HashSet::new(),
                fences: HashMap::new(),
                fence_budget: None,
                capabilities: capabilities(extent, image_count),
                swapchain_images: 0,
                next_image: 0,
                acquire_script: VecDeque::new(),
                present_script: VecDeque::new(),
            }),
        })
    }

    pub fn note(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }

    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut self.state.borrow_mut().calls)
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn script_acquire(&self, status: AcquireStatus) {
        self.state.borrow_mut().acquire_script.push_back(status);
    }

    pub fn script_present(&self, status: PresentStatus) {
        self.state.borrow_mut().present_script.push_back(status);
    }

    pub fn set_surface_extent(&self, extent: vk::Extent2D) {
        self.state.borrow_mut().capabilities.current_extent = extent;
    }

    pub fn set_image_count(&self, image_count: u32) {
        let mut state = self.state.borrow_mut();
        let extent = state.capabilities.current_extent;
        state.capabilities = capabilities(extent, image_count);
    }

    /// Let `count` more fences be created, then fail every creation
    pub fn fail_fences_after(&self, count: usize) {
        self.state.borrow_mut().fence_budget = Some(count);
    }

    pub fn fence_signaled(&self, fence: vk::Fence) -> bool {
        self.state.borrow().fences.get(&fence.as_raw()).copied().unwrap_or(false)
    }

    pub fn live_objects(&self) -> usize {
        self.state.borrow().live.len()
    }

    fn create<H: Handle>(&self) -> H {
        let mut state = self.state.borrow_mut();
        state.next_handle += 1;
        let raw = state.next_handle;
        state.live.insert(raw);
        H::from_raw(raw)
    }

    /// Unique handle that is owned by something else and never destroyed
    fn borrowed<H: Handle>(&self) -> H {
        let mut state = self.state.borrow_mut();
        state.next_handle += 1;
        H::from_raw(state.next_handle)
    }

    fn release<H: Handle>(&self, handle: H) {
        let raw = handle.as_raw();
        let removed = self.state.borrow_mut().live.remove(&raw);
        assert!(removed, "destroyed unknown or already destroyed handle {raw:#x}");
    }
}

fn capabilities(extent: vk::Extent2D, image_count: u32) -> vk::SurfaceCapabilitiesKHR {
    vk::SurfaceCapabilitiesKHR {
        min_image_count: image_count.saturating_sub(1),
        max_image_count: image_count,
        current_extent: extent,
        min_image_extent: vk::Extent2D { width: 1, height: 1 },
        max_image_extent: vk::Extent2D { width: 16384, height: 16384 },
        max_image_array_layers: 1,
        current_transform: vk::SurfaceTransformFlagsKHR::IDENTITY,
        ..Default::default()
    }
}

impl Gpu for MockGpu {
    fn create_semaphore(&self) -> Result<vk::Semaphore> {
        Ok(self.create())
    }

    fn create_fence(&self, signaled: bool) -> Result<vk::Fence> {
        if let Some(budget) = self.state.borrow_mut().fence_budget.as_mut() {
            if *budget == 0 {
                anyhow::bail!("out of device memory");
            }
            *budget -= 1;
        }
        let fence: vk::Fence = self.create();
        self.state.borrow_mut().fences.insert(fence.as_raw(), signaled);
        Ok(fence)
    }

    fn destroy_semaphore(&self, semaphore: vk::Semaphore) {
        self.release(semaphore);
    }

    fn destroy_fence(&self, fence: vk::Fence) {
        self.state.borrow_mut().fences.remove(&fence.as_raw());
        self.release(fence);
    }

    /// A fence nothing will signal would block forever
    fn wait_for_fence(&self, fence: vk::Fence) -> Result<()> {
        self.note(Call::WaitFence(fence));
        if !self.fence_signaled(fence) {
            anyhow::bail!("waited on unsignaled fence {:#x}", fence.as_raw());
        }
        Ok(())
    }

    fn reset_fence(&self, fence: vk::Fence) -> Result<()> {
        self.note(Call::ResetFence(fence));
        self.state.borrow_mut().fences.insert(fence.as_raw(), false);
        Ok(())
    }

    fn wait_idle(&self) -> Result<()> {
        self.note(Call::WaitIdle);
        Ok(())
    }

    fn submit(&self, submit: &SubmitDesc) -> Result<()> {
        self.note(Call::Submit {
            cmd: submit.command_buffer,
            fence: submit.fence,
            wait: submit.wait_semaphore,
            signal: submit.signal_semaphore,
        });
        if self.fence_signaled(submit.fence) {
            anyhow::bail!("submitted with signaled fence {:#x}", submit.fence.as_raw());
        }
        // Work completes as soon as it is queued
        self.state.borrow_mut().fences.insert(submit.fence.as_raw(), true);
        Ok(())
    }

    fn queue_families(&self) -> QueueFamilies {
        QueueFamilies { graphics: 0, present: 0 }
    }

    fn surface_support(&self) -> Result<SurfaceSupport> {
        Ok(SurfaceSupport {
            capabilities: self.state.borrow().capabilities,
            formats: vec![vk::SurfaceFormatKHR {
                format: vk::Format::B8G8R8A8_UNORM,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            }],
            present_modes: vec![
                vk::PresentModeKHR::FIFO,
                vk::PresentModeKHR::MAILBOX,
                vk::PresentModeKHR::IMMEDIATE,
            ],
        })
    }

    fn create_swapchain(&self, desc: &SwapchainDesc) -> Result<vk::SwapchainKHR> {
        self.note(Call::CreateSwapchain(desc.extent));
        let mut state = self.state.borrow_mut();
        state.swapchain_images = desc.min_image_count;
        state.next_image = 0;
        drop(state);
        Ok(self.create())
    }

    fn swapchain_images(&self, _swapchain: vk::SwapchainKHR) -> Result<Vec<vk::Image>> {
        let count = self.state.borrow().swapchain_images;
        Ok((0..count).map(|_| self.borrowed()).collect())
    }

    fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR) {
        self.note(Call::DestroySwapchain);
        self.release(swapchain);
    }

    fn acquire_next_image(&self, _swapchain: vk::SwapchainKHR, semaphore: vk::Semaphore) -> Acquired {
        self.note(Call::Acquire(semaphore));
        let mut state = self.state.borrow_mut();
        let status = state.acquire_script.pop_front().unwrap_or(AcquireStatus::Success);
        match status {
            AcquireStatus::Success | AcquireStatus::Suboptimal => {
                let index = state.next_image % state.swapchain_images.max(1);
                state.next_image += 1;
                Acquired { index, status }
            }
            _ => Acquired { index: 0, status },
        }
    }

    fn present(&self, _swapchain: vk::SwapchainKHR, image_index: u32, wait: vk::Semaphore) -> PresentStatus {
        self.note(Call::Present {
            index: image_index,
            wait,
        });
        self.state
            .borrow_mut()
            .present_script
            .pop_front()
            .unwrap_or(PresentStatus::Success)
    }

    fn create_image_view(&self, _image: vk::Image, _format: vk::Format) -> Result<vk::ImageView> {
        self.note(Call::CreateImageView);
        Ok(self.create())
    }

    fn destroy_image_view(&self, view: vk::ImageView) {
        self.note(Call::DestroyImageView);
        self.release(view);
    }

    fn supported_sample_counts(&self) -> vk::SampleCountFlags {
        vk::SampleCountFlags::TYPE_1
            | vk::SampleCountFlags::TYPE_2
            | vk::SampleCountFlags::TYPE_4
            | vk::SampleCountFlags::TYPE_8
    }

    fn create_color_target(
        &self,
        _extent: vk::Extent2D,
        _format: vk::Format,
        samples: vk::SampleCountFlags,
    ) -> Result<(vk::Image, vk::ImageView)> {
        self.note(Call::CreateColorTarget(samples));
        Ok((self.create(), self.create()))
    }

    fn destroy_color_target(&self, image: vk::Image, view: vk::ImageView) {
        self.note(Call::DestroyColorTarget);
        self.release(view);
        self.release(image);
    }

    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<vk::RenderPass> {
        self.note(Call::CreateRenderPass { resolve: desc.resolve });
        Ok(self.create())
    }

    fn destroy_render_pass(&self, render_pass: vk::RenderPass) {
        self.note(Call::DestroyRenderPass);
        self.release(render_pass);
    }

    fn create_framebuffer(
        &self,
        _render_pass: vk::RenderPass,
        attachments: &[vk::ImageView],
        _extent: vk::Extent2D,
    ) -> Result<vk::Framebuffer> {
        self.note(Call::CreateFramebuffer {
            attachments: attachments.len(),
        });
        Ok(self.create())
    }

    fn destroy_framebuffer(&self, framebuffer: vk::Framebuffer) {
        self.note(Call::DestroyFramebuffer);
        self.release(framebuffer);
    }

    fn create_shader_module(&self, _code: &[u32]) -> Result<vk::ShaderModule> {
        Ok(self.create())
    }

    fn destroy_shader_module(&self, module: vk::ShaderModule) {
        self.release(module);
    }

    fn create_scene_pipeline(&self, desc: &ScenePipelineDesc) -> Result<(vk::Pipeline, vk::PipelineLayout)> {
        self.note(Call::CreatePipeline(desc.samples));
        Ok((self.create(), self.create()))
    }

    fn destroy_pipeline(&self, pipeline: vk::Pipeline, layout: vk::PipelineLayout) {
        self.note(Call::DestroyPipeline);
        self.release(pipeline);
        self.release(layout);
    }

    fn create_command_pool(&self) -> Result<vk::CommandPool> {
        Ok(self.create())
    }

    fn destroy_command_pool(&self, pool: vk::CommandPool) {
        self.release(pool);
    }

    fn allocate_command_buffers(&self, _pool: vk::CommandPool, count: u32) -> Result<Vec<vk::CommandBuffer>> {
        self.note(Call::AllocateCommandBuffers(count));
        Ok((0..count).map(|_| self.borrowed()).collect())
    }

    fn free_command_buffers(&self, _pool: vk::CommandPool, buffers: &[vk::CommandBuffer]) {
        self.note(Call::FreeCommandBuffers(buffers.len()));
    }

    fn begin_command_buffer(&self, cmd: vk::CommandBuffer, _flags: vk::CommandBufferUsageFlags) -> Result<()> {
        self.note(Call::BeginCommandBuffer(cmd));
        Ok(())
    }

    fn end_command_buffer(&self, _cmd: vk::CommandBuffer) -> Result<()> {
        self.note(Call::EndCommandBuffer);
        Ok(())
    }

    fn cmd_begin_render_pass(
        &self,
        _cmd: vk::CommandBuffer,
        _render_pass: vk::RenderPass,
        _framebuffer: vk::Framebuffer,
        _extent: vk::Extent2D,
        clear_values: &[vk::ClearValue],
    ) {
        let clear_color = unsafe { clear_values[0].color.float32 };
        let depth_stencil = unsafe { clear_values[1].depth_stencil };
        self.note(Call::BeginRenderPass {
            clear_color,
            depth: depth_stencil.depth,
            stencil: depth_stencil.stencil,
            clear_count: clear_values.len(),
        });
    }

    fn cmd_end_render_pass(&self, _cmd: vk::CommandBuffer) {
        self.note(Call::EndRenderPass);
    }

    fn cmd_set_viewport(&self, _cmd: vk::CommandBuffer, viewport: vk::Viewport) {
        self.note(Call::SetViewport {
            width: viewport.width,
            height: viewport.height,
        });
    }

    fn cmd_set_scissor(&self, _cmd: vk::CommandBuffer, scissor: vk::Rect2D) {
        self.note(Call::SetScissor(scissor.extent));
    }

    fn cmd_bind_pipeline(&self, _cmd: vk::CommandBuffer, _pipeline: vk::Pipeline) {
        self.note(Call::BindPipeline);
    }

    fn cmd_draw(&self, _cmd: vk::CommandBuffer, vertex_count: u32) {
        self.note(Call::Draw(vertex_count));
    }
}

/// Overlay that only leaves a trace in the call log
#[derive(Default)]
pub struct RecordingOverlay {
    pub frames_prepared: usize,
    pub last_pass: Option<PassInfo>,
    /// Applied to the settings on the next prepare_frame, like a UI toggle.
    pub toggle_msaa: Option<bool>,
}

impl UiOverlay<MockGpu> for RecordingOverlay {
    fn prepare_frame(&mut self, _delta: f32, _total: f32, settings: &mut RenderSettings) {
        self.frames_prepared += 1;
        if let Some(enabled) = self.toggle_msaa.take() {
            settings.set_msaa(enabled);
        }
    }

    fn upload_geometry(&mut self, gpu: &MockGpu, image_index: u32) -> Result<()> {
        gpu.note(Call::UiUpload(image_index));
        Ok(())
    }

    fn record_draws(&mut self, gpu: &MockGpu, _cmd: vk::CommandBuffer, image_index: u32) {
        gpu.note(Call::UiRecord(image_index));
    }

    fn rebuild(&mut self, gpu: &MockGpu, pass: &PassInfo) -> Result<()> {
        gpu.note(Call::UiRebuild(pass.image_count));
        self.last_pass = Some(*pass);
        Ok(())
    }

    fn destroy(&mut self, gpu: &MockGpu) {
        gpu.note(Call::UiDestroy);
    }
}

/// Window whose size changes only when events are waited for
pub struct MockWindow {
    gpu: Arc<MockGpu>,
    size: vk::Extent2D,
    pending_sizes: VecDeque<vk::Extent2D>,
    close_after_waits: Option<usize>,
    waits: usize,
    closed: bool,
}

impl MockWindow {
    pub fn new(gpu: &Arc<MockGpu>, size: vk::Extent2D) -> Self {
        Self {
            gpu: Arc::clone(gpu),
            size,
            pending_sizes: VecDeque::new(),
            close_after_waits: None,
            waits: 0,
            closed: false,
        }
    }

    pub fn set_size(&mut self, size: vk::Extent2D) {
        self.size = size;
    }

    /// Each wait_events delivers the next size in order
    pub fn queue_size(&mut self, size: vk::Extent2D) {
        self.pending_sizes.push_back(size);
    }

    pub fn close_after_waits(&mut self, waits: usize) {
        self.close_after_waits = Some(waits);
    }

    pub fn waits(&self) -> usize {
        self.waits
    }
}

impl WindowSystem for MockWindow {
    fn framebuffer_size(&self) -> vk::Extent2D {
        self.size
    }

    fn wait_events(&mut self) {
        self.gpu.note(Call::WaitEvents);
        self.waits += 1;
        if let Some(size) = self.pending_sizes.pop_front() {
            self.size = size;
        }
        if self.close_after_waits == Some(self.waits) {
            self.closed = true;
        }
    }

    fn close_requested(&self) -> bool {
        self.closed
    }
}
