// Gpu implementation on top of ash
//
// Thin forwarding layer: each method is one (or a handful of) Vulkan calls
// against the handles owned by VulkanDevice.

use anyhow::{Context, Result};
use ash::vk;

use super::buffer::{self, GpuImage, ImageDesc};
use super::gpu::{
    Acquired, Gpu, PresentStatus, QueueFamilies, RenderPassDesc, ScenePipelineDesc, SubmitDesc,
    SurfaceSupport, SwapchainDesc,
};
use super::pipeline;
use super::VulkanDevice;

impl Gpu for VulkanDevice {
    fn create_semaphore(&self) -> Result<vk::Semaphore> {
        let info = vk::SemaphoreCreateInfo::default();
        unsafe { self.device.create_semaphore(&info, None) }.context("Failed to create semaphore")
    }

    fn create_fence(&self, signaled: bool) -> Result<vk::Fence> {
        let flags = if signaled {
            vk::FenceCreateFlags::SIGNALED
        } else {
            vk::FenceCreateFlags::empty()
        };
        let info = vk::FenceCreateInfo::default().flags(flags);
        unsafe { self.device.create_fence(&info, None) }.context("Failed to create fence")
    }

    fn destroy_semaphore(&self, semaphore: vk::Semaphore) {
        unsafe { self.device.destroy_semaphore(semaphore, None) }
    }

    fn destroy_fence(&self, fence: vk::Fence) {
        unsafe { self.device.destroy_fence(fence, None) }
    }

    fn wait_for_fence(&self, fence: vk::Fence) -> Result<()> {
        unsafe { self.device.wait_for_fences(&[fence], true, u64::MAX) }
            .context("Waiting on in-flight fence failed")
    }

    fn reset_fence(&self, fence: vk::Fence) -> Result<()> {
        unsafe { self.device.reset_fences(&[fence]) }.context("Failed to reset fence")
    }

    fn wait_idle(&self) -> Result<()> {
        VulkanDevice::wait_idle(self)
    }

    fn submit(&self, submit: &SubmitDesc) -> Result<()> {
        let wait_semaphores = [submit.wait_semaphore];
        let wait_stages = [submit.wait_stage];
        let command_buffers = [submit.command_buffer];
        let signal_semaphores = [submit.signal_semaphore];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        unsafe {
            self.device
                .queue_submit(self.graphics_queue, &[submit_info], submit.fence)
                .context("Failed to submit draw commands")
        }
    }

    fn queue_families(&self) -> QueueFamilies {
        self.queue_families
    }

    fn surface_support(&self) -> Result<SurfaceSupport> {
        unsafe {
            let capabilities = self
                .surface_loader
                .get_physical_device_surface_capabilities(self.physical_device, self.surface)
                .context("Failed to query surface capabilities")?;
            let formats = self
                .surface_loader
                .get_physical_device_surface_formats(self.physical_device, self.surface)
                .context("Failed to query surface formats")?;
            let present_modes = self
                .surface_loader
                .get_physical_device_surface_present_modes(self.physical_device, self.surface)
                .context("Failed to query present modes")?;

            Ok(SurfaceSupport {
                capabilities,
                formats,
                present_modes,
            })
        }
    }

    fn create_swapchain(&self, desc: &SwapchainDesc) -> Result<vk::SwapchainKHR> {
        let families = [desc.queue_families.graphics, desc.queue_families.present];

        let mut create_info = vk::SwapchainCreateInfoKHR::default()
            .surface(self.surface)
            .min_image_count(desc.min_image_count)
            .image_format(desc.surface_format.format)
            .image_color_space(desc.surface_format.color_space)
            .image_extent(desc.extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .pre_transform(desc.pre_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(desc.present_mode)
            .clipped(true);

        create_info = if desc.queue_families.shared() {
            create_info.image_sharing_mode(vk::SharingMode::EXCLUSIVE)
        } else {
            create_info
                .image_sharing_mode(vk::SharingMode::CONCURRENT)
                .queue_family_indices(&families)
        };

        unsafe { self.swapchain_loader.create_swapchain(&create_info, None) }
            .context("Failed to create swapchain")
    }

    fn swapchain_images(&self, swapchain: vk::SwapchainKHR) -> Result<Vec<vk::Image>> {
        unsafe { self.swapchain_loader.get_swapchain_images(swapchain) }
            .context("Failed to get swapchain images")
    }

    fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR) {
        unsafe { self.swapchain_loader.destroy_swapchain(swapchain, None) }
    }

    fn acquire_next_image(&self, swapchain: vk::SwapchainKHR, semaphore: vk::Semaphore) -> Acquired {
        Acquired::from_result(unsafe {
            self.swapchain_loader
                .acquire_next_image(swapchain, u64::MAX, semaphore, vk::Fence::null())
        })
    }

    fn present(&self, swapchain: vk::SwapchainKHR, image_index: u32, wait: vk::Semaphore) -> PresentStatus {
        let wait_semaphores = [wait];
        let swapchains = [swapchain];
        let image_indices = [image_index];

        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        PresentStatus::from_result(unsafe {
            self.swapchain_loader.queue_present(self.present_queue, &present_info)
        })
    }

    fn create_image_view(&self, image: vk::Image, format: vk::Format) -> Result<vk::ImageView> {
        buffer::create_color_view(&self.device, image, format)
    }

    fn destroy_image_view(&self, view: vk::ImageView) {
        unsafe { self.device.destroy_image_view(view, None) }
    }

    fn supported_sample_counts(&self) -> vk::SampleCountFlags {
        self.properties.limits.framebuffer_color_sample_counts
    }

    fn create_color_target(
        &self,
        extent: vk::Extent2D,
        format: vk::Format,
        samples: vk::SampleCountFlags,
    ) -> Result<(vk::Image, vk::ImageView)> {
        let target = GpuImage::new(
            self,
            &ImageDesc {
                name: "multisample color target",
                extent,
                format,
                samples,
                usage: vk::ImageUsageFlags::TRANSIENT_ATTACHMENT | vk::ImageUsageFlags::COLOR_ATTACHMENT,
            },
        )?;

        let handles = (target.image, target.view);
        self.color_targets.lock().insert(target.image, target.allocation);
        Ok(handles)
    }

    fn destroy_color_target(&self, image: vk::Image, view: vk::ImageView) {
        unsafe {
            self.device.destroy_image_view(view, None);
            self.device.destroy_image(image, None);
        }
        if let Some(allocation) = self.color_targets.lock().remove(&image) {
            if let Err(e) = self.allocator().lock().free(allocation) {
                log::error!("Failed to free color target memory: {}", e);
            }
        }
    }

    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<vk::RenderPass> {
        pipeline::create_render_pass(&self.device, desc)
    }

    fn destroy_render_pass(&self, render_pass: vk::RenderPass) {
        unsafe { self.device.destroy_render_pass(render_pass, None) }
    }

    fn create_framebuffer(
        &self,
        render_pass: vk::RenderPass,
        attachments: &[vk::ImageView],
        extent: vk::Extent2D,
    ) -> Result<vk::Framebuffer> {
        pipeline::create_framebuffer(&self.device, render_pass, attachments, extent)
    }

    fn destroy_framebuffer(&self, framebuffer: vk::Framebuffer) {
        unsafe { self.device.destroy_framebuffer(framebuffer, None) }
    }

    fn create_shader_module(&self, code: &[u32]) -> Result<vk::ShaderModule> {
        pipeline::create_shader_module(&self.device, code)
    }

    fn destroy_shader_module(&self, module: vk::ShaderModule) {
        unsafe { self.device.destroy_shader_module(module, None) }
    }

    fn create_scene_pipeline(&self, desc: &ScenePipelineDesc) -> Result<(vk::Pipeline, vk::PipelineLayout)> {
        pipeline::create_scene_pipeline(&self.device, desc)
    }

    fn destroy_pipeline(&self, pipeline: vk::Pipeline, layout: vk::PipelineLayout) {
        unsafe {
            self.device.destroy_pipeline(pipeline, None);
            self.device.destroy_pipeline_layout(layout, None);
        }
    }

    fn create_command_pool(&self) -> Result<vk::CommandPool> {
        // RESET_COMMAND_BUFFER: buffers are re-recorded individually every frame
        let pool_info = vk::CommandPoolCreateInfo::default()
            .queue_family_index(self.queue_families.graphics)
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);

        unsafe { self.device.create_command_pool(&pool_info, None) }.context("Failed to create command pool")
    }

    fn destroy_command_pool(&self, pool: vk::CommandPool) {
        unsafe { self.device.destroy_command_pool(pool, None) }
    }

    fn allocate_command_buffers(&self, pool: vk::CommandPool, count: u32) -> Result<Vec<vk::CommandBuffer>> {
        let alloc_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(count);

        unsafe { self.device.allocate_command_buffers(&alloc_info) }
            .context("Failed to allocate command buffers")
    }

    fn free_command_buffers(&self, pool: vk::CommandPool, buffers: &[vk::CommandBuffer]) {
        if !buffers.is_empty() {
            unsafe { self.device.free_command_buffers(pool, buffers) }
        }
    }

    fn begin_command_buffer(&self, cmd: vk::CommandBuffer, flags: vk::CommandBufferUsageFlags) -> Result<()> {
        let begin_info = vk::CommandBufferBeginInfo::default().flags(flags);
        unsafe { self.device.begin_command_buffer(cmd, &begin_info) }.context("Failed to begin command buffer")
    }

    fn end_command_buffer(&self, cmd: vk::CommandBuffer) -> Result<()> {
        unsafe { self.device.end_command_buffer(cmd) }.context("Failed to end command buffer")
    }

    fn cmd_begin_render_pass(
        &self,
        cmd: vk::CommandBuffer,
        render_pass: vk::RenderPass,
        framebuffer: vk::Framebuffer,
        extent: vk::Extent2D,
        clear_values: &[vk::ClearValue],
    ) {
        let begin_info = vk::RenderPassBeginInfo::default()
            .render_pass(render_pass)
            .framebuffer(framebuffer)
            .render_area(vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent,
            })
            .clear_values(clear_values);

        unsafe {
            self.device
                .cmd_begin_render_pass(cmd, &begin_info, vk::SubpassContents::INLINE)
        }
    }

    fn cmd_end_render_pass(&self, cmd: vk::CommandBuffer) {
        unsafe { self.device.cmd_end_render_pass(cmd) }
    }

    fn cmd_set_viewport(&self, cmd: vk::CommandBuffer, viewport: vk::Viewport) {
        unsafe { self.device.cmd_set_viewport(cmd, 0, &[viewport]) }
    }

    fn cmd_set_scissor(&self, cmd: vk::CommandBuffer, scissor: vk::Rect2D) {
        unsafe { self.device.cmd_set_scissor(cmd, 0, &[scissor]) }
    }

    fn cmd_bind_pipeline(&self, cmd: vk::CommandBuffer, pipeline: vk::Pipeline) {
        unsafe {
            self.device
                .cmd_bind_pipeline(cmd, vk::PipelineBindPoint::GRAPHICS, pipeline)
        }
    }

    fn cmd_draw(&self, cmd: vk::CommandBuffer, vertex_count: u32) {
        unsafe { self.device.cmd_draw(cmd, vertex_count, 1, 0, 0) }
    }
}
