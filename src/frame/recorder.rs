// Command recorder - one pool, one reusable command buffer per image
//
// Buffers are re-recorded in full every iteration. On recreation the pool
// survives and only the buffers are freed and reallocated for the new
// image count.

use anyhow::{Context, Result};
use ash::vk;

use super::render_graph::RenderGraphResources;
use crate::backend::gpu::Gpu;
use crate::error::RenderError;
use crate::ui::UiOverlay;

/// Primary scene content is a single hardcoded triangle
pub const SCENE_VERTEX_COUNT: u32 = 3;

/// Color clear followed by a depth/stencil clear. The second entry is kept
/// even without a depth attachment so clear-value indices never shift.
pub fn clear_values(color: [f32; 4], depth: f32, stencil: u32) -> [vk::ClearValue; 2] {
    [
        vk::ClearValue {
            color: vk::ClearColorValue { float32: color },
        },
        vk::ClearValue {
            depth_stencil: vk::ClearDepthStencilValue { depth, stencil },
        },
    ]
}

pub struct CommandRecorder {
    pool: vk::CommandPool,
    buffers: Vec<vk::CommandBuffer>,
    clear_values: [vk::ClearValue; 2],
}

impl CommandRecorder {
    pub fn new<G: Gpu>(gpu: &G, image_count: usize, clear_color: [f32; 4]) -> Result<Self> {
        let pool = gpu.create_command_pool()?;
        let mut recorder = Self {
            pool,
            buffers: Vec::new(),
            clear_values: clear_values(clear_color, 1.0, 0),
        };

        if let Err(e) = recorder.allocate(gpu, image_count) {
            gpu.destroy_command_pool(pool);
            return Err(e);
        }
        Ok(recorder)
    }

    fn allocate<G: Gpu>(&mut self, gpu: &G, image_count: usize) -> Result<()> {
        self.buffers = gpu
            .allocate_command_buffers(self.pool, image_count as u32)
            .context("Failed to allocate command buffers")?;
        log::debug!("Allocated {} command buffers", self.buffers.len());
        Ok(())
    }

    /// Free every buffer; the pool stays.
    pub fn release<G: Gpu>(&mut self, gpu: &G) {
        if !self.buffers.is_empty() {
            gpu.free_command_buffers(self.pool, &self.buffers);
            self.buffers.clear();
        }
    }

    /// Free and reallocate sized to the new image count.
    pub fn repool<G: Gpu>(&mut self, gpu: &G, image_count: usize) -> Result<()> {
        self.release(gpu);
        self.allocate(gpu, image_count)
    }

    /// Re-record the buffer bound to `image_index` and hand it back for submission.
    pub fn record<G: Gpu, U: UiOverlay<G>>(
        &self,
        gpu: &G,
        image_index: u32,
        graph: &RenderGraphResources,
        pipeline: vk::Pipeline,
        ui: &mut U,
    ) -> Result<vk::CommandBuffer> {
        if self.buffers.len() != graph.framebuffers().len() {
            return Err(RenderError::ImageCountMismatch {
                buffers: self.buffers.len(),
                framebuffers: graph.framebuffers().len(),
            }
            .into());
        }

        let index = image_index as usize;
        let (cmd, framebuffer) = match (self.buffers.get(index), graph.framebuffers().get(index)) {
            (Some(&cmd), Some(&framebuffer)) => (cmd, framebuffer),
            _ => {
                return Err(RenderError::ImageIndexOutOfRange {
                    index: image_index,
                    count: self.buffers.len(),
                }
                .into())
            }
        };
        let extent = graph.extent();

        // Same buffer is resubmitted across iterations
        gpu.begin_command_buffer(cmd, vk::CommandBufferUsageFlags::SIMULTANEOUS_USE)?;

        gpu.cmd_begin_render_pass(cmd, graph.render_pass(), framebuffer, extent, &self.clear_values);

        gpu.cmd_set_viewport(
            cmd,
            vk::Viewport {
                x: 0.0,
                y: 0.0,
                width: extent.width as f32,
                height: extent.height as f32,
                min_depth: 0.0,
                max_depth: 1.0,
            },
        );
        gpu.cmd_set_scissor(
            cmd,
            vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent,
            },
        );

        gpu.cmd_bind_pipeline(cmd, pipeline);
        gpu.cmd_draw(cmd, SCENE_VERTEX_COUNT);

        ui.record_draws(gpu, cmd, image_index);

        gpu.cmd_end_render_pass(cmd);
        gpu.end_command_buffer(cmd)?;

        Ok(cmd)
    }

    pub fn buffers(&self) -> &[vk::CommandBuffer] {
        &self.buffers
    }

    /// Destroying the pool frees whatever buffers remain.
    pub fn destroy<G: Gpu>(&mut self, gpu: &G) {
        self.buffers.clear();
        if self.pool != vk::CommandPool::null() {
            gpu.destroy_command_pool(self.pool);
            self.pool = vk::CommandPool::null();
        }
    }
}
