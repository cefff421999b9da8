// Synchronization primitives
//
// One FrameSlot per frame in flight. The fence starts signaled so the very
// first wait on a fresh slot returns immediately.

use anyhow::Result;
use ash::vk;

use super::gpu::Gpu;

/// Sync objects bounding one in-flight frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSlot {
    pub image_acquired: vk::Semaphore,
    pub render_finished: vk::Semaphore,
    pub in_flight: vk::Fence,
}

impl FrameSlot {
    /// On failure nothing created so far is left behind.
    pub fn new<G: Gpu>(gpu: &G) -> Result<Self> {
        let image_acquired = gpu.create_semaphore()?;

        let render_finished = match gpu.create_semaphore() {
            Ok(semaphore) => semaphore,
            Err(e) => {
                gpu.destroy_semaphore(image_acquired);
                return Err(e);
            }
        };

        let in_flight = match gpu.create_fence(true) {
            Ok(fence) => fence,
            Err(e) => {
                gpu.destroy_semaphore(render_finished);
                gpu.destroy_semaphore(image_acquired);
                return Err(e);
            }
        };

        Ok(Self {
            image_acquired,
            render_finished,
            in_flight,
        })
    }

    pub fn destroy<G: Gpu>(&self, gpu: &G) {
        gpu.destroy_semaphore(self.image_acquired);
        gpu.destroy_semaphore(self.render_finished);
        gpu.destroy_fence(self.in_flight);
    }
}
