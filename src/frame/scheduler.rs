// Frame scheduler - the ring of frame slots
//
// FRAME TIMELINE (one iteration):
// ┌──────────────────────────────────────────────────────────────────────┐
// │  wait slot fence ─> acquire ─> claim image ─> record ─> submit ─>    │
// │  present ─> advance ring on success                                  │
// └──────────────────────────────────────────────────────────────────────┘
//
// The slot count N is fixed at startup and independent of the swapchain
// image count M. A slot's semaphores are only reused after its fence has
// been seen signaled.

use anyhow::{Context, Result};
use ash::vk;

use super::swapchain::SwapchainManager;
use super::watcher::{RecreateReason, SurfaceWatcher};
use crate::backend::gpu::{AcquireStatus, Gpu, PresentStatus, SubmitDesc};
use crate::backend::sync::FrameSlot;
use crate::error::RenderError;

/// How recording is kept from overwriting a buffer the GPU may still read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordSync {
    /// Full device idle wait before every recording.
    #[default]
    DeviceIdle,
    /// Wait only on the fence of the slot that last submitted this image.
    ImageFence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStart {
    Ready(u32),
    /// Acquire reported out-of-date; nothing may be recorded this iteration.
    Stale(RecreateReason),
    Failed(vk::Result),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    Presented,
    /// The ring was not advanced.
    Recreate(RecreateReason),
    Failed(vk::Result),
}

pub struct FrameScheduler {
    slots: Vec<FrameSlot>,
    current: usize,
    record_sync: RecordSync,
    /// Fence of the last submission that used each swapchain image
    images_in_flight: Vec<vk::Fence>,
}

impl FrameScheduler {
    pub fn new<G: Gpu>(gpu: &G, frames_in_flight: usize, record_sync: RecordSync, image_count: usize) -> Result<Self> {
        if frames_in_flight == 0 {
            return Err(RenderError::NoFrameSlots.into());
        }

        let mut slots = Vec::with_capacity(frames_in_flight);
        for _ in 0..frames_in_flight {
            match FrameSlot::new(gpu) {
                Ok(slot) => slots.push(slot),
                Err(e) => {
                    for slot in &slots {
                        slot.destroy(gpu);
                    }
                    return Err(e.context("Failed to create frame slot"));
                }
            }
        }

        log::info!("{} frames in flight, record sync {:?}", frames_in_flight, record_sync);

        Ok(Self {
            slots,
            current: 0,
            record_sync,
            images_in_flight: vec![vk::Fence::null(); image_count],
        })
    }

    pub fn current_slot(&self) -> usize {
        self.current
    }

    pub fn slot(&self) -> &FrameSlot {
        &self.slots[self.current]
    }

    pub fn frames_in_flight(&self) -> usize {
        self.slots.len()
    }

    pub fn record_sync(&self) -> RecordSync {
        self.record_sync
    }

    /// Wait for the current slot to retire, then acquire an image with its
    /// semaphore. A failed fence wait means the device is gone.
    pub fn begin_frame<G: Gpu>(
        &self,
        gpu: &G,
        swapchain: &SwapchainManager,
        watcher: &mut SurfaceWatcher,
    ) -> Result<FrameStart> {
        let slot = self.slot();
        gpu.wait_for_fence(slot.in_flight)
            .with_context(|| format!("Failed waiting on frame slot {}", self.current))?;

        let acquired = swapchain.acquire_next(gpu, slot.image_acquired);
        watcher.observe_acquire(acquired.status);

        Ok(match acquired.status {
            AcquireStatus::Success | AcquireStatus::Suboptimal => FrameStart::Ready(acquired.index),
            AcquireStatus::OutOfDate => FrameStart::Stale(watcher.take().unwrap_or(RecreateReason::OutOfDate)),
            AcquireStatus::Failed(code) => FrameStart::Failed(code),
        })
    }

    /// Make sure nothing still reads the buffers bound to `image_index`
    /// before they are re-recorded.
    pub fn claim_image<G: Gpu>(&mut self, gpu: &G, image_index: u32) -> Result<()> {
        match self.record_sync {
            RecordSync::DeviceIdle => gpu.wait_idle(),
            RecordSync::ImageFence => {
                let fence = self.slots[self.current].in_flight;
                let count = self.images_in_flight.len();
                let tracked = self
                    .images_in_flight
                    .get_mut(image_index as usize)
                    .ok_or(RenderError::ImageIndexOutOfRange {
                        index: image_index,
                        count,
                    })?;

                if *tracked != vk::Fence::null() && *tracked != fence {
                    gpu.wait_for_fence(*tracked)
                        .with_context(|| format!("Failed waiting on image {}", image_index))?;
                }
                *tracked = fence;
                Ok(())
            }
        }
    }

    /// Reset the slot fence and enqueue `cmd`. Returns once enqueued.
    pub fn submit<G: Gpu>(&self, gpu: &G, cmd: vk::CommandBuffer) -> Result<()> {
        let slot = self.slot();
        gpu.reset_fence(slot.in_flight)?;
        gpu.submit(&SubmitDesc {
            command_buffer: cmd,
            wait_semaphore: slot.image_acquired,
            wait_stage: vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
            signal_semaphore: slot.render_finished,
            fence: slot.in_flight,
        })
        .context("Queue submit failed")
    }

    /// Present and decide whether the ring advances.
    pub fn present<G: Gpu>(
        &mut self,
        gpu: &G,
        swapchain: &SwapchainManager,
        image_index: u32,
        watcher: &mut SurfaceWatcher,
    ) -> PresentOutcome {
        let status = swapchain.present(gpu, image_index, self.slot().render_finished);
        watcher.observe_present(status);

        if let Some(reason) = watcher.take() {
            return PresentOutcome::Recreate(reason);
        }
        if let PresentStatus::Failed(code) = status {
            return PresentOutcome::Failed(code);
        }

        self.current = (self.current + 1) % self.slots.len();
        PresentOutcome::Presented
    }

    /// Images after a recreation are new; forget what used the old ones.
    pub fn reset_image_tracking(&mut self, image_count: usize) {
        self.images_in_flight.clear();
        self.images_in_flight.resize(image_count, vk::Fence::null());
    }

    pub fn destroy<G: Gpu>(&mut self, gpu: &G) {
        for slot in self.slots.drain(..) {
            slot.destroy(gpu);
        }
        self.images_in_flight.clear();
    }
}
