// Surface watcher - collapses staleness signals into one recreation request
//
// Acquire/present result codes, window resizes and settings changes all land
// here. The scheduler consumes the request with `take()`, so any number of
// signals raised during one iteration produce at most one recreation.

use ash::vk;
use std::fmt;

use crate::backend::gpu::{AcquireStatus, PresentStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecreateReason {
    OutOfDate,
    Suboptimal,
    Resized(vk::Extent2D),
    SettingsChanged,
}

impl fmt::Display for RecreateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfDate => write!(f, "surface out of date"),
            Self::Suboptimal => write!(f, "surface suboptimal"),
            Self::Resized(extent) => write!(f, "window resized to {}x{}", extent.width, extent.height),
            Self::SettingsChanged => write!(f, "render settings changed"),
        }
    }
}

#[derive(Debug)]
pub struct SurfaceWatcher {
    pending: Option<RecreateReason>,
    current_extent: vk::Extent2D,
}

impl SurfaceWatcher {
    pub fn new(current_extent: vk::Extent2D) -> Self {
        Self {
            pending: None,
            current_extent,
        }
    }

    pub fn observe_acquire(&mut self, status: AcquireStatus) {
        match status {
            AcquireStatus::OutOfDate => self.raise(RecreateReason::OutOfDate),
            AcquireStatus::Suboptimal => self.raise(RecreateReason::Suboptimal),
            AcquireStatus::Success | AcquireStatus::Failed(_) => {}
        }
    }

    pub fn observe_present(&mut self, status: PresentStatus) {
        match status {
            PresentStatus::OutOfDate => self.raise(RecreateReason::OutOfDate),
            PresentStatus::Suboptimal => self.raise(RecreateReason::Suboptimal),
            PresentStatus::Success | PresentStatus::Failed(_) => {}
        }
    }

    /// Ignored when the swapchain already has this extent.
    pub fn notify_resize(&mut self, extent: vk::Extent2D) {
        if extent == self.current_extent {
            log::trace!("Ignoring resize to current extent {}x{}", extent.width, extent.height);
            return;
        }
        self.raise(RecreateReason::Resized(extent));
    }

    pub fn request_external(&mut self, reason: RecreateReason) {
        self.raise(reason);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Consume the pending request, if any.
    pub fn take(&mut self) -> Option<RecreateReason> {
        self.pending.take()
    }

    /// Drop anything raised while a recreation was already under way.
    pub fn clear(&mut self) {
        self.pending = None;
    }

    pub fn set_current_extent(&mut self, extent: vk::Extent2D) {
        self.current_extent = extent;
    }

    pub fn current_extent(&self) -> vk::Extent2D {
        self.current_extent
    }

    // First signal wins; later ones in the same iteration are folded into it
    fn raise(&mut self, reason: RecreateReason) {
        if self.pending.is_none() {
            log::debug!("Surface needs recreation: {}", reason);
            self.pending = Some(reason);
        }
    }
}
