// Swapchain - the presentable image chain
//
// Negotiates format, present mode, extent and image count from the surface
// capabilities, then owns the resulting bundle {swapchain, format, extent,
// present mode, images, views}. The bundle is built and torn down as a unit.

use anyhow::Result;
use ash::vk;

use crate::backend::gpu::{
    Acquired, Gpu, PresentStatus, QueueFamilies, SurfaceSupport, SwapchainDesc,
};
use crate::error::RenderError;

/// What to do when the surface reports the "undefined" current extent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UndefinedExtentPolicy {
    /// Treat it as a configuration error.
    #[default]
    Error,
    /// Use the window's framebuffer size, clamped to the surface limits.
    Window,
}

#[derive(Debug, Clone, Copy)]
pub struct SwapchainPreferences {
    pub present_mode: vk::PresentModeKHR,
    pub undefined_extent: UndefinedExtentPolicy,
}

impl Default for SwapchainPreferences {
    fn default() -> Self {
        Self {
            present_mode: vk::PresentModeKHR::IMMEDIATE,
            undefined_extent: UndefinedExtentPolicy::Error,
        }
    }
}

/// The atomic unit of presentation state
#[derive(Debug, Default)]
pub struct SwapchainBundle {
    pub swapchain: vk::SwapchainKHR,
    pub surface_format: vk::SurfaceFormatKHR,
    pub extent: vk::Extent2D,
    pub present_mode: vk::PresentModeKHR,
    pub images: Vec<vk::Image>,
    pub views: Vec<vk::ImageView>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Negotiation
// ─────────────────────────────────────────────────────────────────────────────

/// Prefer B8G8R8A8_UNORM + sRGB nonlinear, else the first format offered.
pub fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> Result<vk::SurfaceFormatKHR, RenderError> {
    let preferred = vk::SurfaceFormatKHR {
        format: vk::Format::B8G8R8A8_UNORM,
        color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
    };

    // A lone UNDEFINED entry means the surface takes anything
    if let [only] = formats {
        if only.format == vk::Format::UNDEFINED {
            return Ok(preferred);
        }
    }

    formats
        .iter()
        .copied()
        .find(|f| f.format == preferred.format && f.color_space == preferred.color_space)
        .or_else(|| formats.first().copied())
        .ok_or(RenderError::NoSurfaceFormat)
}

/// Try the configured mode, then IMMEDIATE, then MAILBOX.
/// FIFO is always supported and is the final fallback.
pub fn choose_present_mode(available: &[vk::PresentModeKHR], preferred: vk::PresentModeKHR) -> vk::PresentModeKHR {
    [preferred, vk::PresentModeKHR::IMMEDIATE, vk::PresentModeKHR::MAILBOX]
        .into_iter()
        .find(|mode| available.contains(mode))
        .unwrap_or(vk::PresentModeKHR::FIFO)
}

pub fn choose_extent(
    capabilities: &vk::SurfaceCapabilitiesKHR,
    policy: UndefinedExtentPolicy,
    window: vk::Extent2D,
) -> Result<vk::Extent2D, RenderError> {
    if capabilities.current_extent.width != u32::MAX {
        return Ok(capabilities.current_extent);
    }

    match policy {
        UndefinedExtentPolicy::Error => Err(RenderError::UndefinedExtent),
        UndefinedExtentPolicy::Window => Ok(vk::Extent2D {
            width: window.width.clamp(
                capabilities.min_image_extent.width,
                capabilities.max_image_extent.width,
            ),
            height: window.height.clamp(
                capabilities.min_image_extent.height,
                capabilities.max_image_extent.height,
            ),
        }),
    }
}

/// One more than the minimum, capped by the maximum when there is one
pub fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let count = capabilities.min_image_count + 1;
    if capabilities.max_image_count > 0 {
        count.min(capabilities.max_image_count)
    } else {
        count
    }
}

pub fn negotiate(
    support: &SurfaceSupport,
    queue_families: QueueFamilies,
    preferences: &SwapchainPreferences,
    window: vk::Extent2D,
) -> Result<SwapchainDesc, RenderError> {
    let capabilities = &support.capabilities;

    Ok(SwapchainDesc {
        min_image_count: choose_image_count(capabilities),
        surface_format: choose_surface_format(&support.formats)?,
        extent: choose_extent(capabilities, preferences.undefined_extent, window)?,
        present_mode: choose_present_mode(&support.present_modes, preferences.present_mode),
        pre_transform: capabilities.current_transform,
        queue_families,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Manager
// ─────────────────────────────────────────────────────────────────────────────

pub struct SwapchainManager {
    bundle: SwapchainBundle,
    preferences: SwapchainPreferences,
}

impl SwapchainManager {
    pub fn create<G: Gpu>(
        gpu: &G,
        support: &SurfaceSupport,
        preferences: SwapchainPreferences,
        window: vk::Extent2D,
    ) -> Result<Self> {
        let bundle = build_bundle(gpu, support, &preferences, window)?;
        Ok(Self { bundle, preferences })
    }

    /// Destroy and rebuild against `support`.
    /// The device must already be idle and dependents already destroyed.
    pub fn rebuild<G: Gpu>(&mut self, gpu: &G, support: &SurfaceSupport, window: vk::Extent2D) -> Result<()> {
        self.destroy(gpu);
        self.bundle = build_bundle(gpu, support, &self.preferences, window)?;
        Ok(())
    }

    /// Standalone recreation: idle wait, then rebuild.
    pub fn recreate<G: Gpu>(&mut self, gpu: &G, support: &SurfaceSupport, window: vk::Extent2D) -> Result<()> {
        gpu.wait_idle()?;
        self.rebuild(gpu, support, window)
    }

    pub fn acquire_next<G: Gpu>(&self, gpu: &G, semaphore: vk::Semaphore) -> Acquired {
        gpu.acquire_next_image(self.bundle.swapchain, semaphore)
    }

    pub fn present<G: Gpu>(&self, gpu: &G, image_index: u32, wait: vk::Semaphore) -> PresentStatus {
        gpu.present(self.bundle.swapchain, image_index, wait)
    }

    /// Views first, then the swapchain that owns the images
    pub fn destroy<G: Gpu>(&mut self, gpu: &G) {
        let bundle = std::mem::take(&mut self.bundle);
        for view in bundle.views {
            gpu.destroy_image_view(view);
        }
        if bundle.swapchain != vk::SwapchainKHR::null() {
            gpu.destroy_swapchain(bundle.swapchain);
        }
    }

    pub fn bundle(&self) -> &SwapchainBundle {
        &self.bundle
    }

    pub fn extent(&self) -> vk::Extent2D {
        self.bundle.extent
    }

    pub fn format(&self) -> vk::Format {
        self.bundle.surface_format.format
    }

    pub fn image_count(&self) -> usize {
        self.bundle.images.len()
    }

    pub fn views(&self) -> &[vk::ImageView] {
        &self.bundle.views
    }
}

fn build_bundle<G: Gpu>(
    gpu: &G,
    support: &SurfaceSupport,
    preferences: &SwapchainPreferences,
    window: vk::Extent2D,
) -> Result<SwapchainBundle> {
    let desc = negotiate(support, gpu.queue_families(), preferences, window)?;

    log::info!("Creating swapchain: {}x{}", desc.extent.width, desc.extent.height);
    log::info!("Present mode: {:?}", desc.present_mode);
    log::debug!(
        "Surface format: {:?} / {:?}, min images {}",
        desc.surface_format.format,
        desc.surface_format.color_space,
        desc.min_image_count
    );

    let swapchain = gpu.create_swapchain(&desc)?;

    let images = match gpu.swapchain_images(swapchain) {
        Ok(images) => images,
        Err(e) => {
            gpu.destroy_swapchain(swapchain);
            return Err(e);
        }
    };

    let mut views = Vec::with_capacity(images.len());
    for &image in &images {
        match gpu.create_image_view(image, desc.surface_format.format) {
            Ok(view) => views.push(view),
            Err(e) => {
                // No partial bundles
                for view in views {
                    gpu.destroy_image_view(view);
                }
                gpu.destroy_swapchain(swapchain);
                return Err(e);
            }
        }
    }

    log::info!("Created swapchain with {} images", images.len());

    Ok(SwapchainBundle {
        swapchain,
        surface_format: desc.surface_format,
        extent: desc.extent,
        present_mode: desc.present_mode,
        images,
        views,
    })
}
