// Buffer and image memory through gpu-allocator
//
// Host-visible buffers back the overlay geometry and staging uploads;
// device-local images back the multisample color target and the font atlas.

use anyhow::{Context, Result};
use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use gpu_allocator::MemoryLocation;

use super::VulkanDevice;

/// A buffer plus the allocation backing it
pub struct GpuBuffer {
    pub buffer: vk::Buffer,
    pub size: vk::DeviceSize,
    allocation: Option<Allocation>,
}

impl GpuBuffer {
    /// Create a GPU buffer with the given usage in `location`
    pub fn new(
        device: &VulkanDevice,
        name: &str,
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
        location: MemoryLocation,
    ) -> Result<Self> {
        let buffer_info = vk::BufferCreateInfo::default()
            .size(size)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let buffer = unsafe { device.device.create_buffer(&buffer_info, None) }
            .context("Failed to create buffer")?;
        let requirements = unsafe { device.device.get_buffer_memory_requirements(buffer) };

        let allocation = device
            .allocator()
            .lock()
            .allocate(&AllocationCreateDesc {
                name,
                requirements,
                location,
                linear: true,
                allocation_scheme: AllocationScheme::GpuAllocatorManaged,
            })
            .with_context(|| format!("Failed to allocate memory for buffer '{name}'"))?;

        unsafe {
            device
                .device
                .bind_buffer_memory(buffer, allocation.memory(), allocation.offset())
                .context("Failed to bind buffer memory")?;
        }

        Ok(Self {
            buffer,
            size,
            allocation: Some(allocation),
        })
    }

    /// Create a host-visible buffer and fill it with `data`
    pub fn with_data(
        device: &VulkanDevice,
        name: &str,
        usage: vk::BufferUsageFlags,
        data: &[u8],
    ) -> Result<Self> {
        let mut buffer = Self::new(
            device,
            name,
            data.len().max(1) as vk::DeviceSize,
            usage,
            MemoryLocation::CpuToGpu,
        )?;
        buffer.write(0, data)?;
        Ok(buffer)
    }

    /// Copy `data` into the mapped allocation at `offset`
    pub fn write(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        let mapped = self
            .allocation
            .as_mut()
            .and_then(|allocation| allocation.mapped_slice_mut())
            .context("Buffer is not host visible")?;

        let end = offset + data.len();
        anyhow::ensure!(
            end <= mapped.len(),
            "Write of {} bytes at {} overflows a {}-byte buffer",
            data.len(),
            offset,
            mapped.len()
        );
        mapped[offset..end].copy_from_slice(data);
        Ok(())
    }

    pub fn destroy(mut self, device: &VulkanDevice) {
        unsafe { device.device.destroy_buffer(self.buffer, None) };
        if let Some(allocation) = self.allocation.take() {
            if let Err(e) = device.allocator().lock().free(allocation) {
                log::error!("Failed to free buffer memory: {}", e);
            }
        }
    }
}

/// A 2D image, its view, and backing memory
pub struct GpuImage {
    pub image: vk::Image,
    pub view: vk::ImageView,
    pub allocation: Allocation,
}

pub struct ImageDesc<'a> {
    pub name: &'a str,
    pub extent: vk::Extent2D,
    pub format: vk::Format,
    pub samples: vk::SampleCountFlags,
    pub usage: vk::ImageUsageFlags,
}

impl GpuImage {
    pub fn new(device: &VulkanDevice, desc: &ImageDesc<'_>) -> Result<Self> {
        let image_info = vk::ImageCreateInfo::default()
            .image_type(vk::ImageType::TYPE_2D)
            .extent(vk::Extent3D {
                width: desc.extent.width,
                height: desc.extent.height,
                depth: 1,
            })
            .mip_levels(1)
            .array_layers(1)
            .format(desc.format)
            .tiling(vk::ImageTiling::OPTIMAL)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .usage(desc.usage)
            .samples(desc.samples)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let image = unsafe { device.device.create_image(&image_info, None) }
            .with_context(|| format!("Failed to create image '{}'", desc.name))?;
        let requirements = unsafe { device.device.get_image_memory_requirements(image) };

        let allocation = device
            .allocator()
            .lock()
            .allocate(&AllocationCreateDesc {
                name: desc.name,
                requirements,
                location: MemoryLocation::GpuOnly,
                linear: false,
                allocation_scheme: AllocationScheme::GpuAllocatorManaged,
            })
            .with_context(|| format!("Failed to allocate memory for image '{}'", desc.name))?;

        unsafe {
            device
                .device
                .bind_image_memory(image, allocation.memory(), allocation.offset())
                .context("Failed to bind image memory")?;
        }

        let view = create_color_view(&device.device, image, desc.format)?;

        Ok(Self { image, view, allocation })
    }

    pub fn destroy(self, device: &VulkanDevice) {
        unsafe {
            device.device.destroy_image_view(self.view, None);
            device.device.destroy_image(self.image, None);
        }
        if let Err(e) = device.allocator().lock().free(self.allocation) {
            log::error!("Failed to free image memory: {}", e);
        }
    }
}

/// Single-mip color view over a 2D image
pub fn create_color_view(device: &ash::Device, image: vk::Image, format: vk::Format) -> Result<vk::ImageView> {
    let create_info = vk::ImageViewCreateInfo::default()
        .image(image)
        .view_type(vk::ImageViewType::TYPE_2D)
        .format(format)
        .components(vk::ComponentMapping {
            r: vk::ComponentSwizzle::IDENTITY,
            g: vk::ComponentSwizzle::IDENTITY,
            b: vk::ComponentSwizzle::IDENTITY,
            a: vk::ComponentSwizzle::IDENTITY,
        })
        .subresource_range(COLOR_RANGE);

    unsafe { device.create_image_view(&create_info, None) }.context("Failed to create image view")
}

pub const COLOR_RANGE: vk::ImageSubresourceRange = vk::ImageSubresourceRange {
    aspect_mask: vk::ImageAspectFlags::COLOR,
    base_mip_level: 0,
    level_count: 1,
    base_array_layer: 0,
    layer_count: 1,
};
