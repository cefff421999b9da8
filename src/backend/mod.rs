// Backend module - Vulkan abstraction layer
//
// Design: Thin wrapper around ash. The frame loop only sees the Gpu trait;
// VulkanDevice is the one real implementation.

pub mod buffer;
pub mod device;
pub mod gpu;
pub mod pipeline;
pub mod shader;
pub mod sync;
mod vulkan;

pub use device::VulkanDevice;
pub use gpu::Gpu;
