// Frame loop renderer
//
// A Vulkan presentation loop with N frames in flight over M swapchain
// images, an egui overlay, and a recreation cascade that rebuilds every
// extent- and format-dependent resource when the surface goes stale.

pub mod backend;
pub mod config;
pub mod error;
pub mod frame;
pub mod input;
pub mod settings;
pub mod ui;
