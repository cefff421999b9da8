// Frame loop core
//
// Leaves first: swapchain, render graph, recorder, scheduler, watcher; the
// renderer composes them into one iteration.

pub mod recorder;
pub mod render_graph;
pub mod renderer;
pub mod scene;
pub mod scheduler;
pub mod swapchain;
pub mod watcher;

#[cfg(test)]
mod mock;

pub use recorder::CommandRecorder;
pub use render_graph::RenderGraphResources;
pub use renderer::{FrameOutcome, FrameStats, Renderer, RendererOptions, WindowSystem};
pub use scheduler::{FrameScheduler, RecordSync};
pub use swapchain::{SwapchainManager, SwapchainPreferences, UndefinedExtentPolicy};
pub use watcher::{RecreateReason, SurfaceWatcher};
