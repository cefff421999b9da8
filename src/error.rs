// Typed configuration errors
//
// Everything else on the setup/fatal path travels as anyhow::Error with
// context attached; these are the cases callers may want to match on.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("surface reports an undefined current extent")]
    UndefinedExtent,

    #[error("surface offers no formats")]
    NoSurfaceFormat,

    #[error("frames in flight must be at least 1")]
    NoFrameSlots,

    #[error("{buffers} command buffers recorded against {framebuffers} framebuffers")]
    ImageCountMismatch { buffers: usize, framebuffers: usize },

    #[error("acquired image index {index} is outside the {count}-image swapchain")]
    ImageIndexOutOfRange { index: u32, count: usize },
}
