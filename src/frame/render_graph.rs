// Render graph resources - render pass, framebuffers, multisample target
//
// Everything here is sized from the swapchain bundle, so it is rebuilt
// whenever the swapchain is. Creation runs target -> pass -> framebuffers;
// destruction runs the exact reverse.

use anyhow::{Context, Result};
use ash::vk;

use super::swapchain::SwapchainManager;
use crate::backend::gpu::{Gpu, RenderPassDesc};
use crate::ui::PassInfo;

/// Attachment descriptions for the color target and, when multisampled,
/// the single-sample resolve attachment that is actually presented.
pub fn attachment_descriptions(format: vk::Format, samples: vk::SampleCountFlags) -> Vec<vk::AttachmentDescription> {
    if samples == vk::SampleCountFlags::TYPE_1 {
        return vec![vk::AttachmentDescription::default()
            .format(format)
            .samples(vk::SampleCountFlags::TYPE_1)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::STORE)
            .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
            .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .final_layout(vk::ImageLayout::PRESENT_SRC_KHR)];
    }

    vec![
        // Multisampled color, resolved at the end of the subpass
        vk::AttachmentDescription::default()
            .format(format)
            .samples(samples)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::DONT_CARE)
            .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
            .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .final_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL),
        vk::AttachmentDescription::default()
            .format(format)
            .samples(vk::SampleCountFlags::TYPE_1)
            .load_op(vk::AttachmentLoadOp::DONT_CARE)
            .store_op(vk::AttachmentStoreOp::STORE)
            .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
            .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .final_layout(vk::ImageLayout::PRESENT_SRC_KHR),
    ]
}

/// Orders this frame's clear after the previous frame's color writes.
pub fn subpass_dependency() -> vk::SubpassDependency {
    vk::SubpassDependency::default()
        .src_subpass(vk::SUBPASS_EXTERNAL)
        .dst_subpass(0)
        .src_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
        .src_access_mask(vk::AccessFlags::empty())
        .dst_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
        .dst_access_mask(vk::AccessFlags::COLOR_ATTACHMENT_WRITE)
}

pub fn render_pass_desc(format: vk::Format, samples: vk::SampleCountFlags) -> RenderPassDesc {
    RenderPassDesc {
        attachments: attachment_descriptions(format, samples),
        resolve: samples != vk::SampleCountFlags::TYPE_1,
        dependency: subpass_dependency(),
    }
}

/// Shared multisample color image; absent when rendering single-sampled
#[derive(Debug, Clone, Copy)]
struct MsaaTarget {
    image: vk::Image,
    view: vk::ImageView,
}

pub struct RenderGraphResources {
    render_pass: vk::RenderPass,
    framebuffers: Vec<vk::Framebuffer>,
    msaa_target: Option<MsaaTarget>,
    samples: vk::SampleCountFlags,
    extent: vk::Extent2D,
}

impl RenderGraphResources {
    /// Build against the swapchain's current views. Must run after the
    /// swapchain itself has been (re)created.
    pub fn create<G: Gpu>(gpu: &G, swapchain: &SwapchainManager, samples: vk::SampleCountFlags) -> Result<Self> {
        let extent = swapchain.extent();

        let mut resources = Self {
            render_pass: vk::RenderPass::null(),
            framebuffers: Vec::with_capacity(swapchain.image_count()),
            msaa_target: None,
            samples,
            extent,
        };

        if let Err(e) = resources.build(gpu, swapchain) {
            resources.destroy(gpu);
            return Err(e);
        }

        log::debug!(
            "Render graph: {} framebuffers, {:?} samples",
            resources.framebuffers.len(),
            samples
        );
        Ok(resources)
    }

    fn build<G: Gpu>(&mut self, gpu: &G, swapchain: &SwapchainManager) -> Result<()> {
        let format = swapchain.format();

        if self.samples != vk::SampleCountFlags::TYPE_1 {
            let (image, view) = gpu
                .create_color_target(self.extent, format, self.samples)
                .context("Failed to create multisample target")?;
            self.msaa_target = Some(MsaaTarget { image, view });
        }

        self.render_pass = gpu.create_render_pass(&render_pass_desc(format, self.samples))?;

        for &view in swapchain.views() {
            let attachments: Vec<vk::ImageView> = match self.msaa_target {
                Some(target) => vec![target.view, view],
                None => vec![view],
            };
            let framebuffer = gpu.create_framebuffer(self.render_pass, &attachments, self.extent)?;
            self.framebuffers.push(framebuffer);
        }

        Ok(())
    }

    /// Framebuffers, then the pass, then the target.
    pub fn destroy<G: Gpu>(&mut self, gpu: &G) {
        for framebuffer in self.framebuffers.drain(..) {
            gpu.destroy_framebuffer(framebuffer);
        }
        if self.render_pass != vk::RenderPass::null() {
            gpu.destroy_render_pass(self.render_pass);
            self.render_pass = vk::RenderPass::null();
        }
        if let Some(target) = self.msaa_target.take() {
            gpu.destroy_color_target(target.image, target.view);
        }
    }

    pub fn render_pass(&self) -> vk::RenderPass {
        self.render_pass
    }

    pub fn framebuffers(&self) -> &[vk::Framebuffer] {
        &self.framebuffers
    }

    pub fn samples(&self) -> vk::SampleCountFlags {
        self.samples
    }

    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    pub fn pass_info(&self) -> PassInfo {
        PassInfo {
            render_pass: self.render_pass,
            samples: self.samples,
            extent: self.extent,
            image_count: self.framebuffers.len(),
        }
    }
}
