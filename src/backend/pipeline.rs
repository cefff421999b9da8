// Render pass, framebuffer and graphics pipeline creation
//
// Both pipelines use dynamic viewport/scissor so they only depend on the
// render pass and sample count, not on the swapchain extent.

use anyhow::{Context, Result};
use ash::vk;

use super::gpu::{RenderPassDesc, ScenePipelineDesc};

/// Create the single-subpass render pass described by `desc`
pub fn create_render_pass(device: &ash::Device, desc: &RenderPassDesc) -> Result<vk::RenderPass> {
    let color_refs = [vk::AttachmentReference {
        attachment: 0,
        layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
    }];
    let resolve_refs = [vk::AttachmentReference {
        attachment: 1,
        layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
    }];

    let mut subpass = vk::SubpassDescription::default()
        .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
        .color_attachments(&color_refs);
    if desc.resolve {
        subpass = subpass.resolve_attachments(&resolve_refs);
    }

    let subpasses = [subpass];
    let dependencies = [desc.dependency];

    let render_pass_info = vk::RenderPassCreateInfo::default()
        .attachments(&desc.attachments)
        .subpasses(&subpasses)
        .dependencies(&dependencies);

    unsafe { device.create_render_pass(&render_pass_info, None) }.context("Failed to create render pass")
}

pub fn create_framebuffer(
    device: &ash::Device,
    render_pass: vk::RenderPass,
    attachments: &[vk::ImageView],
    extent: vk::Extent2D,
) -> Result<vk::Framebuffer> {
    let framebuffer_info = vk::FramebufferCreateInfo::default()
        .render_pass(render_pass)
        .attachments(attachments)
        .width(extent.width)
        .height(extent.height)
        .layers(1);

    unsafe { device.create_framebuffer(&framebuffer_info, None) }.context("Failed to create framebuffer")
}

pub fn create_shader_module(device: &ash::Device, code: &[u32]) -> Result<vk::ShaderModule> {
    let create_info = vk::ShaderModuleCreateInfo::default().code(code);
    unsafe { device.create_shader_module(&create_info, None) }.context("Failed to create shader module")
}

/// Fixed state shared by the scene and overlay pipelines
struct FixedState<'a> {
    stages: [vk::PipelineShaderStageCreateInfo<'a>; 2],
    vertex_input: vk::PipelineVertexInputStateCreateInfo<'a>,
    blend: vk::PipelineColorBlendAttachmentState,
    cull_mode: vk::CullModeFlags,
    samples: vk::SampleCountFlags,
    render_pass: vk::RenderPass,
    layout: vk::PipelineLayout,
}

fn shader_stages<'a>(vertex: vk::ShaderModule, fragment: vk::ShaderModule) -> [vk::PipelineShaderStageCreateInfo<'a>; 2] {
    [
        vk::PipelineShaderStageCreateInfo::default()
            .stage(vk::ShaderStageFlags::VERTEX)
            .module(vertex)
            .name(c"main"),
        vk::PipelineShaderStageCreateInfo::default()
            .stage(vk::ShaderStageFlags::FRAGMENT)
            .module(fragment)
            .name(c"main"),
    ]
}

fn build_pipeline(device: &ash::Device, state: FixedState<'_>) -> Result<vk::Pipeline> {
    let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::default()
        .topology(vk::PrimitiveTopology::TRIANGLE_LIST)
        .primitive_restart_enable(false);

    // Viewport and scissor are set per frame
    let viewport_state = vk::PipelineViewportStateCreateInfo::default()
        .viewport_count(1)
        .scissor_count(1);
    let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
    let dynamic_state = vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);

    let rasterizer = vk::PipelineRasterizationStateCreateInfo::default()
        .depth_clamp_enable(false)
        .rasterizer_discard_enable(false)
        .polygon_mode(vk::PolygonMode::FILL)
        .line_width(1.0)
        .cull_mode(state.cull_mode)
        .front_face(vk::FrontFace::CLOCKWISE)
        .depth_bias_enable(false);

    let multisampling = vk::PipelineMultisampleStateCreateInfo::default()
        .sample_shading_enable(false)
        .rasterization_samples(state.samples);

    let color_blend_attachments = [state.blend];
    let color_blending = vk::PipelineColorBlendStateCreateInfo::default()
        .logic_op_enable(false)
        .attachments(&color_blend_attachments);

    let pipeline_info = vk::GraphicsPipelineCreateInfo::default()
        .stages(&state.stages)
        .vertex_input_state(&state.vertex_input)
        .input_assembly_state(&input_assembly)
        .viewport_state(&viewport_state)
        .rasterization_state(&rasterizer)
        .multisample_state(&multisampling)
        .color_blend_state(&color_blending)
        .dynamic_state(&dynamic_state)
        .layout(state.layout)
        .render_pass(state.render_pass)
        .subpass(0);

    let pipelines = unsafe {
        device
            .create_graphics_pipelines(vk::PipelineCache::null(), &[pipeline_info], None)
            .map_err(|(_, e)| e)
            .context("Failed to create graphics pipeline")?
    };

    Ok(pipelines[0])
}

/// Pipeline for the primary scene: no vertex input, opaque output
pub fn create_scene_pipeline(
    device: &ash::Device,
    desc: &ScenePipelineDesc,
) -> Result<(vk::Pipeline, vk::PipelineLayout)> {
    let layout_info = vk::PipelineLayoutCreateInfo::default();
    let layout = unsafe { device.create_pipeline_layout(&layout_info, None) }
        .context("Failed to create pipeline layout")?;

    let blend = vk::PipelineColorBlendAttachmentState::default()
        .color_write_mask(vk::ColorComponentFlags::RGBA)
        .blend_enable(false);

    let pipeline = build_pipeline(
        device,
        FixedState {
            stages: shader_stages(desc.vertex_shader, desc.fragment_shader),
            vertex_input: vk::PipelineVertexInputStateCreateInfo::default(),
            blend,
            cull_mode: vk::CullModeFlags::NONE,
            samples: desc.samples,
            render_pass: desc.render_pass,
            layout,
        },
    );

    match pipeline {
        Ok(pipeline) => Ok((pipeline, layout)),
        Err(e) => {
            unsafe { device.destroy_pipeline_layout(layout, None) };
            Err(e)
        }
    }
}

/// Inputs for the alpha-blended overlay pipeline
pub struct OverlayPipelineDesc<'a> {
    pub vertex_shader: vk::ShaderModule,
    pub fragment_shader: vk::ShaderModule,
    pub render_pass: vk::RenderPass,
    pub samples: vk::SampleCountFlags,
    pub layout: vk::PipelineLayout,
    pub bindings: &'a [vk::VertexInputBindingDescription],
    pub attributes: &'a [vk::VertexInputAttributeDescription],
}

/// Pipeline for premultiplied-alpha overlay geometry
pub fn create_overlay_pipeline(device: &ash::Device, desc: &OverlayPipelineDesc<'_>) -> Result<vk::Pipeline> {
    let vertex_input = vk::PipelineVertexInputStateCreateInfo::default()
        .vertex_binding_descriptions(desc.bindings)
        .vertex_attribute_descriptions(desc.attributes);

    let blend = vk::PipelineColorBlendAttachmentState::default()
        .color_write_mask(vk::ColorComponentFlags::RGBA)
        .blend_enable(true)
        .src_color_blend_factor(vk::BlendFactor::ONE)
        .dst_color_blend_factor(vk::BlendFactor::ONE_MINUS_SRC_ALPHA)
        .color_blend_op(vk::BlendOp::ADD)
        .src_alpha_blend_factor(vk::BlendFactor::ONE_MINUS_DST_ALPHA)
        .dst_alpha_blend_factor(vk::BlendFactor::ONE)
        .alpha_blend_op(vk::BlendOp::ADD);

    build_pipeline(
        device,
        FixedState {
            stages: shader_stages(desc.vertex_shader, desc.fragment_shader),
            vertex_input,
            blend,
            cull_mode: vk::CullModeFlags::NONE,
            samples: desc.samples,
            render_pass: desc.render_pass,
            layout: desc.layout,
        },
    )
}
