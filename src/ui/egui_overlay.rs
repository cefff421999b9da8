// Egui overlay - draw lists and font atlas rendered with ash
//
// Per frame: egui runs the settings window, tessellates, and the resulting
// meshes are copied into host-visible vertex/index buffers owned by the
// acquired swapchain image. Buffers only grow. The font atlas lives in one
// device-local image updated through a staging buffer.

use anyhow::{Context, Result};
use ash::vk;
use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use gpu_allocator::MemoryLocation;
use std::sync::Arc;
use winit::event::WindowEvent;
use winit::window::Window;

use super::{PassInfo, UiOverlay};
use crate::backend::buffer::{GpuBuffer, GpuImage, ImageDesc, COLOR_RANGE};
use crate::backend::pipeline::{create_overlay_pipeline, create_shader_module, OverlayPipelineDesc};
use crate::backend::shader::ShaderPair;
use crate::backend::VulkanDevice;
use crate::settings::RenderSettings;

const FONT_TEXTURE: egui::TextureId = egui::TextureId::Managed(0);
const MIN_BUFFER_SIZE: vk::DeviceSize = 64 * 1024;
const SAMPLE_CHOICES: [u32; 4] = [2, 4, 8, 16];

/// Push constants mapping egui points to clip space
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ScreenTransform {
    pub scale: Vec2,
    pub translate: Vec2,
}

pub fn screen_transform(extent: vk::Extent2D, pixels_per_point: f32) -> ScreenTransform {
    let size_in_points = Vec2::new(extent.width as f32, extent.height as f32) / pixels_per_point;
    ScreenTransform {
        scale: Vec2::splat(2.0) / size_in_points,
        translate: Vec2::splat(-1.0),
    }
}

/// Clip rectangle in points to a scissor in pixels, None if nothing is visible
pub fn clip_to_scissor(clip: egui::Rect, pixels_per_point: f32, extent: vk::Extent2D) -> Option<vk::Rect2D> {
    let min_x = (clip.min.x * pixels_per_point).round().clamp(0.0, extent.width as f32) as u32;
    let min_y = (clip.min.y * pixels_per_point).round().clamp(0.0, extent.height as f32) as u32;
    let max_x = (clip.max.x * pixels_per_point).round().clamp(0.0, extent.width as f32) as u32;
    let max_y = (clip.max.y * pixels_per_point).round().clamp(0.0, extent.height as f32) as u32;

    if max_x <= min_x || max_y <= min_y {
        return None;
    }

    Some(vk::Rect2D {
        offset: vk::Offset2D {
            x: min_x as i32,
            y: min_y as i32,
        },
        extent: vk::Extent2D {
            width: max_x - min_x,
            height: max_y - min_y,
        },
    })
}

#[derive(Debug, Clone, Copy)]
struct MeshDraw {
    scissor: vk::Rect2D,
    first_index: u32,
    index_count: u32,
    vertex_offset: i32,
}

/// Geometry owned by one swapchain image
#[derive(Default)]
struct ImageGeometry {
    vertices: Option<GpuBuffer>,
    indices: Option<GpuBuffer>,
    draws: Vec<MeshDraw>,
}

impl ImageGeometry {
    fn destroy(&mut self, device: &VulkanDevice) {
        if let Some(buffer) = self.vertices.take() {
            buffer.destroy(device);
        }
        if let Some(buffer) = self.indices.take() {
            buffer.destroy(device);
        }
        self.draws.clear();
    }
}

struct FontTexture {
    image: GpuImage,
    size: [usize; 2],
}

pub struct EguiOverlay {
    ctx: egui::Context,
    state: egui_winit::State,
    window: Arc<Window>,

    vertex_shader: vk::ShaderModule,
    fragment_shader: vk::ShaderModule,
    set_layout: vk::DescriptorSetLayout,
    pipeline_layout: vk::PipelineLayout,
    descriptor_pool: vk::DescriptorPool,
    descriptor_set: vk::DescriptorSet,
    sampler: vk::Sampler,
    pipeline: vk::Pipeline,

    font: Option<FontTexture>,
    geometry: Vec<ImageGeometry>,

    primitives: Vec<egui::ClippedPrimitive>,
    textures: egui::TexturesDelta,
    pixels_per_point: f32,
    extent: vk::Extent2D,
}

impl EguiOverlay {
    /// Create everything that does not depend on the render pass.
    /// The pipeline follows on the first `rebuild`.
    pub fn new(device: &VulkanDevice, window: Arc<Window>, shaders: &ShaderPair) -> Result<Self> {
        let ctx = egui::Context::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let vertex_shader = create_shader_module(&device.device, &shaders.vertex)?;
        let fragment_shader = create_shader_module(&device.device, &shaders.fragment)?;

        let bindings = [vk::DescriptorSetLayoutBinding::default()
            .binding(0)
            .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
            .descriptor_count(1)
            .stage_flags(vk::ShaderStageFlags::FRAGMENT)];
        let set_layout = unsafe {
            device.device.create_descriptor_set_layout(
                &vk::DescriptorSetLayoutCreateInfo::default().bindings(&bindings),
                None,
            )
        }
        .context("Failed to create overlay descriptor set layout")?;

        let push_constants = [vk::PushConstantRange::default()
            .stage_flags(vk::ShaderStageFlags::VERTEX)
            .offset(0)
            .size(std::mem::size_of::<ScreenTransform>() as u32)];
        let set_layouts = [set_layout];
        let pipeline_layout = unsafe {
            device.device.create_pipeline_layout(
                &vk::PipelineLayoutCreateInfo::default()
                    .set_layouts(&set_layouts)
                    .push_constant_ranges(&push_constants),
                None,
            )
        }
        .context("Failed to create overlay pipeline layout")?;

        let pool_sizes = [vk::DescriptorPoolSize {
            ty: vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
            descriptor_count: 1,
        }];
        let descriptor_pool = unsafe {
            device.device.create_descriptor_pool(
                &vk::DescriptorPoolCreateInfo::default()
                    .max_sets(1)
                    .pool_sizes(&pool_sizes),
                None,
            )
        }
        .context("Failed to create overlay descriptor pool")?;

        let descriptor_set = unsafe {
            device.device.allocate_descriptor_sets(
                &vk::DescriptorSetAllocateInfo::default()
                    .descriptor_pool(descriptor_pool)
                    .set_layouts(&set_layouts),
            )
        }
        .context("Failed to allocate overlay descriptor set")?[0];

        let sampler = unsafe {
            device.device.create_sampler(
                &vk::SamplerCreateInfo::default()
                    .mag_filter(vk::Filter::LINEAR)
                    .min_filter(vk::Filter::LINEAR)
                    .mipmap_mode(vk::SamplerMipmapMode::LINEAR)
                    .address_mode_u(vk::SamplerAddressMode::CLAMP_TO_EDGE)
                    .address_mode_v(vk::SamplerAddressMode::CLAMP_TO_EDGE)
                    .address_mode_w(vk::SamplerAddressMode::CLAMP_TO_EDGE)
                    .max_lod(vk::LOD_CLAMP_NONE),
                None,
            )
        }
        .context("Failed to create overlay sampler")?;

        log::info!("Overlay initialized");

        Ok(Self {
            ctx,
            state,
            window,
            vertex_shader,
            fragment_shader,
            set_layout,
            pipeline_layout,
            descriptor_pool,
            descriptor_set,
            sampler,
            pipeline: vk::Pipeline::null(),
            font: None,
            geometry: Vec::new(),
            primitives: Vec::new(),
            textures: egui::TexturesDelta::default(),
            pixels_per_point: 1.0,
            extent: vk::Extent2D::default(),
        })
    }

    /// Feed a window event to egui. Returns true if egui consumed it.
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        self.state.on_window_event(&self.window, event).consumed
    }

    fn apply_textures(&mut self, device: &VulkanDevice) -> Result<()> {
        if self.textures.set.is_empty() && self.textures.free.is_empty() {
            return Ok(());
        }

        // The atlas and its descriptor may still be read by earlier frames
        device.wait_idle()?;

        let delta = std::mem::take(&mut self.textures);
        for (id, image_delta) in delta.set {
            if id != FONT_TEXTURE {
                log::debug!("Skipping user texture {:?}", id);
                continue;
            }
            self.update_font(device, &image_delta)?;
        }

        for id in delta.free {
            if id == FONT_TEXTURE {
                if let Some(font) = self.font.take() {
                    font.image.destroy(device);
                }
            }
        }
        Ok(())
    }

    fn update_font(&mut self, device: &VulkanDevice, delta: &egui::epaint::ImageDelta) -> Result<()> {
        #[allow(unreachable_patterns)]
        let (size, pixels) = match &delta.image {
            egui::ImageData::Color(image) => (image.size, bytemuck::cast_slice::<_, u8>(&image.pixels).to_vec()),
            _ => {
                log::warn!("Unsupported overlay texture data");
                return Ok(());
            }
        };

        let (offset, old_layout) = match (delta.pos, self.font.is_some()) {
            (Some(pos), true) => (pos, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL),
            (Some(_), false) => {
                log::warn!("Partial font update before the atlas exists");
                return Ok(());
            }
            (None, _) => {
                if let Some(old) = self.font.take() {
                    old.image.destroy(device);
                }
                let image = GpuImage::new(
                    device,
                    &ImageDesc {
                        name: "overlay font atlas",
                        extent: vk::Extent2D {
                            width: size[0] as u32,
                            height: size[1] as u32,
                        },
                        format: vk::Format::R8G8B8A8_UNORM,
                        samples: vk::SampleCountFlags::TYPE_1,
                        usage: vk::ImageUsageFlags::SAMPLED | vk::ImageUsageFlags::TRANSFER_DST,
                    },
                )?;
                self.write_descriptor(device, image.view);
                self.font = Some(FontTexture { image, size });
                ([0, 0], vk::ImageLayout::UNDEFINED)
            }
        };

        let Some(font) = &self.font else {
            return Ok(());
        };
        log::debug!(
            "Uploading {}x{} font region at {:?} into {}x{} atlas",
            size[0],
            size[1],
            offset,
            font.size[0],
            font.size[1]
        );

        let staging = GpuBuffer::with_data(device, "overlay font staging", vk::BufferUsageFlags::TRANSFER_SRC, &pixels)?;
        let image = font.image.image;
        let result = device.submit_once(|d, cmd| unsafe {
            let to_transfer = vk::ImageMemoryBarrier::default()
                .src_access_mask(vk::AccessFlags::SHADER_READ)
                .dst_access_mask(vk::AccessFlags::TRANSFER_WRITE)
                .old_layout(old_layout)
                .new_layout(vk::ImageLayout::TRANSFER_DST_OPTIMAL)
                .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .image(image)
                .subresource_range(COLOR_RANGE);
            d.cmd_pipeline_barrier(
                cmd,
                vk::PipelineStageFlags::FRAGMENT_SHADER,
                vk::PipelineStageFlags::TRANSFER,
                vk::DependencyFlags::empty(),
                &[],
                &[],
                &[to_transfer],
            );

            let region = vk::BufferImageCopy::default()
                .buffer_offset(0)
                .image_subresource(vk::ImageSubresourceLayers {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    mip_level: 0,
                    base_array_layer: 0,
                    layer_count: 1,
                })
                .image_offset(vk::Offset3D {
                    x: offset[0] as i32,
                    y: offset[1] as i32,
                    z: 0,
                })
                .image_extent(vk::Extent3D {
                    width: size[0] as u32,
                    height: size[1] as u32,
                    depth: 1,
                });
            d.cmd_copy_buffer_to_image(
                cmd,
                staging.buffer,
                image,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &[region],
            );

            let to_shader = vk::ImageMemoryBarrier::default()
                .src_access_mask(vk::AccessFlags::TRANSFER_WRITE)
                .dst_access_mask(vk::AccessFlags::SHADER_READ)
                .old_layout(vk::ImageLayout::TRANSFER_DST_OPTIMAL)
                .new_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)
                .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                .image(image)
                .subresource_range(COLOR_RANGE);
            d.cmd_pipeline_barrier(
                cmd,
                vk::PipelineStageFlags::TRANSFER,
                vk::PipelineStageFlags::FRAGMENT_SHADER,
                vk::DependencyFlags::empty(),
                &[],
                &[],
                &[to_shader],
            );
        });
        staging.destroy(device);
        result.context("Failed to upload font atlas")
    }

    fn write_descriptor(&self, device: &VulkanDevice, view: vk::ImageView) {
        let image_info = [vk::DescriptorImageInfo::default()
            .sampler(self.sampler)
            .image_view(view)
            .image_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)];
        let write = vk::WriteDescriptorSet::default()
            .dst_set(self.descriptor_set)
            .dst_binding(0)
            .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
            .image_info(&image_info);
        unsafe { device.device.update_descriptor_sets(&[write], &[]) };
    }

    fn destroy_pipeline(&mut self, device: &VulkanDevice) {
        if self.pipeline != vk::Pipeline::null() {
            unsafe { device.device.destroy_pipeline(self.pipeline, None) };
            self.pipeline = vk::Pipeline::null();
        }
    }
}

fn settings_window(ctx: &egui::Context, settings: &mut RenderSettings, delta: f32) {
    egui::Window::new("Settings").resizable(false).show(ctx, |ui| {
        let mut msaa = settings.msaa();
        ui.checkbox(&mut msaa, "MSAA");
        settings.set_msaa(msaa);

        let mut samples = settings.sample_count();
        ui.add_enabled_ui(msaa, |ui| {
            egui::ComboBox::from_label("Samples")
                .selected_text(format!("{}x", samples))
                .show_ui(ui, |ui| {
                    for choice in SAMPLE_CHOICES {
                        ui.selectable_value(&mut samples, choice, format!("{}x", choice));
                    }
                });
        });
        settings.set_sample_count(samples);

        ui.separator();
        ui.label(format!("Frame time: {:.2} ms", delta * 1000.0));
    });
}

/// Grow `slot` to hold at least `size` bytes
fn ensure_capacity(
    device: &VulkanDevice,
    slot: &mut Option<GpuBuffer>,
    name: &str,
    size: vk::DeviceSize,
    usage: vk::BufferUsageFlags,
) -> Result<()> {
    if slot.as_ref().is_some_and(|buffer| buffer.size >= size) {
        return Ok(());
    }
    if let Some(old) = slot.take() {
        old.destroy(device);
    }

    let capacity = size.next_power_of_two().max(MIN_BUFFER_SIZE);
    log::debug!("Growing {} to {} bytes", name, capacity);
    *slot = Some(GpuBuffer::new(device, name, capacity, usage, MemoryLocation::CpuToGpu)?);
    Ok(())
}

fn fill_geometry(
    device: &VulkanDevice,
    frame: &mut ImageGeometry,
    primitives: &[egui::ClippedPrimitive],
    pixels_per_point: f32,
    extent: vk::Extent2D,
) -> Result<()> {
    frame.draws.clear();

    let mut vertices: Vec<u8> = Vec::new();
    let mut indices: Vec<u8> = Vec::new();
    let mut vertex_count = 0u32;
    let mut index_count = 0u32;

    for primitive in primitives {
        let egui::epaint::Primitive::Mesh(mesh) = &primitive.primitive else {
            continue;
        };
        if mesh.texture_id != FONT_TEXTURE || mesh.indices.is_empty() {
            continue;
        }
        let Some(scissor) = clip_to_scissor(primitive.clip_rect, pixels_per_point, extent) else {
            continue;
        };

        frame.draws.push(MeshDraw {
            scissor,
            first_index: index_count,
            index_count: mesh.indices.len() as u32,
            vertex_offset: vertex_count as i32,
        });
        vertices.extend_from_slice(bytemuck::cast_slice(&mesh.vertices));
        indices.extend_from_slice(bytemuck::cast_slice(&mesh.indices));
        vertex_count += mesh.vertices.len() as u32;
        index_count += mesh.indices.len() as u32;
    }

    if frame.draws.is_empty() {
        return Ok(());
    }

    ensure_capacity(
        device,
        &mut frame.vertices,
        "overlay vertices",
        vertices.len() as vk::DeviceSize,
        vk::BufferUsageFlags::VERTEX_BUFFER,
    )?;
    ensure_capacity(
        device,
        &mut frame.indices,
        "overlay indices",
        indices.len() as vk::DeviceSize,
        vk::BufferUsageFlags::INDEX_BUFFER,
    )?;

    if let (Some(vb), Some(ib)) = (frame.vertices.as_mut(), frame.indices.as_mut()) {
        vb.write(0, &vertices)?;
        ib.write(0, &indices)?;
    }
    Ok(())
}

impl UiOverlay<VulkanDevice> for EguiOverlay {
    fn prepare_frame(&mut self, delta: f32, _total: f32, settings: &mut RenderSettings) {
        let raw_input = self.state.take_egui_input(&self.window);
        let output = self.ctx.run(raw_input, |ctx| settings_window(ctx, settings, delta));

        self.state.handle_platform_output(&self.window, output.platform_output);
        self.textures.append(output.textures_delta);
        self.pixels_per_point = output.pixels_per_point;
        self.primitives = self.ctx.tessellate(output.shapes, output.pixels_per_point);
    }

    fn upload_geometry(&mut self, gpu: &VulkanDevice, image_index: u32) -> Result<()> {
        self.apply_textures(gpu)?;

        let count = self.geometry.len();
        let frame = self
            .geometry
            .get_mut(image_index as usize)
            .with_context(|| format!("No overlay geometry for image {} of {}", image_index, count))?;
        fill_geometry(gpu, frame, &self.primitives, self.pixels_per_point, self.extent)
    }

    fn record_draws(&mut self, gpu: &VulkanDevice, cmd: vk::CommandBuffer, image_index: u32) {
        if self.font.is_none() || self.pipeline == vk::Pipeline::null() {
            return;
        }
        let Some(frame) = self.geometry.get(image_index as usize) else {
            return;
        };
        let (Some(vertices), Some(indices)) = (&frame.vertices, &frame.indices) else {
            return;
        };
        if frame.draws.is_empty() {
            return;
        }

        let transform = screen_transform(self.extent, self.pixels_per_point);
        let device = &gpu.device;

        unsafe {
            device.cmd_bind_pipeline(cmd, vk::PipelineBindPoint::GRAPHICS, self.pipeline);
            device.cmd_bind_descriptor_sets(
                cmd,
                vk::PipelineBindPoint::GRAPHICS,
                self.pipeline_layout,
                0,
                &[self.descriptor_set],
                &[],
            );
            device.cmd_bind_vertex_buffers(cmd, 0, &[vertices.buffer], &[0]);
            device.cmd_bind_index_buffer(cmd, indices.buffer, 0, vk::IndexType::UINT32);
            device.cmd_push_constants(
                cmd,
                self.pipeline_layout,
                vk::ShaderStageFlags::VERTEX,
                0,
                bytemuck::bytes_of(&transform),
            );

            for draw in &frame.draws {
                device.cmd_set_scissor(cmd, 0, &[draw.scissor]);
                device.cmd_draw_indexed(cmd, draw.index_count, 1, draw.first_index, draw.vertex_offset, 0);
            }
        }
    }

    fn rebuild(&mut self, gpu: &VulkanDevice, pass: &PassInfo) -> Result<()> {
        self.destroy_pipeline(gpu);

        // egui::epaint::Vertex: pos, uv, then packed sRGBA
        let bindings = [vk::VertexInputBindingDescription {
            binding: 0,
            stride: std::mem::size_of::<egui::epaint::Vertex>() as u32,
            input_rate: vk::VertexInputRate::VERTEX,
        }];
        let attributes = [
            vk::VertexInputAttributeDescription {
                location: 0,
                binding: 0,
                format: vk::Format::R32G32_SFLOAT,
                offset: 0,
            },
            vk::VertexInputAttributeDescription {
                location: 1,
                binding: 0,
                format: vk::Format::R32G32_SFLOAT,
                offset: 8,
            },
            vk::VertexInputAttributeDescription {
                location: 2,
                binding: 0,
                format: vk::Format::R8G8B8A8_UNORM,
                offset: 16,
            },
        ];

        self.pipeline = create_overlay_pipeline(
            &gpu.device,
            &OverlayPipelineDesc {
                vertex_shader: self.vertex_shader,
                fragment_shader: self.fragment_shader,
                render_pass: pass.render_pass,
                samples: pass.samples,
                layout: self.pipeline_layout,
                bindings: &bindings,
                attributes: &attributes,
            },
        )?;

        // Images beyond the new count go away; new ones start empty
        while self.geometry.len() > pass.image_count {
            if let Some(mut frame) = self.geometry.pop() {
                frame.destroy(gpu);
            }
        }
        self.geometry.resize_with(pass.image_count, ImageGeometry::default);
        self.extent = pass.extent;

        log::debug!("Overlay rebuilt for {} images", pass.image_count);
        Ok(())
    }

    fn destroy(&mut self, gpu: &VulkanDevice) {
        self.destroy_pipeline(gpu);
        for mut frame in self.geometry.drain(..) {
            frame.destroy(gpu);
        }
        if let Some(font) = self.font.take() {
            font.image.destroy(gpu);
        }

        unsafe {
            let device = &gpu.device;
            device.destroy_sampler(self.sampler, None);
            device.destroy_descriptor_pool(self.descriptor_pool, None);
            device.destroy_descriptor_set_layout(self.set_layout, None);
            device.destroy_pipeline_layout(self.pipeline_layout, None);
            device.destroy_shader_module(self.vertex_shader, None);
            device.destroy_shader_module(self.fragment_shader, None);
        }
        self.sampler = vk::Sampler::null();
        self.descriptor_pool = vk::DescriptorPool::null();
        self.set_layout = vk::DescriptorSetLayout::null();
        self.pipeline_layout = vk::PipelineLayout::null();
        self.vertex_shader = vk::ShaderModule::null();
        self.fragment_shader = vk::ShaderModule::null();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HD: vk::Extent2D = vk::Extent2D {
        width: 1280,
        height: 720,
    };

    #[test]
    fn screen_corners_map_to_clip_corners() {
        let t = screen_transform(HD, 2.0);
        let top_left = Vec2::ZERO * t.scale + t.translate;
        let bottom_right = Vec2::new(640.0, 360.0) * t.scale + t.translate;
        assert_eq!(top_left, Vec2::new(-1.0, -1.0));
        assert!((bottom_right - Vec2::ONE).length() < 1e-6);
    }

    #[test]
    fn transform_is_plain_old_data() {
        let t = screen_transform(HD, 1.0);
        assert_eq!(bytemuck::bytes_of(&t).len(), 16);
    }

    #[test]
    fn clip_rect_scales_and_clamps_to_extent() {
        let clip = egui::Rect::from_min_max(egui::pos2(-10.0, 5.0), egui::pos2(700.0, 100.0));
        let scissor = clip_to_scissor(clip, 2.0, HD).unwrap();
        assert_eq!(scissor.offset, vk::Offset2D { x: 0, y: 10 });
        assert_eq!(scissor.extent, vk::Extent2D { width: 1280, height: 190 });
    }

    #[test]
    fn empty_or_offscreen_clip_is_skipped() {
        let empty = egui::Rect::from_min_max(egui::pos2(10.0, 10.0), egui::pos2(10.0, 50.0));
        assert!(clip_to_scissor(empty, 1.0, HD).is_none());

        let offscreen = egui::Rect::from_min_max(egui::pos2(2000.0, 10.0), egui::pos2(2100.0, 50.0));
        assert!(clip_to_scissor(offscreen, 1.0, HD).is_none());
    }

    #[test]
    fn egui_vertex_matches_the_attribute_layout() {
        assert_eq!(std::mem::size_of::<egui::epaint::Vertex>(), 20);
    }
}
