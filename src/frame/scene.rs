// Primary scene pipeline
//
// Shader modules live as long as the renderer; only the pipeline itself is
// rebuilt when the render pass or sample count changes.

use anyhow::Result;
use ash::vk;

use crate::backend::gpu::{Gpu, ScenePipelineDesc};
use crate::backend::shader::ShaderPair;

pub struct ScenePipeline {
    vertex: vk::ShaderModule,
    fragment: vk::ShaderModule,
    pipeline: vk::Pipeline,
    layout: vk::PipelineLayout,
}

impl ScenePipeline {
    pub fn new<G: Gpu>(
        gpu: &G,
        shaders: &ShaderPair,
        render_pass: vk::RenderPass,
        samples: vk::SampleCountFlags,
    ) -> Result<Self> {
        let vertex = gpu.create_shader_module(&shaders.vertex)?;
        let fragment = match gpu.create_shader_module(&shaders.fragment) {
            Ok(module) => module,
            Err(e) => {
                gpu.destroy_shader_module(vertex);
                return Err(e);
            }
        };

        let mut scene = Self {
            vertex,
            fragment,
            pipeline: vk::Pipeline::null(),
            layout: vk::PipelineLayout::null(),
        };
        if let Err(e) = scene.build(gpu, render_pass, samples) {
            scene.destroy(gpu);
            return Err(e);
        }
        Ok(scene)
    }

    pub fn build<G: Gpu>(&mut self, gpu: &G, render_pass: vk::RenderPass, samples: vk::SampleCountFlags) -> Result<()> {
        let (pipeline, layout) = gpu.create_scene_pipeline(&ScenePipelineDesc {
            vertex_shader: self.vertex,
            fragment_shader: self.fragment,
            render_pass,
            samples,
        })?;
        self.pipeline = pipeline;
        self.layout = layout;
        Ok(())
    }

    /// Destroy the pipeline, keep the shader modules.
    pub fn release<G: Gpu>(&mut self, gpu: &G) {
        if self.pipeline != vk::Pipeline::null() {
            gpu.destroy_pipeline(self.pipeline, self.layout);
            self.pipeline = vk::Pipeline::null();
            self.layout = vk::PipelineLayout::null();
        }
    }

    pub fn destroy<G: Gpu>(&mut self, gpu: &G) {
        self.release(gpu);
        gpu.destroy_shader_module(self.vertex);
        gpu.destroy_shader_module(self.fragment);
        self.vertex = vk::ShaderModule::null();
        self.fragment = vk::ShaderModule::null();
    }

    pub fn pipeline(&self) -> vk::Pipeline {
        self.pipeline
    }
}
